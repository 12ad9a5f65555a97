//! A local fake backend for testing purpose.

mod script;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use colloquy_backend::{Backend, BackendError, ErrorKind, ExchangeRecord};
use tokio::time::sleep;

pub use script::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Error {
    fn new(message: &'static str, kind: ErrorKind) -> Self {
        Self { message, kind }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self.message, f)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

struct Inner {
    history: Result<Vec<ExchangeRecord>, ErrorKind>,
    replies: VecDeque<ScriptedReply>,
    sent: Vec<String>,
    fetch_calls: usize,
    delay: Option<Duration>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            history: Ok(Vec::new()),
            replies: VecDeque::new(),
            sent: Vec::new(),
            fetch_calls: 0,
            delay: None,
        }
    }
}

/// A scriptable in-process backend.
///
/// Before driving a store with it, set up the history the fetch should
/// return and push one [`ScriptedReply`] per expected send; a send with
/// no scripted reply left fails. Every call is recorded, so tests can
/// assert not only what a store ended up with but also which requests
/// it made (or didn't make).
///
/// Clones share the script and the call log, which lets a test keep one
/// handle for assertions after moving the other into the store.
///
/// # Note
///
/// This type is not optimized for production use. You should only use
/// it for testing.
#[derive(Clone, Default)]
pub struct TestBackend {
    inner: Arc<Mutex<Inner>>,
}

impl TestBackend {
    /// Sets the exchanges the next fetch returns.
    #[inline]
    pub fn set_history(&self, records: impl Into<Vec<ExchangeRecord>>) {
        self.lock().history = Ok(records.into());
    }

    /// Makes fetches fail with the given kind.
    #[inline]
    pub fn fail_fetch(&self, kind: ErrorKind) {
        self.lock().history = Err(kind);
    }

    /// Appends a scripted outcome for the next unanswered send.
    #[inline]
    pub fn push_reply(&self, reply: ScriptedReply) {
        self.lock().replies.push_back(reply);
    }

    /// Delays every response by `duration`.
    #[inline]
    pub fn set_delay(&self, duration: Duration) {
        self.lock().delay = Some(duration);
    }

    /// Returns every message text submitted so far, in order.
    #[inline]
    pub fn sent_messages(&self) -> Vec<String> {
        self.lock().sent.clone()
    }

    /// Returns how many times the history has been fetched.
    #[inline]
    pub fn fetch_calls(&self) -> usize {
        self.lock().fetch_calls
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("test backend state is poisoned")
    }
}

impl Debug for TestBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestBackend").finish_non_exhaustive()
    }
}

impl Backend for TestBackend {
    type Error = Error;

    fn fetch_recent(
        &self,
    ) -> impl Future<Output = Result<Vec<ExchangeRecord>, Self::Error>>
    + Send
    + 'static {
        let inner = Arc::clone(&self.inner);
        async move {
            let (result, delay) = {
                let mut inner =
                    inner.lock().expect("test backend state is poisoned");
                inner.fetch_calls += 1;
                (inner.history.clone(), inner.delay)
            };
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            result.map_err(|kind| Error::new("scripted fetch failure", kind))
        }
    }

    fn send_message(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Option<String>, Self::Error>>
    + Send
    + 'static {
        let inner = Arc::clone(&self.inner);
        let text = text.to_owned();
        async move {
            let (step, delay) = {
                let mut inner =
                    inner.lock().expect("test backend state is poisoned");
                inner.sent.push(text);
                (inner.replies.pop_front(), inner.delay)
            };
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            match step {
                Some(ScriptedReply::Reply(reply)) => Ok(Some(reply)),
                Some(ScriptedReply::Accepted) => Ok(None),
                Some(ScriptedReply::Failure(kind)) => {
                    Err(Error::new("scripted send failure", kind))
                }
                None => {
                    Err(Error::new("no scripted replies left", ErrorKind::Other))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn record(id: &str) -> ExchangeRecord {
        ExchangeRecord {
            id: id.to_owned(),
            user_message: "q".to_owned(),
            ai_response: "a".to_owned(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let backend = TestBackend::default();
        backend.push_reply(ScriptedReply::reply("one"));
        backend.push_reply(ScriptedReply::Accepted);
        backend.push_reply(ScriptedReply::Failure(ErrorKind::Transport));

        assert_eq!(
            backend.send_message("a").await.unwrap().as_deref(),
            Some("one")
        );
        assert_eq!(backend.send_message("b").await.unwrap(), None);
        let err = backend.send_message("c").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);

        // Exhausted scripts fail rather than succeed silently.
        let err = backend.send_message("d").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);

        assert_eq!(backend.sent_messages(), ["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_history_and_call_log() {
        let backend = TestBackend::default();
        assert!(backend.fetch_recent().await.unwrap().is_empty());

        backend.set_history([record("1")]);
        let clone = backend.clone();
        assert_eq!(clone.fetch_recent().await.unwrap(), [record("1")]);
        assert_eq!(backend.fetch_calls(), 2);

        backend.fail_fetch(ErrorKind::MalformedResponse);
        let err = clone.fetch_recent().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }
}
