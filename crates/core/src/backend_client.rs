use std::pin::Pin;
use std::sync::Arc;

use colloquy_backend::{Backend, BackendError, ExchangeRecord};
use tracing::Instrument;

/// A backend failure with its concrete type erased.
pub type BoxedBackendError = Box<dyn BackendError>;

pub type FetchOutcome = Result<Vec<ExchangeRecord>, BoxedBackendError>;
pub type SendOutcome = Result<Option<String>, BoxedBackendError>;

type BoxedFetchFuture = Pin<Box<dyn Future<Output = FetchOutcome> + Send>>;
type BoxedSendFuture = Pin<Box<dyn Future<Output = SendOutcome> + Send>>;
type FetchFn = Arc<dyn Fn() -> BoxedFetchFuture + Send + Sync>;
type SendFn = Arc<dyn Fn(String) -> BoxedSendFuture + Send + Sync>;

/// A wrapper around a backend that provides a type-erased interface
/// for the store, which shouldn't need a generic parameter just to
/// carry its backend around.
#[derive(Clone)]
pub struct BackendClient {
    fetch_fn: FetchFn,
    send_fn: SendFn,
}

impl BackendClient {
    #[inline]
    pub fn new<B: Backend + 'static>(backend: B) -> Self {
        // We have to erase the type `B` here, boxing both the futures
        // and the errors the backend produces.
        let backend = Arc::new(backend);
        let fetch_fn: FetchFn = {
            let backend = Arc::clone(&backend);
            Arc::new(move || {
                let fut = backend.fetch_recent();
                Box::pin(
                    async move {
                        fut.await
                            .map_err(|err| Box::new(err) as BoxedBackendError)
                    }
                    .instrument(trace_span!("backend fetch")),
                )
            })
        };
        let send_fn: SendFn = Arc::new(move |text| {
            let fut = backend.send_message(&text);
            Box::pin(
                async move {
                    fut.await.map_err(|err| Box::new(err) as BoxedBackendError)
                }
                .instrument(trace_span!("backend send")),
            )
        });
        Self { fetch_fn, send_fn }
    }

    /// Starts reading the recent exchanges.
    #[inline]
    pub fn fetch_recent(
        &self,
    ) -> impl Future<Output = FetchOutcome> + Send + 'static {
        (self.fetch_fn)()
    }

    /// Starts submitting a user message.
    #[inline]
    pub fn send_message(
        &self,
        text: String,
    ) -> impl Future<Output = SendOutcome> + Send + 'static {
        (self.send_fn)(text)
    }
}

#[cfg(test)]
mod tests {
    use colloquy_backend::ErrorKind;
    use colloquy_test_backend::{ScriptedReply, TestBackend};

    use super::*;

    #[tokio::test]
    async fn test_erased_send() {
        let backend = TestBackend::default();
        backend.push_reply(ScriptedReply::reply("hello"));
        backend.push_reply(ScriptedReply::Accepted);

        let client = BackendClient::new(backend);
        let reply = client.send_message("hi".to_owned()).await.unwrap();
        assert_eq!(reply.as_deref(), Some("hello"));

        let clone = client.clone();
        let reply = clone.send_message("again".to_owned()).await.unwrap();
        assert_eq!(reply, None);
    }

    #[tokio::test]
    async fn test_erased_errors_keep_their_kind() {
        let backend = TestBackend::default();
        backend.fail_fetch(ErrorKind::Transport);

        let client = BackendClient::new(backend);
        let err = client.fetch_recent().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
