use crate::error::BackendError;
use crate::record::ExchangeRecord;

/// A type that represents a chat backend: one concrete wire contract
/// for reading recent exchanges and submitting a new message.
///
/// Once the backend is created, it should behave like a stateless
/// object. It can still have internal state, but callers should not
/// rely on it, and the backend should be prepared for being dropped
/// anytime. The returned futures must not borrow `self`, so that
/// callers can run them on detached tasks.
pub trait Backend: Send + Sync {
    /// The error type that may be returned by the backend.
    type Error: BackendError;

    /// Reads the recent exchanges, newest window first or last — the
    /// caller does not rely on any particular order.
    fn fetch_recent(
        &self,
    ) -> impl Future<Output = Result<Vec<ExchangeRecord>, Self::Error>>
    + Send
    + 'static;

    /// Submits a user message.
    ///
    /// Resolves to `Some(reply)` when the contract produces an answer
    /// to display, and to `None` when the submission is accepted
    /// without one (a contract with no reply channel).
    fn send_message(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Option<String>, Self::Error>>
    + Send
    + 'static;
}
