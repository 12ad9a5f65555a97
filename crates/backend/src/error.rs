use std::error::Error;

/// The kind of failure a backend reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request never produced a usable response (connection,
    /// timeout, non-success status).
    Transport,
    /// A response arrived but its body did not match the wire contract.
    MalformedResponse,
    /// Any other errors.
    Other,
}

/// The error type for a chat backend.
pub trait BackendError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}
