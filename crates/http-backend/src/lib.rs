//! HTTP backends for the two observed chat wire contracts.
//!
//! [`ReplayBackend`] speaks the history-backed contract (recent
//! exchanges are read back from a log service), [`DirectBackend`] the
//! request/response contract (every send gets a live reply). A
//! deployment configures exactly one of them.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use colloquy_backend::{Backend, BackendError, ErrorKind, ExchangeRecord};
use mime::Mime;
use reqwest::{Client, RequestBuilder, Response, header};

pub use config::{HttpConfig, HttpConfigBuilder};

/// Error type for the HTTP backends.
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Log-replay backend.
///
/// Reads recent exchanges from `GET {base}/api/chat_messages/recent`.
/// The contract has no submission endpoint; sends are accepted locally
/// without a reply.
#[derive(Clone, Debug)]
pub struct ReplayBackend {
    client: Client,
    config: Arc<HttpConfig>,
}

impl ReplayBackend {
    /// Creates a new `ReplayBackend` with the given configuration.
    #[inline]
    pub fn new(config: HttpConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl Backend for ReplayBackend {
    type Error = Error;

    fn fetch_recent(
        &self,
    ) -> impl Future<Output = Result<Vec<ExchangeRecord>, Self::Error>>
    + Send
    + 'static {
        let request = self
            .client
            .get(format!("{}/api/chat_messages/recent", self.config.base_url));
        let resp_fut = apply_timeout(request, &self.config).send();

        async move {
            let resp = match resp_fut.await.and_then(Response::error_for_status)
            {
                Ok(resp) => resp,
                Err(err) => {
                    return Err(Error::new(
                        format!("{err}"),
                        ErrorKind::Transport,
                    ));
                }
            };
            ensure_json_content_type(&resp)?;

            let body = match resp.bytes().await {
                Ok(body) => body,
                Err(err) => {
                    return Err(Error::new(
                        format!("{err}"),
                        ErrorKind::Transport,
                    ));
                }
            };
            match proto::decode_history(&body) {
                Ok(records) => Ok(records),
                // Shape drift is tolerated: the panel shows an empty
                // history rather than failing the initial load.
                Err(proto::DecodeError::Shape) => {
                    warn!("history payload has an unexpected shape");
                    Ok(Vec::new())
                }
                Err(err) => Err(Error::new(
                    format!("{err}"),
                    ErrorKind::MalformedResponse,
                )),
            }
        }
    }

    fn send_message(
        &self,
        _text: &str,
    ) -> impl Future<Output = Result<Option<String>, Self::Error>>
    + Send
    + 'static {
        async move {
            debug!("no submission endpoint in this contract, accepted locally");
            Ok(None)
        }
    }
}

/// Direct-exchange backend.
///
/// Submits messages to `POST {base}/chat` and resolves with the reply.
/// The contract has no history endpoint, so fetches resolve empty.
#[derive(Clone, Debug)]
pub struct DirectBackend {
    client: Client,
    config: Arc<HttpConfig>,
}

impl DirectBackend {
    /// Creates a new `DirectBackend` with the given configuration.
    #[inline]
    pub fn new(config: HttpConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl Backend for DirectBackend {
    type Error = Error;

    fn fetch_recent(
        &self,
    ) -> impl Future<Output = Result<Vec<ExchangeRecord>, Self::Error>>
    + Send
    + 'static {
        async move {
            debug!("no history endpoint in this contract");
            Ok(Vec::new())
        }
    }

    fn send_message(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Option<String>, Self::Error>>
    + Send
    + 'static {
        let request = self
            .client
            .post(format!("{}/chat", self.config.base_url))
            .json(&proto::ExchangeRequest { message: text });
        let resp_fut = apply_timeout(request, &self.config).send();

        async move {
            let resp = match resp_fut.await.and_then(Response::error_for_status)
            {
                Ok(resp) => resp,
                Err(err) => {
                    return Err(Error::new(
                        format!("{err}"),
                        ErrorKind::Transport,
                    ));
                }
            };
            ensure_json_content_type(&resp)?;

            let body = match resp.bytes().await {
                Ok(body) => body,
                Err(err) => {
                    return Err(Error::new(
                        format!("{err}"),
                        ErrorKind::Transport,
                    ));
                }
            };
            match proto::decode_reply(&body) {
                Ok(reply) => Ok(Some(reply)),
                Err(err) => Err(Error::new(
                    format!("{err}"),
                    ErrorKind::MalformedResponse,
                )),
            }
        }
    }
}

#[inline]
fn apply_timeout(request: RequestBuilder, config: &HttpConfig) -> RequestBuilder {
    match config.request_timeout {
        Some(timeout) => request.timeout(timeout),
        None => request,
    }
}

fn ensure_json_content_type(resp: &Response) -> Result<(), Error> {
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let is_json = content_type
        .and_then(|v| v.parse().ok())
        .map(|m: Mime| m.subtype() == mime::JSON)
        .unwrap_or(false);
    if !is_json {
        return Err(Error::new(
            format!("unexpected content type: {content_type:?}"),
            ErrorKind::MalformedResponse,
        ));
    }
    Ok(())
}
