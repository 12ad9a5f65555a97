use std::error::Error as StdError;
use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use colloquy_backend::ExchangeRecord;
use serde::{Deserialize, Serialize};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_message: String,
    pub ai_response: String,
    pub timestamp: DateTime<Utc>,
}

/// The two shapes the history endpoint has been observed to return:
/// a bare array of entries, or the same array under a `messages` key.
/// This enum is the single place where both are accepted.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum HistoryPayload {
    Entries(Vec<LogEntry>),
    Wrapped { messages: Vec<LogEntry> },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ExchangeReply {
    pub response: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExchangeRequest<'a> {
    pub message: &'a str,
}

// --------
// Decoding
// --------

#[derive(Debug)]
pub enum DecodeError {
    /// The body is not valid JSON at all.
    Json(serde_json::Error),
    /// The JSON matches none of the accepted shapes.
    Shape,
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Json(err) => write!(f, "invalid JSON: {err}"),
            DecodeError::Shape => "unexpected payload shape".fmt(f),
        }
    }
}

impl StdError for DecodeError {}

pub fn decode_history(
    body: &[u8],
) -> Result<Vec<ExchangeRecord>, DecodeError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(DecodeError::Json)?;
    let payload: HistoryPayload =
        serde_json::from_value(value).map_err(|_| DecodeError::Shape)?;
    let entries = match payload {
        HistoryPayload::Entries(entries) => entries,
        HistoryPayload::Wrapped { messages } => messages,
    };
    Ok(entries.into_iter().map(into_record).collect())
}

pub fn decode_reply(body: &[u8]) -> Result<String, DecodeError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(DecodeError::Json)?;
    let reply: ExchangeReply =
        serde_json::from_value(value).map_err(|_| DecodeError::Shape)?;
    Ok(reply.response)
}

#[inline]
fn into_record(entry: LogEntry) -> ExchangeRecord {
    ExchangeRecord {
        id: entry.id,
        user_message: entry.user_message,
        ai_response: entry.ai_response,
        timestamp: entry.timestamp,
    }
}
