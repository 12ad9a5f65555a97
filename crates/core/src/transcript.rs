//! Transcript types and the pure builder that derives a transcript
//! from exchange records.

use chrono::{DateTime, Utc};
use colloquy_backend::ExchangeRecord;
use serde::Serialize;

/// The fixed text shown in place of a reply when a send fails.
pub const SEND_FAILURE_TEXT: &str =
    "Failed to get response. Please try again.";

/// Who a display message is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing into the panel.
    User,
    /// The assistant on the other end.
    Bot,
}

impl Sender {
    #[inline]
    fn id_suffix(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// One renderable line in the transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayMessage {
    /// Identifier of the message, unique within the transcript.
    ///
    /// Messages come in pairs sharing a base id with a sender-specific
    /// suffix (`<base>_user` / `<base>_bot`), so a message can always
    /// be traced back to the exchange it came from.
    pub id: String,
    /// The message text.
    pub text: String,
    /// Who said it.
    pub sender: Sender,
    /// When the exchange was recorded. `None` for messages originated
    /// locally in this session; they represent "now" and always sit at
    /// the transcript's tail.
    pub timestamp: Option<DateTime<Utc>>,
}

impl DisplayMessage {
    #[inline]
    pub(crate) fn paired(
        base: &str,
        sender: Sender,
        text: String,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: format!("{base}_{}", sender.id_suffix()),
            text,
            sender,
            timestamp,
        }
    }
}

/// Expands exchange records into display messages and orders them.
///
/// Each record yields its user message immediately followed by the bot
/// reply, both stamped with the record's timestamp. The flattened list
/// is then stable-sorted by timestamp, so records from an out-of-order
/// source (the history endpoint serves newest first) line up
/// chronologically while every pair keeps user before bot.
///
/// This is a pure function: same records in, byte-identical transcript
/// out.
pub fn build_transcript(records: &[ExchangeRecord]) -> Vec<DisplayMessage> {
    let mut messages: Vec<_> = records
        .iter()
        .flat_map(|record| {
            [
                DisplayMessage::paired(
                    &record.id,
                    Sender::User,
                    record.user_message.clone(),
                    Some(record.timestamp),
                ),
                DisplayMessage::paired(
                    &record.id,
                    Sender::Bot,
                    record.ai_response.clone(),
                    Some(record.timestamp),
                ),
            ]
        })
        .collect();
    messages.sort_by_key(|msg| msg.timestamp);
    messages
}
