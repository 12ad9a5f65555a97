use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored user-message/assistant-reply pair, as decoded from the
/// history endpoint.
///
/// Records are immutable once fetched; the transcript layer expands
/// each one into its pair of display messages.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExchangeRecord {
    /// The storage identifier of the exchange.
    pub id: String,
    /// What the user asked.
    pub user_message: String,
    /// What the assistant answered.
    pub ai_response: String,
    /// When the exchange was recorded.
    pub timestamp: DateTime<Utc>,
}
