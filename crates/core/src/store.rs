mod builder;
mod state;
#[cfg(test)]
mod tests;

use colloquy_actor::Addr;
use tokio::sync::oneshot;

use crate::transcript::DisplayMessage;
pub use builder::StoreBuilder;
use state::{StoreCommand, StoreState};

/// A point-in-time copy of the store's observable state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// The transcript, oldest first.
    pub messages: Vec<DisplayMessage>,
    /// Whether a fetch or send is in flight.
    pub busy: bool,
    /// The current draft text.
    pub draft: String,
}

/// Handle to the transcript store.
///
/// The store owns the transcript, the draft buffer and the busy flag
/// on a dedicated task; this handle only posts commands to it. All
/// command methods are fire-and-forget. Observers either attach
/// callbacks through [`StoreBuilder`] or poll
/// [`snapshot`](TranscriptStore::snapshot).
pub struct TranscriptStore {
    addr: Addr<StoreState>,
}

impl TranscriptStore {
    /// Submits a user message.
    ///
    /// Whitespace-only text is a no-op. While a fetch or send is in
    /// flight the message is queued and submitted on the next return
    /// to idle, preserving submission order.
    pub fn submit_text<S: Into<String>>(&self, text: S) {
        self.addr.send(StoreCommand::SubmitText(text.into())).ok();
    }

    /// Replaces the draft buffer.
    pub fn set_draft<S: Into<String>>(&self, text: S) {
        self.addr.send(StoreCommand::SetDraft(text.into())).ok();
    }

    /// Submits the current draft and clears it.
    ///
    /// A whitespace-only draft is a no-op and stays in the buffer.
    pub fn submit(&self) {
        self.addr.send(StoreCommand::Submit).ok();
    }

    /// Returns a snapshot of the current state, or `None` if the store
    /// has been shut down.
    pub async fn snapshot(&self) -> Option<StoreSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.addr.send(StoreCommand::Inspect(reply_tx)).ok()?;
        reply_rx.await.ok()
    }

    /// Stops the store task.
    ///
    /// In-flight fetches and sends keep running, but their settlements
    /// are discarded instead of mutating torn-down state. Commands
    /// posted after shutdown are dropped silently.
    pub fn shutdown(&self) {
        self.addr.stop();
    }
}

impl TranscriptStore {
    fn spawn_from_builder(builder: StoreBuilder) -> Self {
        let StoreBuilder {
            backend_client,
            greeting,
            load_recent_on_start,
            on_message,
            on_busy_changed,
            on_idle,
        } = builder;

        let state =
            StoreState::new(backend_client, on_message, on_busy_changed, on_idle);
        let addr = Addr::spawn(state, Some("transcript-store"));

        if let Some(text) = greeting {
            addr.send(StoreCommand::Greet(text)).ok();
        }
        if load_recent_on_start {
            addr.send(StoreCommand::LoadRecent).ok();
        }
        Self { addr }
    }
}

impl Clone for TranscriptStore {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            addr: self.addr.clone(),
        }
    }
}
