use colloquy_backend::Backend;

use super::TranscriptStore;
use super::state::{BusyCallback, IdleCallback, MessageCallback};
use crate::backend_client::BackendClient;
use crate::transcript::DisplayMessage;

/// [`TranscriptStore`] builder.
pub struct StoreBuilder {
    pub(crate) backend_client: BackendClient,
    pub(crate) greeting: Option<String>,
    pub(crate) load_recent_on_start: bool,
    pub(crate) on_message: Option<MessageCallback>,
    pub(crate) on_busy_changed: Option<BusyCallback>,
    pub(crate) on_idle: Option<IdleCallback>,
}

impl StoreBuilder {
    /// Creates a new builder with the specified backend.
    #[inline]
    pub fn with_backend<B: Backend + 'static>(backend: B) -> Self {
        Self {
            backend_client: BackendClient::new(backend),
            greeting: None,
            load_recent_on_start: true,
            on_message: None,
            on_busy_changed: None,
            on_idle: None,
        }
    }

    /// Seeds the transcript with a bot greeting before anything else.
    ///
    /// Meant for backends without a history endpoint; a loaded history
    /// is spliced in front of the greeting otherwise.
    #[inline]
    pub fn with_greeting<S: Into<String>>(mut self, text: S) -> Self {
        self.greeting = Some(text.into());
        self
    }

    /// Controls whether the store reads recent exchanges once at
    /// spawn. Enabled by default; turn it off for backends whose wire
    /// contract has no history endpoint.
    #[inline]
    pub fn load_recent_on_start(mut self, load: bool) -> Self {
        self.load_recent_on_start = load;
        self
    }

    /// Attaches a callback invoked for every message that enters the
    /// transcript.
    #[inline]
    pub fn on_message(
        mut self,
        on_message: impl Fn(&DisplayMessage) + Send + Sync + 'static,
    ) -> Self {
        self.on_message = Some(Box::new(on_message));
        self
    }

    /// Attaches a callback invoked whenever the busy flag flips.
    #[inline]
    pub fn on_busy_changed(
        mut self,
        on_busy_changed: impl Fn(bool) + Send + Sync + 'static,
    ) -> Self {
        self.on_busy_changed = Some(Box::new(on_busy_changed));
        self
    }

    /// Attaches a callback invoked when the store settles with nothing
    /// left in the queue.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Builds the store and spawns its owning task.
    #[inline]
    pub fn build(self) -> TranscriptStore {
        TranscriptStore::spawn_from_builder(self)
    }
}
