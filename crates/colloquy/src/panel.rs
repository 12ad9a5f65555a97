use colloquy_backend::Backend;
use colloquy_core::transcript::DisplayMessage;
use colloquy_core::{StoreBuilder, StoreSnapshot, TranscriptStore};

/// A panel builder.
///
/// See [`Panel`].
pub struct PanelBuilder {
    store_builder: StoreBuilder,
}

impl PanelBuilder {
    /// Creates a panel builder with the specified backend.
    pub fn with_backend<B: Backend + 'static>(backend: B) -> Self {
        let store_builder = StoreBuilder::with_backend(backend);
        Self { store_builder }
    }

    /// Seeds the transcript with a bot greeting.
    #[inline]
    pub fn with_greeting<S: Into<String>>(mut self, text: S) -> Self {
        self.store_builder = self.store_builder.with_greeting(text);
        self
    }

    /// Controls whether the panel loads recent exchanges on startup.
    /// Turn this off for backends without a history endpoint.
    #[inline]
    pub fn load_recent_on_start(mut self, load: bool) -> Self {
        self.store_builder = self.store_builder.load_recent_on_start(load);
        self
    }

    /// Attaches a callback invoked for every message that enters the
    /// transcript.
    #[inline]
    pub fn on_message(
        mut self,
        on_message: impl Fn(&DisplayMessage) + Send + Sync + 'static,
    ) -> Self {
        self.store_builder = self.store_builder.on_message(on_message);
        self
    }

    /// Attaches a callback invoked whenever the busy flag flips.
    #[inline]
    pub fn on_busy_changed(
        mut self,
        on_busy_changed: impl Fn(bool) + Send + Sync + 'static,
    ) -> Self {
        self.store_builder = self.store_builder.on_busy_changed(on_busy_changed);
        self
    }

    /// Attaches a callback invoked when the panel becomes idle.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.store_builder = self.store_builder.on_idle(on_idle);
        self
    }

    /// Builds a new panel.
    pub fn build(self) -> Panel {
        Panel {
            store: self.store_builder.build(),
        }
    }
}

/// A chat panel: a transcript on top, an input box at the bottom.
///
/// The panel holds a fully wired transcript store that you can drive
/// directly, and it is basically a thin wrapper around
/// [`TranscriptStore`].
pub struct Panel {
    store: TranscriptStore,
}

impl Panel {
    /// Submits a message to the panel.
    #[inline]
    pub fn send_message(&self, message: &str) {
        self.store.submit_text(message);
    }

    /// Replaces the panel's draft buffer.
    #[inline]
    pub fn set_draft(&self, text: &str) {
        self.store.set_draft(text);
    }

    /// Submits the current draft.
    #[inline]
    pub fn submit_draft(&self) {
        self.store.submit();
    }

    /// Returns a snapshot of the panel state, or `None` after
    /// [`Panel::close`].
    #[inline]
    pub async fn snapshot(&self) -> Option<StoreSnapshot> {
        self.store.snapshot().await
    }

    /// Tears the panel down. In-flight requests are abandoned; their
    /// results never reach the transcript.
    #[inline]
    pub fn close(&self) {
        self.store.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use colloquy_test_backend::{ScriptedReply, TestBackend};

    use super::*;

    #[tokio::test]
    async fn test_panel_round_trip() {
        let backend = TestBackend::default();
        backend.push_reply(ScriptedReply::reply("of course"));

        let panel = PanelBuilder::with_backend(backend)
            .load_recent_on_start(false)
            .with_greeting("Hello! how can I help you today?")
            .build();

        panel.set_draft("are you there?");
        panel.submit_draft();

        // Poll until the send settles; each snapshot round-trips
        // through the store task, so this cannot starve it.
        let mut snapshot = panel.snapshot().await.unwrap();
        while snapshot.busy {
            snapshot = panel.snapshot().await.unwrap();
        }

        let texts: Vec<_> = snapshot
            .messages
            .iter()
            .map(|msg| msg.text.as_str())
            .collect();
        assert_eq!(
            texts,
            ["Hello! how can I help you today?", "are you there?", "of course"]
        );
    }
}
