//! Core logic of the chat transcript panel: the pure transcript
//! builder, and the store actor that owns the panel state.
//!
//! The store is the single point of mutation. Fetch and send tasks
//! never touch state themselves; they post settlement messages back to
//! the owning actor, so every transition is one scheduler turn and the
//! busy flag can never be left dangling by a lost callback.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod backend_client;
mod store;
pub mod transcript;

pub use store::{StoreBuilder, StoreSnapshot, TranscriptStore};
