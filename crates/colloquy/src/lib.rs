//! An out-of-the-box chat transcript panel that wires the store to the
//! HTTP wire contracts.
//!
//! The crate includes a terminal demo for trying a deployment out. And
//! you can also use it as a library to embed the panel in your own
//! host apps.

#![deny(missing_docs)]

mod panel;

pub use panel::{Panel, PanelBuilder};

/// Re-exports of [`colloquy_core`] crate.
pub mod core {
    pub use colloquy_core::*;
}

/// Re-exports of [`colloquy_backend`] crate.
pub mod backend {
    pub use colloquy_backend::*;
}
