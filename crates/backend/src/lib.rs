//! An abstraction layer for chat backends.
//!
//! This crate establishes a unified protocol for the transcript panel
//! to talk to whichever service stores or answers chat messages, so the
//! panel can switch between wire contracts without modifying the store
//! logic.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod contract;
mod error;
mod record;

pub use contract::*;
pub use error::*;
pub use record::*;
