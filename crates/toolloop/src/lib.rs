//! An out-of-the-box agent that assembles the core loop with built-in tools.
//!
//! Bring your own [`ModelProvider`](toolloop_model::ModelProvider), build a
//! [`Session`] with it, and send messages.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod session;
pub mod tools;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`toolloop_core`] crate.
pub mod core {
    pub use toolloop_core::*;
}

/// Re-exports of [`toolloop_model`] crate.
pub mod model {
    pub use toolloop_model::*;
}
