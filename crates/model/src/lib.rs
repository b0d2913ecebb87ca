//! An abstraction layer for different LLMs.
//!
//! This crate establishes an unified protocol for the agent to interact
//! with a language model backend, so that the agent can switch between
//! backends without modifying the core codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to. A backend receives
//! the projected transcript and the tool catalog, and proposes the next
//! assistant message, which may carry tool call requests.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;
mod role;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
pub use role::*;
