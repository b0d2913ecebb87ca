//! Core logic including the agent loop, the transcript and tool calls.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
mod model_client;
pub mod tool;
pub mod transcript;

pub use agent::{
    Agent, AgentBuilder, AgentConfig, AgentStage, DEFAULT_CRITIQUE_PROMPT,
    DEFAULT_MAX_DEPTH, Error, MAX_REFLECTIONS, ReflectionConfig,
};
pub use model_client::ModelCallError;
