mod builder;
mod config;
mod reflection;
mod state;

use std::sync::Arc;

use toolloop_model::ModelRequest;
use tracing::Instrument;

use crate::model_client::{ModelCallError, ModelClient};
use crate::tool::ToolRegistry;
use crate::transcript::Transcript;
pub use builder::AgentBuilder;
pub use config::{AgentConfig, DEFAULT_MAX_DEPTH};
pub use reflection::{
    DEFAULT_CRITIQUE_PROMPT, MAX_REFLECTIONS, ReflectionConfig,
};
pub use state::AgentStage;

/// An error that fails a whole [`Agent::invoke`] call.
///
/// Failures of individual tool calls never show up here. They are
/// reported to the model as tool messages instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model backend failed. The call is not retried.
    #[error(transparent)]
    ModelCall(#[from] ModelCallError),
    /// The model kept requesting tools beyond the configured depth.
    #[error("model still requests tools after {max_depth} rounds")]
    RecursionLimit {
        /// The configured maximum depth.
        max_depth: usize,
    },
}

/// An agent instance, which maintains a transcript, a model client and a
/// tool registry.
///
/// Each call to [`invoke`](Agent::invoke) runs the conversation loop to
/// completion: the model is called, requested tools are run one after
/// another, and the model is called again with their results, until it
/// answers without requesting tools.
pub struct Agent {
    model_client: ModelClient,
    tools: Arc<ToolRegistry>,
    transcript: Transcript,
    config: AgentConfig,
    system_prompt: String,
    stage: AgentStage,
}

impl Agent {
    /// Sends a user message and returns the final answer of the model.
    ///
    /// # Cancel safety
    ///
    /// Dropping the future stops the loop and aborts the tool that is
    /// running, if any. Messages appended before that point stay in the
    /// transcript, and tool calls left without a result are answered as
    /// cancelled on the next invocation.
    pub async fn invoke<S: Into<String>>(
        &mut self,
        user_message: S,
    ) -> Result<String, Error> {
        let span = info_span!("agent invoke", agent = %self.config.name);
        let result = self.run(user_message.into()).instrument(span).await;
        if let Err(err) = &result {
            error!("agent invocation failed: {err}");
            self.stage = AgentStage::AwaitingUserInput;
        }
        result
    }

    /// Returns the transcript of the conversation.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the current stage of the conversation loop.
    #[inline]
    pub fn stage(&self) -> AgentStage {
        self.stage
    }

    /// Returns the configuration of the agent.
    #[inline]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Returns the tool registry, which can be shared with other agents.
    #[inline]
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    /// Clears the conversation, keeping only the system message.
    pub fn reset(&mut self) {
        self.transcript.restart(&self.system_prompt);
        self.stage = AgentStage::AwaitingUserInput;
    }
}

impl Agent {
    fn from_builder(
        model_client: ModelClient,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        let system_prompt = config.render_system_prompt();
        let mut transcript = Transcript::default();
        transcript.restart(&system_prompt);
        Self {
            model_client,
            tools,
            transcript,
            config,
            system_prompt,
            stage: AgentStage::default(),
        }
    }

    fn build_model_request(&self) -> ModelRequest {
        ModelRequest {
            messages: self.transcript.to_model_messages(),
            tools: (!self.tools.is_empty()).then(|| self.tools.catalog()),
            model: self.config.model.clone(),
            temperature: Some(self.config.temperature),
        }
    }
}
