use toolloop_core::tool::DefinitionError;
use toolloop_core::transcript::Transcript;
use toolloop_core::{Agent, AgentBuilder, AgentConfig, Error, ReflectionConfig};
use toolloop_model::ModelProvider;

use crate::tools::*;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let agent_builder = AgentBuilder::with_model_provider(provider);
        Self { agent_builder }
    }

    /// Replaces the configuration of the agent.
    #[inline]
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.agent_builder = self.agent_builder.with_config(config);
        self
    }

    /// Sets the system prompt for the agent.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.agent_builder = self.agent_builder.with_system_prompt(prompt);
        self
    }

    /// Enables the self-critique of final answers.
    #[inline]
    pub fn with_reflection(mut self, reflection: ReflectionConfig) -> Self {
        self.agent_builder = self.agent_builder.with_reflection(reflection);
        self
    }

    /// Builds a new session with the built-in tools.
    pub fn build(self) -> Result<Session, DefinitionError> {
        let agent = self.agent_builder.with_tool(PowerTool).build()?;
        debug!("session ready with {} tools", agent.tools().len());
        Ok(Session { agent })
    }
}

/// A chat session, like a window that displays messages and has a input box.
///
/// The session holds a fully configured agent that you can use directly, and
/// it is basically a wrapper around [`Agent`].
pub struct Session {
    agent: Agent,
}

impl Session {
    /// Sends a message to the session and waits for the answer.
    #[inline]
    pub async fn send_message(
        &mut self,
        message: &str,
    ) -> Result<String, Error> {
        self.agent.invoke(message).await
    }

    /// Returns the messages exchanged so far.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        self.agent.transcript()
    }

    /// Returns the underlying agent.
    #[inline]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Starts the conversation over.
    #[inline]
    pub fn reset(&mut self) {
        self.agent.reset();
    }
}
