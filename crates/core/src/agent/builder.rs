use std::sync::Arc;

use toolloop_model::ModelProvider;

use super::{Agent, AgentConfig, ReflectionConfig};
use crate::model_client::ModelClient;
use crate::tool::{DefinitionError, Tool, ToolRegistry};

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    config: AgentConfig,
    tools: Arc<ToolRegistry>,
    error: Option<DefinitionError>,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            config: AgentConfig::default(),
            tools: Arc::default(),
            error: None,
        }
    }

    /// Replaces the whole configuration.
    #[inline]
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses the given system prompt instead of the one rendered from the
    /// role and instructions.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Sets how many rounds of tool calls are allowed in one invocation.
    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Enables the self-critique of final answers.
    #[inline]
    pub fn with_reflection(mut self, reflection: ReflectionConfig) -> Self {
        self.config.reflection = Some(reflection);
        self
    }

    /// Registers a tool.
    ///
    /// An ill-formed tool is reported by [`build`](Self::build).
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        if self.error.is_none() {
            // Copies the registry if it's shared with other agents.
            let tools = Arc::make_mut(&mut self.tools);
            self.error = tools.register(tool).err();
        }
        self
    }

    /// Uses a shared registry, replacing the tools registered so far.
    #[inline]
    pub fn with_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tools = registry;
        self
    }

    /// Builds the agent, seeding its transcript with the system message.
    pub fn build(self) -> Result<Agent, DefinitionError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(Agent::from_builder(self.model_client, self.tools, self.config))
    }
}
