use serde::{Deserialize, Serialize};

use super::ReflectionConfig;

/// The default number of tool-calling rounds in one invocation.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Settings of an [`Agent`](super::Agent).
///
/// Missing fields take their default values when deserialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Name of the agent, used in logs.
    pub name: String,
    /// The role the agent plays, rendered into the default system prompt.
    pub role: String,
    /// What the agent has to do, rendered into the default system prompt.
    pub instructions: String,
    /// A system prompt replacing the default one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// The model to request, if the provider serves more than one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// How many rounds of tool calls are allowed in one invocation.
    pub max_depth: usize,
    /// Enables the self-critique of final answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflection: Option<ReflectionConfig>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "AI Agent".to_owned(),
            role: "Personal Assistant".to_owned(),
            instructions: "Help users with any question".to_owned(),
            system_prompt: None,
            model: None,
            temperature: 0.0,
            max_depth: DEFAULT_MAX_DEPTH,
            reflection: None,
        }
    }
}

impl AgentConfig {
    /// Returns the system prompt that seeds the transcript.
    pub fn render_system_prompt(&self) -> String {
        match &self.system_prompt {
            Some(prompt) => prompt.clone(),
            None => format!(
                "You're an AI Agent, your role is {}, and you need to {}",
                self.role, self.instructions
            ),
        }
    }
}
