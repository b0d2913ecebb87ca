use serde::{Deserialize, Serialize};
use toolloop_model::{ModelMessage, ModelRequest, Role};

use super::{Agent, Error};
use crate::transcript::Message;

/// The maximum number of self-critique rounds.
pub const MAX_REFLECTIONS: u32 = 3;

/// The default self-critique prompt. `{response}` is replaced with the
/// answer under review.
pub const DEFAULT_CRITIQUE_PROMPT: &str = "Read the response below and \
identify possible mistakes, points of improvement or lack of clarity. \
Then provide a revised and improved version of the response, fixing the \
problems you found.\n\n\
ORIGINAL RESPONSE:\n{response}\n\n\
Your critique and revised version:";

/// Settings of the self-critique stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionConfig {
    /// Number of rounds, clamped to `1..=MAX_REFLECTIONS`.
    pub iterations: u32,
    /// The critique prompt template.
    pub prompt: String,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            iterations: 1,
            prompt: DEFAULT_CRITIQUE_PROMPT.to_owned(),
        }
    }
}

impl ReflectionConfig {
    /// Creates a config running the given number of rounds.
    #[inline]
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations,
            ..Default::default()
        }
    }

    #[inline]
    fn effective_iterations(&self) -> u32 {
        self.iterations.clamp(1, MAX_REFLECTIONS)
    }

    #[inline]
    fn render(&self, response: &str) -> String {
        self.prompt.replace("{response}", response)
    }
}

impl Agent {
    /// Asks the model to critique and revise the answer, if enabled.
    pub(super) async fn reflect(
        &mut self,
        answer: String,
    ) -> Result<String, Error> {
        let Some(reflection) = self.config.reflection.clone() else {
            return Ok(answer);
        };

        let iterations = reflection.effective_iterations();
        let mut answer = answer;
        for i in 1..=iterations {
            debug!("self-critique iteration {i}/{iterations}");
            // The critique sees only the answer, never the transcript.
            let system =
                ModelMessage::new(Role::System, self.system_prompt.as_str());
            let critique =
                ModelMessage::new(Role::User, reflection.render(&answer));
            let request = ModelRequest {
                messages: vec![system, critique],
                tools: None,
                model: self.config.model.clone(),
                temperature: Some(self.config.temperature),
            };
            let resp = self.model_client.send_request(request).await?;
            answer = resp.content.unwrap_or_default();
            let message = Message::assistant(answer.clone(), vec![]);
            self.transcript.push(message);
        }
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterations_are_clamped() {
        let iterations =
            |n| ReflectionConfig::with_iterations(n).effective_iterations();
        assert_eq!(iterations(0), 1);
        assert_eq!(iterations(2), 2);
        assert_eq!(iterations(10), MAX_REFLECTIONS);
    }

    #[test]
    fn test_render() {
        let prompt = ReflectionConfig::default().render("42");
        assert!(prompt.contains("ORIGINAL RESPONSE:\n42\n\n"));
        assert!(!prompt.contains("{response}"));
    }
}
