use serde::{Deserialize, Serialize};
use toolloop_model::{ModelResponse, ToolCall};

/// The preset response for an assistant step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Text of the proposed message.
    pub content: Option<String>,
    /// Tool calls in the proposed message.
    pub tool_calls: Vec<ToolCall>,
    /// If set, the request fails with this message instead.
    pub failure: Option<String>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with a text message.
    #[inline]
    pub fn with_content<S: Into<String>>(content: S) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: vec![],
            failure: None,
        }
    }

    /// Creates a `PresetResponse` with the specified tool calls.
    #[inline]
    pub fn with_tool_calls(tool_calls: impl Into<Vec<ToolCall>>) -> Self {
        Self {
            content: None,
            tool_calls: tool_calls.into(),
            failure: None,
        }
    }

    /// Creates a `PresetResponse` that always fails.
    #[inline]
    pub fn with_failure<S: Into<String>>(message: S) -> Self {
        Self {
            content: None,
            tool_calls: vec![],
            failure: Some(message.into()),
        }
    }

    pub(crate) fn to_response(&self) -> ModelResponse {
        ModelResponse {
            content: self.content.clone(),
            tool_calls: self.tool_calls.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let response = PresetResponse::with_tool_calls([ToolCall::new(
            "1",
            "write_file",
            r#"{"filename":"message.txt","content":"Hello, world!"}"#,
        )]);

        let serialized = serde_json::to_string(&response).unwrap();
        let deserialized: PresetResponse =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(response, deserialized);
    }
}
