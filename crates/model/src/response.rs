use serde::{Deserialize, Serialize};

/// The message a model proposes in response to a request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The text of the message, if the model produced any.
    #[serde(default)]
    pub content: Option<String>,
    /// Tool calls requested by the model, in the order they were proposed.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl ModelResponse {
    /// Creates a response carrying only text.
    #[inline]
    pub fn with_content<S: Into<String>>(content: S) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: vec![],
        }
    }

    /// Creates a response carrying only tool calls.
    #[inline]
    pub fn with_tool_calls(tool_calls: impl Into<Vec<ToolCall>>) -> Self {
        Self {
            content: None,
            tool_calls: tool_calls.into(),
        }
    }
}

/// Describes a tool call request from the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCall {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The name of the tool to call.
    pub function_name: String,
    /// The arguments to pass to the function, serialized as a JSON object.
    pub arguments: String,
}

impl ToolCall {
    /// Creates a tool call request.
    #[inline]
    pub fn new<I, N, A>(id: I, function_name: N, arguments: A) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        Self {
            id: id.into(),
            function_name: function_name.into(),
            arguments: arguments.into(),
        }
    }
}
