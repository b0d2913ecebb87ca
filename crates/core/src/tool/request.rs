use serde_json::{Map, Value};
use toolloop_model::ToolCall;

/// A tool call whose arguments have been decoded into keyword arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolCallRequest {
    /// Correlation id chosen by the model.
    pub id: String,
    /// Name of the requested tool.
    pub function_name: String,
    /// Keyword arguments for the tool.
    pub arguments: Map<String, Value>,
}

impl ToolCallRequest {
    /// Decodes the serialized arguments of a tool call.
    ///
    /// A blank payload means the tool is called without arguments. Any
    /// payload that isn't a JSON object is rejected.
    pub fn decode(call: &ToolCall) -> Result<Self, serde_json::Error> {
        let arguments = if call.arguments.trim().is_empty() {
            Map::new()
        } else {
            serde_json::from_str(&call.arguments)?
        };
        Ok(Self {
            id: call.id.clone(),
            function_name: call.function_name.clone(),
            arguments,
        })
    }
}
