use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use tokio::time::sleep;
use toolloop_model::{
    ErrorKind, ModelMessage, ModelProvider, ModelProviderError, ModelRequest,
    ModelResponse, Role, ToolCall,
};

#[derive(Debug)]
struct FakeModelProviderError(ErrorKind);

impl Display for FakeModelProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeModelProviderError {}

impl ModelProviderError for FakeModelProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Echoes the last user message, or asks for the `echo` tool when the
/// message starts with `!`.
struct FakeModelProvider;

impl ModelProvider for FakeModelProvider {
    type Error = FakeModelProviderError;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static
    {
        let result = 'blk: {
            let Some(last) = req.messages.last() else {
                break 'blk Err(FakeModelProviderError(ErrorKind::Other));
            };
            if last.role != Role::User {
                break 'blk Err(FakeModelProviderError(ErrorKind::Moderated));
            }

            if let Some(command) = last.content.strip_prefix('!') {
                let has_echo_tool = req
                    .tools
                    .iter()
                    .flatten()
                    .any(|tool| tool.name == "echo");
                if has_echo_tool {
                    break 'blk Ok(ModelResponse::with_tool_calls([
                        ToolCall::new(
                            "call_0",
                            "echo",
                            format!(r#"{{"text":"{command}"}}"#),
                        ),
                    ]));
                }
            }

            Ok(ModelResponse::with_content(format!(
                "You said {}",
                last.content
            )))
        };
        async move {
            sleep(Duration::from_millis(1)).await;
            result
        }
    }
}

mod tests {
    use serde_json::json;
    use toolloop_model::ModelTool;

    use super::*;

    #[tokio::test]
    async fn test_completion() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![ModelMessage::new(Role::User, "Good morning")],
            ..Default::default()
        };
        let resp = provider.send_request(&req).await.unwrap();

        assert_eq!(resp.content.as_deref(), Some("You said Good morning"));
        assert!(resp.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn test_tool_call() {
        let provider = FakeModelProvider;
        let mut req = ModelRequest {
            messages: vec![ModelMessage::new(Role::User, "!hello")],
            ..Default::default()
        };

        // Without the tool in the catalog, the model answers in text.
        let resp = provider.send_request(&req).await.unwrap();
        assert!(resp.tool_calls.is_empty());

        req.tools = Some(vec![ModelTool {
            name: "echo".to_owned(),
            description: "Echoes the text".to_owned(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string", "description": "" }
                },
                "required": ["text"]
            }),
        }]);
        let resp = provider.send_request(&req).await.unwrap();
        assert_eq!(resp.content, None);
        assert_eq!(
            resp.tool_calls,
            vec![ToolCall::new("call_0", "echo", r#"{"text":"hello"}"#)]
        );
    }

    #[tokio::test]
    async fn test_error() {
        let provider = FakeModelProvider;
        let req = ModelRequest::default();
        let result = provider.send_request(&req).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
