use toolloop_model::{Role, ToolCall};
use tracing::Instrument;

use super::{Agent, Error};
use crate::tool::ToolCallRequest;
use crate::transcript::Message;

/// Where the conversation loop currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AgentStage {
    /// Waiting for the next user message. Also the stage after a failed
    /// invocation.
    #[default]
    AwaitingUserInput,
    /// A model call is in flight.
    ModelCallPending,
    /// Requested tools are being run.
    ToolResolution,
    /// The last invocation produced a final answer.
    Done,
}

impl Agent {
    pub(super) async fn run(&mut self, input: String) -> Result<String, Error> {
        self.answer_cancelled_tool_calls();
        self.transcript.push(Message::user(input));

        let mut depth = 0;
        let answer = loop {
            self.stage = AgentStage::ModelCallPending;
            let request = self.build_model_request();
            let resp = self.model_client.send_request(request).await?;

            // A missing content is the same as an empty one.
            let content = resp.content.unwrap_or_default();
            let tool_calls = resp.tool_calls;
            if tool_calls.is_empty() {
                let message = Message::assistant(content.clone(), vec![]);
                self.transcript.push(message);
                break content;
            }
            self.transcript
                .push(Message::assistant(content, tool_calls.clone()));

            depth += 1;
            let max_depth = self.config.max_depth;
            if depth > max_depth {
                warn!("tool calls are still requested at depth {depth}");
                // Every call still gets its result message.
                for call in &tool_calls {
                    let content = format!(
                        "Tool '{}' was not run: the limit of {max_depth} \
                         tool rounds was reached.",
                        call.function_name
                    );
                    let message = Message::tool(content, call.id.as_str());
                    self.transcript.push(message);
                }
                return Err(Error::RecursionLimit { max_depth });
            }

            self.stage = AgentStage::ToolResolution;
            let span = debug_span!("tool resolution", depth);
            self.resolve_tool_calls(&tool_calls).instrument(span).await;
        };

        let answer = self.reflect(answer).await?;
        self.stage = AgentStage::Done;
        Ok(answer)
    }

    /// Answers the tool calls an interrupted invocation left without a
    /// result.
    fn answer_cancelled_tool_calls(&mut self) {
        let mut answered = vec![];
        let mut pending = vec![];
        for message in self.transcript.iter().rev() {
            match message.role() {
                Role::Tool => answered.extend(message.tool_call_id()),
                Role::Assistant if !message.tool_calls().is_empty() => {
                    pending = message
                        .tool_calls()
                        .iter()
                        .filter(|call| !answered.contains(&call.id.as_str()))
                        .cloned()
                        .collect();
                    break;
                }
                _ => break,
            }
        }

        for call in pending {
            debug!("tool call {} was cancelled", call.id);
            let content =
                format!("Tool '{}' was cancelled.", call.function_name);
            self.transcript.push(Message::tool(content, call.id));
        }
    }

    /// Runs the tool calls one by one, in the order the model listed
    /// them, appending one tool message per call.
    async fn resolve_tool_calls(&mut self, tool_calls: &[ToolCall]) {
        for call in tool_calls {
            let content = self.resolve_tool_call(call).await;
            self.transcript.push(Message::tool(content, call.id.as_str()));
        }
    }

    async fn resolve_tool_call(&self, call: &ToolCall) -> String {
        let name = call.function_name.as_str();
        let request = match ToolCallRequest::decode(call) {
            Ok(request) => request,
            Err(err) => {
                warn!("malformed arguments for tool {name}: {err}");
                return format!("Invalid arguments for tool '{name}': {err}");
            }
        };

        let Some(tool) = self.tools.lookup(name) else {
            warn!("model requested an unknown tool: {name}");
            return format!("Tool '{name}' not found.");
        };

        match tool.invoke(request.arguments).await {
            Ok(output) => {
                debug!("tool {name} finished ({})", request.id);
                output
            }
            Err(err) => {
                warn!("tool {name} failed: {err}");
                format!("Error executing tool '{name}': {err}")
            }
        }
    }
}
