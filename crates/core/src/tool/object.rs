use std::pin::Pin;

use serde_json::{Map, Value};
use tracing::Instrument;

use super::{Error, Tool, ToolResult};

pub(crate) trait ToolObject: Send + Sync + 'static {
    fn execute(
        &self,
        arguments: Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>>;
}

pub(crate) struct ToolObjectImpl<T: Tool>(pub T);

impl<T: Tool> ToolObject for ToolObjectImpl<T> {
    fn execute(
        &self,
        arguments: Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>> {
        let input: T::Input =
            match serde_json::from_value(Value::Object(arguments)) {
                Ok(input) => input,
                Err(err) => {
                    return Box::pin(std::future::ready(ToolResult::Err(
                        Error::invalid_input().with_cause(err),
                    )));
                }
            };

        let fut = self.0.execute(input);
        Box::pin(
            async move { stringify_output(&fut.await?) }
                .instrument(debug_span!("tool execute")),
        )
    }
}

fn stringify_output<O: serde::Serialize>(output: &O) -> ToolResult {
    let value = serde_json::to_value(output).map_err(|err| {
        Error::execution_error()
            .with_reason("tool output is not serializable")
            .with_cause(err)
    })?;
    Ok(match value {
        Value::String(text) => text,
        value => value.to_string(),
    })
}
