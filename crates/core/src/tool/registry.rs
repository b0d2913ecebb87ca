use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use toolloop_model::ModelTool;

use super::object::{ToolObject, ToolObjectImpl};
use super::{DefinitionError, Error, Tool, ToolDefinition, ToolResult};

/// A tool that passed registration, together with its definition.
#[derive(Clone)]
pub struct RegisteredTool {
    definition: ToolDefinition,
    object: Arc<dyn ToolObject>,
}

impl RegisteredTool {
    /// Returns the definition of the tool.
    #[inline]
    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    /// Invokes the tool with keyword arguments and returns its output as
    /// text.
    ///
    /// The tool runs on its own task, so a panicking tool produces an
    /// error instead of unwinding into the caller. This must be called
    /// within a Tokio runtime.
    ///
    /// # Cancel safety
    ///
    /// Dropping the returned future aborts the task of the tool.
    pub async fn invoke(&self, arguments: Map<String, Value>) -> ToolResult {
        let name = self.definition.name();
        trace!("invoking a tool ({name}) with args: {arguments:?}");

        let fut = self.object.execute(arguments);
        let mut task = AbortOnDrop(tokio::spawn(fut));
        match (&mut task.0).await {
            Ok(result) => result,
            Err(err) if err.is_panic() => {
                let reason = panic_message(err.into_panic());
                error!("tool {name} panicked: {reason}");
                Err(Error::execution_error()
                    .with_reason(format!("tool panicked: {reason}")))
            }
            Err(err) => Err(Error::execution_error().with_cause(err)),
        }
    }
}

impl Debug for RegisteredTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// A mapping from tool names to tools.
///
/// The registry is built once before a conversation starts and is only
/// read afterwards, so it can be shared between agents behind an `Arc`.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Validates the definition of a tool and adds it to the registry.
    pub fn register<T: Tool>(
        &mut self,
        tool: T,
    ) -> Result<(), DefinitionError> {
        let definition = tool.definition()?;
        let name = definition.name().to_owned();
        if self.tools.contains_key(&name) {
            return Err(DefinitionError::DuplicateTool(name));
        }

        debug!("registered tool: {name}");
        let object = Arc::new(ToolObjectImpl(tool));
        self.tools.insert(name, RegisteredTool { definition, object });
        Ok(())
    }

    /// Looks up a tool by name. Unknown names are not an error.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Returns the number of registered tools.
    #[inline]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tool is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Iterates over the tool definitions, ordered by name.
    #[inline]
    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values().map(RegisteredTool::definition)
    }

    /// Returns the schemas of all tools, ordered by name.
    #[inline]
    pub fn catalog(&self) -> Vec<ModelTool> {
        self.definitions().map(ToolDefinition::to_schema).collect()
    }
}

impl Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.tools.keys()).finish()
    }
}

struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        // No-op if the task has already finished.
        self.0.abort();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_owned();
    }
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(_) => "unknown panic".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;
    use tokio::time::{sleep, timeout};

    use super::*;
    use crate::tool::ErrorKind;

    /// Divide two integers.
    #[derive(Deserialize, JsonSchema)]
    struct DivideInput {
        /// The dividend
        a: i64,
        /// The divisor
        b: i64,
    }

    struct DivideTool;

    impl Tool for DivideTool {
        type Input = DivideInput;
        type Output = i64;

        fn name(&self) -> &str {
            "divide"
        }

        fn execute(
            &self,
            input: Self::Input,
        ) -> impl Future<Output = ToolResult<i64>> + Send + 'static {
            ready(input.a.checked_div(input.b).ok_or_else(|| {
                Error::execution_error().with_reason("division by zero")
            }))
        }
    }

    /// Panics with the given message.
    #[derive(Deserialize, JsonSchema)]
    struct PanicInput {
        message: String,
    }

    struct PanicTool;

    impl Tool for PanicTool {
        type Input = PanicInput;
        type Output = String;

        fn name(&self) -> &str {
            "panic"
        }

        #[allow(clippy::manual_async_fn)]
        fn execute(
            &self,
            input: Self::Input,
        ) -> impl Future<Output = ToolResult<String>> + Send + 'static {
            async move {
                if !input.message.is_empty() {
                    panic!("{}", input.message);
                }
                Ok(input.message)
            }
        }
    }

    fn arguments(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("arguments must be an object"),
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ToolRegistry::default();
        assert!(registry.is_empty());
        registry.register(DivideTool).unwrap();
        registry.register(PanicTool).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("divide").is_some());
        assert!(registry.lookup("multiply").is_none());

        let names: Vec<_> =
            registry.catalog().into_iter().map(|tool| tool.name).collect();
        assert_eq!(names, ["divide", "panic"]);

        let err = registry.register(DivideTool).unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateTool("divide".to_owned()));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_invoke() {
        let mut registry = ToolRegistry::default();
        registry.register(DivideTool).unwrap();
        let tool = registry.lookup("divide").unwrap();

        let output = tool.invoke(arguments(json!({ "a": 7, "b": 2 }))).await;
        assert_eq!(output.unwrap(), "3");

        let err = tool
            .invoke(arguments(json!({ "a": 7, "b": 0 })))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExecutionError);
        assert_eq!(err.reason(), "division by zero");

        let err = tool
            .invoke(arguments(json!({ "a": "seven" })))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    /// Waits for a while, then raises the flag.
    #[derive(Deserialize, JsonSchema)]
    struct SlowInput {
        millis: u64,
    }

    struct SlowTool(Arc<AtomicBool>);

    impl Tool for SlowTool {
        type Input = SlowInput;
        type Output = ();

        fn name(&self) -> &str {
            "slow"
        }

        #[allow(clippy::manual_async_fn)]
        fn execute(
            &self,
            input: Self::Input,
        ) -> impl Future<Output = ToolResult<()>> + Send + 'static {
            let finished = Arc::clone(&self.0);
            async move {
                sleep(Duration::from_millis(input.millis)).await;
                finished.store(true, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_dropped_invocation_aborts_tool() {
        let finished = Arc::new(AtomicBool::new(false));
        let mut registry = ToolRegistry::default();
        registry.register(SlowTool(Arc::clone(&finished))).unwrap();
        let tool = registry.lookup("slow").unwrap();

        let invocation = tool.invoke(arguments(json!({ "millis": 50 })));
        timeout(Duration::from_millis(5), invocation)
            .await
            .unwrap_err();

        sleep(Duration::from_millis(100)).await;
        assert!(!finished.load(Ordering::SeqCst));

        let output = tool.invoke(arguments(json!({ "millis": 1 }))).await;
        assert_eq!(output.unwrap(), "null");
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_invoke_panicking_tool() {
        let mut registry = ToolRegistry::default();
        registry.register(PanicTool).unwrap();
        let tool = registry.lookup("panic").unwrap();

        let err = tool
            .invoke(arguments(json!({ "message": "the tool is broken" })))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExecutionError);
        assert_eq!(err.reason(), "tool panicked: the tool is broken");
    }
}
