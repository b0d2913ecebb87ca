//! Tool call supports.

mod definition;
mod error;
mod object;
mod registry;
mod request;

use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use definition::{
    DefinitionError, JsonType, ParameterSpec, ToolDefinition,
    ToolDefinitionBuilder,
};
pub use error::{Error, ErrorKind};
pub use registry::{RegisteredTool, ToolRegistry};
pub use request::ToolCallRequest;

/// The result of a tool call.
pub type ToolResult<T = String> = Result<T, Error>;

/// A tool that can be called by the model.
///
/// Implementations of this trait should be stateless, and may not maintain any
/// internal state.
///
/// The parameters of a tool are described by its `Input` type. The JSON
/// schema generated for that type becomes the tool's definition: the first
/// line of the type's doc comment is the tool description, and each field
/// becomes a parameter. Fields must have a concrete type (a field typed as
/// an arbitrary JSON value is rejected), and `Option` fields are optional.
///
/// The tool can be context-aware, meaning it can access additional information
/// about the current execution context, such as the working directory or the
/// current user. To do this, make the context an immutable state of the tool,
/// which can be set during initialization, and copy it when executing.
pub trait Tool: Send + Sync + 'static {
    /// The type of input that the tool accepts.
    type Input: DeserializeOwned + JsonSchema;

    /// The type of value the tool produces.
    ///
    /// Strings are passed to the model verbatim, other values are passed
    /// in their JSON form.
    type Output: Serialize + Send + 'static;

    /// Returns the name of the tool.
    fn name(&self) -> &str;

    /// Returns a description overriding the one documented on `Input`.
    #[inline]
    fn description(&self) -> Option<&str> {
        None
    }

    /// Returns the definition advertised to the model.
    ///
    /// The default implementation derives it from the schema of `Input`.
    fn definition(&self) -> Result<ToolDefinition, DefinitionError> {
        ToolDefinition::from_input::<Self::Input>(
            self.name(),
            self.description(),
        )
    }

    /// Executes the tool with the given input.
    ///
    /// This method must return a future that is fully independent of `self`,
    /// and the future should be cancellation safe.
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult<Self::Output>> + Send + 'static;
}
