use schemars::JsonSchema;
use serde::Deserialize;
use toolloop_core::tool::{Error as ToolError, Tool, ToolResult};

/// Calculate the power of a base number raised to an exponent.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PowerToolParameters {
    /// The base number
    pub base: f64,
    /// The exponent to raise the base to
    pub exponent: f64,
}

/// A tool for raising a number to a power.
#[derive(Clone, Copy, Debug, Default)]
pub struct PowerTool;

impl Tool for PowerTool {
    type Input = PowerToolParameters;
    type Output = f64;

    fn name(&self) -> &str {
        "power"
    }

    fn execute(
        &self,
        input: PowerToolParameters,
    ) -> impl Future<Output = ToolResult<f64>> + Send + 'static {
        let PowerToolParameters { base, exponent } = input;
        let result = base.powf(exponent);
        std::future::ready(if result.is_finite() {
            Ok(result)
        } else {
            Err(ToolError::execution_error().with_reason(format!(
                "{base} raised to {exponent} is not a finite number"
            )))
        })
    }
}
