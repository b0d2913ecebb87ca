use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use toolloop_model::ModelTool;

/// An error returned when a tool cannot be registered.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// The tool has no description.
    #[error("tool `{tool}` has no description")]
    MissingDescription {
        /// Name of the tool.
        tool: String,
    },
    /// A parameter of the tool doesn't declare its type.
    #[error("parameter `{parameter}` of tool `{tool}` has no declared type")]
    MissingTypeAnnotation {
        /// Name of the tool.
        tool: String,
        /// Name of the parameter.
        parameter: String,
    },
    /// Another tool with the same name has been registered.
    #[error("tool `{0}` is already registered")]
    DuplicateTool(String),
}

/// The primitive JSON type of a tool parameter.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    /// A string, also used for every type that isn't primitive.
    String,
    /// An integer number.
    Integer,
    /// A floating point number.
    Number,
    /// A boolean.
    Boolean,
}

impl JsonType {
    /// Maps a JSON schema type name to a primitive type, falling back to
    /// [`JsonType::String`] for anything else.
    pub fn from_schema_type(name: &str) -> Self {
        match name {
            "integer" => JsonType::Integer,
            "number" => JsonType::Number,
            "boolean" => JsonType::Boolean,
            _ => JsonType::String,
        }
    }

    /// Returns the JSON schema type name.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::Boolean => "boolean",
        }
    }
}

/// Describes one parameter of a tool.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParameterSpec {
    /// Name of the parameter.
    pub name: String,
    /// Type of the parameter.
    pub json_type: JsonType,
    /// What the parameter means, may be empty.
    pub description: String,
    /// Whether the model must provide the parameter.
    pub required: bool,
}

impl ParameterSpec {
    /// Creates a required parameter without description.
    #[inline]
    pub fn new<S: Into<String>>(name: S, json_type: JsonType) -> Self {
        Self {
            name: name.into(),
            json_type,
            description: String::new(),
            required: true,
        }
    }

    /// Sets the description.
    #[inline]
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the parameter as optional.
    #[inline]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// The name, description and parameters of a tool.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolDefinition {
    name: String,
    description: String,
    parameters: Vec<ParameterSpec>,
}

impl ToolDefinition {
    /// Creates a builder for a tool described by hand.
    #[inline]
    pub fn builder<S: Into<String>>(name: S) -> ToolDefinitionBuilder {
        ToolDefinitionBuilder {
            name: name.into(),
            description: None,
            parameters: vec![],
        }
    }

    /// Derives a definition from the JSON schema of an input type.
    ///
    /// `description` takes precedence over the doc comment of the type.
    pub fn from_input<I: JsonSchema>(
        name: &str,
        description: Option<&str>,
    ) -> Result<Self, DefinitionError> {
        let schema = schema_for!(I).to_value();
        Self::from_schema(name, description, &schema)
    }

    /// Derives a definition from an object schema.
    pub fn from_schema(
        name: &str,
        description: Option<&str>,
        schema: &Value,
    ) -> Result<Self, DefinitionError> {
        let mut builder = Self::builder(name);
        let description = description
            .or_else(|| schema.get("description").and_then(Value::as_str));
        if let Some(description) = description {
            builder = builder.description(description);
        }

        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let properties = schema.get("properties").and_then(Value::as_object);
        for (param, prop) in properties.into_iter().flatten() {
            let Some(json_type) = declared_type(prop) else {
                return Err(DefinitionError::MissingTypeAnnotation {
                    tool: name.to_owned(),
                    parameter: param.clone(),
                });
            };
            let mut spec = ParameterSpec::new(param.as_str(), json_type);
            if let Some(description) =
                prop.get("description").and_then(Value::as_str)
            {
                spec = spec.with_description(description);
            }
            if !required.contains(&param.as_str()) {
                spec = spec.optional();
            }
            builder = builder.parameter(spec);
        }

        builder.build()
    }

    /// Returns the name of the tool.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the one-line description of the tool.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the parameters in declaration order.
    #[inline]
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Makes the schema the model uses to decide when and how to call
    /// this tool.
    pub fn to_schema(&self) -> ModelTool {
        let mut properties = Map::with_capacity(self.parameters.len());
        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.json_type.as_str(),
                    "description": param.description,
                }),
            );
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|param| param.required)
            .map(|param| param.name.as_str())
            .collect();

        ModelTool {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

/// [`ToolDefinition`] builder.
#[derive(Clone, Debug)]
pub struct ToolDefinitionBuilder {
    name: String,
    description: Option<String>,
    parameters: Vec<ParameterSpec>,
}

impl ToolDefinitionBuilder {
    /// Sets the description. Only its first non-blank line is kept.
    #[inline]
    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a parameter.
    #[inline]
    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Builds the definition.
    pub fn build(self) -> Result<ToolDefinition, DefinitionError> {
        let description = self.description.as_deref().and_then(|text| {
            text.lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_owned)
        });
        let Some(description) = description else {
            return Err(DefinitionError::MissingDescription { tool: self.name });
        };

        Ok(ToolDefinition {
            name: self.name,
            description,
            parameters: self.parameters,
        })
    }
}

fn declared_type(prop: &Value) -> Option<JsonType> {
    let prop = prop.as_object()?;
    match prop.get("type") {
        Some(Value::String(name)) => Some(JsonType::from_schema_type(name)),
        // Nullable types, like `["number", "null"]` for `Option<f64>`.
        Some(Value::Array(names)) => Some(
            names
                .iter()
                .filter_map(Value::as_str)
                .find(|name| *name != "null")
                .map_or(JsonType::String, JsonType::from_schema_type),
        ),
        Some(_) => Some(JsonType::String),
        None => ["$ref", "anyOf", "oneOf", "allOf", "enum", "const"]
            .iter()
            .any(|key| prop.contains_key(*key))
            .then_some(JsonType::String),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Calculate the power of a base number raised to an exponent.
    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct PowerInput {
        /// The base number
        base: f64,
        /// The exponent to raise the base to
        exponent: f64,
    }

    /// Search for files.
    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct SearchInput {
        pattern: String,
        limit: Option<u32>,
        case_sensitive: bool,
        paths: Vec<String>,
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct UndocumentedInput {
        text: String,
    }

    /// Store anything.
    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct UntypedInput {
        key: String,
        value: Value,
    }

    #[test]
    fn test_from_input() {
        let def = ToolDefinition::from_input::<PowerInput>("power", None)
            .unwrap();
        assert_eq!(def.name(), "power");
        assert_eq!(
            def.description(),
            "Calculate the power of a base number raised to an exponent."
        );
        assert_eq!(
            def.parameters(),
            [
                ParameterSpec::new("base", JsonType::Number)
                    .with_description("The base number"),
                ParameterSpec::new("exponent", JsonType::Number)
                    .with_description("The exponent to raise the base to"),
            ]
        );
    }

    #[test]
    fn test_type_mapping() {
        let def = ToolDefinition::from_input::<SearchInput>("search", None)
            .unwrap();
        let params: Vec<_> = def
            .parameters()
            .iter()
            .map(|p| (p.name.as_str(), p.json_type, p.required))
            .collect();
        assert_eq!(
            params,
            [
                ("pattern", JsonType::String, true),
                ("limit", JsonType::Integer, false),
                ("case_sensitive", JsonType::Boolean, true),
                ("paths", JsonType::String, true),
            ]
        );
    }

    #[test]
    fn test_ill_formed_inputs() {
        let err =
            ToolDefinition::from_input::<UndocumentedInput>("echo", None)
                .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::MissingDescription {
                tool: "echo".to_owned()
            }
        );

        // An explicit description makes the same input acceptable.
        let def = ToolDefinition::from_input::<UndocumentedInput>(
            "echo",
            Some("\n  Echo the text back.\n  Used for testing."),
        )
        .unwrap();
        assert_eq!(def.description(), "Echo the text back.");

        let err = ToolDefinition::from_input::<UntypedInput>("store", None)
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::MissingTypeAnnotation {
                tool: "store".to_owned(),
                parameter: "value".to_owned(),
            }
        );
    }

    #[test]
    fn test_to_schema() {
        let def = ToolDefinition::builder("greet")
            .description("Greet someone.")
            .parameter(
                ParameterSpec::new("name", JsonType::String)
                    .with_description("Who to greet"),
            )
            .parameter(
                ParameterSpec::new("times", JsonType::Integer).optional(),
            )
            .build()
            .unwrap();

        let schema = def.to_schema();
        assert_eq!(schema.name, "greet");
        assert_eq!(schema.description, "Greet someone.");
        assert_eq!(
            schema.parameters,
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Who to greet" },
                    "times": { "type": "integer", "description": "" }
                },
                "required": ["name"]
            })
        );
    }

    #[test]
    fn test_blank_description() {
        let err = ToolDefinition::builder("noop")
            .description("  \n ")
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::MissingDescription { .. }));
    }
}
