//! Tool abstractions: the [`Tool`] trait, its declarative [`ToolSpec`], the
//! ordered [`ToolRegistry`] and the never-failing [`Dispatcher`].
//!
//! A tool declares its parameters once as [`ParameterSpec`]s. The same
//! declaration renders the JSON schema sent to the model and drives argument
//! validation in the dispatcher, so the two cannot drift apart.
//!
//! ```rust,ignore
//! use tabula::tool::{Dispatcher, ToolRegistry};
//! use tabula::tools::database_registry;
//!
//! let dispatcher = Dispatcher::new(database_registry(), store);
//! let result = dispatcher.dispatch("list_tables", &json!({})).await;
//! assert_eq!(result["success"], true);
//! ```

mod arguments;
mod dispatch;
mod registry;

pub use arguments::validate_arguments;
pub use dispatch::Dispatcher;
pub use registry::ToolRegistry;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

pub use crate::error::ToolError;
use crate::store::DataStore;

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// JSON string.
    String,
    /// Whole number.
    Integer,
    /// Any JSON number.
    Number,
    /// `true` or `false`.
    Boolean,
}

impl ParamType {
    /// JSON-schema type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Article-prefixed name for error messages.
    const fn described(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
        }
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name.
    pub name: String,
    /// Expected JSON type.
    #[serde(rename = "type")]
    pub kind: ParamType,
    /// Description shown to the model.
    pub description: String,
    /// Whether the caller must supply it.
    pub required: bool,
    /// Value used when an optional parameter is omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Inclusive lower bound for integers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    /// Inclusive upper bound for integers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
}

impl ParameterSpec {
    /// Create an optional parameter of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
            default: None,
            minimum: None,
            maximum: None,
        }
    }

    /// Create a string parameter.
    #[must_use]
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::String, description)
    }

    /// Create an integer parameter.
    #[must_use]
    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Integer, description)
    }

    /// Create a boolean parameter.
    #[must_use]
    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Boolean, description)
    }

    /// Mark the parameter as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the value used when the parameter is omitted.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Bound an integer parameter to `min..=max`.
    #[must_use]
    pub const fn with_range(mut self, min: i64, max: i64) -> Self {
        self.minimum = Some(min);
        self.maximum = Some(max);
        self
    }

    fn schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), json!(self.kind.as_str()));
        schema.insert("description".into(), json!(self.description));
        if let Some(default) = &self.default {
            schema.insert("default".into(), default.clone());
        }
        if let Some(min) = self.minimum {
            schema.insert("minimum".into(), json!(min));
        }
        if let Some(max) = self.maximum {
            schema.insert("maximum".into(), json!(max));
        }
        Value::Object(schema)
    }
}

/// Name, description and parameters of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique function name.
    pub name: String,
    /// Description shown to the model.
    pub description: String,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterSpec>,
}

impl ToolSpec {
    /// Look up a parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// JSON schema of the parameter object.
    #[must_use]
    pub fn parameters_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Render the definition sent to the model.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A function definition in the OpenAI function-calling form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Function name.
    pub name: String,
    /// Function description.
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

impl ToolDefinition {
    /// Wrap as `{"type": "function", "function": {...}}`.
    #[must_use]
    pub fn to_openai(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// A function the model may call against the data store.
///
/// Implementors declare their arguments and output as serde types. Arguments
/// reach [`call`](Tool::call) already validated against
/// [`parameters`](Tool::parameters) with defaults filled in.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique function name.
    const NAME: &'static str;

    /// Typed arguments.
    type Args: DeserializeOwned + Send;

    /// Output, merged into the `{"success": true, ...}` result.
    type Output: Serialize;

    /// Error type, converted into [`ToolError`].
    type Error: Into<ToolError>;

    /// Description shown to the model.
    fn description(&self) -> String;

    /// Declared parameters in order.
    fn parameters(&self) -> Vec<ParameterSpec> {
        Vec::new()
    }

    /// Execute against `store`.
    async fn call(&self, store: &DataStore, args: Self::Args) -> Result<Self::Output, Self::Error>;
}

/// Object-safe form of [`Tool`] used by the registry.
#[async_trait]
pub trait ToolDyn: Send + Sync {
    /// Function name.
    fn name(&self) -> &'static str;

    /// Declarative spec.
    fn spec(&self) -> ToolSpec;

    /// Decode `args`, execute and encode the output.
    async fn call_json(&self, store: &DataStore, args: Value) -> Result<Value, ToolError>;
}

#[async_trait]
impl<T> ToolDyn for T
where
    T: Tool,
{
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: T::NAME.to_owned(),
            description: self.description(),
            parameters: self.parameters(),
        }
    }

    async fn call_json(&self, store: &DataStore, args: Value) -> Result<Value, ToolError> {
        let args: T::Args =
            serde_json::from_value(args).map_err(|e| ToolError::invalid_args(e.to_string()))?;
        let output = self.call(store, args).await.map_err(Into::into)?;
        Ok(serde_json::to_value(output)?)
    }
}

/// Owned, type-erased tool.
pub type BoxedTool = Box<dyn ToolDyn>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_schema() {
        let spec = ToolSpec {
            name: "get_table_sample".into(),
            description: "Sample rows".into(),
            parameters: vec![
                ParameterSpec::string("table_name", "Table").required(),
                ParameterSpec::integer("limit", "Rows")
                    .with_default(5)
                    .with_range(1, 1000),
            ],
        };
        assert_eq!(
            spec.parameters_schema(),
            json!({
                "type": "object",
                "properties": {
                    "table_name": {"type": "string", "description": "Table"},
                    "limit": {
                        "type": "integer",
                        "description": "Rows",
                        "default": 5,
                        "minimum": 1,
                        "maximum": 1000
                    }
                },
                "required": ["table_name"]
            })
        );
    }

    #[test]
    fn test_definition_openai_form() {
        let spec = ToolSpec {
            name: "list_tables".into(),
            description: "List tables".into(),
            parameters: Vec::new(),
        };
        let value = spec.definition().to_openai();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "list_tables");
        assert_eq!(value["function"]["parameters"]["required"], json!([]));
    }
}
