use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{AgentError, AgentResult};

/// A tool that can be used by a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// A JSON Schema object describing the arguments the tool accepts
    pub input_schema: Value,
}

impl Tool {
    /// Create a new tool with the given name and description
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// The function half of a tool call, as the model produced it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// Arguments are kept as the raw JSON text the model emitted
    #[serde(default)]
    pub arguments: String,
}

/// A request from the model to invoke a tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    #[serde(default)]
    pub id: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn new<I, N, A>(id: I, name: N, arguments: A) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        ToolCall {
            id: id.into(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Decode the raw arguments into a mapping of parameter name to value.
    ///
    /// Models sometimes send an empty string for tools without parameters, which
    /// is treated as an empty object.
    pub fn parse_arguments(&self) -> AgentResult<Map<String, Value>> {
        parse_arguments(&self.function.arguments)
    }
}

/// Decode raw tool arguments as a JSON object; blank text is an empty object
pub fn parse_arguments(raw: &str) -> AgentResult<Map<String, Value>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_str::<Map<String, Value>>(raw)
        .map_err(|e| AgentError::InvalidParameters(e.to_string()))
}
