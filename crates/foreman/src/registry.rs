use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::errors::{AgentError, AgentResult};
use crate::mcp::{McpClient, McpToolDef};
use crate::models::tool::{parse_arguments, Tool, ToolCall};
use crate::providers::utils::tool_to_openai_spec;
use crate::toolbox::Toolbox;

/// A local tool implementation: decoded arguments in, result text out
pub type ToolFn = Arc<dyn Fn(&Map<String, Value>) -> String + Send + Sync>;

/// How a registered tool is executed
#[derive(Clone)]
pub enum ToolHandler {
    /// Runs in process
    Local(ToolFn),
    /// Runs on a remote tool provider under the given name
    Remote { client: Arc<McpClient>, name: String },
}

impl fmt::Debug for ToolHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolHandler::Local(_) => f.write_str("Local"),
            ToolHandler::Remote { client, name } => f
                .debug_struct("Remote")
                .field("server", &client.name())
                .field("name", name)
                .finish(),
        }
    }
}

/// A tool description bound to its implementation
#[derive(Debug, Clone)]
pub struct RegisteredTool {
    tool: Tool,
    handler: ToolHandler,
}

impl RegisteredTool {
    pub fn new(tool: Tool, handler: ToolHandler) -> Self {
        Self { tool, handler }
    }

    pub fn local<N, D, F>(name: N, description: D, input_schema: Value, func: F) -> Self
    where
        N: Into<String>,
        D: Into<String>,
        F: Fn(&Map<String, Value>) -> String + Send + Sync + 'static,
    {
        Self::new(
            Tool::new(name, description, input_schema),
            ToolHandler::Local(Arc::new(func)),
        )
    }

    /// Wrap a tool announced by a remote provider
    pub fn remote(def: McpToolDef, client: Arc<McpClient>) -> Self {
        let handler = ToolHandler::Remote {
            client,
            name: def.name.clone(),
        };
        Self::new(Tool::new(def.name, def.description, def.input_schema), handler)
    }

    pub fn name(&self) -> &str {
        &self.tool.name
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn handler(&self) -> &ToolHandler {
        &self.handler
    }

    /// Run the tool with already decoded arguments.
    ///
    /// Remote failures are folded into the result text so the calling loop
    /// always has something to hand back to the model.
    pub async fn call(&self, arguments: &Map<String, Value>) -> String {
        match &self.handler {
            ToolHandler::Local(func) => func(arguments),
            ToolHandler::Remote { client, name } => {
                match client.call_tool(name, arguments).await {
                    Ok(text) => text,
                    Err(e) => AgentError::ExecutionError(e.to_string()).to_string(),
                }
            }
        }
    }
}

/// An ordered set of uniquely named tools
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tools<I>(tools: I) -> AgentResult<Self>
    where
        I: IntoIterator<Item = RegisteredTool>,
    {
        let mut registry = Self::new();
        registry.extend(tools)?;
        Ok(registry)
    }

    pub fn register(&mut self, tool: RegisteredTool) -> AgentResult<()> {
        if tool.name().is_empty() {
            return Err(AgentError::InvalidName(tool.name().to_string()));
        }
        if self.index.contains_key(tool.name()) {
            return Err(AgentError::DuplicateName(tool.name().to_string()));
        }
        self.index.insert(tool.name().to_string(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn extend<I>(&mut self, tools: I) -> AgentResult<()>
    where
        I: IntoIterator<Item = RegisteredTool>,
    {
        for tool in tools {
            self.register(tool)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredTool> {
        self.tools.iter()
    }

    /// Tool descriptions in registration order
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.tool.clone()).collect()
    }

    /// The model-facing function list, in registration order
    pub fn schema_list(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| tool_to_openai_spec(&t.tool))
            .collect()
    }

    /// Decode `arguments` and run `tool` with them.
    ///
    /// Arguments that are not a JSON object fail with `InvalidParameters`
    /// and the tool is not invoked.
    pub async fn execute(&self, tool: &RegisteredTool, arguments: &str) -> AgentResult<String> {
        let arguments = parse_arguments(arguments)?;
        debug!(tool = tool.name(), "executing tool");
        Ok(tool.call(&arguments).await)
    }
}

#[async_trait]
impl Toolbox for ToolRegistry {
    fn tools(&self) -> Vec<Tool> {
        ToolRegistry::tools(self)
    }

    async fn call(&self, tool_call: &ToolCall) -> AgentResult<String> {
        let tool = self
            .find(tool_call.name())
            .ok_or_else(|| AgentError::ToolNotFound(tool_call.name().to_string()))?;
        self.execute(tool, &tool_call.function.arguments).await
    }
}
