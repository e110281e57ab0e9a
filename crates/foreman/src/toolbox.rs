use async_trait::async_trait;

use crate::errors::AgentResult;
use crate::models::tool::{Tool, ToolCall};

/// The set of capabilities a loop can dispatch tool calls to.
///
/// An agent's toolbox is its tool registry; a supervisor's toolbox is its
/// roster of agents. `call` returns `AgentError::ToolNotFound` when the call
/// names nothing in the toolbox and the text handed back to the model
/// otherwise, including for failures the model should see.
#[async_trait]
pub trait Toolbox: Send + Sync {
    /// The model-facing description of every capability, in a stable order
    fn tools(&self) -> Vec<Tool>;

    async fn call(&self, tool_call: &ToolCall) -> AgentResult<String>;
}
