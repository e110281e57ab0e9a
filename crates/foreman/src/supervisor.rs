//! Delegation of a user request across a roster of agents.
//!
//! To the supervisor's model every agent is a single tool taking a `task`
//! string; calling it runs that agent to completion and returns its answer.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use crate::agent::Agent;
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolCall};
use crate::prompt_template::render_prompt;
use crate::providers::base::Provider;
use crate::react::{LoopOptions, ReactLoop};
use crate::toolbox::Toolbox;

const DELEGATE_DESCRIPTION: &str = "Delegate a task to {{ name }}: {{ prompt }}";
const TASK_DESCRIPTION: &str = "The task to hand over to this assistant";

/// A supervisor that has not been validated yet
pub struct SupervisorWorkflow {
    agents: Vec<Arc<Agent>>,
    provider: Arc<dyn Provider>,
    prompt: String,
    options: LoopOptions,
}

/// Start building a supervisor over `agents`
pub fn create_supervisor<P: Into<String>>(
    agents: Vec<Arc<Agent>>,
    provider: Arc<dyn Provider>,
    prompt: P,
) -> SupervisorWorkflow {
    SupervisorWorkflow {
        agents,
        provider,
        prompt: prompt.into(),
        options: LoopOptions::default(),
    }
}

impl SupervisorWorkflow {
    pub fn with_options(mut self, options: LoopOptions) -> Self {
        self.options = options;
        self
    }

    /// Check the roster and produce a runnable supervisor.
    ///
    /// Agent names become tool names, so each must be non-empty and unique.
    pub fn compile(self) -> AgentResult<Supervisor> {
        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.name().trim().is_empty() {
                return Err(AgentError::InvalidName(agent.name().to_string()));
            }
            if !seen.insert(agent.name()) {
                return Err(AgentError::DuplicateName(agent.name().to_string()));
            }
        }

        let roster = Roster::new(self.agents)?;
        Ok(Supervisor {
            roster,
            provider: self.provider,
            prompt: self.prompt,
            options: self.options,
        })
    }
}

pub struct Supervisor {
    roster: Roster,
    provider: Arc<dyn Provider>,
    prompt: String,
    options: LoopOptions,
}

impl Supervisor {
    pub fn agents(&self) -> &[Arc<Agent>] {
        &self.roster.agents
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The tool each agent is presented as, in roster order
    pub fn tools(&self) -> Vec<Tool> {
        self.roster.tools.clone()
    }

    /// Route `user_message` through the roster until the model answers
    pub async fn invoke(&self, user_message: &str) -> Result<String> {
        ReactLoop::new(
            "supervisor",
            self.provider.as_ref(),
            &self.prompt,
            &self.roster,
        )
        .with_options(self.options)
        .run(user_message)
        .await
    }
}

/// The agents of a supervisor, exposed as a toolbox
struct Roster {
    agents: Vec<Arc<Agent>>,
    tools: Vec<Tool>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Deserialize)]
struct DelegateArgs {
    task: String,
}

impl Roster {
    fn new(agents: Vec<Arc<Agent>>) -> AgentResult<Self> {
        let tools = agents
            .iter()
            .map(|agent| agent_to_tool(agent))
            .collect::<AgentResult<Vec<_>>>()?;
        let index = agents
            .iter()
            .enumerate()
            .map(|(i, agent)| (agent.name().to_string(), i))
            .collect();
        Ok(Self {
            agents,
            tools,
            index,
        })
    }
}

/// Describe `agent` as a tool that takes the task to hand over
pub fn agent_to_tool(agent: &Agent) -> AgentResult<Tool> {
    let description = render_prompt(
        DELEGATE_DESCRIPTION,
        &json!({"name": agent.name(), "prompt": agent.prompt()}),
    )
    .map_err(|e| AgentError::Internal(e.to_string()))?;

    Ok(Tool::new(
        agent.name(),
        description,
        json!({
            "type": "object",
            "properties": {
                "task": {
                    "type": "string",
                    "description": TASK_DESCRIPTION
                }
            },
            "required": ["task"]
        }),
    ))
}

#[async_trait]
impl Toolbox for Roster {
    fn tools(&self) -> Vec<Tool> {
        self.tools.clone()
    }

    async fn call(&self, tool_call: &ToolCall) -> AgentResult<String> {
        let agent = self
            .index
            .get(tool_call.name())
            .map(|&i| &self.agents[i])
            .ok_or_else(|| AgentError::ToolNotFound(tool_call.name().to_string()))?;

        let args: DelegateArgs = serde_json::from_str(&tool_call.function.arguments)
            .map_err(|e| AgentError::InvalidParameters(e.to_string()))?;

        debug!(agent = agent.name(), task = %args.task, "delegating");
        match agent.run(&args.task).await {
            Ok(answer) => Ok(answer),
            Err(e) => Ok(AgentError::ExecutionError(e.to_string()).to_string()),
        }
    }
}
