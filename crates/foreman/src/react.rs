//! The reasoning/acting loop shared by agents and supervisors.
//!
//! Each turn sends the whole conversation to the model. A reply without tool
//! calls ends the loop with its text; otherwise the reply and one result
//! message per resolved call are appended and the model is asked again.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn, Instrument};

use crate::errors::AgentError;
use crate::models::message::Message;
use crate::models::tool::ToolCall;
use crate::providers::base::Provider;
use crate::toolbox::Toolbox;

pub const DEFAULT_MAX_TURNS: usize = 25;

/// What to do with a tool call naming something the toolbox does not have
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownToolPolicy {
    /// Drop the call silently from the conversation
    #[default]
    Skip,
    /// Answer the call with a `tool not found` message
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopOptions {
    /// Upper bound on model calls per invocation, `None` for no bound
    pub max_turns: Option<usize>,
    pub unknown_tool: UnknownToolPolicy,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            max_turns: Some(DEFAULT_MAX_TURNS),
            unknown_tool: UnknownToolPolicy::default(),
        }
    }
}

impl LoopOptions {
    pub fn with_max_turns(mut self, max_turns: Option<usize>) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_unknown_tool(mut self, policy: UnknownToolPolicy) -> Self {
        self.unknown_tool = policy;
        self
    }
}

/// One configured loop: a model, a system prompt and the toolbox it may use
pub struct ReactLoop<'a> {
    name: &'a str,
    provider: &'a dyn Provider,
    prompt: &'a str,
    toolbox: &'a dyn Toolbox,
    options: LoopOptions,
}

impl<'a> ReactLoop<'a> {
    pub fn new(
        name: &'a str,
        provider: &'a dyn Provider,
        prompt: &'a str,
        toolbox: &'a dyn Toolbox,
    ) -> Self {
        Self {
            name,
            provider,
            prompt,
            toolbox,
            options: LoopOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoopOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the loop on `task` until the model answers without tool calls.
    ///
    /// Gateway failures are returned as is. Running out of turns fails with
    /// `AgentError::MaxTurnsExceeded`.
    pub async fn run(&self, task: &str) -> Result<String> {
        let span = info_span!("react_loop", name = self.name);
        self.run_inner(task).instrument(span).await
    }

    async fn run_inner(&self, task: &str) -> Result<String> {
        let tools = self.toolbox.tools();
        let mut messages = vec![Message::system(self.prompt), Message::user(task)];
        let mut turns = 0;

        loop {
            if let Some(max_turns) = self.options.max_turns {
                if turns >= max_turns {
                    return Err(AgentError::MaxTurnsExceeded(max_turns).into());
                }
            }

            let (reply, usage) = self.provider.complete(&messages, &tools).await?;
            turns += 1;
            debug!(
                turn = turns,
                tool_calls = reply.tool_calls.len(),
                input_tokens = ?usage.input_tokens,
                output_tokens = ?usage.output_tokens,
                "model replied"
            );

            if !reply.has_tool_calls() {
                return Ok(reply.content);
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply);
            for call in &calls {
                if let Some(result) = self.dispatch(call).await {
                    messages.push(Message::tool(call.id.clone(), result));
                }
            }
        }
    }

    /// The result text for `call`, or `None` when it is dropped
    async fn dispatch(&self, call: &ToolCall) -> Option<String> {
        debug!(tool = call.name(), id = %call.id, "dispatching tool call");
        match self.toolbox.call(call).await {
            Ok(text) => Some(text),
            Err(e @ AgentError::ToolNotFound(_)) => match self.options.unknown_tool {
                UnknownToolPolicy::Skip => {
                    warn!(tool = call.name(), "skipping call to unknown tool");
                    None
                }
                UnknownToolPolicy::Report => Some(e.to_string()),
            },
            Err(e) => Some(e.to_string()),
        }
    }
}
