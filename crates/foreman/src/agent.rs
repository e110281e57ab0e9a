use anyhow::Result;
use std::fmt;
use std::sync::Arc;

use crate::providers::base::Provider;
use crate::react::{LoopOptions, ReactLoop};
use crate::registry::ToolRegistry;

/// Agent pairs a model with a prompt and the tools it is allowed to use
pub struct Agent {
    name: String,
    prompt: String,
    provider: Arc<dyn Provider>,
    tools: ToolRegistry,
    options: LoopOptions,
}

impl Agent {
    pub fn new<N, P>(name: N, prompt: P, provider: Arc<dyn Provider>, tools: ToolRegistry) -> Self
    where
        N: Into<String>,
        P: Into<String>,
    {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            provider,
            tools,
            options: LoopOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoopOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn options(&self) -> LoopOptions {
        self.options
    }

    /// Work on `task` with this agent's tools and return the final answer.
    ///
    /// Every call starts from a fresh conversation; nothing is kept between
    /// runs.
    pub async fn run(&self, task: &str) -> Result<String> {
        ReactLoop::new(&self.name, self.provider.as_ref(), &self.prompt, &self.tools)
            .with_options(self.options)
            .run(task)
            .await
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("prompt", &self.prompt)
            .field("tools", &self.tools.len())
            .field("options", &self.options)
            .finish()
    }
}
