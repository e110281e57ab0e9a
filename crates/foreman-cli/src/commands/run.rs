use anyhow::{anyhow, bail, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

use foreman::mcp::{McpServerConfig, MultiServerMcpClient};
use foreman::providers::base::Provider;
use foreman::{create_supervisor, Agent, LoopOptions, ToolRegistry};

use super::{build_provider, print_answer};
use crate::configuration::{Settings, WorkerSettings};

const DEFAULT_SUPERVISOR_PROMPT: &str = "You lead a team of assistants. Hand each request to the \
assistant best suited for it and call at most one assistant at a time.";

/// Answer `query` with the workers defined in the configuration
pub async fn execute(settings: Settings, query: String) -> Result<()> {
    if settings.workers.is_empty() {
        bail!("No workers configured, add a [[workers]] entry to the config file");
    }

    let options = settings.agent.loop_options();
    let provider = build_provider(settings.provider)?;

    let mut agents = Vec::with_capacity(settings.workers.len());
    for worker in &settings.workers {
        let agent = build_worker(worker, &settings.mcp, Arc::clone(&provider), options).await?;
        agents.push(Arc::new(agent));
    }

    let prompt = settings
        .supervisor
        .prompt
        .unwrap_or_else(|| DEFAULT_SUPERVISOR_PROMPT.to_string());
    let supervisor = create_supervisor(agents, provider, prompt)
        .with_options(options)
        .compile()?;

    let answer = supervisor.invoke(&query).await?;
    print_answer(&query, &answer);
    Ok(())
}

async fn build_worker(
    worker: &WorkerSettings,
    servers: &BTreeMap<String, McpServerConfig>,
    provider: Arc<dyn Provider>,
    options: LoopOptions,
) -> Result<Agent> {
    let mut configs = Vec::with_capacity(worker.mcp_servers.len());
    for name in &worker.mcp_servers {
        let config = servers.get(name).ok_or_else(|| {
            anyhow!(
                "Worker {} uses unknown tool provider {}",
                worker.name,
                name
            )
        })?;
        configs.push((name.clone(), config.clone()));
    }

    let client = MultiServerMcpClient::new(configs)?;
    let tools = ToolRegistry::from_tools(client.get_tools().await)?;
    tracing::info!(worker = %worker.name, tools = tools.len(), "worker ready");

    Ok(Agent::new(&worker.name, &worker.prompt, provider, tools).with_options(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use foreman::providers::configs::OpenAiProviderConfig;
    use foreman::providers::openai::OpenAiProvider;

    fn provider() -> Arc<dyn Provider> {
        Arc::new(OpenAiProvider::new(OpenAiProviderConfig::new("test-key")).unwrap())
    }

    fn worker(servers: &[&str]) -> WorkerSettings {
        WorkerSettings {
            name: "search_assistant".to_string(),
            prompt: "You search for information.".to_string(),
            mcp_servers: servers.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_unknown_provider_is_rejected() {
        let err = build_worker(
            &worker(&["other_search"]),
            &BTreeMap::new(),
            provider(),
            LoopOptions::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Worker search_assistant uses unknown tool provider other_search"
        );
    }

    #[tokio::test]
    async fn test_unreachable_provider_leaves_worker_without_tools() {
        let mut servers = BTreeMap::new();
        servers.insert(
            "other_search".to_string(),
            McpServerConfig::new("http://127.0.0.1:9/sse"),
        );

        let agent = build_worker(
            &worker(&["other_search"]),
            &servers,
            provider(),
            LoopOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(agent.name(), "search_assistant");
        assert!(agent.tools().is_empty());
    }
}
