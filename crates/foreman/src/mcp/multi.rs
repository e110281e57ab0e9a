use futures::future::join_all;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use super::client::{McpClient, McpError, McpServerConfig};
use crate::registry::RegisteredTool;

/// Tool discovery across several providers at once
#[derive(Debug, Default)]
pub struct MultiServerMcpClient {
    servers: BTreeMap<String, Arc<McpClient>>,
}

impl MultiServerMcpClient {
    pub fn new<I, N>(configs: I) -> Result<Self, McpError>
    where
        I: IntoIterator<Item = (N, McpServerConfig)>,
        N: Into<String>,
    {
        let mut servers = BTreeMap::new();
        for (name, config) in configs {
            let name = name.into();
            let client = McpClient::new(name.clone(), config)?;
            servers.insert(name, Arc::new(client));
        }
        Ok(Self { servers })
    }

    pub fn client(&self, name: &str) -> Option<&Arc<McpClient>> {
        self.servers.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.servers.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Collect the tools of every provider, ordered by provider name.
    ///
    /// A provider that cannot be reached or answers with an error contributes
    /// no tools; the failure is logged and the other providers are unaffected.
    /// Tool names are unique in the result: the first tool under a name wins
    /// and later ones are logged and dropped.
    pub async fn get_tools(&self) -> Vec<RegisteredTool> {
        let lookups = self.servers.iter().map(|(name, client)| async move {
            (name, client.get_tools().await)
        });

        let mut all_tools = Vec::new();
        let mut seen = HashSet::new();
        for (name, result) in join_all(lookups).await {
            match result {
                Ok(tools) => {
                    info!(server = %name, count = tools.len(), "discovered remote tools");
                    for tool in tools {
                        if seen.insert(tool.name().to_string()) {
                            all_tools.push(tool);
                        } else {
                            warn!(
                                server = %name,
                                tool = tool.name(),
                                "duplicate tool name, keeping the first"
                            );
                        }
                    }
                }
                Err(e) => {
                    warn!(server = %name, error = %e, "failed to fetch tool list");
                }
            }
        }
        all_tools
    }
}
