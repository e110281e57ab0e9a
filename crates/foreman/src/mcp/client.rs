use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::protocol::{parse_tool_announcement, CallToolRequest, CallToolResult, McpToolDef};
use super::sse::SseLineBuffer;
use crate::registry::RegisteredTool;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// How tools are discovered from a provider. Server-sent events is the only
/// transport providers currently offer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Sse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpServerConfig {
    pub url: String,
    #[serde(default)]
    pub transport: Transport,
    /// Sent verbatim with every request, e.g. `Authorization`
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Overall request timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl McpServerConfig {
    pub fn new<U: Into<String>>(url: U) -> Self {
        Self {
            url: url.into(),
            transport: Transport::Sse,
            headers: HashMap::new(),
            timeout_secs: None,
        }
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Client for a single remote tool provider
#[derive(Debug)]
pub struct McpClient {
    name: String,
    url: String,
    headers: HashMap<String, String>,
    transport: Transport,
    client: Client,
}

impl McpClient {
    pub fn new<N: Into<String>>(name: N, config: McpServerConfig) -> Result<Self, McpError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            name: name.into(),
            url: config.url,
            headers: config.headers,
            transport: config.transport,
            client: builder.build()?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    fn with_headers(&self, mut request: RequestBuilder) -> RequestBuilder {
        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        request
    }

    /// Read the provider's event stream up to its first tool announcement.
    ///
    /// Providers keep the stream open after announcing, so reading stops at
    /// the end of the chunk that completed a non-empty announcement and the
    /// connection is dropped. Events that are not announcements are skipped.
    pub async fn list_tools(&self) -> Result<Vec<McpToolDef>, McpError> {
        let request = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/event-stream");
        let response = self.with_headers(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut tools = Vec::new();
        let mut buffer = SseLineBuffer::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            for payload in buffer.push(&chunk?) {
                if let Some(defs) = parse_tool_announcement(&payload) {
                    tools.extend(defs);
                }
            }
            if !tools.is_empty() {
                break;
            }
        }
        if tools.is_empty() {
            if let Some(defs) = buffer.finish().as_deref().and_then(parse_tool_announcement) {
                tools.extend(defs);
            }
        }

        debug!(server = %self.name, count = tools.len(), "tool list received");
        Ok(tools)
    }

    /// Discover the provider's tools and wrap each one for a registry
    pub async fn get_tools(self: &Arc<Self>) -> Result<Vec<RegisteredTool>, McpError> {
        let tools = self.list_tools().await?;
        Ok(tools
            .into_iter()
            .map(|def| RegisteredTool::remote(def, Arc::clone(self)))
            .collect())
    }

    /// Run a tool on the provider and return the text of the first result entry
    pub async fn call_tool(
        &self,
        tool_name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<String, McpError> {
        debug!(server = %self.name, tool = tool_name, "calling remote tool");

        let request = self
            .client
            .post(&self.url)
            .json(&CallToolRequest::new(tool_name, arguments));
        let response = self.with_headers(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let result: CallToolResult = serde_json::from_slice(&body)?;
        Ok(result.into_text())
    }
}
