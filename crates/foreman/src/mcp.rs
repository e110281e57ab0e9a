//! Client for remote tool providers.
//!
//! A provider announces its tools over a server-sent event stream and runs
//! them over plain JSON request/response calls to the same endpoint. Every
//! discovered tool is wrapped as a [`RegisteredTool`](crate::registry::RegisteredTool)
//! whose handler calls back into the provider, so agents can mix local and
//! remote tools in one registry.
pub mod client;
pub mod multi;
pub mod protocol;
pub mod sse;

pub use client::{McpClient, McpError, McpServerConfig, Transport};
pub use multi::MultiServerMcpClient;
pub use protocol::McpToolDef;
