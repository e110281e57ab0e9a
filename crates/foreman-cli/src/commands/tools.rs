use anyhow::Result;
use console::style;

use foreman::mcp::MultiServerMcpClient;

use crate::configuration::Settings;

/// List the tools every configured provider announces
pub async fn execute(settings: Settings) -> Result<()> {
    if settings.mcp.is_empty() {
        println!("No tool providers configured");
        return Ok(());
    }

    let client = MultiServerMcpClient::new(settings.mcp)?;
    for server in client.names() {
        let Some(server_client) = client.client(server) else {
            continue;
        };
        println!("{} {}", style(server).bold(), style(server_client.url()).dim());
        match server_client.list_tools().await {
            Ok(tools) => {
                for tool in tools {
                    println!("  {} - {}", style(&tool.name).green(), tool.description);
                }
            }
            Err(e) => println!("  {}", style(format!("unavailable: {}", e)).red()),
        }
    }
    Ok(())
}
