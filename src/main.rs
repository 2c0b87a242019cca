#![warn(clippy::pedantic)]

use anyhow::Result;
use rmcp::{transport::stdio, ServiceExt};
use tools_crowd_mcp::config::Config;
use tools_crowd_mcp::ToolsServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting Tools Crowd MCP Server");

    let config = Config::from_env();
    if config.lookup_endpoint().is_err() {
        tracing::warn!("TOOLS_API_URL or TOOLS_API_KEY is not set; lookup tools will fail");
    }

    let controller = ToolsServer::new(config);

    let service = controller.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}
