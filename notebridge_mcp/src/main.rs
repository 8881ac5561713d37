use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use notebridge_core::{
    mcp_server::{JsonRpcHandler, McpServer},
    transport::StdioTransport,
    NotebridgeConfig, NotesClient, NotesConnector,
};

const DEFAULT_LOG_FILTER: &str = "notebridge_core=info,notebridge_mcp=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("Starting Notebridge MCP Server");

    if !cfg!(target_os = "macos") {
        warn!("Apple Notes is only available on macOS; every tool call will fail");
    }

    let config = NotebridgeConfig::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    info!(
        application = %config.application,
        osascript = %config.osascript_path.display(),
        timeout_secs = ?config.timeout_secs,
        duplicate_names = ?config.duplicate_names,
        "Configuration loaded"
    );

    let client = NotesClient::from_config(&config);
    let server = McpServer::new(NotesConnector::new(client));
    let handler = JsonRpcHandler::new(server);
    let transport = StdioTransport::new(handler);

    info!("MCP Server ready, listening on stdio");

    if let Err(e) = transport.run().await {
        error!("Transport error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
