//! Stdio gateway.

use es_mcp::ToolServer;
use rmcp::{transport::stdio, ServiceExt};
use tracing::{error, info};

/// Serves `server` over stdin/stdout until the client disconnects.
pub async fn serve_stdio(server: ToolServer) -> anyhow::Result<()> {
    info!(tools = ?server.tools().display_names(), "Serving on stdio");
    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| error!(error = %e, "Failed to start stdio transport"))?;
    let reason = service.waiting().await?;
    info!(?reason, "Stdio transport closed");
    Ok(())
}
