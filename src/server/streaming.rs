//! HTTP gateway.
//!
//! Routes:
//! - `/mcp`: MCP streamable HTTP service
//! - `/sse` + `/messages/`: legacy SSE transport (event stream and client posts)
//! - `/health`: liveness, always `200 OK`

use std::net::SocketAddr;

use axum::{routing::get, Router};
use es_mcp::ToolServer;
use rmcp::transport::{
    sse_server::{SseServer, SseServerConfig},
    streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
    },
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const SSE_PATH: &str = "/sse";
pub const SSE_POST_PATH: &str = "/messages/";

/// Builds the gateway router. SSE sessions are torn down when `ct` is cancelled.
pub fn router(server: ToolServer, stateless: bool, ct: CancellationToken) -> Router {
    let (sse, sse_routes) = SseServer::new(SseServerConfig {
        // Routes are merged into our own listener; `bind` is never used.
        bind: SocketAddr::from(([0, 0, 0, 0], 0)),
        sse_path: SSE_PATH.to_string(),
        post_path: SSE_POST_PATH.to_string(),
        ct,
        sse_keep_alive: None,
    });
    let sse_server = server.clone();
    sse.with_service(move || sse_server.clone());

    let streamable = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            stateful_mode: !stateless,
            ..Default::default()
        },
    );

    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", streamable)
        .merge(sse_routes)
}

async fn health() -> &'static str {
    "OK"
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve_streaming(server: ToolServer, addr: &str, stateless: bool) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        stateless,
        tools = ?server.tools().display_names(),
        "Serving MCP on /mcp and {SSE_PATH}"
    );
    let ct = CancellationToken::new();
    let result = axum::serve(listener, router(server, stateless, ct.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    ct.cancel();
    result?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
