//! Gateway bootstrap shared by both transports.

pub mod stdio;
pub mod streaming;

use std::{collections::HashMap, path::Path, sync::Arc};

use es_client::{BackendProvider, ClusterInfo, ClusterRegistry, EsClientProvider};
use es_mcp::{
    default_registry, resolve_enabled_tools, BackendVersionResolver, ConfigDocument,
    EnvFilterSettings, ResolveOptions, ServerMode, ToolServer,
};
use tracing::{error, info};

use crate::config::{Cli, Transport};

/// Resolves the enabled tool set and wraps it in a [`ToolServer`].
///
/// Never fails: unreadable or malformed configuration degrades to "no
/// configuration from that source".
pub async fn build_tool_server(cli: &Cli) -> ToolServer {
    let document = match &cli.config {
        Some(path) => Some(load_document(path).await),
        None => None,
    };

    let clusters = document
        .as_ref()
        .map(|document| cluster_registry(document, cli.mode))
        .unwrap_or_default();
    let provider: Arc<dyn BackendProvider> = Arc::new(EsClientProvider::new(clusters));

    let mut options = ResolveOptions::new(cli.mode)
        .with_cli_overrides(cli.tool_overrides.clone())
        .with_env(EnvFilterSettings::from_env())
        .with_unresolved_policy(cli.unresolved_version);
    if let Some(document) = document {
        options = options.with_document(document);
    }

    let resolver = BackendVersionResolver::new(Arc::clone(&provider));
    let tools = resolve_enabled_tools(&default_registry(), &options, &resolver).await;

    ToolServer::new(tools, provider).with_unresolved_policy(cli.unresolved_version)
}

/// An unreadable document still counts as "a config file was given", so the
/// environment stays ignored.
async fn load_document(path: &Path) -> ConfigDocument {
    ConfigDocument::load(path).await.unwrap_or_else(|e| {
        error!(error = %e, "Error loading config file");
        ConfigDocument::default()
    })
}

/// Named clusters from the `clusters` section. A malformed section yields none.
fn cluster_registry(document: &ConfigDocument, mode: ServerMode) -> ClusterRegistry {
    match document.section::<HashMap<String, ClusterInfo>>("clusters") {
        Ok(clusters) => {
            let clusters = ClusterRegistry::from(clusters.unwrap_or_default());
            if mode == ServerMode::Multi {
                info!(clusters = ?clusters.names(), "Loaded cluster registry");
            }
            clusters
        }
        Err(e) => {
            error!(error = %e, "Ignoring clusters from config file");
            ClusterRegistry::new()
        }
    }
}

/// Builds the server and serves it on the selected transport until shutdown.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    info!(
        transport = ?cli.transport,
        mode = %cli.mode,
        config = ?cli.config,
        "Starting Elasticsearch MCP server"
    );
    let server = build_tool_server(&cli).await;

    match cli.transport {
        Transport::Stdio => stdio::serve_stdio(server).await,
        Transport::Stream => {
            streaming::serve_streaming(server, &cli.bind_address(), cli.stateless).await
        }
    }
}
