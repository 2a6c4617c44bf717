//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use es_mcp::{ServerMode, UnresolvedVersionPolicy};

/// How the server talks to its MCP client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// Streamable HTTP on `/mcp`.
    Stream,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "elasticsearch-mcp-server",
    version,
    about = "MCP server for Elasticsearch"
)]
pub struct Cli {
    /// Transport to serve on
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// `single` talks to the backend in ELASTICSEARCH_URL; `multi` routes each
    /// call to a cluster from the config file
    #[arg(long, default_value_t = ServerMode::Single)]
    pub mode: ServerMode,

    /// YAML config file with `tools`, `tool_category`, `tool_filters` and
    /// `clusters` sections
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bind host for the stream transport
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Bind port for the stream transport
    #[arg(long, default_value_t = 9900)]
    pub port: u16,

    /// Serve the stream transport without sessions
    #[arg(long)]
    pub stateless: bool,

    /// Treat tools as compatible (`open`) or not (`closed`) when the backend
    /// version cannot be determined
    #[arg(long, default_value_t = UnresolvedVersionPolicy::FailOpen)]
    pub unresolved_version: UnresolvedVersionPolicy,

    /// Log filter directive, e.g. `info` or `es_mcp=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Tool overrides, `tool.<Key>.<field>=<value>`
    #[arg(value_name = "OVERRIDE")]
    pub tool_overrides: Vec<String>,
}

impl Cli {
    /// `host:port` for the stream transport. Host names are resolved at bind time.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
