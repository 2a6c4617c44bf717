//! Elasticsearch MCP server: CLI, logging and the stdio / streamable HTTP
//! gateways over the [`es_mcp`] tool pipeline.

pub mod config;
pub mod logging;
pub mod server;

pub use config::{Cli, Transport};
