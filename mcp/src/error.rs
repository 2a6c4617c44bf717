//! Error types for tool resolution and dispatch.
//!
//! Three families, distinguished by how they propagate:
//! - [`ConfigError`]: a configuration source is malformed. The pipeline logs
//!   it and carries on as if that source were absent.
//! - [`ToolError`]: a single tool invocation failed. Rendered as a textual
//!   error content block, never surfaced as a protocol fault.
//! - [`McpError`]: caller-facing failures that propagate to the transport.

use es_client::ClientError;
use thiserror::Error;

pub type McpResult<T> = Result<T, McpError>;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("Unknown or disabled tool: {0}")]
    UnknownTool(String),
}

impl From<McpError> for rmcp::ErrorData {
    fn from(err: McpError) -> Self {
        match err {
            McpError::UnknownTool(_) => rmcp::ErrorData::invalid_params(err.to_string(), None),
        }
    }
}

/// Non-fatal configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed YAML in {section}: {source}")]
    Yaml {
        section: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON in {field}: {source}")]
    Json {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid regex '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid override for tool '{tool}': {reason}")]
    Override { tool: String, reason: String },
}

/// Failure of a single tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Incompatible(String),

    #[error(transparent)]
    Backend(#[from] ClientError),

    #[error("{0}")]
    UnexpectedResponse(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::InvalidArguments(err.to_string())
    }
}
