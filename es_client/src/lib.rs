//! Elasticsearch backend client.
//!
//! Thin HTTP client over the search/index/shard APIs consumed by the MCP tool
//! handlers. Handlers never hold a client across calls: every invocation asks a
//! [`BackendProvider`] for a fresh [`SearchBackend`] built from static
//! connection parameters.
//!
//! Connection parameters come from one of two places:
//! - Process environment (single-backend mode)
//! - A named cluster in the YAML config document (multi-backend mode)

pub mod client;
pub mod config;
pub mod error;
pub mod provider;

pub use client::{EsClient, SearchBackend};
pub use config::{AuthMode, ClusterInfo, ClusterRegistry, ConnectionParams};
pub use error::{ClientError, ClientResult};
pub use provider::{BackendProvider, EsClientProvider};
