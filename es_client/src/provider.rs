//! Per-call backend construction.

use std::sync::Arc;

use crate::{
    client::{EsClient, SearchBackend},
    config::{ClusterRegistry, ConnectionParams, ENV_NO_AUTH},
    error::{ClientError, ClientResult},
};

/// Hands out a fresh backend for each tool invocation.
///
/// `cluster` is the caller-supplied cluster name; `None` or an empty name
/// selects the environment-configured backend.
pub trait BackendProvider: Send + Sync {
    fn backend(&self, cluster: Option<&str>) -> ClientResult<Arc<dyn SearchBackend>>;
}

/// Default provider: named clusters from the config document, falling back
/// to process environment.
#[derive(Debug, Clone, Default)]
pub struct EsClientProvider {
    clusters: ClusterRegistry,
}

impl EsClientProvider {
    pub fn new(clusters: ClusterRegistry) -> Self {
        Self { clusters }
    }

    /// Resolve the connection parameters a call would use.
    pub fn connection_params(&self, cluster: Option<&str>) -> ClientResult<ConnectionParams> {
        match cluster.filter(|name| !name.is_empty()) {
            Some(name) => {
                let info = self
                    .clusters
                    .get(name)
                    .ok_or_else(|| ClientError::ClusterNotFound(name.to_string()))?;
                let no_auth = std::env::var(ENV_NO_AUTH)
                    .map(|v| v.trim().eq_ignore_ascii_case("true"))
                    .unwrap_or(false);
                Ok(info.connection_params(no_auth))
            }
            None => ConnectionParams::from_env(),
        }
    }
}

impl BackendProvider for EsClientProvider {
    fn backend(&self, cluster: Option<&str>) -> ClientResult<Arc<dyn SearchBackend>> {
        let params = self.connection_params(cluster)?;
        Ok(Arc::new(EsClient::new(&params)?))
    }
}
