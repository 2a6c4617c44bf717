//! Backend version resolution.
//!
//! Resolution never fails: any transport or parse error is logged and becomes
//! [`ResolvedVersion::Unresolved`].

use std::sync::Arc;

use async_trait::async_trait;
use es_client::{client::version_number, BackendProvider, SearchBackend};
use tracing::{debug, error};

use crate::version::{ResolvedVersion, Version};

/// Anything that can report the version of the backend in use.
#[async_trait]
pub trait VersionSource: Send + Sync {
    async fn resolve_version(&self) -> ResolvedVersion;
}

/// Fixed version, for callers that already know it.
#[async_trait]
impl VersionSource for ResolvedVersion {
    async fn resolve_version(&self) -> ResolvedVersion {
        *self
    }
}

/// Queries the environment-configured backend's info endpoint.
pub struct BackendVersionResolver {
    provider: Arc<dyn BackendProvider>,
}

impl BackendVersionResolver {
    pub fn new(provider: Arc<dyn BackendProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl VersionSource for BackendVersionResolver {
    async fn resolve_version(&self) -> ResolvedVersion {
        match self.provider.backend(None) {
            Ok(backend) => resolve_backend_version(backend.as_ref()).await,
            Err(e) => {
                error!(error = %e, "Failed to connect to Elasticsearch for version check");
                ResolvedVersion::Unresolved
            }
        }
    }
}

/// One `info` call against `backend`.
pub async fn resolve_backend_version(backend: &dyn SearchBackend) -> ResolvedVersion {
    let info = match backend.info().await {
        Ok(info) => info,
        Err(e) => {
            error!(error = %e, "Failed to get Elasticsearch version");
            return ResolvedVersion::Unresolved;
        }
    };

    let parsed = version_number(&info)
        .map_err(|e| e.to_string())
        .and_then(|raw| raw.parse::<Version>().map_err(|e| e.to_string()));

    match parsed {
        Ok(version) => {
            debug!(%version, "Resolved Elasticsearch version");
            ResolvedVersion::Known(version)
        }
        Err(e) => {
            error!(error = %e, "Failed to parse Elasticsearch version");
            ResolvedVersion::Unresolved
        }
    }
}
