//! Tool resolution orchestrator.
//!
//! Composes overrides, version resolution, filtering, compatibility and schema
//! post-processing into the [`EnabledToolSet`] both gateways serve. Runs once
//! at startup; identical inputs give an identical set.

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    compat::{is_compatible_with_policy, UnresolvedVersionPolicy},
    config::{ConfigDocument, EnvFilterSettings, FilterConfig},
    filter::apply_filters,
    overrides::{apply_overrides, OverrideSet},
    resolver::VersionSource,
};
use crate::{
    registry::{EnabledToolSet, ToolRegistry},
    tools::{args::strip_fields, BASE_TOOL_ARGS},
};

/// Whether the server talks to one backend or routes per call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    /// One environment-configured backend; full pipeline applies.
    #[default]
    Single,
    /// Callers name a cluster per call; only overrides apply.
    Multi,
}

impl FromStr for ServerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multi" => Ok(Self::Multi),
            other => Err(format!("unknown server mode '{other}'")),
        }
    }
}

impl fmt::Display for ServerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("single"),
            Self::Multi => f.write_str("multi"),
        }
    }
}

/// Inputs to a resolution run.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub mode: ServerMode,
    /// Config document, when `--config` was given. Its presence also selects
    /// it as the only filter source.
    pub document: Option<Arc<ConfigDocument>>,
    /// Raw `tool.<Key>.<field>=<value>` pairs.
    pub cli_overrides: Vec<String>,
    pub env: EnvFilterSettings,
    pub unresolved_policy: UnresolvedVersionPolicy,
}

impl ResolveOptions {
    pub fn new(mode: ServerMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_document(mut self, document: ConfigDocument) -> Self {
        self.document = Some(Arc::new(document));
        self
    }

    #[must_use]
    pub fn with_cli_overrides(mut self, overrides: Vec<String>) -> Self {
        self.cli_overrides = overrides;
        self
    }

    #[must_use]
    pub fn with_env(mut self, env: EnvFilterSettings) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub fn with_unresolved_policy(mut self, policy: UnresolvedVersionPolicy) -> Self {
        self.unresolved_policy = policy;
        self
    }
}

/// Computes the enabled tool set. Never fails; problems in any source are
/// logged and that source is treated as absent.
pub async fn resolve_enabled_tools(
    registry: &ToolRegistry,
    options: &ResolveOptions,
    versions: &dyn VersionSource,
) -> EnabledToolSet {
    let document = options.document.as_deref();
    let overrides = OverrideSet::load(document, &options.cli_overrides, registry);
    let mut working = apply_overrides(registry, &overrides);

    if options.mode == ServerMode::Multi {
        info!(tools = working.len(), "Multi mode: serving every tool unfiltered");
        return finish(working);
    }

    let version = versions.resolve_version().await;
    info!(%version, "Connected Elasticsearch version");

    let (filter, source) = FilterConfig::resolve(document, &options.env);
    if let Some(message) = source.warning() {
        warn!("{message}");
    }
    let outcome = apply_filters(&mut working, &filter);
    debug!(?source, removed = ?outcome.removed().collect::<Vec<_>>(), "Applied tool filters");

    working.retain(|d| {
        let keep = is_compatible_with_policy(&version, d, options.unresolved_policy);
        if !keep {
            debug!(tool = %d.display_name, %version, "Dropping tool incompatible with backend version");
        }
        keep
    });

    for descriptor in working.iter_mut() {
        strip_fields(Arc::make_mut(&mut descriptor.input_schema), BASE_TOOL_ARGS);
    }

    finish(working)
}

fn finish(registry: ToolRegistry) -> EnabledToolSet {
    let set = EnabledToolSet::new(registry);
    let duplicates = set.duplicate_display_names();
    if !duplicates.is_empty() {
        warn!(?duplicates, "Duplicate display names; calls resolve to the first registered tool");
    }
    info!(tools = ?set.display_names(), "Resolved enabled tools");
    set
}
