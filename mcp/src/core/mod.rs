//! Tool resolution pipeline and protocol dispatch.

pub mod compat;
pub mod config;
pub mod filter;
pub mod handler;
pub mod orchestrator;
pub mod overrides;
pub mod resolver;

pub use compat::{
    incompatibility_message, is_compatible, is_compatible_with_policy, supported_range,
    UnresolvedVersionPolicy,
};
pub use config::{ConfigDocument, EnvFilterSettings, FilterConfig, FilterSource};
pub use filter::{apply_filters, FilterOutcome};
pub use handler::ToolServer;
pub use orchestrator::{resolve_enabled_tools, ResolveOptions, ServerMode};
pub use overrides::{apply_overrides, OverrideSet, OverrideSpec};
pub use resolver::{resolve_backend_version, BackendVersionResolver, VersionSource};
