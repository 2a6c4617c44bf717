//! Tool catalogue, resolution pipeline and dispatch for the Elasticsearch MCP
//! server.
//!
//! ## Modules
//!
//! - [`registry`]: static tool descriptors keyed by [`ToolKey`]
//! - [`tools`]: argument types and handlers for the built-in tools
//! - [`core`]: overrides, filtering, compatibility, orchestration and the
//!   protocol-facing [`ToolServer`]
//! - [`version`]: backend version model

pub mod core;
pub mod error;
pub mod registry;
pub mod tools;
pub mod version;

pub use core::{
    apply_filters, apply_overrides, is_compatible, resolve_enabled_tools, BackendVersionResolver,
    ConfigDocument, EnvFilterSettings, FilterConfig, FilterSource, OverrideSet, ResolveOptions,
    ServerMode, ToolServer, UnresolvedVersionPolicy, VersionSource,
};

pub use error::{ConfigError, McpError, McpResult, ToolError};
pub use registry::{default_registry, EnabledToolSet, HttpMethod, ToolDescriptor, ToolKey, ToolRegistry};
pub use tools::ToolHandler;
pub use version::{ResolvedVersion, Version};
