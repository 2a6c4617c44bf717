//! Version compatibility between a tool's bounds and a backend.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    registry::ToolDescriptor,
    version::{ResolvedVersion, Version},
};

/// What to do with tools when the backend version could not be determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedVersionPolicy {
    /// Treat every tool as compatible.
    #[default]
    FailOpen,
    /// Treat every bounded tool as incompatible. Unbounded tools still pass.
    FailClosed,
}

impl FromStr for UnresolvedVersionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" | "fail_open" | "fail-open" => Ok(Self::FailOpen),
            "closed" | "fail_closed" | "fail-closed" => Ok(Self::FailClosed),
            other => Err(format!("unknown unresolved-version policy '{other}'")),
        }
    }
}

impl fmt::Display for UnresolvedVersionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailOpen => f.write_str("open"),
            Self::FailClosed => f.write_str("closed"),
        }
    }
}

/// Inclusive bound check. Unbounded tools are compatible with anything.
pub fn version_in_bounds(version: &Version, min: Option<&Version>, max: Option<&Version>) -> bool {
    min.is_none_or(|min| version >= min) && max.is_none_or(|max| version <= max)
}

/// Compatibility under the default fail-open policy.
pub fn is_compatible(version: &ResolvedVersion, descriptor: &ToolDescriptor) -> bool {
    is_compatible_with_policy(version, descriptor, UnresolvedVersionPolicy::FailOpen)
}

pub fn is_compatible_with_policy(
    version: &ResolvedVersion,
    descriptor: &ToolDescriptor,
    policy: UnresolvedVersionPolicy,
) -> bool {
    let (min, max) = (descriptor.min_version.as_ref(), descriptor.max_version.as_ref());
    match version {
        ResolvedVersion::Known(v) => version_in_bounds(v, min, max),
        ResolvedVersion::Unresolved => match policy {
            UnresolvedVersionPolicy::FailOpen => true,
            UnresolvedVersionPolicy::FailClosed => min.is_none() && max.is_none(),
        },
    }
}

/// Human-readable supported range, `None` for unbounded tools.
pub fn supported_range(descriptor: &ToolDescriptor) -> Option<String> {
    match (&descriptor.min_version, &descriptor.max_version) {
        (Some(min), Some(max)) => Some(format!("{min} to {max}")),
        (Some(min), None) => Some(format!("{min} or later")),
        (None, Some(max)) => Some(format!("up to {max}")),
        (None, None) => None,
    }
}

/// Message reported when a call is refused on version grounds.
pub fn incompatibility_message(descriptor: &ToolDescriptor, version: &ResolvedVersion) -> String {
    let mut message = format!(
        "Tool '{}' is not supported for this Elasticsearch version (current version: {version}).",
        descriptor.display_name
    );
    if let Some(range) = supported_range(descriptor) {
        message.push_str(&format!(" Supported version: {range}."));
    }
    message
}
