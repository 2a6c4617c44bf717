//! Backend version model.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Semantic version (major, minor, patch). Pre-release and build suffixes
/// are accepted on parse and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version '{0}': expected MAJOR.MINOR.PATCH")]
pub struct VersionParseError(String);

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionParseError(raw.to_string());
        let clean = raw.trim().trim_start_matches('v');
        let base = clean
            .split(['-', '+'])
            .next()
            .filter(|b| !b.is_empty())
            .ok_or_else(invalid)?;

        let mut parts = base.split('.');
        let mut next = || -> Result<u64, VersionParseError> {
            parts
                .next()
                .and_then(|p| p.parse::<u64>().ok())
                .ok_or_else(invalid)
        };
        let version = Version::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Outcome of asking the backend for its version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvedVersion {
    Known(Version),
    #[default]
    Unresolved,
}

impl ResolvedVersion {
    pub fn known(&self) -> Option<Version> {
        match self {
            ResolvedVersion::Known(v) => Some(*v),
            ResolvedVersion::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolvedVersion::Known(_))
    }
}

impl From<Version> for ResolvedVersion {
    fn from(v: Version) -> Self {
        ResolvedVersion::Known(v)
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedVersion::Known(v) => v.fmt(f),
            ResolvedVersion::Unresolved => f.write_str("unknown"),
        }
    }
}
