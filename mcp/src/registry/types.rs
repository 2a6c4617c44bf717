//! Core types for the tool registry.

use std::{collections::BTreeSet, fmt, str::FromStr, sync::Arc};

use rmcp::model::{JsonObject, Tool};
use serde::{Deserialize, Serialize};

use crate::{tools::ToolHandler, version::Version};

/// Stable internal identity of a tool.
///
/// Declaration order is registration order; registries iterate in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ToolKey {
    #[serde(rename = "ListIndexTool")]
    ListIndex,
    #[serde(rename = "IndexMappingTool")]
    IndexMapping,
    #[serde(rename = "SearchIndexTool")]
    SearchIndex,
    #[serde(rename = "GetShardsTool")]
    GetShards,
}

impl ToolKey {
    pub const ALL: [ToolKey; 4] = [
        ToolKey::ListIndex,
        ToolKey::IndexMapping,
        ToolKey::SearchIndex,
        ToolKey::GetShards,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKey::ListIndex => "ListIndexTool",
            ToolKey::IndexMapping => "IndexMappingTool",
            ToolKey::SearchIndex => "SearchIndexTool",
            ToolKey::GetShards => "GetShardsTool",
        }
    }
}

impl fmt::Display for ToolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid tool name")]
pub struct UnknownToolKey(pub String);

impl FromStr for ToolKey {
    type Err = UnknownToolKey;

    /// Case-sensitive, matching how overrides address tools.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownToolKey(s.to_string()))
    }
}

/// HTTP verbs a tool issues against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn is_read_only(&self) -> bool {
        matches!(self, HttpMethod::Get)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tool metadata: identity, advertised shape, handler and compatibility bounds.
#[derive(Clone)]
pub struct ToolDescriptor {
    key: ToolKey,
    pub display_name: String,
    pub description: String,
    pub input_schema: Arc<JsonObject>,
    pub handler: Arc<dyn ToolHandler>,
    /// Inclusive lower bound; `None` is unbounded.
    pub min_version: Option<Version>,
    /// Inclusive upper bound; `None` is unbounded.
    pub max_version: Option<Version>,
    pub http_methods: BTreeSet<HttpMethod>,
}

impl ToolDescriptor {
    /// Display name defaults to the key.
    pub fn new(
        key: ToolKey,
        description: impl Into<String>,
        input_schema: JsonObject,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            key,
            display_name: key.as_str().to_string(),
            description: description.into(),
            input_schema: Arc::new(input_schema),
            handler,
            min_version: None,
            max_version: None,
            http_methods: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_min_version(mut self, version: Version) -> Self {
        self.min_version = Some(version);
        self
    }

    #[must_use]
    pub fn with_max_version(mut self, version: Version) -> Self {
        self.max_version = Some(version);
        self
    }

    #[must_use]
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.http_methods.extend(methods);
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn key(&self) -> ToolKey {
        self.key
    }

    /// True when at least one verb is read-only.
    pub fn has_read_method(&self) -> bool {
        self.http_methods.iter().any(HttpMethod::is_read_only)
    }

    /// Protocol-level tool definition as advertised to callers.
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.display_name.clone().into(),
            title: None,
            description: Some(self.description.clone().into()),
            input_schema: Arc::clone(&self.input_schema),
            output_schema: None,
            annotations: None,
            icons: None,
        }
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("key", &self.key)
            .field("display_name", &self.display_name)
            .field("description", &self.description)
            .field("min_version", &self.min_version)
            .field("max_version", &self.max_version)
            .field("http_methods", &self.http_methods)
            .finish_non_exhaustive()
    }
}
