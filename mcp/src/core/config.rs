//! Configuration sources for the resolution pipeline.
//!
//! Two channels feed the filter engine: a YAML document (`--config`) and a set
//! of `ELASTICSEARCH_*` environment variables. They are mutually exclusive; when
//! a document path is given the environment is ignored entirely. Every section
//! of the document is parsed on its own so one malformed section only disables
//! itself.

use std::{collections::BTreeMap, path::Path};

use serde::{de::DeserializeOwned, Deserialize};
use serde_yaml::Value;
use tracing::{error, warn};

use crate::error::ConfigError;

pub const ENV_DISABLED_TOOLS: &str = "ELASTICSEARCH_DISABLED_TOOLS";
pub const ENV_TOOL_CATEGORIES: &str = "ELASTICSEARCH_TOOL_CATEGORIES";
pub const ENV_DISABLED_CATEGORIES: &str = "ELASTICSEARCH_DISABLED_CATEGORIES";
pub const ENV_DISABLED_TOOLS_REGEX: &str = "ELASTICSEARCH_DISABLED_TOOLS_REGEX";
pub const ENV_ALLOW_WRITE: &str = "ELASTICSEARCH_SETTINGS_ALLOW_WRITE";

/// Parsed YAML configuration document.
#[derive(Debug, Clone, Default)]
pub struct ConfigDocument {
    root: Value,
}

impl ConfigDocument {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let root = serde_yaml::from_str(contents).map_err(|source| ConfigError::Yaml {
            section: "document",
            source,
        })?;
        Ok(Self { root })
    }

    /// Deserializes one top-level section. Absent and `null` are both `None`.
    pub fn section<T: DeserializeOwned>(&self, name: &'static str) -> Result<Option<T>, ConfigError> {
        match self.root.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_yaml::from_value(value.clone())
                .map(Some)
                .map_err(|source| ConfigError::Yaml {
                    section: name,
                    source,
                }),
        }
    }

    /// Filter settings from `tool_category` and `tool_filters`.
    ///
    /// A malformed section is logged and contributes nothing.
    pub fn filter_config(&self) -> FilterConfig {
        let mut config = FilterConfig::default();

        match self.section::<BTreeMap<String, Vec<String>>>("tool_category") {
            Ok(categories) => config.tool_category = categories.unwrap_or_default(),
            Err(e) => error!(error = %e, "Ignoring tool categories from config file"),
        }

        match self.section::<RawToolFilters>("tool_filters") {
            Ok(Some(filters)) => {
                config.disabled_tools = filters.disabled_tools.unwrap_or_default();
                config.disabled_categories = filters.disabled_categories.unwrap_or_default();
                config.disabled_tools_regex = filters.disabled_tools_regex.unwrap_or_default();
                if let Some(allow_write) = filters.settings.and_then(|s| s.allow_write) {
                    config.allow_write = allow_write;
                }
            }
            Ok(None) => {}
            Err(e) => error!(error = %e, "Ignoring tool filters from config file"),
        }

        config
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawToolFilters {
    #[serde(default)]
    disabled_tools: Option<Vec<String>>,
    #[serde(default)]
    disabled_categories: Option<Vec<String>>,
    #[serde(default)]
    disabled_tools_regex: Option<Vec<String>>,
    #[serde(default)]
    settings: Option<RawFilterSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFilterSettings {
    #[serde(default)]
    allow_write: Option<bool>,
}

/// Resolved filter settings, consumed read-only by the filter engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Display names, matched case-insensitively.
    pub disabled_tools: Vec<String>,
    pub disabled_categories: Vec<String>,
    /// Case-insensitive patterns anchored at the start of a display name.
    pub disabled_tools_regex: Vec<String>,
    /// Category name to display names.
    pub tool_category: BTreeMap<String, Vec<String>>,
    /// When false only tools with a read-only verb survive.
    pub allow_write: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            disabled_tools: Vec::new(),
            disabled_categories: Vec::new(),
            disabled_tools_regex: Vec::new(),
            tool_category: BTreeMap::new(),
            allow_write: true,
        }
    }
}

impl FilterConfig {
    /// Picks exactly one source. The document wins over the environment.
    ///
    /// The returned [`FilterSource`] records which channel was used and
    /// whether environment settings were shadowed by the document.
    pub fn resolve(document: Option<&ConfigDocument>, env: &EnvFilterSettings) -> (Self, FilterSource) {
        match document {
            Some(document) => (
                document.filter_config(),
                FilterSource::Document {
                    env_ignored: env.is_present(),
                },
            ),
            None => (env.to_filter_config(), FilterSource::Environment),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.allow_write
            && self.disabled_tools.is_empty()
            && self.disabled_categories.is_empty()
            && self.disabled_tools_regex.is_empty()
    }
}

/// Channel the filter settings were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    /// The config document. `env_ignored` is set when environment settings
    /// were also present and got shadowed.
    Document { env_ignored: bool },
    Environment,
}

impl FilterSource {
    /// Message for the precedence conflict, if there was one.
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            Self::Document { env_ignored: true } => {
                Some("Both config file and environment variables are set. Using config file.")
            }
            _ => None,
        }
    }
}

/// Raw environment-style filter settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFilterSettings {
    pub disabled_tools: Option<String>,
    /// JSON object of category name to display names.
    pub tool_categories: Option<String>,
    pub disabled_categories: Option<String>,
    pub disabled_tools_regex: Option<String>,
    pub allow_write: Option<String>,
}

impl EnvFilterSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            disabled_tools: get(ENV_DISABLED_TOOLS),
            tool_categories: get(ENV_TOOL_CATEGORIES),
            disabled_categories: get(ENV_DISABLED_CATEGORIES),
            disabled_tools_regex: get(ENV_DISABLED_TOOLS_REGEX),
            allow_write: get(ENV_ALLOW_WRITE),
        }
    }

    /// True when any variable is set.
    pub fn is_present(&self) -> bool {
        self.disabled_tools.is_some()
            || self.tool_categories.is_some()
            || self.disabled_categories.is_some()
            || self.disabled_tools_regex.is_some()
            || self.allow_write.is_some()
    }

    /// Parses the raw values. Invalid category JSON is logged and dropped.
    pub fn to_filter_config(&self) -> FilterConfig {
        let tool_category = match self.tool_categories.as_deref().map(parse_categories) {
            Some(Ok(categories)) => categories,
            Some(Err(e)) => {
                warn!(error = %e, "Invalid JSON in tool categories");
                BTreeMap::new()
            }
            None => BTreeMap::new(),
        };

        FilterConfig {
            disabled_tools: split_list(self.disabled_tools.as_deref()),
            disabled_categories: split_list(self.disabled_categories.as_deref()),
            disabled_tools_regex: split_list(self.disabled_tools_regex.as_deref()),
            tool_category,
            allow_write: self
                .allow_write
                .as_deref()
                .is_none_or(|v| v.trim().eq_ignore_ascii_case("true")),
        }
    }
}

fn parse_categories(raw: &str) -> Result<BTreeMap<String, Vec<String>>, ConfigError> {
    serde_json::from_str(raw).map_err(|source| ConfigError::Json {
        field: ENV_TOOL_CATEGORIES,
        source,
    })
}

/// Comma-separated list; entries are trimmed and blanks dropped.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvFilterSettings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvFilterSettings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(Some(" a, b ,,c ")), vec!["a", "b", "c"]);
        assert!(split_list(Some("")).is_empty());
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn test_document_filter_config() {
        let doc = ConfigDocument::from_yaml_str(
            r#"
tool_category:
  critical: [SearchIndexTool, GetShardsTool]
tool_filters:
  disabled_tools: [ListIndexTool]
  disabled_categories: [critical]
  disabled_tools_regex: ["index.*"]
  settings:
    allow_write: false
"#,
        )
        .unwrap();

        let config = doc.filter_config();
        assert_eq!(config.disabled_tools, vec!["ListIndexTool"]);
        assert_eq!(config.disabled_categories, vec!["critical"]);
        assert_eq!(config.disabled_tools_regex, vec!["index.*"]);
        assert_eq!(config.tool_category["critical"].len(), 2);
        assert!(!config.allow_write);
    }

    #[test]
    fn test_document_allow_write_defaults_true() {
        let doc = ConfigDocument::from_yaml_str("tool_filters:\n  disabled_tools: []\n").unwrap();
        assert!(doc.filter_config().allow_write);

        let doc = ConfigDocument::from_yaml_str("tool_filters:\n  settings: {}\n").unwrap();
        assert!(doc.filter_config().allow_write);
    }

    #[test]
    fn test_malformed_section_is_isolated() {
        let doc = ConfigDocument::from_yaml_str(
            r#"
tool_category: "not a mapping"
tool_filters:
  disabled_tools: [GetShardsTool]
"#,
        )
        .unwrap();
        let config = doc.filter_config();
        assert!(config.tool_category.is_empty());
        assert_eq!(config.disabled_tools, vec!["GetShardsTool"]);
    }

    #[test]
    fn test_null_lists_are_empty() {
        let doc = ConfigDocument::from_yaml_str("tool_filters:\n  disabled_tools:\n").unwrap();
        assert_eq!(doc.filter_config(), FilterConfig::default());
    }

    #[test]
    fn test_empty_document() {
        let doc = ConfigDocument::from_yaml_str("").unwrap();
        assert_eq!(doc.filter_config(), FilterConfig::default());
        assert!(doc.section::<Value>("tools").unwrap().is_none());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = ConfigDocument::from_yaml_str("tools: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { section: "document", .. }));
    }

    #[test]
    fn test_env_filter_config() {
        let settings = env(&[
            (ENV_DISABLED_TOOLS, "ListIndexTool, GetShardsTool"),
            (ENV_TOOL_CATEGORIES, r#"{"risky": ["SearchIndexTool"]}"#),
            (ENV_DISABLED_CATEGORIES, "risky"),
            (ENV_DISABLED_TOOLS_REGEX, "get.*"),
            (ENV_ALLOW_WRITE, "FALSE"),
        ]);
        assert!(settings.is_present());

        let config = settings.to_filter_config();
        assert_eq!(config.disabled_tools, vec!["ListIndexTool", "GetShardsTool"]);
        assert_eq!(config.tool_category["risky"], vec!["SearchIndexTool"]);
        assert_eq!(config.disabled_categories, vec!["risky"]);
        assert_eq!(config.disabled_tools_regex, vec!["get.*"]);
        assert!(!config.allow_write);
    }

    #[test]
    fn test_env_defaults() {
        let settings = env(&[]);
        assert!(!settings.is_present());
        assert_eq!(settings.to_filter_config(), FilterConfig::default());
        assert!(FilterConfig::default().is_empty());
    }

    #[test]
    fn test_env_allow_write_only_true_is_true() {
        assert!(env(&[(ENV_ALLOW_WRITE, "True")]).to_filter_config().allow_write);
        assert!(!env(&[(ENV_ALLOW_WRITE, "1")]).to_filter_config().allow_write);
    }

    #[test]
    fn test_env_invalid_category_json_is_dropped() {
        let config = env(&[
            (ENV_TOOL_CATEGORIES, "{not json"),
            (ENV_DISABLED_TOOLS, "GetShardsTool"),
        ])
        .to_filter_config();
        assert!(config.tool_category.is_empty());
        assert_eq!(config.disabled_tools, vec!["GetShardsTool"]);
    }

    #[test]
    fn test_document_wins_over_environment() {
        let doc = ConfigDocument::from_yaml_str("tool_filters:\n  disabled_tools: [GetShardsTool]\n")
            .unwrap();
        let settings = env(&[(ENV_DISABLED_TOOLS, "ListIndexTool"), (ENV_ALLOW_WRITE, "false")]);

        let (config, source) = FilterConfig::resolve(Some(&doc), &settings);
        assert_eq!(config.disabled_tools, vec!["GetShardsTool"]);
        assert!(config.allow_write);
        assert_eq!(source, FilterSource::Document { env_ignored: true });
        assert!(source.warning().is_some());

        let (config, source) = FilterConfig::resolve(None, &settings);
        assert_eq!(config.disabled_tools, vec!["ListIndexTool"]);
        assert!(!config.allow_write);
        assert_eq!(source, FilterSource::Environment);
        assert!(source.warning().is_none());
    }

    #[test]
    fn test_document_alone_has_no_precedence_warning() {
        let doc = ConfigDocument::from_yaml_str("tool_filters:\n  disabled_tools: [GetShardsTool]\n")
            .unwrap();
        let (_, source) = FilterConfig::resolve(Some(&doc), &env(&[]));
        assert_eq!(source, FilterSource::Document { env_ignored: false });
        assert!(source.warning().is_none());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = ConfigDocument::load("/nonexistent/es-mcp.yaml").await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"tool_filters:\n  disabled_tools: [X]\n").unwrap();
        let doc = ConfigDocument::load(file.path()).await.unwrap();
        assert_eq!(doc.filter_config().disabled_tools, vec!["X"]);
    }
}
