//! Operator-supplied display name and description overrides.
//!
//! Overrides come from the `tools` section of the config document and from
//! `tool.<Key>.<field>=<value>` command-line pairs. Both apply; the command
//! line wins per field. Every entry is validated on its own and an invalid
//! entry is logged and dropped without affecting the others.

use std::{
    collections::{BTreeMap, HashMap},
    sync::LazyLock,
};

use regex::Regex;
use serde_yaml::Value;
use tracing::{debug, error, warn};

use super::config::ConfigDocument;
use crate::{
    error::ConfigError,
    registry::{ToolKey, ToolRegistry},
};

pub const DISPLAY_NAME_ALIASES: &[&str] = &["name", "displayName", "display_name", "customName"];
pub const DESCRIPTION_ALIASES: &[&str] = &["description", "desc", "customDescription"];

const DISPLAY_NAME_PATTERN: &str = r"^[a-zA-Z0-9_-]+$";

static DISPLAY_NAME_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(DISPLAY_NAME_PATTERN).ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverrideField {
    DisplayName,
    Description,
}

impl OverrideField {
    fn from_alias(alias: &str) -> Option<Self> {
        if DISPLAY_NAME_ALIASES.contains(&alias) {
            Some(Self::DisplayName)
        } else if DESCRIPTION_ALIASES.contains(&alias) {
            Some(Self::Description)
        } else {
            None
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::DisplayName => "display name",
            Self::Description => "description",
        }
    }
}

/// Replacement fields for one tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSpec {
    pub display_name: Option<String>,
    pub description: Option<String>,
}

impl OverrideSpec {
    fn set(&mut self, field: OverrideField, value: String) {
        match field {
            OverrideField::DisplayName => self.display_name = Some(value),
            OverrideField::Description => self.description = Some(value),
        }
    }

    /// Fields present in `other` replace ours.
    fn merge(&mut self, other: OverrideSpec) {
        if other.display_name.is_some() {
            self.display_name = other.display_name;
        }
        if other.description.is_some() {
            self.description = other.description;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.description.is_none()
    }
}

/// Validated overrides keyed by tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSet {
    specs: BTreeMap<ToolKey, OverrideSpec>,
}

impl OverrideSet {
    /// Collects, merges and validates overrides from both sources.
    pub fn load(
        document: Option<&ConfigDocument>,
        cli_args: &[String],
        registry: &ToolRegistry,
    ) -> Self {
        let mut merged: BTreeMap<String, OverrideSpec> = BTreeMap::new();
        if let Some(document) = document {
            merged.extend(document_overrides(document));
        }
        for (tool, spec) in cli_overrides(cli_args) {
            merged.entry(tool).or_default().merge(spec);
        }
        Self::validated(merged, registry)
    }

    /// Drops entries naming unknown tools, malformed display names, or
    /// display names that would collide with another tool.
    pub fn validated(raw: BTreeMap<String, OverrideSpec>, registry: &ToolRegistry) -> Self {
        let mut specs = BTreeMap::new();
        for (tool, spec) in raw {
            match tool.parse::<ToolKey>() {
                Ok(key) if registry.contains(key) => {
                    specs.insert(key, spec);
                }
                _ => report(ConfigError::Override {
                    reason: format!("'{tool}' is not a valid tool name"),
                    tool,
                }),
            }
        }

        // Names already spoken for: every key, and the display name of every
        // tool that is not being renamed.
        let mut taken: HashMap<String, ToolKey> = HashMap::new();
        for d in registry {
            taken.insert(d.key().as_str().to_ascii_lowercase(), d.key());
            let renamed = specs.get(&d.key()).is_some_and(|s| s.display_name.is_some());
            if !renamed {
                taken.insert(d.display_name.to_ascii_lowercase(), d.key());
            }
        }

        specs.retain(|key, spec| {
            let Some(name) = spec.display_name.as_deref() else {
                return true;
            };
            let invalid = |reason: String| ConfigError::Override {
                tool: key.to_string(),
                reason,
            };
            if !DISPLAY_NAME_RE.as_ref().is_some_and(|re| re.is_match(name)) {
                report(invalid(format!(
                    "display name '{name}' does not follow the required pattern '{DISPLAY_NAME_PATTERN}'"
                )));
                return false;
            }
            let lowered = name.to_ascii_lowercase();
            match taken.get(&lowered) {
                Some(owner) if owner != key => {
                    report(invalid(format!(
                        "display name '{name}' conflicts with tool '{owner}'"
                    )));
                    false
                }
                _ => {
                    taken.insert(lowered, *key);
                    true
                }
            }
        });

        specs.retain(|_, spec| !spec.is_empty());
        Self { specs }
    }

    pub fn get(&self, key: ToolKey) -> Option<&OverrideSpec> {
        self.specs.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ToolKey, &OverrideSpec)> {
        self.specs.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl FromIterator<(ToolKey, OverrideSpec)> for OverrideSet {
    /// Unvalidated; use [`OverrideSet::validated`] for operator input.
    fn from_iter<I: IntoIterator<Item = (ToolKey, OverrideSpec)>>(iter: I) -> Self {
        Self {
            specs: iter.into_iter().collect(),
        }
    }
}

fn report(err: ConfigError) {
    error!(error = %err, "Skipping tool override");
}

/// Copy of `registry` with overrides applied. The input is untouched and the
/// key set is preserved.
pub fn apply_overrides(registry: &ToolRegistry, overrides: &OverrideSet) -> ToolRegistry {
    let mut out = registry.clone();
    for (key, spec) in overrides.iter() {
        let Some(descriptor) = out.get_mut(key) else {
            continue;
        };
        if let Some(name) = &spec.display_name {
            debug!(tool = %key, display_name = %name, "Applying display name override");
            descriptor.display_name = name.clone();
        }
        if let Some(description) = &spec.description {
            descriptor.description = description.clone();
        }
    }
    out
}

/// Overrides from the document's `tools` section.
fn document_overrides(document: &ConfigDocument) -> BTreeMap<String, OverrideSpec> {
    let tools = match document.section::<BTreeMap<String, Option<BTreeMap<String, Value>>>>("tools")
    {
        Ok(tools) => tools.unwrap_or_default(),
        Err(e) => {
            error!(error = %e, "Ignoring tool overrides from config file");
            return BTreeMap::new();
        }
    };

    let mut out = BTreeMap::new();
    for (tool, fields) in tools {
        let fields = fields.unwrap_or_default().into_iter().filter_map(|(alias, value)| {
            match value {
                Value::String(s) => Some((alias, s)),
                Value::Number(n) => Some((alias, n.to_string())),
                Value::Bool(b) => Some((alias, b.to_string())),
                _ => {
                    warn!(tool = %tool, field = %alias, "Ignoring non-scalar override value");
                    None
                }
            }
        });
        match parse_fields(&tool, fields, "config file") {
            Ok(spec) => {
                out.insert(tool, spec);
            }
            Err(e) => report(e),
        }
    }
    out
}

/// Overrides from `tool.<Key>.<alias>=<value>` arguments.
fn cli_overrides(args: &[String]) -> BTreeMap<String, OverrideSpec> {
    let mut grouped: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
    for arg in args {
        match parse_cli_pair(arg) {
            Some((tool, alias, value)) => grouped
                .entry(tool.to_string())
                .or_default()
                .push((alias.to_string(), value.to_string())),
            None => warn!(
                argument = %arg,
                "Invalid argument will be ignored. Expected format: tool.<ToolName>.<field>=<value>"
            ),
        }
    }

    let mut out = BTreeMap::new();
    for (tool, fields) in grouped {
        match parse_fields(&tool, fields, "CLI arguments") {
            Ok(spec) => {
                out.insert(tool, spec);
            }
            Err(e) => report(e),
        }
    }
    out
}

/// Splits `tool.<Key>.<alias>=<value>`. The alias must be a known one.
pub fn parse_cli_pair(arg: &str) -> Option<(&str, &str, &str)> {
    let (path, value) = arg.split_once('=')?;
    let (tool, alias) = path.strip_prefix("tool.")?.split_once('.')?;
    let is_word = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !is_word(tool) || OverrideField::from_alias(alias).is_none() {
        return None;
    }
    Some((tool, alias, value))
}

/// Folds alias/value pairs for one tool. Two aliases for one field is an error.
fn parse_fields(
    tool: &str,
    fields: impl IntoIterator<Item = (String, String)>,
    source: &str,
) -> Result<OverrideSpec, ConfigError> {
    let mut spec = OverrideSpec::default();
    let mut seen: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();

    for (alias, value) in fields {
        let Some(field) = OverrideField::from_alias(&alias) else {
            warn!(
                tool = %tool,
                field = %alias,
                "Invalid field in {source} will be ignored. Only display_name and description are supported."
            );
            continue;
        };
        let aliases = seen.entry(field.label()).or_default();
        aliases.push(alias);
        if aliases.len() > 1 {
            return Err(ConfigError::Override {
                tool: tool.to_string(),
                reason: format!(
                    "duplicate {} field in {source}, found multiple aliases: {}",
                    field.label(),
                    aliases.join(", ")
                ),
            });
        }
        spec.set(field, value);
    }
    Ok(spec)
}
