//! Enable/disable filtering of the working registry.
//!
//! Stages run in a fixed order:
//! 1. write filter (drop tools without a read-only verb unless writes are allowed)
//! 2. category expansion
//! 3. regex expansion against the display names that survived stage 1
//! 4. case-insensitive validation of every collected name
//! 5. removal
//!
//! Unknown names, unknown categories and invalid patterns are warnings, never
//! errors.

use std::collections::{BTreeSet, HashMap};

use regex::{Regex, RegexBuilder};
use tracing::{info, warn};

use super::config::FilterConfig;
use crate::{
    error::ConfigError,
    registry::{ToolKey, ToolRegistry},
};

/// What a filter pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Dropped by the write filter, in registration order.
    pub write_filtered: Vec<ToolKey>,
    /// Dropped by name, category or pattern, in registration order.
    pub disabled: Vec<ToolKey>,
    /// Names that matched no tool.
    pub unknown_names: Vec<String>,
    pub unknown_categories: Vec<String>,
}

impl FilterOutcome {
    pub fn removed(&self) -> impl Iterator<Item = ToolKey> + '_ {
        self.write_filtered.iter().chain(&self.disabled).copied()
    }
}

/// Filters `registry` in place.
pub fn apply_filters(registry: &mut ToolRegistry, config: &FilterConfig) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    if !config.allow_write {
        outcome.write_filtered = registry
            .iter()
            .filter(|d| !d.has_read_method())
            .map(|d| d.key())
            .collect();
        registry.retain(|d| d.has_read_method());
    }

    let from_categories = expand_categories(config, &mut outcome.unknown_categories);

    let current: Vec<String> = registry.iter().map(|d| d.display_name.clone()).collect();
    let from_regex = expand_patterns(&config.disabled_tools_regex, &current);

    let by_name: HashMap<String, ToolKey> = registry
        .iter()
        .map(|d| (d.display_name.to_lowercase(), d.key()))
        .collect();

    let mut to_remove = BTreeSet::new();
    for (source, names) in [
        ("disabled_tools", &config.disabled_tools),
        ("disabled_categories", &from_categories),
        ("disabled_tools_regex", &from_regex),
    ] {
        for name in names {
            match by_name.get(&name.to_lowercase()) {
                Some(key) => {
                    to_remove.insert(*key);
                }
                None => {
                    warn!(tool = %name, source, "Ignoring unknown tool in filter list");
                    outcome.unknown_names.push(name.clone());
                }
            }
        }
    }

    for key in &to_remove {
        registry.remove(*key);
    }
    outcome.disabled = to_remove.into_iter().collect();

    let available: Vec<&str> = registry.iter().map(|d| d.display_name.as_str()).collect();
    info!(?available, "Applied tool filter");
    outcome
}

fn expand_categories(config: &FilterConfig, unknown: &mut Vec<String>) -> Vec<String> {
    let mut names = Vec::new();
    for category in &config.disabled_categories {
        match config.tool_category.get(category) {
            Some(tools) => names.extend(tools.iter().cloned()),
            None => {
                warn!(category = %category, "Category not found in tool categories");
                unknown.push(category.clone());
            }
        }
    }
    names
}

/// Case-insensitive, anchored at the start of the name.
pub fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(&format!("^(?:{pattern})"))
        .case_insensitive(true)
        .build()
        .map_err(|source| ConfigError::Regex {
            pattern: pattern.to_string(),
            source,
        })
}

fn expand_patterns(patterns: &[String], names: &[String]) -> Vec<String> {
    let mut matched = Vec::new();
    for pattern in patterns {
        let re = match compile_pattern(pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!(error = %e, "Ignoring disabled tool pattern");
                continue;
            }
        };
        matched.extend(names.iter().filter(|n| re.is_match(n)).cloned());
    }
    matched
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rmcp::model::JsonObject;

    use super::*;
    use crate::{
        registry::{HttpMethod, ToolDescriptor},
        tools::testing::NoopHandler,
    };

    fn tool(key: ToolKey, name: &str, methods: &[HttpMethod]) -> ToolDescriptor {
        ToolDescriptor::new(key, "test", JsonObject::new(), Arc::new(NoopHandler))
            .with_display_name(name)
            .with_methods(methods.iter().copied())
    }

    fn registry() -> ToolRegistry {
        [
            tool(ToolKey::ListIndex, "ListIndexTool", &[HttpMethod::Get]),
            tool(ToolKey::IndexMapping, "IndexGetTool", &[HttpMethod::Get]),
            tool(ToolKey::SearchIndex, "WriteTool", &[HttpMethod::Put]),
            tool(ToolKey::GetShards, "GetShardsTool", &[HttpMethod::Get]),
        ]
        .into_iter()
        .collect()
    }

    fn names(registry: &ToolRegistry) -> Vec<&str> {
        registry.iter().map(|d| d.display_name.as_str()).collect()
    }

    #[test]
    fn test_empty_config_keeps_everything() {
        let mut reg = registry();
        let outcome = apply_filters(&mut reg, &FilterConfig::default());
        assert_eq!(reg.len(), 4);
        assert_eq!(outcome, FilterOutcome::default());
    }

    #[test]
    fn test_write_filter() {
        let mut reg = registry();
        let config = FilterConfig {
            allow_write: false,
            ..Default::default()
        };
        let outcome = apply_filters(&mut reg, &config);
        assert_eq!(names(&reg), vec!["ListIndexTool", "IndexGetTool", "GetShardsTool"]);
        assert_eq!(outcome.write_filtered, vec![ToolKey::SearchIndex]);
        assert!(reg.iter().all(|d| d.has_read_method()));
    }

    #[test]
    fn test_disabled_names_case_insensitive() {
        let mut reg = registry();
        let config = FilterConfig {
            disabled_tools: vec!["listindextool".to_string(), "NoSuchTool".to_string()],
            ..Default::default()
        };
        let outcome = apply_filters(&mut reg, &config);
        assert_eq!(names(&reg), vec!["IndexGetTool", "WriteTool", "GetShardsTool"]);
        assert_eq!(outcome.unknown_names, vec!["NoSuchTool".to_string()]);
    }

    #[test]
    fn test_regex_anchored_at_start() {
        let mut reg = registry();
        let config = FilterConfig {
            disabled_tools_regex: vec!["Get.*".to_string()],
            ..Default::default()
        };
        apply_filters(&mut reg, &config);
        assert_eq!(names(&reg), vec!["ListIndexTool", "IndexGetTool", "WriteTool"]);
    }

    #[test]
    fn test_regex_case_insensitive() {
        let mut reg = registry();
        let config = FilterConfig {
            disabled_tools_regex: vec!["index".to_string()],
            ..Default::default()
        };
        apply_filters(&mut reg, &config);
        assert!(reg.get(ToolKey::IndexMapping).is_none());
        assert!(reg.get(ToolKey::ListIndex).is_some());
    }

    #[test]
    fn test_invalid_regex_is_skipped() {
        let mut reg = registry();
        let config = FilterConfig {
            disabled_tools_regex: vec!["(unclosed".to_string(), "Write".to_string()],
            ..Default::default()
        };
        apply_filters(&mut reg, &config);
        assert_eq!(names(&reg), vec!["ListIndexTool", "IndexGetTool", "GetShardsTool"]);
        assert!(compile_pattern("(unclosed").is_err());
    }

    #[test]
    fn test_categories() {
        let mut reg = registry();
        let config = FilterConfig {
            disabled_categories: vec!["risky".to_string(), "ghost".to_string()],
            tool_category: [(
                "risky".to_string(),
                vec!["GetShardsTool".to_string(), "Missing".to_string()],
            )]
            .into_iter()
            .collect(),
            ..Default::default()
        };
        let outcome = apply_filters(&mut reg, &config);
        assert!(reg.get(ToolKey::GetShards).is_none());
        assert_eq!(reg.len(), 3);
        assert_eq!(outcome.unknown_categories, vec!["ghost".to_string()]);
        assert_eq!(outcome.unknown_names, vec!["Missing".to_string()]);
    }

    #[test]
    fn test_unknown_entries_do_not_change_result() {
        let base = FilterConfig {
            disabled_tools: vec!["WriteTool".to_string()],
            ..Default::default()
        };
        let noisy = FilterConfig {
            disabled_tools: vec!["WriteTool".to_string(), "Nope".to_string()],
            disabled_categories: vec!["absent".to_string()],
            ..Default::default()
        };

        let mut a = registry();
        let mut b = registry();
        apply_filters(&mut a, &base);
        apply_filters(&mut b, &noisy);
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn test_write_filtered_tool_named_explicitly_is_unknown() {
        let mut reg = registry();
        let config = FilterConfig {
            allow_write: false,
            disabled_tools: vec!["WriteTool".to_string()],
            ..Default::default()
        };
        let outcome = apply_filters(&mut reg, &config);
        assert_eq!(outcome.unknown_names, vec!["WriteTool".to_string()]);
        assert_eq!(outcome.removed().collect::<Vec<_>>(), vec![ToolKey::SearchIndex]);
    }

    #[test]
    fn test_read_write_pair_scenario() {
        let mut reg: ToolRegistry = [
            tool(ToolKey::ListIndex, "A", &[HttpMethod::Get]),
            tool(ToolKey::SearchIndex, "B", &[HttpMethod::Put]),
        ]
        .into_iter()
        .collect();
        apply_filters(
            &mut reg,
            &FilterConfig {
                allow_write: false,
                ..Default::default()
            },
        );
        assert_eq!(names(&reg), vec!["A"]);
    }
}
