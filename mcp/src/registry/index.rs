//! Keyed tool collections.
//!
//! [`ToolRegistry`] is the working set each pipeline stage transforms;
//! [`EnabledToolSet`] is the final, read-only result that the server
//! advertises and dispatches against.

use std::collections::{btree_map, BTreeMap, BTreeSet};

use rmcp::model::Tool;

use super::types::{ToolDescriptor, ToolKey};

/// Descriptors keyed by [`ToolKey`], iterated in registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<ToolKey, ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any descriptor already registered under the same key.
    pub fn insert(&mut self, descriptor: ToolDescriptor) -> Option<ToolDescriptor> {
        self.tools.insert(descriptor.key(), descriptor)
    }

    pub fn get(&self, key: ToolKey) -> Option<&ToolDescriptor> {
        self.tools.get(&key)
    }

    pub fn get_mut(&mut self, key: ToolKey) -> Option<&mut ToolDescriptor> {
        self.tools.get_mut(&key)
    }

    pub fn remove(&mut self, key: ToolKey) -> Option<ToolDescriptor> {
        self.tools.remove(&key)
    }

    pub fn contains(&self, key: ToolKey) -> bool {
        self.tools.contains_key(&key)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&ToolDescriptor) -> bool) {
        self.tools.retain(|_, d| keep(d));
    }

    pub fn iter(&self) -> btree_map::Values<'_, ToolKey, ToolDescriptor> {
        self.tools.values()
    }

    pub fn iter_mut(&mut self) -> btree_map::ValuesMut<'_, ToolKey, ToolDescriptor> {
        self.tools.values_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = ToolKey> + '_ {
        self.tools.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Exact display-name match; first in registration order on collision.
    pub fn find_by_display_name(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.values().find(|d| d.display_name == name)
    }

    /// Display names shared by more than one descriptor.
    pub fn duplicate_display_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut dups = BTreeSet::new();
        for d in self.tools.values() {
            if !seen.insert(d.display_name.as_str()) {
                dups.insert(d.display_name.clone());
            }
        }
        dups.into_iter().collect()
    }
}

impl FromIterator<ToolDescriptor> for ToolRegistry {
    fn from_iter<I: IntoIterator<Item = ToolDescriptor>>(iter: I) -> Self {
        let mut registry = Self::new();
        for d in iter {
            registry.insert(d);
        }
        registry
    }
}

impl<'a> IntoIterator for &'a ToolRegistry {
    type Item = &'a ToolDescriptor;
    type IntoIter = btree_map::Values<'a, ToolKey, ToolDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The tools a running server exposes. Computed once, then immutable.
#[derive(Debug, Clone, Default)]
pub struct EnabledToolSet {
    tools: ToolRegistry,
}

impl EnabledToolSet {
    pub fn new(tools: ToolRegistry) -> Self {
        Self { tools }
    }

    /// Protocol tool definitions in registration order.
    pub fn advertised(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolDescriptor::to_tool).collect()
    }

    /// Reverse lookup used by dispatch. Linear scan, first match wins.
    pub fn find_by_display_name(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.find_by_display_name(name)
    }

    pub fn get(&self, key: ToolKey) -> Option<&ToolDescriptor> {
        self.tools.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = ToolKey> + '_ {
        self.tools.keys()
    }

    pub fn display_names(&self) -> Vec<String> {
        self.tools.iter().map(|d| d.display_name.clone()).collect()
    }

    pub fn duplicate_display_names(&self) -> Vec<String> {
        self.tools.duplicate_display_names()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
