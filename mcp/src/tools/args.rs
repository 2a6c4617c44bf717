//! Argument types for the built-in tools.
//!
//! Each struct derives both `Deserialize` (validation at dispatch) and
//! `JsonSchema` (the advertised input schema). Field doc comments become the
//! schema's property descriptions.

use rmcp::model::JsonObject;
use schemars::{generate::SchemaSettings, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

/// Fields every tool accepts and the gateway resolves itself.
///
/// In single-backend mode these are stripped from advertised schemas.
pub const BASE_TOOL_ARGS: &[&str] = &["elasticsearch_cluster_name"];

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct BaseToolArgs {
    /// The name of the Elasticsearch cluster
    #[serde(default)]
    pub elasticsearch_cluster_name: String,
}

impl BaseToolArgs {
    /// Cluster to route to; `None` means the environment-configured backend.
    pub fn cluster(&self) -> Option<&str> {
        Some(self.elasticsearch_cluster_name.as_str()).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListIndicesArgs {
    #[serde(flatten)]
    pub base: BaseToolArgs,

    /// The name of the index to get detailed information for. If provided,
    /// returns detailed information about this specific index instead of
    /// listing all indices.
    #[serde(default)]
    pub index: String,

    /// Whether to include detailed information. When listing indices (no index
    /// specified), if false, returns only a pure list of index names. If true,
    /// returns full metadata. When a specific index is provided, detailed
    /// information (including mappings) will be returned.
    #[serde(default = "default_true")]
    pub include_detail: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetIndexMappingArgs {
    #[serde(flatten)]
    pub base: BaseToolArgs,

    /// The name of the index to get mapping information for
    pub index: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchIndexArgs {
    #[serde(flatten)]
    pub base: BaseToolArgs,

    /// The name of the index to search in
    pub index: String,

    /// The search query in Elasticsearch query DSL format
    pub query: Value,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetShardsArgs {
    #[serde(flatten)]
    pub base: BaseToolArgs,

    /// The name of the index to get shard information for
    pub index: String,
}

fn default_true() -> bool {
    true
}

/// Inlined JSON schema object for `T`, without the `$schema` marker.
pub fn schema_for<T: JsonSchema>() -> JsonObject {
    let generator = SchemaSettings::draft2020_12()
        .with(|s| s.inline_subschemas = true)
        .into_generator();
    let schema = generator.into_root_schema_for::<T>();
    match serde_json::to_value(schema) {
        Ok(Value::Object(mut object)) => {
            object.remove("$schema");
            object
        }
        _ => JsonObject::new(),
    }
}

/// Removes `fields` from a schema's `properties` and `required` lists.
pub fn strip_fields(schema: &mut JsonObject, fields: &[&str]) {
    if let Some(Value::Object(properties)) = schema.get_mut("properties") {
        for field in fields {
            properties.remove(*field);
        }
    }
    if let Some(Value::Array(required)) = schema.get_mut("required") {
        required.retain(|v| v.as_str().is_none_or(|name| !fields.contains(&name)));
    }
}
