//! Handlers for the four built-in tools.

use async_trait::async_trait;
use es_client::SearchBackend;
use rmcp::model::Content;
use serde_json::Value;

use super::{
    args::{GetIndexMappingArgs, GetShardsArgs, ListIndicesArgs, SearchIndexArgs},
    ToolHandler,
};
use crate::error::ToolError;

const SHARD_COLUMNS: [&str; 8] = ["index", "shard", "prirep", "state", "docs", "store", "ip", "node"];

fn pretty(value: &Value) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value).map_err(|e| ToolError::UnexpectedResponse(e.to_string()))
}

fn text(body: String) -> Vec<Content> {
    vec![Content::text(body)]
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ListIndicesHandler;

#[async_trait]
impl ToolHandler for ListIndicesHandler {
    fn error_prefix(&self) -> &'static str {
        "Error listing indices: "
    }

    async fn invoke(
        &self,
        backend: &dyn SearchBackend,
        args: Value,
    ) -> Result<Vec<Content>, ToolError> {
        let args: ListIndicesArgs = serde_json::from_value(args)?;

        if !args.index.is_empty() {
            let info = backend.get_index(&args.index).await?;
            return Ok(text(format!(
                "Index information for {}:\n{}",
                args.index,
                pretty(&info)?
            )));
        }

        let indices = backend.cat_indices().await?;
        if !args.include_detail {
            let names: Vec<Value> = indices
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|row| row.get("index").cloned())
                .collect();
            return Ok(text(format!("Indices:\n{}", pretty(&Value::Array(names))?)));
        }

        Ok(text(format!("All indices information:\n{}", pretty(&indices)?)))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IndexMappingHandler;

#[async_trait]
impl ToolHandler for IndexMappingHandler {
    fn error_prefix(&self) -> &'static str {
        "Error getting mapping: "
    }

    async fn invoke(
        &self,
        backend: &dyn SearchBackend,
        args: Value,
    ) -> Result<Vec<Content>, ToolError> {
        let args: GetIndexMappingArgs = serde_json::from_value(args)?;
        let mapping = backend.get_mapping(&args.index).await?;
        Ok(text(format!("Mapping for {}:\n{}", args.index, pretty(&mapping)?)))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SearchIndexHandler;

#[async_trait]
impl ToolHandler for SearchIndexHandler {
    fn error_prefix(&self) -> &'static str {
        "Error searching index: "
    }

    async fn invoke(
        &self,
        backend: &dyn SearchBackend,
        args: Value,
    ) -> Result<Vec<Content>, ToolError> {
        let args: SearchIndexArgs = serde_json::from_value(args)?;
        let result = backend.search(&args.index, &args.query).await?;
        Ok(text(format!(
            "Search results from {}:\n{}",
            args.index,
            pretty(&result)?
        )))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GetShardsHandler;

#[async_trait]
impl ToolHandler for GetShardsHandler {
    fn error_prefix(&self) -> &'static str {
        "Error getting shards information: "
    }

    async fn invoke(
        &self,
        backend: &dyn SearchBackend,
        args: Value,
    ) -> Result<Vec<Content>, ToolError> {
        let args: GetShardsArgs = serde_json::from_value(args)?;
        let shards = backend.cat_shards(&args.index).await?;
        if let Some(error) = shards.get("error") {
            return Ok(text(format!("Error getting shards: {}", cell(Some(error)))));
        }
        let rows = shards.as_array().ok_or_else(|| {
            ToolError::UnexpectedResponse("expected an array of shard records".to_string())
        })?;
        Ok(text(shard_table(rows)))
    }
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn shard_table(rows: &[Value]) -> String {
    let mut out = SHARD_COLUMNS.join(" | ");
    out.push('\n');
    for row in rows {
        let cells: Vec<String> = SHARD_COLUMNS.iter().map(|c| cell(row.get(*c))).collect();
        out.push_str(&cells.join(" | "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tools::testing::{text_of, MockBackend};

    #[tokio::test]
    async fn test_list_indices_names_only() {
        let backend = MockBackend::new(
            Some("8.11.0"),
            json!([{"index": "logs", "docs.count": "3"}, {"index": "metrics"}, {"health": "green"}]),
        );
        let out = ListIndicesHandler
            .invoke(&backend, json!({"include_detail": false}))
            .await
            .unwrap();
        assert_eq!(
            text_of(&out),
            "Indices:\n[\n  \"logs\",\n  \"metrics\"\n]"
        );
    }

    #[tokio::test]
    async fn test_list_indices_detail_and_single_index() {
        let backend = MockBackend::new(Some("8.11.0"), json!([{"index": "logs"}]));
        let out = ListIndicesHandler.invoke(&backend, json!({})).await.unwrap();
        assert!(text_of(&out).starts_with("All indices information:\n["));

        let out = ListIndicesHandler
            .invoke(&backend, json!({"index": "logs"}))
            .await
            .unwrap();
        assert!(text_of(&out).starts_with("Index information for logs:\n"));
    }

    #[tokio::test]
    async fn test_mapping_and_search_format() {
        let backend = MockBackend::new(Some("8.11.0"), json!({"ok": true}));
        let out = IndexMappingHandler
            .invoke(&backend, json!({"index": "logs"}))
            .await
            .unwrap();
        assert_eq!(text_of(&out), "Mapping for logs:\n{\n  \"ok\": true\n}");

        let out = SearchIndexHandler
            .invoke(&backend, json!({"index": "logs", "query": {"match_all": {}}}))
            .await
            .unwrap();
        assert!(text_of(&out).starts_with("Search results from logs:\n"));
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let backend = MockBackend::new(Some("8.11.0"), json!({}));
        let err = IndexMappingHandler.invoke(&backend, json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_shard_table() {
        let backend = MockBackend::new(
            Some("8.11.0"),
            json!([{
                "index": "logs", "shard": "0", "prirep": "p", "state": "STARTED",
                "docs": "10", "store": "1kb", "ip": "10.0.0.1", "node": "n1"
            }, {
                "index": "logs", "shard": "0", "prirep": "r", "state": "UNASSIGNED",
                "docs": null, "store": null, "ip": null, "node": null
            }]),
        );
        let out = GetShardsHandler
            .invoke(&backend, json!({"index": "logs"}))
            .await
            .unwrap();
        assert_eq!(
            text_of(&out),
            "index | shard | prirep | state | docs | store | ip | node\n\
             logs | 0 | p | STARTED | 10 | 1kb | 10.0.0.1 | n1\n\
             logs | 0 | r | UNASSIGNED |  |  |  | \n"
        );
    }

    #[tokio::test]
    async fn test_shards_surfaces_backend_error() {
        let backend = MockBackend::new(Some("8.11.0"), json!({"error": "index_not_found_exception"}));
        let out = GetShardsHandler
            .invoke(&backend, json!({"index": "missing"}))
            .await
            .unwrap();
        assert_eq!(text_of(&out), "Error getting shards: index_not_found_exception");

        let backend = MockBackend::new(Some("8.11.0"), json!({"error": {"type": "security_exception"}}));
        let out = GetShardsHandler
            .invoke(&backend, json!({"index": "logs"}))
            .await
            .unwrap();
        assert_eq!(
            text_of(&out),
            r#"Error getting shards: {"type":"security_exception"}"#
        );
    }

    #[tokio::test]
    async fn test_shards_rejects_non_array() {
        let backend = MockBackend::new(Some("8.11.0"), json!({"acknowledged": true}));
        let err = GetShardsHandler
            .invoke(&backend, json!({"index": "logs"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::UnexpectedResponse(_)));
    }
}
