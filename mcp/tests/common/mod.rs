//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use es_client::{BackendProvider, ClientError, ClientResult, SearchBackend};
use es_mcp::{
    registry::{HttpMethod, ToolDescriptor, ToolKey, ToolRegistry},
    ToolError, ToolHandler,
};
use rmcp::model::{CallToolResult, Content, JsonObject};
use serde_json::{json, Value};

/// Backend that reports `version` and answers every data call with `response`.
pub struct FakeBackend {
    version: Option<String>,
    response: Value,
    pub calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new(version: Option<&str>, response: Value) -> Arc<Self> {
        Arc::new(Self {
            version: version.map(str::to_string),
            response,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn data(&self) -> ClientResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn info(&self) -> ClientResult<Value> {
        match &self.version {
            Some(v) => Ok(json!({"name": "node-1", "version": {"number": v}})),
            None => Err(ClientError::UnexpectedResponse("connection refused".to_string())),
        }
    }

    async fn cat_indices(&self) -> ClientResult<Value> {
        self.data()
    }

    async fn get_index(&self, _index: &str) -> ClientResult<Value> {
        self.data()
    }

    async fn get_mapping(&self, _index: &str) -> ClientResult<Value> {
        self.data()
    }

    async fn search(&self, _index: &str, _query: &Value) -> ClientResult<Value> {
        self.data()
    }

    async fn cat_shards(&self, _index: &str) -> ClientResult<Value> {
        self.data()
    }
}

/// Routes the empty cluster name and `"prod"` to one backend, `"legacy"` to
/// another; anything else is unknown.
pub struct FakeProvider {
    pub default: Arc<FakeBackend>,
    pub legacy: Arc<FakeBackend>,
}

impl BackendProvider for FakeProvider {
    fn backend(&self, cluster: Option<&str>) -> ClientResult<Arc<dyn SearchBackend>> {
        match cluster {
            None | Some("prod") => Ok(self.default.clone()),
            Some("legacy") => Ok(self.legacy.clone()),
            Some(other) => Err(ClientError::ClusterNotFound(other.to_string())),
        }
    }
}

pub struct EchoHandler;

#[async_trait]
impl ToolHandler for EchoHandler {
    fn error_prefix(&self) -> &'static str {
        "Error echoing: "
    }

    async fn invoke(
        &self,
        _backend: &dyn SearchBackend,
        args: Value,
    ) -> Result<Vec<Content>, ToolError> {
        Ok(vec![Content::text(args.to_string())])
    }
}

pub fn tool(key: ToolKey, name: &str, methods: &[HttpMethod]) -> ToolDescriptor {
    let schema = json!({
        "type": "object",
        "properties": {
            "elasticsearch_cluster_name": {"type": "string"},
            "index": {"type": "string"}
        }
    });
    let schema: JsonObject = schema.as_object().cloned().unwrap_or_default();
    ToolDescriptor::new(key, format!("{name} description"), schema, Arc::new(EchoHandler))
        .with_display_name(name)
        .with_methods(methods.iter().copied())
}

/// `{A: GET, B: PUT}` keyed on the first two tool keys.
pub fn read_write_registry() -> ToolRegistry {
    [
        tool(ToolKey::ListIndex, "A", &[HttpMethod::Get]),
        tool(ToolKey::IndexMapping, "B", &[HttpMethod::Put]),
    ]
    .into_iter()
    .collect()
}

pub fn display_names(set: &es_mcp::EnabledToolSet) -> Vec<String> {
    set.display_names()
}

pub fn text(result: &CallToolResult) -> String {
    let value = serde_json::to_value(&result.content).unwrap();
    value[0]["text"].as_str().unwrap().to_string()
}
