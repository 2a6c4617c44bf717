//! Protocol-facing dispatch shared by both gateways.
//!
//! [`ToolServer`] advertises the [`EnabledToolSet`] and routes each call by
//! display name. Handler failures come back as error content blocks; only an
//! unknown display name fails the call at the protocol level.

use std::sync::Arc;

use es_client::BackendProvider;
use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    ErrorData, RoleServer, ServerHandler,
};
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    compat::{incompatibility_message, is_compatible_with_policy, UnresolvedVersionPolicy},
    resolver::resolve_backend_version,
};
use crate::{
    error::{McpError, McpResult, ToolError},
    registry::{EnabledToolSet, ToolDescriptor},
    tools::BaseToolArgs,
};

const SERVER_NAME: &str = "elasticsearch-mcp-server";

#[derive(Clone)]
pub struct ToolServer {
    tools: Arc<EnabledToolSet>,
    provider: Arc<dyn BackendProvider>,
    policy: UnresolvedVersionPolicy,
}

impl ToolServer {
    pub fn new(tools: EnabledToolSet, provider: Arc<dyn BackendProvider>) -> Self {
        Self {
            tools: Arc::new(tools),
            provider,
            policy: UnresolvedVersionPolicy::default(),
        }
    }

    /// Policy for the per-call version check.
    #[must_use]
    pub fn with_unresolved_policy(mut self, policy: UnresolvedVersionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn tools(&self) -> &EnabledToolSet {
        &self.tools
    }

    /// Invokes the tool advertised as `name`.
    ///
    /// Returns `Err` only for names not in the enabled set. Every other failure
    /// is an `is_error` result holding one text block that starts with the
    /// tool's error prefix.
    pub async fn call(&self, name: &str, arguments: Option<JsonObject>) -> McpResult<CallToolResult> {
        let descriptor = self
            .tools
            .find_by_display_name(name)
            .ok_or_else(|| McpError::UnknownTool(name.to_string()))?;

        let args = Value::Object(arguments.unwrap_or_default());
        match self.invoke(descriptor, args).await {
            Ok(content) => Ok(CallToolResult::success(content)),
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool call failed");
                let prefix = descriptor.handler.error_prefix();
                Ok(CallToolResult::error(vec![Content::text(format!("{prefix}{e}"))]))
            }
        }
    }

    async fn invoke(
        &self,
        descriptor: &ToolDescriptor,
        args: Value,
    ) -> Result<Vec<Content>, ToolError> {
        let base: BaseToolArgs = serde_json::from_value(args.clone())?;
        let backend = self.provider.backend(base.cluster())?;

        let version = resolve_backend_version(backend.as_ref()).await;
        if !is_compatible_with_policy(&version, descriptor, self.policy) {
            return Err(ToolError::Incompatible(incompatibility_message(descriptor, &version)));
        }

        debug!(tool = %descriptor.display_name, cluster = ?base.cluster(), "Invoking tool");
        descriptor.handler.invoke(backend.as_ref(), args).await
    }
}

impl ServerHandler for ToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Query Elasticsearch clusters: list indices, read mappings, search and inspect shards."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tools.advertised()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.call(&request.name, request.arguments)
            .await
            .map_err(ErrorData::from)
    }
}
