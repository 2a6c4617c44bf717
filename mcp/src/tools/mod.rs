//! Built-in tools and the handler interface they implement.

pub mod args;
pub mod handlers;

use async_trait::async_trait;
use es_client::SearchBackend;
use rmcp::model::Content;
use serde_json::Value;

pub use args::{
    BaseToolArgs, GetIndexMappingArgs, GetShardsArgs, ListIndicesArgs, SearchIndexArgs,
    BASE_TOOL_ARGS,
};
pub use handlers::{GetShardsHandler, IndexMappingHandler, ListIndicesHandler, SearchIndexHandler};

use crate::error::ToolError;

/// One invocable operation.
///
/// Implementations parse their own arguments and talk to the backend they are
/// handed. Failures are returned, not rendered: the dispatcher owns turning a
/// [`ToolError`] into an error content block prefixed with [`error_prefix`].
///
/// [`error_prefix`]: ToolHandler::error_prefix
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Prefix of the text block reported when this tool fails.
    fn error_prefix(&self) -> &'static str;

    async fn invoke(
        &self,
        backend: &dyn SearchBackend,
        args: Value,
    ) -> Result<Vec<Content>, ToolError>;
}
