//! The built-in catalogue.

use std::sync::Arc;

use super::{
    index::ToolRegistry,
    types::{HttpMethod, ToolDescriptor, ToolKey},
};
use crate::{
    tools::{
        args::schema_for, GetIndexMappingArgs, GetShardsArgs, GetShardsHandler,
        IndexMappingHandler, ListIndicesArgs, ListIndicesHandler, SearchIndexArgs,
        SearchIndexHandler,
    },
    version::Version,
};

const LIST_INDEX_DESCRIPTION: &str = "Lists indices in the Elasticsearch cluster. By default, \
returns a filtered list of index names only to minimize response size. Set include_detail=true \
to return full metadata from cat.indices (docs.count, store.size, etc.). If an index parameter \
is provided, returns detailed information for that specific index including mappings and \
settings.";

/// Registry seeded with every built-in tool at its default display name.
pub fn default_registry() -> ToolRegistry {
    [
        ToolDescriptor::new(
            ToolKey::ListIndex,
            LIST_INDEX_DESCRIPTION,
            schema_for::<ListIndicesArgs>(),
            Arc::new(ListIndicesHandler),
        )
        .with_min_version(Version::new(7, 0, 0))
        .with_methods([HttpMethod::Get]),
        ToolDescriptor::new(
            ToolKey::IndexMapping,
            "Retrieves index mapping and setting information for an index in Elasticsearch",
            schema_for::<GetIndexMappingArgs>(),
            Arc::new(IndexMappingHandler),
        )
        .with_methods([HttpMethod::Get]),
        ToolDescriptor::new(
            ToolKey::SearchIndex,
            "Searches an index using a query written in query DSL in Elasticsearch",
            schema_for::<SearchIndexArgs>(),
            Arc::new(SearchIndexHandler),
        )
        .with_methods([HttpMethod::Get, HttpMethod::Post]),
        ToolDescriptor::new(
            ToolKey::GetShards,
            "Gets information about shards in Elasticsearch",
            schema_for::<GetShardsArgs>(),
            Arc::new(GetShardsHandler),
        )
        .with_methods([HttpMethod::Get]),
    ]
    .into_iter()
    .collect()
}
