//! Typed request records for the nine operations.
//!
//! Every field a client may omit is optional here and defaulted by the service from
//! configuration. The same records are the HTTP bodies and the MCP tool parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct StoreRequest {
    #[serde(default)]
    #[schemars(description = "The free-text memory to store (required)")]
    pub text: String,

    #[schemars(description = "Where the memory came from. Defaults to the configured source.")]
    pub source: Option<String>,

    #[schemars(description = "Optional section heading; stored as 'memory' when empty")]
    pub section: Option<String>,

    #[schemars(description = "Date in YYYY-MM-DD form. Defaults to today.")]
    pub date: Option<String>,

    #[schemars(description = "Optional comma-separated tags")]
    pub tags: Option<String>,

    #[schemars(description = "Target collection, created if absent. Defaults to the configured collection.")]
    pub collection: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct QueryRequest {
    #[schemars(description = "Collection to search. Defaults to the configured collection.")]
    pub collection: Option<String>,

    #[serde(default)]
    #[schemars(description = "Natural language query (required)")]
    pub query: String,

    #[schemars(description = "Maximum number of results, at least 1. Defaults to 10.")]
    pub n_results: Option<usize>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct DuplicatesRequest {
    pub collection: Option<String>,

    #[schemars(description = "Maximum cosine distance (inclusive) for two memories to count as duplicates. Defaults to 0.1.")]
    pub threshold: Option<f64>,

    #[schemars(description = "Number of memories to scan. Defaults to 200.")]
    pub sample_size: Option<usize>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct GraphRequest {
    pub collection: Option<String>,

    #[schemars(description = "Number of memories to include as nodes. Defaults to 100.")]
    pub sample_size: Option<usize>,

    #[schemars(description = "Maximum cosine distance (inclusive) for a link. Defaults to 0.15.")]
    pub threshold: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeleteRequest {
    pub collection: Option<String>,

    #[serde(default)]
    #[schemars(description = "Ids of the memories to delete (at least one)")]
    pub ids: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct SourcesRequest {
    pub collection: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct TimelineRequest {
    pub collection: Option<String>,

    #[schemars(description = "Items to skip from the newest. Defaults to 0.")]
    pub offset: Option<usize>,

    #[schemars(description = "Page size. Defaults to 100.")]
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct CollectionsRequest {}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct SyncRequest {}
