//! Vector store access.
//!
//! [`VectorStore`] is the thin accessor to an external similarity-search collection.
//! Two backends exist: [`chroma::ChromaStore`] talks to a Chroma server over its v2 REST
//! API, and [`memory::InMemoryStore`] keeps everything in-process (lost on exit). The
//! store is created once at startup via [`create_store`] and shared as `Arc<dyn VectorStore>`.

pub mod chroma;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::error::MemoryResult;

/// Free-form metadata attached to a stored document.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Fields a `get` or `query` call should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Include {
    Documents,
    Metadatas,
    Embeddings,
    Distances,
}

/// A named collection sharing one embedding space and the cosine metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// One row written by `upsert`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub document: String,
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
}

/// Bulk read options.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub include: Vec<Include>,
}

/// Bulk read result, column-oriented. Columns not requested are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetResult {
    pub ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadatas: Option<Vec<Option<Metadata>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<Vec<Vec<f32>>>,
}

impl GetResult {
    pub fn document(&self, i: usize) -> Option<&str> {
        self.documents.as_ref()?.get(i)?.as_deref()
    }

    pub fn metadata(&self, i: usize) -> Option<&Metadata> {
        self.metadatas.as_ref()?.get(i)?.as_ref()
    }
}

/// Nearest-neighbor query: one result list per query embedding.
#[derive(Debug, Clone)]
pub struct NearestQuery {
    pub embeddings: Vec<Vec<f32>>,
    pub n_results: usize,
    pub include: Vec<Include>,
}

/// Nearest-neighbor result in the store's nested shape: `ids[q][rank]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub ids: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distances: Option<Vec<Vec<f64>>>,
}

impl QueryResult {
    pub fn document(&self, q: usize, rank: usize) -> Option<&str> {
        self.documents.as_ref()?.get(q)?.get(rank)?.as_deref()
    }

    pub fn metadata(&self, q: usize, rank: usize) -> Option<&Metadata> {
        self.metadatas.as_ref()?.get(q)?.get(rank)?.as_ref()
    }

    pub fn distance(&self, q: usize, rank: usize) -> Option<f64> {
        self.distances.as_ref()?.get(q)?.get(rank).copied()
    }
}

/// Accessor to an external similarity-search collection.
///
/// Every method is a single blocking round trip from the caller's point of view.
/// Errors are never retried here: a missing collection is `NotFound`, anything else
/// that goes wrong is `Downstream`.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Check that the store is reachable.
    async fn heartbeat(&self) -> MemoryResult<()>;

    /// Fetch a collection, creating it with the cosine metric if absent.
    async fn get_or_create_collection(&self, name: &str) -> MemoryResult<Collection>;

    /// Fetch an existing collection; `NotFound` if absent.
    async fn get_collection(&self, name: &str) -> MemoryResult<Collection>;

    async fn list_collections(&self) -> MemoryResult<Vec<Collection>>;

    /// Insert or overwrite records by id.
    async fn upsert(&self, collection: &Collection, records: &[Record]) -> MemoryResult<()>;

    /// Nearest neighbors by cosine distance, ascending.
    async fn query(&self, collection: &Collection, query: &NearestQuery)
        -> MemoryResult<QueryResult>;

    /// Bulk read in the store's natural order.
    async fn get(&self, collection: &Collection, options: &GetOptions) -> MemoryResult<GetResult>;

    async fn delete(&self, collection: &Collection, ids: &[String]) -> MemoryResult<()>;

    async fn count(&self, collection: &Collection) -> MemoryResult<usize>;
}

/// Create a vector store from config.
///
/// Supported providers: `"chroma"` (HTTP) and `"memory"` (in-process).
pub fn create_store(config: &StoreConfig) -> anyhow::Result<Box<dyn VectorStore>> {
    match config.provider.as_str() {
        "chroma" => Ok(Box::new(chroma::ChromaStore::new(config)?)),
        "memory" => {
            tracing::warn!("using in-memory vector store; memories are lost on exit");
            Ok(Box::new(memory::InMemoryStore::new()))
        }
        other => anyhow::bail!("unknown vector store provider: {other}. Supported: chroma, memory"),
    }
}

/// Metadata marking a collection as cosine-space.
pub fn cosine_space_metadata() -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("hnsw:space".into(), serde_json::Value::String("cosine".into()));
    metadata
}
