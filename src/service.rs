//! The nine operations, validated and defaulted.
//!
//! [`MemoryService`] owns the process-wide handles (vector store, embedding provider,
//! sync trigger, config). Every operation holds the request gate for its whole
//! duration, so operations never interleave regardless of transport.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::{
    DeleteRequest, DuplicatesRequest, GraphRequest, QueryRequest, SourcesRequest, StoreRequest,
    TimelineRequest,
};
use crate::config::MemscopeConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{MemoryError, MemoryResult};
use crate::memory::duplicates::{find_duplicates, DuplicateScan};
use crate::memory::forget::{delete_memories, DeleteResult};
use crate::memory::graph::derive_graph;
use crate::memory::search::query_memories;
use crate::memory::stats::{collection_summaries, source_counts};
use crate::memory::store::{store_memory, NewMemory, StoreMemoryResult};
use crate::memory::timeline::timeline;
use crate::memory::types::{
    CollectionSummary, DuplicateReport, MemoryMetadata, SimilarityGraph, SourceCounts,
    TimelinePage,
};
use crate::store::{QueryResult, VectorStore};
use crate::sync::{SyncOutcome, SyncTrigger};

pub struct MemoryService {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    sync: Arc<dyn SyncTrigger>,
    config: Arc<MemscopeConfig>,
    gate: Mutex<()>,
}

impl MemoryService {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        sync: Arc<dyn SyncTrigger>,
        config: Arc<MemscopeConfig>,
    ) -> Self {
        Self {
            store,
            embedder,
            sync,
            config,
            gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &dyn VectorStore {
        self.store.as_ref()
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    fn collection_or_default<'a>(&'a self, requested: &'a Option<String>) -> &'a str {
        requested
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.config.store.collection)
    }

    pub async fn store_memory(&self, req: StoreRequest) -> MemoryResult<StoreMemoryResult> {
        if req.text.is_empty() {
            return Err(MemoryError::bad_request("text is required"));
        }
        let _gate = self.gate.lock().await;

        let collection = self.collection_or_default(&req.collection).to_string();
        let memory = NewMemory {
            metadata: MemoryMetadata {
                source: req
                    .source
                    .unwrap_or_else(|| self.config.retrieval.default_source.clone()),
                section: req.section.unwrap_or_default(),
                date: req.date.unwrap_or_else(today),
                tags: req.tags,
            },
            text: req.text,
        };
        store_memory(self.store(), self.embedder(), &collection, &memory).await
    }

    pub async fn query(&self, req: QueryRequest) -> MemoryResult<QueryResult> {
        let n_results = req.n_results.unwrap_or(self.config.retrieval.default_n_results);
        let _gate = self.gate.lock().await;
        let collection = self.collection_or_default(&req.collection);
        query_memories(self.store(), self.embedder(), collection, &req.query, n_results).await
    }

    pub async fn duplicates(&self, req: DuplicatesRequest) -> MemoryResult<DuplicateReport> {
        let analytics = &self.config.analytics;
        let scan = DuplicateScan {
            threshold: self.validate_threshold(req.threshold.unwrap_or(analytics.duplicate_threshold))?,
            sample_size: self
                .validate_sample_size(req.sample_size.unwrap_or(analytics.duplicate_sample_size))?,
            neighbors: analytics.duplicate_neighbors,
        };
        let _gate = self.gate.lock().await;
        let collection = self.collection_or_default(&req.collection);
        find_duplicates(self.store(), collection, &scan).await
    }

    pub async fn graph(&self, req: GraphRequest) -> MemoryResult<SimilarityGraph> {
        let analytics = &self.config.analytics;
        let threshold = self.validate_threshold(req.threshold.unwrap_or(analytics.graph_threshold))?;
        let sample_size =
            self.validate_sample_size(req.sample_size.unwrap_or(analytics.graph_sample_size))?;
        let _gate = self.gate.lock().await;
        let collection = self.collection_or_default(&req.collection);
        derive_graph(self.store(), collection, sample_size, threshold).await
    }

    pub async fn delete(&self, req: DeleteRequest) -> MemoryResult<DeleteResult> {
        if req.ids.is_empty() {
            return Err(MemoryError::bad_request("ids is required"));
        }
        let _gate = self.gate.lock().await;
        let collection = self.collection_or_default(&req.collection);
        delete_memories(self.store(), collection, &req.ids).await
    }

    pub async fn sources(&self, req: SourcesRequest) -> MemoryResult<SourceCounts> {
        let _gate = self.gate.lock().await;
        let collection = self.collection_or_default(&req.collection);
        source_counts(self.store(), collection).await
    }

    pub async fn timeline(&self, req: TimelineRequest) -> MemoryResult<TimelinePage> {
        let offset = req.offset.unwrap_or(0);
        let limit = req.limit.unwrap_or(self.config.retrieval.timeline_limit);
        let _gate = self.gate.lock().await;
        let collection = self.collection_or_default(&req.collection);
        timeline(self.store(), collection, offset, limit).await
    }

    pub async fn collections(&self) -> MemoryResult<Vec<CollectionSummary>> {
        let _gate = self.gate.lock().await;
        collection_summaries(self.store()).await
    }

    /// Run the external sync. A non-zero exit becomes [`MemoryError::SyncFailure`].
    pub async fn sync(&self) -> MemoryResult<SyncOutcome> {
        let _gate = self.gate.lock().await;
        let outcome = self.sync.run_sync().await?;
        if !outcome.success {
            return Err(MemoryError::SyncFailure {
                summary: outcome.summary,
                output: outcome.output,
            });
        }
        Ok(outcome)
    }

    fn validate_threshold(&self, threshold: f64) -> MemoryResult<f64> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(MemoryError::bad_request(format!(
                "threshold must be a non-negative number, got {threshold}"
            )));
        }
        Ok(threshold)
    }

    fn validate_sample_size(&self, sample_size: usize) -> MemoryResult<usize> {
        let max = self.config.analytics.max_sample_size;
        if sample_size == 0 || sample_size > max {
            return Err(MemoryError::bad_request(format!(
                "sample_size must be between 1 and {max}, got {sample_size}"
            )));
        }
        Ok(sample_size)
    }
}

/// Today's local date as `YYYY-MM-DD`.
fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
