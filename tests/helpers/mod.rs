#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use memscope::config::MemscopeConfig;
use memscope::embedding::EmbeddingProvider;
use memscope::error::{MemoryError, MemoryResult};
use memscope::service::MemoryService;
use memscope::store::memory::InMemoryStore;
use memscope::store::{
    Collection, GetOptions, GetResult, NearestQuery, QueryResult, Record, VectorStore,
};
use memscope::sync::{SyncOutcome, SyncTrigger};

pub const DIM: usize = 64;

/// Generate a deterministic 64-dim embedding with a spike at position `seed`.
/// Distinct seeds are orthogonal.
pub fn test_embedding(seed: u8) -> Vec<f32> {
    let mut v = vec![0.0f32; DIM];
    v[seed as usize % DIM] = 1.0;
    v
}

/// Generate an embedding close to `base`: cosine distance well under 0.01.
pub fn similar_embedding(base: &[f32]) -> Vec<f32> {
    let mut v = base.to_vec();
    for i in 0..3 {
        v[(i * 17 + 5) % DIM] += 0.03;
    }
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

/// Embedder with registered vectors per text. Unregistered text gets a spike derived
/// from its bytes.
#[derive(Default)]
pub struct ScriptedEmbedder {
    vectors: Mutex<HashMap<String, Vec<f32>>>,
}

impl ScriptedEmbedder {
    pub fn with(self, text: &str, embedding: Vec<f32>) -> Self {
        self.vectors.lock().unwrap().insert(text.to_string(), embedding);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for ScriptedEmbedder {
    async fn embed(&self, text: &str) -> MemoryResult<Vec<f32>> {
        if let Some(v) = self.vectors.lock().unwrap().get(text) {
            return Ok(v.clone());
        }
        let seed = text.bytes().fold(0u8, |acc, b| acc.wrapping_add(b));
        Ok(test_embedding(seed))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// In-memory store that records the name of every call made to it.
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryStore,
    calls: Mutex<Vec<&'static str>>,
    failing_query: Mutex<Option<usize>>,
}

impl RecordingStore {
    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_of(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Make the `n`th `query` call from now on (1-based) fail with a downstream error.
    pub fn fail_query_number(&self, n: usize) {
        *self.failing_query.lock().unwrap() = Some(self.count_of("query") + n);
    }
}

#[async_trait]
impl VectorStore for RecordingStore {
    async fn heartbeat(&self) -> MemoryResult<()> {
        self.record("heartbeat");
        self.inner.heartbeat().await
    }

    async fn get_or_create_collection(&self, name: &str) -> MemoryResult<Collection> {
        self.record("get_or_create_collection");
        self.inner.get_or_create_collection(name).await
    }

    async fn get_collection(&self, name: &str) -> MemoryResult<Collection> {
        self.record("get_collection");
        self.inner.get_collection(name).await
    }

    async fn list_collections(&self) -> MemoryResult<Vec<Collection>> {
        self.record("list_collections");
        self.inner.list_collections().await
    }

    async fn upsert(&self, collection: &Collection, records: &[Record]) -> MemoryResult<()> {
        self.record("upsert");
        self.inner.upsert(collection, records).await
    }

    async fn query(
        &self,
        collection: &Collection,
        query: &NearestQuery,
    ) -> MemoryResult<QueryResult> {
        self.record("query");
        if *self.failing_query.lock().unwrap() == Some(self.count_of("query")) {
            return Err(MemoryError::downstream("vector store unavailable"));
        }
        self.inner.query(collection, query).await
    }

    async fn get(&self, collection: &Collection, options: &GetOptions) -> MemoryResult<GetResult> {
        self.record("get");
        self.inner.get(collection, options).await
    }

    async fn delete(&self, collection: &Collection, ids: &[String]) -> MemoryResult<()> {
        self.record("delete");
        self.inner.delete(collection, ids).await
    }

    async fn count(&self, collection: &Collection) -> MemoryResult<usize> {
        self.record("count");
        self.inner.count(collection).await
    }
}

/// Sync trigger that returns a fixed outcome.
pub struct FixedSync(pub SyncOutcome);

impl FixedSync {
    pub fn succeeding() -> Self {
        Self(SyncOutcome {
            success: true,
            output: vec!["synced".into()],
            summary: "synced".into(),
        })
    }
}

#[async_trait]
impl SyncTrigger for FixedSync {
    async fn run_sync(&self) -> MemoryResult<SyncOutcome> {
        Ok(self.0.clone())
    }
}

/// Service over a recording in-memory store, with default config.
pub fn test_service(embedder: ScriptedEmbedder) -> (Arc<MemoryService>, Arc<RecordingStore>) {
    test_service_with(embedder, Arc::new(FixedSync::succeeding()))
}

pub fn test_service_with(
    embedder: ScriptedEmbedder,
    sync: Arc<dyn SyncTrigger>,
) -> (Arc<MemoryService>, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::default());
    let service = MemoryService::new(
        store.clone(),
        Arc::new(embedder),
        sync,
        Arc::new(MemscopeConfig::default()),
    );
    (Arc::new(service), store)
}

/// Write a memory straight into the store, bypassing the embedder.
pub async fn seed(
    store: &RecordingStore,
    collection: &str,
    id: &str,
    document: &str,
    embedding: Vec<f32>,
    metadata: serde_json::Value,
) {
    let col = store.get_or_create_collection(collection).await.unwrap();
    store
        .upsert(
            &col,
            &[Record {
                id: id.to_string(),
                document: document.to_string(),
                embedding,
                metadata: metadata.as_object().cloned().unwrap_or_default(),
            }],
        )
        .await
        .unwrap();
}
