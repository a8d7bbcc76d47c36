//! In-process vector store.
//!
//! Brute-force cosine search over records held behind a mutex. Insertion order is the
//! natural `get` order, and upserting an existing id overwrites it in place.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    cosine_space_metadata, Collection, GetOptions, GetResult, Include, NearestQuery, QueryResult,
    Record, VectorStore,
};
use crate::error::{MemoryError, MemoryResult};
use crate::memory::similarity::cosine_distance;

struct StoredCollection {
    info: Collection,
    records: Vec<Record>,
}

#[derive(Default)]
pub struct InMemoryStore {
    collections: Mutex<Vec<StoredCollection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_collections<T>(
        &self,
        f: impl FnOnce(&mut Vec<StoredCollection>) -> MemoryResult<T>,
    ) -> MemoryResult<T> {
        let mut guard = self
            .collections
            .lock()
            .map_err(|e| MemoryError::downstream(format!("store lock poisoned: {e}")))?;
        f(&mut guard)
    }

    fn with_collection<T>(
        &self,
        collection: &Collection,
        f: impl FnOnce(&mut StoredCollection) -> MemoryResult<T>,
    ) -> MemoryResult<T> {
        self.with_collections(|all| {
            let stored = all
                .iter_mut()
                .find(|c| c.info.id == collection.id)
                .ok_or_else(|| {
                    MemoryError::NotFound(format!("collection {} does not exist", collection.name))
                })?;
            f(stored)
        })
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn heartbeat(&self) -> MemoryResult<()> {
        Ok(())
    }

    async fn get_or_create_collection(&self, name: &str) -> MemoryResult<Collection> {
        self.with_collections(|all| {
            if let Some(existing) = all.iter().find(|c| c.info.name == name) {
                return Ok(existing.info.clone());
            }
            let info = Collection {
                id: format!("local-{}", all.len()),
                name: name.to_string(),
                metadata: Some(cosine_space_metadata()),
            };
            all.push(StoredCollection {
                info: info.clone(),
                records: Vec::new(),
            });
            Ok(info)
        })
    }

    async fn get_collection(&self, name: &str) -> MemoryResult<Collection> {
        self.with_collections(|all| {
            all.iter()
                .find(|c| c.info.name == name)
                .map(|c| c.info.clone())
                .ok_or_else(|| MemoryError::NotFound(format!("collection {name} does not exist")))
        })
    }

    async fn list_collections(&self) -> MemoryResult<Vec<Collection>> {
        self.with_collections(|all| Ok(all.iter().map(|c| c.info.clone()).collect()))
    }

    async fn upsert(&self, collection: &Collection, records: &[Record]) -> MemoryResult<()> {
        self.with_collection(collection, |stored| {
            let dim = stored.records.first().map(|r| r.embedding.len());
            for record in records {
                if let Some(expected) = dim {
                    if record.embedding.len() != expected {
                        return Err(MemoryError::DimensionMismatch {
                            expected,
                            found: record.embedding.len(),
                        });
                    }
                }
            }
            for record in records {
                match stored.records.iter_mut().find(|r| r.id == record.id) {
                    Some(existing) => *existing = record.clone(),
                    None => stored.records.push(record.clone()),
                }
            }
            Ok(())
        })
    }

    async fn query(
        &self,
        collection: &Collection,
        query: &NearestQuery,
    ) -> MemoryResult<QueryResult> {
        self.with_collection(collection, |stored| {
            let mut result = QueryResult::default();
            let mut documents = Vec::new();
            let mut metadatas = Vec::new();
            let mut distances = Vec::new();

            for embedding in &query.embeddings {
                let mut ranked = Vec::with_capacity(stored.records.len());
                for record in &stored.records {
                    ranked.push((cosine_distance(embedding, &record.embedding)?, record));
                }
                // Stable: equal distances keep insertion order.
                ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
                ranked.truncate(query.n_results);

                result.ids.push(ranked.iter().map(|(_, r)| r.id.clone()).collect());
                documents.push(ranked.iter().map(|(_, r)| Some(r.document.clone())).collect());
                metadatas.push(ranked.iter().map(|(_, r)| Some(r.metadata.clone())).collect());
                distances.push(ranked.iter().map(|(d, _)| *d).collect());
            }

            if query.include.contains(&Include::Documents) {
                result.documents = Some(documents);
            }
            if query.include.contains(&Include::Metadatas) {
                result.metadatas = Some(metadatas);
            }
            if query.include.contains(&Include::Distances) {
                result.distances = Some(distances);
            }
            Ok(result)
        })
    }

    async fn get(&self, collection: &Collection, options: &GetOptions) -> MemoryResult<GetResult> {
        self.with_collection(collection, |stored| {
            let offset = options.offset.unwrap_or(0);
            let limit = options.limit.unwrap_or(usize::MAX);
            let page: Vec<&Record> = stored.records.iter().skip(offset).take(limit).collect();

            let mut result = GetResult {
                ids: page.iter().map(|r| r.id.clone()).collect(),
                ..Default::default()
            };
            if options.include.contains(&Include::Documents) {
                result.documents = Some(page.iter().map(|r| Some(r.document.clone())).collect());
            }
            if options.include.contains(&Include::Metadatas) {
                result.metadatas = Some(page.iter().map(|r| Some(r.metadata.clone())).collect());
            }
            if options.include.contains(&Include::Embeddings) {
                result.embeddings = Some(page.iter().map(|r| r.embedding.clone()).collect());
            }
            Ok(result)
        })
    }

    async fn delete(&self, collection: &Collection, ids: &[String]) -> MemoryResult<()> {
        self.with_collection(collection, |stored| {
            stored.records.retain(|r| !ids.contains(&r.id));
            Ok(())
        })
    }

    async fn count(&self, collection: &Collection) -> MemoryResult<usize> {
        self.with_collection(collection, |stored| Ok(stored.records.len()))
    }
}
