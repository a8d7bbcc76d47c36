//! Write path: content-addressed id, embedding, and upsert.
//!
//! [`store_memory`] is the single entry point. The id is derived from the memory's
//! identity fields, so storing the same memory twice overwrites instead of appending.

use md5::{Digest, Md5};
use serde::Serialize;

use crate::embedding::EmbeddingProvider;
use crate::error::{MemoryError, MemoryResult};
use crate::memory::types::MemoryMetadata;
use crate::store::{Record, VectorStore};

/// Characters of the document that take part in the id.
pub const ID_PREFIX_CHARS: usize = 50;

/// A memory about to be written.
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub text: String,
    pub metadata: MemoryMetadata,
}

/// Result returned from a store operation.
#[derive(Debug, Serialize)]
pub struct StoreMemoryResult {
    pub success: bool,
    /// Content-addressed id of the stored memory.
    pub id: String,
    pub collection: String,
    /// Collection count after the upsert.
    pub chunks: usize,
}

/// Lowercase hex MD5 of `"{source}:{section}:{document[..50 chars]}:{date}"`.
///
/// `section` is taken raw, before the `"memory"` default is applied to stored metadata.
pub fn memory_id(source: &str, section: &str, document: &str, date: &str) -> String {
    let prefix: String = document.chars().take(ID_PREFIX_CHARS).collect();
    let mut hasher = Md5::new();
    hasher.update(format!("{source}:{section}:{prefix}:{date}").as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Full write path: get-or-create collection → id → embed → upsert → count.
pub async fn store_memory(
    store: &dyn VectorStore,
    embedder: &dyn EmbeddingProvider,
    collection_name: &str,
    memory: &NewMemory,
) -> MemoryResult<StoreMemoryResult> {
    if memory.text.is_empty() {
        return Err(MemoryError::bad_request("text is required"));
    }

    let collection = store.get_or_create_collection(collection_name).await?;

    let meta = &memory.metadata;
    let id = memory_id(&meta.source, &meta.section, &memory.text, &meta.date);
    let embedding = embedder.embed(&memory.text).await?;

    store
        .upsert(
            &collection,
            &[Record {
                id: id.clone(),
                document: memory.text.clone(),
                embedding,
                metadata: meta.to_metadata(),
            }],
        )
        .await?;
    let chunks = store.count(&collection).await?;

    tracing::info!(id = %id, collection = %collection_name, chunks, "memory stored");

    Ok(StoreMemoryResult {
        success: true,
        id,
        collection: collection_name.to_string(),
        chunks,
    })
}
