//! Read path: semantic similarity search.

use crate::embedding::EmbeddingProvider;
use crate::error::{MemoryError, MemoryResult};
use crate::store::{Include, NearestQuery, QueryResult, VectorStore};

/// Embed `query` and return the `n_results` nearest memories of `collection_name`.
///
/// The result keeps the store's nested shape: one inner list per query embedding.
pub async fn query_memories(
    store: &dyn VectorStore,
    embedder: &dyn EmbeddingProvider,
    collection_name: &str,
    query: &str,
    n_results: usize,
) -> MemoryResult<QueryResult> {
    if query.is_empty() {
        return Err(MemoryError::bad_request("query is required"));
    }
    if n_results == 0 {
        return Err(MemoryError::bad_request("n_results must be at least 1"));
    }

    let collection = store.get_collection(collection_name).await?;
    let embedding = embedder.embed(query).await?;

    let result = store
        .query(
            &collection,
            &NearestQuery {
                embeddings: vec![embedding],
                n_results,
                include: vec![Include::Documents, Include::Metadatas, Include::Distances],
            },
        )
        .await?;

    tracing::debug!(
        collection = %collection_name,
        hits = result.ids.first().map_or(0, Vec::len),
        "query complete"
    );
    Ok(result)
}
