//! Corpus listings: per-source counts and per-collection counts.

use std::collections::BTreeMap;

use crate::error::MemoryResult;
use crate::memory::fetch_all;
use crate::memory::types::{metadata_string, CollectionSummary, SourceCounts};
use crate::store::{Include, VectorStore};

/// Source recorded for memories whose metadata has none.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Count every memory of `collection_name` by its `source` metadata.
pub async fn source_counts(
    store: &dyn VectorStore,
    collection_name: &str,
) -> MemoryResult<SourceCounts> {
    let collection = store.get_collection(collection_name).await?;
    let all = fetch_all(store, &collection, vec![Include::Metadatas]).await?;

    let mut sources: BTreeMap<String, usize> = BTreeMap::new();
    for i in 0..all.ids.len() {
        let source = metadata_string(all.metadata(i), "source")
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
        *sources.entry(source).or_default() += 1;
    }

    Ok(SourceCounts {
        sources,
        total: all.ids.len(),
    })
}

/// Every collection with its current count.
pub async fn collection_summaries(store: &dyn VectorStore) -> MemoryResult<Vec<CollectionSummary>> {
    let collections = store.list_collections().await?;
    let mut summaries = Vec::with_capacity(collections.len());
    for collection in &collections {
        summaries.push(CollectionSummary {
            name: collection.name.clone(),
            count: store.count(collection).await?,
        });
    }
    Ok(summaries)
}
