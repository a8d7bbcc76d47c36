//! Greedy near-duplicate grouping.
//!
//! One pass over the sample in retrieval order. Each item not yet visited asks the index
//! for its nearest neighbors; neighbors within the threshold that are not yet visited
//! form a group anchored on the item, and every id in the group becomes visited. Items
//! that produce no group stay unvisited. This is order-dependent on purpose and is not
//! a transitive clustering.

use std::collections::HashSet;

use crate::error::MemoryResult;
use crate::memory::similarity::SimilarityQuery;
use crate::memory::types::{Anchor, DuplicateGroup, DuplicateReport, MemoryItem};
use crate::store::{GetOptions, Include, VectorStore};

/// Parameters of one duplicate scan.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateScan {
    /// Maximum cosine distance (inclusive) for two memories to count as duplicates.
    pub threshold: f64,
    /// How many memories to sample from the collection.
    pub sample_size: usize,
    /// Neighbors requested per anchor candidate.
    pub neighbors: usize,
}

/// Sample `collection_name` and group its near-duplicates.
///
/// Any store error aborts the scan; no partial report is returned.
pub async fn find_duplicates(
    store: &dyn VectorStore,
    collection_name: &str,
    scan: &DuplicateScan,
) -> MemoryResult<DuplicateReport> {
    let collection = store.get_collection(collection_name).await?;
    let total = store.count(&collection).await?;

    let sample = store
        .get(
            &collection,
            &GetOptions {
                limit: Some(scan.sample_size),
                offset: None,
                include: vec![Include::Documents, Include::Metadatas, Include::Embeddings],
            },
        )
        .await?;
    let items = MemoryItem::from_sample(sample)?;

    let adapter = SimilarityQuery::new(store, &collection);
    let duplicates = group_duplicates(&adapter, &items, scan.threshold, scan.neighbors).await?;

    tracing::info!(
        collection = %collection_name,
        scanned = items.len(),
        total,
        groups = duplicates.len(),
        threshold = scan.threshold,
        "duplicate scan complete"
    );

    Ok(DuplicateReport {
        duplicates,
        scanned: items.len(),
        total,
    })
}

/// Partition `items` into anchor + duplicates groups.
pub async fn group_duplicates(
    adapter: &SimilarityQuery<'_>,
    items: &[MemoryItem],
    threshold: f64,
    k: usize,
) -> MemoryResult<Vec<DuplicateGroup>> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut groups = Vec::new();

    for item in items {
        if visited.contains(&item.id) {
            continue;
        }

        let neighbors = adapter.neighbors(item, k).await?;
        let similar: Vec<_> = neighbors
            .into_iter()
            .filter(|n| n.id != item.id && n.distance <= threshold && !visited.contains(&n.id))
            .collect();

        if similar.is_empty() {
            continue;
        }

        visited.insert(item.id.clone());
        visited.extend(similar.iter().map(|n| n.id.clone()));
        tracing::debug!(anchor = %item.id, members = similar.len(), "duplicate group");

        groups.push(DuplicateGroup {
            anchor: Anchor {
                id: item.id.clone(),
                document: item.document.clone(),
                metadata: item.metadata.clone(),
            },
            similar,
        });
    }

    Ok(groups)
}
