//! Similarity-graph derivation over a sampled subset.
//!
//! Unlike duplicate detection this never touches the index after the initial fetch:
//! every unordered pair of the sample is compared directly, so cost is quadratic in the
//! sample size.

use crate::error::MemoryResult;
use crate::memory::similarity::cosine_distance;
use crate::memory::types::{GraphLink, GraphNode, MemoryItem, SimilarityGraph};
use crate::store::{GetOptions, Include, VectorStore};

/// Node labels are the first this-many characters of the document.
pub const LABEL_CHARS: usize = 60;

/// Fetch up to `sample_size` memories from `collection_name` and build their graph.
pub async fn derive_graph(
    store: &dyn VectorStore,
    collection_name: &str,
    sample_size: usize,
    threshold: f64,
) -> MemoryResult<SimilarityGraph> {
    let collection = store.get_collection(collection_name).await?;
    let sample = store
        .get(
            &collection,
            &GetOptions {
                limit: Some(sample_size),
                offset: None,
                include: vec![Include::Documents, Include::Metadatas, Include::Embeddings],
            },
        )
        .await?;
    let items = MemoryItem::from_sample(sample)?;

    let graph = build_graph(&items, threshold)?;
    tracing::info!(
        collection = %collection_name,
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        threshold,
        "graph built"
    );
    Ok(graph)
}

/// One node per item, one link per pair `i < j` within `threshold` (inclusive).
pub fn build_graph(items: &[MemoryItem], threshold: f64) -> MemoryResult<SimilarityGraph> {
    let nodes = items
        .iter()
        .map(|item| GraphNode {
            id: item.id.clone(),
            label: item.document.chars().take(LABEL_CHARS).collect(),
            source: item.meta("source"),
            date: item.meta("date"),
        })
        .collect();

    let mut links = Vec::new();
    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            let distance = cosine_distance(&a.embedding, &b.embedding)?;
            if distance <= threshold {
                links.push(GraphLink {
                    source: a.id.clone(),
                    target: b.id.clone(),
                    distance: round4(distance),
                });
            }
        }
    }

    Ok(SimilarityGraph { nodes, links })
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
