//! Shared similarity primitives.
//!
//! [`cosine_distance`] is the metric used everywhere in the crate. [`SimilarityQuery`]
//! asks the vector index for one sampled item's nearest neighbors at a time; the
//! duplicate engine calls it lazily as it walks the sample.

use crate::error::{MemoryError, MemoryResult};
use crate::memory::types::{MemoryItem, Neighbor};
use crate::store::{Collection, Include, NearestQuery, QueryResult, VectorStore};

/// `1 − (a·b)/(‖a‖·‖b‖)`, clamped into `[0, 2]`.
///
/// A zero-magnitude operand yields exactly `1.0`. Vectors of different length are a
/// [`MemoryError::DimensionMismatch`].
pub fn cosine_distance(a: &[f32], b: &[f32]) -> MemoryResult<f64> {
    if a.len() != b.len() {
        return Err(MemoryError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(1.0);
    }
    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    Ok((1.0 - similarity).clamp(0.0, 2.0))
}

/// Nearest-neighbor lookups against one collection.
pub struct SimilarityQuery<'a> {
    store: &'a dyn VectorStore,
    collection: &'a Collection,
}

impl<'a> SimilarityQuery<'a> {
    pub fn new(store: &'a dyn VectorStore, collection: &'a Collection) -> Self {
        Self { store, collection }
    }

    /// Up to `k` nearest neighbors of `item`, ascending by distance, without `item` itself.
    ///
    /// Issues exactly one index query. Index errors propagate unchanged.
    pub async fn neighbors(&self, item: &MemoryItem, k: usize) -> MemoryResult<Vec<Neighbor>> {
        if k == 0 {
            return Err(MemoryError::bad_request("neighbor count must be at least 1"));
        }
        let query = NearestQuery {
            embeddings: vec![item.embedding.clone()],
            n_results: k,
            include: vec![Include::Documents, Include::Metadatas, Include::Distances],
        };
        let result = self.store.query(self.collection, &query).await?;
        neighbors_from_result(&result, &item.id)
    }
}

/// Flatten the first result list of a query, dropping `self_id`.
fn neighbors_from_result(result: &QueryResult, self_id: &str) -> MemoryResult<Vec<Neighbor>> {
    let Some(ids) = result.ids.first() else {
        return Ok(Vec::new());
    };

    let mut neighbors = Vec::with_capacity(ids.len());
    for (rank, id) in ids.iter().enumerate() {
        if id == self_id {
            continue;
        }
        let distance = result.distance(0, rank).ok_or_else(|| {
            MemoryError::downstream(format!("vector store returned no distance for {id}"))
        })?;
        neighbors.push(Neighbor {
            id: id.clone(),
            document: result.document(0, rank).map(str::to_string),
            metadata: result.metadata(0, rank).cloned(),
            distance,
        });
    }
    Ok(neighbors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use crate::store::{Metadata, Record};

    fn item(id: &str, embedding: Vec<f32>) -> MemoryItem {
        MemoryItem {
            id: id.into(),
            document: format!("doc {id}"),
            embedding,
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn identical_vectors_have_zero_distance() {
        let v = [3.0, 4.0];
        assert_eq!(cosine_distance(&v, &v).unwrap(), 0.0);
        let w = [0.2, -0.7, 1.3, 0.01];
        assert!(cosine_distance(&w, &w).unwrap() < 1e-12);
    }

    #[test]
    fn orthogonal_and_opposite_vectors() {
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 5.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((cosine_distance(&[1.0, 2.0], &[-1.0, -2.0]).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_vector_is_maximally_unrelated() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 2.0]).unwrap(), 1.0);
        assert_eq!(cosine_distance(&[1.0, 2.0], &[0.0, 0.0]).unwrap(), 1.0);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[0.0, 0.0]).unwrap(), 1.0);
    }

    #[test]
    fn distance_stays_in_bounds() {
        let vectors: Vec<Vec<f32>> = (0..12)
            .map(|i| {
                let t = i as f32 * 0.7;
                vec![t.sin(), t.cos(), (t * 1.3).sin() - 0.5]
            })
            .collect();
        for a in &vectors {
            for b in &vectors {
                let d = cosine_distance(a, b).unwrap();
                assert!((0.0..=2.0).contains(&d), "distance {d} out of bounds");
            }
        }
    }

    #[test]
    fn mismatched_dimensions_fail() {
        let err = cosine_distance(&[1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, MemoryError::DimensionMismatch { expected: 2, found: 3 }));
    }

    #[tokio::test]
    async fn neighbors_exclude_self_by_id() {
        let store = InMemoryStore::new();
        let col = store.get_or_create_collection("notes").await.unwrap();
        let records: Vec<Record> = [("a", vec![1.0, 0.0]), ("twin", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])]
            .into_iter()
            .map(|(id, embedding)| Record {
                id: id.into(),
                document: format!("doc {id}"),
                embedding,
                metadata: Metadata::new(),
            })
            .collect();
        store.upsert(&col, &records).await.unwrap();

        let adapter = SimilarityQuery::new(&store, &col);
        let neighbors = adapter.neighbors(&item("a", vec![1.0, 0.0]), 3).await.unwrap();
        let ids: Vec<&str> = neighbors.iter().map(|n| n.id.as_str()).collect();
        // The twin sits at distance zero but is a different id, so it stays.
        assert_eq!(ids, vec!["twin", "b"]);
        assert_eq!(neighbors[0].distance, 0.0);
        assert_eq!(neighbors[0].document.as_deref(), Some("doc twin"));
    }

    #[tokio::test]
    async fn zero_neighbors_is_rejected() {
        let store = InMemoryStore::new();
        let col = store.get_or_create_collection("notes").await.unwrap();
        let adapter = SimilarityQuery::new(&store, &col);
        let err = adapter.neighbors(&item("a", vec![1.0]), 0).await.unwrap_err();
        assert!(matches!(err, MemoryError::BadRequest(_)));
    }

    #[test]
    fn missing_distances_are_a_downstream_failure() {
        let result = QueryResult {
            ids: vec![vec!["x".into()]],
            ..Default::default()
        };
        let err = neighbors_from_result(&result, "self").unwrap_err();
        assert!(matches!(err, MemoryError::Downstream(_)));
    }
}
