pub mod duplicates;
pub mod forget;
pub mod graph;
pub mod search;
pub mod similarity;
pub mod stats;
pub mod store;
pub mod timeline;
pub mod types;

use crate::error::MemoryResult;
use crate::store::{Collection, GetOptions, GetResult, Include, VectorStore};

/// Read every record of `collection`: count first, then one `get` with that limit.
///
/// An empty collection returns an empty result without issuing the `get`.
pub async fn fetch_all(
    store: &dyn VectorStore,
    collection: &Collection,
    include: Vec<Include>,
) -> MemoryResult<GetResult> {
    let count = store.count(collection).await?;
    if count == 0 {
        return Ok(GetResult::default());
    }
    store
        .get(
            collection,
            &GetOptions {
                limit: Some(count),
                offset: None,
                include,
            },
        )
        .await
}
