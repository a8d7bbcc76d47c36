//! Memory deletion by id.

use serde::Serialize;

use crate::error::{MemoryError, MemoryResult};
use crate::store::VectorStore;

/// Result returned from a delete operation.
#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub success: bool,
    /// Number of ids submitted. Ids unknown to the store are not distinguished.
    pub deleted: usize,
}

/// Remove `ids` from `collection_name`.
///
/// An empty id list is rejected before the store is contacted.
pub async fn delete_memories(
    store: &dyn VectorStore,
    collection_name: &str,
    ids: &[String],
) -> MemoryResult<DeleteResult> {
    if ids.is_empty() {
        return Err(MemoryError::bad_request("ids is required"));
    }

    let collection = store.get_collection(collection_name).await?;
    store.delete(&collection, ids).await?;

    tracing::info!(collection = %collection_name, deleted = ids.len(), "memories deleted");
    Ok(DeleteResult {
        success: true,
        deleted: ids.len(),
    })
}
