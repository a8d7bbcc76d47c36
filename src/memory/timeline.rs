//! Chronological listing, newest first.

use crate::error::MemoryResult;
use crate::memory::fetch_all;
use crate::memory::types::{metadata_string, TimelineEntry, TimelinePage};
use crate::store::{Include, VectorStore};

/// Date assumed for memories without one; sorts last.
pub const EPOCH_DATE: &str = "1970-01-01";

/// All memories of `collection_name` sorted by `date` descending, then paged.
///
/// Dates compare as strings, which orders `YYYY-MM-DD` correctly. Ties keep retrieval
/// order. `total` is the unpaged count.
pub async fn timeline(
    store: &dyn VectorStore,
    collection_name: &str,
    offset: usize,
    limit: usize,
) -> MemoryResult<TimelinePage> {
    let collection = store.get_collection(collection_name).await?;
    let all = fetch_all(store, &collection, vec![Include::Documents, Include::Metadatas]).await?;

    let mut entries: Vec<TimelineEntry> = (0..all.ids.len())
        .map(|i| TimelineEntry {
            id: all.ids[i].clone(),
            document: all.document(i).map(str::to_string),
            metadata: all.metadata(i).cloned().unwrap_or_default(),
            date: metadata_string(all.metadata(i), "date")
                .unwrap_or_else(|| EPOCH_DATE.to_string()),
        })
        .collect();
    entries.sort_by(|a, b| b.date.cmp(&a.date));

    let total = entries.len();
    let items = entries.into_iter().skip(offset).take(limit).collect();
    Ok(TimelinePage { items, total })
}
