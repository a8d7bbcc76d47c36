//! Core memory type definitions.
//!
//! [`MemoryItem`] is a stored memory with its embedding, as sampled for analytics.
//! The remaining types are the transient results of analytics and listing operations;
//! none of them are persisted.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{MemoryError, MemoryResult};
use crate::store::{GetResult, Metadata};

/// A stored memory: content-addressed id, document, embedding, and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryItem {
    pub id: String,
    pub document: String,
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
}

impl MemoryItem {
    /// Convert a bulk read (fetched with embeddings) into items, preserving order.
    ///
    /// Every sampled item must carry an embedding; a missing one means the store
    /// answered without the requested column.
    pub fn from_sample(sample: GetResult) -> MemoryResult<Vec<MemoryItem>> {
        let GetResult {
            ids,
            documents,
            metadatas,
            embeddings,
        } = sample;

        let mut embeddings = embeddings
            .ok_or_else(|| MemoryError::downstream("vector store returned no embeddings"))?
            .into_iter();
        let mut documents = documents.unwrap_or_default().into_iter();
        let mut metadatas = metadatas.unwrap_or_default().into_iter();

        ids.into_iter()
            .map(|id| {
                let embedding = embeddings.next().ok_or_else(|| {
                    MemoryError::downstream(format!("vector store returned no embedding for {id}"))
                })?;
                Ok(MemoryItem {
                    document: documents.next().flatten().unwrap_or_default(),
                    metadata: metadatas.next().flatten().unwrap_or_default(),
                    embedding,
                    id,
                })
            })
            .collect()
    }

    /// Metadata value as a string, `""` when absent.
    pub fn meta(&self, key: &str) -> String {
        metadata_string(Some(&self.metadata), key).unwrap_or_default()
    }
}

/// Read a metadata value as a string. Non-string values are rendered as JSON.
pub fn metadata_string(metadata: Option<&Metadata>, key: &str) -> Option<String> {
    match metadata?.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Identity and metadata fields of a memory about to be stored.
#[derive(Debug, Clone)]
pub struct MemoryMetadata {
    pub source: String,
    pub section: String,
    pub date: String,
    pub tags: Option<String>,
}

impl MemoryMetadata {
    /// Stored form. An empty section is recorded as `"memory"`; tags only when non-empty.
    pub fn to_metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("source".into(), self.source.clone().into());
        let section = if self.section.is_empty() {
            "memory".to_string()
        } else {
            self.section.clone()
        };
        metadata.insert("section".into(), section.into());
        metadata.insert("date".into(), self.date.clone().into());
        if let Some(tags) = self.tags.as_ref().filter(|t| !t.is_empty()) {
            metadata.insert("tags".into(), tags.clone().into());
        }
        metadata
    }
}

/// A document reference: the anchor of a duplicate group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anchor {
    pub id: String,
    pub document: String,
    pub metadata: Metadata,
}

/// One nearest-neighbor hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub id: String,
    pub document: Option<String>,
    pub metadata: Option<Metadata>,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub anchor: Anchor,
    pub similar: Vec<Neighbor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateReport {
    pub duplicates: Vec<DuplicateGroup>,
    /// Sample size actually fetched.
    pub scanned: usize,
    /// Full collection count.
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub source: String,
    pub date: String,
}

/// Undirected edge between two sampled memories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub distance: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SimilarityGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub id: String,
    pub document: Option<String>,
    pub metadata: Metadata,
    pub date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelinePage {
    pub items: Vec<TimelineEntry>,
    /// Unpaged item count.
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceCounts {
    pub sources: BTreeMap<String, usize>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    pub count: usize,
}
