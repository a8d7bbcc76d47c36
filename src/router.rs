//! Transport-agnostic dispatch: `(operation name, JSON body)` → `(status, JSON body)`.
//!
//! Failures never escape [`dispatch`]; they become an error payload with the matching
//! status, so every transport always has something to send back.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::{
    CollectionsRequest, DeleteRequest, DuplicatesRequest, GraphRequest, QueryRequest,
    SourcesRequest, StoreRequest, SyncRequest, TimelineRequest,
};
use crate::error::{MemoryError, MemoryResult};
use crate::service::MemoryService;

/// A parsed request, one variant per operation.
#[derive(Debug)]
pub enum Operation {
    Store(StoreRequest),
    Query(QueryRequest),
    Duplicates(DuplicatesRequest),
    Graph(GraphRequest),
    Delete(DeleteRequest),
    Sources(SourcesRequest),
    Timeline(TimelineRequest),
    Collections,
    Sync,
}

/// Operation names, as they appear in routes.
pub const OPERATIONS: [&str; 9] = [
    "store",
    "query",
    "duplicates",
    "graph",
    "delete",
    "sources",
    "timeline",
    "collections",
    "sync",
];

impl Operation {
    /// Parse `body` for operation `name`. An empty body is treated as `{}`.
    pub fn parse(name: &str, body: &[u8]) -> MemoryResult<Self> {
        let body = if body.iter().all(u8::is_ascii_whitespace) {
            &b"{}"[..]
        } else {
            body
        };

        Ok(match name {
            "store" => Self::Store(parse_body(body)?),
            "query" => Self::Query(parse_body(body)?),
            "duplicates" => Self::Duplicates(parse_body(body)?),
            "graph" => Self::Graph(parse_body(body)?),
            "delete" => Self::Delete(parse_body(body)?),
            "sources" => Self::Sources(parse_body(body)?),
            "timeline" => Self::Timeline(parse_body(body)?),
            "collections" => {
                parse_body::<CollectionsRequest>(body)?;
                Self::Collections
            }
            "sync" => {
                parse_body::<SyncRequest>(body)?;
                Self::Sync
            }
            _ => return Err(MemoryError::NotFound("not found".into())),
        })
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> MemoryResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| MemoryError::bad_request(format!("invalid request body: {e}")))
}

/// Response ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(err: &MemoryError) -> Self {
        Self {
            status: err.status_code(),
            body: err.to_payload(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Run one operation.
pub async fn execute(service: &MemoryService, op: Operation) -> MemoryResult<Value> {
    fn json<T: Serialize>(value: T) -> MemoryResult<Value> {
        serde_json::to_value(value)
            .map_err(|e| MemoryError::downstream(format!("failed to serialize response: {e}")))
    }

    match op {
        Operation::Store(req) => json(service.store_memory(req).await?),
        Operation::Query(req) => json(service.query(req).await?),
        Operation::Duplicates(req) => json(service.duplicates(req).await?),
        Operation::Graph(req) => json(service.graph(req).await?),
        Operation::Delete(req) => json(service.delete(req).await?),
        Operation::Sources(req) => json(service.sources(req).await?),
        Operation::Timeline(req) => json(service.timeline(req).await?),
        Operation::Collections => json(service.collections().await?),
        Operation::Sync => json(service.sync().await?),
    }
}

/// Parse and run operation `name`, folding every failure into the reply.
pub async fn dispatch(service: &MemoryService, name: &str, body: &[u8]) -> Reply {
    let result = match Operation::parse(name, body) {
        Ok(op) => execute(service, op).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(value) => Reply::ok(value),
        Err(err) => {
            if err.status_code() >= 500 {
                tracing::error!(operation = %name, kind = err.kind(), error = %err, "operation failed");
            } else {
                tracing::debug!(operation = %name, kind = err.kind(), error = %err, "request rejected");
            }
            Reply::error(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemscopeConfig;
    use crate::embedding::EmbeddingProvider;
    use crate::store::memory::InMemoryStore;
    use crate::sync::{SyncOutcome, SyncTrigger};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    struct UnitEmbedder;

    #[async_trait]
    impl EmbeddingProvider for UnitEmbedder {
        async fn embed(&self, _text: &str) -> MemoryResult<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn model(&self) -> &str {
            "unit"
        }
    }

    struct NoSync;

    #[async_trait]
    impl SyncTrigger for NoSync {
        async fn run_sync(&self) -> MemoryResult<SyncOutcome> {
            Ok(SyncOutcome {
                success: true,
                output: Vec::new(),
                summary: "Unknown".into(),
            })
        }
    }

    fn service() -> MemoryService {
        MemoryService::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(UnitEmbedder),
            Arc::new(NoSync),
            Arc::new(MemscopeConfig::default()),
        )
    }

    #[test]
    fn parses_every_operation_with_empty_body() {
        for name in OPERATIONS {
            assert!(Operation::parse(name, b"").is_ok(), "{name} failed to parse");
        }
        assert!(Operation::parse("store", b"  \n").is_ok());
    }

    #[test]
    fn unknown_operation_is_not_found() {
        let err = Operation::parse("drop_everything", b"{}").unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let reply = dispatch(&service(), "query", b"{not json").await;
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body["kind"], "bad_request");
    }

    #[tokio::test]
    async fn empty_delete_is_rejected() {
        let reply = dispatch(&service(), "delete", br#"{"ids": []}"#).await;
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body["error"], "ids is required");
    }

    #[tokio::test]
    async fn store_then_list() {
        let svc = service();
        let reply = dispatch(
            &svc,
            "store",
            br#"{"text": "The sky is blue", "source": "notes", "section": "weather", "date": "2024-01-01"}"#,
        )
        .await;
        assert!(reply.is_success());
        assert_eq!(reply.body["id"], "bd92aac3c5f677d47be575f1790ded93");

        let reply = dispatch(&svc, "collections", b"").await;
        assert_eq!(reply.body, json!([{"name": "memories", "count": 1}]));

        let reply = dispatch(&svc, "sources", b"{}").await;
        assert_eq!(reply.body, json!({"sources": {"notes": 1}, "total": 1}));
    }

    #[tokio::test]
    async fn unknown_collection_is_404() {
        let reply = dispatch(&service(), "timeline", br#"{"collection": "ghost"}"#).await;
        assert_eq!(reply.status, 404);
        assert_eq!(reply.body["kind"], "not_found");
    }
}
