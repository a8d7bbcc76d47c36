use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use serde::Serialize;

use memscope::api::{
    CollectionsRequest, DeleteRequest, DuplicatesRequest, GraphRequest, QueryRequest,
    SourcesRequest, StoreRequest, SyncRequest, TimelineRequest,
};
use memscope::error::MemoryResult;
use memscope::service::MemoryService;

/// The memscope MCP tool handler. Every tool forwards to [`MemoryService`] and returns
/// the same JSON the HTTP surface would.
#[derive(Clone)]
pub struct MemscopeTools {
    tool_router: ToolRouter<Self>,
    service: Arc<MemoryService>,
}

/// Success → JSON text; failure → the error payload as JSON text.
fn render<T: Serialize>(tool: &str, result: MemoryResult<T>) -> Result<String, String> {
    match result {
        Ok(value) => serde_json::to_string(&value).map_err(|e| format!("serialization failed: {e}")),
        Err(err) => {
            tracing::warn!(tool, kind = err.kind(), error = %err, "tool failed");
            Err(err.to_payload().to_string())
        }
    }
}

#[tool_router]
impl MemscopeTools {
    pub fn new(service: Arc<MemoryService>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            service,
        }
    }

    #[tool(description = "Store a free-text memory. Storing the same text, source, section, and date again overwrites the existing memory.")]
    async fn store_memory(
        &self,
        Parameters(params): Parameters<StoreRequest>,
    ) -> Result<String, String> {
        tracing::info!(text_len = params.text.len(), "store_memory called");
        render("store_memory", self.service.store_memory(params).await)
    }

    #[tool(description = "Search memories by semantic similarity. Returns ids, documents, metadata, and cosine distances, nearest first.")]
    async fn query_memories(
        &self,
        Parameters(params): Parameters<QueryRequest>,
    ) -> Result<String, String> {
        tracing::info!(query = %params.query, "query_memories called");
        render("query_memories", self.service.query(params).await)
    }

    #[tool(description = "Find groups of near-duplicate memories in a sample of the collection.")]
    async fn find_duplicates(
        &self,
        Parameters(params): Parameters<DuplicatesRequest>,
    ) -> Result<String, String> {
        tracing::info!("find_duplicates called");
        render("find_duplicates", self.service.duplicates(params).await)
    }

    #[tool(description = "Build a similarity graph (nodes and links) over a sample of the collection.")]
    async fn build_graph(
        &self,
        Parameters(params): Parameters<GraphRequest>,
    ) -> Result<String, String> {
        tracing::info!("build_graph called");
        render("build_graph", self.service.graph(params).await)
    }

    #[tool(description = "Delete memories by id.")]
    async fn delete_memories(
        &self,
        Parameters(params): Parameters<DeleteRequest>,
    ) -> Result<String, String> {
        tracing::info!(ids = params.ids.len(), "delete_memories called");
        render("delete_memories", self.service.delete(params).await)
    }

    #[tool(description = "Count memories per source.")]
    async fn list_sources(
        &self,
        Parameters(params): Parameters<SourcesRequest>,
    ) -> Result<String, String> {
        render("list_sources", self.service.sources(params).await)
    }

    #[tool(description = "List memories newest first, paged by offset and limit.")]
    async fn timeline(
        &self,
        Parameters(params): Parameters<TimelineRequest>,
    ) -> Result<String, String> {
        render("timeline", self.service.timeline(params).await)
    }

    #[tool(description = "List every collection with its memory count.")]
    async fn list_collections(
        &self,
        Parameters(_params): Parameters<CollectionsRequest>,
    ) -> Result<String, String> {
        render("list_collections", self.service.collections().await)
    }

    #[tool(description = "Run the external sync process that re-ingests memory sources into the vector store.")]
    async fn sync_memories(
        &self,
        Parameters(_params): Parameters<SyncRequest>,
    ) -> Result<String, String> {
        tracing::info!("sync_memories called");
        render("sync_memories", self.service.sync().await)
    }
}

#[tool_handler]
impl ServerHandler for MemscopeTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "memscope is a semantic memory store. Use store_memory to save memories, \
                 query_memories to search, and find_duplicates or build_graph to analyze \
                 the corpus."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memscope::error::MemoryError;

    #[test]
    fn render_success_is_json_text() {
        let text = render("t", Ok(serde_json::json!({"deleted": 2}))).unwrap();
        assert_eq!(text, r#"{"deleted":2}"#);
    }

    #[test]
    fn render_failure_carries_kind() {
        let err = render::<()>("t", Err(MemoryError::bad_request("ids is required"))).unwrap_err();
        let payload: serde_json::Value = serde_json::from_str(&err).unwrap();
        assert_eq!(payload["kind"], "bad_request");
        assert_eq!(payload["error"], "ids is required");
    }
}
