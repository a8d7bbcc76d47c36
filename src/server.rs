//! Server initialization for the HTTP and MCP stdio transports.
//!
//! Provides [`serve_http`] and [`serve_stdio`] entry points that wire up the vector
//! store, embedding provider, and sync trigger into a running server.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::ServiceExt;

use memscope::config::MemscopeConfig;
use memscope::service::MemoryService;
use memscope::sync::{ScriptSync, SyncTrigger};
use memscope::{embedding, http, store};

use crate::tools::MemscopeTools;

/// Shared setup: create the vector store, embedding provider, and sync trigger.
pub fn build_service(config: MemscopeConfig) -> Result<Arc<MemoryService>> {
    let vector_store: Arc<dyn store::VectorStore> = Arc::from(store::create_store(&config.store)?);
    tracing::info!(provider = %config.store.provider, url = %config.store.url, "vector store ready");

    let embedder: Arc<dyn embedding::EmbeddingProvider> =
        Arc::from(embedding::create_provider(&config.embedding)?);
    tracing::info!(model = %embedder.model(), "embedding provider ready");

    let sync: Arc<dyn SyncTrigger> = Arc::new(ScriptSync::from_config(&config.sync));

    Ok(Arc::new(MemoryService::new(
        vector_store,
        embedder,
        sync,
        Arc::new(config),
    )))
}

/// Serve `POST /{operation}` over HTTP until ctrl-c.
pub async fn serve_http(config: MemscopeConfig) -> Result<()> {
    let bind_addr = config.bind_addr();
    let service = build_service(config)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "memscope listening at http://{bind_addr}");

    http::serve(listener, service, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            return;
        }
        tracing::info!("shutting down HTTP server");
    })
    .await?;

    Ok(())
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: MemscopeConfig) -> Result<()> {
    tracing::info!("starting memscope MCP server on stdio");

    let service = build_service(config)?;
    let tools = MemscopeTools::new(service);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}
