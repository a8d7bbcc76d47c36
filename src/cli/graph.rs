use anyhow::{Context, Result};

use memscope::api::GraphRequest;
use memscope::config::MemscopeConfig;

/// Build the similarity graph and print it as JSON on stdout.
pub async fn graph(
    config: &MemscopeConfig,
    collection: Option<String>,
    threshold: Option<f64>,
    sample_size: Option<usize>,
) -> Result<()> {
    let service = crate::server::build_service(config.clone())?;

    let graph = service
        .graph(GraphRequest {
            collection,
            sample_size,
            threshold,
        })
        .await?;

    tracing::info!(nodes = graph.nodes.len(), links = graph.links.len(), "graph ready");
    let json = serde_json::to_string_pretty(&graph).context("failed to serialize graph")?;
    println!("{json}");
    Ok(())
}
