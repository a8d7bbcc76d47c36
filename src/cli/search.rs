use anyhow::Result;

use memscope::api::QueryRequest;
use memscope::config::MemscopeConfig;

use super::preview;

/// Run a semantic search from the terminal.
pub async fn search(config: &MemscopeConfig, query: &str, n_results: Option<usize>) -> Result<()> {
    let service = crate::server::build_service(config.clone())?;

    let result = service
        .query(QueryRequest {
            collection: None,
            query: query.to_string(),
            n_results,
        })
        .await?;

    let ids = result.ids.first().cloned().unwrap_or_default();
    if ids.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s) in {}\n", ids.len(), config.store.collection);

    for (rank, id) in ids.iter().enumerate() {
        let distance = result.distance(0, rank).unwrap_or(f64::NAN);
        let source = result
            .metadata(0, rank)
            .and_then(|m| m.get("source"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        println!("  {}. {} [{}] (distance: {:.4})", rank + 1, id, source, distance);
        println!("     {}", preview(result.document(0, rank).unwrap_or(""), 120));
        println!();
    }

    Ok(())
}
