use anyhow::Result;

use memscope::api::SourcesRequest;
use memscope::config::MemscopeConfig;

/// Display per-source memory counts in the terminal.
pub async fn sources(config: &MemscopeConfig, collection: Option<String>) -> Result<()> {
    let service = crate::server::build_service(config.clone())?;
    let name = collection
        .clone()
        .unwrap_or_else(|| config.store.collection.clone());

    let counts = service.sources(SourcesRequest { collection }).await?;

    println!("Sources in {name}");
    println!("{}", "=".repeat(40));
    for (source, count) in &counts.sources {
        println!("  {:<24} {}", source, count);
    }
    println!();
    println!("  Total memories:      {}", counts.total);

    Ok(())
}
