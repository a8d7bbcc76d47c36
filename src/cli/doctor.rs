//! CLI `doctor` command: check the vector store and embedding provider.

use anyhow::Result;

use memscope::config::MemscopeConfig;

/// Check both collaborators and print a health report.
pub async fn doctor(config: &MemscopeConfig) -> Result<()> {
    let service = crate::server::build_service(config.clone())?;

    println!("memscope Health Report");
    println!("======================");
    println!();
    println!("Vector store:      {} ({})", config.store.url, config.store.provider);
    let store_ok = match service.store().heartbeat().await {
        Ok(()) => {
            println!("  Heartbeat:       OK");
            true
        }
        Err(e) => {
            println!("  Heartbeat:       FAILED ({e})");
            false
        }
    };

    println!();
    println!("Embedding:         {} ({})", config.embedding.url, config.embedding.model);
    let embed_ok = match service.embedder().embed("memscope doctor").await {
        Ok(vector) => {
            println!("  Round trip:      OK ({} dimensions)", vector.len());
            true
        }
        Err(e) => {
            println!("  Round trip:      FAILED ({e})");
            false
        }
    };

    if store_ok {
        println!();
        println!("Collections:");
        match service.collections().await {
            Ok(summaries) if summaries.is_empty() => println!("  (none)"),
            Ok(summaries) => {
                for summary in summaries {
                    println!("  {:<24} {}", summary.name, summary.count);
                }
            }
            Err(e) => println!("  FAILED ({e})"),
        }
    }

    println!();
    println!("Sync script:       {}", config.resolved_sync_script().display());
    if !config.resolved_sync_script().exists() {
        println!("  WARNING: script not found; `memscope sync` will fail.");
    }

    anyhow::ensure!(store_ok && embed_ok, "one or more checks failed");
    Ok(())
}
