use anyhow::Result;

use memscope::config::MemscopeConfig;
use memscope::error::MemoryError;

/// Run the external sync process and print its output.
pub async fn sync(config: &MemscopeConfig) -> Result<()> {
    let service = crate::server::build_service(config.clone())?;

    match service.sync().await {
        Ok(outcome) => {
            for line in &outcome.output {
                println!("  {line}");
            }
            println!();
            println!("Sync complete: {}", outcome.summary);
            Ok(())
        }
        Err(MemoryError::SyncFailure { summary, output }) => {
            for line in &output {
                println!("  {line}");
            }
            anyhow::bail!("sync failed: {summary}")
        }
        Err(e) => Err(e.into()),
    }
}
