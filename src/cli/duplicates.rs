use anyhow::Result;

use memscope::api::DuplicatesRequest;
use memscope::config::MemscopeConfig;

use super::preview;

/// Scan for near-duplicate memories and print each group.
pub async fn duplicates(
    config: &MemscopeConfig,
    collection: Option<String>,
    threshold: Option<f64>,
    sample_size: Option<usize>,
) -> Result<()> {
    let service = crate::server::build_service(config.clone())?;

    let report = service
        .duplicates(DuplicatesRequest {
            collection,
            threshold,
            sample_size,
        })
        .await?;

    println!(
        "Scanned {} of {} memories, {} duplicate group(s)\n",
        report.scanned,
        report.total,
        report.duplicates.len()
    );

    for (i, group) in report.duplicates.iter().enumerate() {
        println!("  {}. {}", i + 1, group.anchor.id);
        println!("     {}", preview(&group.anchor.document, 100));
        for member in &group.similar {
            println!(
                "       ~ {} (distance: {:.4}) {}",
                member.id,
                member.distance,
                preview(member.document.as_deref().unwrap_or(""), 80)
            );
        }
        println!();
    }

    Ok(())
}
