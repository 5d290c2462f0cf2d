//! Ingest command.

use console::style;

use super::open_state;
use crate::config::Settings;

/// Download every PDF linked from one issue and record it.
pub async fn cmd_ingest(settings: &Settings, token: &str) -> anyhow::Result<()> {
    let state = open_state(settings).await?;
    let service = state.ingest_service()?;

    println!("{} Ingesting issue {}", style("→").cyan(), style(token).bold());

    let summary = match service.ingest(token).await {
        Ok(summary) => summary,
        Err(e) => {
            println!("{} Failed to crawl PDFs: {}", style("✗").red(), e);
            return Err(e.into());
        }
    };

    for pdf in &summary.pdfs {
        println!("  {} {} ({})", style("✓").green(), pdf.name, pdf.storage_key);
    }
    for failed in &summary.failed {
        println!(
            "  {} {} {}: {}",
            style("✗").red(),
            failed.name,
            style(&failed.url).dim(),
            failed.error
        );
    }

    println!();
    println!(
        "{} Stored {} of {} PDFs",
        if summary.failed.is_empty() {
            style("✓").green()
        } else {
            style("!").yellow()
        },
        summary.processed,
        summary.discovered
    );

    Ok(())
}
