//! Catalog commands.

use console::style;

use super::open_state;
use crate::config::Settings;

/// Scrape the issue selector and replace the stored catalog.
pub async fn cmd_refresh(settings: &Settings, date_hint: Option<&str>) -> anyhow::Result<()> {
    let state = open_state(settings).await?;
    let service = state.catalog_service()?;

    println!(
        "{} Fetching issue list from {}",
        style("→").cyan(),
        service.catalog_url(date_hint)?
    );

    match service.refresh(date_hint).await {
        Ok(count) => {
            println!("{} Stored {} catalog entries", style("✓").green(), count);
            Ok(())
        }
        Err(e) => {
            println!("{} Catalog refresh failed: {}", style("✗").red(), e);
            println!("  Previous catalog left untouched");
            Err(e.into())
        }
    }
}

/// Print the stored catalog in source order.
pub async fn cmd_list(settings: &Settings) -> anyhow::Result<()> {
    let state = open_state(settings).await?;
    let entries = state.catalog_service()?.list().await?;

    if entries.is_empty() {
        println!(
            "{} Catalog is empty. Run `gazette catalog refresh` first.",
            style("!").yellow()
        );
        return Ok(());
    }

    println!("{:<5} {:<20} LABEL", "#", "TOKEN");
    for entry in &entries {
        println!("{:<5} {:<20} {}", entry.sort_order, entry.token, entry.label);
    }
    println!();
    println!(
        "{} entries, refreshed {}",
        entries.len(),
        entries[0].refreshed_at.format("%Y-%m-%d %H:%M UTC")
    );

    Ok(())
}
