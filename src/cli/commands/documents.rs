//! Document management commands.

use console::style;

use super::open_state;
use crate::config::Settings;
use crate::models::StatusFilter;
use crate::services::{DocumentFilter, PageSize};

/// Print one page of documents, newest first.
pub async fn cmd_list(
    settings: &Settings,
    name: Option<String>,
    status: &str,
    page: usize,
    limit: i64,
) -> anyhow::Result<()> {
    let status = StatusFilter::parse(status)
        .ok_or_else(|| anyhow::anyhow!("Unknown status '{}'", status))?;
    let size = PageSize::from_limit(limit)?;
    let filter = DocumentFilter { name, status };

    let state = open_state(settings).await?;
    let result = state.document_service().list(&filter, page, size).await?;

    if result.documents.is_empty() {
        println!("{} No documents found", style("!").yellow());
        return Ok(());
    }

    println!("{:<36}  {:<10}  {:<16}  NAME", "ID", "STATUS", "CREATED");
    for doc in &result.documents {
        println!(
            "{:<36}  {:<10}  {:<16}  {}",
            doc.id,
            doc.status,
            doc.created_at.format("%Y-%m-%d %H:%M"),
            doc.name
        );
    }
    println!();
    println!(
        "Page {} of {} ({} documents)",
        result.page, result.total_pages, result.total
    );

    Ok(())
}

/// Flip a document to processing.
pub async fn cmd_parse(settings: &Settings, id: &str) -> anyhow::Result<()> {
    let state = open_state(settings).await?;
    let doc = state.document_service().mark_processing(id).await?;
    println!(
        "{} {} is now {}",
        style("✓").green(),
        doc.name,
        style(doc.status).cyan()
    );
    Ok(())
}

/// Delete a document's blob, then its row.
pub async fn cmd_delete(settings: &Settings, id: &str) -> anyhow::Result<()> {
    let state = open_state(settings).await?;
    let service = state.document_service();
    let doc = service.get(id).await?;
    service.delete(id).await?;
    println!("{} Deleted {}", style("✓").green(), doc.name);
    Ok(())
}

/// Print the public URL of a document's stored PDF.
pub async fn cmd_preview(settings: &Settings, id: &str) -> anyhow::Result<()> {
    let state = open_state(settings).await?;
    let url = state.document_service().preview_url(id).await?;
    println!("{}", url);
    Ok(())
}
