//! Import command.

use std::path::{Path, PathBuf};

use anyhow::Context;
use console::style;
use tokio::sync::mpsc;

use crate::config::Settings;
use crate::services::{load_document, ImportEvent, ImportReport, ImportService};

/// Import a scrape document into the catalog. Shared with `build`.
pub(super) async fn run_import(settings: &Settings, input: &Path) -> anyhow::Result<ImportReport> {
    let document = load_document(input)
        .with_context(|| format!("Failed to load scrape document {}", input.display()))?;
    println!(
        "{} Importing {} games from {}",
        style("→").cyan(),
        document.games.len(),
        input.display()
    );

    let ctx = settings.create_db_context();
    ctx.init_schema().await?;
    let service = ImportService::new(&ctx);

    let (event_tx, mut event_rx) = mpsc::channel::<ImportEvent>(100);

    let event_handler = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                ImportEvent::Imported { title } => {
                    println!("  {} {}", style("✓").green(), title);
                }
                ImportEvent::Updated { title } => {
                    println!("  {} {} (updated)", style("→").cyan(), title);
                }
                ImportEvent::Skipped { title, reason } => {
                    println!("  {} {}: {}", style("!").yellow(), title, reason);
                }
                ImportEvent::Failed { title, error } => {
                    println!("  {} {}: {}", style("✗").red(), title, error);
                }
            }
        }
    });

    let report = service.import(&document.games, event_tx).await;
    let _ = event_handler.await;

    Ok(report)
}

pub(super) fn print_report(report: &ImportReport) {
    println!(
        "{} Import complete: {} imported, {} updated, {} skipped, {} errors (of {})",
        style("✓").green(),
        report.imported,
        report.updated,
        report.skipped,
        report.errors,
        report.total
    );
}

/// Import scraped games into the database.
pub async fn cmd_import(settings: &Settings, input: Option<PathBuf>) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let input = input.unwrap_or_else(|| settings.scrape_output.clone());

    let report = run_import(settings, &input).await?;
    print_report(&report);

    Ok(())
}
