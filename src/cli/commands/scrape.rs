//! Scrape command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use crate::config::Settings;
use crate::scrapers::{
    HttpClient, RecentlyPlayedParser, ScrapeContext, ScrapeOptions, ScrapePipeline, ScrapeReport,
};

pub(super) fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    pb
}

/// Run one scrape pass and save the document. Shared with `build`.
pub(super) async fn run_scrape(
    settings: &Settings,
    max_games: usize,
    output: &Path,
    delay: Duration,
) -> anyhow::Result<ScrapeReport> {
    let mut ctx = ScrapeContext::load(output, &settings.website)
        .with_context(|| format!("Failed to load {}", output.display()))?;
    if !ctx.is_empty() {
        println!(
            "{} {} games already scraped, only new ones will be analyzed",
            style("→").cyan(),
            ctx.len()
        );
    }

    let client = HttpClient::new(settings.request_timeout(), Some(&settings.user_agent))?;
    let base = Url::parse(&settings.base_url)
        .with_context(|| format!("Invalid base URL: {}", settings.base_url))?;
    let parser = RecentlyPlayedParser;

    let pb = progress_bar();
    let pipeline = ScrapePipeline::new(
        &client,
        &parser,
        base,
        ScrapeOptions { max_games, delay },
    )
    .with_progress(pb.clone());

    let report = pipeline.run(&mut ctx).await;
    pb.finish_and_clear();

    ctx.save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(report)
}

fn print_report(report: &ScrapeReport, output: &Path) {
    println!(
        "{} Scrape complete: {} new games ({} total)",
        style("✓").green(),
        report.added,
        report.total
    );
    println!(
        "  {} links found, {} already known, {} analyzed",
        report.discovered, report.skipped_known, report.analyzed
    );
    if report.failed > 0 {
        println!(
            "  {} {} pages had no usable game data",
            style("!").yellow(),
            report.failed
        );
    }
    println!("  Saved to {}", output.display());
}

/// Scrape the portal's landing page and analyze new games.
pub async fn cmd_scrape(
    settings: &Settings,
    max_games: Option<usize>,
    output: Option<PathBuf>,
    delay_ms: Option<u64>,
) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let output = output.unwrap_or_else(|| settings.scrape_output.clone());
    let delay = delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.request_delay());

    println!(
        "{} Scraping {}",
        style("→").cyan(),
        settings.base_url
    );

    let report = run_scrape(
        settings,
        max_games.unwrap_or(settings.max_games),
        &output,
        delay,
    )
    .await?;
    print_report(&report, &output);

    Ok(())
}
