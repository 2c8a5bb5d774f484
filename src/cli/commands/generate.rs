//! Static site generation command.

use std::path::PathBuf;

use console::style;

use super::scrape::progress_bar;
use crate::config::Settings;
use crate::scrapers::HttpClient;
use crate::sitegen::{ApiClient, GenerateReport, SiteConfig, SiteGenerator};

/// Render the site described by `config`. Shared with `build`.
pub(super) async fn run_generate(
    settings: &Settings,
    config: SiteConfig,
) -> anyhow::Result<GenerateReport> {
    println!(
        "{} Generating static pages from {} into {}",
        style("→").cyan(),
        config.api_base_url,
        config.out_dir.display()
    );

    let http = HttpClient::new(settings.request_timeout(), Some(&settings.user_agent))?;
    let client = ApiClient::new(http, &config.api_base_url);

    let pb = progress_bar();
    let report = SiteGenerator::new(client, config)
        .with_progress(pb.clone())
        .generate()
        .await;
    pb.finish_and_clear();
    let report = report?;

    println!(
        "{} Generated {} pages",
        style("✓").green(),
        report.generated
    );
    if report.failed > 0 {
        println!(
            "  {} {} pages failed, see the log for details",
            style("✗").red(),
            report.failed
        );
    }

    Ok(report)
}

/// Generate static pages from a running catalog API.
pub async fn cmd_generate(
    settings: &Settings,
    api: Option<String>,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = SiteConfig::from_settings(settings);
    if let Some(api) = api {
        config.api_base_url = api;
    }
    if let Some(out) = out {
        config.out_dir = out;
    }

    run_generate(settings, config).await?;
    Ok(())
}
