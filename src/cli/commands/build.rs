//! Full build command: scrape, import, generate.

use console::style;

use super::generate::run_generate;
use super::import::{print_report, run_import};
use super::scrape::run_scrape;
use super::serve::serve_static_dir;
use crate::config::Settings;
use crate::server::{spawn_api, AppState};
use crate::sitegen::SiteConfig;

/// Which build stages to run.
pub struct BuildOptions {
    pub max_games: Option<usize>,
    pub skip_scraping: bool,
    pub skip_import: bool,
    pub skip_static: bool,
    pub skip_seo: bool,
    pub serve: bool,
    pub serve_port: u16,
}

/// Run the whole pipeline against the configured portal.
pub async fn cmd_build(settings: &Settings, options: BuildOptions) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    if options.skip_scraping {
        println!("{} Skipping scrape", style("!").yellow());
    } else {
        println!("{} [1/3] Scraping {}", style("→").cyan(), settings.base_url);
        let report = run_scrape(
            settings,
            options.max_games.unwrap_or(settings.max_games),
            &settings.scrape_output,
            settings.request_delay(),
        )
        .await?;
        println!(
            "  {} {} new games ({} total)",
            style("✓").green(),
            report.added,
            report.total
        );
    }

    if options.skip_import {
        println!("{} Skipping import", style("!").yellow());
    } else {
        println!("{} [2/3] Importing", style("→").cyan());
        let report = run_import(settings, &settings.scrape_output).await?;
        print_report(&report);
    }

    if options.skip_static {
        println!("{} Skipping static generation", style("!").yellow());
    } else {
        println!("{} [3/3] Generating static site", style("→").cyan());
        let server = spawn_api(AppState::new(settings).await?).await?;

        let mut config = SiteConfig::from_settings(settings);
        config.api_base_url = server.base_url();
        config.seo = !options.skip_seo;

        let result = run_generate(settings, config).await;
        server.shutdown();
        result?;
    }

    println!(
        "{} Build complete: {}",
        style("✓").green(),
        settings.static_dir.display()
    );

    if options.serve {
        serve_static_dir(settings, "127.0.0.1", options.serve_port).await?;
    }

    Ok(())
}
