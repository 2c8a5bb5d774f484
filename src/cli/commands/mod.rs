//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod build;
mod generate;
mod import;
mod init;
mod scrape;
mod serve;
mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "gamesite")]
#[command(about = "Game portal scraper, catalog API and static site generator")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Scrape the game portal into the JSON scrape document
    Scrape {
        /// Maximum number of new games to analyze
        #[arg(short, long)]
        max_games: Option<usize>,
        /// Scrape document path (defaults to the configured scrape output)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Delay between game pages in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Import the scrape document into the catalog database
    Import {
        /// Scrape document to read (defaults to the configured scrape output)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Start the catalog API server
    Serve {
        /// Address to bind to (host:port, host, or port)
        #[arg(short, long, default_value = "127.0.0.1:8000")]
        bind: String,
    },

    /// Generate static game pages from a running catalog API
    Generate {
        /// Catalog API base URL (defaults to the configured API URL)
        #[arg(long)]
        api: Option<String>,
        /// Output directory (defaults to the configured static directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run scrape, import and static generation in one go
    Build {
        /// Maximum number of new games to analyze
        #[arg(short, long)]
        max_games: Option<usize>,
        /// Skip the scrape step
        #[arg(long)]
        skip_scraping: bool,
        /// Skip the import step
        #[arg(long)]
        skip_import: bool,
        /// Skip static page generation
        #[arg(long)]
        skip_static: bool,
        /// Do not write sitemaps and robots.txt
        #[arg(long)]
        skip_seo: bool,
        /// Serve the generated site when done
        #[arg(long)]
        serve: bool,
        /// Port for --serve
        #[arg(long, default_value = "8001")]
        serve_port: u16,
    },

    /// Serve the generated static site
    ServeStatic {
        /// Address to bind to (host:port, host, or port)
        #[arg(short, long, default_value = "127.0.0.1:8001")]
        bind: String,
    },

    /// Show catalog statistics
    Stats,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let (settings, _config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Scrape {
            max_games,
            output,
            delay_ms,
        } => scrape::cmd_scrape(&settings, max_games, output, delay_ms).await,
        Commands::Import { input } => import::cmd_import(&settings, input).await,
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
        Commands::Generate { api, out } => generate::cmd_generate(&settings, api, out).await,
        Commands::Build {
            max_games,
            skip_scraping,
            skip_import,
            skip_static,
            skip_seo,
            serve,
            serve_port,
        } => {
            build::cmd_build(
                &settings,
                build::BuildOptions {
                    max_games,
                    skip_scraping,
                    skip_import,
                    skip_static,
                    skip_seo,
                    serve,
                    serve_port,
                },
            )
            .await
        }
        Commands::ServeStatic { bind } => serve::cmd_serve_static(&settings, &bind).await,
        Commands::Stats => stats::cmd_stats(&settings).await,
    }
}
