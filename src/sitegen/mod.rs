//! Static site generation from the catalog API.
//!
//! Reads every active game through the public API and writes one HTML page
//! per game plus the catalog-wide files (`game_slugs.txt`,
//! `all_games.json`, and the SEO files) under the output directory.

mod client;
mod page;
mod seo;
mod tags;

pub use client::ApiClient;
pub use page::render_game_page;
pub use tags::{standardize_game_tags, MAX_STANDARD_TAGS};

use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use indicatif::ProgressBar;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Settings;
use crate::models::Game;
use crate::utils::write_atomic;

/// Related games shown under each page.
pub const MAX_RELATED_GAMES: usize = 6;

/// Errors that stop generation as a whole.
#[derive(Debug, Error)]
pub enum SiteGenError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Where and how the site is generated.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub site_url: String,
    pub site_name: String,
    pub api_base_url: String,
    pub out_dir: PathBuf,
    /// Write sitemaps and robots.txt.
    pub seo: bool,
}

impl SiteConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            site_url: settings.site_url.trim_end_matches('/').to_string(),
            site_name: settings.site_name.clone(),
            api_base_url: settings.api_base_url.clone(),
            out_dir: settings.static_dir.clone(),
            seo: true,
        }
    }
}

/// Outcome of one generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub generated: usize,
    pub failed: usize,
}

#[derive(Serialize)]
struct CatalogMetadata<'a> {
    total_games: usize,
    generated_at: String,
    website: &'a str,
    api_base_url: &'a str,
}

#[derive(Serialize)]
struct CatalogGame<'a> {
    #[serde(flatten)]
    game: &'a Game,
    standardized_tags: &'a [String],
}

#[derive(Serialize)]
struct CatalogDocument<'a> {
    metadata: CatalogMetadata<'a>,
    games: Vec<CatalogGame<'a>>,
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), SiteGenError> {
    write_atomic(path, contents).map_err(|source| SiteGenError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders the static site from a running catalog API.
pub struct SiteGenerator {
    client: ApiClient,
    config: SiteConfig,
    progress: Option<ProgressBar>,
}

impl SiteGenerator {
    pub fn new(client: ApiClient, config: SiteConfig) -> Self {
        Self {
            client,
            config,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Related games for `game`: same category, excluding itself.
    async fn related(&self, game: &Game) -> Vec<Game> {
        match self
            .client
            .games_in_category(&game.category_slug, MAX_RELATED_GAMES as i64 + 1)
            .await
        {
            Ok(games) => games
                .into_iter()
                .filter(|g| g.slug != game.slug)
                .take(MAX_RELATED_GAMES)
                .collect(),
            Err(e) => {
                warn!("Failed to fetch related games for {}: {}", game.slug, e);
                Vec::new()
            }
        }
    }

    /// Render one page; returns the game and its standardized tags.
    async fn generate_page(&self, slug: &str) -> Result<(Game, Vec<String>), SiteGenError> {
        let game = self.client.game_by_slug(slug).await?;
        let tags = standardize_game_tags(&game);
        let related = self.related(&game).await;

        let html = render_game_page(&game, &tags, &related, &self.config)?;
        let path = self
            .config
            .out_dir
            .join("games")
            .join(format!("{}.html", slug));
        write_file(&path, html.as_bytes())?;

        Ok((game, tags))
    }

    fn write_catalog(&self, games: &[(Game, Vec<String>)]) -> Result<(), SiteGenError> {
        let document = CatalogDocument {
            metadata: CatalogMetadata {
                total_games: games.len(),
                generated_at: Utc::now().to_rfc3339(),
                website: &self.config.site_name,
                api_base_url: &self.config.api_base_url,
            },
            games: games
                .iter()
                .map(|(game, tags)| CatalogGame {
                    game,
                    standardized_tags: tags,
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        write_file(&self.config.out_dir.join("all_games.json"), json.as_bytes())
    }

    fn write_seo_files(&self, slugs: &[String]) -> Result<(), SiteGenError> {
        let site = &self.config.site_url;
        let out = &self.config.out_dir;

        write_file(
            &out.join("sitemap.txt"),
            seo::sitemap_txt(site, slugs).as_bytes(),
        )?;
        write_file(
            &out.join("sitemap.xml"),
            seo::sitemap_xml(site, slugs, Local::now().date_naive()).as_bytes(),
        )?;
        write_file(&out.join("robots.txt"), seo::robots_txt(site).as_bytes())
    }

    /// Generate the whole site. Failures on single games are logged and
    /// counted; anything else aborts.
    pub async fn generate(&self) -> Result<GenerateReport, SiteGenError> {
        let slugs = self.client.all_slugs().await?;
        info!("Generating pages for {} games", slugs.len());

        let slug_list: String = slugs.iter().map(|s| format!("{}\n", s)).collect();
        write_file(&self.config.out_dir.join("game_slugs.txt"), slug_list.as_bytes())?;

        if let Some(pb) = &self.progress {
            pb.set_length(slugs.len() as u64);
        }

        let mut report = GenerateReport::default();
        let mut games = Vec::with_capacity(slugs.len());

        for slug in &slugs {
            if let Some(pb) = &self.progress {
                pb.set_message(slug.clone());
            }

            match self.generate_page(slug).await {
                Ok(entry) => {
                    report.generated += 1;
                    games.push(entry);
                }
                Err(e) => {
                    warn!("Failed to generate page for {}: {}", slug, e);
                    report.failed += 1;
                }
            }

            if let Some(pb) = &self.progress {
                pb.inc(1);
            }
        }

        self.write_catalog(&games)?;

        if self.config.seo {
            let generated: Vec<String> = games.iter().map(|(g, _)| g.slug.clone()).collect();
            self.write_seo_files(&generated)?;
        }

        info!(
            "Generated {} pages ({} failed) in {}",
            report.generated,
            report.failed,
            self.config.out_dir.display()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{CategoryInput, DieselDbContext, NewGame};
    use crate::scrapers::HttpClient;
    use crate::server::{spawn_api, AppState};
    use std::time::Duration;
    use tempfile::tempdir;

    async fn seeded_context(dir: &Path) -> DieselDbContext {
        let ctx = DieselDbContext::new(&dir.join("site.db"));
        ctx.init_schema().await.unwrap();
        let category = ctx
            .categories()
            .create(&CategoryInput {
                name: "Racing".to_string(),
                slug: "racing".to_string(),
                description: None,
            })
            .await
            .unwrap();

        for (slug, plays) in [("space-race", 30), ("drift-hunters", 20), ("moto-x", 10)] {
            ctx.games()
                .create(&NewGame {
                    title: slug.replace('-', " "),
                    slug: slug.to_string(),
                    description: format!("Race in {}", slug),
                    game_url: format!("https://embed.io/{}", slug),
                    category_id: category.id,
                    total_plays: plays,
                    rating: 4.0,
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        ctx
    }

    fn config(out_dir: PathBuf, api_base_url: String, seo: bool) -> SiteConfig {
        SiteConfig {
            site_url: "https://btwgame.com".to_string(),
            site_name: "BTW Games".to_string(),
            api_base_url,
            out_dir,
            seo,
        }
    }

    fn client(base_url: &str) -> ApiClient {
        let http = HttpClient::new(Duration::from_secs(5), None).unwrap();
        ApiClient::new(http, base_url)
    }

    #[tokio::test]
    async fn test_generate_full_site() {
        let dir = tempdir().unwrap();
        let ctx = seeded_context(dir.path()).await;
        let server = spawn_api(AppState::from_context(&ctx, "key")).await.unwrap();

        let out = dir.path().join("site");
        let generator = SiteGenerator::new(
            client(&server.base_url()),
            config(out.clone(), server.base_url(), true),
        );
        let report = generator.generate().await.unwrap();
        server.shutdown();

        assert_eq!(
            report,
            GenerateReport {
                generated: 3,
                failed: 0
            }
        );

        let slugs = std::fs::read_to_string(out.join("game_slugs.txt")).unwrap();
        assert_eq!(slugs, "space-race\ndrift-hunters\nmoto-x\n");

        let page = std::fs::read_to_string(out.join("games/space-race.html")).unwrap();
        assert!(page.contains("Play space race Online Free - BTW Games"));
        assert!(page.contains("drift-hunters.html"));
        assert!(!page.contains(r#"href="space-race.html""#));

        let catalog: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("all_games.json")).unwrap())
                .unwrap();
        assert_eq!(catalog["metadata"]["total_games"], 3);
        assert_eq!(catalog["metadata"]["website"], "BTW Games");
        assert_eq!(catalog["games"][0]["slug"], "space-race");
        assert_eq!(catalog["games"][0]["standardized_tags"][0], "HTML5");

        let sitemap = std::fs::read_to_string(out.join("sitemap.txt")).unwrap();
        assert_eq!(sitemap.lines().count(), 5);
        assert!(out.join("sitemap.xml").exists());
        assert!(out.join("robots.txt").exists());
    }

    #[tokio::test]
    async fn test_skip_seo_leaves_no_sitemaps() {
        let dir = tempdir().unwrap();
        let ctx = seeded_context(dir.path()).await;
        let server = spawn_api(AppState::from_context(&ctx, "key")).await.unwrap();

        let out = dir.path().join("site");
        let generator = SiteGenerator::new(
            client(&server.base_url()),
            config(out.clone(), server.base_url(), false),
        );
        generator.generate().await.unwrap();
        server.shutdown();

        assert!(out.join("all_games.json").exists());
        assert!(!out.join("sitemap.xml").exists());
        assert!(!out.join("robots.txt").exists());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_an_error() {
        let dir = tempdir().unwrap();
        let generator = SiteGenerator::new(
            client("http://127.0.0.1:9"),
            config(dir.path().to_path_buf(), String::new(), true),
        );
        assert!(matches!(
            generator.generate().await,
            Err(SiteGenError::Http(_))
        ));
    }
}
