//! The sequential scrape loop.
//!
//! landing page → links → (skip known) → analyze each page → merge.
//! One request is in flight at a time and a fixed pause separates page
//! analyses.

use std::time::Duration;

use indicatif::ProgressBar;
use tracing::{info, warn};
use url::Url;

use super::http_client::Fetch;
use super::landing::LandingPageParser;
use super::page::PageAnalyzer;
use super::store::ScrapeContext;

/// Tunables for a scrape run.
#[derive(Debug, Clone, Copy)]
pub struct ScrapeOptions {
    /// Upper bound on game pages analyzed this run.
    pub max_games: usize,
    /// Pause between page analyses.
    pub delay: Duration,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            max_games: 100,
            delay: Duration::from_millis(300),
        }
    }
}

/// Counts from one scrape run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    /// Game links found on the landing page.
    pub discovered: usize,
    /// Links dropped because their URL was already stored.
    pub skipped_known: usize,
    /// Pages fetched and parsed.
    pub analyzed: usize,
    /// Pages that could not be fetched.
    pub failed: usize,
    /// Records newly merged into the context.
    pub added: usize,
    /// Size of the result set after the run.
    pub total: usize,
}

/// Drives the landing parser and page analyzer over one fetcher.
pub struct ScrapePipeline<'a> {
    fetcher: &'a dyn Fetch,
    parser: &'a dyn LandingPageParser,
    base: Url,
    options: ScrapeOptions,
    progress: Option<ProgressBar>,
}

impl<'a> ScrapePipeline<'a> {
    pub fn new(
        fetcher: &'a dyn Fetch,
        parser: &'a dyn LandingPageParser,
        base: Url,
        options: ScrapeOptions,
    ) -> Self {
        Self {
            fetcher,
            parser,
            base,
            options,
            progress: None,
        }
    }

    /// Report per-page progress on a bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run one scrape, merging new records into `ctx`. Saving is left to
    /// the caller.
    pub async fn run(&self, ctx: &mut ScrapeContext) -> ScrapeReport {
        let mut report = ScrapeReport::default();

        let Some(landing) = self.fetcher.fetch(self.base.as_str()).await else {
            warn!("Landing page {} unavailable; nothing to analyze", self.base);
            report.total = ctx.len();
            return report;
        };

        let links = self.parser.extract(&landing, &self.base);
        report.discovered = links.len();

        let fresh: Vec<_> = links
            .into_iter()
            .filter(|link| {
                let known = ctx.is_known(&link.url);
                if known {
                    report.skipped_known += 1;
                }
                !known
            })
            .take(self.options.max_games)
            .collect();

        info!(
            "{} links discovered, {} already stored, analyzing {}",
            report.discovered,
            report.skipped_known,
            fresh.len()
        );

        if let Some(pb) = &self.progress {
            pb.set_length(fresh.len() as u64);
        }

        let analyzer = PageAnalyzer::new(self.fetcher, self.base.clone());
        for (i, link) in fresh.iter().enumerate() {
            if i > 0 && !self.options.delay.is_zero() {
                tokio::time::sleep(self.options.delay).await;
            }
            if let Some(pb) = &self.progress {
                pb.set_message(link.title.clone());
            }

            match analyzer
                .analyze(ctx, &link.url, &link.title, link.thumbnail.as_deref())
                .await
            {
                Some(record) => {
                    report.analyzed += 1;
                    if ctx.merge(record) {
                        report.added += 1;
                    }
                }
                None => report.failed += 1,
            }

            if let Some(pb) = &self.progress {
                pb.inc(1);
            }
        }

        report.total = ctx.len();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::landing::RecentlyPlayedParser;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: &str = "https://www.onlinegames.io/";

    struct MapFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl MapFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetch for MapFetcher {
        async fn fetch(&self, url: &str) -> Option<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned()
        }
    }

    const LANDING: &str = r#"
        <div class="section recently">
          <a href="/space-race/">Space Race</a>
          <a href="/drift-hunters/">Drift Hunters</a>
          <a href="/broken-game/">Broken Game</a>
          <a href="/about/">About Us</a>
        </div>"#;

    fn game_page(embed: &str) -> String {
        format!(
            r#"<p>A description that is comfortably longer than twenty characters.</p>
               <iframe src="{}"></iframe>"#,
            embed
        )
    }

    fn options(max_games: usize) -> ScrapeOptions {
        ScrapeOptions {
            max_games,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_run_analyzes_and_counts() {
        let space = game_page("https://embed.io/space");
        let drift = game_page("https://embed.io/drift");
        let fetcher = MapFetcher::new(&[
            (BASE, LANDING),
            ("https://www.onlinegames.io/space-race/", &space),
            ("https://www.onlinegames.io/drift-hunters/", &drift),
        ]);
        let base = Url::parse(BASE).unwrap();
        let pipeline = ScrapePipeline::new(&fetcher, &RecentlyPlayedParser, base, options(10));
        let mut ctx = ScrapeContext::new(BASE);

        let report = pipeline.run(&mut ctx).await;

        assert_eq!(
            report,
            ScrapeReport {
                discovered: 3,
                skipped_known: 0,
                analyzed: 2,
                failed: 1,
                added: 2,
                total: 2,
            }
        );
        assert_eq!(ctx.iframe_sources().len(), 2);
    }

    #[tokio::test]
    async fn test_run_skips_known_urls() {
        let space = game_page("https://embed.io/space");
        let drift = game_page("https://embed.io/drift");
        let fetcher = MapFetcher::new(&[
            (BASE, LANDING),
            ("https://www.onlinegames.io/space-race/", &space),
            ("https://www.onlinegames.io/drift-hunters/", &drift),
        ]);
        let base = Url::parse(BASE).unwrap();
        let pipeline = ScrapePipeline::new(&fetcher, &RecentlyPlayedParser, base, options(10));

        let mut ctx = ScrapeContext::new(BASE);
        pipeline.run(&mut ctx).await;
        let second = pipeline.run(&mut ctx).await;

        assert_eq!(second.skipped_known, 2);
        assert_eq!(second.added, 0);
        assert_eq!(ctx.len(), 2);
        let space_fetches = fetcher
            .requested()
            .iter()
            .filter(|u| u.ends_with("/space-race/"))
            .count();
        assert_eq!(space_fetches, 1);
    }

    #[tokio::test]
    async fn test_run_respects_max_games() {
        let space = game_page("https://embed.io/space");
        let fetcher = MapFetcher::new(&[
            (BASE, LANDING),
            ("https://www.onlinegames.io/space-race/", &space),
        ]);
        let base = Url::parse(BASE).unwrap();
        let pipeline = ScrapePipeline::new(&fetcher, &RecentlyPlayedParser, base, options(1));
        let mut ctx = ScrapeContext::new(BASE);

        let report = pipeline.run(&mut ctx).await;

        assert_eq!(report.analyzed, 1);
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_run_without_landing_page() {
        let fetcher = MapFetcher::new(&[]);
        let base = Url::parse(BASE).unwrap();
        let pipeline = ScrapePipeline::new(&fetcher, &RecentlyPlayedParser, base, options(10));
        let mut ctx = ScrapeContext::new(BASE);

        let report = pipeline.run(&mut ctx).await;
        assert_eq!(report, ScrapeReport::default());
    }
}
