//! Scrape state: deduplication and persistence of `games_data.json`.
//!
//! A [`ScrapeContext`] is loaded once per run, merged into as pages are
//! analyzed, and saved wholesale at the end. The document on disk is never
//! appended to.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use chrono::Local;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{ExtractionResult, GameRecord};
use crate::utils::write_atomic;

/// Format of `extraction_timestamp`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors reading or writing the scrape document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed scrape document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Accumulated scrape results plus the sets used to deduplicate them.
#[derive(Debug, Clone)]
pub struct ScrapeContext {
    website: String,
    games: Vec<GameRecord>,
    known_urls: HashSet<String>,
    iframe_sources: BTreeSet<String>,
}

impl ScrapeContext {
    /// Empty context for a first run.
    pub fn new(website: &str) -> Self {
        Self {
            website: website.to_string(),
            games: Vec::new(),
            known_urls: HashSet::new(),
            iframe_sources: BTreeSet::new(),
        }
    }

    /// Load prior results from `path`.
    ///
    /// A missing file yields an empty context; a malformed one is an error.
    pub fn load(path: &Path, website: &str) -> Result<Self, StoreError> {
        let mut ctx = Self::new(website);

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No prior scrape document at {}", path.display());
                return Ok(ctx);
            }
            Err(e) => return Err(e.into()),
        };

        let prior: ExtractionResult = serde_json::from_str(&contents)?;
        for record in prior.games {
            ctx.record_iframes(&record);
            ctx.merge(record);
        }

        info!(
            "Loaded {} existing games from {}",
            ctx.games.len(),
            path.display()
        );
        Ok(ctx)
    }

    /// Whether a game page URL is already in the result set.
    pub fn is_known(&self, url: &str) -> bool {
        self.known_urls.contains(url)
    }

    /// Add a record unless its URL is already present. First seen wins.
    pub fn merge(&mut self, record: GameRecord) -> bool {
        if !self.known_urls.insert(record.url.clone()) {
            debug!("Skipping duplicate game {}", record.url);
            return false;
        }
        self.games.push(record);
        true
    }

    /// Add a record's embed addresses to the run-wide set; returns how many
    /// were new.
    pub fn record_iframes(&mut self, record: &GameRecord) -> usize {
        record
            .iframes
            .iter()
            .filter(|f| self.iframe_sources.insert(f.src.clone()))
            .count()
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Every distinct embed address seen, across prior and current runs.
    pub fn iframe_sources(&self) -> &BTreeSet<String> {
        &self.iframe_sources
    }

    /// Snapshot the accumulated results, stamped with the current time.
    pub fn to_document(&self) -> ExtractionResult {
        ExtractionResult {
            website: self.website.clone(),
            extraction_timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            total_games: self.games.len(),
            games: self.games.clone(),
        }
    }

    /// Write the full result set to `path`, replacing any previous file.
    pub fn save(&self, path: &Path) -> Result<ExtractionResult, StoreError> {
        let document = self.to_document();
        let mut json = serde_json::to_string_pretty(&document)?;
        json.push('\n');
        write_atomic(path, json.as_bytes())?;

        info!("Saved {} games to {}", document.total_games, path.display());
        Ok(document)
    }
}
