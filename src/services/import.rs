//! Scrape document import service.
//!
//! Loads `games_data.json` into the relational catalog. Each record is
//! written in its own transaction so one bad record never takes the rest
//! of the import down with it.

use std::path::Path;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::models::{ExtractionResult, GameRecord, DEFAULT_CATEGORY};
use crate::repository::{
    CategoryInput, DieselDbContext, DieselError, DieselGameRepository, ImportOutcome, NewGame,
};
use crate::utils::{clean_url, create_slug, truncate_chars};

use super::generated::{
    generate_controls, generate_features, generate_tags, parse_play_count, parse_rating,
};

/// Longest stored title.
const MAX_TITLE_CHARS: usize = 100;
/// Longest stored short description; the full text goes to
/// `long_description`.
const MAX_SHORT_DESCRIPTION_CHARS: usize = 1000;

/// Errors that abort a whole import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed scrape document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Why a record was not imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingTitleOrDescription,
    NoIframe,
    InvalidIframeUrl,
    EmptySlug,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::MissingTitleOrDescription => "missing title or description",
            Self::NoIframe => "no iframe source found",
            Self::InvalidIframeUrl => "invalid iframe URL",
            Self::EmptySlug => "could not create a valid slug",
        };
        f.write_str(reason)
    }
}

/// Events emitted while importing.
#[derive(Debug, Clone)]
pub enum ImportEvent {
    /// A new game row was created.
    Imported { title: String },
    /// A game with the same slug existed and had its gaps filled.
    Updated { title: String },
    /// The record was rejected before touching the database.
    Skipped { title: String, reason: SkipReason },
    /// The record's transaction failed and was rolled back.
    Failed { title: String, error: String },
}

/// Counts from one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub total: usize,
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// A scraped record that passed validation, ready to write.
#[derive(Debug, Clone)]
pub struct PreparedGame {
    pub game: NewGame,
    pub category: CategoryInput,
}

/// Category for a scraped category name, falling back to `General`.
fn category_for(name: &str) -> CategoryInput {
    let trimmed = name.trim();
    let (name, slug) = match create_slug(trimmed) {
        Some(slug) if !trimmed.is_empty() => (trimmed.to_string(), slug),
        _ => (DEFAULT_CATEGORY.to_string(), DEFAULT_CATEGORY.to_lowercase()),
    };
    CategoryInput {
        description: Some(format!("Games in the {} category", name)),
        name,
        slug,
    }
}

/// Validate a scraped record and build the row to insert.
pub fn prepare(record: &GameRecord) -> Result<PreparedGame, SkipReason> {
    let title = record.title.trim();
    let description = record.description.trim();
    if title.is_empty() || description.is_empty() {
        return Err(SkipReason::MissingTitleOrDescription);
    }

    let src = record
        .iframes
        .first()
        .map(|f| f.src.as_str())
        .filter(|s| !s.is_empty())
        .ok_or(SkipReason::NoIframe)?;
    let iframe_url = clean_url(src).ok_or(SkipReason::InvalidIframeUrl)?;
    let slug = create_slug(title).ok_or(SkipReason::EmptySlug)?;

    let game = NewGame {
        title: truncate_chars(title, MAX_TITLE_CHARS),
        slug,
        description: truncate_chars(description, MAX_SHORT_DESCRIPTION_CHARS),
        long_description: Some(description.to_string()),
        thumbnail_url: record.thumbnail.as_deref().and_then(clean_url),
        game_url: iframe_url.clone(),
        iframe_url: Some(iframe_url),
        category_id: 0,
        rating: parse_rating(&record.rating),
        total_plays: parse_play_count(&record.play_count),
        is_featured: false,
        is_new: true,
        is_active: true,
        tags: generate_tags(record),
        features: generate_features(record),
        controls: generate_controls(record),
        release_date: Some(Utc::now()),
    };

    Ok(PreparedGame {
        game,
        category: category_for(&record.category),
    })
}

/// Read a scrape document from disk.
pub fn load_document(path: &Path) -> Result<ExtractionResult, ImportError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Imports scraped games into the catalog.
pub struct ImportService {
    games: DieselGameRepository,
}

impl ImportService {
    pub fn new(ctx: &DieselDbContext) -> Self {
        Self { games: ctx.games() }
    }

    async fn import_one(&self, prepared: &PreparedGame) -> Result<ImportOutcome, DieselError> {
        self.games
            .import_game(&prepared.game, &prepared.category)
            .await
    }

    /// Import every record, emitting one event per record.
    pub async fn import(
        &self,
        records: &[GameRecord],
        event_tx: mpsc::Sender<ImportEvent>,
    ) -> ImportReport {
        let mut report = ImportReport {
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            let title = record.title.trim().to_string();

            let prepared = match prepare(record) {
                Ok(prepared) => prepared,
                Err(reason) => {
                    debug!("Skipping '{}': {}", title, reason);
                    report.skipped += 1;
                    let _ = event_tx.send(ImportEvent::Skipped { title, reason }).await;
                    continue;
                }
            };

            let event = match self.import_one(&prepared).await {
                Ok(ImportOutcome::Inserted(_)) => {
                    report.imported += 1;
                    ImportEvent::Imported { title }
                }
                Ok(ImportOutcome::Updated(_)) => {
                    report.updated += 1;
                    ImportEvent::Updated { title }
                }
                Err(e) => {
                    warn!("Failed to import '{}': {}", title, e);
                    report.errors += 1;
                    ImportEvent::Failed {
                        title,
                        error: e.to_string(),
                    }
                }
            };
            let _ = event_tx.send(event).await;
        }

        report
    }
}
