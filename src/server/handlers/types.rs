//! Request and response types shared by the API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Category, Controls, Game, GameStats};
use crate::repository::{DieselError, GameUpdate};

/// Largest page size the public listing accepts.
pub const MAX_PER_PAGE: i64 = 100;
/// Largest page size the admin listing accepts.
pub const ADMIN_MAX_PER_PAGE: i64 = 1000;
pub const DEFAULT_PER_PAGE: i64 = 20;
/// Highest page number accepted; larger values are clamped.
pub const MAX_PAGE: i64 = 1_000_000;

/// Handler failures, rendered as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Database(#[from] DieselError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Paging block returned with every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let pages = if per_page > 0 {
            total.saturating_add(per_page - 1) / per_page
        } else {
            0
        };
        Self {
            page,
            per_page,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }
}

/// `page`/`per_page` query values, clamped to `1..=MAX_PAGE` and `1..=cap`.
pub fn paging(page: Option<i64>, per_page: Option<i64>, cap: i64) -> (i64, i64) {
    let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, cap);
    (page, per_page)
}

/// Category with its number of games.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryJson {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub game_count: i64,
}

impl CategoryJson {
    pub fn new(category: Category, game_count: i64) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            created_at: category.created_at,
            game_count,
        }
    }
}

/// One page of games.
#[derive(Debug, Serialize, Deserialize)]
pub struct GameListResponse {
    pub games: Vec<Game>,
    pub pagination: Pagination,
}

/// A single game.
#[derive(Debug, Serialize, Deserialize)]
pub struct GameResponse {
    pub game: Game,
}

/// One day of a game's play statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct DailyStatJson {
    pub date: NaiveDate,
    pub plays: i32,
    pub unique_players: i32,
    pub avg_duration: f64,
}

impl From<GameStats> for DailyStatJson {
    fn from(stats: GameStats) -> Self {
        Self {
            date: stats.date,
            plays: stats.daily_plays,
            unique_players: stats.unique_players,
            avg_duration: stats.avg_play_duration,
        }
    }
}

/// Query for the public game listing.
#[derive(Debug, Default, Deserialize)]
pub struct GameListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub new: Option<bool>,
    pub sort: Option<String>,
}

/// Query for `/api/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Plain paging query.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Query for the admin game listing.
#[derive(Debug, Default, Deserialize)]
pub struct AdminGameListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// Body of `POST /api/games/:id/play`.
#[derive(Debug, Default, Deserialize)]
pub struct PlayBody {
    #[serde(default)]
    pub duration: i32,
}

/// Editable game fields. Every field is optional so the same body serves
/// creation (after a required-field check) and partial updates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GamePayload {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub game_url: Option<String>,
    pub iframe_url: Option<String>,
    pub category_id: Option<i32>,
    pub rating: Option<f64>,
    pub is_featured: Option<bool>,
    pub is_new: Option<bool>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub controls: Option<Controls>,
    pub release_date: Option<DateTime<Utc>>,
}

impl GamePayload {
    /// First required creation field that is missing.
    pub fn missing_required(&self) -> Option<&'static str> {
        [
            ("title", self.title.is_none()),
            ("slug", self.slug.is_none()),
            ("description", self.description.is_none()),
            ("game_url", self.game_url.is_none()),
            ("category_id", self.category_id.is_none()),
        ]
        .into_iter()
        .find_map(|(name, missing)| missing.then_some(name))
    }

    pub fn into_update(self) -> GameUpdate {
        GameUpdate {
            title: self.title,
            slug: self.slug,
            description: self.description,
            long_description: self.long_description,
            thumbnail_url: self.thumbnail_url,
            game_url: self.game_url,
            iframe_url: self.iframe_url,
            category_id: self.category_id,
            rating: self.rating,
            is_featured: self.is_featured,
            is_new: self.is_new,
            is_active: self.is_active,
            tags: self.tags,
            features: self.features,
            controls: self.controls,
            release_date: self.release_date,
        }
    }
}

/// Body of `POST /admin/games/bulk-update`.
#[derive(Debug, Deserialize)]
pub struct BulkUpdateBody {
    #[serde(default)]
    pub game_ids: Vec<i32>,
    #[serde(default)]
    pub updates: GamePayload,
}

/// Category fields for create/update.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryPayload {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}
