//! Public catalog endpoints under `/api`.
//!
//! Only active games are visible here.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Local;
use serde_json::{json, Value};

use super::super::AppState;
use super::types::{
    paging, ApiError, ApiResult, CategoryJson, DailyStatJson, GameListParams, GameListResponse,
    GameResponse, PageParams, Pagination, PlayBody, SearchParams, MAX_PER_PAGE,
};
use crate::models::Game;
use crate::repository::{GameQuery, GameSort};

/// Days of per-game statistics returned.
const DAILY_STATS_DAYS: i64 = 30;
/// Games in the "popular" block of the stats endpoint.
const POPULAR_GAMES: i64 = 5;

fn category_filter(category: Option<String>) -> Option<String> {
    category.filter(|c| !c.is_empty() && c != "all")
}

async fn active_game(state: &AppState, id: i32) -> ApiResult<Game> {
    state
        .games
        .get(id)
        .await?
        .filter(|g| g.is_active)
        .ok_or(ApiError::NotFound("Game not found"))
}

/// `GET /api/games`
pub async fn list_games(
    State(state): State<AppState>,
    Query(params): Query<GameListParams>,
) -> ApiResult<Json<GameListResponse>> {
    let (page, per_page) = paging(params.page, params.per_page, MAX_PER_PAGE);
    let query = GameQuery {
        page,
        per_page,
        category_slug: category_filter(params.category),
        search: params.search.filter(|s| !s.is_empty()),
        featured: params.featured,
        is_new: params.new,
        sort: GameSort::parse(params.sort.as_deref().unwrap_or("popular")),
        ..Default::default()
    };

    let (games, total) = state.games.list(&query).await?;
    Ok(Json(GameListResponse {
        games,
        pagination: Pagination::new(page, per_page, total),
    }))
}

/// `GET /api/games/:id`
pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<GameResponse>> {
    let game = active_game(&state, id).await?;
    Ok(Json(GameResponse { game }))
}

/// `GET /api/games/slug/:slug`
pub async fn get_game_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<GameResponse>> {
    let game = state
        .games
        .get_by_slug(&slug)
        .await?
        .filter(|g| g.is_active)
        .ok_or(ApiError::NotFound("Game not found"))?;
    Ok(Json(GameResponse { game }))
}

/// `POST /api/games/:id/play`
pub async fn record_play(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    body: Option<Json<PlayBody>>,
) -> ApiResult<Json<Value>> {
    let duration = body.map(|Json(b)| b.duration).unwrap_or(0);
    let ip = headers
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim);
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|h| h.to_str().ok());

    let recorded = state
        .stats
        .record_play(id, ip, user_agent, duration, Local::now().date_naive())
        .await?;
    if !recorded {
        return Err(ApiError::NotFound("Game not found"));
    }

    Ok(Json(json!({ "message": "Game play recorded successfully" })))
}

/// `GET /api/categories`
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let categories: Vec<CategoryJson> = state
        .categories
        .list_with_counts()
        .await?
        .into_iter()
        .map(|(category, count)| CategoryJson::new(category, count))
        .collect();
    Ok(Json(json!({ "categories": categories })))
}

/// `GET /api/categories/:id/games`
pub async fn category_games(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Value>> {
    let category = state
        .categories
        .get(id)
        .await?
        .ok_or(ApiError::NotFound("Category not found"))?;
    let game_count = state.categories.game_count(id).await?;

    let (page, per_page) = paging(params.page, params.per_page, MAX_PER_PAGE);
    let query = GameQuery {
        page,
        per_page,
        category_id: Some(id),
        ..Default::default()
    };
    let (games, total) = state.games.list(&query).await?;

    Ok(Json(json!({
        "category": CategoryJson::new(category, game_count),
        "games": games,
        "pagination": Pagination::new(page, per_page, total),
    })))
}

/// `GET /api/stats/games`
pub async fn games_stats(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let popular = state.games.popular(POPULAR_GAMES).await?;

    Ok(Json(json!({
        "stats": {
            "total_games": state.games.count_active().await?,
            "total_plays": state.games.total_plays().await?,
            "featured_games": state.games.count_featured().await?,
            "new_games": state.games.count_new().await?,
        },
        "popular_games": popular,
    })))
}

/// `GET /api/stats/games/:id`
pub async fn game_stats(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Value>> {
    let game = active_game(&state, id).await?;
    let daily: Vec<DailyStatJson> = state
        .stats
        .daily_stats(id, DAILY_STATS_DAYS)
        .await?
        .into_iter()
        .map(DailyStatJson::from)
        .collect();

    Ok(Json(json!({ "game": game, "daily_stats": daily })))
}

/// `GET /api/search`
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Value>> {
    let q = params.q.unwrap_or_default();
    if q.is_empty() {
        return Err(ApiError::BadRequest("Search query is required".to_string()));
    }

    let (page, per_page) = paging(params.page, params.per_page, MAX_PER_PAGE);
    let query = GameQuery {
        page,
        per_page,
        category_slug: category_filter(params.category),
        search: Some(q.clone()),
        search_long_description: true,
        sort: GameSort::parse(params.sort.as_deref().unwrap_or("popular")),
        ..Default::default()
    };
    let (games, total) = state.games.list(&query).await?;

    Ok(Json(json!({
        "query": q,
        "games": games,
        "pagination": Pagination::new(page, per_page, total),
    })))
}
