//! Catalog management endpoints under `/admin`.
//!
//! Every route here sits behind the API key middleware.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Local, Utc};
use serde_json::{json, Value};

use super::super::AppState;
use super::types::{
    paging, AdminGameListParams, ApiError, ApiResult, BulkUpdateBody, CategoryJson,
    CategoryPayload, GameListResponse, GamePayload, Pagination, ADMIN_MAX_PER_PAGE,
};
use crate::repository::util::is_unique_violation;
use crate::repository::{CategoryInput, CategoryUpdate, DieselError, GameQuery, GameSort, NewGame};

/// Window of the dashboard's weekly figures.
const DASHBOARD_DAYS: i64 = 7;
const DASHBOARD_TOP_GAMES: i64 = 10;

fn slug_conflict(e: DieselError) -> ApiError {
    if is_unique_violation(&e) {
        ApiError::BadRequest("Slug already exists".to_string())
    } else {
        ApiError::Database(e)
    }
}

async fn ensure_category(state: &AppState, id: i32) -> ApiResult<()> {
    match state.categories.get(id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::BadRequest("Category not found".to_string())),
    }
}

/// `GET /admin/games`
pub async fn list_games(
    State(state): State<AppState>,
    Query(params): Query<AdminGameListParams>,
) -> ApiResult<Json<GameListResponse>> {
    let (page, per_page) = paging(params.page, params.per_page, ADMIN_MAX_PER_PAGE);
    let query = GameQuery {
        page,
        per_page,
        include_inactive: params.include_inactive,
        sort: GameSort::Created,
        ..Default::default()
    };

    let (games, total) = state.games.list(&query).await?;
    Ok(Json(GameListResponse {
        games,
        pagination: Pagination::new(page, per_page, total),
    }))
}

/// `POST /admin/games`
pub async fn create_game(
    State(state): State<AppState>,
    Json(payload): Json<GamePayload>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if let Some(field) = payload.missing_required() {
        return Err(ApiError::BadRequest(format!(
            "Missing required field: {}",
            field
        )));
    }

    let slug = payload.slug.clone().unwrap_or_default();
    if state.games.slug_exists(&slug).await? {
        return Err(ApiError::BadRequest("Slug already exists".to_string()));
    }
    let category_id = payload.category_id.unwrap_or_default();
    ensure_category(&state, category_id).await?;

    let new_game = NewGame {
        title: payload.title.unwrap_or_default(),
        slug,
        description: payload.description.unwrap_or_default(),
        long_description: payload.long_description,
        thumbnail_url: payload.thumbnail_url,
        game_url: payload.game_url.unwrap_or_default(),
        iframe_url: payload.iframe_url,
        category_id,
        rating: payload.rating.unwrap_or(0.0),
        total_plays: 0,
        is_featured: payload.is_featured.unwrap_or(false),
        is_new: payload.is_new.unwrap_or(true),
        is_active: payload.is_active.unwrap_or(true),
        tags: payload.tags.unwrap_or_default(),
        features: payload.features.unwrap_or_default(),
        controls: payload.controls.unwrap_or_default(),
        release_date: Some(payload.release_date.unwrap_or_else(Utc::now)),
    };

    let game = state.games.create(&new_game).await.map_err(slug_conflict)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Game created successfully", "game": game })),
    ))
}

/// `PUT /admin/games/:id`
pub async fn update_game(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<GamePayload>,
) -> ApiResult<Json<Value>> {
    if state.games.get(id).await?.is_none() {
        return Err(ApiError::NotFound("Game not found"));
    }
    if let Some(category_id) = payload.category_id {
        ensure_category(&state, category_id).await?;
    }

    let game = state
        .games
        .update(id, &payload.into_update())
        .await
        .map_err(slug_conflict)?
        .ok_or(ApiError::NotFound("Game not found"))?;

    Ok(Json(json!({ "message": "Game updated successfully", "game": game })))
}

/// `DELETE /admin/games/:id`
///
/// Soft delete: the row stays, hidden from the public API.
pub async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Value>> {
    if !state.games.soft_delete(id).await? {
        return Err(ApiError::NotFound("Game not found"));
    }
    Ok(Json(json!({ "message": "Game deleted successfully" })))
}

/// `POST /admin/games/bulk-update`
pub async fn bulk_update(
    State(state): State<AppState>,
    Json(body): Json<BulkUpdateBody>,
) -> ApiResult<Json<Value>> {
    if body.game_ids.is_empty() {
        return Err(ApiError::BadRequest("No game IDs provided".to_string()));
    }

    let updated = state
        .games
        .bulk_update(&body.game_ids, &body.updates.into_update())
        .await
        .map_err(slug_conflict)?;

    Ok(Json(json!({
        "message": format!("Successfully updated {} games", updated),
        "updated_count": updated,
    })))
}

/// `GET /admin/categories`
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

/// `POST /admin/categories`
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let (Some(name), Some(slug)) = (payload.name, payload.slug) else {
        return Err(ApiError::BadRequest(
            "Name and slug are required".to_string(),
        ));
    };
    if state.categories.get_by_slug(&slug).await?.is_some() {
        return Err(ApiError::BadRequest("Slug already exists".to_string()));
    }

    let category = state
        .categories
        .create(&CategoryInput {
            name,
            slug,
            description: payload.description,
        })
        .await
        .map_err(slug_conflict)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Category created successfully",
            "category": CategoryJson::new(category, 0),
        })),
    ))
}

/// `PUT /admin/categories/:id`
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CategoryPayload>,
) -> ApiResult<Json<Value>> {
    let changes = CategoryUpdate {
        name: payload.name,
        slug: payload.slug,
        description: payload.description.map(Some),
    };
    let category = state
        .categories
        .update(id, &changes)
        .await
        .map_err(slug_conflict)?
        .ok_or(ApiError::NotFound("Category not found"))?;
    let game_count = state.categories.game_count(id).await?;

    Ok(Json(json!({
        "message": "Category updated successfully",
        "category": CategoryJson::new(category, game_count),
    })))
}

/// `DELETE /admin/categories/:id`
///
/// Refused while any game, active or not, still references the category.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Value>> {
    if state.categories.get(id).await?.is_none() {
        return Err(ApiError::NotFound("Category not found"));
    }

    let games = state.categories.game_count(id).await?;
    if games > 0 {
        return Err(ApiError::BadRequest(format!(
            "Cannot delete category with {} games",
            games
        )));
    }

    state.categories.delete(id).await?;
    Ok(Json(json!({ "message": "Category deleted successfully" })))
}

/// `GET /admin/stats/dashboard`
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let today = Local::now().date_naive();
    let week_ago = today - Duration::days(DASHBOARD_DAYS);

    let week_stats = state.stats.plays_since(week_ago).await?;
    let top_games = state
        .stats
        .top_games_since(week_ago, DASHBOARD_TOP_GAMES)
        .await?;

    Ok(Json(json!({
        "basic_stats": {
            "total_games": state.games.count_active().await?,
            "total_categories": state.categories.count().await?,
            "total_plays": state.games.total_plays().await?,
            "today_plays": state.stats.plays_on(today).await?,
        },
        "week_stats": week_stats,
        "top_games": top_games,
    })))
}
