//! Router configuration for the catalog API.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;

use super::auth::require_api_key;
use super::handlers::{admin, api};
use super::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/games", get(api::list_games))
        .route("/games/:id", get(api::get_game))
        .route("/games/slug/:slug", get(api::get_game_by_slug))
        .route("/games/:id/play", post(api::record_play))
        .route("/categories", get(api::list_categories))
        .route("/categories/:id/games", get(api::category_games))
        .route("/stats/games", get(api::games_stats))
        .route("/stats/games/:id", get(api::game_stats))
        .route("/search", get(api::search))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/games", get(admin::list_games).post(admin::create_game))
        .route(
            "/games/:id",
            put(admin::update_game).delete(admin::delete_game),
        )
        .route("/games/bulk-update", post(admin::bulk_update))
        .route(
            "/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route(
            "/categories/:id",
            put(admin::update_category).delete(admin::delete_category),
        )
        .route("/stats/dashboard", get(admin::dashboard))
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_api_key,
        ))
}

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .nest("/admin", admin_routes(&state))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
