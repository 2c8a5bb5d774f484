//! HTTP server for the game catalog.
//!
//! Serves the public catalog API under `/api`, the key-protected
//! management API under `/admin`, and, separately, a static file server
//! for previewing the generated site.

mod auth;
mod handlers;
mod routes;

pub use auth::{AuthState, API_KEY_HEADER};
pub use handlers::{ApiError, CategoryJson, GameListResponse, GameResponse, Pagination};
pub use routes::create_router;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;

use crate::config::Settings;
use crate::repository::{
    DieselCategoryRepository, DieselDbContext, DieselGameRepository, DieselStatsRepository,
};

/// Shared state for the API server.
#[derive(Clone)]
pub struct AppState {
    pub games: Arc<DieselGameRepository>,
    pub categories: Arc<DieselCategoryRepository>,
    pub stats: Arc<DieselStatsRepository>,
    pub auth: AuthState,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let ctx = settings.create_db_context();
        ctx.init_schema().await?;
        Ok(Self::from_context(&ctx, &settings.admin_api_key))
    }

    pub fn from_context(ctx: &DieselDbContext, admin_api_key: &str) -> Self {
        Self {
            games: Arc::new(ctx.games()),
            categories: Arc::new(ctx.categories()),
            stats: Arc::new(ctx.stats()),
            auth: AuthState::new(admin_api_key),
        }
    }
}

async fn bind(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    Ok(TcpListener::bind(addr).await?)
}

/// Start the API server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    let app = create_router(state);

    let listener = bind(host, port).await?;
    tracing::info!("Starting API server at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Serve a generated site directory as plain files.
pub async fn serve_static(dir: &Path, host: &str, port: u16) -> anyhow::Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Static directory not found: {}", dir.display());
    }
    let app = Router::new().fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));

    let listener = bind(host, port).await?;
    tracing::info!(
        "Serving {} at http://{}",
        dir.display(),
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// API server running on a background task.
pub struct RunningServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl RunningServer {
    /// Base URL clients should use.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

/// Spawn the API on an ephemeral loopback port.
pub async fn spawn_api(state: AppState) -> anyhow::Result<RunningServer> {
    let listener = bind("127.0.0.1", 0).await?;
    let addr = listener.local_addr()?;
    let app = create_router(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server stopped: {}", e);
        }
    });
    tracing::debug!("API server listening on {}", addr);

    Ok(RunningServer { addr, handle })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{CategoryInput, NewGame};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    const KEY: &str = "test-key";

    async fn setup() -> (Router, DieselDbContext, TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DieselDbContext::new(&dir.path().join("api.db"));
        ctx.init_schema().await.unwrap();

        let action = ctx
            .categories()
            .create(&CategoryInput {
                name: "Action".to_string(),
                slug: "action".to_string(),
                description: Some("Games in the Action category".to_string()),
            })
            .await
            .unwrap();
        let puzzle = ctx
            .categories()
            .create(&CategoryInput {
                name: "Puzzle".to_string(),
                slug: "puzzle".to_string(),
                description: None,
            })
            .await
            .unwrap();

        for (slug, category_id, plays, featured) in [
            ("space-race", action.id, 500, true),
            ("drift-hunters", action.id, 900, false),
            ("block-merge", puzzle.id, 100, false),
        ] {
            ctx.games()
                .create(&NewGame {
                    title: slug.replace('-', " "),
                    slug: slug.to_string(),
                    description: format!("Play {} online", slug),
                    long_description: Some(format!("{} has a secret level", slug)),
                    game_url: format!("https://embed.io/{}", slug),
                    category_id,
                    total_plays: plays,
                    is_featured: featured,
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let app = create_router(AppState::from_context(&ctx, KEY));
        (app, ctx, dir)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn admin(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(API_KEY_HEADER, KEY)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_games_sorted_by_popularity() {
        let (app, _ctx, _dir) = setup().await;
        let (status, body) = send(&app, get("/api/games")).await;

        assert_eq!(status, StatusCode::OK);
        let slugs: Vec<&str> = body["games"]
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["drift-hunters", "space-race", "block-merge"]);
        assert_eq!(body["pagination"]["total"], 3);
        assert_eq!(body["pagination"]["has_next"], false);
    }

    #[tokio::test]
    async fn test_list_games_filters() {
        let (app, _ctx, _dir) = setup().await;

        let (_, body) = send(&app, get("/api/games?category=puzzle")).await;
        assert_eq!(body["pagination"]["total"], 1);

        let (_, body) = send(&app, get("/api/games?category=all&featured=true")).await;
        assert_eq!(body["games"][0]["slug"], "space-race");
        assert_eq!(body["pagination"]["total"], 1);

        let (_, body) = send(&app, get("/api/games?per_page=1&page=2&sort=name")).await;
        assert_eq!(body["games"][0]["slug"], "drift-hunters");
        assert_eq!(body["pagination"]["pages"], 3);
        assert_eq!(body["pagination"]["has_prev"], true);
    }

    #[tokio::test]
    async fn test_extreme_paging_values_are_clamped() {
        let (app, _ctx, _dir) = setup().await;

        let (status, body) = send(
            &app,
            get(&format!("/api/games?page={}&per_page={}", i64::MAX, i64::MAX)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["games"].as_array().unwrap().is_empty());
        assert_eq!(body["pagination"]["per_page"], 100);
        assert_eq!(body["pagination"]["page"], 1_000_000);
        assert_eq!(body["pagination"]["has_next"], false);

        let (status, body) = send(
            &app,
            admin(
                "GET",
                &format!("/admin/games?page={}&per_page={}", i64::MAX, i64::MAX),
                json!({}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["per_page"], 1000);
        assert_eq!(body["pagination"]["pages"], 1);

        let (status, body) =
            send(&app, admin("GET", "/admin/games?per_page=1000", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["games"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_get_game_by_id_and_slug() {
        let (app, ctx, _dir) = setup().await;
        let id = ctx.games().id_for_slug("space-race").await.unwrap().unwrap();

        let (status, body) = send(&app, get(&format!("/api/games/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["game"]["category_name"], "Action");

        let (status, body) = send(&app, get("/api/games/slug/space-race")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["game"]["id"], id);

        let (status, body) = send(&app, get("/api/games/slug/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Game not found");
    }

    #[tokio::test]
    async fn test_record_play_updates_counters() {
        let (app, ctx, _dir) = setup().await;
        let id = ctx.games().id_for_slug("block-merge").await.unwrap().unwrap();

        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/games/{}/play", id))
            .header("content-type", "application/json")
            .header("X-Forwarded-For", "10.0.0.1, 10.0.0.2")
            .body(Body::from(json!({ "duration": 120 }).to_string()))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Game play recorded successfully");

        let game = ctx.games().get(id).await.unwrap().unwrap();
        assert_eq!(game.total_plays, 101);

        let (_, body) = send(&app, get(&format!("/api/stats/games/{}", id))).await;
        let daily = body["daily_stats"].as_array().unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0]["plays"], 1);
        assert_eq!(daily[0]["avg_duration"], 120.0);

        let request = Request::builder()
            .method("POST")
            .uri("/api/games/9999/play")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_categories_with_counts() {
        let (app, _ctx, _dir) = setup().await;
        let (_, body) = send(&app, get("/api/categories")).await;

        let categories = body["categories"].as_array().unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0]["slug"], "action");
        assert_eq!(categories[0]["game_count"], 2);

        let id = categories[1]["id"].as_i64().unwrap();
        let (_, body) = send(&app, get(&format!("/api/categories/{}/games", id))).await;
        assert_eq!(body["category"]["name"], "Puzzle");
        assert_eq!(body["games"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, get("/api/categories/9999/games")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search() {
        let (app, _ctx, _dir) = setup().await;

        let (status, body) = send(&app, get("/api/search")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Search query is required");

        let (_, body) = send(&app, get("/api/search?q=secret%20level")).await;
        assert_eq!(body["query"], "secret level");
        assert_eq!(body["pagination"]["total"], 3);

        let (_, body) = send(&app, get("/api/search?q=drift")).await;
        assert_eq!(body["games"][0]["slug"], "drift-hunters");
    }

    #[tokio::test]
    async fn test_games_stats() {
        let (app, _ctx, _dir) = setup().await;
        let (_, body) = send(&app, get("/api/stats/games")).await;

        assert_eq!(body["stats"]["total_games"], 3);
        assert_eq!(body["stats"]["total_plays"], 1500);
        assert_eq!(body["stats"]["featured_games"], 1);
        assert_eq!(body["popular_games"][0]["slug"], "drift-hunters");
    }

    #[tokio::test]
    async fn test_admin_requires_key() {
        let (app, _ctx, _dir) = setup().await;

        let (status, body) = send(&app, get("/admin/games")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let request = Request::builder()
            .uri("/admin/games")
            .header(API_KEY_HEADER, "wrong")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_game_lifecycle() {
        let (app, ctx, _dir) = setup().await;
        let category = ctx.categories().get_by_slug("puzzle").await.unwrap().unwrap();

        let (status, body) = send(
            &app,
            admin("POST", "/admin/games", json!({ "title": "Only Title" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required field: slug");

        let payload = json!({
            "title": "Tile Twist",
            "slug": "tile-twist",
            "description": "Twist tiles",
            "game_url": "https://embed.io/tile-twist",
            "category_id": category.id,
            "tags": ["Puzzle"],
        });
        let (status, body) = send(&app, admin("POST", "/admin/games", payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["game"]["category_slug"], "puzzle");
        let id = body["game"]["id"].as_i64().unwrap();

        let (status, body) = send(&app, admin("POST", "/admin/games", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Slug already exists");

        let (status, body) = send(
            &app,
            admin(
                "PUT",
                &format!("/admin/games/{}", id),
                json!({ "rating": 4.5, "is_featured": true }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["game"]["rating"], 4.5);
        assert_eq!(body["game"]["is_featured"], true);

        let (status, _) = send(&app, admin("DELETE", &format!("/admin/games/{}", id), json!({}))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, get(&format!("/api/games/{}", id))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(
            &app,
            admin("GET", "/admin/games?include_inactive=true", json!({})),
        )
        .await;
        assert_eq!(body["pagination"]["total"], 4);
        assert_eq!(body["games"][0]["slug"], "tile-twist");
    }

    #[tokio::test]
    async fn test_admin_bulk_update() {
        let (app, ctx, _dir) = setup().await;

        let (status, body) = send(
            &app,
            admin("POST", "/admin/games/bulk-update", json!({ "game_ids": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No game IDs provided");

        let a = ctx.games().id_for_slug("space-race").await.unwrap().unwrap();
        let b = ctx.games().id_for_slug("block-merge").await.unwrap().unwrap();
        let (status, body) = send(
            &app,
            admin(
                "POST",
                "/admin/games/bulk-update",
                json!({ "game_ids": [a, b, 9999], "updates": { "is_new": false } }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updated_count"], 2);
        assert_eq!(body["message"], "Successfully updated 2 games");
        assert_eq!(ctx.games().count_new().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_admin_categories() {
        let (app, ctx, _dir) = setup().await;

        let (status, body) = send(
            &app,
            admin("POST", "/admin/categories", json!({ "name": "Sports" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Name and slug are required");

        let (status, body) = send(
            &app,
            admin(
                "POST",
                "/admin/categories",
                json!({ "name": "Sports", "slug": "sports" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let sports = body["category"]["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            admin(
                "PUT",
                &format!("/admin/categories/{}", sports),
                json!({ "description": "Ball games" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"]["description"], "Ball games");

        let action = ctx.categories().get_by_slug("action").await.unwrap().unwrap();
        let (status, body) = send(
            &app,
            admin("DELETE", &format!("/admin/categories/{}", action.id), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Cannot delete category with 2 games");

        let (status, _) = send(
            &app,
            admin("DELETE", &format!("/admin/categories/{}", sports), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ctx.categories().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_dashboard() {
        let (app, ctx, _dir) = setup().await;
        let id = ctx.games().id_for_slug("space-race").await.unwrap().unwrap();
        send(
            &app,
            Request::builder()
                .method("POST")
                .uri(format!("/api/games/{}/play", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        let (status, body) = send(&app, admin("GET", "/admin/stats/dashboard", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["basic_stats"]["total_games"], 3);
        assert_eq!(body["basic_stats"]["total_categories"], 2);
        assert_eq!(body["basic_stats"]["today_plays"], 1);
        assert_eq!(body["week_stats"][0]["plays"], 1);
        assert_eq!(body["top_games"][0]["title"], "space race");
    }
}
