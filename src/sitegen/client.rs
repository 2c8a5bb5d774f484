//! Client for the catalog API the generator renders from.

use tracing::debug;

use crate::models::Game;
use crate::scrapers::HttpClient;
use crate::server::{GameListResponse, GameResponse};

/// Page size used when enumerating the catalog.
const ENUMERATION_PAGE_SIZE: i64 = 100;

/// Typed access to the public `/api` routes.
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
}

impl ApiClient {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// One page of active games, most played first.
    pub async fn games_page(
        &self,
        page: i64,
        per_page: i64,
    ) -> Result<GameListResponse, reqwest::Error> {
        self.http
            .get_json(
                &self.url("/games"),
                &[("page", page.to_string()), ("per_page", per_page.to_string())],
            )
            .await
    }

    /// Slugs of every active game, following pagination to the end.
    pub async fn all_slugs(&self) -> Result<Vec<String>, reqwest::Error> {
        let mut slugs = Vec::new();
        let mut page = 1;

        loop {
            let response = self.games_page(page, ENUMERATION_PAGE_SIZE).await?;
            debug!("Catalog page {}: {} games", page, response.games.len());
            slugs.extend(response.games.into_iter().map(|g| g.slug));
            if !response.pagination.has_next {
                break;
            }
            page += 1;
        }

        Ok(slugs)
    }

    pub async fn game_by_slug(&self, slug: &str) -> Result<Game, reqwest::Error> {
        let path = format!("/games/slug/{}", urlencoding::encode(slug));
        let response: GameResponse = self.http.get_json(&self.url(&path), &[]).await?;
        Ok(response.game)
    }

    /// Up to `limit` active games of one category.
    pub async fn games_in_category(
        &self,
        category_slug: &str,
        limit: i64,
    ) -> Result<Vec<Game>, reqwest::Error> {
        let response: GameListResponse = self
            .http
            .get_json(
                &self.url("/games"),
                &[
                    ("category", category_slug.to_string()),
                    ("per_page", limit.to_string()),
                ],
            )
            .await?;
        Ok(response.games)
    }
}
