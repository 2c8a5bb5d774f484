//! HTTP fetching for the scraper and the site generator.
//!
//! The scraper only ever sees the [`Fetch`] boundary: a page either comes
//! back as text or the failure is logged and reported as `None`.

mod user_agent;

pub use user_agent::{resolve_user_agent, DEFAULT_USER_AGENT};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Source of page HTML.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch a page body, or `None` on any transport failure or non-2xx status.
    async fn fetch(&self, url: &str) -> Option<String>;
}

/// HTTP client with a fixed user agent and timeout.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    /// `user_agent_config` follows [`resolve_user_agent`].
    pub fn new(timeout: Duration, user_agent_config: Option<&str>) -> Result<Self, reqwest::Error> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// GET a URL and return the body text; non-2xx statuses are errors.
    pub async fn get_text(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }

    /// GET a URL with query parameters and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        response.json::<T>().await
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn fetch(&self, url: &str) -> Option<String> {
        debug!("GET {}", url);
        match self.get_text(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                None
            }
        }
    }
}
