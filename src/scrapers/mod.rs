//! Game portal scraper.
//!
//! Fetches the portal's landing page, picks game links out of the
//! "recently played" block, analyzes each game page and keeps the results
//! deduplicated in a JSON document.

pub mod classify;
pub mod html;
pub mod http_client;
pub mod landing;
pub mod normalize;
pub mod page;
pub mod pipeline;
pub mod store;

pub use http_client::{Fetch, HttpClient, DEFAULT_USER_AGENT};
pub use landing::{LandingPageParser, RecentlyPlayedParser};
pub use page::{parse_game_page, PageAnalyzer};
pub use pipeline::{ScrapeOptions, ScrapePipeline, ScrapeReport};
pub use store::{ScrapeContext, StoreError};

/// Portal scraped when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://www.onlinegames.io";
