//! HTTP handlers for the catalog API.

pub mod admin;
pub mod api;
mod types;

pub use types::{
    ApiError, ApiResult, CategoryJson, GameListResponse, GameResponse, Pagination, MAX_PER_PAGE,
};
