//! gamesite - game portal scraper, catalog API and static site generator.
//!
//! Scrapes a browser-game portal into a JSON document, imports it into a
//! SQLite catalog, serves the catalog over a JSON API, and renders a static
//! site from that API.

pub mod cli;
pub mod config;
pub mod models;
pub mod repository;
pub mod schema;
pub mod scrapers;
pub mod server;
pub mod services;
pub mod sitegen;
pub mod utils;
