//! Diesel ORM models for database tables.
//!
//! Records mirror the rows exactly; JSON columns and timestamps stay as
//! text here and are decoded when converting into the domain models.

use diesel::prelude::*;

use crate::schema;

/// Category record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategoryRecord {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: String,
}

/// New category for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::categories)]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub created_at: &'a str,
}

/// Game record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::games)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CatalogGameRecord {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub long_description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub game_url: String,
    pub iframe_url: Option<String>,
    pub category_id: i32,
    pub rating: f64,
    pub total_plays: i64,
    pub is_featured: bool,
    pub is_new: bool,
    pub is_active: bool,
    pub tags: String,
    pub features: String,
    pub controls: String,
    pub release_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Game row for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::games)]
pub struct NewCatalogGame<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub long_description: Option<&'a str>,
    pub thumbnail_url: Option<&'a str>,
    pub game_url: &'a str,
    pub iframe_url: Option<&'a str>,
    pub category_id: i32,
    pub rating: f64,
    pub total_plays: i64,
    pub is_featured: bool,
    pub is_new: bool,
    pub is_active: bool,
    pub tags: &'a str,
    pub features: &'a str,
    pub controls: &'a str,
    pub release_date: Option<&'a str>,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Partial game update. `None` leaves a column untouched.
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = schema::games)]
pub struct GameChangeset {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<Option<String>>,
    pub thumbnail_url: Option<Option<String>>,
    pub game_url: Option<String>,
    pub iframe_url: Option<Option<String>>,
    pub category_id: Option<i32>,
    pub rating: Option<f64>,
    pub total_plays: Option<i64>,
    pub is_featured: Option<bool>,
    pub is_new: Option<bool>,
    pub is_active: Option<bool>,
    pub tags: Option<String>,
    pub features: Option<String>,
    pub controls: Option<String>,
    pub release_date: Option<Option<String>>,
    pub updated_at: Option<String>,
}

/// Play record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::game_plays)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GamePlayRecord {
    pub id: i32,
    pub game_id: i32,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub play_duration: i32,
    pub created_at: String,
}

/// New play for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::game_plays)]
pub struct NewGamePlay<'a> {
    pub game_id: i32,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub play_duration: i32,
    pub created_at: &'a str,
}

/// Daily stats record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::game_stats)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GameStatsRecord {
    pub id: i32,
    pub game_id: i32,
    pub date: String,
    pub daily_plays: i32,
    pub unique_players: i32,
    pub avg_play_duration: f64,
}

/// New daily stats row for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::game_stats)]
pub struct NewGameStats<'a> {
    pub game_id: i32,
    pub date: &'a str,
    pub daily_plays: i32,
    pub unique_players: i32,
    pub avg_play_duration: f64,
}
