//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking
//! against a SQLite file.

pub mod diesel_category;
pub mod diesel_context;
pub mod diesel_game;
pub mod diesel_models;
pub mod diesel_pool;
pub mod diesel_stats;
pub mod util;

pub use diesel_category::{CategoryInput, CategoryUpdate, DieselCategoryRepository};
pub use diesel_context::DieselDbContext;
pub use diesel_game::{
    DieselGameRepository, GameQuery, GameSort, GameUpdate, ImportOutcome, NewGame,
};
pub use diesel_pool::{AsyncSqlitePool, DieselError};
pub use diesel_stats::{DailyPlays, DieselStatsRepository, TopGame};

use chrono::{DateTime, NaiveDate, Utc};

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

/// Row id of the most recent insert on a connection.
#[derive(diesel::QueryableByName)]
pub(crate) struct LastInsertRowId {
    #[diesel(sql_type = diesel::sql_types::BigInt, column_name = "last_insert_rowid()")]
    pub id: i64,
}

/// Format used for the `game_stats.date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` column, defaulting to the epoch day.
pub fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_fallback() {
        assert_eq!(parse_datetime("garbage"), DateTime::UNIX_EPOCH);
        let dt = parse_datetime("2025-01-20T10:00:00+00:00");
        assert_eq!(dt.to_rfc3339(), "2025-01-20T10:00:00+00:00");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-01-20"),
            NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()
        );
    }
}
