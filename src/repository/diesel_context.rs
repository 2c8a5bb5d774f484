//! Diesel database context for managing connections and repository access.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::diesel_category::DieselCategoryRepository;
use super::diesel_game::DieselGameRepository;
use super::diesel_pool::{AsyncSqlitePool, DieselError};
use super::diesel_stats::DieselStatsRepository;

/// Entry point for catalog database operations.
///
/// Create one context per command or server, then use it to reach the
/// individual repositories.
///
/// # Example
/// ```ignore
/// let ctx = DieselDbContext::from_url("sqlite:games.db");
/// ctx.init_schema().await?;
/// let categories = ctx.categories().list().await?;
/// ```
#[derive(Clone)]
pub struct DieselDbContext {
    pool: AsyncSqlitePool,
}

impl DieselDbContext {
    /// Create a context for a database file.
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: AsyncSqlitePool::from_path(db_path),
        }
    }

    /// Create a context from a database URL (`sqlite:path` or a bare path).
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: AsyncSqlitePool::new(database_url),
        }
    }

    pub fn pool(&self) -> &AsyncSqlitePool {
        &self.pool
    }

    /// Get a category repository.
    pub fn categories(&self) -> DieselCategoryRepository {
        DieselCategoryRepository::new(self.pool.clone())
    }

    /// Get a game repository.
    pub fn games(&self) -> DieselGameRepository {
        DieselGameRepository::new(self.pool.clone())
    }

    /// Get a play statistics repository.
    pub fn stats(&self) -> DieselStatsRepository {
        DieselStatsRepository::new(self.pool.clone())
    }

    /// Create all tables and indexes if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL UNIQUE,
                description TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL,
                long_description TEXT,
                thumbnail_url TEXT,
                game_url TEXT NOT NULL,
                iframe_url TEXT,
                category_id INTEGER NOT NULL REFERENCES categories(id),
                rating REAL NOT NULL DEFAULT 0,
                total_plays INTEGER NOT NULL DEFAULT 0,
                is_featured INTEGER NOT NULL DEFAULT 0,
                is_new INTEGER NOT NULL DEFAULT 1,
                is_active INTEGER NOT NULL DEFAULT 1,
                tags TEXT NOT NULL DEFAULT '[]',
                features TEXT NOT NULL DEFAULT '[]',
                controls TEXT NOT NULL DEFAULT '{}',
                release_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_games_category ON games(category_id);
            CREATE INDEX IF NOT EXISTS idx_games_active_plays ON games(is_active, total_plays);

            CREATE TABLE IF NOT EXISTS game_plays (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id INTEGER NOT NULL REFERENCES games(id),
                ip_address TEXT,
                user_agent TEXT,
                play_duration INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_game_plays_game ON game_plays(game_id);
            CREATE INDEX IF NOT EXISTS idx_game_plays_created ON game_plays(created_at);

            CREATE TABLE IF NOT EXISTS game_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id INTEGER NOT NULL REFERENCES games(id),
                date TEXT NOT NULL,
                daily_plays INTEGER NOT NULL DEFAULT 0,
                unique_players INTEGER NOT NULL DEFAULT 0,
                avg_play_duration REAL NOT NULL DEFAULT 0,
                UNIQUE(game_id, date)
            );
            "#,
        )
        .await
    }
}
