//! Catalog models backing the relational store and the CRUD API.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Key → description map shown as the "controls" panel of a game.
pub type Controls = BTreeMap<String, String>;

/// Name used when a scraped game has no category.
pub const DEFAULT_CATEGORY: &str = "General";

/// A game category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A playable game, joined with its category for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub long_description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub game_url: String,
    pub iframe_url: Option<String>,
    pub category_id: i32,
    pub category_name: String,
    pub category_slug: String,
    pub rating: f64,
    pub total_plays: i64,
    pub is_featured: bool,
    pub is_new: bool,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub controls: Controls,
    pub release_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single recorded play session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GamePlay {
    pub id: i32,
    pub game_id: i32,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub play_duration: i32,
    pub created_at: DateTime<Utc>,
}

/// Per-game, per-day play aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStats {
    pub id: i32,
    pub game_id: i32,
    pub date: NaiveDate,
    pub daily_plays: i32,
    pub unique_players: i32,
    pub avg_play_duration: f64,
}

impl GameStats {
    /// Fold one more play into today's running average.
    ///
    /// Plays with no reported duration count toward `daily_plays` but leave
    /// the average untouched.
    pub fn with_play(mut self, duration: i32) -> Self {
        self.daily_plays += 1;
        if duration > 0 {
            let previous = self.avg_play_duration * f64::from(self.daily_plays - 1);
            self.avg_play_duration = (previous + f64::from(duration)) / f64::from(self.daily_plays);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(plays: i32, avg: f64) -> GameStats {
        GameStats {
            id: 1,
            game_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            daily_plays: plays,
            unique_players: 1,
            avg_play_duration: avg,
        }
    }

    #[test]
    fn test_running_average() {
        let updated = stats(1, 60.0).with_play(120);
        assert_eq!(updated.daily_plays, 2);
        assert!((updated.avg_play_duration - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_duration_keeps_average() {
        let updated = stats(3, 40.0).with_play(0);
        assert_eq!(updated.daily_plays, 4);
        assert!((updated.avg_play_duration - 40.0).abs() < f64::EPSILON);
    }
}
