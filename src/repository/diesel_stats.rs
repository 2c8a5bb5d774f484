//! Diesel-based play statistics repository for SQLite.

use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::Serialize;

use super::diesel_models::{GamePlayRecord, GameStatsRecord, NewGamePlay, NewGameStats};
use super::diesel_pool::{AsyncSqlitePool, DieselError};
use super::{parse_date, parse_datetime, DATE_FORMAT};
use crate::models::{GamePlay, GameStats};
use crate::schema::{game_plays, game_stats, games};

impl From<GameStatsRecord> for GameStats {
    fn from(record: GameStatsRecord) -> Self {
        GameStats {
            id: record.id,
            game_id: record.game_id,
            date: parse_date(&record.date),
            daily_plays: record.daily_plays,
            unique_players: record.unique_players,
            avg_play_duration: record.avg_play_duration,
        }
    }
}

impl From<GamePlayRecord> for GamePlay {
    fn from(record: GamePlayRecord) -> Self {
        GamePlay {
            id: record.id,
            game_id: record.game_id,
            ip_address: record.ip_address,
            user_agent: record.user_agent,
            play_duration: record.play_duration,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// Plays summed over one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPlays {
    pub date: NaiveDate,
    pub plays: i64,
}

/// A game and its plays over some window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopGame {
    pub title: String,
    pub plays: i64,
}

#[derive(QueryableByName)]
struct DayRow {
    #[diesel(sql_type = Text)]
    date: String,
    #[diesel(sql_type = BigInt)]
    plays: i64,
}

#[derive(QueryableByName)]
struct TopGameRow {
    #[diesel(sql_type = Text)]
    title: String,
    #[diesel(sql_type = BigInt)]
    plays: i64,
}

#[derive(QueryableByName)]
struct PlaysRow {
    #[diesel(sql_type = BigInt)]
    plays: i64,
}

/// Play recording and aggregation.
#[derive(Clone)]
pub struct DieselStatsRepository {
    pool: AsyncSqlitePool,
}

impl DieselStatsRepository {
    /// Create a new stats repository with an existing pool.
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Record one play of an active game: log the session, bump the game's
    /// counter and fold it into the day's aggregate.
    ///
    /// Returns `false` without writing anything when the game is missing or
    /// inactive.
    pub async fn record_play(
        &self,
        game_id: i32,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
        duration: i32,
        today: NaiveDate,
    ) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let day = today.format(DATE_FORMAT).to_string();
        let duration = duration.max(0);

        conn.transaction(|conn| {
            Box::pin(async move {
                let active: Option<bool> = games::table
                    .find(game_id)
                    .select(games::is_active)
                    .first(conn)
                    .await
                    .optional()?;
                if active != Some(true) {
                    return Ok(false);
                }

                let now = Utc::now().to_rfc3339();
                diesel::insert_into(game_plays::table)
                    .values(NewGamePlay {
                        game_id,
                        ip_address,
                        user_agent,
                        play_duration: duration,
                        created_at: &now,
                    })
                    .execute(conn)
                    .await?;

                diesel::update(games::table.find(game_id))
                    .set(games::total_plays.eq(games::total_plays + 1))
                    .execute(conn)
                    .await?;

                let existing: Option<GameStatsRecord> = game_stats::table
                    .filter(game_stats::game_id.eq(game_id))
                    .filter(game_stats::date.eq(&day))
                    .first(conn)
                    .await
                    .optional()?;

                match existing {
                    Some(record) => {
                        let stats = GameStats::from(record).with_play(duration);
                        diesel::update(game_stats::table.find(stats.id))
                            .set((
                                game_stats::daily_plays.eq(stats.daily_plays),
                                game_stats::avg_play_duration.eq(stats.avg_play_duration),
                            ))
                            .execute(conn)
                            .await?;
                    }
                    None => {
                        diesel::insert_into(game_stats::table)
                            .values(NewGameStats {
                                game_id,
                                date: &day,
                                daily_plays: 1,
                                unique_players: 1,
                                avg_play_duration: f64::from(duration),
                            })
                            .execute(conn)
                            .await?;
                    }
                }

                Ok(true)
            })
        })
        .await
    }

    /// A game's most recent daily aggregates, newest first.
    pub async fn daily_stats(&self, game_id: i32, limit: i64) -> Result<Vec<GameStats>, DieselError> {
        let mut conn = self.pool.get().await?;

        game_stats::table
            .filter(game_stats::game_id.eq(game_id))
            .order(game_stats::date.desc())
            .limit(limit)
            .load::<GameStatsRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(GameStats::from).collect())
    }

    /// A game's latest play sessions, newest first.
    pub async fn recent_plays(&self, game_id: i32, limit: i64) -> Result<Vec<GamePlay>, DieselError> {
        let mut conn = self.pool.get().await?;

        game_plays::table
            .filter(game_plays::game_id.eq(game_id))
            .order((game_plays::created_at.desc(), game_plays::id.desc()))
            .limit(limit)
            .select(GamePlayRecord::as_select())
            .load::<GamePlayRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(GamePlay::from).collect())
    }

    /// Total plays across all games on one day.
    pub async fn plays_on(&self, date: NaiveDate) -> Result<i64, DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::sql_query(
            "SELECT COALESCE(SUM(daily_plays), 0) AS plays FROM game_stats WHERE date = ?",
        )
        .bind::<Text, _>(date.format(DATE_FORMAT).to_string())
        .get_result::<PlaysRow>(&mut conn)
        .await
        .map(|row| row.plays)
    }

    /// Plays per day from `since` onwards, oldest first. Days without any
    /// plays are absent.
    pub async fn plays_since(&self, since: NaiveDate) -> Result<Vec<DailyPlays>, DieselError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::sql_query(
            "SELECT date, SUM(daily_plays) AS plays FROM game_stats \
             WHERE date >= ? GROUP BY date ORDER BY date",
        )
        .bind::<Text, _>(since.format(DATE_FORMAT).to_string())
        .load::<DayRow>(&mut conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DailyPlays {
                date: parse_date(&row.date),
                plays: row.plays,
            })
            .collect())
    }

    /// Active games with the most plays from `since` onwards.
    pub async fn top_games_since(
        &self,
        since: NaiveDate,
        limit: i64,
    ) -> Result<Vec<TopGame>, DieselError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::sql_query(
            "SELECT g.title AS title, SUM(s.daily_plays) AS plays \
             FROM game_stats s JOIN games g ON g.id = s.game_id \
             WHERE s.date >= ? AND g.is_active = 1 \
             GROUP BY g.id, g.title ORDER BY plays DESC LIMIT ?",
        )
        .bind::<Text, _>(since.format(DATE_FORMAT).to_string())
        .bind::<BigInt, _>(limit)
        .load::<TopGameRow>(&mut conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TopGame {
                title: row.title,
                plays: row.plays,
            })
            .collect())
    }
}
