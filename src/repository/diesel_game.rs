//! Diesel-based game repository for SQLite.
//!
//! Games are always read joined with their category so callers get the
//! category name and slug alongside each row.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::diesel_category::{CategoryInput, DieselCategoryRepository};
use super::diesel_models::{CatalogGameRecord, GameChangeset, NewCatalogGame};
use super::diesel_pool::{AsyncSqliteConnection, AsyncSqlitePool, DieselError};
use super::util::to_json_column;
use super::{parse_datetime, parse_datetime_opt, LastInsertRowId};
use crate::models::{Controls, Game};
use crate::schema::{categories, games};

type GamesWithCategory = diesel::dsl::InnerJoin<games::table, categories::table>;
type BoxedGameQuery<'a> = diesel::dsl::IntoBoxed<'a, GamesWithCategory, Sqlite>;

/// Existing feature lists this short are regenerated on re-import.
const MIN_KEPT_FEATURES: usize = 4;
/// Existing control maps this small are regenerated on re-import.
const MIN_KEPT_CONTROLS: usize = 2;

fn to_game(record: CatalogGameRecord, (category_name, category_slug): (String, String)) -> Game {
    Game {
        id: record.id,
        title: record.title,
        slug: record.slug,
        description: record.description,
        long_description: record.long_description,
        thumbnail_url: record.thumbnail_url,
        game_url: record.game_url,
        iframe_url: record.iframe_url,
        category_id: record.category_id,
        category_name,
        category_slug,
        rating: record.rating,
        total_plays: record.total_plays,
        is_featured: record.is_featured,
        is_new: record.is_new,
        is_active: record.is_active,
        tags: serde_json::from_str(&record.tags).unwrap_or_default(),
        features: serde_json::from_str(&record.features).unwrap_or_default(),
        controls: serde_json::from_str(&record.controls).unwrap_or_default(),
        release_date: parse_datetime_opt(record.release_date),
        created_at: parse_datetime(&record.created_at),
        updated_at: parse_datetime(&record.updated_at),
    }
}

/// Ordering for game listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameSort {
    /// Most played first.
    #[default]
    Popular,
    /// Most recently released first.
    Newest,
    /// Highest rated first.
    Rating,
    /// Alphabetical by title.
    Name,
    /// Most recently added first.
    Created,
}

impl GameSort {
    /// Parse a `sort` query value. Unknown values fall back to popularity.
    pub fn parse(s: &str) -> Self {
        match s {
            "newest" => Self::Newest,
            "rating" => Self::Rating,
            "name" => Self::Name,
            "created" => Self::Created,
            _ => Self::Popular,
        }
    }
}

/// Filters and paging for [`DieselGameRepository::list`].
#[derive(Debug, Clone)]
pub struct GameQuery {
    /// 1-based page number.
    pub page: i64,
    pub per_page: i64,
    pub category_id: Option<i32>,
    pub category_slug: Option<String>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    /// Also match the search term against `long_description`.
    pub search_long_description: bool,
    pub featured: Option<bool>,
    pub is_new: Option<bool>,
    pub include_inactive: bool,
    pub sort: GameSort,
}

impl Default for GameQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            category_id: None,
            category_slug: None,
            search: None,
            search_long_description: false,
            featured: None,
            is_new: None,
            include_inactive: false,
            sort: GameSort::Popular,
        }
    }
}

impl GameQuery {
    fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.per_page.max(0))
    }

    fn filtered(&self) -> BoxedGameQuery<'static> {
        let mut query = games::table.inner_join(categories::table).into_boxed();

        if !self.include_inactive {
            query = query.filter(games::is_active.eq(true));
        }
        if let Some(id) = self.category_id {
            query = query.filter(games::category_id.eq(id));
        }
        if let Some(slug) = &self.category_slug {
            query = query.filter(categories::slug.eq(slug.clone()));
        }
        if let Some(term) = &self.search {
            let pattern = format!("%{}%", term);
            if self.search_long_description {
                query = query.filter(
                    games::title
                        .like(pattern.clone())
                        .or(games::description.like(pattern.clone()))
                        .or(games::long_description.assume_not_null().like(pattern)),
                );
            } else {
                query = query.filter(
                    games::title
                        .like(pattern.clone())
                        .or(games::description.like(pattern)),
                );
            }
        }
        if let Some(featured) = self.featured {
            query = query.filter(games::is_featured.eq(featured));
        }
        if let Some(is_new) = self.is_new {
            query = query.filter(games::is_new.eq(is_new));
        }

        query
    }

    fn sorted(&self) -> BoxedGameQuery<'static> {
        let query = self.filtered();
        match self.sort {
            GameSort::Popular => query.order((games::total_plays.desc(), games::id.asc())),
            GameSort::Newest => query.order((games::release_date.desc(), games::id.desc())),
            GameSort::Rating => query.order((games::rating.desc(), games::id.asc())),
            GameSort::Name => query.order((games::title.asc(), games::id.asc())),
            GameSort::Created => query.order((games::created_at.desc(), games::id.desc())),
        }
    }
}

/// Fields for a new game.
#[derive(Debug, Clone)]
pub struct NewGame {
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
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub controls: Controls,
    pub release_date: Option<DateTime<Utc>>,
}

impl Default for NewGame {
    fn default() -> Self {
        Self {
            title: String::new(),
            slug: String::new(),
            description: String::new(),
            long_description: None,
            thumbnail_url: None,
            game_url: String::new(),
            iframe_url: None,
            category_id: 0,
            rating: 0.0,
            total_plays: 0,
            is_featured: false,
            is_new: true,
            is_active: true,
            tags: Vec::new(),
            features: Vec::new(),
            controls: Controls::new(),
            release_date: None,
        }
    }
}

/// Partial game update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct GameUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub game_url: Option<String>,
    pub iframe_url: Option<String>,
    pub category_id: Option<i32>,
    pub rating: Option<f64>,
    pub is_featured: Option<bool>,
    pub is_new: Option<bool>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub controls: Option<Controls>,
    pub release_date: Option<DateTime<Utc>>,
}

impl GameUpdate {
    fn to_changeset(&self) -> GameChangeset {
        GameChangeset {
            title: self.title.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            long_description: self.long_description.clone().map(Some),
            thumbnail_url: self.thumbnail_url.clone().map(Some),
            game_url: self.game_url.clone(),
            iframe_url: self.iframe_url.clone().map(Some),
            category_id: self.category_id,
            rating: self.rating,
            total_plays: None,
            is_featured: self.is_featured,
            is_new: self.is_new,
            is_active: self.is_active,
            tags: self.tags.as_ref().map(|t| to_json_column(t, "[]")),
            features: self.features.as_ref().map(|f| to_json_column(f, "[]")),
            controls: self.controls.as_ref().map(|c| to_json_column(c, "{}")),
            release_date: self.release_date.map(|d| Some(d.to_rfc3339())),
            updated_at: Some(Utc::now().to_rfc3339()),
        }
    }
}

/// What [`DieselGameRepository::import_game`] did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// A new row was inserted.
    Inserted(i32),
    /// A game with the same slug already existed; only its missing
    /// generated fields were filled.
    Updated(i32),
}

/// Changes that fill an existing game's empty generated fields from a
/// freshly imported candidate. `None` when nothing needs filling.
fn fill_missing(existing: &CatalogGameRecord, candidate: &NewGame) -> Option<GameChangeset> {
    let tags: Vec<String> = serde_json::from_str(&existing.tags).unwrap_or_default();
    let features: Vec<String> = serde_json::from_str(&existing.features).unwrap_or_default();
    let controls: Controls = serde_json::from_str(&existing.controls).unwrap_or_default();

    let mut changes = GameChangeset::default();
    let mut dirty = false;

    if existing.rating == 0.0 && candidate.rating > 0.0 {
        changes.rating = Some(candidate.rating);
        dirty = true;
    }
    if existing.total_plays == 0 && candidate.total_plays > 0 {
        changes.total_plays = Some(candidate.total_plays);
        dirty = true;
    }
    if tags.is_empty() && !candidate.tags.is_empty() {
        changes.tags = Some(to_json_column(&candidate.tags, "[]"));
        dirty = true;
    }
    if features.len() <= MIN_KEPT_FEATURES && features != candidate.features {
        changes.features = Some(to_json_column(&candidate.features, "[]"));
        dirty = true;
    }
    if controls.len() <= MIN_KEPT_CONTROLS && controls != candidate.controls {
        changes.controls = Some(to_json_column(&candidate.controls, "{}"));
        dirty = true;
    }

    dirty.then(|| GameChangeset {
        updated_at: Some(Utc::now().to_rfc3339()),
        ..changes
    })
}

/// Row holding a single aggregate.
#[derive(QueryableByName)]
struct Total {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    total: i64,
}

/// Diesel-based game repository.
#[derive(Clone)]
pub struct DieselGameRepository {
    pool: AsyncSqlitePool,
}

impl DieselGameRepository {
    /// Create a new game repository with an existing pool.
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    async fn first_game(
        conn: &mut AsyncSqliteConnection,
        query: BoxedGameQuery<'_>,
    ) -> Result<Option<Game>, DieselError> {
        query
            .select((
                CatalogGameRecord::as_select(),
                (categories::name, categories::slug),
            ))
            .first::<(CatalogGameRecord, (String, String))>(conn)
            .await
            .optional()
            .map(|opt| opt.map(|(record, category)| to_game(record, category)))
    }

    /// Get a game by ID, active or not.
    pub async fn get(&self, id: i32) -> Result<Option<Game>, DieselError> {
        let mut conn = self.pool.get().await?;
        let query = games::table
            .inner_join(categories::table)
            .filter(games::id.eq(id))
            .into_boxed();
        Self::first_game(&mut conn, query).await
    }

    /// Get a game by slug, active or not.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Game>, DieselError> {
        let mut conn = self.pool.get().await?;
        let query = games::table
            .inner_join(categories::table)
            .filter(games::slug.eq(slug.to_string()))
            .into_boxed();
        Self::first_game(&mut conn, query).await
    }

    /// ID of the game using `slug`, if any.
    pub async fn id_for_slug(&self, slug: &str) -> Result<Option<i32>, DieselError> {
        let mut conn = self.pool.get().await?;

        games::table
            .filter(games::slug.eq(slug))
            .select(games::id)
            .first::<i32>(&mut conn)
            .await
            .optional()
    }

    /// Whether any game uses `slug`.
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, DieselError> {
        Ok(self.id_for_slug(slug).await?.is_some())
    }

    /// One page of games plus the total number matching the filters.
    pub async fn list(&self, query: &GameQuery) -> Result<(Vec<Game>, i64), DieselError> {
        let mut conn = self.pool.get().await?;

        let total: i64 = query
            .filtered()
            .select(diesel::dsl::count_star())
            .first(&mut conn)
            .await?;

        let games = query
            .sorted()
            .limit(query.per_page)
            .offset(query.offset())
            .select((
                CatalogGameRecord::as_select(),
                (categories::name, categories::slug),
            ))
            .load::<(CatalogGameRecord, (String, String))>(&mut conn)
            .await?
            .into_iter()
            .map(|(record, category)| to_game(record, category))
            .collect();

        Ok((games, total))
    }

    /// Most played active games.
    pub async fn popular(&self, limit: i64) -> Result<Vec<Game>, DieselError> {
        let query = GameQuery {
            per_page: limit,
            ..Default::default()
        };
        Ok(self.list(&query).await?.0)
    }

    /// Every active game, most played first.
    pub async fn all_active(&self) -> Result<Vec<Game>, DieselError> {
        let query = GameQuery {
            per_page: i64::MAX,
            ..Default::default()
        };
        Ok(self.list(&query).await?.0)
    }

    async fn count_where(&self, featured: bool, new: bool) -> Result<i64, DieselError> {
        let mut conn = self.pool.get().await?;

        let mut query = games::table
            .filter(games::is_active.eq(true))
            .select(diesel::dsl::count_star())
            .into_boxed();
        if featured {
            query = query.filter(games::is_featured.eq(true));
        }
        if new {
            query = query.filter(games::is_new.eq(true));
        }
        query.first(&mut conn).await
    }

    /// Number of active games.
    pub async fn count_active(&self) -> Result<i64, DieselError> {
        self.count_where(false, false).await
    }

    /// Number of active featured games.
    pub async fn count_featured(&self) -> Result<i64, DieselError> {
        self.count_where(true, false).await
    }

    /// Number of active games flagged new.
    pub async fn count_new(&self) -> Result<i64, DieselError> {
        self.count_where(false, true).await
    }

    /// Sum of `total_plays` across active games.
    pub async fn total_plays(&self) -> Result<i64, DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::sql_query(
            "SELECT COALESCE(SUM(total_plays), 0) AS total FROM games WHERE is_active = 1",
        )
        .get_result::<Total>(&mut conn)
        .await
        .map(|t| t.total)
    }

    async fn insert_in(
        conn: &mut AsyncSqliteConnection,
        game: &NewGame,
        category_id: i32,
    ) -> Result<i32, DieselError> {
        let now = Utc::now().to_rfc3339();
        let tags = to_json_column(&game.tags, "[]");
        let features = to_json_column(&game.features, "[]");
        let controls = to_json_column(&game.controls, "{}");
        let release_date = game.release_date.map(|d| d.to_rfc3339());

        diesel::insert_into(games::table)
            .values(NewCatalogGame {
                title: &game.title,
                slug: &game.slug,
                description: &game.description,
                long_description: game.long_description.as_deref(),
                thumbnail_url: game.thumbnail_url.as_deref(),
                game_url: &game.game_url,
                iframe_url: game.iframe_url.as_deref(),
                category_id,
                rating: game.rating,
                total_plays: game.total_plays,
                is_featured: game.is_featured,
                is_new: game.is_new,
                is_active: game.is_active,
                tags: &tags,
                features: &features,
                controls: &controls,
                release_date: release_date.as_deref(),
                created_at: &now,
                updated_at: &now,
            })
            .execute(conn)
            .await?;

        diesel::sql_query("SELECT last_insert_rowid()")
            .get_result::<LastInsertRowId>(conn)
            .await
            .map(|r| r.id as i32)
    }

    /// Insert a game and return it with its category.
    pub async fn create(&self, game: &NewGame) -> Result<Game, DieselError> {
        let id = {
            let mut conn = self.pool.get().await?;
            Self::insert_in(&mut conn, game, game.category_id).await?
        };
        self.get(id)
            .await?
            .ok_or(diesel::result::Error::NotFound)
    }

    /// Apply a partial update. Returns `None` when the game is missing.
    pub async fn update(&self, id: i32, changes: &GameUpdate) -> Result<Option<Game>, DieselError> {
        let rows = {
            let mut conn = self.pool.get().await?;
            diesel::update(games::table.find(id))
                .set(&changes.to_changeset())
                .execute(&mut conn)
                .await?
        };
        if rows == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Apply the same update to many games; returns the number changed.
    pub async fn bulk_update(&self, ids: &[i32], changes: &GameUpdate) -> Result<usize, DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::update(games::table.filter(games::id.eq_any(ids.to_vec())))
            .set(&changes.to_changeset())
            .execute(&mut conn)
            .await
    }

    /// Hide a game from public listings.
    pub async fn soft_delete(&self, id: i32) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();

        let rows = diesel::update(games::table.find(id))
            .set((games::is_active.eq(false), games::updated_at.eq(&now)))
            .execute(&mut conn)
            .await?;

        Ok(rows > 0)
    }

    /// Insert a scraped game, or fill the gaps of the game already using
    /// its slug. Category lookup and the game write share one transaction.
    pub async fn import_game(
        &self,
        game: &NewGame,
        category: &CategoryInput,
    ) -> Result<ImportOutcome, DieselError> {
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            Box::pin(async move {
                let existing: Option<CatalogGameRecord> = games::table
                    .filter(games::slug.eq(&game.slug))
                    .select(CatalogGameRecord::as_select())
                    .first(conn)
                    .await
                    .optional()?;

                if let Some(existing) = existing {
                    if let Some(changes) = fill_missing(&existing, game) {
                        diesel::update(games::table.find(existing.id))
                            .set(&changes)
                            .execute(conn)
                            .await?;
                    }
                    return Ok(ImportOutcome::Updated(existing.id));
                }

                let category_id = DieselCategoryRepository::get_or_create_in(
                    conn,
                    &category.name,
                    &category.slug,
                    category.description.as_deref().unwrap_or_default(),
                )
                .await?;

                let id = Self::insert_in(conn, game, category_id).await?;
                Ok(ImportOutcome::Inserted(id))
            })
        })
        .await
    }
}
