//! Diesel-based category repository for SQLite.

use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::diesel_models::{CategoryRecord, NewCategory};
use super::diesel_pool::{AsyncSqliteConnection, AsyncSqlitePool, DieselError};
use super::{parse_datetime, LastInsertRowId};
use crate::models::Category;
use crate::schema::{categories, games};

/// Convert a database record to a domain model.
impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Category {
            id: record.id,
            name: record.name,
            slug: record.slug,
            description: record.description,
            created_at: parse_datetime(&record.created_at),
        }
    }
}

/// Fields for a new category.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// Partial category update. `None` leaves a column untouched.
#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = categories)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
}

impl CategoryUpdate {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.slug.is_none() && self.description.is_none()
    }
}

/// Diesel-based category repository.
#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: AsyncSqlitePool,
}

impl DieselCategoryRepository {
    /// Create a new category repository with an existing pool.
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get a category by ID.
    pub async fn get(&self, id: i32) -> Result<Option<Category>, DieselError> {
        let mut conn = self.pool.get().await?;

        categories::table
            .find(id)
            .first::<CategoryRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Category::from))
    }

    /// Get a category by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, DieselError> {
        let mut conn = self.pool.get().await?;

        categories::table
            .filter(categories::slug.eq(slug))
            .first::<CategoryRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Category::from))
    }

    /// All categories ordered by name.
    pub async fn list(&self) -> Result<Vec<Category>, DieselError> {
        let mut conn = self.pool.get().await?;

        categories::table
            .order(categories::name.asc())
            .load::<CategoryRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(Category::from).collect())
    }

    /// All categories ordered by name, each with its number of games.
    pub async fn list_with_counts(&self) -> Result<Vec<(Category, i64)>, DieselError> {
        let mut conn = self.pool.get().await?;

        let records = categories::table
            .order(categories::name.asc())
            .load::<CategoryRecord>(&mut conn)
            .await?;

        let counts: HashMap<i32, i64> = games::table
            .group_by(games::category_id)
            .select((games::category_id, diesel::dsl::count_star()))
            .load::<(i32, i64)>(&mut conn)
            .await?
            .into_iter()
            .collect();

        Ok(records
            .into_iter()
            .map(|r| {
                let count = counts.get(&r.id).copied().unwrap_or(0);
                (Category::from(r), count)
            })
            .collect())
    }

    /// Insert a category. A duplicate name or slug is a unique violation.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, DieselError> {
        let mut conn = self.pool.get().await?;
        let id = Self::insert(
            &mut conn,
            &input.name,
            &input.slug,
            input.description.as_deref(),
        )
        .await?;

        categories::table
            .find(id)
            .first::<CategoryRecord>(&mut conn)
            .await
            .map(Category::from)
    }

    /// Find a category by slug or create it, on an existing connection so
    /// it can take part in a caller's transaction.
    pub async fn get_or_create_in(
        conn: &mut AsyncSqliteConnection,
        name: &str,
        slug: &str,
        description: &str,
    ) -> Result<i32, DieselError> {
        let existing: Option<i32> = categories::table
            .filter(categories::slug.eq(slug).or(categories::name.eq(name)))
            .select(categories::id)
            .first(conn)
            .await
            .optional()?;

        match existing {
            Some(id) => Ok(id),
            None => Self::insert(conn, name, slug, Some(description)).await,
        }
    }

    async fn insert(
        conn: &mut AsyncSqliteConnection,
        name: &str,
        slug: &str,
        description: Option<&str>,
    ) -> Result<i32, DieselError> {
        let created_at = Utc::now().to_rfc3339();

        diesel::insert_into(categories::table)
            .values(NewCategory {
                name,
                slug,
                description,
                created_at: &created_at,
            })
            .execute(conn)
            .await?;

        diesel::sql_query("SELECT last_insert_rowid()")
            .get_result::<LastInsertRowId>(conn)
            .await
            .map(|r| r.id as i32)
    }

    /// Apply a partial update. Returns `None` when the category is missing.
    pub async fn update(
        &self,
        id: i32,
        changes: &CategoryUpdate,
    ) -> Result<Option<Category>, DieselError> {
        let mut conn = self.pool.get().await?;

        if !changes.is_empty() {
            let rows = diesel::update(categories::table.find(id))
                .set(changes)
                .execute(&mut conn)
                .await?;
            if rows == 0 {
                return Ok(None);
            }
        }

        categories::table
            .find(id)
            .first::<CategoryRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Category::from))
    }

    /// Delete a category.
    pub async fn delete(&self, id: i32) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::delete(categories::table.find(id))
            .execute(&mut conn)
            .await?;

        Ok(rows > 0)
    }

    /// Number of categories.
    pub async fn count(&self) -> Result<i64, DieselError> {
        let mut conn = self.pool.get().await?;

        categories::table
            .select(diesel::dsl::count_star())
            .first(&mut conn)
            .await
    }

    /// Number of games (active or not) in a category.
    pub async fn game_count(&self, id: i32) -> Result<i64, DieselError> {
        let mut conn = self.pool.get().await?;

        games::table
            .filter(games::category_id.eq(id))
            .select(diesel::dsl::count_star())
            .first(&mut conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::util::is_unique_violation;
    use crate::repository::DieselDbContext;
    use tempfile::tempdir;

    async fn setup_test_db() -> (DieselDbContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DieselDbContext::new(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        (ctx, dir)
    }

    fn input(name: &str, slug: &str) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            slug: slug.to_string(),
            description: Some(format!("Games in the {} category", name)),
        }
    }

    #[tokio::test]
    async fn test_category_crud() {
        let (ctx, _dir) = setup_test_db().await;
        let repo = ctx.categories();

        let created = repo.create(&input("Puzzle", "puzzle")).await.unwrap();
        assert_eq!(created.name, "Puzzle");

        let fetched = repo.get_by_slug("puzzle").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);

        let updated = repo
            .update(
                created.id,
                &CategoryUpdate {
                    name: Some("Puzzles".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Puzzles");
        assert_eq!(updated.slug, "puzzle");

        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let (ctx, _dir) = setup_test_db().await;
        let repo = ctx.categories();

        repo.create(&input("Action", "action")).await.unwrap();
        let err = repo.create(&input("Action 2", "action")).await.unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_update_missing_category() {
        let (ctx, _dir) = setup_test_db().await;
        let changes = CategoryUpdate {
            slug: Some("x".to_string()),
            ..Default::default()
        };
        assert!(ctx.categories().update(42, &changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_existing() {
        let (ctx, _dir) = setup_test_db().await;
        let mut conn = ctx.pool().get().await.unwrap();

        let first = DieselCategoryRepository::get_or_create_in(&mut conn, "Racing", "racing", "d")
            .await
            .unwrap();
        let second = DieselCategoryRepository::get_or_create_in(&mut conn, "Racing", "racing", "d")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(ctx.categories().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_with_counts_includes_empty_categories() {
        let (ctx, _dir) = setup_test_db().await;
        ctx.categories().create(&input("Empty", "empty")).await.unwrap();

        let listed = ctx.categories().list_with_counts().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].1, 0);
    }
}
