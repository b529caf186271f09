use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;
use thiserror::Error;

use tally_core::{
    Category, CategoryId, GlobalMerchantPattern, MerchantPattern, UserId, CATEGORY_COLORS,
    DEFAULT_CATEGORIES,
};

pub type DbPool = Pool<Sqlite>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("unknown category id {0}")]
    UnknownCategory(CategoryId),
}

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA cache_size = -32000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            icon TEXT NOT NULL,
            color TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS merchants (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name_pattern TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            match_count INTEGER NOT NULL DEFAULT 1,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (category_id) REFERENCES categories(id),
            UNIQUE (user_id, name_pattern)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS merchants_global (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name_pattern TEXT NOT NULL UNIQUE,
            category_id INTEGER NOT NULL,
            FOREIGN KEY (category_id) REFERENCES categories(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn seed_default_categories(pool: &DbPool) -> Result<(), sqlx::Error> {
    for (i, (name, icon)) in DEFAULT_CATEGORIES.iter().enumerate() {
        let color = CATEGORY_COLORS[i % CATEGORY_COLORS.len()];
        sqlx::query("INSERT OR IGNORE INTO categories (name, icon, color) VALUES (?, ?, ?)")
            .bind(name)
            .bind(icon)
            .bind(color)
            .execute(pool)
            .await?;
    }

    Ok(())
}

pub async fn get_categories(pool: &DbPool) -> Result<Vec<Category>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, String, String)>(
        "SELECT id, name, icon, color FROM categories ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| Category {
            id: CategoryId(r.0),
            name: r.1,
            icon: r.2,
            color: r.3,
        })
        .collect())
}

/// Bulk fetch of one user's learned patterns. Called once per batch, never
/// per transaction.
pub async fn get_user_patterns(
    pool: &DbPool,
    user: UserId,
) -> Result<Vec<MerchantPattern>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, i64, i64, DateTime<Utc>)>(
        "SELECT user_id, name_pattern, category_id, match_count, updated_at
         FROM merchants WHERE user_id = ? ORDER BY match_count DESC, name_pattern",
    )
    .bind(user.0)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| MerchantPattern {
            user_id: UserId(r.0),
            name_pattern: r.1,
            category_id: CategoryId(r.2),
            match_count: r.3,
            updated_at: r.4,
        })
        .collect())
}

pub async fn get_global_patterns(pool: &DbPool) -> Result<Vec<GlobalMerchantPattern>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT name_pattern, category_id FROM merchants_global ORDER BY name_pattern",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| GlobalMerchantPattern {
            name_pattern: r.0,
            category_id: CategoryId(r.1),
        })
        .collect())
}

/// Records a user correction as a learned pattern. The stored key goes
/// through the same extraction and normalization as matching, so it is
/// found again by the exact tier.
///
/// Upserts atomically on (user_id, name_pattern): re-learning the same
/// merchant bumps match_count and moves the pattern to the corrected
/// category, so the most recent correction wins. Returns `Ok(None)` when
/// the description yields no usable key.
pub async fn learn_merchant_pattern(
    pool: &DbPool,
    user: UserId,
    description: &str,
    category_id: CategoryId,
) -> Result<Option<MerchantPattern>, StoreError> {
    let Some(key) = tally_match::learn_key(description) else {
        tracing::debug!(description, "no learnable key in description");
        return Ok(None);
    };

    let known: Option<(i64,)> = sqlx::query_as("SELECT id FROM categories WHERE id = ?")
        .bind(category_id.0)
        .fetch_optional(pool)
        .await?;
    if known.is_none() {
        return Err(StoreError::UnknownCategory(category_id));
    }

    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO merchants (user_id, name_pattern, category_id, match_count, updated_at)
        VALUES (?, ?, ?, 1, ?)
        ON CONFLICT (user_id, name_pattern) DO UPDATE SET
            category_id = excluded.category_id,
            match_count = merchants.match_count + 1,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user.0)
    .bind(&key)
    .bind(category_id.0)
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    let row = sqlx::query_as::<_, (i64, String, i64, i64, DateTime<Utc>)>(
        "SELECT user_id, name_pattern, category_id, match_count, updated_at
         FROM merchants WHERE user_id = ? AND name_pattern = ?",
    )
    .bind(user.0)
    .bind(&key)
    .fetch_one(pool)
    .await?;

    tracing::debug!(user = %user, pattern = %row.1, match_count = row.3, "learned merchant pattern");

    Ok(Some(MerchantPattern {
        user_id: UserId(row.0),
        name_pattern: row.1,
        category_id: CategoryId(row.2),
        match_count: row.3,
        updated_at: row.4,
    }))
}

/// Adds a curated pattern to the global store. The pattern is normalized
/// before storage so it lines up with the matching side.
pub async fn insert_global_pattern(
    pool: &DbPool,
    pattern: &str,
    category_id: CategoryId,
) -> Result<(), StoreError> {
    let key = tally_match::normalize(pattern);
    if key.chars().count() < 2 {
        return Ok(());
    }

    let known: Option<(i64,)> = sqlx::query_as("SELECT id FROM categories WHERE id = ?")
        .bind(category_id.0)
        .fetch_optional(pool)
        .await?;
    if known.is_none() {
        return Err(StoreError::UnknownCategory(category_id));
    }

    sqlx::query(
        r#"
        INSERT INTO merchants_global (name_pattern, category_id)
        VALUES (?, ?)
        ON CONFLICT (name_pattern) DO UPDATE SET category_id = excluded.category_id
        "#,
    )
    .bind(&key)
    .bind(category_id.0)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn test_db(dir: &tempfile::TempDir) -> DbPool {
        let pool = create_db(&dir.path().join("test.db")).await.unwrap();
        seed_default_categories(&pool).await.unwrap();
        pool
    }

    fn category_named(categories: &[Category], name: &str) -> CategoryId {
        categories.iter().find(|c| c.name == name).unwrap().id
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let dir = tempdir().unwrap();
        let pool = test_db(&dir).await;

        seed_default_categories(&pool).await.unwrap();
        let categories = get_categories(&pool).await.unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
        assert!(categories.iter().any(|c| c.name == "Other"));
    }

    #[tokio::test]
    async fn learning_upserts_on_repeat_corrections() {
        let dir = tempdir().unwrap();
        let pool = test_db(&dir).await;
        let categories = get_categories(&pool).await.unwrap();
        let restaurants = category_named(&categories, "Restaurants");
        let groceries = category_named(&categories, "Groceries");
        let user = UserId(1);

        let first = learn_merchant_pattern(&pool, user, "STARBUCKS COFFEE #4512", restaurants)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.name_pattern, "starbucks coffee");
        assert_eq!(first.match_count, 1);

        // Same merchant, different category: one row, count bumped, newest wins.
        let second = learn_merchant_pattern(&pool, user, "Starbucks Coffee #9901", groceries)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.name_pattern, "starbucks coffee");
        assert_eq!(second.match_count, 2);
        assert_eq!(second.category_id, groceries);

        let patterns = get_user_patterns(&pool, user).await.unwrap();
        assert_eq!(patterns.len(), 1);
    }

    #[tokio::test]
    async fn learning_is_scoped_per_user() {
        let dir = tempdir().unwrap();
        let pool = test_db(&dir).await;
        let categories = get_categories(&pool).await.unwrap();
        let restaurants = category_named(&categories, "Restaurants");

        learn_merchant_pattern(&pool, UserId(1), "WOLT TBILISI", restaurants)
            .await
            .unwrap();

        assert_eq!(get_user_patterns(&pool, UserId(1)).await.unwrap().len(), 1);
        assert!(get_user_patterns(&pool, UserId(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn degenerate_description_learns_nothing() {
        let dir = tempdir().unwrap();
        let pool = test_db(&dir).await;
        let categories = get_categories(&pool).await.unwrap();
        let other = category_named(&categories, "Other");

        let learned = learn_merchant_pattern(&pool, UserId(1), "1234", other)
            .await
            .unwrap();
        assert!(learned.is_none());
        assert!(get_user_patterns(&pool, UserId(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let dir = tempdir().unwrap();
        let pool = test_db(&dir).await;

        let err = learn_merchant_pattern(&pool, UserId(1), "STARBUCKS", CategoryId(999))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownCategory(CategoryId(999))));
    }

    #[tokio::test]
    async fn global_patterns_are_normalized_and_upserted() {
        let dir = tempdir().unwrap();
        let pool = test_db(&dir).await;
        let categories = get_categories(&pool).await.unwrap();
        let groceries = category_named(&categories, "Groceries");
        let restaurants = category_named(&categories, "Restaurants");

        insert_global_pattern(&pool, "Carrefour LLC", groceries).await.unwrap();
        insert_global_pattern(&pool, "CARREFOUR", restaurants).await.unwrap();

        let patterns = get_global_patterns(&pool).await.unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].name_pattern, "carrefour");
        assert_eq!(patterns[0].category_id, restaurants);
    }
}
