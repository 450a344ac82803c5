//! PostgreSQL implementation of the URL repository.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{StoreError, UrlRepository};

#[derive(sqlx::FromRow)]
struct UrlRow {
    id: String,
    user_id: String,
    short_url: String,
    original_url: String,
    is_deleted: bool,
    created_at: DateTime<Utc>,
}

impl From<UrlRow> for UrlRecord {
    fn from(row: UrlRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            short_url: row.short_url,
            original_url: row.original_url,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL repository backed by the `urls` table.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a repository over an existing pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Connects to `dsn` and applies embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the connection fails and
    /// [`StoreError::Migration`] if a migration cannot be applied.
    pub async fn connect(dsn: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(dsn)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::new(Arc::new(pool)))
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn save_url(&self, record: UrlRecord) -> Result<(), StoreError> {
        let inserted: Option<String> = sqlx::query_scalar(
            r#"
            INSERT INTO urls (id, user_id, short_url, original_url, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (original_url) DO NOTHING
            RETURNING short_url
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.short_url)
        .bind(&record.original_url)
        .bind(record.created_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        if inserted.is_some() {
            return Ok(());
        }

        let existing: String =
            sqlx::query_scalar("SELECT short_url FROM urls WHERE original_url = $1")
                .bind(&record.original_url)
                .fetch_one(self.pool.as_ref())
                .await?;

        Err(StoreError::Conflict {
            short_url: existing,
            original_url: record.original_url,
        })
    }

    async fn save_urls(&self, records: Vec<UrlRecord>) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query(
                r#"
                INSERT INTO urls (id, user_id, short_url, original_url, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (short_url) DO UPDATE SET original_url = EXCLUDED.original_url
                "#,
            )
            .bind(record.id)
            .bind(record.user_id)
            .bind(record.short_url)
            .bind(record.original_url)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn get_url(&self, short_url: &str) -> Result<Option<UrlRecord>, StoreError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, user_id, short_url, original_url, is_deleted, created_at
            FROM urls
            WHERE short_url = $1
            "#,
        )
        .bind(short_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn get_user_urls(&self, user_id: &str) -> Result<Vec<UrlRecord>, StoreError> {
        let rows = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, user_id, short_url, original_url, is_deleted, created_at
            FROM urls
            WHERE user_id = $1 AND NOT is_deleted
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(UrlRecord::from).collect())
    }

    async fn mark_urls_deleted(
        &self,
        user_id: &str,
        short_ids: &[String],
    ) -> Result<(), StoreError> {
        if short_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            UPDATE urls
            SET is_deleted = TRUE
            WHERE user_id = $1 AND short_url = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(short_ids.to_vec())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
