//! Repository trait for short URL storage.

use crate::domain::entities::UrlRecord;
use async_trait::async_trait;

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The original URL is already shortened. Carries the existing short ID.
    #[error("conflict: short URL {short_url:?} already exists for {original_url:?}")]
    Conflict {
        short_url: String,
        original_url: String,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("storage file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage contract shared by the in-memory, file and PostgreSQL backends.
///
/// Every implementation must be safe for concurrent use: handlers and the
/// deletion pipeline call into it from many tasks at once.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryUrlRepository`]
/// - [`crate::infrastructure::persistence::FileUrlRepository`]
/// - [`crate::infrastructure::persistence::PgUrlRepository`]
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Stores a single record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the original URL is already stored,
    /// carrying the short ID it was stored under.
    async fn save_url(&self, record: UrlRecord) -> Result<(), StoreError>;

    /// Stores many records at once. Existing short IDs are overwritten.
    async fn save_urls(&self, records: Vec<UrlRecord>) -> Result<(), StoreError>;

    /// Looks up a record by short ID, including soft-deleted ones.
    async fn get_url(&self, short_url: &str) -> Result<Option<UrlRecord>, StoreError>;

    /// Lists the live records created by a user.
    async fn get_user_urls(&self, user_id: &str) -> Result<Vec<UrlRecord>, StoreError>;

    /// Soft-deletes the listed short IDs owned by `user_id`.
    ///
    /// IDs that do not exist or belong to someone else are ignored. Calling it
    /// again with the same arguments is a no-op.
    async fn mark_urls_deleted(&self, user_id: &str, short_ids: &[String])
    -> Result<(), StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
