//! Storage backends for the URL repository.
//!
//! - [`MemoryUrlRepository`] - process-local, lost on restart
//! - [`FileUrlRepository`] - JSON file rewritten on every change
//! - [`PgUrlRepository`] - PostgreSQL via SQLx
//!
//! [`build_repository`] picks one from configuration.

mod file_url_repository;
mod memory_url_repository;
mod pg_url_repository;
mod record_set;

pub use file_url_repository::FileUrlRepository;
pub use memory_url_repository::MemoryUrlRepository;
pub use pg_url_repository::PgUrlRepository;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::domain::repositories::UrlRepository;

/// Builds the repository selected by `config`.
///
/// Priority: `DATABASE_DSN` (PostgreSQL), then `FILE_STORAGE_PATH` (file),
/// otherwise in-memory.
///
/// # Errors
///
/// Returns an error if the database is unreachable, a migration fails, or
/// the storage file cannot be loaded.
pub async fn build_repository(config: &Config) -> Result<Arc<dyn UrlRepository>> {
    if let Some(dsn) = &config.database_dsn {
        let repo = PgUrlRepository::connect(dsn, config.db_max_connections)
            .await
            .context("Failed to initialize database store")?;
        tracing::info!("Using PostgreSQL store");
        return Ok(Arc::new(repo));
    }

    if let Some(path) = &config.file_storage_path {
        let repo = FileUrlRepository::open(path)
            .await
            .with_context(|| format!("Failed to initialize file store at {path}"))?;
        tracing::info!(path = %path, "Using file store");
        return Ok(Arc::new(repo));
    }

    tracing::info!("Using in-memory store");
    Ok(Arc::new(MemoryUrlRepository::new()))
}
