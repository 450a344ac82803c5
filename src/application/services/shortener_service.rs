//! URL shortening, resolution and deletion service.

use std::sync::Arc;

use serde_json::json;

use crate::domain::deletion::BatchDeleter;
use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{StoreError, UrlRepository};
use crate::error::AppError;
use crate::utils::id_generator::{random_id, short_id};
use crate::utils::url_normalizer::normalize_url;

/// Result of shortening a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortened {
    /// A new mapping was stored.
    Created(String),
    /// The URL was already shortened; carries the existing short URL.
    Existing(String),
}

impl Shortened {
    pub fn short_url(&self) -> &str {
        match self {
            Shortened::Created(url) | Shortened::Existing(url) => url,
        }
    }
}

/// One entry of a batch shortening request.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub correlation_id: String,
    pub original_url: String,
}

/// One entry of a batch shortening result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub correlation_id: String,
    pub short_url: String,
}

/// Service behind every HTTP endpoint.
///
/// Short IDs are derived from the normalized URL, so shortening the same URL
/// twice yields the same ID. Deletions are handed to the [`BatchDeleter`] and
/// applied asynchronously.
pub struct ShortenerService {
    repository: Arc<dyn UrlRepository>,
    deleter: Arc<BatchDeleter>,
    base_url: String,
}

impl ShortenerService {
    /// Creates a new shortener service.
    ///
    /// `base_url` prefixes every returned short URL; a trailing slash is
    /// stripped.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        deleter: Arc<BatchDeleter>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            repository,
            deleter,
            base_url,
        }
    }

    /// Full short URL for a short ID.
    pub fn short_url(&self, short_id: &str) -> String {
        format!("{}/{}", self.base_url, short_id)
    }

    /// Shortens `original_url` on behalf of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is invalid and
    /// [`AppError::Internal`] on storage failures. An already shortened URL
    /// is not an error: it yields [`Shortened::Existing`].
    pub async fn shorten(&self, user_id: &str, original_url: &str) -> Result<Shortened, AppError> {
        let normalized = normalize_url(original_url)?;
        let id = short_id(&normalized);
        let record = UrlRecord::new(random_id(), user_id.to_string(), id.clone(), normalized);

        match self.repository.save_url(record).await {
            Ok(()) => Ok(Shortened::Created(self.short_url(&id))),
            Err(StoreError::Conflict { short_url, .. }) => {
                Ok(Shortened::Existing(self.short_url(&short_url)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Shortens a batch of URLs in one storage call.
    ///
    /// The batch is all-or-nothing: if any URL is invalid nothing is stored
    /// and every invalid entry is reported.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty batch or any invalid URL.
    pub async fn shorten_batch(
        &self,
        user_id: &str,
        entries: Vec<BatchEntry>,
    ) -> Result<Vec<BatchResult>, AppError> {
        if entries.is_empty() {
            return Err(AppError::bad_request("Batch is empty", json!({})));
        }

        let mut records = Vec::with_capacity(entries.len());
        let mut results = Vec::with_capacity(entries.len());
        let mut invalid = Vec::new();

        for entry in entries {
            match normalize_url(&entry.original_url) {
                Ok(normalized) => {
                    let id = short_id(&normalized);
                    results.push(BatchResult {
                        correlation_id: entry.correlation_id,
                        short_url: self.short_url(&id),
                    });
                    records.push(UrlRecord::new(
                        random_id(),
                        user_id.to_string(),
                        id,
                        normalized,
                    ));
                }
                Err(e) => invalid.push(json!({
                    "correlation_id": entry.correlation_id,
                    "reason": e.to_string(),
                })),
            }
        }

        if !invalid.is_empty() {
            return Err(AppError::bad_request(
                "Batch contains invalid URLs",
                json!({ "invalid": invalid }),
            ));
        }

        self.repository.save_urls(records).await?;
        tracing::debug!(user_id = %user_id, count = results.len(), "Batch shortened");

        Ok(results)
    }

    /// Resolves a short ID to its original URL.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the ID is empty or unknown
    /// - [`AppError::Gone`] if the URL was deleted by its owner
    pub async fn resolve(&self, short_id: &str) -> Result<String, AppError> {
        if short_id.is_empty() {
            return Err(AppError::bad_request("Short ID is empty", json!({})));
        }

        let record = self
            .repository
            .get_url(short_id)
            .await?
            .ok_or_else(|| AppError::bad_request("Short URL not found", json!({ "id": short_id })))?;

        if record.is_deleted {
            return Err(AppError::gone(
                "Short URL was deleted",
                json!({ "id": short_id }),
            ));
        }

        Ok(record.original_url)
    }

    /// Lists the live URLs created by `user_id`.
    pub async fn user_urls(&self, user_id: &str) -> Result<Vec<UrlRecord>, AppError> {
        Ok(self.repository.get_user_urls(user_id).await?)
    }

    /// Checks that storage is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        Ok(self.repository.ping().await?)
    }

    /// Queues soft-deletion of `short_ids` owned by `user_id`.
    ///
    /// Returns once the request is queued. IDs the user does not own are
    /// ignored when the batch is applied.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty ID list and
    /// [`AppError::Internal`] if the deleter has been closed.
    pub async fn delete_urls(&self, user_id: &str, short_ids: Vec<String>) -> Result<(), AppError> {
        let count = short_ids.len();
        self.deleter.enqueue(user_id, short_ids).await?;
        tracing::debug!(user_id = %user_id, count, "Deletion queued");
        Ok(())
    }
}
