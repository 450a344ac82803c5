//! Stored mapping between a short identifier and its original URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shortened URL owned by a user.
///
/// Records are never removed from storage. Deletion sets `is_deleted`,
/// after which redirects for the short ID answer `410 Gone`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub id: String,
    pub user_id: String,
    pub short_url: String,
    pub original_url: String,
    #[serde(default)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Creates a live record stamped with the current time.
    pub fn new(id: String, user_id: String, short_url: String, original_url: String) -> Self {
        Self {
            id,
            user_id,
            short_url,
            original_url,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    /// Returns true if the record belongs to `user_id` and its short ID is listed.
    pub fn matches_deletion(&self, user_id: &str, short_ids: &[String]) -> bool {
        self.user_id == user_id && short_ids.iter().any(|id| id == &self.short_url)
    }
}
