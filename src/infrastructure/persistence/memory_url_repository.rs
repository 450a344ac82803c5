//! In-memory implementation of the URL repository.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::record_set::RecordSet;
use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{StoreError, UrlRepository};

/// Process-local storage. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryUrlRepository {
    records: RwLock<RecordSet>,
}

impl MemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn save_url(&self, record: UrlRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(record)
    }

    async fn save_urls(&self, records: Vec<UrlRecord>) -> Result<(), StoreError> {
        let mut set = self.records.write().await;
        for record in records {
            set.upsert(record);
        }
        Ok(())
    }

    async fn get_url(&self, short_url: &str) -> Result<Option<UrlRecord>, StoreError> {
        Ok(self.records.read().await.find(short_url))
    }

    async fn get_user_urls(&self, user_id: &str) -> Result<Vec<UrlRecord>, StoreError> {
        Ok(self.records.read().await.live_for_user(user_id))
    }

    async fn mark_urls_deleted(
        &self,
        user_id: &str,
        short_ids: &[String],
    ) -> Result<(), StoreError> {
        self.records.write().await.mark_deleted(user_id, short_ids);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, short: &str, original: &str) -> UrlRecord {
        UrlRecord::new(
            format!("id-{short}"),
            user.to_string(),
            short.to_string(),
            original.to_string(),
        )
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let repo = MemoryUrlRepository::new();
        repo.save_url(record("u1", "abc", "https://example.com/"))
            .await
            .unwrap();

        let found = repo.get_url("abc").await.unwrap().unwrap();
        assert_eq!(found.original_url, "https://example.com/");
        assert!(repo.get_url("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_url_conflict() {
        let repo = MemoryUrlRepository::new();
        repo.save_url(record("u1", "abc", "https://example.com/"))
            .await
            .unwrap();

        let result = repo
            .save_url(record("u1", "abc", "https://example.com/"))
            .await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_mark_deleted_is_idempotent_and_ignores_foreign_ids() {
        let repo = MemoryUrlRepository::new();
        repo.save_urls(vec![
            record("u1", "a", "https://a.example/"),
            record("u2", "b", "https://b.example/"),
        ])
        .await
        .unwrap();

        let ids = vec!["a".to_string(), "b".to_string(), "nope".to_string()];
        repo.mark_urls_deleted("u1", &ids).await.unwrap();
        repo.mark_urls_deleted("u1", &ids).await.unwrap();

        assert!(repo.get_url("a").await.unwrap().unwrap().is_deleted);
        assert!(!repo.get_url("b").await.unwrap().unwrap().is_deleted);
        assert!(repo.get_user_urls("u1").await.unwrap().is_empty());
    }
}
