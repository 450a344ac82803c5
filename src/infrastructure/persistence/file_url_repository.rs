//! File-backed implementation of the URL repository.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::record_set::RecordSet;
use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{StoreError, UrlRepository};

/// Keeps records in memory and rewrites a JSON file after every change.
///
/// The file holds a pretty-printed JSON array of [`UrlRecord`]. It is read
/// once on [`open`](Self::open); a missing or empty file starts an empty
/// store.
pub struct FileUrlRepository {
    path: PathBuf,
    records: Mutex<RecordSet>,
}

impl FileUrlRepository {
    /// Loads the store from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read and
    /// [`StoreError::Serialization`] if its contents are not a record array.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let records = match tokio::fs::read(&path).await {
            Ok(data) if data.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(data) => serde_json::from_slice(&data)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), records = records.len(), "Loaded file store");

        Ok(Self {
            path,
            records: Mutex::new(RecordSet::from_records(records)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, set: &RecordSet) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(set.records())?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

#[async_trait]
impl UrlRepository for FileUrlRepository {
    async fn save_url(&self, record: UrlRecord) -> Result<(), StoreError> {
        let mut set = self.records.lock().await;
        set.insert(record)?;
        self.persist(&set).await
    }

    async fn save_urls(&self, records: Vec<UrlRecord>) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        let mut set = self.records.lock().await;
        for record in records {
            set.upsert(record);
        }
        self.persist(&set).await
    }

    async fn get_url(&self, short_url: &str) -> Result<Option<UrlRecord>, StoreError> {
        Ok(self.records.lock().await.find(short_url))
    }

    async fn get_user_urls(&self, user_id: &str) -> Result<Vec<UrlRecord>, StoreError> {
        Ok(self.records.lock().await.live_for_user(user_id))
    }

    async fn mark_urls_deleted(
        &self,
        user_id: &str,
        short_ids: &[String],
    ) -> Result<(), StoreError> {
        let mut set = self.records.lock().await;
        if set.mark_deleted(user_id, short_ids) == 0 {
            return Ok(());
        }
        self.persist(&set).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
