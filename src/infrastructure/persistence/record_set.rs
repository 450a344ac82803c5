//! In-process record collection shared by the memory and file backends.

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::StoreError;

/// Ordered list of records with the lookup rules every backend follows.
#[derive(Debug, Default)]
pub(crate) struct RecordSet {
    records: Vec<UrlRecord>,
}

impl RecordSet {
    pub(crate) fn from_records(records: Vec<UrlRecord>) -> Self {
        Self { records }
    }

    pub(crate) fn records(&self) -> &[UrlRecord] {
        &self.records
    }

    /// Inserts a record unless its original URL is already stored.
    pub(crate) fn insert(&mut self, record: UrlRecord) -> Result<(), StoreError> {
        if let Some(existing) = self
            .records
            .iter()
            .find(|r| r.original_url == record.original_url)
        {
            return Err(StoreError::Conflict {
                short_url: existing.short_url.clone(),
                original_url: existing.original_url.clone(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    /// Inserts or replaces by short ID.
    pub(crate) fn upsert(&mut self, record: UrlRecord) {
        match self
            .records
            .iter_mut()
            .find(|r| r.short_url == record.short_url)
        {
            Some(existing) => existing.original_url = record.original_url,
            None => self.records.push(record),
        }
    }

    pub(crate) fn find(&self, short_url: &str) -> Option<UrlRecord> {
        self.records
            .iter()
            .find(|r| r.short_url == short_url)
            .cloned()
    }

    pub(crate) fn live_for_user(&self, user_id: &str) -> Vec<UrlRecord> {
        self.records
            .iter()
            .filter(|r| r.user_id == user_id && !r.is_deleted)
            .cloned()
            .collect()
    }

    /// Flags matching records as deleted. Returns how many changed state.
    pub(crate) fn mark_deleted(&mut self, user_id: &str, short_ids: &[String]) -> usize {
        let mut changed = 0;
        for record in self
            .records
            .iter_mut()
            .filter(|r| !r.is_deleted && r.matches_deletion(user_id, short_ids))
        {
            record.is_deleted = true;
            changed += 1;
        }
        changed
    }
}
