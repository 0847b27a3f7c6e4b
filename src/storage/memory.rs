//! In-memory storage backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::JobRecord;
use crate::storage::JobStore;

/// Map-backed store with no persistence. Used by tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, JobRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total record count, active or not.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn find_by_url(&self, url: &str) -> Result<Option<JobRecord>> {
        Ok(self.records.read().await.get(url).cloned())
    }

    async fn find_active(&self) -> Result<Vec<JobRecord>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.active)
            .cloned()
            .collect())
    }

    async fn find_active_last_seen_before(&self, cutoff: NaiveDate) -> Result<Vec<JobRecord>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.active && r.last_seen < cutoff)
            .cloned()
            .collect())
    }

    async fn save(&self, record: JobRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.url.clone(), record);
        Ok(())
    }

    async fn save_all(&self, records: Vec<JobRecord>) -> Result<()> {
        let mut map = self.records.write().await;
        for record in records {
            map.insert(record.url.clone(), record);
        }
        Ok(())
    }

    async fn count_active(&self) -> Result<usize> {
        Ok(self.records.read().await.values().filter(|r| r.active).count())
    }
}
