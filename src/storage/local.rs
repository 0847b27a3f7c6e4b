//! Local filesystem storage implementation.
//!
//! Persists the full record set as a single JSON document (`jobs.json`).
//! Writes go to a temp file first and are renamed into place, so a crashed
//! cycle leaves the previous snapshot intact.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::JobRecord;
use crate::storage::JobStore;

const JOBS_FILE: &str = "jobs.json";

/// JSON-file storage backend rooted at a directory.
pub struct LocalStore {
    root_dir: PathBuf,
    records: RwLock<HashMap<String, JobRecord>>,
}

impl LocalStore {
    /// Open a store rooted at the given directory, loading `jobs.json` if
    /// it exists.
    pub async fn open(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root_dir = root_dir.into();
        let path = root_dir.join(JOBS_FILE);

        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let list: Vec<JobRecord> = serde_json::from_slice(&bytes)?;
                list.into_iter().map(|r| (r.url.clone(), r)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(AppError::Io(e)),
        };

        Ok(Self {
            root_dir,
            records: RwLock::new(records),
        })
    }

    /// Write the full record set atomically (write to temp, then rename).
    async fn flush(&self, records: &HashMap<String, JobRecord>) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let mut list: Vec<&JobRecord> = records.values().collect();
        // Stable on-disk order keeps snapshots diffable.
        list.sort_by(|a, b| a.url.cmp(&b.url));
        let bytes = serde_json::to_vec_pretty(&list)?;

        let path = self.root_dir.join(JOBS_FILE);
        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl JobStore for LocalStore {
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
        let mut map = self.records.write().await;
        map.insert(record.url.clone(), record);
        self.flush(&map).await
    }

    async fn save_all(&self, records: Vec<JobRecord>) -> Result<()> {
        let mut map = self.records.write().await;
        for record in records {
            map.insert(record.url.clone(), record);
        }
        self.flush(&map).await
    }

    async fn count_active(&self) -> Result<usize> {
        Ok(self.records.read().await.values().filter(|r| r.active).count())
    }
}
