// src/pipeline/reconcile.rs

//! Reconciliation of admitted postings against the persistent record set.
//!
//! Merges each admitted posting into the store keyed by URL (insert, update,
//! or reactivate), then sweeps records unobserved past the retention window
//! to inactive. Records are never deleted. A cycle lock serializes whole
//! passes against the store; fetch-orchestration concurrency never reaches
//! this layer.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{JobRecord, MergeStats, Posting};
use crate::storage::JobStore;

/// How one posting was folded into the store.
enum Merged {
    New,
    Updated,
    Reactivated,
}

/// Merges postings into the store and expires stale records.
pub struct Reconciler {
    store: Arc<dyn JobStore>,
    cycle_lock: Mutex<()>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Merge a batch of admitted postings into the store.
    ///
    /// Safe to re-run with the same input: the second pass produces the
    /// identical end state, counting the postings as `updated` instead of
    /// `new`. An invalid posting is skipped and counted; a store failure
    /// aborts the cycle.
    pub async fn reconcile(&self, postings: &[Posting], today: NaiveDate) -> Result<MergeStats> {
        let _cycle = self.cycle_lock.lock().await;
        self.merge_batch(postings, today).await
    }

    /// Sweep active records unobserved past the retention window.
    ///
    /// Returns the number of records deactivated. Running it again in the
    /// same cycle expires nothing extra.
    pub async fn expire(&self, today: NaiveDate, retention_days: u32) -> Result<usize> {
        let _cycle = self.cycle_lock.lock().await;
        self.expire_stale(today, retention_days).await
    }

    /// Run merge and sweep under one cycle lock.
    pub async fn run_cycle(
        &self,
        postings: &[Posting],
        today: NaiveDate,
        retention_days: u32,
    ) -> Result<(MergeStats, usize)> {
        let _cycle = self.cycle_lock.lock().await;
        let stats = self.merge_batch(postings, today).await?;
        let expired = self.expire_stale(today, retention_days).await?;
        Ok((stats, expired))
    }

    async fn merge_batch(&self, postings: &[Posting], today: NaiveDate) -> Result<MergeStats> {
        let mut stats = MergeStats::default();

        for posting in postings {
            match self.merge_one(posting, today).await {
                Ok(Merged::New) => stats.new += 1,
                Ok(Merged::Updated) => stats.updated += 1,
                Ok(Merged::Reactivated) => stats.reactivated += 1,
                Err(AppError::Posting(reason)) => {
                    log::warn!("Skipping posting {:?}: {reason}", posting.url);
                    stats.errors += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(stats)
    }

    async fn merge_one(&self, posting: &Posting, today: NaiveDate) -> Result<Merged> {
        // Adapters construct validated postings, but batches can arrive
        // from deserialized input; re-check the identity key here.
        let url = posting.url.trim();
        if url.is_empty() {
            return Err(AppError::posting("blank URL"));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::posting("URL missing http(s) scheme"));
        }

        match self.store.find_by_url(url).await? {
            None => {
                let mut record = JobRecord::from_posting(posting, today);
                record.url = url.to_string();
                self.store.save(record).await?;
                Ok(Merged::New)
            }
            Some(mut existing) => {
                let merged = if existing.active {
                    Merged::Updated
                } else {
                    existing.active = true;
                    Merged::Reactivated
                };

                existing.last_seen = today;

                // The latest observation wins for descriptive fields.
                existing.source = posting.source.clone();
                existing.company = posting.company.clone();
                existing.title = posting.title.clone();

                // status and notes belong to the user once set; a blank
                // value from a re-fetch never clobbers them.
                if let Some(status) = posting.status.as_deref() {
                    if !status.trim().is_empty() {
                        existing.status = status.trim().to_string();
                    }
                }
                if !posting.note.trim().is_empty() {
                    existing.notes = posting.note.clone();
                }

                self.store.save(existing).await?;
                Ok(merged)
            }
        }
    }

    async fn expire_stale(&self, today: NaiveDate, retention_days: u32) -> Result<usize> {
        let cutoff = today - chrono::Duration::days(i64::from(retention_days));
        let mut stale = self.store.find_active_last_seen_before(cutoff).await?;

        for record in &mut stale {
            record.active = false;
        }

        let count = stale.len();
        if count > 0 {
            self.store.save_all(stale).await?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_STATUS;
    use crate::storage::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn posting(url: &str, title: &str, note: &str) -> Posting {
        Posting::new("Test", "acme", title, url, note).unwrap()
    }

    fn reconciler() -> (Reconciler, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Reconciler::new(store.clone()), store)
    }

    #[tokio::test]
    async fn first_observation_creates_records() {
        let (reconciler, store) = reconciler();
        let today = date(2026, 8, 6);
        let batch = vec![
            posting("https://a.co/1", "Java Backend", "Remote"),
            posting("https://a.co/2", "Java Platform", "Remote"),
        ];

        let stats = reconciler.reconcile(&batch, today).await.unwrap();

        assert_eq!(stats.new, 2);
        assert_eq!(stats.updated, 0);

        let record = store.find_by_url("https://a.co/1").await.unwrap().unwrap();
        assert!(record.active);
        assert_eq!(record.status, DEFAULT_STATUS);
        assert_eq!(record.first_seen, today);
        assert_eq!(record.last_seen, today);
    }

    #[tokio::test]
    async fn replay_is_idempotent() {
        let (reconciler, store) = reconciler();
        let today = date(2026, 8, 6);
        let batch = vec![
            posting("https://a.co/1", "Java Backend", "Remote"),
            posting("https://a.co/2", "Java Platform", "Remote"),
            posting("https://a.co/3", "Java Data", "Remote"),
        ];

        let first = reconciler.reconcile(&batch, today).await.unwrap();
        assert_eq!(first.new, 3);
        assert_eq!(first.updated, 0);

        let second = reconciler.reconcile(&batch, today).await.unwrap();
        assert_eq!(second.new, 0);
        assert_eq!(second.updated, 3);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn reappearing_record_is_reactivated_not_new() {
        let (reconciler, store) = reconciler();
        let earlier = date(2026, 6, 1);
        let today = date(2026, 8, 6);

        reconciler
            .reconcile(&[posting("https://a.co/1", "Java Backend", "")], earlier)
            .await
            .unwrap();

        let mut record = store.find_by_url("https://a.co/1").await.unwrap().unwrap();
        record.active = false;
        store.save(record).await.unwrap();

        let stats = reconciler
            .reconcile(&[posting("https://a.co/1", "Java Backend", "")], today)
            .await
            .unwrap();

        assert_eq!(stats.reactivated, 1);
        assert_eq!(stats.new, 0);

        let record = store.find_by_url("https://a.co/1").await.unwrap().unwrap();
        assert!(record.active);
        assert_eq!(record.first_seen, earlier);
        assert_eq!(record.last_seen, today);
    }

    #[tokio::test]
    async fn blank_refetch_never_clobbers_user_fields() {
        let (reconciler, store) = reconciler();
        let today = date(2026, 8, 6);

        reconciler
            .reconcile(&[posting("https://a.co/1", "Java Backend", "Remote")], today)
            .await
            .unwrap();

        let mut record = store.find_by_url("https://a.co/1").await.unwrap().unwrap();
        record.status = "Interviewing".to_string();
        record.notes = "Spoke to recruiter".to_string();
        store.save(record).await.unwrap();

        // Re-fetch carries no status and a blank note.
        reconciler
            .reconcile(&[posting("https://a.co/1", "Java Backend", "")], today)
            .await
            .unwrap();

        let record = store.find_by_url("https://a.co/1").await.unwrap().unwrap();
        assert_eq!(record.status, "Interviewing");
        assert_eq!(record.notes, "Spoke to recruiter");
    }

    #[tokio::test]
    async fn non_blank_override_applies() {
        let (reconciler, store) = reconciler();
        let today = date(2026, 8, 6);

        reconciler
            .reconcile(&[posting("https://a.co/1", "Java Backend", "Remote")], today)
            .await
            .unwrap();

        let update = posting("https://a.co/1", "Java Backend", "Hybrid Berlin")
            .with_status("Applied");
        reconciler.reconcile(&[update], today).await.unwrap();

        let record = store.find_by_url("https://a.co/1").await.unwrap().unwrap();
        assert_eq!(record.status, "Applied");
        assert_eq!(record.notes, "Hybrid Berlin");
    }

    #[tokio::test]
    async fn invalid_posting_is_skipped_not_fatal() {
        let (reconciler, store) = reconciler();
        let today = date(2026, 8, 6);

        // Bypass the validating constructor the way deserialized input can.
        let bad: Posting = serde_json::from_value(serde_json::json!({
            "source": "Test",
            "company": "acme",
            "title": "Ghost",
            "url": "   ",
            "note": ""
        }))
        .unwrap();

        let batch = vec![bad, posting("https://a.co/1", "Java Backend", "Remote")];
        let stats = reconciler.reconcile(&batch, today).await.unwrap();

        assert_eq!(stats.errors, 1);
        assert_eq!(stats.new, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn expire_respects_the_retention_boundary() {
        let (reconciler, store) = reconciler();
        let today = date(2026, 8, 6);
        let retention = 30;

        reconciler
            .reconcile(
                &[posting("https://a.co/stale", "Old Java", "Remote")],
                today - chrono::Duration::days(31),
            )
            .await
            .unwrap();
        reconciler
            .reconcile(
                &[posting("https://a.co/fresh", "New Java", "Remote")],
                today - chrono::Duration::days(29),
            )
            .await
            .unwrap();

        let expired = reconciler.expire(today, retention).await.unwrap();
        assert_eq!(expired, 1);

        let stale = store.find_by_url("https://a.co/stale").await.unwrap().unwrap();
        assert!(!stale.active);
        let fresh = store.find_by_url("https://a.co/fresh").await.unwrap().unwrap();
        assert!(fresh.active);

        // Second sweep in the same cycle expires nothing extra.
        let again = reconciler.expire(today, retention).await.unwrap();
        assert_eq!(again, 0);
    }

    #[tokio::test]
    async fn boundary_date_is_not_expired() {
        let (reconciler, _store) = reconciler();
        let today = date(2026, 8, 6);

        // Exactly retention_days old: strictly-before cutoff spares it.
        reconciler
            .reconcile(
                &[posting("https://a.co/edge", "Edge Java", "Remote")],
                today - chrono::Duration::days(30),
            )
            .await
            .unwrap();

        assert_eq!(reconciler.expire(today, 30).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concrete_admission_scenario() {
        let (reconciler, store) = reconciler();
        let today = date(2026, 8, 6);

        let stats = reconciler
            .reconcile(&[posting("https://a.co/1", "Java Backend", "Remote")], today)
            .await
            .unwrap();

        assert_eq!(stats.new, 1);
        let record = store.find_by_url("https://a.co/1").await.unwrap().unwrap();
        assert!(record.active);
        assert_eq!(record.status, "Awaiting");
    }

    #[tokio::test]
    async fn store_failure_aborts_the_cycle() {
        struct BrokenStore;

        #[async_trait::async_trait]
        impl JobStore for BrokenStore {
            async fn find_by_url(&self, _url: &str) -> crate::error::Result<Option<JobRecord>> {
                Err(AppError::store("connection refused"))
            }
            async fn find_active(&self) -> crate::error::Result<Vec<JobRecord>> {
                Err(AppError::store("connection refused"))
            }
            async fn find_active_last_seen_before(
                &self,
                _cutoff: NaiveDate,
            ) -> crate::error::Result<Vec<JobRecord>> {
                Err(AppError::store("connection refused"))
            }
            async fn save(&self, _record: JobRecord) -> crate::error::Result<()> {
                Err(AppError::store("connection refused"))
            }
            async fn save_all(&self, _records: Vec<JobRecord>) -> crate::error::Result<()> {
                Err(AppError::store("connection refused"))
            }
            async fn count_active(&self) -> crate::error::Result<usize> {
                Err(AppError::store("connection refused"))
            }
        }

        let reconciler = Reconciler::new(Arc::new(BrokenStore));
        let result = reconciler
            .reconcile(
                &[posting("https://a.co/1", "Java Backend", "Remote")],
                date(2026, 8, 6),
            )
            .await;

        assert!(matches!(result, Err(AppError::Store(_))));
    }

    #[tokio::test]
    async fn run_cycle_merges_then_expires() {
        let (reconciler, store) = reconciler();
        let today = date(2026, 8, 6);

        reconciler
            .reconcile(
                &[posting("https://a.co/old", "Old Java", "Remote")],
                today - chrono::Duration::days(40),
            )
            .await
            .unwrap();

        let (stats, expired) = reconciler
            .run_cycle(&[posting("https://a.co/1", "Java Backend", "Remote")], today, 30)
            .await
            .unwrap();

        assert_eq!(stats.new, 1);
        assert_eq!(expired, 1);
        assert_eq!(store.count_active().await.unwrap(), 1);
    }
}
