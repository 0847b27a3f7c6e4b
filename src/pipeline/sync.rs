// src/pipeline/sync.rs

//! Full sync cycle: fetch → filter → reconcile → expire → summary.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::error::Result;
use crate::filter::AdmissionFilter;
use crate::models::{AppConfig, SyncStats};
use crate::pipeline::{FetchOrchestrator, Reconciler};
use crate::sources::{SourceAdapter, build_adapters};
use crate::storage::JobStore;

/// Run one sync cycle with adapters built from configuration.
///
/// Always produces a summary: a cycle where every adapter failed still
/// reports zero counts plus the failure tally. Only a store failure aborts.
pub async fn run_sync(config: &AppConfig, store: Arc<dyn JobStore>) -> Result<SyncStats> {
    let adapters = build_adapters(config);
    run_sync_with(config, store, &adapters, Utc::now().date_naive()).await
}

/// Run one sync cycle against explicit adapters and an explicit date.
pub async fn run_sync_with(
    config: &AppConfig,
    store: Arc<dyn JobStore>,
    adapters: &[Box<dyn SourceAdapter>],
    today: NaiveDate,
) -> Result<SyncStats> {
    let filter = AdmissionFilter::new(&config.filter)?;
    let orchestrator = FetchOrchestrator::new(&config.crawler)?;
    let reconciler = Reconciler::new(store.clone());

    log::info!("Step 1/4: Fetching postings from {} sources", adapters.len());
    let summary = orchestrator.run_all(adapters).await;

    log::info!("Step 2/4: Applying admission filter");
    let admitted: Vec<_> = summary
        .postings
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect();
    log::info!(
        "Admitted {} of {} postings",
        admitted.len(),
        summary.postings.len()
    );

    log::info!("Step 3/4: Reconciling with the store");
    let (merge, expired) = reconciler
        .run_cycle(&admitted, today, config.crawler.retention_days)
        .await?;

    log::info!("Step 4/4: Expired {} stale records", expired);

    let mut stats = SyncStats {
        expired,
        total_active: store.count_active().await?,
        sources_ok: summary.sources_ok(),
        sources_failed: summary.sources_failed(),
        fetched: summary.postings.len(),
        admitted: admitted.len(),
        ..SyncStats::default()
    };
    stats.apply_merge(merge);

    log_summary(&stats);
    Ok(stats)
}

fn log_summary(stats: &SyncStats) {
    log::info!("Sync summary:");
    log::info!("  new:          {}", stats.new);
    log::info!("  updated:      {}", stats.updated);
    log::info!("  reactivated:  {}", stats.reactivated);
    log::info!("  expired:      {}", stats.expired);
    log::info!("  errors:       {}", stats.errors);
    log::info!("  total active: {}", stats.total_active);
    log::info!(
        "  sources:      {} ok, {} failed",
        stats.sources_ok,
        stats.sources_failed
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::Client;

    use crate::error::AppError;
    use crate::models::Posting;
    use crate::storage::MemoryStore;

    struct StubAdapter {
        name: &'static str,
        postings: Vec<Posting>,
    }

    #[async_trait]
    impl SourceAdapter for StubAdapter {
        fn source(&self) -> &'static str {
            self.name
        }

        async fn fetch(&self, _client: &Client) -> Result<Vec<Posting>> {
            Ok(self.postings.clone())
        }
    }

    struct BrokenAdapter;

    #[async_trait]
    impl SourceAdapter for BrokenAdapter {
        fn source(&self) -> &'static str {
            "Broken"
        }

        async fn fetch(&self, _client: &Client) -> Result<Vec<Posting>> {
            Err(AppError::fetch("Broken", "always down"))
        }
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.crawler.max_retries = 1;
        config.crawler.retry_backoff_ms = 1;
        config.filter.role_keywords = vec!["java".into()];
        config
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn posting(url: &str, title: &str, note: &str) -> Posting {
        Posting::new("Stub", "acme", title, url, note).unwrap()
    }

    #[tokio::test]
    async fn empty_source_list_completes_with_zero_stats() {
        let store = Arc::new(MemoryStore::new());
        let stats = run_sync_with(&config(), store, &[], date(2026, 8, 6))
            .await
            .unwrap();

        assert_eq!(stats, SyncStats::default());
    }

    #[tokio::test]
    async fn cycle_filters_reconciles_and_reports() {
        let store = Arc::new(MemoryStore::new());
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(StubAdapter {
                name: "A",
                postings: vec![
                    posting("https://a.co/1", "Java Backend", "Remote"),
                    posting("https://a.co/2", "JavaScript Frontend", "Remote"),
                ],
            }),
            Box::new(BrokenAdapter),
        ];

        let stats = run_sync_with(&config(), store.clone(), &adapters, date(2026, 8, 6))
            .await
            .unwrap();

        assert_eq!(stats.fetched, 2);
        assert_eq!(stats.admitted, 1);
        assert_eq!(stats.new, 1);
        assert_eq!(stats.sources_ok, 1);
        assert_eq!(stats.sources_failed, 1);
        assert_eq!(stats.total_active, 1);

        assert!(store.find_by_url("https://a.co/1").await.unwrap().is_some());
        assert!(store.find_by_url("https://a.co/2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn all_sources_failing_still_reports() {
        let store = Arc::new(MemoryStore::new());
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(BrokenAdapter)];

        let stats = run_sync_with(&config(), store, &adapters, date(2026, 8, 6))
            .await
            .unwrap();

        assert_eq!(stats.new, 0);
        assert_eq!(stats.sources_failed, 1);
    }
}
