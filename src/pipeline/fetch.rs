// src/pipeline/fetch.rs

//! Concurrent fetch orchestration across all configured source adapters.
//!
//! Every adapter runs as its own task under a wall-time budget, with
//! transient failures retried before the adapter is written off. One
//! adapter failing, timing out, or exhausting its retries never aborts the
//! run; results fan in through `buffer_unordered` and the collector owns
//! the only aggregate.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;

use crate::error::Result;
use crate::models::{CrawlerConfig, Posting};
use crate::sources::SourceAdapter;
use crate::utils::http;

/// Per-adapter result of one orchestrated run.
#[derive(Debug, Clone)]
pub struct AdapterOutcome {
    /// Source name
    pub source: String,
    /// Postings contributed on success
    pub postings: usize,
    /// Attempts consumed, including the successful one
    pub attempts: u32,
    /// Failure reason after the retry cap, None on success
    pub error: Option<String>,
}

impl AdapterOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate of one orchestrated fetch run.
///
/// Postings are an unordered multiset; no ordering is guaranteed across
/// adapters.
#[derive(Debug, Default)]
pub struct FetchSummary {
    pub postings: Vec<Posting>,
    pub outcomes: Vec<AdapterOutcome>,
}

impl FetchSummary {
    /// Adapters that completed, zero postings included.
    pub fn sources_ok(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Adapters that exhausted their retries.
    pub fn sources_failed(&self) -> usize {
        self.outcomes.len() - self.sources_ok()
    }
}

/// Runs all configured adapters concurrently and aggregates their postings.
pub struct FetchOrchestrator {
    client: Client,
    task_timeout: Duration,
    max_retries: u32,
    backoff: Duration,
    concurrency: usize,
}

impl FetchOrchestrator {
    /// Build an orchestrator from crawler settings.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_client(config)?,
            task_timeout: Duration::from_secs(config.task_timeout_secs),
            max_retries: config.max_retries.max(1),
            backoff: Duration::from_millis(config.retry_backoff_ms),
            concurrency: config.max_concurrent.max(1),
        })
    }

    /// Execute every adapter and collect the union of their postings.
    ///
    /// Never fails as a whole: per-adapter failures surface only in the
    /// summary's outcomes. An empty adapter list yields an empty summary.
    pub async fn run_all(&self, adapters: &[Box<dyn SourceAdapter>]) -> FetchSummary {
        let mut summary = FetchSummary::default();

        let mut results = stream::iter(adapters)
            .map(|adapter| self.fetch_with_retry(adapter.as_ref()))
            .buffer_unordered(self.concurrency);

        while let Some((outcome, postings)) = results.next().await {
            match &outcome.error {
                None => log::info!(
                    "{} returned {} postings in {} attempt(s)",
                    outcome.source,
                    outcome.postings,
                    outcome.attempts
                ),
                Some(reason) => log::warn!(
                    "{} failed after {} attempt(s): {}",
                    outcome.source,
                    outcome.attempts,
                    reason
                ),
            }
            summary.postings.extend(postings);
            summary.outcomes.push(outcome);
        }

        log::info!(
            "Fetch completed: {} successful, {} failed, {} total postings",
            summary.sources_ok(),
            summary.sources_failed(),
            summary.postings.len()
        );

        summary
    }

    /// Run one adapter under the task timeout, retrying transient failures.
    async fn fetch_with_retry(
        &self,
        adapter: &dyn SourceAdapter,
    ) -> (AdapterOutcome, Vec<Posting>) {
        let source = adapter.source();
        let mut last_error = String::new();

        for attempt in 1..=self.max_retries {
            match tokio::time::timeout(self.task_timeout, adapter.fetch(&self.client)).await {
                Ok(Ok(postings)) => {
                    let outcome = AdapterOutcome {
                        source: source.to_string(),
                        postings: postings.len(),
                        attempts: attempt,
                        error: None,
                    };
                    return (outcome, postings);
                }
                Ok(Err(e)) => {
                    last_error = e.to_string();
                    log::warn!("{source} attempt {attempt}/{}: {e}", self.max_retries);
                }
                Err(_) => {
                    last_error = format!("timed out after {:?}", self.task_timeout);
                    log::warn!(
                        "{source} attempt {attempt}/{} timed out",
                        self.max_retries
                    );
                }
            }

            if attempt < self.max_retries {
                // Backoff grows with the attempt number; nothing is held
                // across this sleep.
                tokio::time::sleep(self.backoff * attempt).await;
            }
        }

        let outcome = AdapterOutcome {
            source: source.to_string(),
            postings: 0,
            attempts: self.max_retries,
            error: Some(last_error),
        };
        (outcome, Vec::new())
    }
}
