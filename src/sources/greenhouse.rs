//! Greenhouse board API adapter.
//!
//! Consumes the public board API at
//! `https://boards-api.greenhouse.io/v1/boards/{company}/jobs` and extracts
//! title, absolute URL, and location per job.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::Result;
use crate::models::Posting;
use crate::sources::{SourceAdapter, company_delay, get_text};

const SOURCE: &str = "Greenhouse";

/// Structured-response adapter for Greenhouse boards.
pub struct GreenhouseAdapter {
    companies: Vec<String>,
    delay_ms: u64,
}

impl GreenhouseAdapter {
    pub fn new(companies: Vec<String>, delay_ms: u64) -> Self {
        Self {
            companies,
            delay_ms,
        }
    }

    fn build_url(company: &str) -> String {
        format!("https://boards-api.greenhouse.io/v1/boards/{company}/jobs")
    }

    /// Extract postings from a parsed board response.
    ///
    /// Entries that fail posting validation (blank title, malformed URL)
    /// are dropped individually.
    fn parse_jobs(company: &str, root: &Value) -> Vec<Posting> {
        let Some(jobs) = root.get("jobs").and_then(Value::as_array) else {
            return Vec::new();
        };

        jobs.iter()
            .filter_map(|job| {
                let title = job.get("title").and_then(Value::as_str).unwrap_or("");
                let url = job.get("absolute_url").and_then(Value::as_str).unwrap_or("");
                let location = job
                    .pointer("/location/name")
                    .and_then(Value::as_str)
                    .unwrap_or("");

                Posting::new(SOURCE, company, title, url, location).ok()
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for GreenhouseAdapter {
    fn source(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, client: &Client) -> Result<Vec<Posting>> {
        let mut postings = Vec::new();

        for company in &self.companies {
            let url = Self::build_url(company);
            let body = get_text(client, &url, SOURCE).await?;

            if body.trim().is_empty() {
                log::warn!("{SOURCE}: empty response from {url}");
                company_delay(self.delay_ms).await;
                continue;
            }

            // Unknown slugs get an HTML error page; that is zero postings,
            // not a failure.
            match serde_json::from_str::<Value>(&body) {
                Ok(root) => {
                    let jobs = Self::parse_jobs(company, &root);
                    log::info!("{SOURCE} ({company}) returned {} postings", jobs.len());
                    postings.extend(jobs);
                }
                Err(_) => {
                    log::debug!("{SOURCE} ({company}) returned non-JSON body, skipping");
                }
            }

            company_delay(self.delay_ms).await;
        }

        Ok(postings)
    }
}
