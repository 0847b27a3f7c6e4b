//! Lever postings API adapter.
//!
//! Consumes `https://api.lever.co/v0/postings/{company}?mode=json`, a
//! top-level JSON array of postings.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::Result;
use crate::models::Posting;
use crate::sources::{SourceAdapter, company_delay, get_text};

const SOURCE: &str = "Lever";

/// Structured-response adapter for Lever postings.
pub struct LeverAdapter {
    companies: Vec<String>,
    delay_ms: u64,
}

impl LeverAdapter {
    pub fn new(companies: Vec<String>, delay_ms: u64) -> Self {
        Self {
            companies,
            delay_ms,
        }
    }

    fn build_url(company: &str) -> String {
        format!("https://api.lever.co/v0/postings/{company}?mode=json")
    }

    fn parse_jobs(company: &str, root: &Value) -> Vec<Posting> {
        let Some(entries) = root.as_array() else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                let title = entry.get("text").and_then(Value::as_str).unwrap_or("");
                let url = entry.get("hostedUrl").and_then(Value::as_str).unwrap_or("");
                if title.trim().is_empty() || url.trim().is_empty() {
                    return None;
                }

                let location = entry
                    .pointer("/categories/location")
                    .and_then(Value::as_str)
                    .unwrap_or("");

                Posting::new(SOURCE, company, title, url, location).ok()
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for LeverAdapter {
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
