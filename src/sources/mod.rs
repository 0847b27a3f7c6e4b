//! Source adapters for external job boards.
//!
//! Each adapter fetches postings for its configured companies from one ATS
//! provider family. Adapters are stateless between invocations: all per-run
//! state lives in locals, and nothing is retained across calls.
//!
//! Error contract: transport failures (connect, timeout, non-2xx) propagate
//! so the orchestrator can retry the adapter; a response that fails to parse
//! is zero postings for that company, not an error, because providers serve
//! error pages for unknown company slugs.

pub mod breezy;
pub mod greenhouse;
pub mod lever;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{AppConfig, Posting, Provider};

pub use breezy::BreezyAdapter;
pub use greenhouse::GreenhouseAdapter;
pub use lever::LeverAdapter;

/// Capability interface for one posting source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Human-readable source name (e.g. "Greenhouse").
    fn source(&self) -> &'static str;

    /// Fetch all postings for this source's configured companies.
    async fn fetch(&self, client: &Client) -> Result<Vec<Posting>>;
}

/// Build the adapter registry from configuration.
///
/// One adapter per `[[sources]]` entry, in config order.
pub fn build_adapters(config: &AppConfig) -> Vec<Box<dyn SourceAdapter>> {
    let delay_ms = config.crawler.request_delay_ms;
    config
        .sources
        .iter()
        .map(|source| -> Box<dyn SourceAdapter> {
            match source.provider {
                Provider::Greenhouse => {
                    Box::new(GreenhouseAdapter::new(source.companies.clone(), delay_ms))
                }
                Provider::Lever => Box::new(LeverAdapter::new(source.companies.clone(), delay_ms)),
                Provider::Breezy => {
                    Box::new(BreezyAdapter::new(source.companies.clone(), delay_ms))
                }
            }
        })
        .collect()
}

/// Pause between per-company requests within an adapter.
pub(crate) async fn company_delay(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
    }
}

/// GET a URL and return its body, tagging transport failures with the
/// source name so the orchestrator's outcome log reads cleanly.
pub(crate) async fn get_text(client: &Client, url: &str, source: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::fetch(source, e))?;
    response.text().await.map_err(|e| AppError::fetch(source, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceConfig;

    #[test]
    fn registry_follows_config_order() {
        let config = AppConfig {
            sources: vec![
                SourceConfig {
                    provider: Provider::Lever,
                    companies: vec!["acme".into()],
                },
                SourceConfig {
                    provider: Provider::Greenhouse,
                    companies: vec!["globex".into()],
                },
                SourceConfig {
                    provider: Provider::Breezy,
                    companies: vec![],
                },
            ],
            ..AppConfig::default()
        };

        let adapters = build_adapters(&config);
        let names: Vec<&str> = adapters.iter().map(|a| a.source()).collect();
        assert_eq!(names, vec!["Lever", "Greenhouse", "BreezyHR"]);
    }

    #[test]
    fn empty_config_builds_empty_registry() {
        assert!(build_adapters(&AppConfig::default()).is_empty());
    }
}
