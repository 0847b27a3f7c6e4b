//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
///
/// Loaded once per run and passed around as an immutable snapshot, so a
/// configuration change on disk never produces inconsistent behavior across
/// adapters mid-cycle.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP and fetch-orchestration behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Admission filter keyword policy
    #[serde(default)]
    pub filter: FilterConfig,

    /// Configured sources, in fetch order
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.task_timeout_secs == 0 {
            return Err(AppError::validation(
                "crawler.task_timeout_secs must be > 0",
            ));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.max_retries == 0 {
            return Err(AppError::validation("crawler.max_retries must be > 0"));
        }
        if self.crawler.retention_days == 0 {
            return Err(AppError::validation("crawler.retention_days must be > 0"));
        }
        for source in &self.sources {
            if source.companies.iter().any(|c| c.trim().is_empty()) {
                return Err(AppError::validation(format!(
                    "source {:?} has a blank company entry",
                    source.provider
                )));
            }
        }
        Ok(())
    }
}

/// HTTP client and fetch-orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Wall-time budget for one adapter's whole fetch attempt, in seconds
    #[serde(default = "defaults::task_timeout")]
    pub task_timeout_secs: u64,

    /// Delay between requests within an adapter in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrently running adapter tasks
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Attempts per adapter before it is counted as failed
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Base backoff between attempts, multiplied by the attempt number
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Days a record may go unobserved before it is deactivated
    #[serde(default = "defaults::retention_days")]
    pub retention_days: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            task_timeout_secs: defaults::task_timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
            max_retries: defaults::max_retries(),
            retry_backoff_ms: defaults::retry_backoff(),
            retention_days: defaults::retention_days(),
        }
    }
}

/// Keyword policy for the admission filter.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilterConfig {
    /// Role keywords, matched at word boundaries (empty = tier disabled)
    #[serde(default)]
    pub role_keywords: Vec<String>,

    /// Include keywords, matched as substrings (empty = default remote set)
    #[serde(default)]
    pub include_keywords: Vec<String>,

    /// Exclude keywords, matched as substrings, always dominant
    #[serde(default)]
    pub exclude_keywords: Vec<String>,

    /// How the role and include tiers combine
    #[serde(default)]
    pub combine: CombinePolicy,
}

/// Boolean combination of the role and include tiers.
///
/// Exclusion dominates under either policy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CombinePolicy {
    /// Role AND include must both pass
    #[default]
    Strict,
    /// Role OR include passing is enough
    Either,
}

/// One configured source: a provider tag plus its company identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Which adapter implementation to use
    pub provider: Provider,

    /// Ordered company identifiers (slugs) for this provider
    #[serde(default)]
    pub companies: Vec<String>,
}

/// Known source adapter families.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Greenhouse,
    Lever,
    Breezy,
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; jobsync/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn task_timeout() -> u64 {
        300
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn retry_backoff() -> u64 {
        1000
    }
    pub fn retention_days() -> u32 {
        30
    }
}
