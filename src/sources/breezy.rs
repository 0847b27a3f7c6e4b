//! BreezyHR adapter.
//!
//! Breezy serves either JSON or a rendered careers page depending on the
//! company's setup, so this adapter auto-detects the response shape. HTML
//! extraction goes through several redundant selector strategies because
//! upstream markup changes without notice; zero matches is a valid, logged
//! outcome rather than a failure.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Posting;
use crate::sources::{SourceAdapter, company_delay, get_text};
use crate::utils::resolve_url;

const SOURCE: &str = "BreezyHR";

/// Position links, broadest match last.
const CARD_SELECTOR: &str =
    "a.position, a[href*='/p/'], a[href*='/position/'], .position-card a, .job-listing a";
const TITLE_SELECTOR: &str = "h2, .position-title, .job-title";
const LOCATION_SELECTOR: &str = ".location, .job-location";

/// Hybrid JSON/HTML adapter for Breezy careers pages.
pub struct BreezyAdapter {
    companies: Vec<String>,
    delay_ms: u64,
}

impl BreezyAdapter {
    pub fn new(companies: Vec<String>, delay_ms: u64) -> Self {
        Self {
            companies,
            delay_ms,
        }
    }

    fn build_url(company: &str) -> String {
        format!("https://{company}.breezy.hr/")
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }

    /// Extract postings from a rendered careers page.
    fn parse_html(company: &str, base: &Url, body: &str) -> Result<Vec<Posting>> {
        let document = Html::parse_document(body);

        let card_sel = Self::parse_selector(CARD_SELECTOR)?;
        let title_sel = Self::parse_selector(TITLE_SELECTOR)?;
        let location_sel = Self::parse_selector(LOCATION_SELECTOR)?;

        let mut postings = Vec::new();
        for card in document.select(&card_sel) {
            let href = card.value().attr("href").unwrap_or("");
            if href.is_empty() {
                continue;
            }
            let url = resolve_url(base, href);
            if url.is_empty() || !url.contains("breezy.hr") {
                continue;
            }

            let mut title = card
                .select(&title_sel)
                .next()
                .map(|el| el.text().collect::<String>())
                .unwrap_or_default();
            if title.trim().is_empty() {
                title = card.text().collect::<String>();
            }
            let title = title.trim();
            if title.is_empty() || title.len() > 200 {
                continue;
            }

            let location: String = card
                .select(&location_sel)
                .next()
                .map(|el| el.text().collect::<String>())
                .unwrap_or_default();

            if let Ok(posting) = Posting::new(SOURCE, company, title, url, location.trim()) {
                postings.push(posting);
            }
        }

        Ok(postings)
    }
}

#[async_trait]
impl SourceAdapter for BreezyAdapter {
    fn source(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, client: &Client) -> Result<Vec<Posting>> {
        let mut postings = Vec::new();

        for company in &self.companies {
            let page_url = Self::build_url(company);
            let base = Url::parse(&page_url)?;
            let body = get_text(client, &page_url, SOURCE).await?;

            if body.trim().is_empty() {
                log::warn!("{SOURCE}: empty response from {page_url}");
                company_delay(self.delay_ms).await;
                continue;
            }

            let trimmed = body.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                // JSON careers endpoints carry no postings we can use yet.
                log::debug!("{SOURCE} ({company}) served JSON, skipping");
            } else {
                let jobs = Self::parse_html(company, &base, &body)?;
                if jobs.is_empty() {
                    log::warn!(
                        "{SOURCE} ({company}): zero postings parsed, possible selector change"
                    );
                } else {
                    log::info!("{SOURCE} ({company}) returned {} postings", jobs.len());
                }
                postings.extend(jobs);
            }

            company_delay(self.delay_ms).await;
        }

        Ok(postings)
    }
}
