//! Posting data structure.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Maximum accepted field lengths.
const MAX_SOURCE_LEN: usize = 100;
const MAX_COMPANY_LEN: usize = 200;
const MAX_TITLE_LEN: usize = 300;
const MAX_URL_LEN: usize = 2048;
const MAX_NOTE_LEN: usize = 2048;

/// A job posting as returned by one source adapter for one fetch cycle.
///
/// Postings carry no identity beyond their URL. All field validation happens
/// in [`Posting::new`]; a constructed posting is always well-formed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Posting {
    /// Source name (e.g. "Greenhouse")
    pub source: String,

    /// Company the posting belongs to
    pub company: String,

    /// Posting title
    pub title: String,

    /// Canonical posting URL (identity key)
    pub url: String,

    /// Free-text note, typically a location fragment (may be empty)
    pub note: String,

    /// Optional status override carried from an external edit path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Posting {
    /// Create a posting, validating and trimming every field.
    ///
    /// Fails if source, company, or title is blank, if the URL does not
    /// start with `http://` or `https://`, or if any field exceeds its
    /// length cap.
    pub fn new(
        source: impl Into<String>,
        company: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        note: impl Into<String>,
    ) -> Result<Self> {
        let source = required_field(source.into(), "source", MAX_SOURCE_LEN)?;
        let company = required_field(company.into(), "company", MAX_COMPANY_LEN)?;
        let title = required_field(title.into(), "title", MAX_TITLE_LEN)?;
        let url = validate_url(url.into())?;

        let note = note.into().trim().to_string();
        if note.len() > MAX_NOTE_LEN {
            return Err(AppError::posting(format!(
                "note too long (max {MAX_NOTE_LEN} characters)"
            )));
        }

        Ok(Self {
            source,
            company,
            title,
            url,
            note,
            status: None,
        })
    }

    /// Attach a status override (used by external edit paths, not adapters).
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

fn required_field(value: String, name: &str, max_len: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::posting(format!("{name} cannot be blank")));
    }
    if trimmed.len() > max_len {
        return Err(AppError::posting(format!(
            "{name} too long (max {max_len} characters)"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_url(url: String) -> Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(AppError::posting("URL cannot be blank"));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(AppError::posting("URL must start with http:// or https://"));
    }
    if trimmed.len() > MAX_URL_LEN {
        return Err(AppError::posting(format!(
            "URL too long (max {MAX_URL_LEN} characters)"
        )));
    }
    Ok(trimmed.to_string())
}
