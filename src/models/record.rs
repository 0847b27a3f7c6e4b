//! Persistent job record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Posting;

/// Default status for newly observed records.
pub const DEFAULT_STATUS: &str = "Awaiting";

/// The persistent, deduplicated-by-URL representation of a posting across
/// all fetch cycles.
///
/// Records are never deleted. A record that goes unobserved past the
/// retention window is flipped to `active = false`; reappearance flips it
/// back. `status` and `notes` belong to the end user once set and are only
/// replaced by non-blank values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobRecord {
    /// Source name the record was last observed from
    pub source: String,

    /// Company name
    pub company: String,

    /// Posting title
    pub title: String,

    /// Canonical URL (identity key, globally unique)
    pub url: String,

    /// Date the URL was first observed
    pub first_seen: NaiveDate,

    /// Date the URL was last observed
    pub last_seen: NaiveDate,

    /// Whether the posting was observed within the retention window
    #[serde(default = "default_active")]
    pub active: bool,

    /// User-editable status
    #[serde(default = "default_status")]
    pub status: String,

    /// User-editable notes (seeded from the posting's note)
    #[serde(default)]
    pub notes: String,
}

fn default_active() -> bool {
    true
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl JobRecord {
    /// Create a record from a first-time observation of a posting.
    pub fn from_posting(posting: &Posting, today: NaiveDate) -> Self {
        Self {
            source: posting.source.clone(),
            company: posting.company.clone(),
            title: posting.title.clone(),
            url: posting.url.clone(),
            first_seen: today,
            last_seen: today,
            active: true,
            status: posting
                .status
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(DEFAULT_STATUS)
                .to_string(),
            notes: posting.note.clone(),
        }
    }

    /// Whether this record has gone unobserved strictly longer than the
    /// retention window.
    pub fn is_stale(&self, today: NaiveDate, retention_days: i64) -> bool {
        self.last_seen < today - chrono::Duration::days(retention_days)
    }
}
