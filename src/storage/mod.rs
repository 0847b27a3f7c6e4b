//! Storage abstractions for job record persistence.
//!
//! The reconciliation engine depends only on the [`JobStore`] trait; the
//! backends here are a JSON-file store for normal runs and an in-memory
//! store for tests and ephemeral use.

pub mod local;
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::JobRecord;

// Re-export for convenience
pub use local::LocalStore;
pub use memory::MemoryStore;

/// Trait for job record storage backends.
///
/// Records are keyed by URL; `save` upserts. A record's full field set for a
/// cycle becomes visible through one `save` call, never piecemeal.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Look up a record by its unique URL.
    async fn find_by_url(&self, url: &str) -> Result<Option<JobRecord>>;

    /// All currently active records.
    async fn find_active(&self) -> Result<Vec<JobRecord>>;

    /// Active records last observed strictly before the cutoff date.
    async fn find_active_last_seen_before(&self, cutoff: NaiveDate) -> Result<Vec<JobRecord>>;

    /// Insert or replace a record by URL.
    async fn save(&self, record: JobRecord) -> Result<()>;

    /// Insert or replace a batch of records.
    async fn save_all(&self, records: Vec<JobRecord>) -> Result<()>;

    /// Number of active records.
    async fn count_active(&self) -> Result<usize>;
}
