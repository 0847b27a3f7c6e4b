//! Sync cycle statistics.

use serde::{Deserialize, Serialize};

/// Counters produced by a single reconciliation pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeStats {
    /// Records created for previously unseen URLs
    pub new: usize,
    /// Active records whose last-seen date advanced
    pub updated: usize,
    /// Inactive records that reappeared
    pub reactivated: usize,
    /// Postings skipped because they could not become a valid record
    pub errors: usize,
}

/// Summary of a full sync cycle, consumed by notification/export paths.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncStats {
    pub new: usize,
    pub updated: usize,
    pub reactivated: usize,
    /// Records swept to inactive this cycle
    pub expired: usize,
    /// Postings rejected by the reconciler
    pub errors: usize,
    /// Active records after the cycle
    pub total_active: usize,
    /// Adapters that completed
    pub sources_ok: usize,
    /// Adapters that exhausted their retries
    pub sources_failed: usize,
    /// Raw postings gathered before admission filtering
    pub fetched: usize,
    /// Postings that passed the admission filter
    pub admitted: usize,
}

impl SyncStats {
    /// Fold a merge pass into the cycle summary.
    pub fn apply_merge(&mut self, merge: MergeStats) {
        self.new = merge.new;
        self.updated = merge.updated;
        self.reactivated = merge.reactivated;
        self.errors = merge.errors;
    }
}
