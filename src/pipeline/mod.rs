//! Pipeline entry points for sync operations.
//!
//! - `FetchOrchestrator`: run all source adapters concurrently
//! - `Reconciler`: merge admitted postings and expire stale records
//! - `run_sync`: the full fetch → filter → reconcile → expire cycle

pub mod fetch;
pub mod reconcile;
pub mod sync;

pub use fetch::{AdapterOutcome, FetchOrchestrator, FetchSummary};
pub use reconcile::Reconciler;
pub use sync::{run_sync, run_sync_with};
