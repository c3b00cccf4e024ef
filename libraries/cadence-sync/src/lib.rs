//! Cadence Sync
//!
//! Keeps the catalog in step with a folder on disk.
//!
//! A reconciliation pass lists the folder, diffs it against the in-memory
//! catalog snapshot, applies removals and placeholder inserts immediately,
//! and hands new uris to a bounded extraction pool that upgrades the
//! placeholders as metadata arrives.
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use cadence_sync::{Reconciler, SyncConfig, LocalFolder};
//! # async fn example(reconciler: Reconciler) -> cadence_sync::Result<()> {
//! let outcome = reconciler.reconcile("/home/me/Music").await?;
//! println!("{} added, {} removed", outcome.added.len(), outcome.removed.len());
//!
//! let report = outcome.extraction.wait().await?;
//! println!("{} songs upgraded", report.extracted);
//! # Ok(())
//! # }
//! ```

mod error;
mod folder;
mod pool;
mod reconciler;
mod snapshot;

pub use error::{Result, SyncError};
pub use folder::{is_audio_uri, LocalFolder, SUPPORTED_EXTENSIONS};
pub use pool::{ExtractionHandle, ExtractionReport};
pub use reconciler::{ReconcileOutcome, Reconciler, SyncConfig};
pub use snapshot::CatalogSnapshot;
