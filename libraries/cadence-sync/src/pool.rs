//! Bounded extraction pool
//!
//! Jobs sit in a shared `VecDeque`; a fixed set of worker tasks pop from the
//! front until it is empty. A pass runs in two phases: the first
//! `burst_len` jobs with `burst_workers` workers, the rest with
//! `steady_workers`.
//!
//! Two sets guard against duplicate work:
//! - `in_flight` is shared by every pass of one reconciler, so two passes
//!   never process the same uri concurrently
//! - `completed` belongs to a single pass

use crate::error::{Result, SyncError};
use cadence_core::{CatalogStore, SongId};
use cadence_metadata::MetadataExtractor;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

use crate::snapshot::CatalogSnapshot;

/// One uri waiting for metadata
#[derive(Debug, Clone)]
pub(crate) struct ExtractionJob {
    pub id: SongId,
    pub uri: String,
}

/// Concurrency shape of one pass
#[derive(Debug, Clone, Copy)]
pub(crate) struct PoolShape {
    pub burst_len: usize,
    pub burst_workers: usize,
    pub steady_workers: usize,
}

/// Counts for a drained pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Placeholders upgraded (or confirmed) from parsed or cached metadata
    pub extracted: usize,
    /// Uris left as placeholders after a read or parse failure
    pub failed: usize,
    /// Uris claimed elsewhere, repeated in this pass, or removed mid-pass
    pub skipped: usize,
}

/// Shared in-flight set, keyed by uri
pub(crate) type InFlight = Arc<Mutex<HashSet<String>>>;

pub(crate) struct ExtractionPool {
    queue: tokio::sync::Mutex<VecDeque<ExtractionJob>>,
    extractor: Arc<MetadataExtractor>,
    snapshot: Arc<CatalogSnapshot>,
    store: Arc<dyn CatalogStore>,
    in_flight: InFlight,
    completed: Mutex<HashSet<String>>,
    extracted: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
}

impl ExtractionPool {
    pub fn new(
        extractor: Arc<MetadataExtractor>,
        snapshot: Arc<CatalogSnapshot>,
        store: Arc<dyn CatalogStore>,
        in_flight: InFlight,
    ) -> Self {
        Self {
            queue: tokio::sync::Mutex::new(VecDeque::new()),
            extractor,
            snapshot,
            store,
            in_flight,
            completed: Mutex::new(HashSet::new()),
            extracted: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
        }
    }

    /// Drain `jobs` in the background
    pub fn spawn(self: Arc<Self>, mut jobs: Vec<ExtractionJob>, shape: PoolShape) -> ExtractionHandle {
        let queued = jobs.len();
        if queued == 0 {
            return ExtractionHandle::empty();
        }

        let handle = tokio::spawn(async move {
            let rest = jobs.split_off(shape.burst_len.min(jobs.len()));
            Arc::clone(&self).run_phase(jobs, shape.burst_workers).await;
            Arc::clone(&self).run_phase(rest, shape.steady_workers).await;
            self.report()
        });

        ExtractionHandle {
            handle: Some(handle),
            queued,
        }
    }

    async fn run_phase(self: Arc<Self>, jobs: Vec<ExtractionJob>, workers: usize) {
        if jobs.is_empty() {
            return;
        }

        let workers = workers.clamp(1, jobs.len());
        self.queue.lock().await.extend(jobs);

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let pool = Arc::clone(&self);
            handles.push(tokio::spawn(async move {
                tracing::debug!("Extraction worker {} started", worker_id);
                pool.worker_loop(worker_id).await;
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Extraction worker panicked: {}", e);
            }
        }
    }

    async fn worker_loop(&self, worker_id: usize) {
        loop {
            let job = {
                let mut queue = self.queue.lock().await;
                queue.pop_front()
            };

            let Some(job) = job else {
                break;
            };

            if !lock(&self.completed).insert(job.uri.clone()) {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            let Some(_claim) = Claim::acquire(&self.in_flight, &job.uri) else {
                tracing::debug!("Worker {} skipping {}: claimed by another pass", worker_id, job.uri);
                self.skipped.fetch_add(1, Ordering::Relaxed);
                continue;
            };

            self.process(worker_id, &job).await;
        }
    }

    async fn process(&self, worker_id: usize, job: &ExtractionJob) {
        let extraction = match self.extractor.extract(&job.uri).await {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::warn!("Worker {} keeping placeholder for {}: {}", worker_id, job.uri, e);
                self.failed.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        let Some(current) = self.snapshot.get(&job.id) else {
            tracing::debug!("{} left the catalog before extraction finished", job.uri);
            self.skipped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        let upgraded = current.with_metadata(&extraction.metadata);
        if upgraded != *current {
            if !self.snapshot.upgrade(upgraded.clone()) {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }
            if let Err(e) = self.store.update_song(&upgraded).await {
                tracing::warn!("Failed to persist metadata for {}: {}", job.uri, e);
            }
        }

        tracing::debug!("Worker {} extracted {}", worker_id, job.uri);
        self.extracted.fetch_add(1, Ordering::Relaxed);
    }

    fn report(&self) -> ExtractionReport {
        ExtractionReport {
            extracted: self.extracted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// A uri held in the in-flight set; released on drop, including unwinding
struct Claim<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    uri: String,
}

impl<'a> Claim<'a> {
    fn acquire(in_flight: &'a Mutex<HashSet<String>>, uri: &str) -> Option<Self> {
        lock(in_flight).insert(uri.to_string()).then(|| Self {
            in_flight,
            uri: uri.to_string(),
        })
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        lock(self.in_flight).remove(&self.uri);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a pass's background extraction
#[derive(Debug)]
pub struct ExtractionHandle {
    handle: Option<JoinHandle<ExtractionReport>>,
    queued: usize,
}

impl ExtractionHandle {
    pub(crate) fn empty() -> Self {
        Self {
            handle: None,
            queued: 0,
        }
    }

    /// Number of uris handed to the pool
    pub fn queued(&self) -> usize {
        self.queued
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the pool to drain
    pub async fn wait(self) -> Result<ExtractionReport> {
        match self.handle {
            Some(handle) => handle.await.map_err(|e| SyncError::Pool(e.to_string())),
            None => Ok(ExtractionReport::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_is_exclusive_per_uri() {
        let in_flight = Mutex::new(HashSet::new());

        let first = Claim::acquire(&in_flight, "/m/a.mp3");
        assert!(first.is_some());
        assert!(Claim::acquire(&in_flight, "/m/a.mp3").is_none());
        assert!(Claim::acquire(&in_flight, "/m/b.mp3").is_some());

        drop(first);
        assert!(Claim::acquire(&in_flight, "/m/a.mp3").is_some());
    }

    #[test]
    fn claim_is_released_when_processing_panics() {
        let in_flight = Mutex::new(HashSet::new());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _claim = Claim::acquire(&in_flight, "/m/a.mp3").unwrap();
            panic!("parser blew up");
        }));

        assert!(result.is_err());
        assert!(lock(&in_flight).is_empty());
        assert!(Claim::acquire(&in_flight, "/m/a.mp3").is_some());
    }
}
