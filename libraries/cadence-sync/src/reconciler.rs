//! Catalog reconciliation against a folder scan

use crate::error::{Result, SyncError};
use crate::folder::is_audio_uri;
use crate::pool::{ExtractionHandle, ExtractionJob, ExtractionPool, InFlight, PoolShape};
use crate::snapshot::CatalogSnapshot;
use cadence_core::{CatalogStore, Song, SongId, StorageAccess};
use cadence_metadata::MetadataExtractor;
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// Extraction pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Jobs at the head of a pass that get the higher concurrency
    pub burst_len: usize,
    pub burst_workers: usize,
    pub steady_workers: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            burst_len: 40,
            burst_workers: 4,
            steady_workers: 2,
        }
    }
}

/// Result of one reconciliation pass
#[derive(Debug)]
pub struct ReconcileOutcome {
    /// Placeholders inserted for newly discovered uris
    pub added: Vec<Song>,
    /// Songs whose uri disappeared
    pub removed: Vec<Song>,
    /// Known songs queued again: never upgraded, or modified since cataloged
    pub refreshed: Vec<Song>,
    /// Background metadata extraction for `added` and `refreshed`
    pub extraction: ExtractionHandle,
}

impl ReconcileOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.refreshed.is_empty()
    }
}

/// Owns the catalog: the only writer of song rows and the snapshot
pub struct Reconciler {
    access: Arc<dyn StorageAccess>,
    store: Arc<dyn CatalogStore>,
    extractor: Arc<MetadataExtractor>,
    snapshot: Arc<CatalogSnapshot>,
    config: SyncConfig,
    in_flight: InFlight,
    loaded: AtomicBool,
}

impl Reconciler {
    pub fn new(
        access: Arc<dyn StorageAccess>,
        store: Arc<dyn CatalogStore>,
        extractor: Arc<MetadataExtractor>,
        config: SyncConfig,
    ) -> Self {
        Self {
            access,
            store,
            extractor,
            snapshot: Arc::new(CatalogSnapshot::new()),
            config,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            loaded: AtomicBool::new(false),
        }
    }

    /// Shared read handle on the running catalog
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Fill the snapshot from the durable catalog
    ///
    /// Runs implicitly before the first reconciliation.
    pub async fn load_catalog(&self) -> Result<usize> {
        let songs = self.store.all_songs().await?;
        let count = songs.len();
        self.snapshot.replace_all(songs);
        self.loaded.store(true, Ordering::SeqCst);
        info!("Loaded {} songs from catalog", count);
        Ok(count)
    }

    /// Diff `dir` against the catalog and apply the result
    ///
    /// Removals and placeholder inserts are applied before this returns;
    /// metadata extraction for new uris continues on the pool behind
    /// `ReconcileOutcome::extraction`. Known uris go back on the pool when
    /// their row is still a placeholder or their modification time moved.
    /// An unchanged, fully extracted tree queues nothing.
    ///
    /// # Errors
    /// Fails without touching the catalog if `dir` cannot be enumerated;
    /// store failures while applying the diff also propagate.
    pub async fn reconcile(&self, dir: &str) -> Result<ReconcileOutcome> {
        if !self.loaded.load(Ordering::SeqCst) {
            self.load_catalog().await?;
        }

        let scanned: BTreeSet<String> = match self.access.list(dir).await {
            Ok(uris) => uris.into_iter().filter(|uri| is_audio_uri(uri)).collect(),
            Err(e) => {
                error!("Reconciliation of {} aborted: {}", dir, e);
                return Err(SyncError::Enumeration {
                    dir: dir.to_string(),
                    source: e,
                });
            }
        };

        let known = self.snapshot.uris();
        let mut removed_uris: Vec<&String> = known.iter().filter(|uri| !scanned.contains(*uri)).collect();
        removed_uris.sort();
        let added_uris: Vec<&String> = scanned.iter().filter(|uri| !known.contains(*uri)).collect();

        debug!(
            "Scanned {} audio files under {}: {} new, {} gone",
            scanned.len(),
            dir,
            added_uris.len(),
            removed_uris.len()
        );

        let removed = self.apply_removals(&removed_uris).await?;
        let added = self.apply_additions(&added_uris).await?;
        let refreshed = self
            .find_stale(scanned.iter().filter(|uri| known.contains(*uri)))
            .await;

        let jobs: Vec<ExtractionJob> = added
            .iter()
            .chain(refreshed.iter())
            .map(|song| ExtractionJob {
                id: song.id.clone(),
                uri: song.uri.clone(),
            })
            .collect();

        let pool = Arc::new(ExtractionPool::new(
            Arc::clone(&self.extractor),
            Arc::clone(&self.snapshot),
            Arc::clone(&self.store),
            Arc::clone(&self.in_flight),
        ));
        let extraction = pool.spawn(
            jobs,
            PoolShape {
                burst_len: self.config.burst_len,
                burst_workers: self.config.burst_workers,
                steady_workers: self.config.steady_workers,
            },
        );

        info!(
            "Reconciled {}: {} added, {} removed, {} refreshed, {} queued for extraction",
            dir,
            added.len(),
            removed.len(),
            refreshed.len(),
            extraction.queued()
        );

        Ok(ReconcileOutcome {
            added,
            removed,
            refreshed,
            extraction,
        })
    }

    /// Known songs whose row no longer reflects the file
    ///
    /// A modification time that differs from the row always counts. A
    /// placeholder counts unless the cache already holds metadata that
    /// leaves it unchanged (a file with no usable tags).
    async fn find_stale<'a>(&self, uris: impl Iterator<Item = &'a String>) -> Vec<Song> {
        let mut stale = Vec::new();

        for uri in uris {
            let Some(song) = self.snapshot.get_by_uri(uri) else {
                continue;
            };

            let stat = match self.access.stat(uri).await {
                Ok(stat) if stat.exists => stat,
                Ok(_) => continue,
                Err(e) => {
                    warn!("Failed to stat {}: {}", uri, e);
                    continue;
                }
            };

            if stat.modified_at != song.modified_at {
                debug!("{} changed since it was cataloged", uri);
                stale.push(song.as_ref().clone());
                continue;
            }

            if !song.is_placeholder() {
                continue;
            }

            match self.extractor.cached(uri, stat.modified_at).await {
                Ok(Some(metadata)) if song.with_metadata(&metadata) == *song => {}
                Ok(_) => stale.push(song.as_ref().clone()),
                Err(e) => {
                    warn!("Metadata cache lookup failed for {}: {}", uri, e);
                    stale.push(song.as_ref().clone());
                }
            }
        }

        stale
    }

    async fn apply_removals(&self, uris: &[&String]) -> Result<Vec<Song>> {
        let mut removed = Vec::with_capacity(uris.len());

        for uri in uris {
            let Some(song) = self.snapshot.get_by_uri(uri) else {
                continue;
            };

            if !song.id.is_valid() {
                warn!("Cannot remove {} from catalog: missing id", uri);
                continue;
            }

            self.store.delete_song(&song.id).await?;
            self.snapshot.remove(&song.id);
            removed.push(song.as_ref().clone());
        }

        Ok(removed)
    }

    async fn apply_additions(&self, uris: &[&String]) -> Result<Vec<Song>> {
        let mut added = Vec::with_capacity(uris.len());

        for uri in uris {
            let stat = match self.access.stat(uri).await {
                Ok(stat) if stat.exists => stat,
                Ok(_) => {
                    debug!("{} vanished before it could be cataloged", uri);
                    continue;
                }
                Err(e) => {
                    warn!("Failed to stat {}: {}", uri, e);
                    continue;
                }
            };

            let song = Song::placeholder(SongId::generate(), uri.as_str(), stat.size, stat.modified_at);
            self.store.insert_song(&song).await?;
            self.snapshot.upsert(song.clone());
            added.push(song);
        }

        Ok(added)
    }

    /// Delete a song's file and drop it from the catalog
    pub async fn delete_song(&self, id: &SongId) -> Result<Song> {
        let song = self
            .snapshot
            .get(id)
            .ok_or_else(|| SyncError::SongNotFound(id.clone()))?;

        self.access.delete(&song.uri).await?;
        self.store.delete_song(id).await?;
        self.snapshot.remove(id);

        info!("Deleted {} ({})", song.uri, id);
        Ok(song.as_ref().clone())
    }
}
