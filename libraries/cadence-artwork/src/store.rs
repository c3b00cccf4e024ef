use crate::error::{ArtworkError, Result};
use crate::types::ArtworkData;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Maximum artwork size (5MB)
pub const MAX_ARTWORK_SIZE: usize = 5 * 1024 * 1024;

/// Content-addressed cover art directory
///
/// Writes are idempotent per derived path: the first image stored for an
/// album wins and later calls return the existing file untouched.
pub struct CoverArtStore {
    root: PathBuf,
    /// Recently resolved key -> path, to skip repeated existence checks
    known: Mutex<LruCache<String, PathBuf>>,
    sequence: AtomicU64,
}

impl CoverArtStore {
    /// Open (creating if needed) a store rooted at `root`
    ///
    /// # Arguments
    /// * `root` - Directory holding cover files
    /// * `cache_size` - Number of resolved paths to remember (0 means 1)
    pub fn new(root: impl Into<PathBuf>, cache_size: usize) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| ArtworkError::Directory(root.clone(), e))?;

        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            root,
            known: Mutex::new(LruCache::new(capacity)),
            sequence: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a cover image and return its path
    ///
    /// The file name is derived from `album`; an absent album falls back to a
    /// timestamp, so album-less covers are never shared.
    pub fn store(&self, album: Option<&str>, bytes: &[u8]) -> Result<PathBuf> {
        if bytes.is_empty() {
            return Err(ArtworkError::NoArtwork);
        }
        if bytes.len() > MAX_ARTWORK_SIZE {
            tracing::warn!(
                "Artwork for {:?} is too large ({} bytes, max {} bytes), skipping",
                album,
                bytes.len(),
                MAX_ARTWORK_SIZE
            );
            return Err(ArtworkError::TooLarge(bytes.len(), MAX_ARTWORK_SIZE));
        }

        let key = self.key_for(album);

        if let Some(path) = self.lock_known().get(&key) {
            return Ok(path.clone());
        }

        let artwork = ArtworkData::new(bytes.to_vec());
        let path = self
            .root
            .join(format!("{}.{}", key, artwork.format.extension()));

        if path.exists() {
            tracing::debug!("Cover already stored at {}", path.display());
        } else {
            self.write_atomically(&path, &artwork.data)?;
            tracing::debug!("Stored cover at {}", path.display());
        }

        self.lock_known().put(key, path.clone());
        Ok(path)
    }

    /// Forget remembered paths. Files on disk are untouched.
    pub fn clear_cache(&self) {
        self.lock_known().clear();
    }

    fn key_for(&self, album: Option<&str>) -> String {
        match album.map(str::trim).filter(|a| !a.is_empty()) {
            Some(album) => hex::encode(Sha256::digest(album.as_bytes())),
            None => format!(
                "t{}-{}",
                chrono::Utc::now().timestamp_millis(),
                self.sequence.fetch_add(1, Ordering::Relaxed)
            ),
        }
    }

    // Concurrent extractors may race on the same album; rename keeps readers
    // from ever seeing a half-written file.
    fn write_atomically(&self, path: &Path, data: &[u8]) -> Result<()> {
        let tmp = path.with_extension(format!(
            "tmp{}",
            self.sequence.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::write(&tmp, data)?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn lock_known(&self) -> std::sync::MutexGuard<'_, LruCache<String, PathBuf>> {
        self.known.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3];
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 9, 9];

    #[test]
    fn same_album_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = CoverArtStore::new(dir.path(), 10).unwrap();

        let first = store.store(Some("Kind of Blue"), JPEG).unwrap();
        assert_eq!(std::fs::read(&first).unwrap(), JPEG);

        store.clear_cache();
        let second = store.store(Some("Kind of Blue"), &[0xFF, 0xD8, 0xFF, 0xE1, 7]).unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second).unwrap(), JPEG, "existing cover must not be overwritten");
    }

    #[test]
    fn path_is_album_hash_with_sniffed_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = CoverArtStore::new(dir.path(), 10).unwrap();

        let path = store.store(Some("Album"), PNG).unwrap();
        let expected = format!("{}.png", hex::encode(Sha256::digest(b"Album")));
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), expected);
    }

    #[test]
    fn missing_album_gets_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = CoverArtStore::new(dir.path(), 10).unwrap();

        let a = store.store(None, JPEG).unwrap();
        let b = store.store(Some("  "), JPEG).unwrap();
        assert_ne!(a, b);
        assert!(a.exists() && b.exists());
    }

    #[test]
    fn rejects_empty_and_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let store = CoverArtStore::new(dir.path(), 0).unwrap();

        assert!(matches!(store.store(Some("x"), &[]), Err(ArtworkError::NoArtwork)));

        let big = vec![0u8; MAX_ARTWORK_SIZE + 1];
        assert!(matches!(
            store.store(Some("x"), &big),
            Err(ArtworkError::TooLarge(_, MAX_ARTWORK_SIZE))
        ));
    }

    #[test]
    fn creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("covers");
        let store = CoverArtStore::new(&root, 1).unwrap();
        assert!(store.root().is_dir());
    }
}
