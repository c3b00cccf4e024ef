//! Storage access over a local directory tree

use async_trait::async_trait;
use cadence_core::{CadenceError, FileStat, StorageAccess};
use std::io::ErrorKind;
use std::path::Path;
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// Supported audio file extensions
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "wav", "m4a", "aac"];

/// Check if a uri names a supported audio file
pub fn is_audio_uri(uri: &str) -> bool {
    Path::new(uri)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// `StorageAccess` for plain filesystem paths; uris are path strings
#[derive(Debug, Clone, Default)]
pub struct LocalFolder {
    /// Whether to follow symbolic links
    follow_links: bool,
}

impl LocalFolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to follow symbolic links
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    fn walk(dir: &str, follow_links: bool) -> cadence_core::Result<Vec<String>> {
        let root = Path::new(dir);

        // Surface an unreadable root as a hard failure; walkdir would only
        // report it as one more skipped entry.
        std::fs::read_dir(root)
            .map_err(|e| CadenceError::permission_denied(format!("{dir}: {e}")))?;

        let mut uris = Vec::new();
        for entry in WalkDir::new(root).follow_links(follow_links) {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    uris.push(entry.path().to_string_lossy().into_owned());
                }
                Ok(_) => {}
                Err(e) if e.depth() == 0 => {
                    return Err(CadenceError::permission_denied(format!("{dir}: {e}")));
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", dir, e);
                }
            }
        }

        Ok(uris)
    }
}

fn io_error(uri: &str, err: std::io::Error) -> CadenceError {
    match err.kind() {
        ErrorKind::NotFound => CadenceError::not_found(uri),
        ErrorKind::PermissionDenied => CadenceError::permission_denied(uri.to_string()),
        _ => CadenceError::Io(err),
    }
}

#[async_trait]
impl StorageAccess for LocalFolder {
    async fn list(&self, dir: &str) -> cadence_core::Result<Vec<String>> {
        let dir_owned = dir.to_string();
        let follow_links = self.follow_links;

        tokio::task::spawn_blocking(move || Self::walk(&dir_owned, follow_links))
            .await
            .map_err(|e| CadenceError::Other(format!("directory walk failed: {e}")))?
    }

    async fn stat(&self, uri: &str) -> cadence_core::Result<FileStat> {
        let metadata = match tokio::fs::metadata(uri).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(FileStat::missing()),
            Err(e) => return Err(io_error(uri, e)),
        };

        let modified_at = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64);

        Ok(FileStat {
            exists: metadata.is_file(),
            modified_at,
            size: metadata.len(),
        })
    }

    async fn read(&self, uri: &str) -> cadence_core::Result<Vec<u8>> {
        tokio::fs::read(uri).await.map_err(|e| io_error(uri, e))
    }

    async fn delete(&self, uri: &str) -> cadence_core::Result<()> {
        tokio::fs::remove_file(uri).await.map_err(|e| io_error(uri, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_extension_allowlist() {
        assert!(is_audio_uri("/m/a.mp3"));
        assert!(is_audio_uri("/m/B.FLAC"));
        assert!(is_audio_uri("/m/c.Opus"));
        assert!(!is_audio_uri("/m/cover.jpg"));
        assert!(!is_audio_uri("/m/notes"));
        assert!(!is_audio_uri("/m/mp3"));
    }

    #[tokio::test]
    async fn lists_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"a").unwrap();
        std::fs::write(dir.path().join("sub").join("b.flac"), b"b").unwrap();

        let mut uris = LocalFolder::new()
            .list(dir.path().to_str().unwrap())
            .await
            .unwrap();
        uris.sort();

        assert_eq!(uris.len(), 2);
        assert!(uris[0].ends_with("a.mp3"));
        assert!(uris[1].ends_with("b.flac"));
    }

    #[tokio::test]
    async fn missing_root_is_permission_denied() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");

        let result = LocalFolder::new().list(gone.to_str().unwrap()).await;
        assert!(matches!(result, Err(CadenceError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn stat_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.wav");
        std::fs::write(&path, b"12345").unwrap();
        let uri = path.to_str().unwrap();
        let folder = LocalFolder::new();

        let stat = folder.stat(uri).await.unwrap();
        assert!(stat.exists);
        assert_eq!(stat.size, 5);
        assert!(stat.modified_at.is_some());

        assert_eq!(folder.read(uri).await.unwrap(), b"12345");

        folder.delete(uri).await.unwrap();
        assert!(!folder.stat(uri).await.unwrap().exists);
        assert!(matches!(folder.read(uri).await, Err(CadenceError::NotFound(_))));
    }
}
