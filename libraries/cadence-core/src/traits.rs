/// Capability traits for Cadence
///
/// Everything outside the core (filesystem, tag parser, audio engine,
/// database) is reached through one of these seams so each component can be
/// driven by a fake in tests.
use crate::error::Result;
use crate::types::{FileStat, ParsedTags, Session, Song, SongId, TransportStatus};
use async_trait::async_trait;

/// Access to a user-granted directory tree
#[async_trait]
pub trait StorageAccess: Send + Sync {
    /// List every file uri below `dir`
    ///
    /// # Errors
    /// Returns `PermissionDenied` if the directory cannot be enumerated
    async fn list(&self, dir: &str) -> Result<Vec<String>>;

    /// Stat a single uri. A missing file is reported through `exists`.
    async fn stat(&self, uri: &str) -> Result<FileStat>;

    /// Read the full contents of a uri
    ///
    /// # Errors
    /// Returns `NotFound` if the uri is gone
    async fn read(&self, uri: &str) -> Result<Vec<u8>>;

    /// Delete a uri from the underlying storage
    async fn delete(&self, uri: &str) -> Result<()>;
}

/// Extracts tags and cover art from raw audio bytes
///
/// Parsing is CPU-bound and synchronous; callers run it off the async
/// executor.
pub trait MetadataParser: Send + Sync {
    /// Parse tags from a complete file image
    ///
    /// # Errors
    /// Returns `ParseFailure` for corrupt or unsupported data
    fn parse(&self, bytes: &[u8]) -> Result<ParsedTags>;
}

/// The external audio playback engine
#[async_trait]
pub trait Transport: Send + Sync {
    /// Bind the transport to a new source
    async fn replace(&self, uri: &str) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Seek the current source, in seconds
    async fn seek_to(&self, seconds: f64) -> Result<()>;

    /// Current readable properties
    async fn status(&self) -> Result<TransportStatus>;
}

/// Durable catalog of songs plus the favorites association
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All songs currently in the catalog
    async fn all_songs(&self) -> Result<Vec<Song>>;

    /// Insert a new song row
    async fn insert_song(&self, song: &Song) -> Result<()>;

    /// Replace every mutable field of an existing row
    async fn update_song(&self, song: &Song) -> Result<()>;

    /// Delete a row, cascading to favorites. Returns whether a row existed.
    async fn delete_song(&self, id: &SongId) -> Result<bool>;

    async fn set_favorite(&self, id: &SongId, favorite: bool) -> Result<()>;

    async fn favorites(&self) -> Result<Vec<SongId>>;

    async fn set_lyrics(
        &self,
        id: &SongId,
        lyrics: Option<&str>,
        synced_lyrics: Option<&str>,
    ) -> Result<()>;
}

/// Generic string key-value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// Load and save the playback session snapshot
#[async_trait]
pub trait SessionPersistence: Send + Sync {
    /// Load the last saved snapshot, if any
    async fn load(&self) -> Result<Option<Session>>;

    async fn save(&self, session: &Session) -> Result<()>;
}
