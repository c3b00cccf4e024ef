//! Cadence Core
//!
//! Platform-agnostic domain types, capability traits, and error handling shared
//! by every Cadence crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Song`, `SongMetadata`, `Session`, `RepeatMode`, `QueueContext`
//! - **Capability Traits**: `StorageAccess`, `MetadataParser`, `Transport`,
//!   `CatalogStore`, `KeyValueStore`, `SessionPersistence`
//! - **Error Handling**: Unified `CadenceError` and `Result` types
//! - **Lyrics**: the `[mm:ss.cc] text` timed-lyrics format
//!
//! # Example
//!
//! ```rust
//! use cadence_core::types::{Song, SongId};
//!
//! let song = Song::placeholder(SongId::generate(), "/music/Intro.mp3", 1024, Some(1_700_000_000_000));
//! assert_eq!(song.title, "Intro");
//! assert!(song.artist.is_none());
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod lyrics;
pub mod traits;
pub mod types;

pub use error::{CadenceError, Result};
pub use lyrics::{parse_synced_lyrics, LyricLine};
pub use traits::{
    CatalogStore, KeyValueStore, MetadataParser, SessionPersistence, StorageAccess, Transport,
};
pub use types::{
    FileStat, ParsedTags, QueueContext, RepeatMode, Session, Song, SongId, SongLyrics,
    SongMetadata, TransportEvent, TransportStatus,
};
