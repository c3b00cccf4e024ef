//! Cadence Artwork - content-addressed cover art store
//!
//! Cover images pulled out of audio files are written once to a directory on
//! disk, keyed by a hash of the album name (or a timestamp when the album is
//! unknown). A file already present at the derived path is never rewritten.
//!
//! # Example
//!
//! ```no_run
//! use cadence_artwork::CoverArtStore;
//!
//! let store = CoverArtStore::new("data/covers", 100).unwrap();
//! let path = store.store(Some("Blue Train"), &[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
//! println!("cover written to {}", path.display());
//! ```

mod error;
mod store;
mod types;

// Re-export public API
pub use error::{ArtworkError, Result};
pub use store::{CoverArtStore, MAX_ARTWORK_SIZE};
pub use types::{ArtworkData, ImageFormat};
