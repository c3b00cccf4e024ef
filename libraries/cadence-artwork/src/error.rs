use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while storing cover art
#[derive(Debug, Error)]
pub enum ArtworkError {
    /// Store directory could not be created
    #[error("Cannot prepare artwork directory {0}: {1}")]
    Directory(PathBuf, std::io::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Empty image payload
    #[error("No artwork data")]
    NoArtwork,

    /// Artwork too large
    #[error("Artwork too large: {0} bytes (max {1} bytes)")]
    TooLarge(usize, usize),
}

/// Result type for artwork operations
pub type Result<T> = std::result::Result<T, ArtworkError>;

impl From<ArtworkError> for cadence_core::CadenceError {
    fn from(err: ArtworkError) -> Self {
        match err {
            ArtworkError::Io(e) => cadence_core::CadenceError::Io(e),
            other => cadence_core::CadenceError::storage(other.to_string()),
        }
    }
}
