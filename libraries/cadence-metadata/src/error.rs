/// Metadata-specific error types
use thiserror::Error;

/// Errors raised while reading tags
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Container could not be identified
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Tag data present but unreadable
    #[error("Failed to parse metadata: {0}")]
    ParseError(String),
}

/// Result type for metadata operations
pub type Result<T> = std::result::Result<T, MetadataError>;

/// The parser never sees a uri; the extractor fills it in.
impl From<MetadataError> for cadence_core::CadenceError {
    fn from(err: MetadataError) -> Self {
        cadence_core::CadenceError::parse_failure(String::new(), err.to_string())
    }
}
