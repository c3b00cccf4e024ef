/// Core error types for Cadence
use thiserror::Error;

/// Result type alias using `CadenceError`
pub type Result<T> = std::result::Result<T, CadenceError>;

/// Core error type for Cadence
///
/// The first five variants are the failure taxonomy every component reports
/// against; the rest wrap lower-level causes at crate boundaries.
#[derive(Error, Debug)]
pub enum CadenceError {
    /// Directory access revoked or never granted
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Stat/read miss on a single uri
    #[error("Not found: {0}")]
    NotFound(String),

    /// Corrupt or unsupported tag data
    #[error("Failed to parse {uri}: {reason}")]
    ParseFailure { uri: String, reason: String },

    /// Malformed persisted cache blob
    #[error("Corrupt cache entry {key}: {reason}")]
    CacheCorruption { key: String, reason: String },

    /// No audio engine bound yet
    #[error("Transport unavailable")]
    TransportUnavailable,

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl CadenceError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a not found error
    pub fn not_found(uri: impl Into<String>) -> Self {
        Self::NotFound(uri.into())
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a parse failure for a single uri
    pub fn parse_failure(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseFailure {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Create a cache corruption error
    pub fn cache_corruption(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CacheCorruption {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this failure is scoped to a single file.
    ///
    /// Per-file failures degrade that file to placeholder form; everything
    /// else propagates to the caller of a reconciliation pass.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::ParseFailure { .. } | Self::CacheCorruption { .. }
        )
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for CadenceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
