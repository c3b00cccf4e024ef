//! Error types for playback management

use cadence_core::{CadenceError, SongId};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Requested song is not part of the queue
    #[error("Song not in queue: {0}")]
    NotInQueue(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The transport rejected a call
    #[error("Transport error: {0}")]
    Transport(#[source] CadenceError),

    /// Session store could not be read
    #[error("Session store error: {0}")]
    Persistence(#[source] CadenceError),
}

impl PlaybackError {
    pub(crate) fn not_in_queue(id: &SongId) -> Self {
        Self::NotInQueue(id.to_string())
    }

    /// Whether the transport reported that no audio engine is bound
    pub fn is_transport_unavailable(&self) -> bool {
        matches!(self, Self::Transport(CadenceError::TransportUnavailable))
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
