/// Value types exchanged with external capabilities
use serde::{Deserialize, Serialize};

/// Result of a `stat` call on a single uri
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileStat {
    pub exists: bool,
    /// Modification time in ms since epoch, when the source reports one
    pub modified_at: Option<i64>,
    pub size: u64,
}

impl FileStat {
    /// Stat result for a uri that no longer exists
    pub fn missing() -> Self {
        Self::default()
    }
}

/// Tags pulled out of raw audio bytes by a metadata parser
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<i32>,
    pub duration_seconds: f64,
    /// Embedded images, front cover first when the container marks one
    pub pictures: Vec<Vec<u8>>,
    pub lyrics: Option<String>,
}

/// Readable properties of a transport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransportStatus {
    pub is_loaded: bool,
    pub is_playing: bool,
    /// Seconds
    pub position: f64,
    /// Seconds
    pub duration: f64,
}

/// Events emitted by a transport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    /// Current source played to its end
    TrackEnded { position: f64 },

    /// Periodic progress report
    PositionUpdated { position: f64, duration: f64 },
}
