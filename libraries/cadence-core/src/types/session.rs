/// Playback session snapshot types
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::SongId;

/// Repeat mode for playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "off" => Some(Self::Off),
            "all" => Some(Self::All),
            "one" => Some(Self::One),
            _ => None,
        }
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the current queue came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueContext {
    Playlist,
    Search,
    #[default]
    Library,
    Custom,
}

impl QueueContext {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playlist => "playlist",
            Self::Search => "search",
            Self::Library => "library",
            Self::Custom => "custom",
        }
    }
}

/// User-entered lyrics for one song
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongLyrics {
    pub lyrics: Option<String>,
    pub synced_lyrics: Option<String>,
}

/// Durable snapshot of the active playback session
///
/// Written after every state-changing engine operation and read once at
/// startup. Missing fields fall back to defaults so older snapshots still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub current_song_id: Option<SongId>,
    pub queue: Vec<SongId>,
    pub context: QueueContext,
    /// Seconds
    pub position: f64,
    /// Seconds
    pub duration: f64,
    pub is_playing: bool,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    pub favorites: BTreeSet<SongId>,
    /// 0.0 to 1.0
    pub volume: f32,
    pub lyrics: BTreeMap<SongId, SongLyrics>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            current_song_id: None,
            queue: Vec::new(),
            context: QueueContext::default(),
            position: 0.0,
            duration: 0.0,
            is_playing: false,
            repeat: RepeatMode::Off,
            shuffle: false,
            favorites: BTreeSet::new(),
            volume: 1.0,
            lyrics: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_mode_round_trips_through_str() {
        for mode in [RepeatMode::Off, RepeatMode::All, RepeatMode::One] {
            assert_eq!(RepeatMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(RepeatMode::from_str("sometimes"), None);
    }

    #[test]
    fn partial_snapshot_fills_defaults() {
        let session: Session = serde_json::from_str(r#"{"repeat":"all","shuffle":true}"#).unwrap();
        assert_eq!(session.repeat, RepeatMode::All);
        assert!(session.shuffle);
        assert_eq!(session.volume, 1.0);
        assert!(session.queue.is_empty());
        assert_eq!(session.context, QueueContext::Library);
    }
}
