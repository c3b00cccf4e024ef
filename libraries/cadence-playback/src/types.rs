//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No song loaded
    #[default]
    Idle,

    /// Song loaded, not playing
    Paused,

    /// Currently playing
    Playing,
}

/// Direction for `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Timing thresholds for the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Track-ended signals this soon after an auto-advance are dropped (default: 800ms)
    pub auto_advance_debounce: Duration,

    /// Track-ended signals below this position are dropped (default: 10s)
    pub min_auto_advance_position: Duration,

    /// `previous` restarts the current song past this position (default: 5s)
    pub restart_threshold: Duration,

    /// Minimum position movement between progress writes (default: 5s)
    pub position_persist_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_advance_debounce: Duration::from_millis(800),
            min_auto_advance_position: Duration::from_secs(10),
            restart_threshold: Duration::from_secs(5),
            position_persist_interval: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.auto_advance_debounce, Duration::from_millis(800));
        assert_eq!(config.min_auto_advance_position, Duration::from_secs(10));
        assert_eq!(config.restart_threshold, Duration::from_secs(5));
        assert_eq!(PlaybackState::default(), PlaybackState::Idle);
    }
}
