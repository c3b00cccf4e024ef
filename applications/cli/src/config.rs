/// Cadence configuration
use crate::error::{CliError, Result};
use cadence_playback::EngineConfig;
use cadence_sync::SyncConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CadenceConfig {
    #[serde(default)]
    pub library: LibrarySettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_sync")]
    pub sync: SyncSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// Directory reconciled by `scan`
    pub music_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Holds `covers/`
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncSettings {
    #[serde(default = "default_burst_len")]
    pub burst_len: usize,

    #[serde(default = "default_burst_workers")]
    pub burst_workers: usize,

    #[serde(default = "default_steady_workers")]
    pub steady_workers: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_auto_advance_debounce_ms")]
    pub auto_advance_debounce_ms: u64,

    #[serde(default = "default_min_auto_advance_secs")]
    pub min_auto_advance_secs: u64,

    #[serde(default = "default_restart_threshold_secs")]
    pub restart_threshold_secs: u64,

    #[serde(default = "default_position_persist_secs")]
    pub position_persist_secs: u64,
}

impl CadenceConfig {
    /// Load configuration from file and environment
    ///
    /// `path` defaults to `cadence.toml` in the working directory; a missing
    /// default file is fine, a missing explicit file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from("cadence.toml");
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables, e.g. CADENCE_LIBRARY__MUSIC_DIR
        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.database_url.trim().is_empty() {
            return Err(CliError::Config(
                "Database url is required (set CADENCE_STORAGE__DATABASE_URL)".to_string(),
            ));
        }

        if self.sync.burst_workers == 0 || self.sync.steady_workers == 0 {
            return Err(CliError::Config(
                "Extraction worker counts must be at least 1".to_string(),
            ));
        }

        if self.sync.burst_len == 0 {
            return Err(CliError::Config("sync.burst_len must be at least 1".to_string()));
        }

        Ok(())
    }

    /// Directory to scan: an explicit override, else `library.music_dir`
    pub fn music_dir(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        explicit
            .or_else(|| self.library.music_dir.clone())
            .ok_or_else(|| {
                CliError::Config(
                    "No music directory (pass --dir or set CADENCE_LIBRARY__MUSIC_DIR)".to_string(),
                )
            })
    }

    pub fn covers_dir(&self) -> PathBuf {
        self.storage.cache_dir.join("covers")
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            burst_len: self.sync.burst_len,
            burst_workers: self.sync.burst_workers,
            steady_workers: self.sync.steady_workers,
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            auto_advance_debounce: Duration::from_millis(self.playback.auto_advance_debounce_ms),
            min_auto_advance_position: Duration::from_secs(self.playback.min_auto_advance_secs),
            restart_threshold: Duration::from_secs(self.playback.restart_threshold_secs),
            position_persist_interval: Duration::from_secs(self.playback.position_persist_secs),
        }
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        cache_dir: default_cache_dir(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/cadence.db".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./data/cache")
}

fn default_sync() -> SyncSettings {
    SyncSettings {
        burst_len: default_burst_len(),
        burst_workers: default_burst_workers(),
        steady_workers: default_steady_workers(),
    }
}

fn default_burst_len() -> usize {
    40
}

fn default_burst_workers() -> usize {
    4
}

fn default_steady_workers() -> usize {
    2
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        auto_advance_debounce_ms: default_auto_advance_debounce_ms(),
        min_auto_advance_secs: default_min_auto_advance_secs(),
        restart_threshold_secs: default_restart_threshold_secs(),
        position_persist_secs: default_position_persist_secs(),
    }
}

fn default_auto_advance_debounce_ms() -> u64 {
    800
}

fn default_min_auto_advance_secs() -> u64 {
    10
}

fn default_restart_threshold_secs() -> u64 {
    5
}

fn default_position_persist_secs() -> u64 {
    5
}

impl Default for StorageSettings {
    fn default() -> Self {
        default_storage()
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        default_sync()
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        default_playback()
    }
}
