//! Composer configuration
//!
//! Loaded from a RON file. Every field has a default, so a partial file (or
//! no file at all) is valid:
//!
//! ```ron
//! (
//!     maps_dir: "maps",
//!     debug: true,
//!     load_delay_ms: 10,
//! )
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use crate::schematic::io::limits::MAX_COOLDOWN;

/// Errors loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapEditorConfig {
    /// Directory holding one `<name>.ron` document per map
    pub maps_dir: PathBuf,
    /// Reload the current map when its document changes on disk
    pub enable_file_watcher: bool,
    /// Verbose per-object logging
    pub debug: bool,
    /// Delay between clearing the old map and spawning the new one
    pub load_delay_ms: u64,
    /// How long the file watcher stays off after the editor writes a document
    pub watcher_guard_secs: f32,
    /// Write brotli-compressed documents
    pub compress_documents: bool,
    /// Cooldown given to teleporters placed with the tool
    pub default_teleport_cooldown: f32,
}

impl Default for MapEditorConfig {
    fn default() -> Self {
        Self {
            maps_dir: PathBuf::from("maps"),
            enable_file_watcher: true,
            debug: false,
            load_delay_ms: 10,
            watcher_guard_secs: 1.0,
            compress_documents: false,
            default_teleport_cooldown: 10.0,
        }
    }
}

impl MapEditorConfig {
    /// Load configuration from a RON file.
    /// A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io { path: path.to_path_buf(), source });
            }
        };
        let config: Self = ron::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.watcher_guard_secs >= 0.0 && self.watcher_guard_secs <= MAX_COOLDOWN) {
            return Err(ConfigError::Invalid(format!("watcher_guard_secs = {}", self.watcher_guard_secs)));
        }
        if !(self.default_teleport_cooldown > 0.0 && self.default_teleport_cooldown <= MAX_COOLDOWN) {
            return Err(ConfigError::Invalid(format!(
                "default_teleport_cooldown = {}",
                self.default_teleport_cooldown
            )));
        }
        Ok(())
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    pub fn watcher_guard(&self) -> Duration {
        Duration::try_from_secs_f32(self.watcher_guard_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Default log filter directive for this configuration
    pub fn log_level(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}
