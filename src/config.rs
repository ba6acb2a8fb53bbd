// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{APP_DIR_NAME, DEFAULT_FRAME_INTERVAL, DEFAULT_SNAPSHOT_QUALITY};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// User configuration, stored as JSON under the user's config directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JPEG quality for scan snapshots (1-100)
    pub snapshot_quality: u8,
    /// Request a snapshot after every handled code
    pub capture_on_scan: bool,
    /// Where snapshots are written (None = pictures dir)
    pub snapshot_dir: Option<PathBuf>,
    /// Abandon a code handler after this many milliseconds (None = wait forever)
    pub handler_timeout_ms: Option<u64>,
    /// Frame pacing for the image-folder camera
    pub frame_interval_ms: u64,
    /// Initial team name for the session context
    pub team_name: String,
    /// Fallback tracing filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_quality: DEFAULT_SNAPSHOT_QUALITY,
            capture_on_scan: true,
            snapshot_dir: None,
            handler_timeout_ms: None, // Preserve "run to completion"
            frame_interval_ms: DEFAULT_FRAME_INTERVAL.as_millis() as u64,
            team_name: String::new(),
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Default location: `~/.config/qrscan/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.json"))
    }

    /// Load the config from the default location
    ///
    /// Missing or unreadable files fall back to defaults; nothing here is fatal.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load the config from a specific file
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read config, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str::<Config>(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                Self::default()
            }
        }
    }

    /// Write the config to the default location
    pub fn save(&self) -> AppResult<()> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("No config directory available".to_string()))?;
        self.save_to(&path)
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Snapshot quality clamped to the valid JPEG range
    pub fn quality(&self) -> u8 {
        self.snapshot_quality.clamp(1, 100)
    }

    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_ms.map(Duration::from_millis)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Resolved snapshot directory
    pub fn snapshot_dir(&self) -> PathBuf {
        self.snapshot_dir.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR_NAME)
        })
    }
}
