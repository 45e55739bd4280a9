//! Configuration for track replay
//!
//! [`ReplayConfig`] holds playback defaults and the per-source file names
//! used by folder loading. It is stored as JSON; every field has a default
//! so partial files load fine.
//!
//! # Config Location
//!
//! The default config file lives in the platform config directory under
//! `track-replay`:
//!
//! - **Linux**: `~/.config/track-replay/replay.json`
//! - **macOS**: `~/Library/Application Support/track-replay/replay.json`
//! - **Windows**: `%APPDATA%\track-replay\replay.json`
//!
//! Out-of-range values are sanitized on load rather than rejected.

use crate::error::{ReplayError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "track-replay";

/// Config filename
pub const CONFIG_FILE: &str = "replay.json";

/// Slowest playback speed accepted by default
pub const DEFAULT_MIN_SPEED: f64 = 0.1;

/// Fastest playback speed accepted by default
pub const DEFAULT_MAX_SPEED: f64 = 10.0;

/// Speed steps used by increase/decrease speed
pub const DEFAULT_SPEED_PRESETS: [f64; 6] = [0.25, 0.5, 1.0, 2.0, 4.0, 8.0];

/// Per-source file names looked up by folder loading
pub const DEFAULT_SOURCE_FILES: [&str; 2] = ["smartphone1.csv", "smartphone2.csv"];

/// Default tick cadence of the headless driver (~30 Hz)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 33;

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the default config file
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Playback and loading configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Lower bound for the speed multiplier
    pub min_speed: f64,

    /// Upper bound for the speed multiplier
    pub max_speed: f64,

    /// Speed multiplier after construction
    pub default_speed: f64,

    /// Steps for increase/decrease speed, ascending
    pub speed_presets: Vec<f64>,

    /// Wrap to the start at end of data instead of pausing
    pub loop_enabled: bool,

    /// Interpolated frames instead of latest-sample snapshots
    pub interpolation_enabled: bool,

    /// Start playing as soon as a dataset is loaded
    pub auto_play: bool,

    /// File names for sources 1, 2, ... inside a data folder
    pub source_files: Vec<String>,

    /// Tick cadence of the headless driver in milliseconds
    pub tick_interval_ms: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            min_speed: DEFAULT_MIN_SPEED,
            max_speed: DEFAULT_MAX_SPEED,
            default_speed: 1.0,
            speed_presets: DEFAULT_SPEED_PRESETS.to_vec(),
            loop_enabled: false,
            interpolation_enabled: true,
            auto_play: false,
            source_files: DEFAULT_SOURCE_FILES.iter().map(|s| s.to_string()).collect(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl ReplayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ReplayError::io(path, e))?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            ReplayError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        Ok(config.sanitized())
    }

    /// Load a config file, returning defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load replay config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save config to disk as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ReplayError::io(parent, e))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ReplayError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| ReplayError::io(path, e))
    }

    /// Clamp and reorder fields into a consistent state
    ///
    /// - speed bounds become positive and ordered
    /// - `default_speed` is clamped into the bounds
    /// - presets drop non-positive / non-finite entries and are sorted
    /// - a zero tick interval becomes the default
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if !(self.min_speed.is_finite() && self.min_speed > 0.0) {
            self.min_speed = defaults.min_speed;
        }
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            self.max_speed = defaults.max_speed;
        }
        if self.min_speed > self.max_speed {
            std::mem::swap(&mut self.min_speed, &mut self.max_speed);
        }

        self.default_speed = if self.default_speed.is_nan() {
            1.0_f64.clamp(self.min_speed, self.max_speed)
        } else {
            self.default_speed.clamp(self.min_speed, self.max_speed)
        };

        self.speed_presets.retain(|s| s.is_finite() && *s > 0.0);
        self.speed_presets.sort_by(f64::total_cmp);
        self.speed_presets.dedup();

        if self.tick_interval_ms == 0 {
            self.tick_interval_ms = defaults.tick_interval_ms;
        }

        self
    }
}
