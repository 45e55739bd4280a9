//! Playback data types

use serde::{Deserialize, Serialize};

/// State of the playback clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// At elapsed 0, not advancing
    #[default]
    Stopped,
    /// Holding the current elapsed time
    Paused,
    /// Advancing on every tick
    Playing,
}

impl PlaybackState {
    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    /// Check if paused
    pub fn is_paused(&self) -> bool {
        matches!(self, PlaybackState::Paused)
    }

    /// Check if stopped
    pub fn is_stopped(&self) -> bool {
        matches!(self, PlaybackState::Stopped)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Paused => "Paused",
            PlaybackState::Playing => "Playing",
        }
    }
}

/// Mutable cursor of the running animation
///
/// Only the [`PlaybackClock`](super::PlaybackClock) writes to it; callers
/// get a shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackCursor {
    /// Seconds since dataset start, within `[0, duration]`
    pub elapsed: f64,
    /// Playback speed multiplier (1.0 = real-time)
    pub speed_multiplier: f64,
    /// Whether the clock advances on tick
    pub running: bool,
    /// Wrap to the start at end of data
    pub loop_enabled: bool,
    /// Interpolated rather than snapshot frames
    pub interpolation_enabled: bool,
}

impl Default for PlaybackCursor {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            speed_multiplier: 1.0,
            running: false,
            loop_enabled: false,
            interpolation_enabled: true,
        }
    }
}
