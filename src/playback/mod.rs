//! Playback clock module
//!
//! This module drives a loaded dataset as an animation over a virtual
//! timeline. An external frame or timer loop calls
//! [`PlaybackClock::tick`] with the real time since the previous call;
//! the clock advances its cursor by that delta times the speed multiplier
//! and publishes the resolved positions to its subscribers.
//!
//! # Features
//!
//! - Play, pause, stop and toggle
//! - Seek by seconds or by fraction of the duration, also while paused
//! - Speed multiplier with clamped range and preset steps
//! - Loop or pause at end of data
//! - Snapshot or interpolated frames
//! - Timeline markers reported as the cursor passes them

pub mod clock;
pub mod events;
pub mod types;

pub use clock::PlaybackClock;
pub use events::{EventBus, PlaybackEvent, PlaybackObserver};
pub use types::{PlaybackCursor, PlaybackState};
