//! # Track Replay: synchronized playback of location logs
//!
//! Replays independent, asynchronously sampled location logs (one per
//! device) on one shared virtual timeline. The crate is the temporal
//! alignment and interpolation engine; drawing, widgets and file pickers
//! belong to whatever presentation layer drives it.
//!
//! ## Architecture
//!
//! - **Dataset**: parses delimited records per source, merges them into one
//!   timestamp-sorted [`Dataset`] and computes its time bounds
//! - **Query**: pure functions resolving, for any elapsed time, either the
//!   latest sample per source or a linearly interpolated one
//! - **Playback**: a [`PlaybackClock`] advanced by an external frame loop,
//!   publishing one frame per tick to observers or channels
//! - **Markers**: alarm/event bookmarks on the timeline
//!
//! ## Example
//!
//! ```no_run
//! use track_replay::{dataset, PlaybackClock, PlaybackEvent, ReplayConfig};
//!
//! let config = ReplayConfig::default();
//! let data = dataset::load_folder("recordings/2025-07-17", &config)?;
//!
//! let mut clock = PlaybackClock::with_config(&config);
//! let frames = clock.subscribe_channel();
//! clock.load_dataset(data);
//! clock.play();
//!
//! // called by the host's frame loop
//! clock.tick(1.0 / 30.0);
//!
//! for event in frames.try_iter() {
//!     if let PlaybackEvent::Frame { elapsed, results } = event {
//!         for (source, sample) in &results {
//!             println!("{elapsed:.2}s source {source}: {:?}", sample.position);
//!         }
//!     }
//! }
//! # Ok::<(), track_replay::ReplayError>(())
//! ```

pub mod config;
pub mod dataset;
pub mod display;
pub mod error;
pub mod markers;
pub mod playback;
pub mod query;
pub mod types;

// Re-export commonly used types
pub use config::ReplayConfig;
pub use dataset::{Dataset, Fragment, LoadReport};
pub use error::{ReplayError, Result};
pub use markers::{Marker, MarkerManager, MarkerType};
pub use playback::{PlaybackClock, PlaybackCursor, PlaybackEvent, PlaybackObserver, PlaybackState};
pub use query::{FrameResults, QueryMode};
pub use types::{Position, Sample, SourceId};
