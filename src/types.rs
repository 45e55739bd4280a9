//! Core data types for track replay
//!
//! This module contains the fundamental data structures shared by the
//! loader, the query engine and the playback clock.
//!
//! # Main Types
//!
//! - [`SourceId`] - Identifier of one independent location stream (device)
//! - [`Position`] - 2D coordinate in source space (meters)
//! - [`Sample`] - One observation from one source at one instant
//!
//! # Timestamps
//!
//! Raw records carry a `yyyymmdd` date, an `hhmm` time of day and a raw
//! millisecond offset. [`reconstruct_timestamp`] combines them into a
//! [`NaiveDateTime`]. Malformed components yield [`INVALID_TIMESTAMP`]
//! instead of failing.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Identifier of one source device / stream
pub type SourceId = u32;

/// Sentinel returned when a timestamp cannot be reconstructed
pub const INVALID_TIMESTAMP: NaiveDateTime = NaiveDateTime::MIN;

/// 2D coordinate in source space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`
    pub fn lerp(self, other: Position, t: f64) -> Position {
        let t = t.clamp(0.0, 1.0);
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// One observation from one source at one instant
///
/// The timestamp is computed once at construction from the raw
/// date/time/millisecond fields and cannot drift from them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Originating device / stream
    pub source_id: SourceId,
    /// Raw `yyyymmdd` date field
    pub date: String,
    /// Raw `hhmm` time-of-day field
    pub time: String,
    /// Raw sub-second offset in milliseconds (may exceed 999)
    pub milliseconds: i64,
    /// Point number grouping samples of one logical tracked entity
    pub sequence_key: i64,
    /// Location in meters
    pub position: Position,
    timestamp: NaiveDateTime,
}

impl Sample {
    /// Create a sample, reconstructing its timestamp from the raw fields
    pub fn new(
        source_id: SourceId,
        date: impl Into<String>,
        time: impl Into<String>,
        milliseconds: i64,
        sequence_key: i64,
        position: Position,
    ) -> Self {
        let date = date.into();
        let time = time.into();
        let timestamp = reconstruct_timestamp(&date, &time, milliseconds);
        Self {
            source_id,
            date,
            time,
            milliseconds,
            sequence_key,
            position,
            timestamp,
        }
    }

    /// Absolute instant of the observation
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Whether the raw fields formed a valid timestamp
    pub fn has_valid_timestamp(&self) -> bool {
        self.timestamp != INVALID_TIMESTAMP
    }

    /// Re-attribute a freshly parsed sample, consuming it
    pub fn into_source(mut self, source_id: SourceId) -> Self {
        self.source_id = source_id;
        self
    }

    /// Copy of this sample at another position; timestamp fields are kept
    pub fn with_position(&self, position: Position) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }
}

/// Combine `yyyymmdd`, `hhmm` and a raw millisecond offset into an instant
///
/// Seconds are always zero before the offset is added, so an offset of
/// 61_500 lands 1 minute 1.5 seconds after `hh:mm:00`. Any malformed part
/// yields [`INVALID_TIMESTAMP`].
pub fn reconstruct_timestamp(date: &str, time: &str, milliseconds: i64) -> NaiveDateTime {
    try_reconstruct(date.trim(), time.trim(), milliseconds).unwrap_or(INVALID_TIMESTAMP)
}

fn try_reconstruct(date: &str, time: &str, milliseconds: i64) -> Option<NaiveDateTime> {
    let year: i32 = digits(date, 0, 4)?;
    let month: u32 = digits(date, 4, 6)?;
    let day: u32 = digits(date, 6, 8)?;
    let hour: u32 = digits(time, 0, 2)?;
    let minute: u32 = digits(time, 2, 4)?;

    let base = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)?;
    base.checked_add_signed(TimeDelta::try_milliseconds(milliseconds)?)
}

fn digits<T: std::str::FromStr>(s: &str, start: usize, end: usize) -> Option<T> {
    let part = s.get(start..end)?;
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Signed number of seconds from `from` to `to`
pub fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to - from;
    match delta.num_nanoseconds() {
        Some(ns) => ns as f64 / 1e9,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

/// `base` shifted by a (possibly fractional, possibly negative) number of seconds
///
/// Saturates at the representable range rather than failing.
pub fn offset_by_seconds(base: NaiveDateTime, seconds: f64) -> NaiveDateTime {
    if !seconds.is_finite() {
        return if seconds > 0.0 {
            NaiveDateTime::MAX
        } else {
            NaiveDateTime::MIN
        };
    }
    let nanos = (seconds * 1e9).round();
    let delta = if nanos.abs() < i64::MAX as f64 {
        TimeDelta::nanoseconds(nanos as i64)
    } else {
        TimeDelta::try_milliseconds((seconds * 1e3).round() as i64).unwrap_or(if seconds > 0.0 {
            TimeDelta::MAX
        } else {
            TimeDelta::MIN
        })
    };
    base.checked_add_signed(delta).unwrap_or(if seconds > 0.0 {
        NaiveDateTime::MAX
    } else {
        NaiveDateTime::MIN
    })
}
