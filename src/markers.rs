//! Timeline markers (alarm / event bookmarks)
//!
//! Markers sit at an elapsed time on the playback timeline. The clock
//! reports each marker the cursor passes while playing, and a
//! presentation layer can place them on a scrub bar through
//! [`Marker::normalized_position`].

use serde::{Deserialize, Serialize};

/// Marker type for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerType {
    /// Equipment alarm
    Alarm,
    /// Position / geofence warning
    Warning,
    /// Generic event
    #[default]
    Event,
    /// Free-form annotation
    Note,
}

impl MarkerType {
    /// Get the display name for this marker type
    pub fn display_name(&self) -> &'static str {
        match self {
            MarkerType::Alarm => "Alarm",
            MarkerType::Warning => "Warning",
            MarkerType::Event => "Event",
            MarkerType::Note => "Note",
        }
    }
}

/// A marker at a specific elapsed time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Unique identifier
    pub id: u32,
    /// Marker label
    pub name: String,
    /// Seconds since dataset start
    pub time: f64,
    pub marker_type: MarkerType,
}

impl Marker {
    pub fn new(id: u32, name: impl Into<String>, time: f64, marker_type: MarkerType) -> Self {
        Self {
            id,
            name: name.into(),
            time,
            marker_type,
        }
    }

    /// Position on a `[0, 1]` timeline of the given duration
    pub fn normalized_position(&self, duration: f64) -> f64 {
        if duration <= 0.0 {
            return 0.0;
        }
        (self.time / duration).clamp(0.0, 1.0)
    }
}

/// Manager for markers, kept sorted by time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkerManager {
    markers: Vec<Marker>,
    next_id: u32,
}

impl MarkerManager {
    pub fn new() -> Self {
        Self {
            markers: Vec::new(),
            next_id: 1,
        }
    }

    /// Add a marker, returning its id. Negative or NaN times are placed at 0.
    pub fn add(&mut self, name: impl Into<String>, time: f64, marker_type: MarkerType) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;

        let time = if time.is_nan() { 0.0 } else { time.max(0.0) };
        self.markers.push(Marker::new(id, name, time, marker_type));
        self.sort_by_time();
        id
    }

    /// Remove a marker by ID
    pub fn remove(&mut self, id: u32) -> bool {
        if let Some(pos) = self.markers.iter().position(|m| m.id == id) {
            self.markers.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn get(&self, id: u32) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn all(&self) -> &[Marker] {
        &self.markers
    }

    /// Markers with `from < time <= to`
    pub fn crossed(&self, from: f64, to: f64) -> impl Iterator<Item = &Marker> {
        self.markers
            .iter()
            .filter(move |m| m.time > from && m.time <= to)
    }

    /// Find the next marker after a given time
    pub fn next_after(&self, time: f64) -> Option<&Marker> {
        self.markers.iter().find(|m| m.time > time)
    }

    /// Find the previous marker before a given time
    pub fn prev_before(&self, time: f64) -> Option<&Marker> {
        self.markers.iter().rev().find(|m| m.time < time)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    fn sort_by_time(&mut self) {
        self.markers.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
}
