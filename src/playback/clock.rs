//! Playback clock driving a dataset over a virtual timeline

use std::sync::Arc;

use chrono::NaiveDateTime;
use crossbeam_channel::Receiver;

use crate::config::ReplayConfig;
use crate::dataset::Dataset;
use crate::markers::MarkerManager;
use crate::query::{query_frame, FrameResults, QueryMode};

use super::events::{EventBus, PlaybackEvent, PlaybackObserver};
use super::types::{PlaybackCursor, PlaybackState};

/// Playback clock for a loaded dataset
///
/// Single-threaded: one caller owns the clock and drives it with
/// [`tick`](Self::tick). The dataset is held behind an [`Arc`] and
/// replaced wholesale on reload, so frames resolved from an older
/// dataset stay consistent.
#[derive(Debug)]
pub struct PlaybackClock {
    /// The dataset being played
    dataset: Option<Arc<Dataset>>,
    /// Elapsed time, speed and mode flags
    cursor: PlaybackCursor,
    /// Current playback state
    state: PlaybackState,
    /// Speed multiplier bounds
    min_speed: f64,
    max_speed: f64,
    /// Ascending speed steps
    speed_presets: Vec<f64>,
    /// Start playing as soon as a dataset is loaded
    auto_play: bool,
    /// Timeline markers
    markers: MarkerManager,
    /// Subscribers
    events: EventBus,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock {
    /// Create a clock with default settings
    pub fn new() -> Self {
        Self::with_config(&ReplayConfig::default())
    }

    /// Create a clock using the playback fields of `config`
    pub fn with_config(config: &ReplayConfig) -> Self {
        let config = config.clone().sanitized();
        Self {
            dataset: None,
            cursor: PlaybackCursor {
                elapsed: 0.0,
                speed_multiplier: config.default_speed,
                running: false,
                loop_enabled: config.loop_enabled,
                interpolation_enabled: config.interpolation_enabled,
            },
            state: PlaybackState::Stopped,
            min_speed: config.min_speed,
            max_speed: config.max_speed,
            speed_presets: config.speed_presets,
            auto_play: config.auto_play,
            markers: MarkerManager::new(),
            events: EventBus::new(),
        }
    }

    // ==================== Accessors ====================

    /// Get current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Check if playing
    pub fn is_running(&self) -> bool {
        self.cursor.running
    }

    /// Read-only view of the cursor
    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    /// Seconds since dataset start
    pub fn elapsed(&self) -> f64 {
        self.cursor.elapsed
    }

    /// Current speed multiplier
    pub fn speed(&self) -> f64 {
        self.cursor.speed_multiplier
    }

    /// Speed multiplier bounds `(min, max)`
    pub fn speed_range(&self) -> (f64, f64) {
        (self.min_speed, self.max_speed)
    }

    pub fn speed_presets(&self) -> &[f64] {
        &self.speed_presets
    }

    pub fn loop_enabled(&self) -> bool {
        self.cursor.loop_enabled
    }

    pub fn interpolation_enabled(&self) -> bool {
        self.cursor.interpolation_enabled
    }

    /// Query mode selected by the interpolation flag
    pub fn query_mode(&self) -> QueryMode {
        QueryMode::from_interpolation(self.cursor.interpolation_enabled)
    }

    /// The loaded dataset, if any
    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.dataset.as_ref()
    }

    /// Total duration in seconds (0 without data)
    pub fn duration(&self) -> f64 {
        self.dataset.as_ref().map(|d| d.duration()).unwrap_or(0.0)
    }

    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.dataset.as_ref().and_then(|d| d.start_time())
    }

    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.dataset.as_ref().and_then(|d| d.end_time())
    }

    /// Absolute instant under the cursor
    pub fn current_time(&self) -> Option<NaiveDateTime> {
        self.dataset
            .as_ref()
            .and_then(|d| d.time_at(self.cursor.elapsed))
    }

    /// Playback progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        let duration = self.duration();
        if duration <= 0.0 {
            return 0.0;
        }
        (self.cursor.elapsed / duration).clamp(0.0, 1.0)
    }

    pub fn markers(&self) -> &MarkerManager {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut MarkerManager {
        &mut self.markers
    }

    /// Resolve the frame under the cursor without publishing it
    pub fn current_frame(&self) -> FrameResults {
        self.dataset
            .as_ref()
            .map(|d| query_frame(d, self.cursor.elapsed, self.query_mode()))
            .unwrap_or_default()
    }

    // ==================== Subscribers ====================

    /// Register a synchronous observer
    pub fn subscribe(&mut self, observer: impl PlaybackObserver + 'static) {
        self.events.subscribe(observer);
    }

    /// Open a channel receiving every subsequent event
    pub fn subscribe_channel(&mut self) -> Receiver<PlaybackEvent> {
        self.events.subscribe_channel()
    }

    // ==================== Dataset ====================

    /// Attach a dataset, replacing any previous one
    ///
    /// Resets to Stopped at elapsed 0. A non-empty dataset publishes
    /// [`PlaybackEvent::DatasetLoaded`] followed by the first frame, and
    /// starts playing when auto-play is configured.
    pub fn load_dataset(&mut self, dataset: impl Into<Arc<Dataset>>) {
        let dataset = dataset.into();
        self.cursor.elapsed = 0.0;
        self.set_state(PlaybackState::Stopped);

        let empty = dataset.is_empty();
        let event = PlaybackEvent::DatasetLoaded {
            sample_count: dataset.len(),
            source_count: dataset.source_count(),
            duration: dataset.duration(),
        };
        self.dataset = Some(dataset);

        if empty {
            tracing::warn!("Loaded an empty dataset, playback disabled");
            return;
        }

        tracing::info!(
            "Playback dataset loaded, duration {:.2}s",
            self.duration()
        );
        self.events.publish(event);
        self.emit_frame();

        if self.auto_play {
            self.play();
        }
    }

    /// Drop the current dataset
    pub fn unload(&mut self) {
        self.dataset = None;
        self.cursor.elapsed = 0.0;
        self.set_state(PlaybackState::Stopped);
    }

    fn can_play(&self) -> bool {
        self.duration() > 0.0
    }

    // ==================== Transport ====================

    /// Start or resume playback
    ///
    /// No-op without data or with a zero-length dataset.
    pub fn play(&mut self) {
        if !self.can_play() {
            tracing::debug!("Play ignored, nothing to play");
            return;
        }
        self.set_state(PlaybackState::Playing);
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.set_state(PlaybackState::Paused);
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Stop playback and reset to the beginning
    pub fn stop(&mut self) {
        self.cursor.elapsed = 0.0;
        self.set_state(PlaybackState::Stopped);
        self.emit_frame();
    }

    /// Seek to `seconds` since start, clamped to `[0, duration]`
    ///
    /// Publishes a frame whether or not playback is running. Seeking away
    /// from 0 while Stopped leaves the clock Paused.
    pub fn seek(&mut self, seconds: f64) {
        if self.dataset.as_ref().map_or(true, |d| d.is_empty()) || seconds.is_nan() {
            return;
        }
        self.cursor.elapsed = seconds.clamp(0.0, self.duration());
        if self.state.is_stopped() && self.cursor.elapsed > 0.0 {
            self.set_state(PlaybackState::Paused);
        }
        self.emit_frame();
    }

    /// Seek to a fraction of the duration, clamped to `[0, 1]`
    pub fn seek_normalized(&mut self, fraction: f64) {
        if fraction.is_nan() {
            return;
        }
        self.seek(fraction.clamp(0.0, 1.0) * self.duration());
    }

    /// Set playback speed, clamped to the configured range
    pub fn set_speed(&mut self, multiplier: f64) {
        if multiplier.is_nan() {
            return;
        }
        self.cursor.speed_multiplier = multiplier.clamp(self.min_speed, self.max_speed);
        tracing::debug!("Playback speed set to {:.2}x", self.cursor.speed_multiplier);
    }

    /// Step up to the next preset above the current speed
    pub fn increase_speed(&mut self) {
        let current = self.cursor.speed_multiplier;
        if let Some(next) = self.speed_presets.iter().copied().find(|&p| p > current) {
            self.set_speed(next);
        }
    }

    /// Step down to the next preset below the current speed
    pub fn decrease_speed(&mut self) {
        let current = self.cursor.speed_multiplier;
        if let Some(prev) = self.speed_presets.iter().rev().copied().find(|&p| p < current) {
            self.set_speed(prev);
        }
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.cursor.loop_enabled = enabled;
    }

    pub fn set_interpolation(&mut self, enabled: bool) {
        self.cursor.interpolation_enabled = enabled;
    }

    /// Advance by `real_delta` seconds of wall-clock time
    ///
    /// Only has an effect while playing. Publishes at most one frame, and
    /// only when the elapsed time moved. At end of data the cursor either
    /// wraps (loop) or clamps to the duration and pauses. Returns whether
    /// a frame was published.
    pub fn tick(&mut self, real_delta: f64) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        let duration = self.duration();
        if duration <= 0.0 {
            return false;
        }

        let delta = if real_delta.is_finite() {
            real_delta.max(0.0)
        } else {
            0.0
        };
        let prev = self.cursor.elapsed;
        let mut next = prev + delta * self.cursor.speed_multiplier;
        let mut wrapped = false;
        let mut reached_end = false;

        if next >= duration {
            if self.cursor.loop_enabled {
                next = next.rem_euclid(duration);
                wrapped = true;
            } else {
                next = duration;
                reached_end = true;
            }
        }

        self.cursor.elapsed = next;
        let moved = wrapped || next != prev;

        let passed: Vec<PlaybackEvent> = if wrapped {
            self.markers
                .crossed(prev, duration)
                .chain(self.markers.crossed(f64::NEG_INFINITY, next))
                .map(marker_event)
                .collect()
        } else {
            self.markers.crossed(prev, next).map(marker_event).collect()
        };

        if moved {
            self.emit_frame();
        }
        for event in passed {
            self.events.publish(event);
        }
        if reached_end {
            tracing::debug!("End of data reached at {:.2}s", duration);
            self.set_state(PlaybackState::Paused);
        }

        moved
    }

    // ==================== Internals ====================

    fn set_state(&mut self, state: PlaybackState) {
        if self.state == state {
            return;
        }
        tracing::debug!(
            "Playback {} -> {}",
            self.state.display_name(),
            state.display_name()
        );
        self.state = state;
        self.cursor.running = state.is_playing();
        self.events.publish(PlaybackEvent::StateChanged(state));
    }

    fn emit_frame(&mut self) {
        let Some(dataset) = self.dataset.as_ref() else {
            return;
        };
        if dataset.is_empty() {
            return;
        }
        let elapsed = self.cursor.elapsed;
        let results = query_frame(dataset, elapsed, self.query_mode());
        self.events.publish(PlaybackEvent::Frame { elapsed, results });
    }
}

fn marker_event(marker: &crate::markers::Marker) -> PlaybackEvent {
    PlaybackEvent::MarkerReached {
        id: marker.id,
        name: marker.name.clone(),
        time: marker.time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::MarkerType;
    use crate::types::{Position, Sample};

    fn dataset(duration_secs: i64) -> Dataset {
        Dataset::from_samples(vec![
            Sample::new(1, "20250717", "1034", 0, 1, Position::new(0.0, 0.0)),
            Sample::new(
                1,
                "20250717",
                "1034",
                duration_secs * 1000,
                1,
                Position::new(duration_secs as f64, 0.0),
            ),
        ])
    }

    fn frames(rx: &Receiver<PlaybackEvent>) -> Vec<f64> {
        rx.try_iter()
            .filter_map(|e| match e {
                PlaybackEvent::Frame { elapsed, .. } => Some(elapsed),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_clock_lifecycle() {
        let mut clock = PlaybackClock::new();
        assert_eq!(clock.state(), PlaybackState::Stopped);

        clock.play();
        assert_eq!(clock.state(), PlaybackState::Stopped, "no data, play is a no-op");

        clock.load_dataset(dataset(10));
        clock.play();
        assert_eq!(clock.state(), PlaybackState::Playing);
        assert!(clock.is_running());

        clock.pause();
        assert_eq!(clock.state(), PlaybackState::Paused);
        assert!(!clock.is_running());

        clock.toggle_play_pause();
        assert_eq!(clock.state(), PlaybackState::Playing);

        clock.tick(3.0);
        clock.stop();
        assert_eq!(clock.state(), PlaybackState::Stopped);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_zero_duration_does_not_play() {
        let mut clock = PlaybackClock::new();
        clock.load_dataset(Dataset::from_samples(vec![Sample::new(
            1,
            "20250717",
            "1034",
            0,
            1,
            Position::default(),
        )]));
        clock.play();
        assert_eq!(clock.state(), PlaybackState::Stopped);
        assert!(!clock.tick(1.0));
    }

    #[test]
    fn test_loop_wraps_past_end() {
        let mut clock = PlaybackClock::new();
        clock.load_dataset(dataset(10));
        clock.set_loop(true);
        clock.play();

        clock.tick(6.0);
        clock.tick(6.0);
        assert_eq!(clock.elapsed(), 2.0);
        assert!(clock.is_running());
    }

    #[test]
    fn test_end_without_loop_pauses() {
        let mut clock = PlaybackClock::new();
        clock.load_dataset(dataset(10));
        clock.play();
        clock.seek(8.0);

        assert!(clock.tick(5.0));
        assert_eq!(clock.elapsed(), 10.0);
        assert!(!clock.is_running());
        assert_eq!(clock.state(), PlaybackState::Paused);

        assert!(!clock.tick(1.0));
    }

    #[test]
    fn test_one_frame_per_tick() {
        let mut clock = PlaybackClock::new();
        let rx = clock.subscribe_channel();
        clock.load_dataset(dataset(10));
        assert_eq!(frames(&rx), vec![0.0]);

        clock.play();
        clock.tick(1.0);
        clock.tick(0.0);
        clock.tick(-4.0);
        clock.tick(2.0);
        assert_eq!(frames(&rx), vec![1.0, 3.0]);
    }

    #[test]
    fn test_seek_while_paused_emits() {
        let mut clock = PlaybackClock::new();
        let rx = clock.subscribe_channel();
        clock.load_dataset(dataset(10));
        rx.try_iter().count();

        clock.seek(4.0);
        clock.seek(50.0);
        clock.seek(-1.0);
        clock.seek_normalized(0.25);
        assert_eq!(frames(&rx), vec![4.0, 10.0, 0.0, 2.5]);
        assert!(!clock.is_running());
        assert_eq!(clock.progress(), 0.25);
    }

    #[test]
    fn test_seek_from_stopped_pauses() {
        let mut clock = PlaybackClock::new();
        clock.load_dataset(dataset(10));
        let rx = clock.subscribe_channel();

        clock.seek(0.0);
        assert_eq!(clock.state(), PlaybackState::Stopped);

        clock.seek(4.0);
        clock.seek(6.0);
        assert_eq!(clock.state(), PlaybackState::Paused);
        assert_eq!(clock.elapsed(), 6.0);

        let states: Vec<PlaybackState> = rx
            .try_iter()
            .filter_map(|e| match e {
                PlaybackEvent::StateChanged(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(states, vec![PlaybackState::Paused]);

        clock.stop();
        assert!(clock.state().is_stopped());
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_unload_resets() {
        let mut clock = PlaybackClock::new();
        clock.load_dataset(dataset(10));
        clock.play();
        clock.tick(3.0);
        let rx = clock.subscribe_channel();

        clock.unload();
        assert!(clock.dataset().is_none());
        assert_eq!(clock.state(), PlaybackState::Stopped);
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.duration(), 0.0);
        assert!(clock.current_frame().is_empty());

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![PlaybackEvent::StateChanged(PlaybackState::Stopped)]
        );

        clock.play();
        clock.seek(2.0);
        assert!(!clock.is_running());
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_tick_ignored_when_not_playing() {
        let mut clock = PlaybackClock::new();
        clock.load_dataset(dataset(10));
        assert!(!clock.tick(1.0));
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_speed_clamping_and_presets() {
        let mut clock = PlaybackClock::new();
        clock.set_speed(2.0);
        assert_eq!(clock.speed(), 2.0);

        clock.set_speed(100.0);
        assert_eq!(clock.speed(), 10.0);

        clock.set_speed(-3.0);
        assert_eq!(clock.speed(), 0.1);

        clock.set_speed(f64::NAN);
        assert_eq!(clock.speed(), 0.1);

        clock.set_speed(1.0);
        clock.increase_speed();
        assert_eq!(clock.speed(), 2.0);
        clock.decrease_speed();
        clock.decrease_speed();
        assert_eq!(clock.speed(), 0.5);

        clock.set_speed(8.0);
        clock.increase_speed();
        assert_eq!(clock.speed(), 8.0);
    }

    #[test]
    fn test_speed_scales_tick() {
        let mut clock = PlaybackClock::new();
        clock.load_dataset(dataset(10));
        clock.set_speed(2.0);
        clock.play();
        clock.tick(1.5);
        assert_eq!(clock.elapsed(), 3.0);
    }

    #[test]
    fn test_state_events() {
        let mut clock = PlaybackClock::new();
        clock.load_dataset(dataset(10));
        let rx = clock.subscribe_channel();

        clock.play();
        clock.play();
        clock.tick(20.0);

        let states: Vec<PlaybackState> = rx
            .try_iter()
            .filter_map(|e| match e {
                PlaybackEvent::StateChanged(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(states, vec![PlaybackState::Playing, PlaybackState::Paused]);
    }

    #[test]
    fn test_markers_reported_when_crossed() {
        let mut clock = PlaybackClock::new();
        clock.load_dataset(dataset(10));
        clock.markers_mut().add("Equipment Alert", 2.5, MarkerType::Alarm);
        clock.markers_mut().add("Position Warning", 7.5, MarkerType::Warning);
        let rx = clock.subscribe_channel();

        clock.set_loop(true);
        clock.play();
        clock.tick(3.0);
        clock.tick(6.0);
        // 9 + 4 wraps to 3, passing 2.5 again
        clock.tick(4.0);

        let names: Vec<String> = rx
            .try_iter()
            .filter_map(|e| match e {
                PlaybackEvent::MarkerReached { name, .. } => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["Equipment Alert", "Position Warning", "Equipment Alert"]);
    }

    #[test]
    fn test_reload_resets_and_keeps_old_arc_intact() {
        let mut clock = PlaybackClock::new();
        clock.load_dataset(dataset(10));
        let held = clock.dataset().unwrap().clone();
        clock.play();
        clock.tick(4.0);

        clock.load_dataset(dataset(20));
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.state(), PlaybackState::Stopped);
        assert_eq!(clock.duration(), 20.0);
        assert_eq!(held.duration(), 10.0);
    }

    #[test]
    fn test_auto_play() {
        let config = ReplayConfig {
            auto_play: true,
            ..Default::default()
        };
        let mut clock = PlaybackClock::with_config(&config);
        clock.load_dataset(dataset(10));
        assert!(clock.is_running());
    }

    #[test]
    fn test_snapshot_mode_frames() {
        let mut clock = PlaybackClock::new();
        clock.set_interpolation(false);
        clock.load_dataset(dataset(10));
        clock.seek(5.0);
        let frame = clock.current_frame();
        assert_eq!(frame[&1].position, Position::new(0.0, 0.0));

        clock.set_interpolation(true);
        assert_eq!(clock.current_frame()[&1].position, Position::new(5.0, 0.0));
    }
}
