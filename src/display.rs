//! Time labels for a presentation layer

use chrono::NaiveDateTime;

use crate::playback::PlaybackClock;

/// `MM:SS` for a number of seconds; negative and NaN values show as `00:00`
pub fn format_elapsed(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// `HH:MM:SS.fff`
pub fn format_wall_clock(time: NaiveDateTime) -> String {
    time.format("%H:%M:%S%.3f").to_string()
}

/// `"MM:SS / MM:SS"` for the cursor against the duration
pub fn elapsed_label(clock: &PlaybackClock) -> String {
    format!(
        "{} / {}",
        format_elapsed(clock.elapsed()),
        format_elapsed(clock.duration())
    )
}

/// `"HH:MM:SS.fff / HH:MM:SS.fff"` for the instant under the cursor
/// against the end of data; `None` without a dataset
pub fn wall_clock_label(clock: &PlaybackClock) -> Option<String> {
    let current = clock.current_time()?;
    let end = clock.end_time()?;
    Some(format!(
        "{} / {}",
        format_wall_clock(current),
        format_wall_clock(end)
    ))
}
