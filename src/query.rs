//! Temporal queries over a loaded [`Dataset`]
//!
//! Every function here is a pure function of `(dataset, elapsed, mode)`.
//! Results are fresh [`Sample`] values; stored samples are never touched,
//! and nothing is derived from a previous query's output.
//!
//! Query instants are `dataset.start_time() + elapsed`. Elapsed values
//! outside `[0, duration]` are allowed and resolve to the boundary samples.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::types::{seconds_between, Sample, SourceId};

/// Result set of one query: one sample per source that has data
pub type FrameResults = BTreeMap<SourceId, Sample>;

/// How a playback frame is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryMode {
    /// Latest sample at or before the query instant
    Snapshot,
    /// Linear blend between the bracketing samples
    #[default]
    Interpolated,
}

impl QueryMode {
    pub fn from_interpolation(enabled: bool) -> Self {
        if enabled {
            QueryMode::Interpolated
        } else {
            QueryMode::Snapshot
        }
    }
}

/// Latest sample per source with `timestamp <= start + elapsed`
///
/// Sources with nothing at or before the instant are left out.
pub fn latest_per_source(dataset: &Dataset, elapsed: f64) -> FrameResults {
    let Some(target) = dataset.time_at(elapsed) else {
        return FrameResults::new();
    };
    let samples = dataset.samples();

    dataset
        .source_ids()
        .filter_map(|source_id| {
            let indices = dataset.source_indices(source_id);
            let upto = indices.partition_point(|&i| samples[i].timestamp() <= target);
            (upto > 0).then(|| (source_id, samples[indices[upto - 1]].clone()))
        })
        .collect()
}

/// Forward scan equivalent of [`latest_per_source`]
///
/// Walks the global timeline and stops at the first sample past the
/// query instant. Kept as the reference the indexed version is checked
/// against; O(n) rather than O(sources * log n).
pub fn latest_per_source_scan(dataset: &Dataset, elapsed: f64) -> FrameResults {
    let Some(target) = dataset.time_at(elapsed) else {
        return FrameResults::new();
    };

    let mut latest: BTreeMap<SourceId, &Sample> = BTreeMap::new();
    for sample in dataset.samples() {
        if sample.timestamp() > target {
            break;
        }
        latest.insert(sample.source_id, sample);
    }

    latest
        .into_iter()
        .map(|(id, sample)| (id, sample.clone()))
        .collect()
}

/// Position of `source_id` at `start + elapsed`, linearly interpolated
///
/// - no samples for the source: `None`
/// - before the first sample: the first sample verbatim
/// - after the last sample: the last sample verbatim
/// - exactly on a sample: that sample verbatim
/// - otherwise a new sample between `before` and `after`, carrying
///   `before`'s date/time/millisecond fields
pub fn interpolate(dataset: &Dataset, source_id: SourceId, elapsed: f64) -> Option<Sample> {
    let target = dataset.time_at(elapsed)?;
    let samples = dataset.samples();
    let indices = dataset.source_indices(source_id);
    if indices.is_empty() {
        return None;
    }

    // last sample <= target, first sample >= target
    let upto = indices.partition_point(|&i| samples[i].timestamp() <= target);
    let from = indices.partition_point(|&i| samples[i].timestamp() < target);
    let before = upto.checked_sub(1).map(|k| indices[k]);
    let after = indices.get(from).copied();

    match (before, after) {
        (None, _) => {
            tracing::trace!("source {}: query precedes data, using first sample", source_id);
            Some(samples[indices[0]].clone())
        }
        (Some(b), None) => {
            tracing::trace!("source {}: query follows data, using last sample", source_id);
            Some(samples[b].clone())
        }
        (Some(b), Some(a)) if a == b => Some(samples[b].clone()),
        (Some(b), Some(a)) => {
            let before = &samples[b];
            let after = &samples[a];
            let t = blend_factor(before.timestamp(), after.timestamp(), target);
            Some(before.with_position(before.position.lerp(after.position, t)))
        }
    }
}

fn blend_factor(before: NaiveDateTime, after: NaiveDateTime, target: NaiveDateTime) -> f64 {
    let span = seconds_between(before, after);
    if span <= 0.0 {
        return 0.0;
    }
    (seconds_between(before, target) / span).clamp(0.0, 1.0)
}

/// [`interpolate`] for every source in the dataset
pub fn interpolate_all(dataset: &Dataset, elapsed: f64) -> FrameResults {
    dataset
        .source_ids()
        .filter_map(|id| interpolate(dataset, id, elapsed).map(|s| (id, s)))
        .collect()
}

/// Resolve one playback frame in the given mode
pub fn query_frame(dataset: &Dataset, elapsed: f64, mode: QueryMode) -> FrameResults {
    match mode {
        QueryMode::Snapshot => latest_per_source(dataset, elapsed),
        QueryMode::Interpolated => interpolate_all(dataset, elapsed),
    }
}
