//! Dataset data types

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::types::{offset_by_seconds, seconds_between, Sample, SourceId};

/// Per-file ingestion statistics, reported for diagnostics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Human readable origin (file name or "<memory>")
    pub origin: String,
    /// Records turned into samples
    pub ingested: usize,
    /// Records dropped for having fewer than six fields
    pub skipped_short: usize,
    /// Records dropped because a field failed to parse
    pub skipped_malformed: usize,
    /// Earliest and latest timestamp among the ingested samples
    pub span: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl LoadReport {
    /// Total number of dropped records
    pub fn skipped(&self) -> usize {
        self.skipped_short + self.skipped_malformed
    }

    /// Length of the time span in seconds (0 when empty)
    pub fn span_secs(&self) -> f64 {
        self.span
            .map(|(start, end)| seconds_between(start, end))
            .unwrap_or(0.0)
    }
}

/// Samples parsed from one input, in input order, not yet merged
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub samples: Vec<Sample>,
    pub report: LoadReport,
}

impl Fragment {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Samples from one or more sources, globally sorted by timestamp
///
/// A dataset is immutable once built; a reload builds a new one. The
/// per-source index lists point into `samples` and are themselves sorted
/// by timestamp, which lets queries binary-search one source at a time.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    samples: Vec<Sample>,
    by_source: BTreeMap<SourceId, Vec<usize>>,
}

impl Dataset {
    /// Build a dataset, stable-sorting the samples by timestamp
    pub fn from_samples(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.timestamp());

        let mut by_source: BTreeMap<SourceId, Vec<usize>> = BTreeMap::new();
        for (idx, sample) in samples.iter().enumerate() {
            by_source.entry(sample.source_id).or_default().push(idx);
        }

        Self { samples, by_source }
    }

    /// All samples in timestamp order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of the first sample
    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.samples.first().map(|s| s.timestamp())
    }

    /// Timestamp of the last sample
    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.samples.last().map(|s| s.timestamp())
    }

    /// `end_time - start_time` in seconds, 0 for an empty dataset
    pub fn duration(&self) -> f64 {
        match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) => seconds_between(start, end).max(0.0),
            _ => 0.0,
        }
    }

    /// Absolute instant `elapsed` seconds after the start
    pub fn time_at(&self, elapsed: f64) -> Option<NaiveDateTime> {
        self.start_time()
            .map(|start| offset_by_seconds(start, elapsed))
    }

    /// Source ids present, ascending
    pub fn source_ids(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.by_source.keys().copied()
    }

    /// Number of distinct sources
    pub fn source_count(&self) -> usize {
        self.by_source.len()
    }

    /// Indices into [`Dataset::samples`] for one source, in timestamp order
    pub fn source_indices(&self, source_id: SourceId) -> &[usize] {
        self.by_source
            .get(&source_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Samples of one source, in timestamp order
    pub fn source_samples(&self, source_id: SourceId) -> impl Iterator<Item = &Sample> + '_ {
        self.source_indices(source_id)
            .iter()
            .map(move |&idx| &self.samples[idx])
    }
}
