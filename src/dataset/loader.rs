//! Record parsing, file loading and merging
//!
//! Input is comma-delimited text, one record per line:
//!
//! ```text
//! date,time,milliseconds,sequenceKey,locationX,locationY[,...]
//! 20250717,1034,1500,1,12.5,-3.25
//! ```
//!
//! The first line is a header and is always skipped. Parsing is tolerant:
//! short records and records with unparseable fields are dropped and
//! counted in the [`LoadReport`], never returned as errors.

use std::collections::HashMap;
use std::path::Path;

use crate::config::ReplayConfig;
use crate::error::{ReplayError, Result, ResultExt};
use crate::types::{Position, Sample, SourceId};

use super::types::{Dataset, Fragment, LoadReport};

/// Minimum number of fields a record needs
pub const MIN_FIELDS: usize = 6;

/// Field delimiter
pub const DELIMITER: char = ',';

/// Why a single record was dropped
#[derive(Debug, Clone, PartialEq)]
enum RecordError {
    TooShort(usize),
    Malformed(String),
}

// ==================== Record parsing ====================

fn parse_record(line: &str, source_id: SourceId) -> std::result::Result<Sample, RecordError> {
    let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    if fields.len() < MIN_FIELDS {
        return Err(RecordError::TooShort(fields.len()));
    }

    let milliseconds: i64 = parse_field(fields[2], "milliseconds")?;
    let sequence_key: i64 = parse_field(fields[3], "sequence key")?;
    let x: f64 = parse_field(fields[4], "location X")?;
    let y: f64 = parse_field(fields[5], "location Y")?;

    if !x.is_finite() || !y.is_finite() {
        return Err(RecordError::Malformed(format!(
            "non-finite location ({}, {})",
            fields[4], fields[5]
        )));
    }

    let sample = Sample::new(
        source_id,
        fields[0],
        fields[1],
        milliseconds,
        sequence_key,
        Position::new(x, y),
    );

    if !sample.has_valid_timestamp() {
        return Err(RecordError::Malformed(format!(
            "invalid timestamp (date '{}', time '{}', ms {})",
            fields[0], fields[1], milliseconds
        )));
    }

    Ok(sample)
}

fn parse_field<T: std::str::FromStr>(
    text: &str,
    name: &str,
) -> std::result::Result<T, RecordError> {
    text.parse()
        .map_err(|_| RecordError::Malformed(format!("{} '{}' is not a number", name, text)))
}

/// Parse raw lines into samples for one source
///
/// Blank lines are ignored and do not count as skipped.
pub fn parse_records<I, S>(lines: I, source_id: SourceId, origin: &str) -> Fragment
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut samples = Vec::new();
    let mut report = LoadReport {
        origin: origin.to_string(),
        ..Default::default()
    };

    for (line_no, raw) in lines.into_iter().enumerate().skip(1) {
        let line = raw.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        match parse_record(line, source_id) {
            Ok(sample) => samples.push(sample),
            Err(RecordError::TooShort(count)) => {
                report.skipped_short += 1;
                tracing::trace!("{}:{}: dropped, only {} fields", origin, line_no + 1, count);
            }
            Err(RecordError::Malformed(message)) => {
                report.skipped_malformed += 1;
                tracing::debug!("{}:{}: dropped, {}", origin, line_no + 1, message);
            }
        }
    }

    report.ingested = samples.len();
    report.span = span_of(&samples);

    Fragment { samples, report }
}

fn span_of(samples: &[Sample]) -> Option<(chrono::NaiveDateTime, chrono::NaiveDateTime)> {
    let start = samples.iter().map(Sample::timestamp).min()?;
    let end = samples.iter().map(Sample::timestamp).max()?;
    Some((start, end))
}

fn log_report(report: &LoadReport, what: &str) {
    tracing::info!(
        "Loaded {} samples for {} from {} ({:.2}s span)",
        report.ingested,
        what,
        report.origin,
        report.span_secs()
    );
    if report.skipped() > 0 {
        tracing::warn!(
            "{}: skipped {} records ({} short, {} malformed)",
            report.origin,
            report.skipped(),
            report.skipped_short,
            report.skipped_malformed
        );
    }
}

// ==================== Entry points ====================

/// Load one source's records from in-memory lines
pub fn load<I, S>(lines: I, source_id: SourceId) -> Fragment
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let fragment = parse_records(lines, source_id, "<memory>");
    log_report(&fragment.report, &format!("source {}", source_id));
    fragment
}

// Invalid UTF-8 is replaced, so a corrupt record fails on its own
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|e| ReplayError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}

fn origin_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load one source's records from a file
pub fn load_file(path: impl AsRef<Path>, source_id: SourceId) -> Result<Fragment> {
    let path = path.as_ref();
    let lines = read_lines(path)?;
    let fragment = parse_records(lines, source_id, &origin_name(path));
    log_report(&fragment.report, &format!("source {}", source_id));
    Ok(fragment)
}

/// Concatenate fragments and build a sorted dataset
pub fn merge<I>(fragments: I) -> Dataset
where
    I: IntoIterator<Item = Fragment>,
{
    let samples: Vec<Sample> = fragments
        .into_iter()
        .flat_map(|fragment| fragment.samples)
        .collect();
    let dataset = Dataset::from_samples(samples);

    if let (Some(start), Some(end)) = (dataset.start_time(), dataset.end_time()) {
        tracing::info!(
            "Merged {} samples from {} sources, {:.2}s ({} to {})",
            dataset.len(),
            dataset.source_count(),
            dataset.duration(),
            start.format("%H:%M:%S%.3f"),
            end.format("%H:%M:%S%.3f")
        );
    } else {
        tracing::warn!("Merged dataset is empty");
    }

    dataset
}

/// Split one input into pseudo-sources by sequence key
///
/// Each distinct key gets its own source id, numbered 1, 2, 3, ... in
/// order of first appearance.
pub fn load_grouped<I, S>(lines: I) -> Fragment
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    group_by_sequence(parse_records(lines, 0, "<memory>"))
}

/// [`load_grouped`] reading from a file, merged into a dataset
pub fn load_grouped_file(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let lines = read_lines(path)?;
    let fragment = group_by_sequence(parse_records(lines, 0, &origin_name(path)));

    let dataset = merge([fragment]);
    if dataset.is_empty() {
        return Err(ReplayError::NoData(format!(
            "no valid records in {}",
            path.display()
        )));
    }
    Ok(dataset)
}

fn group_by_sequence(fragment: Fragment) -> Fragment {
    let mut assigned: HashMap<i64, SourceId> = HashMap::new();
    let mut counts: Vec<(i64, SourceId, usize)> = Vec::new();

    let samples: Vec<Sample> = fragment
        .samples
        .into_iter()
        .map(|sample| {
            let next_id = assigned.len() as SourceId + 1;
            let source_id = *assigned.entry(sample.sequence_key).or_insert_with(|| {
                counts.push((sample.sequence_key, next_id, 0));
                next_id
            });
            counts[(source_id - 1) as usize].2 += 1;
            sample.into_source(source_id)
        })
        .collect();

    tracing::info!(
        "Found {} distinct point numbers in {}",
        counts.len(),
        fragment.report.origin
    );
    for (key, source_id, count) in &counts {
        tracing::debug!("Point {}: {} samples assigned to source {}", key, count, source_id);
    }
    log_report(&fragment.report, "grouped points");

    Fragment {
        samples,
        report: fragment.report,
    }
}

/// Load every configured per-source file found in `dir`
///
/// `config.source_files[i]` becomes source `i + 1`. Missing or unreadable
/// files are logged and skipped without affecting the other sources. Fails
/// only when no file yields any sample.
pub fn load_folder(dir: impl AsRef<Path>, config: &ReplayConfig) -> Result<Dataset> {
    let dir = dir.as_ref();
    let mut fragments = Vec::new();

    for (idx, name) in config.source_files.iter().enumerate() {
        let source_id = idx as SourceId + 1;
        let path = dir.join(name);

        if !path.exists() {
            tracing::warn!("Source {} file not found: {}", source_id, path.display());
            continue;
        }

        match load_file(&path, source_id).with_context(|| format!("source {}", source_id)) {
            Ok(fragment) => fragments.push(fragment),
            Err(e) => tracing::error!("Failed to load {}", e),
        }
    }

    let dataset = merge(fragments);
    if dataset.is_empty() {
        return Err(ReplayError::NoData(format!(
            "no samples found in {} (looked for {})",
            dir.display(),
            config.source_files.join(", ")
        )));
    }
    Ok(dataset)
}
