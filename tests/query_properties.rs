//! Property-based tests for dataset ordering and temporal queries

mod common;

use common::builders::sample;
use proptest::prelude::*;
use track_replay::query::{interpolate, latest_per_source, latest_per_source_scan};
use track_replay::types::seconds_between;
use track_replay::{Dataset, Sample};

fn samples_strategy() -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::vec((1u32..4, 0i64..60_000, -100.0f64..100.0), 1..60).prop_map(|raw| {
        raw.into_iter()
            .map(|(source, ms, x)| sample(source, ms, x, -x))
            .collect()
    })
}

proptest! {
    #[test]
    fn test_dataset_is_sorted(samples in samples_strategy()) {
        let data = Dataset::from_samples(samples);

        // Property: timestamps never decrease
        for pair in data.samples().windows(2) {
            prop_assert!(pair[0].timestamp() <= pair[1].timestamp());
        }
    }

    #[test]
    fn test_bounds_cover_all_samples(samples in samples_strategy()) {
        let data = Dataset::from_samples(samples);
        let start = data.start_time().unwrap();
        let end = data.end_time().unwrap();

        for s in data.samples() {
            prop_assert!(start <= s.timestamp() && s.timestamp() <= end);
        }
        let span = seconds_between(start, end);
        prop_assert!((data.duration() - span).abs() < 1e-9);
    }

    #[test]
    fn test_indexed_snapshot_matches_scan(
        samples in samples_strategy(),
        elapsed in -5.0f64..70.0,
    ) {
        let data = Dataset::from_samples(samples);
        prop_assert_eq!(
            latest_per_source(&data, elapsed),
            latest_per_source_scan(&data, elapsed)
        );
    }

    #[test]
    fn test_snapshot_never_from_the_future(
        samples in samples_strategy(),
        elapsed in 0.0f64..70.0,
    ) {
        let data = Dataset::from_samples(samples);
        let start = data.start_time().unwrap();

        for s in latest_per_source(&data, elapsed).values() {
            prop_assert!(seconds_between(start, s.timestamp()) <= elapsed + 1e-9);
        }
    }

    #[test]
    fn test_interpolation_stays_between_neighbors(
        samples in samples_strategy(),
        elapsed in -5.0f64..70.0,
    ) {
        let data = Dataset::from_samples(samples);

        for source in data.source_ids().collect::<Vec<_>>() {
            let Some(result) = interpolate(&data, source, elapsed) else {
                continue;
            };
            let xs: Vec<f64> = data.source_samples(source).map(|s| s.position.x).collect();
            let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
            let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            prop_assert!(result.position.x >= min - 1e-9 && result.position.x <= max + 1e-9);
            prop_assert_eq!(result.source_id, source);
            // repeated queries give the same answer
            prop_assert_eq!(Some(result), interpolate(&data, source, elapsed));
        }
    }
}
