//! Test data builders for creating log records and samples

use track_replay::{Dataset, Position, Sample, SourceId};

pub const TEST_DATE: &str = "20250717";
pub const TEST_TIME: &str = "1034";

/// Builder for one delimited log record
pub struct RecordBuilder {
    date: String,
    time: String,
    milliseconds: i64,
    sequence_key: i64,
    x: f64,
    y: f64,
}

impl RecordBuilder {
    pub fn new(milliseconds: i64) -> Self {
        Self {
            date: TEST_DATE.to_string(),
            time: TEST_TIME.to_string(),
            milliseconds,
            sequence_key: 1,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }

    pub fn time(mut self, time: &str) -> Self {
        self.time = time.to_string();
        self
    }

    pub fn sequence_key(mut self, key: i64) -> Self {
        self.sequence_key = key;
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn build(self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.date, self.time, self.milliseconds, self.sequence_key, self.x, self.y
        )
    }
}

/// Sample `ms` milliseconds into the test minute
pub fn sample(source_id: SourceId, ms: i64, x: f64, y: f64) -> Sample {
    Sample::new(source_id, TEST_DATE, TEST_TIME, ms, 1, Position::new(x, y))
}

/// Two sources with the layout used across the playback tests:
/// source 1 at 0s (0,0) and 10s (10,0); source 2 at 5s (5,5)
pub fn two_source_dataset() -> Dataset {
    Dataset::from_samples(vec![
        sample(1, 0, 0.0, 0.0),
        sample(1, 10_000, 10.0, 0.0),
        sample(2, 5_000, 5.0, 5.0),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let line = RecordBuilder::new(1500)
            .sequence_key(3)
            .at(12.5, -3.25)
            .build();

        assert_eq!(line, "20250717,1034,1500,3,12.5,-3.25");
    }
}
