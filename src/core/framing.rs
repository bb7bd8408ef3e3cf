//! Framing of sensor rows into fixed-size measurements.
//!
//! A recording is a flat run of rows. Every consecutive block of
//! [`SAMPLES_PER_MEASUREMENT`] samples is one gesture; a trailing block that is
//! too short is dropped rather than padded.

use crate::loader::types::{InputGroup, RowError, Sample};
use nalgebra::Vector3;
use thiserror::Error;

/// Number of samples in one gesture recording.
pub const SAMPLES_PER_MEASUREMENT: usize = 119;

/// Framing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    /// A row did not decode into six finite values.
    #[error("malformed row {row} in {group}: {reason}")]
    MalformedRow {
        group: String,
        row: usize,
        #[source]
        reason: RowError,
    },
    /// A measurement was built from the wrong number of samples.
    #[error("a measurement needs 119 samples, got {len}")]
    IncompleteMeasurement { len: usize },
}

/// One gesture: exactly [`SAMPLES_PER_MEASUREMENT`] samples and a class label.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    samples: Vec<Sample>,
    label: u32,
}

impl Measurement {
    /// Create a measurement, rejecting any sample count other than 119.
    pub fn new(samples: Vec<Sample>, label: u32) -> Result<Self, FramingError> {
        if samples.len() != SAMPLES_PER_MEASUREMENT {
            return Err(FramingError::IncompleteMeasurement { len: samples.len() });
        }
        Ok(Self { samples, label })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn label(&self) -> u32 {
        self.label
    }

    /// Gyroscope channel in sample order.
    pub fn gyro(&self) -> impl Iterator<Item = Vector3<f64>> + '_ {
        self.samples.iter().map(|s| s.gyro)
    }

    /// Mean accelerometer vector over all samples.
    pub fn accel_mean(&self) -> Vector3<f64> {
        let sum: Vector3<f64> = self.samples.iter().map(|s| s.accel).sum();
        sum / self.samples.len() as f64
    }
}

/// Result of framing one group.
#[derive(Debug, Clone, PartialEq)]
pub struct Framed {
    /// Complete measurements in original order
    pub measurements: Vec<Measurement>,
    /// Number of samples parsed (separator lines excluded)
    pub samples_read: usize,
    /// Trailing samples that did not fill a measurement
    pub dropped_samples: usize,
}

/// Cut parsed samples into consecutive measurements, all tagged with `label`.
pub fn frame_samples(samples: &[Sample], label: u32) -> Framed {
    let chunks = samples.chunks_exact(SAMPLES_PER_MEASUREMENT);
    let dropped_samples = chunks.remainder().len();

    let measurements = chunks
        .map(|chunk| Measurement {
            samples: chunk.to_vec(),
            label,
        })
        .collect();

    Framed {
        measurements,
        samples_read: samples.len(),
        dropped_samples,
    }
}

/// Parse raw rows and frame them.
///
/// Empty rows are separators and are skipped; a whitespace-only row is
/// malformed. The first malformed row aborts framing of the whole group;
/// `row` in the error is its index in `rows`.
pub fn frame_rows<S: AsRef<str>>(
    group: &str,
    rows: &[S],
    label: u32,
) -> Result<Framed, FramingError> {
    let samples = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.as_ref().is_empty())
        .map(|(index, row)| {
            Sample::parse_row(row.as_ref()).map_err(|reason| FramingError::MalformedRow {
                group: group.to_string(),
                row: index,
                reason,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(frame_samples(&samples, label))
}

/// Frame a loaded input group.
pub fn frame_group(group: &InputGroup) -> Result<Framed, FramingError> {
    frame_rows(&group.source, &group.rows, group.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(count: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("{i},0,1,0.5,0.25,{}", i % 7))
            .collect()
    }

    #[test]
    fn test_two_blocks_no_leftover() {
        let block = rows(SAMPLES_PER_MEASUREMENT);
        let doubled: Vec<String> = block.iter().chain(block.iter()).cloned().collect();
        assert_eq!(doubled.len(), 238);

        let framed = frame_rows("twice.csv", &doubled, 2).unwrap();
        assert_eq!(framed.measurements.len(), 2);
        assert_eq!(framed.dropped_samples, 0);
        assert_eq!(framed.measurements[0], framed.measurements[1]);
        for m in &framed.measurements {
            assert_eq!(m.samples().len(), SAMPLES_PER_MEASUREMENT);
            assert_eq!(m.label(), 2);
        }
    }

    #[test]
    fn test_remainder_is_dropped() {
        let framed = frame_rows("short.csv", &rows(125), 0).unwrap();
        assert_eq!(framed.measurements.len(), 1);
        assert_eq!(framed.samples_read, 125);
        assert_eq!(framed.dropped_samples, 6);
    }

    #[test]
    fn test_fewer_rows_than_one_measurement() {
        let framed = frame_rows("tiny.csv", &rows(50), 0).unwrap();
        assert!(framed.measurements.is_empty());
        assert_eq!(framed.dropped_samples, 50);
    }

    #[test]
    fn test_order_is_preserved() {
        let framed = frame_rows("ordered.csv", &rows(SAMPLES_PER_MEASUREMENT), 0).unwrap();
        let xs: Vec<f64> = framed.measurements[0]
            .samples()
            .iter()
            .map(|s| s.accel.x)
            .collect();
        let expected: Vec<f64> = (0..SAMPLES_PER_MEASUREMENT).map(|i| i as f64).collect();
        assert_eq!(xs, expected);
    }

    #[test]
    fn test_blank_separators_are_skipped() {
        let mut with_gap = rows(SAMPLES_PER_MEASUREMENT);
        with_gap.push(String::new());
        with_gap.push(String::new());
        with_gap.extend(rows(SAMPLES_PER_MEASUREMENT));

        let framed = frame_rows("gaps.csv", &with_gap, 1).unwrap();
        assert_eq!(framed.measurements.len(), 2);
        assert_eq!(framed.samples_read, 2 * SAMPLES_PER_MEASUREMENT);
    }

    #[test]
    fn test_whitespace_row_is_malformed() {
        let mut block = rows(SAMPLES_PER_MEASUREMENT);
        block.insert(50, "   \t".to_string());

        let err = frame_rows("spaces.csv", &block, 0).unwrap_err();
        assert!(matches!(
            err,
            FramingError::MalformedRow {
                row: 50,
                reason: RowError::FieldCount { found: 1 },
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_row_reports_context() {
        let mut bad = rows(10);
        bad[4] = "1,2,3".to_string();

        let err = frame_rows("bad.csv", &bad, 0).unwrap_err();
        assert_eq!(
            err,
            FramingError::MalformedRow {
                group: "bad.csv".to_string(),
                row: 4,
                reason: RowError::FieldCount { found: 3 },
            }
        );
        assert!(err.to_string().contains("bad.csv"));
    }

    #[test]
    fn test_measurement_length_enforced() {
        let sample = Sample::from_channels([0.0; 6]);
        assert_eq!(
            Measurement::new(vec![sample; 118], 0),
            Err(FramingError::IncompleteMeasurement { len: 118 })
        );
        assert!(Measurement::new(vec![sample; SAMPLES_PER_MEASUREMENT], 0).is_ok());
    }

    #[test]
    fn test_accel_mean() {
        let samples: Vec<Sample> = (0..SAMPLES_PER_MEASUREMENT)
            .map(|i| Sample::from_channels([i as f64, 1.0, -2.0, 0.0, 0.0, 0.0]))
            .collect();
        let m = Measurement::new(samples, 0).unwrap();
        let mean = m.accel_mean();
        assert!((mean.x - 59.0).abs() < 1e-9);
        assert!((mean.y - 1.0).abs() < 1e-12);
        assert!((mean.z + 2.0).abs() < 1e-12);
    }
}
