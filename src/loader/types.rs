//! Sensor sample and input group types.
//!
//! A sample is one CSV row of the recorder: three accelerometer channels
//! followed by three gyroscope channels.

use nalgebra::Vector3;
use thiserror::Error;

/// Number of channels in one sensor row.
pub const CHANNELS_PER_ROW: usize = 6;

/// One accelerometer + gyroscope reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Linear acceleration `(ax, ay, az)`
    pub accel: Vector3<f64>,
    /// Angular velocity `(gx, gy, gz)`
    pub gyro: Vector3<f64>,
}

impl Sample {
    pub fn new(accel: Vector3<f64>, gyro: Vector3<f64>) -> Self {
        Self { accel, gyro }
    }

    /// Build a sample from channels in recorder order `(ax, ay, az, gx, gy, gz)`.
    pub fn from_channels(channels: [f64; CHANNELS_PER_ROW]) -> Self {
        let [ax, ay, az, gx, gy, gz] = channels;
        Self {
            accel: Vector3::new(ax, ay, az),
            gyro: Vector3::new(gx, gy, gz),
        }
    }

    /// Parse a comma-separated row of exactly six finite values.
    pub fn parse_row(row: &str) -> Result<Self, RowError> {
        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        if fields.len() != CHANNELS_PER_ROW {
            return Err(RowError::FieldCount {
                found: fields.len(),
            });
        }

        let mut channels = [0.0; CHANNELS_PER_ROW];
        for (column, (slot, field)) in channels.iter_mut().zip(&fields).enumerate() {
            let value: f64 = field.parse().map_err(|_| RowError::InvalidField {
                column,
                value: field.to_string(),
            })?;
            if !value.is_finite() {
                return Err(RowError::NonFinite { column });
            }
            *slot = value;
        }

        Ok(Self::from_channels(channels))
    }
}

/// Why a single row could not be turned into a [`Sample`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("expected 6 fields, found {found}")]
    FieldCount { found: usize },
    #[error("column {column} is not a number: {value:?}")]
    InvalidField { column: usize, value: String },
    #[error("column {column} is not finite")]
    NonFinite { column: usize },
}

/// The raw rows of one class recording together with the label assigned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputGroup {
    /// Identifier used in error reports (usually the file path)
    pub source: String,
    /// Class label for every measurement framed from this group
    pub label: u32,
    /// Data rows, header already removed
    pub rows: Vec<String>,
}

impl InputGroup {
    pub fn new(source: impl Into<String>, label: u32, rows: Vec<String>) -> Self {
        Self {
            source: source.into(),
            label,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row_channel_order() {
        let sample = Sample::parse_row("1.0, -2.5,3,0.25,0.5,-0.75").unwrap();
        assert_eq!(sample.accel, Vector3::new(1.0, -2.5, 3.0));
        assert_eq!(sample.gyro, Vector3::new(0.25, 0.5, -0.75));
    }

    #[test]
    fn test_parse_row_field_count() {
        assert_eq!(
            Sample::parse_row("1,2,3,4,5"),
            Err(RowError::FieldCount { found: 5 })
        );
        assert_eq!(
            Sample::parse_row("1,2,3,4,5,6,7"),
            Err(RowError::FieldCount { found: 7 })
        );
    }

    #[test]
    fn test_parse_row_rejects_garbage_and_non_finite() {
        assert!(matches!(
            Sample::parse_row("1,2,x,4,5,6"),
            Err(RowError::InvalidField { column: 2, .. })
        ));
        assert_eq!(
            Sample::parse_row("1,2,3,NaN,5,6"),
            Err(RowError::NonFinite { column: 3 })
        );
        assert_eq!(
            Sample::parse_row("1,2,3,4,5,inf"),
            Err(RowError::NonFinite { column: 5 })
        );
    }
}
