//! Orientation integration over a measurement's gyroscope channel.
//!
//! This is a running sum of gyroscope readings scaled by the fixed sample
//! count, not an attitude estimate. It only needs to trace the shape of the
//! rotation over the gesture.

use crate::core::framing::{Measurement, SAMPLES_PER_MEASUREMENT};
use nalgebra::Vector3;

/// Cumulative orientation per sample and its mean.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationSeries {
    points: Vec<Vector3<f64>>,
    mean: Vector3<f64>,
}

impl OrientationSeries {
    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    pub fn mean(&self) -> Vector3<f64> {
        self.mean
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Integrate a gyroscope sequence.
///
/// `orientation[j] = orientation[j - 1] + gyro[j] / 119`, starting from zero.
pub fn integrate<I>(gyro: I) -> OrientationSeries
where
    I: IntoIterator<Item = Vector3<f64>>,
{
    let scale = SAMPLES_PER_MEASUREMENT as f64;
    let points: Vec<Vector3<f64>> = gyro
        .into_iter()
        .scan(Vector3::zeros(), |acc, g| {
            *acc += g / scale;
            Some(*acc)
        })
        .collect();

    let mean = if points.is_empty() {
        Vector3::zeros()
    } else {
        points.iter().sum::<Vector3<f64>>() / points.len() as f64
    };

    OrientationSeries { points, mean }
}

/// Integrate the gyroscope channel of a measurement.
pub fn integrate_measurement(measurement: &Measurement) -> OrientationSeries {
    integrate(measurement.gyro())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::types::Sample;

    fn measurement_with_gyro(f: impl Fn(usize) -> [f64; 3]) -> Measurement {
        let samples = (0..SAMPLES_PER_MEASUREMENT)
            .map(|i| {
                let [gx, gy, gz] = f(i);
                Sample::from_channels([0.0, 0.0, 1.0, gx, gy, gz])
            })
            .collect();
        Measurement::new(samples, 0).unwrap()
    }

    #[test]
    fn test_series_length() {
        let series = integrate_measurement(&measurement_with_gyro(|i| [i as f64, 0.0, -1.0]));
        assert_eq!(series.len(), SAMPLES_PER_MEASUREMENT);
    }

    #[test]
    fn test_last_point_is_scaled_sum() {
        let m = measurement_with_gyro(|i| [i as f64, (i % 5) as f64 - 2.0, 0.5]);
        let series = integrate_measurement(&m);

        let expected: Vector3<f64> = m.gyro().map(|g| g / 119.0).sum();
        let last = series.points()[SAMPLES_PER_MEASUREMENT - 1];
        assert!((last - expected).norm() < 1e-9);
    }

    #[test]
    fn test_constant_rate_is_linear() {
        let series = integrate_measurement(&measurement_with_gyro(|_| [119.0, 0.0, 0.0]));
        for (j, p) in series.points().iter().enumerate() {
            assert!((p.x - (j + 1) as f64).abs() < 1e-9);
        }
        // mean of 1..=119
        assert!((series.mean().x - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_gyro_stays_at_origin() {
        let series = integrate_measurement(&measurement_with_gyro(|_| [0.0; 3]));
        assert!(series.points().iter().all(|p| *p == Vector3::zeros()));
        assert_eq!(series.mean(), Vector3::zeros());
    }

    #[test]
    fn test_empty_input() {
        let series = integrate(std::iter::empty());
        assert!(series.is_empty());
        assert_eq!(series.mean(), Vector3::zeros());
    }
}
