//! Projection of the orientation trace onto the stroke plane.
//!
//! The stroke plane is orthogonal to the mean acceleration, which during a
//! gesture is dominated by gravity. Only the y and z orientation components
//! take part in the projection.

use crate::core::orientation::OrientationSeries;
use nalgebra::{Vector2, Vector3};

/// Floor for the mean acceleration magnitude.
pub const MIN_ACCEL_MAGNITUDE: f64 = 0.0001;

/// Stroke-plane trajectory, one point per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeSeries {
    points: Vec<Vector2<f64>>,
    accel_magnitude: f64,
    motion_guarded: bool,
}

impl StrokeSeries {
    pub fn points(&self) -> &[Vector2<f64>] {
        &self.points
    }

    /// Acceleration magnitude the projection divided by (never below the floor).
    pub fn accel_magnitude(&self) -> f64 {
        self.accel_magnitude
    }

    /// Whether the mean acceleration was too small and the floor was used.
    pub fn motion_guarded(&self) -> bool {
        self.motion_guarded
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Project centered orientation onto the plane orthogonal to `accel_mean`.
pub fn project(orientation: &OrientationSeries, accel_mean: Vector3<f64>) -> StrokeSeries {
    let raw_magnitude = accel_mean.dot(&accel_mean).sqrt();
    let motion_guarded = raw_magnitude < MIN_ACCEL_MAGNITUDE;
    let accel_magnitude = if motion_guarded {
        MIN_ACCEL_MAGNITUDE
    } else {
        raw_magnitude
    };

    let n = accel_mean / accel_magnitude;
    let center = orientation.mean();

    let points = orientation
        .points()
        .iter()
        .map(|p| {
            let c = p - center;
            Vector2::new(-n.y * c.y - n.z * c.z, n.y * c.z - n.z * c.y)
        })
        .collect();

    StrokeSeries {
        points,
        accel_magnitude,
        motion_guarded,
    }
}
