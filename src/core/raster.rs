//! Rasterization of stroke trajectories.
//!
//! The trajectory is stretched to fill a 40×40 grid on each axis and every
//! sample is written as a single pixel. Intensity encodes time: later samples
//! are brighter, and a later sample overwrites an earlier one on the same
//! pixel. There is no blending or antialiasing.

use crate::core::framing::SAMPLES_PER_MEASUREMENT;
use crate::core::stroke::StrokeSeries;

/// Image height in pixels.
pub const IMAGE_HEIGHT: usize = 40;

/// Image width in pixels.
pub const IMAGE_WIDTH: usize = 40;

/// Intensity of the first sample, `(255 - 2 * 119 + 2) / 255`.
const RAMP_START: f64 = (255 - 2 * SAMPLES_PER_MEASUREMENT as i64 + 2) as f64 / 255.0;

/// Intensity of the last sample.
const RAMP_END: f64 = 1.0;

/// Per-sample intensities, linearly increasing with sample order.
#[derive(Debug, Clone, PartialEq)]
pub struct Ramp {
    values: Vec<f32>,
}

impl Ramp {
    /// `len` values evenly spaced from `19/255` to `1.0`; the last is exactly 1.0.
    pub fn new(len: usize) -> Self {
        let values = match len {
            0 => Vec::new(),
            1 => vec![RAMP_START as f32],
            _ => {
                let step = (RAMP_END - RAMP_START) / (len - 1) as f64;
                (0..len)
                    .map(|i| {
                        if i == len - 1 {
                            RAMP_END as f32
                        } else {
                            (RAMP_START + step * i as f64) as f32
                        }
                    })
                    .collect()
            }
        };
        Self { values }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for Ramp {
    fn default() -> Self {
        Self::new(SAMPLES_PER_MEASUREMENT)
    }
}

/// Grid cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub row: usize,
    pub col: usize,
}

/// A single-channel 40×40 image, row-major, background 0.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: Vec<f32>,
}

impl RasterImage {
    /// Write `(pixel, value)` pairs in order onto a blank grid; the last write to a cell wins.
    ///
    /// Pixels outside the grid are ignored.
    pub fn paint<I>(writes: I) -> Self
    where
        I: IntoIterator<Item = (Pixel, f32)>,
    {
        let blank = vec![0.0; IMAGE_HEIGHT * IMAGE_WIDTH];
        let pixels = writes.into_iter().fold(blank, |mut grid, (pixel, value)| {
            if pixel.row < IMAGE_HEIGHT && pixel.col < IMAGE_WIDTH {
                grid[pixel.row * IMAGE_WIDTH + pixel.col] = value;
            }
            grid
        });
        Self { pixels }
    }

    /// Intensity at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < IMAGE_HEIGHT && col < IMAGE_WIDTH {
            Some(self.pixels[row * IMAGE_WIDTH + col])
        } else {
            None
        }
    }

    /// Row-major pixel buffer of `IMAGE_HEIGHT * IMAGE_WIDTH` values.
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.pixels.chunks_exact(IMAGE_WIDTH)
    }

    /// Number of non-background pixels.
    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|&&v| v != 0.0).count()
    }
}

/// Pixel coordinates for a stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelTrace {
    pub pixels: Vec<Pixel>,
    /// Axes whose range was zero; every point sits at coordinate 0 on them
    pub collapsed_axes: usize,
}

/// Image plus the bookkeeping the pipeline reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Rasterized {
    pub image: RasterImage,
    pub collapsed_axes: usize,
}

/// Map stroke points onto grid coordinates.
///
/// Each axis is shifted to start at 0 and scaled by `39 / max`, rounded half to
/// even and clamped to `[0, 39]`. An axis with no extent maps to 0.
pub fn to_pixels(stroke: &StrokeSeries) -> PixelTrace {
    let points = stroke.points();
    let xs = normalize_axis(points.iter().map(|p| p.x), IMAGE_WIDTH);
    let ys = normalize_axis(points.iter().map(|p| p.y), IMAGE_HEIGHT);

    let collapsed_axes = usize::from(xs.is_none()) + usize::from(ys.is_none());
    let xs = xs.unwrap_or_else(|| vec![0; points.len()]);
    let ys = ys.unwrap_or_else(|| vec![0; points.len()]);

    let pixels = ys
        .into_iter()
        .zip(xs)
        .map(|(row, col)| Pixel { row, col })
        .collect();

    PixelTrace {
        pixels,
        collapsed_axes,
    }
}

/// Normalize one axis to `[0, extent - 1]`; `None` when the axis has no usable range.
fn normalize_axis<I>(values: I, extent: usize) -> Option<Vec<usize>>
where
    I: Iterator<Item = f64> + Clone,
{
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.clone().map(|v| v - min).fold(0.0, f64::max);
    if !(max.is_finite() && max > 0.0) {
        return None;
    }

    let top = (extent - 1) as f64;
    Some(
        values
            .map(|v| ((v - min) * top / max).round_ties_even().clamp(0.0, top) as usize)
            .collect(),
    )
}

/// Rasterize a stroke with the given ramp.
///
/// Sample `j` is painted with `ramp[j]`; samples beyond the ramp are not painted.
pub fn rasterize(stroke: &StrokeSeries, ramp: &Ramp) -> Rasterized {
    let trace = to_pixels(stroke);
    let image = RasterImage::paint(trace.pixels.into_iter().zip(ramp.values().iter().copied()));

    Rasterized {
        image,
        collapsed_axes: trace.collapsed_axes,
    }
}
