//! Dataset assembly: framing, integration, projection and rasterization.
//!
//! Measurements are independent, so rendering can be spread over a pool of
//! scoped worker threads. Results are tagged with their framing index and put
//! back in order before the dataset is returned.

use crate::core::framing::{frame_group, FramingError, Measurement};
use crate::core::orientation::integrate_measurement;
use crate::core::raster::{rasterize, Ramp, RasterImage};
use crate::core::stroke::project;
use crate::loader::types::InputGroup;
use crate::transparency::SharedProcessingLog;
use crossbeam_channel::{bounded, unbounded};
use std::num::NonZeroUsize;
use thiserror::Error;

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Framing(#[from] FramingError),
    #[error("worker pool lost measurement {index}")]
    MissingResult { index: usize },
}

/// How the driver runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Worker threads; 1 renders on the calling thread, 0 uses all cores
    pub workers: usize,
    /// Skip groups with malformed rows instead of failing the build
    pub skip_malformed_groups: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            skip_malformed_groups: false,
        }
    }
}

impl PipelineOptions {
    /// Effective worker count.
    pub fn resolved_workers(&self) -> usize {
        match self.workers {
            0 => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            n => n,
        }
    }
}

/// One dataset entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledImage {
    pub image: RasterImage,
    pub label: u32,
}

/// Images in framing order, one per measurement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub entries: Vec<LabeledImage>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.label).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabeledImage> {
        self.entries.iter()
    }
}

/// Per-measurement output with the guard outcomes.
#[derive(Debug, Clone)]
struct Rendered {
    image: RasterImage,
    motion_guarded: bool,
    collapsed_axes: usize,
}

/// Drives measurements through the image pipeline.
pub struct PipelineDriver {
    options: PipelineOptions,
    ramp: Ramp,
    log: Option<SharedProcessingLog>,
}

impl PipelineDriver {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            ramp: Ramp::default(),
            log: None,
        }
    }

    /// Report counters to a shared processing log.
    pub fn with_log(mut self, log: SharedProcessingLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Turn one measurement into its image.
    pub fn process_measurement(&self, measurement: &Measurement) -> RasterImage {
        self.render(measurement).image
    }

    /// Frame every group, in order.
    ///
    /// A malformed group aborts unless `skip_malformed_groups` is set, in which
    /// case it is logged and left out.
    pub fn frame(&self, groups: &[InputGroup]) -> Result<Vec<Measurement>, PipelineError> {
        let mut measurements = Vec::new();

        for group in groups {
            match frame_group(group) {
                Ok(framed) => {
                    tracing::debug!(
                        source = %group.source,
                        label = group.label,
                        measurements = framed.measurements.len(),
                        dropped = framed.dropped_samples,
                        "framed group"
                    );
                    if let Some(log) = &self.log {
                        log.record_group_framed();
                        log.record_samples_read(framed.samples_read as u64);
                        log.record_measurements_framed(framed.measurements.len() as u64);
                        log.record_samples_dropped(framed.dropped_samples as u64);
                    }
                    measurements.extend(framed.measurements);
                }
                Err(e) if self.options.skip_malformed_groups => {
                    tracing::warn!("Skipping group: {e}");
                    if let Some(log) = &self.log {
                        log.record_malformed_group();
                    }
                }
                Err(e) => {
                    if let Some(log) = &self.log {
                        log.record_malformed_group();
                    }
                    return Err(e.into());
                }
            }
        }

        Ok(measurements)
    }

    /// Build the dataset for labelled input groups.
    pub fn build_dataset(&self, groups: &[InputGroup]) -> Result<Dataset, PipelineError> {
        let measurements = self.frame(groups)?;
        let workers = self.options.resolved_workers().min(measurements.len()).max(1);

        let rendered: Vec<Rendered> = if workers == 1 {
            measurements.iter().map(|m| self.render(m)).collect()
        } else {
            render_pool(&measurements, workers, |m| self.render(m))?
        };

        let entries: Vec<LabeledImage> = measurements
            .iter()
            .zip(rendered)
            .map(|(m, r)| {
                if let Some(log) = &self.log {
                    if r.motion_guarded {
                        log.record_degenerate_motion();
                    }
                    log.record_collapsed_axes(r.collapsed_axes as u64);
                    log.record_image_emitted();
                }
                LabeledImage {
                    image: r.image,
                    label: m.label(),
                }
            })
            .collect();

        tracing::info!(
            groups = groups.len(),
            images = entries.len(),
            workers,
            "dataset built"
        );

        Ok(Dataset { entries })
    }

    fn render(&self, measurement: &Measurement) -> Rendered {
        let orientation = integrate_measurement(measurement);
        let stroke = project(&orientation, measurement.accel_mean());
        let raster = rasterize(&stroke, &self.ramp);

        Rendered {
            image: raster.image,
            motion_guarded: stroke.motion_guarded(),
            collapsed_axes: raster.collapsed_axes,
        }
    }
}

/// Render measurements on `workers` scoped threads, returning results in input order.
///
/// A worker that panics is joined here; every measurement it did not deliver
/// is reported as [`PipelineError::MissingResult`].
fn render_pool<T, F>(
    measurements: &[Measurement],
    workers: usize,
    render: F,
) -> Result<Vec<T>, PipelineError>
where
    T: Send,
    F: Fn(&Measurement) -> T + Sync,
{
    let (job_tx, job_rx) = bounded::<(usize, &Measurement)>(workers * 2);
    let (result_tx, result_rx) = unbounded::<(usize, T)>();

    let panicked = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                let render = &render;
                scope.spawn(move || {
                    for (index, measurement) in jobs.iter() {
                        if results.send((index, render(measurement))).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();
        drop(job_rx);
        drop(result_tx);

        for job in measurements.iter().enumerate() {
            if job_tx.send(job).is_err() {
                break;
            }
        }
        drop(job_tx);

        handles
            .into_iter()
            .map(|handle| handle.join())
            .filter(Result::is_err)
            .count()
    });
    if panicked > 0 {
        tracing::error!(panicked, "render workers panicked");
    }

    let mut slots: Vec<Option<T>> = (0..measurements.len()).map(|_| None).collect();
    for (index, rendered) in result_rx.iter() {
        slots[index] = Some(rendered);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or(PipelineError::MissingResult { index }))
        .collect()
}

impl Default for PipelineDriver {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::framing::SAMPLES_PER_MEASUREMENT;
    use crate::core::raster::{IMAGE_HEIGHT, IMAGE_WIDTH};
    use crate::transparency::ProcessingLog;
    use std::sync::Arc;

    fn wave_rows(count: usize, phase: f64) -> Vec<String> {
        (0..count)
            .map(|i| {
                let t = i as f64 * 0.1 + phase;
                format!(
                    "{},{},{},{},{},{}",
                    0.1 * t.cos(),
                    0.5,
                    0.9,
                    10.0 * t.sin(),
                    40.0 * (2.0 * t).cos(),
                    25.0 * t.sin()
                )
            })
            .collect()
    }

    fn still_rows(count: usize) -> Vec<String> {
        vec!["0,0,1,0,0,0".to_string(); count]
    }

    #[test]
    fn test_still_gesture_lights_one_pixel() {
        let groups = vec![InputGroup::new("still.csv", 0, still_rows(SAMPLES_PER_MEASUREMENT))];
        let dataset = PipelineDriver::default().build_dataset(&groups).unwrap();

        assert_eq!(dataset.len(), 1);
        let image = &dataset.entries[0].image;
        assert_eq!(image.pixels().len(), IMAGE_HEIGHT * IMAGE_WIDTH);
        assert_eq!(image.lit_pixels(), 1);
        assert_eq!(image.get(0, 0), Some(1.0));
    }

    #[test]
    fn test_labels_follow_groups_in_order() {
        let groups = vec![
            InputGroup::new("a.csv", 3, wave_rows(2 * SAMPLES_PER_MEASUREMENT, 0.0)),
            InputGroup::new("b.csv", 1, wave_rows(SAMPLES_PER_MEASUREMENT + 5, 1.0)),
        ];
        let dataset = PipelineDriver::default().build_dataset(&groups).unwrap();
        assert_eq!(dataset.labels(), vec![3, 3, 1]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let groups: Vec<InputGroup> = (0..4)
            .map(|k| {
                InputGroup::new(
                    format!("g{k}.csv"),
                    k,
                    wave_rows(3 * SAMPLES_PER_MEASUREMENT, k as f64),
                )
            })
            .collect();

        let sequential = PipelineDriver::default().build_dataset(&groups).unwrap();
        let parallel = PipelineDriver::new(PipelineOptions {
            workers: 4,
            ..Default::default()
        })
        .build_dataset(&groups)
        .unwrap();

        assert_eq!(sequential.len(), 12);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_pixel_values_within_unit_range() {
        let groups = vec![InputGroup::new("w.csv", 0, wave_rows(SAMPLES_PER_MEASUREMENT, 0.3))];
        let dataset = PipelineDriver::default().build_dataset(&groups).unwrap();
        let image = &dataset.entries[0].image;
        assert!(image.lit_pixels() > 1);
        assert!(image.pixels().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_row_order_changes_image() {
        let rows = wave_rows(SAMPLES_PER_MEASUREMENT, 0.0);
        let mut reversed = rows.clone();
        reversed.reverse();

        let driver = PipelineDriver::default();
        let forward = driver
            .build_dataset(&[InputGroup::new("f.csv", 0, rows)])
            .unwrap();
        let backward = driver
            .build_dataset(&[InputGroup::new("r.csv", 0, reversed)])
            .unwrap();

        assert_ne!(forward.entries[0].image, backward.entries[0].image);
    }

    #[test]
    fn test_malformed_group_aborts_by_default() {
        let mut rows = still_rows(SAMPLES_PER_MEASUREMENT);
        rows[7] = "0,0,1,0,0".to_string();
        let groups = vec![
            InputGroup::new("ok.csv", 0, still_rows(SAMPLES_PER_MEASUREMENT)),
            InputGroup::new("broken.csv", 1, rows),
        ];

        let err = PipelineDriver::default().build_dataset(&groups).unwrap_err();
        match err {
            PipelineError::Framing(FramingError::MalformedRow { group, row, .. }) => {
                assert_eq!(group, "broken.csv");
                assert_eq!(row, 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_group_can_be_skipped() {
        let mut rows = still_rows(SAMPLES_PER_MEASUREMENT);
        rows[0] = "a,b,c,d,e,f".to_string();
        let groups = vec![
            InputGroup::new("broken.csv", 0, rows),
            InputGroup::new("ok.csv", 1, still_rows(SAMPLES_PER_MEASUREMENT)),
        ];

        let log = Arc::new(ProcessingLog::new());
        let driver = PipelineDriver::new(PipelineOptions {
            skip_malformed_groups: true,
            ..Default::default()
        })
        .with_log(log.clone());

        let dataset = driver.build_dataset(&groups).unwrap();
        assert_eq!(dataset.labels(), vec![1]);
        assert_eq!(log.stats().malformed_groups, 1);
    }

    #[test]
    fn test_log_counts_guards_and_drops() {
        let groups = vec![InputGroup::new(
            "still.csv",
            0,
            still_rows(SAMPLES_PER_MEASUREMENT + 6),
        )];
        let log = Arc::new(ProcessingLog::new());
        PipelineDriver::default()
            .with_log(log.clone())
            .build_dataset(&groups)
            .unwrap();

        let stats = log.stats();
        assert_eq!(stats.samples_read, 125);
        assert_eq!(stats.measurements_framed, 1);
        assert_eq!(stats.samples_dropped, 6);
        assert_eq!(stats.collapsed_axes, 2);
        assert_eq!(stats.degenerate_motion, 0);
        assert_eq!(stats.images_emitted, 1);
    }

    #[test]
    fn test_zero_acceleration_is_counted() {
        let groups = vec![InputGroup::new(
            "zero.csv",
            0,
            vec!["0,0,0,1,2,3".to_string(); SAMPLES_PER_MEASUREMENT],
        )];
        let log = Arc::new(ProcessingLog::new());
        let dataset = PipelineDriver::default()
            .with_log(log.clone())
            .build_dataset(&groups)
            .unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(log.stats().degenerate_motion, 1);
        assert!(dataset.entries[0].image.pixels().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let groups = vec![InputGroup::new(
            "w.csv",
            0,
            wave_rows(3 * SAMPLES_PER_MEASUREMENT, 0.0),
        )];
        let measurements = PipelineDriver::default().frame(&groups).unwrap();
        let poisoned = measurements[1].clone();

        let result = render_pool(&measurements, 2, |m| {
            if *m == poisoned {
                panic!("render failed");
            }
            m.label()
        });
        assert!(matches!(
            result,
            Err(PipelineError::MissingResult { index: 1 })
        ));
    }

    #[test]
    fn test_render_pool_keeps_order() {
        let groups: Vec<InputGroup> = (0..5)
            .map(|k| InputGroup::new(format!("g{k}.csv"), k, still_rows(SAMPLES_PER_MEASUREMENT)))
            .collect();
        let measurements = PipelineDriver::default().frame(&groups).unwrap();

        let labels = render_pool(&measurements, 3, Measurement::label).unwrap();
        assert_eq!(labels, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_resolved_workers() {
        let auto = PipelineOptions {
            workers: 0,
            ..Default::default()
        };
        assert!(auto.resolved_workers() >= 1);
        assert_eq!(PipelineOptions::default().resolved_workers(), 1);
    }
}
