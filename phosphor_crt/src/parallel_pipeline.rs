// THEORY:
// Every pixel of the phosphor effect is independent, so a frame can be cut into
// horizontal row bands and each band rendered on its own blocking worker. The sequential
// `PhosphorPipeline` does the actual shading; this module only schedules it.
//
// Key architectural principles:
// 1.  **Shared, Read-Only Inputs**: The pipeline and the source frame are handed to the
//     workers behind `Arc`s. Nothing is written until the bands are stitched back together.
// 2.  **Blocking Work off the Reactor**: Shading is pure CPU work, so bands run on
//     `spawn_blocking` and never stall the async runtime.
// 3.  **Identical Output**: Band results are concatenated in row order, giving exactly the
//     bytes `PhosphorPipeline::process_frame` would produce.

use crate::core_modules::fragment::FrameCounter;
use crate::core_modules::parameters::ParameterSet;
use crate::error::{PhosphorError, Result};
use crate::pipeline::PhosphorPipeline;
use futures::future::try_join_all;
use image::{ImageBuffer, Rgb32FImage};
use log::{debug, trace};
use std::sync::Arc;

/// Smallest band worth a separate task.
const MIN_ROWS_PER_BAND: u32 = 8;

pub struct ParallelPipeline {
    pipeline: Arc<PhosphorPipeline>,
    worker_count: usize,
}

impl ParallelPipeline {
    /// One worker per logical CPU.
    pub fn new(parameters: ParameterSet) -> Self {
        Self::with_workers(parameters, num_cpus::get())
    }

    pub fn with_workers(parameters: ParameterSet, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        debug!("Parallel phosphor pipeline with {worker_count} workers");
        Self {
            pipeline: Arc::new(PhosphorPipeline::new(parameters)),
            worker_count,
        }
    }

    pub fn pipeline(&self) -> &PhosphorPipeline {
        &self.pipeline
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Row ranges covering `height`, at most one per worker.
    pub fn bands(&self, height: u32) -> Vec<std::ops::Range<u32>> {
        if height == 0 {
            return Vec::new();
        }
        let per_band = height
            .div_ceil(self.worker_count as u32)
            .max(MIN_ROWS_PER_BAND);
        (0..height)
            .step_by(per_band as usize)
            .map(|start| start..(start + per_band).min(height))
            .collect()
    }

    /// Renders `source` on the worker pool.
    pub async fn process_frame(
        &self,
        source: Arc<Rgb32FImage>,
        frame_counter: FrameCounter,
    ) -> Result<Rgb32FImage> {
        let (width, height) = source.dimensions();
        let bands = self.bands(height);
        trace!("Frame {frame_counter}: {} bands of {width}x{height}", bands.len());

        let tasks = bands.into_iter().map(|rows| {
            let pipeline = Arc::clone(&self.pipeline);
            let source = Arc::clone(&source);
            tokio::task::spawn_blocking(move || pipeline.render_rows(&source, frame_counter, rows))
        });

        let rendered = try_join_all(tasks)
            .await
            .map_err(|e| PhosphorError::WorkerPool(e.to_string()))?;

        let samples: Vec<f32> = rendered.into_iter().flatten().collect();
        ImageBuffer::from_raw(width, height, samples).ok_or_else(|| {
            PhosphorError::WorkerPool("Rendered bands do not cover the frame".to_string())
        })
    }

    /// Renders one output frame per counter in `frame_counters`, in order.
    pub async fn process_sequence(
        &self,
        source: Arc<Rgb32FImage>,
        frame_counters: impl IntoIterator<Item = FrameCounter>,
    ) -> Result<Vec<Rgb32FImage>> {
        let mut frames = Vec::new();
        for frame_counter in frame_counters {
            frames.push(self.process_frame(Arc::clone(&source), frame_counter).await?);
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::parameters::{DecayMode, Preset, ScanlineDirection};
    use image::Rgb;

    fn source(width: u32, height: u32) -> Arc<Rgb32FImage> {
        Arc::new(ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                (x % 17) as f32 / 16.0,
                (y % 13) as f32 / 12.0,
                ((x + y) % 7) as f32 / 6.0,
            ])
        }))
    }

    fn busy_parameters() -> ParameterSet {
        ParameterSet {
            preset: Preset::Vibrant,
            decay_mode: DecayMode::RasterSweep,
            frames_per_effect: 3,
            dither_strength: 0.8,
            temporal_dither: true,
            scanline_direction: ScanlineDirection::Crosshatch,
            scanline_gap_width: 1.0,
            hue_shift: 12.0,
            split_screen: true,
            ..ParameterSet::default()
        }
    }

    #[test]
    fn bands_cover_every_row_once() {
        let parallel = ParallelPipeline::with_workers(ParameterSet::default(), 4);
        let bands = parallel.bands(100);
        assert_eq!(bands.len(), 4);
        assert_eq!(bands[0], 0..25);
        assert_eq!(bands[3], 75..100);

        let small = parallel.bands(10);
        assert_eq!(small, vec![0..8, 8..10]);
        assert!(parallel.bands(0).is_empty());
    }

    #[test]
    fn zero_workers_means_one() {
        assert_eq!(ParallelPipeline::with_workers(ParameterSet::default(), 0).worker_count(), 1);
    }

    #[tokio::test]
    async fn parallel_output_matches_sequential() {
        let parallel = ParallelPipeline::with_workers(busy_parameters(), 3);
        let frame = source(37, 29);
        for frame_counter in [0, 1, 2, 601] {
            let expected = parallel.pipeline().process_frame(&frame, frame_counter);
            let got = parallel.process_frame(Arc::clone(&frame), frame_counter).await.unwrap();
            assert_eq!(got.dimensions(), expected.dimensions());
            assert_eq!(got.as_raw(), expected.as_raw());
        }
    }

    #[tokio::test]
    async fn sequence_renders_each_counter() {
        let parallel = ParallelPipeline::with_workers(ParameterSet::default(), 2);
        let frame = source(16, 16);
        let frames = parallel.process_sequence(Arc::clone(&frame), 10..13).await.unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].as_raw(), parallel.pipeline().process_frame(&frame, 11).as_raw());
    }

    #[tokio::test]
    async fn empty_frame_renders_empty() {
        let parallel = ParallelPipeline::new(ParameterSet::default());
        let out = parallel.process_frame(source(0, 0), 5).await.unwrap();
        assert_eq!(out.dimensions(), (0, 0));
    }
}
