// THEORY:
// The `pipeline` module is the top-level API of the phosphor effect. It takes the host's
// manual parameters once, resolves the preset into an effective set, and from then on
// evaluates pixels as a pure function of (source color, fragment, frame counter).
//
// Every pixel passes through the same fixed chain of stages:
//   beam response -> dither/quantize -> phosphor decay -> scanlines -> tone -> compositor
//
// The pipeline owns no per-frame state. Calling it twice with the same inputs yields the
// same output bit for bit, which is what makes the row-band renderer in
// `parallel_pipeline` a drop-in replacement for `process_frame`.

use crate::core_modules::beam_response::beam_response;
use crate::core_modules::color::color::Color;
use crate::core_modules::compositor::{CompositorConfig, composite};
use crate::core_modules::dither::{DitherConfig, apply_dither};
use crate::core_modules::fragment::{FrameContext, FrameCounter, Fragment};
use crate::core_modules::frame_timing::{FrameTiming, TimingConfig, frame_timing};
use crate::core_modules::parameters::ParameterSet;
use crate::core_modules::phosphor_decay::{DecayConfig, apply_decay, decay_factors};
use crate::core_modules::preset;
use crate::core_modules::scanline::{ScanlineConfig, apply_scanlines};
use crate::core_modules::tone::{ToneConfig, apply_tone};
use crate::error::{PhosphorError, Result};
use image::{ImageBuffer, Rgb, Rgb32FImage, RgbImage, Rgba};
use log::debug;
use std::ops::Range;

/// The phosphor pipeline, bound to one effective parameter set.
#[derive(Debug, Clone)]
pub struct PhosphorPipeline {
    parameters: ParameterSet,
    timing: TimingConfig,
    dither: DitherConfig,
    decay: DecayConfig,
    scanlines: ScanlineConfig,
    tone: ToneConfig,
    compositor: CompositorConfig,
}

impl PhosphorPipeline {
    pub fn new(manual: ParameterSet) -> Self {
        let parameters = preset::resolve(&manual);
        debug!(
            "Phosphor pipeline: preset {}, {} frames per effect, {} decay stages",
            parameters.preset, parameters.frames_per_effect, parameters.decay_stages
        );
        Self {
            timing: TimingConfig::from(&parameters),
            dither: DitherConfig::from(&parameters),
            decay: DecayConfig::from(&parameters),
            scanlines: ScanlineConfig::from(&parameters),
            tone: ToneConfig::from(&parameters),
            compositor: CompositorConfig::from(&parameters),
            parameters,
        }
    }

    /// The effective parameters, after preset resolution.
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn frame_timing(&self, frame_counter: FrameCounter) -> FrameTiming {
        frame_timing(frame_counter, &self.timing)
    }

    /// Evaluates one pixel.
    pub fn process_pixel(&self, source: Color, fragment: &Fragment, context: &FrameContext) -> Color {
        let decay_phase = self.frame_timing(context.frame_counter).decay_phase;
        self.shade(source, fragment, context, decay_phase)
    }

    fn shade(&self, source: Color, fragment: &Fragment, context: &FrameContext, decay_phase: f32) -> Color {
        let p = &self.parameters;

        // Stage 1: Beam Response
        let color = beam_response(source, p.contrast, p.midtone_boost, p.brightness);

        // Stage 2: Dither / Quantization
        let color = apply_dither(color, fragment.x, fragment.y, context.frame_counter, &self.dither);

        // Stage 3: Phosphor Decay
        let color = apply_decay(color, decay_phase, fragment.v, &self.decay);

        // Stage 4: Scanline Masking
        let color = apply_scanlines(color, fragment.x, fragment.y, &self.scanlines);

        // Stage 5: Tone / Color
        let color = apply_tone(color, &self.tone);

        // Stage 6: Output Compositing
        composite(color, source, fragment.u, context.width, &self.compositor)
    }

    /// Renders rows `rows` of `source` into a flat RGB sample vector.
    pub fn render_rows(&self, source: &Rgb32FImage, frame_counter: FrameCounter, rows: Range<u32>) -> Vec<f32> {
        let (width, height) = source.dimensions();
        let context = FrameContext::new(frame_counter, width, height);
        let decay_phase = self.frame_timing(frame_counter).decay_phase;
        let rows = rows.start.min(height)..rows.end.min(height);

        let mut samples = Vec::with_capacity(rows.len() * width as usize * 3);
        for y in rows {
            for x in 0..width {
                let fragment = Fragment::at_pixel(x, y, width, height);
                let color = self.shade(Color::from(*source.get_pixel(x, y)), &fragment, &context, decay_phase);
                samples.extend_from_slice(&color.to_array());
            }
        }
        samples
    }

    /// Evaluates every pixel of a floating-point frame.
    pub fn process_frame(&self, source: &Rgb32FImage, frame_counter: FrameCounter) -> Rgb32FImage {
        let (width, height) = source.dimensions();
        let context = FrameContext::new(frame_counter, width, height);
        let decay_phase = self.frame_timing(frame_counter).decay_phase;

        ImageBuffer::from_fn(width, height, |x, y| {
            let fragment = Fragment::at_pixel(x, y, width, height);
            Rgb::from(self.shade(Color::from(*source.get_pixel(x, y)), &fragment, &context, decay_phase))
        })
    }

    /// Evaluates an 8-bit frame; the output is clamped and rounded back to 8 bits.
    pub fn process_rgb8(&self, source: &RgbImage, frame_counter: FrameCounter) -> RgbImage {
        let (width, height) = source.dimensions();
        let context = FrameContext::new(frame_counter, width, height);
        let decay_phase = self.frame_timing(frame_counter).decay_phase;

        ImageBuffer::from_fn(width, height, |x, y| {
            let fragment = Fragment::at_pixel(x, y, width, height);
            self.shade(Color::from(*source.get_pixel(x, y)), &fragment, &context, decay_phase)
                .to_rgb8()
        })
    }

    /// Evaluates a raw RGBA8 buffer. Input alpha is ignored; output alpha is 255.
    pub fn process_rgba_buffer(
        &self,
        frame_buffer: &[u8],
        width: u32,
        height: u32,
        frame_counter: FrameCounter,
    ) -> Result<Vec<u8>> {
        let expected = width as usize * height as usize * 4;
        if frame_buffer.len() != expected {
            return Err(PhosphorError::BufferSize {
                expected,
                actual: frame_buffer.len(),
            });
        }

        let context = FrameContext::new(frame_counter, width, height);
        let decay_phase = self.frame_timing(frame_counter).decay_phase;
        let mut output = Vec::with_capacity(expected);

        for (index, rgba) in frame_buffer.chunks_exact(4).enumerate() {
            let x = (index % width as usize) as u32;
            let y = (index / width as usize) as u32;
            let source = Color::from(Rgba([rgba[0], rgba[1], rgba[2], rgba[3]]));
            let fragment = Fragment::at_pixel(x, y, width, height);
            let Rgb([r, g, b]) = self.shade(source, &fragment, &context, decay_phase).to_rgb8();
            output.extend_from_slice(&[r, g, b, 255]);
        }
        Ok(output)
    }

    /// Samples the per-channel decay curve at `samples` evenly spaced phases in [0, 1).
    pub fn decay_curve(&self, samples: usize) -> Vec<(f32, Color)> {
        (0..samples)
            .map(|i| {
                let phase = i as f32 / samples as f32;
                (phase, decay_factors(phase, &self.decay))
            })
            .collect()
    }
}
