// THEORY:
// The phosphor decay engine is the perceptual heart of the pipeline. It decides how
// much light a pixel still emits at a given point of the decay cycle.
//
// Key architectural principles:
// 1.  **Superposition, Not a Single Exponential**: The falloff is a normalized,
//     weighted sum of K exponentials. Stage i has weight φ^i *and* rate φ^i (φ is the
//     golden ratio), so later stages contribute more initial light but die faster. The
//     result has a steep initial slope and a long tail.
// 2.  **Per-Channel Rates**: Each channel multiplies the rate independently, which is what
//     produces colored trails (a slow red phosphor leaves a reddish afterglow).
// 3.  **Accurate Exponentials**: The curve shape is sensitive to approximation error, so
//     only the standard library `exp` is used.
// 4.  **Residual Glow**: A black-level floor clamps every channel's multiplier so a fully
//     decayed pixel never collapses to pure black.
// 5.  **Raster Sweep**: Optionally the phase is offset by vertical position, so rows are
//     at different points of their decay at any instant, like a scanning beam.

use crate::core_modules::color::color::Color;
use crate::core_modules::frame_timing::fract_f32;
use crate::core_modules::parameters::{DecayMode, MAX_DECAY_STAGES, ParameterSet};

/// The golden ratio, growth factor between consecutive stages.
pub const PHI: f32 = 1.618_034;

/// Decay inputs, extracted from a `ParameterSet`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayConfig {
    pub mode: DecayMode,
    pub raster_frequency: f32,
    pub global_speed: f32,
    /// Red, green, blue rate multipliers.
    pub channel_multipliers: [f32; 3],
    pub stages: u32,
    pub black_level_floor: f32,
}

impl From<&ParameterSet> for DecayConfig {
    fn from(parameters: &ParameterSet) -> Self {
        Self {
            mode: parameters.decay_mode,
            raster_frequency: parameters.raster_frequency,
            global_speed: parameters.global_decay_speed,
            channel_multipliers: [
                parameters.red_decay_multiplier,
                parameters.green_decay_multiplier,
                parameters.blue_decay_multiplier,
            ],
            stages: parameters.decay_stages,
            black_level_floor: parameters.black_level_floor,
        }
    }
}

/// Per-pixel phase: unchanged for UniformPulse, offset by (1 - v) for RasterSweep.
#[inline]
pub fn pixel_phase(decay_phase: f32, v: f32, config: &DecayConfig) -> f32 {
    match config.mode {
        DecayMode::UniformPulse => decay_phase,
        DecayMode::RasterSweep => fract_f32((1.0 - v) * config.raster_frequency + decay_phase),
    }
}

/// Normalized multi-stage decay for one channel, before the black-level floor.
pub fn stage_sum(phase: f32, global_speed: f32, channel_multiplier: f32, stages: u32) -> f32 {
    let stages = stages.clamp(1, MAX_DECAY_STAGES);
    let rate = phase * global_speed * channel_multiplier;
    let mut scale = 1.0f32;
    let mut weighted = 0.0f32;
    let mut normalizer = 0.0f32;
    for _ in 0..stages {
        weighted += scale * (-rate * scale).exp();
        normalizer += scale;
        scale *= PHI;
    }
    weighted / normalizer
}

/// Per-channel decay multipliers at `phase`, floored at the black level.
pub fn decay_factors(phase: f32, config: &DecayConfig) -> Color {
    let [red, green, blue] = config
        .channel_multipliers
        .map(|multiplier| {
            stage_sum(phase, config.global_speed, multiplier, config.stages)
                .max(config.black_level_floor)
        });
    Color::new(red, green, blue)
}

/// Dims `color` by the decay at this pixel's phase.
#[inline]
pub fn apply_decay(color: Color, decay_phase: f32, v: f32, config: &DecayConfig) -> Color {
    color * decay_factors(pixel_phase(decay_phase, v, config), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(stages: u32, black_level_floor: f32) -> DecayConfig {
        DecayConfig {
            mode: DecayMode::UniformPulse,
            raster_frequency: 1.0,
            global_speed: 5.0,
            channel_multipliers: [1.0, 1.0, 1.0],
            stages,
            black_level_floor,
        }
    }

    #[test]
    fn phase_zero_is_full_brightness() {
        for stages in 1..=MAX_DECAY_STAGES {
            assert!((stage_sum(0.0, 5.0, 1.0, stages) - 1.0).abs() < 1e-6);
        }
        assert_eq!(stage_sum(0.0, 5.0, 1.0, 1), 1.0);
    }

    #[test]
    fn single_stage_is_a_plain_exponential() {
        let got = stage_sum(0.3, 2.0, 1.5, 1);
        assert!((got - (-0.9f32).exp()).abs() < 1e-6);
    }

    #[test]
    fn more_stages_steepen_the_onset() {
        let one = stage_sum(0.1, 5.0, 1.0, 1);
        let five = stage_sum(0.1, 5.0, 1.0, 5);
        assert!(five < one);
    }

    #[test]
    fn stage_count_is_capped() {
        assert_eq!(
            stage_sum(0.4, 3.0, 1.0, 50),
            stage_sum(0.4, 3.0, 1.0, MAX_DECAY_STAGES)
        );
        assert_eq!(stage_sum(0.4, 3.0, 1.0, 0), stage_sum(0.4, 3.0, 1.0, 1));
    }

    #[test]
    fn late_phase_clamps_to_black_level() {
        let floored = config(3, 0.005);
        let factors = decay_factors(0.999_999, &DecayConfig { global_speed: 25.0, ..floored });
        assert_eq!(factors, Color::splat(0.005));
    }

    #[test]
    fn slow_channel_leaves_a_colored_trail() {
        let reddish = DecayConfig {
            channel_multipliers: [0.2, 1.0, 1.0],
            ..config(4, 0.0)
        };
        let factors = decay_factors(0.5, &reddish);
        assert!(factors.red > factors.green);
        assert_eq!(factors.green, factors.blue);
    }

    #[test]
    fn raster_sweep_offsets_rows() {
        let raster = DecayConfig {
            mode: DecayMode::RasterSweep,
            raster_frequency: 1.0,
            ..config(2, 0.0)
        };
        assert!((pixel_phase(0.25, 1.0, &raster) - 0.25).abs() < 1e-6);
        assert!((pixel_phase(0.25, 0.5, &raster) - 0.75).abs() < 1e-6);
        assert!((pixel_phase(0.75, 0.5, &raster) - 0.25).abs() < 1e-6);
        assert_eq!(pixel_phase(0.6, 0.1, &config(2, 0.0)), 0.6);
    }

    proptest! {
        #[test]
        fn decay_never_drops_below_floor(
            phase in 0.0f32..1.0,
            speed in 0.01f32..25.0,
            multiplier in 0.01f32..5.0,
            stages in 1u32..=10,
            floor in 0.0f32..1.0,
        ) {
            let cfg = DecayConfig {
                global_speed: speed,
                channel_multipliers: [multiplier, 1.0, 0.5],
                ..config(stages, floor)
            };
            let factors = decay_factors(phase, &cfg);
            for f in factors.to_array() {
                prop_assert!(f >= floor);
                prop_assert!(f <= 1.0 + 1e-6);
            }
        }

        #[test]
        fn decay_is_deterministic(phase in 0.0f32..1.0, stages in 1u32..=10) {
            let cfg = config(stages, 0.01);
            prop_assert_eq!(decay_factors(phase, &cfg), decay_factors(phase, &cfg));
        }
    }
}
