// THEORY:
// The frame timing engine converts the host's monotonic frame counter into a normalized
// decay phase: how far through the current decay pulse this frame sits. It is the only
// place the pipeline looks at time.
//
// Key architectural principles:
// 1.  **Stateless Time**: There is no accumulator. The phase is a pure function of the
//     counter and the timing parameters, so a dropped or repeated host frame can never
//     desynchronize it.
// 2.  **Burn-in Mitigation as a Phase Perturbation**: When the cycle length is even, the
//     same frames of every cycle would always be bright. LCD-safe mode perturbs either the
//     effective counter (PhaseJump, FrameDrop) or the phase itself (PhaseFlip) so the
//     bright frame wanders.
// 3.  **Self-Cancellation Guard**: A flip interval that is an exact multiple of the cycle
//     length would stay in phase with the cycle and undo itself, so it is nudged by one.

use crate::core_modules::fragment::FrameCounter;
use crate::core_modules::parameters::{LcdSafeMethod, ParameterSet};

/// Timing inputs, extracted from a `ParameterSet`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    pub frames_per_effect: u32,
    pub slow_motion_factor: f32,
    pub lcd_safe_mode: bool,
    pub lcd_safe_method: LcdSafeMethod,
    pub lcd_jump_rate: f32,
    pub lcd_flip_interval: u32,
}

impl From<&ParameterSet> for TimingConfig {
    fn from(parameters: &ParameterSet) -> Self {
        Self {
            frames_per_effect: parameters.frames_per_effect,
            slow_motion_factor: parameters.slow_motion_factor,
            lcd_safe_mode: parameters.lcd_safe_mode,
            lcd_safe_method: parameters.lcd_safe_method,
            lcd_jump_rate: parameters.lcd_jump_rate,
            lcd_flip_interval: parameters.lcd_flip_interval,
        }
    }
}

/// Result of the timing computation for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    /// Counter after burn-in adjustment.
    pub effective_counter: FrameCounter,
    /// Extra phase added after normalization (0.0 or 0.5 for PhaseFlip).
    pub phase_offset: f64,
    /// Position within the decay cycle, in [0, 1).
    pub decay_phase: f32,
}

/// Fractional part wrapped into [0, 1), also for negative values.
#[inline]
pub fn fract(value: f64) -> f64 {
    let f = value - value.floor();
    // `value - floor` can round up to exactly 1.0 for tiny negatives.
    if f >= 1.0 { 0.0 } else { f }
}

/// Same as `fract` for `f32`.
#[inline]
pub fn fract_f32(value: f32) -> f32 {
    let f = value - value.floor();
    if f >= 1.0 { 0.0 } else { f }
}

/// Nudges `interval` off any exact multiple of `frames_per_effect`.
pub fn adjusted_flip_interval(interval: u32, frames_per_effect: u32) -> u32 {
    let interval = interval.max(1);
    let cycle = frames_per_effect.max(1);
    if interval % cycle == 0 { interval + 1 } else { interval }
}

/// PhaseFlip polarity: 0.0 and 0.5 alternate every `interval` frames.
pub fn phase_flip_offset(raw: FrameCounter, interval: u32) -> f64 {
    let flips = raw / interval.max(1) as FrameCounter;
    0.5 * (flips % 2) as f64
}

/// PhaseJump drift: floor(raw * rate) extra frames.
pub fn phase_jump_frames(raw: FrameCounter, jump_rate: f32) -> FrameCounter {
    (raw as f64 * jump_rate as f64).floor().max(0.0) as FrameCounter
}

/// FrameDrop stall: one frame lost every `interval` frames.
pub fn dropped_frames(raw: FrameCounter, interval: u32) -> FrameCounter {
    raw / interval.max(1) as FrameCounter
}

/// Computes the decay phase for `raw` under `config`.
pub fn frame_timing(raw: FrameCounter, config: &TimingConfig) -> FrameTiming {
    let cycle = config.frames_per_effect.max(1);
    let mut effective_counter = raw;
    let mut phase_offset = 0.0;

    if config.lcd_safe_mode && cycle % 2 == 0 {
        let interval = adjusted_flip_interval(config.lcd_flip_interval, cycle);
        match config.lcd_safe_method {
            LcdSafeMethod::PhaseJump => {
                effective_counter = raw.saturating_add(phase_jump_frames(raw, config.lcd_jump_rate));
            }
            LcdSafeMethod::PhaseFlip => {
                phase_offset = phase_flip_offset(raw, interval);
            }
            LcdSafeMethod::FrameDrop => {
                effective_counter = raw.saturating_sub(dropped_frames(raw, interval));
            }
        }
    }

    let slow_motion = (config.slow_motion_factor as f64).max(1.0);
    let phase = fract(effective_counter as f64 / slow_motion / cycle as f64 + phase_offset);

    FrameTiming {
        effective_counter,
        phase_offset,
        decay_phase: normalized_phase(phase),
    }
}

/// Narrows a phase in [0, 1) to `f32` without letting rounding reach 1.0.
fn normalized_phase(phase: f64) -> f32 {
    let narrowed = phase as f32;
    if narrowed >= 1.0 { 0.0 } else { narrowed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(frames_per_effect: u32) -> TimingConfig {
        TimingConfig {
            frames_per_effect,
            slow_motion_factor: 1.0,
            lcd_safe_mode: false,
            lcd_safe_method: LcdSafeMethod::PhaseJump,
            lcd_jump_rate: 0.001,
            lcd_flip_interval: 600,
        }
    }

    #[test]
    fn phase_walks_through_the_cycle() {
        let config = timing(4);
        let phases: Vec<f32> = (0..6).map(|n| frame_timing(n, &config).decay_phase).collect();
        assert_eq!(phases, vec![0.0, 0.25, 0.5, 0.75, 0.0, 0.25]);
    }

    #[test]
    fn single_frame_cycle_is_always_phase_zero() {
        let config = timing(1);
        for n in [0, 1, 17, 1_000_003] {
            assert_eq!(frame_timing(n, &config).decay_phase, 0.0);
        }
    }

    #[test]
    fn slow_motion_stretches_the_cycle() {
        let config = TimingConfig {
            slow_motion_factor: 10.0,
            ..timing(2)
        };
        assert!((frame_timing(5, &config).decay_phase - 0.25).abs() < 1e-6);
        assert_eq!(frame_timing(20, &config).decay_phase, 0.0);
    }

    #[test]
    fn phase_flip_polarity_follows_the_interval() {
        assert_eq!(phase_flip_offset(0, 600), 0.0);
        assert_eq!(phase_flip_offset(599, 600), 0.0);
        assert_eq!(phase_flip_offset(600, 600), 0.5);
        assert_eq!(phase_flip_offset(1199, 600), 0.5);
        assert_eq!(phase_flip_offset(1200, 600), 0.0);
    }

    #[test]
    fn flip_interval_is_moved_off_cycle_multiples() {
        assert_eq!(adjusted_flip_interval(600, 2), 601);
        assert_eq!(adjusted_flip_interval(601, 2), 601);
        assert_eq!(adjusted_flip_interval(6, 3), 7);
        assert_eq!(adjusted_flip_interval(0, 4), 1);
    }

    #[test]
    fn phase_flip_shifts_phase_by_half_a_cycle() {
        let config = TimingConfig {
            lcd_safe_mode: true,
            lcd_safe_method: LcdSafeMethod::PhaseFlip,
            lcd_flip_interval: 7,
            ..timing(2)
        };
        let before = frame_timing(6, &config);
        assert_eq!(before.phase_offset, 0.0);
        assert_eq!(before.decay_phase, 0.0);
        let after = frame_timing(8, &config);
        assert_eq!(after.phase_offset, 0.5);
        assert_eq!(after.decay_phase, 0.5);
    }

    #[test]
    fn mitigation_is_inert_for_odd_cycles() {
        let config = TimingConfig {
            lcd_safe_mode: true,
            lcd_safe_method: LcdSafeMethod::FrameDrop,
            lcd_flip_interval: 5,
            ..timing(3)
        };
        let result = frame_timing(50, &config);
        assert_eq!(result.effective_counter, 50);
        assert_eq!(result.phase_offset, 0.0);
    }

    #[test]
    fn phase_jump_adds_drift() {
        let config = TimingConfig {
            lcd_safe_mode: true,
            lcd_safe_method: LcdSafeMethod::PhaseJump,
            lcd_jump_rate: 0.0625,
            ..timing(2)
        };
        assert_eq!(frame_timing(15, &config).effective_counter, 15);
        assert_eq!(frame_timing(16, &config).effective_counter, 17);
        assert_eq!(frame_timing(100, &config).effective_counter, 106);
    }

    #[test]
    fn frame_drop_stalls_progression() {
        let config = TimingConfig {
            lcd_safe_mode: true,
            lcd_safe_method: LcdSafeMethod::FrameDrop,
            lcd_flip_interval: 10,
            ..timing(4)
        };
        // 10 is not a multiple of 4, so the interval stays at 10.
        assert_eq!(frame_timing(9, &config).effective_counter, 9);
        assert_eq!(frame_timing(10, &config).effective_counter, 9);
        assert_eq!(frame_timing(25, &config).effective_counter, 23);
    }

    #[test]
    fn fract_wraps_negatives() {
        assert_eq!(fract(-0.25), 0.75);
        assert_eq!(fract(3.5), 0.5);
        assert_eq!(fract_f32(-1.0), 0.0);
    }
}
