// THEORY:
// `ParameterSet` is the flat, immutable bundle of every knob the pipeline reads. It is
// constructed by the host (directly, from a TOML file, or by a UI) once per configuration
// change and is only ever read while a frame is being processed.
//
// Key architectural principles:
// 1.  **Flat Data**: Presets, timing, display response, decay, dithering, scanlines,
//     split-screen and burn-in mitigation all live side by side. Presets are overrides of
//     these fields, not subtypes (see `preset`).
// 2.  **Total Enums**: Every enum selector has a documented fallback for out-of-contract
//     indices (`from_index`), so a host passing raw integers can never make a stage fail.
// 3.  **Host-Side Validation**: The pipeline trusts its parameters. `clamped()` and the
//     `PARAMETER_RANGES` table exist for the host to pre-validate before handing a set
//     over; nothing in the pipeline calls them implicitly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound on the number of exponential decay stages.
pub const MAX_DECAY_STAGES: u32 = 10;

/// Named preset overriding a subset of the display/decay parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Manual,
    #[serde(rename = "flat_srgb")]
    FlatSrgb,
    Vibrant,
    QuickPhosphor,
}

impl Preset {
    /// Maps a host-side selector index; anything unknown behaves as `Manual`.
    pub fn from_index(index: u32) -> Self {
        match index {
            1 => Preset::FlatSrgb,
            2 => Preset::Vibrant,
            3 => Preset::QuickPhosphor,
            _ => Preset::Manual,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Manual => "manual",
            Preset::FlatSrgb => "flat_srgb",
            Preset::Vibrant => "vibrant",
            Preset::QuickPhosphor => "quick_phosphor",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "manual" => Ok(Preset::Manual),
            "flat_srgb" | "flatsrgb" => Ok(Preset::FlatSrgb),
            "vibrant" => Ok(Preset::Vibrant),
            "quick_phosphor" | "quickphosphor" => Ok(Preset::QuickPhosphor),
            _ => Err(s.to_string()),
        }
    }
}

/// Spatial pattern of the decay pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayMode {
    /// The whole frame decays in lockstep.
    #[default]
    UniformPulse,
    /// Rows are offset in phase by their vertical position.
    RasterSweep,
}

impl DecayMode {
    pub fn from_index(index: u32) -> Self {
        match index {
            1 => DecayMode::RasterSweep,
            _ => DecayMode::UniformPulse,
        }
    }
}

/// Ordered dither matrix granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DitherMatrix {
    #[serde(rename = "2x2")]
    Bayer2,
    #[default]
    #[serde(rename = "4x4")]
    Bayer4,
    #[serde(rename = "8x8")]
    Bayer8,
}

impl DitherMatrix {
    /// Unknown selectors fall back to 4x4.
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => DitherMatrix::Bayer2,
            2 => DitherMatrix::Bayer8,
            _ => DitherMatrix::Bayer4,
        }
    }

    pub fn size(&self) -> u32 {
        match self {
            DitherMatrix::Bayer2 => 2,
            DitherMatrix::Bayer4 => 4,
            DitherMatrix::Bayer8 => 8,
        }
    }
}

/// Orientation of the scanline mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanlineDirection {
    #[default]
    Horizontal,
    Vertical,
    Trinitron,
    Crosshatch,
}

impl ScanlineDirection {
    /// Unknown selectors fall back to horizontal lines.
    pub fn from_index(index: u32) -> Self {
        match index {
            1 => ScanlineDirection::Vertical,
            2 => ScanlineDirection::Trinitron,
            3 => ScanlineDirection::Crosshatch,
            _ => ScanlineDirection::Horizontal,
        }
    }
}

/// Burn-in mitigation strategy for LCD-safe mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LcdSafeMethod {
    #[default]
    PhaseJump,
    PhaseFlip,
    FrameDrop,
}

impl LcdSafeMethod {
    /// Unknown selectors fall back to phase jumping.
    pub fn from_index(index: u32) -> Self {
        match index {
            1 => LcdSafeMethod::PhaseFlip,
            2 => LcdSafeMethod::FrameDrop,
            _ => LcdSafeMethod::PhaseJump,
        }
    }
}

/// Every tunable of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    // --- Preset ---
    pub preset: Preset,

    // --- Timing ---
    /// Length of one decay cycle in frames.
    pub frames_per_effect: u32,
    pub decay_mode: DecayMode,
    /// Number of raster sweeps across the frame height per cycle.
    pub raster_frequency: f32,
    /// Debug time dilation; 1.0 is real time.
    pub slow_motion_factor: f32,

    // --- Display response ---
    /// Power-law exponent (beam voltage).
    pub contrast: f32,
    /// Linear scale (beam current).
    pub brightness: f32,
    pub midtone_boost: f32,
    /// Reinhard compression mix, 0 = none, 1 = full.
    pub softclip_strength: f32,

    // --- Color ---
    pub saturation: f32,
    /// Hue rotation in degrees.
    pub hue_shift: f32,
    /// Minimum decay multiplier (residual glow).
    pub black_level_floor: f32,

    // --- Decay ---
    pub global_decay_speed: f32,
    pub red_decay_multiplier: f32,
    pub green_decay_multiplier: f32,
    pub blue_decay_multiplier: f32,
    pub decay_stages: u32,

    // --- Dither ---
    pub dither_matrix: DitherMatrix,
    pub dither_strength: f32,
    pub quantize_16bit: bool,
    pub temporal_dither: bool,

    // --- Scanlines ---
    pub scanline_direction: ScanlineDirection,
    /// Bright segment width in pixels.
    pub scanline_bright_width: f32,
    /// Gap width in pixels; 0 disables masking.
    pub scanline_gap_width: f32,
    pub scanline_gap_darkness: f32,
    pub aperture_grille_strength: f32,

    // --- Split screen ---
    pub split_screen: bool,
    pub split_position: f32,
    pub show_divider: bool,

    // --- LCD burn-in mitigation ---
    pub lcd_safe_mode: bool,
    pub lcd_safe_method: LcdSafeMethod,
    pub lcd_jump_rate: f32,
    pub lcd_flip_interval: u32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            preset: Preset::Manual,

            frames_per_effect: 2,
            decay_mode: DecayMode::UniformPulse,
            raster_frequency: 1.0,
            slow_motion_factor: 1.0,

            contrast: 1.0,
            brightness: 1.0,
            midtone_boost: 0.0,
            softclip_strength: 0.0,

            saturation: 1.0,
            hue_shift: 0.0,
            black_level_floor: 0.005,

            global_decay_speed: 5.0,
            red_decay_multiplier: 1.0,
            green_decay_multiplier: 1.0,
            blue_decay_multiplier: 1.0,
            decay_stages: 4,

            dither_matrix: DitherMatrix::Bayer4,
            dither_strength: 0.0,
            quantize_16bit: false,
            temporal_dither: false,

            scanline_direction: ScanlineDirection::Horizontal,
            scanline_bright_width: 2.0,
            scanline_gap_width: 0.0,
            scanline_gap_darkness: 0.5,
            aperture_grille_strength: 0.3,

            split_screen: false,
            split_position: 0.5,
            show_divider: true,

            lcd_safe_mode: false,
            lcd_safe_method: LcdSafeMethod::PhaseJump,
            lcd_jump_rate: 0.001,
            lcd_flip_interval: 600,
        }
    }
}

/// Descriptor for a bounded numeric parameter.
#[derive(Clone, Debug)]
pub struct ParamRange {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub description: &'static str,
}

const fn range(name: &'static str, min: f32, max: f32, description: &'static str) -> ParamRange {
    ParamRange {
        name,
        min,
        max,
        description,
    }
}

/// Host-facing contract ranges for every numeric parameter.
pub const PARAMETER_RANGES: &[ParamRange] = &[
    range("frames_per_effect", 1.0, 12.0, "Decay cycle length in frames"),
    range("raster_frequency", 0.001, 10.0, "Raster sweep spacing"),
    range("slow_motion_factor", 1.0, 500.0, "Debug time dilation"),
    range("contrast", 0.01, 5.0, "Gamma exponent (beam voltage)"),
    range("brightness", 0.1, 1000.0, "Linear scale (beam current)"),
    range("midtone_boost", 0.0, 50.0, "Midtone punch"),
    range("softclip_strength", 0.0, 1.0, "Highlight compression"),
    range("saturation", 0.0, 2.0, "Chroma scale"),
    range("hue_shift", -180.0, 180.0, "Hue rotation in degrees"),
    range("black_level_floor", 0.0, 1.0, "Decay minimum"),
    range("global_decay_speed", 0.01, 25.0, "Decay rate"),
    range("red_decay_multiplier", 0.01, 5.0, "Red decay rate"),
    range("green_decay_multiplier", 0.01, 5.0, "Green decay rate"),
    range("blue_decay_multiplier", 0.01, 5.0, "Blue decay rate"),
    range("decay_stages", 1.0, MAX_DECAY_STAGES as f32, "Exponential stage count"),
    range("dither_strength", 0.0, 10.0, "Noise amplitude"),
    range("scanline_bright_width", 0.0, 64.0, "Bright segment width in pixels"),
    range("scanline_gap_width", 0.0, 64.0, "Gap width in pixels"),
    range("scanline_gap_darkness", 0.0, 1.0, "Gap dimming"),
    range("aperture_grille_strength", 0.0, 1.0, "Trinitron channel separation"),
    range("split_position", 0.0, 1.0, "Split-screen position"),
    range("lcd_jump_rate", 0.0001, 0.1, "Phase jump rate"),
    range("lcd_flip_interval", 1.0, 3600.0, "Phase flip interval in frames"),
];

/// Looks up a range descriptor by parameter name.
pub fn parameter_range(name: &str) -> Option<&'static ParamRange> {
    PARAMETER_RANGES.iter().find(|r| r.name == name)
}

impl ParameterSet {
    /// Returns a copy with every numeric field clamped to its contract range.
    pub fn clamped(&self) -> Self {
        fn clamp_f(value: f32, name: &str) -> f32 {
            match parameter_range(name) {
                // NaN collapses to the lower bound.
                Some(r) if value.is_nan() => r.min,
                Some(r) => value.clamp(r.min, r.max),
                None => value,
            }
        }
        fn clamp_u(value: u32, name: &str) -> u32 {
            match parameter_range(name) {
                Some(r) => value.clamp(r.min as u32, r.max as u32),
                None => value,
            }
        }

        Self {
            frames_per_effect: clamp_u(self.frames_per_effect, "frames_per_effect"),
            raster_frequency: clamp_f(self.raster_frequency, "raster_frequency"),
            slow_motion_factor: clamp_f(self.slow_motion_factor, "slow_motion_factor"),
            contrast: clamp_f(self.contrast, "contrast"),
            brightness: clamp_f(self.brightness, "brightness"),
            midtone_boost: clamp_f(self.midtone_boost, "midtone_boost"),
            softclip_strength: clamp_f(self.softclip_strength, "softclip_strength"),
            saturation: clamp_f(self.saturation, "saturation"),
            hue_shift: clamp_f(self.hue_shift, "hue_shift"),
            black_level_floor: clamp_f(self.black_level_floor, "black_level_floor"),
            global_decay_speed: clamp_f(self.global_decay_speed, "global_decay_speed"),
            red_decay_multiplier: clamp_f(self.red_decay_multiplier, "red_decay_multiplier"),
            green_decay_multiplier: clamp_f(self.green_decay_multiplier, "green_decay_multiplier"),
            blue_decay_multiplier: clamp_f(self.blue_decay_multiplier, "blue_decay_multiplier"),
            decay_stages: clamp_u(self.decay_stages, "decay_stages"),
            dither_strength: clamp_f(self.dither_strength, "dither_strength"),
            scanline_bright_width: clamp_f(self.scanline_bright_width, "scanline_bright_width"),
            scanline_gap_width: clamp_f(self.scanline_gap_width, "scanline_gap_width"),
            scanline_gap_darkness: clamp_f(self.scanline_gap_darkness, "scanline_gap_darkness"),
            aperture_grille_strength: clamp_f(
                self.aperture_grille_strength,
                "aperture_grille_strength",
            ),
            split_position: clamp_f(self.split_position, "split_position"),
            lcd_jump_rate: clamp_f(self.lcd_jump_rate, "lcd_jump_rate"),
            lcd_flip_interval: clamp_u(self.lcd_flip_interval, "lcd_flip_interval"),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_selectors_fall_back_to_defaults() {
        assert_eq!(Preset::from_index(42), Preset::Manual);
        assert_eq!(DecayMode::from_index(9), DecayMode::UniformPulse);
        assert_eq!(DitherMatrix::from_index(7), DitherMatrix::Bayer4);
        assert_eq!(ScanlineDirection::from_index(99), ScanlineDirection::Horizontal);
        assert_eq!(LcdSafeMethod::from_index(5), LcdSafeMethod::PhaseJump);
    }

    #[test]
    fn preset_names_parse_loosely() {
        assert_eq!("Flat-sRGB".parse::<Preset>(), Ok(Preset::FlatSrgb));
        assert_eq!("quick phosphor".parse::<Preset>(), Ok(Preset::QuickPhosphor));
        assert_eq!(Preset::Vibrant.to_string().parse::<Preset>(), Ok(Preset::Vibrant));
        assert!("plasma".parse::<Preset>().is_err());
    }

    #[test]
    fn defaults_are_already_within_range() {
        let defaults = ParameterSet::default();
        assert_eq!(defaults.clamped(), defaults);
    }

    #[test]
    fn clamping_pulls_values_into_contract() {
        let wild = ParameterSet {
            frames_per_effect: 0,
            contrast: -3.0,
            decay_stages: 40,
            saturation: f32::NAN,
            lcd_flip_interval: 100_000,
            ..ParameterSet::default()
        };
        let tame = wild.clamped();
        assert_eq!(tame.frames_per_effect, 1);
        assert_eq!(tame.contrast, 0.01);
        assert_eq!(tame.decay_stages, MAX_DECAY_STAGES);
        assert_eq!(tame.saturation, 0.0);
        assert_eq!(tame.lcd_flip_interval, 3600);
    }

    #[test]
    fn every_range_is_well_formed() {
        for r in PARAMETER_RANGES {
            assert!(r.min <= r.max, "{} has an inverted range", r.name);
            assert!(!r.description.is_empty());
        }
    }
}
