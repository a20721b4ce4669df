// THEORY:
// The dither stage adds a deterministic, spatially patterned perturbation before the
// optional 5:6:5 quantization, trading banding for fine structured noise.
//
// Algorithm:
// 1.  **Ordered Lookup**: the classical Bayer matrices (2x2, 4x4, 8x8) are static tables.
//     The value at (y mod size, x mod size) is normalized by size² into [0, 1).
// 2.  **Temporal Shift**: optionally the value is rotated by the cycle position
//     `(frame mod N) / N` and wrapped, so the pattern moves between frames. The shift is
//     applied before the noise is formed; that ordering defines the look.
// 3.  **Noise**: `(value - 0.5) * strength`, centered on zero.
// 4.  **Quantization**: with 16-bit output the noise is scaled to one quantization step
//     of each channel (31 levels for red/blue, 63 for green) and the result is clamped
//     and rounded to the nearest level. Without it, the raw noise is simply added.

use crate::core_modules::color::color::{Channel, Color};
use crate::core_modules::fragment::FrameCounter;
use crate::core_modules::frame_timing::fract_f32;
use crate::core_modules::parameters::{DitherMatrix, ParameterSet};

/// Levels of a 5-bit channel (red, blue).
pub const LEVELS_5BIT: Channel = 31.0;
/// Levels of a 6-bit channel (green).
pub const LEVELS_6BIT: Channel = 63.0;

pub static BAYER_2X2: [[u8; 2]; 2] = [
    [0, 2],
    [3, 1],
];

pub static BAYER_4X4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

pub static BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Dither inputs, extracted from a `ParameterSet`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DitherConfig {
    pub matrix: DitherMatrix,
    pub strength: f32,
    pub temporal: bool,
    pub quantize_16bit: bool,
    pub frames_per_effect: u32,
}

impl From<&ParameterSet> for DitherConfig {
    fn from(parameters: &ParameterSet) -> Self {
        Self {
            matrix: parameters.dither_matrix,
            strength: parameters.dither_strength,
            temporal: parameters.temporal_dither,
            quantize_16bit: parameters.quantize_16bit,
            frames_per_effect: parameters.frames_per_effect,
        }
    }
}

/// Normalized ordered-dither value in [0, 1) for pixel (x, y).
pub fn bayer_value(x: u32, y: u32, matrix: DitherMatrix) -> f32 {
    let size = matrix.size();
    let (row, col) = ((y % size) as usize, (x % size) as usize);
    let raw = match matrix {
        DitherMatrix::Bayer2 => BAYER_2X2[row][col],
        DitherMatrix::Bayer4 => BAYER_4X4[row][col],
        DitherMatrix::Bayer8 => BAYER_8X8[row][col],
    };
    raw as f32 / (size * size) as f32
}

/// The Bayer value, rotated by the cycle position when temporal dithering is on.
pub fn dither_value(x: u32, y: u32, frame_counter: FrameCounter, config: &DitherConfig) -> f32 {
    let value = bayer_value(x, y, config.matrix);
    if !config.temporal {
        return value;
    }
    let cycle = config.frames_per_effect.max(1) as FrameCounter;
    let shift = (frame_counter % cycle) as f32 / cycle as f32;
    fract_f32(value + shift)
}

/// Rounds `value` to the nearest of `levels` steps after clamping to [0, 1].
#[inline]
pub fn quantize_channel(value: Channel, levels: Channel) -> Channel {
    (value.clamp(0.0, 1.0) * levels + 0.5).floor() / levels
}

/// Applies ordered noise and, optionally, 5:6:5 quantization.
pub fn apply_dither(
    color: Color,
    x: u32,
    y: u32,
    frame_counter: FrameCounter,
    config: &DitherConfig,
) -> Color {
    let noise = (dither_value(x, y, frame_counter, config) - 0.5) * config.strength;

    if config.quantize_16bit {
        Color::new(
            quantize_channel(color.red + noise / LEVELS_5BIT, LEVELS_5BIT),
            quantize_channel(color.green + noise / LEVELS_6BIT, LEVELS_6BIT),
            quantize_channel(color.blue + noise / LEVELS_5BIT, LEVELS_5BIT),
        )
    } else if config.strength == 0.0 {
        color
    } else {
        color.map(|c| c + noise)
    }
}
