// THEORY:
// Final color shaping, applied after all light-structure stages.
//
// 1.  **Softclip**: Reinhard compression `c / (1 + c)`, blended with the uncompressed color
//     by the softclip strength, so highlights driven far above 1.0 by beam current roll
//     off instead of clipping. Negative channels (left by unquantized dither noise) enter
//     the compression at zero, so the curve stays bounded in [0, 1).
// 2.  **Saturation**: extrapolation from the BT.601 luma grey. 1.0 is skipped.
// 3.  **Hue Rotation**: a fixed YIQ-derived 3x3 matrix in sin/cos of the angle. 0 is skipped.

use crate::core_modules::color::color::{Channel, Color, LUMA_WEIGHTS};
use crate::core_modules::parameters::ParameterSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneConfig {
    pub softclip_strength: f32,
    pub saturation: f32,
    /// Degrees.
    pub hue_shift: f32,
}

impl From<&ParameterSet> for ToneConfig {
    fn from(parameters: &ParameterSet) -> Self {
        Self {
            softclip_strength: parameters.softclip_strength,
            saturation: parameters.saturation,
            hue_shift: parameters.hue_shift,
        }
    }
}

/// Sine coefficients of the YIQ hue rotation.
const HUE_SIN: [[Channel; 3]; 3] = [
    [0.168, 0.330, -0.497],
    [-0.328, 0.035, 0.292],
    [1.25, -1.05, -0.203],
];

#[inline]
pub fn softclip(color: Color, strength: f32) -> Color {
    if strength == 0.0 {
        return color;
    }
    let compressed = color.map(|c| {
        let c = c.max(0.0);
        c / (1.0 + c)
    });
    color.lerp(compressed, strength)
}

#[inline]
pub fn adjust_saturation(color: Color, saturation: f32) -> Color {
    if saturation == 1.0 {
        return color;
    }
    Color::splat(color.luma()).lerp(color, saturation)
}

/// Rotation matrix for `degrees`: `L + cos * (I - L) + sin * S`, where every row of L
/// is the luma weights.
pub fn hue_matrix(degrees: f32) -> [[Channel; 3]; 3] {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let mut matrix = [[0.0; 3]; 3];
    for (row, out) in matrix.iter_mut().enumerate() {
        for (col, cell) in out.iter_mut().enumerate() {
            let identity = if row == col { 1.0 } else { 0.0 };
            *cell = LUMA_WEIGHTS[col] + cos * (identity - LUMA_WEIGHTS[col]) + sin * HUE_SIN[row][col];
        }
    }
    matrix
}

pub fn rotate_hue(color: Color, degrees: f32) -> Color {
    if degrees == 0.0 {
        return color;
    }
    let m = hue_matrix(degrees);
    let c = color.to_array();
    let row = |r: [Channel; 3]| r[0] * c[0] + r[1] * c[1] + r[2] * c[2];
    Color::new(row(m[0]), row(m[1]), row(m[2]))
}

pub fn apply_tone(color: Color, config: &ToneConfig) -> Color {
    let compressed = softclip(color, config.softclip_strength);
    let saturated = adjust_saturation(compressed, config.saturation);
    rotate_hue(saturated, config.hue_shift)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: Color = Color::new(0.8, 0.3, 0.1);

    #[test]
    fn full_softclip_is_reinhard() {
        let out = softclip(Color::new(1.0, 3.0, 0.0), 1.0);
        assert!(out.max_abs_diff(&Color::new(0.5, 0.75, 0.0)) < 1e-6);
    }

    #[test]
    fn negative_channels_compress_to_black() {
        for c in [-1.0, -2.0, -5.0] {
            let out = softclip(Color::splat(c), 1.0);
            assert_eq!(out, Color::BLACK);
        }
        let half = softclip(Color::splat(-1.0), 0.5);
        assert!(half.to_array().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn half_softclip_blends() {
        // lerp(1.0, 0.5, 0.5)
        let out = softclip(Color::splat(1.0), 0.5);
        assert!(out.max_abs_diff(&Color::splat(0.75)) < 1e-6);
    }

    #[test]
    fn unity_saturation_is_identity() {
        assert_eq!(adjust_saturation(SAMPLE, 1.0), SAMPLE);
    }

    #[test]
    fn zero_saturation_is_luma_grey() {
        let out = adjust_saturation(SAMPLE, 0.0);
        let luma = SAMPLE.luma();
        assert!(out.max_abs_diff(&Color::splat(luma)) < 1e-6);
        assert_eq!(out.red, out.green);
        assert_eq!(out.green, out.blue);
    }

    #[test]
    fn zero_hue_is_exact_identity() {
        assert_eq!(rotate_hue(SAMPLE, 0.0), SAMPLE);
    }

    #[test]
    fn hue_rotation_keeps_greys() {
        let grey = Color::splat(0.4);
        for degrees in [30.0, 90.0, -120.0, 180.0] {
            assert!(rotate_hue(grey, degrees).max_abs_diff(&grey) < 2e-3);
        }
    }

    #[test]
    fn full_turn_matrix_is_near_identity() {
        let m = hue_matrix(360.0);
        for (row, values) in m.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                let expected = if row == col { 1.0 } else { 0.0 };
                assert!((value - expected).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn neutral_tone_is_identity() {
        let neutral = ToneConfig { softclip_strength: 0.0, saturation: 1.0, hue_shift: 0.0 };
        assert_eq!(apply_tone(SAMPLE, &neutral), SAMPLE);
    }
}
