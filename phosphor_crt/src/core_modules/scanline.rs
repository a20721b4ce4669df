// THEORY:
// The scanline stage imposes the CRT's physical line structure on the decayed image.
// A one-dimensional pattern of period `bright + gap` pixels is laid along an axis; pixels
// in the gap are dimmed by `1 - darkness`.
//
// Key architectural principles:
// 1.  **Gap First**: the dark segment occupies the start of every period (position 0),
//     so bright centroids never sit on a pattern boundary.
// 2.  **Scalar vs Channel Masks**: Horizontal, Vertical and Crosshatch produce a single
//     scalar multiplier. Trinitron additionally masks channels individually (an aperture
//     grille of R, G, B columns), so its mask is a color, not a scalar.
// 3.  **Defined Short-Circuits**: a zero gap or zero darkness disables the stage.

use crate::core_modules::color::color::{Channel, Color};
use crate::core_modules::parameters::{ParameterSet, ScanlineDirection};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanlineConfig {
    pub direction: ScanlineDirection,
    pub bright_width: f32,
    pub gap_width: f32,
    pub gap_darkness: f32,
    pub aperture_grille_strength: f32,
}

impl From<&ParameterSet> for ScanlineConfig {
    fn from(parameters: &ParameterSet) -> Self {
        Self {
            direction: parameters.scanline_direction,
            bright_width: parameters.scanline_bright_width,
            gap_width: parameters.scanline_gap_width,
            gap_darkness: parameters.scanline_gap_darkness,
            aperture_grille_strength: parameters.aperture_grille_strength,
        }
    }
}

impl ScanlineConfig {
    pub fn is_active(&self) -> bool {
        self.gap_width > 0.0 && self.gap_darkness > 0.0
    }
}

/// Mask value along one axis: `1 - darkness` inside the gap, 1 otherwise.
#[inline]
pub fn band_mask(coordinate: u32, bright_width: f32, gap_width: f32, gap_darkness: f32) -> Channel {
    let period = bright_width + gap_width;
    if gap_width <= 0.0 || period <= 0.0 {
        return 1.0;
    }
    let position = coordinate as f32 % period;
    if position < gap_width { 1.0 - gap_darkness } else { 1.0 }
}

/// Aperture grille: the column's own channel passes, the other two are dimmed.
pub fn grille_mask(x: u32, strength: f32) -> Color {
    let dimmed = 1.0 - strength;
    match x % 3 {
        0 => Color::new(1.0, dimmed, dimmed),
        1 => Color::new(dimmed, 1.0, dimmed),
        _ => Color::new(dimmed, dimmed, 1.0),
    }
}

pub fn apply_scanlines(color: Color, x: u32, y: u32, config: &ScanlineConfig) -> Color {
    if !config.is_active() {
        return color;
    }
    let rows = band_mask(y, config.bright_width, config.gap_width, config.gap_darkness);
    match config.direction {
        ScanlineDirection::Horizontal => color * rows,
        ScanlineDirection::Vertical => {
            color * band_mask(x, config.bright_width, config.gap_width, config.gap_darkness)
        }
        ScanlineDirection::Crosshatch => {
            let columns = band_mask(x, config.bright_width, config.gap_width, config.gap_darkness);
            color * (rows * columns)
        }
        // Channel-wise; no trailing scalar multiply.
        ScanlineDirection::Trinitron => {
            color * (grille_mask(x, config.aperture_grille_strength) * rows)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(direction: ScanlineDirection) -> ScanlineConfig {
        ScanlineConfig {
            direction,
            bright_width: 2.0,
            gap_width: 1.0,
            gap_darkness: 0.75,
            aperture_grille_strength: 0.5,
        }
    }

    #[test]
    fn gap_comes_first_in_the_period() {
        let masks: Vec<f32> = (0..6).map(|y| band_mask(y, 2.0, 1.0, 0.75)).collect();
        assert_eq!(masks, vec![0.25, 1.0, 1.0, 0.25, 1.0, 1.0]);
    }

    #[test]
    fn horizontal_follows_rows_vertical_follows_columns() {
        let white = Color::WHITE;
        let horizontal = config(ScanlineDirection::Horizontal);
        assert_eq!(apply_scanlines(white, 1, 0, &horizontal), Color::splat(0.25));
        assert_eq!(apply_scanlines(white, 0, 1, &horizontal), white);

        let vertical = config(ScanlineDirection::Vertical);
        assert_eq!(apply_scanlines(white, 0, 1, &vertical), Color::splat(0.25));
        assert_eq!(apply_scanlines(white, 1, 0, &vertical), white);
    }

    #[test]
    fn crosshatch_is_dark_where_either_axis_is() {
        let cross = config(ScanlineDirection::Crosshatch);
        let white = Color::WHITE;
        assert_eq!(apply_scanlines(white, 0, 1, &cross), Color::splat(0.25));
        assert_eq!(apply_scanlines(white, 1, 0, &cross), Color::splat(0.25));
        assert_eq!(apply_scanlines(white, 0, 0, &cross), Color::splat(0.0625));
        assert_eq!(apply_scanlines(white, 1, 1, &cross), white);
    }

    #[test]
    fn trinitron_masks_channels_per_column() {
        let trinitron = config(ScanlineDirection::Trinitron);
        let white = Color::WHITE;
        assert_eq!(apply_scanlines(white, 0, 1, &trinitron), Color::new(1.0, 0.5, 0.5));
        assert_eq!(apply_scanlines(white, 1, 1, &trinitron), Color::new(0.5, 1.0, 0.5));
        assert_eq!(apply_scanlines(white, 5, 1, &trinitron), Color::new(0.5, 0.5, 1.0));
        // Gap row combines with the grille.
        assert_eq!(apply_scanlines(white, 3, 0, &trinitron), Color::new(0.25, 0.125, 0.125));
    }

    #[test]
    fn zero_gap_or_darkness_disables_masking() {
        let color = Color::new(0.2, 0.4, 0.6);
        for direction in [
            ScanlineDirection::Horizontal,
            ScanlineDirection::Vertical,
            ScanlineDirection::Trinitron,
            ScanlineDirection::Crosshatch,
        ] {
            let no_gap = ScanlineConfig { gap_width: 0.0, ..config(direction) };
            let no_dark = ScanlineConfig { gap_darkness: 0.0, ..config(direction) };
            for (x, y) in [(0, 0), (1, 2), (7, 3)] {
                assert_eq!(apply_scanlines(color, x, y, &no_gap), color);
                assert_eq!(apply_scanlines(color, x, y, &no_dark), color);
            }
        }
    }

    #[test]
    fn fractional_widths_use_float_positions() {
        // Period 2.5: rows 0 and 5 start a period, row 2 lands at 2.0 (bright).
        assert_eq!(band_mask(0, 1.5, 1.0, 1.0), 0.0);
        assert_eq!(band_mask(2, 1.5, 1.0, 1.0), 1.0);
        assert_eq!(band_mask(5, 1.5, 1.0, 1.0), 0.0);
    }
}
