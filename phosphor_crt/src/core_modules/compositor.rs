// THEORY:
// The compositor is the last word on each pixel. Normally it passes the processed color
// through. In split-screen comparison mode everything right of the split shows the
// untouched source, and an optional white divider is painted over a 2-pixel band at the
// split. The cut is hard; there is no blending.

use crate::core_modules::color::color::Color;
use crate::core_modules::parameters::ParameterSet;

/// Divider half-width in output pixels.
pub const DIVIDER_HALF_WIDTH: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositorConfig {
    pub split_screen: bool,
    pub split_position: f32,
    pub show_divider: bool,
}

impl From<&ParameterSet> for CompositorConfig {
    fn from(parameters: &ParameterSet) -> Self {
        Self {
            split_screen: parameters.split_screen,
            split_position: parameters.split_position,
            show_divider: parameters.show_divider,
        }
    }
}

/// True within one pixel either side of the split, at `width` output columns.
#[inline]
pub fn on_divider(u: f32, split_position: f32, width: u32) -> bool {
    (u - split_position).abs() * (width as f32) < DIVIDER_HALF_WIDTH
}

pub fn composite(processed: Color, source: Color, u: f32, width: u32, config: &CompositorConfig) -> Color {
    if !config.split_screen {
        return processed;
    }
    if config.show_divider && on_divider(u, config.split_position, width) {
        return Color::WHITE;
    }
    if u > config.split_position { source } else { processed }
}
