// THEORY:
// The beam response stage models how hard the electron gun drives the phosphor for a
// given input level. It shapes the raw sample before anything else touches it:
//
// 1.  **Beam Voltage (contrast)**: a component-wise power law. Inputs are assumed
//     non-negative; the host guarantees a normalized source.
// 2.  **Midtone Boost**: a parabola `c * (1 - c) * 4` that peaks at 0.5 and vanishes at 0
//     and 1, so midtones gain punch while near-black and near-white are left alone.
// 3.  **Beam Current (brightness)**: a linear scale. Decay darkens the frame on average,
//     so this is routinely well above 1.0; the result is deliberately left unclamped.

use crate::core_modules::color::color::{Channel, Color};

/// 4 * c * (1 - c): zero at 0 and 1, one at 0.5.
#[inline]
pub fn midtone_weight(channel: Channel) -> Channel {
    channel * (1.0 - channel) * 4.0
}

/// Applies contrast exponent, midtone boost and brightness scale, in that order.
#[inline]
pub fn beam_response(color: Color, contrast: f32, midtone_boost: f32, brightness: f32) -> Color {
    let shaped = color.map(|c| c.powf(contrast));
    let boosted = if midtone_boost == 0.0 {
        shaped
    } else {
        shaped.map(|c| c + c * midtone_weight(c) * midtone_boost)
    };
    boosted * brightness
}
