// THEORY:
// The `Color` module is the most fundamental unit of the phosphor pipeline. It is a
// "dumb" value type: three real-valued, gamma-encoded channels plus a handful of
// heuristics that need nothing but the color itself.
//
// Key architectural principles:
// 1.  **Unbounded Intermediates**: Intermediate stages routinely push channels above 1.0
//     (brightness can reach 1000x). Nothing in this module clamps; clamping is the
//     explicit job of the stages that document it (quantization, softclip).
// 2.  **Gamma-Encoded Throughout**: The pipeline never linearizes. Every operation here
//     works on the encoded values the host hands us and hands back.
// 3.  **Component-Wise Algebra**: Stages compose through `map`, `zip_map`, scalar and
//     per-channel multiplication, so each stage reads as the formula it implements.

pub mod color {
    use image::{Rgb, Rgba};
    use std::ops::Mul;

    pub type Channel = f32;
    pub type Luma = f32;
    pub type Byte = u8;

    /// ITU-R BT.601 luma weights.
    pub const LUMA_WEIGHTS: [Channel; 3] = [0.299, 0.587, 0.114];

    /// A gamma-encoded RGB color with unbounded (non-negative) channels.
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Color {
        /// The red channel.
        pub red: Channel,
        /// The green channel.
        pub green: Channel,
        /// The blue channel.
        pub blue: Channel,
    }

    impl Color {
        pub const BLACK: Color = Color::splat(0.0);
        pub const WHITE: Color = Color::splat(1.0);

        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Self { red, green, blue }
        }

        pub const fn splat(value: Channel) -> Self {
            Self::new(value, value, value)
        }

        /// Applies `f` to every channel.
        #[inline]
        pub fn map(self, f: impl Fn(Channel) -> Channel) -> Self {
            Self::new(f(self.red), f(self.green), f(self.blue))
        }

        /// Combines two colors channel by channel.
        #[inline]
        pub fn zip_map(self, other: Color, f: impl Fn(Channel, Channel) -> Channel) -> Self {
            Self::new(
                f(self.red, other.red),
                f(self.green, other.green),
                f(self.blue, other.blue),
            )
        }

        /// Linear interpolation from `self` (t = 0) to `other` (t = 1).
        /// `t` outside [0, 1] extrapolates.
        #[inline]
        pub fn lerp(self, other: Color, t: Channel) -> Self {
            self.zip_map(other, |a, b| a + (b - a) * t)
        }

        /// Luma estimate (Rec. 601).
        #[inline]
        pub fn luma(&self) -> Luma {
            LUMA_WEIGHTS[0] * self.red + LUMA_WEIGHTS[1] * self.green + LUMA_WEIGHTS[2] * self.blue
        }

        /// Clamps each channel into [0, 1].
        #[inline]
        pub fn saturate(self) -> Self {
            self.map(|c| c.clamp(0.0, 1.0))
        }

        pub fn to_array(self) -> [Channel; 3] {
            [self.red, self.green, self.blue]
        }

        /// Largest absolute channel difference, for tolerance comparisons.
        pub fn max_abs_diff(&self, other: &Color) -> Channel {
            (self.red - other.red)
                .abs()
                .max((self.green - other.green).abs())
                .max((self.blue - other.blue).abs())
        }

        /// Encodes into an 8-bit sample, clamping and rounding.
        pub fn to_rgb8(self) -> Rgb<Byte> {
            let [r, g, b] = self.saturate().map(|c| (c * 255.0).round()).to_array();
            Rgb([r as Byte, g as Byte, b as Byte])
        }
    }

    impl From<[Channel; 3]> for Color {
        fn from(channels: [Channel; 3]) -> Self {
            Color::new(channels[0], channels[1], channels[2])
        }
    }

    impl From<Rgb<Channel>> for Color {
        fn from(sample: Rgb<Channel>) -> Self {
            Color::from(sample.0)
        }
    }

    impl From<Color> for Rgb<Channel> {
        fn from(color: Color) -> Self {
            Rgb(color.to_array())
        }
    }

    impl From<Rgb<Byte>> for Color {
        fn from(sample: Rgb<Byte>) -> Self {
            Color::new(
                sample.0[0] as Channel / 255.0,
                sample.0[1] as Channel / 255.0,
                sample.0[2] as Channel / 255.0,
            )
        }
    }

    impl From<Rgba<Byte>> for Color {
        fn from(sample: Rgba<Byte>) -> Self {
            // Alpha is ignored; output is always fully opaque.
            Color::from(Rgb([sample.0[0], sample.0[1], sample.0[2]]))
        }
    }

    impl Mul for Color {
        type Output = Color;
        fn mul(self, rhs: Color) -> Color {
            self.zip_map(rhs, |a, b| a * b)
        }
    }

    impl Mul<Channel> for Color {
        type Output = Color;
        fn mul(self, rhs: Channel) -> Color {
            self.map(|c| c * rhs)
        }
    }
}
