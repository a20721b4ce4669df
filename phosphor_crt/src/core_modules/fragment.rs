// THEORY:
// A `Fragment` is the positional half of a single pipeline invocation: which pixel is
// being evaluated, both as an integer grid position (for dithering and scanline
// alignment) and as a normalized texture coordinate (for raster sweep and split-screen).
// `FrameContext` is the temporal half: the host-owned frame counter and the output
// resolution, both read-only for the duration of a frame.
//
// Neither type owns anything. They exist so the stages can take exactly the inputs they
// need without reaching into a host buffer.

/// Host-incremented counter of presented frames.
pub type FrameCounter = u64;

/// The position of one pixel evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    /// Integer column.
    pub x: u32,
    /// Integer row.
    pub y: u32,
    /// Normalized horizontal coordinate in [0, 1].
    pub u: f32,
    /// Normalized vertical coordinate in [0, 1].
    pub v: f32,
}

impl Fragment {
    /// Builds a fragment at the center of pixel (x, y) in a `width` x `height` frame.
    pub fn at_pixel(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            u: (x as f32 + 0.5) / width.max(1) as f32,
            v: (y as f32 + 0.5) / height.max(1) as f32,
        }
    }
}

/// Per-frame, read-only inputs shared by every fragment of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub frame_counter: FrameCounter,
    pub width: u32,
    pub height: u32,
}

impl FrameContext {
    pub fn new(frame_counter: FrameCounter, width: u32, height: u32) -> Self {
        Self {
            frame_counter,
            width,
            height,
        }
    }
}
