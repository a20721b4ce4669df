pub mod beam_response;
pub mod color;
pub mod compositor;
pub mod dither;
pub mod fragment;
pub mod frame_timing;
pub mod parameters;
pub mod phosphor_decay;
pub mod preset;
pub mod scanline;
pub mod tone;
