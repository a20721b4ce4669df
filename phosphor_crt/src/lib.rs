// THEORY:
// This file is the main entry point for the `phosphor_crt` library crate. It exposes the
// CRT phosphor decay effect as a per-pixel pure function plus whole-frame conveniences.
//
// The primary goal is to export `PhosphorPipeline` and `ParameterSet` as the high-level
// interface. The individual stages live in `core_modules` and stay public so hosts that
// shade on their own (for example inside a GPU-side port) can call them directly.
//   - `pipeline`: sequential per-pixel and whole-frame evaluation.
//   - `parallel_pipeline`: row-band rendering on a tokio worker pool.
//   - `config`: TOML parameter files.
//   - `error`: the crate's error type.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use core_modules::color::color::Color;
pub use core_modules::fragment::{FrameContext, FrameCounter, Fragment};
pub use core_modules::parameters::{
    DecayMode, DitherMatrix, LcdSafeMethod, ParameterSet, Preset, ScanlineDirection,
};
pub use error::{PhosphorError, Result};
pub use parallel_pipeline::ParallelPipeline;
pub use pipeline::PhosphorPipeline;
