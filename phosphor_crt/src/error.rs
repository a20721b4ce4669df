// THEORY:
// The per-pixel stages are total functions and never fail. Errors only exist at the
// edges of the crate, where it touches files, host buffers or worker tasks, and they are
// all collected into `PhosphorError`.

use thiserror::Error;

/// Errors from configuration, buffer handling and the worker pool.
#[derive(Error, Debug)]
pub enum PhosphorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse parameter file: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Failed to serialize parameters: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Frame buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
    #[error("Worker pool failure: {0}")]
    WorkerPool(String),
}

pub type Result<T> = std::result::Result<T, PhosphorError>;
