use thiserror::Error;

/// Errors that can occur during keyframe reduction.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReduceError {
    #[error("curve {curve} has {found} samples, expected {expected}")]
    DimensionMismatch {
        curve: usize,
        expected: usize,
        found: usize,
    },

    #[error("need at least 2 frames to reduce, got {0}")]
    InsufficientSamples(usize),

    #[error("cannot place {n_stops} keys on {n_frames} frames (valid range is 2..={n_frames})")]
    InvalidStopCount { n_stops: usize, n_frames: usize },

    #[error("frame index {index} out of range for {n_frames} frames")]
    InvalidFrameIndex { index: usize, n_frames: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("reduction cancelled")]
    Cancelled,

    #[error("curve store error: {0}")]
    Store(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReduceError>;
