// THEORY:
// Per-frame processing in `palm_vision` never fails: an empty frame, a frame with no
// skin, or a degenerate silhouette all come back as empty or zero-sized results.
// Only the *setup* paths can go wrong: fitting a model, calibrating, validating a
// config, sampling a patch, and talking to the background worker. Those paths share
// this one error type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot fit a gaussian to {size} sample(s); at least 2 are required")]
    DegeneratePopulation { size: usize },

    #[error("calibration needs at least 2 usable colors, got {usable} of {provided}")]
    InsufficientSamples { provided: usize, usable: usize },

    #[error("threshold {0} is outside [0, 1]")]
    InvalidThreshold(f32),

    #[error("hysteresis span {0} is negative")]
    InvalidHysteresisSpan(i32),

    #[error("hull merge distance {0} must be finite and non-negative")]
    InvalidMergeDistance(f64),

    #[error(
        "sample region {width}x{height} at ({x}, {y}) does not fit in a {frame_width}x{frame_height} frame"
    )]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("pipeline worker has shut down")]
    WorkerClosed,

    #[error("invalid pipeline config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
