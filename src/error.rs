//! Error types for the face glow mesh sketch.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// `ONNX` Runtime inference failed
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::OrtError),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model loading or inference error
    #[error("Model error: {0}")]
    ModelError(String),

    /// Model output processing error
    #[error("Model output error: {0}")]
    ModelOutputError(String),

    /// A single detection attempt failed; the detection loop keeps running
    #[error("Detector error: {0}")]
    DetectorError(String),

    /// Interpolation state and live keypoints disagree in length
    #[error("Keypoint count mismatch: expected {expected}, got {actual}")]
    DataShapeMismatch {
        /// Length of the sequence the animator holds
        expected: usize,
        /// Length of the sequence it was combined with
        actual: usize,
    },

    /// The background detection thread is no longer accepting frames
    #[error("Detection worker stopped")]
    WorkerStopped,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
