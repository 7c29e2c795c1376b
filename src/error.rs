//! Error types for repcount.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepcountError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Frame capture errors
    #[error("Failed to open frame source {source_id}: {message}")]
    CaptureOpen { source_id: String, message: String },

    #[error("Frame capture failed: {message}")]
    Capture { message: String },

    // Pose estimation errors
    #[error("Pose estimator could not be started: {message}")]
    EstimatorSpawn { message: String },

    #[error("Pose estimator protocol error: {message}")]
    EstimatorProtocol { message: String },

    // Output errors
    #[error("Frame encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Invalid frame buffer: expected {expected} bytes, got {actual}")]
    FrameSize { expected: usize, actual: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl RepcountError {
    /// Whether the error means the output consumer went away.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, RepcountError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe)
    }
}

pub type Result<T> = std::result::Result<T, RepcountError>;
