//! Error classification and reporting for pipeline stages.

use std::fmt;

/// Errors raised while processing one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The frame is degraded or skipped; the loop continues.
    Recoverable(String),
    /// The loop stops.
    Fatal(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Recoverable(msg) => write!(f, "Recoverable error: {}", msg),
            FrameError::Fatal(msg) => write!(f, "Fatal error: {}", msg),
        }
    }
}

impl std::error::Error for FrameError {}

/// Trait for reporting pipeline errors.
pub trait ErrorReporter: Send + Sync {
    /// Reports an error raised by `stage` ("capture", "estimator", ...).
    fn report(&self, stage: &str, error: &FrameError);
}

/// Reporter that forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, stage: &str, error: &FrameError) {
        match error {
            FrameError::Recoverable(msg) => tracing::warn!(stage, "{}", msg),
            FrameError::Fatal(msg) => tracing::error!(stage, "{}", msg),
        }
    }
}
