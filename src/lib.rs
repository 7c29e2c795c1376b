//! repcount - Real-time exercise repetition counting
//!
//! Turns a stream of estimated body poses into repetition counts and
//! annotated JPEG frames, emitted as JSON lines on stdout.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod annotate;
pub mod capture;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
#[cfg(feature = "cli")]
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod exercise;
pub mod frame;
#[cfg(feature = "cli")]
pub mod output;
pub mod pipeline;
pub mod pose;
pub mod session;
pub mod telemetry;

// Composition root - needs everything
pub mod app;

// Core traits (source → estimate → sink)
pub use capture::{FrameSource, MockFrameSource, SourceSpec};
pub use emit::{CollectorSink, OutputRecord, RecordSink, StdoutSink};
pub use pose::{Landmark, LandmarkName, MockPoseEstimator, Pose, PoseEstimator};

// Counting
pub use exercise::{ExerciseKind, MetricExtractor};
pub use session::Session;

// Pipeline
pub use pipeline::{Pipeline, PipelineConfig, RunSummary, StopReason};

// Error handling
pub use error::{RepcountError, Result};

// Config
pub use config::Config;

pub use frame::Frame;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
