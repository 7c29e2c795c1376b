//! Frame processing loop.
//!
//! Capture, pose estimation, counting, annotation and emission run in
//! sequence on a single thread, one frame at a time, so frames are processed
//! and emitted in capture order.

pub mod error;
pub mod orchestrator;

pub use error::{ErrorReporter, FrameError, LogReporter};
pub use orchestrator::{Pipeline, PipelineConfig, RunSummary, StopReason};
