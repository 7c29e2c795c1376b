//! Frame loop that runs from startup until the source ends or a stop is requested.

use crate::annotate::{annotate, encode_jpeg};
use crate::capture::FrameSource;
use crate::defaults;
use crate::emit::{OutputRecord, RecordSink};
use crate::error::Result;
use crate::exercise::Transition;
use crate::frame::Frame;
use crate::pipeline::error::{ErrorReporter, FrameError, LogReporter};
use crate::pose::{Pose, PoseEstimator};
use crate::session::Session;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Consecutive estimator failures reported before further ones are muted.
const ESTIMATOR_ERROR_REPORT_LIMIT: u32 = 5;

/// Configuration for the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Pause after each emitted record
    pub delay: Duration,
    /// JPEG quality of emitted frames (1-100)
    pub jpeg_quality: u8,
    /// Draw the estimated skeleton under the count overlay
    pub draw_landmarks: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(defaults::PACE_DELAY_MS),
            jpeg_quality: defaults::JPEG_QUALITY,
            draw_landmarks: false,
        }
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source has no more frames.
    SourceExhausted,
    /// The source failed; treated as the end of input.
    CaptureFailed,
    /// The stop flag was raised.
    Stopped,
    /// The record consumer went away (broken pipe).
    OutputClosed,
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_read: u64,
    pub frames_emitted: u64,
    pub frames_without_pose: u64,
    /// Frames read but not emitted because annotation or encoding failed.
    pub frames_skipped: u64,
    pub repetitions: u64,
    pub stop_reason: StopReason,
}

impl RunSummary {
    /// A summary with every counter at zero.
    pub fn new(stop_reason: StopReason) -> Self {
        Self {
            frames_read: 0,
            frames_emitted: 0,
            frames_without_pose: 0,
            frames_skipped: 0,
            repetitions: 0,
            stop_reason,
        }
    }
}

/// Single-threaded frame loop.
pub struct Pipeline {
    config: PipelineConfig,
    error_reporter: Arc<dyn ErrorReporter>,
    running: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            error_reporter: Arc::new(LogReporter),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// Flag checked before every frame. Storing `false` stops the loop
    /// after the frame in progress.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Processes frames until the source ends, the consumer disconnects, or
    /// the running flag is cleared.
    ///
    /// The source is released and the sink finished on every exit path. Only
    /// sink failures other than a closed pipe are returned as errors.
    pub fn run(
        &self,
        source: &mut dyn FrameSource,
        estimator: &mut dyn PoseEstimator,
        sink: &mut dyn RecordSink,
        session: &mut Session,
    ) -> Result<RunSummary> {
        tracing::info!(
            source = source.name(),
            estimator = estimator.name(),
            sink = sink.name(),
            exercise = session.requested(),
            "pipeline started"
        );

        let outcome = self.drive(source, estimator, sink, session);
        source.release();

        if let Err(e) = sink.finish()
            && !e.is_broken_pipe()
        {
            tracing::warn!(sink = sink.name(), "sink finish failed: {}", e);
        }

        let mut summary = outcome?;
        summary.repetitions = session.repetition_count();

        tracing::info!(
            frames = summary.frames_read,
            emitted = summary.frames_emitted,
            without_pose = summary.frames_without_pose,
            skipped = summary.frames_skipped,
            repetitions = summary.repetitions,
            reason = ?summary.stop_reason,
            "pipeline finished"
        );
        Ok(summary)
    }

    fn drive(
        &self,
        source: &mut dyn FrameSource,
        estimator: &mut dyn PoseEstimator,
        sink: &mut dyn RecordSink,
        session: &mut Session,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::new(StopReason::SourceExhausted);
        let mut estimator_failures: u32 = 0;

        loop {
            if !self.running.load(Ordering::SeqCst) {
                summary.stop_reason = StopReason::Stopped;
                break;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    summary.stop_reason = StopReason::SourceExhausted;
                    break;
                }
                Err(e) => {
                    self.error_reporter
                        .report("capture", &FrameError::Fatal(e.to_string()));
                    summary.stop_reason = StopReason::CaptureFailed;
                    break;
                }
            };
            summary.frames_read += 1;

            let pose = match estimator.estimate(&frame) {
                Ok(pose) => {
                    estimator_failures = 0;
                    pose
                }
                Err(e) => {
                    estimator_failures += 1;
                    if estimator_failures <= ESTIMATOR_ERROR_REPORT_LIMIT {
                        self.error_reporter.report(
                            "estimator",
                            &FrameError::Recoverable(format!("frame {}: {}", frame.sequence, e)),
                        );
                    }
                    if estimator_failures == ESTIMATOR_ERROR_REPORT_LIMIT {
                        tracing::warn!("pose estimator keeps failing, muting further errors");
                    }
                    None
                }
            };
            if pose.is_none() {
                summary.frames_without_pose += 1;
            }

            let sequence = frame.sequence;
            let observation = session.observe(pose.as_ref());
            match observation.transition {
                Transition::Activated => tracing::debug!(frame = sequence, "repetition started"),
                Transition::Completed { repetitions } => {
                    tracing::info!(frame = sequence, repetitions, "repetition completed")
                }
                Transition::None => {}
            }
            tracing::trace!(frame = sequence, metric = ?observation.metric, "frame observed");

            let record = match self.render(frame, session.repetition_count(), pose.as_ref()) {
                Ok(record) => record,
                Err(e) => {
                    self.error_reporter.report(
                        "annotate",
                        &FrameError::Recoverable(format!("frame {}: {}", sequence, e)),
                    );
                    summary.frames_skipped += 1;
                    continue;
                }
            };

            match sink.handle(&record) {
                Ok(()) => summary.frames_emitted += 1,
                Err(e) if e.is_broken_pipe() => {
                    tracing::info!("output consumer disconnected");
                    summary.stop_reason = StopReason::OutputClosed;
                    break;
                }
                Err(e) => {
                    self.error_reporter
                        .report(sink.name(), &FrameError::Fatal(e.to_string()));
                    return Err(e);
                }
            }

            if !self.config.delay.is_zero() {
                std::thread::sleep(self.config.delay);
            }
        }

        Ok(summary)
    }

    fn render(&self, frame: Frame, repetitions: u64, pose: Option<&Pose>) -> Result<OutputRecord> {
        let image = annotate(frame, repetitions, pose, self.config.draw_landmarks)?;
        let jpeg = encode_jpeg(&image, self.config.jpeg_quality)?;
        Ok(OutputRecord::new(repetitions, &jpeg))
    }
}
