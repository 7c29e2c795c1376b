//! Repetition counting application entry point.
//!
//! Wires the configured frame source, pose estimator and stdout sink into
//! the pipeline and runs it until the input ends or Ctrl+C.

use crate::capture::{CaptureSettings, FrameSource, SourceSpec, open_source};
use crate::config::Config;
use crate::emit::StdoutSink;
use crate::error::{RepcountError, Result};
use crate::exercise::MetricExtractor;
use crate::pipeline::{Pipeline, PipelineConfig, RunSummary, StopReason};
use crate::pose::{NoPoseEstimator, PoseEstimator, ReplayEstimator, SidecarEstimator};
use crate::session::Session;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Command-line overrides applied on top of the configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub source: Option<String>,
    pub delay: Option<Duration>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub jpeg_quality: Option<u8>,
    pub estimator: Option<Vec<String>>,
    /// Replay landmarks from this file instead of running an estimator.
    pub landmarks: Option<PathBuf>,
    pub draw_landmarks: bool,
}

impl RunOptions {
    /// Apply the overrides to `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(source) = &self.source {
            config.capture.source = source.clone();
        }
        if let Some(delay) = self.delay {
            config.capture.delay_ms = delay.as_millis().try_into().unwrap_or(u64::MAX);
        }
        if let Some(width) = self.width {
            config.capture.width = width;
        }
        if let Some(height) = self.height {
            config.capture.height = height;
        }
        if let Some(quality) = self.jpeg_quality {
            config.output.jpeg_quality = quality;
        }
        if let Some(command) = &self.estimator {
            config.estimator.command = command.clone();
        }
        if self.draw_landmarks {
            config.output.draw_landmarks = true;
        }
    }
}

/// Pipeline settings derived from the configuration.
pub fn pipeline_config(config: &Config) -> PipelineConfig {
    PipelineConfig {
        delay: config.capture.delay(),
        jpeg_quality: config.output.jpeg_quality,
        draw_landmarks: config.output.draw_landmarks,
    }
}

/// Create the pose estimator: recorded landmarks, the configured helper
/// process, or none (every frame without pose).
pub fn create_estimator(
    config: &Config,
    landmarks: Option<&Path>,
) -> Result<Box<dyn PoseEstimator>> {
    if let Some(path) = landmarks {
        tracing::info!(path = %path.display(), "replaying recorded landmarks");
        return Ok(Box::new(ReplayEstimator::open(path)?));
    }
    if config.estimator.command.is_empty() {
        tracing::warn!("no pose estimator configured, repetitions will not be counted");
        return Ok(Box::new(NoPoseEstimator));
    }
    Ok(Box::new(SidecarEstimator::spawn(&config.estimator.command)?))
}

/// Run the count command: capture → estimate → count → annotate → emit.
///
/// # Returns
/// The run summary. A source that cannot be opened ends the run with
/// [`StopReason::CaptureFailed`] rather than an error.
pub async fn run_count_command(
    mut config: Config,
    exercise: &str,
    options: RunOptions,
) -> Result<RunSummary> {
    options.apply(&mut config);
    config.validate()?;

    let mut session = Session::new(
        exercise,
        MetricExtractor::new(config.estimator.min_visibility),
    );

    // Estimator problems are startup errors; capture problems are not.
    let mut estimator = create_estimator(&config, options.landmarks.as_deref())?;

    let spec = SourceSpec::parse(&config.capture.source);
    let settings = CaptureSettings {
        width: config.capture.width,
        height: config.capture.height,
    };
    let mut source: Box<dyn FrameSource> = match open_source(&spec, settings) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("{}", e);
            return Ok(RunSummary::new(StopReason::CaptureFailed));
        }
    };

    let pipeline = Pipeline::new(pipeline_config(&config));
    let running = pipeline.running_flag();

    let mut task = tokio::task::spawn_blocking(move || {
        let mut sink = StdoutSink::new();
        pipeline.run(source.as_mut(), estimator.as_mut(), &mut sink, &mut session)
    });

    let joined = tokio::select! {
        joined = &mut task => joined,
        signal = tokio::signal::ctrl_c() => {
            stop_on_signal(signal, &running);
            task.await
        }
    };

    joined.map_err(|e| RepcountError::Other(format!("pipeline task failed: {}", e)))?
}

/// Lowers the running flag for a delivered Ctrl+C. A handler that could not
/// be installed leaves the run going.
fn stop_on_signal(signal: std::io::Result<()>, running: &AtomicBool) {
    match signal {
        Ok(()) => {
            tracing::info!("interrupted, stopping after the current frame");
            running.store(false, Ordering::SeqCst);
        }
        Err(e) => tracing::warn!("Ctrl+C handling unavailable, running to completion: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_override_config() {
        let mut config = Config::default();
        let options = RunOptions {
            source: Some("clip.mp4".to_string()),
            delay: Some(Duration::from_millis(100)),
            width: Some(320),
            height: Some(240),
            jpeg_quality: Some(60),
            estimator: Some(vec!["helper".to_string()]),
            landmarks: None,
            draw_landmarks: true,
        };

        options.apply(&mut config);

        assert_eq!(config.capture.source, "clip.mp4");
        assert_eq!(config.capture.delay_ms, 100);
        assert_eq!(config.capture.width, 320);
        assert_eq!(config.capture.height, 240);
        assert_eq!(config.output.jpeg_quality, 60);
        assert_eq!(config.estimator.command, vec!["helper"]);
        assert!(config.output.draw_landmarks);
    }

    #[test]
    fn empty_options_keep_config() {
        let mut config = Config::default();
        config.output.draw_landmarks = true;
        let before = config.clone();

        RunOptions::default().apply(&mut config);

        assert_eq!(config, before);
    }

    #[test]
    fn pipeline_config_follows_config() {
        let mut config = Config::default();
        config.capture.delay_ms = 0;
        config.output.jpeg_quality = 40;

        let pipeline = pipeline_config(&config);
        assert_eq!(pipeline.delay, Duration::ZERO);
        assert_eq!(pipeline.jpeg_quality, 40);
        assert!(!pipeline.draw_landmarks);
    }

    #[test]
    fn delivered_signal_stops_the_run() {
        let running = AtomicBool::new(true);
        stop_on_signal(Ok(()), &running);
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn failed_signal_handler_keeps_running() {
        let running = AtomicBool::new(true);
        stop_on_signal(
            Err(std::io::Error::other("signal handler unavailable")),
            &running,
        );
        assert!(running.load(Ordering::SeqCst));
    }

    #[test]
    fn no_estimator_configured_uses_no_pose() {
        let estimator = create_estimator(&Config::default(), None).unwrap();
        assert_eq!(estimator.name(), "none");
    }

    #[test]
    fn missing_landmark_file_is_startup_error() {
        let result = create_estimator(
            &Config::default(),
            Some(Path::new("/tmp/nonexistent_repcount_poses.jsonl")),
        );
        assert!(matches!(result, Err(RepcountError::EstimatorSpawn { .. })));
    }

    #[test]
    fn missing_estimator_program_is_startup_error() {
        let mut config = Config::default();
        config.estimator.command = vec!["nonexistent_pose_helper_12345".to_string()];
        assert!(matches!(
            create_estimator(&config, None),
            Err(RepcountError::EstimatorSpawn { .. })
        ));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_running() {
        let options = RunOptions {
            width: Some(0),
            ..RunOptions::default()
        };
        let result = run_count_command(Config::default(), "Squats", options).await;
        assert!(matches!(
            result,
            Err(RepcountError::ConfigInvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn empty_image_directory_runs_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions {
            source: Some(dir.path().to_string_lossy().to_string()),
            delay: Some(Duration::ZERO),
            ..RunOptions::default()
        };

        let summary = run_count_command(Config::default(), "Squats", options)
            .await
            .unwrap();

        assert_eq!(summary.stop_reason, StopReason::SourceExhausted);
        assert_eq!(summary.frames_read, 0);
        assert_eq!(summary.repetitions, 0);
    }
}
