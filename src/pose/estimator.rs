use crate::error::{RepcountError, Result};
use crate::frame::Frame;
use crate::pose::Pose;
use crate::pose::protocol::PoseMessage;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Trait for pose estimation backends.
///
/// This trait allows swapping implementations (external estimator process,
/// recorded landmarks, mock).
pub trait PoseEstimator: Send {
    /// Estimate the pose of the single subject in `frame`.
    ///
    /// # Returns
    /// `Ok(Some(pose))` when a subject was found, `Ok(None)` when not,
    /// or an error when the estimator itself failed.
    fn estimate(&mut self, frame: &Frame) -> Result<Option<Pose>>;

    /// Name for logging.
    fn name(&self) -> &str;
}

/// Replays pose messages recorded in a JSON-lines file, one line per frame.
///
/// Blank lines and the end of the file count as "no pose".
pub struct ReplayEstimator {
    lines: std::io::Lines<BufReader<File>>,
    line_number: usize,
    exhausted: bool,
}

impl ReplayEstimator {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| RepcountError::EstimatorSpawn {
            message: format!("cannot open landmark file {}: {}", path.display(), e),
        })?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_number: 0,
            exhausted: false,
        })
    }
}

impl PoseEstimator for ReplayEstimator {
    fn estimate(&mut self, _frame: &Frame) -> Result<Option<Pose>> {
        if self.exhausted {
            return Ok(None);
        }
        let Some(line) = self.lines.next() else {
            self.exhausted = true;
            return Ok(None);
        };
        self.line_number += 1;
        let line = line?;
        if line.trim().is_empty() {
            return Ok(None);
        }
        PoseMessage::from_json(&line)
            .map_err(|e| RepcountError::EstimatorProtocol {
                message: format!("line {}: {}", self.line_number, e),
            })?
            .into_pose()
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Estimator used when none is configured: no frame ever carries a pose.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPoseEstimator;

impl PoseEstimator for NoPoseEstimator {
    fn estimate(&mut self, _frame: &Frame) -> Result<Option<Pose>> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Mock pose estimator for testing.
///
/// Returns the scripted poses in order, then "no pose" forever.
#[derive(Debug, Clone, Default)]
pub struct MockPoseEstimator {
    script: VecDeque<Option<Pose>>,
    fail_on_calls: Vec<usize>,
    calls: usize,
}

impl MockPoseEstimator {
    pub fn new(script: Vec<Option<Pose>>) -> Self {
        Self {
            script: script.into(),
            fail_on_calls: Vec::new(),
            calls: 0,
        }
    }

    /// Configure the mock to fail on the given call (0-based).
    /// May be chained to fail on several calls.
    pub fn with_failure_on_call(mut self, call: usize) -> Self {
        self.fail_on_calls.push(call);
        self
    }

    /// Fail on every call in `calls`.
    pub fn with_failures_on_calls(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.fail_on_calls.extend(calls);
        self
    }

    /// Number of frames the mock has been asked about.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl PoseEstimator for MockPoseEstimator {
    fn estimate(&mut self, _frame: &Frame) -> Result<Option<Pose>> {
        let call = self.calls;
        self.calls += 1;
        let next = self.script.pop_front().flatten();
        if self.fail_on_calls.contains(&call) {
            return Err(RepcountError::EstimatorProtocol {
                message: "mock estimator failure".to_string(),
            });
        }
        Ok(next)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
