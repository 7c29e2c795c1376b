//! Pose estimation through an external helper process.
//!
//! The helper (typically a small MediaPipe script) is started once and kept
//! alive for the whole session. For every frame it receives a JSON header
//! line followed by the raw RGB bytes on stdin:
//!
//! ```text
//! {"width":640,"height":480,"sequence":12,"format":"rgb24"}\n
//! <width * height * 3 bytes>
//! ```
//!
//! and answers with exactly one [`PoseMessage`] line on stdout.

use crate::error::{RepcountError, Result};
use crate::frame::Frame;
use crate::pose::Pose;
use crate::pose::estimator::PoseEstimator;
use crate::pose::protocol::PoseMessage;
use serde::Serialize;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

#[derive(Serialize)]
struct FrameHeader {
    width: u32,
    height: u32,
    sequence: u64,
    format: &'static str,
}

/// Pose estimator backed by a long-running helper process.
pub struct SidecarEstimator {
    name: String,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    line: String,
}

impl SidecarEstimator {
    /// Starts the helper. `command[0]` is the program, the rest its arguments.
    pub fn spawn(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| RepcountError::EstimatorSpawn {
                message: "empty estimator command".to_string(),
            })?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| RepcountError::EstimatorSpawn {
                message: format!("{}: {}", program, e),
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            // Kill errors are irrelevant: the process is unusable either way
            let _ = child.kill();
            let _ = child.wait();
            return Err(RepcountError::EstimatorSpawn {
                message: format!("{}: failed to capture stdio", program),
            });
        };

        tracing::info!(estimator = %program, "pose estimator started");

        Ok(Self {
            name: program.clone(),
            child,
            stdin,
            stdout: BufReader::new(stdout),
            line: String::new(),
        })
    }

    fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        let header = FrameHeader {
            width: frame.width,
            height: frame.height,
            sequence: frame.sequence,
            format: "rgb24",
        };
        serde_json::to_writer(&mut self.stdin, &header)?;
        self.stdin.write_all(b"\n")?;
        self.stdin.write_all(&frame.data)?;
        self.stdin.flush()?;
        Ok(())
    }
}

impl PoseEstimator for SidecarEstimator {
    fn estimate(&mut self, frame: &Frame) -> Result<Option<Pose>> {
        self.send_frame(frame)?;

        self.line.clear();
        let read = self.stdout.read_line(&mut self.line)?;
        if read == 0 {
            return Err(RepcountError::EstimatorProtocol {
                message: format!("{} closed its output", self.name),
            });
        }

        PoseMessage::from_json(self.line.trim_end())
            .map_err(|e| RepcountError::EstimatorProtocol {
                message: format!("frame {}: {}", frame.sequence, e),
            })?
            .into_pose()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for SidecarEstimator {
    fn drop(&mut self) {
        // The helper may already have exited; either way it must not outlive us.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
