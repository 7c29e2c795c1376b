//! Camera and video capture through an `ffmpeg` child process.
//!
//! ffmpeg decodes and scales the input and writes raw `rgb24` frames of a
//! fixed size to its stdout, which is read synchronously one frame at a time.

use crate::capture::{CaptureSettings, FrameSource};
use crate::error::{RepcountError, Result};
use crate::frame::Frame;
use std::io::{ErrorKind, Read};
use std::process::{Child, ChildStdout, Command, Stdio};

/// Frame source backed by an ffmpeg decoder process.
pub struct FfmpegSource {
    label: String,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    settings: CaptureSettings,
    next_sequence: u64,
}

impl FfmpegSource {
    /// Opens `/dev/video<index>` through video4linux2.
    pub fn camera(index: u32, settings: CaptureSettings) -> Result<Self> {
        let device = format!("/dev/video{}", index);
        let cmd = build_command(&device, true, settings);
        Self::spawn(device, cmd, settings)
    }

    /// Opens a video file, device path or stream URL.
    pub fn file(path: &str, settings: CaptureSettings) -> Result<Self> {
        let is_v4l = path.starts_with("/dev/video");
        let cmd = build_command(path, is_v4l, settings);
        Self::spawn(path.to_string(), cmd, settings)
    }

    fn spawn(label: String, mut cmd: Command, settings: CaptureSettings) -> Result<Self> {
        if settings.width == 0 || settings.height == 0 {
            return Err(RepcountError::CaptureOpen {
                source_id: label,
                message: "frame size must be non-zero".to_string(),
            });
        }

        let mut child = cmd.spawn().map_err(|e| RepcountError::CaptureOpen {
            source_id: label.clone(),
            message: format!("cannot start ffmpeg: {}", e),
        })?;
        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(RepcountError::CaptureOpen {
                source_id: label,
                message: "failed to capture ffmpeg stdout".to_string(),
            });
        };

        tracing::info!(source = %label, width = settings.width, height = settings.height, "capture started");

        Ok(Self {
            label,
            child: Some(child),
            stdout: Some(stdout),
            settings,
            next_sequence: 0,
        })
    }
}

fn build_command(input: &str, is_v4l: bool, settings: CaptureSettings) -> Command {
    let scale_arg = format!("scale={}:{}", settings.width, settings.height);
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-hide_banner").arg("-loglevel").arg("error");

    if is_v4l {
        cmd.arg("-f").arg("video4linux2");
    }

    cmd.arg("-i")
        .arg(input)
        .arg("-an")
        .arg("-vf")
        .arg(&scale_arg)
        .arg("-pix_fmt")
        .arg("rgb24")
        .arg("-f")
        .arg("rawvideo")
        .arg("-");

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());
    cmd
}

impl FrameSource for FfmpegSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buffer = vec![0u8; Frame::byte_len(self.settings.width, self.settings.height)];
        match stdout.read_exact(&mut buffer) {
            Ok(()) => {}
            // ffmpeg exited: end of file, unplugged camera or unreadable input
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => {
                return Err(RepcountError::Capture {
                    message: format!("{}: {}", self.label, e),
                });
            }
        }

        let frame = Frame::new(
            buffer,
            self.settings.width,
            self.settings.height,
            self.next_sequence,
        )?;
        self.next_sequence += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            // Already-exited children make kill fail; wait reaps either way.
            let _ = child.kill();
            let _ = child.wait();
            tracing::info!(source = %self.label, frames = self.next_sequence, "capture released");
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        self.release();
    }
}
