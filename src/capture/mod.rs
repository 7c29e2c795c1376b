//! Frame sources: camera, video file, or a directory of still images.

pub mod ffmpeg;
pub mod images;

pub use ffmpeg::FfmpegSource;
pub use images::ImageSequenceSource;

use crate::error::{RepcountError, Result};
use crate::frame::Frame;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Trait for frame source devices.
///
/// This trait allows swapping implementations (real capture vs mock).
pub trait FrameSource: Send {
    /// Read the next frame.
    ///
    /// # Returns
    /// `Ok(Some(frame))` for a new frame, `Ok(None)` when the source is
    /// exhausted, or an error when capture failed.
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Release the underlying capture resource. Must be idempotent.
    fn release(&mut self);

    /// Name for logging.
    fn name(&self) -> &str;
}

/// Where frames come from, parsed from the user's source identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Camera by index (`0` → `/dev/video0`).
    Camera(u32),
    /// Video file, device path or stream URL decoded by ffmpeg.
    File(String),
    /// Directory of still images, read in file-name order.
    ImageDir(PathBuf),
}

impl SourceSpec {
    /// `"2"` and `"/dev/video2"` are cameras, existing directories are image
    /// sequences, anything else goes to ffmpeg as-is.
    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        if let Some(index) = parse_device_index(id) {
            return SourceSpec::Camera(index);
        }
        let path = Path::new(id);
        if path.is_dir() {
            return SourceSpec::ImageDir(path.to_path_buf());
        }
        SourceSpec::File(id.to_string())
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Camera(index) => write!(f, "camera {}", index),
            SourceSpec::File(path) => write!(f, "{}", path),
            SourceSpec::ImageDir(dir) => write!(f, "{}", dir.display()),
        }
    }
}

fn parse_device_index(id: &str) -> Option<u32> {
    let digits = id.strip_prefix("/dev/video").unwrap_or(id);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Capture settings shared by all sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    pub width: u32,
    pub height: u32,
}

/// Opens the source described by `spec`.
pub fn open_source(spec: &SourceSpec, settings: CaptureSettings) -> Result<Box<dyn FrameSource>> {
    let source: Box<dyn FrameSource> = match spec {
        SourceSpec::Camera(index) => Box::new(FfmpegSource::camera(*index, settings)?),
        SourceSpec::File(path) => Box::new(FfmpegSource::file(path, settings)?),
        SourceSpec::ImageDir(dir) => Box::new(ImageSequenceSource::open(dir)?),
    };
    Ok(source)
}

/// Mock frame source for testing.
///
/// Yields `count` uniformly coloured frames, then reports exhaustion.
#[derive(Debug, Clone)]
pub struct MockFrameSource {
    width: u32,
    height: u32,
    remaining: u64,
    next_sequence: u64,
    fail_at: Option<u64>,
    released: Arc<AtomicBool>,
}

impl MockFrameSource {
    pub fn new(count: u64) -> Self {
        Self {
            width: 8,
            height: 8,
            remaining: count,
            next_sequence: 0,
            fail_at: None,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Configure the frame size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Configure the mock to fail when asked for the given frame (0-based).
    pub fn with_failure_at(mut self, sequence: u64) -> Self {
        self.fail_at = Some(sequence);
        self
    }

    /// Shared flag set once the source has been released.
    pub fn released_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl FrameSource for MockFrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.released.load(Ordering::SeqCst) {
            return Ok(None);
        }
        if self.fail_at == Some(self.next_sequence) {
            return Err(RepcountError::Capture {
                message: "mock capture failure".to_string(),
            });
        }
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let frame = Frame::filled(self.width, self.height, [32, 32, 32], self.next_sequence);
        self.next_sequence += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "mock"
    }
}
