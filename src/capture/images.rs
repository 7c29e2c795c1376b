//! Frame source reading a directory of still images.

use crate::capture::FrameSource;
use crate::error::{RepcountError, Result};
use crate::frame::Frame;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Reads every PNG/JPEG file in a directory, sorted by file name.
pub struct ImageSequenceSource {
    label: String,
    paths: std::vec::IntoIter<PathBuf>,
    next_sequence: u64,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| RepcountError::CaptureOpen {
            source_id: dir.display().to_string(),
            message: e.to_string(),
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_image(path))
            .collect();
        paths.sort();

        tracing::info!(source = %dir.display(), images = paths.len(), "image sequence opened");

        Ok(Self {
            label: dir.display().to_string(),
            paths: paths.into_iter(),
            next_sequence: 0,
        })
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.paths.next() else {
            return Ok(None);
        };
        let image = image::open(&path)
            .map_err(|e| RepcountError::Capture {
                message: format!("{}: {}", path.display(), e),
            })?
            .to_rgb8();
        let (width, height) = image.dimensions();
        let frame = Frame::new(image.into_raw(), width, height, self.next_sequence)?;
        self.next_sequence += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        self.paths = Vec::new().into_iter();
    }

    fn name(&self) -> &str {
        &self.label
    }
}
