//! Default configuration constants for repcount.
//!
//! Shared between the config file, the CLI and the pipeline so the values
//! stay consistent.

/// Default capture width in pixels.
pub const FRAME_WIDTH: u32 = 640;

/// Default capture height in pixels.
pub const FRAME_HEIGHT: u32 = 480;

/// Default pause after each emitted record, in milliseconds.
///
/// Keeps the record stream at a rate a browser consumer can render.
pub const PACE_DELAY_MS: u64 = 50;

/// Default JPEG quality (1-100) for annotated frames.
pub const JPEG_QUALITY: u8 = 90;

/// Default minimum landmark visibility for a landmark to feed a metric.
///
/// 0.0 accepts every landmark the estimator reports.
pub const MIN_VISIBILITY: f32 = 0.0;

/// Default frame source: the first camera.
pub const DEFAULT_SOURCE: &str = "0";

/// Top-left corner of the repetition overlay, in pixels.
pub const OVERLAY_ORIGIN: (i32, i32) = (50, 50);

/// Pixel scale of the overlay bitmap font.
pub const OVERLAY_SCALE: i32 = 3;
