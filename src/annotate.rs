//! Frame annotation: repetition overlay, optional skeleton, JPEG encoding.

use crate::defaults;
use crate::error::{RepcountError, Result};
use crate::frame::Frame;
use crate::pose::{Pose, SKELETON_EDGES};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

/// Overlay text colour.
pub const OVERLAY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const SKELETON_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const JOINT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

const GLYPH_WIDTH: i32 = 5;
const GLYPH_HEIGHT: i32 = 7;
const GLYPH_ADVANCE: i32 = GLYPH_WIDTH + 1;
const JOINT_RADIUS: i32 = 3;

/// Overlay text for a repetition count.
pub fn overlay_text(repetitions: u64) -> String {
    format!("Reps: {}", repetitions)
}

/// Converts the frame to an image with the count overlay drawn on it.
///
/// With `draw_landmarks`, the pose skeleton is drawn under the text.
/// Landmark coordinates are normalised to the frame size.
pub fn annotate(
    frame: Frame,
    repetitions: u64,
    pose: Option<&Pose>,
    draw_landmarks: bool,
) -> Result<RgbImage> {
    let expected = Frame::byte_len(frame.width, frame.height);
    let actual = frame.data.len();
    let mut image = RgbImage::from_raw(frame.width, frame.height, frame.data)
        .ok_or(RepcountError::FrameSize { expected, actual })?;

    if draw_landmarks && let Some(pose) = pose {
        draw_skeleton(&mut image, pose);
    }

    let (x, y) = defaults::OVERLAY_ORIGIN;
    draw_text(
        &mut image,
        x,
        y,
        &overlay_text(repetitions),
        defaults::OVERLAY_SCALE,
        OVERLAY_COLOR,
    );
    Ok(image)
}

/// Encodes an image as baseline JPEG. `quality` is clamped to 1..=100.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100)).encode_image(image)?;
    Ok(buffer)
}

fn put_pixel(image: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y))
        && x < image.width()
        && y < image.height()
    {
        image.put_pixel(x, y, color);
    }
}

fn fill_rect(image: &mut RgbImage, left: i32, top: i32, size: i32, color: Rgb<u8>) {
    for dy in 0..size {
        for dx in 0..size {
            put_pixel(image, i64::from(left + dx), i64::from(top + dy), color);
        }
    }
}

/// Draws `text` with the built-in bitmap font, each font pixel `scale` wide.
/// Characters without a glyph advance the cursor and draw nothing.
pub fn draw_text(image: &mut RgbImage, x: i32, y: i32, text: &str, scale: i32, color: Rgb<u8>) {
    let scale = scale.max(1);
    let mut cursor = x;
    for ch in text.chars().flat_map(char::to_uppercase) {
        if let Some(rows) = glyph(ch) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                        fill_rect(
                            image,
                            cursor + col * scale,
                            y + row as i32 * scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
        cursor += GLYPH_ADVANCE * scale;
    }
}

fn glyph(ch: char) -> Option<[u8; GLYPH_HEIGHT as usize]> {
    let rows = match ch {
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        ' ' => [0; 7],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        _ => return None,
    };
    Some(rows)
}

fn to_pixel(image: &RgbImage, x: f64, y: f64) -> (f64, f64) {
    (
        x * f64::from(image.width()),
        y * f64::from(image.height()),
    )
}

fn draw_skeleton(image: &mut RgbImage, pose: &Pose) {
    let right = f64::from(image.width()) - 1.0;
    let bottom = f64::from(image.height()) - 1.0;
    for (from, to) in SKELETON_EDGES {
        if let (Some(a), Some(b)) = (pose.get(from), pose.get(to))
            && let Some((start, end)) = clip_segment(
                to_pixel(image, a.x, a.y),
                to_pixel(image, b.x, b.y),
                right,
                bottom,
            )
        {
            draw_line(image, round(start), round(end), SKELETON_COLOR);
        }
    }

    let reach = f64::from(JOINT_RADIUS);
    for (_, landmark) in pose.iter() {
        let (cx, cy) = to_pixel(image, landmark.x, landmark.y);
        // Joints whose square cannot touch the image are skipped.
        if !(-reach..=right + reach).contains(&cx) || !(-reach..=bottom + reach).contains(&cy) {
            continue;
        }
        let (cx, cy) = (cx.round() as i32, cy.round() as i32);
        fill_rect(
            image,
            cx - JOINT_RADIUS,
            cy - JOINT_RADIUS,
            JOINT_RADIUS * 2 + 1,
            JOINT_COLOR,
        );
    }
}

fn round((x, y): (f64, f64)) -> (i64, i64) {
    (x.round() as i64, y.round() as i64)
}

/// Liang-Barsky clip of the segment `a`-`b` to `[0, right] x [0, bottom]`.
///
/// Returns `None` when the segment misses the rectangle or is not finite.
fn clip_segment(
    (x0, y0): (f64, f64),
    (x1, y1): (f64, f64),
    right: f64,
    bottom: f64,
) -> Option<((f64, f64), (f64, f64))> {
    if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) || right < 0.0 || bottom < 0.0 {
        return None;
    }
    let (dx, dy) = (x1 - x0, y1 - y0);
    let (mut enter, mut exit) = (0.0_f64, 1.0_f64);
    for (p, q) in [(-dx, x0), (dx, right - x0), (-dy, y0), (dy, bottom - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            enter = enter.max(t);
        } else {
            exit = exit.min(t);
        }
        if enter > exit {
            return None;
        }
    }
    Some((
        (x0 + enter * dx, y0 + enter * dy),
        (x0 + exit * dx, y0 + exit * dy),
    ))
}

// Bresenham over clipped endpoints.
fn draw_line(image: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y) = (x0, y0);
    let mut err = dx + dy;
    loop {
        put_pixel(image, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
