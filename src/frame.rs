//! Raw video frame passed between pipeline stages.

use crate::error::{RepcountError, Result};

/// Packed RGB8 frame captured from a frame source.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Row-major RGB bytes, `width * height * 3` long.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Position of the frame in the source, starting at 0.
    pub sequence: u64,
}

impl Frame {
    /// Creates a frame, checking that the buffer matches the dimensions.
    pub fn new(data: Vec<u8>, width: u32, height: u32, sequence: u64) -> Result<Self> {
        let expected = Self::byte_len(width, height);
        if data.len() != expected {
            return Err(RepcountError::FrameSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            sequence,
        })
    }

    /// Creates a uniformly coloured frame.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3], sequence: u64) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self {
            data,
            width,
            height,
            sequence,
        }
    }

    /// Number of bytes an RGB8 frame of the given size occupies.
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_matching_buffer() {
        let frame = Frame::new(vec![0; 2 * 3 * 3], 2, 3, 7).unwrap();
        assert_eq!(frame.width, 2);
        assert_eq!(frame.height, 3);
        assert_eq!(frame.sequence, 7);
    }

    #[test]
    fn new_rejects_short_buffer() {
        match Frame::new(vec![0; 5], 2, 2, 0) {
            Err(RepcountError::FrameSize { expected, actual }) => {
                assert_eq!(expected, 12);
                assert_eq!(actual, 5);
            }
            other => panic!("Expected FrameSize error, got {:?}", other),
        }
    }

    #[test]
    fn filled_repeats_colour() {
        let frame = Frame::filled(2, 2, [1, 2, 3], 0);
        assert_eq!(frame.data, vec![1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3]);
    }
}
