//! 128×128 RGB565 frame buffer.
//!
//! The single source of truth for decoded image content. Storage is
//! row-major with row 0 holding the bottom scan line: a pixel write at
//! display coordinate (x, y) lands in buffer row `127 - y`. The vertical
//! flip is part of the external contract inherited from the controller RAM
//! layout.

use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};
use serde::{Deserialize, Serialize};

/// Fixed 128×128 grid of packed 5-6-5 pixels. Never resized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameBuffer {
    pixels: Vec<u16>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer { pixels: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT] }
    }

    /// Write a pixel at display coordinate (x, y). Callers must have
    /// range-checked x and y against the 128×128 grid.
    pub fn set(&mut self, x: usize, y: usize, color: u16) {
        self.pixels[(SCREEN_HEIGHT - 1 - y) * SCREEN_WIDTH + x] = color;
    }

    /// Read back the pixel at display coordinate (x, y).
    pub fn get(&self, x: usize, y: usize) -> u16 {
        self.pixels[(SCREEN_HEIGHT - 1 - y) * SCREEN_WIDTH + x]
    }

    /// Number of stored pixels (always 128×128 for a well-formed buffer).
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// One raw buffer row; row 0 is the bottom scan line.
    pub fn row(&self, r: usize) -> &[u16] {
        &self.pixels[r * SCREEN_WIDTH..(r + 1) * SCREEN_WIDTH]
    }

    /// Expand one raw row to 0x00RRGGBB pixels for presentation.
    pub fn row_rgb(&self, r: usize) -> Vec<u32> {
        self.row(r).iter().map(|&c| expand_565(c)).collect()
    }

    /// Convert the whole buffer to u32 pixels in display orientation
    /// (row 0 = top of the display, no scroll applied).
    pub fn as_pixel_buffer(&self) -> Vec<u32> {
        let mut pixels = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT);
        for r in (0..SCREEN_HEIGHT).rev() {
            pixels.extend(self.row(r).iter().map(|&c| expand_565(c)));
        }
        pixels
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand a packed 5-6-5 color to 0x00RRGGBB with bit replication.
pub fn expand_565(c: u16) -> u32 {
    let r5 = (c >> 11) as u32 & 0x1F;
    let g6 = (c >> 5) as u32 & 0x3F;
    let b5 = c as u32 & 0x1F;
    let r = (r5 << 3) | (r5 >> 2);
    let g = (g6 << 2) | (g6 >> 4);
    let b = (b5 << 3) | (b5 >> 2);
    (r << 16) | (g << 8) | b
}

/// Pack 8-bit channels into 5-6-5.
pub fn pack_565(r: u8, g: u8, b: u8) -> u16 {
    (((r as u16) >> 3) << 11) | (((g as u16) >> 2) << 5) | ((b as u16) >> 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_flip_contract() {
        let mut fb = FrameBuffer::new();
        fb.set(3, 0, 0xFFFF);
        // Display line 0 is stored in the top-index (bottom scan) row
        assert_eq!(fb.row(SCREEN_HEIGHT - 1)[3], 0xFFFF);
        assert_eq!(fb.get(3, 0), 0xFFFF);
    }

    #[test]
    fn test_expand_565_extremes() {
        assert_eq!(expand_565(0x0000), 0x000000);
        assert_eq!(expand_565(0xFFFF), 0xFFFFFF);
        // Pure red 5-bit max → 0xFF0000
        assert_eq!(expand_565(0xF800), 0xFF0000);
        assert_eq!(expand_565(0x07E0), 0x00FF00);
        assert_eq!(expand_565(0x001F), 0x0000FF);
    }

    #[test]
    fn test_pack_expand_round_trip() {
        let c = pack_565(0xFF, 0x80, 0x08);
        let rgb = expand_565(c);
        assert_eq!(rgb >> 16, 0xFF);
        // Green loses its low 2 bits in packing
        assert_eq!((rgb >> 8) & 0xFF, 0x81);
    }

    #[test]
    fn test_as_pixel_buffer_orientation() {
        let mut fb = FrameBuffer::new();
        fb.set(0, 0, 0xFFFF); // display top-left
        let px = fb.as_pixel_buffer();
        assert_eq!(px[0], 0xFFFFFF);
    }
}
