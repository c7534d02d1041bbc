//! Scrolled presentation of the frame buffer onto an output surface.
//!
//! The display start line rotates the image vertically at presentation time
//! without moving stored pixels: the presenter issues two axis-aligned blits
//! split at the scroll boundary, then asks the surface to present (swap).
//! The surface binding to a live window is an owned resource, created once
//! by the frontend and dropped when presentation ends.

use crate::framebuffer::FrameBuffer;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface update failed: {0}")]
    Present(String),
}

/// An output surface accepting row blits and a buffer swap.
///
/// `dst_row` 0 is the top of the output; `rows` is a contiguous block of
/// whole 128-pixel rows in 0x00RRGGBB format.
pub trait Surface {
    fn blit(&mut self, dst_row: usize, rows: &[u32]);
    fn present(&mut self) -> Result<(), SurfaceError>;
}

/// Maps frame buffer + scroll offset to a [`Surface`] via two blits.
pub struct Presenter<S: Surface> {
    surface: S,
}

impl<S: Surface> Presenter<S> {
    pub fn new(surface: S) -> Self {
        Presenter { surface }
    }

    /// Present the frame buffer with vertical scroll offset `start_line`.
    ///
    /// Display line `y` appears at output row `(y - start_line) mod 128`,
    /// realizing a circular vertical scroll. Presenting twice with no new
    /// pixel writes produces identical output.
    pub fn present(&mut self, fb: &FrameBuffer, start_line: u8) -> Result<(), SurfaceError> {
        let s = start_line as usize;

        // Wrapped region: the s display lines that rotated past the top,
        // shown at the bottom of the output.
        if s != 0 {
            let mut rows = Vec::with_capacity(s * SCREEN_WIDTH);
            for r in ((SCREEN_HEIGHT - s)..SCREEN_HEIGHT).rev() {
                rows.extend(fb.row_rgb(r));
            }
            self.surface.blit(SCREEN_HEIGHT - s, &rows);
        }

        // Main region: the remaining 128 - s lines, from the top down.
        let mut rows = Vec::with_capacity((SCREEN_HEIGHT - s) * SCREEN_WIDTH);
        for r in (0..SCREEN_HEIGHT - s).rev() {
            rows.extend(fb.row_rgb(r));
        }
        self.surface.blit(0, &rows);

        self.surface.present()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Captures blits into a plain pixel grid.
    struct TestSurface {
        frame: Vec<u32>,
        blits: usize,
        presents: usize,
    }

    impl TestSurface {
        fn new() -> Self {
            TestSurface { frame: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT], blits: 0, presents: 0 }
        }
    }

    impl Surface for TestSurface {
        fn blit(&mut self, dst_row: usize, rows: &[u32]) {
            let start = dst_row * SCREEN_WIDTH;
            self.frame[start..start + rows.len()].copy_from_slice(rows);
            self.blits += 1;
        }

        fn present(&mut self) -> Result<(), SurfaceError> {
            self.presents += 1;
            Ok(())
        }
    }

    #[test]
    fn test_scroll_position_round_trip() {
        for s in [0u8, 1, 127] {
            let mut fb = FrameBuffer::new();
            fb.set(5, 10, 0xFFFF);
            let mut p = Presenter::new(TestSurface::new());
            p.present(&fb, s).unwrap();
            let out_row = (10 + SCREEN_HEIGHT - s as usize) % SCREEN_HEIGHT;
            let frame = &p.surface().frame;
            assert_eq!(
                frame[out_row * SCREEN_WIDTH + 5],
                0xFFFFFF,
                "start_line {}",
                s
            );
            // Nowhere else
            let lit = frame.iter().filter(|&&px| px != 0).count();
            assert_eq!(lit, 1);
        }
    }

    #[test]
    fn test_blit_split_at_scroll_boundary() {
        let fb = FrameBuffer::new();
        let mut p = Presenter::new(TestSurface::new());
        p.present(&fb, 0).unwrap();
        assert_eq!(p.surface().blits, 1);
        assert_eq!(p.surface().presents, 1);

        let mut p = Presenter::new(TestSurface::new());
        p.present(&fb, 32).unwrap();
        assert_eq!(p.surface().blits, 2);
    }

    #[test]
    fn test_present_idempotent() {
        let mut fb = FrameBuffer::new();
        for x in 0..SCREEN_WIDTH {
            fb.set(x, 64, 0x07E0);
        }
        let mut p = Presenter::new(TestSurface::new());
        p.present(&fb, 17).unwrap();
        let first = p.surface().frame.clone();
        p.present(&fb, 17).unwrap();
        assert_eq!(p.surface().frame, first);
        assert_eq!(p.surface().presents, 2);
    }
}
