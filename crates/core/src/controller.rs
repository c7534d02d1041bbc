//! SSD1351 controller state machine.
//!
//! [`Ssd1351`] is stepped once per half clock-cycle with the current line
//! sample. It assembles serial transfers, dispatches completed bytes as
//! opcodes or arguments, maintains the addressing window and write cursor,
//! and streams decoded pixels into the frame buffer. A `dirty` flag tells
//! the frontend when a redraw is due.

use crate::command::{Command, Opcode};
use crate::framebuffer::FrameBuffer;
use crate::serial::{flip, BitAssembler};
use crate::signals::{EdgeDetector, SignalLines};
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};
use serde::{Deserialize, Serialize};

/// Transfer length (in clocks) marking one half of a 16-bit pixel color.
///
/// The hardware clocks 9 bits per half-pixel transfer; the threshold is
/// tied to that framing and is carried over verbatim.
pub const HALF_PIXEL_BITS: u32 = 9;

/// Rectangular region within which pixel writes are confined and wrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressWindow {
    pub col_start: u8,
    pub col_end: u8,
    pub row_start: u8,
    pub row_end: u8,
}

impl Default for AddressWindow {
    fn default() -> Self {
        AddressWindow { col_start: 0, col_end: 127, row_start: 0, row_end: 127 }
    }
}

/// Current write position. May walk past the window's row range when the
/// driver streams more pixels than the window holds; the ≥128 guard in the
/// write path rejects those without disturbing addressing state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PixelCursor {
    pub x: u16,
    pub y: u16,
}

impl PixelCursor {
    /// Advance one pixel, wrapping at the window's right edge.
    /// Returns true when a row completed.
    fn advance(&mut self, window: &AddressWindow) -> bool {
        self.x += 1;
        if self.x > window.col_end as u16 {
            self.x = window.col_start as u16;
            // Saturate: anything past the ≥128 write guard is equivalent
            self.y = self.y.saturating_add(1);
            true
        } else {
            false
        }
    }
}

/// SSD1351 128×128 color OLED controller model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ssd1351 {
    edges: EdgeDetector,
    shifter: BitAssembler,
    cmd: Command,
    window: AddressWindow,
    cursor: PixelCursor,
    /// Display start line (vertical scroll offset)
    start_line: u8,
    /// First 9-bit half of a pixel color, awaiting its second half
    pending_half: Option<u32>,
    pub framebuffer: FrameBuffer,
    /// Whether a redraw has been requested since the last present
    pub dirty: bool,
    /// Debug: opcode bytes decoded
    pub dbg_cmd_count: u32,
    /// Debug: data/argument transfers decoded
    pub dbg_data_count: u32,
}

impl Ssd1351 {
    pub fn new() -> Self {
        Ssd1351 {
            edges: EdgeDetector::new(),
            shifter: BitAssembler::new(),
            cmd: Command::new(),
            window: AddressWindow::default(),
            cursor: PixelCursor::default(),
            start_line: 0,
            pending_half: None,
            framebuffer: FrameBuffer::new(),
            dirty: false,
            dbg_cmd_count: 0,
            dbg_data_count: 0,
        }
    }

    /// Advance the controller by one simulation step.
    ///
    /// Edge consumers run against the previous step's levels first; the
    /// detector is latched last, so each edge is handled exactly once.
    pub fn step(&mut self, lines: &SignalLines) {
        let edges = self.edges.edges(lines);

        if edges.cs_asserted {
            self.shifter.clear();
        }
        // Clock edges while chip-select is deasserted are ignored
        if !lines.cs && edges.clk_rising {
            self.shifter.push(lines.din);
        }
        if edges.cs_released {
            self.transfer_complete(lines.dc);
        }

        self.edges.latch(lines);
    }

    /// Handle one completed serial transfer (chip-select release).
    fn transfer_complete(&mut self, dc: bool) {
        if !dc {
            let byte = flip(self.shifter.word(), 8) as u8;
            self.cmd.start(Opcode::from_byte(byte));
            self.pending_half = None;
            self.dbg_cmd_count += 1;
            return;
        }

        self.dbg_data_count += 1;
        if self.cmd.opcode == Opcode::WriteRam {
            // Pixel stream: not a counted argument
            self.pixel_transfer();
            return;
        }

        let byte = flip(self.shifter.word(), 8) as u8;
        let count = self.cmd.push_arg(byte);
        match (self.cmd.opcode, count) {
            (Opcode::SetColumnRange, 2) => {
                self.window.col_start = self.cmd.args[0].min(127);
                self.window.col_end = self.cmd.args[1].min(127);
                self.cursor.x = self.window.col_start as u16;
            }
            (Opcode::SetRowRange, 2) => {
                self.window.row_start = self.cmd.args[0].min(127);
                self.window.row_end = self.cmd.args[1].min(127);
                self.cursor.y = self.window.row_start as u16;
            }
            (Opcode::SetStartLine, 1) => {
                self.start_line = self.cmd.args[0].min(127);
                self.dirty = true;
            }
            _ => {}
        }
    }

    /// Handle one completed transfer while the write-RAM opcode is active.
    fn pixel_transfer(&mut self) {
        let mut word = self.shifter.word();

        if self.shifter.len() == HALF_PIXEL_BITS {
            match self.pending_half.take() {
                None => {
                    // First half: latch it and wait for the rest
                    self.pending_half = Some(word);
                    return;
                }
                Some(high) => {
                    word = (word << 8) | high;
                }
            }
        }

        let color = flip(word, 16) as u16;
        let (x, y) = (self.cursor.x, self.cursor.y);
        if (x as usize) < SCREEN_WIDTH && (y as usize) < SCREEN_HEIGHT {
            self.framebuffer.set(x as usize, y as usize, color);
        } else {
            tracing::warn!(x, y, "out-of-range pixel write dropped");
        }
        if self.cursor.advance(&self.window) {
            self.dirty = true;
        }
    }

    /// The committed addressing window.
    pub fn window(&self) -> &AddressWindow {
        &self.window
    }

    /// The current write cursor.
    pub fn cursor(&self) -> PixelCursor {
        self.cursor
    }

    /// The committed scroll offset (display start line).
    pub fn start_line(&self) -> u8 {
        self.start_line
    }

}

impl Default for Ssd1351 {
    fn default() -> Self {
        Self::new()
    }
}
