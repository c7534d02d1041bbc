//! Decoded command set and per-command argument tracking.
//!
//! Only the addressing/scroll/pixel subset of the SSD1351 command table is
//! modeled; every other opcode decodes to [`Opcode::Other`] and is accepted
//! as a no-op.

use serde::{Deserialize, Serialize};

/// The SSD1351 opcodes the decoder acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    /// 0x15 — set column address range (2 arguments)
    SetColumnRange,
    /// 0x75 — set row address range (2 arguments)
    SetRowRange,
    /// 0xA1 — set display start line (1 argument)
    SetStartLine,
    /// 0x5C — write RAM: every following data transfer is pixel data
    WriteRam,
    /// Any other opcode: accepted, ignored
    Other(u8),
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x15 => Opcode::SetColumnRange,
            0x75 => Opcode::SetRowRange,
            0xA1 => Opcode::SetStartLine,
            0x5C => Opcode::WriteRam,
            other => Opcode::Other(other),
        }
    }

    pub fn byte(self) -> u8 {
        match self {
            Opcode::SetColumnRange => 0x15,
            Opcode::SetRowRange => 0x75,
            Opcode::SetStartLine => 0xA1,
            Opcode::WriteRam => 0x5C,
            Opcode::Other(b) => b,
        }
    }
}

/// The opcode in effect plus its collected argument bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub opcode: Opcode,
    pub args: [u8; 2],
    pub arg_index: u8,
}

impl Command {
    pub fn new() -> Self {
        Command { opcode: Opcode::Other(0), args: [0; 2], arg_index: 0 }
    }

    /// Begin a new command, discarding argument state of the previous one.
    pub fn start(&mut self, opcode: Opcode) {
        self.opcode = opcode;
        self.args = [0; 2];
        self.arg_index = 0;
    }

    /// Store the next argument byte and return the updated count.
    /// Bytes beyond the second are ignored (index stays clamped at 2).
    pub fn push_arg(&mut self, byte: u8) -> u8 {
        if self.arg_index < 2 {
            self.args[self.arg_index as usize] = byte;
            self.arg_index += 1;
        }
        self.arg_index
    }
}

impl Default for Command {
    fn default() -> Self {
        Self::new()
    }
}
