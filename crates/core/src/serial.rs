//! Serial bit-stream assembly.
//!
//! The SSD1351 protocol shifts bits MSB-first on the wire, but the sampler
//! collects them LSB-first into an accumulator: each clocked bit lands at
//! the current bit index. A completed word is therefore bit-reversed with
//! [`flip`] before interpretation (width 8 for opcodes/arguments, 16 for
//! pixel colors).

use serde::{Deserialize, Serialize};

/// Accumulates a serial bit stream into a word while chip-select is held.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BitAssembler {
    word: u32,
    bits: u32,
}

impl BitAssembler {
    pub fn new() -> Self {
        BitAssembler::default()
    }

    /// Reset accumulator and bit counter. Called on chip-select assertion.
    pub fn clear(&mut self) {
        self.word = 0;
        self.bits = 0;
    }

    /// Shift in one bit at the current index (LSB-first insertion).
    ///
    /// Bits past the accumulator width are counted but discarded; the bit
    /// counter still reflects the true transfer length.
    pub fn push(&mut self, bit: bool) {
        if self.bits < 32 && bit {
            self.word |= 1 << self.bits;
        }
        self.bits += 1;
    }

    /// The assembled word in collection (LSB-first) order.
    pub fn word(&self) -> u32 {
        self.word
    }

    /// Number of bits clocked in since the last clear.
    pub fn len(&self) -> u32 {
        self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

/// Reverse the low `nb` bits of `x` (transmission order → numeric order).
pub fn flip(x: u32, nb: u32) -> u32 {
    let mut result = 0;
    for bit in 0..nb {
        if x & (1 << bit) != 0 {
            result |= 1 << (nb - 1 - bit);
        }
    }
    result
}
