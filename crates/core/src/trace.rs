//! Signal trace parsing and synthesis.
//!
//! A trace is the per-step record of the five controller input lines,
//! replayable into [`Ssd1351::step`](crate::Ssd1351::step) in place of a
//! live simulated core.
//!
//! ## Text format
//!
//! One step per line: five `0`/`1` digits in the order
//! `din clk cs dc rst`, optionally followed by a repeat count:
//!
//! ```text
//! # assert chip-select, clock one high bit
//! 00101
//! 10101
//! 11101
//! 00111 x4
//! ```
//!
//! Blank lines are skipped and `#` starts a comment.

use crate::signals::SignalLines;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("line {line}: expected 5 binary digits, got {got} characters")]
    BadLength { line: usize, got: usize },
    #[error("line {line}: invalid character '{ch}' (expected 0 or 1)")]
    BadDigit { line: usize, ch: char },
    #[error("line {line}: invalid repeat suffix '{token}'")]
    BadRepeat { line: usize, token: String },
}

/// Parse a trace text into a step sequence.
pub fn parse_trace(text: &str) -> Result<Vec<SignalLines>, TraceError> {
    let mut steps = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let mut tokens = content.split_whitespace();
        let sample = tokens.next().unwrap_or("");
        if sample.chars().count() != 5 {
            return Err(TraceError::BadLength { line, got: sample.chars().count() });
        }

        let mut bits = [false; 5];
        for (i, ch) in sample.chars().enumerate() {
            bits[i] = match ch {
                '0' => false,
                '1' => true,
                other => return Err(TraceError::BadDigit { line, ch: other }),
            };
        }

        let repeat = match tokens.next() {
            None => 1,
            Some(tok) => tok
                .strip_prefix('x')
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|&n| n > 0)
                .ok_or_else(|| TraceError::BadRepeat { line, token: tok.to_string() })?,
        };

        let step = SignalLines { din: bits[0], clk: bits[1], cs: bits[2], dc: bits[3], rst: bits[4] };
        for _ in 0..repeat {
            steps.push(step);
        }
    }

    Ok(steps)
}

/// Render a step sequence back to trace text.
pub fn to_text(steps: &[SignalLines]) -> String {
    let mut out = String::with_capacity(steps.len() * 6);
    for s in steps {
        for bit in [s.din, s.clk, s.cs, s.dc, s.rst] {
            out.push(if bit { '1' } else { '0' });
        }
        out.push('\n');
    }
    out
}

/// Synthesizes well-formed serial waveforms for the decoder.
///
/// Transfers clock each bit on a rising edge while chip-select is held low;
/// chip-select release completes the transfer. Bytes go out MSB-first, the
/// order the protocol transmits. Pixel colors use the hardware's 9-clock
/// half-word framing.
#[derive(Debug, Default)]
pub struct TraceBuilder {
    steps: Vec<SignalLines>,
}

impl TraceBuilder {
    pub fn new() -> Self {
        TraceBuilder { steps: Vec::new() }
    }

    fn transfer(&mut self, bits: &[bool], dc: bool) {
        let base = SignalLines { dc, cs: false, ..Default::default() };
        // Assert chip-select with the clock low
        self.steps.push(SignalLines { clk: false, ..base });
        for &bit in bits {
            self.steps.push(SignalLines { din: bit, clk: false, ..base });
            self.steps.push(SignalLines { din: bit, clk: true, ..base });
        }
        // Release completes the transfer; DC must still be valid here
        self.steps.push(SignalLines { cs: true, dc, ..Default::default() });
    }

    /// One opcode byte (data/command line low).
    pub fn command(&mut self, opcode: u8) {
        self.transfer(&byte_bits(opcode), false);
    }

    /// One argument/data byte (data/command line high).
    pub fn data(&mut self, byte: u8) {
        self.transfer(&byte_bits(byte), true);
    }

    /// A raw data transfer with an explicit bit pattern.
    pub fn data_bits(&mut self, bits: &[bool]) {
        self.transfer(bits, true);
    }

    /// One 16-bit pixel color as two 9-clock half transfers, high byte
    /// first. The ninth bit of each half is padding.
    pub fn pixel(&mut self, color: u16) {
        for byte in [(color >> 8) as u8, color as u8] {
            let mut bits = byte_bits(byte).to_vec();
            bits.push(false);
            self.transfer(&bits, true);
        }
    }

    /// Idle bus steps (chip-select deasserted, clock low).
    pub fn idle(&mut self, n: usize) {
        for _ in 0..n {
            self.steps.push(SignalLines::default());
        }
    }

    pub fn steps(&self) -> &[SignalLines] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<SignalLines> {
        self.steps
    }
}

fn byte_bits(byte: u8) -> [bool; 8] {
    let mut bits = [false; 8];
    for (i, slot) in bits.iter_mut().enumerate() {
        *slot = byte & (0x80 >> i) != 0;
    }
    bits
}
