//! Digital signal lines and edge detection.
//!
//! The external driver overwrites a [`SignalLines`] sample once per
//! simulation step. [`EdgeDetector`] compares the current sample against the
//! previous one to raise clock and chip-select edge events. Consumers must
//! read the edges of a step before [`EdgeDetector::latch`] is called, and
//! latch exactly once per step, so no edge is observed twice or missed.

use serde::{Deserialize, Serialize};

/// One sample of the five controller input lines.
///
/// `cs` is active-low: the line is asserted while it reads `false`.
/// `dc` selects command (low) or data/argument (high) for the transfer in
/// progress. `rst` is sampled but reserved for future reset handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalLines {
    /// Serial data in
    pub din: bool,
    /// Serial clock
    pub clk: bool,
    /// Chip-select (active-low)
    pub cs: bool,
    /// Data/command select (low = command, high = data)
    pub dc: bool,
    /// Controller reset (reserved, unused by decoding)
    pub rst: bool,
}

impl Default for SignalLines {
    /// Idle bus: clock low, chip-select deasserted.
    fn default() -> Self {
        SignalLines { din: false, clk: false, cs: true, dc: false, rst: true }
    }
}

/// Edge events observed between the previous and current step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Edges {
    /// Clock transitioned low → high
    pub clk_rising: bool,
    /// Chip-select transitioned high → low (transfer begins)
    pub cs_asserted: bool,
    /// Chip-select transitioned low → high (transfer completes)
    pub cs_released: bool,
}

/// Tracks previous clock and chip-select levels across steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDetector {
    prev_clk: bool,
    prev_cs: bool,
}

impl EdgeDetector {
    /// Power-on state: clock low, chip-select deasserted.
    pub fn new() -> Self {
        EdgeDetector { prev_clk: false, prev_cs: true }
    }

    /// Compare the current sample against the previous step without
    /// mutating any state.
    pub fn edges(&self, cur: &SignalLines) -> Edges {
        Edges {
            clk_rising: cur.clk && !self.prev_clk,
            cs_asserted: self.prev_cs && !cur.cs,
            cs_released: !self.prev_cs && cur.cs,
        }
    }

    /// Record the current sample as the new previous step. Call after all
    /// edge consumers have run.
    pub fn latch(&mut self, cur: &SignalLines) {
        self.prev_clk = cur.clk;
        self.prev_cs = cur.cs;
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}
