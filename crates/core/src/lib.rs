//! # ssd1351-core
//!
//! Emulation core for the SSD1351 128×128 color OLED controller (v0.3.0).
//!
//! Decodes the bit-serial command/pixel protocol a simulated processor drives
//! over five digital lines (data, clock, chip-select, data/command, reset)
//! and reconstructs the controller's frame buffer, addressing window, and
//! scroll state so the display output can be observed without hardware.
//!
//! ## Architecture
//!
//! - [`SignalLines`] / [`signals::EdgeDetector`] — per-step line sampling and
//!   clock/chip-select edge detection
//! - [`serial::BitAssembler`] — LSB-first serial word accumulation
//! - [`command::Opcode`] — the decoded command set (column/row range, start
//!   line, RAM write)
//! - [`Ssd1351`] — the controller state machine, stepped once per half
//!   clock-cycle
//! - [`FrameBuffer`] — 128×128 grid of packed RGB565 pixels, row 0 = bottom
//!   scan line
//! - [`Presenter`] — scrolled two-blit presentation onto a [`Surface`]
//! - [`trace`] — signal-trace text format, parser, and waveform builder
//! - [`savestate`] — compressed save/load of the full decoder state

pub mod command;
pub mod controller;
pub mod framebuffer;
pub mod presenter;
pub mod savestate;
pub mod serial;
pub mod signals;
pub mod trace;

pub use controller::Ssd1351;
pub use framebuffer::FrameBuffer;
pub use presenter::{Presenter, Surface, SurfaceError};
pub use signals::SignalLines;

/// Display width in pixels
pub const SCREEN_WIDTH: usize = 128;
/// Display height in pixels
pub const SCREEN_HEIGHT: usize = 128;
