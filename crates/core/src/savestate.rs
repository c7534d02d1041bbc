//! Save state (quick save / quick load) for the decoder.
//!
//! Captures the full controller state — addressing window, cursor, command,
//! scroll offset, bit assembler, pending pixel half, and frame buffer — to a
//! file using bincode serialization with deflate compression.
//!
//! ## File format
//!
//! ```text
//! +------------------+
//! | Magic "S351"     |  4 bytes
//! +------------------+
//! | Format version   |  u32 little-endian (currently 1)
//! +------------------+
//! | Compressed data  |  deflate-compressed bincode payload
//! +------------------+
//! ```

use crate::controller::Ssd1351;
use std::path::Path;
use thiserror::Error;

/// Magic bytes identifying an ssd1351-emu save state file.
const MAGIC: &[u8; 4] = b"S351";
/// Current save state format version.
const FORMAT_VERSION: u32 = 1;
/// Deflate compression level.
const COMPRESSION_LEVEL: u8 = 6;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a save state file (bad magic)")]
    BadMagic,
    #[error("unsupported save state version {0}")]
    UnsupportedVersion(u32),
    #[error("corrupt save state: {0}")]
    Corrupt(String),
}

/// Serialize the controller into the save state byte format.
pub fn to_bytes(ctrl: &Ssd1351) -> Result<Vec<u8>, StateError> {
    let payload = bincode::serialize(ctrl).map_err(|e| StateError::Corrupt(e.to_string()))?;
    let compressed = miniz_oxide::deflate::compress_to_vec(&payload, COMPRESSION_LEVEL);

    let mut data = Vec::with_capacity(8 + compressed.len());
    data.extend_from_slice(MAGIC);
    data.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    data.extend_from_slice(&compressed);
    Ok(data)
}

/// Restore a controller from the save state byte format.
pub fn from_bytes(data: &[u8]) -> Result<Ssd1351, StateError> {
    if data.len() < 8 || &data[0..4] != MAGIC {
        return Err(StateError::BadMagic);
    }
    let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if version != FORMAT_VERSION {
        return Err(StateError::UnsupportedVersion(version));
    }
    let payload = miniz_oxide::inflate::decompress_to_vec(&data[8..])
        .map_err(|e| StateError::Corrupt(format!("decompress: {:?}", e)))?;
    let ctrl: Ssd1351 =
        bincode::deserialize(&payload).map_err(|e| StateError::Corrupt(e.to_string()))?;
    if ctrl.framebuffer.pixel_count() != crate::SCREEN_WIDTH * crate::SCREEN_HEIGHT {
        return Err(StateError::Corrupt("frame buffer size mismatch".into()));
    }
    Ok(ctrl)
}

/// Save the controller state to a file.
pub fn save_state(ctrl: &Ssd1351, path: &Path) -> Result<(), StateError> {
    let data = to_bytes(ctrl)?;
    std::fs::write(path, data)?;
    Ok(())
}

/// Load a controller state from a file.
pub fn load_state(path: &Path) -> Result<Ssd1351, StateError> {
    let data = std::fs::read(path)?;
    from_bytes(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TraceBuilder;

    fn exercised_controller() -> Ssd1351 {
        let mut tb = TraceBuilder::new();
        tb.command(0x15);
        tb.data(8);
        tb.data(23);
        tb.command(0x75);
        tb.data(40);
        tb.data(90);
        tb.command(0xA1);
        tb.data(64);
        tb.command(0x5C);
        for i in 0..10u16 {
            tb.pixel(0x8000 | i);
        }
        let mut ctrl = Ssd1351::new();
        for step in tb.steps() {
            ctrl.step(step);
        }
        ctrl
    }

    #[test]
    fn test_round_trip_restores_state() {
        let ctrl = exercised_controller();
        let restored = from_bytes(&to_bytes(&ctrl).unwrap()).unwrap();

        assert_eq!(restored.window().col_start, ctrl.window().col_start);
        assert_eq!(restored.window().row_end, ctrl.window().row_end);
        assert_eq!(restored.cursor().x, ctrl.cursor().x);
        assert_eq!(restored.cursor().y, ctrl.cursor().y);
        assert_eq!(restored.start_line(), ctrl.start_line());
        for i in 0..10usize {
            let (x, y) = (8 + i, 40);
            assert_eq!(restored.framebuffer.get(x, y), ctrl.framebuffer.get(x, y));
        }
    }

    #[test]
    fn test_restored_controller_keeps_decoding() {
        let ctrl = exercised_controller();
        let mut restored = from_bytes(&to_bytes(&ctrl).unwrap()).unwrap();
        let mut tb = TraceBuilder::new();
        tb.pixel(0x1234);
        for step in tb.steps() {
            restored.step(step);
        }
        // Continues at the saved cursor position
        assert_eq!(restored.framebuffer.get(18, 40), 0x1234);
    }

    #[test]
    fn test_bad_magic_rejected() {
        assert!(matches!(from_bytes(b"XXXX\x01\x00\x00\x00"), Err(StateError::BadMagic)));
        assert!(matches!(from_bytes(b"S3"), Err(StateError::BadMagic)));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let mut data = to_bytes(&Ssd1351::new()).unwrap();
        data[4] = 99;
        assert!(matches!(from_bytes(&data), Err(StateError::UnsupportedVersion(99))));
    }
}
