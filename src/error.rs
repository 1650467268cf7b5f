//! Error types for the ambient (CLI/config) layer.
//!
//! In-band decode outcomes — a bad byte, a truncated operand, a worklist
//! drop — are never represented here: they surface as data (`Opcode::Bad`,
//! [`crate::disassembly::TraversalNote`]), not as `Result::Err`. This enum
//! covers only conditions the engine cannot recover from on its own:
//! malformed configuration and I/O.

use thiserror::Error;

/// Primary error type for the disassembler's ambient layer.
#[derive(Debug, Error)]
pub enum DisassemblerError {
    /// IO error while reading the input image.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The image is too small to hold anything decodable.
    #[error("image too small: expected at least {expected} bytes, got {actual}")]
    ImageTooSmall { expected: usize, actual: usize },

    /// `base + image.len()` overflowed `u32`.
    #[error("base address 0x{base:08X} plus image length {len} overflows a 32-bit address space")]
    BaseOverflow { base: u32, len: usize },

    /// A `--entry` address fell outside `[base, base + len)`.
    #[error("entry point 0x{addr:08X} is outside the image range 0x{base:08X}..0x{limit:08X}")]
    EntryOutOfRange { addr: u32, base: u32, limit: u32 },

    /// A `--base`/`--entry` command-line literal failed to parse.
    #[error("invalid address literal {text:?}: {reason}")]
    InvalidAddressLiteral { text: String, reason: String },

    /// Failed to serialize the disassembly to the requested output format.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for the ambient layer.
pub type Result<T> = std::result::Result<T, DisassemblerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_out_of_range_message_includes_all_three_addresses() {
        let err = DisassemblerError::EntryOutOfRange {
            addr: 0x2000,
            base: 0x0000,
            limit: 0x1000,
        };
        let msg = err.to_string();
        assert!(msg.contains("2000"));
        assert!(msg.contains("0000"));
        assert!(msg.contains("1000"));
    }

    #[test]
    fn invalid_address_literal_carries_the_offending_text() {
        let err = DisassemblerError::InvalidAddressLiteral {
            text: "0xZZ".to_string(),
            reason: "invalid digit".to_string(),
        };
        assert!(err.to_string().contains("0xZZ"));
    }
}
