//! dis286 - a static recursive-traversal disassembler for the Intel 286
//!
//! This library provides bit-accurate decoding of the full 286 real-mode
//! opcode space, recursive-descent traversal that discovers reachable
//! instructions from one or more entry points, and a formatter that renders
//! decoded instructions as assembly text.
//!
//! # Scope
//!
//! This crate decodes and disassembles; it does not execute, emulate,
//! assemble, or recover symbols/relocations. It targets the 286 real-mode
//! instruction set only — no 32/64-bit modes, no x87/MMX/SSE.
//!
//! # Quick start
//!
//! ```rust
//! use dis286::Disassembly;
//!
//! // mov ax, 0x1234 ; int 0x21 ; ret
//! let bytes = vec![0xB8, 0x34, 0x12, 0xCD, 0x21, 0xC3];
//! let mut dis = Disassembly::new(bytes, 0x0100);
//! dis.push_entry(0x0100);
//! dis.run();
//!
//! let cursor = dis286::formatter::FmtCursor::with_default_hooks(Default::default());
//! println!("{}", cursor.format_disassembly(&dis));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod decode;
pub mod disassembly;
pub mod error;
pub mod formatter;
pub mod model;

pub use disassembly::{branch_target, Disassembly, DisassemblyIter, IterItem, TraversalNote};
pub use error::{DisassemblerError, Result};
pub use formatter::{FmtCursor, FormatHooks, FormatOptions};
pub use model::{AddrMode, Gpr, Instruction, Opcode, Operand, SReg};

use std::path::Path;

/// Build a [`Disassembly`] over bytes already in memory, run traversal from
/// every address in `entries`, and return the completed disassembly.
///
/// This is the library's one-call convenience entry point; embedders that
/// need to push further entries after inspecting intermediate results
/// should use [`Disassembly::new`] and [`Disassembly::push_entry`] directly.
///
/// # Errors
///
/// Returns [`DisassemblerError::ImageTooSmall`] if `bytes` is empty, or
/// [`DisassemblerError::BaseOverflow`] if `base + bytes.len()` does not fit
/// in a `u32`.
pub fn disassemble_bytes(bytes: Vec<u8>, base: u32, entries: &[u32]) -> Result<Disassembly> {
    if bytes.is_empty() {
        return Err(DisassemblerError::ImageTooSmall {
            expected: 1,
            actual: 0,
        });
    }
    let len = bytes.len();
    if base.checked_add(len as u32).is_none() {
        return Err(DisassemblerError::BaseOverflow { base, len });
    }

    let mut dis = Disassembly::new(bytes, base);
    for &entry in entries {
        dis.push_entry(entry);
    }
    dis.run();
    Ok(dis)
}

/// Read `path` whole and disassemble it; see [`disassemble_bytes`].
///
/// # Errors
///
/// Returns [`DisassemblerError::Io`] if the file cannot be read, plus the
/// error conditions documented on [`disassemble_bytes`].
pub fn disassemble_file<P: AsRef<Path>>(
    path: P,
    base: u32,
    entries: &[u32],
) -> Result<Disassembly> {
    let data = std::fs::read(path)?;
    disassemble_bytes(data, base, entries)
}

/// Get version information for this library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Opcode;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn disassemble_bytes_runs_from_every_entry() {
        let bytes = vec![0xB8, 0x34, 0x12, 0xCD, 0x21, 0xC3];
        let dis = disassemble_bytes(bytes, 0x0100, &[0x0100]).unwrap();
        assert_eq!(dis.instruction_at(0x0100).unwrap().op, Opcode::Mov);
        assert_eq!(dis.instruction_at(0x0103).unwrap().op, Opcode::Int);
        assert_eq!(dis.instruction_at(0x0105).unwrap().op, Opcode::Ret);
    }

    #[test]
    fn disassemble_bytes_rejects_empty_image() {
        let err = disassemble_bytes(Vec::new(), 0x0100, &[0x0100]).unwrap_err();
        assert!(matches!(err, DisassemblerError::ImageTooSmall { .. }));
    }

    #[test]
    fn disassemble_bytes_rejects_base_overflow() {
        let bytes = vec![0x90; 4];
        let err = disassemble_bytes(bytes, u32::MAX - 1, &[]).unwrap_err();
        assert!(matches!(err, DisassemblerError::BaseOverflow { .. }));
    }
}
