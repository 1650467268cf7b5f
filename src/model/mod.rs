//! Instruction model: operands, opcodes, and the decoded instruction record.
//!
//! This module has no knowledge of how bytes are decoded or how control
//! flow is traversed — it is pure data plus the four predicates
//! (`is_bad`, `is_terminator`, `is_prefix`, `is_branch`) that the traversal
//! engine and formatter rely on.

pub mod instruction;
pub mod opcode;
pub mod operand;

pub use instruction::{Instruction, MAX_OPERANDS};
pub use opcode::Opcode;
pub use operand::{AddrMode, Gpr, Operand, SReg};
