//! The decoded instruction record.

use super::opcode::Opcode;
use super::operand::Operand;
use serde::{Deserialize, Serialize};

/// Maximum number of operands a single instruction carries (spec.md §3:
/// "0..3 operands"). Stored inline — no heap allocation per instruction.
pub const MAX_OPERANDS: usize = 3;

/// A single decoded instruction.
///
/// `opers` is a fixed-capacity inline array rather than a linked list (see
/// `SPEC_FULL.md` §9): operand chains are never shared, so `Copy` semantics
/// are the natural Rust analogue of the original's "recursively released
/// operand chain".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Linear address of the first byte of this instruction.
    pub addr: u32,
    /// Total encoded length in bytes, 1..=15.
    pub len: u8,
    /// Decoded mnemonic.
    pub op: Opcode,
    /// Operand list in source-syntax order (destination first); unused
    /// slots are `None`.
    pub opers: [Option<Operand>; MAX_OPERANDS],
}

impl Instruction {
    /// Build an instruction with no operands (simple forms, prefixes, `Bad`).
    pub fn simple(addr: u32, len: u8, op: Opcode) -> Self {
        Self {
            addr,
            len,
            op,
            opers: [None, None, None],
        }
    }

    /// Build an instruction with one operand.
    pub fn unary(addr: u32, len: u8, op: Opcode, a: Operand) -> Self {
        Self {
            addr,
            len,
            op,
            opers: [Some(a), None, None],
        }
    }

    /// Build an instruction with two operands.
    pub fn binary(addr: u32, len: u8, op: Opcode, dst: Operand, src: Operand) -> Self {
        Self {
            addr,
            len,
            op,
            opers: [Some(dst), Some(src), None],
        }
    }

    /// Build an instruction with three operands.
    pub fn ternary(addr: u32, len: u8, op: Opcode, a: Operand, b: Operand, c: Operand) -> Self {
        Self {
            addr,
            len,
            op,
            opers: [Some(a), Some(b), Some(c)],
        }
    }

    /// The `BAD` sentinel instruction that stands for any decode failure:
    /// `len == 1`, no operands, cursor resumes at `start + 1`.
    pub fn bad(addr: u32) -> Self {
        Self::simple(addr, 1, Opcode::Bad)
    }

    /// First `addr` past the end of this instruction.
    pub fn end(&self) -> u32 {
        self.addr + self.len as u32
    }

    /// Operands as a slice without the trailing `None`s.
    pub fn operands(&self) -> impl Iterator<Item = &Operand> {
        self.opers.iter().filter_map(|o| o.as_ref())
    }

    /// Number of populated operand slots.
    pub fn operand_count(&self) -> usize {
        self.opers.iter().filter(|o| o.is_some()).count()
    }

    /// True iff this is the `BAD` decode-failure sentinel.
    pub fn is_bad(&self) -> bool {
        self.op == Opcode::Bad
    }

    /// True iff this instruction's normal successor is never the
    /// fall-through (unconditional branch, return, interrupt return).
    pub fn is_terminator(&self) -> bool {
        self.op.is_terminator()
    }

    /// True for terminators plus conditional branches, `LOOP*` and `CALL`.
    pub fn is_branch(&self) -> bool {
        self.op.is_branch()
    }

    /// True for the seven prefix pseudo-ops.
    pub fn is_prefix(&self) -> bool {
        self.op.is_prefix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_has_length_one_and_no_operands() {
        let ins = Instruction::bad(0x100);
        assert_eq!(ins.len, 1);
        assert_eq!(ins.operand_count(), 0);
        assert!(ins.is_bad());
    }

    #[test]
    fn end_is_addr_plus_len() {
        let ins = Instruction::simple(0x200, 3, Opcode::Nop);
        assert_eq!(ins.end(), 0x203);
    }

    #[test]
    fn binary_keeps_destination_first() {
        let ins = Instruction::binary(
            0x100,
            3,
            Opcode::Mov,
            Operand::Reg(super::super::operand::Gpr::Ax),
            Operand::Imm16(0x1234),
        );
        let collected: Vec<_> = ins.operands().collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0], &Operand::Reg(super::super::operand::Gpr::Ax));
    }
}
