//! Pure-data dispatch tables: byte -> `Encoding`, interpreted by a single
//! decoder function in `decode::decode`.
//!
//! Per `SPEC_FULL.md` §4.B / design note 9, this replaces a function-pointer
//! dispatch table with fully static data plus one interpreter — there is no
//! `arg` bit-packing anywhere in this crate.

use crate::model::{Opcode, SReg};

/// Direction of a standard two-operand ModR/M form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `op reg, r/m` — the ModR/M `reg` field is the destination.
    ToReg,
    /// `op r/m, reg` — the ModR/M `r/m` field is the destination.
    ToRm,
}

/// Source of an IN/OUT instruction's port operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSource {
    /// Port number is a following immediate byte.
    Imm8,
    /// Port number is in DX.
    Dx,
}

/// Which opcode-embedded-register form a `0x40..0xBF`-range byte selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegEncForm {
    IncR16,
    DecR16,
    PushR16,
    PopR16,
    XchgAxR16,
    MovR8Imm8,
    MovR16Imm16,
}

/// Immediate width/sign-extension for a Group 1 (arithmetic) instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group1Imm {
    Imm8,
    Imm16,
    Imm8Sext,
}

/// Shift/rotate count source for a Group 2 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group2Count {
    Imm8,
    One,
    Cl,
}

/// One dispatch-table slot: everything the interpreter needs to finish
/// decoding a specific byte value, as typed data (never a function pointer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Unmapped slot: decode fails (`Opcode::Bad`).
    Empty,
    /// `0x0F` primary-table sentinel: dispatch through the escape table.
    Escape,
    /// No operands.
    Simple(Opcode),
    /// Accumulator + immediate (`AL`/`AX` implicit destination).
    AccImm { op: Opcode, wide: bool },
    /// A single immediate operand (short branches, `PUSH imm`, `AAM`/`AAD`,
    /// `RET imm16`, `ENTER`'s callers use a dedicated variant instead).
    Imm { op: Opcode, wide: bool },
    /// Standard two-operand ModR/M form.
    ModRm {
        op: Opcode,
        dir: Direction,
        wide: bool,
        seg: bool,
    },
    /// ModR/M reg/mem plus a following immediate (`MOV r/m, imm`).
    ModRmImm { op: Opcode, wide: bool },
    /// `0x9A`/`0xEA`: far direct CALL/JMP, consumes a 4-byte `seg:off` pointer.
    JmpFarDirect(Opcode),
    /// `INT3` / `INT imm8` / `INT1`, each with their own byte-count quirk.
    Int,
    /// IN/OUT with AL/AX and DX/imm8 port forms.
    InOut {
        wide: bool,
        to_acc: bool,
        port: PortSource,
    },
    /// Opcode-embedded 3-bit register field in bits 0..2 of the byte itself.
    RegEnc(RegEncForm),
    /// `PUSH`/`POP` of a segment register (`0x06/07/0E/16/17/1E/1F`).
    PushPopSeg { seg: SReg, is_push: bool },
    /// `0x8F`: `POP r/m16`, ModR/M `reg` must be 0.
    PopRm,
    /// `0xC8`: `ENTER imm16, imm8`.
    Enter,
    /// `0x69`/`0x6B`: three-operand `IMUL reg, r/m, imm{16,8}`.
    Imul3 { sext: bool },
    /// `0xA0..0xA3`: `MOV` to/from accumulator via a raw absolute offset.
    Moff { to_acc: bool, wide: bool },
    /// Group 1 (arithmetic): `ADD/OR/ADC/SBB/AND/SUB/XOR/CMP r/m, imm`.
    Group1 { imm: Group1Imm },
    /// Group 2 (shift/rotate).
    Group2 { count: Group2Count, wide: bool },
    /// Group 3 (`TEST`/`NOT`/`NEG`/`MUL`/`IMUL`/`DIV`/`IDIV`).
    Group3 { wide: bool },
    /// Group 4 (`INC`/`DEC`/indirect `CALL`/`CALLF`/`JMP`/`JMPF`/`PUSH`).
    ///
    /// `byte_only` is set for `0xFE`, where only slots 0/1 (INC/DEC) are valid.
    Group4 { wide: bool, byte_only: bool },
    /// Group 6 (`0F 00`): descriptor-table load/store, byte-sized subset.
    Group6,
    /// Group 7 (`0F 01`): descriptor-table register load/store.
    Group7,
}

const fn primary_table() -> [Encoding; 256] {
    let mut t = [Encoding::Empty; 256];

    // 00..3F: the eight ALU groups, each with the regular 6-opcode pattern
    // (Eb,Gb / Ev,Gv / Gb,Eb / Gv,Ev / AL,ib / AX,iv) plus two segment
    // push/pop or prefix/BCD slots.
    const ALU: [Opcode; 8] = [
        Opcode::Add,
        Opcode::Or,
        Opcode::Adc,
        Opcode::Sbb,
        Opcode::And,
        Opcode::Sub,
        Opcode::Xor,
        Opcode::Cmp,
    ];
    let mut i = 0;
    while i < 8 {
        let base = (i as usize) * 8;
        let op = ALU[i];
        t[base] = Encoding::ModRm {
            op,
            dir: Direction::ToRm,
            wide: false,
            seg: false,
        };
        t[base + 1] = Encoding::ModRm {
            op,
            dir: Direction::ToRm,
            wide: true,
            seg: false,
        };
        t[base + 2] = Encoding::ModRm {
            op,
            dir: Direction::ToReg,
            wide: false,
            seg: false,
        };
        t[base + 3] = Encoding::ModRm {
            op,
            dir: Direction::ToReg,
            wide: true,
            seg: false,
        };
        t[base + 4] = Encoding::AccImm { op, wide: false };
        t[base + 5] = Encoding::AccImm { op, wide: true };
        i += 1;
    }

    t[0x06] = Encoding::PushPopSeg {
        seg: SReg::Es,
        is_push: true,
    };
    t[0x07] = Encoding::PushPopSeg {
        seg: SReg::Es,
        is_push: false,
    };
    t[0x0E] = Encoding::PushPopSeg {
        seg: SReg::Cs,
        is_push: true,
    };
    t[0x0F] = Encoding::Escape;
    t[0x16] = Encoding::PushPopSeg {
        seg: SReg::Ss,
        is_push: true,
    };
    t[0x17] = Encoding::PushPopSeg {
        seg: SReg::Ss,
        is_push: false,
    };
    t[0x1E] = Encoding::PushPopSeg {
        seg: SReg::Ds,
        is_push: true,
    };
    t[0x1F] = Encoding::PushPopSeg {
        seg: SReg::Ds,
        is_push: false,
    };
    t[0x26] = Encoding::Simple(Opcode::PreEs);
    t[0x27] = Encoding::Simple(Opcode::Daa);
    t[0x2E] = Encoding::Simple(Opcode::PreCs);
    t[0x2F] = Encoding::Simple(Opcode::Das);
    t[0x36] = Encoding::Simple(Opcode::PreSs);
    t[0x37] = Encoding::Simple(Opcode::Aaa);
    t[0x3E] = Encoding::Simple(Opcode::PreDs);
    t[0x3F] = Encoding::Simple(Opcode::Aas);

    // 40..5F: opcode-embedded register forms.
    let mut r = 0;
    while r < 8 {
        t[0x40 + r] = Encoding::RegEnc(RegEncForm::IncR16);
        t[0x48 + r] = Encoding::RegEnc(RegEncForm::DecR16);
        t[0x50 + r] = Encoding::RegEnc(RegEncForm::PushR16);
        t[0x58 + r] = Encoding::RegEnc(RegEncForm::PopR16);
        r += 1;
    }

    t[0x60] = Encoding::Simple(Opcode::Pusha);
    t[0x61] = Encoding::Simple(Opcode::Popa);
    t[0x62] = Encoding::ModRm {
        op: Opcode::Bound,
        dir: Direction::ToReg,
        wide: true,
        seg: false,
    };
    t[0x63] = Encoding::ModRm {
        op: Opcode::Arpl,
        dir: Direction::ToRm,
        wide: true,
        seg: false,
    };
    t[0x68] = Encoding::Imm {
        op: Opcode::Push,
        wide: true,
    };
    t[0x69] = Encoding::Imul3 { sext: false };
    t[0x6A] = Encoding::Imm {
        op: Opcode::Push,
        wide: false,
    };
    t[0x6B] = Encoding::Imul3 { sext: true };
    t[0x6C] = Encoding::Simple(Opcode::InsB);
    t[0x6D] = Encoding::Simple(Opcode::InsW);
    t[0x6E] = Encoding::Simple(Opcode::OutsB);
    t[0x6F] = Encoding::Simple(Opcode::OutsW);

    // 70..7F: Jcc rel8.
    const JCC: [Opcode; 16] = [
        Opcode::Jo,
        Opcode::Jno,
        Opcode::Jb,
        Opcode::Jnb,
        Opcode::Je,
        Opcode::Jne,
        Opcode::Jbe,
        Opcode::Ja,
        Opcode::Js,
        Opcode::Jns,
        Opcode::Jp,
        Opcode::Jnp,
        Opcode::Jl,
        Opcode::Jge,
        Opcode::Jle,
        Opcode::Jg,
    ];
    let mut j = 0;
    while j < 16 {
        t[0x70 + j] = Encoding::Imm {
            op: JCC[j],
            wide: false,
        };
        j += 1;
    }

    t[0x80] = Encoding::Group1 {
        imm: Group1Imm::Imm8,
    };
    t[0x81] = Encoding::Group1 {
        imm: Group1Imm::Imm16,
    };
    t[0x83] = Encoding::Group1 {
        imm: Group1Imm::Imm8Sext,
    };
    t[0x84] = Encoding::ModRm {
        op: Opcode::Test,
        dir: Direction::ToRm,
        wide: false,
        seg: false,
    };
    t[0x85] = Encoding::ModRm {
        op: Opcode::Test,
        dir: Direction::ToRm,
        wide: true,
        seg: false,
    };
    t[0x86] = Encoding::ModRm {
        op: Opcode::Xchg,
        dir: Direction::ToRm,
        wide: false,
        seg: false,
    };
    t[0x87] = Encoding::ModRm {
        op: Opcode::Xchg,
        dir: Direction::ToRm,
        wide: true,
        seg: false,
    };
    t[0x88] = Encoding::ModRm {
        op: Opcode::Mov,
        dir: Direction::ToRm,
        wide: false,
        seg: false,
    };
    t[0x89] = Encoding::ModRm {
        op: Opcode::Mov,
        dir: Direction::ToRm,
        wide: true,
        seg: false,
    };
    t[0x8A] = Encoding::ModRm {
        op: Opcode::Mov,
        dir: Direction::ToReg,
        wide: false,
        seg: false,
    };
    t[0x8B] = Encoding::ModRm {
        op: Opcode::Mov,
        dir: Direction::ToReg,
        wide: true,
        seg: false,
    };
    t[0x8C] = Encoding::ModRm {
        op: Opcode::Mov,
        dir: Direction::ToRm,
        wide: true,
        seg: true,
    };
    t[0x8D] = Encoding::ModRm {
        op: Opcode::Lea,
        dir: Direction::ToReg,
        wide: true,
        seg: false,
    };
    t[0x8E] = Encoding::ModRm {
        op: Opcode::Mov,
        dir: Direction::ToReg,
        wide: true,
        seg: true,
    };
    t[0x8F] = Encoding::PopRm;
    t[0x90] = Encoding::Simple(Opcode::Nop);
    let mut x = 1;
    while x < 8 {
        t[0x90 + x] = Encoding::RegEnc(RegEncForm::XchgAxR16);
        x += 1;
    }
    t[0x98] = Encoding::Simple(Opcode::Cbw);
    t[0x99] = Encoding::Simple(Opcode::Cwd);
    t[0x9A] = Encoding::JmpFarDirect(Opcode::CallFar);
    t[0x9B] = Encoding::Simple(Opcode::Wait);
    t[0x9C] = Encoding::Simple(Opcode::Pushf);
    t[0x9D] = Encoding::Simple(Opcode::Popf);
    t[0x9E] = Encoding::Simple(Opcode::Sahf);
    t[0x9F] = Encoding::Simple(Opcode::Lahf);

    t[0xA0] = Encoding::Moff {
        to_acc: true,
        wide: false,
    };
    t[0xA1] = Encoding::Moff {
        to_acc: true,
        wide: true,
    };
    t[0xA2] = Encoding::Moff {
        to_acc: false,
        wide: false,
    };
    t[0xA3] = Encoding::Moff {
        to_acc: false,
        wide: true,
    };
    t[0xA4] = Encoding::Simple(Opcode::MovsB);
    t[0xA5] = Encoding::Simple(Opcode::MovsW);
    t[0xA6] = Encoding::Simple(Opcode::CmpsB);
    t[0xA7] = Encoding::Simple(Opcode::CmpsW);
    t[0xA8] = Encoding::AccImm {
        op: Opcode::Test,
        wide: false,
    };
    t[0xA9] = Encoding::AccImm {
        op: Opcode::Test,
        wide: true,
    };
    t[0xAA] = Encoding::Simple(Opcode::StosB);
    t[0xAB] = Encoding::Simple(Opcode::StosW);
    t[0xAC] = Encoding::Simple(Opcode::LodsB);
    t[0xAD] = Encoding::Simple(Opcode::LodsW);
    t[0xAE] = Encoding::Simple(Opcode::ScasB);
    t[0xAF] = Encoding::Simple(Opcode::ScasW);

    let mut br = 0;
    while br < 8 {
        t[0xB0 + br] = Encoding::RegEnc(RegEncForm::MovR8Imm8);
        t[0xB8 + br] = Encoding::RegEnc(RegEncForm::MovR16Imm16);
        br += 1;
    }

    t[0xC0] = Encoding::Group2 {
        count: Group2Count::Imm8,
        wide: false,
    };
    t[0xC1] = Encoding::Group2 {
        count: Group2Count::Imm8,
        wide: true,
    };
    t[0xC2] = Encoding::Imm {
        op: Opcode::Ret,
        wide: true,
    };
    t[0xC3] = Encoding::Simple(Opcode::Ret);
    t[0xC4] = Encoding::ModRm {
        op: Opcode::Les,
        dir: Direction::ToReg,
        wide: true,
        seg: false,
    };
    t[0xC5] = Encoding::ModRm {
        op: Opcode::Lds,
        dir: Direction::ToReg,
        wide: true,
        seg: false,
    };
    t[0xC6] = Encoding::ModRmImm {
        op: Opcode::Mov,
        wide: false,
    };
    t[0xC7] = Encoding::ModRmImm {
        op: Opcode::Mov,
        wide: true,
    };
    t[0xC8] = Encoding::Enter;
    t[0xC9] = Encoding::Simple(Opcode::Leave);
    t[0xCA] = Encoding::Imm {
        op: Opcode::RetFar,
        wide: true,
    };
    t[0xCB] = Encoding::Simple(Opcode::RetFar);
    t[0xCC] = Encoding::Int;
    t[0xCD] = Encoding::Int;
    t[0xCE] = Encoding::Simple(Opcode::Into);
    t[0xCF] = Encoding::Simple(Opcode::Iret);

    t[0xD0] = Encoding::Group2 {
        count: Group2Count::One,
        wide: false,
    };
    t[0xD1] = Encoding::Group2 {
        count: Group2Count::One,
        wide: true,
    };
    t[0xD2] = Encoding::Group2 {
        count: Group2Count::Cl,
        wide: false,
    };
    t[0xD3] = Encoding::Group2 {
        count: Group2Count::Cl,
        wide: true,
    };
    t[0xD4] = Encoding::Imm {
        op: Opcode::Aam,
        wide: false,
    };
    t[0xD5] = Encoding::Imm {
        op: Opcode::Aad,
        wide: false,
    };
    t[0xD7] = Encoding::Simple(Opcode::Xlat);

    t[0xE0] = Encoding::Imm {
        op: Opcode::Loopnz,
        wide: false,
    };
    t[0xE1] = Encoding::Imm {
        op: Opcode::Loopz,
        wide: false,
    };
    t[0xE2] = Encoding::Imm {
        op: Opcode::Loop,
        wide: false,
    };
    t[0xE3] = Encoding::Imm {
        op: Opcode::Jcxz,
        wide: false,
    };
    t[0xE4] = Encoding::InOut {
        wide: false,
        to_acc: true,
        port: PortSource::Imm8,
    };
    t[0xE5] = Encoding::InOut {
        wide: true,
        to_acc: true,
        port: PortSource::Imm8,
    };
    t[0xE6] = Encoding::InOut {
        wide: false,
        to_acc: false,
        port: PortSource::Imm8,
    };
    t[0xE7] = Encoding::InOut {
        wide: true,
        to_acc: false,
        port: PortSource::Imm8,
    };
    t[0xE8] = Encoding::Imm {
        op: Opcode::Call,
        wide: true,
    };
    t[0xE9] = Encoding::Imm {
        op: Opcode::Jmp,
        wide: true,
    };
    t[0xEA] = Encoding::JmpFarDirect(Opcode::JmpFar);
    t[0xEB] = Encoding::Imm {
        op: Opcode::Jmp,
        wide: false,
    };
    t[0xEC] = Encoding::InOut {
        wide: false,
        to_acc: true,
        port: PortSource::Dx,
    };
    t[0xED] = Encoding::InOut {
        wide: true,
        to_acc: true,
        port: PortSource::Dx,
    };
    t[0xEE] = Encoding::InOut {
        wide: false,
        to_acc: false,
        port: PortSource::Dx,
    };
    t[0xEF] = Encoding::InOut {
        wide: true,
        to_acc: false,
        port: PortSource::Dx,
    };

    t[0xF0] = Encoding::Simple(Opcode::PreLock);
    t[0xF1] = Encoding::Int;
    t[0xF2] = Encoding::Simple(Opcode::PreRepne);
    t[0xF3] = Encoding::Simple(Opcode::PreRep);
    t[0xF4] = Encoding::Simple(Opcode::Hlt);
    t[0xF5] = Encoding::Simple(Opcode::Cmc);
    t[0xF6] = Encoding::Group3 { wide: false };
    t[0xF7] = Encoding::Group3 { wide: true };
    t[0xF8] = Encoding::Simple(Opcode::Clc);
    t[0xF9] = Encoding::Simple(Opcode::Stc);
    t[0xFA] = Encoding::Simple(Opcode::Cli);
    t[0xFB] = Encoding::Simple(Opcode::Sti);
    t[0xFC] = Encoding::Simple(Opcode::Cld);
    t[0xFD] = Encoding::Simple(Opcode::Std);
    t[0xFE] = Encoding::Group4 {
        wide: false,
        byte_only: true,
    };
    t[0xFF] = Encoding::Group4 {
        wide: true,
        byte_only: false,
    };

    t
}

const fn escape_table() -> [Encoding; 256] {
    let mut t = [Encoding::Empty; 256];
    t[0x00] = Encoding::Group6;
    t[0x01] = Encoding::Group7;
    t[0x02] = Encoding::ModRm {
        op: Opcode::Lar,
        dir: Direction::ToReg,
        wide: true,
        seg: false,
    };
    t[0x06] = Encoding::Simple(Opcode::Clts);
    t[0xAF] = Encoding::ModRm {
        op: Opcode::Imul,
        dir: Direction::ToReg,
        wide: true,
        seg: false,
    };

    const JCC: [Opcode; 16] = [
        Opcode::Jo,
        Opcode::Jno,
        Opcode::Jb,
        Opcode::Jnb,
        Opcode::Je,
        Opcode::Jne,
        Opcode::Jbe,
        Opcode::Ja,
        Opcode::Js,
        Opcode::Jns,
        Opcode::Jp,
        Opcode::Jnp,
        Opcode::Jl,
        Opcode::Jge,
        Opcode::Jle,
        Opcode::Jg,
    ];
    let mut j = 0;
    while j < 16 {
        t[0x80 + j] = Encoding::Imm {
            op: JCC[j],
            wide: true,
        };
        j += 1;
    }

    t
}

/// 256-entry primary dispatch table, indexed by the first instruction byte.
pub static PRIMARY_TABLE: [Encoding; 256] = primary_table();

/// 256-entry `0x0F`-escape dispatch table; only 286-valid slots are populated.
pub static ESCAPE_TABLE: [Encoding; 256] = escape_table();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nop_is_simple() {
        assert_eq!(PRIMARY_TABLE[0x90], Encoding::Simple(Opcode::Nop));
    }

    #[test]
    fn escape_byte_dispatches_to_escape_table() {
        assert_eq!(PRIMARY_TABLE[0x0F], Encoding::Escape);
    }

    #[test]
    fn unmapped_slots_are_empty() {
        assert_eq!(PRIMARY_TABLE[0x64], Encoding::Empty);
        assert_eq!(PRIMARY_TABLE[0xD8], Encoding::Empty);
        assert_eq!(ESCAPE_TABLE[0x03], Encoding::Empty);
    }

    #[test]
    fn group_opcodes_round_trip() {
        assert_eq!(
            PRIMARY_TABLE[0x80],
            Encoding::Group1 {
                imm: Group1Imm::Imm8
            }
        );
        assert_eq!(ESCAPE_TABLE[0x00], Encoding::Group6);
        assert_eq!(ESCAPE_TABLE[0x01], Encoding::Group7);
    }

    #[test]
    fn long_form_jcc_present_in_escape_table() {
        assert_eq!(
            ESCAPE_TABLE[0x84],
            Encoding::Imm {
                op: Opcode::Je,
                wide: true
            }
        );
    }
}
