//! Group opcode tables: the ModR/M `reg` field selects the mnemonic.
//!
//! Each table is a fixed 8-slot array; reserved slots decode to `Bad`
//! exactly as `SPEC_FULL.md` §4.B specifies.

use crate::model::Opcode;

/// Group 1 (0x80/81/83): ADD,OR,ADC,SBB,AND,SUB,XOR,CMP.
pub const GROUP1: [Opcode; 8] = [
    Opcode::Add,
    Opcode::Or,
    Opcode::Adc,
    Opcode::Sbb,
    Opcode::And,
    Opcode::Sub,
    Opcode::Xor,
    Opcode::Cmp,
];

/// Group 2 (0xC0/C1/D0/D1/D2/D3): ROL,ROR,RCL,RCR,SHL,SHR,–,SAR.
pub const GROUP2: [Opcode; 8] = [
    Opcode::Rol,
    Opcode::Ror,
    Opcode::Rcl,
    Opcode::Rcr,
    Opcode::Shl,
    Opcode::Shr,
    Opcode::Bad,
    Opcode::Sar,
];

/// Group 3 (0xF6/F7): TEST,–,NOT,NEG,MUL,IMUL,DIV,IDIV.
pub const GROUP3: [Opcode; 8] = [
    Opcode::Test,
    Opcode::Bad,
    Opcode::Not,
    Opcode::Neg,
    Opcode::Mul,
    Opcode::Imul,
    Opcode::Div,
    Opcode::Idiv,
];

/// Group 4 (0xFE/FF): INC,DEC,CALL,CALLF,JMP,JMPF,PUSH,–.
///
/// For 0xFE only slots 0/1 (INC/DEC) are valid; the caller rejects the rest.
pub const GROUP4: [Opcode; 8] = [
    Opcode::Inc,
    Opcode::Dec,
    Opcode::Call,
    Opcode::CallFar,
    Opcode::Jmp,
    Opcode::JmpFar,
    Opcode::Push,
    Opcode::Bad,
];

/// Group 6 (0F 00): SLDT,STR,LLDT,LTR,VERR,VERW,–,–.
pub const GROUP6: [Opcode; 8] = [
    Opcode::Sldt,
    Opcode::Str,
    Opcode::Lldt,
    Opcode::Ltr,
    Opcode::Verr,
    Opcode::Verw,
    Opcode::Bad,
    Opcode::Bad,
];

/// Group 7 (0F 01): SGDT,SIDT,LGDT,LIDT,SMSW,–,LMSW,–.
pub const GROUP7: [Opcode; 8] = [
    Opcode::Sgdt,
    Opcode::Sidt,
    Opcode::Lgdt,
    Opcode::Lidt,
    Opcode::Smsw,
    Opcode::Bad,
    Opcode::Lmsw,
    Opcode::Bad,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_tables_have_eight_slots() {
        assert_eq!(GROUP1.len(), 8);
        assert_eq!(GROUP2.len(), 8);
        assert_eq!(GROUP3.len(), 8);
        assert_eq!(GROUP4.len(), 8);
        assert_eq!(GROUP6.len(), 8);
        assert_eq!(GROUP7.len(), 8);
    }

    #[test]
    fn reserved_slots_are_bad() {
        assert_eq!(GROUP2[6], Opcode::Bad);
        assert_eq!(GROUP3[1], Opcode::Bad);
        assert_eq!(GROUP4[7], Opcode::Bad);
        assert_eq!(GROUP6[6], Opcode::Bad);
        assert_eq!(GROUP6[7], Opcode::Bad);
        assert_eq!(GROUP7[5], Opcode::Bad);
        assert_eq!(GROUP7[7], Opcode::Bad);
    }
}
