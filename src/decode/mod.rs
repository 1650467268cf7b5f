//! Single-instruction decoding: byte cursor in, one `Instruction` out.
//!
//! `decode` is the only public entry point. Everything else in this module
//! is the interpreter that walks the static tables in `tables`.

pub mod context;
pub mod groups;
pub mod modrm;
pub mod tables;

use self::context::DecodeContext;
use self::modrm::decode_modrm;
use self::tables::{
    Direction, Encoding, Group1Imm, Group2Count, PortSource, RegEncForm, ESCAPE_TABLE,
    PRIMARY_TABLE,
};
use crate::model::{AddrMode, Gpr, Instruction, Operand, Opcode, SReg};

/// Decode one instruction at the cursor's current position.
///
/// Always consumes at least one byte: on any failure (truncated operand,
/// unmapped opcode, cursor already past the end) returns
/// [`Instruction::bad`] anchored at the address the cursor had on entry,
/// without advancing `ctx` past that single byte. Callers that need the
/// cursor state after a `Bad` result should re-seek to `addr + 1`.
pub fn decode(ctx: &mut DecodeContext) -> Instruction {
    let start = ctx.ip();
    match decode_inner(ctx, start) {
        Some(ins) => ins,
        None => Instruction::bad(start),
    }
}

fn decode_inner(ctx: &mut DecodeContext, start: u32) -> Option<Instruction> {
    let byte0 = ctx.fetch_u8()?;
    let enc = PRIMARY_TABLE[byte0 as usize];
    build(ctx, start, enc, byte0)
}

fn decode_escape(ctx: &mut DecodeContext, start: u32) -> Option<Instruction> {
    let byte1 = ctx.fetch_u8()?;
    let enc = ESCAPE_TABLE[byte1 as usize];
    build(ctx, start, enc, byte1)
}

fn len_since(ctx: &DecodeContext, start: u32) -> u8 {
    (ctx.ip() - start) as u8
}

fn reg_operand(reg: u8, wide: bool, seg: bool) -> Operand {
    if seg {
        Operand::Seg(SReg::from_field(reg))
    } else {
        Operand::Reg(Gpr::from_field(reg, wide))
    }
}

fn build(ctx: &mut DecodeContext, start: u32, enc: Encoding, byte: u8) -> Option<Instruction> {
    match enc {
        Encoding::Empty => None,

        Encoding::Escape => decode_escape(ctx, start),

        Encoding::Simple(op) => Some(Instruction::simple(start, len_since(ctx, start), op)),

        Encoding::AccImm { op, wide } => {
            let acc = if wide {
                Operand::Reg(Gpr::Ax)
            } else {
                Operand::Reg(Gpr::Al)
            };
            let imm = fetch_imm(ctx, wide)?;
            Some(Instruction::binary(
                start,
                len_since(ctx, start),
                op,
                acc,
                imm,
            ))
        }

        Encoding::Imm { op, wide } => {
            let imm = fetch_imm(ctx, wide)?;
            Some(Instruction::unary(start, len_since(ctx, start), op, imm))
        }

        Encoding::ModRm { op, dir, wide, seg } => {
            let (reg, rm) = decode_modrm(ctx, wide)?;
            let reg_op = reg_operand(reg, wide, seg);
            let (dst, src) = match dir {
                Direction::ToReg => (reg_op, rm),
                Direction::ToRm => (rm, reg_op),
            };
            Some(Instruction::binary(
                start,
                len_since(ctx, start),
                op,
                dst,
                src,
            ))
        }

        Encoding::ModRmImm { op, wide } => {
            let (_reg, rm) = decode_modrm(ctx, wide)?;
            let imm = fetch_imm(ctx, wide)?;
            Some(Instruction::binary(
                start,
                len_since(ctx, start),
                op,
                rm,
                imm,
            ))
        }

        Encoding::JmpFarDirect(op) => {
            let offset = ctx.fetch_u16()?;
            let segment = ctx.fetch_u16()?;
            Some(Instruction::unary(
                start,
                len_since(ctx, start),
                op,
                Operand::far_ptr(segment, offset),
            ))
        }

        Encoding::Int => match byte {
            0xCC => Some(Instruction::simple(start, len_since(ctx, start), Opcode::Int3)),
            0xF1 => Some(Instruction::simple(start, len_since(ctx, start), Opcode::Int1)),
            _ => {
                let imm = fetch_imm(ctx, false)?;
                Some(Instruction::unary(
                    start,
                    len_since(ctx, start),
                    Opcode::Int,
                    imm,
                ))
            }
        },

        Encoding::InOut { wide, to_acc, port } => {
            let port_operand = match port {
                PortSource::Imm8 => fetch_imm(ctx, false)?,
                PortSource::Dx => Operand::Reg(Gpr::Dx),
            };
            let acc = if wide {
                Operand::Reg(Gpr::Ax)
            } else {
                Operand::Reg(Gpr::Al)
            };
            let op = if to_acc { Opcode::In } else { Opcode::Out };
            let (dst, src) = if to_acc {
                (acc, port_operand)
            } else {
                (port_operand, acc)
            };
            Some(Instruction::binary(
                start,
                len_since(ctx, start),
                op,
                dst,
                src,
            ))
        }

        Encoding::RegEnc(form) => {
            let field = byte & 0x07;
            match form {
                RegEncForm::IncR16 => Some(Instruction::unary(
                    start,
                    len_since(ctx, start),
                    Opcode::Inc,
                    Operand::Reg(Gpr::from_word_field(field)),
                )),
                RegEncForm::DecR16 => Some(Instruction::unary(
                    start,
                    len_since(ctx, start),
                    Opcode::Dec,
                    Operand::Reg(Gpr::from_word_field(field)),
                )),
                RegEncForm::PushR16 => Some(Instruction::unary(
                    start,
                    len_since(ctx, start),
                    Opcode::Push,
                    Operand::Reg(Gpr::from_word_field(field)),
                )),
                RegEncForm::PopR16 => Some(Instruction::unary(
                    start,
                    len_since(ctx, start),
                    Opcode::Pop,
                    Operand::Reg(Gpr::from_word_field(field)),
                )),
                RegEncForm::XchgAxR16 => Some(Instruction::binary(
                    start,
                    len_since(ctx, start),
                    Opcode::Xchg,
                    Operand::Reg(Gpr::Ax),
                    Operand::Reg(Gpr::from_word_field(field)),
                )),
                RegEncForm::MovR8Imm8 => {
                    let imm = fetch_imm(ctx, false)?;
                    Some(Instruction::binary(
                        start,
                        len_since(ctx, start),
                        Opcode::Mov,
                        Operand::Reg(Gpr::from_byte_field(field)),
                        imm,
                    ))
                }
                RegEncForm::MovR16Imm16 => {
                    let imm = fetch_imm(ctx, true)?;
                    Some(Instruction::binary(
                        start,
                        len_since(ctx, start),
                        Opcode::Mov,
                        Operand::Reg(Gpr::from_word_field(field)),
                        imm,
                    ))
                }
            }
        }

        Encoding::PushPopSeg { seg, is_push } => {
            let op = if is_push { Opcode::Push } else { Opcode::Pop };
            Some(Instruction::unary(
                start,
                len_since(ctx, start),
                op,
                Operand::Seg(seg),
            ))
        }

        Encoding::PopRm => {
            let (reg, rm) = decode_modrm(ctx, true)?;
            if reg != 0 {
                return None;
            }
            Some(Instruction::unary(
                start,
                len_since(ctx, start),
                Opcode::Pop,
                rm,
            ))
        }

        Encoding::Enter => {
            let frame_size = ctx.fetch_u16()?;
            let nesting = ctx.fetch_u8()?;
            Some(Instruction::binary(
                start,
                len_since(ctx, start),
                Opcode::Enter,
                Operand::Imm16(frame_size),
                Operand::Imm8(nesting),
            ))
        }

        Encoding::Imul3 { sext } => {
            let (reg, rm) = decode_modrm(ctx, true)?;
            let imm = if sext {
                let b = ctx.fetch_i8()?;
                Operand::Imm16(b as i16 as u16)
            } else {
                Operand::Imm16(ctx.fetch_u16()?)
            };
            Some(Instruction::ternary(
                start,
                len_since(ctx, start),
                Opcode::Imul,
                Operand::Reg(Gpr::from_word_field(reg)),
                rm,
                imm,
            ))
        }

        Encoding::Moff { to_acc, wide } => {
            let offset = ctx.fetch_u16()?;
            let moff = Operand::Mem {
                mode: AddrMode::Moff,
                disp: offset as i16,
            };
            let acc = if wide {
                Operand::Reg(Gpr::Ax)
            } else {
                Operand::Reg(Gpr::Al)
            };
            let (dst, src) = if to_acc { (acc, moff) } else { (moff, acc) };
            Some(Instruction::binary(
                start,
                len_since(ctx, start),
                Opcode::Mov,
                dst,
                src,
            ))
        }

        Encoding::Group1 { imm } => {
            // 0x80: byte r/m, imm8. 0x81: word r/m, imm16. 0x83: word r/m,
            // imm8 sign-extended to 16 bits. The r/m width tracks the
            // immediate convention, not a separate table bit.
            let wide = imm != Group1Imm::Imm8;
            let (reg, rm) = decode_modrm(ctx, wide)?;
            let op = self::groups::GROUP1[reg as usize];
            let imm_operand = match imm {
                Group1Imm::Imm8 => Operand::Imm8(ctx.fetch_u8()?),
                Group1Imm::Imm16 => Operand::Imm16(ctx.fetch_u16()?),
                Group1Imm::Imm8Sext => Operand::Imm16(ctx.fetch_i8()? as i16 as u16),
            };
            Some(Instruction::binary(
                start,
                len_since(ctx, start),
                op,
                rm,
                imm_operand,
            ))
        }

        Encoding::Group2 { count, wide } => {
            let (reg, rm) = decode_modrm(ctx, wide)?;
            let op = self::groups::GROUP2[reg as usize];
            if op == Opcode::Bad {
                return None;
            }
            let count_operand = match count {
                Group2Count::Imm8 => Operand::Imm8(ctx.fetch_u8()?),
                Group2Count::One => Operand::Imm8(1),
                Group2Count::Cl => Operand::Reg(Gpr::Cl),
            };
            Some(Instruction::binary(
                start,
                len_since(ctx, start),
                op,
                rm,
                count_operand,
            ))
        }

        Encoding::Group3 { wide } => {
            let (reg, rm) = decode_modrm(ctx, wide)?;
            let op = self::groups::GROUP3[reg as usize];
            if op == Opcode::Bad {
                return None;
            }
            if op == Opcode::Test {
                let imm = fetch_imm(ctx, wide)?;
                Some(Instruction::binary(
                    start,
                    len_since(ctx, start),
                    op,
                    rm,
                    imm,
                ))
            } else {
                Some(Instruction::unary(start, len_since(ctx, start), op, rm))
            }
        }

        Encoding::Group4 { wide, byte_only } => {
            let (reg, rm) = decode_modrm(ctx, wide)?;
            if byte_only && reg > 1 {
                return None;
            }
            let op = self::groups::GROUP4[reg as usize];
            if op == Opcode::Bad {
                return None;
            }
            Some(Instruction::unary(start, len_since(ctx, start), op, rm))
        }

        Encoding::Group6 => decode_group6(ctx, start),
        Encoding::Group7 => decode_group7(ctx, start),
    }
}

fn fetch_imm(ctx: &mut DecodeContext, wide: bool) -> Option<Operand> {
    if wide {
        Some(Operand::Imm16(ctx.fetch_u16()?))
    } else {
        Some(Operand::Imm8(ctx.fetch_u8()?))
    }
}

fn decode_group6(ctx: &mut DecodeContext, start: u32) -> Option<Instruction> {
    let (reg, rm) = decode_modrm(ctx, true)?;
    let op = self::groups::GROUP6[reg as usize];
    if op == Opcode::Bad {
        return None;
    }
    Some(Instruction::unary(start, len_since(ctx, start), op, rm))
}

fn decode_group7(ctx: &mut DecodeContext, start: u32) -> Option<Instruction> {
    let (reg, rm) = decode_modrm(ctx, true)?;
    let op = self::groups::GROUP7[reg as usize];
    if op == Opcode::Bad {
        return None;
    }
    Some(Instruction::unary(start, len_since(ctx, start), op, rm))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_bytes(bytes: &[u8]) -> Instruction {
        let mut ctx = DecodeContext::new(bytes, 0x1000, 0x1000);
        decode(&mut ctx)
    }

    #[test]
    fn decodes_nop() {
        let ins = decode_bytes(&[0x90]);
        assert_eq!(ins.op, Opcode::Nop);
        assert_eq!(ins.len, 1);
    }

    #[test]
    fn decodes_mov_reg_imm16() {
        let ins = decode_bytes(&[0xB8, 0x34, 0x12]); // mov ax, 0x1234
        assert_eq!(ins.op, Opcode::Mov);
        assert_eq!(ins.len, 3);
        assert_eq!(ins.opers[0], Some(Operand::Reg(Gpr::Ax)));
        assert_eq!(ins.opers[1], Some(Operand::Imm16(0x1234)));
    }

    #[test]
    fn decodes_jmp_short_rel8() {
        let ins = decode_bytes(&[0xEB, 0xFE]); // jmp $-2 (tight loop)
        assert_eq!(ins.op, Opcode::Jmp);
        assert_eq!(ins.len, 2);
        assert_eq!(ins.opers[0], Some(Operand::Imm8(0xFE)));
    }

    #[test]
    fn decodes_call_near_rel16() {
        let ins = decode_bytes(&[0xE8, 0x00, 0x00]);
        assert_eq!(ins.op, Opcode::Call);
        assert_eq!(ins.len, 3);
    }

    #[test]
    fn decodes_int3() {
        let ins = decode_bytes(&[0xCC]);
        assert_eq!(ins.op, Opcode::Int3);
        assert_eq!(ins.len, 1);
        assert_eq!(ins.operand_count(), 0);
    }

    #[test]
    fn decodes_int_imm8() {
        let ins = decode_bytes(&[0xCD, 0x21]);
        assert_eq!(ins.op, Opcode::Int);
        assert_eq!(ins.opers[0], Some(Operand::Imm8(0x21)));
    }

    #[test]
    fn decodes_les_modrm() {
        let ins = decode_bytes(&[0xC4, 0x06, 0x00, 0x01]); // les ax, [0x0100]
        assert_eq!(ins.op, Opcode::Les);
        assert_eq!(ins.opers[0], Some(Operand::Reg(Gpr::Ax)));
    }

    #[test]
    fn decodes_far_jmp_direct() {
        let ins = decode_bytes(&[0xEA, 0x00, 0x01, 0x00, 0xF0]); // jmp far F000:0100
        assert_eq!(ins.op, Opcode::JmpFar);
        assert_eq!(ins.len, 5);
        assert_eq!(
            ins.opers[0].and_then(Operand::as_far_ptr),
            Some((0xF000, 0x0100))
        );
    }

    #[test]
    fn decodes_escape_imul() {
        let ins = decode_bytes(&[0x0F, 0xAF, 0xC3]); // imul ax, bx
        assert_eq!(ins.op, Opcode::Imul);
    }

    #[test]
    fn unmapped_byte_is_bad_and_consumes_one_byte() {
        let bytes = [0x64, 0x99];
        let mut ctx = DecodeContext::new(&bytes, 0x1000, 0x1000);
        let ins = decode(&mut ctx);
        assert!(ins.is_bad());
        assert_eq!(ins.len, 1);
    }

    #[test]
    fn truncated_instruction_is_bad() {
        let ins = decode_bytes(&[0xB8, 0x34]); // mov ax, imm16 missing second byte
        assert!(ins.is_bad());
        assert_eq!(ins.len, 1);
    }

    #[test]
    fn group1_cmp_imm8_sign_extended() {
        let ins = decode_bytes(&[0x83, 0xF8, 0xFF]); // cmp ax, -1
        assert_eq!(ins.op, Opcode::Cmp);
        assert_eq!(ins.opers[1], Some(Operand::Imm16(0xFFFF)));
    }

    #[test]
    fn group2_shift_by_cl() {
        let ins = decode_bytes(&[0xD3, 0xE0]); // shl ax, cl
        assert_eq!(ins.op, Opcode::Shl);
        assert_eq!(ins.opers[1], Some(Operand::Reg(Gpr::Cl)));
    }

    #[test]
    fn group3_neg_byte() {
        let ins = decode_bytes(&[0xF6, 0xD8]); // neg al
        assert_eq!(ins.op, Opcode::Neg);
    }

    #[test]
    fn group4_inc_byte_memory() {
        let ins = decode_bytes(&[0xFE, 0x00]); // inc byte [bx+si]
        assert_eq!(ins.op, Opcode::Inc);
    }

    #[test]
    fn group4_fe_rejects_non_inc_dec_slots() {
        let ins = decode_bytes(&[0xFE, 0x10]); // reg field 2 -> invalid for 0xFE
        assert!(ins.is_bad());
    }

    #[test]
    fn pop_rm_requires_reg_field_zero() {
        let ins = decode_bytes(&[0x8F, 0x00]); // mod=00 reg=000 rm=000 -> pop [bx+si]
        assert_eq!(ins.op, Opcode::Pop);

        let bad = decode_bytes(&[0x8F, 0x08]); // reg=001 is not a valid POP r/m slot
        assert!(bad.is_bad());
    }
}
