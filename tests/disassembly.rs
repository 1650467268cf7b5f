//! End-to-end traversal scenarios, run against the public API only.

use dis286::{Disassembly, Opcode};
use pretty_assertions::assert_eq as assert_eq_pretty;

fn run(bytes: &[u8], base: u32) -> Disassembly {
    let mut dis = Disassembly::new(bytes.to_vec(), base);
    dis.push_entry(base);
    dis.run();
    dis
}

#[test]
fn flag_clears_fall_through_in_sequence() {
    let dis = run(&[0xF8, 0xFA, 0xFC], 0x100);
    assert_eq!(dis.instruction_at(0x100).unwrap().op, Opcode::Clc);
    assert_eq!(dis.instruction_at(0x101).unwrap().op, Opcode::Cli);
    assert_eq!(dis.instruction_at(0x102).unwrap().op, Opcode::Cld);
    assert!(dis.notes().is_empty());
}

#[test]
fn short_jmp_self_loop_decodes_exactly_one_entry() {
    let dis = run(&[0xEB, 0xFE], 0x100);
    let ins = dis.instruction_at(0x100).unwrap();
    assert_eq!(ins.op, Opcode::Jmp);
    assert_eq!(dis286::branch_target(ins), Some(0x100));
    assert_eq!(dis.iter().count(), 1);
}

#[test]
fn mov_int_ret_decodes_three_instructions_and_stops_at_terminator() {
    let dis = run(&[0xB8, 0x34, 0x12, 0xCD, 0x21, 0xC3], 0x100);
    assert_eq!(dis.instruction_at(0x100).unwrap().op, Opcode::Mov);
    assert_eq!(dis.instruction_at(0x103).unwrap().op, Opcode::Int);
    assert_eq!(dis.instruction_at(0x105).unwrap().op, Opcode::Ret);
    assert_eq!(dis.iter().count(), 3);
}

#[test]
fn near_jmp_skips_bytes_that_stay_raw() {
    let dis = run(&[0xE9, 0x03, 0x00, 0x90, 0x90, 0x90, 0xC3], 0x100);
    let jmp = dis.instruction_at(0x100).unwrap();
    assert_eq!(jmp.op, Opcode::Jmp);
    assert_eq!(dis286::branch_target(jmp), Some(0x106));
    assert_eq!(dis.instruction_at(0x106).unwrap().op, Opcode::Ret);

    // the three skipped NOPs were never entered -- they stay as raw bytes
    assert!(dis.instruction_at(0x103).is_none());
    assert!(dis.instruction_at(0x104).is_none());
    assert!(dis.instruction_at(0x105).is_none());
}

#[test]
fn conditional_jump_decodes_both_fallthrough_and_target() {
    let dis = run(&[0x74, 0x02, 0xCC, 0xCC, 0xC3], 0x100);
    let je = dis.instruction_at(0x100).unwrap();
    assert_eq!(je.op, Opcode::Je);
    assert_eq!(dis286::branch_target(je), Some(0x104));
    assert_eq!(dis.instruction_at(0x102).unwrap().op, Opcode::Int3);
    assert_eq!(dis.instruction_at(0x104).unwrap().op, Opcode::Ret);
    assert_eq!(dis.iter().count(), 4);
}

#[test]
fn group7_lidt_with_direct_address_operand() {
    // 0F 01 (escape + group7) + 1E (modrm: mod=00 reg=011 rm=110) + 0000
    // (disp16) is a 5-byte instruction, so RET falls at 0x105.
    let dis = run(&[0x0F, 0x01, 0x1E, 0x00, 0x00, 0xC3], 0x100);
    let lidt = dis.instruction_at(0x100).unwrap();
    assert_eq!(lidt.op, Opcode::Lidt);
    assert_eq!(lidt.len, 5);
    assert_eq!(dis.instruction_at(0x105).unwrap().op, Opcode::Ret);
}

#[test]
fn full_listing_renders_every_byte_as_instruction_or_raw() {
    use dis286::formatter::{FmtCursor, FormatOptions};

    let dis = run(&[0xE9, 0x03, 0x00, 0x90, 0x90, 0x90, 0xC3], 0x100);
    let cursor = FmtCursor::with_default_hooks(FormatOptions::empty());
    let text = cursor.format_disassembly(&dis);
    let lines: Vec<&str> = text.lines().collect();
    // 1 jmp + 3 raw nops (never entered) + 1 ret = 5 lines
    assert_eq!(lines.len(), 5);
    assert!(lines[0].contains("jmp"));
    assert!(lines[4].contains("ret"));
}

#[test]
fn mov_int_ret_text_matches_expected_listing_lines() {
    use dis286::formatter::{FmtCursor, FormatOptions};

    let dis = run(&[0xB8, 0x34, 0x12, 0xCD, 0x21, 0xC3], 0x100);
    let cursor = FmtCursor::with_default_hooks(FormatOptions::HEX_IMM);
    let lines: Vec<String> = dis
        .iter()
        .map(|item| match item {
            dis286::IterItem::Insn(ins) => cursor.format_instruction(ins),
            dis286::IterItem::RawByte { byte, .. } => format!("db 0x{:02X}", byte),
        })
        .collect();
    assert_eq_pretty!(
        lines,
        vec![
            "mov ax, 0x1234".to_string(),
            "int 0x21".to_string(),
            "ret".to_string(),
        ]
    );
}
