//! dis286 CLI
//!
//! Command-line front end for the 286 disassembler core. File I/O, argument
//! parsing and listing output live here; the library crate's core modules
//! (`decode`, `disassembly`, `formatter`) never touch any of it.

use clap::{Parser, ValueEnum};
use dis286::formatter::{FmtCursor, FormatHooks, FormatOptions};
use dis286::{DisassemblerError, Disassembly, Instruction};
use std::path::PathBuf;
use std::process::ExitCode;

/// Static recursive-traversal disassembler for the Intel 286 real-mode
/// instruction set.
#[derive(Parser, Debug)]
#[command(name = "dis286")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file to disassemble.
    file: PathBuf,

    /// Image base address (hex, e.g. 0x100).
    #[arg(short = 'b', long, default_value = "0x100", value_parser = parse_hex_u32)]
    base: u32,

    /// Traversal entry point (hex); repeatable. Defaults to `[base]`.
    #[arg(short = 'e', long = "entry", value_parser = parse_hex_u32)]
    entries: Vec<u32>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    format: OutputFormat,

    /// Render immediates and displacements in hex. Default.
    #[arg(long, conflicts_with = "dec_imm")]
    hex_imm: bool,

    /// Render immediates and displacements in decimal instead of hex.
    #[arg(long)]
    dec_imm: bool,

    /// Prefix branch operands with short/near/far/word.
    #[arg(long)]
    jmp_type: bool,

    /// Render the absolute branch target address in place of the signed
    /// displacement.
    #[arg(long, conflicts_with = "jmp_both")]
    jmp_addr: bool,

    /// Render the signed displacement followed by the resolved absolute
    /// branch target as a trailing `; 0x..` comment.
    #[arg(long)]
    jmp_both: bool,

    /// Colorize the mnemonic and operands with ANSI escapes, driven through
    /// `FormatHooks` rather than a forked renderer.
    #[arg(long)]
    color: bool,

    /// Use an unbounded traversal worklist instead of the default
    /// fixed-capacity-32 stack.
    #[arg(long)]
    unbounded_worklist: bool,

    /// Verbose logging of traversal decisions.
    #[arg(short, long)]
    verbose: bool,
}

/// Listing output format.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Two-column `addr: hex-bytes<TAB>assembly` listing.
    Human,
    /// One JSON object per instruction/raw byte.
    Json,
    /// One compact line per instruction, no byte column.
    Short,
}

/// `--color`: cyan mnemonics, green operands, reset after each token. The
/// formatter never imports a terminal crate or knows ANSI exists — this
/// hook set is how a CLI-only concern (coloring) rides along the core's
/// piece-by-piece rendering contract without forking it.
struct ColorHooks;

impl FormatHooks for ColorHooks {
    fn opcode_pre(&self, buf: &mut String, _ins: &Instruction) -> usize {
        buf.push_str("\x1b[1;36m");
        7
    }

    fn opcode_post(&self, buf: &mut String, _ins: &Instruction) -> usize {
        buf.push_str("\x1b[0m");
        4
    }

    fn oper_pre(&self, buf: &mut String, _ins: &Instruction, _idx: usize) -> usize {
        buf.push_str("\x1b[32m");
        5
    }

    fn oper_post(&self, buf: &mut String, _ins: &Instruction, _idx: usize) -> usize {
        buf.push_str("\x1b[0m");
        4
    }
}

fn parse_hex_u32(s: &str) -> Result<u32, String> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"));
    let (radix, digits) = match digits {
        Some(d) => (16, d),
        None => (10, trimmed),
    };
    u32::from_str_radix(digits, radix).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("dis286=debug")
            .init();
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error analyzing {}: {}", args.file.display(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> dis286::Result<()> {
    let data = std::fs::read(&args.file)?;
    if data.is_empty() {
        return Err(DisassemblerError::ImageTooSmall {
            expected: 1,
            actual: 0,
        });
    }
    let limit = args
        .base
        .checked_add(data.len() as u32)
        .ok_or(DisassemblerError::BaseOverflow {
            base: args.base,
            len: data.len(),
        })?;

    let entries: Vec<u32> = if args.entries.is_empty() {
        vec![args.base]
    } else {
        args.entries.clone()
    };
    for &entry in &entries {
        if entry < args.base || entry >= limit {
            return Err(DisassemblerError::EntryOutOfRange {
                addr: entry,
                base: args.base,
                limit,
            });
        }
    }

    let capacity = if args.unbounded_worklist {
        None
    } else {
        Some(dis286::disassembly::DEFAULT_WORKLIST_CAPACITY)
    };
    let mut dis = Disassembly::with_worklist_capacity(data, args.base, capacity);
    for &entry in &entries {
        tracing::debug!(addr = format!("0x{:X}", entry), "pushing entry");
        dis.push_entry(entry);
    }
    dis.run();

    for note in dis.notes() {
        tracing::debug!(?note, "traversal note");
    }

    let mut opts = FormatOptions::empty();
    if !args.dec_imm {
        opts |= FormatOptions::HEX_IMM | FormatOptions::HEX_DISP;
    }
    if args.jmp_type {
        opts |= FormatOptions::JMP_TYPE;
    }
    if args.jmp_addr {
        opts |= FormatOptions::JMP_ADDR;
    }
    if args.jmp_both {
        opts |= FormatOptions::JMP_BOTH;
    }
    static COLOR_HOOKS: ColorHooks = ColorHooks;
    let cursor = if args.color {
        FmtCursor::new(opts, &COLOR_HOOKS)
    } else {
        FmtCursor::with_default_hooks(opts)
    };

    match args.format {
        OutputFormat::Human => print!("{}", cursor.format_disassembly(&dis)),
        OutputFormat::Json => print_json(&dis, &cursor)?,
        OutputFormat::Short => print_short(&dis, &cursor),
    }

    Ok(())
}

fn print_json(dis: &Disassembly, cursor: &FmtCursor) -> dis286::Result<()> {
    use dis286::IterItem;
    use serde::Serialize;

    #[derive(Serialize)]
    struct JsonLine {
        addr: u32,
        len: u8,
        bad: bool,
        text: String,
    }

    let mut lines = Vec::new();
    for item in dis.iter() {
        match item {
            IterItem::Insn(ins) => lines.push(JsonLine {
                addr: ins.addr,
                len: ins.len,
                bad: false,
                text: cursor.format_instruction(ins),
            }),
            IterItem::RawByte { addr, byte } => lines.push(JsonLine {
                addr,
                len: 1,
                bad: true,
                text: format!("db 0x{:02X}", byte),
            }),
        }
    }

    println!("{}", serde_json::to_string_pretty(&lines)?);
    Ok(())
}

fn print_short(dis: &Disassembly, cursor: &FmtCursor) {
    use dis286::IterItem;

    for item in dis.iter() {
        match item {
            IterItem::Insn(ins) => {
                println!("{:08X}\t{}", ins.addr, cursor.format_instruction(ins));
            }
            IterItem::RawByte { addr, byte } => {
                println!("{:08X}\tdb 0x{:02X}", addr, byte);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_base() {
        assert_eq!(parse_hex_u32("0x100").unwrap(), 0x100);
        assert_eq!(parse_hex_u32("100").unwrap(), 100);
    }

    #[test]
    fn args_default_format_is_human() {
        let args = Args::try_parse_from(["dis286", "test.bin"]).unwrap();
        assert!(matches!(args.format, OutputFormat::Human));
        assert_eq!(args.base, 0x100);
        assert!(args.entries.is_empty());
    }

    #[test]
    fn args_accept_repeated_entry_flags() {
        let args =
            Args::try_parse_from(["dis286", "-e", "0x100", "-e", "0x200", "test.bin"]).unwrap();
        assert_eq!(args.entries, vec![0x100, 0x200]);
    }

    #[test]
    fn args_accept_json_format() {
        let args = Args::try_parse_from(["dis286", "-f", "json", "test.bin"]).unwrap();
        assert!(matches!(args.format, OutputFormat::Json));
    }

    #[test]
    fn args_default_color_is_off() {
        let args = Args::try_parse_from(["dis286", "test.bin"]).unwrap();
        assert!(!args.color);
    }

    #[test]
    fn args_accept_dec_imm_flag() {
        let args = Args::try_parse_from(["dis286", "--dec-imm", "test.bin"]).unwrap();
        assert!(args.dec_imm);
        assert!(!args.hex_imm);
    }

    #[test]
    fn args_reject_hex_imm_and_dec_imm_together() {
        let err = Args::try_parse_from(["dis286", "--hex-imm", "--dec-imm", "test.bin"]);
        assert!(err.is_err());
    }

    #[test]
    fn args_reject_jmp_addr_and_jmp_both_together() {
        let err = Args::try_parse_from(["dis286", "--jmp-addr", "--jmp-both", "test.bin"]);
        assert!(err.is_err());
    }

    #[test]
    fn args_accept_jmp_both_flag() {
        let args = Args::try_parse_from(["dis286", "--jmp-both", "test.bin"]).unwrap();
        assert!(args.jmp_both);
    }

    #[test]
    fn color_hooks_wrap_mnemonic_and_operands_in_ansi_escapes() {
        use dis286::decode::context::DecodeContext;
        use dis286::decode::decode;

        let bytes = [0xB8, 0x34, 0x12]; // mov ax, 0x1234
        let mut ctx = DecodeContext::new(&bytes, 0x100, 0x100);
        let ins = decode(&mut ctx);

        let cursor = FmtCursor::new(FormatOptions::empty(), &ColorHooks);
        let rendered = cursor.format_instruction(&ins);
        assert!(rendered.starts_with("\x1b[1;36mmov\x1b[0m "));
        assert!(rendered.contains("\x1b[32max\x1b[0m"));
    }
}
