//! The 286 mnemonic set, plus `Bad` and the prefix pseudo-ops.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every mnemonic the decoder can produce, plus `Bad` (decode failure) and
/// the seven prefix pseudo-ops.
///
/// Far/near/short variants of jump, call and return are always distinct
/// variants (`Jmp` vs `JmpFar`, `Call` vs `CallFar`, `Ret` vs `RetFar`) —
/// never collapsed behind a flag. See `SPEC_FULL.md` REDESIGN FLAGS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Opcode {
    Bad,

    // Prefix pseudo-ops
    PreLock,
    PreRep,
    PreRepne,
    PreCs,
    PreDs,
    PreEs,
    PreSs,

    // Data movement
    Mov,
    Push,
    Pop,
    Pusha,
    Popa,
    Xchg,
    Lea,
    Les,
    Lds,
    Xlat,
    In,
    Out,

    // Arithmetic / logic (group 1 + accumulator forms)
    Add,
    Or,
    Adc,
    Sbb,
    And,
    Sub,
    Xor,
    Cmp,
    Inc,
    Dec,
    Neg,
    Not,
    Mul,
    Imul,
    Div,
    Idiv,
    Test,
    Aaa,
    Aas,
    Aam,
    Aad,
    Daa,
    Das,
    Cbw,
    Cwd,

    // Shift / rotate (group 2)
    Rol,
    Ror,
    Rcl,
    Rcr,
    Shl,
    Shr,
    Sar,

    // Control transfer
    Call,
    CallFar,
    Jmp,
    JmpFar,
    Ret,
    RetFar,
    Jo,
    Jno,
    Jb,
    Jnb,
    Je,
    Jne,
    Jbe,
    Ja,
    Js,
    Jns,
    Jp,
    Jnp,
    Jl,
    Jge,
    Jle,
    Jg,
    Jcxz,
    Loop,
    Loopz,
    Loopnz,
    Int,
    Int3,
    Int1,
    Into,
    Iret,

    // Flags
    Clc,
    Stc,
    Cmc,
    Cld,
    Std,
    Cli,
    Sti,
    Lahf,
    Sahf,
    Pushf,
    Popf,

    // Misc / system
    Hlt,
    Wait,
    Nop,
    Enter,
    Leave,
    Bound,
    Arpl,

    // String operations
    MovsB,
    MovsW,
    CmpsB,
    CmpsW,
    StosB,
    StosW,
    LodsB,
    LodsW,
    ScasB,
    ScasW,
    InsB,
    InsW,
    OutsB,
    OutsW,

    // Protected-mode descriptor / privileged instructions (286 opcode space;
    // they still decode statically even though they trap outside protected
    // mode — this disassembler never executes anything).
    Sgdt,
    Sidt,
    Lgdt,
    Lidt,
    Smsw,
    Lmsw,
    Sldt,
    Str,
    Lldt,
    Ltr,
    Verr,
    Verw,
    Clts,
    Lar,
}

impl Opcode {
    /// True for `Jmp, JmpFar, Ret, RetFar, Iret` — the instructions whose
    /// normal successor is never the textual fall-through.
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            Opcode::Jmp | Opcode::JmpFar | Opcode::Ret | Opcode::RetFar | Opcode::Iret
        )
    }

    /// True for every terminator plus conditional jumps, `JCXZ`,
    /// `LOOP`/`LOOPZ`/`LOOPNZ`, and `CALL`/`CALLF`.
    pub fn is_branch(self) -> bool {
        if self.is_terminator() {
            return true;
        }
        matches!(
            self,
            Opcode::Call
                | Opcode::CallFar
                | Opcode::Jo
                | Opcode::Jno
                | Opcode::Jb
                | Opcode::Jnb
                | Opcode::Je
                | Opcode::Jne
                | Opcode::Jbe
                | Opcode::Ja
                | Opcode::Js
                | Opcode::Jns
                | Opcode::Jp
                | Opcode::Jnp
                | Opcode::Jl
                | Opcode::Jge
                | Opcode::Jle
                | Opcode::Jg
                | Opcode::Jcxz
                | Opcode::Loop
                | Opcode::Loopz
                | Opcode::Loopnz
        )
    }

    /// True for the seven prefix pseudo-ops.
    pub fn is_prefix(self) -> bool {
        matches!(
            self,
            Opcode::PreLock
                | Opcode::PreRep
                | Opcode::PreRepne
                | Opcode::PreCs
                | Opcode::PreDs
                | Opcode::PreEs
                | Opcode::PreSs
        )
    }

    /// True iff this is a conditional jump (`Jo`..`Jg`, `Jcxz`).
    pub fn is_conditional_jump(self) -> bool {
        matches!(
            self,
            Opcode::Jo
                | Opcode::Jno
                | Opcode::Jb
                | Opcode::Jnb
                | Opcode::Je
                | Opcode::Jne
                | Opcode::Jbe
                | Opcode::Ja
                | Opcode::Js
                | Opcode::Jns
                | Opcode::Jp
                | Opcode::Jnp
                | Opcode::Jl
                | Opcode::Jge
                | Opcode::Jle
                | Opcode::Jg
                | Opcode::Jcxz
        )
    }

    /// Mnemonic text as it appears in a listing.
    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Bad => "db",
            PreLock => "lock",
            PreRep => "rep",
            PreRepne => "repne",
            PreCs => "seg cs",
            PreDs => "seg ds",
            PreEs => "seg es",
            PreSs => "seg ss",
            Mov => "mov",
            Push => "push",
            Pop => "pop",
            Pusha => "pusha",
            Popa => "popa",
            Xchg => "xchg",
            Lea => "lea",
            Les => "les",
            Lds => "lds",
            Xlat => "xlat",
            In => "in",
            Out => "out",
            Add => "add",
            Or => "or",
            Adc => "adc",
            Sbb => "sbb",
            And => "and",
            Sub => "sub",
            Xor => "xor",
            Cmp => "cmp",
            Inc => "inc",
            Dec => "dec",
            Neg => "neg",
            Not => "not",
            Mul => "mul",
            Imul => "imul",
            Div => "div",
            Idiv => "idiv",
            Test => "test",
            Aaa => "aaa",
            Aas => "aas",
            Aam => "aam",
            Aad => "aad",
            Daa => "daa",
            Das => "das",
            Cbw => "cbw",
            Cwd => "cwd",
            Rol => "rol",
            Ror => "ror",
            Rcl => "rcl",
            Rcr => "rcr",
            Shl => "shl",
            Shr => "shr",
            Sar => "sar",
            Call => "call",
            CallFar => "call",
            Jmp => "jmp",
            JmpFar => "jmp",
            Ret => "ret",
            RetFar => "retf",
            Jo => "jo",
            Jno => "jno",
            Jb => "jb",
            Jnb => "jnb",
            Je => "je",
            Jne => "jne",
            Jbe => "jbe",
            Ja => "ja",
            Js => "js",
            Jns => "jns",
            Jp => "jp",
            Jnp => "jnp",
            Jl => "jl",
            Jge => "jge",
            Jle => "jle",
            Jg => "jg",
            Jcxz => "jcxz",
            Loop => "loop",
            Loopz => "loopz",
            Loopnz => "loopnz",
            Int => "int",
            Int3 => "int3",
            Int1 => "int1",
            Into => "into",
            Iret => "iret",
            Clc => "clc",
            Stc => "stc",
            Cmc => "cmc",
            Cld => "cld",
            Std => "std",
            Cli => "cli",
            Sti => "sti",
            Lahf => "lahf",
            Sahf => "sahf",
            Pushf => "pushf",
            Popf => "popf",
            Hlt => "hlt",
            Wait => "wait",
            Nop => "nop",
            Enter => "enter",
            Leave => "leave",
            Bound => "bound",
            Arpl => "arpl",
            MovsB => "movsb",
            MovsW => "movsw",
            CmpsB => "cmpsb",
            CmpsW => "cmpsw",
            StosB => "stosb",
            StosW => "stosw",
            LodsB => "lodsb",
            LodsW => "lodsw",
            ScasB => "scasb",
            ScasW => "scasw",
            InsB => "insb",
            InsW => "insw",
            OutsB => "outsb",
            OutsW => "outsw",
            Sgdt => "sgdt",
            Sidt => "sidt",
            Lgdt => "lgdt",
            Lidt => "lidt",
            Smsw => "smsw",
            Lmsw => "lmsw",
            Sldt => "sldt",
            Str => "str",
            Lldt => "lldt",
            Ltr => "ltr",
            Verr => "verr",
            Verw => "verw",
            Clts => "clts",
            Lar => "lar",
        }
    }

    /// True iff this opcode has a distinct far-call/far-jump/far-ret form
    /// that the formatter should prefix with `far`.
    pub fn is_far_variant(self) -> bool {
        matches!(self, Opcode::CallFar | Opcode::JmpFar | Opcode::RetFar)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
