//! Operand representation: registers, segment registers, immediates and
//! memory expressions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 286 general-purpose register, 8-bit or 16-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gpr {
    Al,
    Cl,
    Dl,
    Bl,
    Ah,
    Ch,
    Dh,
    Bh,
    Ax,
    Cx,
    Dx,
    Bx,
    Sp,
    Bp,
    Si,
    Di,
}

impl Gpr {
    /// Decode an 8-bit register field (0..=7).
    pub fn from_byte_field(reg: u8) -> Self {
        match reg & 0x07 {
            0 => Gpr::Al,
            1 => Gpr::Cl,
            2 => Gpr::Dl,
            3 => Gpr::Bl,
            4 => Gpr::Ah,
            5 => Gpr::Ch,
            6 => Gpr::Dh,
            _ => Gpr::Bh,
        }
    }

    /// Decode a 16-bit register field (0..=7).
    pub fn from_word_field(reg: u8) -> Self {
        match reg & 0x07 {
            0 => Gpr::Ax,
            1 => Gpr::Cx,
            2 => Gpr::Dx,
            3 => Gpr::Bx,
            4 => Gpr::Sp,
            5 => Gpr::Bp,
            6 => Gpr::Si,
            _ => Gpr::Di,
        }
    }

    /// Decode a register field given a width flag (`false` = byte, `true` = word).
    pub fn from_field(reg: u8, wide: bool) -> Self {
        if wide {
            Self::from_word_field(reg)
        } else {
            Self::from_byte_field(reg)
        }
    }

    /// True for the eight 16-bit registers.
    pub fn is_wide(self) -> bool {
        matches!(
            self,
            Gpr::Ax | Gpr::Cx | Gpr::Dx | Gpr::Bx | Gpr::Sp | Gpr::Bp | Gpr::Si | Gpr::Di
        )
    }
}

impl fmt::Display for Gpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gpr::Al => "al",
            Gpr::Cl => "cl",
            Gpr::Dl => "dl",
            Gpr::Bl => "bl",
            Gpr::Ah => "ah",
            Gpr::Ch => "ch",
            Gpr::Dh => "dh",
            Gpr::Bh => "bh",
            Gpr::Ax => "ax",
            Gpr::Cx => "cx",
            Gpr::Dx => "dx",
            Gpr::Bx => "bx",
            Gpr::Sp => "sp",
            Gpr::Bp => "bp",
            Gpr::Si => "si",
            Gpr::Di => "di",
        };
        f.write_str(s)
    }
}

/// Segment register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SReg {
    Es,
    Cs,
    Ss,
    Ds,
}

impl SReg {
    /// Decode a 2-bit segment field; the top bits of a 3-bit reg field are ignored.
    pub fn from_field(reg: u8) -> Self {
        match reg & 0x03 {
            0 => SReg::Es,
            1 => SReg::Cs,
            2 => SReg::Ss,
            _ => SReg::Ds,
        }
    }
}

impl fmt::Display for SReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SReg::Es => "es",
            SReg::Cs => "cs",
            SReg::Ss => "ss",
            SReg::Ds => "ds",
        };
        f.write_str(s)
    }
}

/// Effective-address form selected by a ModR/M byte's (mod, rm) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddrMode {
    /// mod=00, rm=110: a bare 16-bit displacement, no base/index register.
    Abs,
    /// MOV AL/AX,moffs and moffs,AL/AX: a bare absolute offset (0xA0..0xA3).
    Moff,
    /// \[BX+SI\], default segment DS.
    BxSi,
    /// \[BX+DI\], default segment DS.
    BxDi,
    /// \[BP+SI\], default segment SS.
    BpSi,
    /// \[BP+DI\], default segment SS.
    BpDi,
    /// \[SI\], default segment DS.
    Si,
    /// \[DI\], default segment DS.
    Di,
    /// \[BP\], default segment SS (only valid with mod != 00, see the mod=00,rm=110 special case).
    Bp,
    /// \[BX\], default segment DS.
    Bx,
}

impl AddrMode {
    /// rm (0..=7) to addressing mode, for the general (non mod=00/rm=110) case.
    pub fn from_rm(rm: u8) -> Self {
        match rm & 0x07 {
            0 => AddrMode::BxSi,
            1 => AddrMode::BxDi,
            2 => AddrMode::BpSi,
            3 => AddrMode::BpDi,
            4 => AddrMode::Si,
            5 => AddrMode::Di,
            6 => AddrMode::Bp,
            _ => AddrMode::Bx,
        }
    }

    /// The implicit default segment for this addressing mode (DS unless BP-relative).
    pub fn default_segment(self) -> SReg {
        match self {
            AddrMode::BpSi | AddrMode::BpDi | AddrMode::Bp => SReg::Ss,
            _ => SReg::Ds,
        }
    }

    /// The register expression rendered inside the brackets, or `None` for
    /// `Abs`/`Moff` which have no base/index component.
    pub fn base_expr(self) -> Option<&'static str> {
        match self {
            AddrMode::Abs | AddrMode::Moff => None,
            AddrMode::BxSi => Some("bx+si"),
            AddrMode::BxDi => Some("bx+di"),
            AddrMode::BpSi => Some("bp+si"),
            AddrMode::BpDi => Some("bp+di"),
            AddrMode::Si => Some("si"),
            AddrMode::Di => Some("di"),
            AddrMode::Bp => Some("bp"),
            AddrMode::Bx => Some("bx"),
        }
    }
}

/// A decoded operand: exactly one of an immediate, register, segment
/// register, or memory expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// Raw 8-bit immediate bit pattern; sign interpretation is decode-time,
    /// not stored here.
    Imm8(u8),
    /// Raw 16-bit immediate bit pattern.
    Imm16(u16),
    /// Raw 32-bit immediate: used only for far pointers, packed as
    /// `(segment as u32) << 16 | offset as u32`.
    Imm32(u32),
    /// General-purpose register.
    Reg(Gpr),
    /// Segment register.
    Seg(SReg),
    /// Memory operand.
    Mem {
        /// Addressing mode (selects the base/index registers, if any).
        mode: AddrMode,
        /// Displacement, sign-extended to 16 bits (or the raw offset for `Abs`/`Moff`).
        disp: i16,
    },
}

impl Operand {
    /// Build an Imm32 far pointer operand from its segment:offset halves.
    pub fn far_ptr(segment: u16, offset: u16) -> Self {
        Operand::Imm32(((segment as u32) << 16) | offset as u32)
    }

    /// Split a far-pointer Imm32 back into (segment, offset); `None` for any
    /// other variant.
    pub fn as_far_ptr(self) -> Option<(u16, u16)> {
        match self {
            Operand::Imm32(packed) => Some(((packed >> 16) as u16, packed as u16)),
            _ => None,
        }
    }
}
