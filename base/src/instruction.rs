//! Symbolic representation of NMOS 6502 instructions.
//!
//! A 6502 instruction is a single opcode byte followed by zero, one
//! or two operand bytes.  The opcode byte determines both the
//! operation and the addressing mode, so the assembler's job for an
//! instruction is to pick the (mnemonic, addressing mode) pair and
//! look up the byte in the table defined in [`table`].
//!
//! Two-byte operands are little-endian.  Branch instructions take a
//! single signed displacement byte, relative to the address of the
//! instruction following the branch.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

#[cfg(test)]
use test_strategy::{proptest, Arbitrary};

mod table;

/// The addressing modes of the NMOS 6502.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(Arbitrary))]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// `JMP ($1234)`; the only absolute indirect form.
    Indirect,
    /// `LDA ($12,X)`
    IndirectX,
    /// `LDA ($12),Y`
    IndirectY,
    /// Branches, e.g. `BNE LOOP`.
    Relative,
}

impl AddressingMode {
    pub const ALL: [AddressingMode; 13] = [
        AddressingMode::Implied,
        AddressingMode::Accumulator,
        AddressingMode::Immediate,
        AddressingMode::ZeroPage,
        AddressingMode::ZeroPageX,
        AddressingMode::ZeroPageY,
        AddressingMode::Absolute,
        AddressingMode::AbsoluteX,
        AddressingMode::AbsoluteY,
        AddressingMode::Indirect,
        AddressingMode::IndirectX,
        AddressingMode::IndirectY,
        AddressingMode::Relative,
    ];

    /// Number of bytes following the opcode byte.
    #[must_use]
    pub const fn operand_len(self) -> u16 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::IndirectX
            | AddressingMode::IndirectY
            | AddressingMode::Relative => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
        }
    }

    /// Total length of an instruction using this mode, opcode byte
    /// included.
    #[must_use]
    pub const fn instruction_len(self) -> u16 {
        1 + self.operand_len()
    }

    /// The shorter zero-page form of an absolute mode, if there is
    /// one.
    #[must_use]
    pub const fn zero_page_form(self) -> Option<AddressingMode> {
        match self {
            AddressingMode::Absolute => Some(AddressingMode::ZeroPage),
            AddressingMode::AbsoluteX => Some(AddressingMode::ZeroPageX),
            AddressingMode::AbsoluteY => Some(AddressingMode::ZeroPageY),
            _ => None,
        }
    }

    /// True for the modes whose operand is a zero-page address
    /// (including the two indirect-indexed forms).
    #[must_use]
    pub const fn is_zero_page(self) -> bool {
        matches!(
            self,
            AddressingMode::ZeroPage
                | AddressingMode::ZeroPageX
                | AddressingMode::ZeroPageY
                | AddressingMode::IndirectX
                | AddressingMode::IndirectY
        )
    }
}

impl Display for AddressingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AddressingMode::Implied => "implied",
            AddressingMode::Accumulator => "accumulator",
            AddressingMode::Immediate => "immediate",
            AddressingMode::ZeroPage => "zeropage",
            AddressingMode::ZeroPageX => "zeropage-x",
            AddressingMode::ZeroPageY => "zeropage-y",
            AddressingMode::Absolute => "absolute",
            AddressingMode::AbsoluteX => "absolute-x",
            AddressingMode::AbsoluteY => "absolute-y",
            AddressingMode::Indirect => "jmp-indirect",
            AddressingMode::IndirectX => "indirect-x",
            AddressingMode::IndirectY => "indirect-y",
            AddressingMode::Relative => "relative",
        })
    }
}

/// One mnemonic together with the opcode byte it assembles to in
/// each addressing mode it supports.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Opcode {
    mnemonic: &'static str,
    encodings: &'static [(AddressingMode, u8)],
}

impl Opcode {
    pub(crate) const fn new(
        mnemonic: &'static str,
        encodings: &'static [(AddressingMode, u8)],
    ) -> Opcode {
        Opcode {
            mnemonic,
            encodings,
        }
    }

    /// The (upper case) mnemonic.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        self.mnemonic
    }

    #[must_use]
    pub fn encoding(&self, mode: AddressingMode) -> Option<u8> {
        self.encodings
            .iter()
            .find_map(|(m, byte)| if *m == mode { Some(*byte) } else { None })
    }

    #[must_use]
    pub fn supports(&self, mode: AddressingMode) -> bool {
        self.encoding(mode).is_some()
    }

    /// Branches support only relative addressing.
    #[must_use]
    pub fn is_branch(&self) -> bool {
        self.supports(AddressingMode::Relative)
    }

    pub fn modes(&self) -> impl Iterator<Item = AddressingMode> + '_ {
        self.encodings.iter().map(|(mode, _)| *mode)
    }

    pub fn encodings(&self) -> impl Iterator<Item = (AddressingMode, u8)> + '_ {
        self.encodings.iter().copied()
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic)
    }
}

/// All the documented NMOS 6502 mnemonics, in alphabetical order.
#[must_use]
pub fn opcodes() -> &'static [Opcode] {
    &table::OPCODES
}

/// Look up a mnemonic, ignoring case.
#[must_use]
pub fn lookup_opcode(name: &str) -> Option<&'static Opcode> {
    let wanted = name.bytes().map(|b| b.to_ascii_uppercase());
    table::OPCODES
        .binary_search_by(|op| op.mnemonic.bytes().cmp(wanted.clone()))
        .ok()
        .map(|index| &table::OPCODES[index])
}

/// Find the mnemonic and addressing mode which an opcode byte
/// encodes.  Undocumented opcodes yield `None`.
#[must_use]
pub fn decode(byte: u8) -> Option<(&'static Opcode, AddressingMode)> {
    table::OPCODES.iter().find_map(|op| {
        op.encodings
            .iter()
            .find(|(_, b)| *b == byte)
            .map(|(mode, _)| (op, *mode))
    })
}
