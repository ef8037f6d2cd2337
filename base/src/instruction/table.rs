//! The documented NMOS 6502 instruction set.
//!
//! Entries must stay in alphabetical order of mnemonic, because
//! [`super::lookup_opcode`] uses a binary search.
use super::AddressingMode::*;
use super::Opcode;

pub(super) static OPCODES: [Opcode; 56] = [
    Opcode::new(
        "ADC",
        &[
            (Immediate, 0x69),
            (ZeroPage, 0x65),
            (ZeroPageX, 0x75),
            (Absolute, 0x6D),
            (AbsoluteX, 0x7D),
            (AbsoluteY, 0x79),
            (IndirectX, 0x61),
            (IndirectY, 0x71),
        ],
    ),
    Opcode::new(
        "AND",
        &[
            (Immediate, 0x29),
            (ZeroPage, 0x25),
            (ZeroPageX, 0x35),
            (Absolute, 0x2D),
            (AbsoluteX, 0x3D),
            (AbsoluteY, 0x39),
            (IndirectX, 0x21),
            (IndirectY, 0x31),
        ],
    ),
    Opcode::new(
        "ASL",
        &[
            (Accumulator, 0x0A),
            (ZeroPage, 0x06),
            (ZeroPageX, 0x16),
            (Absolute, 0x0E),
            (AbsoluteX, 0x1E),
        ],
    ),
    Opcode::new("BCC", &[(Relative, 0x90)]),
    Opcode::new("BCS", &[(Relative, 0xB0)]),
    Opcode::new("BEQ", &[(Relative, 0xF0)]),
    Opcode::new("BIT", &[(ZeroPage, 0x24), (Absolute, 0x2C)]),
    Opcode::new("BMI", &[(Relative, 0x30)]),
    Opcode::new("BNE", &[(Relative, 0xD0)]),
    Opcode::new("BPL", &[(Relative, 0x10)]),
    Opcode::new("BRK", &[(Implied, 0x00)]),
    Opcode::new("BVC", &[(Relative, 0x50)]),
    Opcode::new("BVS", &[(Relative, 0x70)]),
    Opcode::new("CLC", &[(Implied, 0x18)]),
    Opcode::new("CLD", &[(Implied, 0xD8)]),
    Opcode::new("CLI", &[(Implied, 0x58)]),
    Opcode::new("CLV", &[(Implied, 0xB8)]),
    Opcode::new(
        "CMP",
        &[
            (Immediate, 0xC9),
            (ZeroPage, 0xC5),
            (ZeroPageX, 0xD5),
            (Absolute, 0xCD),
            (AbsoluteX, 0xDD),
            (AbsoluteY, 0xD9),
            (IndirectX, 0xC1),
            (IndirectY, 0xD1),
        ],
    ),
    Opcode::new(
        "CPX",
        &[(Immediate, 0xE0), (ZeroPage, 0xE4), (Absolute, 0xEC)],
    ),
    Opcode::new(
        "CPY",
        &[(Immediate, 0xC0), (ZeroPage, 0xC4), (Absolute, 0xCC)],
    ),
    Opcode::new(
        "DEC",
        &[
            (ZeroPage, 0xC6),
            (ZeroPageX, 0xD6),
            (Absolute, 0xCE),
            (AbsoluteX, 0xDE),
        ],
    ),
    Opcode::new("DEX", &[(Implied, 0xCA)]),
    Opcode::new("DEY", &[(Implied, 0x88)]),
    Opcode::new(
        "EOR",
        &[
            (Immediate, 0x49),
            (ZeroPage, 0x45),
            (ZeroPageX, 0x55),
            (Absolute, 0x4D),
            (AbsoluteX, 0x5D),
            (AbsoluteY, 0x59),
            (IndirectX, 0x41),
            (IndirectY, 0x51),
        ],
    ),
    Opcode::new(
        "INC",
        &[
            (ZeroPage, 0xE6),
            (ZeroPageX, 0xF6),
            (Absolute, 0xEE),
            (AbsoluteX, 0xFE),
        ],
    ),
    Opcode::new("INX", &[(Implied, 0xE8)]),
    Opcode::new("INY", &[(Implied, 0xC8)]),
    Opcode::new("JMP", &[(Absolute, 0x4C), (Indirect, 0x6C)]),
    Opcode::new("JSR", &[(Absolute, 0x20)]),
    Opcode::new(
        "LDA",
        &[
            (Immediate, 0xA9),
            (ZeroPage, 0xA5),
            (ZeroPageX, 0xB5),
            (Absolute, 0xAD),
            (AbsoluteX, 0xBD),
            (AbsoluteY, 0xB9),
            (IndirectX, 0xA1),
            (IndirectY, 0xB1),
        ],
    ),
    Opcode::new(
        "LDX",
        &[
            (Immediate, 0xA2),
            (ZeroPage, 0xA6),
            (ZeroPageY, 0xB6),
            (Absolute, 0xAE),
            (AbsoluteY, 0xBE),
        ],
    ),
    Opcode::new(
        "LDY",
        &[
            (Immediate, 0xA0),
            (ZeroPage, 0xA4),
            (ZeroPageX, 0xB4),
            (Absolute, 0xAC),
            (AbsoluteX, 0xBC),
        ],
    ),
    Opcode::new(
        "LSR",
        &[
            (Accumulator, 0x4A),
            (ZeroPage, 0x46),
            (ZeroPageX, 0x56),
            (Absolute, 0x4E),
            (AbsoluteX, 0x5E),
        ],
    ),
    Opcode::new("NOP", &[(Implied, 0xEA)]),
    Opcode::new(
        "ORA",
        &[
            (Immediate, 0x09),
            (ZeroPage, 0x05),
            (ZeroPageX, 0x15),
            (Absolute, 0x0D),
            (AbsoluteX, 0x1D),
            (AbsoluteY, 0x19),
            (IndirectX, 0x01),
            (IndirectY, 0x11),
        ],
    ),
    Opcode::new("PHA", &[(Implied, 0x48)]),
    Opcode::new("PHP", &[(Implied, 0x08)]),
    Opcode::new("PLA", &[(Implied, 0x68)]),
    Opcode::new("PLP", &[(Implied, 0x28)]),
    Opcode::new(
        "ROL",
        &[
            (Accumulator, 0x2A),
            (ZeroPage, 0x26),
            (ZeroPageX, 0x36),
            (Absolute, 0x2E),
            (AbsoluteX, 0x3E),
        ],
    ),
    Opcode::new(
        "ROR",
        &[
            (Accumulator, 0x6A),
            (ZeroPage, 0x66),
            (ZeroPageX, 0x76),
            (Absolute, 0x6E),
            (AbsoluteX, 0x7E),
        ],
    ),
    Opcode::new("RTI", &[(Implied, 0x40)]),
    Opcode::new("RTS", &[(Implied, 0x60)]),
    Opcode::new(
        "SBC",
        &[
            (Immediate, 0xE9),
            (ZeroPage, 0xE5),
            (ZeroPageX, 0xF5),
            (Absolute, 0xED),
            (AbsoluteX, 0xFD),
            (AbsoluteY, 0xF9),
            (IndirectX, 0xE1),
            (IndirectY, 0xF1),
        ],
    ),
    Opcode::new("SEC", &[(Implied, 0x38)]),
    Opcode::new("SED", &[(Implied, 0xF8)]),
    Opcode::new("SEI", &[(Implied, 0x78)]),
    Opcode::new(
        "STA",
        &[
            (ZeroPage, 0x85),
            (ZeroPageX, 0x95),
            (Absolute, 0x8D),
            (AbsoluteX, 0x9D),
            (AbsoluteY, 0x99),
            (IndirectX, 0x81),
            (IndirectY, 0x91),
        ],
    ),
    Opcode::new("STX", &[(ZeroPage, 0x86), (ZeroPageY, 0x96), (Absolute, 0x8E)]),
    Opcode::new("STY", &[(ZeroPage, 0x84), (ZeroPageX, 0x94), (Absolute, 0x8C)]),
    Opcode::new("TAX", &[(Implied, 0xAA)]),
    Opcode::new("TAY", &[(Implied, 0xA8)]),
    Opcode::new("TSX", &[(Implied, 0xBA)]),
    Opcode::new("TXA", &[(Implied, 0x8A)]),
    Opcode::new("TXS", &[(Implied, 0x9A)]),
    Opcode::new("TYA", &[(Implied, 0x98)]),
];
