//! The prelude exports the items which are useful in representing
//! 6502 instructions.  Providing this prelude is the main purpose of
//! the base crate.
pub use super::instruction::{decode, lookup_opcode, opcodes, AddressingMode, Opcode};
