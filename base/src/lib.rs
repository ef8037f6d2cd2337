//! The `base` crate defines the 6502-related things which are useful
//! in both an assembler and other associated tools.  The idea is that
//! if you want to write a disassembler or an emulator, it would
//! depend on the base crate but would not need to depend on the
//! assembler library itself.

pub mod instruction;
pub mod prelude;
