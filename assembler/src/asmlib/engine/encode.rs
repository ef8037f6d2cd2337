//! Instruction encoding.
//!
//! The addressing mode is chosen in two steps.  The parser records
//! the syntax the operand was written in; here that becomes a real
//! addressing mode of the instruction, taking the zero-page form of
//! an absolute operand when its value is known to fit.
use base::prelude::{lookup_opcode, AddressingMode, Opcode};

use super::super::ast::{AddressingSyntax, Statement};
use super::super::types::{Diagnostic, DiagnosticKind};
use super::{Layout, RunState};

/// The mode to use for an operand written as `absolute` (or
/// `absolute,X` or `absolute,Y`).  When `narrow` is set the
/// zero-page form is preferred.
fn indexable(opcode: &Opcode, absolute: AddressingMode, narrow: bool) -> Option<AddressingMode> {
    let zero_page = absolute.zero_page_form();
    let candidates = if narrow {
        [zero_page, Some(absolute)]
    } else {
        [Some(absolute), zero_page]
    };
    candidates.into_iter().flatten().find(|mode| opcode.supports(*mode))
}

/// Choose the addressing mode for an instruction.  `narrow` says
/// whether the operand is known to be a zero-page address.
pub(crate) fn select_mode(
    opcode: &Opcode,
    syntax: Option<AddressingSyntax>,
    narrow: bool,
) -> Result<AddressingMode, String> {
    let mnemonic = opcode.mnemonic();
    if opcode.is_branch() {
        return Ok(AddressingMode::Relative);
    }
    let only = |mode: AddressingMode| {
        if opcode.supports(mode) {
            Ok(mode)
        } else {
            Err(format!("{mnemonic} does not support {mode} addressing"))
        }
    };
    match syntax {
        None => [AddressingMode::Implied, AddressingMode::Accumulator]
            .into_iter()
            .find(|mode| opcode.supports(*mode))
            .ok_or_else(|| format!("{mnemonic} needs an operand")),
        Some(AddressingSyntax::Accumulator) => {
            if opcode.supports(AddressingMode::Accumulator) {
                Ok(AddressingMode::Accumulator)
            } else {
                // `A` is then just a symbol.
                indexable(opcode, AddressingMode::Absolute, narrow)
                    .ok_or_else(|| format!("{mnemonic} does not support accumulator addressing"))
            }
        }
        Some(
            AddressingSyntax::Immediate
            | AddressingSyntax::ImmediateLow
            | AddressingSyntax::ImmediateHigh,
        ) => only(AddressingMode::Immediate),
        Some(AddressingSyntax::Indirect) => only(AddressingMode::Indirect),
        Some(AddressingSyntax::IndirectX) => only(AddressingMode::IndirectX),
        Some(AddressingSyntax::IndirectY) => only(AddressingMode::IndirectY),
        Some(AddressingSyntax::Absolute) => indexable(opcode, AddressingMode::Absolute, narrow)
            .ok_or_else(|| format!("{mnemonic} does not support absolute addressing")),
        Some(AddressingSyntax::AbsoluteX) => indexable(opcode, AddressingMode::AbsoluteX, narrow)
            .ok_or_else(|| format!("{mnemonic} does not support X-indexed addressing")),
        Some(AddressingSyntax::AbsoluteY) => indexable(opcode, AddressingMode::AbsoluteY, narrow)
            .ok_or_else(|| format!("{mnemonic} does not support Y-indexed addressing")),
    }
}

/// The offset byte of a branch at `pc` to `target`, and whether the
/// target is in range.
pub(crate) fn branch_offset(pc: u16, target: u16) -> (u8, bool) {
    let offset = i32::from(target) - (i32::from(pc) + 2);
    (offset.to_le_bytes()[0], (-128..=127).contains(&offset))
}

impl RunState {
    pub(super) fn instruction(&mut self, index: usize, mnemonic: &str, statement: &Statement) {
        let position = Some(statement.position);
        let Some(opcode) = lookup_opcode(mnemonic) else {
            self.diagnose(Diagnostic::error(
                DiagnosticKind::UnknownOpcode,
                position,
                format!("unknown opcode {mnemonic}"),
            ));
            return;
        };
        if statement.trailing_junk
            || (statement.addressing.is_none() && !statement.operand_tokens.is_empty())
        {
            self.diagnose(Diagnostic::error(
                DiagnosticKind::InvalidAddressingMode,
                position,
                format!("cannot understand operand {}", statement.operand_text()),
            ));
            return;
        }
        // In `ASL A` the `A` names the register, not a symbol.
        let accumulator = statement.addressing == Some(AddressingSyntax::Accumulator)
            && opcode.supports(AddressingMode::Accumulator);
        let evaluation = statement
            .operand
            .as_ref()
            .filter(|_| !accumulator)
            .map(|expr| self.evaluate(expr, statement.position));
        let value: u16 = evaluation.as_ref().map_or(0, |e| e.value);

        let mode = match self.decision(index) {
            Some(Layout::Instruction(mode)) => mode,
            _ => {
                let narrow = evaluation
                    .as_ref()
                    .is_some_and(|e| e.is_defined() && !e.external && e.value <= 0xFF);
                match select_mode(opcode, statement.addressing, narrow) {
                    Ok(mode) => {
                        self.decide(index, Layout::Instruction(mode));
                        mode
                    }
                    Err(msg) => {
                        self.diagnose(Diagnostic::error(
                            DiagnosticKind::InvalidAddressingMode,
                            position,
                            msg,
                        ));
                        return;
                    }
                }
            }
        };
        let Some(opcode_byte) = opcode.encoding(mode) else {
            self.diagnose(Diagnostic::error(
                DiagnosticKind::InvalidAddressingMode,
                position,
                format!("{mnemonic} does not support {mode} addressing"),
            ));
            return;
        };
        if mode.operand_len() > 0 && statement.operand.is_none() {
            self.diagnose(Diagnostic::error(
                DiagnosticKind::MissingOperand,
                position,
                format!("{mnemonic} needs an operand"),
            ));
        }

        let mut bytes: Vec<u8> = Vec::with_capacity(3);
        bytes.push(opcode_byte);
        match mode {
            AddressingMode::Implied | AddressingMode::Accumulator => (),
            AddressingMode::Relative => {
                let (offset, in_range) = branch_offset(self.pc, value);
                if !in_range {
                    self.diagnose(Diagnostic::error(
                        DiagnosticKind::BranchOutOfRange,
                        position,
                        format!("branch from ${:04X} to ${value:04X} is out of range", self.pc),
                    ));
                }
                bytes.push(offset);
            }
            AddressingMode::Immediate => {
                let byte = match statement.addressing {
                    Some(AddressingSyntax::ImmediateHigh) => value.to_be_bytes()[0],
                    Some(AddressingSyntax::ImmediateLow) => value.to_le_bytes()[0],
                    _ => {
                        if value > 0xFF {
                            self.diagnose(Diagnostic::warning(
                                DiagnosticKind::ValueOutOfRange,
                                position,
                                format!("immediate value ${value:04X} truncated to 8 bits"),
                            ));
                        }
                        value.to_le_bytes()[0]
                    }
                };
                bytes.push(byte);
            }
            zero_page if zero_page.operand_len() == 1 => {
                if value > 0xFF {
                    self.diagnose(Diagnostic::error(
                        DiagnosticKind::ValueOutOfRange,
                        position,
                        format!("${value:04X} is not a zero-page address"),
                    ));
                }
                bytes.push(value.to_le_bytes()[0]);
            }
            _ => bytes.extend(value.to_le_bytes()),
        }

        let references_symbol = statement
            .operand
            .as_ref()
            .is_some_and(|expr| expr.references_symbol());
        if references_symbol {
            let operand_address = self.pc.wrapping_add(1);
            if mode.operand_len() == 2 {
                self.relocate(operand_address, 2);
            } else if matches!(
                statement.addressing,
                Some(AddressingSyntax::ImmediateLow | AddressingSyntax::ImmediateHigh)
            ) {
                self.relocate(operand_address, 1);
            }
        }
        self.emit(&bytes);
    }
}
