//! The two-pass assembler engine.
//!
//! Both passes are a fold of [`RunState::step`] over the final
//! statement list.  The first pass finds the value of every label;
//! the second generates code, relocation entries and the listing.
//!
//! The size of each statement must be the same in both passes, or
//! the labels found in the first pass would be wrong.  So where the
//! size of a statement depends on a value which might change between
//! the passes (a zero-page operand, a `DS` count, an `ORG` address)
//! the first pass records its decision as a [`Layout`] and the second
//! pass follows it.
use serde::Serialize;
use tracing::{event, Level};

use base::prelude::AddressingMode;

use super::ast::{Expression, Statement};
use super::directive::Directive;
use super::eval::{evaluate, Evaluation, EvaluationContext};
use super::lexer::TokenKind;
use super::listing::{Listing, ListingRecord};
use super::source::SourcePosition;
use super::symbol::{strip_quotes, SymbolName};
use super::symtab::{Redefinition, SymbolTable};
use super::types::{Diagnostic, DiagnosticKind};

mod conditional;
mod data;
mod encode;

use conditional::ConditionStack;

/// A place in the output which the linker must adjust when the
/// program is loaded at a different address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RelocationEntry {
    /// Address of the first byte to adjust.
    pub address: u16,
    /// 1 for a single byte, 2 for a (little-endian) word.
    pub size: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    One,
    Two,
}

/// A first-pass decision about the size or placement of a
/// statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    Instruction(AddressingMode),
    Reserve(u16),
    Origin(u16),
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EngineOptions {
    pub(crate) listing: bool,
    pub(crate) msb_default_on: bool,
}

#[derive(Debug)]
pub(crate) struct EngineOutput {
    pub(crate) bytes: Vec<u8>,
    pub(crate) symbols: SymbolTable,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) relocatable: bool,
    pub(crate) rld: Vec<RelocationEntry>,
    pub(crate) externals: Vec<SymbolName>,
    pub(crate) entries: Vec<SymbolName>,
    pub(crate) listing: Option<String>,
}

#[derive(Debug)]
pub(crate) struct RunState {
    options: EngineOptions,
    pass: Pass,
    pc: u16,
    msb: bool,
    in_dsect: bool,
    relocatable: bool,
    conditions: ConditionStack,
    symbols: SymbolTable,
    layout: Vec<Option<Layout>>,
    bytes: Vec<u8>,
    /// Bytes generated by the current statement, for the listing.
    statement_bytes: Vec<u8>,
    /// Value of the current statement (for `EQU`), for the listing.
    statement_value: Option<u16>,
    rld: Vec<RelocationEntry>,
    externals: Vec<SymbolName>,
    entries: Vec<SymbolName>,
    diagnostics: Vec<Diagnostic>,
    listing: Option<Listing>,
}

/// Push `name` onto `names` unless it is already there.
fn push_unique(names: &mut Vec<SymbolName>, name: SymbolName) {
    if !names.contains(&name) {
        names.push(name);
    }
}

/// The names in a comma-separated operand such as that of `EXTRN`.
fn name_list(statement: &Statement) -> Vec<SymbolName> {
    statement
        .operand_tokens
        .split(|t| t.kind == TokenKind::Comma)
        .map(|group| group.iter().map(|t| t.lexeme.as_str()).collect::<String>())
        .map(|text| strip_quotes(text.trim()).trim().to_string())
        .filter(|name| !name.is_empty())
        .map(SymbolName::from)
        .collect()
}

/// Interpret an `ON`/`OFF` operand.  No operand means on; anything
/// else is evaluated as a number.
fn switch_setting(operand_text: &str) -> Option<bool> {
    if operand_text.is_empty() || operand_text.eq_ignore_ascii_case("ON") {
        Some(true)
    } else if operand_text.eq_ignore_ascii_case("OFF") {
        Some(false)
    } else {
        None
    }
}

impl RunState {
    fn new(statement_count: usize, options: EngineOptions) -> RunState {
        RunState {
            options,
            pass: Pass::One,
            pc: 0,
            msb: options.msb_default_on,
            in_dsect: false,
            relocatable: false,
            conditions: ConditionStack::default(),
            symbols: SymbolTable::default(),
            layout: vec![None; statement_count],
            bytes: Vec::new(),
            statement_bytes: Vec::new(),
            statement_value: None,
            rld: Vec::new(),
            externals: Vec::new(),
            entries: Vec::new(),
            diagnostics: Vec::new(),
            listing: None,
        }
    }

    /// Start the second pass.  The symbol table, the layout decisions
    /// and the diagnostics survive; everything else starts afresh.
    fn second_pass(self) -> RunState {
        event!(
            Level::DEBUG,
            "pass 1 complete: {} symbols, PC=${:04X}",
            self.symbols.values().len(),
            self.pc
        );
        let mut next = RunState::new(0, self.options);
        next.pass = Pass::Two;
        next.listing = self.options.listing.then(Listing::default);
        next.symbols = self.symbols;
        next.layout = self.layout;
        next.diagnostics = self.diagnostics;
        next
    }

    /// Record a diagnostic.  Only the second pass reports problems,
    /// so that each is reported once.
    pub(crate) fn diagnose(&mut self, diagnostic: Diagnostic) {
        if self.pass == Pass::Two {
            self.diagnostics.push(diagnostic);
        }
    }

    pub(crate) fn evaluate(&mut self, expr: &Expression, position: SourcePosition) -> Evaluation {
        let result = evaluate(
            expr,
            &EvaluationContext {
                symbols: &self.symbols,
                here: self.pc,
            },
        );
        for name in &result.undefined {
            self.diagnose(Diagnostic::error(
                DiagnosticKind::UndefinedSymbol,
                Some(position),
                format!("undefined symbol {name}"),
            ));
        }
        if result.division_by_zero {
            self.diagnose(Diagnostic::error(
                DiagnosticKind::DivisionByZero,
                Some(position),
                format!("division by zero in {expr}"),
            ));
        }
        result
    }

    /// Evaluate without reporting anything.
    fn evaluate_quietly(&self, expr: &Expression) -> u16 {
        evaluate(
            expr,
            &EvaluationContext {
                symbols: &self.symbols,
                here: self.pc,
            },
        )
        .value
    }

    fn decide(&mut self, index: usize, layout: Layout) {
        if self.pass == Pass::One {
            if let Some(slot) = self.layout.get_mut(index) {
                *slot = Some(layout);
            }
        }
    }

    fn decision(&self, index: usize) -> Option<Layout> {
        match self.pass {
            Pass::One => None,
            Pass::Two => self.layout.get(index).copied().flatten(),
        }
    }

    /// The value the first pass laid out `directive` with.  In the
    /// second pass a different `value` means the operand depends on a
    /// symbol defined later, which the layout could not take into
    /// account.
    fn laid_out(
        &mut self,
        index: usize,
        directive: Directive,
        value: u16,
        position: SourcePosition,
        layout: fn(u16) -> Layout,
    ) -> u16 {
        let fixed = match self.decision(index) {
            Some(Layout::Origin(fixed) | Layout::Reserve(fixed)) => fixed,
            _ => value,
        };
        if fixed != value {
            self.diagnose(Diagnostic::error(
                DiagnosticKind::ForwardReference,
                Some(position),
                format!(
                    "{directive} operand depends on a later definition (laid out as ${fixed:04X}, but it is ${value:04X})"
                ),
            ));
        }
        self.decide(index, layout(fixed));
        fixed
    }

    fn advance(&mut self, count: u16) {
        self.pc = self.pc.wrapping_add(count);
    }

    /// Output `bytes` at the current location.  Inside a DSECT only
    /// the location moves.
    pub(crate) fn emit(&mut self, bytes: &[u8]) {
        if self.pass == Pass::Two && !self.in_dsect {
            self.bytes.extend_from_slice(bytes);
            self.statement_bytes.extend_from_slice(bytes);
        }
        self.advance(u16::try_from(bytes.len()).unwrap_or(u16::MAX));
    }

    pub(crate) fn relocate(&mut self, address: u16, size: u8) {
        if self.pass == Pass::Two && self.relocatable && !self.in_dsect {
            event!(Level::DEBUG, "relocation entry at ${address:04X} (size {size})");
            self.rld.push(RelocationEntry { address, size });
        }
    }

    fn bind(&mut self, name: &SymbolName, value: u16, position: SourcePosition) {
        let outcome = self.symbols.define(name.clone(), value, position);
        if let Redefinition::Changed {
            previous_value,
            previous_position,
        } = outcome
        {
            // The second pass rebinds every symbol, so only the first
            // pass can tell a real redefinition.
            if self.pass == Pass::One {
                self.diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::DuplicateSymbol,
                    Some(position),
                    format!(
                        "{name} redefined as ${value:04X} (it was ${previous_value:04X} at {previous_position})"
                    ),
                ));
            }
        }
    }

    /// Process one statement.
    fn step(mut self, index: usize, statement: &Statement) -> RunState {
        let start = self.pc;
        self.statement_bytes.clear();
        self.statement_value = None;
        let directive = statement.directive();

        let listed_as_active = match directive {
            Some(d) if d.is_conditional() => self.conditional(d, statement),
            _ if !self.conditions.enabled() => false,
            _ => {
                if let Some(label) = &statement.label {
                    if directive != Some(Directive::Equ) {
                        self.bind(label, start, statement.position);
                    }
                }
                if let Some(mnemonic) = statement.mnemonic() {
                    self.instruction(index, mnemonic, statement);
                } else if let Some(d) = directive {
                    self.directive(index, d, statement);
                }
                true
            }
        };

        if self.pass == Pass::Two {
            // An ORG line is listed at the new origin.
            let address = if listed_as_active && directive == Some(Directive::Org) {
                self.pc
            } else {
                start
            };
            self.list(statement, address, !listed_as_active);
        }
        self
    }

    /// Handle a conditional-assembly directive.  These are processed
    /// even when assembly is disabled.  Returns whether the line
    /// itself counts as assembled, for the listing.
    fn conditional(&mut self, directive: Directive, statement: &Statement) -> bool {
        match directive {
            Directive::Else => {
                let outer = self.conditions.outer_enabled();
                if !self.conditions.flip() {
                    self.diagnose(Diagnostic::warning(
                        DiagnosticKind::UnbalancedConditional,
                        Some(statement.position),
                        "ELSE without DO or IF",
                    ));
                }
                outer
            }
            Directive::Fin => {
                let outer = self.conditions.outer_enabled();
                self.conditions.close();
                outer
            }
            opener => {
                let outer = self.conditions.enabled();
                let value = match (&statement.operand, outer) {
                    (Some(expr), true) => self.evaluate(expr, statement.position).value,
                    (Some(expr), false) => self.evaluate_quietly(expr),
                    (None, true) => {
                        self.diagnose(Diagnostic::error(
                            DiagnosticKind::MissingOperand,
                            Some(statement.position),
                            format!("{opener} needs a condition"),
                        ));
                        0
                    }
                    (None, false) => 0,
                };
                self.conditions.open(conditional::holds(opener, value));
                outer
            }
        }
    }

    fn missing_operand(&mut self, directive: Directive, statement: &Statement) {
        self.diagnose(Diagnostic::error(
            DiagnosticKind::MissingOperand,
            Some(statement.position),
            format!("{directive} needs an operand"),
        ));
    }

    fn directive(&mut self, index: usize, directive: Directive, statement: &Statement) {
        let position = statement.position;
        match directive {
            Directive::Org => {
                let Some(expr) = &statement.operand else {
                    self.missing_operand(directive, statement);
                    return;
                };
                let value = self.evaluate(expr, position).value;
                let target = self.laid_out(index, directive, value, position, Layout::Origin);
                event!(Level::DEBUG, "origin ${target:04X}");
                self.pc = target;
            }
            Directive::Equ => {
                let Some(expr) = &statement.operand else {
                    self.missing_operand(directive, statement);
                    return;
                };
                let evaluation = self.evaluate(expr, position);
                self.statement_value = Some(evaluation.value);
                match &statement.label {
                    // In the first pass a value which depends on a
                    // symbol not yet seen is left undefined, so that
                    // uses of it are not taken as zero-page.
                    Some(label) if self.pass == Pass::Two || evaluation.is_defined() => {
                        self.bind(label, evaluation.value, position);
                    }
                    Some(_) => (),
                    None => self.diagnose(Diagnostic::error(
                        DiagnosticKind::MissingOperand,
                        Some(position),
                        "EQU needs a label",
                    )),
                }
            }
            Directive::Da => self.words(statement, false),
            Directive::Ddb => self.words(statement, true),
            Directive::Db => self.byte_values(statement),
            Directive::Asc
            | Directive::Dci
            | Directive::Str
            | Directive::Inv
            | Directive::Fls
            | Directive::Rev => self.string(directive, statement),
            Directive::Hex => self.hex(statement),
            Directive::Ds => {
                let Some(expr) = &statement.operand else {
                    self.missing_operand(directive, statement);
                    return;
                };
                let value = self.evaluate(expr, position).value;
                let count = self.laid_out(index, directive, value, position, Layout::Reserve);
                if self.in_dsect {
                    self.advance(count);
                } else {
                    self.emit(&vec![0; usize::from(count)]);
                }
            }
            Directive::Dsect => self.in_dsect = true,
            Directive::Dend => self.in_dsect = false,
            Directive::Msb => {
                self.msb = match switch_setting(&statement.operand_text()) {
                    Some(on) => on,
                    None => statement
                        .operand
                        .as_ref()
                        .is_some_and(|expr| self.evaluate(expr, position).value != 0),
                };
            }
            Directive::Rel => self.relocatable = true,
            Directive::Extrn => {
                self.relocatable = true;
                let names = name_list(statement);
                if names.is_empty() {
                    self.missing_operand(directive, statement);
                }
                for name in names {
                    self.symbols.declare_external(name.clone());
                    push_unique(&mut self.externals, name);
                }
            }
            Directive::Entry => {
                self.relocatable = true;
                let names = name_list(statement);
                if names.is_empty() {
                    self.missing_operand(directive, statement);
                }
                for name in names {
                    push_unique(&mut self.entries, name);
                }
            }
            Directive::Fail => {
                let text = statement.string_operand().map_or_else(
                    || statement.operand_text(),
                    ToString::to_string,
                );
                self.diagnose(Diagnostic::error(
                    DiagnosticKind::UserFailure,
                    Some(position),
                    if text.is_empty() {
                        "FAIL".to_string()
                    } else {
                        format!("FAIL: {text}")
                    },
                ));
            }
            listing_control if listing_control.is_listing_control() => {
                self.listing_control(listing_control, statement);
            }
            inert if inert.is_inert() => {
                event!(Level::DEBUG, "ignoring {inert} at {position}");
            }
            // INCLUDE has already been expanded and the conditional
            // directives never get here.
            _ => (),
        }
    }

    fn listing_control(&mut self, directive: Directive, statement: &Statement) {
        if self.pass != Pass::Two || self.listing.is_none() {
            return;
        }
        let text: String = statement
            .string_operand()
            .map_or_else(|| statement.operand_text(), ToString::to_string);
        let count: u16 = match &statement.operand {
            Some(expr) if matches!(directive, Directive::Skp | Directive::Rep) => {
                self.evaluate(expr, statement.position).value
            }
            _ => 1,
        };
        let Some(listing) = self.listing.as_mut() else {
            return;
        };
        match directive {
            Directive::Lst => listing.set_enabled(switch_setting(&text).unwrap_or(true)),
            Directive::LstDo => listing.set_show_suppressed(switch_setting(&text).unwrap_or(true)),
            Directive::Page => listing.page(),
            Directive::Skp => listing.skip(count),
            Directive::Rep => listing.rule(count),
            Directive::Chr => {
                if let Some(ch) = text.chars().next() {
                    listing.set_rule_char(ch);
                }
            }
            Directive::Sbtl => listing.subtitle(text),
            _ => (),
        }
    }

    fn list(&mut self, statement: &Statement, start: u16, suppressed: bool) {
        let directive = statement.directive();
        if !suppressed && directive.is_some_and(Directive::is_listing_control) {
            return;
        }
        let Some(listing) = self.listing.as_mut() else {
            return;
        };
        let shows_address = statement.operation.is_some() || statement.label.is_some();
        listing.record(ListingRecord {
            pc: shows_address.then_some(start),
            bytes: std::mem::take(&mut self.statement_bytes),
            value: self.statement_value,
            suppressed,
            line: statement.position.line,
            text: statement.source_text(),
        });
    }

    fn finish(mut self) -> EngineOutput {
        if self.conditions.depth() > 0 {
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticKind::UnbalancedConditional,
                None,
                format!(
                    "{} conditional block(s) not closed by FIN",
                    self.conditions.depth()
                ),
            ));
        }
        let undefined_entries: Vec<Diagnostic> = self
            .entries
            .iter()
            .filter(|name| !self.symbols.is_defined(name))
            .map(|name| {
                Diagnostic::warning(
                    DiagnosticKind::UndefinedEntry,
                    None,
                    format!("entry point {name} is never defined"),
                )
            })
            .collect();
        self.diagnostics.extend(undefined_entries);
        let listing = self.listing.as_ref().map(|l| l.render(&self.symbols));
        event!(
            Level::DEBUG,
            "pass 2 complete: {} bytes, {} diagnostics",
            self.bytes.len(),
            self.diagnostics.len()
        );
        EngineOutput {
            bytes: self.bytes,
            symbols: self.symbols,
            diagnostics: self.diagnostics,
            relocatable: self.relocatable,
            rld: self.rld,
            externals: self.externals,
            entries: self.entries,
            listing,
        }
    }
}

fn run_pass(state: RunState, statements: &[Statement]) -> RunState {
    statements
        .iter()
        .enumerate()
        .fold(state, |state, (index, statement)| state.step(index, statement))
}

/// Assemble `statements`, which have already had their macros and
/// includes expanded.
pub(crate) fn run(statements: &[Statement], options: EngineOptions) -> EngineOutput {
    let pass_one = run_pass(RunState::new(statements.len(), options), statements);
    run_pass(pass_one.second_pass(), statements).finish()
}
