//! Abstract syntax representation.  Each source line yields at most
//! one [`Statement`].
use std::fmt::{self, Display, Formatter};

use super::directive::Directive;
use super::lexer::{Token, TokenKind};
use super::source::SourcePosition;
use super::symbol::SymbolName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
        })
    }
}

/// Which byte of a 16-bit value `<` and `>` select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ByteSelect {
    Low,
    High,
}

impl ByteSelect {
    pub(crate) fn apply(self, value: u16) -> u16 {
        match self {
            ByteSelect::Low => value & 0xFF,
            ByteSelect::High => value >> 8,
        }
    }
}

/// Expressions have no operator precedence: `2+3*4` is `(2+3)*4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Expression {
    Literal(u16),
    Symbol(SymbolName),
    /// `*`, the address of the current statement.
    Here,
    /// A quoted string or character constant, without its quotes.
    /// Its value is the code of its first character.
    Quoted(String),
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
    Select(ByteSelect, Box<Expression>),
}

impl Expression {
    /// Fold a primary followed by (operator, primary) pairs from
    /// left to right.
    pub(crate) fn with_tail(head: Expression, tail: Vec<(BinaryOperator, Expression)>) -> Expression {
        tail.into_iter().fold(head, |left, (op, right)| {
            Expression::Binary(op, Box::new(left), Box::new(right))
        })
    }

    /// True if the value of the expression depends on any symbol
    /// (including `*`), and so would change if the program were
    /// loaded elsewhere.
    pub(crate) fn references_symbol(&self) -> bool {
        match self {
            Expression::Literal(_) | Expression::Quoted(_) => false,
            Expression::Symbol(_) | Expression::Here => true,
            Expression::Binary(_, left, right) => {
                left.references_symbol() || right.references_symbol()
            }
            Expression::Select(_, inner) => inner.references_symbol(),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(n) => write!(f, "${n:04X}"),
            Expression::Symbol(name) => write!(f, "{name}"),
            Expression::Here => f.write_str("*"),
            Expression::Quoted(s) => write!(f, "\"{s}\""),
            Expression::Binary(op, left, right) => write!(f, "{left}{op}{right}"),
            Expression::Select(ByteSelect::Low, inner) => write!(f, "<{inner}"),
            Expression::Select(ByteSelect::High, inner) => write!(f, ">{inner}"),
        }
    }
}

/// The addressing mode as written.  The assembler turns this into
/// an actual [`base::prelude::AddressingMode`] once it knows the
/// value of the operand (for zero-page narrowing) and whether the
/// mnemonic is a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum AddressingSyntax {
    Accumulator,
    Immediate,
    /// `#<expr`
    ImmediateLow,
    /// `#>expr`
    ImmediateHigh,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// `(expr)`
    Indirect,
    /// `(expr,X)`
    IndirectX,
    /// `(expr),Y`
    IndirectY,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Operation {
    /// The mnemonic, in upper case.  This may not be a real
    /// mnemonic; the assembler reports unknown ones.
    Opcode(String),
    Directive(Directive),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Statement {
    pub(crate) label: Option<SymbolName>,
    pub(crate) operation: Option<Operation>,
    pub(crate) operand: Option<Expression>,
    pub(crate) addressing: Option<AddressingSyntax>,
    pub(crate) comment: Option<String>,
    /// All the tokens of the line, except the end-of-line marker.
    pub(crate) tokens: Vec<Token>,
    /// The tokens following the opcode or directive, excluding any
    /// comment.  Comma-separated lists and raw lexemes are taken
    /// from here.
    pub(crate) operand_tokens: Vec<Token>,
    /// Set when tokens follow an instruction's operand which are not
    /// part of it, as in `LDA $10,Z`.
    pub(crate) trailing_junk: bool,
    pub(crate) position: SourcePosition,
}

impl Statement {
    pub(crate) fn directive(&self) -> Option<Directive> {
        match &self.operation {
            Some(Operation::Directive(d)) => Some(*d),
            _ => None,
        }
    }

    pub(crate) fn mnemonic(&self) -> Option<&str> {
        match &self.operation {
            Some(Operation::Opcode(m)) => Some(m.as_str()),
            _ => None,
        }
    }

    /// The first quoted string among the operand tokens, without its
    /// quotes.
    pub(crate) fn string_operand(&self) -> Option<&str> {
        self.operand_tokens
            .iter()
            .find(|t| t.kind == TokenKind::String)
            .map(|t| super::symbol::strip_quotes(&t.lexeme))
    }

    /// The operand tokens joined back together, e.g. `#$42` or
    /// `($80),Y`.
    pub(crate) fn operand_text(&self) -> String {
        self.operand_tokens.iter().map(|t| t.lexeme.as_str()).collect()
    }

    /// A normalised rendering of the line for the listing.
    pub(crate) fn source_text(&self) -> String {
        let label: String = self
            .tokens
            .iter()
            .take_while(|t| matches!(t.kind, TokenKind::Label | TokenKind::Colon))
            .map(|t| t.lexeme.as_str())
            .collect();
        let operation: &str = self
            .tokens
            .iter()
            .find(|t| t.is_keyword() || (self.operation.is_some() && t.kind == TokenKind::Symbol))
            .map_or("", |t| t.lexeme.as_str());
        let mut text = if label.is_empty() && self.operation.is_none() {
            String::new()
        } else {
            format!("{label:<8} {operation:<4} {}", self.operand_text())
        };
        if let Some(comment) = &self.comment {
            if !text.is_empty() {
                text = text.trim_end().to_string();
                text.push(' ');
            }
            text.push_str(comment);
        }
        text.trim_end().to_string()
    }
}
