//! Builds [`Statement`]s from tokens, one line at a time.
//!
//! The grammar is permissive on purpose: every field of a statement
//! is optional.  So parsing never fails; a malformed line just
//! yields a statement with fewer fields set (or, for an instruction,
//! with `trailing_junk` set), and the assembler reports the
//! consequences (an unknown mnemonic, say, or an addressing mode the
//! instruction does not have).
use chumsky::error::Rich;
use chumsky::extra;
use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::{any, choice, end, recursive, Input, IterParser, SimpleSpan};
use chumsky::select;
use chumsky::Parser;

use super::ast::*;
use super::directive::Directive;
use super::lexer::{self, TokenKind};
use super::span::*;
use super::symbol::{strip_quotes, SymbolName};


pub(crate) type Extra<'a> = extra::Err<Rich<'a, lexer::Token>>;
use lexer::Token as Tok;

/// Decode a numeric literal.  The radix comes from the prefix (`$`
/// or `0x` for hex, `%` or `0b` for binary, `@` for octal) and
/// values wrap to 16 bits.
pub(crate) fn numeric_value(lexeme: &str) -> u16 {
    let (radix, digits): (u32, &str) = if let Some(d) = lexeme.strip_prefix('$') {
        (16, d)
    } else if let Some(d) = lexeme.strip_prefix("0x").or_else(|| lexeme.strip_prefix("0X")) {
        (16, d)
    } else if let Some(d) = lexeme.strip_prefix('%') {
        (2, d)
    } else if let Some(d) = lexeme.strip_prefix("0b").or_else(|| lexeme.strip_prefix("0B")) {
        (2, d)
    } else if let Some(d) = lexeme.strip_prefix('@') {
        (8, d)
    } else {
        (10, lexeme)
    };
    let value = digits
        .chars()
        .filter_map(|ch| ch.to_digit(radix))
        .fold(0_u32, |acc, digit| (acc * radix + digit) & 0xFFFF);
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn operator<'a, I>(symbol: &'static str) -> impl Parser<'a, I, (), Extra<'a>> + Clone
where
    I: Input<'a, Token = Tok, Span = Span> + ValueInput<'a>,
{
    select! {
        Tok { kind: TokenKind::Operator, lexeme, .. } if lexeme == symbol => (),
    }
    .labelled(symbol)
}

fn punctuation<'a, I>(wanted: TokenKind) -> impl Parser<'a, I, (), Extra<'a>> + Clone
where
    I: Input<'a, Token = Tok, Span = Span> + ValueInput<'a>,
{
    select! {
        Tok { kind, .. } if kind == wanted => (),
    }
}

/// An index register name such as the `X` in `LDA $1000,X`.
fn register<'a, I>(name: &'static str) -> impl Parser<'a, I, (), Extra<'a>> + Clone
where
    I: Input<'a, Token = Tok, Span = Span> + ValueInput<'a>,
{
    select! {
        Tok { kind: TokenKind::Symbol, lexeme, .. } if lexeme.eq_ignore_ascii_case(name) => (),
    }
    .labelled(name)
}

fn atom_token<'a, I>() -> impl Parser<'a, I, Expression, Extra<'a>> + Clone
where
    I: Input<'a, Token = Tok, Span = Span> + ValueInput<'a>,
{
    select! {
        Tok { kind: TokenKind::Number, lexeme, .. } => Expression::Literal(numeric_value(&lexeme)),
        Tok { kind: TokenKind::Symbol | TokenKind::Label, lexeme, .. } => {
            Expression::Symbol(SymbolName::from(lexeme))
        },
        Tok { kind: TokenKind::String, lexeme, .. } => {
            Expression::Quoted(strip_quotes(&lexeme).to_string())
        },
    }
    .or(operator("*").to(Expression::Here))
    .labelled("number, symbol or string")
}

/// Expressions have no precedence; operators apply strictly from
/// left to right.
pub(crate) fn expression<'a, I>() -> impl Parser<'a, I, Expression, Extra<'a>> + Clone
where
    I: Input<'a, Token = Tok, Span = Span> + ValueInput<'a>,
{
    recursive(|expr| {
        let parenthesised = expr.delimited_by(
            punctuation(TokenKind::LeftParen),
            punctuation(TokenKind::RightParen),
        );
        let atom = choice((atom_token(), parenthesised));

        let byte_select = choice((
            operator("<").to(ByteSelect::Low),
            operator(">").to(ByteSelect::High),
        ));
        let primary = choice((
            byte_select
                .then(atom.clone())
                .map(|(select, inner)| Expression::Select(select, Box::new(inner))),
            operator("-").ignore_then(atom.clone()).map(|inner| {
                Expression::Binary(
                    BinaryOperator::Subtract,
                    Box::new(Expression::Literal(0)),
                    Box::new(inner),
                )
            }),
            atom,
        ));

        let binop = choice((
            operator("+").to(BinaryOperator::Add),
            operator("-").to(BinaryOperator::Subtract),
            operator("*").to(BinaryOperator::Multiply),
            operator("/").to(BinaryOperator::Divide),
        ));

        primary
            .clone()
            .then(binop.then(primary).repeated().collect::<Vec<_>>())
            .map(|(head, tail)| Expression::with_tail(head, tail))
    })
    .labelled("expression")
}

/// The operand of an instruction, with the addressing mode it was
/// written in.
fn instruction_operand<'a, I>() -> impl Parser<'a, I, (AddressingSyntax, Expression), Extra<'a>> + Clone
where
    I: Input<'a, Token = Tok, Span = Span> + ValueInput<'a>,
{
    let comma = punctuation(TokenKind::Comma);
    let close = punctuation(TokenKind::RightParen);

    let immediate = operator("#")
        .ignore_then(
            choice((
                operator("<").to(AddressingSyntax::ImmediateLow),
                operator(">").to(AddressingSyntax::ImmediateHigh),
            ))
            .or_not(),
        )
        .then(expression())
        .map(|(mode, value)| (mode.unwrap_or(AddressingSyntax::Immediate), value));

    let indirect_x = expression()
        .then_ignore(comma.clone())
        .then_ignore(register("X"))
        .then_ignore(close.clone())
        .map(|value| (AddressingSyntax::IndirectX, value));
    let indirect_or_indirect_y = expression()
        .then_ignore(close)
        .then(comma.clone().ignore_then(register("Y")).or_not())
        .map(|(value, y)| match y {
            Some(()) => (AddressingSyntax::IndirectY, value),
            None => (AddressingSyntax::Indirect, value),
        });
    let indirect = punctuation(TokenKind::LeftParen)
        .ignore_then(choice((indirect_x, indirect_or_indirect_y)));

    let plain = expression()
        .then(
            comma
                .ignore_then(choice((
                    register("X").to(AddressingSyntax::AbsoluteX),
                    register("Y").to(AddressingSyntax::AbsoluteY),
                )))
                .or_not(),
        )
        .map(|(value, index)| match index {
            Some(mode) => (mode, value),
            None if matches!(&value, Expression::Symbol(name) if name.as_str() == "A") => {
                (AddressingSyntax::Accumulator, value)
            }
            None => (AddressingSyntax::Absolute, value),
        });

    choice((immediate, indirect, plain)).labelled("operand")
}

/// The operation, its addressing syntax and operand, and whether
/// anything followed an instruction's operand.
type ParsedOperation = (Operation, Option<AddressingSyntax>, Option<Expression>, bool);
type ParsedLine = (Option<SymbolName>, Option<ParsedOperation>);

fn statement_line<'a, I>() -> impl Parser<'a, I, ParsedLine, Extra<'a>> + Clone
where
    I: Input<'a, Token = Tok, Span = Span> + ValueInput<'a>,
{
    let label = select! {
        Tok { kind: TokenKind::Label, lexeme, .. } => SymbolName::from(lexeme),
    }
    .then_ignore(punctuation(TokenKind::Colon).or_not())
    .labelled("label");

    // An unknown word in the operation field is kept as a mnemonic,
    // so that the assembler can complain about it.
    let mnemonic = select! {
        Tok { kind: TokenKind::Opcode | TokenKind::Symbol, lexeme, .. } => lexeme.to_ascii_uppercase(),
    };
    let directive = select! {
        Tok { kind: TokenKind::Directive, lexeme, .. } => lexeme,
    }
    .try_map(|lexeme, span| {
        Directive::from_keyword(&lexeme)
            .ok_or_else(|| Rich::custom(span, format!("{lexeme} is not a directive")))
    });

    let operation = choice((
        mnemonic
            .then(instruction_operand().or_not())
            .then(any().repeated().collect::<Vec<Tok>>())
            .map(|((m, operand), rest)| {
                let junk = !rest.is_empty();
                match operand {
                    Some((mode, value)) => (Operation::Opcode(m), Some(mode), Some(value), junk),
                    None => (Operation::Opcode(m), None, None, junk),
                }
            }),
        // The rest of a directive's operand field (a list of values,
        // say) is taken from the raw tokens.
        directive
            .then(expression().or_not())
            .map(|(d, value)| (Operation::Directive(d), None, value, false)),
    ));

    label
        .or_not()
        .then(operation.or_not())
        .then_ignore(any().repeated())
        .then_ignore(end())
}

type Mig<I, O> = chumsky::input::MappedInput<
    Tok,
    SimpleSpan,
    chumsky::input::Stream<std::vec::IntoIter<(Tok, SimpleSpan)>>,
    fn(I) -> O,
>;
pub(crate) type Mi = Mig<(Tok, SimpleSpan), (Tok, SimpleSpan)>;

pub(crate) fn parse_tokens_with<'a, P, T>(tokens: &[Tok], parser: &P) -> Option<T>
where
    P: Parser<'a, Mi, T, Extra<'a>>,
{
    let spanned: Vec<(Tok, SimpleSpan)> = tokens
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, tok)| (tok, span(i..i + 1)))
        .collect();
    let token_stream: Mi =
        Stream::from_iter(spanned).map(end_span(tokens.len()), |unchanged| unchanged);
    parser.parse(token_stream).into_output()
}

fn build_statement<'a, P>(line: &[Tok], parser: &P) -> Option<Statement>
where
    P: Parser<'a, Mi, ParsedLine, Extra<'a>>,
{
    let (body, comment): (&[Tok], Option<String>) = match line.split_last() {
        Some((last, rest)) if last.kind == TokenKind::Comment => (rest, Some(last.lexeme.clone())),
        _ => (line, None),
    };
    let position = line.first()?.pos;
    let (label, operation) = parse_tokens_with(body, parser).unwrap_or((None, None));
    if label.is_none() && operation.is_none() && comment.is_none() {
        return None;
    }
    let operand_tokens: Vec<Tok> = match operation {
        Some(_) => body
            .iter()
            .skip_while(|t| matches!(t.kind, TokenKind::Label | TokenKind::Colon))
            .skip(1)
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    let (operation, addressing, operand, trailing_junk) = match operation {
        Some((operation, addressing, operand, junk)) => {
            (Some(operation), addressing, operand, junk)
        }
        None => (None, None, None, false),
    };
    Some(Statement {
        label,
        operation,
        operand,
        addressing,
        comment,
        tokens: line.to_vec(),
        operand_tokens,
        trailing_junk,
        position,
    })
}

/// Group the tokens into lines and parse each one.  Lines holding
/// nothing at all are dropped; comment-only lines are kept so that
/// they appear in the listing.
pub(crate) fn parse(tokens: &[Tok]) -> Vec<Statement> {
    let parser = statement_line::<Mi>();
    tokens
        .split(|t| matches!(t.kind, TokenKind::Eol | TokenKind::Eof))
        .filter(|line| !line.is_empty())
        .filter_map(|line| build_statement(line, &parser))
        .collect()
}

/// Lex and parse a complete source text.
pub(crate) fn parse_source(body: &str) -> Vec<Statement> {
    parse(&lexer::tokenize(body))
}

/// Parse a single expression, ignoring anything after it.
pub(crate) fn parse_expression(tokens: &[Tok]) -> Option<Expression> {
    let parser = expression::<Mi>().then_ignore(any().repeated()).then_ignore(end());
    parse_tokens_with(tokens, &parser)
}

/// Split operand tokens at the commas which are not inside
/// parentheses, and parse each item.  An empty item yields `None`.
pub(crate) fn parse_operand_list(tokens: &[Tok]) -> Vec<Option<Expression>> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let mut items: Vec<&[Tok]> = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;
    for (i, tok) in tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Comma if depth == 0 => {
                items.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => (),
        }
    }
    items.push(&tokens[start..]);
    items
        .into_iter()
        .map(|item| if item.is_empty() { None } else { parse_expression(item) })
        .collect()
}
