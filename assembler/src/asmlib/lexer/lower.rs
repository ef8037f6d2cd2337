//! The logos-generated scanner for the body of a single line.
//!
//! This scanner knows nothing about columns, so it cannot tell a
//! label from a symbol or a column-1 `*` comment from the multiply
//! operator.  The outer lexer makes those decisions.
use std::ops::Range;

use logos::Logos;

#[derive(Debug, Logos, PartialEq, Eq, Clone, Copy)]
#[logos(skip r"[ \t\r\f]+")]
pub(super) enum RawToken {
    /// Labels, symbols, mnemonics and directive keywords all look
    /// alike.
    #[regex(r"[A-Za-z_][A-Za-z0-9_.]*")]
    #[token(">>>", priority = 10)]
    Word,

    #[regex(r"\$[0-9A-Fa-f]+")]
    #[regex(r"0[xX][0-9A-Fa-f]+")]
    #[regex(r"%[01]+")]
    #[regex(r"0[bB][01]+")]
    #[regex(r"@[0-7]+")]
    #[regex(r"[0-9]+")]
    Number,

    /// Strings and character constants.  A string which is not
    /// closed runs to the end of the line.
    #[regex(r#""[^"\n]*"?"#)]
    #[regex(r"'[^'\n]*'?")]
    Quoted,

    #[regex(r";[^\n]*")]
    Comment,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[regex(r"[-+*/#<>=&|^!]")]
    Operator,
}

/// Scan one line, dropping anything the scanner does not recognise.
pub(super) fn scan_line(line: &str) -> Vec<(RawToken, Range<usize>)> {
    RawToken::lexer(line)
        .spanned()
        .filter_map(|(result, span)| match result {
            Ok(tok) => Some((tok, span)),
            Err(()) => None,
        })
        .collect()
}
