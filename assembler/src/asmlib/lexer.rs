//! Turns source text into tokens, one line at a time.
//!
//! The source format is fielded: an identifier in column 1 is a
//! label, a `*` in column 1 starts a comment, and `;` starts a
//! comment anywhere.  Lexing never fails; characters which cannot
//! start a token are skipped and any resulting problem surfaces
//! later as an encoding error.
use std::fmt::{self, Display, Formatter};

use base::prelude::lookup_opcode;

use super::directive::Directive;
use super::source::{column_of, numbered_lines, SourcePosition};
use super::types::LineNumber;

mod lower;

use lower::RawToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TokenKind {
    Label,
    /// An identifier outside column 1 which is neither a mnemonic nor
    /// a directive.
    Symbol,
    Opcode,
    Directive,
    Number,
    String,
    Operator,
    Comma,
    Colon,
    LeftParen,
    RightParen,
    Comment,
    Eol,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) lexeme: String,
    pub(crate) pos: SourcePosition,
}

impl Token {
    fn new(kind: TokenKind, lexeme: &str, pos: SourcePosition) -> Token {
        Token {
            kind,
            lexeme: lexeme.to_string(),
            pos,
        }
    }

    pub(crate) fn is_keyword(&self) -> bool {
        matches!(self.kind, TokenKind::Opcode | TokenKind::Directive)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eol => f.write_str("end of line"),
            TokenKind::Eof => f.write_str("end of input"),
            _ => f.write_str(&self.lexeme),
        }
    }
}

fn is_keyword(word: &str) -> bool {
    lookup_opcode(word).is_some() || Directive::from_keyword(word).is_some()
}

fn classify_word(word: &str) -> TokenKind {
    if lookup_opcode(word).is_some() {
        TokenKind::Opcode
    } else if Directive::from_keyword(word).is_some() {
        TokenKind::Directive
    } else {
        TokenKind::Symbol
    }
}

fn raw_kind(raw: RawToken) -> TokenKind {
    match raw {
        RawToken::Word => TokenKind::Symbol,
        RawToken::Number => TokenKind::Number,
        RawToken::Quoted => TokenKind::String,
        RawToken::Comment => TokenKind::Comment,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::LeftParen => TokenKind::LeftParen,
        RawToken::RightParen => TokenKind::RightParen,
        RawToken::Operator => TokenKind::Operator,
    }
}

fn tokenize_line(line_number: LineNumber, line: &str, output: &mut Vec<Token>) {
    let at = |byte_offset: usize| SourcePosition::new(line_number, column_of(line, byte_offset));

    if line.starts_with('*') {
        output.push(Token::new(TokenKind::Comment, line, at(0)));
    } else {
        let raw = lower::scan_line(line);
        for (index, (tok, span)) in raw.iter().enumerate() {
            let lexeme = &line[span.clone()];
            let kind = match tok {
                RawToken::Word if span.start == 0 => {
                    // A keyword in column 1 is still a keyword unless
                    // the next word on the line is the operation.
                    let next_is_keyword = raw[index + 1..]
                        .iter()
                        .find(|(t, _)| *t == RawToken::Word)
                        .is_some_and(|(_, s)| is_keyword(&line[s.clone()]));
                    if is_keyword(lexeme) && !next_is_keyword {
                        classify_word(lexeme)
                    } else {
                        TokenKind::Label
                    }
                }
                RawToken::Word => classify_word(lexeme),
                other => raw_kind(*other),
            };
            output.push(Token::new(kind, lexeme, at(span.start)));
        }
    }
    output.push(Token::new(TokenKind::Eol, "", at(line.len())));
}

/// Split `source` into tokens.  Every line ends with an `Eol`
/// token, and the whole token stream ends with an `Eof` token.
pub(crate) fn tokenize(source: &str) -> Vec<Token> {
    tokenize_lines(numbered_lines(source))
}

/// Tokenize lines which already carry their line numbers (as the
/// output of macro expansion does).
pub(crate) fn tokenize_lines<'l, I>(lines: I) -> Vec<Token>
where
    I: IntoIterator<Item = (LineNumber, &'l str)>,
{
    let mut output = Vec::new();
    let mut last_line = 0;
    for (line_number, line) in lines {
        tokenize_line(line_number, line, &mut output);
        last_line = line_number;
    }
    output.push(Token::new(
        TokenKind::Eof,
        "",
        SourcePosition::new(last_line + 1, 1),
    ));
    output
}
