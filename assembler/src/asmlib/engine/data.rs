//! Data directives: the bytes they generate and how they get into
//! the output.
use super::super::ast::Statement;
use super::super::directive::Directive;
use super::super::lexer::TokenKind;
use super::super::parser::parse_operand_list;
use super::super::types::{Diagnostic, DiagnosticKind};
use super::RunState;

fn with_msb(b: u8, msb: bool) -> u8 {
    if msb {
        b | 0x80
    } else {
        b & 0x7F
    }
}

pub(crate) fn ascii_bytes(text: &str, msb: bool) -> Vec<u8> {
    text.bytes().map(|b| with_msb(b, msb)).collect()
}

/// Like `ASC`, except that the last character always has its top
/// bit set, which marks the end of the string.
pub(crate) fn dci_bytes(text: &str, msb: bool) -> Vec<u8> {
    let mut bytes = ascii_bytes(text, msb);
    if let Some(last) = bytes.last_mut() {
        *last |= 0x80;
    }
    bytes
}

/// A length byte followed by the characters.  The second value is
/// true if the string is too long for its length to fit in a byte.
pub(crate) fn str_bytes(text: &str, msb: bool) -> (Vec<u8>, bool) {
    let body = ascii_bytes(text, msb);
    let too_long = body.len() > 0xFF;
    let mut bytes = Vec::with_capacity(body.len() + 1);
    bytes.push(body.len().to_le_bytes()[0]);
    bytes.extend(body);
    (bytes, too_long)
}

/// Apple II inverse-video screen codes.
pub(crate) fn inverse_bytes(text: &str) -> Vec<u8> {
    text.bytes().map(|b| b & 0x3F).collect()
}

/// Apple II flashing screen codes.
pub(crate) fn flashing_bytes(text: &str) -> Vec<u8> {
    text.bytes().map(|b| (b & 0x3F) | 0x40).collect()
}

pub(crate) fn reversed_bytes(text: &str, msb: bool) -> Vec<u8> {
    text.bytes().rev().map(|b| with_msb(b, msb)).collect()
}

/// Decode the digits of a `HEX` directive.  Bytes are produced for
/// each complete pair of digits, even when there is a problem to
/// report.
pub(crate) fn hex_bytes(text: &str) -> (Vec<u8>, Option<String>) {
    let digits: Vec<u8> = text
        .chars()
        .filter_map(|ch| ch.to_digit(16))
        .map(|d| d.to_le_bytes()[0])
        .collect();
    let bytes: Vec<u8> = digits
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect();
    let problem = if let Some(bad) = text.chars().find(|ch| !ch.is_ascii_hexdigit()) {
        Some(format!("'{bad}' is not a hex digit"))
    } else if digits.len() % 2 != 0 {
        Some(format!("odd number of hex digits in {text}"))
    } else {
        None
    };
    (bytes, problem)
}

impl RunState {
    /// The values of a comma-separated list, each with a flag saying
    /// whether it depends on a symbol.
    fn value_list(&mut self, statement: &Statement) -> Vec<(u16, bool)> {
        let items = parse_operand_list(&statement.operand_tokens);
        if items.is_empty() {
            self.diagnose(Diagnostic::error(
                DiagnosticKind::MissingOperand,
                Some(statement.position),
                "a list of values is needed",
            ));
        }
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Some(expr) => {
                    let evaluation = self.evaluate(&expr, statement.position);
                    values.push((evaluation.value, expr.references_symbol()));
                }
                None => self.diagnose(Diagnostic::error(
                    DiagnosticKind::MissingOperand,
                    Some(statement.position),
                    format!("empty or malformed value in {}", statement.operand_text()),
                )),
            }
        }
        values
    }

    pub(super) fn words(&mut self, statement: &Statement, big_endian: bool) {
        for (value, relocatable) in self.value_list(statement) {
            if relocatable {
                self.relocate(self.pc, 2);
            }
            if big_endian {
                self.emit(&value.to_be_bytes());
            } else {
                self.emit(&value.to_le_bytes());
            }
        }
    }

    pub(super) fn byte_values(&mut self, statement: &Statement) {
        for (value, relocatable) in self.value_list(statement) {
            if relocatable {
                self.relocate(self.pc, 1);
            }
            self.emit(&[value.to_le_bytes()[0]]);
        }
    }

    pub(super) fn string(&mut self, directive: Directive, statement: &Statement) {
        let Some(text) = statement.string_operand() else {
            self.diagnose(Diagnostic::error(
                DiagnosticKind::MissingOperand,
                Some(statement.position),
                format!("{directive} needs a quoted string"),
            ));
            return;
        };
        let bytes = match directive {
            Directive::Dci => dci_bytes(text, self.msb),
            Directive::Inv => inverse_bytes(text),
            Directive::Fls => flashing_bytes(text),
            Directive::Rev => reversed_bytes(text, self.msb),
            Directive::Str => {
                let (bytes, too_long) = str_bytes(text, self.msb);
                if too_long {
                    self.diagnose(Diagnostic::error(
                        DiagnosticKind::StringTooLong,
                        Some(statement.position),
                        format!("string of {} characters is too long for STR", text.len()),
                    ));
                }
                bytes
            }
            _ => ascii_bytes(text, self.msb),
        };
        self.emit(&bytes);
    }

    pub(super) fn hex(&mut self, statement: &Statement) {
        let text: String = statement
            .operand_tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Comma)
            .map(|t| t.lexeme.as_str())
            .collect();
        if text.is_empty() {
            self.diagnose(Diagnostic::error(
                DiagnosticKind::MissingOperand,
                Some(statement.position),
                "HEX needs some hex digits",
            ));
            return;
        }
        let (bytes, problem) = hex_bytes(&text);
        if let Some(problem) = problem {
            self.diagnose(Diagnostic::error(
                DiagnosticKind::InvalidHexDigits,
                Some(statement.position),
                problem,
            ));
        }
        self.emit(&bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_and_msb() {
        assert_eq!(ascii_bytes("HI", false), vec![0x48, 0x49]);
        assert_eq!(ascii_bytes("HI", true), vec![0xC8, 0xC9]);
        assert_eq!(ascii_bytes("", true), Vec::<u8>::new());
    }

    #[test]
    fn test_dci() {
        assert_eq!(dci_bytes("AB", false), vec![0x41, 0xC2]);
        assert_eq!(dci_bytes("AB", true), vec![0xC1, 0xC2]);
        assert!(dci_bytes("", false).is_empty());
    }

    #[test]
    fn test_str() {
        assert_eq!(
            str_bytes("HELLO", false),
            (vec![0x05, 0x48, 0x45, 0x4C, 0x4C, 0x4F], false)
        );
        let long = "X".repeat(300);
        let (bytes, too_long) = str_bytes(&long, false);
        assert!(too_long);
        assert_eq!(bytes.len(), 301);
        assert_eq!(bytes[0], 300_u16.to_le_bytes()[0]);
    }

    #[test]
    fn test_screen_codes() {
        assert_eq!(inverse_bytes("A1"), vec![0x01, 0x31]);
        assert_eq!(flashing_bytes("A1"), vec![0x41, 0x71]);
        assert_eq!(reversed_bytes("ABC", false), vec![0x43, 0x42, 0x41]);
        assert_eq!(reversed_bytes("AB", true), vec![0xC2, 0xC1]);
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex_bytes("0102AbFF"), (vec![0x01, 0x02, 0xAB, 0xFF], None));
        let (bytes, problem) = hex_bytes("123");
        assert_eq!(bytes, vec![0x12]);
        assert!(problem.is_some());
        let (bytes, problem) = hex_bytes("12G4");
        assert_eq!(bytes, vec![0x12]);
        assert_eq!(problem.as_deref(), Some("'G' is not a hex digit"));
    }
}
