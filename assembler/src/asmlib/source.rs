//! Positions within the original input.
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use super::types::LineNumber;

/// A 1-based line and column.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default, Serialize)]
pub struct SourcePosition {
    pub line: LineNumber,
    pub column: u32,
}

impl SourcePosition {
    pub(crate) const fn new(line: LineNumber, column: u32) -> SourcePosition {
        SourcePosition { line, column }
    }
}

impl Display for SourcePosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Convert a byte offset within one line into a 1-based column.
pub(crate) fn column_of(line: &str, byte_offset: usize) -> u32 {
    let prefix = line.get(..byte_offset).unwrap_or(line);
    u32::try_from(prefix.chars().count())
        .unwrap_or(u32::MAX)
        .saturating_add(1)
}

/// Split source text into lines, numbered from 1.  Both `\n` and
/// `\r\n` line endings are accepted.
pub(crate) fn numbered_lines(body: &str) -> impl Iterator<Item = (LineNumber, &str)> {
    body.lines().zip(1..).map(|(line, n)| (n, line))
}

#[test]
fn test_column_of() {
    assert_eq!(column_of("LDA #1", 0), 1);
    assert_eq!(column_of("LDA #1", 4), 5);
    assert_eq!(column_of("é LDA", 3), 3);
}

#[test]
fn test_numbered_lines() {
    let lines: Vec<(LineNumber, &str)> = numbered_lines("A\r\nB\n\nC").collect();
    assert_eq!(lines, vec![(1, "A"), (2, "B"), (3, ""), (4, "C")]);
}

#[test]
fn test_position_display() {
    assert_eq!(SourcePosition::new(12, 3).to_string(), "line 12, column 3");
}
