use std::fmt::{self, Debug, Display, Formatter};

use serde::Serialize;

/// Symbol names are case-insensitive; the canonical form is upper
/// case.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SymbolName {
    pub(crate) canonical: String,
}

impl SymbolName {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

impl From<&str> for SymbolName {
    fn from(s: &str) -> SymbolName {
        SymbolName {
            canonical: s.to_ascii_uppercase(),
        }
    }
}

impl From<String> for SymbolName {
    fn from(s: String) -> SymbolName {
        SymbolName::from(s.as_str())
    }
}

impl Display for SymbolName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.canonical, f)
    }
}

impl Debug for SymbolName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolName {{ canonical: \"{}\" }}", self.canonical)
    }
}

impl PartialEq<&str> for SymbolName {
    fn eq(&self, other: &&str) -> bool {
        self.canonical.eq_ignore_ascii_case(other)
    }
}

/// Remove one layer of matching quotes, if there are any.
pub(crate) fn strip_quotes(s: &str) -> &str {
    let trimmed = s.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed.strip_prefix(quote) {
            return inner.strip_suffix(quote).unwrap_or(inner);
        }
    }
    trimmed
}

#[test]
fn test_symbol_name_is_case_insensitive() {
    assert_eq!(SymbolName::from("start"), SymbolName::from("START"));
    assert_eq!(SymbolName::from("Loop").to_string(), "LOOP");
    assert!(SymbolName::from("x") == "X");
}

#[test]
fn test_strip_quotes() {
    assert_eq!(strip_quotes("\"lib.s\""), "lib.s");
    assert_eq!(strip_quotes("'A'"), "A");
    assert_eq!(strip_quotes("\"open"), "open");
    assert_eq!(strip_quotes(" PRINT "), "PRINT");
}
