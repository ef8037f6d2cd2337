use std::{ops::Deref, sync::OnceLock};

use regex::Regex;

/// A regular expression compiled on first use.  The pattern is
/// fixed at compile time, so failing to compile it is a bug in the
/// assembler rather than a problem with the input.
pub(crate) struct LazyRegex {
    once: OnceLock<Regex>,
    pattern: &'static str,
}

impl LazyRegex {
    pub(crate) const fn new(pattern: &'static str) -> Self {
        LazyRegex {
            once: OnceLock::new(),
            pattern,
        }
    }
}

impl Deref for LazyRegex {
    type Target = Regex;

    fn deref(&self) -> &Regex {
        self.once.get_or_init(|| match Regex::new(self.pattern) {
            Ok(r) => r,
            Err(e) => {
                panic!("'{}' is not a valid regular expression: {e}", self.pattern,);
            }
        })
    }
}

#[test]
fn test_lazy_regex_matches() {
    static DIGITS: LazyRegex = LazyRegex::new(r"^[0-9]+$");
    assert!(DIGITS.is_match("1234"));
    assert!(!DIGITS.is_match("12a"));
}
