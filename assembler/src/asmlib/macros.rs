//! The macro preprocessor.
//!
//! This works on raw lines, before lexing, because a macro body can
//! hold text such as a bare `&0` label which does not lex as a
//! statement until it has been substituted.
//!
//! A definition looks like
//!
//! ```text
//! STORE    MACRO
//!          LDA #&1
//!          STA &2
//!          ENDM
//! ```
//!
//! and is invoked by naming it in the operation field, with
//! comma-separated arguments: `STORE $42,$2000`.  `&1` to `&9` are
//! replaced by the corresponding argument (or nothing), `&0` by the
//! first argument and `&X` by the number of arguments.
use std::collections::BTreeMap;

use regex::Captures;
use tracing::{event, Level};

use super::rx::LazyRegex;
use super::source::{numbered_lines, SourcePosition};
use super::symbol::SymbolName;
use super::types::{Diagnostic, DiagnosticKind, LineNumber};

/// Expansion of a macro by another macro is allowed up to this
/// depth.
pub(crate) const MAX_EXPANSION_DEPTH: usize = 16;

/// The most lines all the macro invocations of one program may
/// expand to.
pub(crate) const MAX_EXPANDED_LINES: usize = 100_000;

static PARAMETER: LazyRegex = LazyRegex::new(r"&([0-9Xx])");

/// A source line together with the line number it should be
/// reported under.  Lines produced by expanding a macro carry the
/// line number of the invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceLine {
    pub(crate) number: LineNumber,
    pub(crate) text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MacroDefinition {
    pub(crate) name: SymbolName,
    pub(crate) body: Vec<String>,
    pub(crate) position: SourcePosition,
}

#[derive(Debug, Default)]
pub(crate) struct Preprocessed {
    pub(crate) lines: Vec<SourceLine>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Preprocessed {
    pub(crate) fn numbered_lines(&self) -> impl Iterator<Item = (LineNumber, &str)> {
        self.lines.iter().map(|line| (line.number, line.text.as_str()))
    }
}

fn starts_in_column_one(line: &str) -> bool {
    line.chars().next().is_some_and(|ch| !ch.is_whitespace())
}

fn without_comment(line: &str) -> &str {
    match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// If `line` opens a macro definition, the name of the macro.
fn definition_name(line: &str) -> Option<&str> {
    if !starts_in_column_one(line) || line.starts_with('*') {
        return None;
    }
    let mut fields = without_comment(line).split_whitespace();
    let name = fields.next()?;
    let keyword = fields.next()?;
    if keyword.eq_ignore_ascii_case("MACRO") || keyword.eq_ignore_ascii_case("MAC") {
        Some(name)
    } else {
        None
    }
}

fn is_end_of_definition(line: &str) -> bool {
    without_comment(line)
        .split_whitespace()
        .next()
        .is_some_and(|word| word.eq_ignore_ascii_case("ENDM") || word.eq_ignore_ascii_case("EOM"))
}

/// An invocation: the optional label, the macro's name and the
/// argument text.
struct Invocation<'a> {
    label: Option<&'a str>,
    name: SymbolName,
    arguments: Vec<String>,
}

fn split_arguments(text: &str) -> Vec<String> {
    let text = without_comment(text).trim();
    if text.is_empty() {
        Vec::new()
    } else {
        text.split(',').map(|arg| arg.trim().to_string()).collect()
    }
}

/// Returns the first whitespace-delimited word of `s` and the text
/// following it.
fn next_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

fn invocation<'a>(
    line: &'a str,
    macros: &BTreeMap<SymbolName, MacroDefinition>,
) -> Option<Invocation<'a>> {
    if line.starts_with('*') {
        return None;
    }
    let code = without_comment(line);
    let (first, after_first) = next_word(code)?;
    let is_macro = |word: &str| macros.contains_key(&SymbolName::from(word));
    if starts_in_column_one(line) {
        // The first word is the label; the operation follows it.
        let (second, after_second) = next_word(after_first)?;
        is_macro(second).then(|| Invocation {
            label: Some(first),
            name: SymbolName::from(second),
            arguments: split_arguments(after_second),
        })
    } else {
        is_macro(first).then(|| Invocation {
            label: None,
            name: SymbolName::from(first),
            arguments: split_arguments(after_first),
        })
    }
}

/// Replace the `&` parameters in one body line.
pub(crate) fn substitute(line: &str, arguments: &[String]) -> String {
    PARAMETER
        .replace_all(line, |caps: &Captures| match &caps[1] {
            "X" | "x" => arguments.len().to_string(),
            "0" => arguments.first().cloned().unwrap_or_default(),
            digit => digit
                .parse::<usize>()
                .ok()
                .and_then(|n| arguments.get(n - 1))
                .cloned()
                .unwrap_or_default(),
        })
        .into_owned()
}

struct Preprocessor {
    macros: BTreeMap<SymbolName, MacroDefinition>,
    output: Preprocessed,
    /// Number of lines produced by expansion so far.
    expanded_lines: usize,
    /// Whether the current top-level invocation has already been
    /// reported as nested too deeply.
    too_deep: bool,
    too_long: bool,
}

impl Preprocessor {
    fn emit(&mut self, number: LineNumber, text: String) {
        self.output.lines.push(SourceLine { number, text });
    }

    fn expand(&mut self, number: LineNumber, line: &str, depth: usize) {
        let Some(call) = invocation(line, &self.macros) else {
            self.emit(number, line.to_string());
            return;
        };
        if depth == 0 {
            self.too_deep = false;
        }
        if depth >= MAX_EXPANSION_DEPTH {
            if !self.too_deep {
                self.too_deep = true;
                self.output.diagnostics.push(Diagnostic::error(
                    DiagnosticKind::MacroRecursion,
                    Some(SourcePosition::new(number, 1)),
                    format!(
                        "expansion of macro {} is nested more than {MAX_EXPANSION_DEPTH} deep",
                        call.name
                    ),
                ));
            }
            return;
        }
        // The label keeps the operation field occupied, so that a
        // label which is also a keyword is still read as a label.
        if let Some(label) = call.label {
            self.emit(number, format!("{label} EQU *"));
        }
        let body: Vec<String> = match self.macros.get(&call.name) {
            Some(definition) => definition
                .body
                .iter()
                .map(|body_line| substitute(body_line, &call.arguments))
                .collect(),
            None => Vec::new(),
        };
        event!(
            Level::DEBUG,
            "expanding macro {} with {} argument(s) at line {number}",
            call.name,
            call.arguments.len()
        );
        for expanded in body {
            if self.expanded_lines >= MAX_EXPANDED_LINES {
                if !self.too_long {
                    self.too_long = true;
                    self.output.diagnostics.push(Diagnostic::error(
                        DiagnosticKind::MacroRecursion,
                        Some(SourcePosition::new(number, 1)),
                        format!("macro expansion produces more than {MAX_EXPANDED_LINES} lines"),
                    ));
                }
                return;
            }
            self.expanded_lines += 1;
            self.expand(number, &expanded, depth + 1);
        }
    }
}

/// Remove macro definitions from the input and expand every
/// invocation.  A macro must be defined before it is used.
pub(crate) fn preprocess(source: &str) -> Preprocessed {
    let mut pp = Preprocessor {
        macros: BTreeMap::new(),
        output: Preprocessed::default(),
        expanded_lines: 0,
        too_deep: false,
        too_long: false,
    };
    let mut defining: Option<MacroDefinition> = None;

    for (number, line) in numbered_lines(source) {
        if let Some(mut definition) = defining.take() {
            if is_end_of_definition(line) {
                event!(
                    Level::DEBUG,
                    "defined macro {} ({} lines)",
                    definition.name,
                    definition.body.len()
                );
                if let Some(previous) = pp.macros.remove(&definition.name) {
                    pp.output.diagnostics.push(Diagnostic::warning(
                        DiagnosticKind::DuplicateSymbol,
                        Some(definition.position),
                        format!(
                            "macro {} redefined (previous definition at {})",
                            definition.name, previous.position
                        ),
                    ));
                }
                pp.macros.insert(definition.name.clone(), definition);
            } else {
                definition.body.push(line.to_string());
                defining = Some(definition);
            }
        } else if let Some(name) = definition_name(line) {
            defining = Some(MacroDefinition {
                name: SymbolName::from(name),
                body: Vec::new(),
                position: SourcePosition::new(number, 1),
            });
        } else {
            pp.expand(number, line, 0);
        }
    }

    if let Some(definition) = defining {
        pp.output.diagnostics.push(Diagnostic::error(
            DiagnosticKind::UnterminatedMacro,
            Some(definition.position),
            format!("macro {} has no ENDM", definition.name),
        ));
    }
    pp.output
}
