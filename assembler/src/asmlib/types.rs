use std::error::Error;
use std::ffi::{OsStr, OsString};
use std::fmt::{self, Display, Formatter};
use std::io::Error as IoError;
use std::path::PathBuf;

use serde::Serialize;

use super::source::SourcePosition;

/// LineNumber values are 1-based, as in the listing.
pub(crate) type LineNumber = u32;

/// The assembler never stops on a bad statement; problems with the
/// program being assembled are collected as `Diagnostic` values.
/// `AssemblerFailure` is for the things that stop the driver itself,
/// such as being unable to read the input file.
#[derive(Debug)]
pub enum AssemblerFailure {
    IoErrorOnStdout {
        error: IoError,
    },
    IoErrorOnInput {
        filename: OsString,
        error: IoError,
    },
    IoErrorOnOutput {
        filename: PathBuf,
        error: IoError,
    },
    ProgramHasErrors {
        filename: OsString,
        error_count: usize,
    },
}

fn write_os_string(f: &mut Formatter<'_>, s: &OsStr) -> Result<(), fmt::Error> {
    match s.to_str() {
        Some(unicode_name) => f.write_str(unicode_name),
        None => write!(
            f,
            "{} (some non-Unicode characters changed to make it printable)",
            s.to_string_lossy(),
        ),
    }
}

impl Display for AssemblerFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            AssemblerFailure::IoErrorOnStdout { error } => {
                write!(f, "error writing on stdout: {}", error)
            }
            AssemblerFailure::IoErrorOnInput { filename, error } => {
                f.write_str("I/O error reading input file ")?;
                write_os_string(f, filename)?;
                write!(f, ": {}", error)
            }
            AssemblerFailure::IoErrorOnOutput { filename, error } => {
                write!(
                    f,
                    "I/O error writing output file {}: {error}",
                    filename.display(),
                )
            }
            AssemblerFailure::ProgramHasErrors {
                filename,
                error_count,
            } => {
                write_os_string(f, filename)?;
                write!(
                    f,
                    ": {error_count} error{} found, no output written",
                    if *error_count == 1 { "" } else { "s" }
                )
            }
        }
    }
}

impl Error for AssemblerFailure {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    UnknownOpcode,
    InvalidAddressingMode,
    UndefinedSymbol,
    BranchOutOfRange,
    StringTooLong,
    ValueOutOfRange,
    DivisionByZero,
    InvalidHexDigits,
    MissingOperand,
    IncludeFailed,
    CircularInclude,
    UnterminatedMacro,
    MacroRecursion,
    UnbalancedConditional,
    DuplicateSymbol,
    UndefinedEntry,
    /// Raised by the program itself, with `FAIL`.
    UserFailure,
    /// An `ORG` or `DS` operand whose value was not known when the
    /// first pass laid out the program.
    ForwardReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub position: Option<SourcePosition>,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn error<S: Into<String>>(
        kind: DiagnosticKind,
        position: Option<SourcePosition>,
        message: S,
    ) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            kind,
            position,
            message: message.into(),
        }
    }

    pub(crate) fn warning<S: Into<String>>(
        kind: DiagnosticKind,
        position: Option<SourcePosition>,
        message: S,
    ) -> Diagnostic {
        Diagnostic {
            severity: Severity::Warning,
            kind,
            position,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(position) = &self.position {
            write!(f, "{position}: ")?;
        }
        write!(f, "{}: {}", self.severity, self.message)
    }
}

#[test]
fn test_diagnostic_display() {
    let d = Diagnostic::error(
        DiagnosticKind::UndefinedSymbol,
        Some(SourcePosition::new(3, 9)),
        "undefined symbol FOO",
    );
    assert_eq!(d.to_string(), "line 3, column 9: error: undefined symbol FOO");
    let w = Diagnostic::warning(DiagnosticKind::UndefinedEntry, None, "entry MAIN is never defined");
    assert_eq!(w.to_string(), "warning: entry MAIN is never defined");
    assert!(d.is_error());
    assert!(!w.is_error());
}

#[test]
fn test_program_has_errors_display() {
    let f = AssemblerFailure::ProgramHasErrors {
        filename: OsString::from("prog.s"),
        error_count: 1,
    };
    assert_eq!(f.to_string(), "prog.s: 1 error found, no output written");
}
