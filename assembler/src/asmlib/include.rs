//! Expansion of `INCLUDE` (and `PUT`) statements.
//!
//! Each included file is lexed and parsed afresh and its statements
//! replace the `INCLUDE` line.  Failing to read a file, or including
//! a file which is already being included, is reported but does not
//! stop the assembly; the `INCLUDE` line then simply contributes no
//! statements.
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{event, Level};

use super::ast::Statement;
use super::directive::Directive;
use super::parser;
use super::symbol::strip_quotes;
use super::types::{Diagnostic, DiagnosticKind};

/// The file name given to an `INCLUDE` directive.  It may be quoted
/// or not.
fn include_target(statement: &Statement) -> Option<String> {
    let name = match statement.string_operand() {
        Some(quoted) => quoted.to_string(),
        None => strip_quotes(&statement.operand_text()).to_string(),
    };
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// The key under which a file is recorded as being visited.  Two
/// spellings of the same path should have the same key.
pub(crate) fn visit_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Replace each `INCLUDE` statement with the statements of the file
/// it names.  Relative names are resolved against `base_path`;
/// `visited` holds the files which are currently being included, so
/// that an include cycle can be detected.
pub(crate) fn expand(
    statements: Vec<Statement>,
    base_path: &Path,
    visited: &BTreeSet<PathBuf>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Statement> {
    let mut output: Vec<Statement> = Vec::with_capacity(statements.len());
    for statement in statements {
        if statement.directive() != Some(Directive::Include) {
            output.push(statement);
            continue;
        }
        let Some(name) = include_target(&statement) else {
            diagnostics.push(Diagnostic::error(
                DiagnosticKind::MissingOperand,
                Some(statement.position),
                "INCLUDE needs a file name",
            ));
            continue;
        };
        let name_as_path = Path::new(&name);
        let path: PathBuf = if name_as_path.is_absolute() {
            name_as_path.to_path_buf()
        } else {
            base_path.join(name_as_path)
        };
        let key = visit_key(&path);
        if visited.contains(&key) {
            diagnostics.push(Diagnostic::error(
                DiagnosticKind::CircularInclude,
                Some(statement.position),
                format!("circular include of {}", path.display()),
            ));
            continue;
        }
        match fs::read_to_string(&path) {
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::IncludeFailed,
                    Some(statement.position),
                    format!("cannot read include file {}: {e}", path.display()),
                ));
            }
            Ok(body) => {
                event!(Level::DEBUG, "including {}", path.display());
                let mut branch_visited = visited.clone();
                branch_visited.insert(key);
                let child_base: &Path = path.parent().unwrap_or(base_path);
                let included = parser::parse_source(&body);
                output.extend(expand(included, child_base, &branch_visited, diagnostics));
            }
        }
    }
    output
}
