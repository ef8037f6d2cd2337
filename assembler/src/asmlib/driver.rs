//! The assembler's entry points: [`assemble`] for source text held
//! in memory, and [`assemble_file`] for the command-line tool.
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{event, span, Level};

use super::engine::{self, EngineOptions, RelocationEntry};
use super::include;
use super::lexer;
use super::macros;
use super::parser;
use super::types::{AssemblerFailure, Diagnostic};

mod output;
#[cfg(test)]
mod tests;

pub use output::RelocationDictionary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Produce a listing.
    pub listing: bool,
    /// Initial state of the `MSB` setting.
    pub msb_default_on: bool,
    /// Relative `INCLUDE` file names are resolved against this.
    pub base_path: PathBuf,
}

impl Default for AssemblerOptions {
    fn default() -> AssemblerOptions {
        AssemblerOptions {
            listing: false,
            msb_default_on: false,
            base_path: PathBuf::from("."),
        }
    }
}

/// Everything the assembler produced for one program.
///
/// Assembly always produces an artifact, even for a program with
/// errors; `bytes` then holds the code for the statements which
/// could be assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblyArtifact {
    pub bytes: Vec<u8>,
    pub symbols: BTreeMap<String, u16>,
    pub listing: Option<String>,
    /// All the problems found, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
    /// Set by `REL`, `EXTRN` or `ENTRY`.
    pub relocatable: bool,
    pub rld: Vec<RelocationEntry>,
    pub externals: Vec<String>,
    pub entries: Vec<String>,
}

impl AssemblyArtifact {
    /// The error messages, or `None` if there were no errors.
    #[must_use]
    pub fn errors(&self) -> Option<Vec<String>> {
        let errors: Vec<String> = self
            .diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(ToString::to_string)
            .collect();
        if errors.is_empty() {
            None
        } else {
            Some(errors)
        }
    }

    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .filter(|d| !d.is_error())
            .map(ToString::to_string)
            .collect()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

/// Assemble a complete program.
///
/// Problems with the program are reported in the artifact's
/// diagnostics; this function itself cannot fail.
#[must_use]
pub fn assemble(source: &str, options: &AssemblerOptions) -> AssemblyArtifact {
    assemble_source(source, options, &BTreeSet::new())
}

/// Assemble `source`, treating the files in `visited` as already
/// being included (so that including one of them again is a cycle).
fn assemble_source(
    source: &str,
    options: &AssemblerOptions,
    visited: &BTreeSet<PathBuf>,
) -> AssemblyArtifact {
    let span = span!(Level::ERROR, "assemble", base_path=?options.base_path);
    let _enter = span.enter();

    let preprocessed = macros::preprocess(source);
    let tokens = lexer::tokenize_lines(preprocessed.numbered_lines());
    let mut diagnostics: Vec<Diagnostic> = preprocessed.diagnostics;
    let statements = include::expand(
        parser::parse(&tokens),
        &options.base_path,
        visited,
        &mut diagnostics,
    );
    event!(
        Level::DEBUG,
        "{} statements to assemble after macro and include expansion",
        statements.len()
    );

    let output = engine::run(
        &statements,
        EngineOptions {
            listing: options.listing,
            msb_default_on: options.msb_default_on,
        },
    );
    diagnostics.extend(output.diagnostics);
    AssemblyArtifact {
        bytes: output.bytes,
        symbols: output
            .symbols
            .values()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        listing: output.listing,
        diagnostics,
        relocatable: output.relocatable,
        rld: output.rld,
        externals: output.externals.iter().map(ToString::to_string).collect(),
        entries: output.entries.iter().map(ToString::to_string).collect(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// If true, print the listing on standard output.
    pub list: bool,
    pub msb_default_on: bool,
    /// Where `INCLUDE` files are found.  The default is the directory
    /// holding the input file.
    pub include_dir: Option<PathBuf>,
}

fn default_include_dir(input_file: &Path) -> PathBuf {
    match input_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// The name of the relocation dictionary written alongside
/// `output_file`.
#[must_use]
pub fn relocation_dictionary_path(output_file: &Path) -> PathBuf {
    let mut name = output_file.as_os_str().to_owned();
    name.push(".rld");
    PathBuf::from(name)
}

fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        if diagnostic.is_error() {
            event!(Level::ERROR, "{diagnostic}");
        } else {
            event!(Level::WARN, "{diagnostic}");
        }
    }
}

/// Assemble the program in `input_file`, writing the object code to
/// `output_file`.  A relocatable program also gets a relocation
/// dictionary (see [`relocation_dictionary_path`]).
///
/// # Errors
///
/// - Failure to read the input file or write the output files.
/// - Failure to write the listing on standard output.
/// - The program has errors; no output file is written then.
pub fn assemble_file(
    input_file: &OsStr,
    output_file: &Path,
    options: OutputOptions,
) -> Result<(), AssemblerFailure> {
    let span = span!(Level::ERROR, "assemble file", input=?input_file, output=?output_file);
    let _enter = span.enter();

    let input_path = Path::new(input_file);
    let source = fs::read_to_string(input_path).map_err(|error| AssemblerFailure::IoErrorOnInput {
        filename: input_file.to_owned(),
        error,
    })?;
    let assembler_options = AssemblerOptions {
        listing: options.list,
        msb_default_on: options.msb_default_on,
        base_path: options
            .include_dir
            .unwrap_or_else(|| default_include_dir(input_path)),
    };
    let visited = BTreeSet::from([include::visit_key(input_path)]);
    let artifact = assemble_source(&source, &assembler_options, &visited);
    report_diagnostics(&artifact.diagnostics);

    if let Some(listing) = &artifact.listing {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(listing.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|error| AssemblerFailure::IoErrorOnStdout { error })?;
    }

    let error_count = artifact.error_count();
    if error_count > 0 {
        return Err(AssemblerFailure::ProgramHasErrors {
            filename: input_file.to_owned(),
            error_count,
        });
    }
    output::write_object_file(&artifact.bytes, output_file)?;
    if artifact.relocatable {
        output::write_relocation_dictionary(
            &RelocationDictionary::from(&artifact),
            &relocation_dictionary_path(output_file),
        )?;
    }
    event!(
        Level::INFO,
        "wrote {} bytes to {}",
        artifact.bytes.len(),
        output_file.display()
    );
    Ok(())
}
