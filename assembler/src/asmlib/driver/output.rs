use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{event, span, Level};

use super::super::engine::RelocationEntry;
use super::super::types::AssemblerFailure;
use super::AssemblyArtifact;

/// The linkage information of a relocatable program, in the text
/// form written to the `.rld` file:
///
/// ```text
/// RLD $4003 2
/// EXTRN PRINT
/// ENTRY MAIN $4000
/// ```
///
/// An entry point which was never defined has no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationDictionary<'a> {
    rld: &'a [RelocationEntry],
    externals: &'a [String],
    entries: Vec<(&'a str, Option<u16>)>,
}

impl<'a> From<&'a AssemblyArtifact> for RelocationDictionary<'a> {
    fn from(artifact: &'a AssemblyArtifact) -> RelocationDictionary<'a> {
        RelocationDictionary {
            rld: &artifact.rld,
            externals: &artifact.externals,
            entries: artifact
                .entries
                .iter()
                .map(|name| (name.as_str(), artifact.symbols.get(name).copied()))
                .collect(),
        }
    }
}

impl Display for RelocationDictionary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for entry in self.rld {
            writeln!(f, "RLD ${:04X} {}", entry.address, entry.size)?;
        }
        for name in self.externals {
            writeln!(f, "EXTRN {name}")?;
        }
        for (name, value) in &self.entries {
            match value {
                Some(value) => writeln!(f, "ENTRY {name} ${value:04X}")?,
                None => writeln!(f, "ENTRY {name}")?,
            }
        }
        Ok(())
    }
}

fn write_data<W: Write>(
    writer: &mut W,
    output_file_name: &Path,
    data: &[u8],
) -> Result<(), AssemblerFailure> {
    let mut inner = || -> Result<(), std::io::Error> {
        const OUTPUT_CHUNK_SIZE: usize = 1024;
        for chunk in data.chunks(OUTPUT_CHUNK_SIZE) {
            writer.write_all(chunk)?;
        }
        writer.flush()
    };
    inner().map_err(|error| AssemblerFailure::IoErrorOnOutput {
        filename: output_file_name.to_path_buf(),
        error,
    })
}

fn create(output_file_name: &Path) -> Result<BufWriter<File>, AssemblerFailure> {
    File::create(output_file_name)
        .map(BufWriter::new)
        .map_err(|error| AssemblerFailure::IoErrorOnOutput {
            filename: output_file_name.to_path_buf(),
            error,
        })
}

/// Write the assembled code, as a flat binary image.
///
/// # Errors
///
/// Failure to create or write the output file.
pub(crate) fn write_object_file(
    bytes: &[u8],
    output_file_name: &Path,
) -> Result<(), AssemblerFailure> {
    let span = span!(Level::ERROR, "write object file");
    let _enter = span.enter();
    event!(
        Level::DEBUG,
        "writing {} bytes to {}",
        bytes.len(),
        output_file_name.display()
    );
    write_data(&mut create(output_file_name)?, output_file_name, bytes)
}

/// # Errors
///
/// Failure to create or write the output file.
pub(crate) fn write_relocation_dictionary(
    dictionary: &RelocationDictionary<'_>,
    output_file_name: &Path,
) -> Result<(), AssemblerFailure> {
    let span = span!(Level::ERROR, "write relocation dictionary");
    let _enter = span.enter();
    let text = dictionary.to_string();
    write_data(&mut create(output_file_name)?, output_file_name, text.as_bytes())
}

#[test]
fn test_relocation_dictionary_text() {
    let artifact = AssemblyArtifact {
        bytes: vec![0x20, 0x00, 0x00],
        symbols: [("MAIN".to_string(), 0x4000_u16)].into_iter().collect(),
        listing: None,
        diagnostics: Vec::new(),
        relocatable: true,
        rld: vec![RelocationEntry {
            address: 0x4001,
            size: 2,
        }],
        externals: vec!["PRINT".to_string()],
        entries: vec!["MAIN".to_string(), "LATER".to_string()],
    };
    assert_eq!(
        RelocationDictionary::from(&artifact).to_string(),
        "RLD $4001 2\nEXTRN PRINT\nENTRY MAIN $4000\nENTRY LATER\n"
    );
}
