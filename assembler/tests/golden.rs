use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use proptest::prelude::any;
use test_strategy::{proptest, Arbitrary};

use edasm::*;

fn get_test_input_file_name(relative_to_manifest: &str) -> PathBuf {
    let mut location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    location.push(relative_to_manifest);
    if location.exists() {
        location
    } else {
        panic!(
            "Cannot find input {relative_to_manifest}: {} does not exist",
            location.display()
        );
    }
}

fn get_temp_output_file_name() -> tempfile::TempPath {
    tempfile::Builder::new()
        .suffix(".bin")
        .tempfile()
        .expect("should be able to create a temporary file")
        .into_temp_path()
}

fn files_are_identical(expected: &OsStr, got: &OsStr) -> Result<(), String> {
    fn must_read(name: &OsStr) -> Vec<u8> {
        let mut body = Vec::new();
        File::open(name)
            .and_then(|mut f| f.read_to_end(&mut body))
            .unwrap_or_else(|e| panic!("should be able to read test file {name:?}: {e}"));
        body
    }

    let expected_body = must_read(expected);
    let got_body = must_read(got);
    if expected_body.len() != got_body.len() {
        return Err(format!(
            "wrong file length: {:?} is {} bytes but {:?} is {} bytes",
            expected,
            expected_body.len(),
            got,
            got_body.len()
        ));
    }
    for (offset, (expected_byte, got_byte)) in expected_body.iter().zip(got_body.iter()).enumerate() {
        if expected_byte != got_byte {
            return Err(format!(
                "difference at position {offset}: expected byte ${expected_byte:02X} but got ${got_byte:02X}"
            ));
        }
    }
    Ok(())
}

fn assembler_golden_output_test(
    input_relative_path: &str,
    golden_output_relative_path: &str,
) -> Result<(), String> {
    let input = get_test_input_file_name(input_relative_path);
    let golden = get_test_input_file_name(golden_output_relative_path);
    let actual_output = get_temp_output_file_name();

    match assemble_file(input.as_os_str(), &actual_output, OutputOptions::default()) {
        Ok(()) => match files_are_identical(golden.as_os_str(), actual_output.as_os_str()) {
            Ok(()) => Ok(()),
            Err(e) => Err(format!(
                "{} and {} are not identical: {e}",
                golden.display(),
                actual_output.display(),
            )),
        },
        Err(e) => Err(format!("failed to assemble {input_relative_path}: {e}")),
    }
}

#[test]
fn golden_output_assembling_hello_program() {
    assembler_golden_output_test("testdata/hello.s", "testdata/hello.bin")
        .expect("actual and golden outputs should have been identical");
}

#[test]
fn golden_output_assembling_program_with_macros_and_includes() {
    assembler_golden_output_test("testdata/macros.s", "testdata/macros.bin")
        .expect("actual and golden outputs should have been identical");
}

/// One line of a generated test program, none of which depends on
/// any other.
#[derive(Arbitrary, Debug, Clone)]
enum Line {
    Nop,
    LoadImmediate(u8),
    LoadZeroPage(u8),
    StoreAbsolute(#[strategy(0x100_u16..)] u16),
    Word(u16),
    Bytes(#[strategy(proptest::collection::vec(any::<u8>(), 1..5))] Vec<u8>),
    Text(#[strategy("[A-Z]{0,8}")] String),
    Reserve(#[strategy(0_u16..16)] u16),
    Skipped(u8),
}

impl Line {
    fn source(&self) -> String {
        match self {
            Line::Nop => " NOP".to_string(),
            Line::LoadImmediate(n) => format!(" LDA #{n}"),
            Line::LoadZeroPage(n) => format!(" LDA ${n:02X}"),
            Line::StoreAbsolute(n) => format!(" STA ${n:04X}"),
            Line::Word(n) => format!(" DW {n}"),
            Line::Bytes(values) => {
                let list: Vec<String> = values.iter().map(|v| format!("${v:02X}")).collect();
                format!(" DB {}", list.join(","))
            }
            Line::Text(s) => format!(" ASC \"{s}\""),
            Line::Reserve(n) => format!(" DS {n}"),
            Line::Skipped(n) => format!(" DO 0\n LDA #{n}\n FIN"),
        }
    }

    fn size(&self) -> usize {
        match self {
            Line::Nop => 1,
            Line::LoadImmediate(_) | Line::LoadZeroPage(_) | Line::Word(_) => 2,
            Line::StoreAbsolute(_) => 3,
            Line::Bytes(values) => values.len(),
            Line::Text(s) => s.len(),
            Line::Reserve(n) => usize::from(*n),
            Line::Skipped(_) => 0,
        }
    }
}

fn program(lines: &[Line]) -> String {
    let mut source = String::from(" ORG $1000\n");
    for line in lines {
        source.push_str(&line.source());
        source.push('\n');
    }
    source.push_str("THEEND RTS\n");
    source
}

#[proptest]
fn assembly_is_deterministic(#[strategy(proptest::collection::vec(any::<Line>(), 0..20))] lines: Vec<Line>) {
    let source = program(&lines);
    let options = AssemblerOptions {
        listing: true,
        ..AssemblerOptions::default()
    };
    let first = assemble(&source, &options);
    let second = assemble(&source, &options);
    assert_eq!(first, second);
}

#[proptest]
fn labels_agree_with_the_code_generated(
    #[strategy(proptest::collection::vec(any::<Line>(), 0..20))] lines: Vec<Line>,
) {
    let artifact = assemble(&program(&lines), &AssemblerOptions::default());
    assert_eq!(artifact.errors(), None);
    let size: usize = lines.iter().map(Line::size).sum();
    assert_eq!(artifact.bytes.len(), size + 1);
    let expected_end = 0x1000 + u16::try_from(size).expect("generated programs are small");
    assert_eq!(artifact.symbols.get("THEEND"), Some(&expected_end));
}
