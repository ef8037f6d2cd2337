use std::fs;
use std::path::Path;

use super::super::types::DiagnosticKind;
use super::*;

fn assemble_default(source: &str) -> AssemblyArtifact {
    assemble(source, &AssemblerOptions::default())
}

fn assemble_clean(source: &str) -> Vec<u8> {
    let artifact = assemble_default(source);
    assert_eq!(artifact.errors(), None);
    artifact.bytes
}

fn error_kinds(artifact: &AssemblyArtifact) -> Vec<DiagnosticKind> {
    artifact
        .diagnostics
        .iter()
        .filter(|d| d.is_error())
        .map(|d| d.kind)
        .collect()
}

fn write_file(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).expect("should be able to write test file");
}

#[test]
fn test_macro_expansion_matches_hand_written_code() {
    let with_macro = assemble_clean(concat!(
        "STORE    MACRO\n",
        "         LDA #&1\n",
        "         STA &2\n",
        "         ENDM\n",
        "         STORE $42,$2000\n",
    ));
    let by_hand = assemble_clean(" LDA #$42\n STA $2000\n");
    assert_eq!(with_macro, by_hand);
    assert_eq!(with_macro, vec![0xA9, 0x42, 0x8D, 0x00, 0x20]);
}

#[test]
fn test_macro_called_more_than_once() {
    let bytes = assemble_clean(concat!(
        "STORE MACRO\n",
        " LDA #&1\n",
        " STA &2\n",
        " ENDM\n",
        " STORE $01,$10\n",
        " STORE $02,$11\n",
    ));
    assert_eq!(bytes, vec![0xA9, 0x01, 0x85, 0x10, 0xA9, 0x02, 0x85, 0x11]);
}

#[test]
fn test_macro_argument_count_and_generated_label() {
    assert_eq!(
        assemble_clean("COUNT MACRO\n LDA #&X\n ENDM\n COUNT A,B,C"),
        vec![0xA9, 0x03]
    );
    assert_eq!(
        assemble_clean("LOOP MACRO\n&0 LDA #$00\n BNE &0\n ENDM\n LOOP START\n RTS"),
        vec![0xA9, 0x00, 0xD0, 0xFC, 0x60]
    );
}

#[test]
fn test_labels_beside_macro_names() {
    let artifact = assemble_default(concat!(
        "INCR MACRO\n",
        " INC &1\n",
        " ENDM\n",
        " ORG $300\n",
        "PAGE INCR $10\n",
        "INCR LDA #1\n",
    ));
    assert_eq!(artifact.errors(), None);
    assert_eq!(artifact.bytes, vec![0xE6, 0x10, 0xA9, 0x01]);
    assert_eq!(artifact.symbols.get("PAGE"), Some(&0x300));
    assert_eq!(artifact.symbols.get("INCR"), Some(&0x302));
}

#[test]
fn test_macro_problems_are_errors() {
    let artifact = assemble_default("OOPS MACRO\n NOP");
    assert_eq!(error_kinds(&artifact), vec![DiagnosticKind::UnterminatedMacro]);
    assert!(artifact.bytes.is_empty());
}

#[test]
fn test_symbols_and_errors() {
    let artifact = assemble_default(" ORG $300\nSTART LDA NOWHERE\nEND RTS");
    assert_eq!(artifact.symbols.get("START"), Some(&0x300));
    assert_eq!(artifact.symbols.get("END"), Some(&0x303));
    assert_eq!(
        artifact.errors(),
        Some(vec![
            "line 2, column 1: error: undefined symbol NOWHERE".to_string()
        ])
    );
    assert_eq!(artifact.error_count(), 1);
    assert!(artifact.warnings().is_empty());
    // The rest of the program is still assembled.
    assert_eq!(artifact.bytes, vec![0xAD, 0x00, 0x00, 0x60]);
}

#[test]
fn test_warnings_are_not_errors() {
    let artifact = assemble_default(" ENTRY MAIN\n RTS");
    assert_eq!(artifact.errors(), None);
    assert_eq!(
        artifact.warnings(),
        vec!["warning: entry point MAIN is never defined".to_string()]
    );
}

#[test]
fn test_relocatable_artifact() {
    let artifact = assemble_default(" REL\n EXTRN COUT\nMAIN JSR COUT\n ENTRY MAIN\n RTS");
    assert!(artifact.relocatable);
    assert_eq!(artifact.externals, vec!["COUT".to_string()]);
    assert_eq!(artifact.entries, vec!["MAIN".to_string()]);
    assert_eq!(artifact.rld, vec![RelocationEntry { address: 1, size: 2 }]);
    assert_eq!(
        RelocationDictionary::from(&artifact).to_string(),
        "RLD $0001 2\nEXTRN COUT\nENTRY MAIN $0000\n"
    );
}

#[test]
fn test_options() {
    let options = AssemblerOptions {
        listing: true,
        msb_default_on: true,
        ..AssemblerOptions::default()
    };
    let artifact = assemble(" ASC \"A\"", &options);
    assert_eq!(artifact.bytes, vec![0xC1]);
    let listing = artifact.listing.expect("a listing was requested");
    assert!(listing.contains("0000 C1 "), "{listing}");
    assert!(assemble_default(" NOP").listing.is_none());
}

#[test]
fn test_include() {
    let dir = tempfile::tempdir().expect("should be able to create a temporary directory");
    write_file(dir.path(), "defs.s", "SCREEN EQU $0400\nZP EQU $06\n");
    let options = AssemblerOptions {
        base_path: dir.path().to_path_buf(),
        ..AssemblerOptions::default()
    };
    let artifact = assemble(" INCLUDE \"defs.s\"\n LDA ZP\n STA SCREEN", &options);
    assert_eq!(artifact.errors(), None);
    assert_eq!(artifact.bytes, vec![0xA5, 0x06, 0x8D, 0x00, 0x04]);
}

#[test]
fn test_include_problems() {
    let dir = tempfile::tempdir().expect("should be able to create a temporary directory");
    write_file(dir.path(), "loop.s", " NOP\n INCLUDE loop.s\n");
    let options = AssemblerOptions {
        base_path: dir.path().to_path_buf(),
        ..AssemblerOptions::default()
    };
    let artifact = assemble(" INCLUDE loop.s\n INCLUDE missing.s\n RTS", &options);
    assert_eq!(
        error_kinds(&artifact),
        vec![DiagnosticKind::CircularInclude, DiagnosticKind::IncludeFailed]
    );
    assert_eq!(artifact.bytes, vec![0xEA, 0x60]);
}

#[test]
fn test_assemble_file() {
    let dir = tempfile::tempdir().expect("should be able to create a temporary directory");
    write_file(dir.path(), "lib.s", "PRINT EQU $FDED\n");
    write_file(
        dir.path(),
        "main.s",
        " ORG $800\n INCLUDE lib.s\n LDA #$C1\n JSR PRINT\n RTS\n",
    );
    let input = dir.path().join("main.s");
    let output = dir.path().join("main.bin");
    assemble_file(input.as_os_str(), &output, OutputOptions::default())
        .expect("assembly should succeed");
    assert_eq!(
        fs::read(&output).expect("output file should exist"),
        vec![0xA9, 0xC1, 0x20, 0xED, 0xFD, 0x60]
    );
    // An absolute program has no relocation dictionary.
    assert!(!relocation_dictionary_path(&output).exists());
}

#[test]
fn test_assemble_file_writes_relocation_dictionary() {
    let dir = tempfile::tempdir().expect("should be able to create a temporary directory");
    write_file(dir.path(), "mod.s", " REL\nHERE JMP HERE\n");
    let input = dir.path().join("mod.s");
    let output = dir.path().join("mod.obj");
    assemble_file(input.as_os_str(), &output, OutputOptions::default())
        .expect("assembly should succeed");
    assert_eq!(
        fs::read_to_string(relocation_dictionary_path(&output))
            .expect("relocation dictionary should exist"),
        "RLD $0001 2\n"
    );
}

#[test]
fn test_assemble_file_with_errors_writes_nothing() {
    let dir = tempfile::tempdir().expect("should be able to create a temporary directory");
    write_file(dir.path(), "bad.s", " FROB\n BNE NOWHERE\n");
    let input = dir.path().join("bad.s");
    let output = dir.path().join("bad.bin");
    match assemble_file(input.as_os_str(), &output, OutputOptions::default()) {
        Err(AssemblerFailure::ProgramHasErrors { error_count, .. }) => {
            assert_eq!(error_count, 2);
        }
        other => panic!("expected ProgramHasErrors, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_assemble_file_missing_input() {
    let dir = tempfile::tempdir().expect("should be able to create a temporary directory");
    let input = dir.path().join("absent.s");
    let result = assemble_file(
        input.as_os_str(),
        &dir.path().join("out.bin"),
        OutputOptions::default(),
    );
    assert!(matches!(
        result,
        Err(AssemblerFailure::IoErrorOnInput { .. })
    ));
}

#[test]
fn test_main_file_cannot_include_itself() {
    let dir = tempfile::tempdir().expect("should be able to create a temporary directory");
    write_file(dir.path(), "self.s", " NOP\n INCLUDE self.s\n");
    let input = dir.path().join("self.s");
    match assemble_file(
        input.as_os_str(),
        &dir.path().join("self.bin"),
        OutputOptions::default(),
    ) {
        Err(AssemblerFailure::ProgramHasErrors { error_count, .. }) => {
            assert_eq!(error_count, 1);
        }
        other => panic!("expected ProgramHasErrors, got {other:?}"),
    }
}

#[test]
fn test_include_dir_option() {
    let dir = tempfile::tempdir().expect("should be able to create a temporary directory");
    let libs = dir.path().join("libs");
    fs::create_dir(&libs).expect("should be able to create a subdirectory");
    write_file(&libs, "zp.s", "PTR EQU $FE\n");
    write_file(dir.path(), "prog.s", " INCLUDE zp.s\n LDA (PTR),Y\n");
    let output = dir.path().join("prog.bin");
    assemble_file(
        dir.path().join("prog.s").as_os_str(),
        &output,
        OutputOptions {
            include_dir: Some(libs),
            ..OutputOptions::default()
        },
    )
    .expect("assembly should succeed");
    assert_eq!(
        fs::read(&output).expect("output file should exist"),
        vec![0xB1, 0xFE]
    );
}
