use std::error::Error;
use std::ffi::OsString;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use clap::ArgAction::{Set, SetTrue};
use clap::Parser;
use tracing::{event, span, Level};
use tracing_subscriber::prelude::*;

use edasm::{assemble_file, AssemblerFailure, OutputOptions};

/// Two-pass cross-assembler for EDASM-style 6502 source
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// File from which assembly source is read.
    #[clap(action = Set)]
    input: OsString,

    /// File to which the object code is written.  A relocatable
    /// program also gets a relocation dictionary in OUTPUT.rld.
    #[clap(action = Set, short = 'o', long)]
    output: OsString,

    /// Print the assembly listing on standard output.
    #[clap(action = SetTrue, long)]
    list: bool,

    /// Start with the MSB setting on, so that ASC and STR set the
    /// top bit of each character.
    #[clap(action = SetTrue, long = "msb-on")]
    msb_on: bool,

    /// Directory in which INCLUDE files are found (the default is the
    /// directory holding the input file).
    #[clap(action = Set, long = "include-dir")]
    include_dir: Option<PathBuf>,
}

#[derive(Debug)]
enum Fail {
    /// The assembler ran, but failed.
    AsmFail(AssemblerFailure),
    /// We were not able to set up the assembler.
    InitialisationFailure(String),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fail::AsmFail(assembler_failure) => assembler_failure.fmt(f),
            Fail::InitialisationFailure(msg) => f.write_str(msg.as_str()),
        }
    }
}

impl Error for Fail {}

fn run_assembler() -> Result<(), Fail> {
    let cli = Cli::parse();

    // Use RUST_LOG to select which trace messages get printed, for
    // example RUST_LOG=edasm=debug.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
    {
        Err(e) => {
            return Err(Fail::InitialisationFailure(format!(
                "failed to initialise tracing filter (perhaps there is a problem with environment variables): {e}"
            )));
        }
        Ok(layer) => layer,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let span = span!(Level::ERROR, "edasm", input=?cli.input, output=?cli.output);
    let _enter = span.enter();
    let output_path = PathBuf::from(cli.output);
    let options = OutputOptions {
        list: cli.list,
        msb_default_on: cli.msb_on,
        include_dir: cli.include_dir,
    };
    let result = assemble_file(&cli.input, &output_path, options).map_err(Fail::AsmFail);
    if let Err(e) = &result {
        event!(Level::ERROR, "assembly failed: {:?}", e);
    } else {
        event!(Level::INFO, "assembly succeeded");
    }
    result
}

fn main() {
    unsafe { backtrace_on_stack_overflow::enable() };

    match run_assembler() {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
