//! squint — compile a `.squint` program into control text, an event log,
//! and a deterministic simulation trace.
//!
//! The binary is a thin shell: argument parsing, file I/O, and exit-code
//! mapping. All compilation logic lives in the library crates.
//!
//! Exit codes: 0 success, 1 parse error, 2 overlay error in strict mode,
//! 3 I/O error.

use clap::Parser;
use squint_compiler::{compile, CompileError, CompileOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "squint")]
#[command(about = "Compile a .squint program into control text, an event log, and a simulation trace")]
struct Cli {
    /// Path to the source program
    #[arg(default_value = "CalibratedEPR.squint")]
    file: PathBuf,

    /// Output path for the control text (default: <FILE>.qua.txt)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write <FILE>.log.json with per-operation events and the timeline
    #[arg(long)]
    log: bool,

    /// Run the toy simulator and write <FILE>.sim.json and <FILE>.sim.txt
    #[arg(long)]
    simulate: bool,

    /// Treat malformed or violated overlays as hard errors
    #[arg(long)]
    strict_overlays: bool,
}

const EXIT_PARSE: u8 = 1;
const EXIT_OVERLAY: u8 = 2;
const EXIT_IO: u8 = 3;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run(cli: &Cli) -> Result<(), u8> {
    let source = std::fs::read_to_string(&cli.file).map_err(|e| {
        eprintln!("error: cannot read {}: {e}", cli.file.display());
        EXIT_IO
    })?;

    let options = CompileOptions {
        strict_overlays: cli.strict_overlays,
    };
    let output = compile(&source, options).map_err(|e| match e {
        CompileError::Parse(err) => {
            eprintln!("parse error: {err}");
            EXIT_PARSE
        }
        CompileError::Overlay(err) => {
            eprintln!("overlay error: {err}");
            EXIT_OVERLAY
        }
    })?;

    for diagnostic in &output.diagnostics {
        eprintln!("{diagnostic}");
    }

    let program = &output.program;
    let ws = &program.workspace;
    info!(
        workspace = %ws.name,
        qubits = ws.qubits,
        lattice = %ws.lattice,
        kernel = %program.kernel.name,
        operations = program.kernel.operations.len(),
        "compiled program"
    );
    for (i, op) in program.kernel.operations.iter().enumerate() {
        info!(
            "  {i}: {:<16} -> {:<8} @ line {}",
            op.op.name(),
            op.kind().to_string(),
            op.line
        );
    }

    let out_path = cli
        .out
        .clone()
        .unwrap_or_else(|| cli.file.with_extension("qua.txt"));
    write_artifact(&out_path, &output.control_text)?;
    info!(path = %out_path.display(), "control text written");

    if cli.log {
        let json = to_pretty_json(&output.log_document())?;
        let path = cli.file.with_extension("log.json");
        write_artifact(&path, &json)?;
        info!(path = %path.display(), "event log written");
    }

    if cli.simulate {
        let trace = squint_runtime::simulate(program);
        let json_path = cli.file.with_extension("sim.json");
        write_artifact(&json_path, &to_pretty_json(&trace)?)?;
        let report = squint_runtime::render_report(&trace);
        write_artifact(&cli.file.with_extension("sim.txt"), &report)?;
        info!(path = %json_path.display(), "simulation trace written");
        print!("{report}");
    }

    Ok(())
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, u8> {
    serde_json::to_string_pretty(value)
        .map(|mut s| {
            s.push('\n');
            s
        })
        .map_err(|e| {
            eprintln!("error: serialization failed: {e}");
            EXIT_IO
        })
}

fn write_artifact(path: &Path, contents: &str) -> Result<(), u8> {
    std::fs::write(path, contents).map_err(|e| {
        eprintln!("error: cannot write {}: {e}", path.display());
        EXIT_IO
    })
}
