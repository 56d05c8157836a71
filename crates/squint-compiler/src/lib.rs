//! SQUINT compilation pipeline.
//!
//! Single entry point for source-to-artifact compilation:
//!
//! 1. **Parse** — `squint-parser` builds the program IR.
//! 2. **Validate** — `squint-validate` checks overlay constraints and
//!    field references; strict mode turns faults into hard errors.
//! 3. **Emit** — one joint walk produces the control text and the
//!    timeline under a shared nanosecond cursor.
//!
//! The core surfaces exactly two error kinds, [`ParseError`] and
//! [`OverlayError`], unified in [`CompileError`]. File I/O and JSON
//! serialization belong to the outer shell.

pub mod emit;
pub mod log;
pub mod timeline;

pub use log::{LogDocument, LogEvent};
pub use squint_parser::ParseError;
pub use squint_validate::OverlayError;
pub use timeline::TimelineEntry;

use squint_ast::{Diagnostic, ProgramIR};
use thiserror::Error;
use tracing::{debug, info};

/// Compilation options. `strict_overlays` is threaded through as a plain
/// value; there is no global mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    pub strict_overlays: bool,
}

/// The two error kinds that can escape the core.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

/// Everything a successful compile produces, in memory.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub program: ProgramIR,
    pub control_text: String,
    pub timeline: Vec<TimelineEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    /// Build the `.log.json` document for this compile.
    pub fn log_document(&self) -> LogDocument {
        LogDocument::new(self)
    }
}

/// Compile a source string into control text, timeline, and diagnostics.
///
/// In strict mode the first malformed or violated overlay aborts before
/// any artifact is produced.
pub fn compile(source: &str, options: CompileOptions) -> Result<CompileOutput, CompileError> {
    let program = squint_parser::parse(source)?;
    info!(
        workspace = %program.workspace.name,
        kernel = %program.kernel.name,
        operations = program.kernel.operations.len(),
        "parsed program"
    );

    let diagnostics = squint_validate::validate(&program, options.strict_overlays)?;
    let (control_text, timeline) = emit::emit(&program);
    debug!(entries = timeline.len(), "emission complete");

    Ok(CompileOutput {
        program,
        control_text,
        timeline,
        diagnostics,
    })
}
