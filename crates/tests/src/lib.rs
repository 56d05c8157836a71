//! End-to-end test harness for the SQUINT pipeline.
//!
//! Wraps the full source-to-artifact path (parse → validate → emit →
//! simulate) behind a few panicking helpers so scenario tests stay
//! focused on behavior.

use squint_ast::ProgramIR;
use squint_compiler::{compile, CompileError, CompileOptions, CompileOutput};
use squint_runtime::SimTrace;

/// The calibrated-EPR scenario source used across scenario tests.
pub const CALIBRATED_EPR: &str = "\
workspace Chip {
    qubits q[4];
    lattice L(2,2) attach q;
    semantic_field Phi: scalar on L;
    defect_field D: defects on L {};
}
kernel K on Chip {
    ctrl rx q[0] angle=π/2 with overlay { coherence_len >= 80ns };
    ctrl cz q[0], q[1] with overlay { coherence_len >= 120ns, path_len <= 2 };
    measure q[0] -> m0;
    measure q[1] -> m1;
    return { m0 ⊕ m1 };
}
";

/// Compile with default (non-strict) options.
///
/// # Panics
///
/// Panics if compilation fails.
pub fn compile_source(source: &str) -> CompileOutput {
    compile(source, CompileOptions::default()).expect("compilation failed")
}

/// Compile with strict overlays enabled.
pub fn compile_strict(source: &str) -> Result<CompileOutput, CompileError> {
    compile(
        source,
        CompileOptions {
            strict_overlays: true,
        },
    )
}

/// Parse only.
///
/// # Panics
///
/// Panics if the source does not parse.
pub fn parse_source(source: &str) -> ProgramIR {
    squint_parser::parse(source).expect("parse failed")
}

/// Parse and simulate.
pub fn simulate_source(source: &str) -> SimTrace {
    squint_runtime::simulate(&parse_source(source))
}

/// Pretty JSON for byte-level determinism comparisons.
pub fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).expect("serialization failed")
}
