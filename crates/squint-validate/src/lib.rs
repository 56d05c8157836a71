//! Overlay constraint validation.
//!
//! Runs once over the parsed IR, before emission. For every `ctrl`
//! operation the recognized overlay keys are checked: timing
//! (`coherence_len`), connectivity (`path_len` against the lattice),
//! referential existence (`damping`, `braid`), and Floquet scheduling
//! (`floquet_period`, `cycles`, `duty`, `phase_step`). Structured field
//! references on semantic/braid operations are checked against the
//! workspace declarations as well.
//!
//! Findings fall into three classes:
//!
//! - notes (satisfied or recognized-only keys) → Info
//! - unknown keys and informational-only faults → Warn, never fatal
//! - malformed or violated constraints → Warn, promoted to a hard
//!   [`OverlayError`] in strict mode
//!
//! In strict mode the first promoted finding aborts validation; nothing
//! downstream (control text, timeline) is produced.

use squint_ast::{
    Diagnostic, OpKind, Operation, OperationIR, OverlayValue, ProgramIR, QubitRef, WorkspaceIR,
};
use thiserror::Error;
use tracing::debug;

/// Overlay constraint violated or malformed while strict mode is in
/// effect. Fatal: compilation stops at the offending operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("overlay unsatisfied on line {line}: {message}")]
pub struct OverlayError {
    /// 1-based source line of the offending operation.
    pub line: u32,
    pub message: String,
}

/// Classification of a single finding before severity is assigned.
enum Finding {
    /// Constraint satisfied or key recognized; informational.
    Note(String),
    /// Suspicious but never fatal (unknown key, informational key).
    Soft(String),
    /// Malformed or violated; promoted to a hard error in strict mode.
    Fault(String),
}

/// Validate all overlays and structured field references in the program.
///
/// Returns the full diagnostic list in non-strict mode. In strict mode,
/// the first malformed/violated finding aborts with [`OverlayError`].
pub fn validate(program: &ProgramIR, strict: bool) -> Result<Vec<Diagnostic>, OverlayError> {
    let mut diagnostics = Vec::new();
    for op in &program.kernel.operations {
        let findings = check_operation(op, &program.workspace);
        if strict {
            let faults: Vec<&String> = findings
                .iter()
                .filter_map(|f| match f {
                    Finding::Fault(msg) => Some(msg),
                    _ => None,
                })
                .collect();
            if !faults.is_empty() {
                return Err(OverlayError {
                    line: op.line,
                    message: faults
                        .into_iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join("; "),
                });
            }
        }
        for finding in findings {
            diagnostics.push(match finding {
                Finding::Note(msg) => Diagnostic::info(op.line, msg),
                Finding::Soft(msg) => Diagnostic::warn(op.line, msg),
                Finding::Fault(msg) => Diagnostic::warn(op.line, msg),
            });
        }
    }
    debug!(count = diagnostics.len(), "overlay validation finished");
    Ok(diagnostics)
}

fn check_operation(op: &OperationIR, workspace: &WorkspaceIR) -> Vec<Finding> {
    match (&op.op, op.kind()) {
        (Operation::Ctrl { targets, .. }, _) => check_ctrl_overlay(op, targets, workspace),
        (_, OpKind::Semantic | OpKind::Braid) => check_field_references(&op.op, workspace),
        _ => Vec::new(),
    }
}

fn check_ctrl_overlay(
    op: &OperationIR,
    targets: &[QubitRef],
    workspace: &WorkspaceIR,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for entry in op.overlay.iter() {
        let raw = entry.raw();
        let finding = match (entry.key.as_str(), entry.normalize()) {
            ("coherence_len", OverlayValue::CoherenceLenNs(ns)) => {
                Finding::Note(format!("coherence_len satisfied by wait({ns}) insertion"))
            }
            ("coherence_len", _) => Finding::Fault(format!(
                "coherence_len malformed (got '{raw}', expect >=###ns)"
            )),

            ("path_len", OverlayValue::PathLenMax(k)) => check_path_len(k, targets, workspace),
            ("path_len", _) => Finding::Fault(format!(
                "path_len malformed (got '{raw}', expect <=k on 2-qubit op)"
            )),

            ("damping", OverlayValue::Damping(field)) => {
                if workspace.semantic_fields.contains_key(&field) {
                    Finding::Note(format!("damping couples to semantic field '{field}'"))
                } else {
                    Finding::Fault(format!(
                        "damping references missing semantic field '{field}'"
                    ))
                }
            }
            ("damping", _) => Finding::Fault(format!(
                "damping malformed (got '{raw}', expect η(Φ=Field) or eta(Phi=Field))"
            )),

            ("braid", OverlayValue::Braid(handle)) => {
                if workspace.defect_fields.contains(&handle) {
                    Finding::Note(format!("braid couples to defect field '{handle}'"))
                } else {
                    Finding::Fault(format!(
                        "braid handle '{handle}' not declared in defect fields {:?}",
                        workspace.defect_fields
                    ))
                }
            }

            ("floquet_period", OverlayValue::FloquetPeriodNs(ns)) => {
                Finding::Note(format!("floquet_period accepted: {ns} ns"))
            }
            ("floquet_period", _) => Finding::Fault(format!(
                "floquet_period malformed (got '{raw}', expect e.g. 50ns)"
            )),

            ("cycles", OverlayValue::Cycles(n)) => Finding::Note(format!("cycles accepted: {n}")),
            ("cycles", _) => Finding::Fault(format!(
                "cycles malformed (got '{raw}', expect positive integer)"
            )),

            ("duty", OverlayValue::Duty(d)) => Finding::Note(format!("duty accepted: {d}")),
            ("duty", _) => Finding::Fault(format!(
                "duty malformed (got '{raw}', expect 0<duty<=1)"
            )),

            ("phase_step", OverlayValue::PhaseStepDeg(_)) => {
                Finding::Note(format!("phase_step accepted: {raw}"))
            }
            // Informational only: a bad phase step never blocks emission.
            ("phase_step", _) => Finding::Soft(format!(
                "phase_step malformed (got '{raw}', expect e.g. 15deg)"
            )),

            (_, OverlayValue::SpanHint | OverlayValue::CoherenceBudget) => Finding::Note(format!(
                "{} overlay recognized but not enforced in v0.1",
                entry.key
            )),

            (key, _) => Finding::Soft(format!("unknown overlay key '{key}' (ignored)")),
        };
        findings.push(finding);
    }

    // A partial Floquet key set never expands; flag it so the single-shot
    // emission is not a surprise.
    let floquet_keys = ["floquet_period", "cycles", "duty"];
    let present: Vec<&str> = floquet_keys
        .iter()
        .copied()
        .filter(|k| op.overlay.contains(k))
        .collect();
    if !present.is_empty() && present.len() < floquet_keys.len() {
        let missing: Vec<&str> = floquet_keys
            .iter()
            .copied()
            .filter(|k| !op.overlay.contains(k))
            .collect();
        findings.push(Finding::Soft(format!(
            "floquet expansion needs floquet_period, cycles, and duty (missing {}); emitting single-shot",
            missing.join(", ")
        )));
    }

    findings
}

fn check_path_len(k: u32, targets: &[QubitRef], workspace: &WorkspaceIR) -> Finding {
    if targets.len() != 2 {
        return Finding::Fault(format!(
            "path_len malformed (got '<={k}', expect <=k on 2-qubit op)"
        ));
    }
    let indices: Option<(u32, u32)> = match (targets[0].index, targets[1].index) {
        (Some(a), Some(b)) => Some((a, b)),
        _ => None,
    };
    let distance = indices.and_then(|(a, b)| workspace.lattice.manhattan(a, b));
    match distance {
        None => Finding::Note("path_len check skipped (couldn't map targets to lattice)".into()),
        Some(d) if d > k => Finding::Fault(format!("path_len ≤ {k} violated (distance={d})")),
        Some(d) => Finding::Note(format!("path_len satisfied (distance={d} ≤ {k})")),
    }
}

/// Structured field references on semantic/braid operations must name
/// declared workspace fields. Raw defect specs are not inspected.
fn check_field_references(op: &Operation, workspace: &WorkspaceIR) -> Vec<Finding> {
    let missing_semantic = |name: &str, context: &str| -> Option<Finding> {
        (!workspace.semantic_fields.contains_key(name)).then(|| {
            Finding::Fault(format!(
                "{context} references undeclared semantic field '{name}'"
            ))
        })
    };
    let finding = match op {
        Operation::Initialize { name, .. } => missing_semantic(name, "initialize"),
        Operation::Transport { name, .. } => missing_semantic(name, "transport"),
        Operation::Relax { name, .. } => missing_semantic(name, "relax"),
        Operation::Quench { handle, .. } => {
            (!workspace.defect_fields.contains(handle)).then(|| {
                Finding::Fault(format!(
                    "quench injects into undeclared defect field '{handle}'"
                ))
            })
        }
        Operation::HysteresisTrace { handle, .. } => {
            (!workspace.defect_fields.contains(handle)).then(|| {
                Finding::Fault(format!(
                    "hysteresis_trace references undeclared defect field '{handle}'"
                ))
            })
        }
        _ => None,
    };
    finding.into_iter().collect()
}
