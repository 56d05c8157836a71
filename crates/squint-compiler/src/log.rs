//! Structured event log document (the `.log.json` artifact).

use crate::timeline::TimelineEntry;
use crate::CompileOutput;
use serde::Serialize;
use squint_ast::{OpKind, Operation, Overlay, WorkspaceIR};

/// Top-level log schema, stable for v0.1: workspace metadata, kernel
/// name, one event record per operation, and the scheduler timeline.
#[derive(Debug, Clone, Serialize)]
pub struct LogDocument {
    pub workspace: WorkspaceIR,
    pub kernel: String,
    pub events: Vec<LogEvent>,
    pub timeline: Vec<TimelineEntry>,
}

/// Per-operation record: classification, name, source line, arguments,
/// and the (possibly empty) overlay in its raw textual form.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub kind: OpKind,
    pub op: &'static str,
    pub line: u32,
    pub args: Operation,
    pub overlay: Overlay,
}

impl LogDocument {
    pub fn new(output: &CompileOutput) -> Self {
        let program = &output.program;
        let events = program
            .kernel
            .operations
            .iter()
            .map(|op| LogEvent {
                kind: op.kind(),
                op: op.op.name(),
                line: op.line,
                args: op.op.clone(),
                overlay: op.overlay.clone(),
            })
            .collect();
        Self {
            workspace: program.workspace.clone(),
            kernel: program.kernel.name.clone(),
            events,
            timeline: output.timeline.clone(),
        }
    }
}
