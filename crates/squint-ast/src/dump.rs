//! Structured source dump.
//!
//! Renders an IR back into canonical `.squint` text. The dump is not a
//! byte-for-byte copy of the input: register and lattice names are not
//! retained by the IR and come back as `q`/`L`, operators come back in
//! ASCII, and spacing is normalized. Re-parsing a dump yields an equal IR.

use crate::overlay::{OverlayEntry, OverlayOp};
use crate::program::{Operation, OperationIR, ProgramIR, WorkspaceIR};
use std::fmt::Write;

impl ProgramIR {
    /// Render this program as canonical source text.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        write_workspace(&mut out, &self.workspace);
        out.push('\n');
        let _ = writeln!(out, "kernel {} on {} {{", self.kernel.name, self.workspace.name);
        for op in &self.kernel.operations {
            let _ = writeln!(out, "    {}", render_statement(op));
        }
        out.push_str("}\n");
        out
    }
}

fn write_workspace(out: &mut String, ws: &WorkspaceIR) {
    let _ = writeln!(out, "workspace {} {{", ws.name);
    let _ = writeln!(out, "    qubits q[{}];", ws.qubits);
    let _ = writeln!(
        out,
        "    lattice L({},{}) attach q;",
        ws.lattice.cols, ws.lattice.rows
    );
    for (name, kind) in &ws.semantic_fields {
        let _ = writeln!(out, "    semantic_field {name}: {kind} on L;");
    }
    for name in &ws.defect_fields {
        let _ = writeln!(out, "    defect_field {name}: defects on L {{}};");
    }
    out.push_str("}\n");
}

fn render_statement(op: &OperationIR) -> String {
    let mut s = op.op.render();
    if !op.overlay.is_empty() {
        let entries: Vec<String> = op.overlay.iter().map(render_entry).collect();
        s.push_str(&format!(" with overlay {{ {} }}", entries.join(", ")));
    }
    if let Operation::Ctrl {
        guard: Some(guard), ..
    } = &op.op
    {
        s.push_str(&format!(" unless {guard}"));
    }
    s.push(';');
    s
}

fn render_entry(entry: &OverlayEntry) -> String {
    match entry.op {
        OverlayOp::Ge => format!("{} >= {}", entry.key, entry.value),
        OverlayOp::Le => format!("{} <= {}", entry.key, entry.value),
        OverlayOp::EqEq => format!("{} == {}", entry.key, entry.value),
        OverlayOp::Assign => format!("{} = {}", entry.key, entry.value),
        OverlayOp::Flag => entry.key.clone(),
    }
}
