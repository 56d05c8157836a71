//! Joint control-text emitter and timeline scheduler.
//!
//! A single left-to-right walk over the kernel produces both artifacts
//! under one shared nanosecond cursor, so the text and the timeline can
//! never drift apart. `coherence_len` overlays insert leading waits;
//! complete Floquet overlays fan a gate out into its cycle train.

use crate::timeline::TimelineEntry;
use squint_ast::{OpKind, Operation, OperationIR, ProgramIR, QubitRef};

/// Gate names with a native `play` form; anything else is passed through
/// as a comment while still being recorded in the timeline.
const SUPPORTED_GATES: [&str; 5] = ["x", "h", "rx", "cx", "cz"];

/// Emit the control text and timeline for a validated program.
pub fn emit(program: &ProgramIR) -> (String, Vec<TimelineEntry>) {
    let ws = &program.workspace;
    let mut emitter = Emitter {
        lines: Vec::new(),
        timeline: Vec::new(),
        t: 0,
    };
    emitter.lines.push(format!(
        "# workspace {} qubits={} lattice={}",
        ws.name, ws.qubits, ws.lattice
    ));
    for op in &program.kernel.operations {
        emitter.emit_op(op);
    }
    let mut text = emitter.lines.join("\n");
    text.push('\n');
    (text, emitter.timeline)
}

struct Emitter {
    lines: Vec<String>,
    timeline: Vec<TimelineEntry>,
    t: u64,
}

impl Emitter {
    fn emit_op(&mut self, op: &OperationIR) {
        match &op.op {
            Operation::Ctrl {
                gate,
                targets,
                angle,
                guard,
            } => self.emit_ctrl(op, gate, targets, angle.as_deref(), guard.as_deref()),
            Operation::Measure { targets, outputs } => {
                for (target, out) in targets.iter().zip(outputs) {
                    self.lines.push(format!("measure({target}) -> {out}"));
                }
                self.timeline
                    .push(TimelineEntry::measure(op.line, self.t, targets, outputs));
            }
            other => {
                let kind = other.kind();
                let prefix = match kind {
                    OpKind::Semantic => "# semantic",
                    OpKind::Braid => "# braid",
                    // Ctrl and measure are handled above.
                    OpKind::Quantum => unreachable!("quantum ops emitted explicitly"),
                };
                self.lines.push(format!("{prefix}: {}", other.render()));
                self.timeline
                    .push(TimelineEntry::annotation(op.line, self.t, other.name(), kind));
            }
        }
    }

    fn emit_ctrl(
        &mut self,
        op: &OperationIR,
        gate: &str,
        targets: &[QubitRef],
        angle: Option<&str>,
        guard: Option<&str>,
    ) {
        let gate = gate.to_ascii_lowercase();

        // coherence_len applies once, before any Floquet cycle train.
        if let Some(ns) = op.overlay.coherence_len_ns() {
            self.lines.push(format!("wait({ns})"));
            self.timeline
                .push(TimelineEntry::wait(op.line, self.t, ns, None));
            self.t += ns;
        }

        match op.overlay.floquet() {
            Some(params) => {
                let mut header = format!(
                    "# floquet: period={}ns, cycles={}, duty={}, phase_step={}deg",
                    params.period_ns, params.cycles, params.duty, params.phase_step_deg
                );
                if let Some(guard) = guard {
                    header.push_str(&format!(" # guarded_by: {guard}"));
                }
                self.lines.push(header);

                let off = params.off_ns();
                for cycle in 1..=params.cycles {
                    self.lines.push(gate_text(&gate, targets, angle));
                    self.timeline.push(TimelineEntry::floquet_gate(
                        op.line, self.t, &gate, cycle, targets,
                    ));
                    self.lines.push(format!("wait({off})"));
                    self.timeline
                        .push(TimelineEntry::wait(op.line, self.t, off, Some(cycle)));
                    self.t += off;
                }
            }
            None => {
                let mut line = gate_text(&gate, targets, angle);
                if let Some(guard) = guard {
                    line.push_str(&format!(" # guarded_by: {guard}"));
                }
                self.lines.push(line);
                self.timeline
                    .push(TimelineEntry::gate(op.line, self.t, gate, targets));
            }
        }
    }
}

fn gate_text(gate: &str, targets: &[QubitRef], angle: Option<&str>) -> String {
    if !SUPPORTED_GATES.contains(&gate) {
        return format!("# unsupported gate: {gate}");
    }
    let mut args = targets
        .iter()
        .map(QubitRef::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    if let Some(angle) = angle {
        args.push_str(&format!(", angle={angle}"));
    }
    format!("play('{gate}', {args})")
}
