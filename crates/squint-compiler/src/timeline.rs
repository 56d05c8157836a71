//! Timeline entries.
//!
//! The timeline is produced in lockstep with the control-text emitter
//! under a single monotonic nanosecond cursor. Gate durations are zero in
//! v0.1; only explicit waits advance the cursor.

use serde::Serialize;
use squint_ast::{OpKind, QubitRef};

/// One scheduled event. Optional fields serialize only when meaningful:
/// `ns` on waits, `targets`/`outs` on gates and measures, `cycle` on
/// Floquet-expanded entries, `kind` on semantic/braid annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// 1-based source line of the originating operation.
    pub line: u32,
    /// Nanosecond cursor at which the event is scheduled.
    pub t: u64,
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<OpKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ns: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outs: Option<Vec<String>>,
}

impl TimelineEntry {
    fn base(line: u32, t: u64, op: impl Into<String>) -> Self {
        Self {
            line,
            t,
            op: op.into(),
            kind: None,
            ns: None,
            cycle: None,
            targets: None,
            outs: None,
        }
    }

    pub fn wait(line: u32, t: u64, ns: u64, cycle: Option<u32>) -> Self {
        Self {
            ns: Some(ns),
            cycle,
            ..Self::base(line, t, "wait")
        }
    }

    pub fn gate(line: u32, t: u64, op: impl Into<String>, targets: &[QubitRef]) -> Self {
        Self {
            targets: Some(targets.iter().map(QubitRef::to_string).collect()),
            ..Self::base(line, t, op)
        }
    }

    pub fn floquet_gate(
        line: u32,
        t: u64,
        gate: &str,
        cycle: u32,
        targets: &[QubitRef],
    ) -> Self {
        Self {
            cycle: Some(cycle),
            ..Self::gate(line, t, format!("{gate}@floquet"), targets)
        }
    }

    pub fn measure(line: u32, t: u64, targets: &[QubitRef], outs: &[String]) -> Self {
        Self {
            targets: Some(targets.iter().map(QubitRef::to_string).collect()),
            outs: Some(outs.to_vec()),
            ..Self::base(line, t, "measure")
        }
    }

    /// Semantic/braid operations appear in the timeline for ordering but
    /// never advance the cursor.
    pub fn annotation(line: u32, t: u64, op: &str, kind: OpKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::base(line, t, op)
        }
    }
}
