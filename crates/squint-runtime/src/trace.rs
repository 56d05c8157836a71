//! Simulation trace types (the `.sim.json` artifact).

use indexmap::IndexMap;
use serde::Serialize;
use squint_ast::Operation;

/// Full simulation result: final state plus the ordered event log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimTrace {
    /// Scalar fields touched by the run, keyed by name (`Phi`).
    pub fields: IndexMap<String, FieldState>,
    /// Defect populations, keyed by handle (`D`).
    pub defects: IndexMap<String, DefectState>,
    /// Measurement outputs in encounter order.
    pub measurements: IndexMap<String, u8>,
    /// Result of the most recent `observe`, if any.
    pub latest_obs: Option<Observation>,
    /// Append-only event log, one entry per effective operation.
    pub events: Vec<SimEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldState {
    pub base: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefectState {
    pub coords: Vec<(i64, i64)>,
    pub density: f64,
    pub phase: f64,
}

/// Snapshot taken by `observe`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    #[serde(rename = "T_eff")]
    pub t_eff: f64,
    pub into: String,
    pub base: f64,
    pub defects_term: f64,
    pub field_term: f64,
}

/// One event-log entry: the operation name plus its payload, flattened
/// into a single JSON object (`{"op": "quench", "amount": ..., ...}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimEvent {
    pub op: String,
    #[serde(flatten)]
    pub data: EventData,
}

impl SimEvent {
    pub fn new(op: impl Into<String>, data: EventData) -> Self {
        Self {
            op: op.into(),
            data,
        }
    }
}

/// Event payloads. Serialization is untagged: only the payload fields
/// appear next to `op`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventData {
    InitPhi {
        value: f64,
    },
    Nucleate {
        coords: Vec<(i64, i64)>,
        density: f64,
    },
    Evolve {
        density: f64,
        phase: f64,
    },
    Quench {
        amount: f64,
        new_density: f64,
    },
    Observe {
        #[serde(rename = "T_eff")]
        t_eff: f64,
    },
    Hysteresis {
        window: u32,
        trace: Vec<f64>,
    },
    Measure {
        values: IndexMap<String, u8>,
    },
    Return {
        spec: String,
    },
    /// Operations without a dedicated transition pass through with their
    /// arguments.
    Pass {
        args: Operation,
    },
}
