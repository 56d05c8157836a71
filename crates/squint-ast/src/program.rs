//! Program IR.
//!
//! [`WorkspaceIR`] is immutable after parse and borrowed by every later
//! stage. [`KernelIR`] preserves source order; the compiler never reorders
//! operations.

use crate::lattice::Lattice;
use crate::overlay::Overlay;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A full parsed program: one workspace, one kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramIR {
    pub workspace: WorkspaceIR,
    pub kernel: KernelIR,
}

/// Declared topology: qubit register, lattice, semantic and defect fields.
///
/// `semantic_fields` and `defect_fields` keep declaration order; artifact
/// emission iterates them in that order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceIR {
    pub name: String,
    pub qubits: u32,
    pub lattice: Lattice,
    pub semantic_fields: IndexMap<String, FieldKind>,
    pub defect_fields: Vec<String>,
}

/// Kind of a semantic field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Vector,
    /// `tensor[k]`
    Tensor(u32),
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar => write!(f, "scalar"),
            FieldKind::Vector => write!(f, "vector"),
            FieldKind::Tensor(rank) => write!(f, "tensor[{rank}]"),
        }
    }
}

impl Serialize for FieldKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ordered operation sequence over a workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelIR {
    pub name: String,
    pub operations: Vec<OperationIR>,
}

/// One kernel operation with its overlay annotation and source line.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationIR {
    pub op: Operation,
    /// Overlay clause; empty for every non-ctrl operation.
    pub overlay: Overlay,
    /// 1-based source line.
    pub line: u32,
}

impl OperationIR {
    pub fn new(op: Operation, line: u32) -> Self {
        Self {
            op,
            overlay: Overlay::default(),
            line,
        }
    }

    pub fn with_overlay(op: Operation, overlay: Overlay, line: u32) -> Self {
        Self { op, overlay, line }
    }

    pub fn kind(&self) -> OpKind {
        self.op.kind()
    }
}

/// Emission bucket for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Quantum,
    Semantic,
    Braid,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Quantum => write!(f, "quantum"),
            OpKind::Semantic => write!(f, "semantic"),
            OpKind::Braid => write!(f, "braid"),
        }
    }
}

/// Reference to a qubit register element, `q[0]`, or a bare register `q`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QubitRef {
    pub register: String,
    pub index: Option<u32>,
}

impl QubitRef {
    pub fn indexed(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    pub fn bare(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

impl fmt::Display for QubitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{}]", self.register, i),
            None => write!(f, "{}", self.register),
        }
    }
}

impl Serialize for QubitRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The closed operation set.
///
/// Serialization is untagged: an operation serializes as the map of its
/// arguments, which is exactly the `args` record of the log schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Operation {
    Ctrl {
        gate: String,
        targets: Vec<QubitRef>,
        #[serde(skip_serializing_if = "Option::is_none")]
        angle: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        guard: Option<String>,
    },
    Measure {
        targets: Vec<QubitRef>,
        outputs: Vec<String>,
    },
    Initialize {
        name: String,
        expr: String,
    },
    Observe {
        what: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        into: Option<String>,
        corrections: IndexMap<String, String>,
    },
    Transport {
        name: String,
        expr: String,
    },
    Relax {
        name: String,
        rate: String,
    },
    Quench {
        name: String,
        handle: String,
        amount: f64,
    },
    Nucleate {
        spec: String,
    },
    Pin {
        spec: String,
    },
    Anneal {
        spec: String,
    },
    Evolve {
        spec: String,
    },
    HysteresisTrace {
        handle: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        window: Option<u32>,
    },
    Return {
        spec: String,
    },
}

impl Operation {
    /// Emission bucket.
    pub fn kind(&self) -> OpKind {
        match self {
            Operation::Ctrl { .. } | Operation::Measure { .. } => OpKind::Quantum,
            Operation::Initialize { .. }
            | Operation::Observe { .. }
            | Operation::Transport { .. }
            | Operation::Relax { .. }
            | Operation::HysteresisTrace { .. }
            | Operation::Return { .. } => OpKind::Semantic,
            Operation::Quench { .. }
            | Operation::Nucleate { .. }
            | Operation::Pin { .. }
            | Operation::Anneal { .. }
            | Operation::Evolve { .. } => OpKind::Braid,
        }
    }

    /// Operation name as it appears in logs and timelines.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Ctrl { .. } => "ctrl",
            Operation::Measure { .. } => "measure",
            Operation::Initialize { .. } => "initialize",
            Operation::Observe { .. } => "observe",
            Operation::Transport { .. } => "transport",
            Operation::Relax { .. } => "relax",
            Operation::Quench { .. } => "quench",
            Operation::Nucleate { .. } => "nucleate",
            Operation::Pin { .. } => "pin",
            Operation::Anneal { .. } => "anneal",
            Operation::Evolve { .. } => "evolve",
            Operation::HysteresisTrace { .. } => "hysteresis_trace",
            Operation::Return { .. } => "return",
        }
    }

    /// Source-like rendering of the statement body, without the trailing
    /// semicolon and without the overlay/guard clauses.
    pub fn render(&self) -> String {
        match self {
            Operation::Ctrl {
                gate,
                targets,
                angle,
                ..
            } => {
                let mut s = format!("ctrl {gate} {}", join_refs(targets));
                if let Some(angle) = angle {
                    s.push_str(&format!(" angle={angle}"));
                }
                s
            }
            Operation::Measure { targets, outputs } => {
                format!("measure {} -> {}", join_refs(targets), outputs.join(", "))
            }
            Operation::Initialize { name, expr } => format!("initialize {name} = {expr}"),
            Operation::Observe {
                what,
                into,
                corrections,
            } => {
                let mut s = format!("observe {what}");
                if let Some(into) = into {
                    s.push_str(&format!(" into {into}"));
                }
                if !corrections.is_empty() {
                    let kv: Vec<String> = corrections
                        .iter()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect();
                    s.push_str(&format!(" with corrections {{{}}}", kv.join(", ")));
                }
                s
            }
            Operation::Transport { name, expr } => format!("transport {name} = {expr}"),
            Operation::Relax { name, rate } => format!("relax {name}(rate={rate})"),
            Operation::Quench {
                name,
                handle,
                amount,
            } => format!("quench {name} = inject({handle}, amount={amount})"),
            Operation::Nucleate { spec } => format!("nucleate {spec}"),
            Operation::Pin { spec } => format!("pin {spec}"),
            Operation::Anneal { spec } => format!("anneal {spec}"),
            Operation::Evolve { spec } => format!("evolve {spec}"),
            Operation::HysteresisTrace { handle, window } => match window {
                Some(w) => format!("hysteresis_trace({handle}, window={w})"),
                None => format!("hysteresis_trace({handle})"),
            },
            Operation::Return { spec } => format!("return {{ {spec} }}"),
        }
    }
}

fn join_refs(targets: &[QubitRef]) -> String {
    targets
        .iter()
        .map(QubitRef::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
