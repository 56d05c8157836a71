//! Intermediate representation for the SQUINT compiler.
//!
//! A parsed program is one [`WorkspaceIR`] (the declared topology, frozen
//! after parse) plus one [`KernelIR`] (an ordered operation sequence).
//! Operations are a tagged variant over a small closed set; the three
//! `kind` buckets (quantum / semantic / braid) exist only to route
//! emission.
//!
//! The overlay model lives in [`overlay`]: entries preserve the raw source
//! value and normalize on demand into tagged [`overlay::OverlayValue`]s,
//! so the validator and the emitter agree on what a key means without the
//! IR being mutated between stages.

pub mod diagnostics;
pub mod dump;
pub mod lattice;
pub mod overlay;
pub mod program;

pub use diagnostics::{Diagnostic, Severity};
pub use lattice::{Coord, Lattice};
pub use overlay::{FloquetParams, Overlay, OverlayEntry, OverlayOp, OverlayValue};
pub use program::{
    FieldKind, KernelIR, OpKind, Operation, OperationIR, ProgramIR, QubitRef, WorkspaceIR,
};
