//! Deterministic toy simulator for SQUINT programs.
//!
//! Consumes the parsed IR and produces a fixed-shape [`SimTrace`] in one
//! linear pass. The simulator is pure: identical IR yields byte-identical
//! JSON output, so traces double as test goldens.

pub mod report;
pub mod sim;
pub mod trace;

pub use report::render_report;
pub use sim::simulate;
pub use trace::{DefectState, EventData, FieldState, Observation, SimEvent, SimTrace};
