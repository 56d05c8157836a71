//! The deterministic toy simulator.
//!
//! One linear pass over the kernel drives a closed-form state machine
//! over Φ (scalar field base) and D (defect population). No randomness,
//! no wall clock: the same IR always produces the same trace. Derived
//! quantities are rounded to 4 decimals so the JSON artifact is
//! byte-stable across hosts.

use crate::trace::{DefectState, EventData, FieldState, Observation, SimEvent, SimTrace};
use squint_ast::{Operation, ProgramIR};
use tracing::debug;

/// Run the simulator over a parsed program.
pub fn simulate(program: &ProgramIR) -> SimTrace {
    let mut trace = SimTrace::default();
    let mut state = State::default();

    for op in &program.kernel.operations {
        step(&mut trace, &mut state, &op.op);
    }
    debug!(events = trace.events.len(), "simulation finished");
    trace
}

#[derive(Debug, Default)]
struct State {
    phi_base: f64,
    coords: Vec<(i64, i64)>,
    density: f64,
    phase: f64,
    /// Trace key of the defect population, fixed by the first nucleate.
    defect_key: Option<String>,
    /// Global encounter index over measure outputs.
    measure_index: usize,
}

fn step(trace: &mut SimTrace, state: &mut State, op: &Operation) {
    match op {
        Operation::Initialize { name, expr } if name == "Phi" => {
            match parse_constant(expr) {
                Some(value) => {
                    state.phi_base = value;
                    trace
                        .fields
                        .insert("Phi".to_owned(), FieldState { base: value });
                    trace
                        .events
                        .push(SimEvent::new("init_phi", EventData::InitPhi { value }));
                }
                None => pass_through(trace, op),
            }
        }

        Operation::Nucleate { spec } => {
            state.coords.extend(parse_coords(spec));
            state.density = 0.01;
            let key = state
                .defect_key
                .get_or_insert_with(|| leading_handle(spec))
                .clone();
            trace.defects.insert(
                key,
                DefectState {
                    coords: state.coords.clone(),
                    density: state.density,
                    phase: state.phase,
                },
            );
            trace.events.push(SimEvent::new(
                "nucleate",
                EventData::Nucleate {
                    coords: state.coords.clone(),
                    density: state.density,
                },
            ));
        }

        Operation::Evolve { .. } => {
            state.density = round4(state.density * 1.05);
            state.phase = 0.55;
            sync_defect(trace, state);
            trace.events.push(SimEvent::new(
                "evolve",
                EventData::Evolve {
                    density: state.density,
                    phase: state.phase,
                },
            ));
        }

        Operation::Quench { amount, .. } => {
            state.density = round4((state.density - amount).max(0.0));
            sync_defect(trace, state);
            trace.events.push(SimEvent::new(
                "quench",
                EventData::Quench {
                    amount: *amount,
                    new_density: state.density,
                },
            ));
        }

        Operation::Observe { into, .. } => {
            let defects_term = round4(0.001 * state.coords.len() as f64);
            let field_term = round4(0.01 * state.phi_base);
            let t_eff = round4(state.phi_base + defects_term + field_term);
            let into = into.clone().unwrap_or_else(|| "obs".to_owned());
            trace.latest_obs = Some(Observation {
                t_eff,
                into,
                base: state.phi_base,
                defects_term,
                field_term,
            });
            trace
                .events
                .push(SimEvent::new("observe", EventData::Observe { t_eff }));
        }

        Operation::HysteresisTrace { window, .. } => {
            let window = window.unwrap_or(3);
            let series: Vec<f64> = (0..window)
                .map(|k| round4(0.0009 + 0.0001 * f64::from(k)))
                .collect();
            trace.events.push(SimEvent::new(
                "hysteresis",
                EventData::Hysteresis {
                    window,
                    trace: series,
                },
            ));
        }

        Operation::Measure { outputs, .. } => {
            for out in outputs {
                let value = (state.measure_index % 2) as u8;
                trace.measurements.insert(out.clone(), value);
                state.measure_index += 1;
            }
            trace.events.push(SimEvent::new(
                "measure",
                EventData::Measure {
                    values: trace.measurements.clone(),
                },
            ));
        }

        Operation::Return { spec } => {
            trace
                .events
                .push(SimEvent::new("return", EventData::Return { spec: spec.clone() }));
        }

        other => pass_through(trace, other),
    }
}

fn pass_through(trace: &mut SimTrace, op: &Operation) {
    trace.events.push(SimEvent::new(
        op.name(),
        EventData::Pass { args: op.clone() },
    ));
}

/// Mirror the scalar state into the defect entry, if one exists.
fn sync_defect(trace: &mut SimTrace, state: &State) {
    if let Some(key) = &state.defect_key {
        if let Some(entry) = trace.defects.get_mut(key) {
            entry.coords = state.coords.clone();
            entry.density = state.density;
            entry.phase = state.phase;
        }
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Extract `c` from a `constant(c)` initializer.
fn parse_constant(expr: &str) -> Option<f64> {
    expr.trim()
        .strip_prefix("constant(")?
        .strip_suffix(')')?
        .trim()
        .parse()
        .ok()
}

/// Collect `(x, y)` integer pairs from a raw defect spec.
fn parse_coords(spec: &str) -> Vec<(i64, i64)> {
    let mut coords = Vec::new();
    let mut rest = spec;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')') else {
            break;
        };
        let inner = &rest[open + 1..open + close];
        let parts: Vec<&str> = inner.split(',').collect();
        if parts.len() == 2 {
            if let (Ok(x), Ok(y)) = (
                parts[0].trim().parse::<i64>(),
                parts[1].trim().parse::<i64>(),
            ) {
                coords.push((x, y));
            }
        }
        rest = &rest[open + close + 1..];
    }
    coords
}

/// The leading identifier of a defect spec names the population.
fn leading_handle(spec: &str) -> String {
    spec.split_whitespace()
        .next()
        .filter(|word| word.chars().all(|c| c.is_alphanumeric() || c == '_'))
        .map(str::to_owned)
        .unwrap_or_else(|| "D".to_owned())
}
