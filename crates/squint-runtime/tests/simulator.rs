//! Simulator behavior over parsed programs: transition laws, fixed trace
//! shape, and determinism.

use squint_runtime::{render_report, simulate, EventData, SimTrace};

const FIELD_PROGRAM: &str = "\
workspace Chip {
    qubits q[4];
    lattice L(2,2) attach q;
    semantic_field Phi: scalar on L;
    defect_field D: defects on L {};
}
kernel K on Chip {
    initialize Phi = constant(0.4);
    nucleate D at {(0,0),(1,1)};
    evolve D with rule curvature_flow(dt=0.1);
    quench δQ_top = inject(D, amount=0.002);
    observe T_eff into T_final with corrections {defects=D, field=Phi};
    hysteresis_trace(D, window=5);
    measure q[0], q[1] -> m0, m1;
    return { m0 ⊕ m1 };
}
";

fn run(source: &str) -> SimTrace {
    let program = squint_parser::parse(source).expect("parse");
    simulate(&program)
}

#[test]
fn field_and_defect_transitions() {
    let trace = run(FIELD_PROGRAM);

    assert_eq!(trace.fields["Phi"].base, 0.4);

    let defects = &trace.defects["D"];
    assert_eq!(defects.coords, vec![(0, 0), (1, 1)]);
    // nucleate 0.01 → evolve ×1.05 → quench −0.002
    assert_eq!(defects.density, 0.0085);
    assert_eq!(defects.phase, 0.55);
}

#[test]
fn observe_law() {
    let trace = run(FIELD_PROGRAM);
    let obs = trace.latest_obs.as_ref().expect("observation");
    // T_eff = base + 0.001·|coords| + 0.01·base, rounded to 4 decimals.
    assert_eq!(obs.t_eff, 0.406);
    assert_eq!(obs.into, "T_final");
    assert_eq!(obs.base, 0.4);
    assert_eq!(obs.defects_term, 0.002);
    assert_eq!(obs.field_term, 0.004);
}

#[test]
fn observe_without_into_defaults_to_obs() {
    let source = "\
workspace W { qubits q[1]; lattice L(1,1) attach q; semantic_field Phi: scalar on L; }
kernel K on W {
    initialize Phi = constant(1.0);
    observe T_eff;
}
";
    let trace = run(source);
    let obs = trace.latest_obs.as_ref().expect("observation");
    assert_eq!(obs.into, "obs");
    assert_eq!(obs.t_eff, 1.01);
}

#[test]
fn hysteresis_trace_is_a_fixed_ramp() {
    let trace = run(FIELD_PROGRAM);
    let series = trace
        .events
        .iter()
        .find_map(|e| match &e.data {
            EventData::Hysteresis { trace, .. } => Some(trace.clone()),
            _ => None,
        })
        .expect("hysteresis event");
    assert_eq!(series, vec![0.0009, 0.001, 0.0011, 0.0012, 0.0013]);
}

#[test]
fn hysteresis_window_defaults_to_three() {
    let source = "\
workspace W { qubits q[1]; lattice L(1,1) attach q; defect_field D: defects on L {}; }
kernel K on W { hysteresis_trace(D); }
";
    let trace = run(source);
    let EventData::Hysteresis { window, trace: series } = &trace.events[0].data else {
        panic!("expected hysteresis event");
    };
    assert_eq!(*window, 3);
    assert_eq!(series.len(), 3);
}

#[test]
fn measure_outputs_follow_global_parity() {
    let trace = run(FIELD_PROGRAM);
    assert_eq!(trace.measurements["m0"], 0);
    assert_eq!(trace.measurements["m1"], 1);

    let source = "\
workspace W { qubits q[4]; lattice L(2,2) attach q; }
kernel K on W {
    measure q[0] -> a;
    measure q[1] -> b;
    measure q[2] -> c;
}
";
    let trace = run(source);
    let values: Vec<u8> = trace.measurements.values().copied().collect();
    assert_eq!(values, vec![0, 1, 0]);
}

#[test]
fn quench_density_clamps_at_zero() {
    let source = "\
workspace W { qubits q[1]; lattice L(1,1) attach q; defect_field D: defects on L {}; }
kernel K on W {
    nucleate D at {(0,0)};
    quench δQ_top = inject(D, amount=0.5);
}
";
    let trace = run(source);
    assert_eq!(trace.defects["D"].density, 0.0);
    let EventData::Quench { new_density, .. } = &trace.events[1].data else {
        panic!("expected quench event");
    };
    assert_eq!(*new_density, 0.0);
}

#[test]
fn unhandled_operations_pass_through() {
    let source = "\
workspace W { qubits q[2]; lattice L(2,1) attach q; semantic_field Phi: scalar on L; }
kernel K on W {
    ctrl x q[0];
    relax Phi(rate=0.1);
}
";
    let trace = run(source);
    assert_eq!(trace.events.len(), 2);
    assert_eq!(trace.events[0].op, "ctrl");
    assert_eq!(trace.events[1].op, "relax");
}

#[test]
fn event_log_shape() {
    let trace = run(FIELD_PROGRAM);
    let ops: Vec<&str> = trace.events.iter().map(|e| e.op.as_str()).collect();
    assert_eq!(
        ops,
        vec![
            "init_phi",
            "nucleate",
            "evolve",
            "quench",
            "observe",
            "hysteresis",
            "measure",
            "return"
        ]
    );

    let json = serde_json::to_value(&trace).expect("serialize");
    assert_eq!(json["events"][0]["op"], "init_phi");
    assert_eq!(json["events"][0]["value"], 0.4);
    assert_eq!(json["events"][3]["new_density"], 0.0085);
    assert_eq!(json["events"][4]["T_eff"], 0.406);
    assert_eq!(json["latest_obs"]["T_eff"], 0.406);
    assert_eq!(json["measurements"]["m1"], 1);
}

#[test]
fn simulation_is_deterministic() {
    let a = serde_json::to_string_pretty(&run(FIELD_PROGRAM)).expect("json");
    let b = serde_json::to_string_pretty(&run(FIELD_PROGRAM)).expect("json");
    assert_eq!(a, b);
}

#[test]
fn report_summarizes_final_state() {
    let trace = run(FIELD_PROGRAM);
    let report = render_report(&trace);
    assert!(report.contains("field Phi: base = 0.4"));
    assert!(report.contains("defects D: 2 site(s), density 0.0085, phase 0.55 rad"));
    assert!(report.contains("observed T_eff -> T_final = 0.406"));
    assert!(report.contains("hysteresis trace: 5 point(s) in [0.0009, 0.0013]"));
    assert!(report.contains("measurements: m0=0, m1=1"));
    assert!(report.contains("final state: fields=[Phi] defects=[D]"));
}
