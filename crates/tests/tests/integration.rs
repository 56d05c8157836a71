//! End-to-end scenario tests for the full pipeline:
//! parse → validate → emit → simulate.

use squint_compiler::CompileError;
use squint_tests::{
    compile_source, compile_strict, parse_source, simulate_source, to_json, CALIBRATED_EPR,
};

/// Calibrated EPR: leading waits and gates land on the expected cursor
/// positions, in order.
#[test]
fn calibrated_epr_schedule() {
    let output = compile_source(CALIBRATED_EPR);
    let schedule: Vec<(String, u64)> = output
        .timeline
        .iter()
        .filter(|e| e.op == "wait" || e.op == "rx" || e.op == "cz")
        .map(|e| (e.op.clone(), e.t))
        .collect();
    assert_eq!(
        schedule,
        vec![
            ("wait".to_owned(), 0),
            ("rx".to_owned(), 80),
            ("wait".to_owned(), 80),
            ("cz".to_owned(), 200),
        ]
    );
    let waits: Vec<u64> = output
        .timeline
        .iter()
        .filter_map(|e| (e.op == "wait").then_some(e.ns).flatten())
        .collect();
    assert_eq!(waits, vec![80, 120]);
}

/// Strict mode rejects an impossible path constraint before any artifact
/// is produced.
#[test]
fn bad_overlay_strict() {
    let source = "\
workspace Chip {
    qubits q[4];
    lattice L(2,2) attach q;
}
kernel K on Chip {
    ctrl cz q[0], q[3] with overlay { path_len <= 0 };
}
";
    let err = compile_strict(source).expect_err("strict must fail");
    let CompileError::Overlay(overlay) = err else {
        panic!("expected overlay error, got parse error");
    };
    assert!(overlay.message.contains("path_len ≤ 0 violated (distance=2)"));
    assert_eq!(overlay.line, 6);
}

/// Floquet expansion: one header, a leading coherence wait, then eight
/// gate/wait pairs with cycle tags 1..=8.
#[test]
fn floquet_expansion() {
    let source = "\
workspace Chip {
    qubits q[4];
    lattice L(2,2) attach q;
}
kernel K on Chip {
    ctrl cz q[0],q[1] with overlay { coherence_len >= 120ns, floquet_period=50ns, cycles=8, duty=0.4 };
}
";
    let output = compile_source(source);
    let text = &output.control_text;
    assert_eq!(text.matches("# floquet:").count(), 1);
    assert_eq!(text.matches("wait(120)").count(), 1);
    assert_eq!(text.matches("play('cz', q[0], q[1])").count(), 8);
    assert_eq!(text.matches("wait(30)").count(), 8);

    let cycles: Vec<u32> = output
        .timeline
        .iter()
        .filter(|e| e.op == "cz@floquet")
        .filter_map(|e| e.cycle)
        .collect();
    assert_eq!(cycles, (1..=8).collect::<Vec<_>>());
}

/// Unknown gates pass through as comments but keep their timeline slot.
#[test]
fn unknown_gate_passthrough() {
    let source = "\
workspace Chip {
    qubits q[2];
    lattice L(2,1) attach q;
}
kernel K on Chip {
    ctrl swap q[0], q[1];
}
";
    let output = compile_source(source);
    assert!(output.control_text.contains("# unsupported gate: swap"));
    let entry = output
        .timeline
        .iter()
        .find(|e| e.op == "swap")
        .expect("swap timeline entry");
    assert_eq!(
        entry.targets.as_deref(),
        Some(&["q[0]".to_owned(), "q[1]".to_owned()][..])
    );
}

/// Simulator determinism plus the observe law golden.
#[test]
fn simulator_determinism() {
    let source = "\
workspace Chip {
    qubits q[4];
    lattice L(2,2) attach q;
    semantic_field Phi: scalar on L;
    defect_field D: defects on L {};
}
kernel K on Chip {
    initialize Phi = constant(0.4);
    nucleate D at {(0,0),(1,1)};
    observe T_eff into T_final with corrections {defects=D, field=Phi};
    measure q[0] -> m0;
    measure q[1] -> m1;
}
";
    let first = to_json(&simulate_source(source));
    let second = to_json(&simulate_source(source));
    assert_eq!(first, second, "sim trace must be byte-identical");

    let trace = simulate_source(source);
    let obs = trace.latest_obs.expect("observation");
    // round4(0.4 + 0.001·2 + 0.01·0.4)
    assert_eq!(obs.t_eff, 0.406);
}

/// Damping referencing a missing field: warn in default mode, fatal in
/// strict mode.
#[test]
fn damping_missing_field_modes() {
    let source = "\
workspace Chip {
    qubits q[4];
    lattice L(2,2) attach q;
    semantic_field Phi: scalar on L;
}
kernel K on Chip {
    ctrl cx q[0],q[1] with overlay { damping = η(Φ=NoSuch) };
}
";
    let output = compile_source(source);
    assert!(output.diagnostics.iter().any(|d| d
        .message
        .contains("damping references missing semantic field 'NoSuch'")));

    let err = compile_strict(source).expect_err("strict must fail");
    assert!(matches!(err, CompileError::Overlay(_)));
}

/// I1: the cursor never moves backwards.
#[test]
fn timeline_cursor_is_monotonic() {
    let output = compile_source(CALIBRATED_EPR);
    let mut prev = 0;
    for entry in &output.timeline {
        assert!(entry.t >= prev);
        prev = entry.t;
    }
}

/// I2: every timeline line exists in the source.
#[test]
fn timeline_lines_reference_source() {
    let output = compile_source(CALIBRATED_EPR);
    let lines = CALIBRATED_EPR.lines().count() as u32;
    assert!(output
        .timeline
        .iter()
        .all(|e| e.line >= 1 && e.line <= lines));
}

/// I4: a Floquet op with cycles=N contributes exactly N gate entries and
/// N trailing waits.
#[test]
fn floquet_entry_counts() {
    let source = "\
workspace Chip {
    qubits q[2];
    lattice L(2,1) attach q;
}
kernel K on Chip {
    ctrl x q[0] with overlay { floquet_period=40ns, cycles=5, duty=0.5 };
}
";
    let output = compile_source(source);
    let gates = output
        .timeline
        .iter()
        .filter(|e| e.op == "x@floquet")
        .count();
    let waits = output
        .timeline
        .iter()
        .filter(|e| e.op == "wait" && e.cycle.is_some())
        .count();
    assert_eq!(gates, 5);
    assert_eq!(waits, 5);
}

/// I5: compile artifacts are deterministic end to end.
#[test]
fn compile_determinism() {
    let a = compile_source(CALIBRATED_EPR);
    let b = compile_source(CALIBRATED_EPR);
    assert_eq!(a.control_text, b.control_text);
    assert_eq!(to_json(&a.log_document()), to_json(&b.log_document()));
}

/// I6: parse → structured dump → parse yields an equal IR.
#[test]
fn structured_dump_round_trip() {
    let first = parse_source(CALIBRATED_EPR);
    let second = parse_source(&first.to_source());
    assert_eq!(first, second);
}
