//! Parser failure modes. The parser is non-recovering, so every case
//! checks the first (and only) reported error.

use squint_parser::{parse, ParseErrorKind};

const WORKSPACE: &str = "workspace Chip {\n\
                         qubits q[4];\n\
                         lattice L(2,2) attach q;\n\
                         semantic_field Phi: scalar on L;\n\
                         defect_field D: defects on L {};\n\
                         }\n";

fn with_kernel(body: &str) -> String {
    format!("{WORKSPACE}kernel K on Chip {{\n{body}\n}}\n")
}

#[test]
fn missing_workspace_block() {
    let err = parse("kernel K on Chip {}").expect_err("must fail");
    assert!(err.message.contains("workspace block not found"));
}

#[test]
fn missing_qubits_declaration() {
    let err = parse("workspace W { lattice L(2,2) attach q; }\nkernel K on W {}")
        .expect_err("must fail");
    assert!(err.message.contains("qubits decl not found"));
}

#[test]
fn missing_lattice_declaration() {
    let err = parse("workspace W { qubits q[4]; }\nkernel K on W {}").expect_err("must fail");
    assert!(err.message.contains("lattice decl not found"));
}

#[test]
fn lattice_too_small_for_register() {
    let err = parse("workspace W { qubits q[5]; lattice L(2,2) attach q; }\nkernel K on W {}")
        .expect_err("must fail");
    assert!(err.message.contains("4 sites but 5 qubits"));
    assert_eq!(err.line, 1);
}

#[test]
fn kernel_must_target_declared_workspace() {
    let err = parse(&format!("{WORKSPACE}kernel K on Elsewhere {{}}")).expect_err("must fail");
    assert!(err
        .message
        .contains("kernel 'K' targets workspace 'Elsewhere' but workspace is 'Chip'"));
    assert_eq!(err.line, 7);
}

#[test]
fn qubit_index_out_of_range() {
    let err = parse(&with_kernel("ctrl x q[7];")).expect_err("must fail");
    assert!(err.message.contains("qubit index 7 out of range"));
    assert_eq!(err.line, 8);
}

#[test]
fn repeated_target_in_two_qubit_gate() {
    let err = parse(&with_kernel("ctrl cz q[1], q[1];")).expect_err("must fail");
    assert!(err.message.contains("qubit target q[1] repeated"));
}

#[test]
fn measure_arity_mismatch() {
    let err = parse(&with_kernel("measure q[0], q[1] -> m0;")).expect_err("must fail");
    assert!(err.message.contains("2 target(s) but 1 output(s)"));
}

#[test]
fn missing_semicolon() {
    let err = parse(&with_kernel("ctrl x q[0]")).expect_err("must fail");
    assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
    assert!(err.message.contains("expected Semicolon"));
}

#[test]
fn unbalanced_return_braces() {
    let err =
        parse(&format!("{WORKSPACE}kernel K on Chip {{\nreturn {{ m0")).expect_err("must fail");
    assert!(err.message.contains("unbalanced delimiters"));
    assert_eq!(err.line, 8);
}

#[test]
fn unknown_statement_keyword() {
    let err = parse(&with_kernel("teleport q[0];")).expect_err("must fail");
    assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
    assert!(err.message.contains("at kernel statement"));
    assert_eq!(err.line, 8);
}

#[test]
fn stray_glyph_in_structured_context() {
    let err = parse(&with_kernel("ctrl x ⊕;")).expect_err("must fail");
    assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
}

#[test]
fn trailing_content_after_kernel() {
    let err = parse(&format!("{WORKSPACE}kernel K on Chip {{}}\nmeasure"))
        .expect_err("must fail");
    assert!(err.message.contains("after kernel block"));
}
