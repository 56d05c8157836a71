//! Kernel block parser (keyword-dispatched statements).

use crate::error::ParseError;
use crate::stream::TokenStream;
use indexmap::IndexMap;
use squint_ast::{
    KernelIR, Operation, OperationIR, Overlay, OverlayEntry, OverlayOp, QubitRef, WorkspaceIR,
};
use squint_lexer::Token;

/// Parse `kernel IDENT ["(" RAW ")"] on IDENT { kernel_stmt* }`.
///
/// The kernel must target the declared workspace by name.
pub fn parse_kernel(
    stream: &mut TokenStream,
    workspace: &WorkspaceIR,
) -> Result<KernelIR, ParseError> {
    if !stream.check(&Token::Kernel) {
        return Err(ParseError::new(
            stream.current_line(),
            "kernel block not found",
        ));
    }
    stream.advance();
    let name = stream.expect_ident()?;
    if stream.check(&Token::LParen) {
        // Kernel parameters are reserved; captured and discarded in v0.1.
        stream.slurp_delimited(Token::LParen, Token::RParen)?;
    }
    stream.expect(Token::On)?;
    let target_line = stream.current_line();
    let target = stream.expect_ident()?;
    if target != workspace.name {
        return Err(ParseError::new(
            target_line,
            format!(
                "kernel '{name}' targets workspace '{target}' but workspace is '{}'",
                workspace.name
            ),
        ));
    }
    stream.expect(Token::LBrace)?;

    let mut operations = Vec::new();
    loop {
        match stream.peek() {
            Some(Token::RBrace) => break,
            Some(_) => operations.push(parse_statement(stream, workspace)?),
            None => {
                return Err(ParseError::unexpected(
                    None,
                    "in kernel body",
                    stream.current_line(),
                ));
            }
        }
    }
    stream.expect(Token::RBrace)?;

    Ok(KernelIR { name, operations })
}

fn parse_statement(
    stream: &mut TokenStream,
    workspace: &WorkspaceIR,
) -> Result<OperationIR, ParseError> {
    match stream.peek() {
        Some(Token::Ctrl) => parse_ctrl(stream, workspace),
        Some(Token::Measure) => parse_measure(stream, workspace),
        Some(Token::Initialize) => parse_assignment(stream, Token::Initialize),
        Some(Token::Transport) => parse_assignment(stream, Token::Transport),
        Some(Token::Observe) => parse_observe(stream),
        Some(Token::Relax) => parse_relax(stream),
        Some(Token::Quench) => parse_quench(stream),
        Some(Token::Nucleate) | Some(Token::Pin) | Some(Token::Anneal) | Some(Token::Evolve) => {
            parse_defect(stream)
        }
        Some(Token::HysteresisTrace) => parse_hysteresis(stream),
        Some(Token::Return) => parse_return(stream),
        other => Err(ParseError::unexpected(
            other,
            "at kernel statement",
            stream.current_line(),
        )),
    }
}

/// `ctrl GATE qtargets [angle=EXPR] [with overlay {..}] [unless EXPR] ;`
fn parse_ctrl(
    stream: &mut TokenStream,
    workspace: &WorkspaceIR,
) -> Result<OperationIR, ParseError> {
    let line = stream.current_line();
    stream.expect(Token::Ctrl)?;
    let gate = stream.expect_ident()?;

    let mut targets = vec![parse_qubit_ref(stream, workspace)?];
    while stream.check(&Token::Comma) {
        stream.advance();
        targets.push(parse_qubit_ref(stream, workspace)?);
    }
    check_distinct_targets(&targets, line)?;

    let mut angle = None;
    if stream.check(&Token::Angle) {
        stream.advance();
        stream.expect(Token::Eq)?;
        let expr = stream.slurp_until(&[Token::With, Token::Unless, Token::Semicolon])?;
        if expr.is_empty() {
            return Err(ParseError::new(line, "empty angle expression"));
        }
        angle = Some(expr.to_owned());
    }

    let mut overlay = Overlay::default();
    if stream.check(&Token::With) {
        stream.advance();
        stream.expect(Token::Overlay)?;
        overlay = parse_overlay_clause(stream)?;
    }

    let mut guard = None;
    if stream.check(&Token::Unless) {
        stream.advance();
        let expr = stream.slurp_until(&[Token::Semicolon])?;
        if expr.is_empty() {
            return Err(ParseError::new(line, "empty guard expression"));
        }
        guard = Some(expr.to_owned());
    }

    stream.expect(Token::Semicolon)?;
    Ok(OperationIR::with_overlay(
        Operation::Ctrl {
            gate,
            targets,
            angle,
            guard,
        },
        overlay,
        line,
    ))
}

/// `with overlay { key [op value] (, key [op value])* }`
fn parse_overlay_clause(stream: &mut TokenStream) -> Result<Overlay, ParseError> {
    stream.expect(Token::LBrace)?;
    let mut entries = Vec::new();
    loop {
        if stream.check(&Token::RBrace) {
            break;
        }
        let key = stream.expect_word()?;
        let entry = match stream.peek() {
            Some(Token::GtEq) => {
                stream.advance();
                OverlayEntry::new(key, OverlayOp::Ge, overlay_value(stream)?)
            }
            Some(Token::LtEq) => {
                stream.advance();
                OverlayEntry::new(key, OverlayOp::Le, overlay_value(stream)?)
            }
            Some(Token::EqEq) => {
                stream.advance();
                OverlayEntry::new(key, OverlayOp::EqEq, overlay_value(stream)?)
            }
            Some(Token::Eq) => {
                stream.advance();
                OverlayEntry::new(key, OverlayOp::Assign, overlay_value(stream)?)
            }
            Some(Token::Comma) | Some(Token::RBrace) => {
                OverlayEntry::new(key, OverlayOp::Flag, "")
            }
            other => {
                return Err(ParseError::unexpected(
                    other,
                    "in overlay entry",
                    stream.current_line(),
                ));
            }
        };
        entries.push(entry);
        if stream.check(&Token::Comma) {
            stream.advance();
        } else {
            break;
        }
    }
    stream.expect(Token::RBrace)?;
    Ok(Overlay::new(entries))
}

fn overlay_value(stream: &mut TokenStream) -> Result<String, ParseError> {
    let line = stream.current_line();
    let value = stream.slurp_until(&[Token::Comma, Token::RBrace])?;
    if value.is_empty() {
        return Err(ParseError::new(line, "empty overlay value"));
    }
    Ok(value.to_owned())
}

/// `measure qtarget (, qtarget)* -> IDENT (, IDENT)* ;`
fn parse_measure(
    stream: &mut TokenStream,
    workspace: &WorkspaceIR,
) -> Result<OperationIR, ParseError> {
    let line = stream.current_line();
    stream.expect(Token::Measure)?;
    let mut targets = vec![parse_qubit_ref(stream, workspace)?];
    while stream.check(&Token::Comma) {
        stream.advance();
        targets.push(parse_qubit_ref(stream, workspace)?);
    }
    check_distinct_targets(&targets, line)?;
    stream.expect(Token::Arrow)?;
    let mut outputs = vec![stream.expect_ident()?];
    while stream.check(&Token::Comma) {
        stream.advance();
        outputs.push(stream.expect_ident()?);
    }
    stream.expect(Token::Semicolon)?;
    if outputs.len() != targets.len() {
        return Err(ParseError::new(
            line,
            format!(
                "measure has {} target(s) but {} output(s)",
                targets.len(),
                outputs.len()
            ),
        ));
    }
    Ok(OperationIR::new(Operation::Measure { targets, outputs }, line))
}

/// `initialize IDENT = EXPR ;` and `transport IDENT = EXPR ;`
fn parse_assignment(stream: &mut TokenStream, keyword: Token) -> Result<OperationIR, ParseError> {
    let line = stream.current_line();
    let is_initialize = matches!(keyword, Token::Initialize);
    stream.expect(keyword)?;
    let name = stream.expect_ident()?;
    stream.expect(Token::Eq)?;
    let expr = stream.slurp_until(&[Token::Semicolon])?;
    if expr.is_empty() {
        return Err(ParseError::new(line, "empty initializer expression"));
    }
    let expr = expr.to_owned();
    stream.expect(Token::Semicolon)?;
    let op = if is_initialize {
        Operation::Initialize { name, expr }
    } else {
        Operation::Transport { name, expr }
    };
    Ok(OperationIR::new(op, line))
}

/// `observe IDENT [into IDENT] [with corrections { k=v, .. }] ;`
fn parse_observe(stream: &mut TokenStream) -> Result<OperationIR, ParseError> {
    let line = stream.current_line();
    stream.expect(Token::Observe)?;
    let what = stream.expect_ident()?;
    let mut into = None;
    if stream.check(&Token::Into) {
        stream.advance();
        into = Some(stream.expect_ident()?);
    }
    let mut corrections = IndexMap::new();
    if stream.check(&Token::With) {
        stream.advance();
        stream.expect(Token::Corrections)?;
        stream.expect(Token::LBrace)?;
        loop {
            if stream.check(&Token::RBrace) {
                break;
            }
            let key = stream.expect_word()?;
            stream.expect(Token::Eq)?;
            let value = stream.slurp_until(&[Token::Comma, Token::RBrace])?;
            if value.is_empty() {
                return Err(ParseError::new(
                    stream.current_line(),
                    "empty correction value",
                ));
            }
            corrections.insert(key, value.to_owned());
            if stream.check(&Token::Comma) {
                stream.advance();
            } else {
                break;
            }
        }
        stream.expect(Token::RBrace)?;
    }
    stream.expect(Token::Semicolon)?;
    Ok(OperationIR::new(
        Operation::Observe {
            what,
            into,
            corrections,
        },
        line,
    ))
}

/// `relax IDENT ( rate = EXPR ) ;`
fn parse_relax(stream: &mut TokenStream) -> Result<OperationIR, ParseError> {
    let line = stream.current_line();
    stream.expect(Token::Relax)?;
    let name = stream.expect_ident()?;
    stream.expect(Token::LParen)?;
    stream.expect(Token::Rate)?;
    stream.expect(Token::Eq)?;
    let rate = stream.slurp_until(&[Token::RParen])?;
    if rate.is_empty() {
        return Err(ParseError::new(line, "empty relax rate"));
    }
    let rate = rate.to_owned();
    stream.expect(Token::RParen)?;
    stream.expect(Token::Semicolon)?;
    Ok(OperationIR::new(Operation::Relax { name, rate }, line))
}

/// `quench IDENT = inject ( IDENT , amount = NUMBER ) ;`
fn parse_quench(stream: &mut TokenStream) -> Result<OperationIR, ParseError> {
    let line = stream.current_line();
    stream.expect(Token::Quench)?;
    let name = stream.expect_ident()?;
    stream.expect(Token::Eq)?;
    stream.expect(Token::Inject)?;
    stream.expect(Token::LParen)?;
    let handle = stream.expect_ident()?;
    stream.expect(Token::Comma)?;
    stream.expect(Token::Amount)?;
    stream.expect(Token::Eq)?;
    let amount = stream.expect_number()?;
    stream.expect(Token::RParen)?;
    stream.expect(Token::Semicolon)?;
    Ok(OperationIR::new(
        Operation::Quench {
            name,
            handle,
            amount,
        },
        line,
    ))
}

/// `nucleate|pin|anneal|evolve RAW ;` — the payload is captured verbatim.
fn parse_defect(stream: &mut TokenStream) -> Result<OperationIR, ParseError> {
    let line = stream.current_line();
    let keyword = stream.advance().cloned();
    let spec = stream.slurp_until(&[Token::Semicolon])?;
    if spec.is_empty() {
        return Err(ParseError::new(line, "empty defect statement"));
    }
    let spec = spec.to_owned();
    stream.expect(Token::Semicolon)?;
    let op = match keyword {
        Some(Token::Nucleate) => Operation::Nucleate { spec },
        Some(Token::Pin) => Operation::Pin { spec },
        Some(Token::Anneal) => Operation::Anneal { spec },
        Some(Token::Evolve) => Operation::Evolve { spec },
        _ => unreachable!("defect statement dispatched on keyword"),
    };
    Ok(OperationIR::new(op, line))
}

/// `hysteresis_trace ( IDENT [, window = INT] ) ;`
fn parse_hysteresis(stream: &mut TokenStream) -> Result<OperationIR, ParseError> {
    let line = stream.current_line();
    stream.expect(Token::HysteresisTrace)?;
    stream.expect(Token::LParen)?;
    let handle = stream.expect_ident()?;
    let mut window = None;
    if stream.check(&Token::Comma) {
        stream.advance();
        stream.expect(Token::Window)?;
        stream.expect(Token::Eq)?;
        let value = stream.expect_integer()?;
        window = Some(
            u32::try_from(value).map_err(|_| ParseError::new(line, "window out of range"))?,
        );
    }
    stream.expect(Token::RParen)?;
    stream.expect(Token::Semicolon)?;
    Ok(OperationIR::new(
        Operation::HysteresisTrace { handle, window },
        line,
    ))
}

/// `return { RAW } ;`
fn parse_return(stream: &mut TokenStream) -> Result<OperationIR, ParseError> {
    let line = stream.current_line();
    stream.expect(Token::Return)?;
    let spec = stream
        .slurp_delimited(Token::LBrace, Token::RBrace)?
        .to_owned();
    stream.expect(Token::Semicolon)?;
    Ok(OperationIR::new(Operation::Return { spec }, line))
}

/// `IDENT` or `IDENT [ INT ]`, with the index checked against the
/// workspace register size.
fn parse_qubit_ref(
    stream: &mut TokenStream,
    workspace: &WorkspaceIR,
) -> Result<QubitRef, ParseError> {
    let line = stream.current_line();
    let register = stream.expect_ident()?;
    if !stream.check(&Token::LBracket) {
        return Ok(QubitRef::bare(register));
    }
    stream.advance();
    let index = stream.expect_integer()?;
    stream.expect(Token::RBracket)?;
    let index =
        u32::try_from(index).map_err(|_| ParseError::new(line, "qubit index out of range"))?;
    if index >= workspace.qubits {
        return Err(ParseError::new(
            line,
            format!(
                "qubit index {index} out of range (register has {} qubits)",
                workspace.qubits
            ),
        ));
    }
    Ok(QubitRef::indexed(register, index))
}

fn check_distinct_targets(targets: &[QubitRef], line: u32) -> Result<(), ParseError> {
    for (i, a) in targets.iter().enumerate() {
        for b in &targets[i + 1..] {
            if a.index.is_some() && a == b {
                return Err(ParseError::new(
                    line,
                    format!("qubit target {a} repeated in multi-target operation"),
                ));
            }
        }
    }
    Ok(())
}
