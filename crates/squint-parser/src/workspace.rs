//! Workspace block parser.

use crate::error::ParseError;
use crate::stream::TokenStream;
use indexmap::IndexMap;
use squint_ast::{FieldKind, Lattice, WorkspaceIR};
use squint_lexer::Token;

/// Parse `workspace IDENT { ws_stmt* }`.
pub fn parse_workspace(stream: &mut TokenStream) -> Result<WorkspaceIR, ParseError> {
    if !stream.check(&Token::Workspace) {
        return Err(ParseError::new(
            stream.current_line(),
            "workspace block not found",
        ));
    }
    stream.advance();
    let name = stream.expect_ident()?;
    stream.expect(Token::LBrace)?;

    let mut qubits: Option<(u32, u32)> = None; // (count, decl line)
    let mut lattice: Option<(Lattice, u32)> = None;
    let mut semantic_fields = IndexMap::new();
    let mut defect_fields = Vec::new();

    loop {
        match stream.peek() {
            Some(Token::RBrace) => break,
            Some(Token::Qubits) => {
                let line = stream.current_line();
                qubits = Some((parse_qubits_stmt(stream)?, line));
            }
            Some(Token::Lattice) => {
                let line = stream.current_line();
                lattice = Some((parse_lattice_stmt(stream)?, line));
            }
            Some(Token::SemanticField) => {
                let (field, kind) = parse_semantic_field_stmt(stream)?;
                semantic_fields.insert(field, kind);
            }
            Some(Token::DefectField) => {
                defect_fields.push(parse_defect_field_stmt(stream)?);
            }
            other => {
                return Err(ParseError::unexpected(
                    other,
                    "in workspace body",
                    stream.current_line(),
                ));
            }
        }
    }

    let close_line = stream.current_line();
    stream.expect(Token::RBrace)?;

    let (qubits, qubits_line) = qubits.ok_or_else(|| {
        ParseError::new(close_line, "qubits decl not found (expect: qubits q[N];)")
    })?;
    if qubits == 0 {
        return Err(ParseError::new(
            qubits_line,
            "workspace must declare at least one qubit",
        ));
    }
    let (lattice, lattice_line) = lattice.ok_or_else(|| {
        ParseError::new(
            close_line,
            "lattice decl not found (expect: lattice L(x,y) attach q;)",
        )
    })?;
    if lattice.capacity() < u64::from(qubits) {
        return Err(ParseError::new(
            lattice_line,
            format!(
                "lattice {lattice} has {} sites but {qubits} qubits are attached",
                lattice.capacity()
            ),
        ));
    }

    Ok(WorkspaceIR {
        name,
        qubits,
        lattice,
        semantic_fields,
        defect_fields,
    })
}

/// `qubits IDENT [ INT ] ;`
fn parse_qubits_stmt(stream: &mut TokenStream) -> Result<u32, ParseError> {
    let line = stream.current_line();
    stream.expect(Token::Qubits)?;
    stream.expect_ident()?;
    stream.expect(Token::LBracket)?;
    let count = stream.expect_integer()?;
    stream.expect(Token::RBracket)?;
    stream.expect(Token::Semicolon)?;
    u32::try_from(count).map_err(|_| ParseError::new(line, "qubit count out of range"))
}

/// `lattice IDENT ( INT , INT ) attach IDENT ;`
fn parse_lattice_stmt(stream: &mut TokenStream) -> Result<Lattice, ParseError> {
    let line = stream.current_line();
    stream.expect(Token::Lattice)?;
    stream.expect_ident()?;
    stream.expect(Token::LParen)?;
    let cols = stream.expect_integer()?;
    stream.expect(Token::Comma)?;
    let rows = stream.expect_integer()?;
    stream.expect(Token::RParen)?;
    stream.expect(Token::Attach)?;
    stream.expect_ident()?;
    stream.expect(Token::Semicolon)?;
    let cols = u32::try_from(cols).map_err(|_| ParseError::new(line, "lattice columns out of range"))?;
    let rows = u32::try_from(rows).map_err(|_| ParseError::new(line, "lattice rows out of range"))?;
    Ok(Lattice::new(cols, rows))
}

/// `semantic_field IDENT : (scalar|vector|tensor[K]) on IDENT ;`
fn parse_semantic_field_stmt(
    stream: &mut TokenStream,
) -> Result<(String, FieldKind), ParseError> {
    stream.expect(Token::SemanticField)?;
    let name = stream.expect_ident()?;
    stream.expect(Token::Colon)?;
    let kind = match stream.peek() {
        Some(Token::Scalar) => {
            stream.advance();
            FieldKind::Scalar
        }
        Some(Token::Vector) => {
            stream.advance();
            FieldKind::Vector
        }
        Some(Token::Tensor) => {
            let line = stream.current_line();
            stream.advance();
            stream.expect(Token::LBracket)?;
            let rank = stream.expect_integer()?;
            stream.expect(Token::RBracket)?;
            let rank =
                u32::try_from(rank).map_err(|_| ParseError::new(line, "tensor rank out of range"))?;
            FieldKind::Tensor(rank)
        }
        other => {
            return Err(ParseError::unexpected(
                other,
                "where a field kind was expected (scalar, vector, tensor[k])",
                stream.current_line(),
            ));
        }
    };
    stream.expect(Token::On)?;
    stream.expect_ident()?;
    stream.expect(Token::Semicolon)?;
    Ok((name, kind))
}

/// `defect_field IDENT : defects on IDENT { RAW } ;`
///
/// The brace body is reserved for defect parameters; v0.1 captures and
/// discards it.
fn parse_defect_field_stmt(stream: &mut TokenStream) -> Result<String, ParseError> {
    stream.expect(Token::DefectField)?;
    let name = stream.expect_ident()?;
    stream.expect(Token::Colon)?;
    stream.expect(Token::Defects)?;
    stream.expect(Token::On)?;
    stream.expect_ident()?;
    stream.slurp_delimited(Token::LBrace, Token::RBrace)?;
    stream.expect(Token::Semicolon)?;
    Ok(name)
}
