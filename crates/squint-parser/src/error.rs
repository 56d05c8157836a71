//! Parse errors.
//!
//! The parser is non-recovering: the first error aborts the parse and is
//! surfaced to the caller with its 1-based source line.

use squint_lexer::Token;
use std::fmt;

/// Category of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A specific token was expected and something else was found.
    UnexpectedToken,
    /// The source ended while a construct was incomplete.
    UnexpectedEof,
    /// Tokens were present but violate the grammar or an IR invariant
    /// (out-of-range qubit index, workspace mismatch, missing block).
    InvalidProgram,
}

/// Parse error with source line and context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 1-based source line.
    pub line: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::InvalidProgram,
            line,
            message: message.into(),
        }
    }

    /// "expected X, found Y" at a known position.
    pub fn expected(expected: &Token, found: Option<&Token>, line: u32) -> Self {
        let (kind, message) = match found {
            Some(token) => (
                ParseErrorKind::UnexpectedToken,
                format!("expected {expected:?}, found {token:?}"),
            ),
            None => (
                ParseErrorKind::UnexpectedEof,
                format!("expected {expected:?}, found end of input"),
            ),
        };
        Self { kind, line, message }
    }

    /// "unexpected X <context>" at a known position.
    pub fn unexpected(found: Option<&Token>, context: &str, line: u32) -> Self {
        let (kind, message) = match found {
            Some(token) => (
                ParseErrorKind::UnexpectedToken,
                format!("unexpected {token:?} {context}"),
            ),
            None => (
                ParseErrorKind::UnexpectedEof,
                format!("unexpected end of input {context}"),
            ),
        };
        Self { kind, line, message }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}
