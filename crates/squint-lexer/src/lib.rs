//! Lexical analysis for the SQUINT DSL.
//!
//! Tokenization is done with logos. Line comments (`//` to end of line) are
//! stripped during lexing and never reach the parser. The ASCII overlay
//! operators `>=` and `<=` lex to the same tokens as their Unicode forms
//! `≥` and `≤`, so downstream stages only ever see one spelling.
//!
//! Raw payloads (angle expressions, defect specs, return specs) are not
//! tokenized specially: the parser re-slices the source text using token
//! byte spans. To make that possible, identifiers cover Unicode letters
//! (`Φ`, `η`, `δQ_top`) and any character with no token of its own lexes
//! as [`Token::Glyph`] instead of failing, e.g. the `⊕` in a return spec.
//! A stray glyph in structured context is rejected by the parser, not here.

use logos::Logos;
use std::ops::Range;
use thiserror::Error;

/// SQUINT token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    // === Structure keywords ===
    /// Keyword `workspace`
    #[token("workspace")]
    Workspace,
    /// Keyword `kernel`
    #[token("kernel")]
    Kernel,
    /// Keyword `qubits`
    #[token("qubits")]
    Qubits,
    /// Keyword `lattice`
    #[token("lattice")]
    Lattice,
    /// Keyword `attach`
    #[token("attach")]
    Attach,
    /// Keyword `on`
    #[token("on")]
    On,
    /// Keyword `semantic_field`
    #[token("semantic_field")]
    SemanticField,
    /// Keyword `defect_field`
    #[token("defect_field")]
    DefectField,
    /// Keyword `defects`
    #[token("defects")]
    Defects,
    /// Field kind `scalar`
    #[token("scalar")]
    Scalar,
    /// Field kind `vector`
    #[token("vector")]
    Vector,
    /// Field kind `tensor` (rank follows in brackets)
    #[token("tensor")]
    Tensor,

    // === Statement keywords ===
    /// Keyword `ctrl`
    #[token("ctrl")]
    Ctrl,
    /// Keyword `measure`
    #[token("measure")]
    Measure,
    /// Keyword `initialize`
    #[token("initialize")]
    Initialize,
    /// Keyword `observe`
    #[token("observe")]
    Observe,
    /// Keyword `transport`
    #[token("transport")]
    Transport,
    /// Keyword `relax`
    #[token("relax")]
    Relax,
    /// Keyword `quench`
    #[token("quench")]
    Quench,
    /// Keyword `nucleate`
    #[token("nucleate")]
    Nucleate,
    /// Keyword `pin`
    #[token("pin")]
    Pin,
    /// Keyword `anneal`
    #[token("anneal")]
    Anneal,
    /// Keyword `evolve`
    #[token("evolve")]
    Evolve,
    /// Keyword `hysteresis_trace`
    #[token("hysteresis_trace")]
    HysteresisTrace,
    /// Keyword `return`
    #[token("return")]
    Return,

    // === Clause keywords ===
    /// Keyword `with`
    #[token("with")]
    With,
    /// Keyword `overlay`
    #[token("overlay")]
    Overlay,
    /// Keyword `unless`
    #[token("unless")]
    Unless,
    /// Keyword `angle`
    #[token("angle")]
    Angle,
    /// Keyword `into`
    #[token("into")]
    Into,
    /// Keyword `corrections`
    #[token("corrections")]
    Corrections,
    /// Keyword `inject`
    #[token("inject")]
    Inject,
    /// Keyword `amount`
    #[token("amount")]
    Amount,
    /// Keyword `window`
    #[token("window")]
    Window,
    /// Keyword `rate`
    #[token("rate")]
    Rate,

    // === Operators ===
    /// Operator `==`
    #[token("==")]
    EqEq,
    /// Operator `>=` / `≥` (unified at the token level)
    #[token(">=")]
    #[token("≥")]
    GtEq,
    /// Operator `<=` / `≤` (unified at the token level)
    #[token("<=")]
    #[token("≤")]
    LtEq,
    /// Operator `=`
    #[token("=")]
    Eq,
    /// Operator `->`
    #[token("->")]
    Arrow,
    /// Operator `:`
    #[token(":")]
    Colon,
    /// Operator `,`
    #[token(",")]
    Comma,
    /// Operator `;`
    #[token(";")]
    Semicolon,

    // === Delimiters ===
    /// Delimiter `(`
    #[token("(")]
    LParen,
    /// Delimiter `)`
    #[token(")")]
    RParen,
    /// Delimiter `{`
    #[token("{")]
    LBrace,
    /// Delimiter `}`
    #[token("}")]
    RBrace,
    /// Delimiter `[`
    #[token("[")]
    LBracket,
    /// Delimiter `]`
    #[token("]")]
    RBracket,

    // === Literals ===
    /// Float literal (e.g. 0.4, 5.67e-8)
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    /// Integer literal (e.g. 42, 0, 1000)
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    Integer(u64),

    /// Identifier. Unicode letters are allowed so field and observable
    /// names like `Φ`, `η`, `δQ_top`, `T_eff` lex as single tokens.
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*", |lex| lex.slice().to_owned())]
    Ident(String),

    /// Any other single character (`⊕`, `/`, `-`, ...). Only meaningful
    /// inside raw payloads, where the parser slices source text by span.
    #[regex(r".", |lex| lex.slice().chars().next(), priority = 0)]
    Glyph(char),
}

impl Token {
    /// Canonical source text of keyword tokens, for positions where a
    /// keyword may double as a plain word (overlay keys, correction
    /// keys). Returns None for operators, delimiters, and literals.
    pub fn keyword_str(&self) -> Option<&'static str> {
        Some(match self {
            Token::Workspace => "workspace",
            Token::Kernel => "kernel",
            Token::Qubits => "qubits",
            Token::Lattice => "lattice",
            Token::Attach => "attach",
            Token::On => "on",
            Token::SemanticField => "semantic_field",
            Token::DefectField => "defect_field",
            Token::Defects => "defects",
            Token::Scalar => "scalar",
            Token::Vector => "vector",
            Token::Tensor => "tensor",
            Token::Ctrl => "ctrl",
            Token::Measure => "measure",
            Token::Initialize => "initialize",
            Token::Observe => "observe",
            Token::Transport => "transport",
            Token::Relax => "relax",
            Token::Quench => "quench",
            Token::Nucleate => "nucleate",
            Token::Pin => "pin",
            Token::Anneal => "anneal",
            Token::Evolve => "evolve",
            Token::HysteresisTrace => "hysteresis_trace",
            Token::Return => "return",
            Token::With => "with",
            Token::Overlay => "overlay",
            Token::Unless => "unless",
            Token::Angle => "angle",
            Token::Into => "into",
            Token::Corrections => "corrections",
            Token::Inject => "inject",
            Token::Amount => "amount",
            Token::Window => "window",
            Token::Rate => "rate",
            _ => return None,
        })
    }
}

/// Tokenization failure. With the glyph fallback in place this only
/// happens for degenerate literals (e.g. an integer that overflows u64).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized token at bytes {}..{}", span.start, span.end)]
pub struct LexError {
    /// Byte range of the offending text.
    pub span: Range<usize>,
}

/// Tokenize a full source string into (token, byte span) pairs.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Range<usize>)>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => return Err(LexError { span: lexer.span() }),
        }
    }
    Ok(tokens)
}

/// Byte-offset to 1-based line number lookup, built once per source.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line containing the given byte offset.
    pub fn line(&self, offset: usize) -> u32 {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i as u32 + 1,
            Err(i) => i as u32,
        }
    }
}
