//! Hand-written recursive descent parser for the SQUINT DSL.
//!
//! The parser consumes the token stream produced by `squint-lexer` and
//! builds the program IR. It is non-recovering: the first error aborts
//! with a [`ParseError`] carrying the 1-based source line.
//!
//! ## Architecture
//!
//! - `stream`: token stream wrapper with lookahead and raw-payload slicing
//! - `error`: [`ParseError`] and its constructors
//! - `workspace`: workspace block (topology declarations)
//! - `kernel`: kernel block (keyword-dispatched statements)
//!
//! Argument payloads the compiler does not interpret (angle expressions,
//! guard expressions, defect specs, return specs, initializers) are
//! captured as verbatim source slices, so Unicode like `π/2` or `m0 ⊕ m1`
//! survives untouched into the IR.

mod error;
mod kernel;
mod stream;
mod workspace;

pub use error::{ParseError, ParseErrorKind};

use squint_ast::ProgramIR;
use squint_lexer::{tokenize, LineIndex};
use stream::TokenStream;

/// Parse a complete program: one workspace block followed by one kernel
/// block.
pub fn parse(source: &str) -> Result<ProgramIR, ParseError> {
    let lines = LineIndex::new(source);
    let tokens = tokenize(source)
        .map_err(|e| ParseError::new(lines.line(e.span.start), "unrecognized token"))?;
    let mut stream = TokenStream::new(source, &tokens, &lines);

    let workspace = workspace::parse_workspace(&mut stream)?;
    let kernel = kernel::parse_kernel(&mut stream, &workspace)?;

    if !stream.at_end() {
        let line = stream.current_line();
        return Err(ParseError::unexpected(
            stream.peek(),
            "after kernel block",
            line,
        ));
    }

    Ok(ProgramIR { workspace, kernel })
}
