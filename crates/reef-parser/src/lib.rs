//! Reef parser: Pratt expression parsing into an owned, typed AST.
//!
//! This crate turns the token stream from `reef-lexer` into the
//! statement list of [`ast::Program`]. Expressions are parsed with
//! precedence climbing over per-kind prefix/infix handlers; statements
//! are dispatched on their leading token. All diagnostics carry the
//! 1-based position of the offending token.

pub mod ast;
mod parser;
pub mod precedence;
pub mod reconstruct;

use reef_common::diag::Diagnostic;
use reef_lexer::Lexer;

use ast::Program;

/// Result of parsing a Reef source buffer.
///
/// When any diagnostic was produced the statement list is empty -- no
/// partial trees are handed to downstream consumers.
#[derive(Debug)]
pub struct Parse {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

impl Parse {
    /// Whether parsing completed without diagnostics.
    pub fn ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parse a Reef source buffer.
///
/// This is the main entry point: it lexes the source, parses the token
/// stream, and returns the program plus any diagnostics in source order.
pub fn parse(source: &str) -> Parse {
    let tokens = Lexer::tokenize(source);
    let mut parser = parser::Parser::new(tokens);
    let program = parser.parse_program();
    Parse {
        program,
        diagnostics: parser.diagnostics,
    }
}
