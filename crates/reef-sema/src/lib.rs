//! Semantic analysis for the Reef language.
//!
//! Walks a parsed [`reef_parser::ast::Program`] top-down, resolving
//! identifiers against lexically nested scopes, propagating types, and
//! enforcing the language rules: const-ness, nullability, assignability,
//! enum well-formedness, and arithmetic domains. The output is an
//! ordered diagnostic vector; an empty vector means the program is
//! semantically valid.

mod analyze;
pub mod context;
pub mod ty;

pub use analyze::Analyzer;

use reef_common::diag::Diagnostic;
use reef_parser::ast::Program;

/// Analyze a program with a fresh global context.
///
/// Convenience wrapper over [`Analyzer`] for one-shot compiles; the REPL
/// holds an `Analyzer` instead so bindings persist across lines.
pub fn analyze(program: &Program) -> Vec<Diagnostic> {
    Analyzer::new().analyze(program)
}
