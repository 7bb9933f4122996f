//! Shared leaf types for the Reef compiler.
//!
//! Everything downstream of the lexer speaks in terms of these types:
//! [`token::Token`] and [`token::TokenKind`] for the lexical vocabulary,
//! [`span::Position`] for 1-based source coordinates, and
//! [`diag::Diagnostic`] for the single diagnostic currency shared by the
//! lexer, parser, and semantic analyzer.

pub mod diag;
pub mod span;
pub mod token;
