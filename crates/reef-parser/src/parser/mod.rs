//! The Reef parser: Pratt expression parsing over a statement dispatcher.
//!
//! The parser walks the lexer's token vector with a one-token peek
//! lookahead. Expression parsing is table-free Pratt: prefix and infix
//! handlers are `match` arms keyed by token kind, and a precedence lookup
//! drives the binding loop. A token with no prefix handler produces the
//! `No prefix parse function for <KIND> found` diagnostic.
//!
//! # Error recovery
//!
//! There are no synchronization points. A failed rule aborts the active
//! statement only: the rule records its diagnostic, unwinds via `Err`,
//! and the top-level loop advances one token and tries again. If any
//! diagnostic was produced the statement list is cleared before
//! returning, so downstream consumers never see a partial tree.

mod expressions;
mod statements;
mod types;

use reef_common::diag::{DiagCode, Diagnostic};
use reef_common::token::{Token, TokenKind};

use crate::ast::{Identifier, Program, TokenInfo};
use crate::precedence::{precedence_of, Precedence};

/// Inner error type: the diagnostic is already recorded by the failing
/// rule, so only the unwind itself is carried.
pub(crate) type PResult<T> = Result<T, ()>;

pub(crate) struct Parser<'src> {
    tokens: Vec<Token<'src>>,
    /// Index of the next token to be promoted into `peek`.
    cursor: usize,
    current: Token<'src>,
    peek: Token<'src>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'src> Parser<'src> {
    /// Create a parser over a lexed token vector.
    ///
    /// The vector must end with the `END` token, which the lexer
    /// guarantees.
    pub(crate) fn new(tokens: Vec<Token<'src>>) -> Self {
        let end = *tokens.last().expect("token stream ends with END");
        let mut parser = Self {
            tokens,
            cursor: 0,
            current: end,
            peek: end,
            diagnostics: Vec::new(),
        };
        // Read twice to fill current and peek.
        parser.next_token();
        parser.next_token();
        parser
    }

    /// Parse the whole token stream into a program.
    pub(crate) fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.current_is(TokenKind::End) {
            if let Ok(Some(stmt)) = self.parse_statement() {
                program.statements.push(stmt);
            }
            self.next_token();
        }

        // Never hand a partial tree downstream.
        if !self.diagnostics.is_empty() {
            program.statements.clear();
        }
        program
    }

    // ── Token movement ─────────────────────────────────────────────────

    /// Advance one token. Comment tokens are skipped here so no grammar
    /// rule ever sees one.
    pub(crate) fn next_token(&mut self) {
        self.current = self.peek;
        loop {
            match self.tokens.get(self.cursor) {
                Some(tok) => {
                    self.cursor += 1;
                    if tok.kind != TokenKind::Comment {
                        self.peek = *tok;
                        break;
                    }
                }
                None => {
                    self.peek = *self.tokens.last().expect("END token present");
                    break;
                }
            }
        }
    }

    pub(crate) fn current(&self) -> &Token<'src> {
        &self.current
    }

    pub(crate) fn peek(&self) -> &Token<'src> {
        &self.peek
    }

    pub(crate) fn current_is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub(crate) fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    /// An owned copy of the current token for AST storage.
    pub(crate) fn current_info(&self) -> TokenInfo {
        TokenInfo::of(&self.current)
    }

    /// Left-binding precedence of the peek token.
    pub(crate) fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek.kind)
    }

    // ── Expectations and failure ───────────────────────────────────────

    /// Record a diagnostic and unwind the active rule.
    pub(crate) fn fail<T>(&mut self, diagnostic: Diagnostic) -> PResult<T> {
        self.diagnostics.push(diagnostic);
        Err(())
    }

    /// Record a bare category-code diagnostic and unwind.
    pub(crate) fn fail_code<T>(&mut self, code: DiagCode, at: &TokenInfo) -> PResult<T> {
        self.fail(Diagnostic::code(code, at.position()))
    }

    /// Advance iff the peek token has the expected kind; otherwise emit
    /// `Expected token X, found Y` at the peek position and unwind.
    pub(crate) fn expect_peek(&mut self, kind: TokenKind) -> PResult<()> {
        if self.peek_is(kind) {
            self.next_token();
            Ok(())
        } else {
            self.fail(Diagnostic::expected_token(
                kind,
                self.peek.kind,
                self.peek.position(),
            ))
        }
    }

    /// Build an identifier node from the current token.
    ///
    /// Used for names and for generic-argument elements, where the token
    /// kind may be a primitive keyword.
    pub(crate) fn identifier_here(&self) -> Identifier {
        Identifier {
            token: self.current_info(),
            name: self.current.text.to_string(),
        }
    }
}
