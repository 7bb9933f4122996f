//! Statement dispatch and the statement sub-parsers.

use reef_common::diag::{DiagCode, Diagnostic};
use reef_common::token::TokenKind;

use crate::ast::*;
use crate::precedence::Precedence;

use super::{PResult, Parser};

impl<'src> Parser<'src> {
    /// Dispatch on the current token and parse one statement.
    ///
    /// Returns `Ok(None)` for a stray semicolon. A trailing semicolon
    /// after any successfully parsed statement is consumed here.
    pub(crate) fn parse_statement(&mut self) -> PResult<Option<Stmt>> {
        use TokenKind::*;
        let stmt = match self.current().kind {
            kind if kind.is_decl_modifier() => Some(Stmt::Decl(self.parse_decl_statement()?)),
            Type => Some(Stmt::TypeDecl(self.parse_type_decl_statement()?)),
            Break | Return | Continue => Some(Stmt::Jump(self.parse_jump_statement()?)),
            Impl => Some(Stmt::Impl(self.parse_impl_statement()?)),
            Import => Some(Stmt::Import(self.parse_import_statement()?)),
            Lbrace => Some(Stmt::Block(self.parse_block()?)),
            Underscore => Some(Stmt::Discard(self.parse_discard_statement()?)),
            Semicolon => None,
            _ => Some(Stmt::Expr(ExprStmt {
                expr: self.parse_expression(Precedence::Lowest)?,
            })),
        };

        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Ok(stmt)
    }

    /// Parse a statement where one is mandatory (if branches, loop else
    /// clauses).
    pub(crate) fn parse_branch_statement(&mut self) -> PResult<Stmt> {
        match self.parse_statement()? {
            Some(stmt) => Ok(stmt),
            None => {
                let kind = self.current().kind;
                let position = self.current().position();
                self.fail(Diagnostic::no_prefix_fn(kind, position))
            }
        }
    }

    // ── Blocks ─────────────────────────────────────────────────────────

    /// Parse `{ statements }`; the current token is the opening brace.
    pub(crate) fn parse_block(&mut self) -> PResult<BlockStmt> {
        let token = self.current_info();
        let mut statements = Vec::new();

        self.next_token();
        while !self.current_is(TokenKind::Rbrace) && !self.current_is(TokenKind::End) {
            if let Some(stmt) = self.parse_statement()? {
                statements.push(stmt);
            }
            self.next_token();
        }

        if !self.current_is(TokenKind::Rbrace) {
            let diagnostic = Diagnostic::expected_token(
                TokenKind::Rbrace,
                self.current().kind,
                self.current().position(),
            );
            return self.fail(diagnostic);
        }

        Ok(BlockStmt { token, statements })
    }

    // ── Declarations ───────────────────────────────────────────────────

    /// Parse `mods name [: Type | := value] [= value]`.
    ///
    /// The modifier run is collected first and validated as a set; the
    /// violation diagnostic lands on the first modifier token.
    pub(crate) fn parse_decl_statement(&mut self) -> PResult<DeclStmt> {
        let token = self.current_info();

        let mut modifiers = Modifiers::empty();
        loop {
            let flag = Modifiers::from_token(self.current().kind)
                .expect("statement dispatch only enters on a modifier");
            modifiers.insert(flag);
            if Modifiers::from_token(self.peek().kind).is_some() {
                self.next_token();
            } else {
                break;
            }
        }
        if !modifiers.is_well_formed() {
            return self.fail_code(DiagCode::IllegalDeclModifiers, &token);
        }

        self.expect_peek(TokenKind::Ident)?;
        let name = self.identifier_here();

        // Walrus: infer the type from the initializer.
        if self.peek_is(TokenKind::Walrus) {
            self.next_token();
            let ty = TypeExpr::implicit(self.current_info());
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            return Ok(DeclStmt {
                token,
                modifiers,
                name,
                ty,
                value: Some(value),
            });
        }

        self.expect_peek(TokenKind::Colon)?;
        let anchor = self.current_info();
        self.next_token();
        let ty = self.parse_explicit_type(&anchor)?;
        // `typeof` only lives in type declarations; remember the offense
        // but finish the statement so recovery resumes cleanly after it.
        let illegal_typeof = ty.is_typeof();

        let value = if self.peek_is(TokenKind::Assign) {
            self.next_token();
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        } else {
            None
        };

        if illegal_typeof {
            return self.fail_code(DiagCode::IllegalDeclConstruct, &token);
        }

        Ok(DeclStmt { token, modifiers, name, ty, value })
    }

    /// Parse `type Name = value` where the value is a primitive alias or
    /// a general type expression.
    fn parse_type_decl_statement(&mut self) -> PResult<TypeDeclStmt> {
        let token = self.current_info();
        self.expect_peek(TokenKind::Ident)?;
        let name = self.identifier_here();
        self.expect_peek(TokenKind::Assign)?;
        let anchor = self.current_info();

        self.next_token();
        if self.current().kind.is_primitive() {
            return Ok(TypeDeclStmt {
                token,
                name,
                value: TypeDeclValue::PrimitiveAlias(self.identifier_here()),
            });
        }

        // `typeof` of a literal type construct introspects nothing. The
        // offense is read off the construct's leading keyword up front;
        // the right-hand side still parses afterwards so its own
        // structural errors surface too.
        let redundant = self.current_is(TokenKind::Typeof)
            && matches!(
                self.peek().kind,
                TokenKind::Function | TokenKind::Struct | TokenKind::Packed | TokenKind::Enum
            );
        if redundant {
            self.diagnostics.push(Diagnostic::code(
                DiagCode::RedundantTypeIntrospection,
                self.peek().position(),
            ));
            self.diagnostics
                .push(Diagnostic::code(DiagCode::MalformedTypeDecl, token.position()));
        }

        let ty = match self.parse_explicit_type(&anchor) {
            Ok(ty) => ty,
            Err(()) => {
                if !redundant {
                    self.diagnostics
                        .push(Diagnostic::code(DiagCode::MalformedTypeDecl, token.position()));
                }
                return Err(());
            }
        };
        if redundant {
            return Err(());
        }

        Ok(TypeDeclStmt {
            token,
            name,
            value: TypeDeclValue::Type(ty),
        })
    }

    // ── Jumps ──────────────────────────────────────────────────────────

    /// Parse `return [v]`, `break [v]`, or `continue`.
    ///
    /// `continue` never takes a value: `continue 2` is a bare jump
    /// followed by a separate expression statement.
    pub(crate) fn parse_jump_statement(&mut self) -> PResult<JumpStmt> {
        let token = self.current_info();
        let kind = match self.current().kind {
            TokenKind::Return => JumpKind::Return,
            TokenKind::Break => JumpKind::Break,
            _ => JumpKind::Continue,
        };

        // A value only follows when the next token can start one; a
        // delimiter means a bare jump (`return;`, `break,`, `break }`).
        let value = if kind != JumpKind::Continue
            && !matches!(
                self.peek().kind,
                TokenKind::Semicolon | TokenKind::End | TokenKind::Comma | TokenKind::Rbrace
            ) {
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        } else {
            None
        };

        Ok(JumpStmt { token, kind, value })
    }

    // ── Discard ────────────────────────────────────────────────────────

    /// Parse `_ = expr`.
    fn parse_discard_statement(&mut self) -> PResult<DiscardStmt> {
        let token = self.current_info();
        self.expect_peek(TokenKind::Assign)?;
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        Ok(DiscardStmt { token, value })
    }

    // ── Imports ────────────────────────────────────────────────────────

    /// Parse `import ident [as alias]` or `import "path" as alias`.
    fn parse_import_statement(&mut self) -> PResult<ImportStmt> {
        let token = self.current_info();

        let target = match self.peek().kind {
            TokenKind::Ident => {
                self.next_token();
                ImportTarget::Standard(self.identifier_here())
            }
            TokenKind::String => {
                self.next_token();
                let literal_token = self.current_info();
                match self.current().promote() {
                    Ok(value) => ImportTarget::User(StringLiteral {
                        token: literal_token,
                        value,
                    }),
                    Err(diagnostic) => return self.fail(diagnostic),
                }
            }
            _ => {
                let diagnostic =
                    Diagnostic::code(DiagCode::UnexpectedToken, self.peek().position());
                return self.fail(diagnostic);
            }
        };

        let alias = if self.peek_is(TokenKind::As) {
            self.next_token();
            self.expect_peek(TokenKind::Ident)?;
            Some(self.identifier_here())
        } else {
            None
        };

        // A user import cannot be referenced without a name.
        if matches!(target, ImportTarget::User(_)) && alias.is_none() {
            return self.fail_code(DiagCode::UserImportMissingAlias, &token);
        }

        Ok(ImportStmt { token, target, alias })
    }

    // ── Impl blocks ────────────────────────────────────────────────────

    /// Parse `impl Name[<generics>] { members }`.
    fn parse_impl_statement(&mut self) -> PResult<ImplStmt> {
        let token = self.current_info();
        self.expect_peek(TokenKind::Ident)?;
        let target = self.identifier_here();

        let generics = if self.peek_is(TokenKind::Lt) {
            self.next_token();
            self.parse_generic_list()?
        } else {
            Vec::new()
        };

        self.expect_peek(TokenKind::Lbrace)?;
        let block = self.parse_block()?;
        if block.statements.is_empty() {
            return self.fail_code(DiagCode::EmptyImplBlock, &token);
        }

        Ok(ImplStmt { token, target, generics, block })
    }
}
