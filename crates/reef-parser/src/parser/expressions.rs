//! Pratt expression parsing: the prefix/infix handler sets and every
//! expression sub-parser.

use reef_common::diag::{DiagCode, Diagnostic};
use reef_common::token::{Base, TokenKind};

use crate::ast::*;
use crate::precedence::{precedence_of, Precedence};

use super::{PResult, Parser};

/// Whether an infix handler exists for a token kind.
///
/// Mirrors the infix side of the dispatch in [`Parser::parse_infix`]; the
/// Pratt loop breaks when the peek token has no handler.
fn has_infix(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Plus | Minus
            | Star
            | StarStar
            | Slash
            | Percent
            | Lt
            | LtEq
            | Gt
            | GtEq
            | Eq
            | NotEq
            | BooleanAnd
            | BooleanOr
            | And
            | Or
            | Xor
            | Shl
            | Shr
            | Is
            | In
            | DotDot
            | DotDotEq
            | Orelse
            | Lparen
            | Lbracket
            | ColonColon
            | Assign
            | PlusAssign
            | MinusAssign
            | StarAssign
            | SlashAssign
            | PercentAssign
            | AndAssign
            | OrAssign
            | XorAssign
            | ShlAssign
            | ShrAssign
            | NotAssign
    )
}

fn is_assignment_op(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Assign
            | PlusAssign
            | MinusAssign
            | StarAssign
            | SlashAssign
            | PercentAssign
            | AndAssign
            | OrAssign
            | XorAssign
            | ShlAssign
            | ShrAssign
            | NotAssign
    )
}

impl<'src> Parser<'src> {
    /// Parse an expression with the given left-binding precedence.
    ///
    /// The core Pratt loop: parse a prefix/atom, then fold infix
    /// operators while the peek token binds tighter than the caller.
    pub(crate) fn parse_expression(&mut self, precedence: Precedence) -> PResult<Expr> {
        let mut lhs = self.parse_prefix()?;

        while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            if !has_infix(self.peek().kind) {
                break;
            }
            self.next_token();
            lhs = self.parse_infix(lhs)?;
        }

        Ok(lhs)
    }

    // ── Prefix dispatch ────────────────────────────────────────────────

    fn parse_prefix(&mut self) -> PResult<Expr> {
        use TokenKind::*;
        match self.current().kind {
            Ident => Ok(Expr::Identifier(self.identifier_here())),
            kind if kind.is_integer() => self.parse_integer_literal(),
            Float => self.parse_float_literal(),
            Character => self.parse_byte_literal(),
            String | MultilineString => self.parse_string_literal(),
            True | False => Ok(Expr::Bool(BoolLiteral {
                token: self.current_info(),
                value: self.current_is(True),
            })),
            Nil => Ok(Expr::Nil(NilLiteral { token: self.current_info() })),
            Continue => Ok(Expr::Continue(ContinueLiteral { token: self.current_info() })),
            Bang | Not | Minus => self.parse_prefix_op(),
            Lparen => self.parse_grouped(),
            If => self.parse_if_expression(),
            Function => self.parse_function_literal(),
            Struct | Packed => Ok(Expr::Struct(self.parse_struct_expression()?)),
            Enum => Ok(Expr::Enum(self.parse_enum_expression()?)),
            Match => self.parse_match_expression(),
            Lbracket => self.parse_array_literal(),
            For => self.parse_for_expression(),
            While => self.parse_while_expression(),
            Do => self.parse_do_while_expression(),
            Loop => self.parse_loop_expression(),
            other => {
                let position = self.current().position();
                self.fail(Diagnostic::no_prefix_fn(other, position))
            }
        }
    }

    // ── Infix dispatch ─────────────────────────────────────────────────

    /// The current token is the operator; `lhs` is already parsed.
    fn parse_infix(&mut self, lhs: Expr) -> PResult<Expr> {
        match self.current().kind {
            TokenKind::Lparen => self.parse_call_expression(lhs),
            TokenKind::Lbracket => self.parse_index_expression(lhs),
            TokenKind::ColonColon => self.parse_namespace_expression(lhs),
            kind if is_assignment_op(kind) => self.parse_assignment_expression(lhs),
            _ => self.parse_infix_op(lhs),
        }
    }

    fn parse_infix_op(&mut self, lhs: Expr) -> PResult<Expr> {
        let token = self.current_info();
        let op = self.current().kind;
        if self.peek_is(TokenKind::End) {
            return self.fail_code(DiagCode::InfixMissingRhs, &token);
        }
        self.next_token();
        let rhs = self.parse_expression(precedence_of(op))?;
        Ok(Expr::Infix(InfixExpr {
            token,
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }))
    }

    fn parse_assignment_expression(&mut self, lhs: Expr) -> PResult<Expr> {
        let token = self.current_info();
        let op = self.current().kind;
        if self.peek_is(TokenKind::End) {
            return self.fail_code(DiagCode::InfixMissingRhs, &token);
        }
        self.next_token();
        let rhs = self.parse_expression(precedence_of(op))?;
        Ok(Expr::Assignment(AssignmentExpr {
            token,
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }))
    }

    // ── Literals ───────────────────────────────────────────────────────

    /// Convert the current integer token, honoring its base and suffix.
    ///
    /// Overflow and malformed digits are reported here -- the lexer only
    /// classifies; the value is never silently truncated.
    fn parse_integer_literal(&mut self) -> PResult<Expr> {
        let token = self.current_info();
        let tok = *self.current();
        let base = tok.kind.base().expect("dispatched on an integer kind");
        let suffix = tok.integer_suffix_len();
        let digits = &tok.text[base.prefix_len()..tok.text.len() - suffix];

        if tok.kind.is_signed_integer() {
            let value = convert_digits(digits, base, i64::MAX as u64, DiagCode::SignedIntegerOverflow);
            match value {
                Ok(v) => Ok(Expr::Int(IntLiteral { token, value: v as i64 })),
                Err(code) => self.fail_code(code, &token),
            }
        } else if tok.kind.is_unsigned_integer() {
            match convert_digits(digits, base, u64::MAX, DiagCode::UnsignedIntegerOverflow) {
                Ok(value) => Ok(Expr::Uint(UintLiteral { token, value })),
                Err(code) => self.fail_code(code, &token),
            }
        } else {
            match convert_digits(digits, base, u64::MAX, DiagCode::SizeOverflow) {
                Ok(value) => Ok(Expr::Size(SizeLiteral { token, value })),
                Err(code) => self.fail_code(code, &token),
            }
        }
    }

    fn parse_float_literal(&mut self) -> PResult<Expr> {
        let token = self.current_info();
        match self.current().text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Expr::Float(FloatLiteral { token, value })),
            Ok(_) => self.fail_code(DiagCode::FloatOverflow, &token),
            Err(_) => self.fail_code(DiagCode::MalformedFloatStr, &token),
        }
    }

    fn parse_byte_literal(&mut self) -> PResult<Expr> {
        let token = self.current_info();
        match self.current().promote_char() {
            Ok(value) => Ok(Expr::Byte(ByteLiteral { token, value })),
            Err(diagnostic) => self.fail(diagnostic),
        }
    }

    fn parse_string_literal(&mut self) -> PResult<Expr> {
        let token = self.current_info();
        match self.current().promote() {
            Ok(value) => Ok(Expr::Str(StringLiteral { token, value })),
            Err(diagnostic) => self.fail(diagnostic),
        }
    }

    // ── Operators and grouping ─────────────────────────────────────────

    fn parse_prefix_op(&mut self) -> PResult<Expr> {
        let token = self.current_info();
        let op = self.current().kind;
        if self.peek_is(TokenKind::End) {
            return self.fail_code(DiagCode::PrefixMissingOperand, &token);
        }
        self.next_token();
        let rhs = self.parse_expression(Precedence::Prefix)?;
        Ok(Expr::Prefix(PrefixExpr { token, op, rhs: Box::new(rhs) }))
    }

    fn parse_grouped(&mut self) -> PResult<Expr> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::Rparen)?;
        Ok(expr)
    }

    // ── Calls, indexing, scope resolution ──────────────────────────────

    fn parse_call_expression(&mut self, callee: Expr) -> PResult<Expr> {
        let token = self.current_info();
        let mut args = Vec::new();

        if self.peek_is(TokenKind::Rparen) {
            self.next_token();
        } else {
            loop {
                self.next_token();
                let is_ref = if self.current_is(TokenKind::Ref) {
                    self.next_token();
                    true
                } else {
                    false
                };
                let value = self.parse_expression(Precedence::Lowest)?;
                args.push(CallArg { is_ref, value });

                if self.peek_is(TokenKind::Comma) {
                    self.next_token();
                    continue;
                }
                self.expect_peek(TokenKind::Rparen)?;
                break;
            }
        }

        // Generic arguments are introduced by `with <...>`.
        let generics = if self.peek_is(TokenKind::With) {
            self.next_token();
            self.expect_peek(TokenKind::Lt)?;
            self.parse_generic_list()?
        } else {
            Vec::new()
        };

        Ok(Expr::Call(CallExpr {
            token,
            callee: Box::new(callee),
            args,
            generics,
        }))
    }

    fn parse_index_expression(&mut self, array: Expr) -> PResult<Expr> {
        let token = self.current_info();
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::Rbracket)?;
        Ok(Expr::Index(IndexExpr {
            token,
            array: Box::new(array),
            index: Box::new(index),
        }))
    }

    fn parse_namespace_expression(&mut self, outer: Expr) -> PResult<Expr> {
        let token = self.current_info();
        self.expect_peek(TokenKind::Ident)?;
        let inner = self.identifier_here();
        Ok(Expr::Namespace(NamespaceExpr {
            token,
            outer: Box::new(outer),
            inner,
        }))
    }

    // ── Generic argument lists ─────────────────────────────────────────

    /// Parse `T, B>` style elements; the current token is the `<`.
    ///
    /// Elements are identifiers or primitive keywords. An immediately
    /// closing `>` is an empty list, which is illegal.
    pub(crate) fn parse_generic_list(&mut self) -> PResult<Vec<Identifier>> {
        if self.peek_is(TokenKind::Gt) {
            let diagnostic = Diagnostic::code(DiagCode::EmptyGenericList, self.peek().position());
            self.next_token();
            return self.fail(diagnostic);
        }

        let mut generics = Vec::new();
        loop {
            self.next_token();
            if !self.current_is(TokenKind::Ident) && !self.current().kind.is_primitive() {
                let position = self.current().position();
                return self.fail(Diagnostic::code(DiagCode::IllegalIdentifier, position));
            }
            generics.push(self.identifier_here());

            if self.peek_is(TokenKind::Comma) {
                self.next_token();
                continue;
            }
            self.expect_peek(TokenKind::Gt)?;
            break;
        }
        Ok(generics)
    }

    // ── Conditionals ───────────────────────────────────────────────────

    fn parse_if_expression(&mut self) -> PResult<Expr> {
        let token = self.current_info();
        self.expect_peek(TokenKind::Lparen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::Rparen)?;

        self.next_token();
        let consequence = self.parse_branch_statement()?;

        let alternate = if self.peek_is(TokenKind::Else) {
            self.next_token();
            self.next_token();
            Some(Box::new(self.parse_branch_statement()?))
        } else {
            None
        };

        Ok(Expr::If(IfExpr {
            token,
            condition: Box::new(condition),
            consequence: Box::new(consequence),
            alternate,
        }))
    }

    // ── Functions ──────────────────────────────────────────────────────

    /// Parse a function literal. The shared signature parser handles the
    /// type form too; a literal additionally requires a block body and a
    /// suffix-closed default-parameter list.
    fn parse_function_literal(&mut self) -> PResult<Expr> {
        let token = self.current_info();
        let (generics, params, return_type) = self.parse_function_signature()?;
        self.expect_peek(TokenKind::Lbrace)?;
        let body = self.parse_block()?;

        // Once a parameter has a default, every later one must too.
        let mut seen_default = false;
        for param in &params {
            if param.default.is_some() {
                seen_default = true;
            } else if seen_default {
                return self.fail_code(DiagCode::MalformedFunctionLiteral, &token);
            }
        }

        Ok(Expr::Function(FunctionExpr {
            token,
            generics,
            params,
            return_type: Box::new(return_type),
            body,
        }))
    }

    /// Parse `fn[<generics>](params): return_type`, stopping before any
    /// body. The current token is `fn`.
    pub(crate) fn parse_function_signature(
        &mut self,
    ) -> PResult<(Vec<Identifier>, Vec<Parameter>, TypeExpr)> {
        debug_assert!(self.current_is(TokenKind::Function));

        let generics = if self.peek_is(TokenKind::Lt) {
            self.next_token();
            self.parse_generic_list()?
        } else {
            Vec::new()
        };

        self.expect_peek(TokenKind::Lparen)?;
        let params = self.parse_parameter_list()?;
        self.expect_peek(TokenKind::Colon)?;
        let anchor = self.current_info();

        if !self.peek_starts_type() {
            let diagnostic =
                Diagnostic::code(DiagCode::MalformedFunctionLiteral, self.peek().position());
            return self.fail(diagnostic);
        }
        self.next_token();
        let return_type = self.parse_explicit_type(&anchor)?;

        Ok((generics, params, return_type))
    }

    /// Parse the parenthesized parameter list; the current token is `(`
    /// and the list ends with the current token on `)`.
    fn parse_parameter_list(&mut self) -> PResult<Vec<Parameter>> {
        let mut params = Vec::new();

        if self.peek_is(TokenKind::Rparen) {
            self.next_token();
            return Ok(params);
        }

        loop {
            self.next_token();
            let is_ref = if self.current_is(TokenKind::Ref) {
                self.next_token();
                true
            } else {
                false
            };

            if !self.current_is(TokenKind::Ident) {
                let diagnostic = Diagnostic::expected_token(
                    TokenKind::Ident,
                    self.current().kind,
                    self.current().position(),
                );
                return self.fail(diagnostic);
            }
            let name = self.identifier_here();

            // Parameters must be explicitly typed.
            if self.peek_is(TokenKind::Walrus) {
                self.next_token();
                self.next_token();
                let position = self.current().position();
                return self.fail(Diagnostic::code(DiagCode::ImplicitFnParamType, position));
            }
            self.expect_peek(TokenKind::Colon)?;
            let anchor = self.current_info();
            self.next_token();
            let ty = self.parse_explicit_type(&anchor)?;

            let default = if self.peek_is(TokenKind::Assign) {
                self.next_token();
                self.next_token();
                Some(self.parse_expression(Precedence::Lowest)?)
            } else {
                None
            };

            params.push(Parameter { is_ref, name, ty, default });

            if self.peek_is(TokenKind::Rparen) {
                self.next_token();
                break;
            }
            self.expect_peek(TokenKind::Comma)?;
        }

        Ok(params)
    }

    // ── Struct and enum literals ───────────────────────────────────────

    /// Parse `[packed] struct[<generics>] { members }`. Every member is
    /// explicitly typed and followed by a comma, the last one included.
    pub(crate) fn parse_struct_expression(&mut self) -> PResult<StructExpr> {
        let token = self.current_info();
        let packed = if self.current_is(TokenKind::Packed) {
            self.expect_peek(TokenKind::Struct)?;
            true
        } else {
            false
        };

        let generics = if self.peek_is(TokenKind::Lt) {
            self.next_token();
            self.parse_generic_list()?
        } else {
            Vec::new()
        };

        self.expect_peek(TokenKind::Lbrace)?;
        if self.peek_is(TokenKind::Rbrace) {
            let diagnostic = Diagnostic::code(DiagCode::StructMissingMembers, token.position());
            self.next_token();
            return self.fail(diagnostic);
        }

        let mut members = Vec::new();
        loop {
            self.next_token();
            if !self.current_is(TokenKind::Ident) {
                let diagnostic = Diagnostic::expected_token(
                    TokenKind::Ident,
                    self.current().kind,
                    self.current().position(),
                );
                return self.fail(diagnostic);
            }
            let name = self.identifier_here();

            if self.peek_is(TokenKind::Walrus) {
                self.next_token();
                self.next_token();
                let position = self.current().position();
                return self.fail(Diagnostic::code(DiagCode::StructMemberNotExplicit, position));
            }
            self.expect_peek(TokenKind::Colon)?;
            let anchor = self.current_info();
            self.next_token();
            let ty = self.parse_explicit_type(&anchor)?;

            let default = if self.peek_is(TokenKind::Assign) {
                self.next_token();
                self.next_token();
                Some(self.parse_expression(Precedence::Lowest)?)
            } else {
                None
            };

            members.push(StructMember { name, ty, default });

            if self.peek_is(TokenKind::Comma) {
                self.next_token();
                if self.peek_is(TokenKind::Rbrace) {
                    self.next_token();
                    break;
                }
            } else {
                let diagnostic =
                    Diagnostic::code(DiagCode::MissingTrailingComma, self.peek().position());
                if self.peek_is(TokenKind::Rbrace) {
                    self.next_token();
                }
                return self.fail(diagnostic);
            }
        }

        Ok(StructExpr { token, packed, generics, members })
    }

    /// Parse `enum { variants }`. A comma is required after every
    /// variant, the last one included.
    pub(crate) fn parse_enum_expression(&mut self) -> PResult<EnumExpr> {
        let token = self.current_info();
        self.expect_peek(TokenKind::Lbrace)?;

        if self.peek_is(TokenKind::Rbrace) {
            let diagnostic = Diagnostic::code(DiagCode::EnumMissingVariants, token.position());
            self.next_token();
            return self.fail(diagnostic);
        }

        let mut variants = Vec::new();
        loop {
            self.next_token();
            if !self.current_is(TokenKind::Ident) {
                let diagnostic = Diagnostic::expected_token(
                    TokenKind::Ident,
                    self.current().kind,
                    self.current().position(),
                );
                return self.fail(diagnostic);
            }
            let name = self.identifier_here();

            let value = if self.peek_is(TokenKind::Assign) {
                self.next_token();
                self.next_token();
                Some(self.parse_expression(Precedence::Lowest)?)
            } else {
                None
            };

            if !self.peek_is(TokenKind::Comma) {
                self.diagnostics.push(Diagnostic::expected_token(
                    TokenKind::Comma,
                    self.peek().kind,
                    self.peek().position(),
                ));
                return self.fail(Diagnostic::code(
                    DiagCode::MissingTrailingComma,
                    name.token.position(),
                ));
            }
            self.next_token();
            variants.push(EnumVariant { name, value });

            if self.peek_is(TokenKind::Rbrace) {
                self.next_token();
                break;
            }
        }

        Ok(EnumExpr { token, variants })
    }

    // ── Match ──────────────────────────────────────────────────────────

    fn parse_match_expression(&mut self) -> PResult<Expr> {
        let token = self.current_info();
        self.next_token();
        let scrutinee = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::Lbrace)?;

        if self.peek_is(TokenKind::Rbrace) {
            let diagnostic = Diagnostic::code(DiagCode::ArmlessMatchExpr, token.position());
            self.next_token();
            return self.fail(diagnostic);
        }

        let mut arms = Vec::new();
        loop {
            self.next_token();
            let pattern = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenKind::FatArrow)?;

            self.next_token();
            if !self.dispatchable_arm_start() {
                let position = self.current().position();
                return self.fail(Diagnostic::code(DiagCode::IllegalMatchArm, position));
            }
            let dispatch = self.parse_dispatch_statement()?;
            arms.push(MatchArm { pattern, dispatch });

            self.expect_peek(TokenKind::Comma)?;
            if self.peek_is(TokenKind::Rbrace) {
                self.next_token();
                break;
            }
        }

        let catch_all = if self.peek_is(TokenKind::Else) {
            self.next_token();
            self.next_token();
            if !self.expression_catch_all_start() {
                let position = self.current().position();
                return self.fail(Diagnostic::code(DiagCode::IllegalMatchCatchAll, position));
            }
            let expr = self.parse_expression(Precedence::Lowest)?;
            Some(Box::new(Stmt::Expr(ExprStmt { expr })))
        } else {
            None
        };

        Ok(Expr::Match(MatchExpr {
            token,
            scrutinee: Box::new(scrutinee),
            arms,
            catch_all,
        }))
    }

    /// An arm dispatch may be an expression or a jump; nothing else.
    fn dispatchable_arm_start(&self) -> bool {
        use TokenKind::*;
        !(self.current().kind.is_decl_modifier()
            || matches!(self.current().kind, Type | Impl | Import | Lbrace | Underscore))
    }

    /// A catch-all body must be an expression statement.
    fn expression_catch_all_start(&self) -> bool {
        use TokenKind::*;
        !(self.current().kind.is_decl_modifier()
            || matches!(
                self.current().kind,
                Type | Impl | Import | Lbrace | Underscore | Return | Break
            ))
    }

    /// Parse an arm dispatch (jump or expression statement), consuming a
    /// trailing semicolon if present.
    fn parse_dispatch_statement(&mut self) -> PResult<Stmt> {
        let stmt = match self.current().kind {
            TokenKind::Return | TokenKind::Break | TokenKind::Continue => {
                Stmt::Jump(self.parse_jump_statement()?)
            }
            _ => Stmt::Expr(ExprStmt {
                expr: self.parse_expression(Precedence::Lowest)?,
            }),
        };
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Ok(stmt)
    }

    // ── Array literals ─────────────────────────────────────────────────

    fn parse_array_literal(&mut self) -> PResult<Expr> {
        let token = self.current_info();

        let explicit_size = if self.peek_is(TokenKind::Underscore) {
            self.next_token();
            None
        } else if self.peek_is(TokenKind::Rbracket) {
            let diagnostic =
                Diagnostic::code(DiagCode::MissingArraySizeToken, self.peek().position());
            self.next_token();
            return self.fail(diagnostic);
        } else {
            self.next_token();
            Some(self.parse_array_size_value(false)?)
        };

        self.expect_peek(TokenKind::Rbracket)?;
        self.expect_peek(TokenKind::Lbrace)?;

        // Items require a trailing comma, like enum variants.
        let mut items = Vec::new();
        while !self.peek_is(TokenKind::Rbrace) {
            self.next_token();
            items.push(self.parse_expression(Precedence::Lowest)?);
            self.expect_peek(TokenKind::Comma)?;
        }
        self.next_token();

        if items.is_empty() {
            return self.fail_code(DiagCode::EmptyArray, &token);
        }
        if let Some(size) = explicit_size {
            if size != items.len() as u64 {
                return self.fail_code(DiagCode::IncorrectExplicitArraySize, &token);
            }
        }

        Ok(Expr::Array(ArrayExpr {
            token,
            inferred_size: explicit_size.is_none(),
            items,
        }))
    }

    /// Validate and convert the current token as an array size.
    ///
    /// Only size-integer literals are accepted. In type position
    /// (`zero_is_empty`) a zero dimension is an empty array on the spot;
    /// literal position defers that to the item count.
    pub(crate) fn parse_array_size_value(&mut self, zero_is_empty: bool) -> PResult<u64> {
        let token = self.current_info();
        if !self.current().kind.is_size_integer() {
            return self.fail_code(DiagCode::UnexpectedArraySizeToken, &token);
        }

        let size = match self.parse_integer_literal()? {
            Expr::Size(lit) => lit.value,
            _ => unreachable!("size-integer kinds produce size literals"),
        };
        if zero_is_empty && size == 0 {
            return self.fail_code(DiagCode::EmptyArray, &token);
        }
        Ok(size)
    }

    // ── Loops ──────────────────────────────────────────────────────────

    fn parse_for_expression(&mut self) -> PResult<Expr> {
        let token = self.current_info();
        self.expect_peek(TokenKind::Lparen)?;

        if self.peek_is(TokenKind::Rparen) {
            self.next_token();
            return self.fail_code(DiagCode::ForMissingIterables, &token);
        }

        let mut iterables = Vec::new();
        loop {
            self.next_token();
            iterables.push(self.parse_expression(Precedence::Lowest)?);
            if self.peek_is(TokenKind::Comma) {
                self.next_token();
                continue;
            }
            self.expect_peek(TokenKind::Rparen)?;
            break;
        }

        let mut captures = Vec::new();
        let mut has_capture_clause = false;
        if self.peek_is(TokenKind::Colon) {
            has_capture_clause = true;
            self.next_token();
            self.expect_peek(TokenKind::Lparen)?;

            if self.peek_is(TokenKind::Rparen) {
                self.next_token();
            } else {
                loop {
                    self.next_token();
                    let is_ref = if self.current_is(TokenKind::Ref) {
                        self.next_token();
                        true
                    } else {
                        false
                    };
                    let value = if self.current_is(TokenKind::Underscore) {
                        Expr::Identifier(self.identifier_here())
                    } else {
                        self.parse_expression(Precedence::Lowest)?
                    };
                    captures.push(ForCapture { is_ref, value });

                    if self.peek_is(TokenKind::Comma) {
                        self.next_token();
                        continue;
                    }
                    self.expect_peek(TokenKind::Rparen)?;
                    break;
                }
            }
        }

        self.expect_peek(TokenKind::Lbrace)?;
        let block = self.parse_block()?;

        if has_capture_clause && captures.len() != iterables.len() {
            return self.fail_code(DiagCode::ForIterableCaptureMismatch, &token);
        }
        if block.statements.is_empty() {
            return self.fail_code(DiagCode::EmptyForLoop, &token);
        }

        let non_break = self.parse_non_break_clause()?;
        Ok(Expr::For(ForExpr {
            token,
            iterables,
            captures,
            block,
            non_break,
        }))
    }

    fn parse_while_expression(&mut self) -> PResult<Expr> {
        let token = self.current_info();
        self.expect_peek(TokenKind::Lparen)?;

        if self.peek_is(TokenKind::Rparen) {
            let diagnostic =
                Diagnostic::code(DiagCode::WhileMissingCondition, self.peek().position());
            self.next_token();
            return self.fail(diagnostic);
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::Rparen)?;

        let continuation = if self.peek_is(TokenKind::Colon) {
            self.next_token();
            self.expect_peek(TokenKind::Lparen)?;
            if self.peek_is(TokenKind::Rparen) {
                let diagnostic =
                    Diagnostic::code(DiagCode::ImproperWhileContinuation, self.peek().position());
                self.next_token();
                return self.fail(diagnostic);
            }
            self.next_token();
            let continuation = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenKind::Rparen)?;
            Some(Box::new(continuation))
        } else {
            None
        };

        self.expect_peek(TokenKind::Lbrace)?;
        let block = self.parse_block()?;
        if block.statements.is_empty() {
            return self.fail_code(DiagCode::EmptyWhileLoop, &token);
        }

        let non_break = self.parse_non_break_clause()?;
        Ok(Expr::While(WhileExpr {
            token,
            condition: Box::new(condition),
            continuation,
            block,
            non_break,
        }))
    }

    fn parse_do_while_expression(&mut self) -> PResult<Expr> {
        let token = self.current_info();
        self.expect_peek(TokenKind::Lbrace)?;
        let block = self.parse_block()?;
        if block.statements.is_empty() {
            return self.fail_code(DiagCode::EmptyWhileLoop, &token);
        }

        self.expect_peek(TokenKind::While)?;
        self.expect_peek(TokenKind::Lparen)?;
        if self.peek_is(TokenKind::Rparen) {
            let diagnostic =
                Diagnostic::code(DiagCode::WhileMissingCondition, self.peek().position());
            self.next_token();
            return self.fail(diagnostic);
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::Rparen)?;

        Ok(Expr::DoWhile(DoWhileExpr {
            token,
            block,
            condition: Box::new(condition),
        }))
    }

    fn parse_loop_expression(&mut self) -> PResult<Expr> {
        let token = self.current_info();
        self.expect_peek(TokenKind::Lbrace)?;
        let block = self.parse_block()?;
        if block.statements.is_empty() {
            return self.fail_code(DiagCode::EmptyLoop, &token);
        }
        Ok(Expr::Loop(LoopExpr { token, block }))
    }

    /// Parse an optional `else` non-break clause after a loop.
    ///
    /// The clause body is parsed first and then checked: declarations,
    /// type declarations, impls, and imports cannot be a non-break.
    fn parse_non_break_clause(&mut self) -> PResult<Option<Box<Stmt>>> {
        if !self.peek_is(TokenKind::Else) {
            return Ok(None);
        }
        self.next_token();
        self.next_token();
        let stmt = self.parse_branch_statement()?;

        if matches!(
            stmt,
            Stmt::Decl(_) | Stmt::TypeDecl(_) | Stmt::Impl(_) | Stmt::Import(_)
        ) {
            let position = stmt.token().position();
            return self.fail(Diagnostic::code(DiagCode::IllegalLoopNonBreak, position));
        }
        Ok(Some(Box::new(stmt)))
    }
}

/// Convert a digit run in the given base, rejecting foreign digits and
/// overflow without ever wrapping.
fn convert_digits(digits: &str, base: Base, max: u64, overflow: DiagCode) -> Result<u64, DiagCode> {
    if digits.is_empty() {
        return Err(DiagCode::MalformedIntegerStr);
    }

    let radix = base as u64;
    let mut result: u64 = 0;
    for c in digits.chars() {
        let digit = match c {
            '0'..='9' => c as u64 - '0' as u64,
            'a'..='f' => c as u64 - 'a' as u64 + 10,
            'A'..='F' => c as u64 - 'A' as u64 + 10,
            _ => return Err(DiagCode::MalformedIntegerStr),
        };
        if digit >= radix {
            return Err(DiagCode::MalformedIntegerStr);
        }
        if result > (max - digit) / radix {
            return Err(overflow);
        }
        result = result * radix + digit;
    }
    Ok(result)
}
