//! Explicit type expression parsing.
//!
//! Used from declarations (`name: T`), parameter and member lists,
//! function return positions, and the right-hand side of `type`
//! declarations. The walrus (implicit) form is handled by the callers
//! that admit it; this module only parses explicit types.

use reef_common::diag::{DiagCode, Diagnostic};
use reef_common::token::TokenKind;

use crate::ast::*;
use crate::precedence::Precedence;

use super::{PResult, Parser};

impl<'src> Parser<'src> {
    /// Whether the peek token can begin an explicit type.
    pub(crate) fn peek_starts_type(&self) -> bool {
        use TokenKind::*;
        self.peek().kind.is_primitive()
            || matches!(
                self.peek().kind,
                What | Ident | Function | Struct | Enum | Packed | Lbracket | Typeof
            )
    }

    /// Parse an explicit type starting at the current token.
    ///
    /// `anchor` is the token that introduced the type position (the
    /// annotation's colon); diagnostics that concern the whole annotation
    /// anchor there. On return the current token is the last token of the
    /// type. A `?` prefix marks the whole type nullable; array element
    /// nullability is spelled inside the brackets' inner type.
    pub(crate) fn parse_explicit_type(&mut self, anchor: &TokenInfo) -> PResult<TypeExpr> {
        let token = self.current_info();

        let nullable = if self.current_is(TokenKind::What) {
            self.next_token();
            true
        } else {
            false
        };

        let form = match self.current().kind {
            kind if kind == TokenKind::Ident || kind.is_primitive() => {
                let name = self.identifier_here();
                let generics = if self.peek_is(TokenKind::Lt) {
                    self.next_token();
                    self.parse_generic_list()?
                } else {
                    Vec::new()
                };
                ExplicitTypeForm::Named(NamedType { name, generics })
            }
            TokenKind::Function => {
                let (generics, params, return_type) = self.parse_function_signature()?;
                // A type has no call sites to fill defaults in.
                if params.iter().any(|p| p.default.is_some()) {
                    return self.fail_code(DiagCode::MalformedFunctionLiteral, anchor);
                }
                ExplicitTypeForm::Function(FunctionType {
                    generics,
                    params,
                    return_type: Box::new(return_type),
                })
            }
            TokenKind::Struct | TokenKind::Packed => {
                ExplicitTypeForm::Struct(self.parse_struct_expression()?)
            }
            TokenKind::Enum => ExplicitTypeForm::Enum(self.parse_enum_expression()?),
            TokenKind::Lbracket => ExplicitTypeForm::Array(self.parse_array_type(anchor)?),
            TokenKind::Typeof => {
                self.next_token();
                let referred = self.parse_expression(Precedence::Prefix)?;
                ExplicitTypeForm::Typeof(Box::new(referred))
            }
            other => {
                let position = self.current().position();
                return self.fail(Diagnostic::no_prefix_fn(other, position));
            }
        };

        Ok(TypeExpr {
            token,
            kind: TypeExprKind::Explicit(ExplicitType { nullable, form }),
        })
    }

    /// Parse `[dims]inner`; the current token is the opening bracket.
    ///
    /// Dimensions are size-integer literals (`[3uz]`, `[2uz, 4uz]`) or a
    /// single range operator (`[..]` / `[..=]`). Each explicit dimension
    /// must be non-zero.
    fn parse_array_type(&mut self, anchor: &TokenInfo) -> PResult<ArrayType> {
        let dims = if self.peek_is(TokenKind::DotDot) || self.peek_is(TokenKind::DotDotEq) {
            let inclusive = self.peek_is(TokenKind::DotDotEq);
            self.next_token();
            ArrayDims::Range { inclusive }
        } else if self.peek_is(TokenKind::Rbracket) {
            let diagnostic =
                Diagnostic::code(DiagCode::MissingArraySizeToken, self.peek().position());
            self.next_token();
            return self.fail(diagnostic);
        } else {
            let mut sizes = Vec::new();
            loop {
                self.next_token();
                sizes.push(self.parse_array_size_value(true)?);
                if self.peek_is(TokenKind::Comma) {
                    self.next_token();
                    continue;
                }
                break;
            }
            ArrayDims::Sizes(sizes)
        };

        self.expect_peek(TokenKind::Rbracket)?;
        self.next_token();
        let inner = self.parse_explicit_type(anchor)?;

        Ok(ArrayType { dims, inner: Box::new(inner) })
    }
}
