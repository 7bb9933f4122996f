use std::fmt;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use serde::Serialize;

use crate::span::Position;
use crate::token::TokenKind;

/// The closed diagnostic taxonomy.
///
/// Covers the lexical/literal, syntactic, and semantic families. Rendered
/// names are the SCREAMING_SNAKE forms that appear verbatim in diagnostic
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagCode {
    // ── Lexical / literal ──────────────────────────────────────────────
    MalformedIntegerStr,
    MalformedFloatStr,
    MalformedCharacterLiteral,
    SignedIntegerOverflow,
    UnsignedIntegerOverflow,
    SizeOverflow,
    FloatOverflow,
    NonStringToken,
    UnexpectedChar,

    // ── Syntactic ──────────────────────────────────────────────────────
    UnexpectedToken,
    MissingTrailingComma,
    InfixMissingRhs,
    PrefixMissingOperand,
    EmptyGenericList,
    IllegalIdentifier,
    EmptyStruct,
    StructMissingMembers,
    StructMemberNotExplicit,
    EnumMissingVariants,
    MissingArraySizeToken,
    UnexpectedArraySizeToken,
    IncorrectExplicitArraySize,
    EmptyArray,
    EmptyForLoop,
    EmptyWhileLoop,
    EmptyLoop,
    ForIterableCaptureMismatch,
    ForMissingIterables,
    WhileMissingCondition,
    ImproperWhileContinuation,
    IllegalLoopNonBreak,
    ArmlessMatchExpr,
    IllegalMatchArm,
    IllegalMatchCatchAll,
    UserImportMissingAlias,
    EmptyImplBlock,
    MalformedTypeDecl,
    IllegalDeclConstruct,
    IllegalDeclModifiers,
    RedundantTypeIntrospection,
    ImplicitFnParamType,
    MalformedFunctionLiteral,
    MissingWithClause,

    // ── Semantic ───────────────────────────────────────────────────────
    TypeMismatch,
    IllegalPrefixOperand,
    IllegalLhsInfixOperand,
    IllegalRhsInfixOperand,
    AssignmentToConstant,
    NonArrayIndexTarget,
    UnexpectedArrayIndexType,
    UnknownIdentifier,
    RedefinitionOfIdentifier,
    IllegalOuterNamespace,
    UnknownEnumVariant,
    NullableEnumVariant,
    NonConstEnumVariant,
    NonSignedEnumVariant,
    NonValuedEnumVariant,
    NamespaceNameMirrorsMember,
    NotImplemented,
}

impl DiagCode {
    /// The category tag rendered into diagnostic strings.
    pub fn name(self) -> &'static str {
        use DiagCode::*;
        match self {
            MalformedIntegerStr => "MALFORMED_INTEGER_STR",
            MalformedFloatStr => "MALFORMED_FLOAT_STR",
            MalformedCharacterLiteral => "MALFORMED_CHARACTER_LITERAL",
            SignedIntegerOverflow => "SIGNED_INTEGER_OVERFLOW",
            UnsignedIntegerOverflow => "UNSIGNED_INTEGER_OVERFLOW",
            SizeOverflow => "SIZE_OVERFLOW",
            FloatOverflow => "FLOAT_OVERFLOW",
            NonStringToken => "NON_STRING_TOKEN",
            UnexpectedChar => "UNEXPECTED_CHAR",
            UnexpectedToken => "UNEXPECTED_TOKEN",
            MissingTrailingComma => "MISSING_TRAILING_COMMA",
            InfixMissingRhs => "INFIX_MISSING_RHS",
            PrefixMissingOperand => "PREFIX_MISSING_OPERAND",
            EmptyGenericList => "EMPTY_GENERIC_LIST",
            IllegalIdentifier => "ILLEGAL_IDENTIFIER",
            EmptyStruct => "EMPTY_STRUCT",
            StructMissingMembers => "STRUCT_MISSING_MEMBERS",
            StructMemberNotExplicit => "STRUCT_MEMBER_NOT_EXPLICIT",
            EnumMissingVariants => "ENUM_MISSING_VARIANTS",
            MissingArraySizeToken => "MISSING_ARRAY_SIZE_TOKEN",
            UnexpectedArraySizeToken => "UNEXPECTED_ARRAY_SIZE_TOKEN",
            IncorrectExplicitArraySize => "INCORRECT_EXPLICIT_ARRAY_SIZE",
            EmptyArray => "EMPTY_ARRAY",
            EmptyForLoop => "EMPTY_FOR_LOOP",
            EmptyWhileLoop => "EMPTY_WHILE_LOOP",
            EmptyLoop => "EMPTY_LOOP",
            ForIterableCaptureMismatch => "FOR_ITERABLE_CAPTURE_MISMATCH",
            ForMissingIterables => "FOR_MISSING_ITERABLES",
            WhileMissingCondition => "WHILE_MISSING_CONDITION",
            ImproperWhileContinuation => "IMPROPER_WHILE_CONTINUATION",
            IllegalLoopNonBreak => "ILLEGAL_LOOP_NON_BREAK",
            ArmlessMatchExpr => "ARMLESS_MATCH_EXPR",
            IllegalMatchArm => "ILLEGAL_MATCH_ARM",
            IllegalMatchCatchAll => "ILLEGAL_MATCH_CATCH_ALL",
            UserImportMissingAlias => "USER_IMPORT_MISSING_ALIAS",
            EmptyImplBlock => "EMPTY_IMPL_BLOCK",
            MalformedTypeDecl => "MALFORMED_TYPE_DECL",
            IllegalDeclConstruct => "ILLEGAL_DECL_CONSTRUCT",
            IllegalDeclModifiers => "ILLEGAL_DECL_MODIFIERS",
            RedundantTypeIntrospection => "REDUNDANT_TYPE_INTROSPECTION",
            ImplicitFnParamType => "IMPLICIT_FN_PARAM_TYPE",
            MalformedFunctionLiteral => "MALFORMED_FUNCTION_LITERAL",
            MissingWithClause => "MISSING_WITH_CLAUSE",
            TypeMismatch => "TYPE_MISMATCH",
            IllegalPrefixOperand => "ILLEGAL_PREFIX_OPERAND",
            IllegalLhsInfixOperand => "ILLEGAL_LHS_INFIX_OPERAND",
            IllegalRhsInfixOperand => "ILLEGAL_RHS_INFIX_OPERAND",
            AssignmentToConstant => "ASSIGNMENT_TO_CONSTANT",
            NonArrayIndexTarget => "NON_ARRAY_INDEX_TARGET",
            UnexpectedArrayIndexType => "UNEXPECTED_ARRAY_INDEX_TYPE",
            UnknownIdentifier => "UNKNOWN_IDENTIFIER",
            RedefinitionOfIdentifier => "REDEFINITION_OF_IDENTIFIER",
            IllegalOuterNamespace => "ILLEGAL_OUTER_NAMESPACE",
            UnknownEnumVariant => "UNKNOWN_ENUM_VARIANT",
            NullableEnumVariant => "NULLABLE_ENUM_VARIANT",
            NonConstEnumVariant => "NON_CONST_ENUM_VARIANT",
            NonSignedEnumVariant => "NON_SIGNED_ENUM_VARIANT",
            NonValuedEnumVariant => "NON_VALUED_ENUM_VARIANT",
            NamespaceNameMirrorsMember => "NAMESPACE_NAME_MIRRORS_MEMBER",
            NotImplemented => "NOT_IMPLEMENTED",
        }
    }
}

/// The message shape of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagKind {
    /// A bare category tag, e.g. `TYPE_MISMATCH`.
    Code(DiagCode),
    /// `Expected token X, found Y`.
    ExpectedToken { expected: TokenKind, found: TokenKind },
    /// `No prefix parse function for X found`.
    NoPrefixFn { found: TokenKind },
}

/// A positioned diagnostic.
///
/// Diagnostics are collected in source order by each pipeline stage and
/// rendered with a 1-based `[Ln L, Col C]` suffix derived from the
/// offending token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagKind,
    pub position: Position,
}

impl Diagnostic {
    pub fn new(kind: DiagKind, position: Position) -> Self {
        Self { kind, position }
    }

    /// A category-tag diagnostic.
    pub fn code(code: DiagCode, position: Position) -> Self {
        Self::new(DiagKind::Code(code), position)
    }

    /// An `Expected token X, found Y` diagnostic.
    pub fn expected_token(expected: TokenKind, found: TokenKind, position: Position) -> Self {
        Self::new(DiagKind::ExpectedToken { expected, found }, position)
    }

    /// A missing-prefix-handler diagnostic.
    pub fn no_prefix_fn(found: TokenKind, position: Position) -> Self {
        Self::new(DiagKind::NoPrefixFn { found }, position)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagKind::Code(code) => write!(f, "{} {}", code.name(), self.position),
            DiagKind::ExpectedToken { expected, found } => write!(
                f,
                "Expected token {}, found {} {}",
                expected.name(),
                found.name(),
                self.position
            ),
            DiagKind::NoPrefixFn { found } => write!(
                f,
                "No prefix parse function for {} found {}",
                found.name(),
                self.position
            ),
        }
    }
}

impl std::error::Error for Diagnostic {}

/// Byte offset of a 1-based (line, column) pair in `source`.
fn byte_offset(source: &str, position: Position) -> usize {
    let mut line = 1u32;
    let mut start = 0usize;
    if position.line > 1 {
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line += 1;
                if line == position.line {
                    start = i + 1;
                    break;
                }
            }
        }
    }
    (start + position.column as usize - 1).min(source.len())
}

/// Render a diagnostic as a labeled ariadne report.
///
/// Output is colorless so it is stable across terminals and tests. The
/// label spans a single byte at the diagnostic position; the message is
/// the same string `Display` produces.
pub fn render(diagnostic: &Diagnostic, source: &str) -> String {
    let config = Config::default().with_color(false);
    let offset = byte_offset(source, diagnostic.position);
    let end = (offset + 1).min(source.len().max(1));
    let span = offset.min(end.saturating_sub(1))..end;

    let report = Report::build(ReportKind::Error, span.clone())
        .with_message(diagnostic.to_string())
        .with_config(config)
        .with_label(
            Label::new(span)
                .with_message("here")
                .with_color(Color::Red),
        )
        .finish();

    let mut buf = Vec::new();
    let cache = Source::from(source);
    report
        .write(cache, &mut buf)
        .expect("diagnostic rendering must not fail");
    String::from_utf8(buf).expect("diagnostic output is valid UTF-8")
}
