use reef_common::token::TokenKind;

use crate::ast::{BlockStmt, Stmt, TokenInfo, TypeExpr};

/// Any expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(Identifier),
    Int(IntLiteral),
    Uint(UintLiteral),
    Size(SizeLiteral),
    Byte(ByteLiteral),
    Float(FloatLiteral),
    Bool(BoolLiteral),
    Str(StringLiteral),
    Nil(NilLiteral),
    Continue(ContinueLiteral),
    Prefix(PrefixExpr),
    Infix(InfixExpr),
    Assignment(AssignmentExpr),
    Call(CallExpr),
    Index(IndexExpr),
    Namespace(NamespaceExpr),
    If(IfExpr),
    Match(MatchExpr),
    For(ForExpr),
    While(WhileExpr),
    DoWhile(DoWhileExpr),
    Loop(LoopExpr),
    Function(FunctionExpr),
    Struct(StructExpr),
    Enum(EnumExpr),
    Array(ArrayExpr),
}

impl Expr {
    /// The token this expression started at.
    pub fn token(&self) -> &TokenInfo {
        match self {
            Expr::Identifier(n) => &n.token,
            Expr::Int(n) => &n.token,
            Expr::Uint(n) => &n.token,
            Expr::Size(n) => &n.token,
            Expr::Byte(n) => &n.token,
            Expr::Float(n) => &n.token,
            Expr::Bool(n) => &n.token,
            Expr::Str(n) => &n.token,
            Expr::Nil(n) => &n.token,
            Expr::Continue(n) => &n.token,
            Expr::Prefix(n) => &n.token,
            Expr::Infix(n) => &n.token,
            Expr::Assignment(n) => &n.token,
            Expr::Call(n) => &n.token,
            Expr::Index(n) => &n.token,
            Expr::Namespace(n) => &n.token,
            Expr::If(n) => &n.token,
            Expr::Match(n) => &n.token,
            Expr::For(n) => &n.token,
            Expr::While(n) => &n.token,
            Expr::DoWhile(n) => &n.token,
            Expr::Loop(n) => &n.token,
            Expr::Function(n) => &n.token,
            Expr::Struct(n) => &n.token,
            Expr::Enum(n) => &n.token,
            Expr::Array(n) => &n.token,
        }
    }
}

/// A name reference. Generic argument lists also store their elements as
/// identifiers, where the token kind may be a primitive type keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: TokenInfo,
    pub name: String,
}

/// Signed integer literal (`5`, `0b101`, `0o17`, `0xFF`).
#[derive(Debug, Clone, PartialEq)]
pub struct IntLiteral {
    pub token: TokenInfo,
    pub value: i64,
}

/// Unsigned integer literal (`5u`).
#[derive(Debug, Clone, PartialEq)]
pub struct UintLiteral {
    pub token: TokenInfo,
    pub value: u64,
}

/// Size integer literal (`5uz`, `5z`).
#[derive(Debug, Clone, PartialEq)]
pub struct SizeLiteral {
    pub token: TokenInfo,
    pub value: u64,
}

/// Byte literal from a character token (`'a'`, `'\0'`).
#[derive(Debug, Clone, PartialEq)]
pub struct ByteLiteral {
    pub token: TokenInfo,
    pub value: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    pub token: TokenInfo,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoolLiteral {
    pub token: TokenInfo,
    pub value: bool,
}

/// String literal carrying its promoted (quote-stripped) value.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub token: TokenInfo,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NilLiteral {
    pub token: TokenInfo,
}

/// `continue` in expression position (loop control).
#[derive(Debug, Clone, PartialEq)]
pub struct ContinueLiteral {
    pub token: TokenInfo,
}

/// `!x`, `~x`, `-x`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpr {
    pub token: TokenInfo,
    pub op: TokenKind,
    pub rhs: Box<Expr>,
}

/// A binary operator application. The operator is identified by its token
/// kind; assignment operators get their own node.
#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpr {
    pub token: TokenInfo,
    pub op: TokenKind,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

/// `lhs = rhs` and every compound-assignment variant.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpr {
    pub token: TokenInfo,
    pub op: TokenKind,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

/// One call argument, optionally passed by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct CallArg {
    pub is_ref: bool,
    pub value: Expr,
}

/// `callee(args...) [with <generics>]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub token: TokenInfo,
    pub callee: Box<Expr>,
    pub args: Vec<CallArg>,
    pub generics: Vec<Identifier>,
}

/// `array[index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub token: TokenInfo,
    pub array: Box<Expr>,
    pub index: Box<Expr>,
}

/// `Outer::inner` scope resolution. The inner side is always a plain
/// identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceExpr {
    pub token: TokenInfo,
    pub outer: Box<Expr>,
    pub inner: Identifier,
}

/// `if (cond) consequence [else alternate]`. Branches are statements so a
/// block, a jump, or a bare expression all work.
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub token: TokenInfo,
    pub condition: Box<Expr>,
    pub consequence: Box<Stmt>,
    pub alternate: Option<Box<Stmt>>,
}

/// One `pattern => dispatch` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Expr,
    pub dispatch: Stmt,
}

/// `match scrutinee { arms } [else catch_all]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpr {
    pub token: TokenInfo,
    pub scrutinee: Box<Expr>,
    pub arms: Vec<MatchArm>,
    pub catch_all: Option<Box<Stmt>>,
}

/// One for-loop capture, optionally by reference. `_` discards.
#[derive(Debug, Clone, PartialEq)]
pub struct ForCapture {
    pub is_ref: bool,
    pub value: Expr,
}

/// `for (iterables) [: (captures)] block [else non_break]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForExpr {
    pub token: TokenInfo,
    pub iterables: Vec<Expr>,
    pub captures: Vec<ForCapture>,
    pub block: BlockStmt,
    pub non_break: Option<Box<Stmt>>,
}

/// `while (cond) [: (continuation)] block [else non_break]`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileExpr {
    pub token: TokenInfo,
    pub condition: Box<Expr>,
    pub continuation: Option<Box<Expr>>,
    pub block: BlockStmt,
    pub non_break: Option<Box<Stmt>>,
}

/// `do block while (cond)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileExpr {
    pub token: TokenInfo,
    pub block: BlockStmt,
    pub condition: Box<Expr>,
}

/// `loop block` -- infinite.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopExpr {
    pub token: TokenInfo,
    pub block: BlockStmt,
}

/// One function parameter: `[ref] name: type [= default]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub is_ref: bool,
    pub name: Identifier,
    pub ty: TypeExpr,
    pub default: Option<Expr>,
}

/// `fn[<generics>](params): return_type { body }`.
///
/// A function *type* shares the signature shape without a body; see
/// [`crate::ast::FunctionType`].
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpr {
    pub token: TokenInfo,
    pub generics: Vec<Identifier>,
    pub params: Vec<Parameter>,
    pub return_type: Box<TypeExpr>,
    pub body: BlockStmt,
}

/// One struct member: `name: type [= default]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructMember {
    pub name: Identifier,
    pub ty: TypeExpr,
    pub default: Option<Expr>,
}

/// `[packed] struct[<generics>] { members }`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructExpr {
    pub token: TokenInfo,
    pub packed: bool,
    pub generics: Vec<Identifier>,
    pub members: Vec<StructMember>,
}

/// One enum variant with an optional explicit value expression.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    pub name: Identifier,
    pub value: Option<Expr>,
}

/// `enum { variants }`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumExpr {
    pub token: TokenInfo,
    pub variants: Vec<EnumVariant>,
}

/// `[size]{ items }` array literal. When `inferred_size` is set the size
/// position held `_`; otherwise the explicit size already matched the
/// item count at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    pub token: TokenInfo,
    pub inferred_size: bool,
    pub items: Vec<Expr>,
}
