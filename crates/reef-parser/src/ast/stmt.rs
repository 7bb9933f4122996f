use reef_common::token::TokenKind;

use crate::ast::{Expr, Identifier, StringLiteral, TokenInfo, TypeExpr};

/// Any statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(BlockStmt),
    Decl(DeclStmt),
    TypeDecl(TypeDeclStmt),
    Jump(JumpStmt),
    Expr(ExprStmt),
    Discard(DiscardStmt),
    Import(ImportStmt),
    Impl(ImplStmt),
}

impl Stmt {
    /// The token this statement started at.
    pub fn token(&self) -> &TokenInfo {
        match self {
            Stmt::Block(s) => &s.token,
            Stmt::Decl(s) => &s.token,
            Stmt::TypeDecl(s) => &s.token,
            Stmt::Jump(s) => &s.token,
            Stmt::Expr(s) => s.expr.token(),
            Stmt::Discard(s) => &s.token,
            Stmt::Import(s) => &s.token,
            Stmt::Impl(s) => &s.token,
        }
    }
}

/// Declaration modifier bit-set.
///
/// Exactly one of `VARIABLE`/`CONSTANT`/`COMPTIME` must be set; `EXTERN`
/// excludes both `COMPTIME` and `EXPORT`; at most one of
/// `PRIVATE`/`EXTERN`/`EXPORT` may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const VARIABLE: Modifiers = Modifiers(1 << 0);
    pub const CONSTANT: Modifiers = Modifiers(1 << 1);
    pub const COMPTIME: Modifiers = Modifiers(1 << 2);
    pub const PRIVATE: Modifiers = Modifiers(1 << 3);
    pub const EXTERN: Modifiers = Modifiers(1 << 4);
    pub const EXPORT: Modifiers = Modifiers(1 << 5);
    pub const STATIC: Modifiers = Modifiers(1 << 6);

    pub fn empty() -> Modifiers {
        Modifiers(0)
    }

    pub fn contains(self, flag: Modifiers) -> bool {
        self.0 & flag.0 != 0
    }

    pub fn insert(&mut self, flag: Modifiers) {
        self.0 |= flag.0;
    }

    /// The modifier selected by a declaration keyword, if any.
    pub fn from_token(kind: TokenKind) -> Option<Modifiers> {
        Some(match kind {
            TokenKind::Var => Modifiers::VARIABLE,
            TokenKind::Const => Modifiers::CONSTANT,
            TokenKind::Comptime => Modifiers::COMPTIME,
            TokenKind::Private => Modifiers::PRIVATE,
            TokenKind::Extern => Modifiers::EXTERN,
            TokenKind::Export => Modifiers::EXPORT,
            TokenKind::Static => Modifiers::STATIC,
            _ => return None,
        })
    }

    /// Check all four well-formedness constraints at once.
    pub fn is_well_formed(self) -> bool {
        let mutability =
            self.0 & (Self::VARIABLE.0 | Self::CONSTANT.0 | Self::COMPTIME.0);
        let one_mutability = mutability.count_ones() == 1;

        // Comptime values cannot be resolved at link time.
        let comptime_extern =
            (self.0 & (Self::EXTERN.0 | Self::COMPTIME.0)).count_ones() <= 1;

        let one_abi = (self.0 & (Self::EXTERN.0 | Self::EXPORT.0)).count_ones() <= 1;

        let one_access =
            (self.0 & (Self::PRIVATE.0 | Self::EXTERN.0 | Self::EXPORT.0)).count_ones() <= 1;

        one_mutability && comptime_extern && one_abi && one_access
    }

    /// Whether the binding is immutable (`const` or `comptime`).
    pub fn is_const(self) -> bool {
        self.contains(Modifiers::CONSTANT) || self.contains(Modifiers::COMPTIME)
    }

    /// Render the modifier keywords in declaration order.
    pub fn spellings(self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.contains(Modifiers::PRIVATE) {
            out.push("private");
        }
        if self.contains(Modifiers::EXTERN) {
            out.push("extern");
        }
        if self.contains(Modifiers::EXPORT) {
            out.push("export");
        }
        if self.contains(Modifiers::STATIC) {
            out.push("static");
        }
        if self.contains(Modifiers::VARIABLE) {
            out.push("var");
        }
        if self.contains(Modifiers::CONSTANT) {
            out.push("const");
        }
        if self.contains(Modifiers::COMPTIME) {
            out.push("comptime");
        }
        out
    }
}

/// `{ statements }`.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub token: TokenInfo,
    pub statements: Vec<Stmt>,
}

/// `mods name[: type] [= value];` or `mods name := value;`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclStmt {
    pub token: TokenInfo,
    pub modifiers: Modifiers,
    pub name: Identifier,
    pub ty: TypeExpr,
    pub value: Option<Expr>,
}

/// The right-hand side of a `type` declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDeclValue {
    /// `type a = int` -- an alias of a primitive keyword.
    PrimitiveAlias(Identifier),
    /// Any other type expression.
    Type(TypeExpr),
}

/// `type Name = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclStmt {
    pub token: TokenInfo,
    pub name: Identifier,
    pub value: TypeDeclValue,
}

impl TypeDeclStmt {
    pub fn primitive_alias(&self) -> bool {
        matches!(self.value, TypeDeclValue::PrimitiveAlias(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Return,
    Break,
    Continue,
}

/// `return [v]`, `break [v]`, `continue`. A value is never attached to
/// `continue`.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpStmt {
    pub token: TokenInfo,
    pub kind: JumpKind,
    pub value: Option<Expr>,
}

/// An expression in statement position.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
}

/// `_ = expr;` -- explicitly discard a value.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscardStmt {
    pub token: TokenInfo,
    pub value: Expr,
}

/// The target of an import statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportTarget {
    /// `import std` -- a standard-library module.
    Standard(Identifier),
    /// `import "path" as alias` -- a user file. The alias is mandatory.
    User(StringLiteral),
}

/// `import target [as alias]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub token: TokenInfo,
    pub target: ImportTarget,
    pub alias: Option<Identifier>,
}

/// `impl Name[<generics>] { members }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImplStmt {
    pub token: TokenInfo,
    pub target: Identifier,
    pub generics: Vec<Identifier>,
    pub block: BlockStmt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_mapping() {
        assert_eq!(Modifiers::from_token(TokenKind::Var), Some(Modifiers::VARIABLE));
        assert_eq!(Modifiers::from_token(TokenKind::Static), Some(Modifiers::STATIC));
        assert_eq!(Modifiers::from_token(TokenKind::Ident), None);
    }

    #[test]
    fn exactly_one_mutability_flag() {
        let mut m = Modifiers::empty();
        assert!(!m.is_well_formed());
        m.insert(Modifiers::VARIABLE);
        assert!(m.is_well_formed());
        m.insert(Modifiers::CONSTANT);
        assert!(!m.is_well_formed());
    }

    #[test]
    fn comptime_cannot_be_extern() {
        let mut m = Modifiers::empty();
        m.insert(Modifiers::COMPTIME);
        m.insert(Modifiers::EXTERN);
        assert!(!m.is_well_formed());
    }

    #[test]
    fn one_abi_and_one_access_flag() {
        let mut m = Modifiers::empty();
        m.insert(Modifiers::VARIABLE);
        m.insert(Modifiers::EXTERN);
        assert!(m.is_well_formed());
        m.insert(Modifiers::EXPORT);
        assert!(!m.is_well_formed());

        let mut m = Modifiers::empty();
        m.insert(Modifiers::CONSTANT);
        m.insert(Modifiers::PRIVATE);
        assert!(m.is_well_formed());
        m.insert(Modifiers::EXTERN);
        assert!(!m.is_well_formed());
    }

    #[test]
    fn const_and_comptime_bindings_are_const() {
        let mut m = Modifiers::empty();
        m.insert(Modifiers::CONSTANT);
        assert!(m.is_const());

        let mut m = Modifiers::empty();
        m.insert(Modifiers::COMPTIME);
        assert!(m.is_const());

        let mut m = Modifiers::empty();
        m.insert(Modifiers::VARIABLE);
        assert!(!m.is_const());
    }
}
