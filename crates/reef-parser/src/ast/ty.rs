use crate::ast::{EnumExpr, Expr, Identifier, Parameter, StructExpr, TokenInfo};

/// A type annotation position: either the walrus form (infer from the
/// initializer) or an explicit type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub token: TokenInfo,
    pub kind: TypeExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    /// `name := value` -- the type comes from the initializer.
    Implicit,
    Explicit(ExplicitType),
}

/// An explicit type, optionally nullable (`?T`).
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitType {
    pub nullable: bool,
    pub form: ExplicitTypeForm,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExplicitTypeForm {
    /// A primitive keyword or a named (possibly generic) type.
    Named(NamedType),
    /// `fn[<generics>](params): return_type` without a body.
    Function(FunctionType),
    /// An inline struct type.
    Struct(StructExpr),
    /// An inline enum type.
    Enum(EnumExpr),
    /// `[dims]inner`.
    Array(ArrayType),
    /// `typeof expr` -- the type of another expression.
    Typeof(Box<Expr>),
}

/// A named type reference. The identifier's token kind is a primitive
/// keyword for `int`, `uint`, `size`, `float`, `byte`, `string`, `bool`,
/// and `void`.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    pub name: Identifier,
    pub generics: Vec<Identifier>,
}

impl NamedType {
    pub fn is_primitive(&self) -> bool {
        self.name.token.kind.is_primitive()
    }
}

/// A function type: the literal's signature without a body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub generics: Vec<Identifier>,
    pub params: Vec<Parameter>,
    pub return_type: Box<TypeExpr>,
}

/// The dimension clause of an array type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayDims {
    /// `[3uz]` or `[2uz, 4uz]` -- one length per dimension.
    Sizes(Vec<u64>),
    /// `[..]` / `[..=]` -- a range array.
    Range { inclusive: bool },
}

/// `[dims]inner` array type.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub dims: ArrayDims,
    pub inner: Box<TypeExpr>,
}

impl TypeExpr {
    pub fn implicit(token: TokenInfo) -> Self {
        Self { token, kind: TypeExprKind::Implicit }
    }

    pub fn is_implicit(&self) -> bool {
        matches!(self.kind, TypeExprKind::Implicit)
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self.kind, TypeExprKind::Explicit(ExplicitType { nullable: true, .. }))
    }

    pub fn is_typeof(&self) -> bool {
        matches!(
            self.kind,
            TypeExprKind::Explicit(ExplicitType { form: ExplicitTypeForm::Typeof(_), .. })
        )
    }

    /// The explicit payload, if this is not the walrus form.
    pub fn explicit(&self) -> Option<&ExplicitType> {
        match &self.kind {
            TypeExprKind::Explicit(e) => Some(e),
            TypeExprKind::Implicit => None,
        }
    }
}
