//! Semantic type representation.
//!
//! A [`SemanticType`] is a tag plus three orthogonal flags: `is_const`
//! (binding immutability), `nullable` (admits `nil`), and `valued`
//! (an instance of the type rather than the type construct itself).
//! Enum, struct, array, and function payloads live behind `Rc` so
//! multiple symbol-table entries share one descriptor; a clone retains
//! the descriptor, and the last drop releases it.

use std::fmt;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

/// The tag domain of a semantic type.
#[derive(Debug, Clone)]
pub enum TypeKind {
    SignedInteger,
    UnsignedInteger,
    SizeInteger,
    ByteInteger,
    FloatingPoint,
    Str,
    Bool,
    Void,
    Nil,
    Enum(Rc<EnumType>),
    Struct(Rc<StructType>),
    Array(Rc<ArrayType>),
    Function(Rc<FunctionType>),
}

/// Shared enum descriptor.
#[derive(Debug, PartialEq)]
pub struct EnumType {
    pub type_name: String,
    pub variants: FxHashSet<String>,
}

/// Shared struct descriptor.
#[derive(Debug, PartialEq)]
pub struct StructType {
    pub type_name: String,
    pub generics: Vec<String>,
    pub members: FxHashMap<String, SemanticType>,
    pub methods: FxHashMap<String, SemanticType>,
}

/// The length shape of an array type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayLength {
    Single(u64),
    Multi(Vec<u64>),
    Range { inclusive: bool },
}

/// Shared array descriptor.
#[derive(Debug, PartialEq)]
pub struct ArrayType {
    pub inner: SemanticType,
    pub length: ArrayLength,
}

/// Shared function descriptor.
#[derive(Debug, PartialEq)]
pub struct FunctionType {
    pub params: Vec<SemanticType>,
    pub ret: SemanticType,
}

/// A semantic type: tag plus const/nullable/valued flags.
#[derive(Debug, Clone)]
pub struct SemanticType {
    pub kind: TypeKind,
    pub is_const: bool,
    pub nullable: bool,
    pub valued: bool,
}

impl SemanticType {
    /// A literal's type: valued, const, non-null.
    pub fn literal(kind: TypeKind) -> Self {
        Self {
            kind,
            is_const: true,
            nullable: false,
            valued: true,
        }
    }

    /// The `nil` literal's type: tag NIL, nullable.
    pub fn nil() -> Self {
        Self {
            kind: TypeKind::Nil,
            is_const: true,
            nullable: true,
            valued: true,
        }
    }

    /// A type construct: not a value, const, non-null.
    pub fn construct(kind: TypeKind) -> Self {
        Self {
            kind,
            is_const: true,
            nullable: false,
            valued: false,
        }
    }

    /// Whether the tag is one of the primitive tags (integers, float,
    /// byte, string, bool). `void` and `nil` are not primitive values.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::SignedInteger
                | TypeKind::UnsignedInteger
                | TypeKind::SizeInteger
                | TypeKind::FloatingPoint
                | TypeKind::ByteInteger
                | TypeKind::Str
                | TypeKind::Bool
        )
    }

    /// Non-null signed/unsigned/size integer.
    pub fn is_integer(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::SignedInteger | TypeKind::UnsignedInteger | TypeKind::SizeInteger
        ) && !self.nullable
    }

    /// Non-null integer or float.
    pub fn is_arithmetic(&self) -> bool {
        (matches!(self.kind, TypeKind::FloatingPoint) || self.is_integer()) && !self.nullable
    }

    /// Whether two types carry the same tag, ignoring descriptors.
    pub fn same_tag(&self, other: &SemanticType) -> bool {
        std::mem::discriminant(&self.kind) == std::mem::discriminant(&other.kind)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "?")?;
        }
        match &self.kind {
            TypeKind::SignedInteger => write!(f, "int"),
            TypeKind::UnsignedInteger => write!(f, "uint"),
            TypeKind::SizeInteger => write!(f, "size"),
            TypeKind::ByteInteger => write!(f, "byte"),
            TypeKind::FloatingPoint => write!(f, "float"),
            TypeKind::Str => write!(f, "string"),
            TypeKind::Bool => write!(f, "bool"),
            TypeKind::Void => write!(f, "void"),
            TypeKind::Nil => write!(f, "nil"),
            TypeKind::Enum(e) => write!(f, "enum {}", e.type_name),
            TypeKind::Struct(s) => write!(f, "struct {}", s.type_name),
            TypeKind::Array(a) => match &a.length {
                ArrayLength::Single(n) => write!(f, "[{n}uz]{}", a.inner),
                ArrayLength::Multi(dims) => {
                    let dims: Vec<String> = dims.iter().map(|d| format!("{d}uz")).collect();
                    write!(f, "[{}]{}", dims.join(", "), a.inner)
                }
                ArrayLength::Range { inclusive } => {
                    write!(f, "[{}]{}", if *inclusive { "..=" } else { ".." }, a.inner)
                }
            },
            TypeKind::Function(func) => {
                let params: Vec<String> = func.params.iter().map(|p| p.to_string()).collect();
                write!(f, "fn({}): {}", params.join(", "), func.ret)
            }
        }
    }
}

/// Structural type equality.
///
/// Tags must match and nullability must match, except that a `nil`
/// right-hand side only requires the left side to be nullable. Enum
/// descriptors compare by type name and exact variant set; arrays by
/// length shape and inner type; functions by signature.
pub fn type_equal(lhs: &SemanticType, rhs: &SemanticType) -> bool {
    if matches!(rhs.kind, TypeKind::Nil) {
        return matches!(lhs.kind, TypeKind::Nil) || lhs.nullable;
    }
    if !lhs.same_tag(rhs) {
        return false;
    }
    if lhs.nullable != rhs.nullable {
        return false;
    }

    match (&lhs.kind, &rhs.kind) {
        (TypeKind::Enum(a), TypeKind::Enum(b)) => {
            a.type_name == b.type_name && a.variants == b.variants
        }
        (TypeKind::Struct(a), TypeKind::Struct(b)) => {
            Rc::ptr_eq(a, b) || a.type_name == b.type_name
        }
        (TypeKind::Array(a), TypeKind::Array(b)) => {
            if !type_equal(&a.inner, &b.inner) {
                return false;
            }
            match (&a.length, &b.length) {
                (ArrayLength::Single(x), ArrayLength::Single(y)) => x == y,
                (ArrayLength::Multi(x), ArrayLength::Multi(y)) => x == y,
                (ArrayLength::Range { inclusive: x }, ArrayLength::Range { inclusive: y }) => {
                    x == y
                }
                _ => false,
            }
        }
        (TypeKind::Function(a), TypeKind::Function(b)) => {
            a.params.len() == b.params.len()
                && a.params.iter().zip(&b.params).all(|(x, y)| type_equal(x, y))
                && type_equal(&a.ret, &b.ret)
        }
        _ => true,
    }
}

/// Assignability of `rhs` into a binding of type `lhs`.
///
/// `nil` assigns to any nullable left side. A non-null right side widens
/// into a nullable left side; a nullable right side never narrows into a
/// non-null left side.
pub fn type_assignable(lhs: &SemanticType, rhs: &SemanticType) -> bool {
    if matches!(rhs.kind, TypeKind::Nil) {
        return lhs.nullable;
    }
    if lhs.nullable && !rhs.nullable {
        let mut widened = rhs.clone();
        widened.nullable = true;
        return type_equal(lhs, &widened);
    }
    if !lhs.nullable && rhs.nullable {
        return false;
    }
    type_equal(lhs, rhs)
}

/// `PartialEq` delegates to [`type_equal`] so derived comparisons on
/// containers behave like the analyzer's own equality.
impl PartialEq for SemanticType {
    fn eq(&self, other: &Self) -> bool {
        type_equal(self, other)
    }
}
