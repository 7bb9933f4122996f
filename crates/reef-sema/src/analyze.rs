//! The per-node analysis visitor.
//!
//! Statements are visited in source order against a scope stack; every
//! expression analysis returns `Option<SemanticType>` -- the type of the
//! expression, or `None` when a rule already reported a diagnostic or
//! the node kind has no analysis yet. Diagnostics accumulate in source
//! order on the analyzer.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use reef_common::diag::{DiagCode, Diagnostic};
use reef_common::span::Position;
use reef_common::token::TokenKind;
use reef_parser::ast::*;

use crate::context::ScopeStack;
use crate::ty::{
    type_assignable, ArrayLength, ArrayType, EnumType, FunctionType, SemanticType, StructType,
    TypeKind,
};

/// The semantic analyzer.
///
/// Holds the global scope stack so a REPL can keep feeding programs into
/// the same analyzer and retain earlier bindings.
pub struct Analyzer {
    scopes: ScopeStack,
    diagnostics: Vec<Diagnostic>,
    /// Name of the declaration currently being analyzed; consumed by
    /// enum/struct literals so their descriptors carry the binding name.
    current_type_name: Option<String>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            diagnostics: Vec::new(),
            current_type_name: None,
        }
    }

    /// Analyze a program, returning its diagnostics in source order.
    pub fn analyze(&mut self, program: &Program) -> Vec<Diagnostic> {
        for stmt in &program.statements {
            self.analyze_stmt(stmt);
            // A leftover declaration name must never leak across
            // statements.
            self.current_type_name = None;
        }
        std::mem::take(&mut self.diagnostics)
    }

    /// Resolve a name against the scope chain. Exposed for tests and the
    /// REPL's inspection commands.
    pub fn lookup(&self, name: &str) -> Option<&SemanticType> {
        self.scopes.lookup(name)
    }

    // ── Helpers ────────────────────────────────────────────────────────

    fn emit(&mut self, code: DiagCode, at: Position) {
        self.diagnostics.push(Diagnostic::code(code, at));
    }

    fn emit_none(&mut self, code: DiagCode, at: Position) -> Option<SemanticType> {
        self.emit(code, at);
        None
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn analyze_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => self.analyze_block(block),
            Stmt::Decl(decl) => self.analyze_decl(decl),
            Stmt::TypeDecl(td) => self.analyze_type_decl(td),
            Stmt::Jump(jump) => {
                if let Some(value) = &jump.value {
                    self.analyze_expr(value);
                }
            }
            Stmt::Expr(es) => {
                self.analyze_expr(&es.expr);
            }
            Stmt::Discard(discard) => {
                self.analyze_expr(&discard.value);
            }
            // Module resolution and impl attachment are not implemented
            // yet; neither emits diagnostics.
            Stmt::Import(_) | Stmt::Impl(_) => {}
        }
    }

    fn analyze_block(&mut self, block: &BlockStmt) {
        self.scopes.push_scope();
        for stmt in &block.statements {
            self.analyze_stmt(stmt);
        }
        self.scopes.pop_scope();
    }

    fn analyze_decl(&mut self, decl: &DeclStmt) {
        let at = decl.token.position();
        self.current_type_name = Some(decl.name.name.clone());

        let value_type = decl.value.as_ref().and_then(|value| self.analyze_expr(value));

        let binding = if decl.ty.is_implicit() {
            // The binding takes the initializer's type; only constness
            // comes from the declaration itself.
            value_type.map(|mut ty| {
                ty.is_const = decl.modifiers.is_const();
                ty
            })
        } else {
            match self.resolve_type(&decl.ty) {
                Some(resolved) => {
                    let mut binding = resolved;
                    binding.valued = true;
                    binding.is_const = decl.modifiers.is_const();
                    if let Some(value) = &value_type {
                        if !type_assignable(&binding, value) {
                            self.emit(DiagCode::TypeMismatch, at);
                        }
                    }
                    Some(binding)
                }
                None => None,
            }
        };
        self.current_type_name = None;

        if self.scopes.lookup_local(&decl.name.name).is_some() {
            self.emit(DiagCode::RedefinitionOfIdentifier, at);
            return;
        }
        if let Some(binding) = binding {
            self.scopes.insert(decl.name.name.clone(), binding);
        }
    }

    fn analyze_type_decl(&mut self, td: &TypeDeclStmt) {
        let at = td.token.position();
        self.current_type_name = Some(td.name.name.clone());

        let construct = match &td.value {
            TypeDeclValue::PrimitiveAlias(name) => primitive_kind(name.token.kind)
                .map(SemanticType::construct),
            TypeDeclValue::Type(ty) => self.resolve_type(ty).map(|mut resolved| {
                resolved.valued = false;
                resolved
            }),
        };
        self.current_type_name = None;

        if self.scopes.lookup_local(&td.name.name).is_some() {
            self.emit(DiagCode::RedefinitionOfIdentifier, at);
            return;
        }
        if let Some(construct) = construct {
            self.scopes.insert(td.name.name.clone(), construct);
        }
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn analyze_expr(&mut self, expr: &Expr) -> Option<SemanticType> {
        match expr {
            Expr::Identifier(n) => self.analyze_identifier(n),
            Expr::Int(_) => Some(SemanticType::literal(TypeKind::SignedInteger)),
            Expr::Uint(_) => Some(SemanticType::literal(TypeKind::UnsignedInteger)),
            Expr::Size(_) => Some(SemanticType::literal(TypeKind::SizeInteger)),
            Expr::Byte(_) => Some(SemanticType::literal(TypeKind::ByteInteger)),
            Expr::Float(_) => Some(SemanticType::literal(TypeKind::FloatingPoint)),
            Expr::Bool(_) => Some(SemanticType::literal(TypeKind::Bool)),
            Expr::Str(_) => Some(SemanticType::literal(TypeKind::Str)),
            Expr::Nil(_) => Some(SemanticType::nil()),
            Expr::Prefix(n) => self.analyze_prefix(n),
            Expr::Infix(n) => self.analyze_infix(n),
            Expr::Assignment(n) => self.analyze_assignment(n),
            Expr::Index(n) => self.analyze_index(n),
            Expr::Namespace(n) => self.analyze_namespace(n),
            Expr::Enum(n) => self.analyze_enum(n),
            Expr::Struct(n) => self.analyze_struct(n),
            // Loop control carries no value.
            Expr::Continue(_) => None,
            // Not yet implemented: these analyze to nothing and emit no
            // diagnostics.
            Expr::If(_)
            | Expr::Match(_)
            | Expr::For(_)
            | Expr::While(_)
            | Expr::DoWhile(_)
            | Expr::Loop(_)
            | Expr::Call(_)
            | Expr::Function(_)
            | Expr::Array(_) => None,
        }
    }

    fn analyze_identifier(&mut self, n: &Identifier) -> Option<SemanticType> {
        match self.scopes.lookup(&n.name) {
            Some(ty) => Some(ty.clone()),
            None => self.emit_none(DiagCode::UnknownIdentifier, n.token.position()),
        }
    }

    fn analyze_prefix(&mut self, n: &PrefixExpr) -> Option<SemanticType> {
        let operand = self.analyze_expr(&n.rhs)?;
        let at = n.token.position();

        match n.op {
            // `!` admits any primitive, and any nullable value (a nil
            // check); both produce bool.
            TokenKind::Bang => {
                if operand.valued && (operand.nullable || operand.is_primitive()) {
                    Some(SemanticType::literal(TypeKind::Bool))
                } else {
                    self.emit_none(DiagCode::IllegalPrefixOperand, at)
                }
            }
            TokenKind::Not => {
                if operand.valued && operand.is_integer() {
                    Some(SemanticType::literal(operand.kind.clone()))
                } else {
                    self.emit_none(DiagCode::IllegalPrefixOperand, at)
                }
            }
            TokenKind::Minus => {
                if operand.valued && operand.is_arithmetic() {
                    Some(SemanticType::literal(operand.kind.clone()))
                } else {
                    self.emit_none(DiagCode::IllegalPrefixOperand, at)
                }
            }
            _ => None,
        }
    }

    fn analyze_infix(&mut self, n: &InfixExpr) -> Option<SemanticType> {
        let lhs = self.analyze_expr(&n.lhs)?;
        let rhs = self.analyze_expr(&n.rhs)?;
        let at = n.token.position();

        match n.op {
            // `orelse` is the one infix whose left side must be nullable.
            TokenKind::Orelse => {
                if !lhs.valued || !lhs.nullable {
                    return self.emit_none(DiagCode::IllegalLhsInfixOperand, at);
                }
                if !rhs.valued || rhs.nullable {
                    return self.emit_none(DiagCode::IllegalRhsInfixOperand, at);
                }
                if !lhs.same_tag(&rhs) && !matches!(lhs.kind, TypeKind::Nil) {
                    return self.emit_none(DiagCode::TypeMismatch, at);
                }
                let mut result = rhs;
                result.nullable = false;
                Some(result)
            }
            // `is` compares against a value or a type construct.
            TokenKind::Is => {
                if !lhs.valued || lhs.nullable {
                    return self.emit_none(DiagCode::IllegalLhsInfixOperand, at);
                }
                Some(SemanticType::literal(TypeKind::Bool))
            }
            // `in` tests membership in a range or array value.
            TokenKind::In => {
                if !lhs.valued || lhs.nullable {
                    return self.emit_none(DiagCode::IllegalLhsInfixOperand, at);
                }
                if !rhs.valued || rhs.nullable || !matches!(rhs.kind, TypeKind::Array(_)) {
                    return self.emit_none(DiagCode::IllegalRhsInfixOperand, at);
                }
                Some(SemanticType::literal(TypeKind::Bool))
            }
            op => {
                // Every remaining infix takes two non-null values.
                if !lhs.valued || lhs.nullable {
                    return self.emit_none(DiagCode::IllegalLhsInfixOperand, at);
                }
                if !rhs.valued || rhs.nullable {
                    return self.emit_none(DiagCode::IllegalRhsInfixOperand, at);
                }
                self.infix_result(op, &lhs, &rhs, at)
            }
        }
    }

    /// Result type of an operator family applied to two gated operands.
    ///
    /// Shared between plain infix expressions and the read-modify-write
    /// side of compound assignment.
    fn infix_result(
        &mut self,
        op: TokenKind,
        lhs: &SemanticType,
        rhs: &SemanticType,
        at: Position,
    ) -> Option<SemanticType> {
        use TokenKind::*;
        match op {
            // Same integer tag, or float for plus/star.
            Plus | Star => {
                if lhs.is_integer() && rhs.is_integer() {
                    if lhs.same_tag(rhs) {
                        Some(SemanticType::literal(lhs.kind.clone()))
                    } else {
                        self.emit_none(DiagCode::TypeMismatch, at)
                    }
                } else if matches!(lhs.kind, TypeKind::FloatingPoint)
                    && matches!(rhs.kind, TypeKind::FloatingPoint)
                {
                    Some(SemanticType::literal(TypeKind::FloatingPoint))
                } else if !lhs.is_arithmetic() {
                    self.emit_none(DiagCode::IllegalLhsInfixOperand, at)
                } else {
                    self.emit_none(DiagCode::IllegalRhsInfixOperand, at)
                }
            }
            // Integers of the same tag only.
            Percent | And | Or | Xor | Shl | Shr => {
                if !lhs.is_integer() {
                    self.emit_none(DiagCode::IllegalLhsInfixOperand, at)
                } else if !rhs.is_integer() {
                    self.emit_none(DiagCode::IllegalRhsInfixOperand, at)
                } else if !lhs.same_tag(rhs) {
                    self.emit_none(DiagCode::TypeMismatch, at)
                } else {
                    Some(SemanticType::literal(lhs.kind.clone()))
                }
            }
            // Arithmetic fallback: any matching arithmetic tag.
            Minus | Slash | StarStar => {
                if !lhs.is_arithmetic() {
                    self.emit_none(DiagCode::IllegalLhsInfixOperand, at)
                } else if !rhs.is_arithmetic() {
                    self.emit_none(DiagCode::IllegalRhsInfixOperand, at)
                } else if !lhs.same_tag(rhs) {
                    self.emit_none(DiagCode::TypeMismatch, at)
                } else {
                    Some(SemanticType::literal(lhs.kind.clone()))
                }
            }
            // Comparisons yield bool over matching arithmetic operands.
            Lt | LtEq | Gt | GtEq | Eq | NotEq => {
                if !lhs.is_arithmetic() {
                    self.emit_none(DiagCode::IllegalLhsInfixOperand, at)
                } else if !rhs.is_arithmetic() {
                    self.emit_none(DiagCode::IllegalRhsInfixOperand, at)
                } else if !lhs.same_tag(rhs) {
                    self.emit_none(DiagCode::TypeMismatch, at)
                } else {
                    Some(SemanticType::literal(TypeKind::Bool))
                }
            }
            BooleanAnd | BooleanOr => {
                if !matches!(lhs.kind, TypeKind::Bool) {
                    self.emit_none(DiagCode::IllegalLhsInfixOperand, at)
                } else if !matches!(rhs.kind, TypeKind::Bool) {
                    self.emit_none(DiagCode::IllegalRhsInfixOperand, at)
                } else {
                    Some(SemanticType::literal(TypeKind::Bool))
                }
            }
            // Ranges are size-bounded and produce an array descriptor.
            DotDot | DotDotEq => {
                let size = |t: &SemanticType| matches!(t.kind, TypeKind::SizeInteger);
                if !size(lhs) {
                    self.emit_none(DiagCode::IllegalLhsInfixOperand, at)
                } else if !size(rhs) {
                    self.emit_none(DiagCode::IllegalRhsInfixOperand, at)
                } else {
                    let descriptor = ArrayType {
                        inner: SemanticType::literal(TypeKind::SizeInteger),
                        length: ArrayLength::Range {
                            inclusive: op == DotDotEq,
                        },
                    };
                    Some(SemanticType::literal(TypeKind::Array(Rc::new(descriptor))))
                }
            }
            _ => None,
        }
    }

    fn analyze_assignment(&mut self, n: &AssignmentExpr) -> Option<SemanticType> {
        let at = n.token.position();
        let lhs = self.analyze_expr(&n.lhs)?;
        if lhs.is_const {
            return self.emit_none(DiagCode::AssignmentToConstant, at);
        }
        let rhs = self.analyze_expr(&n.rhs)?;

        if n.op == TokenKind::Assign {
            if !type_assignable(&lhs, &rhs) {
                return self.emit_none(DiagCode::TypeMismatch, at);
            }
            // An assignment evaluates to its assigned value.
            return Some(rhs);
        }

        // Compound assignment reads and writes: both sides must be
        // non-null values before the operator family applies.
        if !lhs.valued {
            return self.emit_none(DiagCode::IllegalLhsInfixOperand, at);
        }
        if !rhs.valued {
            return self.emit_none(DiagCode::IllegalRhsInfixOperand, at);
        }
        if lhs.nullable {
            return self.emit_none(DiagCode::IllegalLhsInfixOperand, at);
        }
        if rhs.nullable {
            return self.emit_none(DiagCode::IllegalRhsInfixOperand, at);
        }

        use TokenKind::*;
        match n.op {
            // Bitwise-not assignment wants integers of one tag.
            NotAssign => {
                if !lhs.is_integer() {
                    self.emit_none(DiagCode::IllegalLhsInfixOperand, at)
                } else if !rhs.is_integer() {
                    self.emit_none(DiagCode::IllegalRhsInfixOperand, at)
                } else if !lhs.same_tag(&rhs) {
                    self.emit_none(DiagCode::TypeMismatch, at)
                } else {
                    Some(SemanticType::literal(rhs.kind.clone()))
                }
            }
            compound => {
                let base = match compound {
                    PlusAssign => Plus,
                    MinusAssign => Minus,
                    StarAssign => Star,
                    SlashAssign => Slash,
                    PercentAssign => Percent,
                    AndAssign => And,
                    OrAssign => Or,
                    XorAssign => Xor,
                    ShlAssign => Shl,
                    ShrAssign => Shr,
                    _ => return None,
                };
                self.infix_result(base, &lhs, &rhs, at)
            }
        }
    }

    fn analyze_index(&mut self, n: &IndexExpr) -> Option<SemanticType> {
        let at = n.token.position();
        let array = self.analyze_expr(&n.array)?;

        let TypeKind::Array(descriptor) = &array.kind else {
            return self.emit_none(DiagCode::NonArrayIndexTarget, at);
        };
        if array.nullable {
            return self.emit_none(DiagCode::NonArrayIndexTarget, at);
        }
        let descriptor = Rc::clone(descriptor);

        // Indices are strictly size-typed and non-null.
        let index = self.analyze_expr(&n.index)?;
        if !matches!(index.kind, TypeKind::SizeInteger) || index.nullable {
            return self.emit_none(
                DiagCode::UnexpectedArrayIndexType,
                n.index.token().position(),
            );
        }

        // The element inherits the array's constness, not its own.
        let mut result = descriptor.inner.clone();
        result.is_const = array.is_const;
        Some(result)
    }

    fn analyze_namespace(&mut self, n: &NamespaceExpr) -> Option<SemanticType> {
        let at = n.token.position();
        let outer = self.analyze_expr(&n.outer)?;

        match &outer.kind {
            TypeKind::Enum(descriptor) => {
                if !descriptor.variants.contains(&n.inner.name) {
                    return self.emit_none(DiagCode::UnknownEnumVariant, at);
                }
                Some(SemanticType {
                    kind: TypeKind::Enum(Rc::clone(descriptor)),
                    is_const: true,
                    nullable: false,
                    valued: true,
                })
            }
            _ => self.emit_none(DiagCode::IllegalOuterNamespace, at),
        }
    }

    /// Analyze an enum literal into a shared enum descriptor.
    ///
    /// Variant names may not shadow the current scope, repeat inside the
    /// enum, or mirror the enum's own binding name. Explicit values must
    /// be constant, non-null, valued signed integers.
    fn analyze_enum(&mut self, n: &EnumExpr) -> Option<SemanticType> {
        let at = n.token.position();
        let type_name = self.current_type_name.take().unwrap_or_default();

        let mut variants = FxHashSet::default();
        for variant in &n.variants {
            let name = &variant.name.name;
            if *name == type_name {
                return self.emit_none(DiagCode::NamespaceNameMirrorsMember, at);
            }
            if self.scopes.lookup_local(name).is_some() || variants.contains(name) {
                return self.emit_none(DiagCode::RedefinitionOfIdentifier, at);
            }

            if let Some(value) = &variant.value {
                let value_type = self.analyze_expr(value)?;
                let offense = if value_type.nullable {
                    Some(DiagCode::NullableEnumVariant)
                } else if !value_type.is_const {
                    Some(DiagCode::NonConstEnumVariant)
                } else if !matches!(value_type.kind, TypeKind::SignedInteger) {
                    Some(DiagCode::NonSignedEnumVariant)
                } else if !value_type.valued {
                    Some(DiagCode::NonValuedEnumVariant)
                } else {
                    None
                };
                if let Some(code) = offense {
                    return self.emit_none(code, at);
                }
            }

            variants.insert(name.clone());
        }

        Some(SemanticType::construct(TypeKind::Enum(Rc::new(EnumType {
            type_name,
            variants,
        }))))
    }

    /// Analyze a struct literal into a shared struct descriptor. Member
    /// types resolve against the current scope.
    fn analyze_struct(&mut self, n: &StructExpr) -> Option<SemanticType> {
        let type_name = self.current_type_name.take().unwrap_or_default();

        let mut members = FxHashMap::default();
        for member in &n.members {
            if let Some(ty) = self.resolve_type(&member.ty) {
                members.insert(member.name.name.clone(), ty);
            }
        }

        let generics = n.generics.iter().map(|g| g.name.clone()).collect();
        Some(SemanticType::construct(TypeKind::Struct(Rc::new(
            StructType {
                type_name,
                generics,
                members,
                methods: FxHashMap::default(),
            },
        ))))
    }

    // ── Type expression resolution ─────────────────────────────────────

    /// Resolve an explicit type expression to a semantic type.
    ///
    /// Implicit (walrus) annotations resolve to nothing -- the caller
    /// takes the initializer's type instead. Named non-primitive types
    /// resolve through the scope chain.
    fn resolve_type(&mut self, ty: &TypeExpr) -> Option<SemanticType> {
        let explicit = ty.explicit()?;

        let mut resolved = match &explicit.form {
            ExplicitTypeForm::Named(named) if named.is_primitive() => {
                SemanticType::construct(primitive_kind(named.name.token.kind)?)
            }
            ExplicitTypeForm::Named(named) => match self.scopes.lookup(&named.name.name) {
                Some(found) => found.clone(),
                None => {
                    return self
                        .emit_none(DiagCode::UnknownIdentifier, named.name.token.position())
                }
            },
            ExplicitTypeForm::Enum(e) => self.analyze_enum(e)?,
            ExplicitTypeForm::Struct(s) => self.analyze_struct(s)?,
            ExplicitTypeForm::Function(f) => {
                let mut params = Vec::with_capacity(f.params.len());
                for param in &f.params {
                    params.push(self.resolve_type(&param.ty)?);
                }
                let ret = self.resolve_type(&f.return_type)?;
                SemanticType::construct(TypeKind::Function(Rc::new(FunctionType {
                    params,
                    ret,
                })))
            }
            ExplicitTypeForm::Array(array) => {
                let inner = self.resolve_type(&array.inner)?;
                let length = match &array.dims {
                    ArrayDims::Sizes(sizes) if sizes.len() == 1 => ArrayLength::Single(sizes[0]),
                    ArrayDims::Sizes(sizes) => ArrayLength::Multi(sizes.clone()),
                    ArrayDims::Range { inclusive } => ArrayLength::Range {
                        inclusive: *inclusive,
                    },
                };
                SemanticType::construct(TypeKind::Array(Rc::new(ArrayType { inner, length })))
            }
            ExplicitTypeForm::Typeof(referred) => {
                let mut introspected = self.analyze_expr(referred)?;
                introspected.valued = false;
                introspected
            }
        };

        resolved.nullable = resolved.nullable || explicit.nullable;
        Some(resolved)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a primitive keyword to its semantic tag.
fn primitive_kind(kind: TokenKind) -> Option<TypeKind> {
    Some(match kind {
        TokenKind::IntType => TypeKind::SignedInteger,
        TokenKind::UintType => TypeKind::UnsignedInteger,
        TokenKind::SizeType => TypeKind::SizeInteger,
        TokenKind::FloatType => TypeKind::FloatingPoint,
        TokenKind::ByteType => TypeKind::ByteInteger,
        TokenKind::StringType => TypeKind::Str,
        TokenKind::BoolType => TypeKind::Bool,
        TokenKind::VoidType => TypeKind::Void,
        _ => return None,
    })
}
