//! Textual AST reconstruction.
//!
//! Renders a parsed [`Program`] back to source text using each token
//! kind's canonical spelling. The output is normalized (single spaces,
//! mandatory trailing commas, `; `-separated statements) so a second
//! parse reproduces the same tree structurally. With
//! `group_expressions` set, prefix, infix, and assignment expressions are
//! fully parenthesized -- the operator-precedence tests read their
//! associativity off that form.

use crate::ast::*;

/// AST-to-source renderer.
#[derive(Debug, Default)]
pub struct Reconstructor {
    /// Parenthesize prefix/infix/assignment expressions.
    pub group_expressions: bool,
}

impl Reconstructor {
    pub fn new(group_expressions: bool) -> Self {
        Self { group_expressions }
    }

    /// Render a whole program. Statements are joined with `; `.
    pub fn program(&self, program: &Program) -> String {
        let rendered: Vec<String> = program.statements.iter().map(|s| self.stmt(s)).collect();
        rendered.join("; ")
    }

    // ── Statements ─────────────────────────────────────────────────────

    pub fn stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Block(block) => self.block(block),
            Stmt::Decl(decl) => self.decl(decl),
            Stmt::TypeDecl(td) => self.type_decl(td),
            Stmt::Jump(jump) => self.jump(jump),
            Stmt::Expr(es) => self.expr(&es.expr),
            Stmt::Discard(d) => format!("_ = {}", self.expr(&d.value)),
            Stmt::Import(import) => self.import(import),
            Stmt::Impl(im) => self.impl_stmt(im),
        }
    }

    fn block(&self, block: &BlockStmt) -> String {
        if block.statements.is_empty() {
            return "{ }".to_string();
        }
        let inner: Vec<String> = block.statements.iter().map(|s| self.stmt(s)).collect();
        format!("{{ {} }}", inner.join("; "))
    }

    fn decl(&self, decl: &DeclStmt) -> String {
        let mut out = decl.modifiers.spellings().join(" ");
        out.push(' ');
        out.push_str(&decl.name.name);
        if decl.ty.is_implicit() {
            out.push_str(" := ");
            out.push_str(&self.expr(decl.value.as_ref().expect("walrus requires a value")));
        } else {
            out.push_str(": ");
            out.push_str(&self.type_expr(&decl.ty));
            if let Some(value) = &decl.value {
                out.push_str(" = ");
                out.push_str(&self.expr(value));
            }
        }
        out
    }

    fn type_decl(&self, td: &TypeDeclStmt) -> String {
        let value = match &td.value {
            TypeDeclValue::PrimitiveAlias(name) => name.name.clone(),
            TypeDeclValue::Type(ty) => self.type_expr(ty),
        };
        format!("type {} = {}", td.name.name, value)
    }

    fn jump(&self, jump: &JumpStmt) -> String {
        let keyword = match jump.kind {
            JumpKind::Return => "return",
            JumpKind::Break => "break",
            JumpKind::Continue => "continue",
        };
        match &jump.value {
            Some(value) => format!("{} {}", keyword, self.expr(value)),
            None => keyword.to_string(),
        }
    }

    fn import(&self, import: &ImportStmt) -> String {
        let mut out = String::from("import ");
        match &import.target {
            ImportTarget::Standard(name) => out.push_str(&name.name),
            ImportTarget::User(literal) => out.push_str(&literal.token.text),
        }
        if let Some(alias) = &import.alias {
            out.push_str(" as ");
            out.push_str(&alias.name);
        }
        out
    }

    fn impl_stmt(&self, im: &ImplStmt) -> String {
        format!(
            "impl {}{} {}",
            im.target.name,
            self.generics(&im.generics),
            self.block(&im.block)
        )
    }

    // ── Expressions ────────────────────────────────────────────────────

    pub fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Identifier(n) => n.name.clone(),
            Expr::Int(n) => n.token.text.clone(),
            Expr::Uint(n) => n.token.text.clone(),
            Expr::Size(n) => n.token.text.clone(),
            Expr::Byte(n) => n.token.text.clone(),
            Expr::Float(n) => n.token.text.clone(),
            Expr::Bool(n) => if n.value { "true" } else { "false" }.to_string(),
            Expr::Str(n) => n.token.text.clone(),
            Expr::Nil(_) => "nil".to_string(),
            Expr::Continue(_) => "continue".to_string(),
            Expr::Prefix(n) => self.prefix(n),
            Expr::Infix(n) => self.binary(&n.token, &n.lhs, &n.rhs),
            Expr::Assignment(n) => self.binary(&n.token, &n.lhs, &n.rhs),
            Expr::Call(n) => self.call(n),
            Expr::Index(n) => format!("{}[{}]", self.expr(&n.array), self.expr(&n.index)),
            Expr::Namespace(n) => format!("{}::{}", self.expr(&n.outer), n.inner.name),
            Expr::If(n) => self.if_expr(n),
            Expr::Match(n) => self.match_expr(n),
            Expr::For(n) => self.for_expr(n),
            Expr::While(n) => self.while_expr(n),
            Expr::DoWhile(n) => {
                format!("do {} while ({})", self.block(&n.block), self.expr(&n.condition))
            }
            Expr::Loop(n) => format!("loop {}", self.block(&n.block)),
            Expr::Function(n) => self.function(n),
            Expr::Struct(n) => self.struct_expr(n),
            Expr::Enum(n) => self.enum_expr(n),
            Expr::Array(n) => self.array(n),
        }
    }

    fn op_spelling(token: &TokenInfo) -> &str {
        match token.kind.symbol() {
            Some(spelling) => spelling,
            None => &token.text,
        }
    }

    fn prefix(&self, n: &PrefixExpr) -> String {
        let body = format!("{}{}", Self::op_spelling(&n.token), self.expr(&n.rhs));
        if self.group_expressions {
            format!("({body})")
        } else {
            body
        }
    }

    fn binary(&self, op: &TokenInfo, lhs: &Expr, rhs: &Expr) -> String {
        let body = format!(
            "{} {} {}",
            self.expr(lhs),
            Self::op_spelling(op),
            self.expr(rhs)
        );
        if self.group_expressions {
            format!("({body})")
        } else {
            body
        }
    }

    fn call(&self, n: &CallExpr) -> String {
        let args: Vec<String> = n
            .args
            .iter()
            .map(|arg| {
                if arg.is_ref {
                    format!("ref {}", self.expr(&arg.value))
                } else {
                    self.expr(&arg.value)
                }
            })
            .collect();
        let mut out = format!("{}({})", self.expr(&n.callee), args.join(", "));
        if !n.generics.is_empty() {
            out.push_str(" with ");
            out.push_str(&self.generics(&n.generics));
        }
        out
    }

    fn if_expr(&self, n: &IfExpr) -> String {
        let mut out = format!(
            "if ({}) {}",
            self.expr(&n.condition),
            self.stmt(&n.consequence)
        );
        if let Some(alternate) = &n.alternate {
            out.push_str(" else ");
            out.push_str(&self.stmt(alternate));
        }
        out
    }

    fn match_expr(&self, n: &MatchExpr) -> String {
        let mut out = format!("match {} {{ ", self.expr(&n.scrutinee));
        for arm in &n.arms {
            out.push_str(&self.expr(&arm.pattern));
            out.push_str(" => ");
            out.push_str(&self.stmt(&arm.dispatch));
            out.push_str(", ");
        }
        out.push('}');
        if let Some(catch_all) = &n.catch_all {
            out.push_str(" else ");
            out.push_str(&self.stmt(catch_all));
        }
        out
    }

    fn for_expr(&self, n: &ForExpr) -> String {
        let iterables: Vec<String> = n.iterables.iter().map(|e| self.expr(e)).collect();
        let mut out = format!("for ({})", iterables.join(", "));
        if !n.captures.is_empty() {
            let captures: Vec<String> = n
                .captures
                .iter()
                .map(|c| {
                    if c.is_ref {
                        format!("ref {}", self.expr(&c.value))
                    } else {
                        self.expr(&c.value)
                    }
                })
                .collect();
            out.push_str(&format!(" : ({})", captures.join(", ")));
        }
        out.push(' ');
        out.push_str(&self.block(&n.block));
        if let Some(non_break) = &n.non_break {
            out.push_str(" else ");
            out.push_str(&self.stmt(non_break));
        }
        out
    }

    fn while_expr(&self, n: &WhileExpr) -> String {
        let mut out = format!("while ({})", self.expr(&n.condition));
        if let Some(continuation) = &n.continuation {
            out.push_str(&format!(" : ({})", self.expr(continuation)));
        }
        out.push(' ');
        out.push_str(&self.block(&n.block));
        if let Some(non_break) = &n.non_break {
            out.push_str(" else ");
            out.push_str(&self.stmt(non_break));
        }
        out
    }

    fn function(&self, n: &FunctionExpr) -> String {
        format!(
            "fn{}({}): {} {}",
            self.generics(&n.generics),
            self.params(&n.params),
            self.type_expr(&n.return_type),
            self.block(&n.body)
        )
    }

    fn struct_expr(&self, n: &StructExpr) -> String {
        let mut out = String::new();
        if n.packed {
            out.push_str("packed ");
        }
        out.push_str("struct");
        out.push_str(&self.generics(&n.generics));
        out.push_str(" { ");
        for member in &n.members {
            out.push_str(&member.name.name);
            out.push_str(": ");
            out.push_str(&self.type_expr(&member.ty));
            if let Some(default) = &member.default {
                out.push_str(" = ");
                out.push_str(&self.expr(default));
            }
            out.push_str(", ");
        }
        out.push('}');
        out
    }

    fn enum_expr(&self, n: &EnumExpr) -> String {
        let mut out = String::from("enum { ");
        for variant in &n.variants {
            out.push_str(&variant.name.name);
            if let Some(value) = &variant.value {
                out.push_str(" = ");
                out.push_str(&self.expr(value));
            }
            out.push_str(", ");
        }
        out.push('}');
        out
    }

    fn array(&self, n: &ArrayExpr) -> String {
        let size = if n.inferred_size {
            "_".to_string()
        } else {
            format!("{}uz", n.items.len())
        };
        let mut out = format!("[{size}]{{ ");
        for item in &n.items {
            out.push_str(&self.expr(item));
            out.push_str(", ");
        }
        out.push('}');
        out
    }

    // ── Types ──────────────────────────────────────────────────────────

    fn params(&self, params: &[Parameter]) -> String {
        let rendered: Vec<String> = params
            .iter()
            .map(|p| {
                let mut out = String::new();
                if p.is_ref {
                    out.push_str("ref ");
                }
                out.push_str(&p.name.name);
                out.push_str(": ");
                out.push_str(&self.type_expr(&p.ty));
                if let Some(default) = &p.default {
                    out.push_str(" = ");
                    out.push_str(&self.expr(default));
                }
                out
            })
            .collect();
        rendered.join(", ")
    }

    fn generics(&self, generics: &[Identifier]) -> String {
        if generics.is_empty() {
            return String::new();
        }
        let names: Vec<&str> = generics.iter().map(|g| g.name.as_str()).collect();
        format!("<{}>", names.join(", "))
    }

    /// Render an explicit type. Implicit types never reach this point
    /// through well-formed trees; they render as the walrus marker.
    pub fn type_expr(&self, ty: &TypeExpr) -> String {
        let Some(explicit) = ty.explicit() else {
            return ":=".to_string();
        };

        let mut out = String::new();
        if explicit.nullable {
            out.push('?');
        }
        match &explicit.form {
            ExplicitTypeForm::Named(named) => {
                out.push_str(&named.name.name);
                out.push_str(&self.generics(&named.generics));
            }
            ExplicitTypeForm::Function(fn_type) => {
                out.push_str("fn");
                out.push_str(&self.generics(&fn_type.generics));
                out.push('(');
                out.push_str(&self.params(&fn_type.params));
                out.push_str("): ");
                out.push_str(&self.type_expr(&fn_type.return_type));
            }
            ExplicitTypeForm::Struct(s) => out.push_str(&self.struct_expr(s)),
            ExplicitTypeForm::Enum(e) => out.push_str(&self.enum_expr(e)),
            ExplicitTypeForm::Array(array) => {
                out.push('[');
                match &array.dims {
                    ArrayDims::Sizes(sizes) => {
                        let dims: Vec<String> =
                            sizes.iter().map(|size| format!("{size}uz")).collect();
                        out.push_str(&dims.join(", "));
                    }
                    ArrayDims::Range { inclusive } => {
                        out.push_str(if *inclusive { "..=" } else { ".." });
                    }
                }
                out.push(']');
                out.push_str(&self.type_expr(&array.inner));
            }
            ExplicitTypeForm::Typeof(referred) => {
                out.push_str("typeof ");
                out.push_str(&self.expr(referred));
            }
        }
        out
    }
}
