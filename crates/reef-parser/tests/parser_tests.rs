//! Parser integration tests.
//!
//! Each test parses a source snippet and inspects the typed AST, or
//! checks the exact diagnostic strings (category plus `[Ln, Col]`
//! position) for malformed input. Operator precedence is asserted
//! through the reconstructor with expression grouping enabled.

use reef_common::token::TokenKind;
use reef_parser::ast::*;
use reef_parser::reconstruct::Reconstructor;
use reef_parser::parse;

// ── Helpers ────────────────────────────────────────────────────────────

fn parse_ok(source: &str) -> Program {
    let parse = parse(source);
    let rendered: Vec<String> = parse.diagnostics.iter().map(ToString::to_string).collect();
    assert!(rendered.is_empty(), "unexpected diagnostics for {source:?}: {rendered:?}");
    parse.program
}

fn parse_errors(source: &str) -> Vec<String> {
    let parse = parse(source);
    assert!(
        parse.program.statements.is_empty(),
        "diagnosed programs must surface an empty statement list"
    );
    assert!(!parse.diagnostics.is_empty(), "expected diagnostics for {source:?}");
    parse.diagnostics.iter().map(ToString::to_string).collect()
}

fn single_stmt(source: &str) -> Stmt {
    let mut program = parse_ok(source);
    assert_eq!(program.statements.len(), 1, "expected one statement in {source:?}");
    program.statements.remove(0)
}

fn single_expr(source: &str) -> Expr {
    match single_stmt(source) {
        Stmt::Expr(es) => es.expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

fn expect_decl(stmt: &Stmt) -> &DeclStmt {
    match stmt {
        Stmt::Decl(decl) => decl,
        other => panic!("expected declaration, got {other:?}"),
    }
}

fn expect_int(expr: &Expr, value: i64) {
    match expr {
        Expr::Int(lit) => assert_eq!(lit.value, value),
        other => panic!("expected signed integer {value}, got {other:?}"),
    }
}

fn expect_uint(expr: &Expr, value: u64) {
    match expr {
        Expr::Uint(lit) => assert_eq!(lit.value, value),
        other => panic!("expected unsigned integer {value}, got {other:?}"),
    }
}

fn expect_ident(expr: &Expr, name: &str) {
    match expr {
        Expr::Identifier(ident) => assert_eq!(ident.name, name),
        other => panic!("expected identifier {name:?}, got {other:?}"),
    }
}

// ── Declarations ───────────────────────────────────────────────────────

#[test]
fn var_statements() {
    let program = parse_ok("var x := 5;\n// var x := 5;\nvar y := 10;\nvar foobar := 838383;");
    let expected = [("x", 5), ("y", 10), ("foobar", 838383)];

    assert_eq!(program.statements.len(), expected.len());
    for (stmt, (name, value)) in program.statements.iter().zip(expected) {
        let decl = expect_decl(stmt);
        assert_eq!(decl.name.name, name);
        assert!(!decl.modifiers.is_const());
        assert!(decl.ty.is_implicit());
        expect_int(decl.value.as_ref().unwrap(), value);
    }
}

#[test]
fn var_statements_with_errors() {
    let errors = parse_errors("var x 5;\nvar = 10;\nvar 838383;\nvar z := 6");
    assert_eq!(
        errors,
        vec![
            "Expected token COLON, found INT_10 [Ln 1, Col 7]",
            "Expected token IDENT, found ASSIGN [Ln 2, Col 5]",
            "No prefix parse function for ASSIGN found [Ln 2, Col 5]",
            "Expected token IDENT, found INT_10 [Ln 3, Col 5]",
        ]
    );
}

#[test]
fn var_and_const_statements() {
    let program = parse_ok("var x := 5;\nconst y := 10;\nvar foobar := 838383;");
    let is_const = [false, true, false];
    for (stmt, expected) in program.statements.iter().zip(is_const) {
        assert_eq!(expect_decl(stmt).modifiers.is_const(), expected);
    }
}

#[test]
fn complex_typed_decl_statements() {
    let program = parse_ok(
        "var x: int = 5;\nvar z: uint;\nconst y: bool = 10;\nvar foobar := 838383;\nvar baz: ?LongNum = 838383;\nconst boo: Reef = 2;\n",
    );
    assert_eq!(program.statements.len(), 6);

    let implicit = [false, false, false, true, false, false];
    let nullable = [false, false, false, false, true, false];
    let names = ["x", "z", "y", "foobar", "baz", "boo"];
    let type_names = [Some("int"), Some("uint"), Some("bool"), None, Some("LongNum"), Some("Reef")];

    for (i, stmt) in program.statements.iter().enumerate() {
        let decl = expect_decl(stmt);
        assert_eq!(decl.name.name, names[i]);
        assert_eq!(decl.ty.is_implicit(), implicit[i]);
        assert_eq!(decl.ty.is_nullable(), nullable[i]);
        if let Some(type_name) = type_names[i] {
            let explicit = decl.ty.explicit().unwrap();
            let ExplicitTypeForm::Named(named) = &explicit.form else {
                panic!("expected a named type for {stmt:?}");
            };
            assert_eq!(named.name.name, type_name);
        }
    }
}

#[test]
fn modifier_runs_on_declarations() {
    let program = parse_ok("private const a := 1; export static var b := 2;");
    let first = expect_decl(&program.statements[0]);
    assert!(first.modifiers.contains(Modifiers::PRIVATE));
    assert!(first.modifiers.contains(Modifiers::CONSTANT));

    let second = expect_decl(&program.statements[1]);
    assert!(second.modifiers.contains(Modifiers::EXPORT));
    assert!(second.modifiers.contains(Modifiers::STATIC));
    assert!(second.modifiers.contains(Modifiers::VARIABLE));
}

#[test]
fn illegal_decl_modifiers() {
    // No mutability keyword at all.
    let errors = parse_errors("private x := 1;");
    assert_eq!(errors[0], "ILLEGAL_DECL_MODIFIERS [Ln 1, Col 1]");

    // Two mutability keywords.
    let errors = parse_errors("var const x := 1;");
    assert_eq!(errors[0], "ILLEGAL_DECL_MODIFIERS [Ln 1, Col 1]");

    // Comptime values cannot be extern.
    let errors = parse_errors("extern comptime x: int;");
    assert_eq!(errors[0], "ILLEGAL_DECL_MODIFIERS [Ln 1, Col 1]");
}

#[test]
fn primitive_alias_type_decls() {
    let cases = [
        ("type a = int", TokenKind::IntType),
        ("type a = uint", TokenKind::UintType),
        ("type a = size", TokenKind::SizeType),
        ("type a = float", TokenKind::FloatType),
        ("type a = string", TokenKind::StringType),
        ("type a = byte", TokenKind::ByteType),
        ("type a = bool", TokenKind::BoolType),
        ("type a = void", TokenKind::VoidType),
    ];

    for (source, kind) in cases {
        let Stmt::TypeDecl(td) = single_stmt(source) else {
            panic!("expected type declaration for {source:?}");
        };
        assert_eq!(td.name.name, "a");
        assert!(td.primitive_alias());
        let TypeDeclValue::PrimitiveAlias(alias) = &td.value else {
            unreachable!();
        };
        assert_eq!(alias.token.kind, kind);
    }
}

#[test]
fn nullable_type_decl() {
    let Stmt::TypeDecl(td) = single_stmt("type N = ?int") else {
        panic!("expected type declaration");
    };
    assert_eq!(td.name.name, "N");
    assert!(!td.primitive_alias());
    let TypeDeclValue::Type(ty) = &td.value else { unreachable!() };
    assert!(ty.is_nullable());
}

// ── Jump statements ────────────────────────────────────────────────────

#[test]
fn standard_jumps() {
    let program = parse_ok("return;\nreturn 5;\nbreak;break 10;\nreturn 993322;");
    assert_eq!(program.statements.len(), 5);

    let values = [None, Some(5), None, Some(10), Some(993322)];
    for (stmt, value) in program.statements.iter().zip(values) {
        let Stmt::Jump(jump) = stmt else { panic!("expected jump, got {stmt:?}") };
        match value {
            Some(v) => expect_int(jump.value.as_ref().unwrap(), v),
            None => assert!(jump.value.is_none()),
        }
    }
}

#[test]
fn jumps_without_sentinel_semicolon() {
    let Stmt::Jump(jump) = single_stmt("return 5") else { panic!() };
    assert_eq!(jump.kind, JumpKind::Return);
    expect_int(jump.value.as_ref().unwrap(), 5);

    let Stmt::Jump(jump) = single_stmt("break -5") else { panic!() };
    assert_eq!(jump.kind, JumpKind::Break);
    let Expr::Prefix(prefix) = jump.value.as_ref().unwrap() else { panic!() };
    assert_eq!(prefix.op, TokenKind::Minus);
    expect_int(&prefix.rhs, 5);
}

#[test]
fn continue_never_takes_a_value() {
    let Stmt::Jump(jump) = single_stmt("continue") else { panic!() };
    assert_eq!(jump.kind, JumpKind::Continue);
    assert!(jump.value.is_none());

    // `continue 2` is a bare jump plus a separate expression statement.
    let program = parse_ok("continue 2");
    assert_eq!(program.statements.len(), 2);
    let Stmt::Jump(jump) = &program.statements[0] else { panic!() };
    assert!(jump.value.is_none());
    let Stmt::Expr(es) = &program.statements[1] else { panic!() };
    expect_int(&es.expr, 2);
}

// ── Basic expressions ──────────────────────────────────────────────────

#[test]
fn identifier_expression() {
    expect_ident(&single_expr("foobar;"), "foobar");
}

#[test]
fn index_expression() {
    let Expr::Index(index) = single_expr("foo[bar]") else { panic!() };
    expect_ident(&index.array, "foo");
    expect_ident(&index.index, "bar");
}

#[test]
fn signed_integer_bases() {
    expect_int(&single_expr("5;"), 5);
    expect_int(&single_expr("0b10011101101;"), 0b10011101101);
    expect_int(&single_expr("0o1234567;"), 0o1234567);
    expect_int(&single_expr("0xFF8a91d;"), 0xFF8a91d);
}

#[test]
fn unsigned_integer_bases() {
    expect_uint(&single_expr("5u;"), 5);
    expect_uint(&single_expr("0b10011101101u;"), 0b10011101101);
    expect_uint(&single_expr("0o1234567U;"), 0o1234567);
    expect_uint(&single_expr("0xFF8a91du;"), 0xFF8a91d);
    expect_uint(&single_expr("0xFFFFFFFFFFFFFFFFu;"), u64::MAX);
}

#[test]
fn size_integer_suffixes() {
    for source in ["5uz;", "5z;", "0b101uz;"] {
        let Expr::Size(_) = single_expr(source) else {
            panic!("expected size literal for {source:?}");
        };
    }
}

#[test]
fn byte_literals() {
    let Expr::Byte(byte) = single_expr("'3'") else { panic!() };
    assert_eq!(byte.value, b'3');
    let Expr::Byte(byte) = single_expr("'\\0'") else { panic!() };
    assert_eq!(byte.value, 0);
}

#[test]
fn signed_integer_overflow() {
    let errors = parse_errors("0xFFFFFFFFFFFFFFFF");
    assert_eq!(errors, vec!["SIGNED_INTEGER_OVERFLOW [Ln 1, Col 1]"]);
}

#[test]
fn unsigned_integer_overflow() {
    let errors = parse_errors("0x10000000000000000u");
    assert_eq!(errors, vec!["UNSIGNED_INTEGER_OVERFLOW [Ln 1, Col 1]"]);
}

#[test]
fn malformed_integer_digits() {
    let errors = parse_errors("0b102");
    assert_eq!(errors, vec!["MALFORMED_INTEGER_STR [Ln 1, Col 1]"]);
}

#[test]
fn floating_points() {
    for (source, expected) in [
        ("1023.0;", 1023.0),
        ("1023.234612;", 1023.234612),
        ("1023.234612e234;", 1023.234612e234),
    ] {
        let Expr::Float(float) = single_expr(source) else { panic!() };
        assert_eq!(float.value, expected);
    }
}

#[test]
fn bool_expressions() {
    let program = parse_ok("true;\nfalse;");
    let expected = [true, false];
    for (stmt, value) in program.statements.iter().zip(expected) {
        let Stmt::Expr(es) = stmt else { panic!() };
        let Expr::Bool(b) = &es.expr else { panic!() };
        assert_eq!(b.value, value);
    }
}

#[test]
fn string_expressions() {
    let program = parse_ok("\"This is a string\";\n\"Hello, 'World'!\";\n\"\";");
    let expected = ["This is a string", "Hello, 'World'!", ""];
    for (stmt, value) in program.statements.iter().zip(expected) {
        let Stmt::Expr(es) = stmt else { panic!() };
        let Expr::Str(s) = &es.expr else { panic!() };
        assert_eq!(s.value, value);
    }
}

#[test]
fn multiline_string_expressions() {
    let source = "\\\\This is a string\n;\\\\Hello, 'World'!\n\\\\\n;\\\\\n;";
    let program = parse_ok(source);
    let expected = ["This is a string", "Hello, 'World'!\n", ""];
    assert_eq!(program.statements.len(), expected.len());
    for (stmt, value) in program.statements.iter().zip(expected) {
        let Stmt::Expr(es) = stmt else { panic!() };
        let Expr::Str(s) = &es.expr else { panic!() };
        assert_eq!(s.value, value);
    }
}

#[test]
fn nil_expression() {
    let Expr::Nil(nil) = single_expr("nil") else { panic!() };
    assert_eq!(nil.token.text, "nil");
}

// ── Prefix / infix expressions ─────────────────────────────────────────

#[test]
fn simple_prefix_expressions() {
    let cases = [
        ("!5", TokenKind::Bang),
        ("-15u", TokenKind::Minus),
        ("!3.4", TokenKind::Bang),
        ("~0b101101", TokenKind::Not),
        ("!1.2345e100", TokenKind::Bang),
    ];
    for (source, op) in cases {
        let Expr::Prefix(prefix) = single_expr(source) else {
            panic!("expected prefix expression for {source:?}");
        };
        assert_eq!(prefix.op, op);
    }
}

#[test]
fn infix_expressions() {
    let cases = [
        ("5 + 5;", TokenKind::Plus),
        ("5 - 5;", TokenKind::Minus),
        ("5.0 * 5.2;", TokenKind::Star),
        ("5.0 ** 5.2;", TokenKind::StarStar),
        ("4.9e2 / 5.1e3;", TokenKind::Slash),
        ("0x231 % 0xF;", TokenKind::Percent),
        ("5 < 5;", TokenKind::Lt),
        ("5 <= 5;", TokenKind::LtEq),
        ("5 > 5;", TokenKind::Gt),
        ("5 >= 5;", TokenKind::GtEq),
        ("5 == 5;", TokenKind::Eq),
        ("5 != 5;", TokenKind::NotEq),
        ("0b10111u & 0b10110u;", TokenKind::And),
        ("0b10111u | 0b10110u;", TokenKind::Or),
        ("0b10111u ^ 0b10110u;", TokenKind::Xor),
        ("0b10111u >> 5u;", TokenKind::Shr),
        ("0b10111u << 4u;", TokenKind::Shl),
        ("0b10111u..4u;", TokenKind::DotDot),
        ("0b10111u..=4u;", TokenKind::DotDotEq),
        ("0b10111u is 4u;", TokenKind::Is),
        ("0b10111u in 4u;", TokenKind::In),
        ("0b10111u and 4u;", TokenKind::BooleanAnd),
        ("0b10111u or 4u;", TokenKind::BooleanOr),
        ("0b10111u orelse 4u;", TokenKind::Orelse),
    ];
    for (source, op) in cases {
        let Expr::Infix(infix) = single_expr(source) else {
            panic!("expected infix expression for {source:?}");
        };
        assert_eq!(infix.op, op, "operator for {source:?}");
    }
}

#[test]
fn assignment_expressions() {
    let cases = [
        ("a = 4u;", TokenKind::Assign),
        ("a += 4u;", TokenKind::PlusAssign),
        ("a -= 4u;", TokenKind::MinusAssign),
        ("a *= 4u;", TokenKind::StarAssign),
        ("a /= 4u;", TokenKind::SlashAssign),
        ("a %= 4u;", TokenKind::PercentAssign),
        ("a &= 4u;", TokenKind::AndAssign),
        ("a |= 4u;", TokenKind::OrAssign),
        ("a ^= 4u;", TokenKind::XorAssign),
        ("a <<= 4u;", TokenKind::ShlAssign),
        ("a >>= 4u;", TokenKind::ShrAssign),
        ("a ~= 4u;", TokenKind::NotAssign),
    ];
    for (source, op) in cases {
        let Expr::Assignment(assign) = single_expr(source) else {
            panic!("expected assignment expression for {source:?}");
        };
        assert_eq!(assign.op, op, "operator for {source:?}");
        expect_ident(&assign.lhs, "a");
        expect_uint(&assign.rhs, 4);
    }
}

#[test]
fn assignments_bind_left_associative() {
    let Expr::Assignment(outer) = single_expr("a = b = c") else { panic!() };
    let Expr::Assignment(inner) = outer.lhs.as_ref() else {
        panic!("expected left-associative assignment, got {:?}", outer.lhs);
    };
    expect_ident(&inner.lhs, "a");
    expect_ident(&inner.rhs, "b");
    expect_ident(&outer.rhs, "c");
}

#[test]
fn namespace_expressions() {
    let Expr::Namespace(ns) = single_expr("Outer::inner") else { panic!() };
    expect_ident(&ns.outer, "Outer");
    assert_eq!(ns.inner.name, "inner");
}

#[test]
fn operator_precedence_parsing() {
    let cases = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a * b / c", "((a * b) / c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
        ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
        ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
        ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
        ("(5 + 5) * 2", "((5 + 5) * 2)"),
        ("5 * 5 ** 2", "(5 * (5 ** 2))"),
        ("2 / (5 + 5)", "(2 / (5 + 5))"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("!(true == true)", "(!(true == true))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
        ),
        ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
        ("a and b or c", "((a and b) or c)"),
        ("a == b and c == d", "((a == b) and (c == d))"),
        ("1uz..2uz == x", "((1uz .. 2uz) == x)"),
    ];

    let reconstructor = Reconstructor::new(true);
    for (source, expected) in cases {
        let program = parse_ok(source);
        assert_eq!(reconstructor.program(&program), expected, "reconstruction of {source:?}");
    }
}

#[test]
fn malformed_expressions() {
    assert_eq!(parse_errors("!"), vec!["PREFIX_MISSING_OPERAND [Ln 1, Col 1]"]);
    assert_eq!(parse_errors("3+"), vec!["INFIX_MISSING_RHS [Ln 1, Col 2]"]);
    assert_eq!(parse_errors("3+4-"), vec!["INFIX_MISSING_RHS [Ln 1, Col 4]"]);
}

// ── typeof ─────────────────────────────────────────────────────────────

#[test]
fn correct_type_introspection() {
    let Stmt::TypeDecl(td) = single_stmt("type a = ?typeof 4u") else { panic!() };
    assert!(!td.primitive_alias());
    let TypeDeclValue::Type(ty) = &td.value else { unreachable!() };
    assert!(ty.is_nullable());
    let ExplicitTypeForm::Typeof(referred) = &ty.explicit().unwrap().form else {
        panic!("expected typeof form");
    };
    expect_uint(referred, 4);
}

#[test]
fn malformed_typeof_usages() {
    // typeof has no expression-position handler.
    let errors = parse_errors("typeof 1");
    assert_eq!(errors, vec!["No prefix parse function for TYPEOF found [Ln 1, Col 1]"]);

    // typeof is not a declaration type.
    let errors = parse_errors("const a: typeof 1 = 3");
    assert_eq!(errors, vec!["ILLEGAL_DECL_CONSTRUCT [Ln 1, Col 1]"]);
    let errors = parse_errors("var v: typeof g");
    assert_eq!(errors, vec!["ILLEGAL_DECL_CONSTRUCT [Ln 1, Col 1]"]);

    // typeof of a literal type construct is redundant.
    let errors = parse_errors("type a = typeof enum { a, }");
    assert_eq!(
        errors,
        vec![
            "REDUNDANT_TYPE_INTROSPECTION [Ln 1, Col 17]",
            "MALFORMED_TYPE_DECL [Ln 1, Col 1]",
        ]
    );
    let errors = parse_errors("type a = typeof struct { a: int, }");
    assert_eq!(
        errors,
        vec![
            "REDUNDANT_TYPE_INTROSPECTION [Ln 1, Col 17]",
            "MALFORMED_TYPE_DECL [Ln 1, Col 1]",
        ]
    );

    // The redundancy is read off the leading keyword, so a bodiless
    // function still reports it alongside its own structural error.
    let errors = parse_errors("type a = typeof fn(): int");
    assert_eq!(
        errors,
        vec![
            "REDUNDANT_TYPE_INTROSPECTION [Ln 1, Col 17]",
            "MALFORMED_TYPE_DECL [Ln 1, Col 1]",
            "Expected token LBRACE, found END [Ln 1, Col 26]",
        ]
    );

    // The nullable marker cannot follow typeof.
    let errors = parse_errors("type a = typeof ?enum {a, }");
    assert_eq!(
        errors,
        vec![
            "No prefix parse function for WHAT found [Ln 1, Col 17]",
            "MALFORMED_TYPE_DECL [Ln 1, Col 1]",
        ]
    );
}

// ── Conditionals ───────────────────────────────────────────────────────

#[test]
fn if_without_alternate() {
    let Expr::If(if_expr) = single_expr("if (x < y) { x }") else { panic!() };
    assert!(if_expr.alternate.is_none());

    let Expr::Infix(condition) = if_expr.condition.as_ref() else { panic!() };
    assert_eq!(condition.op, TokenKind::Lt);
    expect_ident(&condition.lhs, "x");
    expect_ident(&condition.rhs, "y");

    let Stmt::Block(consequence) = if_expr.consequence.as_ref() else { panic!() };
    assert_eq!(consequence.statements.len(), 1);
}

#[test]
fn if_with_alternate() {
    let Expr::If(if_expr) = single_expr("if (x < y) { x } else { y }") else { panic!() };
    let Stmt::Block(alternate) = if_expr.alternate.as_ref().unwrap().as_ref() else { panic!() };
    assert_eq!(alternate.statements.len(), 1);
}

#[test]
fn if_else_with_non_block_branches() {
    let stmt = single_stmt("const val := if (x >= y) 1 else 2;");
    let decl = expect_decl(&stmt);
    assert!(decl.ty.is_implicit());

    let Expr::If(if_expr) = decl.value.as_ref().unwrap() else { panic!() };
    let Expr::Infix(condition) = if_expr.condition.as_ref() else { panic!() };
    assert_eq!(condition.op, TokenKind::GtEq);

    let Stmt::Expr(consequence) = if_expr.consequence.as_ref() else { panic!() };
    expect_int(&consequence.expr, 1);
    let Stmt::Expr(alternate) = if_expr.alternate.as_ref().unwrap().as_ref() else { panic!() };
    expect_int(&alternate.expr, 2);
}

#[test]
fn if_else_with_return_statements() {
    let Expr::If(if_expr) = single_expr("if (true) return 1; else return 2;") else { panic!() };
    let Stmt::Jump(consequence) = if_expr.consequence.as_ref() else { panic!() };
    expect_int(consequence.value.as_ref().unwrap(), 1);
    let Stmt::Jump(alternate) = if_expr.alternate.as_ref().unwrap().as_ref() else { panic!() };
    expect_int(alternate.value.as_ref().unwrap(), 2);
}

#[test]
fn nested_if_chain() {
    let source = "if (x < y) {return -1;} else if (x > y) {return 1;} else {return 0;}";
    let Expr::If(first) = single_expr(source) else { panic!() };

    let Stmt::Block(consequence) = first.consequence.as_ref() else { panic!() };
    assert_eq!(consequence.statements.len(), 1);

    let Stmt::Expr(alternate) = first.alternate.as_ref().unwrap().as_ref() else { panic!() };
    let Expr::If(second) = &alternate.expr else { panic!() };
    let Stmt::Block(terminal) = second.alternate.as_ref().unwrap().as_ref() else { panic!() };
    assert_eq!(terminal.statements.len(), 1);
}

// ── Function literals and types ────────────────────────────────────────

#[test]
fn function_type_declaration() {
    let stmt = single_stmt("var add: fn(ref a: int, b: int): int;");
    let decl = expect_decl(&stmt);
    assert!(decl.value.is_none());

    let ExplicitTypeForm::Function(fn_type) = &decl.ty.explicit().unwrap().form else {
        panic!("expected function type");
    };
    assert_eq!(fn_type.params.len(), 2);
    assert!(fn_type.params[0].is_ref);
    assert_eq!(fn_type.params[0].name.name, "a");
    assert!(!fn_type.params[1].is_ref);
    assert_eq!(fn_type.params[1].name.name, "b");

    let ExplicitTypeForm::Named(ret) = &fn_type.return_type.explicit().unwrap().form else {
        panic!();
    };
    assert_eq!(ret.name.name, "int");
}

#[test]
fn function_type_error_cases() {
    // Function types admit no defaults at all; the diagnostic anchors at
    // the declaration's type-annotation colon.
    let errors = parse_errors("var add: fn(a: int = 1, b: int): ?int;");
    assert_eq!(errors[0], "MALFORMED_FUNCTION_LITERAL [Ln 1, Col 8]");
    let errors = parse_errors("var add: fn(a: int, b: int = 2): int;");
    assert_eq!(errors[0], "MALFORMED_FUNCTION_LITERAL [Ln 1, Col 8]");

    // Missing return type.
    let errors = parse_errors("var add: fn(a: int, b: int):;");
    assert_eq!(errors[0], "MALFORMED_FUNCTION_LITERAL [Ln 1, Col 29]");

    // Missing return clause entirely.
    let errors = parse_errors("const add: fn(a: int = -345, b: uint = 209u);");
    assert_eq!(errors[0], "Expected token COLON, found SEMICOLON [Ln 1, Col 45]");
}

#[test]
fn function_literal_parameters() {
    struct Case {
        source: &'static str,
        params: &'static [(&'static str, bool, Option<i64>)],
        return_name: &'static str,
        return_nullable: bool,
    }
    let cases = [
        Case { source: "fn(): void {};", params: &[], return_name: "void", return_nullable: false },
        Case {
            source: "fn(x: int): Blk {};",
            params: &[("x", false, None)],
            return_name: "Blk",
            return_nullable: false,
        },
        Case {
            source: "fn(x: int, y: int, z: int): int {};",
            params: &[("x", false, None), ("y", false, None), ("z", false, None)],
            return_name: "int",
            return_nullable: false,
        },
        Case {
            source: "fn(x: int, ref y: int, z: int = 3): ?uint {};",
            params: &[("x", false, None), ("y", true, None), ("z", false, Some(3))],
            return_name: "uint",
            return_nullable: true,
        },
    ];

    for case in cases {
        let Expr::Function(function) = single_expr(case.source) else {
            panic!("expected function literal for {:?}", case.source);
        };
        assert!(function.body.statements.is_empty());
        assert_eq!(function.params.len(), case.params.len());
        for (param, (name, is_ref, default)) in function.params.iter().zip(case.params) {
            assert_eq!(param.name.name, *name);
            assert_eq!(param.is_ref, *is_ref);
            match default {
                Some(v) => expect_int(param.default.as_ref().unwrap(), *v),
                None => assert!(param.default.is_none()),
            }
        }

        let explicit = function.return_type.explicit().unwrap();
        assert_eq!(explicit.nullable, case.return_nullable);
        let ExplicitTypeForm::Named(named) = &explicit.form else { panic!() };
        assert_eq!(named.name.name, case.return_name);
    }
}

#[test]
fn function_literal_defaults_must_be_suffix_closed() {
    let errors = parse_errors("fn(x: int, y: int = 2, z: int): int {};");
    assert_eq!(errors[0], "MALFORMED_FUNCTION_LITERAL [Ln 1, Col 1]");
}

#[test]
fn implicit_parameter_type() {
    let errors = parse_errors("fn(a := 2): int");
    assert_eq!(errors[0], "IMPLICIT_FN_PARAM_TYPE [Ln 1, Col 9]");
}

#[test]
fn call_expression_with_ref_arguments() {
    let Expr::Call(call) = single_expr("add(1, 2 * 3, ref w, 4 + 5);") else { panic!() };
    expect_ident(&call.callee, "add");
    assert_eq!(call.args.len(), 4);

    assert!(!call.args[0].is_ref);
    expect_int(&call.args[0].value, 1);

    let Expr::Infix(second) = &call.args[1].value else { panic!() };
    assert_eq!(second.op, TokenKind::Star);

    assert!(call.args[2].is_ref);
    expect_ident(&call.args[2].value, "w");

    let Expr::Infix(fourth) = &call.args[3].value else { panic!() };
    assert_eq!(fourth.op, TokenKind::Plus);
}

// ── Enum declarations ──────────────────────────────────────────────────

fn expect_variants(enum_expr: &EnumExpr, expected: &[(&str, Option<i64>)]) {
    assert_eq!(enum_expr.variants.len(), expected.len());
    for (variant, (name, value)) in enum_expr.variants.iter().zip(expected) {
        assert_eq!(variant.name.name, *name);
        match value {
            Some(v) => expect_int(variant.value.as_ref().unwrap(), *v),
            None => assert!(variant.value.is_none()),
        }
    }
}

#[test]
fn correctly_formed_enums() {
    let Expr::Enum(e) = single_expr("enum { RED, BLUE, GREEN, }") else { panic!() };
    expect_variants(&e, &[("RED", None), ("BLUE", None), ("GREEN", None)]);

    let Expr::Enum(e) = single_expr("enum { RED, BLUE = 1, GREEN, }") else { panic!() };
    expect_variants(&e, &[("RED", None), ("BLUE", Some(1)), ("GREEN", None)]);

    let Expr::Enum(e) = single_expr("enum { RED = 100, BLUE = 20, GREEN = 3, }") else { panic!() };
    expect_variants(&e, &[("RED", Some(100)), ("BLUE", Some(20)), ("GREEN", Some(3))]);
}

#[test]
fn enums_as_types() {
    let stmt = single_stmt("var a: enum { RED, BLUE = 100, GREEN, };");
    let decl = expect_decl(&stmt);
    let ExplicitTypeForm::Enum(e) = &decl.ty.explicit().unwrap().form else { panic!() };
    expect_variants(e, &[("RED", None), ("BLUE", Some(100)), ("GREEN", None)]);
}

#[test]
fn enums_in_type_decls() {
    let Stmt::TypeDecl(td) = single_stmt("type Colors = enum { RED, BLUE = 100, GREEN, };") else {
        panic!()
    };
    assert_eq!(td.name.name, "Colors");
    assert!(!td.primitive_alias());
    let TypeDeclValue::Type(ty) = &td.value else { unreachable!() };
    let ExplicitTypeForm::Enum(e) = &ty.explicit().unwrap().form else { panic!() };
    expect_variants(e, &[("RED", None), ("BLUE", Some(100)), ("GREEN", None)]);
}

#[test]
fn malformed_enum_expressions() {
    let errors = parse_errors("enum {}");
    assert_eq!(errors, vec!["ENUM_MISSING_VARIANTS [Ln 1, Col 1]"]);

    let errors = parse_errors("enum { a, b, c }");
    assert_eq!(
        errors,
        vec![
            "Expected token COMMA, found RBRACE [Ln 1, Col 16]",
            "MISSING_TRAILING_COMMA [Ln 1, Col 14]",
            "No prefix parse function for RBRACE found [Ln 1, Col 16]",
        ]
    );

    let errors = parse_errors("enum { a, b c, }");
    assert_eq!(
        errors,
        vec![
            "Expected token COMMA, found IDENT [Ln 1, Col 13]",
            "MISSING_TRAILING_COMMA [Ln 1, Col 11]",
            "No prefix parse function for COMMA found [Ln 1, Col 14]",
            "No prefix parse function for RBRACE found [Ln 1, Col 16]",
        ]
    );

    let errors = parse_errors("enum { a b c }");
    assert_eq!(
        errors,
        vec![
            "Expected token COMMA, found IDENT [Ln 1, Col 10]",
            "MISSING_TRAILING_COMMA [Ln 1, Col 8]",
            "No prefix parse function for RBRACE found [Ln 1, Col 14]",
        ]
    );
}

// ── Struct declarations ────────────────────────────────────────────────

#[test]
fn correctly_formed_structs() {
    let Expr::Struct(s) = single_expr("struct { a: int, }") else { panic!() };
    assert!(!s.packed);
    assert_eq!(s.members.len(), 1);
    assert_eq!(s.members[0].name.name, "a");

    let Expr::Struct(s) = single_expr("struct { a: int, b: uint, c: ?Woah, d: int = 1, }") else {
        panic!()
    };
    assert_eq!(s.members.len(), 4);
    assert!(s.members[2].ty.is_nullable());
    expect_int(s.members[3].default.as_ref().unwrap(), 1);
}

#[test]
fn packed_structs() {
    let Expr::Struct(s) = single_expr("packed struct { a: int, }") else { panic!() };
    assert!(s.packed);
}

#[test]
fn structs_as_types() {
    let stmt = single_stmt("var a: struct { a: int, b: ?uint, };");
    let decl = expect_decl(&stmt);
    let ExplicitTypeForm::Struct(s) = &decl.ty.explicit().unwrap().form else { panic!() };
    assert_eq!(s.members.len(), 2);
    assert!(s.members[1].ty.is_nullable());
}

#[test]
fn malformed_struct_expressions() {
    let errors = parse_errors("struct {}");
    assert_eq!(errors, vec!["STRUCT_MISSING_MEMBERS [Ln 1, Col 1]"]);

    let errors = parse_errors("struct { a: int, b: int }");
    assert_eq!(errors, vec!["MISSING_TRAILING_COMMA [Ln 1, Col 25]"]);

    let errors = parse_errors("struct { const a: int = 1; }");
    assert_eq!(
        errors,
        vec![
            "Expected token IDENT, found CONST [Ln 1, Col 10]",
            "No prefix parse function for RBRACE found [Ln 1, Col 28]",
        ]
    );

    let errors = parse_errors("struct { a := 1, }");
    assert_eq!(
        errors,
        vec![
            "STRUCT_MEMBER_NOT_EXPLICIT [Ln 1, Col 15]",
            "No prefix parse function for COMMA found [Ln 1, Col 16]",
            "No prefix parse function for RBRACE found [Ln 1, Col 18]",
        ]
    );
}

// ── Impl statements ────────────────────────────────────────────────────

#[test]
fn correct_impl_block() {
    let Stmt::Impl(impl_stmt) = single_stmt("impl Obj<T> { const a := 1; }") else { panic!() };
    assert_eq!(impl_stmt.target.name, "Obj");
    assert_eq!(impl_stmt.generics.len(), 1);
    assert_eq!(impl_stmt.generics[0].name, "T");
    assert_eq!(impl_stmt.block.statements.len(), 1);

    let decl = expect_decl(&impl_stmt.block.statements[0]);
    assert!(decl.modifiers.is_const());
    assert!(decl.ty.is_implicit());
}

#[test]
fn malformed_impl_blocks() {
    let errors = parse_errors("impl { const a := 1; }");
    assert_eq!(errors[0], "Expected token IDENT, found LBRACE [Ln 1, Col 6]");

    let errors = parse_errors("impl Obj {}");
    assert_eq!(errors, vec!["EMPTY_IMPL_BLOCK [Ln 1, Col 1]"]);

    let errors = parse_errors("impl Obj<> { const a := 1; }");
    assert_eq!(errors[0], "EMPTY_GENERIC_LIST [Ln 1, Col 10]");
}

// ── Import statements ──────────────────────────────────────────────────

#[test]
fn correct_imports() {
    let Stmt::Import(import) = single_stmt("import std") else { panic!() };
    let ImportTarget::Standard(name) = &import.target else { panic!() };
    assert_eq!(name.name, "std");
    assert!(import.alias.is_none());

    let Stmt::Import(import) = single_stmt("import array;") else { panic!() };
    let ImportTarget::Standard(name) = &import.target else { panic!() };
    assert_eq!(name.name, "array");

    let Stmt::Import(import) = single_stmt("import \"util/test.reef\" as test") else { panic!() };
    let ImportTarget::User(literal) = &import.target else { panic!() };
    assert_eq!(literal.value, "util/test.reef");
    assert_eq!(import.alias.as_ref().unwrap().name, "test");

    let Stmt::Import(import) = single_stmt("import hash as Hash") else { panic!() };
    let ImportTarget::Standard(name) = &import.target else { panic!() };
    assert_eq!(name.name, "hash");
    assert_eq!(import.alias.as_ref().unwrap().name, "Hash");
}

#[test]
fn malformed_imports() {
    let errors = parse_errors("import 1");
    assert_eq!(errors, vec!["UNEXPECTED_TOKEN [Ln 1, Col 8]"]);

    let errors = parse_errors("import \"some_file.reef\"");
    assert_eq!(errors, vec!["USER_IMPORT_MISSING_ALIAS [Ln 1, Col 1]"]);
}

// ── Match expressions ──────────────────────────────────────────────────

#[test]
fn correct_match_expressions() {
    struct Case {
        source: &'static str,
        scrutinee: &'static str,
        arms: &'static [(i64, u64)],
        otherwise: Option<i64>,
    }
    let cases = [
        Case {
            source: "match In { 1 => return 90u;, }",
            scrutinee: "In",
            arms: &[(1, 90)],
            otherwise: None,
        },
        Case {
            source: "match Out { 1 => return 90u;, 2 => return 0b1011u, };",
            scrutinee: "Out",
            arms: &[(1, 90), (2, 0b1011)],
            otherwise: None,
        },
        Case {
            source: "match Out { 1 => return 90u;, 2 => return 0b1011u, } else 5",
            scrutinee: "Out",
            arms: &[(1, 90), (2, 0b1011)],
            otherwise: Some(5),
        },
    ];

    for case in cases {
        let Expr::Match(m) = single_expr(case.source) else {
            panic!("expected match for {:?}", case.source);
        };
        expect_ident(&m.scrutinee, case.scrutinee);
        assert_eq!(m.arms.len(), case.arms.len());

        for (arm, (pattern, ret)) in m.arms.iter().zip(case.arms) {
            expect_int(&arm.pattern, *pattern);
            let Stmt::Jump(jump) = &arm.dispatch else { panic!() };
            expect_uint(jump.value.as_ref().unwrap(), *ret);
        }

        match case.otherwise {
            Some(v) => {
                let Stmt::Expr(es) = m.catch_all.as_ref().unwrap().as_ref() else { panic!() };
                expect_int(&es.expr, v);
            }
            None => assert!(m.catch_all.is_none()),
        }
    }
}

#[test]
fn malformed_match_expressions() {
    let errors = parse_errors("match Out { }");
    assert_eq!(errors, vec!["ARMLESS_MATCH_EXPR [Ln 1, Col 1]"]);

    let errors = parse_errors("match Out { a => 4, } else const b := 4");
    assert_eq!(errors[0], "ILLEGAL_MATCH_CATCH_ALL [Ln 1, Col 28]");

    let errors = parse_errors("match true { 1 => const a := 1, }");
    assert_eq!(
        errors,
        vec![
            "ILLEGAL_MATCH_ARM [Ln 1, Col 19]",
            "No prefix parse function for WALRUS found [Ln 1, Col 27]",
            "No prefix parse function for COMMA found [Ln 1, Col 31]",
            "No prefix parse function for RBRACE found [Ln 1, Col 33]",
        ]
    );

    let errors = parse_errors("match true { 1 => type a = Test, }");
    assert_eq!(errors[0], "ILLEGAL_MATCH_ARM [Ln 1, Col 19]");

    let errors = parse_errors("match true { 1 => impl Obj { const a := 1; }, }");
    assert_eq!(errors[0], "ILLEGAL_MATCH_ARM [Ln 1, Col 19]");

    let errors = parse_errors("match true { 1 => import std, }");
    assert_eq!(errors[0], "ILLEGAL_MATCH_ARM [Ln 1, Col 19]");
}

// ── Array expressions ──────────────────────────────────────────────────

#[test]
fn correct_array_literals() {
    let cases: [(&str, Option<u64>, &[i64]); 3] = [
        ("[1uz]{1,}", Some(1), &[1]),
        ("[0b11uz]{1, 2, 3, }", Some(3), &[1, 2, 3]),
        ("[_]{1, 2, }", None, &[1, 2]),
    ];

    for (source, size, items) in cases {
        let Expr::Array(array) = single_expr(source) else {
            panic!("expected array literal for {source:?}");
        };
        assert_eq!(array.inferred_size, size.is_none());
        if let Some(size) = size {
            assert_eq!(array.items.len() as u64, size);
        }
        assert_eq!(array.items.len(), items.len());
        for (item, expected) in array.items.iter().zip(items) {
            expect_int(item, *expected);
        }
    }
}

#[test]
fn correct_array_types() {
    struct Case {
        source: &'static str,
        dims: &'static [u64],
        array_nullable: bool,
        inner_nullable: bool,
    }
    let cases = [
        Case { source: "var a: [1uz]int;", dims: &[1], array_nullable: false, inner_nullable: false },
        Case {
            source: "var a: [1uz, 2uz]int;",
            dims: &[1, 2],
            array_nullable: false,
            inner_nullable: false,
        },
        Case {
            source: "var a: ?[1uz, 2uz]int;",
            dims: &[1, 2],
            array_nullable: true,
            inner_nullable: false,
        },
        Case {
            source: "var a: [1uz, 2uz]?int;",
            dims: &[1, 2],
            array_nullable: false,
            inner_nullable: true,
        },
        Case {
            source: "var a: ?[1uz, 2uz]?int;",
            dims: &[1, 2],
            array_nullable: true,
            inner_nullable: true,
        },
    ];

    for case in cases {
        let stmt = single_stmt(case.source);
        let decl = expect_decl(&stmt);
        let explicit = decl.ty.explicit().unwrap();
        assert_eq!(explicit.nullable, case.array_nullable, "{:?}", case.source);

        let ExplicitTypeForm::Array(array) = &explicit.form else {
            panic!("expected array type for {:?}", case.source);
        };
        let ArrayDims::Sizes(sizes) = &array.dims else { panic!() };
        assert_eq!(sizes.as_slice(), case.dims);
        assert_eq!(array.inner.is_nullable(), case.inner_nullable);
    }
}

#[test]
fn range_array_types() {
    let stmt = single_stmt("var a: [..]int;");
    let decl = expect_decl(&stmt);
    let ExplicitTypeForm::Array(array) = &decl.ty.explicit().unwrap().form else { panic!() };
    assert_eq!(array.dims, ArrayDims::Range { inclusive: false });

    let stmt = single_stmt("var a: [..=]int;");
    let decl = expect_decl(&stmt);
    let ExplicitTypeForm::Array(array) = &decl.ty.explicit().unwrap().form else { panic!() };
    assert_eq!(array.dims, ArrayDims::Range { inclusive: true });
}

#[test]
fn malformed_array_types() {
    let errors = parse_errors("var a: []int");
    assert_eq!(
        errors,
        vec![
            "MISSING_ARRAY_SIZE_TOKEN [Ln 1, Col 9]",
            "No prefix parse function for INT_TYPE found [Ln 1, Col 10]",
        ]
    );

    let errors = parse_errors("var a: [\"wrong\"]int");
    assert_eq!(errors[0], "UNEXPECTED_ARRAY_SIZE_TOKEN [Ln 1, Col 9]");

    let errors = parse_errors("var a: [0b11]int");
    assert_eq!(errors[0], "UNEXPECTED_ARRAY_SIZE_TOKEN [Ln 1, Col 9]");

    let errors = parse_errors("var a: [0uz]int");
    assert_eq!(
        errors,
        vec![
            "EMPTY_ARRAY [Ln 1, Col 9]",
            "No prefix parse function for RBRACKET found [Ln 1, Col 12]",
            "No prefix parse function for INT_TYPE found [Ln 1, Col 13]",
        ]
    );

    let errors = parse_errors("var a: [2uz, 0uz]int");
    assert_eq!(
        errors,
        vec![
            "EMPTY_ARRAY [Ln 1, Col 14]",
            "No prefix parse function for RBRACKET found [Ln 1, Col 17]",
            "No prefix parse function for INT_TYPE found [Ln 1, Col 18]",
        ]
    );
}

#[test]
fn malformed_array_literals() {
    let errors = parse_errors("[]{1, 2, 3, }");
    assert_eq!(errors[0], "MISSING_ARRAY_SIZE_TOKEN [Ln 1, Col 2]");

    let errors = parse_errors("[\"wrong\"]{1, 2, 3, }");
    assert_eq!(errors[0], "UNEXPECTED_ARRAY_SIZE_TOKEN [Ln 1, Col 2]");

    let errors = parse_errors("[0b11]{1, 2, 3, }");
    assert_eq!(errors[0], "UNEXPECTED_ARRAY_SIZE_TOKEN [Ln 1, Col 2]");

    let errors = parse_errors("[23uz]{1, 2, 3, }");
    assert_eq!(errors, vec!["INCORRECT_EXPLICIT_ARRAY_SIZE [Ln 1, Col 1]"]);

    for source in ["[0uz]{}", "[_]{}"] {
        let errors = parse_errors(source);
        assert_eq!(errors, vec!["EMPTY_ARRAY [Ln 1, Col 1]"], "for {source:?}");
    }
}

// ── Discard statements ─────────────────────────────────────────────────

#[test]
fn correct_discards() {
    let Stmt::Discard(discard) = single_stmt("_ = 90") else { panic!() };
    expect_int(&discard.value, 90);
}

#[test]
fn incorrect_discards() {
    let errors = parse_errors("_ = const a := 2");
    assert_eq!(
        errors,
        vec![
            "No prefix parse function for CONST found [Ln 1, Col 5]",
            "No prefix parse function for WALRUS found [Ln 1, Col 13]",
        ]
    );
}

// ── Loops ──────────────────────────────────────────────────────────────

#[test]
fn for_loop_iterable_only() {
    let Expr::For(for_loop) = single_expr("for (1) {1}") else { panic!() };
    assert_eq!(for_loop.iterables.len(), 1);
    assert!(for_loop.captures.is_empty());
    assert_eq!(for_loop.block.statements.len(), 1);
    assert!(for_loop.non_break.is_none());
    expect_int(&for_loop.iterables[0], 1);
}

#[test]
fn for_loop_with_captures() {
    let Expr::For(for_loop) = single_expr("for (1) : (name) {1}") else { panic!() };
    assert_eq!(for_loop.captures.len(), 1);
    assert!(!for_loop.captures[0].is_ref);
    expect_ident(&for_loop.captures[0].value, "name");

    // `_` discards a capture slot.
    let Expr::For(for_loop) = single_expr("for (1, 2) : (name, _) {1}") else { panic!() };
    assert_eq!(for_loop.iterables.len(), 2);
    assert_eq!(for_loop.captures.len(), 2);
    expect_ident(&for_loop.captures[1].value, "_");
}

#[test]
fn full_for_loops() {
    let Expr::For(for_loop) = single_expr("for (1, 2) : (name, word) {1} else {1}") else {
        panic!()
    };
    assert_eq!(for_loop.iterables.len(), 2);
    assert_eq!(for_loop.captures.len(), 2);
    let Stmt::Block(non_break) = for_loop.non_break.as_ref().unwrap().as_ref() else { panic!() };
    assert_eq!(non_break.statements.len(), 1);

    let Expr::For(for_loop) = single_expr("for (1, 2) : (name, word) {1} else 1") else { panic!() };
    let Stmt::Expr(non_break) = for_loop.non_break.as_ref().unwrap().as_ref() else { panic!() };
    expect_int(&non_break.expr, 1);
}

#[test]
fn for_loop_capture_refs() {
    let Expr::For(for_loop) = single_expr("for (1, 2, 3) : (name, ref hey, word) {1}") else {
        panic!()
    };
    let refs: Vec<bool> = for_loop.captures.iter().map(|c| c.is_ref).collect();
    assert_eq!(refs, vec![false, true, false]);
    expect_ident(&for_loop.captures[1].value, "hey");
}

#[test]
fn malformed_for_loops() {
    let errors = parse_errors("for () {}");
    assert_eq!(errors, vec!["FOR_MISSING_ITERABLES [Ln 1, Col 1]"]);

    let errors = parse_errors("for (1) : () {}");
    assert_eq!(errors, vec!["FOR_ITERABLE_CAPTURE_MISMATCH [Ln 1, Col 1]"]);

    let errors = parse_errors("for (1) {}");
    assert_eq!(errors, vec!["EMPTY_FOR_LOOP [Ln 1, Col 1]"]);

    let errors = parse_errors("for (1) : (1) {1} else const a := 2;");
    assert_eq!(errors, vec!["ILLEGAL_LOOP_NON_BREAK [Ln 1, Col 24]"]);
}

#[test]
fn while_loop_condition_only() {
    let Expr::While(while_loop) = single_expr("while (1) {1}") else { panic!() };
    assert!(while_loop.continuation.is_none());
    assert_eq!(while_loop.block.statements.len(), 1);
    assert!(while_loop.non_break.is_none());
    expect_int(&while_loop.condition, 1);
}

#[test]
fn while_loop_with_continuation() {
    let Expr::While(while_loop) = single_expr("while (1) : (1) {1}") else { panic!() };
    expect_int(while_loop.continuation.as_ref().unwrap(), 1);
}

#[test]
fn full_while_loops() {
    let Expr::While(while_loop) = single_expr("while (1) : (1) {1} else {1}") else { panic!() };
    let Stmt::Block(non_break) = while_loop.non_break.as_ref().unwrap().as_ref() else { panic!() };
    assert_eq!(non_break.statements.len(), 1);

    let Expr::While(while_loop) = single_expr("while (1) : (1) {1} else 1u") else { panic!() };
    let Stmt::Expr(non_break) = while_loop.non_break.as_ref().unwrap().as_ref() else { panic!() };
    expect_uint(&non_break.expr, 1);
}

#[test]
fn malformed_while_loops() {
    let errors = parse_errors("while () {}");
    assert_eq!(errors, vec!["WHILE_MISSING_CONDITION [Ln 1, Col 8]"]);

    let errors = parse_errors("while (1) : () {}");
    assert_eq!(errors, vec!["IMPROPER_WHILE_CONTINUATION [Ln 1, Col 14]"]);

    let errors = parse_errors("while (1) {}");
    assert_eq!(errors, vec!["EMPTY_WHILE_LOOP [Ln 1, Col 1]"]);

    let errors = parse_errors("while (1) : (1) {1} else const a := 2;");
    assert_eq!(errors, vec!["ILLEGAL_LOOP_NON_BREAK [Ln 1, Col 26]"]);
}

#[test]
fn do_while_loops() {
    let Expr::DoWhile(do_while) = single_expr("do {1} while (1)") else { panic!() };
    assert_eq!(do_while.block.statements.len(), 1);
    expect_int(&do_while.condition, 1);
}

#[test]
fn malformed_do_while_loops() {
    let errors = parse_errors("do {1} while ()");
    assert_eq!(errors, vec!["WHILE_MISSING_CONDITION [Ln 1, Col 15]"]);

    let errors = parse_errors("do {} while (1)");
    assert_eq!(
        errors,
        vec![
            "EMPTY_WHILE_LOOP [Ln 1, Col 1]",
            "Expected token LBRACE, found END [Ln 1, Col 16]",
        ]
    );
}

#[test]
fn raw_loops() {
    let Expr::Loop(raw_loop) = single_expr("loop {1}") else { panic!() };
    assert_eq!(raw_loop.block.statements.len(), 1);

    let errors = parse_errors("loop {}");
    assert_eq!(errors, vec!["EMPTY_LOOP [Ln 1, Col 1]"]);
}

// ── Generics ───────────────────────────────────────────────────────────

#[test]
fn function_definition_generics() {
    let Expr::Function(function) = single_expr("fn<T, B>(a: int): int {}") else { panic!() };
    let names: Vec<&str> = function.generics.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["T", "B"]);
}

#[test]
fn function_type_generics() {
    let stmt = single_stmt("var a: fn<T>(b: int): Result<int>;");
    let decl = expect_decl(&stmt);
    let ExplicitTypeForm::Function(fn_type) = &decl.ty.explicit().unwrap().form else { panic!() };
    assert_eq!(fn_type.generics[0].name, "T");

    let ExplicitTypeForm::Named(ret) = &fn_type.return_type.explicit().unwrap().form else {
        panic!()
    };
    assert_eq!(ret.name.name, "Result");
    assert_eq!(ret.generics[0].name, "int");
    assert_eq!(ret.generics[0].token.kind, TokenKind::IntType);
}

#[test]
fn function_generics_in_type_decls() {
    let Stmt::TypeDecl(td) = single_stmt("type F = fn<T, B>(a: int): int") else { panic!() };
    let TypeDeclValue::Type(ty) = &td.value else { unreachable!() };
    let ExplicitTypeForm::Function(fn_type) = &ty.explicit().unwrap().form else { panic!() };
    let names: Vec<&str> = fn_type.generics.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["T", "B"]);
}

#[test]
fn struct_generics() {
    let Expr::Struct(s) = single_expr("struct<T, E>{a: int, }") else { panic!() };
    let names: Vec<&str> = s.generics.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["T", "E"]);
}

#[test]
fn call_generics() {
    let Expr::Call(call) = single_expr("func(1, 2) with <int>") else { panic!() };
    assert_eq!(call.generics.len(), 1);
    assert_eq!(call.generics[0].name, "int");
    assert_eq!(call.generics[0].token.kind, TokenKind::IntType);
}

#[test]
fn malformed_generics() {
    let errors = parse_errors("struct<1>{a: int,}");
    assert_eq!(errors[0], "ILLEGAL_IDENTIFIER [Ln 1, Col 8]");

    let errors = parse_errors("struct<>{a: int,}");
    assert_eq!(errors[0], "EMPTY_GENERIC_LIST [Ln 1, Col 8]");

    let errors = parse_errors("var a: fn<>(a: int): int");
    assert_eq!(errors[0], "EMPTY_GENERIC_LIST [Ln 1, Col 11]");

    // Missing `with` leaves `<` to parse as a comparison.
    let errors = parse_errors("func(1, 2) <int>");
    assert_eq!(
        errors,
        vec![
            "No prefix parse function for INT_TYPE found [Ln 1, Col 13]",
            "No prefix parse function for GT found [Ln 1, Col 16]",
        ]
    );

    let errors = parse_errors("func(1, 2) with <>");
    assert_eq!(errors, vec!["EMPTY_GENERIC_LIST [Ln 1, Col 18]"]);

    let errors = parse_errors("func(1, 2) with <int, \"2\" + 2>");
    assert_eq!(
        errors,
        vec![
            "ILLEGAL_IDENTIFIER [Ln 1, Col 23]",
            "No prefix parse function for PLUS found [Ln 1, Col 27]",
            "INFIX_MISSING_RHS [Ln 1, Col 30]",
        ]
    );
}
