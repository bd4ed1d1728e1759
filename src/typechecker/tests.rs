use super::*;
use crate::ast::build::*;
use crate::config::AnalyzerConfig;
use crate::diagnostics::{concurrency, patterns, symbols as symbol_codes, traits as trait_codes};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn run(decls: Vec<Decl>) -> Analysis {
    analyze(&unit(decls), &AnalyzerConfig::default())
}

fn run_with(decls: Vec<Decl>, config: &AnalyzerConfig) -> Analysis {
    analyze(&unit(decls), config)
}

fn codes_of(analysis: &Analysis) -> Vec<&str> {
    analysis
        .diagnostics
        .diagnostics()
        .iter()
        .map(|d| d.code.as_str())
        .collect()
}

fn top_let(name: &str, value: Expr) -> Decl {
    Decl::Let(let_decl(var_pat(name), None, false, value))
}

fn top_expr(expr: Expr) -> Decl {
    Decl::Expr(ExprStmt {
        id: NodeId::new(),
        span: Span::default(),
        expr,
    })
}

/// Infer a single expression inside a sync function body
fn infer_in_fn(expr: Expr) -> (Type, Analysis) {
    let id = expr.id();
    let analysis = run(vec![Decl::Function(function("main", vec![], None, expr_block(expr)))]);
    let ty = analysis.type_of(id).cloned().unwrap_or_else(Type::void);
    (ty, analysis)
}

fn add(left: Expr, right: Expr) -> Expr {
    binary(BinaryOp::Add, left, right)
}

// End to end

#[test]
fn test_let_sum_infers_int() {
    let analysis = run(vec![top_let("x", add(int(1), int(2)))]);
    assert!(analysis.diagnostics.is_empty(), "{:?}", codes_of(&analysis));
    assert_eq!(analysis.lookup_global("x").unwrap().ty(), Type::int());
    assert!(analysis.can_generate());
}

#[test]
fn test_return_type_mismatch_names_both_types() {
    let analysis = run(vec![Decl::Function(function(
        "f",
        vec![],
        Some(ty("Int")),
        expr_block(string("s")),
    ))]);
    assert_eq!(codes_of(&analysis), vec![codes::RETURN_TYPE_MISMATCH]);
    let message = &analysis.diagnostics.diagnostics()[0].message;
    assert!(message.contains("Int") && message.contains("String"), "{message}");
    assert!(!analysis.can_generate());
}

#[test]
fn test_await_inside_async_calling_sync_function() {
    let g = async_function("g", vec![], Some(ty("Int")), expr_block(await_expr(call("h", vec![]))));
    let h = function("h", vec![], Some(ty("Int")), expr_block(int(1)));
    let analysis = run(vec![Decl::Function(g), Decl::Function(h)]);
    assert!(analysis.diagnostics.is_empty(), "{:?}", codes_of(&analysis));
}

// Scoping

#[test]
fn test_forward_references_in_either_order() {
    let a = || function("a", vec![], Some(ty("Int")), expr_block(call("b", vec![])));
    let b = || function("b", vec![], Some(ty("Int")), expr_block(call("a", vec![])));
    for decls in [
        vec![Decl::Function(a()), Decl::Function(b())],
        vec![Decl::Function(b()), Decl::Function(a())],
    ] {
        let analysis = run(decls);
        assert!(analysis.diagnostics.is_empty(), "{:?}", codes_of(&analysis));
    }
}

#[test]
fn test_shadowing_hides_without_deleting() {
    let inner = block(vec![let_stmt("x", string("s"))], None);
    let inner_id = inner.id;
    let trailing = ident("x");
    let trailing_id = trailing.id();
    let f = function(
        "f",
        vec![],
        Some(ty("Int")),
        block(
            vec![let_stmt("x", int(1)), expr_stmt(block_expr(inner))],
            Some(trailing),
        ),
    );
    let analysis = run(vec![Decl::Function(f)]);

    assert!(analysis.diagnostics.is_empty(), "{:?}", codes_of(&analysis));
    assert_eq!(analysis.type_of(trailing_id), Some(&Type::int()));
    let inner_scope = analysis.scope_of(inner_id).unwrap();
    assert!(analysis.symbols.scopes.lookup_local(inner_scope, "x").is_none());
    assert!(analysis.lookup_global("x").is_none());
}

#[test]
fn test_unresolved_identifier_does_not_cascade() {
    let (ty, analysis) = infer_in_fn(add(ident("missing"), int(1)));
    assert_eq!(codes_of(&analysis), vec![codes::UNRESOLVED_IDENTIFIER]);
    assert!(ty.is_any());
}

#[test]
fn test_region_bindings_stay_inside_their_region() {
    let regions = [
        (
            "lambda parameter",
            let_stmt("f", lambda(&["a"], false, expr_block(ident("a")))),
            "a",
        ),
        (
            "match arm",
            expr_stmt(match_expr(int(1), vec![arm(var_pat("n"), ident("n"))])),
            "n",
        ),
        (
            "catch clause",
            expr_stmt(try_catch(block(vec![], None), "err", None, expr_block(ident("err")))),
            "err",
        ),
        (
            "for loop",
            expr_stmt(for_loop(var_pat("item"), array(vec![int(1)]), block(vec![], None))),
            "item",
        ),
    ];
    for (region, stmt, name) in regions {
        let outside = ident(name);
        let outside_id = outside.id();
        let (_, analysis) = infer_in_fn(block_expr(block(vec![stmt], Some(outside))));
        assert_eq!(
            codes_of(&analysis),
            vec![codes::UNRESOLVED_IDENTIFIER],
            "{region}"
        );
        let diag = &analysis.diagnostics.diagnostics()[0];
        assert!(diag.message.contains(&format!("`{name}`")), "{region}: {}", diag.message);
        assert!(analysis.type_of(outside_id).is_some_and(Type::is_any), "{region}");
    }
}

// Operators

#[test]
fn test_numeric_promotion() {
    assert_eq!(infer_in_fn(add(int(1), int(2))).0, Type::int());
    assert_eq!(infer_in_fn(add(int(1), float(2.0))).0, Type::float());
    assert_eq!(infer_in_fn(add(float(2.0), int(1))).0, Type::float());
}

#[test]
fn test_arithmetic_on_string_names_both_operands() {
    let (_, analysis) = infer_in_fn(add(string("a"), int(1)));
    assert_eq!(codes_of(&analysis), vec![codes::ARITHMETIC_OPERANDS]);
    let message = &analysis.diagnostics.diagnostics()[0].message;
    assert!(message.contains("`String`") && message.contains("`Int`"), "{message}");
}

proptest! {
    #[test]
    fn prop_promotion_is_float_iff_either_side_is(
        left_float in any::<bool>(),
        right_float in any::<bool>(),
        a in -1000i64..1000,
        b in -1000i64..1000,
    ) {
        let operand = |is_float: bool, v: i64| if is_float { float(v as f64) } else { int(v) };
        let ops = [
            BinaryOp::Add,
            BinaryOp::Sub,
            BinaryOp::Mul,
            BinaryOp::Div,
            BinaryOp::Mod,
            BinaryOp::Pow,
        ];
        for op in ops {
            let expr = binary(op, operand(left_float, a), operand(right_float, b));
            let (ty, analysis) = infer_in_fn(expr);
            prop_assert!(analysis.diagnostics.is_empty());
            let expected = if left_float || right_float { Type::float() } else { Type::int() };
            prop_assert_eq!(ty, expected);
        }
    }
}

#[test]
fn test_bitwise_and_logical_operands() {
    let (ty, analysis) = infer_in_fn(binary(BinaryOp::BitAnd, int(1), float(1.0)));
    assert_eq!(ty, Type::int());
    assert_eq!(codes_of(&analysis), vec![codes::BITWISE_OPERANDS]);

    let (ty, analysis) = infer_in_fn(binary(BinaryOp::And, boolean(true), int(1)));
    assert_eq!(ty, Type::bool());
    assert_eq!(codes_of(&analysis), vec![codes::LOGICAL_OPERANDS]);
}

#[test]
fn test_comparisons_are_permissive_by_default() {
    let (ty, analysis) = infer_in_fn(binary(BinaryOp::Eq, string("a"), boolean(true)));
    assert_eq!(ty, Type::bool());
    assert!(analysis.diagnostics.is_empty());

    let mut config = AnalyzerConfig::default();
    config.analysis.strict_comparisons = true;
    let f = function(
        "main",
        vec![],
        None,
        expr_block(binary(BinaryOp::Eq, string("a"), boolean(true))),
    );
    let analysis = run_with(vec![Decl::Function(f)], &config);
    assert_eq!(codes_of(&analysis), vec![codes::COMPARISON_OPERANDS]);
}

#[test]
fn test_unary_operators() {
    assert_eq!(infer_in_fn(unary(UnaryOp::Neg, float(1.0))).0, Type::float());
    let (_, analysis) = infer_in_fn(unary(UnaryOp::Not, int(1)));
    assert_eq!(codes_of(&analysis), vec![codes::UNARY_OPERAND]);

    let (_, analysis) = infer_in_fn(unary(UnaryOp::Unwrap, int(1)));
    assert_eq!(codes_of(&analysis), vec![codes::UNWRAP_NON_OPTIONAL]);
    assert!(analysis.diagnostics.has_errors());

    let (ty, analysis) = infer_in_fn(unary(UnaryOp::ForceUnwrap, int(1)));
    assert_eq!(ty, Type::int());
    assert_eq!(codes_of(&analysis), vec![codes::FORCE_UNWRAP_NON_OPTIONAL]);
    assert!(!analysis.diagnostics.has_errors());
}

#[test]
fn test_none_and_unwrap() {
    let stmt = let_typed("maybe", optional_ty(ty("Int")), none());
    let unwrap = unary(UnaryOp::Unwrap, ident("maybe"));
    let unwrap_id = unwrap.id();
    let f = function("main", vec![], None, block(vec![stmt], Some(unwrap)));
    let analysis = run(vec![Decl::Function(f)]);
    assert!(analysis.diagnostics.is_empty(), "{:?}", codes_of(&analysis));
    assert_eq!(analysis.type_of(unwrap_id), Some(&Type::int()));
}

// Control forms

#[test]
fn test_if_condition_and_branch_types() {
    let (_, analysis) = infer_in_fn(if_expr(int(1), expr_block(int(1)), None));
    assert_eq!(codes_of(&analysis), vec![codes::NON_BOOL_CONDITION]);

    let (ty, _) = infer_in_fn(if_expr(boolean(true), expr_block(int(1)), Some(int(2))));
    assert_eq!(ty, Type::int());

    // No union type: disagreeing branches fall back to Void
    let (ty, analysis) = infer_in_fn(if_expr(boolean(true), expr_block(int(1)), Some(string("s"))));
    assert_eq!(ty, Type::void());
    assert!(analysis.diagnostics.is_empty());
}

#[test]
fn test_match_takes_first_arm_type_and_checks_exhaustiveness() {
    let m = match_expr(
        int(1),
        vec![
            arm(lit_pat(Literal::Int(1)), string("one")),
            arm(lit_pat(Literal::Int(2)), int(2)),
        ],
    );
    let (ty, analysis) = infer_in_fn(m);
    assert_eq!(ty, Type::string());
    assert_eq!(codes_of(&analysis), vec![patterns::NON_EXHAUSTIVE_MATCH]);
    assert!(analysis.can_generate(), "warnings never block generation");
}

#[test]
fn test_or_pattern_sides_must_bind_the_same_names() {
    let body = ident("n");
    let body_id = body.id();
    let m = match_expr(int(1), vec![arm(or_pat(lit_pat(Literal::Int(0)), var_pat("n")), body)]);
    let (_, analysis) = infer_in_fn(m);
    assert_eq!(codes_of(&analysis), vec![symbol_codes::OR_PATTERN_BINDING_MISMATCH]);
    let message = &analysis.diagnostics.diagnostics()[0].message;
    assert!(message.contains("`n`"), "{message}");
    assert_eq!(analysis.type_of(body_id), Some(&Type::int()));
    assert!(!analysis.can_generate());
}

#[test]
fn test_or_pattern_binding_the_same_names_on_both_sides() {
    let body = add(ident("n"), int(1));
    let body_id = body.id();
    let both = or_pat(
        tuple_pat(vec![lit_pat(Literal::Int(0)), var_pat("n")]),
        tuple_pat(vec![var_pat("n"), lit_pat(Literal::Int(0))]),
    );
    let m = match_expr(
        tuple(vec![int(1), int(2)]),
        vec![arm(both, body), arm(wildcard(), int(0))],
    );
    let (ty, analysis) = infer_in_fn(m);
    assert!(analysis.diagnostics.is_empty(), "{:?}", codes_of(&analysis));
    assert_eq!(analysis.type_of(body_id), Some(&Type::int()));
    assert_eq!(ty, Type::int());
}

#[test]
fn test_for_loop_binds_element_type() {
    let body = block(vec![], Some(add(ident("item"), float(1.0))));
    let sum_id = body.expr.as_ref().unwrap().id();
    let (_, analysis) = infer_in_fn(for_loop(var_pat("item"), array(vec![int(1), int(2)]), body));
    assert!(analysis.diagnostics.is_empty(), "{:?}", codes_of(&analysis));
    assert_eq!(analysis.type_of(sum_id), Some(&Type::float()));

    let (_, analysis) = infer_in_fn(for_loop(var_pat("item"), int(3), block(vec![], None)));
    assert_eq!(codes_of(&analysis), vec![codes::NOT_ITERABLE]);
}

#[test]
fn test_array_literals() {
    assert_eq!(infer_in_fn(array(vec![int(1), int(2)])).0, Type::array(Type::int()));
    assert_eq!(infer_in_fn(array(vec![])).0, Type::array(Type::void()));
    let (_, analysis) = infer_in_fn(array(vec![int(1), string("s")]));
    assert_eq!(codes_of(&analysis), vec![codes::TYPE_MISMATCH]);
}

#[test]
fn test_index_and_tuple_fields() {
    assert_eq!(infer_in_fn(Expr::Index {
        id: NodeId::new(),
        span: Span::default(),
        expr: Box::new(array(vec![string("a")])),
        index: Box::new(int(0)),
    })
    .0, Type::string());
    let (_, analysis) = infer_in_fn(Expr::Index {
        id: NodeId::new(),
        span: Span::default(),
        expr: Box::new(int(1)),
        index: Box::new(int(0)),
    });
    assert_eq!(codes_of(&analysis), vec![codes::NOT_INDEXABLE]);

    assert_eq!(infer_in_fn(field(tuple(vec![int(1), string("s")]), "1")).0, Type::string());
}

#[test]
fn test_lambda_synthesizes_function_type() {
    let (ty, analysis) = infer_in_fn(lambda(&["x"], false, expr_block(int(1))));
    assert!(analysis.diagnostics.is_empty());
    assert_eq!(ty.to_string(), "(Void) -> Int");
}

// Calls and generics

#[test]
fn test_call_argument_checks() {
    let f = || function("f", vec![param("a", ty("Int"))], Some(ty("Int")), expr_block(ident("a")));
    let main = |args: Vec<Expr>| function("main", vec![], None, expr_block(call("f", args)));

    let analysis = run(vec![Decl::Function(f()), Decl::Function(main(vec![int(1), int(2)]))]);
    assert_eq!(codes_of(&analysis), vec![codes::WRONG_ARGUMENT_COUNT]);

    let analysis = run(vec![Decl::Function(f()), Decl::Function(main(vec![string("s")]))]);
    assert_eq!(codes_of(&analysis), vec![codes::TYPE_MISMATCH]);
}

#[test]
fn test_generic_call_substitutes_return_type() {
    let identity = FunctionDecl {
        type_params: vec![type_param("T", &[])],
        ..function("identity", vec![param("x", ty("T"))], Some(ty("T")), expr_block(ident("x")))
    };
    let call_expr = call("identity", vec![string("s")]);
    let call_id = call_expr.id();
    let main = function("main", vec![], None, expr_block(call_expr));
    let analysis = run(vec![Decl::Function(identity), Decl::Function(main)]);

    assert!(analysis.diagnostics.is_empty(), "{:?}", codes_of(&analysis));
    assert_eq!(analysis.type_of(call_id), Some(&Type::string()));
}

fn display_program(with_impl: bool) -> Vec<Decl> {
    let show = FunctionDecl {
        type_params: vec![type_param("T", &["Display"])],
        ..function(
            "show",
            vec![param("x", ty("T"))],
            Some(ty("String")),
            expr_block(method_call(ident("x"), "display", vec![])),
        )
    };
    let mut decls = vec![
        Decl::Trait(trait_decl("Display", vec![method_sig("display", vec![], Some(ty("String")))])),
        Decl::Function(show),
        Decl::Function(function("main", vec![], None, expr_block(call("show", vec![int(1)])))),
    ];
    if with_impl {
        decls.push(Decl::Impl(impl_trait(
            "Display",
            ty("Int"),
            vec![function("display", vec![], Some(ty("String")), expr_block(string("1")))],
        )));
    }
    decls
}

#[test]
fn test_trait_bounds_on_generic_calls() {
    let analysis = run(display_program(false));
    assert_eq!(codes_of(&analysis), vec![trait_codes::UNSATISFIED_BOUND]);

    let analysis = run(display_program(true));
    assert!(analysis.diagnostics.is_empty(), "{:?}", codes_of(&analysis));
}

#[test]
fn test_intrinsics_and_configured_intrinsics() {
    assert_eq!(infer_in_fn(call("println", vec![string("hi")])).0, Type::void());
    assert_eq!(infer_in_fn(call("readLine", vec![])).0, Type::string());

    let mut config = AnalyzerConfig::default();
    config.intrinsics.insert("now".to_string(), "Float".to_string());
    let call_expr = call("now", vec![]);
    let call_id = call_expr.id();
    let analysis = run_with(
        vec![Decl::Function(function("main", vec![], None, expr_block(call_expr)))],
        &config,
    );
    assert!(analysis.diagnostics.is_empty());
    assert_eq!(analysis.type_of(call_id), Some(&Type::float()));
}

// Members and dispatch

fn circle_class() -> Decl {
    let area = function(
        "area",
        vec![],
        Some(ty("Float")),
        expr_block(binary(BinaryOp::Mul, ident("radius"), field(ident("self"), "radius"))),
    );
    Decl::Class(class("Circle", vec![field_decl("radius", ty("Float"))], vec![area]))
}

#[test]
fn test_class_fields_and_methods() {
    let make = || struct_lit("Circle", vec![("radius", float(2.0))]);
    let area = method_call(make(), "area", vec![]);
    let area_id = area.id();
    let main = function(
        "main",
        vec![],
        None,
        block(
            vec![
                expr_stmt(area),
                expr_stmt(field(make(), "diameter")),
                expr_stmt(method_call(make(), "grow", vec![])),
            ],
            None,
        ),
    );
    let analysis = run(vec![circle_class(), Decl::Function(main)]);

    assert_eq!(analysis.type_of(area_id), Some(&Type::float()));
    assert_eq!(codes_of(&analysis), vec![codes::UNKNOWN_FIELD, codes::UNRESOLVED_METHOD]);
}

#[test]
fn test_struct_literal_checks() {
    let point = Decl::Struct(struct_decl("Point", vec![field_decl("x", ty("Int"))]));
    let main = function(
        "main",
        vec![],
        None,
        block(
            vec![
                expr_stmt(struct_lit("Point", vec![("x", string("s"))])),
                expr_stmt(struct_lit("Point", vec![("y", int(1))])),
                expr_stmt(struct_lit("Nowhere", vec![])),
            ],
            None,
        ),
    );
    let analysis = run(vec![point, Decl::Function(main)]);
    assert_eq!(
        codes_of(&analysis),
        vec![codes::TYPE_MISMATCH, codes::UNKNOWN_FIELD, codes::UNKNOWN_TYPE]
    );
}

fn area_traits() -> Vec<Decl> {
    let area_sig = || method_sig("area", vec![], Some(ty("Float")));
    let area_fn = || function("area", vec![], Some(ty("Float")), expr_block(float(1.0)));
    vec![
        Decl::Struct(struct_decl("Square", vec![])),
        Decl::Trait(trait_decl("Shape", vec![area_sig()])),
        Decl::Trait(trait_decl("Plot", vec![area_sig()])),
        Decl::Impl(impl_trait("Shape", ty("Square"), vec![area_fn()])),
        Decl::Impl(impl_trait("Plot", ty("Square"), vec![area_fn()])),
    ]
}

#[test]
fn test_ambiguous_dispatch_is_reported() {
    let mut decls = area_traits();
    let call_expr = method_call(struct_lit("Square", vec![]), "area", vec![]);
    decls.push(Decl::Function(function("main", vec![], None, expr_block(call_expr))));
    let analysis = run(decls);

    assert_eq!(codes_of(&analysis), vec![trait_codes::AMBIGUOUS_METHOD]);
    let message = &analysis.diagnostics.diagnostics()[0].message;
    assert!(message.contains("Plot") && message.contains("Shape"), "{message}");
}

#[test]
fn test_qualified_dispatch_resolves_ambiguity() {
    let mut decls = area_traits();
    let call_expr = qualified_call(struct_lit("Square", vec![]), "Shape", "area", vec![]);
    let call_id = call_expr.id();
    decls.push(Decl::Function(function("main", vec![], None, expr_block(call_expr))));
    let analysis = run(decls);

    assert!(analysis.diagnostics.is_empty(), "{:?}", codes_of(&analysis));
    assert_eq!(analysis.type_of(call_id), Some(&Type::float()));
}

#[test]
fn test_missing_impl_method_is_reported_once() {
    let decls = vec![
        Decl::Struct(struct_decl("Square", vec![])),
        Decl::Trait(trait_decl(
            "Shape",
            vec![
                method_sig("area", vec![], Some(ty("Float"))),
                method_sig("name", vec![], Some(ty("String"))),
            ],
        )),
        Decl::Impl(impl_trait(
            "Shape",
            ty("Square"),
            vec![function("area", vec![], Some(ty("Float")), expr_block(float(1.0)))],
        )),
    ];
    let analysis = run(decls);
    assert_eq!(codes_of(&analysis), vec![trait_codes::MISSING_METHOD]);
    assert!(analysis.diagnostics.diagnostics()[0].message.contains("`name`"));
}

// Data types

fn shape_data() -> Decl {
    Decl::Data(data(
        "Shape",
        vec![
            variant("Circle", vec![field_decl("radius", ty("Float"))]),
            variant("Empty", vec![]),
        ],
    ))
}

#[test]
fn test_data_constructor_and_covering_match() {
    let m = match_expr(
        ident("s"),
        vec![
            arm(variant_pat("Circle", vec![var_pat("r")]), ident("r")),
            arm(var_pat("Empty"), float(0.0)),
        ],
    );
    let size = function("size", vec![param("s", ty("Shape"))], Some(ty("Float")), expr_block(m));
    let ctor = call("Circle", vec![float(1.0)]);
    let ctor_id = ctor.id();
    let main = function("main", vec![], None, expr_block(ctor));
    let analysis = run(vec![shape_data(), Decl::Function(size), Decl::Function(main)]);

    assert!(analysis.diagnostics.is_empty(), "{:?}", codes_of(&analysis));
    assert_eq!(analysis.type_of(ctor_id), Some(&Type::named("Shape")));
}

#[test]
fn test_match_missing_variant_warns() {
    let m = match_expr(
        ident("s"),
        vec![arm(variant_pat("Circle", vec![var_pat("r")]), ident("r"))],
    );
    let size = function("size", vec![param("s", ty("Shape"))], Some(ty("Float")), expr_block(m));
    let analysis = run(vec![shape_data(), Decl::Function(size)]);
    assert_eq!(codes_of(&analysis), vec![patterns::NON_EXHAUSTIVE_MATCH]);
    assert!(analysis.diagnostics.diagnostics()[0].message.contains("`Empty`"));
}

// Concurrency

#[test]
fn test_await_outside_async_is_reported_once() {
    let (_, analysis) = infer_in_fn(await_expr(call("sleep", vec![int(1)])));
    assert_eq!(codes_of(&analysis), vec![concurrency::AWAIT_OUTSIDE_ASYNC]);
    let diag = &analysis.diagnostics.diagnostics()[0];
    assert_eq!(diag.suggestion().unwrap().title, "Add `async` to the enclosing function");
}

#[test]
fn test_concurrency_forms_need_async() {
    let forms = vec![
        (concurrent(vec![("a", int(1))]), concurrency::CONCURRENT_OUTSIDE_ASYNC),
        (race(expr_block(int(1))), concurrency::RACE_OUTSIDE_ASYNC),
        (timeout(int(5), expr_block(int(1))), concurrency::TIMEOUT_OUTSIDE_ASYNC),
    ];
    for (expr, code) in forms {
        let sync = function("f", vec![], None, block(vec![expr_stmt(expr.clone())], None));
        assert_eq!(codes_of(&run(vec![Decl::Function(sync)])), vec![code]);

        let asynchronous = async_function("f", vec![], None, block(vec![expr_stmt(expr)], None));
        assert!(run(vec![Decl::Function(asynchronous)]).diagnostics.is_empty());
    }
}

#[test]
fn test_concurrent_bindings_are_typed_and_visible() {
    let sum = add(ident("a"), ident("b"));
    let sum_id = sum.id();
    let f = async_function(
        "f",
        vec![],
        Some(ty("Float")),
        block(
            vec![expr_stmt(concurrent(vec![("a", int(1)), ("b", float(2.0))]))],
            Some(sum),
        ),
    );
    let analysis = run(vec![Decl::Function(f)]);
    assert!(analysis.diagnostics.is_empty(), "{:?}", codes_of(&analysis));
    assert_eq!(analysis.type_of(sum_id), Some(&Type::float()));
}

#[test]
fn test_concurrent_duplicates_and_timeout_duration() {
    let f = async_function(
        "f",
        vec![],
        None,
        block(
            vec![
                expr_stmt(concurrent(vec![("a", int(1)), ("a", int(2))])),
                expr_stmt(timeout(string("soon"), expr_block(int(1)))),
            ],
            None,
        ),
    );
    let analysis = run(vec![Decl::Function(f)]);
    assert_eq!(
        codes_of(&analysis),
        vec![
            concurrency::DUPLICATE_CONCURRENT_BINDING,
            concurrency::NON_NUMERIC_TIMEOUT
        ]
    );
}

#[test]
fn test_timeout_and_race_types() {
    let t = timeout(int(5), expr_block(int(1)));
    let r = race(expr_block(string("first")));
    let (t_id, r_id) = (t.id(), r.id());
    let f = async_function(
        "f",
        vec![],
        None,
        block(vec![expr_stmt(t), expr_stmt(r)], None),
    );
    let analysis = run(vec![Decl::Function(f)]);
    assert_eq!(analysis.type_of(t_id), Some(&Type::optional(Type::int())));
    assert_eq!(analysis.type_of(r_id), Some(&Type::string()));
}

#[test]
fn test_lambdas_and_async_context() {
    // An async lambda opens its own async context
    let sleep_once = expr_block(await_expr(call("sleep", vec![int(1)])));
    let inside_async_lambda = lambda(&[], true, sleep_once);
    assert!(infer_in_fn(inside_async_lambda).1.diagnostics.is_empty());

    // A sync lambda inherits the context it is written in
    let sync_lambda = || lambda(&[], false, expr_block(await_expr(call("sleep", vec![int(1)]))));
    let (_, analysis) = infer_in_fn(sync_lambda());
    assert_eq!(codes_of(&analysis), vec![concurrency::AWAIT_OUTSIDE_ASYNC]);
    let f = async_function("f", vec![], None, expr_block(sync_lambda()));
    assert!(run(vec![Decl::Function(f)]).diagnostics.is_empty());
}

#[test]
fn test_async_return_mismatch_is_a_warning_by_default() {
    let f = || {
        Decl::Function(async_function("f", vec![], Some(ty("Int")), expr_block(string("s"))))
    };
    let analysis = run(vec![f()]);
    assert_eq!(codes_of(&analysis), vec![codes::ASYNC_RETURN_TYPE_MISMATCH]);
    assert!(analysis.can_generate());

    let mut config = AnalyzerConfig::default();
    config.analysis.async_return_mismatch = crate::config::MismatchLevel::Error;
    let analysis = run_with(vec![f()], &config);
    assert_eq!(codes_of(&analysis), vec![codes::ASYNC_RETURN_TYPE_MISMATCH]);
    assert!(!analysis.can_generate());
}

// Statements

#[test]
fn test_return_statements() {
    let f = function(
        "f",
        vec![],
        Some(ty("Int")),
        block(vec![expr_stmt(ret(Some(string("s"))))], None),
    );
    let analysis = run(vec![Decl::Function(f)]);
    assert_eq!(codes_of(&analysis), vec![codes::RETURN_TYPE_MISMATCH]);

    let analysis = run(vec![top_expr(ret(Some(int(1))))]);
    assert_eq!(codes_of(&analysis), vec![codes::RETURN_OUTSIDE_FUNCTION]);
}

#[test]
fn test_let_annotations() {
    let f = function(
        "f",
        vec![],
        None,
        block(
            vec![
                let_typed("a", ty("Int"), string("s")),
                let_typed("b", optional_ty(ty("Int")), int(1)),
                let_typed("c", array_ty(ty("String")), array(vec![])),
            ],
            None,
        ),
    );
    let analysis = run(vec![Decl::Function(f)]);
    assert_eq!(codes_of(&analysis), vec![codes::TYPE_MISMATCH]);
}

#[test]
fn test_assignment_rules() {
    let assign_expr = assign(ident("m"), int(2));
    let assign_id = assign_expr.id();
    let f = function(
        "f",
        vec![],
        None,
        block(
            vec![
                let_stmt("x", int(1)),
                let_mut("m", int(1)),
                expr_stmt(assign(ident("x"), int(2))),
                expr_stmt(assign_expr),
                expr_stmt(assign(ident("m"), string("s"))),
                expr_stmt(assign(int(1), int(2))),
            ],
            None,
        ),
    );
    let analysis = run(vec![Decl::Function(f)]);
    assert_eq!(
        codes_of(&analysis),
        vec![
            codes::ASSIGN_TO_IMMUTABLE,
            codes::ASSIGNMENT_TYPE_MISMATCH,
            codes::INVALID_ASSIGNMENT_TARGET
        ]
    );
    // Assignment types as its value
    assert_eq!(analysis.type_of(assign_id), Some(&Type::int()));
}

#[test]
fn test_field_initializers_are_checked() {
    let mut count = field_decl("count", ty("Int"));
    count.initializer = Some(string("zero"));
    let analysis = run(vec![Decl::Class(class("Counter", vec![count], vec![]))]);
    assert_eq!(codes_of(&analysis), vec![codes::FIELD_INITIALIZER_MISMATCH]);
}

#[test]
fn test_global_let_visible_to_functions() {
    let f = function("f", vec![], Some(ty("String")), expr_block(ident("greeting")));
    let analysis = run(vec![Decl::Function(f), top_let("greeting", string("hi"))]);
    assert!(analysis.diagnostics.is_empty(), "{:?}", codes_of(&analysis));
}
