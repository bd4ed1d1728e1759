//! Constructor helpers for building trees in code
//!
//! The analyzer normally receives its AST from the parser as JSON. These
//! helpers keep hand-built trees (unit tests, embedders) short. Every node
//! gets a fresh [`NodeId`] and an unknown span.

use super::*;

// Type expressions

pub fn ty(name: &str) -> TypeExpr {
    TypeExpr::Named {
        span: Span::default(),
        name: name.to_string(),
        args: Vec::new(),
    }
}

pub fn generic_ty(name: &str, args: Vec<TypeExpr>) -> TypeExpr {
    TypeExpr::Named {
        span: Span::default(),
        name: name.to_string(),
        args,
    }
}

pub fn optional_ty(inner: TypeExpr) -> TypeExpr {
    TypeExpr::Optional {
        span: Span::default(),
        inner: Box::new(inner),
    }
}

pub fn array_ty(element: TypeExpr) -> TypeExpr {
    TypeExpr::Array {
        span: Span::default(),
        element: Box::new(element),
    }
}

// Expressions

pub fn int(value: i64) -> Expr {
    lit(Literal::Int(value))
}

pub fn float(value: f64) -> Expr {
    lit(Literal::Float(value))
}

pub fn string(value: &str) -> Expr {
    lit(Literal::String(value.to_string()))
}

pub fn boolean(value: bool) -> Expr {
    lit(Literal::Bool(value))
}

pub fn none() -> Expr {
    lit(Literal::None)
}

pub fn lit(value: Literal) -> Expr {
    Expr::Literal {
        id: NodeId::new(),
        span: Span::default(),
        value,
    }
}

pub fn ident(name: &str) -> Expr {
    Expr::Ident {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
    }
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        id: NodeId::new(),
        span: Span::default(),
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn unary(op: UnaryOp, expr: Expr) -> Expr {
    Expr::Unary {
        id: NodeId::new(),
        span: Span::default(),
        op,
        expr: Box::new(expr),
    }
}

pub fn call(callee: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {
        id: NodeId::new(),
        span: Span::default(),
        callee: Box::new(ident(callee)),
        args,
    }
}

pub fn method_call(receiver: Expr, method: &str, args: Vec<Expr>) -> Expr {
    Expr::MethodCall {
        id: NodeId::new(),
        span: Span::default(),
        receiver: Box::new(receiver),
        qualifier: None,
        method: method.to_string(),
        args,
    }
}

pub fn qualified_call(receiver: Expr, trait_name: &str, method: &str, args: Vec<Expr>) -> Expr {
    Expr::MethodCall {
        id: NodeId::new(),
        span: Span::default(),
        receiver: Box::new(receiver),
        qualifier: Some(trait_name.to_string()),
        method: method.to_string(),
        args,
    }
}

pub fn field(expr: Expr, name: &str) -> Expr {
    Expr::FieldAccess {
        id: NodeId::new(),
        span: Span::default(),
        expr: Box::new(expr),
        field: name.to_string(),
    }
}

pub fn if_expr(cond: Expr, then_branch: Block, else_branch: Option<Expr>) -> Expr {
    Expr::If {
        id: NodeId::new(),
        span: Span::default(),
        cond: Box::new(cond),
        then_branch: Box::new(then_branch),
        else_branch: else_branch.map(Box::new),
    }
}

pub fn match_expr(scrutinee: Expr, arms: Vec<MatchArm>) -> Expr {
    Expr::Match {
        id: NodeId::new(),
        span: Span::default(),
        scrutinee: Box::new(scrutinee),
        arms,
    }
}

pub fn arm(pattern: Pattern, body: Expr) -> MatchArm {
    MatchArm {
        id: NodeId::new(),
        span: Span::default(),
        pattern,
        guard: None,
        body,
    }
}

pub fn guarded_arm(pattern: Pattern, guard: Expr, body: Expr) -> MatchArm {
    MatchArm {
        guard: Some(guard),
        ..arm(pattern, body)
    }
}

pub fn block_expr(block: Block) -> Expr {
    Expr::Block {
        id: NodeId::new(),
        span: Span::default(),
        block: Box::new(block),
    }
}

pub fn lambda(params: &[&str], is_async: bool, body: Block) -> Expr {
    Expr::Lambda {
        id: NodeId::new(),
        span: Span::default(),
        params: params
            .iter()
            .map(|name| LambdaParam {
                id: NodeId::new(),
                span: Span::default(),
                name: name.to_string(),
                ty: None,
            })
            .collect(),
        is_async,
        body: Box::new(body),
    }
}

pub fn for_loop(pattern: Pattern, iterable: Expr, body: Block) -> Expr {
    Expr::For {
        id: NodeId::new(),
        span: Span::default(),
        pattern,
        iterable: Box::new(iterable),
        body: Box::new(body),
    }
}

pub fn while_loop(cond: Expr, body: Block) -> Expr {
    Expr::While {
        id: NodeId::new(),
        span: Span::default(),
        cond: Box::new(cond),
        body: Box::new(body),
    }
}

pub fn ret(value: Option<Expr>) -> Expr {
    Expr::Return {
        id: NodeId::new(),
        span: Span::default(),
        value: value.map(Box::new),
    }
}

pub fn assign(target: Expr, value: Expr) -> Expr {
    Expr::Assign {
        id: NodeId::new(),
        span: Span::default(),
        target: Box::new(target),
        value: Box::new(value),
    }
}

pub fn array(elements: Vec<Expr>) -> Expr {
    Expr::ArrayLit {
        id: NodeId::new(),
        span: Span::default(),
        elements,
    }
}

pub fn tuple(elements: Vec<Expr>) -> Expr {
    Expr::TupleLit {
        id: NodeId::new(),
        span: Span::default(),
        elements,
    }
}

pub fn struct_lit(name: &str, fields: Vec<(&str, Expr)>) -> Expr {
    Expr::StructLit {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
        fields: fields
            .into_iter()
            .map(|(name, value)| FieldInit {
                span: Span::default(),
                name: name.to_string(),
                value,
            })
            .collect(),
    }
}

pub fn try_catch(
    body: Block,
    catch_name: &str,
    catch_ty: Option<TypeExpr>,
    handler: Block,
) -> Expr {
    Expr::Try {
        id: NodeId::new(),
        span: Span::default(),
        body: Box::new(body),
        catches: vec![CatchClause {
            id: NodeId::new(),
            span: Span::default(),
            name: catch_name.to_string(),
            ty: catch_ty,
            body: handler,
        }],
        finally: None,
    }
}

pub fn await_expr(expr: Expr) -> Expr {
    Expr::Await {
        id: NodeId::new(),
        span: Span::default(),
        expr: Box::new(expr),
    }
}

pub fn concurrent(bindings: Vec<(&str, Expr)>) -> Expr {
    Expr::Concurrent {
        id: NodeId::new(),
        span: Span::default(),
        bindings: bindings
            .into_iter()
            .map(|(name, value)| ConcurrentBinding {
                id: NodeId::new(),
                span: Span::default(),
                name: name.to_string(),
                value,
            })
            .collect(),
    }
}

pub fn race(body: Block) -> Expr {
    Expr::Race {
        id: NodeId::new(),
        span: Span::default(),
        body: Box::new(body),
    }
}

pub fn timeout(duration: Expr, body: Block) -> Expr {
    Expr::Timeout {
        id: NodeId::new(),
        span: Span::default(),
        duration: Box::new(duration),
        body: Box::new(body),
    }
}

// Statements and blocks

pub fn let_stmt(name: &str, value: Expr) -> Stmt {
    Stmt::Let(let_decl(var_pat(name), None, false, value))
}

pub fn let_mut(name: &str, value: Expr) -> Stmt {
    Stmt::Let(let_decl(var_pat(name), None, true, value))
}

pub fn let_typed(name: &str, ty: TypeExpr, value: Expr) -> Stmt {
    Stmt::Let(let_decl(var_pat(name), Some(ty), false, value))
}

pub fn let_pattern(pattern: Pattern, value: Expr) -> Stmt {
    Stmt::Let(let_decl(pattern, None, false, value))
}

pub fn let_decl(pattern: Pattern, ty: Option<TypeExpr>, mutable: bool, value: Expr) -> LetStmt {
    LetStmt {
        id: NodeId::new(),
        span: Span::default(),
        pattern,
        ty,
        mutable,
        value,
    }
}

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(ExprStmt {
        id: NodeId::new(),
        span: Span::default(),
        expr,
    })
}

pub fn block(stmts: Vec<Stmt>, expr: Option<Expr>) -> Block {
    Block {
        id: NodeId::new(),
        span: Span::default(),
        stmts,
        expr: expr.map(Box::new),
    }
}

/// A block holding only a trailing expression
pub fn expr_block(expr: Expr) -> Block {
    block(Vec::new(), Some(expr))
}

// Patterns

pub fn var_pat(name: &str) -> Pattern {
    Pattern::Variable {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
    }
}

pub fn typed_pat(name: &str, ty: TypeExpr) -> Pattern {
    Pattern::Typed {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
        ty,
    }
}

pub fn wildcard() -> Pattern {
    Pattern::Wildcard {
        id: NodeId::new(),
        span: Span::default(),
    }
}

pub fn lit_pat(value: Literal) -> Pattern {
    Pattern::Literal {
        id: NodeId::new(),
        span: Span::default(),
        value,
    }
}

pub fn tuple_pat(elements: Vec<Pattern>) -> Pattern {
    Pattern::Tuple {
        id: NodeId::new(),
        span: Span::default(),
        elements,
    }
}

pub fn array_pat(elements: Vec<Pattern>, rest: Option<&str>) -> Pattern {
    Pattern::Array {
        id: NodeId::new(),
        span: Span::default(),
        elements,
        rest: rest.map(str::to_string),
    }
}

pub fn struct_pat(name: &str, fields: Vec<(&str, Option<Pattern>)>) -> Pattern {
    Pattern::Struct {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
        fields: fields
            .into_iter()
            .map(|(name, pattern)| FieldPattern {
                name: name.to_string(),
                pattern,
            })
            .collect(),
    }
}

pub fn variant_pat(name: &str, elements: Vec<Pattern>) -> Pattern {
    Pattern::TupleStruct {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
        elements,
    }
}

pub fn or_pat(left: Pattern, right: Pattern) -> Pattern {
    Pattern::Or {
        id: NodeId::new(),
        span: Span::default(),
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn range_pat(start: i64, end: i64, inclusive: bool) -> Pattern {
    Pattern::Range {
        id: NodeId::new(),
        span: Span::default(),
        start: Literal::Int(start),
        end: Literal::Int(end),
        inclusive,
    }
}

// Declarations

pub fn param(name: &str, ty: TypeExpr) -> Param {
    Param {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
        ty,
        mutable: false,
    }
}

pub fn function(
    name: &str,
    params: Vec<Param>,
    return_type: Option<TypeExpr>,
    body: Block,
) -> FunctionDecl {
    FunctionDecl {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
        type_params: Vec::new(),
        params,
        return_type,
        is_async: false,
        body,
    }
}

pub fn async_function(
    name: &str,
    params: Vec<Param>,
    return_type: Option<TypeExpr>,
    body: Block,
) -> FunctionDecl {
    FunctionDecl {
        is_async: true,
        ..function(name, params, return_type, body)
    }
}

pub fn type_param(name: &str, bounds: &[&str]) -> TypeParam {
    TypeParam {
        name: name.to_string(),
        bounds: bounds.iter().map(|b| b.to_string()).collect(),
    }
}

pub fn field_decl(name: &str, ty: TypeExpr) -> FieldDecl {
    FieldDecl {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
        ty,
        mutable: false,
        initializer: None,
    }
}

pub fn class(name: &str, fields: Vec<FieldDecl>, methods: Vec<FunctionDecl>) -> ClassDecl {
    ClassDecl {
        id: NodeId::new(),
        span: Span::default(),
        kind: ClassKind::Class,
        name: name.to_string(),
        type_params: Vec::new(),
        fields,
        methods,
    }
}

pub fn struct_decl(name: &str, fields: Vec<FieldDecl>) -> StructDecl {
    StructDecl {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
        type_params: Vec::new(),
        fields,
    }
}

pub fn variant(name: &str, fields: Vec<FieldDecl>) -> VariantDecl {
    VariantDecl {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
        fields,
    }
}

pub fn data(name: &str, variants: Vec<VariantDecl>) -> DataDecl {
    DataDecl {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
        type_params: Vec::new(),
        variants,
    }
}

pub fn method_sig(name: &str, params: Vec<Param>, return_type: Option<TypeExpr>) -> MethodSig {
    MethodSig {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
        type_params: Vec::new(),
        params,
        return_type,
        is_async: false,
    }
}

pub fn trait_decl(name: &str, methods: Vec<MethodSig>) -> TraitDecl {
    TraitDecl {
        id: NodeId::new(),
        span: Span::default(),
        name: name.to_string(),
        type_params: Vec::new(),
        methods,
    }
}

pub fn impl_trait(trait_name: &str, target: TypeExpr, methods: Vec<FunctionDecl>) -> ImplDecl {
    ImplDecl {
        id: NodeId::new(),
        span: Span::default(),
        trait_name: Some(trait_name.to_string()),
        trait_args: Vec::new(),
        type_params: Vec::new(),
        target,
        methods,
    }
}

pub fn inherent_impl(target: TypeExpr, methods: Vec<FunctionDecl>) -> ImplDecl {
    ImplDecl {
        trait_name: None,
        ..impl_trait("", target, methods)
    }
}

pub fn unit(decls: Vec<Decl>) -> CompilationUnit {
    CompilationUnit {
        id: NodeId::new(),
        span: Span::default(),
        name: "test".to_string(),
        decls,
    }
}
