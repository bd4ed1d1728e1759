//! Type inference.
//!
//! Syntax-directed: every expression form has one rule, and the result is
//! memoized per node in the [`TypeTable`], so asking twice never reports
//! twice. Inference walks the same scopes the symbol table builder opened,
//! picking them up from the scope map, and fills in the types of bindings
//! that were declared without an annotation.

use super::exhaustiveness;
use super::resolve::{instantiate_member, MethodSignature};
use super::scope::{ScopeId, SymbolKind};
use super::substitution::TypeSubstitution;
use super::traits::MethodResolution;
use super::types::Type;
use super::{FnContext, TypeChecker};
use crate::ast::*;
use crate::diagnostics::{concurrency, traits as trait_codes, types as codes};
use crate::diagnostics::{Diagnostic, Note, Span, Suggestion};
use std::collections::HashMap;

/// Inferred type of every expression and block, keyed by node
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: HashMap<NodeId, Type>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&Type> {
        self.types.get(&id)
    }

    pub fn insert(&mut self, id: NodeId, ty: Type) {
        self.types.insert(id, ty);
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.types.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Type)> {
        self.types.iter().map(|(id, ty)| (*id, ty))
    }
}

/// Return type of the methods every collection, string and value carries
fn builtin_method(receiver: &Type, method: &str) -> Option<Type> {
    let is_container = receiver.element_type().is_some();
    match method {
        "toString" => Some(Type::string()),
        "len" | "length" | "size" if is_container => Some(Type::int()),
        "isEmpty" | "contains" if is_container => Some(Type::bool()),
        "push" | "append" | "clear" if is_container => Some(Type::void()),
        "get" if is_container => receiver.index_type().map(Type::optional),
        _ => None,
    }
}

impl TypeChecker {
    /// Infer the type of `expr` evaluated in `scope`
    pub fn infer_expr(&mut self, expr: &Expr, scope: ScopeId) -> Type {
        if let Some(ty) = self.types.get(expr.id()) {
            return ty.clone();
        }
        let ty = self.infer_uncached(expr, scope);
        self.types.insert(expr.id(), ty.clone());
        ty
    }

    fn infer_uncached(&mut self, expr: &Expr, scope: ScopeId) -> Type {
        match expr {
            Expr::Literal { value, .. } => match value {
                Literal::Int(_) => Type::int(),
                Literal::Float(_) => Type::float(),
                Literal::String(_) => Type::string(),
                Literal::Char(_) => Type::char(),
                Literal::Bool(_) => Type::bool(),
                Literal::None => Type::optional(Type::void()),
            },

            Expr::Ident { name, span, .. } => self.infer_ident(name, span, scope),

            Expr::Binary {
                op,
                left,
                right,
                span,
                ..
            } => {
                let left = self.infer_expr(left, scope);
                let right = self.infer_expr(right, scope);
                self.infer_binary(*op, &left, &right, span)
            }

            Expr::Unary { op, expr, span, .. } => {
                let operand = self.infer_expr(expr, scope);
                self.infer_unary(*op, &operand, span)
            }

            Expr::Call {
                callee, args, span, ..
            } => self.infer_call(callee, args, span, scope),

            Expr::MethodCall {
                receiver,
                qualifier,
                method,
                args,
                span,
                ..
            } => self.infer_method_call(receiver, qualifier.as_deref(), method, args, span, scope),

            Expr::FieldAccess {
                expr, field, span, ..
            } => {
                let receiver = self.infer_expr(expr, scope);
                self.infer_field(&receiver, field, span)
            }

            Expr::Index {
                expr, index, span, ..
            } => {
                let container = self.infer_expr(expr, scope);
                self.infer_expr(index, scope);
                if container.is_any() {
                    return Type::any();
                }
                match container.index_type() {
                    Some(ty) => ty,
                    None => {
                        self.diagnostics.push(
                            Diagnostic::error(codes::NOT_INDEXABLE)
                                .message(format!("Type `{}` cannot be indexed", container))
                                .span(span.clone())
                                .build(),
                        );
                        Type::any()
                    }
                }
            }

            Expr::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                self.expect_condition(cond, scope);
                let then_ty = self.infer_block(then_branch, scope);
                let Some(else_branch) = else_branch else {
                    return then_ty;
                };
                let else_ty = self.infer_expr(else_branch, scope);
                // No union types: branches that disagree type as Void
                if then_ty.is_any() {
                    else_ty
                } else if else_ty.is_any() || then_ty.compatible(&else_ty) {
                    then_ty
                } else {
                    Type::void()
                }
            }

            Expr::Match {
                scrutinee,
                arms,
                span,
                ..
            } => {
                let scrutinee_ty = self.infer_expr(scrutinee, scope);
                let mut arm_types = Vec::with_capacity(arms.len());
                for arm in arms {
                    let arm_scope = self.table.scope_for(arm.id, scope);
                    self.bind_pattern(&arm.pattern, &scrutinee_ty, arm_scope);
                    if let Some(guard) = &arm.guard {
                        self.expect_condition(guard, arm_scope);
                    }
                    arm_types.push(self.infer_expr(&arm.body, arm_scope));
                }
                exhaustiveness::check_match(
                    &scrutinee_ty,
                    arms,
                    &self.table.decls,
                    span,
                    &mut self.diagnostics,
                );
                // The first arm decides; the arms are not unified
                arm_types.into_iter().next().unwrap_or_else(Type::void)
            }

            Expr::Block { block, .. } => self.infer_block(block, scope),

            Expr::Lambda {
                id,
                params,
                is_async,
                body,
                ..
            } => {
                let lambda_scope = self.table.scope_for(*id, scope);
                let saved = self.async_depth;
                // A sync lambda runs where it is written
                if *is_async {
                    self.async_depth += 1;
                }
                self.fn_stack.push(FnContext {
                    name: "<lambda>".to_string(),
                    ret: None,
                    is_async: *is_async,
                });
                let ret = self.infer_block(body, lambda_scope);
                self.fn_stack.pop();
                self.async_depth = saved;

                // Unannotated parameters are not inferred from call sites
                let params = params
                    .iter()
                    .map(|p| self.table.annotation(p.id).cloned().unwrap_or_else(Type::void))
                    .collect();
                Type::function(params, ret)
            }

            Expr::While { cond, body, .. } => {
                self.expect_condition(cond, scope);
                self.infer_block(body, scope);
                Type::void()
            }

            Expr::For {
                id,
                pattern,
                iterable,
                body,
                span,
            } => {
                let iterable_ty = self.infer_expr(iterable, scope);
                let element = match iterable_ty.element_type() {
                    Some(element) => element,
                    None => {
                        self.diagnostics.push(
                            Diagnostic::error(codes::NOT_ITERABLE)
                                .message(format!("Type `{}` is not iterable", iterable_ty))
                                .span(span.clone())
                                .build(),
                        );
                        Type::any()
                    }
                };
                let loop_scope = self.table.scope_for(*id, scope);
                self.bind_pattern(pattern, &element, loop_scope);
                self.infer_block(body, loop_scope);
                Type::void()
            }

            Expr::Break { .. } | Expr::Continue { .. } => Type::any(),

            Expr::Return { value, span, .. } => {
                let actual = match value {
                    Some(value) => self.infer_expr(value, scope),
                    None => Type::void(),
                };
                self.check_return(&actual, span);
                Type::any()
            }

            Expr::Assign {
                target,
                value,
                span,
                ..
            } => self.check_assignment(target, value, span, scope),

            Expr::ArrayLit { elements, .. } => {
                let mut element_ty: Option<Type> = None;
                for element in elements {
                    let ty = self.infer_expr(element, scope);
                    match &element_ty {
                        None if !ty.is_any() => element_ty = Some(ty),
                        Some(expected) if !expected.compatible(&ty) => {
                            self.diagnostics.push(
                                Diagnostic::error(codes::TYPE_MISMATCH)
                                    .message(format!(
                                        "Array elements must share one type: expected `{}`, found `{}`",
                                        expected, ty
                                    ))
                                    .span(element.span().clone())
                                    .build(),
                            );
                        }
                        _ => {}
                    }
                }
                let element_ty = element_ty.unwrap_or_else(|| {
                    if elements.is_empty() {
                        Type::void()
                    } else {
                        Type::any()
                    }
                });
                Type::array(element_ty)
            }

            Expr::TupleLit { elements, .. } => {
                Type::Tuple(elements.iter().map(|e| self.infer_expr(e, scope)).collect())
            }

            Expr::StructLit {
                name, fields, span, ..
            } => self.infer_struct_lit(name, fields, span, scope),

            Expr::Try {
                body,
                catches,
                finally,
                ..
            } => {
                let ty = self.infer_block(body, scope);
                for catch in catches {
                    let catch_scope = self.table.scope_for(catch.id, scope);
                    self.infer_block(&catch.body, catch_scope);
                }
                if let Some(finally) = finally {
                    self.infer_block(finally, scope);
                }
                ty
            }

            Expr::Throw { expr, .. } => {
                self.infer_expr(expr, scope);
                Type::any()
            }

            Expr::Await { expr, span, .. } => {
                self.require_async(concurrency::AWAIT_OUTSIDE_ASYNC, "`await`", span);
                let awaited = self.infer_expr(expr, scope);
                match awaited {
                    Type::Generic { base, mut args } if base == "Future" && args.len() == 1 => {
                        args.remove(0)
                    }
                    // Anything else awaits to itself
                    other => other,
                }
            }

            Expr::Concurrent { id, bindings, span } => {
                self.require_async(concurrency::CONCURRENT_OUTSIDE_ASYNC, "`concurrent`", span);
                let inner = self.table.scope_for(*id, scope);
                let mut seen: Vec<&str> = Vec::new();
                for binding in bindings {
                    let ty = self.infer_expr(&binding.value, scope);
                    if seen.contains(&binding.name.as_str()) {
                        self.diagnostics.push(
                            Diagnostic::error(concurrency::DUPLICATE_CONCURRENT_BINDING)
                                .message(format!(
                                    "`{}` is bound more than once in this `concurrent` block",
                                    binding.name
                                ))
                                .span(binding.span.clone())
                                .build(),
                        );
                        continue;
                    }
                    seen.push(&binding.name);
                    self.table.scopes.resolve_type(inner, &binding.name, ty);
                }
                Type::void()
            }

            Expr::Race { body, span, .. } => {
                self.require_async(concurrency::RACE_OUTSIDE_ASYNC, "`race`", span);
                self.infer_block(body, scope)
            }

            Expr::Timeout {
                duration, body, span, ..
            } => {
                self.require_async(concurrency::TIMEOUT_OUTSIDE_ASYNC, "`timeout`", span);
                let duration_ty = self.infer_expr(duration, scope);
                if !duration_ty.is_any() && !duration_ty.is_numeric() {
                    self.diagnostics.push(
                        Diagnostic::error(concurrency::NON_NUMERIC_TIMEOUT)
                            .message(format!(
                                "Timeout duration must be numeric, found `{}`",
                                duration_ty
                            ))
                            .span(duration.span().clone())
                            .build(),
                    );
                }
                // The body may not finish in time
                Type::optional(self.infer_block(body, scope))
            }
        }
    }

    /// Infer a block in the scope the builder opened for it. The type is the
    /// trailing expression's, `Any` when the block ends by diverging, and
    /// `Void` otherwise.
    pub fn infer_block(&mut self, block: &Block, parent: ScopeId) -> Type {
        if let Some(ty) = self.types.get(block.id) {
            return ty.clone();
        }
        let mut scope = self.table.scope_for(block.id, parent);
        for stmt in &block.stmts {
            scope = self.infer_stmt(stmt, scope);
        }
        let ty = match &block.expr {
            Some(expr) => self.infer_expr(expr, scope),
            None => match block.stmts.last() {
                Some(Stmt::Expr(ExprStmt {
                    expr: Expr::Return { .. } | Expr::Throw { .. },
                    ..
                })) => Type::any(),
                _ => Type::void(),
            },
        };
        self.types.insert(block.id, ty.clone());
        ty
    }

    /// Infer a statement; returns the scope the rest of the block runs in
    fn infer_stmt(&mut self, stmt: &Stmt, scope: ScopeId) -> ScopeId {
        match stmt {
            Stmt::Let(stmt) => {
                let let_scope = self.table.scope_for(stmt.id, scope);
                self.infer_let(stmt, scope, let_scope);
                let_scope
            }
            Stmt::Expr(stmt) => {
                self.infer_expr(&stmt.expr, scope);
                match &stmt.expr {
                    Expr::Concurrent { id, .. } => self.table.scope_for(*id, scope),
                    _ => scope,
                }
            }
        }
    }

    /// Infer a `let` value in `scope` and type its bindings in `binding_scope`
    pub(super) fn infer_let(&mut self, stmt: &LetStmt, scope: ScopeId, binding_scope: ScopeId) {
        let value = self.infer_expr(&stmt.value, scope);
        let bound = match self.table.annotation(stmt.id).cloned() {
            Some(declared) => {
                if !declared.accepts(&value) {
                    self.diagnostics.push(
                        Diagnostic::error(codes::TYPE_MISMATCH)
                            .message(format!(
                                "Expected `{}` but the value has type `{}`",
                                declared, value
                            ))
                            .span(stmt.value.span().clone())
                            .build(),
                    );
                }
                declared
            }
            None => value,
        };
        self.bind_pattern(&stmt.pattern, &bound, binding_scope);
    }

    fn expect_condition(&mut self, cond: &Expr, scope: ScopeId) {
        let ty = self.infer_expr(cond, scope);
        if !ty.is_any() && !ty.is_bool() {
            self.diagnostics.push(
                Diagnostic::error(codes::NON_BOOL_CONDITION)
                    .message(format!("Condition must be `Bool`, found `{}`", ty))
                    .span(cond.span().clone())
                    .build(),
            );
        }
    }

    fn infer_ident(&mut self, name: &str, span: &Span, scope: ScopeId) -> Type {
        match self.table.scopes.lookup(scope, name) {
            Some(symbol) => symbol.ty(),
            None => {
                self.diagnostics.push(
                    Diagnostic::error(codes::UNRESOLVED_IDENTIFIER)
                        .message(format!("Unresolved identifier `{}`", name))
                        .span(span.clone())
                        .build(),
                );
                Type::any()
            }
        }
    }

    fn infer_binary(&mut self, op: BinaryOp, left: &Type, right: &Type, span: &Span) -> Type {
        use BinaryOp::*;
        let either_any = left.is_any() || right.is_any();
        match op {
            Add | Sub | Mul | Div | Mod | Pow => {
                if left.is_numeric() && right.is_numeric() {
                    if left.is_float() || right.is_float() {
                        Type::float()
                    } else {
                        Type::int()
                    }
                } else if either_any {
                    Type::any()
                } else {
                    let code = codes::ARITHMETIC_OPERANDS;
                    self.operand_error(code, op, left, right, span, "numeric");
                    Type::any()
                }
            }
            BitAnd | BitOr | BitXor | Shl | Shr => {
                let ok = |t: &Type| t.is_int() || t.is_any();
                if !(ok(left) && ok(right)) {
                    self.operand_error(codes::BITWISE_OPERANDS, op, left, right, span, "`Int`");
                }
                Type::int()
            }
            Eq | Ne | Lt | Le | Gt | Ge => {
                // Permissive unless strict comparisons are enabled
                if self.options.strict_comparisons && !left.compatible(right) {
                    self.diagnostics.push(
                        Diagnostic::error(codes::COMPARISON_OPERANDS)
                            .message(format!(
                                "Cannot compare `{}` with `{}` using `{}`",
                                left,
                                right,
                                op.symbol()
                            ))
                            .span(span.clone())
                            .build(),
                    );
                }
                Type::bool()
            }
            And | Or => {
                let ok = |t: &Type| t.is_bool() || t.is_any();
                if !(ok(left) && ok(right)) {
                    self.operand_error(codes::LOGICAL_OPERANDS, op, left, right, span, "`Bool`");
                }
                Type::bool()
            }
        }
    }

    fn operand_error(
        &mut self,
        code: &str,
        op: BinaryOp,
        left: &Type,
        right: &Type,
        span: &Span,
        wanted: &str,
    ) {
        self.diagnostics.push(
            Diagnostic::error(code)
                .message(format!(
                    "Operator `{}` cannot be applied to `{}` and `{}`",
                    op.symbol(),
                    left,
                    right
                ))
                .span(span.clone())
                .note(Note::new(format!("both operands must be {}", wanted)))
                .build(),
        );
    }

    fn infer_unary(&mut self, op: UnaryOp, operand: &Type, span: &Span) -> Type {
        if operand.is_any() {
            return Type::any();
        }
        match op {
            UnaryOp::Neg if operand.is_numeric() => operand.clone(),
            UnaryOp::Not if operand.is_bool() => Type::bool(),
            UnaryOp::Neg | UnaryOp::Not => {
                let (symbol, wanted) = if op == UnaryOp::Neg {
                    ("-", "numeric")
                } else {
                    ("!", "`Bool`")
                };
                self.diagnostics.push(
                    Diagnostic::error(codes::UNARY_OPERAND)
                        .message(format!(
                            "Operator `{}` expects a {} operand, found `{}`",
                            symbol, wanted, operand
                        ))
                        .span(span.clone())
                        .build(),
                );
                Type::any()
            }
            UnaryOp::Unwrap => match operand.optional_inner() {
                Some(inner) => inner.clone(),
                None => {
                    self.diagnostics.push(
                        Diagnostic::error(codes::UNWRAP_NON_OPTIONAL)
                            .message(format!("Cannot unwrap non-optional type `{}`", operand))
                            .span(span.clone())
                            .build(),
                    );
                    operand.clone()
                }
            },
            UnaryOp::ForceUnwrap => match operand.optional_inner() {
                Some(inner) => inner.clone(),
                None => {
                    self.diagnostics.push(
                        Diagnostic::warning(codes::FORCE_UNWRAP_NON_OPTIONAL)
                            .message(format!("Force-unwrapping non-optional type `{}`", operand))
                            .span(span.clone())
                            .suggestion(Suggestion::new("Remove the `!!`"))
                            .build(),
                    );
                    operand.clone()
                }
            },
        }
    }

    fn infer_call(&mut self, callee: &Expr, args: &[Expr], span: &Span, scope: ScopeId) -> Type {
        let arg_types: Vec<Type> = args.iter().map(|a| self.infer_expr(a, scope)).collect();

        let Expr::Ident { name, .. } = callee else {
            let callee_ty = self.infer_expr(callee, scope);
            return match callee_ty {
                Type::Function { ret, .. } => *ret,
                ty if ty.is_any() => ty,
                ty => {
                    self.not_callable(&ty, span);
                    Type::any()
                }
            };
        };

        let global = self.table.scopes.global();
        let Some((owner, symbol)) = self.table.scopes.lookup_with_scope(scope, name) else {
            // Reported once through the callee
            self.infer_expr(callee, scope);
            return Type::any();
        };
        let symbol = symbol.clone();
        self.types.insert(callee.id(), symbol.ty());

        // Intrinsics first, with their fixed return types
        if owner == global && symbol.origin.is_none() {
            if let Some(ret) = self.table.intrinsics.get(name) {
                return ret.clone();
            }
        }

        match (symbol.kind, symbol.ty()) {
            (SymbolKind::Function, Type::Function { params, ret }) => {
                let type_params = symbol
                    .origin
                    .and_then(|origin| self.table.functions.get(&origin))
                    .map(|sig| sig.type_params.clone())
                    .unwrap_or_default();
                self.apply_signature(name, &params, &ret, &type_params, &arg_types, args, span)
            }
            (SymbolKind::Struct | SymbolKind::Spark, ty) => ty,
            (_, Type::Function { ret, .. }) => *ret,
            (_, ty) if ty.is_any() => ty,
            (_, ty) => {
                self.not_callable(&ty, span);
                Type::any()
            }
        }
    }

    fn not_callable(&mut self, ty: &Type, span: &Span) {
        self.diagnostics.push(
            Diagnostic::error(codes::NOT_CALLABLE)
                .message(format!("Type `{}` is not callable", ty))
                .span(span.clone())
                .build(),
        );
    }

    /// Check a call against a signature and instantiate its return type
    #[allow(clippy::too_many_arguments)]
    fn apply_signature(
        &mut self,
        name: &str,
        params: &[Type],
        ret: &Type,
        type_params: &[Type],
        arg_types: &[Type],
        args: &[Expr],
        span: &Span,
    ) -> Type {
        if params.len() != arg_types.len() {
            self.diagnostics.push(
                Diagnostic::error(codes::WRONG_ARGUMENT_COUNT)
                    .message(format!(
                        "`{}` expects {} argument(s), found {}",
                        name,
                        params.len(),
                        arg_types.len()
                    ))
                    .span(span.clone())
                    .build(),
            );
        }

        let mut subst = TypeSubstitution::new();
        for (param, arg) in params.iter().zip(arg_types) {
            subst.bind(param, arg);
        }

        for (index, ((param, arg), expr)) in params.iter().zip(arg_types).zip(args).enumerate() {
            let expected = subst.apply(param);
            if !expected.has_type_parameters() && !expected.accepts(arg) {
                self.diagnostics.push(
                    Diagnostic::error(codes::TYPE_MISMATCH)
                        .message(format!(
                            "Argument {} of `{}` expects `{}`, found `{}`",
                            index + 1,
                            name,
                            expected,
                            arg
                        ))
                        .span(expr.span().clone())
                        .build(),
                );
            }
        }

        for param in type_params {
            let Type::TypeParameter { name: param_name, bounds } = param else {
                continue;
            };
            match subst.get(param_name).cloned() {
                Some(bound_to) => {
                    for bound in bounds {
                        if !self.traits.implements(&bound_to, bound) {
                            self.diagnostics.push(
                                Diagnostic::error(trait_codes::UNSATISFIED_BOUND)
                                    .message(format!(
                                        "`{}` does not implement `{}`, required by `{}: {}` in `{}`",
                                        bound_to, bound, param_name, bound, name
                                    ))
                                    .span(span.clone())
                                    .build(),
                            );
                        }
                    }
                }
                // Parameters the arguments do not determine stay unknown
                None => subst.insert(param_name.clone(), Type::any()),
            }
        }

        subst.apply(ret)
    }

    fn apply_method(
        &mut self,
        sig: &MethodSignature,
        arg_types: &[Type],
        args: &[Expr],
        span: &Span,
    ) -> Type {
        self.apply_signature(
            &sig.name,
            &sig.param_types(),
            &sig.return_type(),
            &sig.type_params,
            arg_types,
            args,
            span,
        )
    }

    fn infer_method_call(
        &mut self,
        receiver: &Expr,
        qualifier: Option<&str>,
        method: &str,
        args: &[Expr],
        span: &Span,
        scope: ScopeId,
    ) -> Type {
        let receiver_ty = self.infer_expr(receiver, scope);
        let arg_types: Vec<Type> = args.iter().map(|a| self.infer_expr(a, scope)).collect();

        if let Some(trait_name) = qualifier {
            return match self
                .traits
                .resolve_qualified(&receiver_ty, trait_name, method, span, &mut self.diagnostics)
            {
                Some(sig) => self.apply_method(&sig, &arg_types, args, span),
                None => Type::any(),
            };
        }

        if receiver_ty.is_any() {
            return Type::any();
        }

        // Methods declared in a class body
        let class_method = receiver_ty.nominal_name().and_then(|name| {
            let info = self.table.decls.get(name)?;
            let sig = info.methods.get(method)?;
            Some(MethodSignature {
                params: sig
                    .params
                    .iter()
                    .map(|(n, ty)| (n.clone(), instantiate_member(info, &receiver_ty, ty)))
                    .collect(),
                ret: sig.ret.as_ref().map(|ret| instantiate_member(info, &receiver_ty, ret)),
                ..sig.clone()
            })
        });
        if let Some(sig) = class_method {
            return self.apply_method(&sig, &arg_types, args, span);
        }

        match self.traits.resolve_method(&receiver_ty, method) {
            MethodResolution::Inherent(sig) | MethodResolution::Trait { signature: sig, .. } => {
                return self.apply_method(&sig, &arg_types, args, span);
            }
            MethodResolution::Ambiguous(candidates) => {
                let first = candidates.first().cloned().unwrap_or_default();
                self.diagnostics.push(
                    Diagnostic::error(trait_codes::AMBIGUOUS_METHOD)
                        .message(format!(
                            "ambiguous method `{}` on `{}`; candidates: {}",
                            method,
                            receiver_ty,
                            candidates.join(", ")
                        ))
                        .span(span.clone())
                        .suggestion(Suggestion::new(format!(
                            "Qualify the call, e.g. `{}::{}`",
                            first, method
                        )))
                        .build(),
                );
                return Type::any();
            }
            MethodResolution::Unresolved => {}
        }

        if let Some(ty) = builtin_method(&receiver_ty, method) {
            return ty;
        }

        self.diagnostics.push(
            Diagnostic::error(codes::UNRESOLVED_METHOD)
                .message(format!("No method `{}` on type `{}`", method, receiver_ty))
                .span(span.clone())
                .build(),
        );
        Type::any()
    }

    fn infer_field(&mut self, receiver: &Type, field: &str, span: &Span) -> Type {
        if receiver.is_any() {
            return Type::any();
        }
        if let (Type::Tuple(elements), Ok(index)) = (receiver, field.parse::<usize>()) {
            if let Some(element) = elements.get(index) {
                return element.clone();
            }
        }
        if let Some(ty) = self.table.decls.field_of(receiver, field) {
            return ty;
        }
        self.diagnostics.push(
            Diagnostic::error(codes::UNKNOWN_FIELD)
                .message(format!("Type `{}` has no field `{}`", receiver, field))
                .span(span.clone())
                .build(),
        );
        Type::any()
    }

    fn infer_struct_lit(
        &mut self,
        name: &str,
        fields: &[FieldInit],
        span: &Span,
        scope: ScopeId,
    ) -> Type {
        let values: Vec<Type> = fields.iter().map(|f| self.infer_expr(&f.value, scope)).collect();

        let found = self.table.decls.get(name);
        let (declared, result): (Vec<(String, Type)>, Type) = if let Some(info) = found {
            (
                info.fields.iter().map(|f| (f.name.clone(), f.ty.clone())).collect(),
                info.self_type(),
            )
        } else if let Some(variant) = self.table.decls.variant(name) {
            let parent = self
                .table
                .decls
                .get(&variant.parent)
                .map(|info| info.self_type())
                .unwrap_or_else(|| Type::named(variant.parent.clone()));
            (
                variant.fields.iter().map(|f| (f.name.clone(), f.ty.clone())).collect(),
                parent,
            )
        } else {
            self.diagnostics.push(
                Diagnostic::error(codes::UNKNOWN_TYPE)
                    .message(format!("Unknown type `{}`", name))
                    .span(span.clone())
                    .build(),
            );
            return Type::any();
        };

        for (init, value) in fields.iter().zip(&values) {
            match declared.iter().find(|(n, _)| *n == init.name) {
                Some((_, expected)) => {
                    if !expected.has_type_parameters() && !expected.accepts(value) {
                        self.diagnostics.push(
                            Diagnostic::error(codes::TYPE_MISMATCH)
                                .message(format!(
                                    "Field `{}` of `{}` expects `{}`, found `{}`",
                                    init.name, name, expected, value
                                ))
                                .span(init.span.clone())
                                .build(),
                        );
                    }
                }
                None => {
                    self.diagnostics.push(
                        Diagnostic::error(codes::UNKNOWN_FIELD)
                            .message(format!("`{}` has no field `{}`", name, init.name))
                            .span(init.span.clone())
                            .build(),
                    );
                }
            }
        }
        result
    }

    /// Field types a struct or variant pattern destructures, in order
    fn pattern_fields(&self, name: &str, scrutinee: &Type) -> Option<Vec<(String, Type)>> {
        let decls = &self.table.decls;
        if let Some(variant) = decls.variant(name) {
            let parent = decls.get(&variant.parent);
            return Some(
                variant
                    .fields
                    .iter()
                    .map(|f| {
                        let ty = match parent {
                            Some(info) => instantiate_member(info, scrutinee, &f.ty),
                            None => f.ty.clone(),
                        };
                        (f.name.clone(), ty)
                    })
                    .collect(),
            );
        }
        let info = decls.get(name)?;
        Some(
            info.fields
                .iter()
                .map(|f| (f.name.clone(), instantiate_member(info, scrutinee, &f.ty)))
                .collect(),
        )
    }

    /// Give the bindings of `pattern` (already defined in `scope`) the types
    /// they take from a value of type `ty`
    pub(super) fn bind_pattern(&mut self, pattern: &Pattern, ty: &Type, scope: ScopeId) {
        match pattern {
            Pattern::Variable { name, .. } => {
                self.table.scopes.resolve_type(scope, name, ty.clone());
            }
            Pattern::Tuple { elements, .. } => match ty {
                Type::Tuple(types) if types.len() == elements.len() => {
                    for (element, ty) in elements.iter().zip(types) {
                        self.bind_pattern(element, ty, scope);
                    }
                }
                _ => {
                    for element in elements {
                        self.bind_pattern(element, &Type::any(), scope);
                    }
                }
            },
            Pattern::Array { elements, rest, .. } => {
                let element_ty = ty.element_type().unwrap_or_else(Type::any);
                for element in elements {
                    self.bind_pattern(element, &element_ty, scope);
                }
                if let Some(rest) = rest {
                    self.table.scopes.resolve_type(scope, rest, Type::array(element_ty));
                }
            }
            Pattern::Struct { name, fields, .. } => {
                let declared = self.pattern_fields(name, ty).unwrap_or_default();
                for field in fields {
                    let field_ty = declared
                        .iter()
                        .find(|(n, _)| *n == field.name)
                        .map(|(_, t)| t.clone())
                        .unwrap_or_else(Type::any);
                    match &field.pattern {
                        Some(inner) => self.bind_pattern(inner, &field_ty, scope),
                        None => self.table.scopes.resolve_type(scope, &field.name, field_ty),
                    }
                }
            }
            Pattern::TupleStruct { name, elements, .. } => {
                let declared = self.pattern_fields(name, ty).unwrap_or_default();
                for (index, element) in elements.iter().enumerate() {
                    let element_ty = declared
                        .get(index)
                        .map(|(_, t)| t.clone())
                        .unwrap_or_else(Type::any);
                    self.bind_pattern(element, &element_ty, scope);
                }
            }
            // Names on both sides keep the left side's type
            Pattern::Or { left, right, .. } => {
                self.bind_pattern(left, ty, scope);
                self.bind_pattern(right, ty, scope);
            }
            Pattern::Typed { .. }
            | Pattern::Literal { .. }
            | Pattern::Wildcard { .. }
            | Pattern::Range { .. } => {}
        }
    }
}
