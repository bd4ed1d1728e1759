//! Semantic analysis for Lumen
//!
//! Runs the passes over one compilation unit in order: symbol table
//! construction, trait registration (all traits, then all impls), then type
//! checking, which infers every expression while enforcing the validation
//! rules (return types, async context, assignment, exhaustiveness).
//! Every problem found becomes a diagnostic; analysis never stops early.

pub mod exhaustiveness;
pub mod infer;
pub mod resolve;
pub mod scope;
pub mod substitution;
pub mod symbols;
pub mod traits;
pub mod types;

#[cfg(test)]
mod tests;

pub use infer::TypeTable;
pub use resolve::{DeclKind, MethodSignature, TypeDecls};
pub use scope::{ScopeArena, ScopeError, ScopeId, ScopeKind, Symbol, SymbolKind};
pub use substitution::TypeSubstitution;
pub use symbols::{SymbolTable, SymbolTableBuilder};
pub use traits::{MethodResolution, TraitRegistry};
pub use types::{Primitive, Type};

use crate::ast::*;
use crate::config::{parse_type_name, AnalysisOptions, AnalyzerConfig, MismatchLevel};
use crate::diagnostics::types as codes;
use crate::diagnostics::{Diagnostic, DiagnosticBag, Note, Severity, Span, Suggestion};

/// The function or lambda whose body is being checked
#[derive(Debug, Clone)]
pub(crate) struct FnContext {
    pub name: String,
    /// Declared return type; `None` when unannotated
    pub ret: Option<Type>,
    pub is_async: bool,
}

/// Type checker over a built symbol table
pub struct TypeChecker {
    options: AnalysisOptions,
    table: SymbolTable,
    traits: TraitRegistry,
    types: TypeTable,
    diagnostics: DiagnosticBag,
    /// Number of enclosing async functions or lambdas
    async_depth: usize,
    fn_stack: Vec<FnContext>,
}

impl TypeChecker {
    pub fn new(
        table: SymbolTable,
        traits: TraitRegistry,
        diagnostics: DiagnosticBag,
        options: AnalysisOptions,
    ) -> Self {
        Self {
            options,
            table,
            traits,
            types: TypeTable::new(),
            diagnostics,
            async_depth: 0,
            fn_stack: Vec::new(),
        }
    }

    pub fn in_async_context(&self) -> bool {
        self.async_depth > 0
    }

    /// Check a compilation unit. Script-level statements run first, in
    /// order, so declarations see the types of global bindings.
    pub fn check_unit(&mut self, unit: &CompilationUnit) {
        let global = self.table.scopes.global();
        for decl in &unit.decls {
            match decl {
                Decl::Let(stmt) => self.infer_let(stmt, global, global),
                Decl::Expr(stmt) => {
                    self.infer_expr(&stmt.expr, global);
                }
                _ => {}
            }
        }

        for decl in &unit.decls {
            match decl {
                Decl::Function(f) => self.check_function(f, global),
                Decl::Class(c) => {
                    let class_scope = self.table.scope_for(c.id, global);
                    self.check_field_initializers(&c.name, &c.fields, class_scope);
                    for method in &c.methods {
                        self.check_function(method, class_scope);
                    }
                }
                Decl::Struct(s) | Decl::Spark(s) => {
                    self.check_field_initializers(&s.name, &s.fields, global)
                }
                Decl::Impl(imp) => {
                    for method in &imp.methods {
                        self.check_function(method, global);
                    }
                }
                Decl::Data(_)
                | Decl::Trait(_)
                | Decl::Interface(_)
                | Decl::Let(_)
                | Decl::Expr(_) => {}
            }
        }

        tracing::debug!(
            target: "sema",
            typed_nodes = self.types.len(),
            errors = self.diagnostics.error_count(),
            warnings = self.diagnostics.warning_count(),
            "type check finished"
        );
    }

    fn check_function(&mut self, f: &FunctionDecl, parent: ScopeId) {
        let scope = self.table.scope_for(f.id, parent);
        let ret = self.table.functions.get(&f.id).and_then(|sig| sig.ret.clone());

        let saved = self.async_depth;
        self.async_depth = if f.is_async { saved + 1 } else { 0 };
        self.fn_stack.push(FnContext {
            name: f.name.clone(),
            ret: ret.clone(),
            is_async: f.is_async,
        });
        let body = self.infer_block(&f.body, scope);
        self.fn_stack.pop();
        self.async_depth = saved;

        if let Some(expected) = ret {
            if !expected.accepts(&body) {
                let span = f
                    .body
                    .expr
                    .as_ref()
                    .map(|e| e.span().clone())
                    .unwrap_or_else(|| f.span.clone());
                self.return_mismatch(&f.name, &expected, &body, f.is_async, &span);
            }
        }
    }

    fn check_field_initializers(&mut self, owner: &str, fields: &[FieldDecl], scope: ScopeId) {
        for field in fields {
            let Some(init) = &field.initializer else {
                continue;
            };
            let actual = self.infer_expr(init, scope);
            let expected = self.table.annotation(field.id).cloned().unwrap_or_else(Type::any);
            if !expected.accepts(&actual) {
                self.diagnostics.push(
                    Diagnostic::error(codes::FIELD_INITIALIZER_MISMATCH)
                        .message(format!(
                            "Field `{}.{}` is declared `{}` but initialized with `{}`",
                            owner, field.name, expected, actual
                        ))
                        .span(init.span().clone())
                        .build(),
                );
            }
        }
    }

    /// Report `form` when used outside an async function
    pub(crate) fn require_async(&mut self, code: &str, form: &str, span: &Span) {
        if self.in_async_context() {
            return;
        }
        let mut builder = Diagnostic::error(code)
            .message(format!("{} is only allowed inside an async function", form))
            .span(span.clone())
            .suggestion(Suggestion::new("Add `async` to the enclosing function"));
        if let Some(ctx) = self.fn_stack.last() {
            builder = builder.note(Note::new(format!("`{}` is not async", ctx.name)));
        }
        self.diagnostics.push(builder.build());
    }

    /// Check `return value` against the enclosing function
    pub(crate) fn check_return(&mut self, actual: &Type, span: &Span) {
        let Some(ctx) = self.fn_stack.last().cloned() else {
            self.diagnostics.push(
                Diagnostic::error(codes::RETURN_OUTSIDE_FUNCTION)
                    .message("`return` outside of a function")
                    .span(span.clone())
                    .build(),
            );
            return;
        };
        if let Some(expected) = &ctx.ret {
            if !expected.accepts(actual) {
                self.return_mismatch(&ctx.name, expected, actual, ctx.is_async, span);
            }
        }
    }

    /// Sync mismatches are errors; async ones warn unless configured otherwise
    fn return_mismatch(
        &mut self,
        name: &str,
        expected: &Type,
        actual: &Type,
        is_async: bool,
        span: &Span,
    ) {
        let message = format!(
            "`{}` declares return type `{}` but returns `{}`",
            name, expected, actual
        );
        let diagnostic = if is_async {
            let severity = match self.options.async_return_mismatch {
                MismatchLevel::Warning => Severity::Warning,
                MismatchLevel::Error => Severity::Error,
            };
            Diagnostic::warning(codes::ASYNC_RETURN_TYPE_MISMATCH)
                .severity(severity)
                .message(message)
                .span(span.clone())
                .build()
        } else {
            Diagnostic::error(codes::RETURN_TYPE_MISMATCH)
                .message(message)
                .span(span.clone())
                .build()
        };
        self.diagnostics.push(diagnostic);
    }

    /// Assignment types as its value, enabling `a = b = c`
    pub(crate) fn check_assignment(
        &mut self,
        target: &Expr,
        value: &Expr,
        span: &Span,
        scope: ScopeId,
    ) -> Type {
        let value_ty = self.infer_expr(value, scope);
        match target {
            Expr::Ident { name, .. } => {
                let target_ty = self.infer_expr(target, scope);
                if let Some(symbol) = self.table.scopes.lookup(scope, name) {
                    let binding =
                        matches!(symbol.kind, SymbolKind::Variable | SymbolKind::Parameter);
                    if binding && !symbol.mutable {
                        let mut builder = Diagnostic::error(codes::ASSIGN_TO_IMMUTABLE)
                            .message(format!("Cannot assign twice to immutable `{}`", name))
                            .span(span.clone())
                            .suggestion(Suggestion::new(format!(
                                "Declare it with `let mut {}`",
                                name
                            )));
                        if symbol.span.is_known() {
                            let declared =
                                Note::new("declared here").with_span(symbol.span.clone());
                            builder = builder.note(declared);
                        }
                        self.diagnostics.push(builder.build());
                    }
                }
                self.check_assigned_type(&target_ty, &value_ty, span);
            }
            Expr::FieldAccess { .. } | Expr::Index { .. } => {
                let target_ty = self.infer_expr(target, scope);
                self.check_assigned_type(&target_ty, &value_ty, span);
            }
            _ => {
                self.diagnostics.push(
                    Diagnostic::error(codes::INVALID_ASSIGNMENT_TARGET)
                        .message("Invalid assignment target")
                        .span(target.span().clone())
                        .build(),
                );
            }
        }
        value_ty
    }

    fn check_assigned_type(&mut self, target: &Type, value: &Type, span: &Span) {
        if !target.accepts(value) {
            self.diagnostics.push(
                Diagnostic::error(codes::ASSIGNMENT_TYPE_MISMATCH)
                    .message(format!("Cannot assign `{}` to a target of type `{}`", value, target))
                    .span(span.clone())
                    .build(),
            );
        }
    }

    pub fn finish(self) -> Analysis {
        Analysis {
            symbols: self.table,
            types: self.types,
            traits: self.traits,
            diagnostics: self.diagnostics,
        }
    }
}

/// Result of analyzing one compilation unit: the scoped, type-annotated
/// program (types live in a side table keyed by node) and its diagnostics
#[derive(Debug, Clone)]
pub struct Analysis {
    pub symbols: SymbolTable,
    pub types: TypeTable,
    pub traits: TraitRegistry,
    pub diagnostics: DiagnosticBag,
}

impl Analysis {
    /// Code generation may proceed: warnings never block
    pub fn can_generate(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.types.get(node)
    }

    pub fn global(&self) -> ScopeId {
        self.symbols.scopes.global()
    }

    pub fn lookup_global(&self, name: &str) -> Option<&Symbol> {
        self.symbols.scopes.lookup(self.global(), name)
    }

    /// Scope opened by a scoped node (function, block, `let`, arm, ...)
    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.symbols.scope_map.get(&node).copied()
    }

    pub fn decls(&self) -> &TypeDecls {
        &self.symbols.decls
    }
}

/// Analyze one compilation unit
pub fn analyze(unit: &CompilationUnit, config: &AnalyzerConfig) -> Analysis {
    let mut diagnostics = DiagnosticBag::new();

    let intrinsics = config
        .intrinsics
        .iter()
        .filter_map(|(name, ty)| match parse_type_name(ty) {
            Some(expr) => Some((name.clone(), expr)),
            None => {
                tracing::warn!(
                    target: "sema",
                    name = %name,
                    ty = %ty,
                    "skipping intrinsic with unsupported type"
                );
                None
            }
        })
        .collect();

    let output = SymbolTableBuilder::new(&mut diagnostics)
        .with_intrinsics(intrinsics)
        .build(unit);

    let mut registry = TraitRegistry::new();
    for info in output.traits {
        registry.register_trait(info, &mut diagnostics);
    }
    for info in output.impls {
        registry.register_impl(info, &mut diagnostics);
    }
    tracing::debug!(
        target: "sema",
        traits = registry.trait_count(),
        impls = registry.impl_count(),
        "traits registered"
    );

    let mut checker =
        TypeChecker::new(output.table, registry, diagnostics, config.analysis.clone());
    checker.check_unit(unit);
    let analysis = checker.finish();

    tracing::info!(
        target: "sema",
        unit = %unit.name,
        errors = analysis.diagnostics.error_count(),
        warnings = analysis.diagnostics.warning_count(),
        "analysis complete"
    );
    analysis
}
