//! Symbol table construction.
//!
//! One forward pass over the compilation unit, split in three steps so that
//! forward and mutual references resolve:
//!
//! 1. every type name (class, struct, spark, data, trait, interface) is
//!    predeclared in the global scope;
//! 2. signatures are resolved: functions, class members, data variant
//!    constructors, trait and impl method signatures;
//! 3. bodies are visited, opening a scope for every lexical region that
//!    binds names and defining parameters and pattern bindings in it.
//!
//! Each `let` opens a fresh child scope covering the rest of its block, so a
//! binding is visible only after its declaration and re-binding a name
//! shadows rather than collides. The resulting [`SymbolTable`] maps every
//! scoped node to its [`ScopeId`]; later passes re-walk the tree and pick the
//! scopes up from that map.

use super::resolve::{
    resolve_type_expr, DeclKind, FieldInfo, Generics, MethodSignature, TypeDecls, TypeInfo,
    VariantInfo,
};
use super::scope::{ScopeArena, ScopeError, ScopeId, ScopeKind, Symbol, SymbolKind};
use super::traits::{ImplInfo, TraitInfo};
use super::types::Type;
use crate::ast::*;
use crate::diagnostics::{symbols as codes, Diagnostic, DiagnosticBag, Note, Span};
use std::collections::{HashMap, HashSet};

/// Callables available in every program, with their return types
pub fn default_intrinsics() -> Vec<(String, Type)> {
    vec![
        ("print".to_string(), Type::void()),
        ("println".to_string(), Type::void()),
        ("readLine".to_string(), Type::string()),
        ("toString".to_string(), Type::string()),
        ("sleep".to_string(), Type::future(Type::void())),
    ]
}

/// Everything the builder learned about the compilation unit
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub scopes: ScopeArena,
    /// Scope opened by each scoped node (functions, blocks, lets, arms, ...)
    pub scope_map: HashMap<NodeId, ScopeId>,
    pub decls: TypeDecls,
    /// Resolved annotations keyed by the annotated node
    pub annotations: HashMap<NodeId, Type>,
    /// Resolved signature of every function and method declaration
    pub functions: HashMap<NodeId, MethodSignature>,
    /// Intrinsic return types
    pub intrinsics: HashMap<String, Type>,
}

impl SymbolTable {
    /// The scope opened by `node`, or `fallback` when it opened none
    pub fn scope_for(&self, node: NodeId, fallback: ScopeId) -> ScopeId {
        self.scope_map.get(&node).copied().unwrap_or(fallback)
    }

    pub fn annotation(&self, node: NodeId) -> Option<&Type> {
        self.annotations.get(&node)
    }
}

/// Output of [`SymbolTableBuilder::build`]
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub table: SymbolTable,
    /// Resolved trait and interface declarations, in source order
    pub traits: Vec<TraitInfo>,
    /// Resolved impl blocks, in source order
    pub impls: Vec<ImplInfo>,
}

pub struct SymbolTableBuilder<'d> {
    table: SymbolTable,
    traits: Vec<TraitInfo>,
    impls: Vec<ImplInfo>,
    extra_intrinsics: Vec<(String, TypeExpr)>,
    /// Type declarations that lost a name clash; their members are not indexed
    shadowed: HashSet<NodeId>,
    diagnostics: &'d mut DiagnosticBag,
}

impl<'d> SymbolTableBuilder<'d> {
    pub fn new(diagnostics: &'d mut DiagnosticBag) -> Self {
        Self {
            table: SymbolTable::default(),
            traits: Vec::new(),
            impls: Vec::new(),
            extra_intrinsics: Vec::new(),
            shadowed: HashSet::new(),
            diagnostics,
        }
    }

    /// Register additional intrinsic callables
    pub fn with_intrinsics(mut self, intrinsics: Vec<(String, TypeExpr)>) -> Self {
        self.extra_intrinsics = intrinsics;
        self
    }

    pub fn build(mut self, unit: &CompilationUnit) -> BuildOutput {
        for decl in &unit.decls {
            self.declare_type(decl);
        }
        self.seed_intrinsics();
        for decl in &unit.decls {
            self.declare_signatures(decl);
        }
        for decl in &unit.decls {
            self.visit_decl(decl);
        }

        tracing::debug!(
            target: "sema",
            scopes = self.table.scopes.len(),
            symbols = self.table.scopes.symbol_count(),
            types = self.table.decls.len(),
            "symbol table built"
        );

        BuildOutput {
            table: self.table,
            traits: self.traits,
            impls: self.impls,
        }
    }

    fn global(&self) -> ScopeId {
        self.table.scopes.global()
    }

    fn resolve(&mut self, ty: &TypeExpr, generics: &Generics) -> Type {
        resolve_type_expr(ty, &self.table.decls, generics, self.diagnostics)
    }

    /// Define `symbol`, turning a redefinition into STB001 at `site`
    fn define(&mut self, scope: ScopeId, symbol: Symbol, site: &Span) -> bool {
        match self.table.scopes.define(scope, symbol) {
            Ok(()) => true,
            Err(err) => {
                self.report_redefinition(err, site);
                false
            }
        }
    }

    fn report_redefinition(&mut self, err: ScopeError, site: &Span) {
        if let ScopeError::Redefinition { name, first } = err {
            let mut builder = Diagnostic::error(codes::DUPLICATE_DEFINITION)
                .message(format!("`{}` is already defined in this scope", name))
                .span(site.clone());
            if first.is_known() {
                builder = builder.note(Note::new("first defined here").with_span(first));
            }
            self.diagnostics.push(builder.build());
        }
    }

    fn duplicate_member(&mut self, owner: &str, member: &str, span: &Span) {
        self.diagnostics.push(
            Diagnostic::error(codes::DUPLICATE_MEMBER)
                .message(format!("`{}` declares `{}` more than once", owner, member))
                .span(span.clone())
                .build(),
        );
    }

    // Step 1: type names

    fn declare_type(&mut self, decl: &Decl) {
        let (name, kind, symbol_kind, type_params, span, id) = match decl {
            Decl::Class(c) => (
                &c.name,
                DeclKind::Class(c.kind),
                SymbolKind::Struct,
                &c.type_params,
                &c.span,
                c.id,
            ),
            Decl::Struct(s) => (
                &s.name,
                DeclKind::Struct,
                SymbolKind::Struct,
                &s.type_params,
                &s.span,
                s.id,
            ),
            Decl::Spark(s) => (
                &s.name,
                DeclKind::Spark,
                SymbolKind::Spark,
                &s.type_params,
                &s.span,
                s.id,
            ),
            Decl::Data(d) => (
                &d.name,
                DeclKind::Data,
                SymbolKind::Data,
                &d.type_params,
                &d.span,
                d.id,
            ),
            Decl::Trait(t) => (
                &t.name,
                DeclKind::Trait,
                SymbolKind::Trait,
                &t.type_params,
                &t.span,
                t.id,
            ),
            Decl::Interface(t) => (
                &t.name,
                DeclKind::Interface,
                SymbolKind::Trait,
                &t.type_params,
                &t.span,
                t.id,
            ),
            Decl::Function(_) | Decl::Impl(_) | Decl::Let(_) | Decl::Expr(_) => return,
        };

        let mut info = TypeInfo::new(name.clone(), kind, span.clone());
        info.type_params = Generics::to_types(type_params);
        let symbol = Symbol::new(name.clone(), symbol_kind, Some(info.self_type()))
            .origin(id)
            .span(span.clone());

        let global = self.global();
        let trait_clash = symbol_kind == SymbolKind::Trait
            && self
                .table
                .scopes
                .lookup_local(global, name)
                .is_some_and(|s| s.kind == SymbolKind::Trait);
        if trait_clash {
            // The trait registry reports trait/trait clashes itself
            self.shadowed.insert(id);
            return;
        }
        if self.define(global, symbol, span) {
            self.table.decls.declare(info);
        } else {
            self.shadowed.insert(id);
        }
    }

    fn seed_intrinsics(&mut self) {
        let global = self.global();
        let mut intrinsics = default_intrinsics();
        let extra = std::mem::take(&mut self.extra_intrinsics);
        for (name, expr) in &extra {
            let ty = self.resolve(expr, &Generics::new());
            intrinsics.push((name.clone(), ty));
        }
        for (name, ret) in intrinsics {
            let symbol = Symbol::new(
                name.clone(),
                SymbolKind::Function,
                Some(Type::function(Vec::new(), ret.clone())),
            );
            // A user type with the same name wins
            if self.table.scopes.define(global, symbol).is_ok() {
                self.table.intrinsics.insert(name, ret);
            }
        }
    }

    // Step 2: signatures

    #[allow(clippy::too_many_arguments)]
    fn signature(
        &mut self,
        id: NodeId,
        span: &Span,
        name: &str,
        params: &[Param],
        ret: Option<&TypeExpr>,
        is_async: bool,
        type_params: &[TypeParam],
        generics: &Generics,
    ) -> MethodSignature {
        let generics = generics.with(type_params);
        let params = params
            .iter()
            .map(|p| (p.name.clone(), self.resolve(&p.ty, &generics)))
            .collect();
        let ret = ret.map(|r| self.resolve(r, &generics));
        MethodSignature {
            name: name.to_string(),
            type_params: Generics::to_types(type_params),
            params,
            ret,
            is_async,
            origin: id,
            span: span.clone(),
        }
    }

    fn function_signature(&mut self, f: &FunctionDecl, generics: &Generics) -> MethodSignature {
        let sig = self.signature(
            f.id,
            &f.span,
            &f.name,
            &f.params,
            f.return_type.as_ref(),
            f.is_async,
            &f.type_params,
            generics,
        );
        self.table.functions.insert(f.id, sig.clone());
        sig
    }

    fn resolve_fields(
        &mut self,
        owner: &str,
        fields: &[FieldDecl],
        force_immutable: bool,
        generics: &Generics,
    ) -> Vec<FieldInfo> {
        let mut out: Vec<FieldInfo> = Vec::new();
        for field in fields {
            let ty = self.resolve(&field.ty, generics);
            self.table.annotations.insert(field.id, ty.clone());
            if out.iter().any(|f| f.name == field.name) {
                self.duplicate_member(owner, &field.name, &field.span);
                continue;
            }
            out.push(FieldInfo {
                name: field.name.clone(),
                ty,
                mutable: field.mutable && !force_immutable,
                span: field.span.clone(),
            });
        }
        out
    }

    fn type_generics(&self, name: &str, params: &[TypeParam]) -> Generics {
        let generics = Generics::new().with(params);
        match self.table.decls.get(name) {
            Some(info) => generics.alias("Self", info.self_type()),
            None => generics,
        }
    }

    fn declare_signatures(&mut self, decl: &Decl) {
        let global = self.global();
        match decl {
            Decl::Function(f) => {
                let sig = self.function_signature(f, &Generics::new());
                let ty = sig.function_type();
                let symbol = Symbol::new(f.name.clone(), SymbolKind::Function, Some(ty))
                    .asynchronous(f.is_async)
                    .origin(f.id)
                    .span(f.span.clone());
                self.define(global, symbol, &f.span);
            }
            Decl::Class(c) => {
                let generics = self.type_generics(&c.name, &c.type_params);
                let fields = self.resolve_fields(&c.name, &c.fields, false, &generics);
                let mut methods: HashMap<String, MethodSignature> = HashMap::new();
                for method in &c.methods {
                    let sig = self.function_signature(method, &generics);
                    let clash = methods.contains_key(&method.name)
                        || fields.iter().any(|f| f.name == method.name);
                    if clash {
                        self.duplicate_member(&c.name, &method.name, &method.span);
                        continue;
                    }
                    methods.insert(method.name.clone(), sig);
                }
                if !self.shadowed.contains(&c.id) {
                    if let Some(info) = self.table.decls.get_mut(&c.name) {
                        info.fields = fields;
                        info.methods = methods;
                    }
                }
            }
            Decl::Struct(s) | Decl::Spark(s) => {
                let generics = self.type_generics(&s.name, &s.type_params);
                let is_spark = matches!(decl, Decl::Spark(_));
                let fields = self.resolve_fields(&s.name, &s.fields, is_spark, &generics);
                if !self.shadowed.contains(&s.id) {
                    if let Some(info) = self.table.decls.get_mut(&s.name) {
                        info.fields = fields;
                    }
                }
            }
            Decl::Data(d) => self.declare_variants(d),
            Decl::Trait(t) | Decl::Interface(t) => {
                let is_interface = matches!(decl, Decl::Interface(_));
                let self_param = Type::bounded_param("Self", [t.name.clone()]);
                let generics = Generics::new().with(&t.type_params).alias("Self", self_param);
                let methods = t
                    .methods
                    .iter()
                    .map(|m| {
                        self.signature(
                            m.id,
                            &m.span,
                            &m.name,
                            &m.params,
                            m.return_type.as_ref(),
                            m.is_async,
                            &m.type_params,
                            &generics,
                        )
                    })
                    .collect();
                self.traits.push(TraitInfo {
                    name: t.name.clone(),
                    type_params: Generics::to_types(&t.type_params),
                    methods,
                    is_interface,
                    span: t.span.clone(),
                    origin: t.id,
                });
            }
            Decl::Impl(imp) => {
                let generics = Generics::new().with(&imp.type_params);
                let target = self.resolve(&imp.target, &generics);
                let trait_args = imp
                    .trait_args
                    .iter()
                    .map(|a| self.resolve(a, &generics))
                    .collect();
                let generics = generics.alias("Self", target.clone());
                let methods = imp
                    .methods
                    .iter()
                    .map(|m| self.function_signature(m, &generics))
                    .collect();
                self.impls.push(ImplInfo {
                    trait_name: imp.trait_name.clone(),
                    trait_args,
                    target,
                    type_params: Generics::to_types(&imp.type_params),
                    methods,
                    span: imp.span.clone(),
                    origin: imp.id,
                });
            }
            Decl::Let(_) | Decl::Expr(_) => {}
        }
    }

    fn declare_variants(&mut self, d: &DataDecl) {
        let global = self.global();
        let generics = self.type_generics(&d.name, &d.type_params);
        let self_type = self
            .table
            .decls
            .get(&d.name)
            .map(TypeInfo::self_type)
            .unwrap_or_else(|| Type::named(d.name.clone()));
        let mut seen: HashSet<&str> = HashSet::new();
        for variant in &d.variants {
            if !seen.insert(variant.name.as_str()) {
                self.duplicate_member(&d.name, &variant.name, &variant.span);
                continue;
            }
            let fields = self.resolve_fields(&variant.name, &variant.fields, true, &generics);
            let params = fields.iter().map(|f| f.ty.clone()).collect();
            let ctor = Type::function(params, self_type.clone());
            let symbol = Symbol::new(variant.name.clone(), SymbolKind::Function, Some(ctor))
                .origin(variant.id)
                .span(variant.span.clone());
            if self.define(global, symbol, &variant.span) && !self.shadowed.contains(&d.id) {
                self.table.decls.add_variant(VariantInfo {
                    name: variant.name.clone(),
                    parent: d.name.clone(),
                    fields,
                });
            }
        }
    }

    // Step 3: bodies

    fn visit_decl(&mut self, decl: &Decl) {
        let global = self.global();
        let none = Generics::new();
        match decl {
            Decl::Function(f) => self.visit_function(f, global, ScopeKind::Function, None, &none),
            Decl::Class(c) => self.visit_class(c),
            Decl::Struct(s) | Decl::Spark(s) => {
                let generics = self.type_generics(&s.name, &s.type_params);
                for field in &s.fields {
                    if let Some(init) = &field.initializer {
                        self.visit_expr(init, global, &generics);
                    }
                }
            }
            Decl::Impl(imp) => {
                let target = self
                    .impls
                    .iter()
                    .find(|i| i.origin == imp.id)
                    .map(|i| i.target.clone())
                    .unwrap_or_else(Type::any);
                let generics = Generics::new()
                    .with(&imp.type_params)
                    .alias("Self", target.clone());
                for method in &imp.methods {
                    let self_type = Some(target.clone());
                    self.visit_function(method, global, ScopeKind::Method, self_type, &generics);
                }
            }
            Decl::Let(stmt) => {
                self.visit_expr(&stmt.value, global, &none);
                self.table.scope_map.insert(stmt.id, global);
                self.define_let(stmt, global, &none);
            }
            Decl::Expr(stmt) => self.visit_expr(&stmt.expr, global, &none),
            Decl::Data(_) | Decl::Trait(_) | Decl::Interface(_) => {}
        }
    }

    fn visit_class(&mut self, c: &ClassDecl) {
        let global = self.global();
        let generics = self.type_generics(&c.name, &c.type_params);
        let self_type = self
            .table
            .decls
            .get(&c.name)
            .map(TypeInfo::self_type)
            .unwrap_or_else(|| Type::named(c.name.clone()));

        let class_scope = self.table.scopes.enter(global, ScopeKind::Class);
        self.table.scope_map.insert(c.id, class_scope);

        // Fields first, then method names, so every method body sees both.
        // Clashes were already reported as STB002.
        for field in &c.fields {
            let ty = self.table.annotation(field.id).cloned().unwrap_or_else(Type::any);
            let symbol = Symbol::new(field.name.clone(), SymbolKind::Field, Some(ty))
                .mutable(field.mutable)
                .origin(field.id)
                .span(field.span.clone());
            let _ = self.table.scopes.define(class_scope, symbol);
        }
        for method in &c.methods {
            let ty = self
                .table
                .functions
                .get(&method.id)
                .map(MethodSignature::function_type)
                .unwrap_or_else(Type::any);
            let symbol = Symbol::new(method.name.clone(), SymbolKind::Function, Some(ty))
                .asynchronous(method.is_async)
                .origin(method.id)
                .span(method.span.clone());
            let _ = self.table.scopes.define(class_scope, symbol);
        }

        for field in &c.fields {
            if let Some(init) = &field.initializer {
                self.visit_expr(init, class_scope, &generics);
            }
        }
        for method in &c.methods {
            let receiver = Some(self_type.clone());
            self.visit_function(method, class_scope, ScopeKind::Method, receiver, &generics);
        }
        self.leave(class_scope, global);
    }

    fn visit_function(
        &mut self,
        f: &FunctionDecl,
        parent: ScopeId,
        kind: ScopeKind,
        self_type: Option<Type>,
        generics: &Generics,
    ) {
        let generics = generics.with(&f.type_params);
        let scope = self.table.scopes.enter(parent, kind);
        self.table.scope_map.insert(f.id, scope);

        if let Some(ty) = self_type {
            let symbol = Symbol::new("self", SymbolKind::Parameter, Some(ty)).origin(f.id);
            self.define(scope, symbol, &f.span);
        }

        let param_types: Vec<Type> = self
            .table
            .functions
            .get(&f.id)
            .map(MethodSignature::param_types)
            .unwrap_or_default();
        for (i, param) in f.params.iter().enumerate() {
            let ty = param_types.get(i).cloned().unwrap_or_else(Type::any);
            self.table.annotations.insert(param.id, ty.clone());
            let symbol = Symbol::new(param.name.clone(), SymbolKind::Parameter, Some(ty))
                .mutable(param.mutable)
                .origin(param.id)
                .span(param.span.clone());
            self.define(scope, symbol, &f.span);
        }

        self.visit_block(&f.body, scope, ScopeKind::Block, &generics);
        self.leave(scope, parent);
    }

    /// Visit a block; returns nothing because every scope it opens is
    /// reachable from `scope_map`
    fn visit_block(
        &mut self,
        block: &Block,
        parent: ScopeId,
        kind: ScopeKind,
        generics: &Generics,
    ) {
        let mut scope = self.table.scopes.enter(parent, kind);
        self.table.scope_map.insert(block.id, scope);

        for stmt in &block.stmts {
            scope = self.visit_stmt(stmt, scope, generics);
        }
        if let Some(expr) = &block.expr {
            self.visit_expr(expr, scope, generics);
        }
        // Unwinds the `let` chain along with the block itself
        self.leave(scope, parent);
    }

    /// Exit scopes from `scope` until `target` is current again
    fn leave(&self, mut scope: ScopeId, target: ScopeId) {
        while scope != target {
            match self.table.scopes.exit(scope) {
                Ok(parent) => scope = parent,
                Err(err) => {
                    tracing::error!(target: "sema", %err, scope = ?target, "unbalanced scope exit");
                    return;
                }
            }
        }
    }

    /// Visit a statement and return the scope that the following statements
    /// continue in
    fn visit_stmt(&mut self, stmt: &Stmt, scope: ScopeId, generics: &Generics) -> ScopeId {
        match stmt {
            Stmt::Let(stmt) => {
                // The value cannot see the names it is about to bind
                self.visit_expr(&stmt.value, scope, generics);
                let let_scope = self.table.scopes.enter(scope, ScopeKind::Block);
                self.table.scope_map.insert(stmt.id, let_scope);
                self.define_let(stmt, let_scope, generics);
                let_scope
            }
            Stmt::Expr(stmt) => {
                self.visit_expr(&stmt.expr, scope, generics);
                match &stmt.expr {
                    // `concurrent` bindings stay visible after the block
                    Expr::Concurrent { id, .. } => self.table.scope_for(*id, scope),
                    _ => scope,
                }
            }
        }
    }

    fn define_let(&mut self, stmt: &LetStmt, scope: ScopeId, generics: &Generics) {
        let declared = stmt.ty.as_ref().map(|ty| self.resolve(ty, generics));
        if let Some(ty) = &declared {
            self.table.annotations.insert(stmt.id, ty.clone());
        }
        self.define_pattern(&stmt.pattern, scope, stmt.mutable, declared, &stmt.span, generics);
    }

    /// Define every name bound by `pattern` in `scope`. `declared` is the
    /// annotation that applies when the whole pattern is a single variable.
    fn define_pattern(
        &mut self,
        pattern: &Pattern,
        scope: ScopeId,
        mutable: bool,
        declared: Option<Type>,
        site: &Span,
        generics: &Generics,
    ) {
        let mut seen = HashSet::new();
        self.define_pattern_inner(pattern, scope, mutable, declared, site, generics, &mut seen);
    }

    #[allow(clippy::too_many_arguments)]
    fn define_pattern_inner(
        &mut self,
        pattern: &Pattern,
        scope: ScopeId,
        mutable: bool,
        declared: Option<Type>,
        site: &Span,
        generics: &Generics,
        seen: &mut HashSet<String>,
    ) {
        match pattern {
            Pattern::Variable { name, span, id } => {
                if self.is_unit_variant(name) {
                    return;
                }
                self.define_binding(name, *id, span, declared, scope, mutable, site, seen);
            }
            Pattern::Typed { name, ty, span, id } => {
                let ty = self.resolve(ty, generics);
                self.table.annotations.insert(*id, ty.clone());
                self.define_binding(name, *id, span, Some(ty), scope, mutable, site, seen);
            }
            Pattern::Tuple { elements, .. } | Pattern::TupleStruct { elements, .. } => {
                for element in elements {
                    self.define_pattern_inner(element, scope, mutable, None, site, generics, seen);
                }
            }
            Pattern::Array {
                elements,
                rest,
                span,
                id,
            } => {
                for element in elements {
                    self.define_pattern_inner(element, scope, mutable, None, site, generics, seen);
                }
                if let Some(rest) = rest {
                    self.define_binding(rest, *id, span, None, scope, mutable, site, seen);
                }
            }
            Pattern::Struct { fields, span, id, .. } => {
                for field in fields {
                    match &field.pattern {
                        Some(inner) => self.define_pattern_inner(
                            inner,
                            scope,
                            mutable,
                            None,
                            site,
                            generics,
                            seen,
                        ),
                        None => self.define_binding(
                            &field.name,
                            *id,
                            span,
                            None,
                            scope,
                            mutable,
                            site,
                            seen,
                        ),
                    }
                }
            }
            Pattern::Or {
                left,
                right,
                span,
                id,
            } => {
                self.define_pattern_inner(left, scope, mutable, None, site, generics, seen);
                let left_names = self.binding_names(left);
                let right_names = self.binding_names(right);
                let mut unmatched: Vec<&str> = left_names
                    .iter()
                    .copied()
                    .filter(|name| !right_names.contains(name))
                    .collect();
                for name in right_names {
                    if !left_names.contains(&name) {
                        unmatched.push(name);
                        self.define_binding(name, *id, span, None, scope, mutable, site, seen);
                    }
                }
                for name in unmatched {
                    self.diagnostics.push(
                        Diagnostic::error(codes::OR_PATTERN_BINDING_MISMATCH)
                            .message(format!(
                                "`{}` is not bound on both sides of the or-pattern",
                                name
                            ))
                            .span(span.clone())
                            .build(),
                    );
                }
            }
            Pattern::Literal { .. } | Pattern::Wildcard { .. } | Pattern::Range { .. } => {}
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn define_binding(
        &mut self,
        name: &str,
        origin: NodeId,
        span: &Span,
        declared: Option<Type>,
        scope: ScopeId,
        mutable: bool,
        site: &Span,
        seen: &mut HashSet<String>,
    ) {
        if !seen.insert(name.to_string()) {
            self.diagnostics.push(
                Diagnostic::error(codes::DUPLICATE_PATTERN_BINDING)
                    .message(format!("`{}` is bound more than once in the same pattern", name))
                    .span(span.clone())
                    .build(),
            );
            return;
        }
        let symbol = Symbol::new(name, SymbolKind::Variable, declared)
            .mutable(mutable)
            .origin(origin)
            .span(span.clone());
        self.define(scope, symbol, site);
    }

    /// Names a pattern binds, leaving out unit variants
    fn binding_names<'p>(&self, pattern: &'p Pattern) -> Vec<&'p str> {
        pattern
            .bindings()
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| !self.is_unit_variant(name))
            .collect()
    }

    /// A bare name in a pattern that refers to a field-less data variant
    fn is_unit_variant(&self, name: &str) -> bool {
        self.table
            .decls
            .variant(name)
            .is_some_and(|v| v.fields.is_empty())
    }

    fn visit_expr(&mut self, expr: &Expr, scope: ScopeId, generics: &Generics) {
        match expr {
            Expr::Literal { .. }
            | Expr::Ident { .. }
            | Expr::Break { .. }
            | Expr::Continue { .. } => {}
            Expr::Binary { left, right, .. } => {
                self.visit_expr(left, scope, generics);
                self.visit_expr(right, scope, generics);
            }
            Expr::Unary { expr, .. }
            | Expr::FieldAccess { expr, .. }
            | Expr::Throw { expr, .. }
            | Expr::Await { expr, .. } => self.visit_expr(expr, scope, generics),
            Expr::Call { callee, args, .. } => {
                self.visit_expr(callee, scope, generics);
                for arg in args {
                    self.visit_expr(arg, scope, generics);
                }
            }
            Expr::MethodCall { receiver, args, .. } => {
                self.visit_expr(receiver, scope, generics);
                for arg in args {
                    self.visit_expr(arg, scope, generics);
                }
            }
            Expr::Index { expr, index, .. } => {
                self.visit_expr(expr, scope, generics);
                self.visit_expr(index, scope, generics);
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                self.visit_expr(cond, scope, generics);
                self.visit_block(then_branch, scope, ScopeKind::Block, generics);
                if let Some(else_branch) = else_branch {
                    self.visit_expr(else_branch, scope, generics);
                }
            }
            Expr::Match { scrutinee, arms, .. } => {
                self.visit_expr(scrutinee, scope, generics);
                for arm in arms {
                    let arm_scope = self.table.scopes.enter(scope, ScopeKind::MatchArm);
                    self.table.scope_map.insert(arm.id, arm_scope);
                    self.define_pattern(&arm.pattern, arm_scope, false, None, &arm.span, generics);
                    if let Some(guard) = &arm.guard {
                        self.visit_expr(guard, arm_scope, generics);
                    }
                    self.visit_expr(&arm.body, arm_scope, generics);
                    self.leave(arm_scope, scope);
                }
            }
            Expr::Block { block, .. } => self.visit_block(block, scope, ScopeKind::Block, generics),
            Expr::Lambda { id, params, body, span, .. } => {
                let lambda_scope = self.table.scopes.enter(scope, ScopeKind::Lambda);
                self.table.scope_map.insert(*id, lambda_scope);
                for param in params {
                    let declared = param.ty.as_ref().map(|ty| self.resolve(ty, generics));
                    if let Some(ty) = &declared {
                        self.table.annotations.insert(param.id, ty.clone());
                    }
                    let symbol = Symbol::new(param.name.clone(), SymbolKind::Parameter, declared)
                        .origin(param.id)
                        .span(param.span.clone());
                    self.define(lambda_scope, symbol, span);
                }
                self.visit_block(body, lambda_scope, ScopeKind::Block, generics);
                self.leave(lambda_scope, scope);
            }
            Expr::While { cond, body, .. } => {
                self.visit_expr(cond, scope, generics);
                self.visit_block(body, scope, ScopeKind::Loop, generics);
            }
            Expr::For {
                id,
                pattern,
                iterable,
                body,
                span,
            } => {
                self.visit_expr(iterable, scope, generics);
                let loop_scope = self.table.scopes.enter(scope, ScopeKind::Loop);
                self.table.scope_map.insert(*id, loop_scope);
                self.define_pattern(pattern, loop_scope, false, None, span, generics);
                self.visit_block(body, loop_scope, ScopeKind::Block, generics);
                self.leave(loop_scope, scope);
            }
            Expr::Return { value, .. } => {
                if let Some(value) = value {
                    self.visit_expr(value, scope, generics);
                }
            }
            Expr::Assign { target, value, .. } => {
                self.visit_expr(target, scope, generics);
                self.visit_expr(value, scope, generics);
            }
            Expr::ArrayLit { elements, .. } | Expr::TupleLit { elements, .. } => {
                for element in elements {
                    self.visit_expr(element, scope, generics);
                }
            }
            Expr::StructLit { fields, .. } => {
                for field in fields {
                    self.visit_expr(&field.value, scope, generics);
                }
            }
            Expr::Try {
                body,
                catches,
                finally,
                ..
            } => {
                self.visit_block(body, scope, ScopeKind::Block, generics);
                for catch in catches {
                    let catch_scope = self.table.scopes.enter(scope, ScopeKind::Catch);
                    self.table.scope_map.insert(catch.id, catch_scope);
                    let ty = match &catch.ty {
                        Some(ty) => self.resolve(ty, generics),
                        None => Type::any(),
                    };
                    self.table.annotations.insert(catch.id, ty.clone());
                    let symbol = Symbol::new(catch.name.clone(), SymbolKind::Variable, Some(ty))
                        .origin(catch.id)
                        .span(catch.span.clone());
                    self.define(catch_scope, symbol, &catch.span);
                    self.visit_block(&catch.body, catch_scope, ScopeKind::Block, generics);
                    self.leave(catch_scope, scope);
                }
                if let Some(finally) = finally {
                    self.visit_block(finally, scope, ScopeKind::Block, generics);
                }
            }
            Expr::Concurrent { id, bindings, .. } => {
                for binding in bindings {
                    self.visit_expr(&binding.value, scope, generics);
                }
                let concurrent_scope = self.table.scopes.enter(scope, ScopeKind::Block);
                self.table.scope_map.insert(*id, concurrent_scope);
                for binding in bindings {
                    let symbol = Symbol::new(binding.name.clone(), SymbolKind::Variable, None)
                        .origin(binding.id)
                        .span(binding.span.clone());
                    // Duplicate names are a concurrency rule (TC022), reported by the checker
                    let _ = self.table.scopes.define(concurrent_scope, symbol);
                }
            }
            Expr::Race { body, .. } => self.visit_block(body, scope, ScopeKind::Block, generics),
            Expr::Timeout { duration, body, .. } => {
                self.visit_expr(duration, scope, generics);
                self.visit_block(body, scope, ScopeKind::Block, generics);
            }
        }
    }
}
