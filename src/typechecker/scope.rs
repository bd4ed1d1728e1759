//! Lexical scopes and symbols.
//!
//! Scopes live in a [`ScopeArena`] and refer to their parent by
//! [`ScopeId`]. Passes hold a `ScopeId` for "where am I" and thread it
//! through recursion explicitly, so every `enter` has a visible matching
//! `exit` at its call site.

use super::types::Type;
use crate::ast::NodeId;
use crate::diagnostics::Span;
use std::collections::HashMap;
use thiserror::Error;

/// Handle to a scope inside a [`ScopeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Method,
    Class,
    Block,
    Loop,
    Lambda,
    MatchArm,
    Catch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
    Struct,
    Data,
    Trait,
    Field,
    Spark,
}

/// A bound name
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    /// `None` only for an un-annotated `let` whose value has not been inferred yet
    pub declared_type: Option<Type>,
    pub kind: SymbolKind,
    pub mutable: bool,
    pub is_async: bool,
    /// Declaration node that introduced the symbol
    pub origin: Option<NodeId>,
    pub span: Span,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, declared_type: Option<Type>) -> Self {
        Self {
            name: name.into(),
            declared_type,
            kind,
            mutable: false,
            is_async: false,
            origin: None,
            span: Span::default(),
        }
    }

    pub fn mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    pub fn asynchronous(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn origin(mut self, origin: NodeId) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Declared type, or `Any` while still unresolved
    pub fn ty(&self) -> Type {
        self.declared_type.clone().unwrap_or_else(Type::any)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScopeError {
    #[error("`{name}` is already defined in this scope")]
    Redefinition {
        name: String,
        /// Where the surviving first definition lives
        first: Span,
    },

    /// Exiting the global scope means enter/exit pairing is broken
    #[error("attempted to exit the global scope")]
    PoppedRoot,
}

#[derive(Debug, Clone)]
pub struct Scope {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    symbols: HashMap<String, Symbol>,
}

impl Scope {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Owns every scope of one compilation unit
#[derive(Debug, Clone)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeArena {
    /// Create an arena holding just the global scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                kind: ScopeKind::Global,
                parent: None,
                symbols: HashMap::new(),
            }],
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Open a child scope of `parent`
    pub fn enter(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            parent: Some(parent),
            symbols: HashMap::new(),
        });
        tracing::trace!(target: "sema", scope = id.0, parent = parent.0, ?kind, "enter scope");
        id
    }

    /// Leave `scope`, returning the scope to continue in
    pub fn exit(&self, scope: ScopeId) -> Result<ScopeId, ScopeError> {
        let parent = self.get(scope).parent.ok_or(ScopeError::PoppedRoot)?;
        tracing::trace!(target: "sema", scope = scope.0, "exit scope");
        Ok(parent)
    }

    pub fn get(&self, scope: ScopeId) -> &Scope {
        &self.scopes[scope.index()]
    }

    pub fn kind(&self, scope: ScopeId) -> ScopeKind {
        self.get(scope).kind
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.get(scope).parent
    }

    /// Insert into `scope` only. Shadowing an outer binding is fine; a
    /// second definition in the same scope is rejected and the first kept.
    pub fn define(&mut self, scope: ScopeId, symbol: Symbol) -> Result<(), ScopeError> {
        let symbols = &mut self.scopes[scope.index()].symbols;
        if let Some(existing) = symbols.get(&symbol.name) {
            return Err(ScopeError::Redefinition {
                name: symbol.name,
                first: existing.span.clone(),
            });
        }
        symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Walk from `scope` to the root, returning the first match
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.lookup_with_scope(scope, name).map(|(_, symbol)| symbol)
    }

    /// Like [`ScopeArena::lookup`], also returning the defining scope
    pub fn lookup_with_scope(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &Symbol)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.get(id);
            if let Some(symbol) = s.symbols.get(name) {
                return Some((id, symbol));
            }
            current = s.parent;
        }
        None
    }

    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.get(scope).symbols.get(name)
    }

    pub fn exists_in(&self, scope: ScopeId, name: &str) -> bool {
        self.get(scope).symbols.contains_key(name)
    }

    /// Record the inferred type of a symbol defined without one. A type
    /// already present is never overwritten.
    pub fn resolve_type(&mut self, scope: ScopeId, name: &str, ty: Type) {
        if let Some(symbol) = self.scopes[scope.index()].symbols.get_mut(name) {
            if symbol.declared_type.is_none() {
                symbol.declared_type = Some(ty);
            }
        }
    }

    /// Number of scopes created so far, the global scope included
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn symbol_count(&self) -> usize {
        self.scopes.iter().map(Scope::len).sum()
    }
}
