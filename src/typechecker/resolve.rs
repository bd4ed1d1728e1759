//! Type expression resolution and the declaration index.
//!
//! [`TypeDecls`] records every declared type with its fields, methods and
//! (for `data` types) variants. It is filled by the symbol table builder and
//! read by inference, the trait registry and the exhaustiveness checker.

use super::types::{Primitive, Type, BUILTIN_GENERICS};
use crate::ast::{ClassKind, NodeId, TypeExpr, TypeParam};
use crate::diagnostics::{types as codes, Diagnostic, DiagnosticBag, Span, Suggestion};
use std::collections::HashMap;

/// What kind of declaration introduced a type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Class(ClassKind),
    Struct,
    Spark,
    Data,
    Trait,
    Interface,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
    pub span: Span,
}

/// A resolved function, method or trait-method signature
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: String,
    /// Type parameters as `TypeParameter` types carrying their bounds
    pub type_params: Vec<Type>,
    pub params: Vec<(String, Type)>,
    /// `None` when the declaration omits it
    pub ret: Option<Type>,
    pub is_async: bool,
    pub origin: NodeId,
    pub span: Span,
}

impl MethodSignature {
    pub fn param_types(&self) -> Vec<Type> {
        self.params.iter().map(|(_, ty)| ty.clone()).collect()
    }

    /// Declared return type, `Void` when omitted
    pub fn return_type(&self) -> Type {
        self.ret.clone().unwrap_or_else(Type::void)
    }

    /// The callable type of this signature
    pub fn function_type(&self) -> Type {
        Type::function(self.param_types(), self.return_type())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantInfo {
    pub name: String,
    /// The `data` type this variant constructs
    pub parent: String,
    pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub name: String,
    pub kind: DeclKind,
    pub type_params: Vec<Type>,
    pub fields: Vec<FieldInfo>,
    pub methods: HashMap<String, MethodSignature>,
    /// Variant names in declaration order (data types only)
    pub variants: Vec<String>,
    pub span: Span,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>, kind: DeclKind, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            type_params: Vec::new(),
            fields: Vec::new(),
            methods: HashMap::new(),
            variants: Vec::new(),
            span,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The type a value of this declaration has, with its own parameters open
    pub fn self_type(&self) -> Type {
        if self.type_params.is_empty() {
            Type::named(&self.name)
        } else {
            Type::generic(&self.name, self.type_params.clone())
        }
    }
}

/// Index of every declared type in the compilation unit
#[derive(Debug, Clone, Default)]
pub struct TypeDecls {
    types: HashMap<String, TypeInfo>,
    variants: HashMap<String, VariantInfo>,
}

impl TypeDecls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type name. Returns `false` (keeping the first) on a clash.
    pub fn declare(&mut self, info: TypeInfo) -> bool {
        if self.types.contains_key(&info.name) {
            return false;
        }
        self.types.insert(info.name.clone(), info);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TypeInfo> {
        self.types.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypeInfo> {
        self.types.get_mut(name)
    }

    pub fn add_variant(&mut self, variant: VariantInfo) {
        if let Some(parent) = self.types.get_mut(&variant.parent) {
            parent.variants.push(variant.name.clone());
        }
        self.variants.insert(variant.name.clone(), variant);
    }

    pub fn variant(&self, name: &str) -> Option<&VariantInfo> {
        self.variants.get(name)
    }

    /// Field of a class, struct or spark, looked up through the value's type
    pub fn field_of(&self, ty: &Type, field: &str) -> Option<Type> {
        let info = self.types.get(ty.nominal_name()?)?;
        let field = info.field(field)?;
        Some(instantiate_member(info, ty, &field.ty))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Rewrite a member type declared against `info`'s own type parameters so it
/// matches the concrete arguments carried by `receiver`
pub fn instantiate_member(info: &TypeInfo, receiver: &Type, member: &Type) -> Type {
    match receiver {
        Type::Generic { args, .. } if !info.type_params.is_empty() => {
            let pairs = info
                .type_params
                .iter()
                .zip(args)
                .filter_map(|(param, arg)| match param {
                    Type::TypeParameter { name, .. } => Some((name.clone(), arg.clone())),
                    _ => None,
                });
            super::substitution::TypeSubstitution::from_pairs(pairs).apply(member)
        }
        _ => member.clone(),
    }
}

/// Type parameters visible while resolving a type expression, innermost last
#[derive(Debug, Clone, Default)]
pub struct Generics {
    params: Vec<(String, Type)>,
}

impl Generics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A child environment adding `params` on top of these
    pub fn with(&self, params: &[TypeParam]) -> Self {
        let mut next = self.clone();
        for param in params {
            let ty = Type::bounded_param(param.name.clone(), param.bounds.iter().cloned());
            next.params.push((param.name.clone(), ty));
        }
        next
    }

    /// Bind an alias such as `Self` to a concrete type
    pub fn alias(&self, name: &str, ty: Type) -> Self {
        let mut next = self.clone();
        next.params.push((name.to_string(), ty));
        next
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.params
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, ty)| ty)
    }

    pub fn to_types(params: &[TypeParam]) -> Vec<Type> {
        params
            .iter()
            .map(|p| Type::bounded_param(p.name.clone(), p.bounds.iter().cloned()))
            .collect()
    }
}

fn builtin_arity(name: &str) -> usize {
    match name {
        "Map" | "Result" => 2,
        _ => 1,
    }
}

/// Resolve a written type against declared names and in-scope generics.
/// Unknown names are reported (`TC003`) and resolve to `Any`.
pub fn resolve_type_expr(
    expr: &TypeExpr,
    decls: &TypeDecls,
    generics: &Generics,
    diagnostics: &mut DiagnosticBag,
) -> Type {
    match expr {
        TypeExpr::Named { name, args, span } => {
            let args: Vec<Type> = args
                .iter()
                .map(|a| resolve_type_expr(a, decls, generics, diagnostics))
                .collect();
            if let Some(ty) = generics.get(name) {
                return ty.clone();
            }
            if let Some(primitive) = Primitive::from_name(name) {
                return Type::Primitive(primitive);
            }
            if BUILTIN_GENERICS.contains(&name.as_str()) {
                let args = if args.is_empty() {
                    vec![Type::any(); builtin_arity(name)]
                } else {
                    args
                };
                return Type::generic(name.clone(), args);
            }
            if decls.contains(name) {
                return if args.is_empty() {
                    Type::named(name.clone())
                } else {
                    Type::generic(name.clone(), args)
                };
            }
            diagnostics.push(
                Diagnostic::error(codes::UNKNOWN_TYPE)
                    .message(format!("Unknown type `{}`", name))
                    .span(span.clone())
                    .suggestion(Suggestion::new(format!(
                        "Declare `{}` or add it as a type parameter",
                        name
                    )))
                    .build(),
            );
            Type::any()
        }
        TypeExpr::Optional { inner, .. } => {
            Type::optional(resolve_type_expr(inner, decls, generics, diagnostics))
        }
        TypeExpr::Array { element, .. } => {
            Type::array(resolve_type_expr(element, decls, generics, diagnostics))
        }
        TypeExpr::Tuple { elements, .. } => Type::Tuple(
            elements
                .iter()
                .map(|e| resolve_type_expr(e, decls, generics, diagnostics))
                .collect(),
        ),
        TypeExpr::Function { params, ret, .. } => Type::function(
            params
                .iter()
                .map(|p| resolve_type_expr(p, decls, generics, diagnostics))
                .collect(),
            resolve_type_expr(ret, decls, generics, diagnostics),
        ),
    }
}
