//! Type substitution for generic instantiation.
//!
//! A [`TypeSubstitution`] maps type-parameter names to concrete types. It is
//! built once per instantiation site, either explicitly or by binding a
//! generic signature's parameter types against the argument types of a call.
//! Parameters with no entry stay open, so partial instantiation is legal.

use super::types::Type;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSubstitution {
    bindings: HashMap<String, Type>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a substitution from `(parameter, type)` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Type)>,
        S: Into<String>,
    {
        Self {
            bindings: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: Type) {
        self.bindings.insert(name.into(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.bindings.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Apply the substitution, rewriting only mapped `TypeParameter` leaves
    pub fn apply(&self, ty: &Type) -> Type {
        if self.bindings.is_empty() {
            return ty.clone();
        }
        match ty {
            Type::TypeParameter { name, .. } => match self.bindings.get(name) {
                Some(bound) => bound.clone(),
                None => ty.clone(),
            },
            Type::Primitive(_) | Type::Named(_) => ty.clone(),
            Type::Generic { base, args } => Type::Generic {
                base: base.clone(),
                args: args.iter().map(|a| self.apply(a)).collect(),
            },
            Type::Optional(inner) => Type::Optional(Box::new(self.apply(inner))),
            Type::Array(element) => Type::Array(Box::new(self.apply(element))),
            Type::Tuple(elements) => Type::Tuple(elements.iter().map(|e| self.apply(e)).collect()),
            Type::Function { params, ret } => Type::Function {
                params: params.iter().map(|p| self.apply(p)).collect(),
                ret: Box::new(self.apply(ret)),
            },
        }
    }

    /// Bind type parameters in `pattern` by walking it alongside `actual`.
    ///
    /// The first binding for a parameter wins. Returns `false` when a later
    /// occurrence conflicts with an earlier binding; shapes that do not line
    /// up bind nothing and are left to the caller's compatibility check.
    pub fn bind(&mut self, pattern: &Type, actual: &Type) -> bool {
        match (pattern, actual) {
            (Type::TypeParameter { name, .. }, _) => {
                if let Some(existing) = self.bindings.get(name) {
                    return existing.compatible(actual);
                }
                if !actual.is_any() {
                    self.bindings.insert(name.clone(), actual.clone());
                }
                true
            }
            (Type::Optional(p), Type::Optional(a)) | (Type::Array(p), Type::Array(a)) => {
                self.bind(p, a)
            }
            // `T?` parameter given a plain `T` argument
            (Type::Optional(p), _) => self.bind(p, actual),
            (
                Type::Generic { base: pb, args: pa },
                Type::Generic { base: ab, args: aa },
            ) if pb == ab && pa.len() == aa.len() => {
                pa.iter().zip(aa).fold(true, |ok, (p, a)| self.bind(p, a) && ok)
            }
            (Type::Tuple(pt), Type::Tuple(at)) if pt.len() == at.len() => {
                pt.iter().zip(at).fold(true, |ok, (p, a)| self.bind(p, a) && ok)
            }
            (
                Type::Function {
                    params: pp,
                    ret: pr,
                },
                Type::Function {
                    params: ap,
                    ret: ar,
                },
            ) if pp.len() == ap.len() => {
                let params_ok = pp.iter().zip(ap).fold(true, |ok, (p, a)| self.bind(p, a) && ok);
                self.bind(pr, ar) && params_ok
            }
            _ => true,
        }
    }
}
