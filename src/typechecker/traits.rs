//! Trait registry, impl conformance and method dispatch.
//!
//! Traits (and interfaces, which share their semantics) are registered
//! first, then every impl, so conformance never depends on declaration
//! order. Dispatch of `receiver.method()` looks for an inherent impl first
//! and otherwise collects every implemented trait providing the method;
//! more than one candidate is an ambiguity, never resolved by order.

use super::resolve::MethodSignature;
use super::substitution::TypeSubstitution;
use super::types::Type;
use crate::ast::NodeId;
use crate::diagnostics::{traits as codes, Diagnostic, DiagnosticBag, Note, Span, Suggestion};
use std::collections::HashMap;

/// A resolved trait or interface declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TraitInfo {
    pub name: String,
    pub type_params: Vec<Type>,
    /// Signatures in declaration order; `Self` is a type parameter here
    pub methods: Vec<MethodSignature>,
    pub is_interface: bool,
    pub span: Span,
    pub origin: NodeId,
}

impl TraitInfo {
    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A resolved impl block; `trait_name` is `None` for inherent impls
#[derive(Debug, Clone, PartialEq)]
pub struct ImplInfo {
    pub trait_name: Option<String>,
    pub trait_args: Vec<Type>,
    pub target: Type,
    pub type_params: Vec<Type>,
    pub methods: Vec<MethodSignature>,
    pub span: Span,
    pub origin: NodeId,
}

impl ImplInfo {
    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Whether this impl applies to values of `receiver`
    pub fn applies_to(&self, receiver: &Type) -> bool {
        match (self.target.nominal_name(), receiver.nominal_name()) {
            (Some(target), Some(receiver)) => target == receiver,
            _ => self.target.compatible(receiver),
        }
    }
}

/// Outcome of resolving an unqualified method call
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResolution {
    /// Found on an inherent impl of the receiver type
    Inherent(MethodSignature),
    /// Exactly one implemented trait provides it
    Trait {
        trait_name: String,
        signature: MethodSignature,
    },
    /// Several implemented traits provide it; names sorted
    Ambiguous(Vec<String>),
    Unresolved,
}

#[derive(Debug, Clone, Default)]
pub struct TraitRegistry {
    traits: HashMap<String, TraitInfo>,
    /// Trait name to its impls
    implementations: HashMap<String, Vec<ImplInfo>>,
    inherent: Vec<ImplInfo>,
}

impl TraitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TraitInfo> {
        self.traits.get(name)
    }

    pub fn trait_count(&self) -> usize {
        self.traits.len()
    }

    pub fn impl_count(&self) -> usize {
        self.implementations.values().map(Vec::len).sum::<usize>() + self.inherent.len()
    }

    pub fn implementations(&self, trait_name: &str) -> &[ImplInfo] {
        self.implementations
            .get(trait_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Register a trait. Duplicate names are rejected (TRAIT001); every
    /// method needs a unique name (TRAIT002) and an explicit return type
    /// (TRAIT003).
    pub fn register_trait(&mut self, info: TraitInfo, diagnostics: &mut DiagnosticBag) -> bool {
        if let Some(existing) = self.traits.get(&info.name) {
            let mut builder = Diagnostic::error(codes::DUPLICATE_TRAIT)
                .message(format!("Trait `{}` is already declared", info.name))
                .span(info.span.clone());
            if existing.span.is_known() {
                let first = Note::new("first declared here").with_span(existing.span.clone());
                builder = builder.note(first);
            }
            diagnostics.push(builder.build());
            return false;
        }

        let mut seen = Vec::new();
        for method in &info.methods {
            if seen.contains(&method.name.as_str()) {
                diagnostics.push(
                    Diagnostic::error(codes::DUPLICATE_TRAIT_METHOD)
                        .message(format!(
                            "Trait `{}` declares method `{}` more than once",
                            info.name, method.name
                        ))
                        .span(method.span.clone())
                        .build(),
                );
                continue;
            }
            seen.push(method.name.as_str());
            if method.ret.is_none() {
                diagnostics.push(
                    Diagnostic::error(codes::MISSING_RETURN_TYPE)
                        .message(format!(
                            "Trait method `{}::{}` must declare a return type",
                            info.name, method.name
                        ))
                        .span(method.span.clone())
                        .suggestion(Suggestion::new("Add `-> Void` if the method returns nothing"))
                        .build(),
                );
            }
        }

        tracing::trace!(
            target: "sema",
            name = %info.name,
            methods = info.methods.len(),
            "trait registered"
        );
        self.traits.insert(info.name.clone(), info);
        true
    }

    /// Register an impl and check it against its trait. The impl is kept even
    /// when it does not conform, so dispatch can still see what it provides.
    pub fn register_impl(&mut self, info: ImplInfo, diagnostics: &mut DiagnosticBag) -> bool {
        let Some(trait_name) = info.trait_name.clone() else {
            self.inherent.push(info);
            return true;
        };

        let Some(trait_info) = self.traits.get(&trait_name) else {
            diagnostics.push(
                Diagnostic::error(codes::UNKNOWN_TRAIT)
                    .message(format!("Cannot implement unknown trait `{}`", trait_name))
                    .span(info.span.clone())
                    .build(),
            );
            return false;
        };

        let duplicate = self
            .implementations(&trait_name)
            .iter()
            .any(|existing| existing.target == info.target);
        if duplicate {
            diagnostics.push(
                Diagnostic::error(codes::DUPLICATE_IMPL)
                    .message(format!(
                        "`{}` is already implemented for `{}`",
                        trait_name, info.target
                    ))
                    .span(info.span.clone())
                    .build(),
            );
            return false;
        }

        check_conformance(trait_info, &info, diagnostics);
        tracing::trace!(
            target: "sema",
            r#trait = %trait_name,
            target = %info.target,
            "impl registered"
        );
        self.implementations.entry(trait_name).or_default().push(info);
        true
    }

    /// Whether `ty` implements `trait_name`. `Any` implements everything and
    /// a type parameter implements the traits in its bounds.
    pub fn implements(&self, ty: &Type, trait_name: &str) -> bool {
        match ty {
            _ if ty.is_any() => true,
            Type::TypeParameter { bounds, .. } => bounds.contains(trait_name),
            _ => self
                .implementations(trait_name)
                .iter()
                .any(|imp| imp.applies_to(ty)),
        }
    }

    /// Resolve `receiver.method()` without a trait qualifier
    pub fn resolve_method(&self, receiver: &Type, method: &str) -> MethodResolution {
        if let Some(sig) = self
            .inherent
            .iter()
            .filter(|imp| imp.applies_to(receiver))
            .find_map(|imp| imp.method(method))
        {
            return MethodResolution::Inherent(self_substituted(sig, receiver));
        }

        let mut candidates: Vec<(&str, MethodSignature)> = Vec::new();
        match receiver {
            // Generic receivers dispatch through their bounds
            Type::TypeParameter { bounds, .. } => {
                for bound in bounds {
                    if let Some(sig) = self.traits.get(bound).and_then(|t| t.method(method)) {
                        candidates.push((bound.as_str(), self_substituted(sig, receiver)));
                    }
                }
            }
            _ => {
                for (name, info) in &self.traits {
                    if info.method(method).is_none() {
                        continue;
                    }
                    if let Some(imp) = self
                        .implementations(name)
                        .iter()
                        .find(|imp| imp.applies_to(receiver))
                    {
                        let sig = imp
                            .method(method)
                            .or_else(|| info.method(method))
                            .map(|sig| self_substituted(sig, receiver));
                        if let Some(sig) = sig {
                            candidates.push((name.as_str(), sig));
                        }
                    }
                }
            }
        }

        match candidates.len() {
            0 => MethodResolution::Unresolved,
            1 => {
                let (trait_name, signature) = candidates.remove(0);
                MethodResolution::Trait {
                    trait_name: trait_name.to_string(),
                    signature,
                }
            }
            _ => {
                let mut names: Vec<String> =
                    candidates.into_iter().map(|(n, _)| n.to_string()).collect();
                names.sort();
                MethodResolution::Ambiguous(names)
            }
        }
    }

    /// Resolve `receiver.Trait::method()`. Walks trait exists, trait has the
    /// method, receiver implements the trait, impl provides the method; the
    /// first failing step is reported and resolution stops.
    pub fn resolve_qualified(
        &self,
        receiver: &Type,
        trait_name: &str,
        method: &str,
        span: &Span,
        diagnostics: &mut DiagnosticBag,
    ) -> Option<MethodSignature> {
        let Some(info) = self.traits.get(trait_name) else {
            diagnostics.push(
                Diagnostic::error(codes::UNKNOWN_TRAIT)
                    .message(format!("Unknown trait `{}`", trait_name))
                    .span(span.clone())
                    .build(),
            );
            return None;
        };

        let Some(declared) = info.method(method) else {
            diagnostics.push(
                Diagnostic::error(codes::TRAIT_LACKS_METHOD)
                    .message(format!("Trait `{}` has no method `{}`", trait_name, method))
                    .span(span.clone())
                    .build(),
            );
            return None;
        };

        if let Type::TypeParameter { bounds, .. } = receiver {
            if bounds.contains(trait_name) {
                return Some(self_substituted(declared, receiver));
            }
        }
        if receiver.is_any() {
            return Some(self_substituted(declared, receiver));
        }

        let Some(imp) = self
            .implementations(trait_name)
            .iter()
            .find(|imp| imp.applies_to(receiver))
        else {
            diagnostics.push(
                Diagnostic::error(codes::TYPE_DOES_NOT_IMPLEMENT)
                    .message(format!("`{}` does not implement `{}`", receiver, trait_name))
                    .span(span.clone())
                    .suggestion(Suggestion::new(format!(
                        "Add `impl {} for {}`",
                        trait_name, receiver
                    )))
                    .build(),
            );
            return None;
        };

        match imp.method(method) {
            Some(sig) => Some(self_substituted(sig, receiver)),
            None => {
                diagnostics.push(
                    Diagnostic::error(codes::NO_CONCRETE_METHOD)
                        .message(format!(
                            "The impl of `{}` for `{}` provides no `{}`",
                            trait_name, receiver, method
                        ))
                        .span(span.clone())
                        .build(),
                );
                None
            }
        }
    }
}

/// Replace `Self` in a trait-side signature with the concrete receiver
fn self_substituted(sig: &MethodSignature, receiver: &Type) -> MethodSignature {
    let subst = TypeSubstitution::from_pairs([("Self", receiver.clone())]);
    MethodSignature {
        params: sig
            .params
            .iter()
            .map(|(name, ty)| (name.clone(), subst.apply(ty)))
            .collect(),
        ret: sig.ret.as_ref().map(|ret| subst.apply(ret)),
        ..sig.clone()
    }
}

/// Check every trait method against the impl, one diagnostic per problem
fn check_conformance(trait_info: &TraitInfo, imp: &ImplInfo, diagnostics: &mut DiagnosticBag) {
    let mut subst = TypeSubstitution::from_pairs([("Self", imp.target.clone())]);
    for (param, arg) in trait_info.type_params.iter().zip(&imp.trait_args) {
        if let Type::TypeParameter { name, .. } = param {
            subst.insert(name.clone(), arg.clone());
        }
    }

    for required in &trait_info.methods {
        let Some(provided) = imp.method(&required.name) else {
            diagnostics.push(
                Diagnostic::error(codes::MISSING_METHOD)
                    .message(format!(
                        "Missing method `{}` in impl of `{}` for `{}`",
                        required.name, trait_info.name, imp.target
                    ))
                    .span(imp.span.clone())
                    .note(Note::new("required by this signature").with_span(required.span.clone()))
                    .build(),
            );
            continue;
        };

        if provided.params.len() != required.params.len() {
            diagnostics.push(
                Diagnostic::error(codes::PARAMETER_COUNT_MISMATCH)
                    .message(format!(
                        "Method `{}` takes {} parameter(s) but `{}` declares {}",
                        provided.name,
                        provided.params.len(),
                        trait_info.name,
                        required.params.len()
                    ))
                    .span(provided.span.clone())
                    .build(),
            );
            continue;
        }

        for (index, ((_, expected), (name, actual))) in
            required.params.iter().zip(&provided.params).enumerate()
        {
            let expected = subst.apply(expected);
            if !expected.compatible(actual) {
                diagnostics.push(
                    Diagnostic::error(codes::PARAMETER_TYPE_MISMATCH)
                        .message(format!(
                            "Parameter {} (`{}`) of `{}` has type `{}`, but `{}` expects `{}`",
                            index + 1,
                            name,
                            provided.name,
                            actual,
                            trait_info.name,
                            expected
                        ))
                        .span(provided.span.clone())
                        .build(),
                );
            }
        }

        let expected_ret = subst.apply(&required.return_type());
        let actual_ret = provided.return_type();
        if !expected_ret.compatible(&actual_ret) {
            diagnostics.push(
                Diagnostic::error(codes::RETURN_TYPE_MISMATCH)
                    .message(format!(
                        "Method `{}` returns `{}`, but `{}` expects `{}`",
                        provided.name, actual_ret, trait_info.name, expected_ret
                    ))
                    .span(provided.span.clone())
                    .build(),
            );
        }
    }

    for provided in &imp.methods {
        if trait_info.method(&provided.name).is_none() {
            diagnostics.push(
                Diagnostic::error(codes::METHOD_NOT_IN_TRAIT)
                    .message(format!(
                        "Method `{}` is not a member of trait `{}`",
                        provided.name, trait_info.name
                    ))
                    .span(provided.span.clone())
                    .build(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sig(name: &str, params: Vec<Type>, ret: Option<Type>) -> MethodSignature {
        MethodSignature {
            name: name.to_string(),
            type_params: Vec::new(),
            params: params
                .into_iter()
                .enumerate()
                .map(|(i, ty)| (format!("p{i}"), ty))
                .collect(),
            ret,
            is_async: false,
            origin: NodeId::new(),
            span: Span::default(),
        }
    }

    fn trait_info(name: &str, methods: Vec<MethodSignature>) -> TraitInfo {
        TraitInfo {
            name: name.to_string(),
            type_params: Vec::new(),
            methods,
            is_interface: false,
            span: Span::default(),
            origin: NodeId::new(),
        }
    }

    fn impl_info(
        trait_name: Option<&str>,
        target: Type,
        methods: Vec<MethodSignature>,
    ) -> ImplInfo {
        ImplInfo {
            trait_name: trait_name.map(str::to_string),
            trait_args: Vec::new(),
            target,
            type_params: Vec::new(),
            methods,
            span: Span::default(),
            origin: NodeId::new(),
        }
    }

    fn shape_registry() -> (TraitRegistry, DiagnosticBag) {
        let mut registry = TraitRegistry::new();
        let mut diags = DiagnosticBag::new();
        registry.register_trait(
            trait_info("Shape", vec![sig("area", vec![], Some(Type::float()))]),
            &mut diags,
        );
        registry.register_trait(
            trait_info("Plot", vec![sig("area", vec![], Some(Type::float()))]),
            &mut diags,
        );
        (registry, diags)
    }

    #[test]
    fn test_conforming_impl_registers_cleanly() {
        let (mut registry, mut diags) = shape_registry();
        let imp = impl_info(
            Some("Shape"),
            Type::named("Square"),
            vec![sig("area", vec![], Some(Type::float()))],
        );
        assert!(registry.register_impl(imp, &mut diags));
        assert!(diags.is_empty());
        assert!(registry.implements(&Type::named("Square"), "Shape"));
        assert!(!registry.implements(&Type::named("Square"), "Plot"));
    }

    #[test]
    fn test_missing_method_is_reported_once_by_name() {
        let mut registry = TraitRegistry::new();
        let mut diags = DiagnosticBag::new();
        registry.register_trait(
            trait_info(
                "Codec",
                vec![
                    sig("encode", vec![], Some(Type::string())),
                    sig("decode", vec![Type::string()], Some(Type::named("Self"))),
                ],
            ),
            &mut diags,
        );
        let imp = impl_info(
            Some("Codec"),
            Type::named("Json"),
            vec![sig("encode", vec![], Some(Type::string()))],
        );
        registry.register_impl(imp, &mut diags);

        assert_eq!(diags.len(), 1);
        assert_eq!(diags.count_code(codes::MISSING_METHOD), 1);
        assert!(diags.diagnostics()[0].message.contains("`decode`"));
    }

    #[test]
    fn test_signature_mismatches_are_reported_separately() {
        let mut registry = TraitRegistry::new();
        let mut diags = DiagnosticBag::new();
        registry.register_trait(
            trait_info(
                "Scale",
                vec![
                    sig("by", vec![Type::int(), Type::float()], Some(Type::param("Self"))),
                    sig("reset", vec![], Some(Type::void())),
                ],
            ),
            &mut diags,
        );
        let imp = impl_info(
            Some("Scale"),
            Type::named("Vec2"),
            vec![
                sig("by", vec![Type::int(), Type::string()], Some(Type::named("Vec2"))),
                sig("reset", vec![Type::int()], Some(Type::void())),
                sig("extra", vec![], Some(Type::void())),
            ],
        );
        registry.register_impl(imp, &mut diags);

        assert_eq!(diags.count_code(codes::PARAMETER_TYPE_MISMATCH), 1);
        assert_eq!(diags.count_code(codes::PARAMETER_COUNT_MISMATCH), 1);
        assert_eq!(diags.count_code(codes::METHOD_NOT_IN_TRAIT), 1);
        // `Self` return matched against the target
        assert_eq!(diags.count_code(codes::RETURN_TYPE_MISMATCH), 0);
    }

    #[test]
    fn test_return_type_mismatch() {
        let (mut registry, mut diags) = shape_registry();
        let imp = impl_info(
            Some("Shape"),
            Type::named("Square"),
            vec![sig("area", vec![], Some(Type::int()))],
        );
        registry.register_impl(imp, &mut diags);
        assert_eq!(diags.count_code(codes::RETURN_TYPE_MISMATCH), 1);
    }

    #[test]
    fn test_trait_validation() {
        let mut registry = TraitRegistry::new();
        let mut diags = DiagnosticBag::new();
        registry.register_trait(
            trait_info(
                "Bad",
                vec![
                    sig("a", vec![], None),
                    sig("b", vec![], Some(Type::int())),
                    sig("b", vec![], Some(Type::int())),
                ],
            ),
            &mut diags,
        );
        assert!(!registry.register_trait(trait_info("Bad", vec![]), &mut diags));

        assert_eq!(diags.count_code(codes::MISSING_RETURN_TYPE), 1);
        assert_eq!(diags.count_code(codes::DUPLICATE_TRAIT_METHOD), 1);
        assert_eq!(diags.count_code(codes::DUPLICATE_TRAIT), 1);
    }

    #[test]
    fn test_unknown_trait_and_duplicate_impl() {
        let (mut registry, mut diags) = shape_registry();
        assert!(!registry.register_impl(
            impl_info(Some("Missing"), Type::named("Square"), vec![]),
            &mut diags
        ));
        let area = || vec![sig("area", vec![], Some(Type::float()))];
        let square_impl = || impl_info(Some("Shape"), Type::named("Square"), area());
        assert!(registry.register_impl(square_impl(), &mut diags));
        assert!(!registry.register_impl(square_impl(), &mut diags));

        assert_eq!(diags.count_code(codes::UNKNOWN_TRAIT), 1);
        assert_eq!(diags.count_code(codes::DUPLICATE_IMPL), 1);
    }

    #[test]
    fn test_dispatch_single_candidate() {
        let (mut registry, mut diags) = shape_registry();
        registry.register_impl(
            impl_info(
                Some("Shape"),
                Type::named("Square"),
                vec![sig("area", vec![], Some(Type::float()))],
            ),
            &mut diags,
        );
        match registry.resolve_method(&Type::named("Square"), "area") {
            MethodResolution::Trait { trait_name, signature } => {
                assert_eq!(trait_name, "Shape");
                assert_eq!(signature.return_type(), Type::float());
            }
            other => panic!("expected trait dispatch, got {other:?}"),
        }
        assert_eq!(
            registry.resolve_method(&Type::named("Circle"), "area"),
            MethodResolution::Unresolved
        );
    }

    #[test]
    fn test_dispatch_ambiguity_is_reported() {
        let (mut registry, mut diags) = shape_registry();
        for trait_name in ["Shape", "Plot"] {
            registry.register_impl(
                impl_info(
                    Some(trait_name),
                    Type::named("Square"),
                    vec![sig("area", vec![], Some(Type::float()))],
                ),
                &mut diags,
            );
        }
        assert_eq!(
            registry.resolve_method(&Type::named("Square"), "area"),
            MethodResolution::Ambiguous(vec!["Plot".to_string(), "Shape".to_string()])
        );
    }

    #[test]
    fn test_inherent_impl_wins_over_traits() {
        let (mut registry, mut diags) = shape_registry();
        for trait_name in ["Shape", "Plot"] {
            registry.register_impl(
                impl_info(
                    Some(trait_name),
                    Type::named("Square"),
                    vec![sig("area", vec![], Some(Type::float()))],
                ),
                &mut diags,
            );
        }
        registry.register_impl(
            impl_info(None, Type::named("Square"), vec![sig("area", vec![], Some(Type::int()))]),
            &mut diags,
        );
        match registry.resolve_method(&Type::named("Square"), "area") {
            MethodResolution::Inherent(sig) => assert_eq!(sig.return_type(), Type::int()),
            other => panic!("expected inherent method, got {other:?}"),
        }
    }

    #[test]
    fn test_bounded_parameter_dispatch() {
        let (registry, _) = shape_registry();
        let receiver = Type::bounded_param("T", ["Shape"]);
        assert!(matches!(
            registry.resolve_method(&receiver, "area"),
            MethodResolution::Trait { .. }
        ));
        assert!(registry.implements(&receiver, "Shape"));
        assert!(!registry.implements(&receiver, "Plot"));
    }

    #[test]
    fn test_qualified_dispatch_fails_fast() {
        let (mut registry, mut diags) = shape_registry();
        registry.register_impl(
            impl_info(Some("Plot"), Type::named("Square"), vec![]),
            &mut diags,
        );
        let square = Type::named("Square");
        let span = Span::default();

        let mut chain = DiagnosticBag::new();
        for (trait_name, method) in [
            ("Nope", "area"),
            ("Shape", "perimeter"),
            ("Shape", "area"),
            ("Plot", "area"),
        ] {
            let resolved =
                registry.resolve_qualified(&square, trait_name, method, &span, &mut chain);
            assert!(resolved.is_none(), "{trait_name}::{method}");
        }

        let codes_seen: Vec<&str> = chain.diagnostics().iter().map(|d| d.code.as_str()).collect();
        assert_eq!(
            codes_seen,
            vec![
                codes::UNKNOWN_TRAIT,
                codes::TRAIT_LACKS_METHOD,
                codes::TYPE_DOES_NOT_IMPLEMENT,
                codes::NO_CONCRETE_METHOD,
            ]
        );
    }

    #[test]
    fn test_qualified_dispatch_resolves_ambiguity() {
        let (mut registry, mut diags) = shape_registry();
        let area_float = vec![sig("area", vec![], Some(Type::float()))];
        let area_int = vec![sig("area", vec![], Some(Type::int()))];
        let square = Type::named("Square");
        registry.register_impl(impl_info(Some("Shape"), square.clone(), area_float), &mut diags);
        registry.register_impl(impl_info(Some("Plot"), square, area_int), &mut diags);
        let mut chain = DiagnosticBag::new();
        let sig = registry
            .resolve_qualified(&Type::named("Square"), "Plot", "area", &Span::default(), &mut chain)
            .unwrap();
        assert!(chain.is_empty());
        assert_eq!(sig.return_type(), Type::int());
    }
}
