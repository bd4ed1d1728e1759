//! Exhaustiveness checking for match expressions.
//!
//! A match is exhaustive when some arm without a guard matches every value
//! (a wildcard, a plain binding, or an or-pattern with such a side), or when
//! the scrutinee is a `data` type and every variant is covered by an
//! unguarded constructor pattern whose sub-patterns are irrefutable.
//! Everything else, literal patterns included, gets a warning suggesting a
//! trailing `_` arm.

use super::resolve::{DeclKind, TypeDecls};
use super::types::Type;
use crate::ast::{MatchArm, Pattern};
use crate::diagnostics::{patterns as codes, Diagnostic, DiagnosticBag, Span, Suggestion};

/// Check if a pattern matches every value. A bare name that refers to a
/// field-less data variant is a constructor, not a binding. A typed binding
/// `x: T` is a type test and can fail.
pub fn is_catch_all(pattern: &Pattern, decls: &TypeDecls) -> bool {
    match pattern {
        Pattern::Wildcard { .. } => true,
        Pattern::Variable { name, .. } => decls.variant(name).is_none(),
        Pattern::Or { left, right, .. } => is_catch_all(left, decls) || is_catch_all(right, decls),
        _ => false,
    }
}

/// Whether a sub-pattern can never fail once its parent matched
fn is_irrefutable(pattern: &Pattern, decls: &TypeDecls) -> bool {
    match pattern {
        Pattern::Tuple { elements, .. } => elements.iter().all(|p| is_irrefutable(p, decls)),
        _ => is_catch_all(pattern, decls),
    }
}

/// Variant names fully covered by one arm's pattern
fn covered_variants<'p>(pattern: &'p Pattern, decls: &TypeDecls, out: &mut Vec<&'p str>) {
    match pattern {
        Pattern::Variable { name, .. } if decls.variant(name).is_some() => out.push(name),
        Pattern::TupleStruct { name, elements, .. } => {
            if decls.variant(name).is_some() && elements.iter().all(|p| is_irrefutable(p, decls)) {
                out.push(name);
            }
        }
        Pattern::Struct { name, fields, .. } => {
            let complete = fields
                .iter()
                .all(|f| f.pattern.as_ref().map_or(true, |p| is_irrefutable(p, decls)));
            if decls.variant(name).is_some() && complete {
                out.push(name);
            }
        }
        Pattern::Or { left, right, .. } => {
            covered_variants(left, decls, out);
            covered_variants(right, decls, out);
        }
        _ => {}
    }
}

/// The data type being matched: from the scrutinee when it is known,
/// otherwise from the first variant named by a pattern
fn data_type_name(scrutinee: &Type, arms: &[MatchArm], decls: &TypeDecls) -> Option<String> {
    if let Some(name) = scrutinee.nominal_name() {
        return decls
            .get(name)
            .filter(|info| info.kind == DeclKind::Data)
            .map(|info| info.name.clone());
    }
    if !scrutinee.is_any() {
        return None;
    }
    arms.iter().find_map(|arm| {
        let mut names = Vec::new();
        first_constructor(&arm.pattern, &mut names);
        names
            .into_iter()
            .find_map(|name| decls.variant(name).map(|v| v.parent.clone()))
    })
}

fn first_constructor<'p>(pattern: &'p Pattern, out: &mut Vec<&'p str>) {
    match pattern {
        Pattern::Variable { name, .. }
        | Pattern::TupleStruct { name, .. }
        | Pattern::Struct { name, .. } => out.push(name),
        Pattern::Or { left, right, .. } => {
            first_constructor(left, out);
            first_constructor(right, out);
        }
        _ => {}
    }
}

/// Variants of the scrutinee's data type left uncovered by unguarded arms;
/// `None` when the scrutinee is not a data type
pub fn missing_variants(
    scrutinee: &Type,
    arms: &[MatchArm],
    decls: &TypeDecls,
) -> Option<Vec<String>> {
    let name = data_type_name(scrutinee, arms, decls)?;
    let info = decls.get(&name)?;
    let mut covered = Vec::new();
    for arm in arms.iter().filter(|arm| arm.guard.is_none()) {
        covered_variants(&arm.pattern, decls, &mut covered);
    }
    Some(
        info.variants
            .iter()
            .filter(|v| !covered.contains(&v.as_str()))
            .cloned()
            .collect(),
    )
}

/// Check a match for exhaustiveness and unreachable arms
pub fn check_match(
    scrutinee: &Type,
    arms: &[MatchArm],
    decls: &TypeDecls,
    span: &Span,
    diagnostics: &mut DiagnosticBag,
) {
    check_exhaustiveness(scrutinee, arms, decls, span, diagnostics);
    check_for_unreachable_patterns(arms, decls, diagnostics);
}

pub fn check_exhaustiveness(
    scrutinee: &Type,
    arms: &[MatchArm],
    decls: &TypeDecls,
    span: &Span,
    diagnostics: &mut DiagnosticBag,
) {
    if arms.is_empty() {
        diagnostics.push(
            Diagnostic::error(codes::EMPTY_MATCH)
                .message("Match expression has no arms")
                .span(span.clone())
                .build(),
        );
        return;
    }

    // A guard can fail, so a guarded catch-all proves nothing
    let has_catch_all = arms
        .iter()
        .any(|arm| arm.guard.is_none() && is_catch_all(&arm.pattern, decls));
    if has_catch_all {
        return;
    }

    let missing = missing_variants(scrutinee, arms, decls);
    if matches!(&missing, Some(missing) if missing.is_empty()) {
        return;
    }

    let message = match &missing {
        Some(missing) => format!(
            "Non-exhaustive match: missing variant(s) {}",
            missing
                .iter()
                .map(|v| format!("`{}`", v))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        None => format!("Match on `{}` may not be exhaustive", scrutinee),
    };
    diagnostics.push(
        Diagnostic::warning(codes::NON_EXHAUSTIVE_MATCH)
            .message(message)
            .span(span.clone())
            .suggestion(Suggestion::new("Add a trailing `_` arm").with_replacement("_ => ..."))
            .build(),
    );
}

/// Flag every arm placed after an unguarded catch-all
pub fn check_for_unreachable_patterns(
    arms: &[MatchArm],
    decls: &TypeDecls,
    diagnostics: &mut DiagnosticBag,
) {
    let Some(first) = arms
        .iter()
        .position(|arm| arm.guard.is_none() && is_catch_all(&arm.pattern, decls))
    else {
        return;
    };
    for arm in &arms[first + 1..] {
        diagnostics.push(
            Diagnostic::warning(codes::UNREACHABLE_ARM)
                .message("Unreachable match arm: an earlier arm matches every value")
                .span(arm.span.clone())
                .build(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::ast::Literal;
    use crate::diagnostics::Severity;
    use crate::typechecker::resolve::{TypeInfo, VariantInfo};
    use pretty_assertions::assert_eq;

    fn shape_decls() -> TypeDecls {
        let mut decls = TypeDecls::new();
        decls.declare(TypeInfo::new("Shape", DeclKind::Data, Span::default()));
        for (name, arity) in [("Circle", 1), ("Rect", 2), ("Empty", 0)] {
            let fields = (0..arity)
                .map(|i| crate::typechecker::resolve::FieldInfo {
                    name: format!("f{i}"),
                    ty: Type::float(),
                    mutable: false,
                    span: Span::default(),
                })
                .collect();
            decls.add_variant(VariantInfo {
                name: name.to_string(),
                parent: "Shape".to_string(),
                fields,
            });
        }
        decls
    }

    fn arms_of(expr: crate::ast::Expr) -> Vec<MatchArm> {
        match expr {
            crate::ast::Expr::Match { arms, .. } => arms,
            _ => unreachable!(),
        }
    }

    fn check(scrutinee: &Type, arms: &[MatchArm], decls: &TypeDecls) -> DiagnosticBag {
        let mut diags = DiagnosticBag::new();
        check_match(scrutinee, arms, decls, &Span::default(), &mut diags);
        diags
    }

    #[test]
    fn test_literal_arms_warn() {
        let arms = arms_of(match_expr(
            int(1),
            vec![arm(lit_pat(Literal::Int(1)), int(1)), arm(lit_pat(Literal::Int(2)), int(2))],
        ));
        let diags = check(&Type::int(), &arms, &TypeDecls::new());
        assert_eq!(diags.count_code(codes::NON_EXHAUSTIVE_MATCH), 1);
        let warning = &diags.diagnostics()[0];
        assert_eq!(warning.severity, Severity::Warning);
        assert!(warning.suggestion().is_some());
    }

    #[test]
    fn test_trailing_wildcard_or_binding_is_exhaustive() {
        for last in [wildcard(), var_pat("other")] {
            let arms = arms_of(match_expr(
                int(1),
                vec![arm(lit_pat(Literal::Int(1)), int(1)), arm(last, int(2))],
            ));
            assert!(check(&Type::int(), &arms, &TypeDecls::new()).is_empty());
        }
    }

    #[test]
    fn test_guarded_catch_all_does_not_count() {
        let arms = arms_of(match_expr(
            int(1),
            vec![guarded_arm(var_pat("n"), boolean(true), int(1))],
        ));
        assert_eq!(
            check(&Type::int(), &arms, &TypeDecls::new()).count_code(codes::NON_EXHAUSTIVE_MATCH),
            1
        );
    }

    #[test]
    fn test_or_pattern_with_catch_all_side() {
        let arms = arms_of(match_expr(
            int(1),
            vec![arm(or_pat(lit_pat(Literal::Int(1)), wildcard()), int(1))],
        ));
        assert!(check(&Type::int(), &arms, &TypeDecls::new()).is_empty());
    }

    #[test]
    fn test_arms_after_catch_all_are_unreachable() {
        let arms = arms_of(match_expr(
            int(1),
            vec![
                arm(wildcard(), int(0)),
                arm(lit_pat(Literal::Int(1)), int(1)),
                arm(var_pat("n"), int(2)),
            ],
        ));
        let diags = check(&Type::int(), &arms, &TypeDecls::new());
        assert_eq!(diags.count_code(codes::UNREACHABLE_ARM), 2);
        assert_eq!(diags.count_code(codes::NON_EXHAUSTIVE_MATCH), 0);
    }

    #[test]
    fn test_typed_binding_is_a_type_test() {
        let typed_then_wildcard = arms_of(match_expr(
            int(1),
            vec![arm(typed_pat("s", ty("String")), int(1)), arm(wildcard(), int(2))],
        ));
        assert!(check(&Type::int(), &typed_then_wildcard, &TypeDecls::new()).is_empty());

        let typed_then_literal = arms_of(match_expr(
            int(1),
            vec![
                arm(typed_pat("s", ty("String")), int(1)),
                arm(lit_pat(Literal::Int(3)), int(2)),
            ],
        ));
        let diags = check(&Type::int(), &typed_then_literal, &TypeDecls::new());
        assert_eq!(diags.count_code(codes::UNREACHABLE_ARM), 0);
        assert_eq!(diags.count_code(codes::NON_EXHAUSTIVE_MATCH), 1);
    }

    #[test]
    fn test_empty_match_is_an_error() {
        let diags = check(&Type::int(), &[], &TypeDecls::new());
        assert_eq!(diags.count_code(codes::EMPTY_MATCH), 1);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_all_variants_covered_is_exhaustive() {
        let decls = shape_decls();
        let arms = arms_of(match_expr(
            ident("s"),
            vec![
                arm(variant_pat("Circle", vec![var_pat("r")]), int(1)),
                arm(variant_pat("Rect", vec![wildcard(), var_pat("h")]), int(2)),
                arm(var_pat("Empty"), int(3)),
            ],
        ));
        assert!(check(&Type::named("Shape"), &arms, &decls).is_empty());
        // Unknown scrutinee type falls back to the variants named
        assert!(check(&Type::any(), &arms, &decls).is_empty());
    }

    #[test]
    fn test_missing_variant_is_named() {
        let decls = shape_decls();
        let arms = arms_of(match_expr(
            ident("s"),
            vec![
                arm(variant_pat("Circle", vec![var_pat("r")]), int(1)),
                arm(variant_pat("Rect", vec![lit_pat(Literal::Float(1.0)), wildcard()]), int(2)),
            ],
        ));
        let diags = check(&Type::named("Shape"), &arms, &decls);
        assert_eq!(diags.count_code(codes::NON_EXHAUSTIVE_MATCH), 1);
        let message = &diags.diagnostics()[0].message;
        assert!(message.contains("`Rect`"), "{message}");
        assert!(message.contains("`Empty`"), "{message}");
        assert!(!message.contains("`Circle`"), "{message}");
    }

    #[test]
    fn test_unit_variant_is_not_a_catch_all() {
        let decls = shape_decls();
        let arms = arms_of(match_expr(
            ident("s"),
            vec![arm(var_pat("Empty"), int(1)), arm(var_pat("Circle"), int(2))],
        ));
        let diags = check(&Type::named("Shape"), &arms, &decls);
        assert_eq!(diags.count_code(codes::UNREACHABLE_ARM), 0);
        assert_eq!(diags.count_code(codes::NON_EXHAUSTIVE_MATCH), 1);
    }
}
