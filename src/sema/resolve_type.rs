//! Type resolution (spec.md §4.3): turning a raw [`TypeExpr`] into a
//! [`TypeRef`], the step every other analyser pass builds on.

use crate::{
    diagnostics::Diagnostics,
    parser::raw::TypeExpr,
    sema::{
        scope::Scope,
        symbol::{dereferenced, reference_of, TypeRef},
    },
    Issue,
};

/// `Type.resolve(scope, rawType)`. A bare name must resolve to a
/// (non-reference) type in scope; `name&` resolves the bare name first and
/// then builds (or fetches) its reference alias — `name&&` is rejected since
/// a reference type has no reference of its own.
pub fn resolve_type_expr(scope: &Scope, type_expr: &TypeExpr, diagnostics: &Diagnostics) -> Result<TypeRef, Issue> {
    let base = resolve_named_type(scope, &type_expr.name, &type_expr.name_span, diagnostics)?;

    if !type_expr.reference {
        return Ok(base);
    }

    if base.borrow().is_reference() {
        return Err(diagnostics.overreferenced_type(type_expr.span.clone(), &type_expr.name));
    }
    Ok(reference_of(&base))
}

fn resolve_named_type(scope: &Scope, name: &str, site: &crate::SourceCode, diagnostics: &Diagnostics) -> Result<TypeRef, Issue> {
    match scope.resolve(name) {
        Some(crate::sema::scope::Symbol::Type(ty)) => {
            if ty.borrow().is_reference() {
                return Err(diagnostics.invalid_reference_as_type(site.clone(), name));
            }
            Ok(ty)
        }
        Some(_) => Err(diagnostics.unknown_name(site.clone(), name)),
        None => Err(diagnostics.unknown_name(site.clone(), name)),
    }
}

/// The value-typed form of `ty`, following one reference alias if present
/// (used whenever a rule needs "the underlying type" regardless of
/// referenceness, e.g. member lookup).
pub fn underlying(ty: &TypeRef) -> TypeRef {
    dereferenced(ty)
}
