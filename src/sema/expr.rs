//! Expression analyser (spec.md §4.4): `analyse(rawExpr, scope, localContext)
//! -> (Expression, [Issue])`, here split across the handful of functions
//! below so every rule gets its own short, testable body.

use std::rc::Rc;

use crate::{
    diagnostics::Diagnostics,
    parser::raw::{Expression, InfixOp, PrefixOp},
    sema::{
        builtins::Builtins,
        resolve_type,
        scope::{Scope, Symbol},
        symbol::{self, CallableRef, OverloadResolution, TypeRef},
        typed::TypedExpression,
    },
    Issue, SourceCode,
};

/// Dereferences a method-call receiver down to the type the resolved
/// `method` actually expects (spec.md §9: every implicit dereference is an
/// explicit typed-tree node, never a use-site coercion left to the
/// backend). Native operator/field methods live on the value type, so a
/// reference-typed receiver (any plain variable read) needs this; `assign`
/// and other reference-only methods live on the reference type itself and
/// are left untouched.
fn coerce_instance(instance: TypedExpression, method: &CallableRef) -> TypedExpression {
    let expects_reference = method.borrow().kind.container().is_some_and(|c| c.borrow().is_reference());
    if expects_reference {
        return instance;
    }
    let ty = instance.ty();
    if ty.borrow().is_reference() {
        let site = instance.site();
        TypedExpression::ImplicitDereferencing {
            ty: symbol::dereferenced(&ty),
            inner: Box::new(instance),
            site,
        }
    } else {
        instance
    }
}

fn invalid(ty: &TypeRef, site: SourceCode) -> TypedExpression {
    TypedExpression::Invalid { ty: ty.clone(), site }
}

/// `analyse(rawExpr, scope, localContext)`. `this_type` carries the
/// containing type while analysing a method/constructor body, `None` at
/// free-function scope.
pub fn analyse(
    raw: &Expression,
    scope: &Scope,
    this_type: Option<&TypeRef>,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
) -> (TypedExpression, Vec<Issue>) {
    let mut issues = Vec::new();
    let typed = analyse_inner(raw, scope, this_type, builtins, diagnostics, &mut issues);
    (typed, issues)
}

fn analyse_inner(
    raw: &Expression,
    scope: &Scope,
    this_type: Option<&TypeRef>,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    match raw {
        Expression::Paren(inner, _) => analyse_inner(inner, scope, this_type, builtins, diagnostics, issues),
        Expression::IntLiteral(text, site) => analyse_int_literal(text, site.clone(), builtins, diagnostics, issues),
        Expression::DoubleLiteral(text, site) => analyse_double_literal(text, site.clone(), builtins, diagnostics, issues),
        Expression::BoolLiteral(value, site) => TypedExpression::BoolLiteral {
            value: *value,
            ty: builtins.bool_.clone(),
            site: site.clone(),
        },
        Expression::SymbolReference(name, site) => {
            analyse_symbol_reference(name, site.clone(), scope, builtins, diagnostics, issues)
        }
        Expression::This(site) => analyse_this(site.clone(), this_type, builtins, diagnostics, issues),
        Expression::TypeReferencing(type_expr) => {
            // A bare type name used where a value is expected (not as a cast
            // callee, which `analyse_call` intercepts before reaching here).
            issues.push(diagnostics.invalid_reference_as_expression(type_expr.span.clone(), &type_expr.name));
            invalid(&builtins.unknown_type, type_expr.span.clone())
        }
        Expression::MemberAccess {
            receiver,
            member,
            member_span,
            span,
        } => analyse_member_access(receiver, member, member_span.clone(), span.clone(), scope, this_type, builtins, diagnostics, issues),
        Expression::Call { callee, args, span } => {
            analyse_call(callee, args, span.clone(), scope, this_type, builtins, diagnostics, issues)
        }
        Expression::Infix {
            op,
            op_span,
            left,
            right,
            span,
        } => analyse_infix(*op, op_span.clone(), left, right, span.clone(), scope, this_type, builtins, diagnostics, issues),
        Expression::Prefix {
            op,
            op_span,
            operand,
            span,
        } => analyse_prefix(*op, op_span.clone(), operand, span.clone(), scope, this_type, builtins, diagnostics, issues),
        Expression::Malformed(site) => invalid(&builtins.unknown_type, site.clone()),
    }
}

fn analyse_int_literal(
    text: &str,
    site: SourceCode,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    match text.parse::<i64>() {
        Ok(value) if (i32::MIN as i64..=i32::MAX as i64).contains(&value) => TypedExpression::IntLiteral {
            value: value as i32,
            ty: builtins.int.clone(),
            site,
        },
        Ok(value) if value > i32::MAX as i64 => {
            issues.push(diagnostics.numeric_literal_too_big(site.clone(), "int"));
            invalid(&builtins.unknown_type, site)
        }
        _ => {
            issues.push(diagnostics.numeric_literal_too_small(site.clone(), "int"));
            invalid(&builtins.unknown_type, site)
        }
    }
}

fn analyse_double_literal(
    text: &str,
    site: SourceCode,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => TypedExpression::DoubleLiteral {
            value,
            ty: builtins.double.clone(),
            site,
        },
        Ok(value) if value.is_infinite() => {
            issues.push(diagnostics.numeric_literal_too_big(site.clone(), "double"));
            invalid(&builtins.unknown_type, site)
        }
        _ => {
            issues.push(diagnostics.numeric_literal_too_small(site.clone(), "double"));
            invalid(&builtins.unknown_type, site)
        }
    }
}

fn analyse_symbol_reference(
    name: &str,
    site: SourceCode,
    scope: &Scope,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    match scope.resolve(name) {
        Some(Symbol::Variable(variable)) => {
            let var_ty = variable.borrow().ty.clone();
            if var_ty.borrow().is_reference() {
                TypedExpression::ReferenceVariableReference {
                    variable,
                    ty: var_ty,
                    site,
                }
            } else {
                TypedExpression::VariableReference {
                    variable,
                    ty: symbol::reference_of(&var_ty),
                    site,
                }
            }
        }
        Some(Symbol::Callable(function)) => {
            let ty = function.borrow().return_type.clone().unwrap_or_else(|| builtins.void.clone());
            TypedExpression::FunctionReference { function, ty, site }
        }
        Some(Symbol::Overload(overload_set)) => {
            // Result type is informational only here; overload resolution
            // happens at the call site against the whole set.
            let ty = builtins.unknown_type.clone();
            TypedExpression::OverloadedFunctionReference { overload_set, ty, site }
        }
        Some(Symbol::Type(_)) => {
            issues.push(diagnostics.invalid_reference_as_expression(site.clone(), name));
            invalid(&builtins.unknown_type, site)
        }
        None => {
            issues.push(diagnostics.unknown_name(site.clone(), name));
            invalid(&builtins.unknown_type, site)
        }
    }
}

fn analyse_this(
    site: SourceCode,
    this_type: Option<&TypeRef>,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    match this_type {
        Some(ty) => TypedExpression::ThisReference {
            ty: symbol::reference_of(ty),
            site,
        },
        None => {
            issues.push(diagnostics.this_reference_outside_method(site.clone()));
            invalid(&builtins.unknown_type, site)
        }
    }
}

fn analyse_member_access(
    receiver: &Expression,
    member: &str,
    member_span: SourceCode,
    span: SourceCode,
    scope: &Scope,
    this_type: Option<&TypeRef>,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    // Static member access (`Type.name`) is not part of this language's
    // surface today (no static fields/methods are ever registered), but the
    // raw grammar allows a bare type name as a receiver, so it is still
    // diagnosed distinctly per spec.md §4.4.
    if let Expression::TypeReferencing(type_expr) = receiver {
        let Ok(ty) = resolve_type::resolve_type_expr(scope, type_expr, diagnostics) else {
            return invalid(&builtins.unknown_type, span);
        };
        issues.push(diagnostics.unknown_static_member_name(member_span, &ty.borrow().name, member));
        return invalid(&builtins.unknown_type, span);
    }

    let typed_receiver = analyse_inner(receiver, scope, this_type, builtins, diagnostics, issues);
    if typed_receiver.is_invalid() {
        return invalid(&builtins.unknown_type, span);
    }
    let receiver_ty = typed_receiver.ty();
    let container = resolve_type::underlying(&receiver_ty);

    if let Some(field) = container.borrow().fields.iter().find(|f| f.borrow().name == member).cloned() {
        let field_ty = field.borrow().ty.clone();
        let result_ty = if receiver_ty.borrow().is_reference() {
            symbol::reference_of(&field_ty)
        } else {
            field_ty
        };
        return TypedExpression::FieldAccess {
            instance: Box::new(typed_receiver),
            field,
            ty: result_ty,
            site: span,
        };
    }

    // Methods are looked up on the reference type first (spec.md: reference
    // types additionally own `assign`, plus any user method written to take
    // a reference receiver).
    let reference_ty = symbol::reference_of(&container);
    let is_method = reference_ty.borrow().methods.contains_key(member) || container.borrow().methods.contains_key(member);
    if is_method {
        // There is no typed-tree node for "a bound but not-yet-called
        // method" (spec.md §3's Typed expression set has none) — `e.foo()`
        // is analysed directly by `analyse_call`, which never reaches this
        // function for its callee. Reaching here means a method was named
        // without being called (`e.foo;`), which is not a legal expression.
        if !receiver_ty.borrow().is_reference() && !container.borrow().methods.contains_key(member) {
            issues.push(diagnostics.reference_method_access_from_non_reference(member_span, &container.borrow().name, member));
        } else {
            issues.push(diagnostics.invalid_reference_as_expression(member_span, member));
        }
        return invalid(&builtins.unknown_type, span);
    }

    issues.push(diagnostics.unknown_object_member(member_span, &container.borrow().name, member));
    invalid(&builtins.unknown_type, span)
}

fn analyse_call(
    callee: &Expression,
    args: &[Expression],
    span: SourceCode,
    scope: &Scope,
    this_type: Option<&TypeRef>,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    if let Expression::TypeReferencing(type_expr) = callee {
        return analyse_cast(type_expr, args, span, scope, this_type, builtins, diagnostics, issues);
    }
    if let Expression::MemberAccess {
        receiver,
        member,
        member_span,
        ..
    } = callee
    {
        return analyse_method_call(receiver, member, member_span.clone(), args, span, scope, this_type, builtins, diagnostics, issues);
    }

    let typed_args = analyse_args(args, scope, this_type, builtins, diagnostics, issues);
    let arg_types: Vec<TypeRef> = typed_args.iter().map(|a| a.ty()).collect();

    match analyse_inner(callee, scope, this_type, builtins, diagnostics, issues) {
        TypedExpression::FunctionReference { function, .. } => {
            call_single(function, typed_args, &arg_types, span, builtins, diagnostics, issues)
        }
        TypedExpression::OverloadedFunctionReference { overload_set, .. } => {
            call_overload_set(&overload_set, typed_args, &arg_types, span, builtins, diagnostics, issues)
        }
        other => {
            if !other.is_invalid() {
                issues.push(diagnostics.expression_is_not_callable(span.clone()));
            }
            invalid(&builtins.unknown_type, span)
        }
    }
}

fn analyse_method_call(
    receiver: &Expression,
    member: &str,
    member_span: SourceCode,
    args: &[Expression],
    span: SourceCode,
    scope: &Scope,
    this_type: Option<&TypeRef>,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    if let Expression::TypeReferencing(type_expr) = receiver {
        let Ok(ty) = resolve_type::resolve_type_expr(scope, type_expr, diagnostics) else {
            return invalid(&builtins.unknown_type, span);
        };
        issues.push(diagnostics.unknown_static_member_name(member_span, &ty.borrow().name, member));
        return invalid(&builtins.unknown_type, span);
    }

    let typed_receiver = analyse_inner(receiver, scope, this_type, builtins, diagnostics, issues);
    if typed_receiver.is_invalid() {
        // Still analyse the arguments so their own errors surface.
        analyse_args(args, scope, this_type, builtins, diagnostics, issues);
        return invalid(&builtins.unknown_type, span);
    }
    let receiver_ty = typed_receiver.ty();
    let container = resolve_type::underlying(&receiver_ty);
    let reference_ty = symbol::reference_of(&container);

    let candidates: Option<symbol::OverloadSet> = reference_ty
        .borrow()
        .methods
        .get(member)
        .cloned()
        .or_else(|| container.borrow().methods.get(member).cloned());

    let Some(candidates) = candidates else {
        issues.push(diagnostics.unknown_object_member(member_span, &container.borrow().name, member));
        analyse_args(args, scope, this_type, builtins, diagnostics, issues);
        return invalid(&builtins.unknown_type, span);
    };

    let is_reference_only = !container.borrow().methods.contains_key(member);
    if is_reference_only && !receiver_ty.borrow().is_reference() {
        issues.push(diagnostics.reference_method_access_from_non_reference(member_span, &container.borrow().name, member));
        analyse_args(args, scope, this_type, builtins, diagnostics, issues);
        return invalid(&builtins.unknown_type, span);
    }

    let typed_args = analyse_args(args, scope, this_type, builtins, diagnostics, issues);
    let arg_types: Vec<TypeRef> = typed_args.iter().map(|a| a.ty()).collect();

    if typed_args.iter().any(TypedExpression::is_invalid) {
        return invalid(&builtins.unknown_type, span);
    }

    match symbol::resolve_overload(&builtins.unknown_type, &candidates.borrow(), &arg_types) {
        OverloadResolution::Unique(method) => {
            let ty = method.borrow().return_type.clone().unwrap_or_else(|| builtins.void.clone());
            let args = coerce_args(typed_args, &method.borrow().param_types(), builtins);
            let instance = coerce_instance(typed_receiver, &method);
            TypedExpression::MethodCall {
                method,
                instance: Box::new(instance),
                args,
                ty,
                site: span,
            }
        }
        OverloadResolution::NoMatch => {
            issues.push(diagnostics.invalid_call_arguments(span.clone(), member));
            invalid(&builtins.unknown_type, span)
        }
        OverloadResolution::Ambiguous(candidates) => {
            let notes = candidates
                .iter()
                .map(|c| diagnostics.candidate_note(c.borrow().definition_site.clone(), &c.borrow().signature_string()))
                .collect();
            issues.push(diagnostics.ambiguous_overloaded_call(span.clone(), member, notes));
            invalid(&builtins.unknown_type, span)
        }
    }
}

fn analyse_args(
    args: &[Expression],
    scope: &Scope,
    this_type: Option<&TypeRef>,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> Vec<TypedExpression> {
    args.iter()
        .map(|a| analyse_inner(a, scope, this_type, builtins, diagnostics, issues))
        .collect()
}

/// Inserts `ImplicitDereferencing` on any argument whose value is a
/// reference type being passed to a by-value parameter (spec.md §4.4).
fn coerce_args(args: Vec<TypedExpression>, param_types: &[TypeRef], _builtins: &Builtins) -> Vec<TypedExpression> {
    args.into_iter()
        .zip(param_types.iter())
        .map(|(arg, param_ty)| {
            if arg.is_invalid() {
                return arg;
            }
            let arg_ty = arg.ty();
            let needs_deref = arg_ty.borrow().is_reference() && !param_ty.borrow().is_reference();
            if needs_deref {
                let site = arg.site();
                TypedExpression::ImplicitDereferencing {
                    ty: symbol::dereferenced(&arg_ty),
                    inner: Box::new(arg),
                    site,
                }
            } else {
                arg
            }
        })
        .collect()
}

fn call_single(
    function: CallableRef,
    typed_args: Vec<TypedExpression>,
    arg_types: &[TypeRef],
    span: SourceCode,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    let name = function.borrow().kind.name();
    let candidates = vec![function];
    match symbol::resolve_overload(&builtins.unknown_type, &candidates, arg_types) {
        OverloadResolution::Unique(function) => {
            let ty = function.borrow().return_type.clone().unwrap_or_else(|| builtins.void.clone());
            let args = coerce_args(typed_args, &function.borrow().param_types(), builtins);
            TypedExpression::FunctionCall { callee: function, args, ty, site: span }
        }
        _ => {
            if !typed_args.iter().any(TypedExpression::is_invalid) {
                issues.push(diagnostics.invalid_call_arguments(span.clone(), &name));
            }
            invalid(&builtins.unknown_type, span)
        }
    }
}

fn call_overload_set(
    overload_set: &symbol::OverloadSet,
    typed_args: Vec<TypedExpression>,
    arg_types: &[TypeRef],
    span: SourceCode,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    let name = overload_set.borrow().first().map(|c| c.borrow().kind.name()).unwrap_or_default();
    // An already-invalid argument (e.g. an unresolved name) is implicitly
    // convertible to every parameter type, which would otherwise turn a
    // single upstream "unknown name" error into a spurious "ambiguous call"
    // or "no match" error on top of it. Suppress that cascade.
    if typed_args.iter().any(TypedExpression::is_invalid) {
        return invalid(&builtins.unknown_type, span);
    }
    match symbol::resolve_overload(&builtins.unknown_type, &overload_set.borrow(), arg_types) {
        OverloadResolution::Unique(function) => {
            let ty = function.borrow().return_type.clone().unwrap_or_else(|| builtins.void.clone());
            let args = coerce_args(typed_args, &function.borrow().param_types(), builtins);
            TypedExpression::FunctionCall { callee: function, args, ty, site: span }
        }
        OverloadResolution::NoMatch => {
            issues.push(diagnostics.invalid_call_arguments(span.clone(), &name));
            invalid(&builtins.unknown_type, span)
        }
        OverloadResolution::Ambiguous(candidates) => {
            let notes = candidates
                .iter()
                .map(|c| diagnostics.candidate_note(c.borrow().definition_site.clone(), &c.borrow().signature_string()))
                .collect();
            issues.push(diagnostics.ambiguous_overloaded_call(span.clone(), &name, notes));
            invalid(&builtins.unknown_type, span)
        }
    }
}

fn analyse_cast(
    type_expr: &crate::parser::raw::TypeExpr,
    args: &[Expression],
    span: SourceCode,
    scope: &Scope,
    this_type: Option<&TypeRef>,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    let target = match resolve_type::resolve_type_expr(scope, type_expr, diagnostics) {
        Ok(t) => t,
        Err(_) => {
            issues.push(diagnostics.non_type_expression_as_cast_target(span.clone()));
            analyse_args(args, scope, this_type, builtins, diagnostics, issues);
            return invalid(&builtins.unknown_type, span);
        }
    };

    let typed_args = analyse_args(args, scope, this_type, builtins, diagnostics, issues);
    let arg_types: Vec<TypeRef> = typed_args.iter().map(|a| a.ty()).collect();

    let value_target = resolve_type::underlying(&target);
    match value_target.borrow().resolve_constructor(&builtins.unknown_type, &arg_types) {
        Some(constructor) => {
            let ret = constructor.borrow().return_type.clone();
            if let Some(ret) = ret {
                if !Rc::ptr_eq(&ret, &target) {
                    issues.push(diagnostics.invalid_conversion_function_return_type(
                        span.clone(),
                        &target.borrow().name,
                        &ret.borrow().name,
                    ));
                    return invalid(&builtins.unknown_type, span);
                }
            }
            let args = coerce_args(typed_args, &constructor.borrow().param_types(), builtins);
            TypedExpression::ConstructorCall {
                constructor,
                args,
                ty: target,
                site: span,
            }
        }
        None => {
            let from = arg_types.first().map(|t| t.borrow().name.clone()).unwrap_or_else(|| "void".to_string());
            issues.push(diagnostics.no_type_conversion_function(span.clone(), &from, &target.borrow().name));
            invalid(&builtins.unknown_type, span)
        }
    }
}

fn operator_method_name(op: InfixOp) -> &'static str {
    match op {
        InfixOp::Add => "plus",
        InfixOp::Sub => "minus",
        InfixOp::Mul => "times",
        InfixOp::Div => "divide",
        InfixOp::Lt => "lessThan",
        InfixOp::Gt => "greaterThan",
        InfixOp::Le => "lessOrEqual",
        InfixOp::Ge => "greaterOrEqual",
        InfixOp::Eq => "equals",
        InfixOp::Ne => "notEquals",
        InfixOp::And => "and",
        InfixOp::Or => "or",
        InfixOp::Assign => "assign",
    }
}

fn operator_symbol(op: InfixOp) -> &'static str {
    match op {
        InfixOp::Add => "+",
        InfixOp::Sub => "-",
        InfixOp::Mul => "*",
        InfixOp::Div => "/",
        InfixOp::Lt => "<",
        InfixOp::Gt => ">",
        InfixOp::Le => "<=",
        InfixOp::Ge => ">=",
        InfixOp::Eq => "==",
        InfixOp::Ne => "!=",
        InfixOp::And => "&&",
        InfixOp::Or => "||",
        InfixOp::Assign => "=",
    }
}

#[allow(clippy::too_many_arguments)]
fn analyse_infix(
    op: InfixOp,
    op_span: SourceCode,
    left: &Expression,
    right: &Expression,
    span: SourceCode,
    scope: &Scope,
    this_type: Option<&TypeRef>,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    let typed_left = analyse_inner(left, scope, this_type, builtins, diagnostics, issues);

    if let Expression::Malformed(_) = right {
        issues.push(diagnostics.missing_right_operand(op_span, operator_symbol(op)));
        return invalid(&builtins.unknown_type, span);
    }
    let typed_right = analyse_inner(right, scope, this_type, builtins, diagnostics, issues);

    if typed_left.is_invalid() || typed_right.is_invalid() {
        return invalid(&builtins.unknown_type, span);
    }

    // `=` desugars to `lhs.assign(rhs)`: the left side must stay a
    // reference (no dereference inserted), the receiver container is the
    // *value* type the reference aliases.
    let left_ty = typed_left.ty();
    let receiver_container = resolve_type::underlying(&left_ty);
    let method_name = operator_method_name(op);

    let reference_ty = symbol::reference_of(&receiver_container);
    let method_set = if op == InfixOp::Assign {
        reference_ty.borrow().methods.get(method_name).cloned()
    } else {
        receiver_container
            .borrow()
            .methods
            .get(method_name)
            .cloned()
            .or_else(|| reference_ty.borrow().methods.get(method_name).cloned())
    };

    let Some(method_set) = method_set else {
        issues.push(diagnostics.undefined_operator(span.clone(), method_name, &receiver_container.borrow().name));
        return invalid(&builtins.unknown_type, span);
    };

    let arg_types = [typed_right.ty()];
    match symbol::resolve_overload(&builtins.unknown_type, &method_set.borrow(), &arg_types) {
        OverloadResolution::Unique(method) => {
            let ty = method.borrow().return_type.clone().unwrap_or_else(|| builtins.void.clone());
            let args = coerce_args(vec![typed_right], &method.borrow().param_types(), builtins);
            let instance = coerce_instance(typed_left, &method);
            TypedExpression::MethodCall {
                method,
                instance: Box::new(instance),
                args,
                ty,
                site: span,
            }
        }
        OverloadResolution::NoMatch => {
            issues.push(diagnostics.undefined_operator(span.clone(), method_name, &receiver_container.borrow().name));
            invalid(&builtins.unknown_type, span)
        }
        OverloadResolution::Ambiguous(candidates) => {
            let notes = candidates
                .iter()
                .map(|c| diagnostics.candidate_note(c.borrow().definition_site.clone(), &c.borrow().signature_string()))
                .collect();
            issues.push(diagnostics.ambiguous_overloaded_call(span.clone(), method_name, notes));
            invalid(&builtins.unknown_type, span)
        }
    }
}

fn analyse_prefix(
    op: PrefixOp,
    op_span: SourceCode,
    operand: &Expression,
    span: SourceCode,
    scope: &Scope,
    this_type: Option<&TypeRef>,
    builtins: &Builtins,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    let typed_operand = analyse_inner(operand, scope, this_type, builtins, diagnostics, issues);
    if typed_operand.is_invalid() {
        return invalid(&builtins.unknown_type, span);
    }
    let operand_ty = typed_operand.ty();
    let container = resolve_type::underlying(&operand_ty);
    let method_name = match op {
        PrefixOp::Not => "not",
        PrefixOp::Neg => "unaryMinus",
    };

    let Some(method_set) = container.borrow().methods.get(method_name).cloned() else {
        issues.push(diagnostics.undefined_operator(op_span, method_name, &container.borrow().name));
        return invalid(&builtins.unknown_type, span);
    };

    match symbol::resolve_overload(&builtins.unknown_type, &method_set.borrow(), &[]) {
        OverloadResolution::Unique(method) => {
            let ty = method.borrow().return_type.clone().unwrap_or_else(|| builtins.void.clone());
            let instance = coerce_instance(typed_operand, &method);
            TypedExpression::MethodCall {
                method,
                instance: Box::new(instance),
                args: vec![],
                ty,
                site: span,
            }
        }
        _ => {
            issues.push(diagnostics.undefined_operator(op_span, method_name, &container.borrow().name));
            invalid(&builtins.unknown_type, span)
        }
    }
}
