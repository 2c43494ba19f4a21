//! Statement analyser (spec.md §4.5): variable definitions, control flow,
//! return-path checking and reachability, all driven by one [`BodyContext`]
//! threaded down from the enclosing function/method/constructor.

use crate::{
    diagnostics::Diagnostics,
    parser::raw::{self, Statement},
    sema::{
        builtins::Builtins,
        expr, resolve_type,
        scope::{Scope, Symbol},
        symbol::{self, OverloadResolution, TypeRef, VariableData},
        typed::{statement_always_returns, TypedCodeBlock, TypedExpression, TypedStatement},
    },
    Issue, SourceCode,
};

/// What the enclosing body needs every statement analysed against: the
/// declared return type (`None` only inside a constructor), whether we are
/// inside a constructor at all (`return <expr>` is illegal there), and the
/// containing type for `this` (`None` at free-function scope).
pub struct BodyContext {
    pub expected_return_type: Option<TypeRef>,
    pub is_constructor: bool,
    pub this_type: Option<TypeRef>,
}

pub fn analyse_block(
    block: &raw::CodeBlock,
    scope: &Scope,
    builtins: &Builtins,
    context: &BodyContext,
    diagnostics: &Diagnostics,
) -> (TypedCodeBlock, Vec<Issue>) {
    let inner = scope.child();
    let mut issues = Vec::new();
    let mut statements = Vec::new();
    let mut reported_unreachable = false;

    for raw_statement in &block.statements {
        if !reported_unreachable && statements.last().is_some_and(statement_always_returns) {
            issues.push(diagnostics.unreachable_code(raw_statement.span()));
            reported_unreachable = true;
        }
        analyse_statement(raw_statement, &inner, builtins, context, diagnostics, &mut issues, &mut statements);
    }

    (TypedCodeBlock { statements }, issues)
}

fn analyse_statement(
    raw: &Statement,
    scope: &Scope,
    builtins: &Builtins,
    context: &BodyContext,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
    out: &mut Vec<TypedStatement>,
) {
    match raw {
        Statement::Expression(expression) => {
            let (typed, mut expr_issues) = expr::analyse(expression, scope, context.this_type.as_ref(), builtins, diagnostics);
            issues.append(&mut expr_issues);
            out.push(TypedStatement::Expression(typed));
        }
        Statement::Block(inner_block) => {
            let (typed, mut block_issues) = analyse_block(inner_block, scope, builtins, context, diagnostics);
            issues.append(&mut block_issues);
            out.push(TypedStatement::Block(typed));
        }
        Statement::VariableDefinition(def) => {
            analyse_variable_definition(def, scope, builtins, context, diagnostics, issues, out);
        }
        Statement::IfElse {
            condition,
            then_branch,
            else_branch,
            span,
        } => {
            analyse_if_else(condition, then_branch, else_branch.as_ref(), span.clone(), scope, builtins, context, diagnostics, issues, out);
        }
        Statement::While { condition, body, span } => {
            analyse_while(condition, body, span.clone(), scope, builtins, context, diagnostics, issues, out);
        }
        Statement::Return { value, span } => {
            analyse_return(value.as_ref(), span.clone(), scope, builtins, context, diagnostics, issues, out);
        }
    }
}

fn analyse_variable_definition(
    def: &raw::VariablesDefinition,
    scope: &Scope,
    builtins: &Builtins,
    context: &BodyContext,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
    out: &mut Vec<TypedStatement>,
) {
    let declared_type = match resolve_type::resolve_type_expr(scope, &def.type_expr, diagnostics) {
        Ok(t) => t,
        Err(issue) => {
            issues.push(issue);
            builtins.unknown_type.clone()
        }
    };

    for declarator in &def.declarators {
        let variable = VariableData::new(declarator.name.clone(), declared_type.clone(), Some(declarator.name_span.clone()));

        issues.extend(scope.add_entity(&declarator.name, Symbol::Variable(variable.clone()), *diagnostics));

        let (args, constructor) = match &declarator.initializer {
            Some(init_expr) => {
                let (typed_init, mut init_issues) = expr::analyse(init_expr, scope, context.this_type.as_ref(), builtins, diagnostics);
                issues.append(&mut init_issues);
                if typed_init.is_invalid() {
                    (vec![], None)
                } else {
                    let arg_types = [typed_init.ty()];
                    match symbol::resolve_overload(&builtins.unknown_type, &declared_type.borrow().constructors, &arg_types) {
                        OverloadResolution::Unique(ctor) => {
                            let args = coerce_single(typed_init, &ctor.borrow().param_types());
                            (args, Some(ctor))
                        }
                        _ => {
                            issues.push(diagnostics.incompatible_variable_initializer(
                                declarator.span.clone(),
                                &declared_type.borrow().name,
                            ));
                            (vec![typed_init], None)
                        }
                    }
                }
            }
            None => {
                let default = declared_type.borrow().constructors.iter().find(|c| c.borrow().params.is_empty()).cloned();
                if default.is_none() {
                    issues.push(diagnostics.non_plain_variable_without_initializer(
                        declarator.span.clone(),
                        &declared_type.borrow().name,
                    ));
                }
                (vec![], default)
            }
        };

        out.push(TypedStatement::VariableConstructorCall {
            variable,
            constructor,
            args,
            site: declarator.span.clone(),
        });
    }
}

fn coerce_single(arg: TypedExpression, param_types: &[TypeRef]) -> Vec<TypedExpression> {
    let Some(param_ty) = param_types.first() else {
        return vec![arg];
    };
    let arg_ty = arg.ty();
    if arg_ty.borrow().is_reference() && !param_ty.borrow().is_reference() {
        let site = arg.site();
        vec![TypedExpression::ImplicitDereferencing {
            ty: symbol::dereferenced(&arg_ty),
            inner: Box::new(arg),
            site,
        }]
    } else {
        vec![arg]
    }
}

/// Coerces a condition/return-value expression to a plain (non-reference)
/// value of `target`, inserting `ImplicitDereferencing` when the expression
/// is reference-typed. Caller has already confirmed convertibility.
fn coerce_to_value(expression: TypedExpression, target: &TypeRef) -> TypedExpression {
    let ty = expression.ty();
    if ty.borrow().is_reference() && !target.borrow().is_reference() {
        let site = expression.site();
        TypedExpression::ImplicitDereferencing {
            ty: symbol::dereferenced(&ty),
            inner: Box::new(expression),
            site,
        }
    } else {
        expression
    }
}

#[allow(clippy::too_many_arguments)]
fn analyse_if_else(
    condition: &raw::Expression,
    then_branch: &raw::CodeBlock,
    else_branch: Option<&raw::CodeBlock>,
    span: SourceCode,
    scope: &Scope,
    builtins: &Builtins,
    context: &BodyContext,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
    out: &mut Vec<TypedStatement>,
) {
    let condition = analyse_condition(condition, "if", scope, builtins, context, diagnostics, issues);
    let (then_typed, mut then_issues) = analyse_block(then_branch, scope, builtins, context, diagnostics);
    issues.append(&mut then_issues);
    let else_typed = else_branch.map(|block| {
        let (typed, mut else_issues) = analyse_block(block, scope, builtins, context, diagnostics);
        issues.append(&mut else_issues);
        typed
    });

    out.push(TypedStatement::IfElse {
        condition,
        then_branch: then_typed,
        else_branch: else_typed,
        site: span,
    });
}

#[allow(clippy::too_many_arguments)]
fn analyse_while(
    condition: &raw::Expression,
    body: &raw::CodeBlock,
    span: SourceCode,
    scope: &Scope,
    builtins: &Builtins,
    context: &BodyContext,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
    out: &mut Vec<TypedStatement>,
) {
    let condition = analyse_condition(condition, "while", scope, builtins, context, diagnostics, issues);
    let (body_typed, mut body_issues) = analyse_block(body, scope, builtins, context, diagnostics);
    issues.append(&mut body_issues);

    out.push(TypedStatement::While {
        condition,
        body: body_typed,
        site: span,
    });
}

fn analyse_condition(
    condition: &raw::Expression,
    context_label: &str,
    scope: &Scope,
    builtins: &Builtins,
    context: &BodyContext,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
) -> TypedExpression {
    let (typed, mut cond_issues) = expr::analyse(condition, scope, context.this_type.as_ref(), builtins, diagnostics);
    issues.append(&mut cond_issues);
    if typed.is_invalid() {
        return typed;
    }
    let ty = typed.ty();
    if !symbol::is_implicitly_convertible(&builtins.unknown_type, &ty, &builtins.bool_) {
        issues.push(diagnostics.invalid_condition_type(typed.site(), context_label, &ty.borrow().name));
        return typed;
    }
    coerce_to_value(typed, &builtins.bool_)
}

#[allow(clippy::too_many_arguments)]
fn analyse_return(
    value: Option<&raw::Expression>,
    span: SourceCode,
    scope: &Scope,
    builtins: &Builtins,
    context: &BodyContext,
    diagnostics: &Diagnostics,
    issues: &mut Vec<Issue>,
    out: &mut Vec<TypedStatement>,
) {
    if context.is_constructor {
        issues.push(diagnostics.return_from_constructor(span.clone()));
        if let Some(value) = value {
            let (_, mut value_issues) = expr::analyse(value, scope, context.this_type.as_ref(), builtins, diagnostics);
            issues.append(&mut value_issues);
        }
        out.push(TypedStatement::Return { value: None, site: span });
        return;
    }

    let expected = context.expected_return_type.clone().unwrap_or_else(|| builtins.void.clone());
    let is_void = std::rc::Rc::ptr_eq(&expected, &builtins.void);

    match value {
        Some(raw_value) => {
            let (typed, mut value_issues) = expr::analyse(raw_value, scope, context.this_type.as_ref(), builtins, diagnostics);
            issues.append(&mut value_issues);
            if typed.is_invalid() {
                out.push(TypedStatement::Return { value: Some(typed), site: span });
                return;
            }
            let ty = typed.ty();
            if !symbol::is_implicitly_convertible(&builtins.unknown_type, &ty, &expected) {
                issues.push(diagnostics.incompatible_return_type(span.clone(), &expected.borrow().name, &ty.borrow().name));
                out.push(TypedStatement::Return { value: Some(typed), site: span });
                return;
            }
            out.push(TypedStatement::Return {
                value: Some(coerce_to_value(typed, &expected)),
                site: span,
            });
        }
        None => {
            if !is_void {
                issues.push(diagnostics.return_without_value(span.clone(), &expected.borrow().name));
            }
            out.push(TypedStatement::Return { value: None, site: span });
        }
    }
}
