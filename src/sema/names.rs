//! Name resolution (spec.md §4.2): the four ordered registration passes
//! over the root raw tree, plus post-pass-4 entry-point validation.

use std::{cell::RefCell, rc::Rc};

use crate::{
    diagnostics::Diagnostics,
    parser::raw::{self, GlobalDefinition, Member, Specifier, TypeDefinition},
    sema::{
        builtins::{self, Builtins},
        expr, resolve_type,
        scope::{Scope, Symbol},
        stmt,
        symbol::{self, Callable, CallableKind, OverloadResolution, TypeRef, VariableData},
        typed::{TypedCodeBlock, TypedExpression, TypedStatement},
    },
    source::LineCol,
    Issue, SourceCode,
};

pub struct Analysis {
    pub root: Scope,
    pub builtins: Builtins,
    /// One `VariableConstructorCall` per global declarator (spec.md §6's
    /// `VariableDefinition := name, Option<Expression>`), in source order;
    /// the backend runs these before calling `co_main`.
    pub global_initializers: Vec<TypedStatement>,
    pub issues: Vec<Issue>,
}

/// `file` is used only to anchor whole-program diagnostics (currently just
/// `MissingMainFunction`) that have no narrower source location.
pub fn analyse(program: &raw::Program, file: Rc<str>, diagnostics: Diagnostics) -> Analysis {
    let root = Scope::new_root();
    let builtins = builtins::install(&root);
    let mut issues = Vec::new();

    let type_defs: Vec<&TypeDefinition> = program
        .globals
        .iter()
        .filter_map(|g| match g {
            GlobalDefinition::Type(def) => Some(def),
            _ => None,
        })
        .collect();

    // Pass 1: register types.
    let mut types: Vec<TypeRef> = Vec::new();
    for def in &type_defs {
        let ty = crate::sema::symbol::TypeData::new_value_type(def.name.clone(), false, Some(def.name_span.clone()));
        issues.extend(root.add_entity(&def.name, Symbol::Type(ty.clone()), diagnostics));
        types.push(ty);
    }

    // Pass 2: register field/method/constructor stubs.
    for (def, ty) in type_defs.iter().zip(types.iter()) {
        register_members(def, ty, &root, &builtins, diagnostics, &mut issues);
        install_synthesised_constructors(ty);
    }

    // Pass 3: register free functions and global variables.
    let mut global_variables = Vec::new();
    for global in &program.globals {
        match global {
            GlobalDefinition::Function(def) => {
                register_function(def, &root, &builtins, diagnostics, &mut issues);
            }
            GlobalDefinition::Variables(def) => {
                global_variables.push(def);
            }
            GlobalDefinition::Type(_) => {}
        }
    }
    for def in &global_variables {
        register_global_variables(def, &root, &builtins, diagnostics, &mut issues);
    }

    // Pass 4: analyse bodies.
    for (def, ty) in type_defs.iter().zip(types.iter()) {
        analyse_type_bodies(def, ty, &root, &builtins, diagnostics, &mut issues);
    }
    for global in &program.globals {
        if let GlobalDefinition::Function(def) = global {
            analyse_function_body(def, &root, &builtins, diagnostics, &mut issues);
        }
    }
    let mut global_initializers = Vec::new();
    for def in &global_variables {
        analyse_global_variable_initializers(def, &root, &builtins, diagnostics, &mut issues, &mut global_initializers);
    }

    validate_entry_point(&root, &builtins, diagnostics, file, &mut issues);

    Analysis {
        root,
        builtins,
        global_initializers,
        issues,
    }
}

/// Pass 4 for global variables: each declarator was already bound to a
/// `VariableData` in pass 3 (so forward references among globals and
/// functions resolve); this analyses its initializer the same way
/// `stmt::analyse_variable_definition` does for locals, but at root scope
/// (no `this`).
fn analyse_global_variable_initializers(
    def: &raw::VariablesDefinition,
    root: &Scope,
    builtins: &Builtins,
    diagnostics: Diagnostics,
    issues: &mut Vec<Issue>,
    out: &mut Vec<TypedStatement>,
) {
    let declared_type = match resolve_type::resolve_type_expr(root, &def.type_expr, &diagnostics) {
        Ok(t) => t,
        Err(_) => builtins.unknown_type.clone(),
    };

    for declarator in &def.declarators {
        let Some(Symbol::Variable(variable)) = root.resolve_local(&declarator.name) else {
            continue;
        };

        let (args, constructor) = match &declarator.initializer {
            Some(init_expr) => {
                let (typed_init, mut init_issues) = expr::analyse(init_expr, root, None, builtins, &diagnostics);
                issues.append(&mut init_issues);
                if typed_init.is_invalid() {
                    (vec![], None)
                } else {
                    let arg_types = [typed_init.ty()];
                    match symbol::resolve_overload(&builtins.unknown_type, &declared_type.borrow().constructors, &arg_types) {
                        OverloadResolution::Unique(ctor) => {
                            let param_types = ctor.borrow().param_types();
                            let arg = if typed_init.ty().borrow().is_reference() && !param_types[0].borrow().is_reference() {
                                let site = typed_init.site();
                                TypedExpression::ImplicitDereferencing {
                                    ty: symbol::dereferenced(&typed_init.ty()),
                                    inner: Box::new(typed_init),
                                    site,
                                }
                            } else {
                                typed_init
                            };
                            (vec![arg], Some(ctor))
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

fn register_members(
    def: &TypeDefinition,
    ty: &TypeRef,
    root: &Scope,
    builtins: &Builtins,
    diagnostics: Diagnostics,
    issues: &mut Vec<Issue>,
) {
    for member in &def.members {
        match member {
            Member::Field(field) => {
                let field_ty = match resolve_type::resolve_type_expr(root, &field.type_expr, &diagnostics) {
                    Ok(t) => t,
                    Err(issue) => {
                        issues.push(issue);
                        builtins.unknown_type.clone()
                    }
                };
                let variable = VariableData::new(field.name.clone(), field_ty, Some(field.name_span.clone()));
                issues.extend(ty.borrow_mut().add_field(variable, diagnostics));
            }
            Member::Method(method) => {
                let native = method.specifiers.iter().any(|(s, _)| *s == Specifier::Native);
                if native && method.body.is_some() {
                    issues.push(diagnostics.native_method_with_body(method.span.clone(), &def.name, &method.name));
                }
                if !native && method.body.is_none() {
                    issues.push(diagnostics.method_definition_without_body(method.span.clone(), &def.name, &method.name));
                }
                let return_type = match resolve_type::resolve_type_expr(root, &method.return_type, &diagnostics) {
                    Ok(t) => t,
                    Err(issue) => {
                        issues.push(issue);
                        builtins.unknown_type.clone()
                    }
                };
                let params = resolve_params(&method.params, root, &diagnostics, builtins, issues);
                let callable = Rc::new(RefCell::new(Callable {
                    kind: CallableKind::Method {
                        name: method.name.clone(),
                        container: ty.clone(),
                    },
                    params,
                    return_type: Some(return_type),
                    native,
                    body: RefCell::new(TypedCodeBlock::empty()),
                    definition_site: Some(method.span.clone()),
                }));
                issues.extend(ty.borrow_mut().add_method(&method.name, callable, diagnostics));
            }
            Member::Constructor(ctor) => {
                let native = ctor.specifiers.iter().any(|(s, _)| *s == Specifier::Native);
                if native && ctor.body.is_some() {
                    issues.push(diagnostics.native_constructor_with_body(ctor.span.clone(), &def.name));
                }
                if !native && ctor.body.is_none() {
                    issues.push(diagnostics.constructor_definition_without_body(ctor.span.clone(), &def.name));
                }
                let params = resolve_params(&ctor.params, root, &diagnostics, builtins, issues);
                let callable = Rc::new(RefCell::new(Callable {
                    kind: CallableKind::Constructor { container: ty.clone() },
                    params,
                    return_type: None,
                    native,
                    body: RefCell::new(TypedCodeBlock::empty()),
                    definition_site: Some(ctor.span.clone()),
                }));
                issues.extend(ty.borrow_mut().add_constructor(callable, diagnostics));
            }
        }
    }
}

/// The default/copy constructors every user type receives automatically
/// (spec.md §3); bypasses `add_constructor`'s copy-constructor rejection,
/// which exists to reject *user-written* ones.
fn install_synthesised_constructors(ty: &TypeRef) {
    let has_default = ty.borrow().constructors.iter().any(|c| c.borrow().params.is_empty());
    if !has_default {
        let ctor = Rc::new(RefCell::new(Callable {
            kind: CallableKind::Constructor { container: ty.clone() },
            params: vec![],
            return_type: None,
            native: true,
            body: RefCell::new(TypedCodeBlock::empty()),
            definition_site: None,
        }));
        ty.borrow_mut().constructors.push(ctor);
    }
    let copy_param = VariableData::new("other", ty.clone(), None);
    let copy_ctor = Rc::new(RefCell::new(Callable {
        kind: CallableKind::Constructor { container: ty.clone() },
        params: vec![copy_param],
        return_type: None,
        native: true,
        body: RefCell::new(TypedCodeBlock::empty()),
        definition_site: None,
    }));
    ty.borrow_mut().constructors.push(copy_ctor);
}

fn resolve_params(
    params: &[raw::Parameter],
    root: &Scope,
    diagnostics: &Diagnostics,
    builtins: &Builtins,
    issues: &mut Vec<Issue>,
) -> Vec<crate::sema::symbol::VariableRef> {
    params
        .iter()
        .map(|p| {
            let ty = match resolve_type::resolve_type_expr(root, &p.type_expr, diagnostics) {
                Ok(t) => t,
                Err(issue) => {
                    issues.push(issue);
                    builtins.unknown_type.clone()
                }
            };
            VariableData::new(p.name.clone(), ty, Some(p.name_span.clone()))
        })
        .collect()
}

fn register_function(
    def: &raw::FunctionDefinition,
    root: &Scope,
    builtins: &Builtins,
    diagnostics: Diagnostics,
    issues: &mut Vec<Issue>,
) {
    let native = def.specifiers.iter().any(|(s, _)| *s == Specifier::Native);
    if native && def.body.is_some() {
        issues.push(diagnostics.native_function_with_body(def.span.clone(), &def.name));
    }
    if !native && def.body.is_none() {
        issues.push(diagnostics.function_definition_without_body(def.span.clone(), &def.name));
    }
    if let Some(marker) = &def.reference_marker {
        issues.push(diagnostics.reference_marker_in_function_definition(marker.clone(), &def.name));
    }
    let return_type = match resolve_type::resolve_type_expr(root, &def.return_type, &diagnostics) {
        Ok(t) => t,
        Err(issue) => {
            issues.push(issue);
            builtins.unknown_type.clone()
        }
    };
    let params = resolve_params(&def.params, root, &diagnostics, builtins, issues);
    let callable = Rc::new(RefCell::new(Callable {
        kind: CallableKind::Function { name: def.name.clone() },
        params,
        return_type: Some(return_type),
        native,
        body: RefCell::new(TypedCodeBlock::empty()),
        definition_site: Some(def.span.clone()),
    }));
    issues.extend(root.add_function(&def.name, callable, diagnostics));
}

fn register_global_variables(
    def: &raw::VariablesDefinition,
    root: &Scope,
    builtins: &Builtins,
    diagnostics: Diagnostics,
    issues: &mut Vec<Issue>,
) {
    let ty = match resolve_type::resolve_type_expr(root, &def.type_expr, &diagnostics) {
        Ok(t) => t,
        Err(issue) => {
            issues.push(issue);
            builtins.unknown_type.clone()
        }
    };
    for declarator in &def.declarators {
        let variable = VariableData::new(declarator.name.clone(), ty.clone(), Some(declarator.name_span.clone()));
        issues.extend(root.add_entity(&declarator.name, Symbol::Variable(variable), diagnostics));
    }
}

fn analyse_type_bodies(
    def: &TypeDefinition,
    ty: &TypeRef,
    root: &Scope,
    builtins: &Builtins,
    diagnostics: Diagnostics,
    issues: &mut Vec<Issue>,
) {
    for member in &def.members {
        match member {
            Member::Method(method) => {
                let Some(body) = &method.body else { continue };
                let callable = find_method(ty, &method.name, method.span.clone());
                let Some(callable) = callable else { continue };
                analyse_callable_body(&callable, body, root, builtins, diagnostics, issues, Some(ty.clone()));
            }
            Member::Constructor(ctor) => {
                let Some(body) = &ctor.body else { continue };
                let Some(callable) = find_constructor(ty, ctor.span.clone()) else { continue };
                analyse_callable_body(&callable, body, root, builtins, diagnostics, issues, Some(ty.clone()));
            }
            Member::Field(_) => {}
        }
    }
}

fn find_method(ty: &TypeRef, name: &str, site: crate::SourceCode) -> Option<crate::sema::symbol::CallableRef> {
    ty.borrow()
        .methods
        .get(name)
        .and_then(|set| set.borrow().iter().find(|c| c.borrow().definition_site == Some(site.clone())).cloned())
}

fn find_constructor(ty: &TypeRef, site: crate::SourceCode) -> Option<crate::sema::symbol::CallableRef> {
    ty.borrow()
        .constructors
        .iter()
        .find(|c| c.borrow().definition_site == Some(site.clone()))
        .cloned()
}

fn analyse_function_body(
    def: &raw::FunctionDefinition,
    root: &Scope,
    builtins: &Builtins,
    diagnostics: Diagnostics,
    issues: &mut Vec<Issue>,
) {
    let Some(body) = &def.body else { return };
    let Some(Symbol::Callable(callable)) = root.resolve(&def.name) else {
        return find_overloaded_and_analyse(&def.name, def.span.clone(), body, root, builtins, diagnostics, issues);
    };
    analyse_callable_body(&callable, body, root, builtins, diagnostics, issues, None);
}

fn find_overloaded_and_analyse(
    name: &str,
    site: crate::SourceCode,
    body: &raw::CodeBlock,
    root: &Scope,
    builtins: &Builtins,
    diagnostics: Diagnostics,
    issues: &mut Vec<Issue>,
) {
    if let Some(Symbol::Overload(set)) = root.resolve(name) {
        if let Some(callable) = set.borrow().iter().find(|c| c.borrow().definition_site == Some(site.clone())).cloned() {
            analyse_callable_body(&callable, body, root, builtins, diagnostics, issues, None);
        }
    }
}

fn analyse_callable_body(
    callable: &crate::sema::symbol::CallableRef,
    body: &raw::CodeBlock,
    root: &Scope,
    builtins: &Builtins,
    diagnostics: Diagnostics,
    issues: &mut Vec<Issue>,
    this_type: Option<TypeRef>,
) {
    let inner = root.child();
    let params = callable.borrow().params.clone();
    for param in &params {
        let name = param.borrow().name.clone();
        issues.extend(inner.add_entity(&name, Symbol::Variable(param.clone()), diagnostics));
    }
    let context = stmt::BodyContext {
        expected_return_type: callable.borrow().return_type.clone(),
        is_constructor: matches!(callable.borrow().kind, CallableKind::Constructor { .. }),
        this_type,
    };
    let (typed_block, mut body_issues) = stmt::analyse_block(body, &inner, builtins, &context, &diagnostics);
    issues.append(&mut body_issues);

    if !context.is_constructor {
        let expects_value = context
            .expected_return_type
            .as_ref()
            .map(|t| !Rc::ptr_eq(t, &builtins.void))
            .unwrap_or(false);
        if expects_value && !crate::sema::typed::block_always_returns(&typed_block) {
            issues.push(diagnostics.missing_return_statement(body.span.clone(), &callable.borrow().kind.name()));
        }
    }

    *callable.borrow().body.borrow_mut() = typed_block;
}

fn validate_entry_point(
    root: &Scope,
    builtins: &Builtins,
    diagnostics: Diagnostics,
    file: Rc<str>,
    issues: &mut Vec<Issue>,
) {
    let whole_program = SourceCode::point(file, LineCol::new(1, 1));
    match root.resolve("main") {
        None => issues.push(diagnostics.missing_main_function(whole_program)),
        Some(Symbol::Callable(callable)) => {
            let ok = callable.borrow().params.is_empty()
                && callable
                    .borrow()
                    .return_type
                    .as_ref()
                    .is_some_and(|t| Rc::ptr_eq(t, &builtins.void));
            if !ok {
                let site = callable.borrow().definition_site.clone().unwrap_or(whole_program);
                issues.push(diagnostics.invalid_main_function_signature(site));
            }
        }
        Some(other) => {
            let site = other.definition_site().unwrap_or(whole_program);
            issues.push(diagnostics.main_is_not_function(site));
        }
    }
}
