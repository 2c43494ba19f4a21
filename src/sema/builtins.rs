//! The native standard environment: primitive types (`int`, `double`,
//! `bool`, `void`) with their operator methods, and the handful of native
//! free functions the example programs in spec.md §8 call (`writeIntLn` and
//! friends). None of this is user-writable CO source — it is installed
//! directly into the root namespace before pass 1 runs, the same role the
//! teacher's `TypeScope` gives its builtin-type bootstrapping.

use std::{cell::RefCell, rc::Rc};

use crate::sema::{
    scope::{Scope, Symbol},
    symbol::{Callable, CallableKind, TypeData, TypeRef, VariableData},
    typed::TypedCodeBlock,
};

/// The primitive types and native free functions every CO program sees,
/// plus the sentinel `unknownType` used to suppress cascading diagnostics.
pub struct Builtins {
    pub unknown_type: TypeRef,
    pub int: TypeRef,
    pub double: TypeRef,
    pub bool_: TypeRef,
    pub void: TypeRef,
}

/// Installs the primitive types, their operator methods, default/copy
/// constructors, and the native free function library into `root`.
pub fn install(root: &Scope) -> Builtins {
    let unknown_type = TypeData::new_value_type("unknownType", true, None);
    let int = TypeData::new_value_type("int", true, None);
    let double = TypeData::new_value_type("double", true, None);
    let bool_ = TypeData::new_value_type("bool", true, None);
    let void = TypeData::new_value_type("void", true, None);

    for (name, ty) in [
        ("int", &int),
        ("double", &double),
        ("bool", &bool_),
        ("void", &void),
    ] {
        root.add_entity(name, Symbol::Type(ty.clone()), diagnostics_stub())
            .into_iter()
            .for_each(drop);
    }

    install_numeric_operators(&int, &int);
    install_numeric_operators(&double, &double);
    install_comparison_operators(&int, &int, &bool_);
    install_comparison_operators(&double, &double, &bool_);
    install_equality_operators(&int, &bool_);
    install_equality_operators(&double, &bool_);
    install_equality_operators(&bool_, &bool_);
    install_boolean_operators(&bool_);
    install_default_and_copy_constructors(&int);
    install_default_and_copy_constructors(&double);
    install_default_and_copy_constructors(&bool_);

    install_native_function(root, "writeIntLn", vec![("value", int.clone())], void.clone());
    install_native_function(root, "writeDoubleLn", vec![("value", double.clone())], void.clone());
    install_native_function(root, "writeBoolLn", vec![("value", bool_.clone())], void.clone());
    install_native_function(root, "println", vec![("value", int.clone())], void.clone());
    install_native_function(root, "println", vec![("value", double.clone())], void.clone());
    install_native_function(root, "println", vec![("value", bool_.clone())], void.clone());
    install_native_function(root, "assert", vec![("condition", bool_.clone())], void.clone());

    Builtins {
        unknown_type,
        int,
        double,
        bool_,
        void,
    }
}

/// `add_entity`/`add_function` both want a `Diagnostics`, but nothing this
/// module registers can ever collide (it runs once, before any user name is
/// visible), so its issues are always empty and safely discarded.
fn diagnostics_stub() -> crate::Diagnostics {
    crate::Diagnostics::new(crate::diagnostics::Locale::En)
}

fn native_method(container: &TypeRef, name: &str, params: Vec<(&str, TypeRef)>, return_type: TypeRef) {
    let params = params
        .into_iter()
        .map(|(n, ty)| VariableData::new(n, ty, None))
        .collect::<Vec<_>>();
    let callable = Rc::new(RefCell::new(Callable {
        kind: CallableKind::Method {
            name: name.to_string(),
            container: container.clone(),
        },
        params,
        return_type: Some(return_type),
        native: true,
        body: RefCell::new(TypedCodeBlock::empty()),
        definition_site: None,
    }));
    container
        .borrow_mut()
        .add_method(name, callable, diagnostics_stub())
        .into_iter()
        .for_each(drop);
}

fn install_numeric_operators(container: &TypeRef, operand: &TypeRef) {
    for op in ["plus", "minus", "times", "divide"] {
        native_method(container, op, vec![("rhs", operand.clone())], container.clone());
    }
    native_method(container, "unaryMinus", vec![], container.clone());
}

fn install_comparison_operators(container: &TypeRef, operand: &TypeRef, bool_: &TypeRef) {
    for op in ["lessThan", "greaterThan", "lessOrEqual", "greaterOrEqual"] {
        native_method(container, op, vec![("rhs", operand.clone())], bool_.clone());
    }
}

fn install_equality_operators(container: &TypeRef, bool_: &TypeRef) {
    native_method(container, "equals", vec![("rhs", container.clone())], bool_.clone());
    native_method(container, "notEquals", vec![("rhs", container.clone())], bool_.clone());
}

fn install_boolean_operators(bool_: &TypeRef) {
    native_method(bool_, "and", vec![("rhs", bool_.clone())], bool_.clone());
    native_method(bool_, "or", vec![("rhs", bool_.clone())], bool_.clone());
    native_method(bool_, "not", vec![], bool_.clone());
}

/// Every non-reference type auto-receives a zero-argument default
/// constructor and a one-argument copy constructor (spec.md §3); for
/// primitives both are native.
fn install_default_and_copy_constructors(ty: &TypeRef) {
    let default_ctor = Rc::new(RefCell::new(Callable {
        kind: CallableKind::Constructor { container: ty.clone() },
        params: vec![],
        return_type: None,
        native: true,
        body: RefCell::new(TypedCodeBlock::empty()),
        definition_site: None,
    }));
    ty.borrow_mut().constructors.push(default_ctor);

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

fn install_native_function(root: &Scope, name: &str, params: Vec<(&str, TypeRef)>, return_type: TypeRef) {
    let params = params
        .into_iter()
        .map(|(n, ty)| VariableData::new(n, ty, None))
        .collect::<Vec<_>>();
    let callable = Rc::new(RefCell::new(Callable {
        kind: CallableKind::Function { name: name.to_string() },
        params,
        return_type: Some(return_type),
        native: true,
        body: RefCell::new(TypedCodeBlock::empty()),
        definition_site: None,
    }));
    root.add_function(name, callable, diagnostics_stub())
        .into_iter()
        .for_each(drop);
}
