//! C text emission (spec.md §6): one self-contained C99 translation unit —
//! standard headers, a fixed preamble of operator/IO macros, struct
//! `typedef`s for every reachable type in dependency order, prototypes then
//! definitions for every reachable non-native callable, and a `main` that
//! runs the global initializers before calling `co_main`.
//!
//! Every implicit dereference and every argument/receiver coercion was
//! already made an explicit typed-tree node upstream (`sema::expr`'s
//! `coerce_instance`/`coerce_args`), so nothing here re-derives semantics —
//! it only prints the tree it's handed, the "purely mechanical" backend
//! spec.md §9 asks for.

use crate::sema::{
    names::Analysis,
    symbol::{self, CallableRef, TypeRef, VariableRef},
    typed::{TypedCodeBlock, TypedExpression, TypedStatement},
};

use super::{names::NameTable, natives, reachability::Reachable, BackendError};

const PREAMBLE: &str = r#"
#define _addInt(a, b) ((a) + (b))
#define _subInt(a, b) ((a) - (b))
#define _mulInt(a, b) ((a) * (b))
#define _divInt(a, b) ((a) / (b))
#define _negInt(a) (-(a))
#define _addDbl(a, b) ((a) + (b))
#define _subDbl(a, b) ((a) - (b))
#define _mulDbl(a, b) ((a) * (b))
#define _divDbl(a, b) ((a) / (b))
#define _negDbl(a) (-(a))
#define _lt(a, b) ((a) < (b))
#define _gt(a, b) ((a) > (b))
#define _le(a, b) ((a) <= (b))
#define _ge(a, b) ((a) >= (b))
#define _ltDbl(a, b) ((a) < (b))
#define _gtDbl(a, b) ((a) > (b))
#define _leDbl(a, b) ((a) <= (b))
#define _geDbl(a, b) ((a) >= (b))
#define _eqInt(a, b) ((a) == (b))
#define _neInt(a, b) ((a) != (b))
#define _eqDbl(a, b) ((a) == (b))
#define _neDbl(a, b) ((a) != (b))
#define _eqBool(a, b) ((a) == (b))
#define _neBool(a, b) ((a) != (b))
#define _and(a, b) ((a) && (b))
#define _or(a, b) ((a) || (b))
#define _not(a) (!(a))
#define _assign(ptr, value) (*(ptr) = (value))
#define _writeIntLn(v) (printf("%d\n", (int32_t)(v)))
#define _writeDoubleLn(v) (printf("%f\n", (double)(v)))
#define _writeBoolLn(v) (printf("%s\n", (v) ? "true" : "false"))
#define _assert(v) ((void)((v) || (fprintf(stderr, "assertion failed\n"), exit(1), 0)))
#define _powInt(base, exp) ((int32_t)pow((double)(base), (double)(exp)))
#define _powDbl(base, exp) (pow((base), (exp)))
"#;

pub fn emit(
    analysis: &Analysis,
    main: &CallableRef,
    reachable: &Reachable,
    type_order: &[TypeRef],
    names: &mut NameTable,
) -> Result<String, BackendError> {
    let builtins = &analysis.builtins;
    let mut out = String::new();

    out.push_str("#include <stdlib.h>\n#include <stdio.h>\n#include <math.h>\n#include <stdint.h>\n");
    out.push_str(PREAMBLE);
    out.push('\n');

    for ty in type_order {
        out.push_str(&emit_struct(ty, names, builtins));
        out.push_str("\n\n");
    }

    let mut prototypes = Vec::with_capacity(reachable.callables.len());
    let mut definitions = Vec::with_capacity(reachable.callables.len());
    for callable in &reachable.callables {
        let (proto, def) = emit_callable(callable, names, builtins)?;
        prototypes.push(proto);
        definitions.push(def);
    }
    for proto in &prototypes {
        out.push_str(proto);
        out.push('\n');
    }
    out.push('\n');
    for def in &definitions {
        out.push_str(def);
        out.push_str("\n\n");
    }

    for stmt in &analysis.global_initializers {
        if let TypedStatement::VariableConstructorCall { variable, .. } = stmt {
            let c_ty = c_type(&variable.borrow().ty, names, builtins);
            out.push_str(&format!("static {c_ty} co_{};\n", variable.borrow().name));
        }
    }
    out.push('\n');

    out.push_str("int main(void) {\n");
    for stmt in &analysis.global_initializers {
        let TypedStatement::VariableConstructorCall { variable, constructor, args, .. } = stmt else {
            continue;
        };
        let text = emit_variable_constructor_call(variable, constructor, args, names, builtins, false)?;
        out.push_str(&indent_lines(&text, "    "));
        out.push('\n');
    }
    let main_name = names.callable_name(main);
    out.push_str(&format!("    {main_name}();\n    return 0;\n}}\n"));

    Ok(out)
}

fn indent_lines(text: &str, indent: &str) -> String {
    text.lines().map(|line| format!("{indent}{line}")).collect::<Vec<_>>().join("\n")
}

fn emit_struct(ty: &TypeRef, names: &mut NameTable, builtins: &crate::sema::builtins::Builtins) -> String {
    let struct_name = names.type_name(ty);
    let field_names_and_types: Vec<(String, String)> = ty
        .borrow()
        .fields
        .iter()
        .map(|f| (f.borrow().name.clone(), c_type(&f.borrow().ty, names, builtins)))
        .collect();
    let mut lines = vec!["typedef struct {".to_string()];
    for (name, c_ty) in &field_names_and_types {
        lines.push(format!("    {c_ty} co_{name};"));
    }
    lines.push(format!("}} {struct_name};"));
    lines.join("\n")
}

/// The C type naming a CO type: a primitive's native C type, a reachable
/// struct's generated name, or `<value type>*` for any reference type
/// (spec.md §9: a reference is always emitted as a pointer, never a struct
/// in its own right).
fn c_type(ty: &TypeRef, names: &mut NameTable, builtins: &crate::sema::builtins::Builtins) -> String {
    let aliased = ty.borrow().aliased_value_type.clone();
    match aliased {
        Some(value_type) => format!("{}*", c_value_type(&value_type, names, builtins)),
        None => c_value_type(ty, names, builtins),
    }
}

fn c_value_type(ty: &TypeRef, names: &mut NameTable, builtins: &crate::sema::builtins::Builtins) -> String {
    use std::rc::Rc;
    if Rc::ptr_eq(ty, &builtins.int) {
        "int32_t".to_string()
    } else if Rc::ptr_eq(ty, &builtins.double) {
        "double".to_string()
    } else if Rc::ptr_eq(ty, &builtins.bool_) {
        "int32_t".to_string()
    } else if Rc::ptr_eq(ty, &builtins.void) {
        "void".to_string()
    } else {
        names.type_name(ty)
    }
}

fn zero_literal(ty: &TypeRef, names: &mut NameTable, builtins: &crate::sema::builtins::Builtins) -> String {
    use std::rc::Rc;
    if Rc::ptr_eq(ty, &builtins.int) || Rc::ptr_eq(ty, &builtins.bool_) {
        "0".to_string()
    } else if Rc::ptr_eq(ty, &builtins.double) {
        "0.0".to_string()
    } else {
        let _ = names.type_name(ty);
        "{0}".to_string()
    }
}

fn emit_callable_signature(
    callable: &CallableRef,
    names: &mut NameTable,
    builtins: &crate::sema::builtins::Builtins,
) -> (String, Vec<String>) {
    let container = callable.borrow().kind.container();
    let return_type = callable.borrow().return_type.clone();
    let ret_c = match &return_type {
        Some(t) => c_type(t, names, builtins),
        None => "void".to_string(),
    };
    let mut params = Vec::new();
    if let Some(container) = &container {
        let this_ty = symbol::reference_of(container);
        params.push(format!("{} this", c_type(&this_ty, names, builtins)));
    }
    let param_vars: Vec<VariableRef> = callable.borrow().params.clone();
    for param in &param_vars {
        let c_ty = c_type(&param.borrow().ty, names, builtins);
        params.push(format!("{c_ty} co_{}", param.borrow().name));
    }
    (ret_c, params)
}

fn emit_callable(
    callable: &CallableRef,
    names: &mut NameTable,
    builtins: &crate::sema::builtins::Builtins,
) -> Result<(String, String), BackendError> {
    let name = names.callable_name(callable);
    let (ret_c, params) = emit_callable_signature(callable, names, builtins);
    let params_text = if params.is_empty() { "void".to_string() } else { params.join(", ") };
    let proto = format!("{ret_c} {name}({params_text});");

    let body_block = callable.borrow().body.borrow().clone();
    let body_text = emit_block(&body_block, names, builtins, "    ")?;
    let def = format!("{ret_c} {name}({params_text}) {{\n{body_text}\n}}");
    Ok((proto, def))
}

fn emit_block(
    block: &TypedCodeBlock,
    names: &mut NameTable,
    builtins: &crate::sema::builtins::Builtins,
    indent: &str,
) -> Result<String, BackendError> {
    let mut lines = Vec::with_capacity(block.statements.len());
    for stmt in &block.statements {
        lines.push(emit_stmt(stmt, names, builtins, indent)?);
    }
    Ok(lines.join("\n"))
}

fn emit_stmt(
    stmt: &TypedStatement,
    names: &mut NameTable,
    builtins: &crate::sema::builtins::Builtins,
    indent: &str,
) -> Result<String, BackendError> {
    match stmt {
        TypedStatement::Expression(e) => Ok(format!("{indent}{};", emit_expr(e, names, builtins)?)),
        TypedStatement::Block(block) => {
            let inner = emit_block(block, names, builtins, &format!("{indent}    "))?;
            Ok(format!("{indent}{{\n{inner}\n{indent}}}"))
        }
        TypedStatement::VariableConstructorCall { variable, constructor, args, .. } => {
            let text = emit_variable_constructor_call(variable, constructor, args, names, builtins, true)?;
            Ok(indent_lines(&text, indent))
        }
        TypedStatement::IfElse {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            let cond = emit_expr(condition, names, builtins)?;
            let inner_indent = format!("{indent}    ");
            let then_text = emit_block(then_branch, names, builtins, &inner_indent)?;
            let mut text = format!("{indent}if ({cond}) {{\n{then_text}\n{indent}}}");
            if let Some(else_branch) = else_branch {
                let else_text = emit_block(else_branch, names, builtins, &inner_indent)?;
                text.push_str(&format!(" else {{\n{else_text}\n{indent}}}"));
            }
            Ok(text)
        }
        TypedStatement::While { condition, body, .. } => {
            let cond = emit_expr(condition, names, builtins)?;
            let body_text = emit_block(body, names, builtins, &format!("{indent}    "))?;
            Ok(format!("{indent}while ({cond}) {{\n{body_text}\n{indent}}}"))
        }
        TypedStatement::Return { value, .. } => match value {
            Some(v) => Ok(format!("{indent}return {};", emit_expr(v, names, builtins)?)),
            None => Ok(format!("{indent}return;")),
        },
    }
}

/// Declares (when `declare`) and initializes a variable from its resolved
/// constructor — shared by local `VariableConstructorCall` statements and
/// the global initializers `main` runs before `co_main` (spec.md §4.5,
/// §6). `declare = false` is used for globals, whose storage was already
/// declared at file scope.
fn emit_variable_constructor_call(
    variable: &VariableRef,
    constructor: &Option<CallableRef>,
    args: &[TypedExpression],
    names: &mut NameTable,
    builtins: &crate::sema::builtins::Builtins,
    declare: bool,
) -> Result<String, BackendError> {
    let var_ty = variable.borrow().ty.clone();
    let var_name = format!("co_{}", variable.borrow().name);
    let c_ty = c_type(&var_ty, names, builtins);

    let Some(ctor) = constructor else {
        return Ok(if declare { format!("{c_ty} {var_name};") } else { String::new() });
    };

    let native = ctor.borrow().native;
    let is_default = native && ctor.borrow().params.is_empty();
    let is_copy = native && ctor.borrow().is_copy_constructor();

    if is_default {
        let zero = zero_literal(&var_ty, names, builtins);
        return Ok(if declare {
            format!("{c_ty} {var_name} = {zero};")
        } else {
            format!("{var_name} = {zero};")
        });
    }
    if is_copy {
        let arg_text = emit_expr(&args[0], names, builtins)?;
        return Ok(if declare {
            format!("{c_ty} {var_name} = {arg_text};")
        } else {
            format!("{var_name} = {arg_text};")
        });
    }
    if native {
        return Err(BackendError::MissingNativeMapping(ctor.borrow().signature_string()));
    }

    let ctor_name = names.callable_name(ctor);
    let mut call_args = vec![format!("&{var_name}")];
    for arg in args {
        call_args.push(emit_expr(arg, names, builtins)?);
    }
    let call = format!("{ctor_name}({});", call_args.join(", "));
    Ok(if declare {
        format!("{c_ty} {var_name};\n{call}")
    } else {
        call
    })
}

fn emit_expr(expr: &TypedExpression, names: &mut NameTable, builtins: &crate::sema::builtins::Builtins) -> Result<String, BackendError> {
    match expr {
        TypedExpression::IntLiteral { value, .. } => Ok(value.to_string()),
        TypedExpression::DoubleLiteral { value, .. } => Ok(format!("{value:?}")),
        TypedExpression::BoolLiteral { value, .. } => Ok(if *value { "1".to_string() } else { "0".to_string() }),
        TypedExpression::VariableReference { variable, .. } => Ok(format!("(&co_{})", variable.borrow().name)),
        TypedExpression::ReferenceVariableReference { variable, .. } => Ok(format!("co_{}", variable.borrow().name)),
        TypedExpression::ThisReference { .. } => Ok("this".to_string()),
        TypedExpression::FunctionReference { .. } | TypedExpression::OverloadedFunctionReference { .. } => Err(
            BackendError::UnsupportedExpression("a function referenced without being called reached the backend".to_string()),
        ),
        TypedExpression::FunctionCall { callee, args, .. } => {
            let native = callee.borrow().native;
            let symbol_name = if native {
                natives::lookup(&callee.borrow())?.to_string()
            } else {
                names.callable_name(callee)
            };
            let mut parts = Vec::with_capacity(args.len());
            for arg in args {
                parts.push(emit_expr(arg, names, builtins)?);
            }
            Ok(format!("{symbol_name}({})", parts.join(", ")))
        }
        TypedExpression::MethodCall { method, instance, args, .. } => emit_method_call(method, instance, args, names, builtins),
        TypedExpression::ConstructorCall { constructor, args, ty, .. } => emit_constructor_call(constructor, args, ty, names, builtins),
        TypedExpression::FieldAccess { instance, field, .. } => {
            let is_ref = instance.ty().borrow().is_reference();
            let instance_text = emit_expr(instance, names, builtins)?;
            let field_name = format!("co_{}", field.borrow().name);
            Ok(if is_ref {
                format!("({instance_text})->{field_name}")
            } else {
                format!("({instance_text}).{field_name}")
            })
        }
        TypedExpression::ImplicitDereferencing { inner, .. } => Ok(format!("(*({}))", emit_expr(inner, names, builtins)?)),
        TypedExpression::Invalid { .. } => Err(BackendError::UnsupportedExpression(
            "an unresolved (Invalid) expression reached the backend".to_string(),
        )),
    }
}

fn emit_method_call(
    method: &CallableRef,
    instance: &TypedExpression,
    args: &[TypedExpression],
    names: &mut NameTable,
    builtins: &crate::sema::builtins::Builtins,
) -> Result<String, BackendError> {
    let native = method.borrow().native;
    let is_assign = method.borrow().kind.name() == "assign";

    if native && is_assign {
        let instance_text = emit_expr(instance, names, builtins)?;
        let arg_text = emit_expr(&args[0], names, builtins)?;
        return Ok(format!("_assign({instance_text}, {arg_text})"));
    }

    let mut parts = vec![emit_expr(instance, names, builtins)?];
    for arg in args {
        parts.push(emit_expr(arg, names, builtins)?);
    }

    let symbol_name = if native {
        natives::lookup(&method.borrow())?.to_string()
    } else {
        names.callable_name(method)
    };
    Ok(format!("{symbol_name}({})", parts.join(", ")))
}

fn emit_constructor_call(
    constructor: &CallableRef,
    args: &[TypedExpression],
    ty: &TypeRef,
    names: &mut NameTable,
    builtins: &crate::sema::builtins::Builtins,
) -> Result<String, BackendError> {
    let native = constructor.borrow().native;
    let is_default = native && constructor.borrow().params.is_empty();
    let is_copy = native && constructor.borrow().is_copy_constructor();

    if is_default {
        return Ok(zero_literal(ty, names, builtins));
    }
    if is_copy {
        return emit_expr(&args[0], names, builtins);
    }
    if native {
        return Err(BackendError::MissingNativeMapping(constructor.borrow().signature_string()));
    }

    let ctor_name = names.callable_name(constructor);
    let c_ty = c_type(ty, names, builtins);
    let temp = names.next_temp();
    let mut call_args = vec![format!("&{temp}")];
    for arg in args {
        call_args.push(emit_expr(arg, names, builtins)?);
    }
    Ok(format!("({{ {c_ty} {temp}; {ctor_name}({}); {temp}; }})", call_args.join(", ")))
}
