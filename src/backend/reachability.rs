//! Reachability walk from `main` over the typed tree (spec.md §4.8): only
//! types, functions, methods and constructors actually used end up in the
//! emitted C, the same single-pass-over-reachable-nodes shape as the
//! teacher's LLVM codegen, which only ever visits the declarations it's
//! asked to compile rather than the whole symbol table.

use std::{collections::HashSet, rc::Rc};

use crate::sema::{
    symbol::{CallableRef, TypeRef},
    typed::{TypedCodeBlock, TypedExpression, TypedStatement},
};

pub struct Reachable {
    pub types: Vec<TypeRef>,
    pub callables: Vec<CallableRef>,
    seen_types: HashSet<*const ()>,
    seen_callables: HashSet<*const ()>,
}

impl Reachable {
    fn new() -> Reachable {
        Reachable {
            types: vec![],
            callables: vec![],
            seen_types: HashSet::new(),
            seen_callables: HashSet::new(),
        }
    }

    fn mark_type(&mut self, ty: &TypeRef) {
        let key = Rc::as_ptr(ty) as *const ();
        if !self.seen_types.insert(key) {
            return;
        }
        if ty.borrow().native {
            return;
        }
        self.types.push(ty.clone());
        let field_types: Vec<TypeRef> = ty.borrow().fields.iter().map(|f| f.borrow().ty.clone()).collect();
        for field_ty in &field_types {
            self.mark_type(field_ty);
        }
    }

    fn mark_callable(&mut self, callable: &CallableRef) {
        let key = Rc::as_ptr(callable) as *const ();
        if !self.seen_callables.insert(key) {
            return;
        }
        let container = callable.borrow().kind.container();
        if let Some(container) = &container {
            self.mark_type(container);
        }
        if let Some(ret) = &callable.borrow().return_type {
            self.mark_type(ret);
        }
        let param_types: Vec<TypeRef> = callable.borrow().params.iter().map(|p| p.borrow().ty.clone()).collect();
        for param_ty in &param_types {
            self.mark_type(param_ty);
        }
        if !callable.borrow().native {
            self.callables.push(callable.clone());
            let body = callable.borrow().body.borrow().clone();
            self.walk_block(&body);
        }
    }

    fn walk_block(&mut self, block: &TypedCodeBlock) {
        for stmt in &block.statements {
            self.walk_statement(stmt);
        }
    }

    fn walk_statement(&mut self, stmt: &TypedStatement) {
        match stmt {
            TypedStatement::Expression(e) => self.walk_expr(e),
            TypedStatement::Block(b) => self.walk_block(b),
            TypedStatement::VariableConstructorCall {
                variable,
                constructor,
                args,
                ..
            } => {
                self.mark_type(&variable.borrow().ty);
                if let Some(ctor) = constructor {
                    self.mark_callable(ctor);
                }
                for arg in args {
                    self.walk_expr(arg);
                }
            }
            TypedStatement::IfElse {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.walk_expr(condition);
                self.walk_block(then_branch);
                if let Some(else_branch) = else_branch {
                    self.walk_block(else_branch);
                }
            }
            TypedStatement::While { condition, body, .. } => {
                self.walk_expr(condition);
                self.walk_block(body);
            }
            TypedStatement::Return { value, .. } => {
                if let Some(value) = value {
                    self.walk_expr(value);
                }
            }
        }
    }

    fn walk_expr(&mut self, expr: &TypedExpression) {
        self.mark_type(&expr.ty());
        match expr {
            TypedExpression::IntLiteral { .. }
            | TypedExpression::DoubleLiteral { .. }
            | TypedExpression::BoolLiteral { .. }
            | TypedExpression::Invalid { .. }
            | TypedExpression::ThisReference { .. }
            | TypedExpression::OverloadedFunctionReference { .. } => {}
            TypedExpression::VariableReference { variable, .. } | TypedExpression::ReferenceVariableReference { variable, .. } => {
                self.mark_type(&variable.borrow().ty);
            }
            TypedExpression::FunctionReference { function, .. } => self.mark_callable(function),
            TypedExpression::FunctionCall { callee, args, .. } => {
                self.mark_callable(callee);
                for a in args {
                    self.walk_expr(a);
                }
            }
            TypedExpression::MethodCall { method, instance, args, .. } => {
                self.mark_callable(method);
                self.walk_expr(instance);
                for a in args {
                    self.walk_expr(a);
                }
            }
            TypedExpression::ConstructorCall { constructor, args, .. } => {
                self.mark_callable(constructor);
                for a in args {
                    self.walk_expr(a);
                }
            }
            TypedExpression::FieldAccess { instance, field, .. } => {
                self.walk_expr(instance);
                self.mark_type(&field.borrow().ty);
            }
            TypedExpression::ImplicitDereferencing { inner, .. } => self.walk_expr(inner),
        }
    }
}

/// Walks from `main` and every global initializer — globals run
/// unconditionally at program start (spec.md §6) even if `main` never
/// mentions them — returning every non-native type and callable the
/// emitted program actually needs, each exactly once and in first-use
/// order.
pub fn walk(main: &CallableRef, global_initializers: &[TypedStatement]) -> Reachable {
    let mut reachable = Reachable::new();
    reachable.mark_callable(main);
    for stmt in global_initializers {
        reachable.walk_statement(stmt);
    }
    reachable
}
