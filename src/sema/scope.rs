//! Scope hierarchy (spec.md §3's Scope/CodeBlock capability set):
//! `RootNamespace` at the top, `LocalScope` inside every `CodeBlock`,
//! resolving upward through parents. `Type`s are not `Scope`s themselves —
//! member lookup (`e.name`) goes through [`crate::sema::symbol::TypeData`]
//! directly, since spec.md §4.4 describes member access as a distinct rule
//! from lexical name resolution.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    diagnostics::Diagnostics,
    sema::symbol::{CallableRef, OverloadSet, TypeRef, VariableRef},
    source::SourceCode,
    Issue,
};

#[derive(Debug, Clone)]
pub enum Symbol {
    Type(TypeRef),
    Variable(VariableRef),
    /// A single, non-overloaded callable (only ever a free function at
    /// scope level; methods/constructors live on their `Type`).
    Callable(CallableRef),
    Overload(OverloadSet),
}

impl Symbol {
    pub fn definition_site(&self) -> Option<SourceCode> {
        match self {
            Symbol::Type(ty) => ty.borrow().definition_site.clone(),
            Symbol::Variable(var) => var.borrow().definition_site.clone(),
            Symbol::Callable(callable) => callable.borrow().definition_site.clone(),
            Symbol::Overload(set) => set.borrow().last().and_then(|c| c.borrow().definition_site.clone()),
        }
    }
}

#[derive(Debug, Default)]
pub struct RootNamespace {
    pub symbols: HashMap<String, Symbol>,
}

#[derive(Debug)]
pub struct LocalScope {
    pub parent: Scope,
    pub symbols: HashMap<String, Symbol>,
}

/// A handle to either the root namespace or a nested local scope. Cheap to
/// clone (an `Rc` bump) the way the teacher's `TypeScope` frames are.
#[derive(Debug, Clone)]
pub enum Scope {
    Root(Rc<RefCell<RootNamespace>>),
    Local(Rc<RefCell<LocalScope>>),
}

impl Scope {
    pub fn new_root() -> Scope {
        Scope::Root(Rc::new(RefCell::new(RootNamespace::default())))
    }

    pub fn child(&self) -> Scope {
        Scope::Local(Rc::new(RefCell::new(LocalScope {
            parent: self.clone(),
            symbols: HashMap::new(),
        })))
    }

    pub fn resolve(&self, name: &str) -> Option<Symbol> {
        match self {
            Scope::Root(root) => root.borrow().symbols.get(name).cloned(),
            Scope::Local(local) => {
                let found = local.borrow().symbols.get(name).cloned();
                found.or_else(|| local.borrow().parent.resolve(name))
            }
        }
    }

    /// `resolve`, but only within this exact scope frame (used to detect
    /// local shadowing vs. an outright duplicate in the same block).
    pub fn resolve_local(&self, name: &str) -> Option<Symbol> {
        match self {
            Scope::Root(root) => root.borrow().symbols.get(name).cloned(),
            Scope::Local(local) => local.borrow().symbols.get(name).cloned(),
        }
    }

    fn with_symbols<R>(&self, f: impl FnOnce(&mut HashMap<String, Symbol>) -> R) -> R {
        match self {
            Scope::Root(root) => f(&mut root.borrow_mut().symbols),
            Scope::Local(local) => f(&mut local.borrow_mut().symbols),
        }
    }

    /// Register a type or variable: a flat name collision is always an
    /// error (types and variables never overload).
    pub fn add_entity(&self, name: &str, symbol: Symbol, diagnostics: Diagnostics) -> Vec<Issue> {
        if let Some(existing) = self.resolve_local(name) {
            return vec![diagnostics.entity_name_taken(
                symbol.definition_site().unwrap_or_else(|| existing.definition_site().unwrap()),
                name,
                existing.definition_site(),
            )];
        }
        self.with_symbols(|symbols| symbols.insert(name.to_string(), symbol));
        vec![]
    }

    /// Register a free function, merging into an overload set on a name
    /// collision with another callable, or raising `EntityNameTaken` if the
    /// name is already bound to something that isn't a callable.
    pub fn add_function(&self, name: &str, function: CallableRef, diagnostics: Diagnostics) -> Vec<Issue> {
        match self.resolve_local(name) {
            None => {
                self.with_symbols(|symbols| {
                    symbols.insert(name.to_string(), Symbol::Callable(function));
                });
                vec![]
            }
            Some(Symbol::Callable(existing)) => {
                if same_signature(&existing, &function) {
                    return vec![diagnostics.duplicate_function_definition(
                        function.borrow().definition_site.clone().unwrap(),
                        name,
                        existing.borrow().definition_site.clone().unwrap(),
                    )];
                }
                let set: OverloadSet = Rc::new(RefCell::new(vec![existing, function]));
                self.with_symbols(|symbols| {
                    symbols.insert(name.to_string(), Symbol::Overload(set));
                });
                vec![]
            }
            Some(Symbol::Overload(set)) => {
                if let Some(clash) = set.borrow().iter().find(|c| same_signature(c, &function)) {
                    return vec![diagnostics.duplicate_function_definition(
                        function.borrow().definition_site.clone().unwrap(),
                        name,
                        clash.borrow().definition_site.clone().unwrap(),
                    )];
                }
                set.borrow_mut().push(function);
                vec![]
            }
            Some(other) => {
                vec![diagnostics.entity_name_taken(
                    function.borrow().definition_site.clone().unwrap(),
                    name,
                    other.definition_site(),
                )]
            }
        }
    }
}

pub fn same_signature(a: &CallableRef, b: &CallableRef) -> bool {
    let a = a.borrow();
    let b = b.borrow();
    if a.param_types().len() != b.param_types().len() {
        return false;
    }
    a.param_types()
        .iter()
        .zip(b.param_types().iter())
        .all(|(x, y)| Rc::ptr_eq(x, y))
}
