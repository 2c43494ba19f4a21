//! C identifier assignment (spec.md §4.8): every non-native type and every
//! reachable non-native callable gets one stable `co_<name>` identifier,
//! with a `_N` suffix appended on a collision — mirrors the teacher's
//! `store_function`/`store_variable` scheme of computing a generated name
//! once per symbol and reusing it at every call site.

use std::collections::{HashMap, HashSet};

use crate::sema::symbol::{CallableKind, CallableRef, TypeRef};

#[derive(Default)]
pub struct NameTable {
    types: HashMap<*const (), String>,
    callables: HashMap<*const (), String>,
    used: HashSet<String>,
    temp_counter: u32,
}

impl NameTable {
    pub fn type_name(&mut self, ty: &TypeRef) -> String {
        let key = std::rc::Rc::as_ptr(ty) as *const ();
        if let Some(existing) = self.types.get(&key) {
            return existing.clone();
        }
        let base = format!("co_{}", sanitise(&ty.borrow().name));
        let assigned = self.reserve(base);
        self.types.insert(key, assigned.clone());
        assigned
    }

    pub fn callable_name(&mut self, callable: &CallableRef) -> String {
        let key = std::rc::Rc::as_ptr(callable) as *const ();
        if let Some(existing) = self.callables.get(&key) {
            return existing.clone();
        }
        let base = match &callable.borrow().kind {
            CallableKind::Function { name } => format!("co_{}", sanitise(name)),
            CallableKind::Method { name, container } => {
                format!("co_{}_{}", sanitise(&container.borrow().name), sanitise(name))
            }
            CallableKind::Constructor { container } => format!("co_{}_ctor", sanitise(&container.borrow().name)),
        };
        let assigned = self.reserve(base);
        self.callables.insert(key, assigned.clone());
        assigned
    }

    /// A fresh scratch identifier for an expression that needs a temporary
    /// (constructing a struct value inline, e.g. a non-default cast like
    /// `Point(1, 2)` used where a value is expected).
    pub fn next_temp(&mut self) -> String {
        self.temp_counter += 1;
        let name = format!("_co_tmp{}", self.temp_counter);
        self.used.insert(name.clone());
        name
    }

    fn reserve(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn sanitise(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
