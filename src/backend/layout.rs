//! Topological ordering of reachable struct types by field dependency
//! (spec.md §4.8): a field of type `A` inside type `B` needs `A`'s C struct
//! already defined, so `A`'s `typedef` is emitted before `B`'s. CO has no
//! forward-declarable value members, so a cycle (`A` has a field of type
//! `B` and vice versa) cannot be laid out in C at all — a fatal internal
//! error, not a coded `Issue` (spec.md §7's uncoded internal-error path).

use std::rc::Rc;

use crate::sema::symbol::TypeRef;

use super::BackendError;

pub fn order(types: &[TypeRef]) -> Result<Vec<TypeRef>, BackendError> {
    let mut ordered = Vec::with_capacity(types.len());
    let mut visited = vec![false; types.len()];
    let mut in_progress = vec![false; types.len()];

    for i in 0..types.len() {
        visit(i, types, &mut visited, &mut in_progress, &mut ordered)?;
    }
    Ok(ordered)
}

fn visit(
    i: usize,
    types: &[TypeRef],
    visited: &mut [bool],
    in_progress: &mut [bool],
    ordered: &mut Vec<TypeRef>,
) -> Result<(), BackendError> {
    if visited[i] {
        return Ok(());
    }
    if in_progress[i] {
        return Err(BackendError::CyclicTypeLayout(types[i].borrow().name.clone()));
    }
    in_progress[i] = true;
    let field_types: Vec<TypeRef> = types[i].borrow().fields.iter().map(|f| f.borrow().ty.clone()).collect();
    for field_ty in &field_types {
        if let Some(j) = types.iter().position(|t| Rc::ptr_eq(t, &field_ty)) {
            visit(j, types, visited, in_progress, ordered)?;
        }
    }
    in_progress[i] = false;
    visited[i] = true;
    ordered.push(types[i].clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::symbol::{TypeData, VariableData};

    #[test]
    fn orders_dependency_before_dependent() {
        let inner = TypeData::new_value_type("Inner", false, None);
        let outer = TypeData::new_value_type("Outer", false, None);
        outer
            .borrow_mut()
            .add_field(VariableData::new("i", inner.clone(), None), crate::Diagnostics::new(crate::diagnostics::Locale::En));

        let ordered = order(&[outer.clone(), inner.clone()]).unwrap();
        let inner_pos = ordered.iter().position(|t| Rc::ptr_eq(t, &inner)).unwrap();
        let outer_pos = ordered.iter().position(|t| Rc::ptr_eq(t, &outer)).unwrap();
        assert!(inner_pos < outer_pos);
    }

    #[test]
    fn cyclic_field_dependency_is_an_internal_error() {
        let a = TypeData::new_value_type("A", false, None);
        let b = TypeData::new_value_type("B", false, None);
        let diagnostics = crate::Diagnostics::new(crate::diagnostics::Locale::En);
        a.borrow_mut().add_field(VariableData::new("b", b.clone(), None), diagnostics.clone());
        b.borrow_mut().add_field(VariableData::new("a", a.clone(), None), diagnostics);

        assert!(matches!(order(&[a, b]), Err(BackendError::CyclicTypeLayout(_))));
    }
}
