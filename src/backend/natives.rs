//! Native entity → C symbol mapping (spec.md §4.8, §6): a fixed table for
//! the primitive operator methods and I/O free functions every CO program
//! can reach. `assign` and the synthesised default/copy constructors are
//! handled structurally in [`super::emit`] instead, since their C shape
//! doesn't depend on which type they're attached to — only the entries
//! below vary per concrete signature, which is why spec.md keys them by
//! signature string rather than by name alone.

use crate::sema::symbol::Callable;

use super::BackendError;

pub fn lookup(callable: &Callable) -> Result<&'static str, BackendError> {
    let signature = callable.signature_string();
    NATIVE_TABLE
        .iter()
        .find(|(sig, _)| *sig == signature)
        .map(|(_, symbol)| *symbol)
        .ok_or(BackendError::MissingNativeMapping(signature))
}

const NATIVE_TABLE: &[(&str, &str)] = &[
    ("int int.plus(int)", "_addInt"),
    ("int int.minus(int)", "_subInt"),
    ("int int.times(int)", "_mulInt"),
    ("int int.divide(int)", "_divInt"),
    ("int int.unaryMinus()", "_negInt"),
    ("double double.plus(double)", "_addDbl"),
    ("double double.minus(double)", "_subDbl"),
    ("double double.times(double)", "_mulDbl"),
    ("double double.divide(double)", "_divDbl"),
    ("double double.unaryMinus()", "_negDbl"),
    ("bool int.lessThan(int)", "_lt"),
    ("bool int.greaterThan(int)", "_gt"),
    ("bool int.lessOrEqual(int)", "_le"),
    ("bool int.greaterOrEqual(int)", "_ge"),
    ("bool double.lessThan(double)", "_ltDbl"),
    ("bool double.greaterThan(double)", "_gtDbl"),
    ("bool double.lessOrEqual(double)", "_leDbl"),
    ("bool double.greaterOrEqual(double)", "_geDbl"),
    ("bool int.equals(int)", "_eqInt"),
    ("bool int.notEquals(int)", "_neInt"),
    ("bool double.equals(double)", "_eqDbl"),
    ("bool double.notEquals(double)", "_neDbl"),
    ("bool bool.equals(bool)", "_eqBool"),
    ("bool bool.notEquals(bool)", "_neBool"),
    ("bool bool.and(bool)", "_and"),
    ("bool bool.or(bool)", "_or"),
    ("bool bool.not()", "_not"),
    ("void writeIntLn(int)", "_writeIntLn"),
    ("void writeDoubleLn(double)", "_writeDoubleLn"),
    ("void writeBoolLn(bool)", "_writeBoolLn"),
    ("void println(int)", "_writeIntLn"),
    ("void println(double)", "_writeDoubleLn"),
    ("void println(bool)", "_writeBoolLn"),
    ("void assert(bool)", "_assert"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::scope::Scope;
    use crate::sema::{builtins, symbol::CallableKind};

    #[test]
    fn every_table_entry_matches_a_real_installed_signature() {
        let root = Scope::new_root();
        let builtins = builtins::install(&root);
        let less_than = builtins
            .int
            .borrow()
            .methods
            .get("lessThan")
            .unwrap()
            .borrow()
            .first()
            .unwrap()
            .clone();
        assert_eq!(lookup(&less_than.borrow()).unwrap(), "_lt");
        assert!(matches!(less_than.borrow().kind, CallableKind::Method { .. }));
    }

    #[test]
    fn unmapped_signature_is_a_backend_error() {
        let root = Scope::new_root();
        let builtins = builtins::install(&root);
        let bogus = crate::sema::symbol::Callable {
            kind: CallableKind::Function { name: "nope".to_string() },
            params: vec![],
            return_type: Some(builtins.void.clone()),
            native: true,
            body: std::cell::RefCell::new(crate::sema::typed::TypedCodeBlock::empty()),
            definition_site: None,
        };
        assert!(matches!(lookup(&bogus), Err(BackendError::MissingNativeMapping(_))));
    }
}
