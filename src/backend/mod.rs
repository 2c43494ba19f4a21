//! C backend (spec.md §4.8, §6): reachability walk from `main`, struct
//! layout ordering, C identifier assignment and textual C99 emission. Kept
//! deliberately dumb — every implicit dereference and every argument/
//! receiver coercion was already turned into an explicit typed-tree node by
//! the analyser (`sema::expr`'s `coerce_instance`/`coerce_args`), so this
//! module never re-derives semantics, only prints the tree it's handed.
//!
//! Internal failures here (a missing native mapping, a cyclic struct
//! layout) are never `Issue`s — spec.md §7 keeps those on a separate,
//! uncoded path that the driver reports to stderr with exit code 2.

mod emit;
mod layout;
mod names;
mod natives;
mod reachability;

use std::fmt;

use crate::sema::{names::Analysis, scope::Symbol};

pub use names::NameTable;

#[derive(Debug)]
pub enum BackendError {
    /// `sema::names::validate_entry_point` should already have turned a
    /// missing/malformed `main` into a user-facing `Issue` before the
    /// driver ever calls into the backend; this only fires if that
    /// invariant is violated.
    MissingMain,
    CyclicTypeLayout(String),
    MissingNativeMapping(String),
    UnsupportedExpression(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::MissingMain => write!(f, "internal error: no analysed entry point"),
            BackendError::CyclicTypeLayout(name) => write!(f, "internal error: cyclic type layout involving '{name}'"),
            BackendError::MissingNativeMapping(sig) => write!(f, "internal error: no native mapping for '{sig}'"),
            BackendError::UnsupportedExpression(what) => write!(f, "internal error: {what}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// `process(rootNamespace) -> unit` (spec.md §4.8), here returning the
/// emitted C translation unit as text rather than performing the unit-typed
/// side effect directly — the CLI driver owns writing it to the output
/// path, so the backend itself stays testable without a filesystem.
pub fn process(analysis: &Analysis) -> Result<String, BackendError> {
    let Some(Symbol::Callable(main)) = analysis.root.resolve("main") else {
        return Err(BackendError::MissingMain);
    };

    let reachable = reachability::walk(&main, &analysis.global_initializers);
    let type_order = layout::order(&reachable.types)?;
    let mut names = NameTable::default();

    emit::emit(analysis, &main, &reachable, &type_order, &mut names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diagnostics::Locale, parser, sema, Diagnostics};

    fn compile(source: &str) -> Result<String, BackendError> {
        let diagnostics = Diagnostics::new(Locale::En);
        let (program, parse_issues) = parser::parse_source("test.co", source, diagnostics);
        assert!(parse_issues.is_empty(), "{parse_issues:?}");
        let analysis = sema::analyse(&program, std::rc::Rc::from("test.co"), diagnostics);
        assert!(analysis.issues.is_empty(), "{:?}", analysis.issues);
        process(&analysis)
    }

    #[test]
    fn emits_a_call_to_a_native_write_function_with_a_dereferenced_argument() {
        let c = compile("void main() { int x; x = 5; writeIntLn(x); }").unwrap();
        assert!(c.contains("co_main"));
        assert!(c.contains("_writeIntLn"));
        assert!(c.contains("_assign"));
    }

    #[test]
    fn emits_a_struct_and_a_non_native_constructor() {
        let c = compile(
            r#"
            type Point {
                int x;
                int y;
                Point(int x, int y) {
                    this.x = x;
                    this.y = y;
                }
            }
            void main() {
                Point p = Point(1, 2);
            }
            "#,
        )
        .unwrap();
        assert!(c.contains("typedef struct"));
        assert!(c.contains("co_Point_ctor"));
    }

    #[test]
    fn unreachable_types_and_functions_are_never_emitted() {
        let c = compile(
            r#"
            type Unused { int x; }
            void helper() { }
            void main() { }
            "#,
        )
        .unwrap();
        assert!(!c.contains("Unused"));
        assert!(!c.contains("helper"));
    }
}
