//! End-to-end scenarios driving the full lexer → parser → analyser →
//! backend pipeline against small inline CO programs. The scenarios mirror
//! spec.md §8's S1-S6 illustrative cases.

use co::{
    diagnostics::{Code, Severity},
    parser, sema, Diagnostics, Issue, Locale,
};

fn analyse(source: &str) -> (Vec<Issue>, sema::Analysis) {
    let diagnostics = Diagnostics::new(Locale::En);
    let (program, mut issues) = parser::parse_source("test.co", source, diagnostics);
    let analysis = sema::analyse(&program, std::rc::Rc::from("test.co"), diagnostics);
    issues.extend(analysis.issues.clone());
    (issues, analysis)
}

#[test]
fn s1_happy_path_compiles_clean_and_emits_a_dereferenced_write_call() {
    let (issues, analysis) = analyse("void main() { int x = 5; writeIntLn(x); }");
    assert!(issues.is_empty(), "{issues:?}");

    let c = co::backend::process(&analysis).unwrap();
    assert!(c.contains("co_main"));
    assert!(c.contains("_writeIntLn"));
}

#[test]
fn s2_unknown_name_raises_exactly_one_error() {
    let (issues, _) = analyse("void main() { println(y); }");
    let errors: Vec<_> = issues.iter().filter(|i| i.severity == Severity::Error).collect();
    assert_eq!(errors.len(), 1, "{issues:?}");
    assert_eq!(errors[0].code, Code::UnknownName);
}

#[test]
fn s3_overload_resolution_prefers_the_non_widening_match() {
    let (issues, analysis) = analyse(
        r#"
        void f(int a) { }
        void f(double a) { }
        void main() {
            f(1.0);
        }
        "#,
    );
    assert!(issues.is_empty(), "{issues:?}");
    assert!(co::backend::process(&analysis).is_ok());
}

#[test]
fn s4_duplicate_function_definition_notes_the_first_site() {
    let (issues, _) = analyse(
        r#"
        int foo() { return 1; }
        int foo() { return 2; }
        void main() { }
        "#,
    );
    let errors: Vec<_> = issues.iter().filter(|i| i.severity == Severity::Error).collect();
    assert_eq!(errors.len(), 1, "{issues:?}");
    assert_eq!(errors[0].code, Code::DuplicateFunctionDefinition);
    assert_eq!(errors[0].notes.len(), 1);
}

#[test]
fn s5_missing_return_on_the_false_branch_is_an_error() {
    let (issues, _) = analyse(
        r#"
        int f() {
            if (true) {
                return 1;
            }
        }
        void main() { }
        "#,
    );
    let errors: Vec<_> = issues.iter().filter(|i| i.severity == Severity::Error).collect();
    assert_eq!(errors.len(), 1, "{issues:?}");
    assert_eq!(errors[0].code, Code::MissingReturnStatement);
}

#[test]
fn s6_assignment_desugars_to_assign_with_a_dereferenced_right_hand_side() {
    let (issues, analysis) = analyse("void main() { int x = 3; x = 5; }");
    assert!(issues.is_empty(), "{issues:?}");

    let c = co::backend::process(&analysis).unwrap();
    assert!(c.contains("_assign"));
}
