//! End-to-end scenarios straight from the concrete examples a complete analyzer run must get
//! right: declaration type inference, overload ambiguity vs. unique resolution, dependent-argument
//! bidirectional inference, struct layout, and the comparison-as-statement mistake.

use tarnc::analyzer::Analyzer;
use tarnc::diagnostics::{CollectingSink, Severity};
use tarnc::frontend::build_module;
use tarnc_syntax::NodeKind;

fn check(source: &str) -> (tarnc::frontend::module::Module, CollectingSink) {
    let mut module = build_module("test.tarn", source.to_string()).expect("lex/parse should succeed");
    let mut sink = CollectingSink::new();
    Analyzer::new(&mut module, &mut sink).check_module();
    (module, sink)
}

fn error_messages(sink: &CollectingSink) -> Vec<&str> {
    sink.diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| d.message.as_str())
        .collect()
}

#[test]
fn integer_literal_declaration_infers_canonical_integer_with_no_cast() {
    let (module, sink) = check("foo : integer = 5;");
    assert!(error_messages(&sink).is_empty(), "{:?}", error_messages(&sink));

    let NodeKind::Root { children } = &module.ast.get(module.root).kind else { panic!() };
    let NodeKind::Declaration { init: Some(init), .. } = &module.ast.get(children[0]).kind else {
        panic!("expected a declaration with an initializer")
    };
    let integer = module.types.integer();
    let init_ty = module.ast.get(*init).ty.expect("initializer must be typed");
    assert!(module.types.equals(init_ty, integer), "literal should be promoted to the canonical integer type");
}

#[test]
fn byte_declaration_rejects_a_wider_integer_variable() {
    let (_module, sink) = check("x : integer = 1; y : byte = x;");
    let errors = error_messages(&sink);
    assert!(errors.iter().any(|m| m.contains("convert") || m.contains("type")), "{:?}", errors);
}

#[test]
fn overloaded_call_with_a_bare_literal_is_ambiguous() {
    let source = "
        f : integer(x : integer) { return x; }
        f : integer(x : byte) { return x; }
        main : integer() { return f(1); }
    ";
    let (_module, sink) = check(source);
    let errors = error_messages(&sink);
    assert!(errors.iter().any(|m| m.contains("ambiguous")), "{:?}", errors);
}

#[test]
fn overloaded_call_with_a_byte_argument_resolves_uniquely() {
    let source = "
        f : integer(x : integer) { return x; }
        f : integer(x : byte) { return x; }
        main : integer() { y : byte = 1; return f(y); }
    ";
    let (_module, sink) = check(source);
    assert!(error_messages(&sink).is_empty(), "{:?}", error_messages(&sink));
}

#[test]
fn dependent_function_reference_argument_resolves_against_the_callee_parameter_type() {
    let source = "
        h : integer(x : integer) { return x; }
        h : integer(x : byte) { return x; }
        g : integer(callback : integer(integer)) { return callback(1); }
        main : integer() { return g(h); }
    ";
    let (_module, sink) = check(source);
    assert!(error_messages(&sink).is_empty(), "{:?}", error_messages(&sink));
}

#[test]
fn struct_layout_matches_member_order_and_alignment() {
    let (module, sink) = check("struct S { a : byte; b : integer; }");
    assert!(error_messages(&sink).is_empty(), "{:?}", error_messages(&sink));

    let NodeKind::Root { children } = &module.ast.get(module.root).kind else { panic!() };
    let ty = module.ast.get(children[0]).ty.expect("struct must be typed");
    let mut types = module.types;
    assert_eq!(types.size_of(ty).unwrap(), 16);
    assert_eq!(types.align_of(ty).unwrap(), 8);
}

#[test]
fn top_level_comparison_is_rejected_as_a_likely_typo_for_assignment() {
    let source = "
        main : integer() {
            x : integer = 1;
            y : integer = 2;
            x == y;
            return 0;
        }
    ";
    let (_module, sink) = check(source);
    let errors = error_messages(&sink);
    assert!(errors.iter().any(|m| m.contains(":=")), "{:?}", errors);
}

#[test]
fn discardable_non_void_call_result_may_be_discarded() {
    let source = "
        f : integer() discardable { return 1; }
        main : integer() { f(); return 0; }
    ";
    let (_module, sink) = check(source);
    assert!(error_messages(&sink).is_empty(), "{:?}", error_messages(&sink));
}

#[test]
fn non_discardable_non_void_call_result_must_be_used() {
    let source = "
        f : integer() { return 1; }
        main : integer() { f(); return 0; }
    ";
    let (_module, sink) = check(source);
    let errors = error_messages(&sink);
    assert!(errors.iter().any(|m| m.contains("discardable")), "{:?}", errors);
}

#[test]
fn running_the_analyzer_twice_is_idempotent() {
    let source = "
        f : integer(x : integer) { return x; }
        main : integer() { return f(1); }
    ";
    let mut module = build_module("test.tarn", source.to_string()).expect("lex/parse should succeed");
    let mut sink = CollectingSink::new();
    let first_ok = Analyzer::new(&mut module, &mut sink).check_module();
    let first_error_count = sink.diagnostics.len();
    let second_ok = Analyzer::new(&mut module, &mut sink).check_module();
    assert_eq!(first_ok, second_ok);
    assert_eq!(sink.diagnostics.len(), first_error_count, "a second run must not add duplicate diagnostics");
}
