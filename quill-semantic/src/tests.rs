use quill_core::{Diagnostic, DiagnosticKind, Location, Severity};
use quill_syntax::Ast;
use quill_token::{Lexer, Tokens};

use crate::analyzer::{SemanticAnalyzer, SemanticInfo};
use crate::types::Type;

fn get_ast(content: &str) -> Ast {
    let tokens = Lexer::new(content).collect();
    let tokens = Tokens::new(tokens, content.len());
    quill_syntax::Parser::new(tokens).parse()
}

fn analyze(content: &str) -> SemanticInfo {
    let ast = get_ast(content);
    SemanticAnalyzer::new(content).analyze(&ast)
}

fn slice<'src>(content: &'src str, diagnostic: &Diagnostic) -> &'src str {
    &content[diagnostic.location.to_range()]
}

#[test]
fn clean_program_has_no_diagnostics() {
    let content = r#"
var limit: int = 10;

int add(int a, int b) {
    return a + b;
}

void main() {
    var total = add(1, 2);
    let scale = 2;
    total = total * scale + limit;
    if (total > limit) {
        total = limit;
    } else {
        total = 0;
    }
    while (total > 0) {
        total = total - 1;
    }
}
"#;
    let info = analyze(content);
    assert!(info.diagnostics.is_empty(), "{:?}", info.diagnostics);

    // balanced traversal leaves only the global scope open
    assert_eq!(info.symbol_table.depth(), 1);
    assert_eq!(info.symbol_table.symbols_in_scope(0).count(), 3);
}

#[test]
fn every_expression_is_annotated() {
    let content = "var x = 1 + 2;";
    let info = analyze(content);
    assert!(info.diagnostics.is_empty());

    let start = content.find("1 + 2").unwrap();
    let sum = Location::new(start, start + "1 + 2".len());
    assert_eq!(info.expr_types.get(&sum), Some(&Type::Int));

    let one = Location::new(start, start + 1);
    assert_eq!(info.expr_types.get(&one), Some(&Type::Int));
}

#[test]
fn undeclared_identifier_is_reported_at_the_reference() {
    let content = "void main() { var x = missing; }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    let diagnostic = &info.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::UndeclaredIdentifier);
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(slice(content, diagnostic), "missing");
}

#[test]
fn local_declarations_are_not_visible_before_their_point() {
    let content = "void main() { x = 1; var x = 2; }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::UndeclaredIdentifier);
    assert_eq!(slice(content, &info.diagnostics[0]), "x");
}

#[test]
fn redeclaration_in_same_scope_is_reported_once() {
    let content = "void main() { var x = 1; var x = 2; }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::Redeclaration);
    assert_eq!(slice(content, &info.diagnostics[0]), "x");
}

#[test]
fn shadowing_in_nested_scope_is_not_a_conflict() {
    let content = "void main() { var x = 1; { var x = true; x = false; } x = 2; }";
    let info = analyze(content);
    assert!(info.diagnostics.is_empty(), "{:?}", info.diagnostics);
}

#[test]
fn initializer_type_must_match_annotation() {
    let content = "var x: int = 5; var y: bool = x;";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    let diagnostic = &info.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::TypeMismatch);
    // reported at y's initializer, which references x
    assert_eq!(diagnostic.location.start_byte, content.rfind('x').unwrap());
}

#[test]
fn int_widens_to_float() {
    let content = "var ratio: float = 1;";
    let info = analyze(content);
    assert!(info.diagnostics.is_empty(), "{:?}", info.diagnostics);
}

#[test]
fn mutually_recursive_functions_resolve_forward() {
    let content = r#"
int f(int n) { return g(n); }
int g(int n) { return f(n); }
"#;
    let info = analyze(content);
    assert!(info.diagnostics.is_empty(), "{:?}", info.diagnostics);
}

#[test]
fn globals_are_not_visible_before_their_declaration() {
    let content = "void main() { count = 1; } var count: int = 0;";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::UndeclaredIdentifier);
}

#[test]
fn arity_mismatch_makes_the_call_an_error() {
    let content = r#"
int foo(int a, int b) { return a; }
void main() { foo(1); }
"#;
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    let diagnostic = &info.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::ArityMismatch);
    assert_eq!(
        diagnostic.message,
        "1 argument passed to function 'foo' (expected 2)"
    );

    let start = content.find("foo(1)").unwrap();
    let call = Location::new(start, start + "foo(1)".len());
    assert_eq!(info.expr_types.get(&call), Some(&Type::Error));
}

#[test]
fn argument_types_are_checked_per_parameter() {
    let content = r#"
int foo(int a, bool b) { return a; }
void main() { foo(true, 1); }
"#;
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 2);
    assert!(info
        .diagnostics
        .iter()
        .all(|d| d.kind == DiagnosticKind::TypeMismatch));
}

#[test]
fn calling_a_variable_is_invalid() {
    let content = "var v = 1; void main() { v(); }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::InvalidOperation);
    assert_eq!(slice(content, &info.diagnostics[0]), "v");
}

#[test]
fn missing_return_is_a_warning_only() {
    let content = r#"
int sign(int n) {
    if (n > 0) { return 1; }
}
"#;
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    let diagnostic = &info.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::MissingReturn);
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(slice(content, diagnostic), "sign");
}

#[test]
fn return_in_both_branches_satisfies_reachability() {
    let content = r#"
int sign(int n) {
    if (n > 0) { return 1; } else { return 0; }
}
"#;
    let info = analyze(content);
    assert!(info.diagnostics.is_empty(), "{:?}", info.diagnostics);
}

#[test]
fn loops_do_not_count_as_returning() {
    let content = r#"
int spin() {
    while (true) { return 1; }
}
"#;
    let info = analyze(content);
    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::MissingReturn);
}

#[test]
fn return_value_must_match_return_type() {
    let content = r#"int f() { return "s"; }"#;
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::TypeMismatch);
    assert_eq!(slice(content, &info.diagnostics[0]), "\"s\"");
}

#[test]
fn void_function_must_not_return_a_value() {
    let content = "void f() { return 1; }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    let diagnostic = &info.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::TypeMismatch);
    assert_eq!(diagnostic.message, "returning a value in void function 'f'");
}

#[test]
fn bare_return_in_non_void_function_is_reported() {
    let content = "int f() { return; }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::TypeMismatch);
}

#[test]
fn void_call_result_is_not_a_value() {
    let content = "void f() { } void main() { var x = f(); }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::TypeMismatch);
    assert_eq!(
        info.diagnostics[0].message,
        "'void' expression cannot be used as a value"
    );
}

#[test]
fn conditions_must_be_boolean() {
    let content = "void main() { while (1) { } if (1 + 2) { } }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 2);
    assert!(info
        .diagnostics
        .iter()
        .all(|d| d.kind == DiagnosticKind::TypeMismatch));
    assert_eq!(slice(content, &info.diagnostics[0]), "1");
    assert_eq!(slice(content, &info.diagnostics[1]), "1 + 2");
}

#[test]
fn invalid_operator_combination_is_reported() {
    let content = r#"var x = "a" + true;"#;
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::InvalidOperation);
}

#[test]
fn error_type_suppresses_cascading_diagnostics() {
    let content = "void main() { var x = (missing + 1) * 2; }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::UndeclaredIdentifier);
}

#[test]
fn constants_cannot_be_reassigned() {
    let content = "void main() { let k = 1; k = 2; }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::ConstReassignment);
    assert_eq!(slice(content, &info.diagnostics[0]), "k");
}

#[test]
fn functions_are_not_assignable() {
    let content = "void f() { } void main() { f = 1; }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::InvalidOperation);
}

#[test]
fn duplicate_function_names_conflict() {
    let content = "void f() { } int f() { return 1; }";
    let info = analyze(content);

    assert!(info
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::Redeclaration));
}

#[test]
fn parameter_redeclared_as_local_conflicts() {
    let content = "int f(int a) { var a = 2; return a; }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::Redeclaration);
}

#[test]
fn parameters_cannot_be_void() {
    let content = "void f(void a) { }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 1);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::TypeMismatch);
    assert_eq!(slice(content, &info.diagnostics[0]), "void");
}

#[test]
fn analysis_continues_past_a_syntax_error() {
    let content = "void main() { var x = ); missing; }";
    let info = analyze(content);

    assert_eq!(info.diagnostics.len(), 2);
    assert_eq!(info.diagnostics[0].kind, DiagnosticKind::SyntaxError);
    assert_eq!(info.diagnostics[1].kind, DiagnosticKind::UndeclaredIdentifier);
    assert_eq!(slice(content, &info.diagnostics[1]), "missing");
}

#[test]
fn scope_stack_is_balanced_even_with_errors() {
    let content = "void main() { { var x = missing; } while (1) { y = 2; } }";
    let info = analyze(content);

    assert!(!info.diagnostics.is_empty());
    assert_eq!(info.symbol_table.depth(), 1);
}

#[test]
fn analysis_is_idempotent() {
    let content = r#"
var limit: bool = 3;
void main() { total = limit; }
"#;
    let first = analyze(content);
    let second = analyze(content);
    assert_eq!(first.diagnostics, second.diagnostics);
}
