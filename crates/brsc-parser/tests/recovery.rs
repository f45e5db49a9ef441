//! Error recovery tests.
//!
//! The parser never fails as a whole: every problem becomes a ranged
//! diagnostic, and parsing resumes at the next statement boundary.

use brsc_ast::ast::Statement;
use brsc_lexer::tokenize;
use brsc_parser::{parse, ParseMode, ParseResult};

fn parse_superset(source: &str) -> ParseResult {
    parse(&tokenize(source).tokens, ParseMode::Superset)
}

/// Assert parsing produced at least one diagnostic.
fn expect_diagnostics(source: &str) -> ParseResult {
    let result = parse_superset(source);
    assert!(
        !result.diagnostics.is_empty(),
        "expected diagnostics for {:?}",
        source
    );
    result
}

#[test]
fn test_unexpected_token_recovers_to_next_statement() {
    let result = expect_diagnostics("sub main()\n    x = = 1\n    y = 2\nend sub");
    let Statement::FunctionDeclaration(func) = &result.statements[0] else {
        panic!("expected function to survive");
    };
    // The bad statement is dropped, the next one parses
    assert!(func
        .body
        .iter()
        .any(|s| matches!(s, Statement::Assignment(a) if a.name.text == "y")));
}

#[test]
fn test_unclosed_function_reports_eof() {
    let result = expect_diagnostics("sub main()\n    x = 1\n");
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.message.contains("end of file")));
}

#[test]
fn test_unclosed_array_reports_eof() {
    let result = expect_diagnostics("x = [1, 2");
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.message.contains("']'")));
}

#[test]
fn test_unclosed_paren_in_call() {
    expect_diagnostics("sub main()\n    doThing(1, 2\nend sub");
}

#[test]
fn test_diagnostic_carries_range() {
    let result = expect_diagnostics("sub main()\n    x = = 1\nend sub");
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.range.start.line, 1);
}

#[test]
fn test_error_in_one_function_does_not_poison_the_next() {
    let result = parse_superset(
        "sub broken()\n    x = = 1\nend sub\nsub fine()\n    y = 2\nend sub",
    );
    assert!(!result.diagnostics.is_empty());
    assert_eq!(result.statements.len(), 2);
}

#[test]
fn test_missing_then_block_terminator() {
    expect_diagnostics("sub main()\n    if true then\n        x = 1\nend sub");
}

#[test]
fn test_statement_garbage_after_expression() {
    let result = expect_diagnostics("sub main()\n    print 1 )\nend sub");
    // Parsing continues and the function still closes
    assert_eq!(result.statements.len(), 1);
}

#[test]
fn test_invalid_assignment_target() {
    let result = expect_diagnostics("sub main()\n    doThing() = 3\nend sub");
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.message.contains("assignment target")));
}

#[test]
fn test_exit_without_loop_keyword() {
    let result = expect_diagnostics("sub main()\n    exit\nend sub");
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.message.contains("'exit'")));
}
