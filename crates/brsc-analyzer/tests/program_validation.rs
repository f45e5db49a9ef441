//! Scope validation tests: unknown calls, argument counts, duplicates,
//! overrides, shadowing, and diagnostic filtering.

use brsc_analyzer::{ProjectConfig, Program};
use brsc_ast::catalog::codes;
use brsc_ast::{Range, Severity};

fn program() -> Program {
    Program::new(ProjectConfig {
        root_dir: Some("/proj".into()),
        ..ProjectConfig::default()
    })
}

#[test]
fn test_call_to_unknown_function() {
    let mut program = program();
    program
        .set_file("/proj/source/main.brs", "sub main()\n    doThing()\nend sub")
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1, "got: {:?}", diagnostics);
    assert_eq!(diagnostics[0].code, codes::CALL_TO_UNKNOWN_FUNCTION);
    // Reported at the callee name
    assert_eq!(diagnostics[0].range, Range::of(1, 4, 1, 11));
}

#[test]
fn test_known_function_produces_no_diagnostic() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    helper()\nend sub\nsub helper()\nend sub",
        )
        .unwrap();
    assert!(program.get_diagnostics().is_empty());
}

#[test]
fn test_call_to_platform_function_is_known() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    print UCase(\"hi\")\nend sub",
        )
        .unwrap();
    assert!(program.get_diagnostics().is_empty());
}

#[test]
fn test_call_resolving_to_local_variable_is_skipped() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main(callback as function)\n    callback()\nend sub",
        )
        .unwrap();
    assert!(program.get_diagnostics().is_empty());
}

#[test]
fn test_method_call_on_object_is_skipped() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    m.top.findNode(\"label\")\nend sub",
        )
        .unwrap();
    assert!(program.get_diagnostics().is_empty());
}

#[test]
fn test_unknown_namespaced_function_is_flagged() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.bs",
            "namespace Acme\n    function spin()\n        return 1\n    end function\nend namespace\nsub main()\n    Acme.spin()\n    Acme.wobble()\nend sub",
        )
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1, "got: {:?}", diagnostics);
    assert_eq!(diagnostics[0].code, codes::CALL_TO_UNKNOWN_FUNCTION);
    assert!(diagnostics[0].message.contains("Acme.wobble"));
}

#[test]
fn test_argument_count_mismatch_bounds() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    combine(1)\nend sub\nfunction combine(a, b, c = 1)\n    return a\nend function",
        )
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1, "got: {:?}", diagnostics);
    assert_eq!(diagnostics[0].code, codes::MISMATCH_ARGUMENT_COUNT);
    assert!(diagnostics[0].message.contains("2-3"));
    assert!(diagnostics[0].message.contains("got 1"));
}

#[test]
fn test_argument_count_exact_bound_message() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    pair(1, 2, 3)\nend sub\nsub pair(a, b)\nend sub",
        )
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("expected 2 argument"));
}

#[test]
fn test_platform_arity_is_checked() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    print Mid(\"abc\")\nend sub",
        )
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::MISMATCH_ARGUMENT_COUNT);
}

#[test]
fn test_duplicate_function_flags_every_duplicate() {
    let mut program = program();
    program
        .set_file("/proj/source/a.brs", "sub foo()\nend sub")
        .unwrap();
    program
        .set_file("/proj/source/b.brs", "sub foo()\nend sub")
        .unwrap();

    let diagnostics = program.get_diagnostics();
    let duplicates: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.code == codes::DUPLICATE_FUNCTION_IMPLEMENTATION)
        .collect();
    assert_eq!(duplicates.len(), 2);
    // One per file, deterministic order by file path
    assert!(duplicates[0].file.to_string_lossy().contains("a.brs"));
    assert!(duplicates[1].file.to_string_lossy().contains("b.brs"));
}

#[test]
fn test_local_function_shadows_stdlib() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    ucase = function(x)\n        return x\n    end function\nend sub",
        )
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1, "got: {:?}", diagnostics);
    assert_eq!(diagnostics[0].code, codes::LOCAL_FUNCTION_SHADOWS_STDLIB);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
}

#[test]
fn test_local_function_shadows_scope_function() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    helper = function(x)\n        return x\n    end function\nend sub\nsub helper()\nend sub",
        )
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1, "got: {:?}", diagnostics);
    assert_eq!(diagnostics[0].code, codes::LOCAL_FUNCTION_SHADOWS_SCOPE);
}

#[test]
fn test_local_var_shadowed_by_scope_function() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    helper = 1\n    print helper\nend sub\nsub helper()\nend sub",
        )
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1, "got: {:?}", diagnostics);
    assert_eq!(
        diagnostics[0].code,
        codes::LOCAL_VAR_SHADOWED_BY_SCOPE_FUNCTION
    );
}

#[test]
fn test_scope_function_shadowed_by_built_in() {
    let mut program = program();
    program
        .set_file("/proj/source/main.brs", "function Len(x)\n    return 0\nend function")
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1, "got: {:?}", diagnostics);
    assert_eq!(
        diagnostics[0].code,
        codes::SCOPE_FUNCTION_SHADOWED_BY_BUILT_IN
    );
}

#[test]
fn test_suppression_comment_drops_diagnostic() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    'bs:disable-next-line\n    doThing()\nend sub",
        )
        .unwrap();
    assert!(program.get_diagnostics().is_empty());
}

#[test]
fn test_suppression_with_other_code_keeps_diagnostic() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/main.brs",
            "sub main()\n    doThing() 'bs:disable-line 1004\nend sub",
        )
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::CALL_TO_UNKNOWN_FUNCTION);
}

#[test]
fn test_ignore_error_codes_config() {
    let mut program = Program::new(ProjectConfig {
        root_dir: Some("/proj".into()),
        ignore_error_codes: vec![codes::CALL_TO_UNKNOWN_FUNCTION],
        ..ProjectConfig::default()
    });
    program
        .set_file("/proj/source/main.brs", "sub main()\n    doThing()\nend sub")
        .unwrap();
    assert!(program.get_diagnostics().is_empty());
}

#[test]
fn test_severity_override_config() {
    let mut program = Program::new(ProjectConfig {
        root_dir: Some("/proj".into()),
        diagnostic_severity_overrides: [(
            codes::CALL_TO_UNKNOWN_FUNCTION.to_string(),
            "warn".to_string(),
        )]
        .into_iter()
        .collect(),
        ..ProjectConfig::default()
    });
    program
        .set_file("/proj/source/main.brs", "sub main()\n    doThing()\nend sub")
        .unwrap();

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
}

#[test]
fn test_is_known_namespace() {
    let mut program = program();
    program
        .set_file(
            "/proj/source/ns.bs",
            "namespace Acme.Widgets\n    function spin()\n        return 1\n    end function\nend namespace",
        )
        .unwrap();

    assert!(program.is_known_namespace("source", "acme"));
    assert!(program.is_known_namespace("source", "Acme.Widgets"));
    assert!(!program.is_known_namespace("source", "acme.widgets.extra"));
    assert!(!program.is_known_namespace("platform", "acme"));
}

#[test]
fn test_validation_marks_scope_chain_validated() {
    let mut program = program();
    program
        .set_file("/proj/source/main.brs", "sub main()\nend sub")
        .unwrap();
    let _ = program.get_diagnostics();

    for name in ["platform", "source"] {
        assert!(
            program.get_scope(name).unwrap().is_validated(),
            "scope '{}' should be validated",
            name
        );
    }
}

#[test]
fn test_file_change_invalidates_and_revalidates() {
    let mut program = program();
    program
        .set_file("/proj/source/main.brs", "sub main()\n    helper()\nend sub")
        .unwrap();
    program
        .set_file("/proj/source/util.brs", "sub helper()\nend sub")
        .unwrap();
    assert!(program.get_diagnostics().is_empty());

    // Replacing util.brs without helper reintroduces the unknown call
    program
        .set_file("/proj/source/util.brs", "sub other()\nend sub")
        .unwrap();
    assert!(!program.get_scope("source").unwrap().is_validated());

    let diagnostics = program.get_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::CALL_TO_UNKNOWN_FUNCTION);
}
