//! Diagnostic catalog.
//!
//! One constructor per diagnostic kind; each kind has exactly one stable
//! numeric code. Codes never get reused, so gaps may appear as kinds are
//! retired.

use crate::diagnostic::{DiagnosticData, Severity};

/// Stable diagnostic codes.
pub mod codes {
    pub const SYNTAX_ERROR: u32 = 1001;
    pub const NOT_ALLOWED_IN_BASELINE: u32 = 1002;
    pub const CALL_TO_UNKNOWN_FUNCTION: u32 = 1003;
    pub const MISMATCH_ARGUMENT_COUNT: u32 = 1004;
    pub const DUPLICATE_FUNCTION_IMPLEMENTATION: u32 = 1005;
    pub const OVERRIDES_ANCESTOR_FUNCTION: u32 = 1006;
    pub const SCOPE_FUNCTION_SHADOWED_BY_BUILT_IN: u32 = 1007;
    pub const LOCAL_FUNCTION_SHADOWS_STDLIB: u32 = 1008;
    pub const LOCAL_FUNCTION_SHADOWS_SCOPE: u32 = 1009;
    pub const LOCAL_VAR_SHADOWED_BY_SCOPE_FUNCTION: u32 = 1010;
    pub const REFERENCED_FILE_DOES_NOT_EXIST: u32 = 1011;
    pub const SCRIPT_SRC_CANNOT_BE_EMPTY: u32 = 1012;
    pub const SCRIPT_IMPORT_CASE_MISMATCH: u32 = 1013;
    pub const DUPLICATE_ANCESTOR_SCRIPT_IMPORT: u32 = 1014;
    pub const UNKNOWN_PARENT_CLASS: u32 = 1015;
    pub const CYCLIC_CLASS_INHERITANCE: u32 = 1016;
    pub const OVERRIDE_SIGNATURE_MISMATCH: u32 = 1017;
    pub const CANNOT_OVERRIDE_FINAL_MEMBER: u32 = 1018;
    pub const MISSING_OVERRIDE_ANNOTATION: u32 = 1019;
    pub const FIELD_SHADOWS_ANCESTOR_FIELD: u32 = 1020;
    pub const DUPLICATE_CLASS_MEMBER: u32 = 1021;
    pub const DUPLICATE_CLASS_DECLARATION: u32 = 1022;
    pub const EXPECTED_STATEMENT_SEPARATOR: u32 = 1023;
    pub const UNTERMINATED_STRING: u32 = 1024;
    pub const UNEXPECTED_CHARACTER: u32 = 1025;
}

fn data(code: u32, severity: Severity, message: String) -> DiagnosticData {
    DiagnosticData {
        code,
        severity,
        message,
    }
}

/// Human-readable arity bounds: "n" when min == max, "n-m" otherwise.
pub fn arity_bounds(min: usize, max: usize) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{}-{}", min, max)
    }
}

pub fn syntax_error(message: impl Into<String>) -> DiagnosticData {
    data(codes::SYNTAX_ERROR, Severity::Error, message.into())
}

pub fn not_allowed_in_baseline(construct: &str) -> DiagnosticData {
    data(
        codes::NOT_ALLOWED_IN_BASELINE,
        Severity::Error,
        format!("'{}' is only allowed in superset mode", construct),
    )
}

pub fn call_to_unknown_function(name: &str, scope_name: &str) -> DiagnosticData {
    data(
        codes::CALL_TO_UNKNOWN_FUNCTION,
        Severity::Error,
        format!("cannot find function '{}' in scope '{}'", name, scope_name),
    )
}

pub fn mismatch_argument_count(min: usize, max: usize, actual: usize) -> DiagnosticData {
    data(
        codes::MISMATCH_ARGUMENT_COUNT,
        Severity::Error,
        format!(
            "expected {} argument(s), got {}",
            arity_bounds(min, max),
            actual
        ),
    )
}

pub fn duplicate_function_implementation(name: &str) -> DiagnosticData {
    data(
        codes::DUPLICATE_FUNCTION_IMPLEMENTATION,
        Severity::Error,
        format!("duplicate function implementation for '{}'", name),
    )
}

pub fn overrides_ancestor_function(name: &str, ancestor_scope: &str) -> DiagnosticData {
    data(
        codes::OVERRIDES_ANCESTOR_FUNCTION,
        Severity::Information,
        format!(
            "function '{}' overrides a function of the same name in '{}'",
            name, ancestor_scope
        ),
    )
}

pub fn scope_function_shadowed_by_built_in(name: &str) -> DiagnosticData {
    data(
        codes::SCOPE_FUNCTION_SHADOWED_BY_BUILT_IN,
        Severity::Warning,
        format!("function '{}' has the same name as a built-in function", name),
    )
}

pub fn local_function_shadows_stdlib(name: &str) -> DiagnosticData {
    data(
        codes::LOCAL_FUNCTION_SHADOWS_STDLIB,
        Severity::Warning,
        format!(
            "local variable '{}' of function type shadows a standard-library function",
            name
        ),
    )
}

pub fn local_function_shadows_scope(name: &str) -> DiagnosticData {
    data(
        codes::LOCAL_FUNCTION_SHADOWS_SCOPE,
        Severity::Warning,
        format!(
            "local variable '{}' of function type shadows a function in scope",
            name
        ),
    )
}

pub fn local_var_shadowed_by_scope_function(name: &str) -> DiagnosticData {
    data(
        codes::LOCAL_VAR_SHADOWED_BY_SCOPE_FUNCTION,
        Severity::Warning,
        format!(
            "local variable '{}' has the same name as a function in scope and will shadow it",
            name
        ),
    )
}

pub fn referenced_file_does_not_exist(pkg_path: &str) -> DiagnosticData {
    data(
        codes::REFERENCED_FILE_DOES_NOT_EXIST,
        Severity::Error,
        format!("referenced file 'pkg:/{}' does not exist", pkg_path),
    )
}

pub fn script_src_cannot_be_empty() -> DiagnosticData {
    data(
        codes::SCRIPT_SRC_CANNOT_BE_EMPTY,
        Severity::Error,
        "script uri cannot be empty".to_string(),
    )
}

pub fn script_import_case_mismatch(import_text: &str, actual: &str) -> DiagnosticData {
    data(
        codes::SCRIPT_IMPORT_CASE_MISMATCH,
        Severity::Warning,
        format!(
            "script import 'pkg:/{}' differs in case from file 'pkg:/{}'",
            import_text, actual
        ),
    )
}

pub fn duplicate_ancestor_script_import(pkg_path: &str, ancestor_component: &str) -> DiagnosticData {
    data(
        codes::DUPLICATE_ANCESTOR_SCRIPT_IMPORT,
        Severity::Warning,
        format!(
            "script 'pkg:/{}' is already imported by ancestor component '{}'",
            pkg_path, ancestor_component
        ),
    )
}

pub fn unknown_parent_class(name: &str) -> DiagnosticData {
    data(
        codes::UNKNOWN_PARENT_CLASS,
        Severity::Error,
        format!("cannot find parent class '{}'", name),
    )
}

pub fn cyclic_class_inheritance(name: &str) -> DiagnosticData {
    data(
        codes::CYCLIC_CLASS_INHERITANCE,
        Severity::Error,
        format!("class '{}' is part of an inheritance cycle", name),
    )
}

pub fn override_signature_mismatch(member: &str, parent_class: &str) -> DiagnosticData {
    data(
        codes::OVERRIDE_SIGNATURE_MISMATCH,
        Severity::Error,
        format!(
            "member '{}' is not compatible with the member it overrides in class '{}'",
            member, parent_class
        ),
    )
}

pub fn cannot_override_final_member(member: &str, parent_class: &str) -> DiagnosticData {
    data(
        codes::CANNOT_OVERRIDE_FINAL_MEMBER,
        Severity::Error,
        format!(
            "member '{}' overrides a final member of class '{}'",
            member, parent_class
        ),
    )
}

pub fn missing_override_annotation(member: &str, parent_class: &str) -> DiagnosticData {
    data(
        codes::MISSING_OVERRIDE_ANNOTATION,
        Severity::Error,
        format!(
            "member '{}' overrides a member of class '{}' and must be marked 'override'",
            member, parent_class
        ),
    )
}

pub fn field_shadows_ancestor_field(field: &str, parent_class: &str) -> DiagnosticData {
    data(
        codes::FIELD_SHADOWS_ANCESTOR_FIELD,
        Severity::Error,
        format!(
            "field '{}' shadows a field of ancestor class '{}'",
            field, parent_class
        ),
    )
}

pub fn duplicate_class_member(member: &str, class: &str) -> DiagnosticData {
    data(
        codes::DUPLICATE_CLASS_MEMBER,
        Severity::Error,
        format!("class '{}' declares member '{}' more than once", class, member),
    )
}

pub fn duplicate_class_declaration(name: &str) -> DiagnosticData {
    data(
        codes::DUPLICATE_CLASS_DECLARATION,
        Severity::Error,
        format!("duplicate class declaration '{}'", name),
    )
}

pub fn expected_statement_separator(found: &str) -> DiagnosticData {
    data(
        codes::EXPECTED_STATEMENT_SEPARATOR,
        Severity::Error,
        format!("expected end of statement, found {}", found),
    )
}

pub fn unterminated_string() -> DiagnosticData {
    data(
        codes::UNTERMINATED_STRING,
        Severity::Error,
        "unterminated string literal".to_string(),
    )
}

pub fn unexpected_character(text: &str) -> DiagnosticData {
    data(
        codes::UNEXPECTED_CHARACTER,
        Severity::Error,
        format!("unexpected character '{}'", text),
    )
}
