//! Built-in callable catalog.
//!
//! The platform scope is seeded from this static table: every global
//! function the device runtime provides, with its arity bounds. The table
//! is the single source of truth; lookups go through lower-cased names.

use crate::files::code::CallableInfo;
use brsc_ast::Range;
use std::path::PathBuf;

/// Name of the root scope every scope tree hangs from.
pub const PLATFORM_SCOPE_NAME: &str = "platform";

/// Name of the scope holding files under `source/`.
pub const SOURCE_SCOPE_NAME: &str = "source";

/// `(name, min_args, max_args)` for every built-in global function.
const BUILTINS: &[(&str, usize, usize)] = &[
    // Type conversion and inspection
    ("CreateObject", 1, 6),
    ("Type", 1, 2),
    ("GetInterface", 2, 2),
    ("Box", 1, 1),
    ("GetGlobalAA", 0, 0),
    // String functions
    ("UCase", 1, 1),
    ("LCase", 1, 1),
    ("Len", 1, 1),
    ("Left", 2, 2),
    ("Right", 2, 2),
    ("Mid", 2, 3),
    ("Instr", 2, 4),
    ("Chr", 1, 1),
    ("Asc", 1, 1),
    ("Str", 1, 1),
    ("StrI", 1, 2),
    ("String", 2, 2),
    ("StringI", 2, 2),
    ("Substitute", 2, 6),
    ("Val", 1, 2),
    ("StrToI", 1, 1),
    // Math functions
    ("Abs", 1, 1),
    ("Atn", 1, 1),
    ("Cos", 1, 1),
    ("Sin", 1, 1),
    ("Tan", 1, 1),
    ("Exp", 1, 1),
    ("Log", 1, 1),
    ("Sqr", 1, 1),
    ("Rnd", 1, 1),
    ("Int", 1, 1),
    ("Fix", 1, 1),
    ("Cint", 1, 1),
    ("Csng", 1, 1),
    ("Cdbl", 1, 1),
    // JSON
    ("FormatJson", 1, 2),
    ("ParseJson", 1, 2),
    // Runtime
    ("Wait", 2, 2),
    ("Sleep", 1, 1),
    ("UpTime", 1, 1),
    ("RebootSystem", 0, 0),
    ("RunGarbageCollector", 0, 0),
    ("GetLastRunCompileError", 0, 0),
    ("GetLastRunRuntimeError", 0, 0),
    // File system
    ("ReadAsciiFile", 1, 1),
    ("WriteAsciiFile", 2, 2),
    ("ListDir", 1, 1),
    ("MatchFiles", 2, 2),
    ("DeleteFile", 1, 1),
    ("DeleteDirectory", 1, 1),
    ("CreateDirectory", 1, 1),
    ("FormatDrive", 2, 2),
    ("CopyFile", 2, 2),
    ("MoveFile", 2, 2),
];

/// Materialize the catalog as callables. Platform callables carry an empty
/// file path and a zero range; diagnostics never point into them.
pub fn platform_callables() -> Vec<CallableInfo> {
    BUILTINS
        .iter()
        .map(|(name, min_args, max_args)| CallableInfo {
            name: (*name).to_string(),
            full_name: (*name).to_string(),
            name_range: Range::zero(),
            file: PathBuf::new(),
            namespace: None,
            min_args: *min_args,
            max_args: *max_args,
        })
        .collect()
}

/// Case-insensitive membership test against the catalog.
pub fn is_platform_callable(name: &str) -> bool {
    BUILTINS
        .iter()
        .any(|(builtin, _, _)| builtin.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(is_platform_callable("ucase"));
        assert!(is_platform_callable("UCASE"));
        assert!(is_platform_callable("CreateObject"));
        assert!(!is_platform_callable("doThing"));
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for (name, _, _) in BUILTINS {
            assert!(
                seen.insert(name.to_lowercase()),
                "built-in '{}' listed twice",
                name
            );
        }
    }

    #[test]
    fn test_arity_bounds_are_ordered() {
        for (name, min, max) in BUILTINS {
            assert!(min <= max, "built-in '{}' has inverted arity bounds", name);
        }
    }

    #[test]
    fn test_materialized_callables_match_catalog() {
        let callables = platform_callables();
        assert_eq!(callables.len(), BUILTINS.len());
        let mid = callables
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case("mid"))
            .unwrap();
        assert_eq!(mid.min_args, 2);
        assert_eq!(mid.max_args, 3);
    }
}
