//! Code file model.
//!
//! A code file wraps lexer and parser output and derives the indexes the
//! scope validators consume: callables, call sites, function scopes with
//! their variable tables, class and namespace records, import references,
//! property-name completions, and suppression directives.

use brsc_ast::ast::{
    ClassStatement, Expression, FunctionStatement, Statement,
};
use brsc_ast::walk::walk_statements;
use brsc_ast::{catalog, Diagnostic, PkgPath, Position, Range};
use brsc_lexer::{LexErrorKind, Token, TokenKind};
use brsc_parser::ParseMode;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A function or method declaration addressable by name.
#[derive(Debug, Clone, PartialEq)]
pub struct CallableInfo {
    /// Simple name, case preserved.
    pub name: String,
    /// Namespace-qualified name, case preserved (`Acme.Widgets.spin`).
    pub full_name: String,
    pub name_range: Range,
    /// Absolute path of the declaring file; empty for platform built-ins.
    pub file: PathBuf,
    /// Lower-cased namespace prefix, when declared inside one.
    pub namespace: Option<String>,
    pub min_args: usize,
    pub max_args: usize,
}

impl CallableInfo {
    /// Lower-cased lookup key (full name).
    pub fn key(&self) -> String {
        self.full_name.to_lowercase()
    }
}

/// A function-call site collected during indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    /// Callee name, possibly dotted, case preserved.
    pub name: String,
    /// Range of the callee name.
    pub name_range: Range,
    /// Number of arguments at the site.
    pub arg_count: usize,
    /// Range of the whole call expression.
    pub range: Range,
}

/// A variable declaration inside a function scope.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub name_range: Range,
    /// True when the declared type is a function type (callable value):
    /// an anonymous-function assignment or a `as function` parameter.
    pub is_function_value: bool,
}

/// Variable table for one function body (or the file level).
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionScope {
    /// Enclosing function name; `None` for the file-level scope and for
    /// anonymous functions.
    pub name: Option<String>,
    pub range: Range,
    pub variables: Vec<VarDecl>,
}

impl FunctionScope {
    /// Case-insensitive variable lookup.
    pub fn variable(&self, name: &str) -> Option<&VarDecl> {
        self.variables
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
    }
}

/// A class declaration with its declaring context.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub statement: ClassStatement,
    /// Lower-cased namespace prefix, when declared inside one.
    pub namespace: Option<String>,
    pub file: PathBuf,
}

impl ClassInfo {
    /// Lower-cased fully qualified lookup key.
    pub fn key(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.statement.name.text.to_lowercase()),
            None => self.statement.name.text.to_lowercase(),
        }
    }

    /// Display name with namespace prefix, case preserved where possible.
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.statement.name.text),
            None => self.statement.name.text.clone(),
        }
    }
}

/// A namespace declaration record.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    /// Full dotted name, case preserved.
    pub name: String,
    pub range: Range,
}

/// One `'bs:disable-line` / `'bs:disable-next-line` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct Suppression {
    /// Zero-based line the directive silences.
    pub line: u32,
    /// Codes to silence; `None` silences everything on the line.
    pub codes: Option<Vec<u32>>,
}

/// A parsed code file with derived indexes.
#[derive(Debug, Clone)]
pub struct CodeFile {
    pub path_absolute: PathBuf,
    pub pkg_path: PkgPath,
    pub parse_mode: ParseMode,
    pub statements: Vec<Statement>,
    /// Lexer and parser diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    pub callables: Vec<CallableInfo>,
    pub call_sites: Vec<CallSite>,
    pub function_scopes: Vec<FunctionScope>,
    pub classes: Vec<ClassInfo>,
    pub namespaces: Vec<NamespaceDecl>,
    /// Package paths referenced by `import` statements.
    pub imports: Vec<PkgPath>,
    /// Property names observed in dotted access and AA literal keys,
    /// sorted, deduplicated case-insensitively.
    pub property_name_completions: Vec<String>,
    pub suppressions: Vec<Suppression>,
}

impl CodeFile {
    /// Lex, parse, and index a source file.
    pub fn parse(
        path_absolute: impl Into<PathBuf>,
        pkg_path: PkgPath,
        text: &str,
        parse_mode: ParseMode,
    ) -> Self {
        let path_absolute = path_absolute.into();
        let lexed = brsc_lexer::tokenize(text);

        let mut diagnostics: Vec<Diagnostic> = lexed
            .errors
            .iter()
            .map(|e| {
                let data = match e.kind {
                    LexErrorKind::UnterminatedString => catalog::unterminated_string(),
                    LexErrorKind::UnexpectedCharacter => catalog::unexpected_character(&e.text),
                };
                data.at(e.range).in_file(&path_absolute)
            })
            .collect();

        let parsed = brsc_parser::parse(&lexed.tokens, parse_mode);
        diagnostics.extend(
            parsed
                .diagnostics
                .into_iter()
                .map(|d| d.in_file(&path_absolute)),
        );

        let statements = parsed.statements;
        let mut callables = Vec::new();
        let mut classes = Vec::new();
        let mut namespaces = Vec::new();
        collect_declarations(
            &statements,
            None,
            &path_absolute,
            &mut callables,
            &mut classes,
            &mut namespaces,
        );

        let call_sites = collect_call_sites(&statements);
        let function_scopes = collect_function_scopes(&statements);
        let property_name_completions = collect_property_names(&statements);
        let imports = statements
            .iter()
            .filter_map(|s| match s {
                Statement::Import(import) => Some(PkgPath::new(&import.path.text)),
                _ => None,
            })
            .collect();
        let suppressions = collect_suppressions(&lexed.tokens);

        Self {
            path_absolute,
            pkg_path,
            parse_mode,
            statements,
            diagnostics,
            callables,
            call_sites,
            function_scopes,
            classes,
            namespaces,
            imports,
            property_name_completions,
            suppressions,
        }
    }

    /// The innermost function scope containing `position`; the file-level
    /// scope is the fallback.
    pub fn function_scope_at(&self, position: Position) -> Option<&FunctionScope> {
        self.function_scopes
            .iter()
            .filter(|scope| scope.range.contains(position))
            .max_by_key(|scope| scope.range.start)
    }

    /// True when a suppression directive silences this diagnostic.
    pub fn is_suppressed(&self, diagnostic: &Diagnostic) -> bool {
        self.suppressions.iter().any(|suppression| {
            diagnostic.range.touches_line(suppression.line)
                && suppression
                    .codes
                    .as_ref()
                    .is_none_or(|codes| codes.contains(&diagnostic.code))
        })
    }
}

/// Collect callables, classes, and namespace records, descending into
/// namespace bodies with the dotted prefix.
fn collect_declarations(
    statements: &[Statement],
    prefix: Option<&str>,
    file: &Path,
    callables: &mut Vec<CallableInfo>,
    classes: &mut Vec<ClassInfo>,
    namespaces: &mut Vec<NamespaceDecl>,
) {
    for statement in statements {
        match statement {
            Statement::FunctionDeclaration(func) => {
                if let Some(name) = &func.name {
                    let full_name = match prefix {
                        Some(p) => format!("{}.{}", p, name.text),
                        None => name.text.clone(),
                    };
                    callables.push(CallableInfo {
                        name: name.text.clone(),
                        full_name,
                        name_range: name.range,
                        file: file.to_path_buf(),
                        namespace: prefix.map(str::to_lowercase),
                        min_args: func.min_params(),
                        max_args: func.max_params(),
                    });
                }
            }
            Statement::Class(class) => {
                classes.push(ClassInfo {
                    statement: (**class).clone(),
                    namespace: prefix.map(str::to_lowercase),
                    file: file.to_path_buf(),
                });
            }
            Statement::Namespace(ns) => {
                let full = match prefix {
                    Some(p) => format!("{}.{}", p, ns.name.text()),
                    None => ns.name.text(),
                };
                namespaces.push(NamespaceDecl {
                    name: full.clone(),
                    range: ns.name.range,
                });
                collect_declarations(&ns.body, Some(&full), file, callables, classes, namespaces);
            }
            _ => {}
        }
    }
}

/// Collect every call site whose callee is a plain or dotted name.
fn collect_call_sites(statements: &[Statement]) -> Vec<CallSite> {
    let mut sites = Vec::new();
    walk_statements(statements, &mut |_| {}, &mut |expr| {
        if let Expression::Call { callee, args, range } = expr {
            if let Some((name, name_range)) = callee.as_dotted_name() {
                sites.push(CallSite {
                    name,
                    name_range,
                    arg_count: args.len(),
                    range: *range,
                });
            }
        }
    });
    sites
}

/// Build the file-level scope plus one scope per function body. Variables
/// come from parameters and assignment statements; nested function bodies
/// get their own scope and do not leak variables outward.
fn collect_function_scopes(statements: &[Statement]) -> Vec<FunctionScope> {
    let mut scopes = Vec::new();
    let mut file_vars = Vec::new();
    collect_scope_vars(statements, &mut file_vars, &mut scopes);
    scopes.insert(
        0,
        FunctionScope {
            name: None,
            range: Range::of(0, 0, u32::MAX, 0),
            variables: file_vars,
        },
    );
    scopes
}

fn push_function_scope(func: &FunctionStatement, scopes: &mut Vec<FunctionScope>) {
    let mut variables: Vec<VarDecl> = func
        .params
        .iter()
        .map(|param| VarDecl {
            name: param.name.text.clone(),
            name_range: param.name.range,
            is_function_value: param
                .type_expr
                .as_ref()
                .is_some_and(|t| t.is_function_type()),
        })
        .collect();
    collect_scope_vars(&func.body, &mut variables, scopes);
    scopes.push(FunctionScope {
        name: func.name.as_ref().map(|n| n.text.clone()),
        range: func.range,
        variables,
    });
}

/// Gather variable declarations belonging to the current scope, spawning
/// new scopes for any function bodies encountered.
fn collect_scope_vars(
    statements: &[Statement],
    vars: &mut Vec<VarDecl>,
    scopes: &mut Vec<FunctionScope>,
) {
    for statement in statements {
        match statement {
            Statement::FunctionDeclaration(func) => push_function_scope(func, scopes),
            Statement::Namespace(ns) => collect_scope_vars(&ns.body, vars, scopes),
            Statement::Class(class) => {
                for field in &class.fields {
                    if let Some(init) = &field.initializer {
                        scan_expr_for_functions(init, scopes);
                    }
                }
                for method in &class.methods {
                    push_function_scope(&method.func, scopes);
                }
            }
            Statement::Assignment(assignment) => {
                vars.push(VarDecl {
                    name: assignment.name.text.clone(),
                    name_range: assignment.name.range,
                    is_function_value: matches!(
                        assignment.value,
                        Expression::AnonymousFunction(_)
                    ),
                });
                scan_expr_for_functions(&assignment.value, scopes);
            }
            Statement::Set(set) => {
                scan_expr_for_functions(&set.target, scopes);
                scan_expr_for_functions(&set.value, scopes);
            }
            Statement::Expression(expr) => scan_expr_for_functions(expr, scopes),
            Statement::If(if_stmt) => {
                scan_expr_for_functions(&if_stmt.condition, scopes);
                collect_scope_vars(&if_stmt.then_branch, vars, scopes);
                for (condition, branch) in &if_stmt.else_ifs {
                    scan_expr_for_functions(condition, scopes);
                    collect_scope_vars(branch, vars, scopes);
                }
                if let Some(branch) = &if_stmt.else_branch {
                    collect_scope_vars(branch, vars, scopes);
                }
            }
            Statement::While(while_stmt) => {
                scan_expr_for_functions(&while_stmt.condition, scopes);
                collect_scope_vars(&while_stmt.body, vars, scopes);
            }
            Statement::For(for_stmt) => {
                vars.push(VarDecl {
                    name: for_stmt.counter.text.clone(),
                    name_range: for_stmt.counter.range,
                    is_function_value: false,
                });
                scan_expr_for_functions(&for_stmt.start, scopes);
                scan_expr_for_functions(&for_stmt.end, scopes);
                if let Some(step) = &for_stmt.step {
                    scan_expr_for_functions(step, scopes);
                }
                collect_scope_vars(&for_stmt.body, vars, scopes);
            }
            Statement::ForEach(for_each) => {
                vars.push(VarDecl {
                    name: for_each.item.text.clone(),
                    name_range: for_each.item.range,
                    is_function_value: false,
                });
                scan_expr_for_functions(&for_each.collection, scopes);
                collect_scope_vars(&for_each.body, vars, scopes);
            }
            Statement::Print(print) => {
                for arg in &print.args {
                    scan_expr_for_functions(arg, scopes);
                }
            }
            Statement::Return(ret) => {
                if let Some(value) = &ret.value {
                    scan_expr_for_functions(value, scopes);
                }
            }
            Statement::Dim(dim) => {
                vars.push(VarDecl {
                    name: dim.name.text.clone(),
                    name_range: dim.name.range,
                    is_function_value: false,
                });
            }
            Statement::Import(_)
            | Statement::ExitWhile { .. }
            | Statement::ExitFor { .. }
            | Statement::Goto { .. }
            | Statement::Stop { .. }
            | Statement::End { .. } => {}
        }
    }
}

/// Find anonymous functions inside an expression and give each its own
/// scope. Does not descend past a function boundary; `push_function_scope`
/// handles the body.
fn scan_expr_for_functions(expr: &Expression, scopes: &mut Vec<FunctionScope>) {
    match expr {
        Expression::AnonymousFunction(func) => push_function_scope(func, scopes),
        Expression::DottedGet { object, .. } => scan_expr_for_functions(object, scopes),
        Expression::IndexedGet { object, index, .. } => {
            scan_expr_for_functions(object, scopes);
            scan_expr_for_functions(index, scopes);
        }
        Expression::Call { callee, args, .. } => {
            scan_expr_for_functions(callee, scopes);
            for arg in args {
                scan_expr_for_functions(arg, scopes);
            }
        }
        Expression::New { args, .. } => {
            for arg in args {
                scan_expr_for_functions(arg, scopes);
            }
        }
        Expression::Unary { operand, .. } => scan_expr_for_functions(operand, scopes),
        Expression::Binary { left, right, .. } => {
            scan_expr_for_functions(left, scopes);
            scan_expr_for_functions(right, scopes);
        }
        Expression::ArrayLiteral { elements, .. } => {
            for element in elements {
                scan_expr_for_functions(element, scopes);
            }
        }
        Expression::AaLiteral { members, .. } => {
            for member in members {
                scan_expr_for_functions(&member.value, scopes);
            }
        }
        Expression::Grouping { inner, .. } => scan_expr_for_functions(inner, scopes),
        Expression::IntegerLiteral { .. }
        | Expression::FloatLiteral { .. }
        | Expression::StringLiteral { .. }
        | Expression::BooleanLiteral { .. }
        | Expression::InvalidLiteral { .. }
        | Expression::Identifier(_) => {}
    }
}

/// Property names from dotted access and AA literal keys, deduplicated
/// case-insensitively (first spelling wins), sorted.
fn collect_property_names(statements: &[Statement]) -> Vec<String> {
    let mut by_key: BTreeMap<String, String> = BTreeMap::new();
    walk_statements(statements, &mut |_| {}, &mut |expr| match expr {
        Expression::DottedGet { name, .. } => {
            by_key
                .entry(name.text.to_lowercase())
                .or_insert_with(|| name.text.clone());
        }
        Expression::AaLiteral { members, .. } => {
            for member in members {
                by_key
                    .entry(member.key.text.to_lowercase())
                    .or_insert_with(|| member.key.text.clone());
            }
        }
        _ => {}
    });
    by_key.into_values().collect()
}

/// Scan comment tokens for suppression directives.
fn collect_suppressions(tokens: &[Token]) -> Vec<Suppression> {
    let mut suppressions = Vec::new();
    for token in tokens {
        if token.kind != TokenKind::Comment {
            continue;
        }
        let body = token.text.trim_start_matches('\'').trim();
        let (directive_line, rest) = if let Some(rest) = body.strip_prefix("bs:disable-next-line") {
            (token.range.start.line + 1, rest)
        } else if let Some(rest) = body.strip_prefix("bs:disable-line") {
            (token.range.start.line, rest)
        } else {
            continue;
        };

        let codes: Vec<u32> = rest
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter_map(|part| part.parse::<u32>().ok())
            .collect();
        suppressions.push(Suppression {
            line: directive_line,
            codes: if codes.is_empty() { None } else { Some(codes) },
        });
    }
    suppressions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_file(source: &str) -> CodeFile {
        CodeFile::parse(
            "/proj/source/main.bs",
            PkgPath::new("source/main.bs"),
            source,
            ParseMode::Superset,
        )
    }

    #[test]
    fn test_callables_include_namespaced_functions() {
        let file = code_file(
            "sub main()\nend sub\nnamespace Acme.Util\n    function pad(s)\n        return s\n    end function\nend namespace",
        );
        assert_eq!(file.callables.len(), 2);
        assert_eq!(file.callables[0].full_name, "main");
        assert_eq!(file.callables[1].full_name, "Acme.Util.pad");
        assert_eq!(file.callables[1].namespace.as_deref(), Some("acme.util"));
        assert_eq!(file.callables[1].key(), "acme.util.pad");
    }

    #[test]
    fn test_callable_arity_bounds() {
        let file = code_file("function f(a, b, c = 1)\n    return a\nend function");
        let callable = &file.callables[0];
        assert_eq!(callable.min_args, 2);
        assert_eq!(callable.max_args, 3);
    }

    #[test]
    fn test_call_sites_record_name_and_args() {
        let file = code_file("sub main()\n    doThing(1, 2)\n    m.top.findNode(\"x\")\nend sub");
        assert_eq!(file.call_sites.len(), 2);
        assert_eq!(file.call_sites[0].name, "doThing");
        assert_eq!(file.call_sites[0].arg_count, 2);
        assert_eq!(file.call_sites[1].name, "m.top.findNode");
    }

    #[test]
    fn test_function_scope_variables() {
        let file = code_file(
            "sub main(input as function)\n    total = 0\n    for i = 0 to 10\n        total = total + i\n    end for\nend sub",
        );
        // file scope + main
        assert_eq!(file.function_scopes.len(), 2);
        let main = file
            .function_scopes
            .iter()
            .find(|s| s.name.as_deref() == Some("main"))
            .unwrap();
        assert!(main.variable("input").unwrap().is_function_value);
        assert!(main.variable("TOTAL").is_some());
        assert!(main.variable("i").is_some());
    }

    #[test]
    fn test_anonymous_function_gets_own_scope() {
        let file = code_file(
            "sub main()\n    cb = function(x)\n        inner = 1\n        return x\n    end function\nend sub",
        );
        assert_eq!(file.function_scopes.len(), 3);
        let main = file
            .function_scopes
            .iter()
            .find(|s| s.name.as_deref() == Some("main"))
            .unwrap();
        assert!(main.variable("cb").unwrap().is_function_value);
        // `inner` belongs to the anonymous scope, not main
        assert!(main.variable("inner").is_none());
        let anon = file
            .function_scopes
            .iter()
            .find(|s| s.name.is_none() && s.variables.iter().any(|v| v.name == "inner"))
            .unwrap();
        assert!(anon.variable("x").is_some());
    }

    #[test]
    fn test_function_scope_at_picks_innermost() {
        let file = code_file("sub outer()\n    x = 1\nend sub");
        let inside = file.function_scope_at(Position::new(1, 4)).unwrap();
        assert_eq!(inside.name.as_deref(), Some("outer"));
        // Outside any function: the file scope
        let outside = file.function_scope_at(Position::new(5, 0)).unwrap();
        assert!(outside.name.is_none());
    }

    #[test]
    fn test_property_name_completions() {
        let file = code_file("sub main(m)\n    m.top.visible = true\n    cfg = { Width: 1, width: 2 }\nend sub");
        assert_eq!(
            file.property_name_completions,
            vec!["top".to_string(), "visible".to_string(), "Width".to_string()]
        );
    }

    #[test]
    fn test_imports_are_normalized() {
        let file = code_file("import \"pkg:/source/util.bs\"\nsub main()\nend sub");
        assert_eq!(file.imports.len(), 1);
        assert_eq!(file.imports[0].as_str(), "source/util.bs");
    }

    #[test]
    fn test_suppression_directives() {
        let file = code_file(
            "sub main()\n    'bs:disable-next-line\n    doThing()\n    other() 'bs:disable-line 1003\nend sub",
        );
        assert_eq!(file.suppressions.len(), 2);
        assert_eq!(file.suppressions[0].line, 2);
        assert_eq!(file.suppressions[0].codes, None);
        assert_eq!(file.suppressions[1].line, 3);
        assert_eq!(file.suppressions[1].codes, Some(vec![1003]));
    }

    #[test]
    fn test_is_suppressed_respects_codes() {
        let file = code_file("sub main()\n    doThing() 'bs:disable-line 1003\nend sub");
        let silenced = catalog::call_to_unknown_function("doThing", "source")
            .at(Range::of(1, 4, 1, 11))
            .in_file("/proj/source/main.bs");
        assert!(file.is_suppressed(&silenced));

        let other = catalog::mismatch_argument_count(1, 1, 0)
            .at(Range::of(1, 4, 1, 11))
            .in_file("/proj/source/main.bs");
        assert!(!file.is_suppressed(&other));
    }

    #[test]
    fn test_lex_errors_become_diagnostics() {
        let file = code_file("sub main()\n    s = \"oops\nend sub");
        assert!(file
            .diagnostics
            .iter()
            .any(|d| d.code == catalog::codes::UNTERMINATED_STRING));
    }

    #[test]
    fn test_classes_are_indexed_with_namespace() {
        let file = code_file(
            "namespace Zoo\n    class Animal\n        name as string\n    end class\nend namespace",
        );
        assert_eq!(file.classes.len(), 1);
        assert_eq!(file.classes[0].key(), "zoo.animal");
        assert_eq!(file.namespaces.len(), 1);
        assert_eq!(file.namespaces[0].name, "Zoo");
    }
}
