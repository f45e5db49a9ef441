//! Editor services: go-to-definition and completion.
//!
//! These operate on the program's derived indexes and stay free of any
//! transport concern; a language-server front end maps them onto its
//! protocol.

use crate::program::Program;
use brsc_ast::ast::Expression;
use brsc_ast::walk::walk_statements;
use brsc_ast::{Location, Position, Range};
use brsc_parser::ParseMode;
use std::path::Path;

/// What a completion item denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Function,
    Variable,
    Namespace,
    Property,
    Class,
}

/// One completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
}

/// Resolve the definition of the symbol at `position`.
///
/// Descriptor files resolve the `extends` attribute to the parent
/// descriptor (zero range). Code files resolve call sites to the matching
/// callable declaration, searching the file's scopes nearest-first.
pub fn definition(program: &Program, path: impl AsRef<Path>, position: Position) -> Option<Location> {
    let file = program.get_file(path.as_ref())?;

    if let Some(descriptor) = file.as_descriptor() {
        if descriptor.parent_name_range.contains(position) {
            let parent = descriptor.parent()?;
            return Some(Location::new(parent, Range::zero()));
        }
        return None;
    }

    let code = file.as_code()?;
    let site = code
        .call_sites
        .iter()
        .find(|site| site.name_range.contains(position))?;

    for scope in program.scopes_for_file(path.as_ref()) {
        if let Some(callable) = program.get_callable_by_name(&scope.name, &site.name) {
            if callable.file.as_os_str().is_empty() {
                // Platform built-ins have no source location
                continue;
            }
            return Some(Location::new(callable.file, callable.name_range));
        }
    }
    None
}

/// Completion at a position in a file.
///
/// Inside a dotted-access name this returns the file's property-name
/// catalog; elsewhere it merges scope callables (namespaced callables are
/// reached via namespace completion in superset mode and filtered here),
/// the enclosing function's variables, and namespace roots.
pub fn completions(
    program: &Program,
    path: impl AsRef<Path>,
    position: Position,
) -> Vec<CompletionItem> {
    let Some(code) = program.get_file(path.as_ref()).and_then(|f| f.as_code()) else {
        return Vec::new();
    };

    if in_dotted_name(code, position) {
        return code
            .property_name_completions
            .iter()
            .map(|name| CompletionItem {
                label: name.clone(),
                kind: CompletionKind::Property,
            })
            .collect();
    }

    let mut items = Vec::new();
    let scopes = program.scopes_for_file(path.as_ref());

    if let Some(scope) = scopes.first() {
        for callable in program.all_callables(&scope.name) {
            if code.parse_mode == ParseMode::Superset && callable.namespace.is_some() {
                continue;
            }
            items.push(CompletionItem {
                label: callable.name.clone(),
                kind: CompletionKind::Function,
            });
        }

        // Namespace roots and class names from the scope's own files
        for file in program.member_files(&scope.name) {
            let Some(member) = file.as_code() else { continue };
            for ns in &member.namespaces {
                let root = ns.name.split('.').next().unwrap_or(&ns.name);
                let item = CompletionItem {
                    label: root.to_string(),
                    kind: CompletionKind::Namespace,
                };
                if !items.contains(&item) {
                    items.push(item);
                }
            }
            for class in &member.classes {
                items.push(CompletionItem {
                    label: class.statement.name.text.clone(),
                    kind: CompletionKind::Class,
                });
            }
        }
    }

    if let Some(function_scope) = code.function_scope_at(position) {
        for variable in &function_scope.variables {
            items.push(CompletionItem {
                label: variable.name.clone(),
                kind: CompletionKind::Variable,
            });
        }
    }

    items
}

/// True when `position` falls inside the member name of a dotted access.
fn in_dotted_name(code: &crate::files::code::CodeFile, position: Position) -> bool {
    let mut found = false;
    walk_statements(&code.statements, &mut |_| {}, &mut |expr| {
        if let Expression::DottedGet { name, .. } = expr {
            if name.range.contains(position) {
                found = true;
            }
        }
    });
    found
}
