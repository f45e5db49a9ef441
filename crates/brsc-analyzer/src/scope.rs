//! Analysis scopes and the validation pipeline.
//!
//! A scope is a named analysis context over a subset of the project's
//! files. Scope kinds are a closed sum: the platform root (seeded from the
//! built-in catalog), the source scope (files under `source/`), and one
//! component scope per descriptor file. Parent links form a tree rooted at
//! the platform scope.
//!
//! Validation is a pipeline of pure passes computing diagnostics from an
//! immutable program view; the program commits the outcome to the scope
//! afterwards. Ancestors always validate before descendants, so ancestor
//! lookup caches are in place when a scope reads them.

use crate::class_validator::{self, ClassLookup};
use crate::depgraph::SubscriptionHandle;
use crate::files::code::{CallableInfo, CodeFile};
use crate::files::File;
use crate::namespaces::NamespaceLookup;
use crate::platform::{self, PLATFORM_SCOPE_NAME};
use crate::program::Program;
use brsc_ast::{catalog, Diagnostic, Location};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// What kind of scope this is. Behavior differences dispatch on this sum
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    /// Root scope seeded with built-in callables; has no files.
    Platform,
    /// Files under `source/`.
    Source,
    /// Files referenced by one component descriptor.
    Component {
        /// Absolute path of the owning descriptor file.
        descriptor: PathBuf,
    },
}

/// A named analysis context.
#[derive(Debug)]
pub struct Scope {
    pub name: String,
    pub kind: ScopeKind,
    /// Explicit parent scope name; `None` falls back to the platform scope
    /// (unless this *is* the platform scope).
    pub(crate) parent_name: Option<String>,
    pub(crate) is_validated: bool,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) namespace_lookup: Option<NamespaceLookup>,
    pub(crate) class_lookup: Option<ClassLookup>,
    /// Dependency-graph subscriptions owned by this scope; released in
    /// reverse order on disposal.
    pub(crate) subscriptions: Vec<SubscriptionHandle>,
}

impl Scope {
    pub fn new(name: impl Into<String>, kind: ScopeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent_name: None,
            is_validated: false,
            diagnostics: Vec::new(),
            namespace_lookup: None,
            class_lookup: None,
            subscriptions: Vec::new(),
        }
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    pub fn is_validated(&self) -> bool {
        self.is_validated
    }

    /// Scope-level diagnostics as of the last validation.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn namespace_lookup(&self) -> Option<&NamespaceLookup> {
        self.namespace_lookup.as_ref()
    }

    pub fn class_lookup(&self) -> Option<&ClassLookup> {
        self.class_lookup.as_ref()
    }

    /// Reset the validated flag and purge derived lookups. Returns true
    /// when the scope was validated before the call.
    pub(crate) fn invalidate(&mut self) -> bool {
        let was_validated = self.is_validated;
        self.is_validated = false;
        self.namespace_lookup = None;
        self.class_lookup = None;
        was_validated
    }
}

/// Everything a validation run produces; the program commits it to the
/// scope.
#[derive(Debug, Default)]
pub(crate) struct ValidationOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub namespace_lookup: NamespaceLookup,
    pub class_lookup: ClassLookup,
}

/// A callable paired with the scope that contributed it.
struct Container<'a> {
    callable: &'a CallableInfo,
    scope_name: &'a str,
    /// 0 = the validating scope's own files; ancestors count up from 1.
    depth: usize,
    is_platform: bool,
}

/// Run the full validation pipeline for one scope. Ancestors must already
/// be validated (their lookup caches are read here).
pub(crate) fn run_validation(program: &Program, scope_name: &str) -> ValidationOutcome {
    let Some(scope) = program.get_scope(scope_name) else {
        return ValidationOutcome::default();
    };
    if scope.kind == ScopeKind::Platform {
        return ValidationOutcome::default();
    }

    let member_files = program.member_files(scope_name);
    let code_files: Vec<&CodeFile> = member_files.iter().filter_map(|f| f.as_code()).collect();

    let namespace_lookup = NamespaceLookup::build(code_files.iter().copied());
    let (class_lookup, mut diagnostics) = ClassLookup::build(code_files.iter().copied());

    // Ancestor context, nearest first
    let ancestors = program.ancestor_scopes(scope_name);
    let ancestor_ns: Vec<&NamespaceLookup> = ancestors
        .iter()
        .filter_map(|s| s.namespace_lookup.as_ref())
        .collect();
    let ancestor_classes: Vec<&ClassLookup> = ancestors
        .iter()
        .filter_map(|s| s.class_lookup.as_ref())
        .collect();

    // Collect all callables: own files first, then each ancestor's files,
    // the platform catalog last. Within one depth the order is
    // (file path, name), which pins diagnostic order.
    let platform_callables = platform::platform_callables();
    let mut all: Vec<Container<'_>> = Vec::new();
    for file in &member_files {
        for callable in file.callables() {
            all.push(Container {
                callable,
                scope_name,
                depth: 0,
                is_platform: false,
            });
        }
    }
    let mut ancestor_files: Vec<(usize, &str, Vec<&File>)> = Vec::new();
    for (idx, ancestor) in ancestors.iter().enumerate() {
        ancestor_files.push((
            idx + 1,
            ancestor.name.as_str(),
            program.member_files(&ancestor.name),
        ));
    }
    for (depth, name, files) in &ancestor_files {
        for file in files {
            for callable in file.callables() {
                all.push(Container {
                    callable,
                    scope_name: name,
                    depth: *depth,
                    is_platform: false,
                });
            }
        }
    }
    let platform_depth = ancestors.len().max(1);
    for callable in &platform_callables {
        all.push(Container {
            callable,
            scope_name: PLATFORM_SCOPE_NAME,
            depth: platform_depth,
            is_platform: true,
        });
    }
    all.sort_by(|a, b| {
        (a.depth, &a.callable.file, a.callable.key(), a.callable.name_range.start).cmp(&(
            b.depth,
            &b.callable.file,
            b.callable.key(),
            b.callable.name_range.start,
        ))
    });

    let mut buckets: BTreeMap<String, Vec<&Container<'_>>> = BTreeMap::new();
    for container in &all {
        buckets
            .entry(container.callable.key())
            .or_default()
            .push(container);
    }

    check_duplicates_and_overrides(&buckets, &mut diagnostics);
    diagnostics.extend(class_validator::validate_classes(
        &class_lookup,
        &ancestor_classes,
    ));

    for file in &code_files {
        check_call_sites(
            file,
            scope_name,
            &buckets,
            &namespace_lookup,
            &ancestor_ns,
            &mut diagnostics,
        );
        check_shadowed_locals(file, &buckets, &mut diagnostics);
        check_built_in_collisions(file, &mut diagnostics);
    }

    // Kind-specific extras
    match &scope.kind {
        ScopeKind::Platform | ScopeKind::Source => {}
        ScopeKind::Component { descriptor } => {
            validate_component_extras(program, descriptor, &mut diagnostics);
        }
    }

    ValidationOutcome {
        diagnostics,
        namespace_lookup,
        class_lookup,
    }
}

/// Duplicate and override rules, per bucket.
fn check_duplicates_and_overrides(
    buckets: &BTreeMap<String, Vec<&Container<'_>>>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (key, bucket) in buckets {
        let own: Vec<&&Container<'_>> = bucket.iter().filter(|c| c.depth == 0).collect();
        if own.is_empty() {
            continue;
        }
        // An ancestor entry that is the very same declaration (a file
        // reachable both directly and through an ancestor import) is not
        // an override; the duplicate-ancestor-import check covers it.
        let ancestor_non_platform: Vec<&&Container<'_>> = bucket
            .iter()
            .filter(|c| {
                c.depth > 0
                    && !c.is_platform
                    && !own.iter().any(|o| {
                        o.callable.file == c.callable.file
                            && o.callable.name_range == c.callable.name_range
                    })
            })
            .collect();

        if !ancestor_non_platform.is_empty() && key != "init" {
            // Nearest ancestor occurrence: smallest depth, last entry wins
            let nearest_depth = ancestor_non_platform
                .iter()
                .map(|c| c.depth)
                .min()
                .unwrap_or(1);
            if let Some(nearest) = ancestor_non_platform
                .iter()
                .filter(|c| c.depth == nearest_depth)
                .last()
            {
                for entry in &own {
                    diagnostics.push(
                        catalog::overrides_ancestor_function(
                            &entry.callable.full_name,
                            nearest.scope_name,
                        )
                        .at(entry.callable.name_range)
                        .in_file(&entry.callable.file)
                        .with_related(
                            Location::new(&nearest.callable.file, nearest.callable.name_range),
                            "overridden function declared here",
                        ),
                    );
                }
            }
        }

        if own.len() > 1 {
            // Every duplicate is flagged, including the first
            for entry in &own {
                diagnostics.push(
                    catalog::duplicate_function_implementation(&entry.callable.full_name)
                        .at(entry.callable.name_range)
                        .in_file(&entry.callable.file),
                );
            }
        }
    }
}

/// Unknown-call and argument-count checks for one member file.
fn check_call_sites(
    file: &CodeFile,
    scope_name: &str,
    buckets: &BTreeMap<String, Vec<&Container<'_>>>,
    namespaces: &NamespaceLookup,
    ancestor_ns: &[&NamespaceLookup],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let known_namespace = |name: &str| {
        namespaces.is_known(name) || ancestor_ns.iter().any(|ns| ns.is_known(name))
    };

    for site in &file.call_sites {
        let key = site.name.to_lowercase();
        let function_scope = file.function_scope_at(site.name_range.start);

        let resolved = if let Some((base, _rest)) = site.name.split_once('.') {
            // Dotted call: a method on a local value resolves dynamically,
            // a namespaced function resolves through the buckets.
            if function_scope.is_some_and(|s| s.variable(base).is_some()) {
                continue;
            }
            match buckets.get(&key) {
                Some(bucket) => bucket.first().copied(),
                None => {
                    let namespace_part = &site.name[..site.name.rfind('.').unwrap_or(0)];
                    if known_namespace(namespace_part) {
                        diagnostics.push(
                            catalog::call_to_unknown_function(&site.name, scope_name)
                                .at(site.name_range)
                                .in_file(&file.path_absolute),
                        );
                    }
                    continue;
                }
            }
        } else {
            // The call resolves to a local value, not a scope callable
            if function_scope.is_some_and(|s| s.variable(&site.name).is_some()) {
                continue;
            }
            match buckets.get(&key) {
                Some(bucket) => bucket.first().copied(),
                None => {
                    diagnostics.push(
                        catalog::call_to_unknown_function(&site.name, scope_name)
                            .at(site.name_range)
                            .in_file(&file.path_absolute),
                    );
                    continue;
                }
            }
        };

        if let Some(container) = resolved {
            let min = container.callable.min_args;
            let max = container.callable.max_args;
            if site.arg_count < min || site.arg_count > max {
                diagnostics.push(
                    catalog::mismatch_argument_count(min, max, site.arg_count)
                        .at(site.range)
                        .in_file(&file.path_absolute),
                );
            }
        }
    }
}

/// Shadowing checks over a file's function-scope variable tables.
fn check_shadowed_locals(
    file: &CodeFile,
    buckets: &BTreeMap<String, Vec<&Container<'_>>>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for function_scope in &file.function_scopes {
        for variable in &function_scope.variables {
            let key = variable.name.to_lowercase();
            let shadows_platform = platform::is_platform_callable(&variable.name);
            let shadows_scope = buckets
                .get(&key)
                .is_some_and(|bucket| bucket.iter().any(|c| !c.is_platform));

            if variable.is_function_value {
                if shadows_platform {
                    diagnostics.push(
                        catalog::local_function_shadows_stdlib(&variable.name)
                            .at(variable.name_range)
                            .in_file(&file.path_absolute),
                    );
                } else if shadows_scope {
                    diagnostics.push(
                        catalog::local_function_shadows_scope(&variable.name)
                            .at(variable.name_range)
                            .in_file(&file.path_absolute),
                    );
                }
            } else if shadows_scope && !shadows_platform {
                diagnostics.push(
                    catalog::local_var_shadowed_by_scope_function(&variable.name)
                        .at(variable.name_range)
                        .in_file(&file.path_absolute),
                );
            }
        }
    }
}

/// Declared callables colliding with built-ins.
fn check_built_in_collisions(file: &CodeFile, diagnostics: &mut Vec<Diagnostic>) {
    for callable in &file.callables {
        if callable.namespace.is_none() && platform::is_platform_callable(&callable.name) {
            diagnostics.push(
                catalog::scope_function_shadowed_by_built_in(&callable.name)
                    .at(callable.name_range)
                    .in_file(&file.path_absolute),
            );
        }
    }
}

/// Component-scope extras: script-import hygiene against the descriptor
/// and its resolved ancestors. This is the `on_validate` hook of the
/// component specialization; it always runs when the base pipeline ran.
fn validate_component_extras(
    program: &Program,
    descriptor_path: &PathBuf,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(descriptor) = program
        .get_file(descriptor_path)
        .and_then(|f| f.as_descriptor())
    else {
        return;
    };

    let ancestor_imports = program.ancestor_script_imports(descriptor);

    for import in &descriptor.script_imports {
        // Duplicate of an ancestor import (nearest ancestor named first)
        if !import.pkg_path.is_empty() {
            if let Some((ancestor_ref, ancestor_component, ancestor_path)) = ancestor_imports
                .iter()
                .find(|(r, _, _)| r.pkg_path.same_file(&import.pkg_path))
            {
                diagnostics.push(
                    catalog::duplicate_ancestor_script_import(
                        import.pkg_path.as_str(),
                        ancestor_component,
                    )
                    .at(import.range)
                    .in_file(&descriptor.path_absolute)
                    .with_related(
                        Location::new(ancestor_path, ancestor_ref.range),
                        format!("already imported by '{}'", ancestor_component),
                    ),
                );
            }
        }

        // Script path validation
        match program.file_by_pkg_path(&import.pkg_path) {
            None => {
                if import.pkg_path.is_empty() {
                    diagnostics.push(
                        catalog::script_src_cannot_be_empty()
                            .at(import.range)
                            .in_file(&descriptor.path_absolute),
                    );
                } else {
                    diagnostics.push(
                        catalog::referenced_file_does_not_exist(import.pkg_path.as_str())
                            .at(import.range)
                            .in_file(&descriptor.path_absolute),
                    );
                }
            }
            Some(found) => {
                if found.pkg_path().as_str() != import.pkg_path.as_str() {
                    diagnostics.push(
                        catalog::script_import_case_mismatch(
                            import.pkg_path.as_str(),
                            found.pkg_path().as_str(),
                        )
                        .at(import.range)
                        .in_file(&descriptor.path_absolute),
                    );
                }
            }
        }
    }
}
