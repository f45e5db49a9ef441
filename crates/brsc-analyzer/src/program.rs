//! Program: the top-level coordinator.
//!
//! Owns the file registry, the scope registry, the dependency graph, and
//! the event bus. Mutations follow a fixed order: register the file, emit
//! `file-added`, update component links and the dependency graph, then
//! propagate invalidation. Validation is lazy: reading diagnostics
//! validates every stale scope, ancestors before descendants.

use crate::config::ProjectConfig;
use crate::depgraph::DependencyGraph;
use crate::emitter::{Emitter, ListenerHandle};
use crate::error::EngineError;
use crate::files::code::{CallableInfo, CodeFile};
use crate::files::descriptor::{DescriptorFile, FileReference};
use crate::files::File;
use crate::namespaces::NamespaceLookup;
use crate::platform::{PLATFORM_SCOPE_NAME, SOURCE_SCOPE_NAME};
use crate::scope::{self, Scope, ScopeKind};
use brsc_ast::{Diagnostic, PkgPath};
use brsc_parser::ParseMode;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Events emitted by the program's bus, synchronously during the mutating
/// call.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramEvent {
    FileAdded(PathBuf),
    FileRemoved(PathBuf),
    ScopeAdded(String),
    ScopeRemoved(String),
    ScopeInvalidated(String),
}

/// One analysis session.
pub struct Program {
    config: ProjectConfig,
    files: IndexMap<PathBuf, File>,
    scopes: IndexMap<String, Scope>,
    graph: DependencyGraph,
    emitter: Emitter<ProgramEvent>,
}

impl Program {
    pub fn new(config: ProjectConfig) -> Self {
        let mut scopes = IndexMap::new();
        scopes.insert(
            PLATFORM_SCOPE_NAME.to_string(),
            Scope::new(PLATFORM_SCOPE_NAME, ScopeKind::Platform),
        );
        scopes.insert(
            SOURCE_SCOPE_NAME.to_string(),
            Scope::new(SOURCE_SCOPE_NAME, ScopeKind::Source),
        );
        Self {
            config,
            files: IndexMap::new(),
            scopes,
            graph: DependencyGraph::new(),
            emitter: Emitter::new(),
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Subscribe to program events. The caller owns the handle and must
    /// release it with [`Program::unsubscribe_events`].
    pub fn subscribe_events(
        &mut self,
        listener: impl FnMut(&ProgramEvent) + 'static,
    ) -> ListenerHandle {
        self.emitter.on(listener)
    }

    pub fn unsubscribe_events(&mut self, handle: ListenerHandle) {
        self.emitter.off(handle);
    }

    // === File registry ===

    /// Add a file or replace an existing one. Parses code files, builds
    /// descriptors, registers scopes, updates the dependency graph, and
    /// propagates invalidation.
    pub fn set_file(
        &mut self,
        path: impl Into<PathBuf>,
        text: &str,
    ) -> Result<(), EngineError> {
        let path = path.into();
        let pkg = self.pkg_path_for(&path);
        let key = pkg.key();
        debug!(path = %path.display(), pkg = %pkg, "set file");

        let is_descriptor = pkg.extension().is_some_and(|e| e.eq_ignore_ascii_case("xml"));
        let file = if is_descriptor {
            File::Descriptor(DescriptorFile::parse(&path, pkg.clone(), text)?)
        } else {
            let mode = if pkg.extension().is_some_and(|e| e.eq_ignore_ascii_case("bs")) {
                ParseMode::Superset
            } else {
                self.config.parse_mode
            };
            File::Code(CodeFile::parse(&path, pkg.clone(), text, mode))
        };

        // Register (re-adding replaces), then wire the dependency graph
        self.files.insert(path.clone(), file);
        match &self.files[&path] {
            File::Code(code) => {
                let deps: Vec<String> = code.imports.iter().map(|p| p.key()).collect();
                self.graph.set_edges(&key, deps);
            }
            File::Descriptor(_) => {
                // Edges (imports + parent) are set by link_components below
                self.graph.add_node(&key);
            }
        }

        if is_descriptor && !self.scopes.contains_key(&key) {
            let mut scope = Scope::new(key.clone(), ScopeKind::Component {
                descriptor: path.clone(),
            });
            let subscription = self.graph.subscribe(key.clone(), key.clone());
            scope.subscriptions.push(subscription);
            self.scopes.insert(key.clone(), scope);
            self.emitter.emit(&ProgramEvent::ScopeAdded(key.clone()));
        }

        self.emitter.emit(&ProgramEvent::FileAdded(path.clone()));
        self.link_components();
        self.propagate_change(&key, &path);
        Ok(())
    }

    /// Remove a file: inverse of [`Program::set_file`], plus removal of its
    /// dependency-graph node.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let Some(file) = self.files.shift_remove(&path) else {
            return;
        };
        let key = file.pkg_path().key();
        debug!(path = %path.display(), "remove file");

        // Invalidate scopes affected through the dependency graph and
        // through membership, while the graph still has the node
        for tag in self.graph.changed(&key) {
            self.invalidate_scope_cascade(&tag);
        }
        let affected: Vec<String> = self
            .scopes
            .values()
            .filter(|s| self.scope_includes(s, &file))
            .map(|s| s.name.clone())
            .collect();
        for name in affected {
            self.invalidate_scope_cascade(&name);
        }

        if matches!(file, File::Descriptor(_)) {
            if let Some(mut scope) = self.scopes.shift_remove(&key) {
                // Exception-safe teardown: release subscriptions in
                // reverse acquisition order, then the scope itself
                for handle in scope.subscriptions.drain(..).rev() {
                    self.graph.unsubscribe(handle);
                }
                self.emitter.emit(&ProgramEvent::ScopeRemoved(key.clone()));
            }
        }

        self.graph.remove_node(&key);
        self.emitter.emit(&ProgramEvent::FileRemoved(path));
        self.link_components();
    }

    pub fn get_file(&self, path: impl AsRef<Path>) -> Option<&File> {
        self.files.get(path.as_ref())
    }

    /// Case-insensitive package-path lookup.
    pub fn file_by_pkg_path(&self, pkg: &PkgPath) -> Option<&File> {
        if pkg.is_empty() {
            return None;
        }
        let key = pkg.key();
        self.files.values().find(|f| f.pkg_path().key() == key)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.files.values()
    }

    // === Scope registry ===

    pub fn get_scope(&self, name: &str) -> Option<&Scope> {
        self.scopes.get(name)
    }

    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }

    /// Every scope whose membership predicate accepts this file.
    pub fn scopes_for_file(&self, path: impl AsRef<Path>) -> Vec<&Scope> {
        let Some(file) = self.files.get(path.as_ref()) else {
            return Vec::new();
        };
        self.scopes
            .values()
            .filter(|s| self.scope_includes(s, file))
            .collect()
    }

    /// Membership predicate. Source scope: package path under `source/`.
    /// Component scope: the descriptor (or a resolved ancestor) references
    /// the file, or the file is the descriptor itself.
    pub(crate) fn scope_includes(&self, scope: &Scope, file: &File) -> bool {
        match &scope.kind {
            ScopeKind::Platform => false,
            ScopeKind::Source => file.pkg_path().in_dir("source"),
            ScopeKind::Component { descriptor } => self
                .files
                .get(descriptor)
                .and_then(|f| f.as_descriptor())
                .is_some_and(|d| self.descriptor_references(d, file)),
        }
    }

    /// `doesReferenceFile`: the file is the descriptor itself, or its
    /// package path matches a script import of the descriptor or of any
    /// resolved ancestor.
    pub(crate) fn descriptor_references(&self, descriptor: &DescriptorFile, file: &File) -> bool {
        if descriptor.path_absolute == file.path_absolute() {
            return true;
        }
        let target = file.pkg_path().key();
        if descriptor
            .script_imports
            .iter()
            .any(|r| r.pkg_path.key() == target)
        {
            return true;
        }
        self.ancestor_descriptors(descriptor)
            .iter()
            .any(|a| a.script_imports.iter().any(|r| r.pkg_path.key() == target))
    }

    /// Files a scope validates: for component scopes the descriptor's own
    /// script imports plus the descriptor itself (ancestor-imported files
    /// contribute through the parent scope link instead), for the source
    /// scope everything under `source/`. Sorted by absolute path.
    pub(crate) fn member_files(&self, scope_name: &str) -> Vec<&File> {
        let Some(scope) = self.scopes.get(scope_name) else {
            return Vec::new();
        };
        let mut members: Vec<&File> = match &scope.kind {
            ScopeKind::Platform => Vec::new(),
            ScopeKind::Source => self
                .files
                .values()
                .filter(|f| f.pkg_path().in_dir("source"))
                .collect(),
            ScopeKind::Component { descriptor } => {
                let Some(desc) = self.files.get(descriptor).and_then(|f| f.as_descriptor())
                else {
                    return Vec::new();
                };
                let import_keys: HashSet<String> =
                    desc.script_imports.iter().map(|r| r.pkg_path.key()).collect();
                self.files
                    .values()
                    .filter(|f| {
                        f.path_absolute() == desc.path_absolute
                            || import_keys.contains(&f.pkg_path().key())
                    })
                    .collect()
            }
        };
        members.sort_by_key(|f| f.path_absolute().to_path_buf());
        members
    }

    /// Ancestor scopes, nearest first, ending at the platform scope.
    pub(crate) fn ancestor_scopes(&self, scope_name: &str) -> Vec<&Scope> {
        let mut ancestors = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(scope_name.to_string());
        let mut cursor = self
            .scopes
            .get(scope_name)
            .and_then(|s| self.effective_parent(s));
        while let Some(name) = cursor {
            if !seen.insert(name.to_string()) {
                break;
            }
            let Some(scope) = self.scopes.get(name) else {
                break;
            };
            ancestors.push(scope);
            cursor = self.effective_parent(scope);
        }
        ancestors
    }

    /// The parent a scope actually uses: the explicit link, or the
    /// platform fallback for every scope but the platform itself.
    fn effective_parent<'a>(&self, scope: &'a Scope) -> Option<&'a str> {
        if scope.name == PLATFORM_SCOPE_NAME {
            None
        } else {
            Some(scope.parent_name().unwrap_or(PLATFORM_SCOPE_NAME))
        }
    }

    // === Descriptor ancestry ===

    /// Resolved ancestor descriptors, nearest parent first, cycle-bounded.
    pub(crate) fn ancestor_descriptors(&self, descriptor: &DescriptorFile) -> Vec<&DescriptorFile> {
        let mut chain = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        seen.insert(descriptor.path_absolute.clone());
        let mut cursor = descriptor.parent().map(Path::to_path_buf);
        while let Some(path) = cursor {
            if !seen.insert(path.clone()) {
                break;
            }
            let Some(parent) = self.files.get(&path).and_then(|f| f.as_descriptor()) else {
                break;
            };
            chain.push(parent);
            cursor = parent.parent().map(Path::to_path_buf);
        }
        chain
    }

    /// Script imports of all resolved ancestors, parents first. Each entry
    /// carries the declaring component's name and descriptor path.
    pub(crate) fn ancestor_script_imports(
        &self,
        descriptor: &DescriptorFile,
    ) -> Vec<(FileReference, String, PathBuf)> {
        let mut imports = Vec::new();
        for ancestor in self.ancestor_descriptors(descriptor) {
            for reference in &ancestor.script_imports {
                imports.push((
                    reference.clone(),
                    ancestor.component_name.clone(),
                    ancestor.path_absolute.clone(),
                ));
            }
        }
        imports
    }

    /// Re-resolve every descriptor's parent pointer by component-name
    /// matching, updating scope parent links and dependency edges. Scopes
    /// whose parent changed are invalidated.
    fn link_components(&mut self) {
        // Component name → descriptor path (first registration wins)
        let mut by_component: IndexMap<String, PathBuf> = IndexMap::new();
        for file in self.files.values() {
            if let File::Descriptor(d) = file {
                by_component
                    .entry(d.component_name.to_lowercase())
                    .or_insert_with(|| d.path_absolute.clone());
            }
        }

        struct Link {
            path: PathBuf,
            scope_name: String,
            resolved: Option<PathBuf>,
            changed: bool,
            deps: Vec<String>,
        }

        let mut links = Vec::new();
        for file in self.files.values() {
            let File::Descriptor(d) = file else { continue };
            let resolved = d
                .parent_name
                .as_ref()
                .and_then(|want| by_component.get(&want.to_lowercase()))
                .filter(|p| **p != d.path_absolute)
                .cloned();
            let changed = d.parent() != resolved.as_deref();
            let mut deps: Vec<String> =
                d.script_imports.iter().map(|r| r.pkg_path.key()).collect();
            if let Some(parent) = &resolved {
                if let Some(parent_file) = self.files.get(parent) {
                    deps.push(parent_file.pkg_path().key());
                }
            }
            links.push(Link {
                path: d.path_absolute.clone(),
                scope_name: d.pkg_path.key(),
                resolved,
                changed,
                deps,
            });
        }

        let mut invalidated = Vec::new();
        for link in links {
            self.graph.set_edges(&link.scope_name, link.deps);
            if !link.changed {
                continue;
            }
            trace!(descriptor = %link.path.display(), "component parent link changed");
            let parent_scope_name = link
                .resolved
                .as_ref()
                .and_then(|p| self.files.get(p))
                .map(|f| f.pkg_path().key());
            if let Some(d) = self
                .files
                .get_mut(&link.path)
                .and_then(|f| f.as_descriptor_mut())
            {
                match &link.resolved {
                    Some(parent) => {
                        d.attach_parent(parent.clone());
                    }
                    None => {
                        d.detach_parent();
                    }
                }
            }
            if let Some(scope) = self.scopes.get_mut(&link.scope_name) {
                scope.parent_name = parent_scope_name;
            }
            invalidated.push(link.scope_name);
        }
        for name in invalidated {
            self.invalidate_scope_cascade(&name);
        }
    }

    // === Invalidation ===

    /// Invalidation driven by a file change: dependency-graph subscribers
    /// plus every scope whose membership predicate accepts the file, each
    /// with their descendants.
    fn propagate_change(&mut self, key: &str, path: &Path) {
        for tag in self.graph.changed(key) {
            self.invalidate_scope_cascade(&tag);
        }
        let affected: Vec<String> = match self.files.get(path) {
            Some(file) => self
                .scopes
                .values()
                .filter(|s| self.scope_includes(s, file))
                .map(|s| s.name.clone())
                .collect(),
            None => Vec::new(),
        };
        for name in affected {
            self.invalidate_scope_cascade(&name);
        }
    }

    /// Invalidate a scope and, transitively, every scope parented under it.
    pub(crate) fn invalidate_scope_cascade(&mut self, name: &str) {
        let mut queue = vec![name.to_string()];
        let mut seen: HashSet<String> = HashSet::new();
        while let Some(current) = queue.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(scope) = self.scopes.get_mut(&current) {
                if scope.invalidate() {
                    self.emitter
                        .emit(&ProgramEvent::ScopeInvalidated(current.clone()));
                }
            }
            let children: Vec<String> = self
                .scopes
                .values()
                .filter(|s| {
                    s.name != current && self.effective_parent(s) == Some(current.as_str())
                })
                .map(|s| s.name.clone())
                .collect();
            queue.extend(children);
        }
    }

    // === Validation ===

    /// Validate every scope (ancestors before descendants).
    pub fn validate(&mut self) {
        let names: Vec<String> = self.scopes.keys().cloned().collect();
        for name in names {
            self.validate_scope(&name);
        }
    }

    /// Validate one scope, recursing into the parent chain first.
    pub fn validate_scope(&mut self, name: &str) {
        let mut chain: Vec<String> = Vec::new();
        let mut cursor = Some(name.to_string());
        while let Some(current) = cursor.take() {
            if chain.contains(&current) {
                break;
            }
            let Some(scope) = self.scopes.get(&current) else {
                break;
            };
            cursor = self.effective_parent(scope).map(str::to_string);
            chain.push(current);
        }

        for current in chain.iter().rev() {
            let stale = self
                .scopes
                .get(current)
                .is_some_and(|s| !s.is_validated());
            if !stale {
                continue;
            }
            debug!(scope = %current, "validating scope");
            let outcome = scope::run_validation(self, current);
            if let Some(scope) = self.scopes.get_mut(current) {
                scope.diagnostics = outcome.diagnostics;
                scope.namespace_lookup = Some(outcome.namespace_lookup);
                scope.class_lookup = Some(outcome.class_lookup);
                scope.is_validated = true;
            }
        }
    }

    // === Diagnostics ===

    /// Validate everything and return the merged, filtered, deterministic
    /// diagnostic list: file diagnostics plus scope diagnostics, minus
    /// ignored codes and comment suppressions, with severity overrides
    /// applied, deduplicated and sorted.
    pub fn get_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.validate();

        let mut raw: Vec<Diagnostic> = Vec::new();
        for file in self.files.values() {
            raw.extend(file.diagnostics().iter().cloned());
        }
        for scope in self.scopes.values() {
            raw.extend(scope.diagnostics.iter().cloned());
        }

        let mut seen: HashSet<(PathBuf, u32, brsc_ast::Range, String)> = HashSet::new();
        let mut out: Vec<Diagnostic> = Vec::new();
        for mut diagnostic in raw {
            if self.config.ignores_code(diagnostic.code) {
                continue;
            }
            if let Some(severity) = self.config.severity_override(diagnostic.code) {
                diagnostic.severity = severity;
            }
            if self
                .files
                .get(&diagnostic.file)
                .and_then(|f| f.as_code())
                .is_some_and(|code| code.is_suppressed(&diagnostic))
            {
                continue;
            }
            let dedupe_key = (
                diagnostic.file.clone(),
                diagnostic.code,
                diagnostic.range,
                diagnostic.message.clone(),
            );
            if seen.insert(dedupe_key) {
                out.push(diagnostic);
            }
        }

        out.sort_by(|a, b| {
            (&a.file, a.range, a.code, &a.message).cmp(&(&b.file, b.range, b.code, &b.message))
        });
        out
    }

    // === Callable queries ===

    /// All callables visible from a scope: own files first, then each
    /// ancestor's, the platform catalog last.
    pub fn all_callables(&self, scope_name: &str) -> Vec<CallableInfo> {
        let mut callables = Vec::new();
        for file in self.member_files(scope_name) {
            callables.extend(file.callables().iter().cloned());
        }
        for ancestor in self.ancestor_scopes(scope_name) {
            if ancestor.kind == ScopeKind::Platform {
                callables.extend(crate::platform::platform_callables());
            } else {
                for file in self.member_files(&ancestor.name) {
                    callables.extend(file.callables().iter().cloned());
                }
            }
        }
        callables
    }

    /// First case-insensitive match in visibility order: nearest wins.
    pub fn get_callable_by_name(&self, scope_name: &str, name: &str) -> Option<CallableInfo> {
        let key = name.to_lowercase();
        self.all_callables(scope_name)
            .into_iter()
            .find(|c| c.key() == key)
    }

    /// True when `name` (lower-cased, dotted) names a namespace declared by
    /// a member file of the scope or of any ancestor — exactly, or as the
    /// prefix of a longer declaration.
    pub fn is_known_namespace(&self, scope_name: &str, name: &str) -> bool {
        let mut chain: Vec<&str> = vec![scope_name];
        chain.extend(self.ancestor_scopes(scope_name).iter().map(|s| s.name.as_str()));
        chain.into_iter().any(|scope| {
            let lookup = NamespaceLookup::build(
                self.member_files(scope).iter().filter_map(|f| f.as_code()),
            );
            lookup.is_known(name)
        })
    }

    /// Package path for an absolute path: relative to the configured root
    /// when possible, the path itself otherwise.
    pub(crate) fn pkg_path_for(&self, path: &Path) -> PkgPath {
        if let Some(root) = &self.config.root_dir {
            if let Ok(relative) = path.strip_prefix(root) {
                return PkgPath::new(relative.to_string_lossy());
            }
        }
        PkgPath::new(path.to_string_lossy())
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new(ProjectConfig::default())
    }
}
