//! Class hierarchy validation.
//!
//! Runs once per scope validation. Parent classes resolve first through the
//! scope's own class lookup (fully qualified, then relative to the child's
//! namespace), then through ancestor scopes. Cycles are detected with DFS
//! color marking; member checks walk the resolved ancestor chain.

use crate::files::code::{ClassInfo, CodeFile};
use brsc_ast::ast::{ClassMethod, ClassStatement};
use brsc_ast::{catalog, Diagnostic, Location, Range};
use indexmap::IndexMap;

/// Derived class view over a scope's member files, keyed by lower-cased
/// fully qualified name.
#[derive(Debug, Clone, Default)]
pub struct ClassLookup {
    map: IndexMap<String, ClassInfo>,
}

impl ClassLookup {
    /// Build the lookup, flagging duplicate declarations (first wins).
    pub fn build<'a>(
        files: impl IntoIterator<Item = &'a CodeFile>,
    ) -> (Self, Vec<Diagnostic>) {
        let mut map: IndexMap<String, ClassInfo> = IndexMap::new();
        let mut diagnostics = Vec::new();
        for file in files {
            for class in &file.classes {
                let key = class.key();
                if let Some(existing) = map.get(&key) {
                    diagnostics.push(
                        catalog::duplicate_class_declaration(&class.full_name())
                            .at(class.statement.name.range)
                            .in_file(&class.file)
                            .with_related(
                                Location::new(&existing.file, existing.statement.name.range),
                                "first declared here",
                            ),
                    );
                } else {
                    map.insert(key, class.clone());
                }
            }
        }
        (Self { map }, diagnostics)
    }

    pub fn get(&self, key: &str) -> Option<&ClassInfo> {
        self.map.get(&key.to_lowercase())
    }

    /// Resolve a parent-class reference as written in a declaration:
    /// fully qualified first, then relative to the child's namespace.
    pub fn resolve(&self, parent_text: &str, child_namespace: Option<&str>) -> Option<&ClassInfo> {
        let key = parent_text.to_lowercase();
        if let Some(found) = self.map.get(&key) {
            return Some(found);
        }
        if let Some(ns) = child_namespace {
            return self.map.get(&format!("{}.{}", ns, key));
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassInfo> {
        self.map.values()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// One class member, unified for shadow/override checks.
enum MemberRef<'a> {
    Field(&'a brsc_ast::ast::ClassField),
    Method(&'a ClassMethod),
}

impl<'a> MemberRef<'a> {
    fn name_text(&self) -> &str {
        match self {
            MemberRef::Field(f) => &f.name.text,
            MemberRef::Method(m) => &m.name().text,
        }
    }

    fn name_range(&self) -> Range {
        match self {
            MemberRef::Field(f) => f.name.range,
            MemberRef::Method(m) => m.name().range,
        }
    }
}

fn members_of(class: &ClassStatement) -> Vec<MemberRef<'_>> {
    let mut members: Vec<MemberRef<'_>> = Vec::new();
    members.extend(class.fields.iter().map(MemberRef::Field));
    members.extend(class.methods.iter().map(MemberRef::Method));
    // Declaration order matters for duplicate reporting
    members.sort_by_key(|m| m.name_range().start);
    members
}

/// Find the nearest ancestor member with the given name, together with its
/// declaring class.
fn find_ancestor_member<'a>(
    chain: &[&'a ClassInfo],
    name: &str,
) -> Option<(&'a ClassInfo, MemberRef<'a>)> {
    for ancestor in chain {
        for member in members_of(&ancestor.statement) {
            if member.name_text().eq_ignore_ascii_case(name) {
                return Some((ancestor, member));
            }
        }
    }
    None
}

/// Parent-class resolution environment: the validating scope's own lookup
/// plus ancestor scope lookups, nearest first.
struct Resolver<'a> {
    own: &'a ClassLookup,
    ancestors: &'a [&'a ClassLookup],
}

impl<'a> Resolver<'a> {
    fn resolve(&self, text: &str, ns: Option<&str>) -> Option<&'a ClassInfo> {
        self.own
            .resolve(text, ns)
            .or_else(|| self.ancestors.iter().find_map(|lookup| lookup.resolve(text, ns)))
    }
}

/// Validate every class in `own` against the full resolution environment
/// (`own` first, then ancestor scope lookups, nearest first).
pub(crate) fn validate_classes(
    own: &ClassLookup,
    ancestors: &[&ClassLookup],
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let resolver = Resolver { own, ancestors };

    // Unknown parents and inheritance cycles
    for class in own.iter() {
        if let Some(parent_name) = &class.statement.parent_name {
            if resolver
                .resolve(&parent_name.text(), class.namespace.as_deref())
                .is_none()
            {
                diagnostics.push(
                    catalog::unknown_parent_class(&parent_name.text())
                        .at(parent_name.range)
                        .in_file(&class.file),
                );
            }
        }
    }

    for class in own.iter() {
        if class_is_cyclic(class, &resolver) {
            diagnostics.push(
                catalog::cyclic_class_inheritance(&class.full_name())
                    .at(class.statement.name.range)
                    .in_file(&class.file),
            );
        }
    }

    // Member checks against the resolved ancestor chain
    for class in own.iter() {
        validate_members(class, &resolver, &mut diagnostics);
    }

    diagnostics
}

/// True when following parent links from `class` revisits `class`.
fn class_is_cyclic<'a>(class: &'a ClassInfo, resolver: &Resolver<'a>) -> bool {
    let mut visited: Vec<String> = vec![class.key()];
    let mut current = class;
    while let Some(parent_name) = &current.statement.parent_name {
        let Some(parent) = resolver.resolve(&parent_name.text(), current.namespace.as_deref())
        else {
            return false;
        };
        if parent.key() == class.key() {
            return true;
        }
        if visited.contains(&parent.key()) {
            // A cycle exists upstream but does not include this class
            return false;
        }
        visited.push(parent.key());
        current = parent;
    }
    false
}

/// The resolved ancestor chain, nearest parent first, bounded on cycles.
fn ancestor_chain<'a>(class: &'a ClassInfo, resolver: &Resolver<'a>) -> Vec<&'a ClassInfo> {
    let mut chain = Vec::new();
    let mut visited = vec![class.key()];
    let mut current = class;
    while let Some(parent_name) = &current.statement.parent_name {
        let Some(parent) = resolver.resolve(&parent_name.text(), current.namespace.as_deref())
        else {
            break;
        };
        if visited.contains(&parent.key()) {
            break;
        }
        visited.push(parent.key());
        chain.push(parent);
        current = parent;
    }
    chain
}

fn validate_members<'a>(
    class: &'a ClassInfo,
    resolver: &Resolver<'a>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    // Duplicate members inside one class
    let members = members_of(&class.statement);
    for (idx, member) in members.iter().enumerate() {
        let first = members[..idx]
            .iter()
            .find(|m| m.name_text().eq_ignore_ascii_case(member.name_text()));
        if let Some(first) = first {
            diagnostics.push(
                catalog::duplicate_class_member(member.name_text(), &class.full_name())
                    .at(member.name_range())
                    .in_file(&class.file)
                    .with_related(
                        Location::new(&class.file, first.name_range()),
                        "first declared here",
                    ),
            );
        }
    }

    let chain = ancestor_chain(class, resolver);
    if chain.is_empty() {
        return;
    }

    for method in &class.statement.methods {
        let name = &method.name().text;
        // Constructors chain rather than override
        if name.eq_ignore_ascii_case("new") {
            continue;
        }
        let Some((ancestor, ancestor_member)) = find_ancestor_member(&chain, name) else {
            continue;
        };
        let related = Location::new(&ancestor.file, ancestor_member.name_range());
        match ancestor_member {
            MemberRef::Field(_) => {
                diagnostics.push(
                    catalog::override_signature_mismatch(name, &ancestor.full_name())
                        .at(method.name().range)
                        .in_file(&class.file)
                        .with_related(related, "ancestor member is a field"),
                );
            }
            MemberRef::Method(ancestor_method) => {
                if ancestor_method.is_final {
                    diagnostics.push(
                        catalog::cannot_override_final_member(name, &ancestor.full_name())
                            .at(method.name().range)
                            .in_file(&class.file)
                            .with_related(related, "final member declared here"),
                    );
                } else if !method.is_override {
                    diagnostics.push(
                        catalog::missing_override_annotation(name, &ancestor.full_name())
                            .at(method.name().range)
                            .in_file(&class.file)
                            .with_related(related, "overridden member declared here"),
                    );
                } else if method.func.min_params() != ancestor_method.func.min_params()
                    || method.func.max_params() != ancestor_method.func.max_params()
                    || method.access != ancestor_method.access
                {
                    diagnostics.push(
                        catalog::override_signature_mismatch(name, &ancestor.full_name())
                            .at(method.name().range)
                            .in_file(&class.file)
                            .with_related(related, "overridden member declared here"),
                    );
                }
            }
        }
    }

    for field in &class.statement.fields {
        let Some((ancestor, ancestor_member)) = find_ancestor_member(&chain, &field.name.text)
        else {
            continue;
        };
        let related = Location::new(&ancestor.file, ancestor_member.name_range());
        match ancestor_member {
            MemberRef::Field(_) => {
                diagnostics.push(
                    catalog::field_shadows_ancestor_field(&field.name.text, &ancestor.full_name())
                        .at(field.name.range)
                        .in_file(&class.file)
                        .with_related(related, "ancestor field declared here"),
                );
            }
            MemberRef::Method(_) => {
                diagnostics.push(
                    catalog::override_signature_mismatch(
                        &field.name.text,
                        &ancestor.full_name(),
                    )
                    .at(field.name.range)
                    .in_file(&class.file)
                    .with_related(related, "ancestor member is a method"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brsc_ast::catalog::codes;
    use brsc_ast::PkgPath;
    use brsc_parser::ParseMode;

    fn file(name: &str, source: &str) -> CodeFile {
        CodeFile::parse(
            format!("/proj/source/{}", name),
            PkgPath::new(format!("source/{}", name)),
            source,
            ParseMode::Superset,
        )
    }

    fn validate(sources: &[(&str, &str)]) -> Vec<Diagnostic> {
        let files: Vec<CodeFile> = sources
            .iter()
            .map(|(name, source)| file(name, source))
            .collect();
        let (lookup, mut diagnostics) = ClassLookup::build(files.iter());
        diagnostics.extend(validate_classes(&lookup, &[]));
        diagnostics
    }

    #[test]
    fn test_clean_hierarchy() {
        let diagnostics = validate(&[(
            "a.bs",
            "class Animal\n    sub speak()\n    end sub\nend class\nclass Dog extends Animal\n    override sub speak()\n    end sub\nend class",
        )]);
        assert!(diagnostics.is_empty(), "got: {:?}", diagnostics);
    }

    #[test]
    fn test_unknown_parent() {
        let diagnostics = validate(&[("a.bs", "class Dog extends Animal\nend class")]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::UNKNOWN_PARENT_CLASS);
    }

    #[test]
    fn test_cycle_detection() {
        let diagnostics = validate(&[(
            "a.bs",
            "class A extends B\nend class\nclass B extends A\nend class",
        )]);
        let cyclic: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.code == codes::CYCLIC_CLASS_INHERITANCE)
            .collect();
        assert_eq!(cyclic.len(), 2);
    }

    #[test]
    fn test_missing_override_annotation() {
        let diagnostics = validate(&[(
            "a.bs",
            "class Animal\n    sub speak()\n    end sub\nend class\nclass Dog extends Animal\n    sub speak()\n    end sub\nend class",
        )]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::MISSING_OVERRIDE_ANNOTATION);
        assert_eq!(diagnostics[0].related.len(), 1);
    }

    #[test]
    fn test_override_arity_mismatch() {
        let diagnostics = validate(&[(
            "a.bs",
            "class Animal\n    sub speak(volume)\n    end sub\nend class\nclass Dog extends Animal\n    override sub speak()\n    end sub\nend class",
        )]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::OVERRIDE_SIGNATURE_MISMATCH);
    }

    #[test]
    fn test_override_access_mismatch() {
        let diagnostics = validate(&[(
            "a.bs",
            "class Animal\n    private sub speak()\n    end sub\nend class\nclass Dog extends Animal\n    override sub speak()\n    end sub\nend class",
        )]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::OVERRIDE_SIGNATURE_MISMATCH);
    }

    #[test]
    fn test_cannot_override_final() {
        let diagnostics = validate(&[(
            "a.bs",
            "class Animal\n    final sub speak()\n    end sub\nend class\nclass Dog extends Animal\n    override sub speak()\n    end sub\nend class",
        )]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::CANNOT_OVERRIDE_FINAL_MEMBER);
    }

    #[test]
    fn test_field_shadows_ancestor_field() {
        let diagnostics = validate(&[(
            "a.bs",
            "class Animal\n    name as string\nend class\nclass Dog extends Animal\n    name as string\nend class",
        )]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::FIELD_SHADOWS_ANCESTOR_FIELD);
    }

    #[test]
    fn test_duplicate_members() {
        let diagnostics = validate(&[(
            "a.bs",
            "class A\n    count as integer\n    sub count()\n    end sub\nend class",
        )]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::DUPLICATE_CLASS_MEMBER);
    }

    #[test]
    fn test_duplicate_class_declaration() {
        let diagnostics = validate(&[
            ("a.bs", "class Spinner\nend class"),
            ("b.bs", "class Spinner\nend class"),
        ]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, codes::DUPLICATE_CLASS_DECLARATION);
    }

    #[test]
    fn test_constructor_new_is_exempt() {
        let diagnostics = validate(&[(
            "a.bs",
            "class Animal\n    sub new()\n    end sub\nend class\nclass Dog extends Animal\n    sub new()\n    end sub\nend class",
        )]);
        assert!(diagnostics.is_empty(), "got: {:?}", diagnostics);
    }

    #[test]
    fn test_namespace_relative_parent_resolution() {
        let diagnostics = validate(&[(
            "a.bs",
            "namespace Zoo\n    class Animal\n    end class\n    class Dog extends Animal\n    end class\nend namespace",
        )]);
        assert!(diagnostics.is_empty(), "got: {:?}", diagnostics);
    }
}
