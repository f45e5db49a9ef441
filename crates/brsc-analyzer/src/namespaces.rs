//! Namespace lookup.
//!
//! For a declaration `A.B.C` three entries exist — `a`, `a.b`, `a.b.c` —
//! with bidirectional parent/child links. Keys are lower-cased full dotted
//! paths; the first-seen spelling is kept for display.

use crate::files::code::CodeFile;
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// One node of the namespace tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceLink {
    /// Lower-cased full dotted path (the lookup key).
    pub full_path: String,
    /// First-seen spelling of the full path.
    pub display: String,
    /// Lower-cased key of the parent namespace, when nested.
    pub parent: Option<String>,
    /// Lower-cased keys of direct children.
    pub children: BTreeSet<String>,
}

/// Derived namespace view over a scope's member files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamespaceLookup {
    map: IndexMap<String, NamespaceLink>,
}

impl NamespaceLookup {
    /// Build the closure over every namespace declared by `files`.
    pub fn build<'a>(files: impl IntoIterator<Item = &'a CodeFile>) -> Self {
        let mut lookup = Self::default();
        for file in files {
            for decl in &file.namespaces {
                lookup.insert_path(&decl.name);
            }
        }
        lookup
    }

    fn insert_path(&mut self, dotted: &str) {
        let segments: Vec<&str> = dotted.split('.').collect();
        let mut parent_key: Option<String> = None;
        for depth in 1..=segments.len() {
            let display = segments[..depth].join(".");
            let key = display.to_lowercase();
            let entry = self
                .map
                .entry(key.clone())
                .or_insert_with(|| NamespaceLink {
                    full_path: key.clone(),
                    display,
                    parent: parent_key.clone(),
                    children: BTreeSet::new(),
                });
            debug_assert_eq!(entry.parent, parent_key);
            if let Some(parent) = &parent_key {
                if let Some(parent_link) = self.map.get_mut(parent) {
                    parent_link.children.insert(key.clone());
                }
            }
            parent_key = Some(key);
        }
    }

    pub fn get(&self, key: &str) -> Option<&NamespaceLink> {
        self.map.get(&key.to_lowercase())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(&key.to_lowercase())
    }

    /// True when `name` names a known namespace: an exact key, or the
    /// prefix of one.
    pub fn is_known(&self, name: &str) -> bool {
        let key = name.to_lowercase();
        let prefix = format!("{}.", key);
        self.map
            .keys()
            .any(|k| *k == key || k.starts_with(&prefix))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamespaceLink> {
        self.map.values()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
