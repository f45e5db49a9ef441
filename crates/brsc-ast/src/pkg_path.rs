//! Package path representation.
//!
//! Two path forms coexist in a project: absolute file-system paths (registry
//! keys) and package paths — project-relative, forward-slash references of
//! the form `pkg:/source/main.brs`. Package paths are case-preserved on
//! input and compared case-insensitively; the verbatim text is kept around
//! because some diagnostics compare spelling, not identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A project-relative, forward-slash path to a file.
///
/// The `pkg:/` prefix is stripped on construction and backslashes are
/// normalized to forward slashes. Equality on the type itself is verbatim;
/// use [`PkgPath::same_file`] or [`PkgPath::key`] for case-insensitive
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgPath {
    raw: String,
}

impl PkgPath {
    /// Build a package path, normalizing the `pkg:/` prefix and separators.
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = path.as_ref().replace('\\', "/");
        let stripped = path
            .strip_prefix("pkg:/")
            .or_else(|| path.strip_prefix("pkg:"))
            .unwrap_or(&path);
        Self {
            raw: stripped.trim_start_matches('/').to_string(),
        }
    }

    /// The verbatim (case-preserved) path text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Lower-cased form, used as a map key.
    pub fn key(&self) -> String {
        self.raw.to_lowercase()
    }

    /// Case-insensitive identity comparison.
    pub fn same_file(&self, other: &PkgPath) -> bool {
        self.raw.eq_ignore_ascii_case(&other.raw)
    }

    /// True when the path is empty (a descriptor may carry an empty
    /// script reference).
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The final path segment.
    pub fn file_name(&self) -> &str {
        self.raw.rsplit('/').next().unwrap_or("")
    }

    /// The extension without the dot, lower-cased comparison.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        name.rsplit_once('.').map(|(_, ext)| ext)
    }

    /// True when the first path segment equals `dir` (case-insensitive).
    pub fn in_dir(&self, dir: &str) -> bool {
        self.raw
            .split('/')
            .next()
            .is_some_and(|seg| seg.eq_ignore_ascii_case(dir))
    }
}

impl fmt::Display for PkgPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pkg:/{}", self.raw)
    }
}

impl From<&str> for PkgPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PkgPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
