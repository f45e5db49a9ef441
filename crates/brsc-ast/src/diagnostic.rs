//! Diagnostic model.
//!
//! Every recoverable condition in the engine surfaces as a [`Diagnostic`]:
//! a stable numeric code, a severity, a message, a source range, the owning
//! file, and optional related locations ("declared here"). Constructors for
//! each diagnostic kind live in [`crate::catalog`].

use crate::range::Range;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Diagnostic severity, numbered as on the wire (1 = error … 4 = hint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl Severity {
    /// Wire value (1-4).
    pub fn to_wire(self) -> u8 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Information => 3,
            Severity::Hint => 4,
        }
    }

    /// Parse a severity name as written in configuration files.
    ///
    /// Comparison is case-insensitive; `warn`/`warning`, `info`/`information`
    /// are accepted aliases.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warn" | "warning" => Ok(Severity::Warning),
            "info" | "information" => Ok(Severity::Information),
            "hint" => Ok(Severity::Hint),
            unknown => Err(format!(
                "unknown severity '{}', valid values: error, warn, info, hint",
                unknown
            )),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Information => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// A file/range pair referenced from a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: PathBuf,
    pub range: Range,
}

impl Location {
    pub fn new(path: impl Into<PathBuf>, range: Range) -> Self {
        Self {
            path: path.into(),
            range,
        }
    }
}

/// A secondary location attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Related {
    pub location: Location,
    pub message: String,
}

/// Code, severity, and message for one diagnostic kind.
///
/// This is what the catalog constructors return; attaching a range and an
/// owning file turns it into a full [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticData {
    pub code: u32,
    pub severity: Severity,
    pub message: String,
}

impl DiagnosticData {
    /// Attach a source range, producing a diagnostic without an owning file
    /// yet (the file is filled in where the diagnostic is registered).
    pub fn at(self, range: Range) -> Diagnostic {
        Diagnostic {
            code: self.code,
            severity: self.severity,
            message: self.message,
            range,
            file: PathBuf::new(),
            related: Vec::new(),
        }
    }
}

/// A single diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable numeric code; one code per diagnostic kind.
    pub code: u32,
    pub severity: Severity,
    pub message: String,
    pub range: Range,
    /// Absolute path of the owning file.
    pub file: PathBuf,
    /// Related locations ("declared here", "ancestor import here").
    pub related: Vec<Related>,
}

impl Diagnostic {
    /// Reported diagnostic source identifier.
    pub const SOURCE: &'static str = "bsc";

    /// Set the owning file.
    pub fn in_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = path.into();
        self
    }

    /// Add a related location.
    pub fn with_related(mut self, location: Location, message: impl Into<String>) -> Self {
        self.related.push(Related {
            location,
            message: message.into(),
        });
        self
    }

    /// True when the severity is [`Severity::Error`].
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}{}] at {}",
            self.severity,
            self.message,
            Self::SOURCE,
            self.code,
            self.range
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Range;

    #[test]
    fn test_severity_wire_values() {
        assert_eq!(Severity::Error.to_wire(), 1);
        assert_eq!(Severity::Warning.to_wire(), 2);
        assert_eq!(Severity::Information.to_wire(), 3);
        assert_eq!(Severity::Hint.to_wire(), 4);
    }

    #[test]
    fn test_severity_parse_aliases() {
        assert_eq!(Severity::parse("error").unwrap(), Severity::Error);
        assert_eq!(Severity::parse("WARN").unwrap(), Severity::Warning);
        assert_eq!(Severity::parse("Warning").unwrap(), Severity::Warning);
        assert_eq!(Severity::parse("info").unwrap(), Severity::Information);
        assert_eq!(Severity::parse("information").unwrap(), Severity::Information);
        assert_eq!(Severity::parse("hint").unwrap(), Severity::Hint);
        assert!(Severity::parse("fatal").is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Warning < Severity::Information);
    }

    #[test]
    fn test_builder_chain() {
        let d = DiagnosticData {
            code: 1003,
            severity: Severity::Error,
            message: "cannot find function 'doThing'".into(),
        }
        .at(Range::of(1, 4, 1, 11))
        .in_file("/proj/source/main.brs")
        .with_related(
            Location::new("/proj/source/util.brs", Range::zero()),
            "declared here",
        );

        assert_eq!(d.code, 1003);
        assert!(d.is_error());
        assert_eq!(d.file.to_str(), Some("/proj/source/main.brs"));
        assert_eq!(d.related.len(), 1);
    }
}
