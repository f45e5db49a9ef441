//! Project configuration.
//!
//! Loaded from a `brsconfig.json` file (camelCase keys). Severity names
//! parse case-insensitively with the usual aliases; override keys are
//! diagnostic codes written as strings, the way JSON object keys must be.

use crate::error::EngineError;
use brsc_ast::Severity;
use brsc_parser::ParseMode;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Recognized project options.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Package-path globs selecting input files.
    pub files: Vec<String>,
    /// Source root; package paths are derived relative to it.
    pub root_dir: Option<PathBuf>,
    /// Diagnostic code (as a string key) → severity name.
    pub diagnostic_severity_overrides: BTreeMap<String, String>,
    /// Diagnostic codes suppressed entirely.
    pub ignore_error_codes: Vec<u32>,
    /// Default parse mode for `.brs` files; `.bs` files always parse in
    /// superset mode.
    pub parse_mode: ParseMode,
    /// Re-validate on file change notifications (the watcher itself is an
    /// external collaborator).
    pub watch: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            files: vec!["source/**".to_string(), "components/**".to_string()],
            root_dir: None,
            diagnostic_severity_overrides: BTreeMap::new(),
            ignore_error_codes: Vec::new(),
            parse_mode: ParseMode::default(),
            watch: false,
        }
    }
}

impl ProjectConfig {
    /// Load and check a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: ProjectConfig = serde_json::from_str(&text)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        config.check()?;
        Ok(config)
    }

    /// Validate option values: override keys must be numeric codes and
    /// severities must parse.
    pub fn check(&self) -> Result<(), EngineError> {
        for (code, severity) in &self.diagnostic_severity_overrides {
            if code.parse::<u32>().is_err() {
                return Err(EngineError::Config(format!(
                    "diagnosticSeverityOverrides key '{}' is not a diagnostic code",
                    code
                )));
            }
            Severity::parse(severity).map_err(EngineError::Config)?;
        }
        Ok(())
    }

    /// The configured severity override for a code, if any.
    pub fn severity_override(&self, code: u32) -> Option<Severity> {
        self.diagnostic_severity_overrides
            .get(&code.to_string())
            .and_then(|name| Severity::parse(name).ok())
    }

    /// True when diagnostics with this code are suppressed entirely.
    pub fn ignores_code(&self, code: u32) -> bool {
        self.ignore_error_codes.contains(&code)
    }
}
