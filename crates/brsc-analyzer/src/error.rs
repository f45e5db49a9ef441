//! Unrecoverable engine errors.
//!
//! Everything recoverable is a `Diagnostic`; this type covers the few
//! conditions that abort the enclosing batch.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid project root '{0}'")]
    InvalidProjectRoot(PathBuf),

    /// The descriptor XML is corrupt at the level of the root tag (not
    /// well-formed, wrong root element, or missing the component name).
    #[error("corrupt component descriptor '{path}': {message}")]
    CorruptDescriptor { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
