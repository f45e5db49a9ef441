// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! AST types, source ranges, and diagnostics for the brsc analysis engine.
//!
//! This crate contains the value types shared by every stage of the
//! pipeline: positions and ranges, package paths, the statement and
//! expression trees produced by the parser, and the diagnostic model with
//! its stable code catalog.

pub mod ast;
pub mod catalog;
pub mod diagnostic;
pub mod pkg_path;
pub mod range;

// Re-export commonly used types
pub use ast::*;
pub use diagnostic::{Diagnostic, DiagnosticData, Location, Related, Severity};
pub use pkg_path::PkgPath;
pub use range::{Position, Range};
