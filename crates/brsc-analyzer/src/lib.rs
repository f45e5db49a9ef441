// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Project analysis engine.
//!
//! Ingests source files and component descriptors, builds a project-wide
//! symbol and dependency model, and produces compiler-front-end
//! diagnostics plus editor services (go-to-definition, completion).
//!
//! ## Architecture
//!
//! - `files`: code and descriptor file models with derived indexes
//! - `depgraph`: string-keyed dependency graph with change subscriptions
//! - `scope`: analysis scopes and the validation pipeline
//! - `class_validator`: class hierarchy checks
//! - `namespaces`: namespace closure lookup
//! - `platform`: built-in callable catalog
//! - `program`: top-level coordinator and event bus
//! - `config`: project configuration
//! - `services`: go-to-definition and completion

pub mod class_validator;
pub mod config;
pub mod depgraph;
pub mod emitter;
pub mod error;
pub mod files;
pub mod namespaces;
pub mod platform;
pub mod program;
pub mod scope;
pub mod services;

pub use config::ProjectConfig;
pub use error::EngineError;
pub use files::{CodeFile, DescriptorFile, File};
pub use program::{Program, ProgramEvent};
pub use scope::{Scope, ScopeKind};
