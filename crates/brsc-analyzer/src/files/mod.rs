//! File models: code files and component descriptors.
//!
//! `File` is a closed two-variant sum. Code paths that work with either
//! variant use the shared capability accessors (package path, absolute
//! path, diagnostics, callables, function scopes, call sites); everything
//! descriptor-specific stays on the descriptor variant.

pub mod code;
pub mod descriptor;

pub use code::{CallSite, CallableInfo, CodeFile, FunctionScope, VarDecl};
pub use descriptor::{DescriptorFile, FileReference};

use brsc_ast::{Diagnostic, PkgPath};
use std::path::Path;

/// A registered project file.
#[derive(Debug, Clone)]
pub enum File {
    Code(CodeFile),
    Descriptor(DescriptorFile),
}

impl File {
    pub fn pkg_path(&self) -> &PkgPath {
        match self {
            File::Code(f) => &f.pkg_path,
            File::Descriptor(f) => &f.pkg_path,
        }
    }

    pub fn path_absolute(&self) -> &Path {
        match self {
            File::Code(f) => &f.path_absolute,
            File::Descriptor(f) => &f.path_absolute,
        }
    }

    /// File-level diagnostics (lexing, parsing, descriptor structure).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            File::Code(f) => &f.diagnostics,
            File::Descriptor(f) => &f.diagnostics,
        }
    }

    /// Callables declared by this file. Descriptors declare none.
    pub fn callables(&self) -> &[CallableInfo] {
        match self {
            File::Code(f) => &f.callables,
            File::Descriptor(_) => &[],
        }
    }

    /// Function scopes of this file. Descriptors have none.
    pub fn function_scopes(&self) -> &[FunctionScope] {
        match self {
            File::Code(f) => &f.function_scopes,
            File::Descriptor(_) => &[],
        }
    }

    /// Call sites collected from this file. Descriptors have none.
    pub fn call_sites(&self) -> &[CallSite] {
        match self {
            File::Code(f) => &f.call_sites,
            File::Descriptor(_) => &[],
        }
    }

    pub fn as_code(&self) -> Option<&CodeFile> {
        match self {
            File::Code(f) => Some(f),
            File::Descriptor(_) => None,
        }
    }

    pub fn as_descriptor(&self) -> Option<&DescriptorFile> {
        match self {
            File::Code(_) => None,
            File::Descriptor(f) => Some(f),
        }
    }

    pub fn as_descriptor_mut(&mut self) -> Option<&mut DescriptorFile> {
        match self {
            File::Code(_) => None,
            File::Descriptor(f) => Some(f),
        }
    }
}
