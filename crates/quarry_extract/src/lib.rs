//! Metadata extraction from compilation units.
//!
//! The [`CompilerService`] trait is the seam between the build
//! orchestrator and whatever produces metadata for a unit; the bundled
//! [`CSharpExtractor`] is a syntactic tree-sitter implementation that
//! recognizes namespaces, types, and members without semantic analysis.

#![warn(missing_docs)]

pub mod extractor;
pub mod service;

pub use extractor::CSharpExtractor;
pub use service::{CompileError, CompileRequest, CompilerService};
