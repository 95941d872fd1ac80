//! Input normalization and workspace expansion.
//!
//! This crate turns heterogeneous raw inputs (solutions, projects,
//! standalone source files) into registered compilation units with known
//! document sets. The [`ProjectRegistry`] is the per-run Document Cache:
//! a concurrent, insert-if-absent map from canonical unit keys to the set
//! of files each unit transitively depends on.

#![warn(missing_docs)]

pub mod document_set;
pub mod expander;
pub mod input;
pub mod loader;
pub mod registry;

pub use document_set::DocumentSet;
pub use expander::{expand_project, expand_solution, group_sources, SourceFileGroup};
pub use input::{classify, normalize_targets, InputKind, InputTarget, SourceLanguage};
pub use loader::{FsWorkspaceLoader, LoadError, ProjectHandle, WorkspaceLoader};
pub use registry::ProjectRegistry;
