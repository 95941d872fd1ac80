//! The extracted metadata model and the merge of per-unit metadata trees.
//!
//! Each compilation unit produces a [`UnitMetadata`] tree of namespaces,
//! types, and members. The [`merge`](merge::merge_units) pass combines the
//! trees of all units of one target into a single namespace-rooted tree
//! with a flat qualified-name index used for cross-reference resolution.

#![warn(missing_docs)]

pub mod item;
pub mod merge;
pub mod serial;

pub use item::{ItemKind, MemberKind, MetadataItem, ReferenceItem, TypeKind, UnitMetadata};
pub use merge::{merge_units, IndexEntry, MergedMetadata};
pub use serial::{from_bytes, read_document, to_bytes, write_document, SerialError};
