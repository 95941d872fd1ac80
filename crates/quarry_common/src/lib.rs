//! Shared foundational types used across the Quarry metadata toolchain.
//!
//! This crate provides canonical path handling (the basis for every cache
//! key) and content hashing for artifact integrity checks.

#![warn(missing_docs)]

pub mod hash;
pub mod path;

pub use hash::ContentHash;
pub use path::{CanonicalPath, NormalizeError};
