//! The two-tier incremental build cache.
//!
//! This crate provides the durable [`BuildInfo`] record, the
//! application-level and project-level cache tiers, the staleness decision,
//! and validated binary artifact storage. All cache reads are fail-safe:
//! corruption or version mismatches result in cache misses rather than
//! errors, forcing a rebuild of the affected scope.

#![warn(missing_docs)]

pub mod artifact;
pub mod build_info;
pub mod error;
pub mod stale;
pub mod store;

pub use artifact::ArtifactStore;
pub use build_info::{BuildInfo, ContainedFiles};
pub use error::CacheError;
pub use stale::{membership_changed, target_is_stale, timestamps_changed, unit_is_stale};
pub use store::{scope_key, BuildCache, CacheTier};
