//! The two cache tiers and their durable indexes.
//!
//! Each tier is an independent namespace of scope keys under one cache
//! root. A scope key is the canonical, order-preserving join of its
//! scope's input paths: the application tier's scope is a whole input
//! target, the project tier's scope is one compilation unit plus its
//! current document set. Keys preserve input order: the same file set
//! presented as `[A,B]` vs `[B,A]` is a distinct entry.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use quarry_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::build_info::BuildInfo;
use crate::error::CacheError;

/// Name of the index file within each tier directory.
const INDEX_FILE: &str = "index.json";

/// Separator used when joining scope key parts.
const KEY_SEPARATOR: char = '|';

/// Builds a scope key from ordered canonical path strings.
pub fn scope_key<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts.into_iter().collect::<Vec<_>>().join(&KEY_SEPARATOR.to_string())
}

/// Serialized form of a tier's index.
#[derive(Serialize, Deserialize)]
struct TierIndex {
    /// Tool version that produced this index. Invalidate on version change.
    tool_version: String,
    /// Scope key → most recent valid build record.
    entries: BTreeMap<String, BuildInfo>,
}

/// One cache tier: an index of scope keys plus a folder per entry.
///
/// Reads are lock-free; writes to a given key are last-writer-wins. The
/// orchestrator processes each unit exactly once per run, so two workers
/// never race on the same project-level key.
pub struct CacheTier {
    /// Directory holding this tier's index and entry folders.
    root: PathBuf,
    /// In-memory index, loaded at open and persisted by `flush`.
    index: DashMap<String, BuildInfo>,
    /// Tool version stamped into the index on flush.
    tool_version: String,
}

impl CacheTier {
    /// Opens a tier, loading its index if present and compatible.
    ///
    /// Fail-safe: a missing, corrupt, or version-mismatched index starts
    /// the tier empty, which degrades to a full rebuild of its scopes.
    fn open(root: PathBuf, tool_version: &str) -> Self {
        let index = DashMap::new();
        if let Some(loaded) = Self::load_index(&root) {
            if loaded.tool_version == tool_version {
                for (key, info) in loaded.entries {
                    index.insert(key, info);
                }
            }
        }
        Self {
            root,
            index,
            tool_version: tool_version.to_string(),
        }
    }

    fn load_index(root: &Path) -> Option<TierIndex> {
        let content = std::fs::read_to_string(root.join(INDEX_FILE)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Looks up the most recent build record for a scope key.
    pub fn get(&self, key: &str) -> Option<BuildInfo> {
        self.index.get(key).map(|entry| entry.clone())
    }

    /// Records a new build for a scope key, superseding any previous entry.
    pub fn put(&self, key: String, info: BuildInfo) {
        self.index.insert(key, info);
    }

    /// Returns the directory holding artifacts for a scope key's entry.
    ///
    /// The directory name is derived from the key's hash; artifact file
    /// names inside it are generated, so the index (not the file name) is
    /// the lookup authority.
    pub fn entry_dir(&self, key: &str) -> PathBuf {
        self.root.join(ContentHash::from_key(key).to_string())
    }

    /// Number of entries currently in the index.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Persists the index to disk, sorted by scope key.
    pub fn flush(&self) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.root).map_err(|e| CacheError::Io {
            path: self.root.clone(),
            source: e,
        })?;

        let entries: BTreeMap<String, BuildInfo> = self
            .index
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let snapshot = TierIndex {
            tool_version: self.tool_version.clone(),
            entries,
        };

        let path = self.root.join(INDEX_FILE);
        let json =
            serde_json::to_string_pretty(&snapshot).map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;
        std::fs::write(&path, json).map_err(|e| CacheError::Io { path, source: e })
    }
}

/// The two cache tiers, opened together at run start.
///
/// An explicit value with an injected root location rather than a
/// process-wide singleton, so tests can isolate runs in temporary
/// directories.
pub struct BuildCache {
    /// Whole-target scope: one entry per input target.
    pub application: CacheTier,
    /// Per-unit scope: one entry per compilation unit.
    pub project: CacheTier,
}

impl BuildCache {
    /// Opens both tiers under the given cache root.
    pub fn open(cache_root: &Path, tool_version: &str) -> Self {
        Self {
            application: CacheTier::open(cache_root.join("application"), tool_version),
            project: CacheTier::open(cache_root.join("project"), tool_version),
        }
    }

    /// Persists both tier indexes.
    pub fn flush(&self) -> Result<(), CacheError> {
        self.application.flush()?;
        self.project.flush()
    }
}
