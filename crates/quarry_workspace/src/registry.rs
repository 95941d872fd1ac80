//! The per-run project registry and Document Cache.

use std::collections::BTreeMap;

use dashmap::DashMap;

use crate::document_set::DocumentSet;
use crate::loader::ProjectHandle;

/// Concurrent registry of discovered compilation units.
///
/// Keyed by canonical unit key with insert-if-absent semantics: a project
/// reachable from two solutions (or additionally listed explicitly) is
/// registered by exactly one winner and processed once. Doubles as the
/// per-run Document Cache mapping each unit to the files it transitively
/// depends on. Lives for one run; never shared across runs.
#[derive(Default)]
pub struct ProjectRegistry {
    projects: DashMap<String, ProjectHandle>,
    documents: DashMap<String, DocumentSet>,
}

impl ProjectRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a loaded project if its key is not already present.
    ///
    /// On first registration the unit's [`DocumentSet`] is computed as
    /// {project path} ∪ documents ∪ references. Returns `true` if the
    /// project was newly registered.
    pub fn register(&self, handle: ProjectHandle) -> bool {
        let key = handle.path.key();
        match self.projects.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let mut set = DocumentSet::new();
                set.insert(&handle.path);
                for doc in &handle.documents {
                    set.insert(doc);
                }
                for reference in &handle.references {
                    set.insert(reference);
                }
                self.documents.insert(key, set);
                slot.insert(handle);
                true
            }
        }
    }

    /// Returns `true` if a unit with this key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.projects.contains_key(key)
    }

    /// Returns the Document Cache entry for a unit, if registered.
    pub fn document_set(&self, key: &str) -> Option<DocumentSet> {
        self.documents.get(key).map(|entry| entry.clone())
    }

    /// All registered units, sorted by key for deterministic dispatch.
    pub fn units(&self) -> Vec<ProjectHandle> {
        let mut units: Vec<ProjectHandle> = self
            .projects
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        units.sort_by_key(|handle| handle.path.key());
        units
    }

    /// Snapshot of the whole Document Cache: unit key → ordered file list.
    pub fn contained_files(&self) -> BTreeMap<String, Vec<String>> {
        self.documents
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().to_vec()))
            .collect()
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Returns `true` if no units are registered.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
