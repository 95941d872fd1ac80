//! The ordered, deduplicated dependency file set of one compilation unit.

use quarry_common::CanonicalPath;

/// The set of files a compilation unit transitively depends on.
///
/// For a project: the project file itself, its documents, and its
/// reference paths, in that order. Insertion order is preserved and
/// duplicates are dropped; the resulting ordered list is both a cache-key
/// ingredient and the basis for staleness membership checks. Built once
/// per run, never shared across runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentSet {
    files: Vec<String>,
}

impl DocumentSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a file, keeping the first occurrence on duplicates.
    ///
    /// Returns `true` if the file was newly inserted.
    pub fn insert(&mut self, path: &CanonicalPath) -> bool {
        let key = path.key();
        if self.files.contains(&key) {
            return false;
        }
        self.files.push(key);
        true
    }

    /// The ordered canonical file list.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Clones the ordered canonical file list.
    pub fn to_vec(&self) -> Vec<String> {
        self.files.clone()
    }

    /// Number of files in the set.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if the set contains no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
