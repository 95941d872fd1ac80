//! Canonical file paths, the basis for all cache keys and registries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A fully canonicalized file path.
///
/// Construction goes through [`CanonicalPath::normalize`], which resolves
/// relative segments and symlinks via the filesystem. Two `CanonicalPath`s
/// compare equal iff they refer to the same file, regardless of how the
/// original path was spelled. On Windows the stored form is lowercased so
/// that comparisons are case-insensitive-safe.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalPath(PathBuf);

impl CanonicalPath {
    /// Canonicalizes `path`, resolving `.`/`..` segments and symlinks.
    ///
    /// Fails if the file does not exist. Callers that tolerate missing
    /// inputs are expected to report a warning and drop the path.
    pub fn normalize(path: &Path) -> Result<Self, NormalizeError> {
        let resolved = std::fs::canonicalize(path).map_err(|source| NormalizeError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_resolved(resolved))
    }

    #[cfg(windows)]
    fn from_resolved(resolved: PathBuf) -> Self {
        Self(PathBuf::from(
            resolved.to_string_lossy().to_lowercase(),
        ))
    }

    #[cfg(not(windows))]
    fn from_resolved(resolved: PathBuf) -> Self {
        Self(resolved)
    }

    /// Returns the canonical path as a borrowed [`Path`].
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns the canonical string form used in cache keys and registries.
    pub fn key(&self) -> String {
        self.0.to_string_lossy().into_owned()
    }

    /// Returns the parent directory of this path, if any.
    pub fn parent(&self) -> Option<&Path> {
        self.0.parent()
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl fmt::Debug for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalPath({})", self.0.display())
    }
}

impl AsRef<Path> for CanonicalPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Error returned when a path cannot be canonicalized.
///
/// The most common cause is that the file does not exist.
#[derive(Debug, thiserror::Error)]
#[error("cannot resolve path {path}: {source}")]
pub struct NormalizeError {
    /// The path as originally supplied.
    pub path: PathBuf,
    /// The underlying I/O error.
    pub source: std::io::Error,
}
