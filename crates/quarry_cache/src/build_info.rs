//! The durable record of one successful build.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A snapshot of the files a scope depended on at capture time.
///
/// Keys are canonical unit keys; values are the unit's ordered,
/// deduplicated canonical file list (the unit itself, its documents, and
/// its references).
pub type ContainedFiles = BTreeMap<String, Vec<String>>;

/// The durable record of one successful build of a cache scope.
///
/// Written by the cache writer after a successful build and read by the
/// staleness checker on the next run. Immutable once written; a newer
/// build supersedes the entry rather than mutating it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    /// When the build was triggered, sampled *before* extraction began.
    ///
    /// Any edit concurrent with or after triggering therefore forces a
    /// future rebuild; a result is never considered newer than its inputs.
    pub triggered_utc: DateTime<Utc>,
    /// The ordered canonical input paths forming this scope's key.
    pub input_files_key: Vec<String>,
    /// Per-unit dependency snapshot at capture time.
    pub contained_files: ContainedFiles,
    /// The folder the build's outputs were written to.
    pub output_folder: PathBuf,
    /// Output files relative to [`output_folder`](Self::output_folder).
    pub relative_output_files: Vec<PathBuf>,
}

impl BuildInfo {
    /// Creates a record for a build triggered at `triggered_utc`.
    pub fn new(
        triggered_utc: DateTime<Utc>,
        input_files_key: Vec<String>,
        contained_files: ContainedFiles,
        output_folder: PathBuf,
        relative_output_files: Vec<PathBuf>,
    ) -> Self {
        Self {
            triggered_utc,
            input_files_key,
            contained_files,
            output_folder,
            relative_output_files,
        }
    }
}
