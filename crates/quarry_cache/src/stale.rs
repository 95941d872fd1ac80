//! The staleness decision: does a previous build still cover the current inputs?
//!
//! Two checks, short-circuiting on the first hit:
//!
//! 1. **Timestamps** — any current file whose last-modified time is at or
//!    after the recorded trigger time marks the build stale. Missing files
//!    also mark it stale.
//! 2. **Membership** — per owning unit, the ordered deduplicated file
//!    lists of the old and new dependency snapshots must match exactly;
//!    a unit present in only one snapshot marks the build stale. This
//!    catches added/removed files that change no existing file's
//!    timestamp (e.g. wildcard-included files).
//!
//! Both checks operate on canonical paths, so unrelated path formatting
//! never causes a false rebuild. The membership check is only needed at
//! the application tier; the project tier's scope key already embeds the
//! unit's document set, so membership drift surfaces as a key miss there.

use chrono::{DateTime, Utc};
use std::path::Path;

use crate::build_info::{BuildInfo, ContainedFiles};

/// Returns `true` if `path` is missing or was modified at or after `since`.
fn modified_since(path: &Path, since: DateTime<Utc>) -> bool {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(mtime) => DateTime::<Utc>::from(mtime) >= since,
        Err(_) => true,
    }
}

/// Returns `true` if any of `files` is missing or modified at or after
/// the build's trigger time.
pub fn timestamps_changed<'a>(
    info: &BuildInfo,
    files: impl IntoIterator<Item = &'a str>,
) -> bool {
    files
        .into_iter()
        .any(|file| modified_since(Path::new(file), info.triggered_utc))
}

/// Returns `true` if the unit→file membership differs between snapshots.
pub fn membership_changed(old: &ContainedFiles, new: &ContainedFiles) -> bool {
    if old.len() != new.len() {
        return true;
    }
    new.iter().any(|(unit, files)| old.get(unit) != Some(files))
}

/// Application-tier staleness: timestamps over every current file, then
/// per-unit membership against the recorded snapshot.
pub fn target_is_stale(info: &BuildInfo, current: &ContainedFiles) -> bool {
    let all_files = current.values().flatten().map(String::as_str);
    if timestamps_changed(info, all_files) {
        return true;
    }
    membership_changed(&info.contained_files, current)
}

/// Project-tier staleness: timestamps over the unit's current file list.
pub fn unit_is_stale(info: &BuildInfo, files: &[String]) -> bool {
    timestamps_changed(info, files.iter().map(String::as_str))
}
