//! Writing the merged metadata tree to the target's output folder.

use std::path::{Path, PathBuf};

use quarry_metadata::MergedMetadata;
use serde::Serialize;

use crate::error::BuildError;

/// The cross-reference document written alongside the namespace documents.
#[derive(Serialize)]
struct IndexDocument<'a> {
    /// Dot-qualified name → index entry.
    index: &'a std::collections::BTreeMap<String, quarry_metadata::IndexEntry>,
    /// Symbol id → reference item.
    references: &'a std::collections::BTreeMap<String, quarry_metadata::ReferenceItem>,
}

/// Writes one JSON document per root namespace plus `index.json`.
///
/// Returns the written file names relative to `out_dir`; this list is what
/// the application-level short-circuit copies on an unchanged rebuild.
pub fn write_outputs(out_dir: &Path, merged: &MergedMetadata) -> Result<Vec<PathBuf>, BuildError> {
    std::fs::create_dir_all(out_dir).map_err(|source| BuildError::OutputWrite {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for namespace in &merged.namespaces {
        let name = PathBuf::from(format!("{}.json", namespace.name));
        write_json(&out_dir.join(&name), namespace)?;
        written.push(name);
    }

    let index_name = PathBuf::from("index.json");
    write_json(
        &out_dir.join(&index_name),
        &IndexDocument {
            index: &merged.index,
            references: &merged.references,
        },
    )?;
    written.push(index_name);

    Ok(written)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), BuildError> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| BuildError::OutputWrite {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;
    std::fs::write(path, json).map_err(|source| BuildError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
