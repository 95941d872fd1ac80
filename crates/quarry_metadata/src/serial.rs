//! JSON (de)serialization of metadata documents.
//!
//! Unit metadata is persisted as JSON, both as cached artifacts inside the
//! project-level cache and as final output documents. Byte-level helpers
//! exist so the cache can wrap the payload in its validated artifact format.

use crate::item::UnitMetadata;
use std::path::{Path, PathBuf};

/// Errors from reading or writing metadata documents.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    /// An I/O error occurred while reading or writing a document.
    #[error("metadata I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid metadata JSON.
    #[error("malformed metadata document: {reason}")]
    Malformed {
        /// Description of the parse failure.
        reason: String,
    },
}

/// Serializes a unit's metadata tree to JSON bytes.
pub fn to_bytes(unit: &UnitMetadata) -> Result<Vec<u8>, SerialError> {
    serde_json::to_vec(unit).map_err(|e| SerialError::Malformed {
        reason: e.to_string(),
    })
}

/// Deserializes a unit's metadata tree from JSON bytes.
pub fn from_bytes(bytes: &[u8]) -> Result<UnitMetadata, SerialError> {
    serde_json::from_slice(bytes).map_err(|e| SerialError::Malformed {
        reason: e.to_string(),
    })
}

/// Writes a unit's metadata tree to a JSON document on disk.
pub fn write_document(path: &Path, unit: &UnitMetadata) -> Result<(), SerialError> {
    let bytes = to_bytes(unit)?;
    std::fs::write(path, bytes).map_err(|e| SerialError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reads a unit's metadata tree from a JSON document on disk.
pub fn read_document(path: &Path) -> Result<UnitMetadata, SerialError> {
    let bytes = std::fs::read(path).map_err(|e| SerialError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{MetadataItem, TypeKind};

    fn sample_unit() -> UnitMetadata {
        let mut unit = UnitMetadata::new("/w/p1.csproj");
        unit.namespaces.push(
            MetadataItem::namespace("Acme")
                .with_child(MetadataItem::new_type("Widget", TypeKind::Class, "a.cs")),
        );
        unit
    }

    #[test]
    fn bytes_roundtrip() {
        let unit = sample_unit();
        let bytes = to_bytes(&unit).unwrap();
        let back = from_bytes(&bytes).unwrap();
        assert_eq!(back, unit);
    }

    #[test]
    fn document_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p1.json");
        let unit = sample_unit();
        write_document(&path, &unit).unwrap();
        let back = read_document(&path).unwrap();
        assert_eq!(back, unit);
    }

    #[test]
    fn read_missing_document_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SerialError::Io { .. }));
    }

    #[test]
    fn read_corrupt_document_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let err = read_document(&path).unwrap_err();
        assert!(matches!(err, SerialError::Malformed { .. }));
    }
}
