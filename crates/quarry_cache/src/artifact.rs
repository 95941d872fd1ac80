//! Validated binary artifact storage for cache entries.
//!
//! Each cached artifact is a binary file with a header containing magic
//! bytes, a format version, and a checksum. File names are freshly
//! generated identifiers, never derived from content: identical content
//! produces different names across rebuilds, and the tier index — not the
//! file name — is the lookup authority.

use std::path::{Path, PathBuf};

use quarry_common::ContentHash;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CacheError;

/// Magic bytes identifying a Quarry cache artifact.
const ARTIFACT_MAGIC: [u8; 4] = *b"QRRY";

/// Current artifact format version. Increment on breaking changes to
/// the header or payload format.
const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Header prepended to every cached artifact for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArtifactHeader {
    /// Magic bytes: must be `b"QRRY"`.
    magic: [u8; 4],

    /// Artifact format version.
    format_version: u32,

    /// Quarry version that produced this artifact.
    tool_version: String,

    /// Content hash of the payload data (for integrity checks).
    checksum: ContentHash,
}

/// Store for the artifacts of one cache entry.
///
/// Rooted at the entry's directory; writes create the directory on demand.
/// Reads validate the header and are fail-safe: corruption results in a
/// cache miss, never an error.
pub struct ArtifactStore {
    /// The cache entry directory holding this entry's artifacts.
    entry_dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at the given cache entry directory.
    pub fn new(entry_dir: &Path) -> Self {
        Self {
            entry_dir: entry_dir.to_path_buf(),
        }
    }

    /// Returns the on-disk path of an artifact file name.
    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.entry_dir.join(file_name)
    }

    /// Writes a payload under a freshly generated file name and returns it.
    pub fn write(
        &self,
        ext: &str,
        data: &[u8],
        tool_version: &str,
    ) -> Result<String, CacheError> {
        std::fs::create_dir_all(&self.entry_dir).map_err(|e| CacheError::Io {
            path: self.entry_dir.clone(),
            source: e,
        })?;

        let file_name = format!("{}.{ext}", Uuid::new_v4().simple());
        let path = self.artifact_path(&file_name);

        let header = ArtifactHeader {
            magic: ARTIFACT_MAGIC,
            format_version: ARTIFACT_FORMAT_VERSION,
            tool_version: tool_version.to_string(),
            checksum: ContentHash::from_bytes(data),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;

        // Layout: 4-byte header length (little-endian) + header + payload
        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + data.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(data);

        std::fs::write(&path, &output).map_err(|e| CacheError::Io { path, source: e })?;

        Ok(file_name)
    }

    /// Reads an artifact, validating its header.
    ///
    /// Returns `None` if the file doesn't exist, the header is invalid,
    /// the format version doesn't match, or the checksum doesn't verify.
    pub fn read(&self, file_name: &str) -> Option<Vec<u8>> {
        let raw = std::fs::read(self.artifact_path(file_name)).ok()?;

        if raw.len() < 4 {
            return None;
        }
        let header_len = u32::from_le_bytes(raw[..4].try_into().ok()?) as usize;
        if raw.len() < 4 + header_len {
            return None;
        }

        let header: ArtifactHeader =
            bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
                .ok()?
                .0;

        if header.magic != ARTIFACT_MAGIC {
            return None;
        }
        if header.format_version != ARTIFACT_FORMAT_VERSION {
            return None;
        }

        let payload = &raw[4 + header_len..];
        if ContentHash::from_bytes(payload) != header.checksum {
            return None;
        }

        Some(payload.to_vec())
    }
}
