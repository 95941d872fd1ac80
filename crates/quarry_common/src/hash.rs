//! Content hashing for artifact integrity checks and cache entry naming.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 content hash.
///
/// Used to checksum serialized metadata artifacts and to derive stable
/// directory names for cache entries from their scope keys. Two byte
/// sequences with the same `ContentHash` are assumed identical.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes the hash of a byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data).to_le_bytes())
    }

    /// Computes the hash of a string key, e.g. a cache scope key.
    pub fn from_key(key: &str) -> Self {
        Self::from_bytes(key.as_bytes())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(
            ContentHash::from_bytes(b"quarry"),
            ContentHash::from_bytes(b"quarry")
        );
    }

    #[test]
    fn different_inputs_differ() {
        assert_ne!(
            ContentHash::from_bytes(b"left"),
            ContentHash::from_bytes(b"right")
        );
    }

    #[test]
    fn key_hash_matches_byte_hash() {
        assert_eq!(
            ContentHash::from_key("out/api|a.csproj"),
            ContentHash::from_bytes(b"out/api|a.csproj")
        );
    }

    #[test]
    fn display_is_hex() {
        let s = ContentHash::from_bytes(b"display").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::from_bytes(b"roundtrip");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
