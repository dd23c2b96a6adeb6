//! Instance identifiers
//!
//! An id is `<hash>_<n>`: the first 16 hex digits of the SHA-256 of the
//! source URI, then the slot number within that hash's bucket.

use super::CanvasError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

const HASH_LEN: usize = 16;

/// Identifier of a live query instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId {
    hash: String,
    slot: usize,
}

impl InstanceId {
    pub fn new(hash: impl Into<String>, slot: usize) -> Self {
        InstanceId {
            hash: hash.into(),
            slot,
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.hash, self.slot)
    }
}

impl FromStr for InstanceId {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hash, slot) = s
            .rsplit_once('_')
            .ok_or_else(|| CanvasError::InvalidId(s.to_string()))?;
        let slot = slot
            .parse()
            .map_err(|_| CanvasError::InvalidId(s.to_string()))?;
        if hash.is_empty() {
            return Err(CanvasError::InvalidId(s.to_string()));
        }
        Ok(InstanceId::new(hash, slot))
    }
}

/// Bucket key for a source URI
pub fn source_hash(uri: &str) -> String {
    let digest = Sha256::digest(uri.as_bytes());
    let mut hex = String::with_capacity(HASH_LEN);
    for byte in digest.iter().take(HASH_LEN / 2) {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_hash() {
        // sha256("abc") = ba7816bf8f01cfea...
        assert_eq!(source_hash("abc"), "ba7816bf8f01cfea");
        assert_eq!(source_hash("abc"), source_hash("abc"));
        assert_ne!(source_hash("abc"), source_hash("abd"));
    }

    #[test]
    fn test_round_trip() {
        let id = InstanceId::new("ba7816bf8f01cfea", 3);
        assert_eq!(id.to_string(), "ba7816bf8f01cfea_3");
        assert_eq!("ba7816bf8f01cfea_3".parse::<InstanceId>().unwrap(), id);
    }

    #[test]
    fn test_invalid_ids() {
        assert!("nounderscore".parse::<InstanceId>().is_err());
        assert!("abc_x".parse::<InstanceId>().is_err());
        assert!("_3".parse::<InstanceId>().is_err());
    }
}
