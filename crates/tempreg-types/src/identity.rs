use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identity of a node in the registry network.
///
/// A `PeerId` is derived deterministically from a node's public key. The
/// same key always produces the same peer id. Profiles share the id of the
/// node that owns them.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PeerId {
    hash: [u8; 32],
}

impl PeerId {
    /// Derive a `PeerId` from raw public key bytes.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"tempreg-peer-v1:");
        hasher.update(public_key);
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Create a random `PeerId` for tests.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self::from_public_key(&bytes)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("peer:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self { hash: arr })
    }
}

impl From<PeerId> for String {
    fn from(id: PeerId) -> Self {
        id.to_hex()
    }
}

impl TryFrom<String> for PeerId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self.short_id())
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        let a = PeerId::from_public_key(&[42; 32]);
        let b = PeerId::from_public_key(&[42; 32]);
        assert_eq!(a, b);
    }

    #[test]
    fn different_keys_produce_different_ids() {
        assert_ne!(PeerId::from_public_key(&[1; 32]), PeerId::from_public_key(&[2; 32]));
    }

    #[test]
    fn ephemeral_ids_are_unique() {
        assert_ne!(PeerId::ephemeral(), PeerId::ephemeral());
    }

    #[test]
    fn hex_roundtrip() {
        let id = PeerId::from_public_key(&[9; 32]);
        assert_eq!(PeerId::from_hex(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn serializes_as_hex_string() {
        let id = PeerId::from_public_key(&[5; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        assert_eq!(serde_json::from_str::<PeerId>(&json).unwrap(), id);
    }

    #[test]
    fn short_id_format() {
        let short = PeerId::from_public_key(&[0; 32]).short_id();
        assert!(short.starts_with("peer:"));
        assert_eq!(short.len(), 13);
    }
}
