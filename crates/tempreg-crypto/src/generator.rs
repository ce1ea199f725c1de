use tempreg_types::PeerId;

use crate::signer::SigningKey;

/// Source of fresh node identities.
///
/// Provisioning calls this at most once per environment; tests substitute
/// their own implementation to get reproducible identities.
pub trait KeyGenerator: Send + Sync {
    /// Mint a private key (hex) and the peer id derived from it.
    fn generate_private_key_and_peer_id(&self) -> (String, PeerId);

    /// Human-readable nickname for a peer. Must be deterministic.
    fn generate_nickname(&self, peer_id: &PeerId) -> String;
}

const ADJECTIVES: &[&str] = &[
    "amber", "brisk", "calm", "dapper", "eager", "fuzzy", "gentle", "hollow",
    "icy", "jolly", "keen", "lucid", "mellow", "nimble", "odd", "plucky",
];

const NOUNS: &[&str] = &[
    "anchor", "badger", "comet", "delta", "ember", "falcon", "glacier", "harbor",
    "island", "jackal", "kettle", "lantern", "meadow", "nebula", "orchid", "pebble",
];

/// Generator backed by the operating system RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct CryptoSource;

impl CryptoSource {
    pub fn new() -> Self {
        Self
    }
}

impl KeyGenerator for CryptoSource {
    fn generate_private_key_and_peer_id(&self) -> (String, PeerId) {
        let key = SigningKey::generate();
        let peer_id = key.verifying_key().to_peer_id();
        (key.to_hex(), peer_id)
    }

    fn generate_nickname(&self, peer_id: &PeerId) -> String {
        let bytes = peer_id.as_bytes();
        let adjective = ADJECTIVES[bytes[0] as usize % ADJECTIVES.len()];
        let noun = NOUNS[bytes[1] as usize % NOUNS.len()];
        format!("{adjective}_{noun}")
    }
}
