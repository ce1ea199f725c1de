use tempreg_types::ObjectId;

/// Domain-separated BLAKE3 content hasher.
///
/// The domain tag is prepended to every hash, so a body block and a dataset
/// document with identical bytes get different ids.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Raw blocks (dataset bodies).
    pub const BLOCK: Self = Self {
        domain: "tempreg-block-v1",
    };
    /// Dataset version documents.
    pub const DATASET: Self = Self {
        domain: "tempreg-dataset-v1",
    };

    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(ContentHasher::BLOCK.hash(b"abc"), ContentHasher::BLOCK.hash(b"abc"));
    }

    #[test]
    fn domains_separate_hashes() {
        assert_ne!(ContentHasher::BLOCK.hash(b"same"), ContentHasher::DATASET.hash(b"same"));
    }
}
