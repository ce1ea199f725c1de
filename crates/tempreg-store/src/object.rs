use serde::{Deserialize, Serialize};
use tempreg_crypto::ContentHasher;
use tempreg_types::ObjectId;

use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Raw content (dataset body bytes).
    Blob,
    /// Serialized dataset version document.
    Dataset,
}

impl ObjectKind {
    /// Single-byte tag used by on-disk backends.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Blob => 1,
            Self::Dataset => 2,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Blob),
            2 => Some(Self::Dataset),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Dataset => write!(f, "dataset"),
        }
    }
}

/// A stored object: kind tag + serialized data + cached size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
    pub size: u64,
}

impl StoredObject {
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        let hasher = match self.kind {
            ObjectKind::Blob => &ContentHasher::BLOCK,
            ObjectKind::Dataset => &ContentHasher::DATASET,
        };
        hasher.hash(&self.data)
    }
}

/// Raw content object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Blob {
            return Err(StoreError::CorruptObject {
                id: obj.compute_id(),
                reason: format!("expected blob, got {}", obj.kind),
            });
        }
        Ok(Self {
            data: obj.data.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_roundtrip() {
        for kind in [ObjectKind::Blob, ObjectKind::Dataset] {
            assert_eq!(ObjectKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ObjectKind::from_tag(0), None);
    }

    #[test]
    fn kind_changes_id() {
        let blob = StoredObject::new(ObjectKind::Blob, b"x".to_vec());
        let doc = StoredObject::new(ObjectKind::Dataset, b"x".to_vec());
        assert_ne!(blob.compute_id(), doc.compute_id());
    }

    #[test]
    fn blob_rejects_dataset_object() {
        let doc = StoredObject::new(ObjectKind::Dataset, b"{}".to_vec());
        assert!(matches!(
            Blob::from_stored_object(&doc),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn size_is_cached() {
        assert_eq!(Blob::new(b"12345".to_vec()).to_stored_object().size, 5);
    }
}
