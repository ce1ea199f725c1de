//! Filesystem block store.
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/version          format marker, written by `init`
//! <root>/blocks/ab/cdef…  one file per object, sharded by first hex byte
//! ```
//!
//! Each block file holds a one-byte [`ObjectKind`] tag followed by the raw
//! object data.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tempreg_types::ObjectId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

const VERSION_FILE: &str = "version";
const BLOCKS_DIR: &str = "blocks";
const FORMAT_VERSION: &str = "tempreg-blocks-v1";

/// Block store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Initialize a new store at `root`.
    ///
    /// `root` may exist but must not already hold a store.
    pub fn init(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        if root.join(VERSION_FILE).exists() {
            return Err(StoreError::AlreadyInitialized(root));
        }
        fs::create_dir_all(root.join(BLOCKS_DIR))?;
        fs::write(root.join(VERSION_FILE), FORMAT_VERSION)?;
        debug!(root = %root.display(), "initialized block store");
        Ok(Self { root })
    }

    /// Open a store previously created with [`FsObjectStore::init`].
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        match fs::read_to_string(root.join(VERSION_FILE)) {
            Ok(v) if v.trim() == FORMAT_VERSION => Ok(Self { root }),
            Ok(_) => Err(StoreError::NotInitialized(root)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotInitialized(root)),
            Err(e) => Err(e.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn block_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        self.root.join(BLOCKS_DIR).join(&hex[..2]).join(&hex[2..])
    }
}

impl ObjectStore for FsObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let raw = match fs::read(self.block_path(id)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let (tag, data) = raw.split_first().ok_or_else(|| StoreError::CorruptObject {
            id: *id,
            reason: "empty block file".into(),
        })?;
        let kind = ObjectKind::from_tag(*tag).ok_or_else(|| StoreError::CorruptObject {
            id: *id,
            reason: format!("unknown kind tag {tag}"),
        })?;
        let object = StoredObject::new(kind, data.to_vec());
        let computed = object.compute_id();
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        Ok(Some(object))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let path = self.block_path(&id);
        if path.exists() {
            return Ok(id);
        }
        let shard = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(shard)?;

        let mut tmp = NamedTempFile::new_in(shard)?;
        tmp.write_all(&[object.kind.tag()])?;
        tmp.write_all(&object.data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.block_path(id).exists())
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        match fs::remove_file(self.block_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Blob;

    #[test]
    fn init_then_open() {
        let dir = tempfile::tempdir().unwrap();
        FsObjectStore::init(dir.path()).unwrap();
        assert!(FsObjectStore::open(dir.path()).is_ok());
    }

    #[test]
    fn init_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        FsObjectStore::init(dir.path()).unwrap();
        assert!(matches!(
            FsObjectStore::init(dir.path()),
            Err(StoreError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn open_without_init_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            FsObjectStore::open(dir.path()),
            Err(StoreError::NotInitialized(_))
        ));
    }

    #[test]
    fn write_read_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::init(dir.path()).unwrap();
        let obj = Blob::new(b"company,name\nmoog,sub 37\n".to_vec()).to_stored_object();
        let id = store.write(&obj).unwrap();

        let reopened = FsObjectStore::open(dir.path()).unwrap();
        assert_eq!(reopened.read(&id).unwrap(), Some(obj));
    }

    #[test]
    fn write_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::init(dir.path()).unwrap();
        let obj = Blob::new(b"same".to_vec()).to_stored_object();
        assert_eq!(store.write(&obj).unwrap(), store.write(&obj).unwrap());
    }

    #[test]
    fn tampered_block_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::init(dir.path()).unwrap();
        let id = store.write(&Blob::new(b"original".to_vec()).to_stored_object()).unwrap();
        let mut raw = vec![ObjectKind::Blob.tag()];
        raw.extend_from_slice(b"tampered");
        fs::write(store.block_path(&id), raw).unwrap();
        assert!(matches!(store.read(&id), Err(StoreError::HashMismatch { .. })));
    }

    #[test]
    fn delete_and_missing_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::init(dir.path()).unwrap();
        let id = store.write(&Blob::new(b"gone".to_vec()).to_stored_object()).unwrap();
        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(store.read(&id).unwrap().is_none());
    }
}
