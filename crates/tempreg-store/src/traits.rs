use tempreg_types::ObjectId;

use crate::error::StoreResult;
use crate::object::StoredObject;

/// Content-addressed block store.
///
/// Blocks are immutable: writing the same kind and bytes twice yields the same
/// id and leaves a single copy. Datasets and refs name blocks by content path
/// (`/ipfs/<hex>`); the `*_path` helpers accept that form directly.
pub trait ObjectStore: Send + Sync {
    /// `Ok(None)` if the block does not exist.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Idempotent.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Returns `true` if the block existed.
    fn delete(&self, id: &ObjectId) -> StoreResult<bool>;

    fn read_path(&self, path: &str) -> StoreResult<Option<StoredObject>> {
        self.read(&ObjectId::from_path(path)?)
    }

    fn exists_path(&self, path: &str) -> StoreResult<bool> {
        self.exists(&ObjectId::from_path(path)?)
    }

    /// Write `object` and return its content path.
    fn write_path(&self, object: &StoredObject) -> StoreResult<String> {
        Ok(self.write(object)?.to_path())
    }
}
