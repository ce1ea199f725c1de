use std::path::PathBuf;

use tempreg_types::ObjectId;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {id}: computed {computed}")]
    HashMismatch { id: ObjectId, computed: ObjectId },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The object data is malformed or cannot be decoded.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// Attempted to write a null object ID.
    #[error("cannot store object with null ID")]
    NullObjectId,

    /// `init` was called on a directory that already holds a store.
    #[error("block store already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    /// A content path is not of the form `/ipfs/<hex>`.
    #[error("invalid content path: {0}")]
    Path(#[from] tempreg_types::TypeError),

    /// `open` was called on a directory without a store.
    #[error("no block store at {}", .0.display())]
    NotInitialized(PathBuf),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
