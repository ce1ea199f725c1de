//! Content-addressed block storage for the temporary registry.
//!
//! Every piece of repository data -- dataset bodies and dataset version
//! documents -- is stored as an immutable object identified by its BLAKE3
//! hash (domain-separated by object kind).
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`FsObjectStore`] -- sharded directory of block files, the backend an
//!   environment's block-store path is initialized with
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Concurrent reads are always safe.
//! 3. The store never interprets object contents.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, ObjectKind, StoredObject};
pub use traits::ObjectStore;
