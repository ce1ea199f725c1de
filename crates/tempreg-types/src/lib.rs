//! Foundation types for the temporary registry.
//!
//! Every other `tempreg` crate depends on this one.
//!
//! # Key Types
//!
//! - [`ObjectId`]: Content-addressed identifier (BLAKE3 hash) of a stored block
//! - [`PeerId`]: Identity of a node, derived from its public key
//! - [`DatasetRef`]: Owner + name + profile id + content path of one dataset version

pub mod dsref;
pub mod error;
pub mod identity;
pub mod object;

pub use dsref::DatasetRef;
pub use error::TypeError;
pub use identity::PeerId;
pub use object::ObjectId;
