//! Registry for the temporary registry.
//!
//! A [`Registry`] bundles what the HTTP layer serves:
//!
//! - [`Remote`]: the remote-sync endpoint, governed by a [`RemotePolicy`]
//! - [`Profiles`]: the profile store ([`MemProfiles`] in memory)
//! - [`Searchable`]: the search facade ([`RepoSearch`] scans the local repo)
//!
//! References are completed through a [`Resolver`]; [`SequentialResolver`]
//! chains several.

pub mod error;
pub mod policy;
pub mod profiles;
pub mod registry;
pub mod remote;
pub mod resolve;
pub mod search;

pub use error::{RegistryError, RegistryResult};
pub use policy::{RemotePolicy, UNBOUNDED};
pub use profiles::{MemProfiles, Profile, Profiles};
pub use registry::Registry;
pub use remote::{DatasetPush, PushBlock, Remote};
pub use resolve::{LocalResolver, Resolver, SequentialResolver};
pub use search::{RepoSearch, SearchParams, SearchResult, Searchable, DEFAULT_LIMIT};
