//! Versioned dataset repository for the temporary registry.
//!
//! A repository lives in two directories: a block store holding dataset
//! bodies and version documents, and a repo directory holding the
//! configuration file and the ref log (the per-dataset list of versions and
//! their publish status).
//!
//! # Lifecycle
//!
//! 1. [`setup`] performs one-time initialization of both directories.
//! 2. [`Instance::open`] binds a live handle to them.
//! 3. [`Repo::save`] records dataset versions; [`Repo::set_publish_status`]
//!    marks a version for the registry to advertise.
//!
//! # Modules
//!
//! - [`config`]: Persisted configuration (TOML)
//! - [`dataset`]: Dataset documents, metadata, and CSV structure
//! - [`names`]: Dataset and owner name validation
//! - [`refs`]: The ref log: versions and publish flags per dataset
//! - [`repo`]: Save/read operations over store + ref log
//! - [`setup`]: One-time repository setup
//! - [`instance`]: Live handle bundling repo, node, and config

pub mod config;
pub mod dataset;
pub mod error;
pub mod instance;
pub mod names;
pub mod refs;
pub mod repo;
pub mod setup;

pub use config::{
    ApiConfig, Config, P2pConfig, ProfileConfig, RegistryConfig, RemoteConfig, RpcConfig,
    CONFIG_FILE,
};
pub use dataset::{parse_csv, Commit, Dataset, Meta, Structure};
pub use error::{RepoError, RepoResult};
pub use instance::{Instance, InstanceOptions, Node};
pub use names::{validate_dataset_name, validate_username};
pub use refs::{DatasetHistory, RefStore, VersionEntry, REFS_FILE};
pub use repo::{Repo, SaveParams, ME};
pub use setup::{setup, SetupParams};
