//! Ephemeral registry harness.
//!
//! Builds a throwaway repository and registry, seeds it with known data,
//! and runs named simulation actions against it.
//!
//! Startup runs in order, and any failure is fatal:
//!
//! 1. [`Provisioner::provision`] creates the temporary root and identity.
//! 2. [`initialize`] sets up the repository and opens an [`Instance`](tempreg_repo::Instance).
//! 3. [`assemble`] composes the [`Registry`](tempreg_registry::Registry).
//! 4. [`seed`] runs the seed actions.
//!
//! [`bootstrap`] performs all four. Afterwards, [`ActionRegistry::dispatch`]
//! runs actions on demand.

pub mod actions;
pub mod assemble;
pub mod context;
pub mod env;
pub mod error;
pub mod initialize;
pub mod provision;
pub mod seed;
pub mod synths;

pub use actions::{ActionError, ActionRegistry, ActionRegistryBuilder, SimAction};
pub use assemble::assemble;
pub use context::ActionContext;
pub use env::{bootstrap, Environment};
pub use error::{HarnessError, HarnessResult};
pub use initialize::initialize;
pub use provision::{
    apply_ephemeral_defaults, Cleanup, Provisioned, Provisioner, TempPaths, EPHEMERAL_API_ADDRESS,
    TEMP_PREFIX,
};
pub use seed::{seed, SEED_ACTIONS};
pub use synths::{
    append_synths_dataset, create_synths_dataset, SaveAndPublish, APPEND_SYNTHS, CREATE_SYNTHS,
};
