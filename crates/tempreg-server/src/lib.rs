//! HTTP surface and lifecycle of the temporary registry.
//!
//! [`Lifecycle`] bootstraps an [`Environment`](tempreg_harness::Environment),
//! serves the registry routes and `/sim/action` with [`RegistryServer`], waits
//! for a termination signal and removes the temporary root.

pub mod config;
pub mod error;
pub mod handler;
pub mod lifecycle;
pub mod response;
pub mod router;
pub mod server;
pub mod signal;
pub mod sim;

pub use config::{ServerConfig, DEFAULT_PORT};
pub use error::{ServerError, ServerResult};
pub use handler::{HealthResponse, InfoResponse};
pub use lifecycle::{Lifecycle, LifecycleOptions, LifecycleState, Running, Summary};
pub use response::{Envelope, Meta};
pub use router::{build_router, AppState};
pub use server::{RegistryServer, ServerHandle};
pub use signal::shutdown_signal;
