use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tempreg_harness::{ActionRegistry, Environment};
use tempreg_registry::Registry;
use tempreg_repo::Instance;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{handler, sim};

/// Shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub instance: Instance,
    pub registry: Registry,
    pub actions: ActionRegistry,
    /// Flips to `true` when the server starts shutting down. Handed to
    /// actions as their cancellation flag.
    pub shutdown: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(
        env: &Environment,
        actions: ActionRegistry,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            instance: env.instance.clone(),
            registry: env.registry.clone(),
            actions,
            shutdown,
        }
    }
}

/// Build the axum router with the registry routes and the action dispatcher.
///
/// Inbound transfers on `/remote/dataset` carry no body limit of their own;
/// the remote's `accept_size_max` decides.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handler::health))
        .route("/info", get(handler::info))
        .route(
            "/registry/profiles",
            get(handler::list_profiles).post(handler::put_profile),
        )
        .route("/registry/search", get(handler::search))
        .route("/remote/refs", get(handler::remote_refs))
        .route(
            "/remote/dataset",
            get(handler::get_dataset)
                .post(handler::receive_dataset)
                .delete(handler::remove_dataset)
                .layer(DefaultBodyLimit::disable()),
        )
        .route("/sim/action", get(sim::sim_action).post(sim::sim_action))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
