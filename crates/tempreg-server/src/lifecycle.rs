//! Lifecycle controller: bootstrap, serve until signalled, shut down, clean up.
//!
//! ```text
//! Starting ──(bootstrap ok)──▶ Serving ──(signal)──▶ ShuttingDown ──▶ Terminated
//!     └──────────────(fatal error)──────────────────────────────────────▶┘
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempreg_harness::{
    bootstrap, ActionRegistry, Environment, HarnessError, HarnessResult, Provisioner,
    SEED_ACTIONS,
};
use tempreg_repo::Instance;
use tracing::{error, info, info_span, warn, Instrument, Span};

use crate::config::ServerConfig;
use crate::router::{build_router, AppState};
use crate::server::{RegistryServer, ServerHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Starting,
    Serving,
    ShuttingDown,
    Terminated,
}

#[derive(Clone, Debug)]
pub struct LifecycleOptions {
    pub server: ServerConfig,
    /// Leave the temporary root on disk at shutdown.
    pub no_cleanup: bool,
    /// Run the seed actions before serving.
    pub seed: bool,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            no_cleanup: false,
            seed: true,
        }
    }
}

/// What a finished run left behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub root: PathBuf,
    pub cleaned_up: bool,
    pub state: LifecycleState,
}

pub struct Lifecycle {
    options: LifecycleOptions,
    provisioner: Provisioner,
    actions: ActionRegistry,
    span: Span,
}

impl Lifecycle {
    pub fn new(options: LifecycleOptions) -> Self {
        Self {
            options,
            provisioner: Provisioner::new(),
            actions: ActionRegistry::standard(),
            span: info_span!("lifecycle"),
        }
    }

    pub fn with_provisioner(mut self, provisioner: Provisioner) -> Self {
        self.provisioner = provisioner;
        self
    }

    pub fn with_actions(mut self, actions: ActionRegistry) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Bootstrap the environment and start the listener.
    ///
    /// Bootstrap failures are returned and nothing is served. A listener that
    /// fails to bind is only logged: the returned [`Running`] still waits for
    /// its signal and cleans up.
    pub async fn start(self) -> HarnessResult<Running> {
        let Self {
            options,
            provisioner,
            actions,
            span,
        } = self;

        async move {
            let seed_keys: &[&str] = if options.seed { SEED_ACTIONS } else { &[] };
            let env = bootstrap(&provisioner, &actions, seed_keys).await?;

            let server = RegistryServer::new(options.server.clone());
            let state = AppState::new(&env, actions, server.shutdown_receiver());
            let handle = match server.spawn(build_router(state)).await {
                Ok(handle) => {
                    info!("serving on: {}", handle.local_addr());
                    Some(handle)
                }
                Err(e) => {
                    error!("serving: {e}");
                    None
                }
            };

            Ok::<_, HarnessError>(Running {
                state: LifecycleState::Serving,
                env,
                server: handle,
                no_cleanup: options.no_cleanup,
                span: Span::current(),
            })
        }
        .instrument(span)
        .await
    }

    /// Start, serve until `signal` resolves, then shut down.
    pub async fn run<F>(self, signal: F) -> HarnessResult<Summary>
    where
        F: Future<Output = ()>,
    {
        let mut running = self.start().await?;
        running.serve_until(signal).await;
        Ok(running.shutdown().await)
    }
}

/// A bootstrapped environment, serving if its listener bound.
pub struct Running {
    state: LifecycleState,
    env: Environment,
    server: Option<ServerHandle>,
    no_cleanup: bool,
    span: Span,
}

impl std::fmt::Debug for Running {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Running")
            .field("state", &self.state)
            .field("root", &self.env.paths.root)
            .field("local_addr", &self.local_addr())
            .finish_non_exhaustive()
    }
}

impl Running {
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// `None` when the listener failed to bind.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(ServerHandle::local_addr)
    }

    pub fn root(&self) -> &Path {
        &self.env.paths.root
    }

    pub fn instance(&self) -> &Instance {
        &self.env.instance
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Block until `signal` resolves.
    pub async fn serve_until<F>(&mut self, signal: F)
    where
        F: Future<Output = ()>,
    {
        signal.await;
        self.span.in_scope(|| info!("Received signal, shutting down..."));
        self.state = LifecycleState::ShuttingDown;
    }

    /// Close the listener, then remove the temporary root unless cleanup is
    /// disabled.
    pub async fn shutdown(self) -> Summary {
        let Self {
            env,
            server,
            no_cleanup,
            span,
            ..
        } = self;

        async move {
            if let Some(handle) = server {
                if let Err(e) = handle.shutdown().await {
                    warn!("closing server: {e}");
                }
            }

            let Environment { paths, cleanup, .. } = env;
            let cleaned_up = if no_cleanup {
                info!(root = %paths.root.display(), "keeping registry data");
                drop(cleanup);
                false
            } else {
                info!("removing registry data");
                cleanup.run();
                true
            };
            info!("done");

            Summary {
                root: paths.root,
                cleaned_up,
                state: LifecycleState::Terminated,
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(no_cleanup: bool) -> LifecycleOptions {
        LifecycleOptions {
            server: ServerConfig::new("127.0.0.1", 0).unwrap(),
            no_cleanup,
            seed: true,
        }
    }

    #[tokio::test]
    async fn start_serves_seeded_environment() {
        let base = tempfile::tempdir().unwrap();
        let running = Lifecycle::new(options(false))
            .with_provisioner(Provisioner::new().with_base_dir(base.path()))
            .start()
            .await
            .unwrap();
        assert_eq!(running.state(), LifecycleState::Serving);
        assert!(running.local_addr().is_some());
        assert_eq!(running.environment().seeded.len(), 1);

        let root = running.root().to_path_buf();
        let summary = running.shutdown().await;
        assert_eq!(summary.state, LifecycleState::Terminated);
        assert!(summary.cleaned_up);
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn no_seed_starts_empty() {
        let base = tempfile::tempdir().unwrap();
        let running = Lifecycle::new(LifecycleOptions {
            seed: false,
            ..options(false)
        })
        .with_provisioner(Provisioner::new().with_base_dir(base.path()))
        .start()
        .await
        .unwrap();
        assert!(running.instance().repo().list().unwrap().is_empty());
        running.shutdown().await;
    }

    #[tokio::test]
    async fn bind_failure_still_waits_and_cleans_up() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = tempfile::tempdir().unwrap();
        let mut running = Lifecycle::new(LifecycleOptions {
            server: ServerConfig {
                bind_addr: taken.local_addr().unwrap(),
            },
            ..options(false)
        })
        .with_provisioner(Provisioner::new().with_base_dir(base.path()))
        .start()
        .await
        .unwrap();
        assert!(running.local_addr().is_none());

        running.serve_until(async {}).await;
        assert_eq!(running.state(), LifecycleState::ShuttingDown);
        let summary = running.shutdown().await;
        assert!(summary.cleaned_up);
        assert!(!summary.root.exists());
    }

    #[tokio::test]
    async fn failed_seed_is_fatal_and_leaves_nothing() {
        let base = tempfile::tempdir().unwrap();
        let err = Lifecycle::new(options(false))
            .with_provisioner(Provisioner::new().with_base_dir(base.path()))
            .with_actions(ActionRegistry::builder().build())
            .start()
            .await
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(std::fs::read_dir(base.path()).unwrap().count(), 0);
    }
}
