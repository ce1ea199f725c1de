use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Owns the shutdown channel of one HTTP listener.
pub struct RegistryServer {
    config: ServerConfig,
    shutdown: watch::Sender<bool>,
}

impl RegistryServer {
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self { config, shutdown }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Observes shutdown. Request handlers use it as their cancellation flag.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Bind and serve `router` on a background task.
    pub async fn spawn(self, router: Router) -> ServerResult<ServerHandle> {
        let addr = self.config.bind_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;
        info!(address = %local_addr, "listener bound");

        let mut shutdown_rx = self.shutdown.subscribe();
        let server = axum::serve(listener, router).with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        });
        let task = tokio::spawn(async move {
            if let Err(err) = server.await {
                warn!(error = %err, "registry server exited with error");
            }
        });

        Ok(ServerHandle {
            address: local_addr,
            task,
            shutdown: self.shutdown,
        })
    }
}

/// A running listener returned by [`RegistryServer::spawn`].
pub struct ServerHandle {
    address: SocketAddr,
    task: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.address
    }

    /// Stop accepting connections and wait for the server task to finish.
    pub async fn shutdown(self) -> ServerResult<()> {
        self.shutdown.send_replace(true);
        self.task
            .await
            .map_err(|e| ServerError::Internal(format!("server task: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    fn loopback() -> ServerConfig {
        ServerConfig::new("127.0.0.1", 0).unwrap()
    }

    #[test]
    fn construction() {
        let server = RegistryServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr.port(), 2500);
        assert!(!*server.shutdown_receiver().borrow());
    }

    #[tokio::test]
    async fn spawn_and_shutdown() {
        let server = RegistryServer::new(loopback());
        let rx = server.shutdown_receiver();
        let handle = server
            .spawn(Router::new().route("/", get(|| async { "hi" })))
            .await
            .unwrap();
        assert_ne!(handle.local_addr().port(), 0);
        handle.shutdown().await.unwrap();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn port_in_use_is_a_bind_error() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();
        let server = RegistryServer::new(ServerConfig { bind_addr: addr });
        match server.spawn(Router::new()).await {
            Err(ServerError::Bind { addr: a, .. }) => assert_eq!(a, addr),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("bind should fail"),
        }
    }
}
