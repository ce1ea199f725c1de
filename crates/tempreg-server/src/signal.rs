use std::future::Future;
use std::io;

use tokio::signal;
use tracing::warn;

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        tokio::select! {
            _ = ctrl_c() => {},
            _ = terminate() => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await;
    }
}

async fn ctrl_c() {
    wait_or_park("Ctrl+C", signal::ctrl_c()).await;
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    let wait = async {
        signal(SignalKind::terminate())?.recv().await;
        Ok::<(), io::Error>(())
    };
    wait_or_park("SIGTERM", wait).await;
}

/// Await a signal. A handler that cannot be installed never fires, so the
/// other signal still decides when to shut down.
async fn wait_or_park(name: &str, wait: impl Future<Output = io::Result<()>>) {
    if let Err(err) = wait.await {
        warn!(?err, "failed to install {name} handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn received_signal_resolves() {
        let done = tokio::time::timeout(
            Duration::from_millis(200),
            wait_or_park("test", async { Ok(()) }),
        )
        .await;
        assert!(done.is_ok());
    }

    #[tokio::test]
    async fn failed_install_never_resolves() {
        let done = tokio::time::timeout(
            Duration::from_millis(50),
            wait_or_park("test", async { Err(io::Error::other("denied")) }),
        )
        .await;
        assert!(done.is_err());
    }
}
