//! Temporary root, identity, and configuration for one harness run.
//!
//! ```text
//! <tmp>/temp_repo_registryXXXXXX/
//!     ipfs/   block store
//!     qri/    repo: config.toml, refs.bin
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempreg_crypto::{CryptoSource, KeyGenerator};
use tempreg_registry::UNBOUNDED;
use tempreg_repo::{Config, RemoteConfig, CONFIG_FILE};
use tracing::{info, info_span, warn, Span};

use crate::error::{HarnessError, HarnessResult};

/// Prefix of the temporary root directory name.
pub const TEMP_PREFIX: &str = "temp_repo_registry";
pub const BLOCK_STORE_DIR: &str = "ipfs";
pub const REPO_DIR: &str = "qri";

/// Listen address that can never be bound, so an ephemeral node cannot
/// join a live network by accident.
pub const EPHEMERAL_API_ADDRESS: &str = "/ip4/127.0.0.1/tcp/99999";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TempPaths {
    pub root: PathBuf,
    pub block_store: PathBuf,
    pub repo: PathBuf,
}

impl TempPaths {
    fn under(root: PathBuf) -> Self {
        Self {
            block_store: root.join(BLOCK_STORE_DIR),
            repo: root.join(REPO_DIR),
            root,
        }
    }
}

/// Removes the temporary root. Consumed by [`Cleanup::run`], so it runs at
/// most once.
#[derive(Debug)]
#[must_use = "the temporary root is only removed by Cleanup::run"]
pub struct Cleanup {
    root: PathBuf,
}

impl Cleanup {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Best-effort removal of the whole tree. Failures are logged.
    pub fn run(self) {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => info!(root = %self.root.display(), "removed registry data"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(root = %self.root.display(), error = %e, "removing registry data"),
        }
    }
}

/// Output of [`Provisioner::provision`].
pub struct Provisioned {
    pub paths: TempPaths,
    pub config: Config,
    pub generator: Arc<dyn KeyGenerator>,
    pub cleanup: Cleanup,
}

impl std::fmt::Debug for Provisioned {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioned")
            .field("paths", &self.paths)
            .field("peername", &self.config.profile.peername)
            .finish_non_exhaustive()
    }
}

/// Creates the temporary root and an identity for a new environment.
pub struct Provisioner {
    generator: Arc<dyn KeyGenerator>,
    base_dir: Option<PathBuf>,
    span: Span,
}

impl Default for Provisioner {
    fn default() -> Self {
        Self::new()
    }
}

impl Provisioner {
    pub fn new() -> Self {
        Self {
            generator: Arc::new(CryptoSource::new()),
            base_dir: None,
            span: info_span!("provision"),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn KeyGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Create the temporary root under `dir` instead of the system temp dir.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn provision(&self) -> HarnessResult<Provisioned> {
        let _enter = self.span.enter();

        let builder = {
            let mut b = tempfile::Builder::new();
            b.prefix(TEMP_PREFIX);
            b
        };
        let dir = match &self.base_dir {
            Some(base) => builder.tempdir_in(base),
            None => builder.tempdir(),
        }?;
        let root = dir.keep();
        info!(root = %root.display(), "temp registry location");

        let cleanup = Cleanup { root: root.clone() };
        let paths = TempPaths::under(root);
        if let Err(e) = create_subtrees(&paths) {
            cleanup.run();
            return Err(HarnessError::Provision(e));
        }

        let mut config = Config::default();
        config.set_path(paths.repo.join(CONFIG_FILE));
        config.ensure_identity(self.generator.as_ref());
        apply_ephemeral_defaults(&mut config);

        Ok(Provisioned {
            paths,
            config,
            generator: Arc::clone(&self.generator),
            cleanup,
        })
    }
}

fn create_subtrees(paths: &TempPaths) -> std::io::Result<()> {
    fs::create_dir_all(&paths.block_store)?;
    fs::create_dir_all(&paths.repo)?;
    Ok(())
}

/// Local-only settings: no reachable listeners, no upstream registry, and a
/// remote that accepts any transfer and allows removals.
pub fn apply_ephemeral_defaults(config: &mut Config) {
    config.api.address = EPHEMERAL_API_ADDRESS.into();
    config.rpc.enabled = false;
    config.p2p.enabled = false;
    config.registry.location.clear();
    config.remote = Some(RemoteConfig {
        enabled: true,
        accept_size_max: UNBOUNDED,
        accept_timeout_ms: UNBOUNDED,
        require_all_blocks: false,
        allow_removes: true,
    });
}
