use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempreg_crypto::KeyGenerator;
use tempreg_store::{FsObjectStore, InMemoryObjectStore};
use tempreg_types::PeerId;
use tracing::debug;

use crate::config::{Config, CONFIG_FILE};
use crate::error::{RepoError, RepoResult};
use crate::refs::{RefStore, REFS_FILE};
use crate::repo::Repo;

/// Block store directory used when [`InstanceOptions`] names none.
const DEFAULT_BLOCKS_DIR: &str = "blocks";

#[derive(Clone, Debug, Default)]
pub struct InstanceOptions {
    /// Block store directory. Defaults to `<repo>/blocks`.
    pub block_store_path: Option<PathBuf>,
}

/// The local peer as seen by the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub peer_id: Option<PeerId>,
    pub peername: String,
    /// Whether the node is connected to a network. Always `false` here.
    pub online: bool,
}

impl Node {
    /// A node can serve transfers once it has an identity.
    pub fn is_ready(&self) -> bool {
        self.peer_id.is_some()
    }
}

/// Live handle to a set-up repository.
///
/// Cloning is cheap; every clone refers to the same repository.
#[derive(Clone, Debug)]
pub struct Instance {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    repo_path: PathBuf,
    config: Config,
    repo: Repo,
    node: Node,
}

impl Instance {
    /// Open the repository previously created by [`setup`](crate::setup).
    pub fn open(repo_path: impl AsRef<Path>, options: InstanceOptions) -> RepoResult<Self> {
        let repo_path = repo_path.as_ref().to_path_buf();
        let config_path = repo_path.join(CONFIG_FILE);
        if !config_path.is_file() {
            return Err(RepoError::NotSetup(repo_path));
        }
        let config = Config::read_from_file(&config_path)?;
        config.validate()?;
        let key = config.signing_key()?;

        let block_store_path = options
            .block_store_path
            .unwrap_or_else(|| repo_path.join(DEFAULT_BLOCKS_DIR));
        let store = FsObjectStore::open(&block_store_path)?;
        let refs = RefStore::open(repo_path.join(REFS_FILE))?;
        let repo = Repo::new(config.profile.peername.clone(), key, Arc::new(store), refs);

        debug!(repo = %repo_path.display(), "opened instance");
        Ok(Self::from_parts(repo_path, config, repo))
    }

    /// An instance backed entirely by memory, with a fresh identity.
    pub fn in_memory(generator: &dyn KeyGenerator) -> RepoResult<Self> {
        let mut config = Config::default();
        config.ensure_identity(generator);
        config.validate()?;
        let key = config.signing_key()?;
        let repo = Repo::new(
            config.profile.peername.clone(),
            key,
            Arc::new(InMemoryObjectStore::new()),
            RefStore::in_memory(),
        );
        Ok(Self::from_parts(PathBuf::new(), config, repo))
    }

    fn from_parts(repo_path: PathBuf, config: Config, repo: Repo) -> Self {
        let node = Node {
            peer_id: config.p2p.peer_id.clone(),
            peername: config.profile.peername.clone(),
            online: false,
        };
        Self {
            inner: Arc::new(Inner {
                repo_path,
                config,
                repo,
                node,
            }),
        }
    }

    pub fn repo(&self) -> &Repo {
        &self.inner.repo
    }

    pub fn node(&self) -> &Node {
        &self.inner.node
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn repo_path(&self) -> &Path {
        &self.inner.repo_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::{setup, SetupParams};
    use tempreg_crypto::CryptoSource;

    #[test]
    fn open_after_setup() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(SetupParams {
            repo_path: dir.path().join("qri"),
            block_store_path: dir.path().join("ipfs"),
            config: Config::default(),
            generator: &CryptoSource,
        })
        .unwrap();

        let inst = Instance::open(
            dir.path().join("qri"),
            InstanceOptions {
                block_store_path: Some(dir.path().join("ipfs")),
            },
        )
        .unwrap();
        assert_eq!(inst.node().peer_id, config.p2p.peer_id);
        assert!(inst.node().is_ready());
        assert!(!inst.node().online);
        assert_eq!(inst.repo().peername(), config.profile.peername);
        assert_eq!(inst.config().profile.id, config.profile.id);
    }

    #[test]
    fn open_without_setup_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Instance::open(dir.path(), InstanceOptions::default()),
            Err(RepoError::NotSetup(_))
        ));
    }

    #[test]
    fn clones_share_the_repo() {
        let inst = Instance::in_memory(&CryptoSource).unwrap();
        let other = inst.clone();
        assert!(std::ptr::eq(inst.repo(), other.repo()));
    }
}
