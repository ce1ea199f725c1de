use std::fs;
use std::path::PathBuf;

use tempreg_crypto::KeyGenerator;
use tempreg_store::FsObjectStore;
use tracing::info;

use crate::config::{Config, CONFIG_FILE};
use crate::error::{RepoError, RepoResult};
use crate::refs::{RefStore, REFS_FILE};

/// Input to [`setup`].
pub struct SetupParams<'a> {
    pub repo_path: PathBuf,
    pub block_store_path: PathBuf,
    pub config: Config,
    /// Used only when `config` carries no identity yet.
    pub generator: &'a dyn KeyGenerator,
}

/// One-time initialization of a repository.
///
/// Fills in any missing identity, initializes the block store, and writes
/// the configuration and an empty ref log into `repo_path`. Fails with
/// [`RepoError::AlreadySetup`] if `repo_path` already holds a configuration.
/// Returns the configuration as written.
pub fn setup(params: SetupParams<'_>) -> RepoResult<Config> {
    let SetupParams {
        repo_path,
        block_store_path,
        mut config,
        generator,
    } = params;

    let config_path = repo_path.join(CONFIG_FILE);
    if config_path.exists() {
        return Err(RepoError::AlreadySetup(repo_path));
    }
    fs::create_dir_all(&repo_path)?;

    if config.ensure_identity(generator) {
        info!("generated new identity");
    }
    config.validate()?;
    config.signing_key()?;

    FsObjectStore::init(&block_store_path)?;
    config.set_path(&config_path);
    config.write_to_file()?;
    RefStore::create(repo_path.join(REFS_FILE))?;

    info!(
        repo = %repo_path.display(),
        blocks = %block_store_path.display(),
        peername = %config.profile.peername,
        "repository set up"
    );
    Ok(config)
}
