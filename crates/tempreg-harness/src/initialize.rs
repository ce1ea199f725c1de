use tempreg_crypto::KeyGenerator;
use tempreg_repo::{setup, Config, Instance, InstanceOptions, SetupParams};

use crate::error::HarnessResult;
use crate::provision::TempPaths;

/// Set up the repository under `paths` and open an instance on it.
///
/// Setup writes the configuration to `<repo>/config.toml` and must finish
/// before the instance is opened.
pub fn initialize(
    paths: &TempPaths,
    config: Config,
    generator: &dyn KeyGenerator,
) -> HarnessResult<Instance> {
    setup(SetupParams {
        repo_path: paths.repo.clone(),
        block_store_path: paths.block_store.clone(),
        config,
        generator,
    })?;
    let instance = Instance::open(
        &paths.repo,
        InstanceOptions {
            block_store_path: Some(paths.block_store.clone()),
        },
    )?;
    Ok(instance)
}
