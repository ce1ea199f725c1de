use tempreg_crypto::KeyGenerator;
use tempreg_registry::Registry;
use tempreg_repo::{Config, Instance};
use tempreg_types::DatasetRef;
use tracing::info;

use crate::actions::ActionRegistry;
use crate::assemble::assemble;
use crate::context::ActionContext;
use crate::error::HarnessResult;
use crate::initialize::initialize;
use crate::provision::{Cleanup, Provisioned, Provisioner, TempPaths};
use crate::seed::seed;

/// A provisioned, initialized, and seeded temporary registry.
#[derive(Debug)]
pub struct Environment {
    pub paths: TempPaths,
    pub instance: Instance,
    pub registry: Registry,
    /// Versions created by the seed actions, in order.
    pub seeded: Vec<DatasetRef>,
    pub cleanup: Cleanup,
}

/// Provision, initialize, assemble, and seed with `seed_keys`.
///
/// Every step must succeed. On failure the temporary root is removed before
/// the error is returned.
pub async fn bootstrap(
    provisioner: &Provisioner,
    actions: &ActionRegistry,
    seed_keys: &[&str],
) -> HarnessResult<Environment> {
    info!("creating temporary registry");
    let Provisioned {
        paths,
        config,
        generator,
        cleanup,
    } = provisioner.provision()?;

    match build(&paths, config, generator.as_ref(), actions, seed_keys).await {
        Ok((instance, registry, seeded)) => Ok(Environment {
            paths,
            instance,
            registry,
            seeded,
            cleanup,
        }),
        Err(e) => {
            cleanup.run();
            Err(e)
        }
    }
}

async fn build(
    paths: &TempPaths,
    config: Config,
    generator: &dyn KeyGenerator,
    actions: &ActionRegistry,
    seed_keys: &[&str],
) -> HarnessResult<(Instance, Registry, Vec<DatasetRef>)> {
    let instance = initialize(paths, config, generator)?;
    let registry = assemble(&instance, instance.config())?;
    let seeded = seed(&ActionContext::detached(), &instance, actions, seed_keys).await?;
    Ok((instance, registry, seeded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use crate::seed::SEED_ACTIONS;

    #[tokio::test]
    async fn bootstrap_seeds_synths() {
        let base = tempfile::tempdir().unwrap();
        let env = bootstrap(
            &Provisioner::new().with_base_dir(base.path()),
            &ActionRegistry::standard(),
            SEED_ACTIONS,
        )
        .await
        .unwrap();

        assert_eq!(env.seeded.len(), 1);
        let rows = env
            .instance
            .repo()
            .body_rows(&DatasetRef::new("me", "synths"))
            .unwrap();
        assert_eq!(rows.len(), 3);
        let root = env.paths.root.clone();
        env.cleanup.run();
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn failed_seed_removes_temporary_root() {
        let base = tempfile::tempdir().unwrap();
        let err = bootstrap(
            &Provisioner::new().with_base_dir(base.path()),
            &ActionRegistry::standard(),
            &["missing"],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, HarnessError::Seed { .. }));
        assert_eq!(std::fs::read_dir(base.path()).unwrap().count(), 0);
    }
}
