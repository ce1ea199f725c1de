use std::sync::Arc;

use tempreg_registry::{
    LocalResolver, MemProfiles, Registry, Remote, RepoSearch, SequentialResolver,
};
use tempreg_repo::{Config, Instance};

use crate::error::HarnessResult;

/// Compose the registry served for `instance`: a remote bound to its node
/// under the configured policy, an empty profile store, and a search over
/// its repo.
///
/// A missing `remote` section yields a disabled remote.
pub fn assemble(instance: &Instance, config: &Config) -> HarnessResult<Registry> {
    let remote_config = config.remote.clone().unwrap_or_default();
    let resolver =
        SequentialResolver::default().push(Arc::new(LocalResolver::new(instance.clone())));
    let remote = Remote::new(instance.clone(), &remote_config, Arc::new(resolver))?;
    Ok(Registry::new(
        remote,
        Arc::new(MemProfiles::new()),
        Arc::new(RepoSearch::new(instance.clone())),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use crate::provision::apply_ephemeral_defaults;
    use tempreg_crypto::CryptoSource;
    use tempreg_registry::{Profiles, RegistryError, SearchParams, Searchable};
    use tempreg_repo::RemoteConfig;

    #[tokio::test]
    async fn assembles_enabled_remote_and_empty_profiles() {
        let inst = Instance::in_memory(&CryptoSource).unwrap();
        let mut config = inst.config().clone();
        apply_ephemeral_defaults(&mut config);

        let reg = assemble(&inst, &config).unwrap();
        assert!(reg.remote.policy().enabled);
        assert_eq!(reg.remote.policy().accept_size_max, None);
        assert_eq!(reg.profiles.len().unwrap(), 0);
        assert!(reg.search.search(&SearchParams::new("")).await.unwrap().is_empty());
    }

    #[test]
    fn contradictory_policy_is_a_remote_error() {
        let inst = Instance::in_memory(&CryptoSource).unwrap();
        let mut config = inst.config().clone();
        config.remote = Some(RemoteConfig {
            enabled: true,
            accept_size_max: 0,
            ..Default::default()
        });
        let err = assemble(&inst, &config).unwrap_err();
        assert!(matches!(err, HarnessError::Remote(RegistryError::InvalidPolicy(_))));
        assert!(err.is_fatal());
    }
}
