use std::sync::Arc;

use async_trait::async_trait;
use tempreg_repo::Instance;
use tempreg_types::DatasetRef;

use crate::error::{RegistryError, RegistryResult};

/// Completes dataset references.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Fill in the profile id and path of `reference`.
    async fn resolve_ref(&self, reference: &DatasetRef) -> RegistryResult<DatasetRef>;
}

/// Resolves against the repo of an [`Instance`].
#[derive(Clone, Debug)]
pub struct LocalResolver {
    instance: Instance,
}

impl LocalResolver {
    pub fn new(instance: Instance) -> Self {
        Self { instance }
    }
}

#[async_trait]
impl Resolver for LocalResolver {
    async fn resolve_ref(&self, reference: &DatasetRef) -> RegistryResult<DatasetRef> {
        Ok(self.instance.repo().resolve(reference)?)
    }
}

/// Tries each resolver in order and returns the first success.
///
/// A [`RegistryError::NotFound`] moves on to the next resolver; any other
/// error stops the search.
#[derive(Clone, Default)]
pub struct SequentialResolver {
    resolvers: Vec<Arc<dyn Resolver>>,
}

impl SequentialResolver {
    pub fn new(resolvers: Vec<Arc<dyn Resolver>>) -> Self {
        Self { resolvers }
    }

    pub fn push(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

#[async_trait]
impl Resolver for SequentialResolver {
    async fn resolve_ref(&self, reference: &DatasetRef) -> RegistryResult<DatasetRef> {
        for resolver in &self.resolvers {
            match resolver.resolve_ref(reference).await {
                Err(RegistryError::NotFound(_)) => continue,
                result => return result,
            }
        }
        Err(RegistryError::NotFound(reference.alias()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tempreg_crypto::CryptoSource;
    use tempreg_repo::SaveParams;

    struct Fixed(DatasetRef);

    #[async_trait]
    impl Resolver for Fixed {
        async fn resolve_ref(&self, _: &DatasetRef) -> RegistryResult<DatasetRef> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    #[async_trait]
    impl Resolver for Broken {
        async fn resolve_ref(&self, _: &DatasetRef) -> RegistryResult<DatasetRef> {
            Err(RegistryError::Internal("broken".into()))
        }
    }

    fn instance_with_synths() -> Instance {
        let inst = Instance::in_memory(&CryptoSource).unwrap();
        inst.repo()
            .save(SaveParams {
                reference: "me/synths".into(),
                body: Bytes::from_static(b"a,b\n1,2\n"),
                ..Default::default()
            })
            .unwrap();
        inst
    }

    #[tokio::test]
    async fn local_resolver_fills_path() {
        let inst = instance_with_synths();
        let r = LocalResolver::new(inst.clone())
            .resolve_ref(&DatasetRef::new("me", "synths"))
            .await
            .unwrap();
        assert!(r.is_complete());
        assert_eq!(r.username, inst.repo().peername());
    }

    #[tokio::test]
    async fn sequential_falls_through_not_found() {
        let empty = Instance::in_memory(&CryptoSource).unwrap();
        let full = instance_with_synths();
        let resolver = SequentialResolver::default()
            .push(Arc::new(LocalResolver::new(empty)))
            .push(Arc::new(LocalResolver::new(full)));
        assert!(resolver
            .resolve_ref(&DatasetRef::new("me", "synths"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn sequential_stops_on_other_errors() {
        let resolver = SequentialResolver::new(vec![
            Arc::new(Broken),
            Arc::new(Fixed(DatasetRef::new("a", "b"))),
        ]);
        assert!(matches!(
            resolver.resolve_ref(&DatasetRef::new("a", "b")).await,
            Err(RegistryError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn empty_sequence_is_not_found() {
        assert!(matches!(
            SequentialResolver::default()
                .resolve_ref(&DatasetRef::new("a", "b"))
                .await,
            Err(RegistryError::NotFound(_))
        ));
    }
}
