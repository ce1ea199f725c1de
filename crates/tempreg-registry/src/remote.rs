//! Remote-sync endpoint.
//!
//! A [`Remote`] serves published dataset versions to other repositories and
//! accepts inbound transfers ([`DatasetPush`]) subject to its
//! [`RemotePolicy`]. A transfer is a dataset reference plus the blocks it
//! needs: the version document and the body.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tempreg_repo::{Dataset, Instance, Node, RemoteConfig};
use tempreg_store::{ObjectKind, StoredObject};
use tempreg_types::{DatasetRef, ObjectId};
use tracing::{debug, info};

use crate::error::{RegistryError, RegistryResult};
use crate::policy::RemotePolicy;
use crate::resolve::Resolver;

/// One block of a transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushBlock {
    pub path: String,
    pub kind: ObjectKind,
    pub data: Bytes,
}

/// An inbound or outbound dataset transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPush {
    /// Must carry the path of the version document.
    pub reference: DatasetRef,
    pub blocks: Vec<PushBlock>,
}

impl DatasetPush {
    /// Total payload size in bytes.
    pub fn size(&self) -> u64 {
        self.blocks.iter().map(|b| b.data.len() as u64).sum()
    }

    fn block(&self, path: &str) -> Option<&PushBlock> {
        self.blocks.iter().find(|b| b.path == path)
    }
}

fn object_id(path: &str) -> RegistryResult<ObjectId> {
    ObjectId::from_path(path).map_err(|e| RegistryError::InvalidPush(e.to_string()))
}

pub struct Remote {
    instance: Instance,
    policy: RemotePolicy,
    resolver: Arc<dyn Resolver>,
}

impl std::fmt::Debug for Remote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Remote")
            .field("node", self.instance.node())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Remote {
    /// Bind a remote to the node of `instance`.
    pub fn new(
        instance: Instance,
        config: &RemoteConfig,
        resolver: Arc<dyn Resolver>,
    ) -> RegistryResult<Self> {
        let policy = RemotePolicy::from_config(config)?;
        if !instance.node().is_ready() {
            return Err(RegistryError::NodeNotReady);
        }
        Ok(Self {
            instance,
            policy,
            resolver,
        })
    }

    pub fn policy(&self) -> &RemotePolicy {
        &self.policy
    }

    pub fn node(&self) -> &Node {
        self.instance.node()
    }

    fn ensure_enabled(&self) -> RegistryResult<()> {
        if self.policy.enabled {
            Ok(())
        } else {
            Err(RegistryError::Disabled)
        }
    }

    /// Head references of every published dataset.
    pub async fn list_refs(&self) -> RegistryResult<Vec<DatasetRef>> {
        let repo = self.instance.repo();
        let mut published = Vec::new();
        for r in repo.list()? {
            if repo.is_published(&r)? {
                published.push(r);
            }
        }
        Ok(published)
    }

    pub async fn resolve(&self, reference: &DatasetRef) -> RegistryResult<DatasetRef> {
        self.resolver.resolve_ref(reference).await
    }

    /// Bundle the referenced version for an outbound transfer.
    pub async fn package(&self, reference: &DatasetRef) -> RegistryResult<DatasetPush> {
        self.ensure_enabled()?;
        let reference = self.resolve(reference).await?;
        let doc_path = reference
            .path
            .clone()
            .ok_or_else(|| RegistryError::NotFound(reference.alias()))?;
        let dataset = self.instance.repo().load(&doc_path)?;

        let store = self.instance.repo().store();
        let mut blocks = Vec::new();
        for path in std::iter::once(&doc_path).chain(dataset.body.as_ref()) {
            let object = store
                .read_path(path)?
                .ok_or_else(|| RegistryError::NotFound(path.clone()))?;
            blocks.push(PushBlock {
                path: path.clone(),
                kind: object.kind,
                data: Bytes::from(object.data),
            });
        }
        Ok(DatasetPush { reference, blocks })
    }

    /// Accept an inbound transfer and record the version it carries.
    ///
    /// A transfer cut off by the accept timeout reports
    /// [`RegistryError::Timeout`]; block writes already under way still
    /// finish, and are harmless since blocks are content-addressed.
    pub async fn receive(&self, push: DatasetPush) -> RegistryResult<DatasetRef> {
        self.ensure_enabled()?;
        let size = push.size();
        if let Some(max) = self.policy.accept_size_max {
            if size > max {
                return Err(RegistryError::TooLarge { size, max });
            }
        }

        let instance = self.instance.clone();
        let require_all_blocks = self.policy.require_all_blocks;
        let work =
            tokio::task::spawn_blocking(move || apply(&instance, push, require_all_blocks));
        let joined = match self.policy.accept_timeout {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .map_err(|_| RegistryError::Timeout(limit))?,
            None => work.await,
        };
        let reference = joined.map_err(|e| RegistryError::Internal(e.to_string()))??;
        info!(dataset = %reference, size, "received dataset");
        Ok(reference)
    }

    /// Forget every version of the referenced dataset.
    pub async fn remove(&self, reference: &DatasetRef) -> RegistryResult<()> {
        self.ensure_enabled()?;
        if !self.policy.allow_removes {
            return Err(RegistryError::RemovesNotAllowed);
        }
        let removed = self.instance.repo().remove(reference)?;
        info!(dataset = %removed.alias(), versions = removed.versions.len(), "removed dataset");
        Ok(())
    }
}

fn apply(instance: &Instance, push: DatasetPush, require_all_blocks: bool) -> RegistryResult<DatasetRef> {
    let store = instance.repo().store();
    for block in &push.blocks {
        let computed = StoredObject::new(block.kind, block.data.to_vec()).compute_id();
        if computed.to_path() != block.path {
            return Err(RegistryError::InvalidPush(format!(
                "block {} does not match its content",
                block.path
            )));
        }
    }

    let doc_path = push
        .reference
        .path
        .clone()
        .ok_or_else(|| RegistryError::InvalidPush("reference has no path".into()))?;
    object_id(&doc_path)?;
    let doc_bytes = match push.block(&doc_path) {
        Some(b) if b.kind == ObjectKind::Dataset => b.data.to_vec(),
        Some(_) => {
            return Err(RegistryError::InvalidPush(format!(
                "{doc_path} is not a dataset document"
            )))
        }
        None => match store.read_path(&doc_path)? {
            Some(obj) if obj.kind == ObjectKind::Dataset => obj.data,
            _ => return Err(RegistryError::IncompleteBlocks(vec![doc_path])),
        },
    };
    let mut dataset = Dataset::from_json_bytes(&doc_bytes)?;
    dataset.path = Some(doc_path);
    if dataset.peername != push.reference.username || dataset.name != push.reference.name {
        return Err(RegistryError::InvalidPush(format!(
            "reference {} does not match document {}",
            push.reference.alias(),
            dataset.alias()
        )));
    }

    if require_all_blocks {
        let mut missing = Vec::new();
        for path in dataset.body.iter() {
            if push.block(path).is_none() && !store.exists_path(path)? {
                missing.push(path.clone());
            }
        }
        if !missing.is_empty() {
            return Err(RegistryError::IncompleteBlocks(missing));
        }
    }

    for block in push.blocks {
        store.write(&StoredObject::new(block.kind, block.data.to_vec()))?;
    }
    debug!(dataset = %dataset.alias(), "wrote transfer blocks");
    Ok(instance.repo().import(&dataset)?)
}
