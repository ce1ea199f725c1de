use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::Utc;
use tempreg_crypto::{SigningKey, VerifyingKey};
use tempreg_store::{Blob, ObjectKind, ObjectStore, StoredObject};
use tempreg_types::{DatasetRef, PeerId};
use tracing::debug;

use crate::dataset::{parse_csv, Commit, Dataset, Structure};
use crate::error::{RepoError, RepoResult};
use crate::names::{validate_dataset_name, validate_username};
use crate::refs::{DatasetHistory, RefStore, VersionEntry};

/// Username that always resolves to the repo's own peername.
pub const ME: &str = "me";

const DEFAULT_BODY_PATH: &str = "body.csv";

/// Input to [`Repo::save`].
#[derive(Clone, Debug, Default)]
pub struct SaveParams {
    /// `me/<name>` or `<peername>/<name>`.
    pub reference: String,
    /// Fields to record on the new version. `meta` and `body_path` fall back
    /// to the previous head when unset; a commit title, if given, is kept.
    pub dataset: Dataset,
    /// CSV body.
    pub body: Bytes,
}

/// A versioned dataset repository owned by a single peer.
///
/// Saves to the same dataset name are serialized; saves to different names
/// run concurrently.
pub struct Repo {
    peername: String,
    profile_id: PeerId,
    key: SigningKey,
    store: Arc<dyn ObjectStore>,
    refs: RefStore,
    name_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo")
            .field("peername", &self.peername)
            .field("profile_id", &self.profile_id)
            .finish_non_exhaustive()
    }
}

impl Repo {
    pub fn new(
        peername: impl Into<String>,
        key: SigningKey,
        store: Arc<dyn ObjectStore>,
        refs: RefStore,
    ) -> Self {
        let profile_id = key.verifying_key().to_peer_id();
        Self {
            peername: peername.into(),
            profile_id,
            key,
            store,
            refs,
            name_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn peername(&self) -> &str {
        &self.peername
    }

    pub fn profile_id(&self) -> &PeerId {
        &self.profile_id
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// The block store backing this repo.
    pub fn store(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store)
    }

    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    /// Replace `me` with the own peername and validate both name parts.
    pub fn canonicalize(&self, reference: &DatasetRef) -> RepoResult<DatasetRef> {
        let mut r = reference.clone();
        if r.username == ME {
            r.username = self.peername.clone();
            r.profile_id.get_or_insert_with(|| self.profile_id.clone());
        }
        validate_username(&r.username)?;
        validate_dataset_name(&r.name)?;
        Ok(r)
    }

    fn name_lock(&self, alias: &str) -> RepoResult<Arc<Mutex<()>>> {
        let mut locks = self
            .name_locks
            .lock()
            .map_err(|e| RepoError::Serialization(format!("lock poisoned: {e}")))?;
        Ok(Arc::clone(locks.entry(alias.to_string()).or_default()))
    }

    /// Record a new version of a dataset and return it.
    ///
    /// Saving to an existing name always creates a new head version. The new
    /// path differs from every earlier one because the document links its
    /// predecessor and carries an incremented sequence number.
    pub fn save(&self, params: SaveParams) -> RepoResult<Dataset> {
        let reference = self.canonicalize(&DatasetRef::parse(&params.reference)?)?;
        if reference.username != self.peername {
            return Err(RepoError::InvalidName {
                name: reference.username,
                reason: format!("can only save datasets owned by '{}'", self.peername),
            });
        }
        let alias = reference.alias();
        let lock = self.name_lock(&alias)?;
        let _guard = lock
            .lock()
            .map_err(|e| RepoError::Serialization(format!("lock poisoned: {e}")))?;

        let structure = Structure::from_csv(&params.body)?;
        let head = self.refs.head(&alias)?;
        let previous = head.as_ref().map(|e| self.load(&e.path)).transpose()?;
        let seq = head.as_ref().map_or(1, |e| e.seq + 1);

        let mut ds = params.dataset;
        ds.peername = self.peername.clone();
        ds.name = reference.name.clone();
        ds.profile_id = Some(self.profile_id.clone());
        ds.path = None;
        if let Some(prev) = &previous {
            if ds.meta.is_none() {
                ds.meta = prev.meta.clone();
            }
            if ds.body_path.is_empty() {
                ds.body_path = prev.body_path.clone();
            }
        }
        if ds.body_path.is_empty() {
            ds.body_path = DEFAULT_BODY_PATH.into();
        }
        ds.previous_path = previous.and_then(|p| p.path);

        ds.body = Some(
            self.store
                .write_path(&Blob::new(params.body.to_vec()).to_stored_object())?,
        );
        ds.structure = Some(structure);

        let title = ds
            .commit
            .take()
            .map(|c| c.title)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| {
                let title = if seq == 1 { "created dataset" } else { "updated dataset" };
                title.to_string()
            });
        let timestamp = Utc::now();
        ds.commit = Some(Commit {
            title,
            timestamp,
            seq,
            author: self.profile_id.clone(),
            signature: None,
        });
        ds.sign(&self.key)?;

        let doc = StoredObject::new(ObjectKind::Dataset, ds.to_json_bytes()?);
        let path = self.store.write_path(&doc)?;
        self.refs.append(
            &self.peername,
            &ds.name,
            Some(self.profile_id.clone()),
            VersionEntry {
                path: path.clone(),
                seq,
                published: false,
                saved_at: timestamp,
            },
        )?;
        debug!(dataset = %alias, %path, seq, "saved dataset version");
        ds.path = Some(path);
        Ok(ds)
    }

    /// Record a version whose document and body are already in the store,
    /// e.g. after an inbound transfer. A version already in the log is left
    /// untouched.
    pub fn import(&self, dataset: &Dataset) -> RepoResult<DatasetRef> {
        let path = dataset
            .path
            .clone()
            .ok_or_else(|| RepoError::InvalidBody("imported dataset has no path".into()))?;
        validate_username(&dataset.peername)?;
        validate_dataset_name(&dataset.name)?;
        let alias = dataset.alias();
        let lock = self.name_lock(&alias)?;
        let _guard = lock
            .lock()
            .map_err(|e| RepoError::Serialization(format!("lock poisoned: {e}")))?;

        if !self.store.exists_path(&path)? {
            return Err(RepoError::NotFound(path));
        }
        let history = self.refs.history(&alias)?;
        if let Some(h) = &history {
            if h.versions.iter().any(|v| v.path == path) {
                return Ok(dataset.to_ref());
            }
        }
        let seq = match &dataset.commit {
            Some(c) => c.seq,
            None => history.and_then(|h| h.head().map(|v| v.seq)).unwrap_or(0) + 1,
        };
        self.refs.append(
            &dataset.peername,
            &dataset.name,
            dataset.profile_id.clone(),
            VersionEntry {
                path,
                seq,
                published: false,
                saved_at: Utc::now(),
            },
        )?;
        debug!(dataset = %alias, "imported dataset version");
        Ok(dataset.to_ref())
    }

    /// Fill in the profile id and path of `reference`. Without a path, the
    /// head version is used; with one, it must be a recorded version.
    pub fn resolve(&self, reference: &DatasetRef) -> RepoResult<DatasetRef> {
        let r = self.canonicalize(reference)?;
        let history = self.history(&r)?;
        let path = match &r.path {
            Some(p) if history.versions.iter().any(|v| &v.path == p) => p.clone(),
            Some(p) => return Err(RepoError::NotFound(format!("{}@{p}", r.alias()))),
            None => history
                .head()
                .map(|v| v.path.clone())
                .ok_or_else(|| RepoError::NotFound(r.alias()))?,
        };
        let mut out = DatasetRef::new(history.peername, history.name).with_path(path);
        if let Some(id) = history.profile_id {
            out = out.with_profile_id(id);
        }
        Ok(out)
    }

    fn history(&self, reference: &DatasetRef) -> RepoResult<DatasetHistory> {
        self.refs
            .history(&reference.alias())?
            .ok_or_else(|| RepoError::NotFound(reference.alias()))
    }

    /// Read the dataset document stored at `path`.
    pub fn load(&self, path: &str) -> RepoResult<Dataset> {
        let object = self
            .store
            .read_path(path)?
            .ok_or_else(|| RepoError::NotFound(path.to_string()))?;
        if object.kind != ObjectKind::Dataset {
            return Err(RepoError::Serialization(format!(
                "{path} is a {}, not a dataset",
                object.kind
            )));
        }
        let mut ds = Dataset::from_json_bytes(&object.data)?;
        ds.path = Some(path.to_string());
        Ok(ds)
    }

    pub fn get(&self, reference: &DatasetRef) -> RepoResult<Dataset> {
        let resolved = self.resolve(reference)?;
        let path = resolved
            .path
            .ok_or_else(|| RepoError::NotFound(reference.alias()))?;
        self.load(&path)
    }

    /// Raw body bytes of `dataset`.
    pub fn body(&self, dataset: &Dataset) -> RepoResult<Vec<u8>> {
        let path = dataset
            .body
            .as_deref()
            .ok_or_else(|| RepoError::NotFound(format!("{} has no body", dataset.alias())))?;
        let object = self
            .store
            .read_path(path)?
            .ok_or_else(|| RepoError::NotFound(path.to_string()))?;
        Ok(Blob::from_stored_object(&object)?.data)
    }

    /// Data rows of the referenced version, header excluded.
    pub fn body_rows(&self, reference: &DatasetRef) -> RepoResult<Vec<Vec<String>>> {
        let ds = self.get(reference)?;
        let (_, rows) = parse_csv(&self.body(&ds)?)?;
        Ok(rows)
    }

    /// Head reference of every dataset in the repo.
    pub fn list(&self) -> RepoResult<Vec<DatasetRef>> {
        Ok(self
            .refs
            .histories()?
            .into_iter()
            .filter_map(|h| {
                let head = h.head()?.path.clone();
                let mut r = DatasetRef::new(h.peername, h.name).with_path(head);
                if let Some(id) = h.profile_id {
                    r = r.with_profile_id(id);
                }
                Some(r)
            })
            .collect())
    }

    /// Every version of the referenced dataset, oldest first.
    pub fn log(&self, reference: &DatasetRef) -> RepoResult<Vec<VersionEntry>> {
        let r = self.canonicalize(reference)?;
        Ok(self.history(&r)?.versions)
    }

    pub fn is_published(&self, reference: &DatasetRef) -> RepoResult<bool> {
        let resolved = self.resolve(reference)?;
        let history = self.history(&resolved)?;
        Ok(history
            .versions
            .iter()
            .any(|v| Some(&v.path) == resolved.path.as_ref() && v.published))
    }

    /// Set the publish flag of the referenced version (the head if the
    /// reference has no path).
    pub fn set_publish_status(&self, reference: &DatasetRef, published: bool) -> RepoResult<()> {
        let resolved = self.resolve(reference)?;
        let path = resolved
            .path
            .as_deref()
            .ok_or_else(|| RepoError::NotFound(resolved.alias()))?;
        self.refs.set_published(&resolved.alias(), path, published)?;
        debug!(dataset = %resolved.alias(), path, published, "set publish status");
        Ok(())
    }

    /// Forget every version of the referenced dataset. Blocks stay in the
    /// store.
    pub fn remove(&self, reference: &DatasetRef) -> RepoResult<DatasetHistory> {
        let r = self.canonicalize(reference)?;
        self.refs
            .remove(&r.alias())?
            .ok_or_else(|| RepoError::NotFound(r.alias()))
    }
}
