//! The ref log: every recorded version of every dataset, with its publish
//! flag.
//!
//! Entries are keyed by alias (`peername/name`) and kept oldest-first. A
//! file-backed [`RefStore`] rewrites [`REFS_FILE`] after every mutation.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tempreg_types::PeerId;

use crate::error::{RepoError, RepoResult};

/// File name of the persisted ref log inside the repo directory.
pub const REFS_FILE: &str = "refs.bin";

/// One recorded version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub path: String,
    pub seq: u64,
    pub published: bool,
    pub saved_at: DateTime<Utc>,
}

/// All versions of one dataset, oldest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetHistory {
    pub peername: String,
    pub name: String,
    pub profile_id: Option<PeerId>,
    pub versions: Vec<VersionEntry>,
}

impl DatasetHistory {
    pub fn alias(&self) -> String {
        format!("{}/{}", self.peername, self.name)
    }

    pub fn head(&self) -> Option<&VersionEntry> {
        self.versions.last()
    }
}

/// Ref log shared by a [`Repo`](crate::Repo).
#[derive(Debug)]
pub struct RefStore {
    entries: RwLock<BTreeMap<String, DatasetHistory>>,
    file: Option<PathBuf>,
}

impl RefStore {
    /// A ref log that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            file: None,
        }
    }

    /// Create an empty ref log at `path`, replacing any existing file.
    pub fn create(path: impl AsRef<Path>) -> RepoResult<Self> {
        let store = Self {
            entries: RwLock::new(BTreeMap::new()),
            file: Some(path.as_ref().to_path_buf()),
        };
        store.persist(&*store.read_lock()?)?;
        Ok(store)
    }

    /// Load the ref log at `path`.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let entries: BTreeMap<String, DatasetHistory> =
            bincode::deserialize(&bytes).map_err(|e| RepoError::Serialization(e.to_string()))?;
        Ok(Self {
            entries: RwLock::new(entries),
            file: Some(path.to_path_buf()),
        })
    }

    fn read_lock(&self) -> RepoResult<RwLockReadGuard<'_, BTreeMap<String, DatasetHistory>>> {
        self.entries
            .read()
            .map_err(|e| RepoError::Serialization(format!("lock poisoned: {e}")))
    }

    fn write_lock(&self) -> RepoResult<RwLockWriteGuard<'_, BTreeMap<String, DatasetHistory>>> {
        self.entries
            .write()
            .map_err(|e| RepoError::Serialization(format!("lock poisoned: {e}")))
    }

    fn persist(&self, entries: &BTreeMap<String, DatasetHistory>) -> RepoResult<()> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        let bytes =
            bincode::serialize(entries).map_err(|e| RepoError::Serialization(e.to_string()))?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Persist `next`, then install it. On failure the in-memory log is left
    /// as it was, matching the file.
    fn commit(
        &self,
        entries: &mut BTreeMap<String, DatasetHistory>,
        next: BTreeMap<String, DatasetHistory>,
    ) -> RepoResult<()> {
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    /// Latest version of `alias`.
    pub fn head(&self, alias: &str) -> RepoResult<Option<VersionEntry>> {
        Ok(self.read_lock()?.get(alias).and_then(|h| h.head().cloned()))
    }

    pub fn history(&self, alias: &str) -> RepoResult<Option<DatasetHistory>> {
        Ok(self.read_lock()?.get(alias).cloned())
    }

    /// Every dataset, ordered by alias.
    pub fn histories(&self) -> RepoResult<Vec<DatasetHistory>> {
        Ok(self.read_lock()?.values().cloned().collect())
    }

    pub fn names(&self) -> RepoResult<Vec<String>> {
        Ok(self.read_lock()?.keys().cloned().collect())
    }

    /// Record a new head version for `peername/name`.
    pub fn append(
        &self,
        peername: &str,
        name: &str,
        profile_id: Option<PeerId>,
        entry: VersionEntry,
    ) -> RepoResult<()> {
        let mut entries = self.write_lock()?;
        let mut next = entries.clone();
        let alias = format!("{peername}/{name}");
        let history = next.entry(alias).or_insert_with(|| DatasetHistory {
            peername: peername.to_string(),
            name: name.to_string(),
            profile_id: None,
            versions: Vec::new(),
        });
        if profile_id.is_some() {
            history.profile_id = profile_id;
        }
        history.versions.push(entry);
        self.commit(&mut entries, next)
    }

    /// Set the publish flag of the version at `path`.
    pub fn set_published(&self, alias: &str, path: &str, published: bool) -> RepoResult<()> {
        let mut entries = self.write_lock()?;
        let mut next = entries.clone();
        let version = next
            .get_mut(alias)
            .and_then(|h| h.versions.iter_mut().find(|v| v.path == path))
            .ok_or_else(|| RepoError::NotFound(format!("{alias}@{path}")))?;
        version.published = published;
        self.commit(&mut entries, next)
    }

    /// Drop every version of `alias`. Returns the removed history.
    pub fn remove(&self, alias: &str) -> RepoResult<Option<DatasetHistory>> {
        let mut entries = self.write_lock()?;
        let mut next = entries.clone();
        let removed = next.remove(alias);
        if removed.is_some() {
            self.commit(&mut entries, next)?;
        }
        Ok(removed)
    }
}
