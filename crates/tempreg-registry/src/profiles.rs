use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempreg_repo::validate_username;
use tempreg_types::PeerId;

use crate::error::{RegistryError, RegistryResult};

/// A registered peer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: PeerId,
    pub peername: String,
    pub created: DateTime<Utc>,
}

/// Profile storage keyed by profile id.
pub trait Profiles: Send + Sync {
    fn get(&self, id: &PeerId) -> RegistryResult<Option<Profile>>;

    /// Insert or replace the profile with `profile.id`. A peername may belong
    /// to one profile only.
    fn put(&self, profile: Profile) -> RegistryResult<()>;

    /// All profiles, ordered by peername.
    fn list(&self) -> RegistryResult<Vec<Profile>>;

    fn len(&self) -> RegistryResult<usize> {
        Ok(self.list()?.len())
    }
}

/// In-memory [`Profiles`]. Starts empty; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemProfiles {
    profiles: RwLock<HashMap<PeerId, Profile>>,
}

impl MemProfiles {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(e: impl std::fmt::Display) -> RegistryError {
    RegistryError::Internal(format!("lock poisoned: {e}"))
}

impl Profiles for MemProfiles {
    fn get(&self, id: &PeerId) -> RegistryResult<Option<Profile>> {
        Ok(self.profiles.read().map_err(poisoned)?.get(id).cloned())
    }

    fn put(&self, profile: Profile) -> RegistryResult<()> {
        validate_username(&profile.peername)?;
        let mut profiles = self.profiles.write().map_err(poisoned)?;
        if profiles
            .values()
            .any(|p| p.peername == profile.peername && p.id != profile.id)
        {
            return Err(RegistryError::ProfileConflict {
                peername: profile.peername,
            });
        }
        profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    fn list(&self) -> RegistryResult<Vec<Profile>> {
        let mut all: Vec<Profile> = self.profiles.read().map_err(poisoned)?.values().cloned().collect();
        all.sort_by(|a, b| a.peername.cmp(&b.peername));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(peername: &str) -> Profile {
        Profile {
            id: PeerId::ephemeral(),
            peername: peername.into(),
            created: Utc::now(),
        }
    }

    #[test]
    fn starts_empty() {
        assert_eq!(MemProfiles::new().len().unwrap(), 0);
    }

    #[test]
    fn put_get_list() {
        let store = MemProfiles::new();
        let b = profile("bravo");
        let a = profile("alpha");
        store.put(b.clone()).unwrap();
        store.put(a.clone()).unwrap();
        assert_eq!(store.get(&a.id).unwrap(), Some(a.clone()));
        assert_eq!(store.list().unwrap(), vec![a, b]);
    }

    #[test]
    fn put_replaces_same_id() {
        let store = MemProfiles::new();
        let mut p = profile("alpha");
        store.put(p.clone()).unwrap();
        p.peername = "alpha_renamed".into();
        store.put(p.clone()).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get(&p.id).unwrap().unwrap().peername, "alpha_renamed");
    }

    #[test]
    fn peername_taken_by_other_id_conflicts() {
        let store = MemProfiles::new();
        store.put(profile("alpha")).unwrap();
        assert!(matches!(
            store.put(profile("alpha")),
            Err(RegistryError::ProfileConflict { .. })
        ));
    }

    #[test]
    fn invalid_peername_is_rejected() {
        assert!(matches!(
            MemProfiles::new().put(profile("Not Valid")),
            Err(RegistryError::Repo(_))
        ));
    }
}
