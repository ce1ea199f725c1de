//! Dataset references.
//!
//! A [`DatasetRef`] names one version of a dataset. The string form is
//! `username/name[@[profile_id][path]]`, for example
//! `alice/synths@<peer hex>/ipfs/<block hex>`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::PeerId;

/// Identifies a specific dataset version.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetRef {
    /// Human-readable owner name.
    pub username: String,
    /// Dataset name, unique per owner.
    pub name: String,
    /// Identifier of the owning profile, once resolved.
    pub profile_id: Option<PeerId>,
    /// Content path of the version, once resolved.
    pub path: Option<String>,
}

impl DatasetRef {
    /// An unresolved reference carrying only owner and name.
    pub fn new(username: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
            profile_id: None,
            path: None,
        }
    }

    pub fn with_profile_id(mut self, id: PeerId) -> Self {
        self.profile_id = Some(id);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// `username/name`, without version information.
    pub fn alias(&self) -> String {
        format!("{}/{}", self.username, self.name)
    }

    /// A reference is complete once every identifying field is known.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty()
            && !self.name.is_empty()
            && self.profile_id.is_some()
            && self.path.is_some()
    }

    /// Parse the string form.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidRef {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (alias, version) = match input.split_once('@') {
            Some((alias, version)) => (alias, Some(version)),
            None => (input, None),
        };

        let (username, name) = alias
            .split_once('/')
            .ok_or_else(|| invalid("expected 'username/name'"))?;
        if username.is_empty() || name.is_empty() {
            return Err(invalid("username and name must not be empty"));
        }
        if name.contains('/') {
            return Err(invalid("name must not contain '/'"));
        }

        let mut reference = Self::new(username, name);
        if let Some(version) = version {
            let (id, path) = match version.find('/') {
                Some(idx) => (&version[..idx], &version[idx..]),
                None => (version, ""),
            };
            if !id.is_empty() {
                reference.profile_id = Some(PeerId::from_hex(id)?);
            }
            if !path.is_empty() {
                reference.path = Some(path.to_string());
            }
            if reference.profile_id.is_none() && reference.path.is_none() {
                return Err(invalid("empty version after '@'"));
            }
        }
        Ok(reference)
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.username, self.name)?;
        if self.profile_id.is_none() && self.path.is_none() {
            return Ok(());
        }
        write!(f, "@")?;
        if let Some(id) = &self.profile_id {
            write!(f, "{id}")?;
        }
        if let Some(path) = &self.path {
            write!(f, "{path}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectId;
    use proptest::prelude::*;

    #[test]
    fn parse_alias_only() {
        let r = DatasetRef::parse("me/synths").unwrap();
        assert_eq!(r.username, "me");
        assert_eq!(r.name, "synths");
        assert!(r.profile_id.is_none());
        assert!(r.path.is_none());
        assert!(!r.is_complete());
    }

    #[test]
    fn parse_full_reference() {
        let id = PeerId::from_public_key(&[3; 32]);
        let path = ObjectId::from_bytes(b"v1").to_path();
        let r = DatasetRef::parse(&format!("alice/synths@{id}{path}")).unwrap();
        assert_eq!(r.profile_id, Some(id));
        assert_eq!(r.path.as_deref(), Some(path.as_str()));
        assert!(r.is_complete());
    }

    #[test]
    fn parse_path_without_profile() {
        let path = ObjectId::from_bytes(b"v2").to_path();
        let r = DatasetRef::parse(&format!("alice/synths@{path}")).unwrap();
        assert!(r.profile_id.is_none());
        assert_eq!(r.path, Some(path));
    }

    #[test]
    fn parse_rejects_missing_name() {
        assert!(DatasetRef::parse("synths").is_err());
        assert!(DatasetRef::parse("/synths").is_err());
        assert!(DatasetRef::parse("alice/").is_err());
        assert!(DatasetRef::parse("alice/synths@").is_err());
    }

    #[test]
    fn display_omits_empty_version() {
        assert_eq!(DatasetRef::new("alice", "synths").to_string(), "alice/synths");
    }

    proptest! {
        #[test]
        fn display_parses_back(
            user in "[a-z][a-z0-9_]{0,12}",
            name in "[a-z][a-z0-9_]{0,12}",
            seed in any::<[u8; 32]>(),
            with_id in any::<bool>(),
        ) {
            let mut r = DatasetRef::new(user, name).with_path(ObjectId::from_hash(seed).to_path());
            if with_id {
                r = r.with_profile_id(PeerId::from_public_key(&seed));
            }
            prop_assert_eq!(DatasetRef::parse(&r.to_string()).unwrap(), r);
        }
    }
}
