use std::sync::Arc;

use crate::profiles::Profiles;
use crate::remote::Remote;
use crate::search::Searchable;

/// The value served over HTTP: remote-sync endpoint, profile store, and
/// search facade. Cheap to clone.
#[derive(Clone)]
pub struct Registry {
    pub remote: Arc<Remote>,
    pub profiles: Arc<dyn Profiles>,
    pub search: Arc<dyn Searchable>,
}

impl Registry {
    pub fn new(remote: Remote, profiles: Arc<dyn Profiles>, search: Arc<dyn Searchable>) -> Self {
        Self {
            remote: Arc::new(remote),
            profiles,
            search,
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}
