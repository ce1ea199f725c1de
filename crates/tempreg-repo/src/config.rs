use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempreg_crypto::{KeyGenerator, SigningKey};
use tempreg_types::PeerId;

use crate::error::{RepoError, RepoResult};

/// Name of the configuration file inside the repo directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Repository configuration, persisted as TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    path: Option<PathBuf>,
    pub api: ApiConfig,
    pub rpc: RpcConfig,
    pub p2p: P2pConfig,
    pub profile: ProfileConfig,
    pub registry: RegistryConfig,
    pub remote: Option<RemoteConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enabled: bool,
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcConfig {
    pub enabled: bool,
    pub address: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct P2pConfig {
    pub enabled: bool,
    /// Hex-encoded Ed25519 secret. Empty until an identity is generated.
    pub priv_key: String,
    pub peer_id: Option<PeerId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub id: Option<PeerId>,
    pub priv_key: String,
    pub peername: String,
    pub created: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the registry this repo talks to. Empty means self-hosted.
    pub location: String,
}

/// Policy for the remote-sync endpoint.
///
/// `-1` in `accept_size_max` or `accept_timeout_ms` means "unbounded".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub enabled: bool,
    pub accept_size_max: i64,
    pub accept_timeout_ms: i64,
    pub require_all_blocks: bool,
    pub allow_removes: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            accept_size_max: 0,
            accept_timeout_ms: 0,
            require_all_blocks: true,
            allow_removes: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            api: ApiConfig {
                enabled: true,
                address: "/ip4/127.0.0.1/tcp/2503".into(),
            },
            rpc: RpcConfig {
                enabled: true,
                address: "/ip4/127.0.0.1/tcp/2504".into(),
            },
            p2p: P2pConfig {
                enabled: true,
                ..Default::default()
            },
            profile: ProfileConfig::default(),
            registry: RegistryConfig {
                location: "https://registry.qri.cloud".into(),
            },
            remote: None,
        }
    }
}

impl Config {
    /// The file this config was read from or will be written to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub fn has_identity(&self) -> bool {
        !self.p2p.priv_key.is_empty() && self.p2p.peer_id.is_some()
    }

    /// Fill in any missing identity fields from `generator`.
    ///
    /// Existing fields are never replaced. Returns `true` if a new key was
    /// generated.
    pub fn ensure_identity(&mut self, generator: &dyn KeyGenerator) -> bool {
        let mut generated = false;
        if !self.has_identity() {
            let (priv_key, peer_id) = generator.generate_private_key_and_peer_id();
            self.p2p.priv_key = priv_key;
            self.p2p.peer_id = Some(peer_id);
            generated = true;
        }
        if self.profile.priv_key.is_empty() {
            self.profile.priv_key = self.p2p.priv_key.clone();
            self.profile.id = self.p2p.peer_id.clone();
            if let Some(id) = &self.profile.id {
                self.profile.peername = generator.generate_nickname(id);
            }
            self.profile.created.get_or_insert_with(Utc::now);
        }
        generated
    }

    /// Decode the profile key and check it matches the recorded ids.
    pub fn signing_key(&self) -> RepoResult<SigningKey> {
        let key = SigningKey::from_hex(&self.profile.priv_key)
            .map_err(|e| RepoError::Identity(format!("profile key: {e}")))?;
        let derived = key.verifying_key().to_peer_id();
        if self.profile.id.as_ref() != Some(&derived) {
            return Err(RepoError::Identity(
                "profile id does not match profile key".into(),
            ));
        }
        if self.p2p.peer_id.as_ref() != Some(&derived) {
            return Err(RepoError::Identity("peer id does not match profile key".into()));
        }
        Ok(key)
    }

    /// Structural checks that do not depend on the filesystem.
    pub fn validate(&self) -> RepoResult<()> {
        if !self.has_identity() {
            return Err(RepoError::Config("p2p identity is not set".into()));
        }
        if self.profile.peername.is_empty() {
            return Err(RepoError::Config("profile peername is not set".into()));
        }
        crate::names::validate_username(&self.profile.peername)?;
        if let Some(remote) = &self.remote {
            if remote.accept_size_max < -1 || remote.accept_timeout_ms < -1 {
                return Err(RepoError::Config(
                    "remote limits must be -1 (unbounded) or non-negative".into(),
                ));
            }
        }
        Ok(())
    }

    /// Write to [`Config::path`].
    pub fn write_to_file(&self) -> RepoResult<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| RepoError::Config("config path is not set".into()))?;
        let text = toml::to_string_pretty(self).map_err(|e| RepoError::Serialization(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config: Config =
            toml::from_str(&text).map_err(|e| RepoError::Config(e.to_string()))?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }
}
