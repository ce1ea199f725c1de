use std::time::Duration;

use tempreg_repo::RemoteConfig;

use crate::error::{RegistryError, RegistryResult};

/// Sentinel for "no limit" in [`RemoteConfig`] numeric fields.
pub const UNBOUNDED: i64 = -1;

/// Validated form of [`RemoteConfig`]. `None` limits are unbounded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemotePolicy {
    pub enabled: bool,
    pub accept_size_max: Option<u64>,
    pub accept_timeout: Option<Duration>,
    pub require_all_blocks: bool,
    pub allow_removes: bool,
}

fn limit(field: &str, value: i64) -> RegistryResult<Option<u64>> {
    match value {
        UNBOUNDED => Ok(None),
        v if v < 0 => Err(RegistryError::InvalidPolicy(format!(
            "{field} must be -1 or non-negative, got {v}"
        ))),
        v => Ok(Some(v as u64)),
    }
}

impl RemotePolicy {
    /// Validate `config`.
    ///
    /// An enabled remote with a zero size limit or zero timeout could never
    /// accept a transfer and is rejected as contradictory.
    pub fn from_config(config: &RemoteConfig) -> RegistryResult<Self> {
        let accept_size_max = limit("accept_size_max", config.accept_size_max)?;
        let accept_timeout =
            limit("accept_timeout_ms", config.accept_timeout_ms)?.map(Duration::from_millis);

        if config.enabled {
            if accept_size_max == Some(0) {
                return Err(RegistryError::InvalidPolicy(
                    "enabled remote accepts no bytes (accept_size_max = 0)".into(),
                ));
            }
            if accept_timeout == Some(Duration::ZERO) {
                return Err(RegistryError::InvalidPolicy(
                    "enabled remote times out immediately (accept_timeout_ms = 0)".into(),
                ));
            }
        }

        Ok(Self {
            enabled: config.enabled,
            accept_size_max,
            accept_timeout,
            require_all_blocks: config.require_all_blocks,
            allow_removes: config.allow_removes,
        })
    }
}
