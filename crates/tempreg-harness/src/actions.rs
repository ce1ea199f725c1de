//! Simulation actions and the registry that dispatches them.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tempreg_repo::{Instance, RepoError};
use tempreg_types::DatasetRef;
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument, Span};

use crate::context::ActionContext;
use crate::error::{HarnessError, HarnessResult};
use crate::synths::{append_synths_dataset, create_synths_dataset, APPEND_SYNTHS, CREATE_SYNTHS};

/// Why an action failed.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("saving dataset: {0}")]
    Save(#[source] RepoError),

    /// The save succeeded; `reference` is the version left unpublished.
    #[error("setting publish status of {reference}: {source}")]
    Publish {
        reference: DatasetRef,
        #[source]
        source: RepoError,
    },

    #[error("action cancelled")]
    Cancelled,

    #[error("action task failed: {0}")]
    Task(String),
}

/// Something that simulates real-world activity against an instance.
#[async_trait]
pub trait SimAction: Send + Sync {
    /// Run once and return the reference of the version it produced.
    async fn run(&self, ctx: &ActionContext, instance: &Instance) -> Result<DatasetRef, ActionError>;
}

/// Immutable table of actions keyed by lower-case name.
#[derive(Clone)]
pub struct ActionRegistry {
    actions: BTreeMap<String, Arc<dyn SimAction>>,
    span: Span,
}

#[derive(Default)]
pub struct ActionRegistryBuilder {
    actions: BTreeMap<String, Arc<dyn SimAction>>,
}

impl ActionRegistryBuilder {
    /// Add an action. Keys are case-folded; a repeated key replaces the
    /// earlier action.
    pub fn register(mut self, key: &str, action: impl SimAction + 'static) -> Self {
        self.actions.insert(key.to_lowercase(), Arc::new(action));
        self
    }

    pub fn build(self) -> ActionRegistry {
        ActionRegistry {
            actions: self.actions,
            span: info_span!("sim_action"),
        }
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("keys", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ActionRegistry {
    pub fn builder() -> ActionRegistryBuilder {
        ActionRegistryBuilder::default()
    }

    /// `createsynthsdataset` and `appendsynthsdataset`.
    pub fn standard() -> Self {
        Self::builder()
            .register(CREATE_SYNTHS, create_synths_dataset())
            .register(APPEND_SYNTHS, append_synths_dataset())
            .build()
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.actions.contains_key(&key.to_lowercase())
    }

    /// Look up `key` case-insensitively and run it.
    pub async fn dispatch(
        &self,
        key: &str,
        ctx: &ActionContext,
        instance: &Instance,
    ) -> HarnessResult<DatasetRef> {
        let key = key.to_lowercase();
        let span = self.span.clone();
        async {
            let Some(action) = self.actions.get(&key) else {
                warn!(action = %key, "action not found");
                return Err(HarnessError::ActionNotFound { key });
            };
            info!(action = %key, run_id = %ctx.run_id(), "running action");
            match action.run(ctx, instance).await {
                Ok(reference) => {
                    info!(action = %key, run_id = %ctx.run_id(), dataset = %reference, "action finished");
                    Ok(reference)
                }
                Err(e) => {
                    error!(run_id = %ctx.run_id(), "running action {key}: {e}");
                    Err(HarnessError::ActionExecution { action: key, source: e })
                }
            }
        }
        .instrument(span)
        .await
    }
}
