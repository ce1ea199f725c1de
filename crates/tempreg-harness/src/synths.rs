//! The canned `synths` dataset actions.

use async_trait::async_trait;
use bytes::Bytes;
use tempreg_repo::{Dataset, Instance, Meta, SaveParams};
use tempreg_types::DatasetRef;
use tracing::{error, info};

use crate::actions::{ActionError, SimAction};
use crate::context::ActionContext;

pub const CREATE_SYNTHS: &str = "createsynthsdataset";
pub const APPEND_SYNTHS: &str = "appendsynthsdataset";

pub const SYNTHS_REF: &str = "me/synths";
pub const SYNTHS_TITLE: &str = "synthesizers";
pub const SYNTHS_DESCRIPTION: &str = "A list of great types of synthesizers";

pub const SYNTHS_BODY: &str = "company,name,year_of_release,initial_cost,initial_cost_adjusted
moog,little phatty,,,,
moog,sub 37,,,,
moog,subsequent 37,,,,
";

pub const SYNTHS_APPENDED_BODY: &str = "company,name,year_of_release,initial_cost,initial_cost_adjusted
moog,little phatty,,,,
moog,sub 37,,,,
moog,subsequent 37,,,,
novation,bass station,,,,
";

/// Save a version of a dataset, then publish it.
#[derive(Clone, Debug)]
pub struct SaveAndPublish {
    label: &'static str,
    reference: String,
    meta: Option<Meta>,
    body_path: String,
    body: Bytes,
}

impl SaveAndPublish {
    pub fn new(label: &'static str, reference: impl Into<String>, body: Bytes) -> Self {
        Self {
            label,
            reference: reference.into(),
            meta: None,
            body_path: "body.csv".into(),
            body,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// First version of `synths`: three Moog rows with title and description.
pub fn create_synths_dataset() -> SaveAndPublish {
    SaveAndPublish::new("createSynthsDataset", SYNTHS_REF, Bytes::from_static(SYNTHS_BODY.as_bytes()))
        .with_meta(Meta::new(SYNTHS_TITLE, SYNTHS_DESCRIPTION))
}

/// Next version of `synths`: the Moog rows plus a Novation row. Metadata
/// carries over from the previous version.
pub fn append_synths_dataset() -> SaveAndPublish {
    SaveAndPublish::new(
        "appendSynthsDataset",
        SYNTHS_REF,
        Bytes::from_static(SYNTHS_APPENDED_BODY.as_bytes()),
    )
}

#[async_trait]
impl SimAction for SaveAndPublish {
    async fn run(&self, ctx: &ActionContext, instance: &Instance) -> Result<DatasetRef, ActionError> {
        if ctx.is_cancelled() {
            return Err(ActionError::Cancelled);
        }
        let params = SaveParams {
            reference: self.reference.clone(),
            dataset: Dataset {
                meta: self.meta.clone(),
                body_path: self.body_path.clone(),
                ..Default::default()
            },
            body: self.body.clone(),
        };
        let label = self.label;

        let inst = instance.clone();
        let reference = tokio::task::spawn_blocking(move || -> Result<DatasetRef, ActionError> {
            let saved = inst.repo().save(params).map_err(|e| {
                error!("{label}: error saving dataset: {e}");
                ActionError::Save(e)
            })?;
            let reference = saved.to_ref();
            inst.repo()
                .set_publish_status(&reference, true)
                .map_err(|e| {
                    error!(dataset = %reference, "{label}: error setting published status: {e}");
                    ActionError::Publish {
                        reference: reference.clone(),
                        source: e,
                    }
                })?;
            Ok(reference)
        })
        .await
        .map_err(|e| ActionError::Task(e.to_string()))??;

        info!(dataset = %reference, "{label} dataset saved");
        Ok(reference)
    }
}
