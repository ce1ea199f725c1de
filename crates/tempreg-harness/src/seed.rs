use tempreg_repo::Instance;
use tempreg_types::DatasetRef;
use tracing::info;

use crate::actions::ActionRegistry;
use crate::context::ActionContext;
use crate::error::{HarnessError, HarnessResult};
use crate::synths::CREATE_SYNTHS;

/// Actions run at startup, in order.
pub const SEED_ACTIONS: &[&str] = &[CREATE_SYNTHS];

/// Run each of `keys` once against `instance`. Stops at the first failure,
/// which is reported as [`HarnessError::Seed`]; earlier saves are not rolled
/// back.
pub async fn seed(
    ctx: &ActionContext,
    instance: &Instance,
    actions: &ActionRegistry,
    keys: &[&str],
) -> HarnessResult<Vec<DatasetRef>> {
    let mut seeded = Vec::with_capacity(keys.len());
    for key in keys {
        let reference = actions
            .dispatch(key, ctx, instance)
            .await
            .map_err(|e| HarnessError::Seed {
                action: key.to_string(),
                source: Box::new(e),
            })?;
        seeded.push(reference);
    }
    info!(datasets = seeded.len(), "seeded registry");
    Ok(seeded)
}
