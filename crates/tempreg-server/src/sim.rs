//! `/sim/action`: run a named simulation action against the shared instance.

use axum::extract::{Query, State};
use axum::{Form, Json};
use serde::Deserialize;
use tempreg_harness::ActionContext;

use crate::error::ServerResult;
use crate::response::{ok, Envelope};
use crate::router::AppState;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ActionParams {
    #[serde(default)]
    pub action: String,
}

/// Reads `action` from a urlencoded form body if present, else from the query
/// string. Unknown keys answer 400, failed actions 500.
pub async fn sim_action(
    State(state): State<AppState>,
    Query(query): Query<ActionParams>,
    form: Option<Form<ActionParams>>,
) -> ServerResult<Json<Envelope<&'static str>>> {
    let key = match form {
        Some(Form(params)) if !params.action.is_empty() => params.action,
        _ => query.action,
    };
    let ctx = ActionContext::new(state.shutdown.clone());
    state.actions.dispatch(&key, &ctx, &state.instance).await?;
    Ok(ok("ok"))
}
