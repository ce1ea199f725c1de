//! Registry browsing and remote-sync handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tempreg_registry::{DatasetPush, Profile, SearchParams, SearchResult};
use tempreg_types::DatasetRef;
use tracing::info;

use crate::error::{ServerError, ServerResult};
use crate::response::{ok, Envelope};
use crate::router::AppState;

type Reply<T> = ServerResult<Json<Envelope<T>>>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub peer_id: Option<String>,
    pub peername: String,
    pub online: bool,
}

/// `?ref=<user>/<name>[@<profile_id>][/ipfs/<hash>]`
#[derive(Clone, Debug, Deserialize)]
pub struct RefQuery {
    #[serde(rename = "ref")]
    pub reference: String,
}

impl RefQuery {
    fn parse(&self) -> ServerResult<DatasetRef> {
        DatasetRef::parse(&self.reference).map_err(|e| ServerError::BadRequest(e.to_string()))
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let node = state.instance.node();
    Json(InfoResponse {
        name: "tempreg".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        peer_id: node.peer_id.as_ref().map(|id| id.to_hex()),
        peername: node.peername.clone(),
        online: node.online,
    })
}

pub async fn list_profiles(State(state): State<AppState>) -> Reply<Vec<Profile>> {
    Ok(ok(state.registry.profiles.list()?))
}

pub async fn put_profile(
    State(state): State<AppState>,
    Json(profile): Json<Profile>,
) -> Reply<Profile> {
    state.registry.profiles.put(profile.clone())?;
    info!(peername = %profile.peername, "registered profile");
    Ok(ok(profile))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Reply<Vec<SearchResult>> {
    Ok(ok(state.registry.search.search(&params).await?))
}

pub async fn remote_refs(State(state): State<AppState>) -> Reply<Vec<DatasetRef>> {
    Ok(ok(state.registry.remote.list_refs().await?))
}

pub async fn get_dataset(
    State(state): State<AppState>,
    Query(query): Query<RefQuery>,
) -> Reply<DatasetRef> {
    let reference = query.parse()?;
    Ok(ok(state.registry.remote.resolve(&reference).await?))
}

pub async fn receive_dataset(
    State(state): State<AppState>,
    Json(push): Json<DatasetPush>,
) -> Reply<DatasetRef> {
    Ok(ok(state.registry.remote.receive(push).await?))
}

pub async fn remove_dataset(
    State(state): State<AppState>,
    Query(query): Query<RefQuery>,
) -> Reply<DatasetRef> {
    let reference = query.parse()?;
    state.registry.remote.remove(&reference).await?;
    Ok(ok(reference))
}
