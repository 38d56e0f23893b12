//! Handlers for the dashboard keyspace list and the keyspace view.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use vtconsole_core::actions::{KeyspaceAction, ViewAction};
use vtconsole_core::keyspace::{route_keyspace, Keyspace, ShardListing, KEYSPACE_PATH};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /api/v1/keyspace`.
#[derive(Debug, Deserialize)]
pub struct KeyspaceQuery {
    pub keyspace: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct KeyspaceSummary {
    #[serde(flatten)]
    pub keyspace: Keyspace,
    pub shard_listing: ShardListing,
}

#[derive(Debug, Serialize)]
pub struct KeyspaceList {
    pub keyspaces: Vec<KeyspaceSummary>,
    pub keyspaces_ready: bool,
}

/// A button on the keyspace view.
#[derive(Debug, Serialize)]
pub struct ActionButton {
    pub action: KeyspaceAction,
    pub label: &'static str,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct KeyspaceView {
    #[serde(flatten)]
    pub summary: KeyspaceSummary,
    pub shards: Vec<String>,
    pub actions: Vec<ActionButton>,
}

impl From<Keyspace> for KeyspaceSummary {
    fn from(keyspace: Keyspace) -> Self {
        Self {
            shard_listing: keyspace.shard_listing(),
            keyspace,
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/keyspaces
pub async fn list_keyspaces(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let keyspaces = state.keyspaces.get_keyspaces().await?;

    Ok(Json(DataResponse {
        data: KeyspaceList {
            keyspaces: keyspaces.into_iter().map(KeyspaceSummary::from).collect(),
            keyspaces_ready: true,
        },
    }))
}

// ---------------------------------------------------------------------------
// Keyspace view
// ---------------------------------------------------------------------------

/// GET /api/v1/keyspace?keyspace={name}
///
/// Served from the keyspace cache; a successful action on the keyspace
/// forces the next call to refetch.
pub async fn get_keyspace_view(
    State(state): State<AppState>,
    Query(query): Query<KeyspaceQuery>,
) -> AppResult<impl IntoResponse> {
    let name = route_keyspace(KEYSPACE_PATH, query.keyspace.as_deref())
        .ok_or_else(|| AppError::BadRequest("keyspace query parameter is required".into()))?;

    let keyspace = state
        .keyspace_cache
        .load(state.keyspaces.as_ref(), name)
        .await?;

    let actions = KeyspaceAction::all()
        .iter()
        .map(|&action| ActionButton {
            action,
            label: action.label(),
            title: action.title(name),
        })
        .collect();

    Ok(Json(DataResponse {
        data: KeyspaceView {
            shards: keyspace.all_shards(),
            summary: KeyspaceSummary::from(keyspace),
            actions,
        },
    }))
}
