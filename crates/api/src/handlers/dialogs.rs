//! Handlers for action dialogs.
//!
//! A dialog is opened from a view action, edited flag by flag, submitted
//! once, and closed. Validation, preparation and backend failures are part
//! of the dialog state returned here, not HTTP errors.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use vtconsole_core::actions::{DashboardAction, KeyspaceAction, ViewAction, ORIGIN_KEYSPACE};
use vtconsole_core::content::ActionContent;
use vtconsole_core::error::CoreError;
use vtconsole_core::keyspace::{route_keyspace, KEYSPACE_PATH};

use crate::dialogs::{DialogSession, SubmitOutcome};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OpenKeyspaceDialog {
    pub action: KeyspaceAction,
}

#[derive(Debug, Deserialize)]
pub struct OpenDashboardDialog {
    pub action: DashboardAction,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SelectFlag {
    #[validate(length(max = 1024))]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct DialogStatus {
    pub open_dialogs: usize,
    pub can_deactivate: bool,
}

// ---------------------------------------------------------------------------
// Opening
// ---------------------------------------------------------------------------

/// POST /api/v1/keyspaces/{keyspace}/dialogs
///
/// Open a keyspace-view dialog. Once the action succeeds or the dialog is
/// closed, the keyspace view is refetched on next load.
pub async fn open_keyspace_dialog(
    State(state): State<AppState>,
    Path(keyspace): Path<String>,
    Json(input): Json<OpenKeyspaceDialog>,
) -> AppResult<impl IntoResponse> {
    let keyspace = route_keyspace(KEYSPACE_PATH, Some(keyspace.as_str()))
        .ok_or_else(|| AppError::BadRequest("keyspace must not be empty".into()))?
        .to_string();

    let (content, mut settings) = input.action.open_dialog(keyspace.as_str());
    let cache = Arc::clone(&state.keyspace_cache);
    settings.set_on_close(Box::new(move |content: &ActionContent| {
        match content
            .extra_params()
            .get(ORIGIN_KEYSPACE)
            .and_then(|v| v.as_str())
        {
            Some(keyspace) => cache.invalidate(keyspace),
            None => cache.invalidate_all(),
        }
    }));

    let session = state
        .dialogs
        .insert(DialogSession::new(content, settings, state.dispatcher.clone()))
        .await;

    tracing::info!(
        dialog_id = %session.id(),
        keyspace = %keyspace,
        action = ?input.action,
        "Dialog opened",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: session.snapshot().await,
        }),
    ))
}

/// POST /api/v1/dashboard/dialogs
pub async fn open_dashboard_dialog(
    State(state): State<AppState>,
    Json(input): Json<OpenDashboardDialog>,
) -> AppResult<impl IntoResponse> {
    let (content, mut settings) = input.action.open_dialog(&());
    let cache = Arc::clone(&state.keyspace_cache);
    settings.set_on_close(Box::new(move |_: &ActionContent| cache.invalidate_all()));

    let session = state
        .dialogs
        .insert(DialogSession::new(content, settings, state.dispatcher.clone()))
        .await;

    tracing::info!(dialog_id = %session.id(), action = ?input.action, "Dialog opened");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: session.snapshot().await,
        }),
    ))
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// GET /api/v1/dialogs
///
/// Navigation guard: `can_deactivate` is false while any dispatch is pending.
pub async fn dialog_status(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: DialogStatus {
            open_dialogs: state.dialogs.session_count().await,
            can_deactivate: state.dialogs.can_deactivate().await,
        },
    }))
}

/// GET /api/v1/dialogs/{id}
pub async fn get_dialog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let session = state.dialogs.get(id).await?;
    Ok(Json(DataResponse {
        data: session.snapshot().await,
    }))
}

// ---------------------------------------------------------------------------
// Editing and submission
// ---------------------------------------------------------------------------

/// PUT /api/v1/dialogs/{id}/flags/{name}
pub async fn select_flag(
    State(state): State<AppState>,
    Path((id, name)): Path<(Uuid, String)>,
    Json(input): Json<SelectFlag>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let session = state.dialogs.get(id).await?;
    session.on_select(&name, &input.value).await?;

    Ok(Json(DataResponse {
        data: session.snapshot().await,
    }))
}

/// POST /api/v1/dialogs/{id}/submit
///
/// Returns 200 when preparation failed (the form shows why) and 202 once
/// the command is running. Poll `GET /dialogs/{id}` for the outcome.
pub async fn submit_dialog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let session = state.dialogs.get(id).await?;

    let status = match session.submit().await {
        Ok(SubmitOutcome::PreparationFailed(_)) => StatusCode::OK,
        Ok(SubmitOutcome::Dispatched(_)) => StatusCode::ACCEPTED,
        Ok(SubmitOutcome::Discarded) => {
            return Err(CoreError::Conflict("the dialog was torn down".into()).into());
        }
        Err(e) => {
            tracing::info!(dialog_id = %id, error = %e, "Submit rejected");
            return Err(e.into());
        }
    };

    Ok((
        status,
        Json(DataResponse {
            data: session.snapshot().await,
        }),
    ))
}

/// DELETE /api/v1/dialogs/{id}
///
/// 409 while the dialog's dispatch is pending.
pub async fn close_dialog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    state.dialogs.close(id).await?;
    tracing::info!(dialog_id = %id, "Dialog closed");
    Ok(StatusCode::NO_CONTENT)
}
