//! Handlers for the workflow tree.
//!
//! Every call renders a fresh snapshot from the backend; nothing is kept
//! between requests.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use vtconsole_core::workflow::{ClickOutcome, ClickTarget, WorkflowTree};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClickResponse {
    /// `null` when the click did nothing.
    pub outcome: Option<ClickOutcome>,
}

/// GET /api/v1/workflows
pub async fn get_workflow_tree(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let tree = WorkflowTree::new(state.vtctl.workflow_tree().await?);
    Ok(Json(DataResponse {
        data: tree.render(),
    }))
}

/// POST /api/v1/workflows/click
///
/// Resolve a click against the current tree. An action click triggers the
/// action on the backend and never toggles the enclosing node.
pub async fn click_workflow(
    State(state): State<AppState>,
    Json(target): Json<ClickTarget>,
) -> AppResult<impl IntoResponse> {
    let tree = WorkflowTree::new(state.vtctl.workflow_tree().await?);
    let outcome = tree.render().click(&target);

    if let Some(ClickOutcome::TriggerAction { path, name }) = &outcome {
        state.dispatcher.trigger_workflow_action(path, name).await?;
    }

    Ok(Json(DataResponse {
        data: ClickResponse { outcome },
    }))
}
