use axum::routing::{get, post};
use axum::Router;

use crate::handlers::workflows;
use crate::state::AppState;

/// Workflow routes.
///
/// ```text
/// GET  /workflows       -> get_workflow_tree
/// POST /workflows/click -> click_workflow
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/workflows", get(workflows::get_workflow_tree))
        .route("/workflows/click", post(workflows::click_workflow))
}
