use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::dialogs;
use crate::state::AppState;

/// Dialog routes.
///
/// ```text
/// POST   /keyspaces/{keyspace}/dialogs  -> open_keyspace_dialog
/// POST   /dashboard/dialogs             -> open_dashboard_dialog
/// GET    /dialogs                       -> dialog_status
/// GET    /dialogs/{id}                  -> get_dialog
/// DELETE /dialogs/{id}                  -> close_dialog
/// PUT    /dialogs/{id}/flags/{name}     -> select_flag
/// POST   /dialogs/{id}/submit           -> submit_dialog
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/keyspaces/{keyspace}/dialogs",
            post(dialogs::open_keyspace_dialog),
        )
        .route("/dashboard/dialogs", post(dialogs::open_dashboard_dialog))
        .route("/dialogs", get(dialogs::dialog_status))
        .route(
            "/dialogs/{id}",
            get(dialogs::get_dialog).delete(dialogs::close_dialog),
        )
        .route("/dialogs/{id}/flags/{name}", put(dialogs::select_flag))
        .route("/dialogs/{id}/submit", post(dialogs::submit_dialog))
}
