use axum::routing::get;
use axum::Router;

use crate::handlers::keyspaces;
use crate::state::AppState;

/// Keyspace routes.
///
/// ```text
/// GET /keyspaces -> list_keyspaces
/// GET /keyspace  -> get_keyspace_view
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/keyspaces", get(keyspaces::list_keyspaces))
        .route("/keyspace", get(keyspaces::get_keyspace_view))
}
