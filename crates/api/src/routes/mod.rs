pub mod dialogs;
pub mod health;
pub mod keyspaces;
pub mod workflows;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /keyspaces                                  list keyspaces (GET)
/// /keyspace?keyspace={name}                   keyspace view (GET)
///
/// /keyspaces/{keyspace}/dialogs               open a keyspace dialog (POST)
/// /dashboard/dialogs                          open a dashboard dialog (POST)
/// /dialogs                                    navigation guard (GET)
/// /dialogs/{id}                               snapshot, close (GET, DELETE)
/// /dialogs/{id}/flags/{name}                  set a flag value (PUT)
/// /dialogs/{id}/submit                        prepare and dispatch (POST)
///
/// /workflows                                  rendered workflow tree (GET)
/// /workflows/click                            evaluate a click (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(keyspaces::router())
        .merge(dialogs::router())
        .merge(workflows::router())
}
