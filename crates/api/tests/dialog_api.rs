//! HTTP-level tests for the dialog lifecycle: open, edit, submit, resolve,
//! close.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::Router;
use common::{
    body_json, build_test_app, delete, get, post, post_json, put_json, wait_for_state, FakeBackend,
};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::Notify;
use uuid::Uuid;
use vtconsole_api::dialogs::{DialogSession, SubmitOutcome};
use vtconsole_core::content::{ActionContent, PrepareResponse, Transform};
use vtconsole_core::error::CoreError;
use vtconsole_core::flag::Flag;
use vtconsole_core::settings::{ActionSettings, ActionState};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn open_keyspace_dialog(app: &Router, keyspace: &str, action: &str) -> Value {
    let response = post_json(
        app,
        &format!("/api/v1/keyspaces/{keyspace}/dialogs"),
        json!({ "action": action }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn open_dashboard_dialog(app: &Router, action: &str) -> Value {
    let response = post_json(app, "/api/v1/dashboard/dialogs", json!({ "action": action })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn select(app: &Router, id: &str, flag: &str, value: &str) -> axum::http::Response<axum::body::Body> {
    put_json(
        app,
        &format!("/api/v1/dialogs/{id}/flags/{flag}"),
        json!({ "value": value }),
    )
    .await
}

fn dialog_id(dialog: &Value) -> String {
    dialog["id"].as_str().unwrap().to_string()
}

/// Open a remove-cell dialog with `cell_name` filled in.
async fn remove_cell_dialog(app: &Router) -> String {
    let dialog = open_keyspace_dialog(app, "ks1", "RemoveKeyspaceCell").await;
    let id = dialog_id(&dialog);
    assert_eq!(select(app, &id, "cell_name", "cell1").await.status(), StatusCode::OK);
    id
}

// ---------------------------------------------------------------------------
// Opening
// ---------------------------------------------------------------------------

#[tokio::test]
async fn opened_dialog_starts_idle_on_the_form() {
    let (app, _) = build_test_app(FakeBackend::new());

    let dialog = open_keyspace_dialog(&app, "ks1", "ValidateKeyspace").await;

    assert_eq!(dialog["name"], "ks1");
    assert_eq!(dialog["settings"]["state"], "idle");
    assert_eq!(dialog["settings"]["title"], "Validate ks1");
    assert_eq!(dialog["settings"]["action_label"], "Validate");
    assert_eq!(dialog["settings"]["show_form"], true);
    assert_eq!(dialog["settings"]["pending"], false);
    assert_eq!(dialog["settings"]["modal_open"], true);
    assert_eq!(dialog["command_preview"], "ValidateKeyspace ks1");
    assert_eq!(dialog["form_fields"], json!(["ping-tablets"]));
}

#[tokio::test]
async fn unknown_action_is_rejected() {
    let (app, _) = build_test_app(FakeBackend::new());

    let response = post_json(
        &app,
        "/api/v1/keyspaces/ks1/dialogs",
        json!({ "action": "DropEverything" }),
    )
    .await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn unknown_dialog_returns_404() {
    let (app, _) = build_test_app(FakeBackend::new());

    let response = get(&app, &format!("/api/v1/dialogs/{}", Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn command_preview_follows_flag_edits() {
    let (app, _) = build_test_app(FakeBackend::new());
    let dialog = open_dashboard_dialog(&app, "CreateKeyspace").await;
    let id = dialog_id(&dialog);
    assert!(dialog.get("command_preview").is_none());

    select(&app, &id, "keyspace_name", "test_keyspace3").await;
    select(&app, &id, "sharding_column_name", "test_id").await;
    let response = select(&app, &id, "sharding_column_type", "UINT64").await;
    let json = body_json(response).await;

    assert_eq!(
        json["data"]["command_preview"],
        "CreateKeyspace -sharding_column_name=test_id -sharding_column_type=UINT64 test_keyspace3"
    );
}

#[tokio::test]
async fn malformed_selection_is_a_validation_error() {
    let (app, _) = build_test_app(FakeBackend::new());
    let id = dialog_id(&open_dashboard_dialog(&app, "CreateKeyspace").await);

    let response = select(&app, &id, "sharding_column_type", "FLOAT").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unknown_flag_returns_404() {
    let (app, _) = build_test_app(FakeBackend::new());
    let id = dialog_id(&open_dashboard_dialog(&app, "Validate").await);

    let response = select(&app, &id, "no_such_flag", "x").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_value_is_a_bad_request() {
    let (app, _) = build_test_app(FakeBackend::new());
    let id = dialog_id(&open_dashboard_dialog(&app, "CreateKeyspace").await);

    let response = select(&app, &id, "keyspace_name", &"k".repeat(2000)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_cell_scenario_resolves_success_message() {
    let backend = FakeBackend::new();
    backend.set_output(&["Removing cell1\n", "done\n"]);
    let (app, _) = build_test_app(backend.clone());
    let id = remove_cell_dialog(&app).await;

    let response = post(&app, &format!("/api/v1/dialogs/{id}/submit")).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let json = wait_for_state(&app, &id, "succeeded").await;
    let settings = &json["data"]["settings"];
    assert_eq!(settings["message"], "Removed cell1");
    assert_eq!(settings["pending"], false);
    assert_eq!(settings["show_log"], true);
    assert_eq!(settings["log"], json!(["Removing cell1", "done"]));

    assert_eq!(
        backend.commands(),
        vec![vec!["RemoveKeyspaceCell", "ks1", "cell1"]]
    );
}

#[tokio::test]
async fn empty_required_flag_never_reaches_the_backend() {
    let backend = FakeBackend::new();
    let (app, _) = build_test_app(backend.clone());
    let id = dialog_id(&open_keyspace_dialog(&app, "ks1", "RemoveKeyspaceCell").await);

    let response = post(&app, &format!("/api/v1/dialogs/{id}/submit")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let settings = &json["data"]["settings"];
    assert_eq!(settings["state"], "preparation_failed");
    assert_eq!(settings["show_form"], true);
    assert_eq!(
        settings["message"],
        "There was a problem preparing : missing required parameter `cell_name`"
    );
    assert!(backend.commands().is_empty());

    // The form stays editable and can be resubmitted.
    select(&app, &id, "cell_name", "cell1").await;
    let response = post(&app, &format!("/api/v1/dialogs/{id}/submit")).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    wait_for_state(&app, &id, "succeeded").await;
}

#[tokio::test]
async fn backend_failure_is_prefixed_and_final() {
    let backend = FakeBackend::new();
    backend.fail_commands_with("node doesn't exist");
    let (app, _) = build_test_app(backend.clone());
    let id = remove_cell_dialog(&app).await;

    post(&app, &format!("/api/v1/dialogs/{id}/submit")).await;
    let json = wait_for_state(&app, &id, "failed").await;
    assert_eq!(
        json["data"]["settings"]["message"],
        "There was a problem removing cell1: node doesn't exist"
    );

    let response = post(&app, &format!("/api/v1/dialogs/{id}/submit")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(backend.commands().len(), 1);
}

#[tokio::test]
async fn create_shard_runs_with_derived_shard_ref() {
    let backend = FakeBackend::new();
    let (app, _) = build_test_app(backend.clone());
    let id = dialog_id(&open_keyspace_dialog(&app, "ks1", "CreateShard").await);

    select(&app, &id, "lower_bound", "80").await;
    select(&app, &id, "parent", "true").await;
    post(&app, &format!("/api/v1/dialogs/{id}/submit")).await;

    let json = wait_for_state(&app, &id, "succeeded").await;
    assert_eq!(json["data"]["name"], "ks1/80-");
    assert_eq!(json["data"]["settings"]["message"], "Created ks1/80-");
    assert_eq!(
        backend.commands(),
        vec![vec!["CreateShard", "-parent=true", "ks1/80-"]]
    );
}

#[tokio::test]
async fn dashboard_validate_passes_ping_tablets() {
    let backend = FakeBackend::new();
    let (app, _) = build_test_app(backend.clone());
    let id = dialog_id(&open_dashboard_dialog(&app, "Validate").await);

    select(&app, &id, "ping-tablets", "true").await;
    post(&app, &format!("/api/v1/dialogs/{id}/submit")).await;
    wait_for_state(&app, &id, "succeeded").await;

    assert_eq!(
        backend.commands(),
        vec![vec!["Validate", "-ping-tablets=true"]]
    );
    let dialog = body_json(get(&app, &format!("/api/v1/dialogs/{id}")).await).await;
    assert_eq!(dialog["data"]["name"], "all nodes");
}

// ---------------------------------------------------------------------------
// Pending dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pending_dialog_blocks_resubmit_close_and_navigation() {
    let backend = FakeBackend::new();
    backend.hold_commands();
    backend.set_output(&["working\n"]);
    let (app, _) = build_test_app(backend.clone());
    let id = remove_cell_dialog(&app).await;

    post(&app, &format!("/api/v1/dialogs/{id}/submit")).await;
    let json = wait_for_state(&app, &id, "dispatching").await;
    assert_eq!(json["data"]["settings"]["pending"], true);
    assert_eq!(json["data"]["settings"]["show_form"], false);

    let status = body_json(get(&app, "/api/v1/dialogs").await).await;
    assert_eq!(status["data"]["can_deactivate"], false);

    let response = post(&app, &format!("/api/v1/dialogs/{id}/submit")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = delete(&app, &format!("/api/v1/dialogs/{id}")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "cannot deactivate while an action is pending"
    );

    let response = select(&app, &id, "force", "true").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    backend.release();
    wait_for_state(&app, &id, "succeeded").await;
    assert_eq!(backend.commands().len(), 1);

    let status = body_json(get(&app, "/api/v1/dialogs").await).await;
    assert_eq!(status["data"]["can_deactivate"], true);

    let response = delete(&app, &format!("/api/v1/dialogs/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get(&app, &format!("/api/v1/dialogs/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn teardown_discards_late_backend_response() {
    let backend = FakeBackend::new();
    backend.hold_commands();
    let (app, state) = build_test_app(backend.clone());
    let id = remove_cell_dialog(&app).await;
    let uuid: Uuid = id.parse().unwrap();

    post(&app, &format!("/api/v1/dialogs/{id}/submit")).await;
    wait_for_state(&app, &id, "dispatching").await;

    let session = state.dialogs.get(uuid).await.unwrap();
    state.dialogs.teardown(uuid).await.unwrap();
    backend.release();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // The session kept its last state; the late success never landed.
    let snapshot = session.snapshot().await;
    assert!(snapshot.settings.pending);
    assert_ne!(snapshot.settings.message, "Removed cell1");

    assert!(state.dialogs.can_deactivate().await);
    assert_matches!(
        state.dialogs.get(uuid).await,
        Err(CoreError::NotFound { entity: "Dialog", .. })
    );
}

#[tokio::test]
async fn shutdown_all_tears_down_every_dialog() {
    let backend = FakeBackend::new();
    backend.hold_commands();
    let (app, state) = build_test_app(backend.clone());
    let pending = remove_cell_dialog(&app).await;
    open_dashboard_dialog(&app, "Validate").await;

    post(&app, &format!("/api/v1/dialogs/{pending}/submit")).await;
    wait_for_state(&app, &pending, "dispatching").await;
    assert_eq!(state.dialogs.session_count().await, 2);

    state.dialogs.shutdown_all().await;

    assert_eq!(state.dialogs.session_count().await, 0);
    assert!(state.dialogs.can_deactivate().await);
    backend.release();
}

// ---------------------------------------------------------------------------
// Closing while preparing
// ---------------------------------------------------------------------------

/// A remove-cell dialog whose transform waits on `gate`.
fn gated_remove_cell(gate: Arc<Notify>) -> (ActionContent, ActionSettings) {
    let content = ActionContent::new(
        "cell_name",
        [Flag::input("cell_name", "Cell Name")
            .with_value("cell1")
            .required()
            .positional()],
    )
    .with_transform(Transform::from_async(move |flags| {
        let gate = Arc::clone(&gate);
        Box::pin(async move {
            gate.notified().await;
            PrepareResponse::ok(flags)
        })
    }));
    let mut settings = ActionSettings::new("Remove", "RemoveKeyspaceCell", "Remove a cell")
        .with_success_template("Removed {{cell_name}}");
    settings.toggle_modal();
    (content, settings)
}

#[tokio::test]
async fn closing_during_async_prepare_never_dispatches() {
    let backend = FakeBackend::new();
    let (_, state) = build_test_app(backend.clone());
    let gate = Arc::new(Notify::new());
    let (content, settings) = gated_remove_cell(Arc::clone(&gate));
    let session = state
        .dialogs
        .insert(DialogSession::new(content, settings, state.dispatcher.clone()))
        .await;

    let submit = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.submit().await }
    });
    for _ in 0..200 {
        if session.snapshot().await.settings.state == ActionState::Preparing {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    assert_eq!(session.snapshot().await.settings.state, ActionState::Preparing);

    state.dialogs.close(session.id()).await.unwrap();
    gate.notify_one();

    let outcome = submit.await.unwrap().unwrap();
    assert_matches!(outcome, SubmitOutcome::Discarded);
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    assert!(backend.commands().is_empty());
    let snapshot = session.snapshot().await;
    assert_ne!(snapshot.settings.state, ActionState::Succeeded);
    assert!(!snapshot.settings.modal_open);
    assert_matches!(
        state.dialogs.get(session.id()).await,
        Err(CoreError::NotFound { entity: "Dialog", .. })
    );
}

// ---------------------------------------------------------------------------
// Idle eviction
// ---------------------------------------------------------------------------

#[tokio::test]
async fn idle_dialogs_are_evicted_but_pending_ones_kept() {
    let backend = FakeBackend::new();
    backend.hold_commands();
    let (app, state) = build_test_app(backend.clone());
    let pending = remove_cell_dialog(&app).await;
    let idle = dialog_id(&open_dashboard_dialog(&app, "CreateKeyspace").await);

    post(&app, &format!("/api/v1/dialogs/{pending}/submit")).await;
    wait_for_state(&app, &pending, "dispatching").await;

    // Nothing has been idle for half an hour yet.
    assert_eq!(state.dialogs.evict_idle(chrono::Duration::minutes(30)).await, 0);
    assert_eq!(state.dialogs.session_count().await, 2);

    assert_eq!(state.dialogs.evict_idle(chrono::Duration::zero()).await, 1);
    let response = get(&app, &format!("/api/v1/dialogs/{idle}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = get(&app, &format!("/api/v1/dialogs/{pending}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    backend.release();
    wait_for_state(&app, &pending, "succeeded").await;
    assert_eq!(state.dialogs.evict_idle(chrono::Duration::zero()).await, 1);
    assert_eq!(state.dialogs.session_count().await, 0);
}
