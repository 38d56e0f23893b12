#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::Notify;
use tower::ServiceExt;

use vtconsole_api::backend::{BackendError, KeyspaceService, LogSink, VtctlBackend};
use vtconsole_api::config::ServerConfig;
use vtconsole_api::router::build_app_router;
use vtconsole_api::state::AppState;
use vtconsole_core::keyspace::Keyspace;
use vtconsole_core::workflow::WorkflowNode;

// ---------------------------------------------------------------------------
// Fake backend
// ---------------------------------------------------------------------------

/// In-memory backend that records every call.
///
/// With `hold` set, `run_command` blocks until [`FakeBackend::release`] is
/// called, which keeps a dialog in its pending state for as long as a test
/// needs.
#[derive(Default)]
pub struct FakeBackend {
    pub keyspaces: Mutex<Vec<Keyspace>>,
    pub keyspace_fetches: AtomicUsize,
    pub commands: Mutex<Vec<Vec<String>>>,
    pub output: Mutex<Vec<String>>,
    pub command_error: Mutex<Option<String>>,
    pub hold: AtomicBool,
    release: Notify,
    pub workflow: Mutex<Option<WorkflowNode>>,
    pub triggered: Mutex<Vec<(String, String)>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_keyspace(self: Arc<Self>, name: &str, serving: &[&str], nonserving: &[&str]) -> Arc<Self> {
        let to_vec = |shards: &[&str]| -> Vec<String> { shards.iter().map(|s| s.to_string()).collect() };
        self.keyspaces.lock().unwrap().push(Keyspace {
            name: name.to_string(),
            serving_shards: Some(to_vec(serving)),
            nonserving_shards: Some(to_vec(nonserving)),
        });
        self
    }

    pub fn fail_commands_with(&self, error: &str) {
        *self.command_error.lock().unwrap() = Some(error.to_string());
    }

    pub fn set_output(&self, chunks: &[&str]) {
        *self.output.lock().unwrap() = chunks.iter().map(|s| s.to_string()).collect();
    }

    pub fn set_workflow(&self, node: WorkflowNode) {
        *self.workflow.lock().unwrap() = Some(node);
    }

    pub fn hold_commands(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn commands(&self) -> Vec<Vec<String>> {
        self.commands.lock().unwrap().clone()
    }

    pub fn triggered(&self) -> Vec<(String, String)> {
        self.triggered.lock().unwrap().clone()
    }

    pub fn keyspace_fetches(&self) -> usize {
        self.keyspace_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyspaceService for FakeBackend {
    async fn get_keyspaces(&self) -> Result<Vec<Keyspace>, BackendError> {
        Ok(self.keyspaces.lock().unwrap().clone())
    }

    async fn get_keyspace(&self, name: &str) -> Result<Keyspace, BackendError> {
        self.keyspace_fetches.fetch_add(1, Ordering::SeqCst);
        self.keyspaces
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.name == name)
            .cloned()
            .ok_or_else(|| BackendError::Api {
                status: 404,
                body: format!("keyspace {name} not found"),
            })
    }
}

#[async_trait]
impl VtctlBackend for FakeBackend {
    async fn run_command(&self, args: &[String], log: LogSink) -> Result<(), BackendError> {
        self.commands.lock().unwrap().push(args.to_vec());

        let chunks = self.output.lock().unwrap().clone();
        for chunk in chunks {
            let _ = log.send(chunk);
        }

        if self.hold.load(Ordering::SeqCst) {
            self.release.notified().await;
        }

        match self.command_error.lock().unwrap().clone() {
            Some(error) => Err(BackendError::Command(error)),
            None => Ok(()),
        }
    }

    async fn workflow_tree(&self) -> Result<WorkflowNode, BackendError> {
        self.workflow
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BackendError::Command("no workflow".to_string()))
    }

    async fn workflow_action(&self, path: &str, name: &str) -> Result<(), BackendError> {
        self.triggered
            .lock()
            .unwrap()
            .push((path.to_string(), name.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        dialog_idle_secs: 1800,
        vtctld_url: "http://vtctld.invalid".to_string(),
        vtctld_timeout_secs: 5,
    }
}

/// The production router over `backend`, plus the state behind it.
pub fn build_test_app(backend: Arc<FakeBackend>) -> (Router, AppState) {
    let state = AppState::new(test_config(), backend.clone(), backend);
    (build_app_router(state.clone()), state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn put_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll a dialog until its settings reach `state`.
pub async fn wait_for_state(app: &Router, dialog_id: &str, state: &str) -> serde_json::Value {
    for _ in 0..200 {
        let json = body_json(get(app, &format!("/api/v1/dialogs/{dialog_id}")).await).await;
        if json["data"]["settings"]["state"] == state {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("dialog {dialog_id} never reached state {state}");
}
