//! Contracts for the cluster backend.
//!
//! Handlers and the dispatcher only see these traits; [`http::VtctldClient`]
//! is the production implementation and the integration tests plug in a fake.

pub mod http;

use async_trait::async_trait;
use tokio::sync::mpsc;
use vtconsole_core::keyspace::Keyspace;
use vtconsole_core::workflow::WorkflowNode;

/// Where a running command writes its output, one chunk at a time.
pub type LogSink = mpsc::UnboundedSender<String>;

/// Errors from the backend layer.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("vtctld API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The command ran and reported an error.
    #[error("{0}")]
    Command(String),
}

/// Read access to keyspaces.
#[async_trait]
pub trait KeyspaceService: Send + Sync {
    /// All keyspaces, each with its shard lists resolved.
    async fn get_keyspaces(&self) -> Result<Vec<Keyspace>, BackendError>;

    async fn get_keyspace(&self, name: &str) -> Result<Keyspace, BackendError>;
}

/// Command execution and workflow control.
#[async_trait]
pub trait VtctlBackend: Send + Sync {
    /// Run one vtctl command given its full argument vector.
    ///
    /// Output is written to `log` as it becomes available; the sink is
    /// dropped when the call returns.
    async fn run_command(&self, args: &[String], log: LogSink) -> Result<(), BackendError>;

    /// A fresh snapshot of the workflow tree.
    async fn workflow_tree(&self) -> Result<WorkflowNode, BackendError>;

    /// Trigger the action `name` on the workflow node at `path`.
    async fn workflow_action(&self, path: &str, name: &str) -> Result<(), BackendError>;
}
