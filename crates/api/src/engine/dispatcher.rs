//! Runs a prepared dialog action against the backend.
//!
//! The dispatcher owns the `Dispatching → Succeeded | Failed` half of the
//! dialog lifecycle. Output is appended to the dialog log in arrival order
//! while the command runs. If the dialog's cancellation token fires first,
//! the call is abandoned and nothing it produces reaches the dialog.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::backend::{BackendError, VtctlBackend};
use crate::dialogs::{Dialog, SharedDialog};

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Succeeded,
    /// Carries the final dialog message.
    Failed(String),
    /// The dialog was torn down before the backend answered.
    Discarded,
}

#[derive(Clone)]
pub struct ActionDispatcher {
    backend: Arc<dyn VtctlBackend>,
}

impl ActionDispatcher {
    pub fn new(backend: Arc<dyn VtctlBackend>) -> Self {
        Self { backend }
    }

    /// Run `action_name` with the dialog's current flags.
    ///
    /// The dialog must already be `Dispatching`. Failure messages use the
    /// error prefix configured on the dialog's settings.
    pub async fn server_call(
        &self,
        action_name: &str,
        dialog: &SharedDialog,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        let args = {
            let guard = dialog.lock().await;
            guard.content.command_args(action_name)
        };
        let args = match args {
            Ok(args) => args,
            Err(e) => return resolve(dialog, cancel, Err(e.to_string())).await,
        };

        tracing::debug!(action = %action_name, args = ?args, "Running vtctl command");

        let (log_tx, mut log_rx) = mpsc::unbounded_channel::<String>();
        let mut call = self.backend.run_command(&args, log_tx);

        let result = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(action = %action_name, "Dialog torn down, discarding pending dispatch");
                    return DispatchOutcome::Discarded;
                }
                Some(chunk) = log_rx.recv() => {
                    let mut guard = dialog.lock().await;
                    if cancel.is_cancelled() {
                        return DispatchOutcome::Discarded;
                    }
                    guard.settings.append_log(&chunk);
                }
                result = &mut call => break result,
            }
        };

        // Output sent just before the call returned is still queued.
        {
            let mut guard = dialog.lock().await;
            if cancel.is_cancelled() {
                return DispatchOutcome::Discarded;
            }
            while let Ok(chunk) = log_rx.try_recv() {
                guard.settings.append_log(&chunk);
            }
        }

        match &result {
            Ok(()) => tracing::info!(action = %action_name, "Dispatch succeeded"),
            Err(e) => tracing::warn!(action = %action_name, error = %e, "Dispatch failed"),
        }
        resolve(dialog, cancel, result.map_err(|e| e.to_string())).await
    }

    /// Forward a workflow action click to the backend.
    pub async fn trigger_workflow_action(&self, path: &str, name: &str) -> Result<(), BackendError> {
        tracing::info!(path = %path, action = %name, "Triggering workflow action");
        self.backend.workflow_action(path, name).await
    }
}

/// Move the dialog to its final state, unless it was torn down meanwhile.
async fn resolve(
    dialog: &SharedDialog,
    cancel: &CancellationToken,
    result: Result<(), String>,
) -> DispatchOutcome {
    let mut guard = dialog.lock().await;
    if cancel.is_cancelled() {
        return DispatchOutcome::Discarded;
    }
    let Dialog { content, settings } = &mut *guard;

    let transition = match &result {
        Ok(()) => settings.succeed(content),
        Err(error) => settings.fail(content, error),
    };
    if let Err(e) = transition {
        tracing::error!(error = %e, "Dialog was not dispatching when the backend answered");
        return DispatchOutcome::Discarded;
    }

    match result {
        Ok(()) => DispatchOutcome::Succeeded,
        Err(_) => DispatchOutcome::Failed(settings.message().to_string()),
    }
}
