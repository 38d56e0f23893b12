use std::fmt;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;
use vtconsole_core::content::ActionContent;
use vtconsole_core::error::CoreError;
use vtconsole_core::flag::Flag;
use vtconsole_core::settings::{ActionSettings, ActionState, SettingsView};

use crate::engine::{ActionDispatcher, DispatchOutcome};

/// The content/settings pair behind one open dialog.
#[derive(Debug)]
pub struct Dialog {
    pub content: ActionContent,
    pub settings: ActionSettings,
}

pub type SharedDialog = Arc<Mutex<Dialog>>;

/// What a client needs to draw a dialog.
#[derive(Debug, Clone, Serialize)]
pub struct DialogSnapshot {
    pub id: Uuid,
    pub name: String,
    pub flags: Vec<Flag>,
    /// Names of the flags drawn as form fields, in display order.
    pub form_fields: Vec<String>,
    pub settings: SettingsView,
    /// The vtctl command the current flags would run, once they are complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_preview: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

/// Result of a submit that was accepted.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Local validation or the transform rejected the flags. Carries the
    /// message now shown on the form.
    PreparationFailed(String),
    /// The command is running in the background.
    Dispatched(JoinHandle<DispatchOutcome>),
    /// The dialog was torn down while preparing.
    Discarded,
}

/// One open dialog and the subscription to its in-flight dispatch.
pub struct DialogSession {
    id: Uuid,
    dialog: SharedDialog,
    cancel: CancellationToken,
    dispatcher: ActionDispatcher,
    opened_at: DateTime<Utc>,
    last_activity: StdMutex<DateTime<Utc>>,
}

impl DialogSession {
    pub fn new(content: ActionContent, settings: ActionSettings, dispatcher: ActionDispatcher) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            dialog: Arc::new(Mutex::new(Dialog { content, settings })),
            cancel: CancellationToken::new(),
            dispatcher,
            opened_at: now,
            last_activity: StdMutex::new(now),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When a client last read or changed this dialog.
    pub fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn touch(&self) {
        *self.last_activity.lock().unwrap_or_else(PoisonError::into_inner) = Utc::now();
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn snapshot(&self) -> DialogSnapshot {
        self.touch();
        let guard = self.dialog.lock().await;
        DialogSnapshot {
            id: self.id,
            name: guard.content.get_name().unwrap_or_default(),
            flags: guard.content.get_flags().into_iter().cloned().collect(),
            form_fields: guard
                .content
                .visible_flags()
                .map(|flag| flag.name.clone())
                .collect(),
            settings: guard.settings.view(),
            command_preview: guard
                .content
                .command_args(guard.settings.command())
                .ok()
                .map(|args| args.join(" ")),
            opened_at: self.opened_at,
            last_activity_at: self.last_activity(),
        }
    }

    pub async fn is_pending(&self) -> bool {
        self.dialog.lock().await.settings.pending()
    }

    /// User input for one flag. Only accepted while the form is editable.
    pub async fn on_select(&self, name: &str, value: &str) -> Result<(), CoreError> {
        self.touch();
        let mut guard = self.dialog.lock().await;
        match guard.settings.state() {
            ActionState::Idle | ActionState::PreparationFailed => {
                guard.content.on_select(name, value)
            }
            state => Err(CoreError::Conflict(format!(
                "flags cannot be edited while the dialog is {state:?}"
            ))),
        }
    }

    /// Prepare the flags and, if they pass, start the dispatch.
    ///
    /// Rejected with [`CoreError::Conflict`] while a previous submit is still
    /// preparing or dispatching, and once the dialog has completed.
    pub async fn submit(&self) -> Result<SubmitOutcome, CoreError> {
        self.touch();
        let prepare = {
            let mut guard = self.dialog.lock().await;
            guard.settings.begin_preparing()?;
            guard.content.prepare()
        };

        let response = tokio::select! {
            _ = self.cancel.cancelled() => {
                tracing::debug!(dialog_id = %self.id, "Dialog torn down while preparing");
                return Ok(SubmitOutcome::Discarded);
            }
            response = prepare => response,
        };

        let mut guard = self.dialog.lock().await;
        if self.cancel.is_cancelled() {
            tracing::debug!(dialog_id = %self.id, "Dialog torn down while preparing");
            return Ok(SubmitOutcome::Discarded);
        }
        let Dialog { content, settings } = &mut *guard;

        if let Err(e) = content.accept(response) {
            let reason = match e {
                CoreError::Validation(msg) | CoreError::Preparation(msg) => msg,
                other => other.to_string(),
            };
            let message = format!(
                "There was a problem preparing {}: {reason}",
                content.get_name().unwrap_or_default()
            );
            settings.preparation_failed(&message)?;
            tracing::info!(
                dialog_id = %self.id,
                command = %settings.command(),
                reason = %reason,
                "Dialog preparation failed",
            );
            return Ok(SubmitOutcome::PreparationFailed(message));
        }

        settings.begin_dispatch()?;
        let command = settings.command().to_string();
        drop(guard);

        tracing::info!(dialog_id = %self.id, command = %command, "Dispatch started");

        let dispatcher = self.dispatcher.clone();
        let dialog = Arc::clone(&self.dialog);
        let cancel = self.cancel.clone();
        let span = tracing::info_span!("dispatch", dialog_id = %self.id);
        let handle = tokio::spawn(
            async move { dispatcher.server_call(&command, &dialog, &cancel).await }.instrument(span),
        );

        Ok(SubmitOutcome::Dispatched(handle))
    }

    /// Close the dialog and tear it down. Rejected while a dispatch is
    /// pending.
    ///
    /// A transform still running when the dialog closes never reaches the
    /// backend.
    pub async fn close(&self) -> Result<(), CoreError> {
        let mut guard = self.dialog.lock().await;
        let Dialog { content, settings } = &mut *guard;
        settings.close(content)?;
        self.teardown();
        Ok(())
    }

    /// Release the pending subscription without waiting for the backend.
    ///
    /// Anything the backend sends afterwards is discarded.
    pub fn teardown(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!(dialog_id = %self.id, "Tearing down dialog");
            self.cancel.cancel();
        }
    }
}

impl fmt::Debug for DialogSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogSession")
            .field("id", &self.id)
            .field("opened_at", &self.opened_at)
            .field("torn_down", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Drop for DialogSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
