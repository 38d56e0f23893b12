//! Lifecycle of one dialog action.
//!
//! ```text
//! Idle ─submit─▶ Preparing ─┬─▶ PreparationFailed ─submit─▶ Preparing ...
//!                           └─▶ Dispatching ─┬─▶ Succeeded
//!                                            └─▶ Failed
//! ```
//!
//! A settings value is never reused once it reaches `Succeeded` or `Failed`:
//! a new submission needs a new dialog. While `Dispatching`, a second submit
//! and closing the dialog are both rejected.

use std::fmt;

use serde::Serialize;

use crate::content::ActionContent;
use crate::error::CoreError;

/// Message returned when a close is attempted mid-dispatch.
pub const PENDING_CLOSE_MESSAGE: &str = "cannot deactivate while an action is pending";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    Idle,
    Preparing,
    PreparationFailed,
    Dispatching,
    Succeeded,
    Failed,
}

impl ActionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Called with the content once the action resolves or the dialog closes,
/// whichever comes first.
pub type OnClose = Box<dyn FnOnce(&ActionContent) + Send>;

pub struct ActionSettings {
    action_label: String,
    command: String,
    title: String,
    message: String,
    success_template: String,
    error_prefix: String,
    state: ActionState,
    modal_open: bool,
    log: Vec<String>,
    on_close: Option<OnClose>,
}

/// Serializable view of [`ActionSettings`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsView {
    pub action_label: String,
    pub title: String,
    pub message: String,
    pub state: ActionState,
    pub pending: bool,
    pub show_form: bool,
    pub show_log: bool,
    pub modal_open: bool,
    pub log: Vec<String>,
}

impl ActionSettings {
    /// New settings in `Idle`.
    ///
    /// `command` is the backend command run on submit. The success template
    /// is also the initial message.
    pub fn new(action_label: &str, command: &str, title: &str) -> Self {
        Self {
            action_label: action_label.to_string(),
            command: command.to_string(),
            title: title.to_string(),
            message: String::new(),
            success_template: String::new(),
            error_prefix: String::new(),
            state: ActionState::Idle,
            modal_open: false,
            log: Vec::new(),
            on_close: None,
        }
    }

    pub fn with_success_template(mut self, template: &str) -> Self {
        self.success_template = template.to_string();
        self.message = template.to_string();
        self
    }

    pub fn with_error_prefix(mut self, prefix: &str) -> Self {
        self.error_prefix = prefix.to_string();
        self
    }

    pub fn with_on_close(mut self, on_close: OnClose) -> Self {
        self.on_close = Some(on_close);
        self
    }

    pub fn set_on_close(&mut self, on_close: OnClose) {
        self.on_close = Some(on_close);
    }

    // -- accessors --

    pub fn action_label(&self) -> &str {
        &self.action_label
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error_prefix(&self) -> &str {
        &self.error_prefix
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn pending(&self) -> bool {
        self.state == ActionState::Dispatching
    }

    pub fn show_form(&self) -> bool {
        matches!(
            self.state,
            ActionState::Idle | ActionState::Preparing | ActionState::PreparationFailed
        )
    }

    pub fn show_log(&self) -> bool {
        !self.show_form()
    }

    pub fn modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// True iff no dispatch is pending; a host must not navigate away otherwise.
    pub fn can_deactivate(&self) -> bool {
        !self.pending()
    }

    pub fn view(&self) -> SettingsView {
        SettingsView {
            action_label: self.action_label.clone(),
            title: self.title.clone(),
            message: self.message.clone(),
            state: self.state,
            pending: self.pending(),
            show_form: self.show_form(),
            show_log: self.show_log(),
            modal_open: self.modal_open,
            log: self.log.clone(),
        }
    }

    // -- mutation --

    pub fn toggle_modal(&mut self) {
        self.modal_open = !self.modal_open;
    }

    pub fn set_message(&mut self, text: &str) {
        self.message = text.to_string();
    }

    /// `Idle`/`PreparationFailed` → `Preparing`.
    pub fn begin_preparing(&mut self) -> Result<(), CoreError> {
        match self.state {
            ActionState::Idle | ActionState::PreparationFailed => {
                self.state = ActionState::Preparing;
                Ok(())
            }
            state if state.is_terminal() => Err(CoreError::Conflict(
                "this dialog has already completed; open a new one".to_string(),
            )),
            _ => Err(CoreError::Conflict(
                "an action is already pending for this dialog".to_string(),
            )),
        }
    }

    /// `Preparing` → `PreparationFailed`, keeping the form on screen.
    pub fn preparation_failed(&mut self, message: &str) -> Result<(), CoreError> {
        self.expect_state(ActionState::Preparing, "fail preparation")?;
        self.state = ActionState::PreparationFailed;
        self.message = message.to_string();
        Ok(())
    }

    /// `Preparing` → `Dispatching`.
    pub fn begin_dispatch(&mut self) -> Result<(), CoreError> {
        self.expect_state(ActionState::Preparing, "dispatch")?;
        self.state = ActionState::Dispatching;
        self.log.clear();
        Ok(())
    }

    /// Append backend output, split on newlines, in arrival order.
    ///
    /// Blank lines are kept; a chunk ending in a newline does not add an
    /// empty trailing line. Ignored unless dispatching.
    pub fn append_log(&mut self, chunk: &str) {
        if !self.pending() {
            return;
        }
        let chunk = chunk.strip_suffix('\n').unwrap_or(chunk);
        if chunk.is_empty() {
            return;
        }
        self.log.extend(
            chunk
                .split('\n')
                .map(|line| line.trim_end_matches('\r').to_string()),
        );
    }

    /// `Dispatching` → `Succeeded`; resolves the success template against the
    /// content and hands the content to `on_close`.
    pub fn succeed(&mut self, content: &ActionContent) -> Result<(), CoreError> {
        self.expect_state(ActionState::Dispatching, "succeed")?;
        self.state = ActionState::Succeeded;
        self.message = content.interpolate(&self.success_template);
        if let Some(on_close) = self.on_close.take() {
            on_close(content);
        }
        Ok(())
    }

    /// `Dispatching` → `Failed` with `"<prefix>: <error>"`. No retry.
    pub fn fail(&mut self, content: &ActionContent, error: &str) -> Result<(), CoreError> {
        self.expect_state(ActionState::Dispatching, "fail")?;
        self.state = ActionState::Failed;
        self.message = format!("{}: {error}", content.interpolate(&self.error_prefix));
        Ok(())
    }

    /// Close the dialog. Rejected while dispatching.
    pub fn close(&mut self, content: &ActionContent) -> Result<(), CoreError> {
        if self.pending() {
            return Err(CoreError::Conflict(PENDING_CLOSE_MESSAGE.to_string()));
        }
        if let Some(on_close) = self.on_close.take() {
            on_close(content);
        }
        self.modal_open = false;
        Ok(())
    }

    fn expect_state(&self, expected: ActionState, what: &str) -> Result<(), CoreError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CoreError::Internal(format!(
                "cannot {what} from state {:?}",
                self.state
            )))
        }
    }
}

impl fmt::Debug for ActionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSettings")
            .field("action_label", &self.action_label)
            .field("command", &self.command)
            .field("title", &self.title)
            .field("message", &self.message)
            .field("state", &self.state)
            .field("modal_open", &self.modal_open)
            .field("log", &self.log)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}
