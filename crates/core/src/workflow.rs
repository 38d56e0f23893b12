//! Workflow tree snapshots and their display classification.
//!
//! A workflow is a long-running backend task, possibly with nested
//! sub-tasks. The console never patches a tree: each refresh replaces the
//! whole snapshot, and rendering never mutates it.

use std::collections::HashMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire enumerants
// ---------------------------------------------------------------------------

pub mod node_state {
    pub const NOT_STARTED: i64 = 0;
    pub const RUNNING: i64 = 1;
    pub const DONE: i64 = 2;
}

pub mod action_state {
    pub const UNKNOWN: i64 = 0;
    pub const ENABLED: i64 = 1;
    pub const DISABLED: i64 = 2;
}

pub mod action_style {
    pub const UNKNOWN: i64 = 0;
    pub const NORMAL: i64 = 1;
    pub const WARNING: i64 = 2;
    pub const WAITING: i64 = 3;
    pub const TRIGGERED: i64 = 4;
}

pub mod display {
    pub const UNKNOWN: i64 = 0;
    pub const INDETERMINATE: i64 = 1;
    pub const DETERMINATE: i64 = 2;
    pub const NONE: i64 = 3;
}

// ---------------------------------------------------------------------------
// Snapshot model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowAction {
    pub name: String,
    #[serde(default)]
    pub state: i64,
    #[serde(default)]
    pub style: i64,
}

/// One node of a workflow snapshot. State values are kept raw so that
/// values this console does not know about still parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "pathName")]
    pub path: String,
    #[serde(default)]
    pub children: HashMap<String, WorkflowNode>,
    #[serde(default)]
    pub state: i64,
    /// Epoch seconds.
    #[serde(default)]
    pub last_changed: Option<i64>,
    #[serde(default)]
    pub progress: i64,
    #[serde(default, rename = "progressMsg")]
    pub progress_message: String,
    #[serde(default)]
    pub display: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub actions: Vec<WorkflowAction>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    NotStarted,
    Running,
    Done,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStyle {
    Normal,
    Triggered,
    Waiting,
    Warning,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressDisplay {
    Indeterminate,
    Determinate,
    Hidden,
    Unknown,
}

/// Never fails: values outside the known enumerants are `Unknown`.
pub fn classify_node(state: i64) -> NodeStatus {
    match state {
        node_state::NOT_STARTED => NodeStatus::NotStarted,
        node_state::RUNNING => NodeStatus::Running,
        node_state::DONE => NodeStatus::Done,
        _ => NodeStatus::Unknown,
    }
}

/// Never fails: values outside the known enumerants are `Unknown`.
pub fn classify_action(style: i64) -> ActionStyle {
    match style {
        action_style::NORMAL => ActionStyle::Normal,
        action_style::TRIGGERED => ActionStyle::Triggered,
        action_style::WAITING => ActionStyle::Waiting,
        action_style::WARNING => ActionStyle::Warning,
        _ => ActionStyle::Unknown,
    }
}

pub fn classify_display(value: i64) -> ProgressDisplay {
    match value {
        display::INDETERMINATE => ProgressDisplay::Indeterminate,
        display::DETERMINATE => ProgressDisplay::Determinate,
        display::NONE => ProgressDisplay::Hidden,
        _ => ProgressDisplay::Unknown,
    }
}

impl NodeStatus {
    /// Body class. Empty for `Unknown`.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::NotStarted => "vt-workflow-not-started",
            Self::Running => "vt-workflow-running",
            Self::Done => "vt-workflow-done",
            Self::Unknown => "",
        }
    }

    /// Header class. Empty for `Unknown`.
    pub fn header_class(self) -> &'static str {
        match self {
            Self::NotStarted => "vt-workflow-not-started-dark",
            Self::Running => "vt-workflow-running-dark",
            Self::Done => "vt-workflow-done-dark",
            Self::Unknown => "",
        }
    }
}

impl ActionStyle {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Normal => "vt-action-normal",
            Self::Triggered => "vt-action-triggered",
            Self::Waiting => "vt-action-waiting",
            Self::Warning => "vt-action-warning",
            Self::Unknown => "",
        }
    }
}

/// `lastChanged` as a readable UTC time. `None` when absent or out of range.
pub fn format_last_changed(epoch_secs: Option<i64>) -> Option<String> {
    let secs = epoch_secs?;
    DateTime::from_timestamp(secs, 0).map(|t| t.format("%a %b %d %Y %H:%M:%S UTC").to_string())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedAction {
    pub name: String,
    pub style: ActionStyle,
    pub class: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedNode {
    pub id: String,
    pub name: String,
    pub path: String,
    pub status: NodeStatus,
    pub class: &'static str,
    pub header_class: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_changed: Option<String>,
    pub progress: i64,
    pub progress_message: String,
    pub display: ProgressDisplay,
    pub message: String,
    pub log_lines: Vec<String>,
    pub disabled: bool,
    pub actions: Vec<RenderedAction>,
    /// Sorted by id.
    pub children: Vec<RenderedNode>,
}

/// What the user clicked on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum ClickTarget {
    Node { path: String },
    Action { path: String, name: String },
}

/// The single effect of a click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickOutcome {
    ToggleNode { path: String },
    TriggerAction { path: String, name: String },
}

pub fn render(node: &WorkflowNode) -> RenderedNode {
    let status = classify_node(node.state);

    let mut children: Vec<(&String, &WorkflowNode)> = node.children.iter().collect();
    children.sort_by(|a, b| a.0.cmp(b.0));

    RenderedNode {
        id: node.id.clone(),
        name: node.name.clone(),
        path: node.path.clone(),
        status,
        class: status.css_class(),
        header_class: status.header_class(),
        last_changed: format_last_changed(node.last_changed),
        progress: node.progress.clamp(0, 100),
        progress_message: node.progress_message.clone(),
        display: classify_display(node.display),
        message: node.message.clone(),
        log_lines: node
            .log
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        disabled: node.disabled,
        actions: node
            .actions
            .iter()
            .map(|action| {
                let style = classify_action(action.style);
                RenderedAction {
                    name: action.name.clone(),
                    style,
                    class: style.css_class(),
                    enabled: !node.disabled && action.state != action_state::DISABLED,
                }
            })
            .collect(),
        children: children.into_iter().map(|(_, child)| render(child)).collect(),
    }
}

impl RenderedNode {
    /// Depth-first lookup by path.
    pub fn find(&self, path: &str) -> Option<&RenderedNode> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(path))
    }

    /// Resolve a click to exactly one outcome.
    ///
    /// A click on an action never toggles the node that contains it, nor any
    /// ancestor. Clicks on disabled actions or unknown paths do nothing.
    pub fn click(&self, target: &ClickTarget) -> Option<ClickOutcome> {
        match target {
            ClickTarget::Node { path } => self.find(path).map(|node| ClickOutcome::ToggleNode {
                path: node.path.clone(),
            }),
            ClickTarget::Action { path, name } => {
                let node = self.find(path)?;
                let action = node.actions.iter().find(|a| &a.name == name)?;
                action.enabled.then(|| ClickOutcome::TriggerAction {
                    path: node.path.clone(),
                    name: action.name.clone(),
                })
            }
        }
    }
}

/// Owns one workflow snapshot for a render cycle.
#[derive(Debug, Clone)]
pub struct WorkflowTree {
    root: WorkflowNode,
}

impl WorkflowTree {
    pub fn new(root: WorkflowNode) -> Self {
        Self { root }
    }

    /// Swap in a fresh snapshot, dropping the old one entirely.
    pub fn replace(&mut self, root: WorkflowNode) {
        self.root = root;
    }

    pub fn render(&self) -> RenderedNode {
        render(&self.root)
    }
}
