//! The closed set of actions each console view can run.
//!
//! Every action carries its own flag schema, backend command, dialog copy
//! and optional transform. Views open dialogs through [`ViewAction::open_dialog`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content::{ActionContent, Transform};
use crate::flag::Flag;
use crate::settings::ActionSettings;
use crate::shard::{self, KEYSPACE_NAME, LOWER_BOUND, SHARD_REF, UPPER_BOUND};

/// Options for the `sharding_column_type` drop-down.
pub const SHARDING_COLUMN_TYPES: &[&str] = &["UINT64", "BYTES"];

/// Extra param naming the subject of actions that have no subject flag.
pub const SUBJECT: &str = "subject";

/// Extra param carrying the keyspace a keyspace-view dialog was opened on.
pub const ORIGIN_KEYSPACE: &str = "keyspace";

pub trait ViewAction: Copy + fmt::Debug + 'static {
    /// What the view knows when it opens the dialog.
    type Context: ?Sized;

    fn all() -> &'static [Self];

    /// Backend command name.
    fn command_name(self) -> &'static str;

    /// Label of the submit button.
    fn label(self) -> &'static str;

    fn title(self, ctx: &Self::Context) -> String;

    /// Flag naming the subject of the action.
    fn name_key(self) -> &'static str;

    fn success_template(self) -> &'static str;

    fn error_prefix(self) -> &'static str;

    fn flags(self, ctx: &Self::Context) -> Vec<Flag>;

    fn transform(self) -> Option<Transform> {
        None
    }

    /// Values the view passes along outside the form.
    fn extra_params(self, _ctx: &Self::Context) -> Vec<(&'static str, serde_json::Value)> {
        Vec::new()
    }

    /// Fresh content/settings pair with the modal open.
    fn open_dialog(self, ctx: &Self::Context) -> (ActionContent, ActionSettings) {
        let mut content = ActionContent::new(self.name_key(), self.flags(ctx));
        if let Some(transform) = self.transform() {
            content = content.with_transform(transform);
        }
        for (key, value) in self.extra_params(ctx) {
            content = content.with_extra_param(key, value);
        }

        let mut settings = ActionSettings::new(self.label(), self.command_name(), &self.title(ctx))
            .with_success_template(self.success_template())
            .with_error_prefix(self.error_prefix());
        settings.toggle_modal();

        (content, settings)
    }
}

// ---------------------------------------------------------------------------
// Keyspace view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyspaceAction {
    CreateShard,
    ValidateKeyspace,
    RebuildKeyspaceGraph,
    RemoveKeyspaceCell,
}

fn keyspace_flag(keyspace: &str) -> Flag {
    Flag::input(KEYSPACE_NAME, "Keyspace Name")
        .with_value(keyspace)
        .required()
        .positional()
        .hidden()
}

impl ViewAction for KeyspaceAction {
    type Context = str;

    fn all() -> &'static [Self] {
        &[
            Self::CreateShard,
            Self::ValidateKeyspace,
            Self::RebuildKeyspaceGraph,
            Self::RemoveKeyspaceCell,
        ]
    }

    fn command_name(self) -> &'static str {
        match self {
            Self::CreateShard => "CreateShard",
            Self::ValidateKeyspace => "ValidateKeyspace",
            Self::RebuildKeyspaceGraph => "RebuildKeyspaceGraph",
            Self::RemoveKeyspaceCell => "RemoveKeyspaceCell",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::CreateShard => "Create",
            Self::ValidateKeyspace => "Validate",
            Self::RebuildKeyspaceGraph => "Rebuild",
            Self::RemoveKeyspaceCell => "Remove",
        }
    }

    fn title(self, keyspace: &str) -> String {
        match self {
            Self::CreateShard => "Create a new Shard".to_string(),
            Self::ValidateKeyspace => format!("Validate {keyspace}"),
            Self::RebuildKeyspaceGraph => format!("Rebuild {keyspace}"),
            Self::RemoveKeyspaceCell => format!("Remove a cell from {keyspace}"),
        }
    }

    fn name_key(self) -> &'static str {
        match self {
            Self::CreateShard => SHARD_REF,
            Self::ValidateKeyspace | Self::RebuildKeyspaceGraph => KEYSPACE_NAME,
            Self::RemoveKeyspaceCell => "cell_name",
        }
    }

    fn success_template(self) -> &'static str {
        match self {
            Self::CreateShard => "Created {{shard_ref}}",
            Self::ValidateKeyspace => "Validated {{keyspace_name}}",
            Self::RebuildKeyspaceGraph => "Rebuilt {{keyspace_name}}",
            Self::RemoveKeyspaceCell => "Removed {{cell_name}}",
        }
    }

    fn error_prefix(self) -> &'static str {
        match self {
            Self::CreateShard => "There was a problem creating {{shard_ref}}",
            Self::ValidateKeyspace => "There was a problem validating {{keyspace_name}}",
            Self::RebuildKeyspaceGraph => "There was a problem rebuilding {{keyspace_name}}",
            Self::RemoveKeyspaceCell => "There was a problem removing {{cell_name}}",
        }
    }

    fn extra_params(self, keyspace: &str) -> Vec<(&'static str, serde_json::Value)> {
        vec![(ORIGIN_KEYSPACE, serde_json::json!(keyspace))]
    }

    fn flags(self, keyspace: &str) -> Vec<Flag> {
        match self {
            // The keyspace and bounds only feed `prepare_shard`, so none of
            // them may be required.
            Self::CreateShard => vec![
                Flag::input(KEYSPACE_NAME, "Keyspace Name")
                    .with_value(keyspace)
                    .hidden(),
                Flag::input(LOWER_BOUND, "Lower Bound")
                    .describe("Inclusive lower bound of the key range, in hex. Empty for unbounded."),
                Flag::input(UPPER_BOUND, "Upper Bound")
                    .describe("Exclusive upper bound of the key range, in hex. Empty for unbounded."),
                Flag::check_box("force", "Force")
                    .describe("Proceeds with the command even if the shard already exists."),
                Flag::check_box("parent", "Parent")
                    .describe("Creates the parent keyspace if it doesn't already exist."),
                Flag::input(SHARD_REF, "Shard Reference")
                    .required()
                    .positional()
                    .hidden(),
            ],
            Self::ValidateKeyspace => vec![
                keyspace_flag(keyspace),
                Flag::check_box("ping-tablets", "Ping Tablets")
                    .describe("Pings all tablets in the keyspace during validation."),
            ],
            Self::RebuildKeyspaceGraph => vec![
                Flag::input("cells", "Cells")
                    .describe("Comma-separated list of cells to update. Empty for all cells."),
                keyspace_flag(keyspace),
            ],
            Self::RemoveKeyspaceCell => vec![
                Flag::check_box("force", "Force")
                    .describe("Proceeds even if the cell's topology server cannot be reached."),
                Flag::check_box("recursive", "Recursive")
                    .describe("Also deletes all tablets in that cell belonging to the keyspace."),
                keyspace_flag(keyspace),
                Flag::input("cell_name", "Cell Name").required().positional(),
            ],
        }
    }

    fn transform(self) -> Option<Transform> {
        match self {
            Self::CreateShard => Some(Transform::sync(shard::prepare_shard)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashboardAction {
    Validate,
    CreateKeyspace,
    DeleteKeyspace,
}

impl ViewAction for DashboardAction {
    type Context = ();

    fn all() -> &'static [Self] {
        &[Self::Validate, Self::CreateKeyspace, Self::DeleteKeyspace]
    }

    fn command_name(self) -> &'static str {
        match self {
            Self::Validate => "Validate",
            Self::CreateKeyspace => "CreateKeyspace",
            Self::DeleteKeyspace => "DeleteKeyspace",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Validate => "Validate",
            Self::CreateKeyspace => "Create",
            Self::DeleteKeyspace => "Delete",
        }
    }

    fn title(self, _: &()) -> String {
        match self {
            Self::Validate => "Validate all nodes".to_string(),
            Self::CreateKeyspace => "Create a new Keyspace".to_string(),
            Self::DeleteKeyspace => "Delete a Keyspace".to_string(),
        }
    }

    fn name_key(self) -> &'static str {
        match self {
            Self::Validate => SUBJECT,
            Self::CreateKeyspace | Self::DeleteKeyspace => KEYSPACE_NAME,
        }
    }

    fn success_template(self) -> &'static str {
        match self {
            Self::Validate => "Validated all nodes",
            Self::CreateKeyspace => "Created {{keyspace_name}}",
            Self::DeleteKeyspace => "Deleted {{keyspace_name}}",
        }
    }

    fn error_prefix(self) -> &'static str {
        match self {
            Self::Validate => "There was a problem validating all nodes",
            Self::CreateKeyspace => "There was a problem creating {{keyspace_name}}",
            Self::DeleteKeyspace => "There was a problem deleting {{keyspace_name}}",
        }
    }

    fn extra_params(self, _: &()) -> Vec<(&'static str, serde_json::Value)> {
        match self {
            Self::Validate => vec![(SUBJECT, serde_json::json!("all nodes"))],
            Self::CreateKeyspace | Self::DeleteKeyspace => Vec::new(),
        }
    }

    fn flags(self, _: &()) -> Vec<Flag> {
        match self {
            Self::Validate => vec![Flag::check_box("ping-tablets", "Ping Tablets")
                .describe("Pings all tablets during validation.")],
            Self::CreateKeyspace => vec![
                Flag::input(KEYSPACE_NAME, "Keyspace Name")
                    .required()
                    .positional(),
                Flag::input("sharding_column_name", "Sharding Column Name"),
                Flag::drop_down(
                    "sharding_column_type",
                    "Sharding Column Type",
                    SHARDING_COLUMN_TYPES,
                ),
                Flag::check_box("force", "Force")
                    .describe("Proceeds even if the keyspace already exists."),
            ],
            Self::DeleteKeyspace => vec![
                Flag::check_box("recursive", "Recursive")
                    .describe("Also recursively deletes all shards in the keyspace."),
                Flag::input(KEYSPACE_NAME, "Keyspace Name")
                    .required()
                    .positional(),
            ],
        }
    }
}
