//! Named, typed form parameters ("flags") that map onto backend command
//! arguments.
//!
//! A flag is either a free-text input, a checkbox, or a drop-down selection.
//! The empty string (or an unchecked box) means "unset": unset optional flags
//! are left out of the command, unset required flags block submission.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Ordered mapping from flag name to flag. Insertion order is display order
/// and command order.
pub type FlagMap = IndexMap<String, Flag>;

/// How a flag is edited in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    Input,
    CheckBox,
    DropDown,
}

/// The typed value carried by a flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Text(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub kind: FlagKind,
    pub value: FlagValue,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Rendered as a bare argument instead of `-name=value`.
    pub positional: bool,
    /// Hidden flags are not form fields but still take part in the command.
    pub visible: bool,
}

impl Flag {
    fn new(name: &str, label: &str, kind: FlagKind, value: FlagValue) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            description: String::new(),
            kind,
            value,
            required: false,
            options: Vec::new(),
            positional: false,
            visible: true,
        }
    }

    pub fn input(name: &str, label: &str) -> Self {
        Self::new(name, label, FlagKind::Input, FlagValue::Text(String::new()))
    }

    pub fn check_box(name: &str, label: &str) -> Self {
        Self::new(name, label, FlagKind::CheckBox, FlagValue::Bool(false))
    }

    /// A drop-down whose initial selection is the first option.
    pub fn drop_down(name: &str, label: &str, options: &[&str]) -> Self {
        let first = options.first().map(|o| o.to_string()).unwrap_or_default();
        let mut flag = Self::new(name, label, FlagKind::DropDown, FlagValue::Text(first));
        flag.options = options.iter().map(|o| o.to_string()).collect();
        flag
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = match self.kind {
            FlagKind::CheckBox => FlagValue::Bool(value == "true"),
            FlagKind::Input | FlagKind::DropDown => FlagValue::Text(value.to_string()),
        };
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// String form of the value. An unchecked box renders as `""`.
    pub fn str_value(&self) -> String {
        match &self.value {
            FlagValue::Text(text) => text.clone(),
            FlagValue::Bool(true) => "true".to_string(),
            FlagValue::Bool(false) => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.value {
            FlagValue::Text(text) => text.is_empty(),
            FlagValue::Bool(checked) => !checked,
        }
    }

    /// Whether the flag is left out of the built command.
    pub fn is_omitted(&self) -> bool {
        self.is_empty() && !self.required
    }

    /// Set the value from user input.
    ///
    /// An empty string clears any kind of flag. Checkboxes accept `"true"` and
    /// `"false"`; drop-downs accept only one of their declared options.
    pub fn set_value(&mut self, raw: &str) -> Result<(), CoreError> {
        match self.kind {
            FlagKind::Input => self.value = FlagValue::Text(raw.to_string()),
            FlagKind::CheckBox => {
                self.value = match raw {
                    "true" => FlagValue::Bool(true),
                    "false" | "" => FlagValue::Bool(false),
                    other => {
                        return Err(CoreError::Validation(format!(
                            "Flag `{}` expects true or false, got '{other}'",
                            self.name
                        )))
                    }
                }
            }
            FlagKind::DropDown => {
                if !raw.is_empty() && !self.options.iter().any(|o| o == raw) {
                    return Err(CoreError::Validation(format!(
                        "malformed selection '{raw}' for `{}`. Must be one of: {}",
                        self.name,
                        self.options.join(", ")
                    )));
                }
                self.value = FlagValue::Text(raw.to_string());
            }
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.value = match self.kind {
            FlagKind::CheckBox => FlagValue::Bool(false),
            FlagKind::Input | FlagKind::DropDown => FlagValue::Text(String::new()),
        };
    }

    /// Render as a vtctl argument: `-name=value`, or the bare value when
    /// positional.
    pub fn to_arg(&self) -> String {
        if self.positional {
            self.str_value()
        } else {
            format!("-{}={}", self.name, self.str_value())
        }
    }
}

/// Collect flags into a [`FlagMap`] keyed by name, preserving order.
pub fn flag_map(flags: impl IntoIterator<Item = Flag>) -> FlagMap {
    flags
        .into_iter()
        .map(|flag| (flag.name.clone(), flag))
        .collect()
}
