//! Dialog content: the flags of one action, plus the transform run before
//! submission.

use std::fmt;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use indexmap::IndexMap;
use serde::Serialize;

use crate::command::{self, build_command, render_args};
use crate::error::CoreError;
use crate::flag::{flag_map, Flag, FlagMap};
use crate::template::interpolate;

// ---------------------------------------------------------------------------
// PrepareResponse
// ---------------------------------------------------------------------------

/// Outcome of running a transform over the flags. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrepareResponse {
    success: bool,
    flags: FlagMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl PrepareResponse {
    pub fn ok(flags: FlagMap) -> Self {
        Self {
            success: true,
            flags,
            message: None,
        }
    }

    pub fn rejected(flags: FlagMap, message: impl Into<String>) -> Self {
        Self {
            success: false,
            flags,
            message: Some(message.into()),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn flags(&self) -> &FlagMap {
        &self.flags
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

pub type PrepareFuture = BoxFuture<'static, PrepareResponse>;

/// Pre-submit transform over the flags, supplied when the content is built.
///
/// `Async` covers transforms that need a round trip to validate.
#[derive(Clone)]
pub enum Transform {
    Sync(Arc<dyn Fn(FlagMap) -> PrepareResponse + Send + Sync>),
    Async(Arc<dyn Fn(FlagMap) -> PrepareFuture + Send + Sync>),
}

impl Transform {
    pub fn sync(f: impl Fn(FlagMap) -> PrepareResponse + Send + Sync + 'static) -> Self {
        Self::Sync(Arc::new(f))
    }

    pub fn from_async(f: impl Fn(FlagMap) -> PrepareFuture + Send + Sync + 'static) -> Self {
        Self::Async(Arc::new(f))
    }

    fn run(&self, flags: FlagMap) -> PrepareFuture {
        match self {
            Self::Sync(f) => Box::pin(future::ready(f(flags))),
            Self::Async(f) => f(flags),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Transform::Sync"),
            Self::Async(_) => f.write_str("Transform::Async"),
        }
    }
}

// ---------------------------------------------------------------------------
// ActionContent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ActionContent {
    name_key: String,
    flags: FlagMap,
    extra_params: IndexMap<String, serde_json::Value>,
    transform: Option<Transform>,
}

impl ActionContent {
    pub fn new(name_key: &str, flags: impl IntoIterator<Item = Flag>) -> Self {
        Self {
            name_key: name_key.to_string(),
            flags: flag_map(flags),
            extra_params: IndexMap::new(),
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_extra_param(mut self, key: &str, value: serde_json::Value) -> Self {
        self.extra_params.insert(key.to_string(), value);
        self
    }

    pub fn name_key(&self) -> &str {
        &self.name_key
    }

    /// Human-readable subject of the action: the value of the `name_key` flag.
    ///
    /// Actions whose subject is fixed carry it as a string extra param under
    /// the same key instead.
    pub fn get_name(&self) -> Result<String, CoreError> {
        if let Some(flag) = self.flags.get(&self.name_key) {
            return Ok(flag.str_value());
        }
        self.extra_params
            .get(&self.name_key)
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CoreError::NotFound {
                entity: "Flag",
                id: self.name_key.clone(),
            })
    }

    pub fn flags(&self) -> &FlagMap {
        &self.flags
    }

    /// Flags in display order.
    pub fn get_flags(&self) -> Vec<&Flag> {
        self.flags.values().collect()
    }

    /// Flags shown as form fields.
    pub fn visible_flags(&self) -> impl Iterator<Item = &Flag> {
        self.flags.values().filter(|flag| flag.visible)
    }

    pub fn extra_params(&self) -> &IndexMap<String, serde_json::Value> {
        &self.extra_params
    }

    /// The assembled command as a name → value mapping.
    pub fn get_post_body(&self) -> Result<IndexMap<String, String>, CoreError> {
        command::post_body(self.flags.values())
    }

    /// The full vtctl argument vector for `command_name`.
    pub fn command_args(&self, command_name: &str) -> Result<Vec<String>, CoreError> {
        render_args(command_name, &self.flags)
    }

    /// User input for one flag.
    pub fn on_select(&mut self, name: &str, value: &str) -> Result<(), CoreError> {
        let flag = self.flags.get_mut(name).ok_or_else(|| CoreError::NotFound {
            entity: "Flag",
            id: name.to_string(),
        })?;
        flag.set_value(value)
    }

    /// Run the transform (if any) over a copy of the flags.
    ///
    /// The returned future owns everything it needs, so it can be awaited
    /// without holding on to the content.
    pub fn prepare(&self) -> PrepareFuture {
        let flags = self.flags.clone();
        match &self.transform {
            Some(transform) => transform.run(flags),
            None => Box::pin(future::ready(PrepareResponse::ok(flags))),
        }
    }

    /// Adopt the flags of a successful [`PrepareResponse`].
    ///
    /// The transformed flags must also pass [`build_command`]; otherwise the
    /// content keeps its current flags so the user can fix them and resubmit.
    pub fn accept(&mut self, response: PrepareResponse) -> Result<(), CoreError> {
        if !response.success {
            return Err(CoreError::Preparation(
                response.message.unwrap_or_else(|| "rejected".to_string()),
            ));
        }
        build_command(&response.flags)?;
        self.flags = response.flags;
        Ok(())
    }

    /// Resolve `{{placeholders}}` against the current flag values.
    pub fn interpolate(&self, template: &str) -> String {
        interpolate(template, &self.flags)
    }
}
