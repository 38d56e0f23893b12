//! `{{placeholder}}` resolution for dialog messages.

use std::sync::LazyLock;

use regex::Regex;

use crate::flag::FlagMap;

/// Regex matching `{{name}}` tokens, tolerating inner whitespace.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w[\w-]*)\s*\}\}").expect("valid regex"));

/// Replace every `{{name}}` with the string value of the flag `name`.
///
/// Placeholders naming a flag that does not exist are left untouched.
pub fn interpolate(template: &str, flags: &FlagMap) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &regex::Captures<'_>| match flags.get(&caps[1]) {
            Some(flag) => flag.str_value(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
