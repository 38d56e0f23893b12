//! Command assembly: turns a set of flags into the ordered `(name, value)`
//! pairs sent to the backend, and into the vtctl argument vector shown in
//! the dialog preview.

use indexmap::IndexMap;

use crate::error::CoreError;
use crate::flag::{Flag, FlagKind, FlagMap};

/// Build the command from flags in declaration order.
///
/// Unset optional flags are skipped. Fails with [`CoreError::Validation`] when
/// a required flag is unset, or when a drop-down carries a value outside its
/// declared options.
pub fn build_command(flags: &FlagMap) -> Result<Vec<(String, String)>, CoreError> {
    Ok(post_body(flags.values())?.into_iter().collect())
}

/// Same rule as [`build_command`], over any ordered sequence of flags.
pub fn post_body<'a>(
    flags: impl IntoIterator<Item = &'a Flag>,
) -> Result<IndexMap<String, String>, CoreError> {
    let mut body = IndexMap::new();
    for flag in flags {
        check_flag(flag)?;
        if flag.is_omitted() {
            continue;
        }
        body.insert(flag.name.clone(), flag.str_value());
    }
    Ok(body)
}

/// Render the vtctl argument vector for `command_name`.
///
/// Named flags come first as `-name=value`, then positional values, each
/// group in declaration order. Omitted flags are skipped exactly as in
/// [`build_command`].
pub fn render_args(command_name: &str, flags: &FlagMap) -> Result<Vec<String>, CoreError> {
    let mut named = Vec::new();
    let mut positional = Vec::new();
    for flag in flags.values() {
        check_flag(flag)?;
        if flag.is_omitted() {
            continue;
        }
        if flag.positional {
            positional.push(flag.to_arg());
        } else {
            named.push(flag.to_arg());
        }
    }

    let mut args = Vec::with_capacity(1 + named.len() + positional.len());
    args.push(command_name.to_string());
    args.extend(named);
    args.extend(positional);
    Ok(args)
}

fn check_flag(flag: &Flag) -> Result<(), CoreError> {
    if flag.required && flag.is_empty() {
        return Err(CoreError::Validation(format!(
            "missing required parameter `{}`",
            flag.name
        )));
    }
    if flag.kind == FlagKind::DropDown && !flag.is_empty() {
        let value = flag.str_value();
        if !flag.options.contains(&value) {
            return Err(CoreError::Validation(format!(
                "malformed selection '{value}' for `{}`",
                flag.name
            )));
        }
    }
    Ok(())
}
