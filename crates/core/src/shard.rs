//! Shard reference derivation for the "create shard" dialog.
//!
//! The form asks for a keyspace and a key range; the backend wants a single
//! `keyspace/lower-upper` reference.

use crate::content::PrepareResponse;
use crate::flag::FlagMap;

pub const KEYSPACE_NAME: &str = "keyspace_name";
pub const LOWER_BOUND: &str = "lower_bound";
pub const UPPER_BOUND: &str = "upper_bound";
pub const SHARD_REF: &str = "shard_ref";

/// Shard name for a key range. Two empty bounds give `"-"`, the full range.
pub fn shard_name(lower_bound: &str, upper_bound: &str) -> String {
    format!("{lower_bound}-{upper_bound}")
}

/// Derive `shard_ref` from the keyspace and bounds, then clear the three
/// source flags so they stay out of the command.
pub fn prepare_shard(mut flags: FlagMap) -> PrepareResponse {
    for name in [KEYSPACE_NAME, LOWER_BOUND, UPPER_BOUND, SHARD_REF] {
        if !flags.contains_key(name) {
            return PrepareResponse::rejected(flags, format!("missing flag `{name}`"));
        }
    }

    let name = shard_name(
        &flags[LOWER_BOUND].str_value(),
        &flags[UPPER_BOUND].str_value(),
    );
    let shard_ref = format!("{}/{name}", flags[KEYSPACE_NAME].str_value());

    if let Err(e) = flags[SHARD_REF].set_value(&shard_ref) {
        return PrepareResponse::rejected(flags, e.to_string());
    }
    for source in [KEYSPACE_NAME, LOWER_BOUND, UPPER_BOUND] {
        flags[source].clear();
    }

    PrepareResponse::ok(flags)
}
