//! Keyspace model and view selection.

use serde::{Deserialize, Serialize};

/// Route path that shows a single keyspace.
pub const KEYSPACE_PATH: &str = "keyspace";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyspace {
    pub name: String,
    /// `None` until the backend has answered.
    #[serde(default)]
    pub serving_shards: Option<Vec<String>>,
    #[serde(default)]
    pub nonserving_shards: Option<Vec<String>>,
}

/// Whether a keyspace has shards.
///
/// `Loading` and `Empty` are kept apart so an unresolved fetch is never shown
/// as "no shards".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardListing {
    Loading,
    Empty,
    HasData,
}

impl Keyspace {
    /// A keyspace whose shard lists are not known yet.
    pub fn unresolved(name: &str) -> Self {
        Self {
            name: name.to_string(),
            serving_shards: None,
            nonserving_shards: None,
        }
    }

    pub fn shard_listing(&self) -> ShardListing {
        match (&self.serving_shards, &self.nonserving_shards) {
            (Some(serving), Some(nonserving)) => {
                if serving.is_empty() && nonserving.is_empty() {
                    ShardListing::Empty
                } else {
                    ShardListing::HasData
                }
            }
            _ => ShardListing::Loading,
        }
    }

    /// Serving and non-serving shards, sorted, each once.
    pub fn all_shards(&self) -> Vec<String> {
        let mut shards: Vec<String> = self
            .serving_shards
            .iter()
            .chain(self.nonserving_shards.iter())
            .flatten()
            .cloned()
            .collect();
        shards.sort();
        shards.dedup();
        shards
    }
}

/// Pick the keyspace a view should load from its route path and `keyspace`
/// query parameter. Only the keyspace path with a non-empty name selects one.
pub fn route_keyspace<'a>(path: &str, keyspace: Option<&'a str>) -> Option<&'a str> {
    if path != KEYSPACE_PATH {
        return None;
    }
    keyspace.map(str::trim).filter(|name| !name.is_empty())
}
