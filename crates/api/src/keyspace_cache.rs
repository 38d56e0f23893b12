//! Last known state of each keyspace view.
//!
//! A keyspace is fetched once and then served from here until an action
//! that may have changed it succeeds or its dialog closes.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use vtconsole_core::keyspace::Keyspace;

use crate::backend::{BackendError, KeyspaceService};

#[derive(Default)]
pub struct KeyspaceCache {
    entries: Mutex<HashMap<String, Keyspace>>,
}

impl KeyspaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Keyspace>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, name: &str) -> Option<Keyspace> {
        self.entries().get(name).cloned()
    }

    /// Cached keyspace, or a fresh fetch that is then cached.
    pub async fn load(
        &self,
        service: &dyn KeyspaceService,
        name: &str,
    ) -> Result<Keyspace, BackendError> {
        if let Some(keyspace) = self.get(name) {
            return Ok(keyspace);
        }
        let keyspace = service.get_keyspace(name).await?;
        self.entries().insert(name.to_string(), keyspace.clone());
        Ok(keyspace)
    }

    pub fn invalidate(&self, name: &str) {
        if self.entries().remove(name).is_some() {
            tracing::debug!(keyspace = %name, "Keyspace view invalidated");
        }
    }

    pub fn invalidate_all(&self) {
        self.entries().clear();
    }
}
