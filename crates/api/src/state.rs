use std::sync::Arc;

use crate::backend::{KeyspaceService, VtctlBackend};
use crate::config::ServerConfig;
use crate::dialogs::DialogRegistry;
use crate::engine::ActionDispatcher;
use crate::keyspace_cache::KeyspaceCache;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub keyspaces: Arc<dyn KeyspaceService>,
    pub vtctl: Arc<dyn VtctlBackend>,
    pub dispatcher: ActionDispatcher,
    pub dialogs: Arc<DialogRegistry>,
    pub keyspace_cache: Arc<KeyspaceCache>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        keyspaces: Arc<dyn KeyspaceService>,
        vtctl: Arc<dyn VtctlBackend>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            keyspaces,
            dispatcher: ActionDispatcher::new(Arc::clone(&vtctl)),
            vtctl,
            dialogs: Arc::new(DialogRegistry::new()),
            keyspace_cache: Arc::new(KeyspaceCache::new()),
        }
    }
}
