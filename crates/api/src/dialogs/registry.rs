use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;
use vtconsole_core::error::CoreError;

use super::session::DialogSession;

/// Open dialogs by id.
///
/// Handlers and the idle sweep share one registry through `AppState`.
pub struct DialogRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<DialogSession>>>,
}

impl DialogRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn insert(&self, session: DialogSession) -> Arc<DialogSession> {
        let session = Arc::new(session);
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::clone(&session));
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<DialogSession>, CoreError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "Dialog",
                id: id.to_string(),
            })
    }

    /// Close and forget a dialog. Rejected while its dispatch is pending,
    /// in which case the dialog stays registered.
    pub async fn close(&self, id: Uuid) -> Result<(), CoreError> {
        let session = self.get(id).await?;
        session.close().await?;
        self.sessions.write().await.remove(&id);
        Ok(())
    }

    /// Forget a dialog regardless of its state, discarding any late result.
    pub async fn teardown(&self, id: Uuid) -> Result<(), CoreError> {
        let session = self.sessions.write().await.remove(&id).ok_or_else(|| {
            CoreError::NotFound {
                entity: "Dialog",
                id: id.to_string(),
            }
        })?;
        session.teardown();
        Ok(())
    }

    /// True iff no dialog has a dispatch pending. A host must not navigate
    /// away while this is false.
    pub async fn can_deactivate(&self) -> bool {
        let sessions: Vec<Arc<DialogSession>> =
            self.sessions.read().await.values().cloned().collect();
        for session in sessions {
            if session.is_pending().await {
                return false;
            }
        }
        true
    }

    /// Forget dialogs nobody has touched for `max_idle`, plus any already
    /// torn down. Dialogs with a dispatch pending are kept. Returns how many
    /// were evicted.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write().await;

        let mut stale = Vec::new();
        for (id, session) in sessions.iter() {
            let idle = session.last_activity() <= cutoff;
            if (idle || session.is_torn_down()) && !session.is_pending().await {
                stale.push(*id);
            }
        }

        for id in &stale {
            if let Some(session) = sessions.remove(id) {
                session.teardown();
                tracing::debug!(dialog_id = %id, "Evicted idle dialog");
            }
        }
        stale.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Tear down every dialog. Called on server shutdown.
    pub async fn shutdown_all(&self) {
        let drained: Vec<Arc<DialogSession>> =
            self.sessions.write().await.drain().map(|(_, s)| s).collect();
        for session in &drained {
            session.teardown();
        }
    }
}

impl Default for DialogRegistry {
    fn default() -> Self {
        Self::new()
    }
}
