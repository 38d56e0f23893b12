use std::sync::Arc;
use std::time::Duration;

use super::registry::DialogRegistry;

/// How often abandoned dialogs are looked for.
const SWEEP_INTERVAL_SECS: u64 = 60;

/// Spawn the task that evicts dialogs idle for longer than `max_idle`.
///
/// Runs until aborted through the returned handle.
pub fn start_idle_sweep(
    dialogs: Arc<DialogRegistry>,
    max_idle: Duration,
) -> tokio::task::JoinHandle<()> {
    let max_idle = chrono::Duration::from_std(max_idle).unwrap_or(chrono::Duration::MAX);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let evicted = dialogs.evict_idle(max_idle).await;
            if evicted > 0 {
                tracing::info!(evicted, "Evicted idle dialogs");
            }
        }
    })
}
