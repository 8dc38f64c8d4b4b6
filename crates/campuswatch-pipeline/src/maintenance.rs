//! Periodic cleanup of events and notifications.

use campuswatch_rules::RuleEngine;
use campuswatch_store::EventStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Maintenance schedule.
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// How often cleanup runs.
    pub interval: Duration,
    /// Notifications older than this many days are removed.
    pub notification_retention_days: i64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(24 * 60 * 60),
            notification_retention_days: 30,
        }
    }
}

/// Spawn the maintenance loop. Runs for the life of the process; abort the
/// returned handle to stop it.
pub fn spawn_maintenance(
    config: MaintenanceConfig,
    store: Arc<EventStore>,
    engine: Arc<RuleEngine>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval);
        // The first tick fires immediately; skip it so startup is quiet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let events_removed = store.cleanup();
            let notifications_removed =
                engine.cleanup_old_notifications(config.notification_retention_days);
            debug!(events_removed, notifications_removed, "maintenance pass complete");
        }
    })
}
