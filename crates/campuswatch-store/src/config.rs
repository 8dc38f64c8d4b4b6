//! Event store configuration.

use chrono::Duration;

/// Tunables for the event store.
#[derive(Debug, Clone)]
pub struct EventStoreConfig {
    /// Maximum events held in the ring buffer.
    pub max_events: usize,
    /// Inactivity window after which a failed-login counter resets.
    pub failed_login_window: Duration,
    /// Failure count at which suspicious-activity events are synthesized.
    pub suspicious_failure_threshold: u32,
    /// Failure count at which an account counts as login-blocked.
    pub login_block_threshold: u32,
    /// Failure count at which the source IP joins the blocked set.
    pub ip_block_threshold: u32,
    /// Events older than this are removed by `cleanup`.
    pub retention: Duration,
    /// Path fragment identifying the admin area.
    pub admin_path_marker: String,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            max_events: 1000,
            failed_login_window: Duration::minutes(15),
            suspicious_failure_threshold: 3,
            login_block_threshold: 5,
            ip_block_threshold: 10,
            retention: Duration::days(7),
            admin_path_marker: "/admin".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        let config = EventStoreConfig::default();
        assert_eq!(config.max_events, 1000);
        assert_eq!(config.failed_login_window, Duration::minutes(15));
        assert_eq!(config.suspicious_failure_threshold, 3);
        assert_eq!(config.login_block_threshold, 5);
        assert_eq!(config.ip_block_threshold, 10);
        assert_eq!(config.retention, Duration::days(7));
    }
}
