//! Aggregate metrics over the event buffer.

use campuswatch_types::{RiskLevel, SecurityEvent, SecurityEventType};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Counts over the trailing 24 hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowedMetrics {
    /// Successful logins.
    pub logins: usize,
    /// Failed logins.
    pub failed_logins: usize,
    /// Denied access attempts.
    pub access_denied: usize,
}

/// Snapshot of security metrics, derived purely from the current buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SecurityMetrics {
    /// Events currently held.
    pub total_events: usize,
    /// Failed-login events in the buffer.
    pub failed_logins: usize,
    /// Access-denied events in the buffer.
    pub access_denied: usize,
    /// Suspicious-activity events in the buffer.
    pub suspicious_activity: usize,
    /// Events at High or Critical risk.
    pub high_or_critical: usize,
    /// Counts restricted to the last 24 hours.
    pub last_24h: WindowedMetrics,
}

impl SecurityMetrics {
    /// Compute metrics from the buffer contents at `now`.
    pub fn compute<'a>(events: impl Iterator<Item = &'a SecurityEvent>, now: DateTime<Utc>) -> Self {
        let window_start = now - Duration::hours(24);
        let mut metrics = Self::default();

        for event in events {
            metrics.total_events += 1;
            match event.event_type {
                SecurityEventType::LoginFailed => metrics.failed_logins += 1,
                SecurityEventType::AccessDenied => metrics.access_denied += 1,
                SecurityEventType::SuspiciousActivity => metrics.suspicious_activity += 1,
                _ => {}
            }
            if event.risk_level >= RiskLevel::High {
                metrics.high_or_critical += 1;
            }
            if event.timestamp >= window_start {
                match event.event_type {
                    SecurityEventType::LoginSuccess => metrics.last_24h.logins += 1,
                    SecurityEventType::LoginFailed => metrics.last_24h.failed_logins += 1,
                    SecurityEventType::AccessDenied => metrics.last_24h.access_denied += 1,
                    _ => {}
                }
            }
        }

        metrics
    }
}
