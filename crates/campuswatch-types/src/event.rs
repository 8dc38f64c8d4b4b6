//! Core security event type.

use crate::{RiskLevel, SecurityEventId, SecurityEventType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome status of a security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// The observed action succeeded.
    Success,
    /// The observed action failed.
    Failed,
    /// The observed action was blocked by policy.
    Blocked,
}

/// An immutable security event record.
///
/// Events are created only through the event store's logging entry points
/// and are never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique event identifier.
    pub id: SecurityEventId,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// What kind of event this is.
    pub event_type: SecurityEventType,
    /// Outcome of the observed action.
    pub status: EventStatus,
    /// Risk classification.
    pub risk_level: RiskLevel,
    /// Internal user identifier, if known.
    pub user_id: Option<String>,
    /// Account email, if known.
    pub user_email: Option<String>,
    /// Platform role of the user (e.g. STUDENT, TEACHER, ADMIN).
    pub user_role: Option<String>,
    /// Source IP address if applicable.
    pub ip_address: Option<String>,
    /// User agent if applicable.
    pub user_agent: Option<String>,
    /// Request path if applicable.
    pub path: Option<String>,
    /// HTTP method if applicable.
    pub method: Option<String>,
    /// Free-text description of what happened.
    pub details: String,
}

impl SecurityEvent {
    /// Create a new event builder.
    pub fn builder(event_type: SecurityEventType, status: EventStatus) -> SecurityEventBuilder {
        SecurityEventBuilder::new(event_type, status)
    }
}

/// Builder for constructing security events.
#[derive(Debug)]
pub struct SecurityEventBuilder {
    event_type: SecurityEventType,
    status: EventStatus,
    risk_level: RiskLevel,
    user_id: Option<String>,
    user_email: Option<String>,
    user_role: Option<String>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    path: Option<String>,
    method: Option<String>,
    details: String,
}

impl SecurityEventBuilder {
    /// Create a new builder.
    pub fn new(event_type: SecurityEventType, status: EventStatus) -> Self {
        Self {
            event_type,
            status,
            risk_level: RiskLevel::Low,
            user_id: None,
            user_email: None,
            user_role: None,
            ip_address: None,
            user_agent: None,
            path: None,
            method: None,
            details: String::new(),
        }
    }

    /// Set the risk level (defaults to Low).
    pub fn risk_level(mut self, risk: RiskLevel) -> Self {
        self.risk_level = risk;
        self
    }

    /// Set the user identifier.
    pub fn user_id(mut self, id: impl Into<String>) -> Self {
        self.user_id = Some(id.into());
        self
    }

    /// Set the account email.
    pub fn user_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = Some(email.into());
        self
    }

    /// Set the platform role.
    pub fn user_role(mut self, role: impl Into<String>) -> Self {
        self.user_role = Some(role.into());
        self
    }

    /// Set the source IP address.
    pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the request path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the free-text details.
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Build the event, assigning its id and timestamp.
    pub fn build(self) -> SecurityEvent {
        SecurityEvent {
            id: SecurityEventId::new(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            status: self.status,
            risk_level: self.risk_level,
            user_id: self.user_id,
            user_email: self.user_email,
            user_role: self.user_role,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            path: self.path,
            method: self.method,
            details: self.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_assigns_id_and_timestamp() {
        let event = SecurityEvent::builder(SecurityEventType::LoginFailed, EventStatus::Failed)
            .user_email("student@example.edu")
            .risk_level(RiskLevel::Medium)
            .details("Invalid password")
            .build();

        assert_eq!(event.event_type, SecurityEventType::LoginFailed);
        assert_eq!(event.status, EventStatus::Failed);
        assert_eq!(event.risk_level, RiskLevel::Medium);
        assert_eq!(event.user_email.as_deref(), Some("student@example.edu"));
        assert!(event.user_id.is_none());
    }

    #[test]
    fn distinct_events_have_distinct_ids() {
        let a = SecurityEvent::builder(SecurityEventType::Logout, EventStatus::Success).build();
        let b = SecurityEvent::builder(SecurityEventType::Logout, EventStatus::Success).build();
        assert_ne!(a.id, b.id);
    }
}
