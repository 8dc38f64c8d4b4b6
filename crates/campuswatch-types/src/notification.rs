//! Notification records produced by the rule engine.

use crate::{NotificationId, RiskLevel, SecurityEventId, SecurityEventType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display class of a notification, derived from the event's risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    /// High or critical risk.
    Alert,
    /// Medium risk.
    Warning,
    /// Everything else.
    Info,
}

impl NotificationType {
    /// Derive the notification type from a risk level.
    pub fn from_risk(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::High | RiskLevel::Critical => Self::Alert,
            RiskLevel::Medium => Self::Warning,
            RiskLevel::Low => Self::Info,
        }
    }
}

/// Context carried alongside a notification for display and triage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationMetadata {
    /// Id of the rule that fired.
    pub rule_id: Option<String>,
    /// Name of the rule that fired.
    pub rule_name: Option<String>,
    /// Type of the triggering event.
    pub event_type: Option<SecurityEventType>,
    /// Source IP of the triggering event.
    pub ip_address: Option<String>,
    /// User agent of the triggering event.
    pub user_agent: Option<String>,
}

/// A notification created when a rule matches a security event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityNotification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// Display class.
    pub notification_type: NotificationType,
    /// Short headline.
    pub title: String,
    /// Full message body.
    pub message: String,
    /// The event that triggered this notification.
    pub event_id: SecurityEventId,
    /// Affected user's identifier, if known.
    pub user_id: Option<String>,
    /// Affected user's email, if known.
    pub user_email: Option<String>,
    /// Affected user's role, if known.
    pub user_role: Option<String>,
    /// Risk of the triggering event.
    pub risk_level: RiskLevel,
    /// When the notification was created.
    pub timestamp: DateTime<Utc>,
    /// Whether an operator has read this notification.
    pub is_read: bool,
    /// Whether the rule requested a blocking or alerting action.
    pub action_required: bool,
    /// Optional link to the triage view.
    pub action_url: Option<String>,
    /// Rule and event context.
    pub metadata: NotificationMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_type_from_risk() {
        assert_eq!(NotificationType::from_risk(RiskLevel::Critical), NotificationType::Alert);
        assert_eq!(NotificationType::from_risk(RiskLevel::High), NotificationType::Alert);
        assert_eq!(NotificationType::from_risk(RiskLevel::Medium), NotificationType::Warning);
        assert_eq!(NotificationType::from_risk(RiskLevel::Low), NotificationType::Info);
    }
}
