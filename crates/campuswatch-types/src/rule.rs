//! Alerting rule schema.

use crate::{RiskLevel, SecurityEventType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Conditions a security event must satisfy for a rule to fire.
///
/// `min_occurrences` and `time_window_minutes` are part of the rule schema
/// but are not consulted during matching; windowed counting is future work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConditions {
    /// Exact risk level the event must carry.
    pub risk_level: Option<RiskLevel>,
    /// Declared but inert: minimum number of occurrences.
    pub min_occurrences: Option<u32>,
    /// Declared but inert: counting window in minutes.
    pub time_window_minutes: Option<u32>,
    /// Roles the event's user must be one of.
    pub user_roles: Option<Vec<String>>,
    /// Path fragments; the event path must contain at least one.
    pub paths: Option<Vec<String>>,
}

/// Side effects a rule requests when it fires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleActions {
    /// Synthesize an in-app notification.
    pub create_notification: bool,
    /// Flag the affected account for blocking.
    pub block_user: bool,
    /// Flag the source IP for blocking.
    pub block_ip: bool,
    /// Send an email alert.
    pub email_alert: bool,
    /// Send an alert through the outbound bot channel.
    pub telegram_alert: bool,
    /// POST the notification to this webhook.
    pub webhook_url: Option<String>,
}

impl RuleActions {
    /// Whether any action demands operator attention.
    pub fn requires_action(&self) -> bool {
        self.block_user || self.block_ip || self.email_alert || self.telegram_alert
    }
}

/// A declarative alerting rule evaluated against every incoming event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRule {
    /// Stable rule identifier.
    pub id: String,
    /// Short display name.
    pub name: String,
    /// What this rule is for.
    pub description: String,
    /// Event types this rule applies to.
    pub event_types: HashSet<SecurityEventType>,
    /// Match conditions.
    pub conditions: RuleConditions,
    /// Requested side effects.
    pub actions: RuleActions,
    /// Whether the rule participates in matching.
    pub is_active: bool,
    /// Advisory priority; rules are evaluated in declared order regardless.
    pub priority: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_requiring_attention() {
        let passive = RuleActions {
            create_notification: true,
            ..Default::default()
        };
        assert!(!passive.requires_action());

        let blocking = RuleActions {
            create_notification: true,
            block_ip: true,
            ..Default::default()
        };
        assert!(blocking.requires_action());
    }

    #[test]
    fn conditions_default_to_unconstrained() {
        let conditions = RuleConditions::default();
        assert!(conditions.risk_level.is_none());
        assert!(conditions.user_roles.is_none());
        assert!(conditions.paths.is_none());
    }
}
