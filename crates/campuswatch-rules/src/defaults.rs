//! Default rule set seeded at startup.

use campuswatch_types::{
    NotificationRule, RiskLevel, RuleActions, RuleConditions, SecurityEventType,
};
use std::collections::HashSet;

/// The four rules every deployment starts with.
///
/// Rules are evaluated in this declared order; `priority` is advisory and
/// not used to sort before matching.
pub fn default_rules() -> Vec<NotificationRule> {
    vec![
        NotificationRule {
            id: "multiple-failed-logins".to_string(),
            name: "Multiple failed logins".to_string(),
            description: "Three or more failed logins for one account".to_string(),
            event_types: HashSet::from([SecurityEventType::LoginFailed]),
            conditions: RuleConditions {
                risk_level: Some(RiskLevel::High),
                min_occurrences: Some(3),
                time_window_minutes: Some(15),
                ..Default::default()
            },
            actions: RuleActions {
                create_notification: true,
                block_user: true,
                email_alert: true,
                telegram_alert: true,
                ..Default::default()
            },
            is_active: true,
            priority: 2,
        },
        NotificationRule {
            id: "admin-area-denied".to_string(),
            name: "Admin area access denied".to_string(),
            description: "Denied access attempt on an admin-area path".to_string(),
            event_types: HashSet::from([SecurityEventType::AccessDenied]),
            conditions: RuleConditions {
                risk_level: Some(RiskLevel::Medium),
                paths: Some(vec!["/admin".to_string()]),
                ..Default::default()
            },
            actions: RuleActions {
                create_notification: true,
                email_alert: true,
                telegram_alert: true,
                ..Default::default()
            },
            is_active: true,
            priority: 3,
        },
        NotificationRule {
            id: "high-risk-suspicious-activity".to_string(),
            name: "High-risk suspicious activity".to_string(),
            description: "Suspicious activity classified as high risk".to_string(),
            event_types: HashSet::from([SecurityEventType::SuspiciousActivity]),
            conditions: RuleConditions {
                risk_level: Some(RiskLevel::High),
                ..Default::default()
            },
            actions: RuleActions {
                create_notification: true,
                block_ip: true,
                email_alert: true,
                telegram_alert: true,
                ..Default::default()
            },
            is_active: true,
            priority: 2,
        },
        NotificationRule {
            id: "critical-security-event".to_string(),
            name: "Critical security event".to_string(),
            description: "Any critical-risk failure, denial or suspicious activity".to_string(),
            event_types: HashSet::from([
                SecurityEventType::LoginFailed,
                SecurityEventType::AccessDenied,
                SecurityEventType::SuspiciousActivity,
            ]),
            conditions: RuleConditions {
                risk_level: Some(RiskLevel::Critical),
                ..Default::default()
            },
            actions: RuleActions {
                create_notification: true,
                block_user: true,
                block_ip: true,
                email_alert: true,
                telegram_alert: true,
                ..Default::default()
            },
            is_active: true,
            priority: 1,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_set_has_four_active_rules() {
        let rules = default_rules();
        assert_eq!(rules.len(), 4);
        assert!(rules.iter().all(|r| r.is_active));
        assert!(rules.iter().all(|r| r.actions.create_notification));
    }

    #[test]
    fn critical_rule_covers_three_event_types() {
        let rules = default_rules();
        let critical = rules.iter().find(|r| r.id == "critical-security-event").unwrap();
        assert_eq!(critical.event_types.len(), 3);
        assert!(critical.actions.block_user && critical.actions.block_ip);
    }
}
