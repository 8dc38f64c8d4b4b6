//! Rule evaluation and notification management.

use crate::{
    default_rules, template, EffectSink, LoggingSink, SideEffect, SubscriberRegistry, Subscription,
};
use campuswatch_types::{
    NotificationId, NotificationMetadata, NotificationRule, NotificationType, RiskLevel,
    SecurityEvent, SecurityNotification,
};
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Evaluates the rule set against incoming events and owns the in-memory
/// notification list.
pub struct RuleEngine {
    rules: RwLock<Vec<NotificationRule>>,
    notifications: RwLock<Vec<SecurityNotification>>,
    subscribers: SubscriberRegistry,
    sink: Arc<dyn EffectSink>,
}

impl RuleEngine {
    /// Create an engine seeded with the default rule set.
    pub fn new(sink: Arc<dyn EffectSink>) -> Self {
        Self::with_rules(default_rules(), sink)
    }

    /// Create an engine with an explicit rule set.
    pub fn with_rules(rules: Vec<NotificationRule>, sink: Arc<dyn EffectSink>) -> Self {
        Self {
            rules: RwLock::new(rules),
            notifications: RwLock::new(Vec::new()),
            subscribers: SubscriberRegistry::new(),
            sink,
        }
    }

    /// Evaluate every active rule against the event.
    ///
    /// Rules are checked in declared order. Each match synthesizes one
    /// notification, appends it to the list, broadcasts it to subscribers
    /// and hands the rule's side effects to the sink. Returns the created
    /// notifications.
    pub fn process_event(&self, event: &SecurityEvent) -> Vec<SecurityNotification> {
        let matched: Vec<NotificationRule> = {
            let rules = self.rules.read();
            rules
                .iter()
                .filter(|rule| rule.is_active && rule_matches(rule, event))
                .cloned()
                .collect()
        };

        let mut created = Vec::with_capacity(matched.len());
        for rule in matched {
            debug!(rule = %rule.id, event = %event.id, "rule matched");
            let notification = self.synthesize(&rule, event);
            self.notifications.write().push(notification.clone());
            self.subscribers.broadcast(&notification);
            self.trigger_effects(&rule, event, &notification);
            created.push(notification);
        }
        created
    }

    /// Register a notification listener. Keep the token alive for as long as
    /// the listener should receive notifications.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SecurityNotification) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Most-recent-first slice of notifications.
    pub fn get_notifications(&self, limit: usize) -> Vec<SecurityNotification> {
        let notifications = self.notifications.read();
        notifications.iter().rev().take(limit).cloned().collect()
    }

    /// All unread notifications, oldest first.
    pub fn get_unread_notifications(&self) -> Vec<SecurityNotification> {
        let notifications = self.notifications.read();
        notifications.iter().filter(|n| !n.is_read).cloned().collect()
    }

    /// All notifications of the given display class, oldest first.
    pub fn get_notifications_by_type(
        &self,
        notification_type: NotificationType,
    ) -> Vec<SecurityNotification> {
        let notifications = self.notifications.read();
        notifications
            .iter()
            .filter(|n| n.notification_type == notification_type)
            .cloned()
            .collect()
    }

    /// All notifications at the given risk level, oldest first.
    pub fn get_notifications_by_risk(&self, risk: RiskLevel) -> Vec<SecurityNotification> {
        let notifications = self.notifications.read();
        notifications
            .iter()
            .filter(|n| n.risk_level == risk)
            .cloned()
            .collect()
    }

    /// Mark one notification as read. False if the id is unknown.
    pub fn mark_as_read(&self, id: NotificationId) -> bool {
        let mut notifications = self.notifications.write();
        match notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.is_read = true;
                true
            }
            None => false,
        }
    }

    /// Mark every notification as read.
    pub fn mark_all_as_read(&self) {
        let mut notifications = self.notifications.write();
        for notification in notifications.iter_mut() {
            notification.is_read = true;
        }
    }

    /// Delete one notification. False if the id is unknown.
    pub fn delete_notification(&self, id: NotificationId) -> bool {
        let mut notifications = self.notifications.write();
        let before = notifications.len();
        notifications.retain(|n| n.id != id);
        notifications.len() != before
    }

    /// Drop notifications older than `days_old` days. Returns how many were
    /// removed.
    pub fn cleanup_old_notifications(&self, days_old: i64) -> usize {
        let cutoff = Utc::now() - Duration::days(days_old);
        let mut notifications = self.notifications.write();
        let before = notifications.len();
        notifications.retain(|n| n.timestamp >= cutoff);
        before - notifications.len()
    }

    /// Append a rule to the set.
    pub fn add_rule(&self, rule: NotificationRule) {
        self.rules.write().push(rule);
    }

    /// Replace the rule with the same id. False if the id is unknown.
    pub fn update_rule(&self, rule: NotificationRule) -> bool {
        let mut rules = self.rules.write();
        match rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => {
                *existing = rule;
                true
            }
            None => false,
        }
    }

    /// Remove a rule by id. False if the id is unknown.
    pub fn delete_rule(&self, id: &str) -> bool {
        let mut rules = self.rules.write();
        let before = rules.len();
        rules.retain(|r| r.id != id);
        rules.len() != before
    }

    /// Snapshot of the current rule set.
    pub fn rules(&self) -> Vec<NotificationRule> {
        self.rules.read().clone()
    }

    fn synthesize(&self, rule: &NotificationRule, event: &SecurityEvent) -> SecurityNotification {
        let action_required = rule.actions.requires_action();
        SecurityNotification {
            id: NotificationId::new(),
            notification_type: NotificationType::from_risk(event.risk_level),
            title: template::title(event),
            message: template::message(event),
            event_id: event.id,
            user_id: event.user_id.clone(),
            user_email: event.user_email.clone(),
            user_role: event.user_role.clone(),
            risk_level: event.risk_level,
            timestamp: Utc::now(),
            is_read: false,
            action_required,
            action_url: action_required.then(|| "/admin/security".to_string()),
            metadata: NotificationMetadata {
                rule_id: Some(rule.id.clone()),
                rule_name: Some(rule.name.clone()),
                event_type: Some(event.event_type),
                ip_address: event.ip_address.clone(),
                user_agent: event.user_agent.clone(),
            },
        }
    }

    fn trigger_effects(
        &self,
        rule: &NotificationRule,
        event: &SecurityEvent,
        notification: &SecurityNotification,
    ) {
        if rule.actions.telegram_alert {
            self.sink.dispatch(SideEffect::TelegramAlert {
                notification: notification.clone(),
            });
        }
        if rule.actions.email_alert {
            self.sink.dispatch(SideEffect::EmailAlert {
                notification: notification.clone(),
            });
        }
        if rule.actions.block_user && (event.user_id.is_some() || event.user_email.is_some()) {
            self.sink.dispatch(SideEffect::BlockUser {
                user_id: event.user_id.clone(),
                user_email: event.user_email.clone(),
            });
        }
        if rule.actions.block_ip {
            if let Some(ip) = event.ip_address.as_deref() {
                self.sink.dispatch(SideEffect::BlockIp { ip: ip.to_string() });
            }
        }
        if let Some(url) = rule.actions.webhook_url.as_deref() {
            self.sink.dispatch(SideEffect::Webhook {
                url: url.to_string(),
                notification: notification.clone(),
            });
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(Arc::new(LoggingSink))
    }
}

/// Whether every declared condition on the rule matches the event.
///
/// `min_occurrences` and `time_window_minutes` are deliberately not
/// consulted; they are declared schema without matching semantics.
fn rule_matches(rule: &NotificationRule, event: &SecurityEvent) -> bool {
    if !rule.event_types.contains(&event.event_type) {
        return false;
    }

    if let Some(risk) = rule.conditions.risk_level {
        if event.risk_level != risk {
            return false;
        }
    }

    if let Some(roles) = rule.conditions.user_roles.as_deref() {
        match event.user_role.as_deref() {
            Some(role) if roles.iter().any(|r| r == role) => {}
            _ => return false,
        }
    }

    if let Some(paths) = rule.conditions.paths.as_deref() {
        match event.path.as_deref() {
            Some(path) if paths.iter().any(|p| path.contains(p.as_str())) => {}
            _ => return false,
        }
    }

    true
}
