//! The inbound reporting surface.

use campuswatch_rules::RuleEngine;
use campuswatch_store::EventStore;
use campuswatch_types::{RiskLevel, SecurityNotification};
use std::sync::Arc;

/// Front door of the monitoring subsystem.
///
/// The rest of the application reports authentication and access outcomes
/// here. Each report runs synchronously through the event store (which may
/// synthesize secondary suspicious-activity events) and then hands every
/// logged event to the rule engine. The notifications created along the way
/// are returned; side effects have already been queued by the engine's sink
/// and complete on their own schedule.
pub struct SecurityMonitor {
    store: Arc<EventStore>,
    engine: Arc<RuleEngine>,
}

impl SecurityMonitor {
    /// Wire a monitor from its constructed parts.
    pub fn new(store: Arc<EventStore>, engine: Arc<RuleEngine>) -> Self {
        Self { store, engine }
    }

    /// Report a login attempt outcome.
    pub fn report_login_attempt(
        &self,
        email: &str,
        success: bool,
        details: &str,
        ip: Option<&str>,
    ) -> Vec<SecurityNotification> {
        let events = self.store.log_login_attempt(email, success, details, ip);
        self.process_all(events)
    }

    /// Report an access attempt outcome.
    pub fn report_access_attempt(
        &self,
        user_id: &str,
        role: &str,
        path: &str,
        method: &str,
        success: bool,
        details: &str,
    ) -> Vec<SecurityNotification> {
        let events = self
            .store
            .log_access_attempt(user_id, role, path, method, success, details);
        self.process_all(events)
    }

    /// Report suspicious activity observed elsewhere in the platform.
    pub fn report_suspicious_activity(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
        details: &str,
        risk: RiskLevel,
    ) -> Vec<SecurityNotification> {
        let events = self
            .store
            .log_suspicious_activity(user_id, email, role, details, risk);
        self.process_all(events)
    }

    /// The underlying event store.
    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    /// The underlying rule engine.
    pub fn engine(&self) -> &Arc<RuleEngine> {
        &self.engine
    }

    fn process_all(
        &self,
        events: Vec<campuswatch_types::SecurityEvent>,
    ) -> Vec<SecurityNotification> {
        let mut notifications = Vec::new();
        for event in &events {
            notifications.extend(self.engine.process_event(event));
        }
        notifications
    }
}
