//! The bounded event store and brute-force bookkeeping.

use crate::{EventStoreConfig, SecurityMetrics};
use campuswatch_types::{
    EventStatus, RiskLevel, SecurityEvent, SecurityEventType,
};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{info, warn};

/// Roles allowed to touch the admin area without raising suspicion.
const PRIVILEGED_ROLES: &[&str] = &["ADMIN", "TEACHER"];

/// Per-account failed-login counter with inactivity-based reset.
#[derive(Debug, Clone)]
struct FailedLoginCounter {
    count: u32,
    last_attempt: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreState {
    events: VecDeque<SecurityEvent>,
    failed_logins: HashMap<String, FailedLoginCounter>,
    blocked_ips: HashSet<String>,
}

/// Bounded in-memory store of security events.
///
/// Holds at most `max_events` entries, evicting the oldest first. Also owns
/// the failed-login counters and the blocked-IP set, which are consulted by
/// the logging entry points to classify risk and synthesize
/// suspicious-activity events.
pub struct EventStore {
    config: EventStoreConfig,
    state: RwLock<StoreState>,
}

impl EventStore {
    /// Create a store with the given configuration.
    pub fn new(config: EventStoreConfig) -> Self {
        Self {
            config,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Append an event and run suspicious-activity checks.
    ///
    /// Returns the appended events: the primary one first, followed by any
    /// synthesized suspicious-activity events. The caller is expected to
    /// hand each of them to the rule engine.
    pub fn log_event(&self, event: SecurityEvent) -> Vec<SecurityEvent> {
        let mut state = self.state.write();
        self.log_event_locked(&mut state, event)
    }

    /// Record a login attempt outcome.
    ///
    /// Risk is derived from the account's failure history: a success is
    /// always Low; a failure is High once the account has accumulated
    /// `login_block_threshold` prior failures, Medium at
    /// `suspicious_failure_threshold`, Low otherwise.
    pub fn log_login_attempt(
        &self,
        email: &str,
        success: bool,
        details: &str,
        ip: Option<&str>,
    ) -> Vec<SecurityEvent> {
        let now = Utc::now();
        let mut state = self.state.write();
        self.expire_counter(&mut state, email, now);

        let risk = self.login_risk(&state, email, success);
        let (event_type, status) = if success {
            (SecurityEventType::LoginSuccess, EventStatus::Success)
        } else {
            (SecurityEventType::LoginFailed, EventStatus::Failed)
        };

        let mut builder = SecurityEvent::builder(event_type, status)
            .user_email(email)
            .risk_level(risk)
            .details(details);
        if let Some(ip) = ip {
            builder = builder.ip_address(ip);
        }

        if !success {
            self.track_failed_login(&mut state, email, ip, now);
        }

        self.log_event_locked(&mut state, builder.build())
    }

    /// Record an access attempt outcome.
    pub fn log_access_attempt(
        &self,
        user_id: &str,
        role: &str,
        path: &str,
        method: &str,
        success: bool,
        details: &str,
    ) -> Vec<SecurityEvent> {
        let (event_type, status, risk) = if success {
            (SecurityEventType::AccessAttempt, EventStatus::Success, RiskLevel::Low)
        } else {
            (SecurityEventType::AccessDenied, EventStatus::Failed, RiskLevel::Medium)
        };

        let event = SecurityEvent::builder(event_type, status)
            .user_id(user_id)
            .user_role(role)
            .path(path)
            .method(method)
            .risk_level(risk)
            .details(details)
            .build();

        let mut state = self.state.write();
        self.log_event_locked(&mut state, event)
    }

    /// Record explicitly reported suspicious activity.
    ///
    /// The risk floor is Medium; callers reporting Low are raised to it.
    pub fn log_suspicious_activity(
        &self,
        user_id: &str,
        email: &str,
        role: &str,
        details: &str,
        risk: RiskLevel,
    ) -> Vec<SecurityEvent> {
        let event = SecurityEvent::builder(SecurityEventType::SuspiciousActivity, EventStatus::Blocked)
            .user_id(user_id)
            .user_email(email)
            .user_role(role)
            .risk_level(risk.max(RiskLevel::Medium))
            .details(details)
            .build();

        let mut state = self.state.write();
        self.log_event_locked(&mut state, event)
    }

    /// Most-recent-first slice of the buffer.
    pub fn get_events(&self, limit: usize) -> Vec<SecurityEvent> {
        let state = self.state.read();
        state.events.iter().rev().take(limit).cloned().collect()
    }

    /// All buffered events of the given type, oldest first.
    pub fn get_events_by_type(&self, event_type: SecurityEventType) -> Vec<SecurityEvent> {
        let state = self.state.read();
        state
            .events
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// All buffered events for the given user, oldest first.
    pub fn get_events_by_user(&self, user_id: &str) -> Vec<SecurityEvent> {
        let state = self.state.read();
        state
            .events
            .iter()
            .filter(|e| e.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect()
    }

    /// Metrics derived from the current buffer contents.
    pub fn metrics(&self) -> SecurityMetrics {
        let state = self.state.read();
        SecurityMetrics::compute(state.events.iter(), Utc::now())
    }

    /// Whether this IP is in the blocked set.
    pub fn is_ip_blocked(&self, ip: &str) -> bool {
        self.state.read().blocked_ips.contains(ip)
    }

    /// Whether this account has crossed the login-block threshold within the
    /// failure window.
    pub fn is_login_blocked(&self, email: &str) -> bool {
        let now = Utc::now();
        let mut state = self.state.write();
        self.expire_counter(&mut state, email, now);
        state
            .failed_logins
            .get(email)
            .map(|c| c.count >= self.config.login_block_threshold)
            .unwrap_or(false)
    }

    /// Add an IP to the blocked set. Returns true if it was not already
    /// blocked. Membership is permanent for the process lifetime.
    pub fn block_ip(&self, ip: &str) -> bool {
        let mut state = self.state.write();
        let inserted = state.blocked_ips.insert(ip.to_string());
        if inserted {
            warn!(ip, "IP address added to blocked set");
        }
        inserted
    }

    /// Drop events older than the retention window. Returns how many were
    /// removed. Intended to run on a fixed interval.
    pub fn cleanup(&self) -> usize {
        let cutoff = Utc::now() - self.config.retention;
        let mut state = self.state.write();
        let before = state.events.len();
        state.events.retain(|e| e.timestamp >= cutoff);
        let removed = before - state.events.len();
        if removed > 0 {
            info!(removed, "expired old security events");
        }
        removed
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.state.read().events.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.state.read().events.is_empty()
    }

    fn log_event_locked(&self, state: &mut StoreState, event: SecurityEvent) -> Vec<SecurityEvent> {
        self.append(state, event.clone());
        let mut logged = vec![event];

        let synthesized = self.check_suspicious_activity(state, &logged[0]);
        for event in synthesized {
            self.append(state, event.clone());
            logged.push(event);
        }

        logged
    }

    fn append(&self, state: &mut StoreState, event: SecurityEvent) {
        if state.events.len() >= self.config.max_events {
            state.events.pop_front();
        }
        info!(
            event_id = %event.id,
            event_type = %event.event_type,
            risk = event.risk_level.label(),
            "security event logged"
        );
        state.events.push_back(event);
    }

    /// Risk classification for a login outcome, based on the account's
    /// failure count prior to this attempt.
    fn login_risk(&self, state: &StoreState, email: &str, success: bool) -> RiskLevel {
        if success {
            return RiskLevel::Low;
        }
        let prior = state.failed_logins.get(email).map(|c| c.count).unwrap_or(0);
        if prior >= self.config.login_block_threshold {
            RiskLevel::High
        } else if prior >= self.config.suspicious_failure_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    fn track_failed_login(
        &self,
        state: &mut StoreState,
        email: &str,
        ip: Option<&str>,
        now: DateTime<Utc>,
    ) {
        let counter = state
            .failed_logins
            .entry(email.to_string())
            .or_insert(FailedLoginCounter {
                count: 0,
                last_attempt: now,
            });
        counter.count += 1;
        counter.last_attempt = now;
        let count = counter.count;

        if count >= self.config.ip_block_threshold {
            if let Some(ip) = ip {
                // HashSet::insert is true only on the first crossing, so the
                // warning fires once per IP.
                if state.blocked_ips.insert(ip.to_string()) {
                    warn!(email, ip, count, "failure threshold crossed, IP blocked");
                }
            }
        }
    }

    /// Synthesize secondary suspicious-activity events for a just-logged
    /// event.
    ///
    /// The failed-login branch re-fires on every qualifying failure past the
    /// threshold, not only the first crossing; downstream rate limiting is
    /// deliberately left to future work.
    fn check_suspicious_activity(
        &self,
        state: &StoreState,
        event: &SecurityEvent,
    ) -> Vec<SecurityEvent> {
        let mut synthesized = Vec::new();

        match event.event_type {
            SecurityEventType::LoginFailed => {
                if let Some(email) = event.user_email.as_deref() {
                    let count = state.failed_logins.get(email).map(|c| c.count).unwrap_or(0);
                    if count >= self.config.suspicious_failure_threshold {
                        let mut builder = SecurityEvent::builder(
                            SecurityEventType::SuspiciousActivity,
                            EventStatus::Failed,
                        )
                        .user_email(email)
                        .risk_level(RiskLevel::High)
                        .details(format!(
                            "Multiple failed login attempts: {count} failures for {email}"
                        ));
                        if let Some(ip) = event.ip_address.as_deref() {
                            builder = builder.ip_address(ip);
                        }
                        synthesized.push(builder.build());
                    }
                }
            }
            SecurityEventType::AccessDenied => {
                let in_admin_area = event
                    .path
                    .as_deref()
                    .map(|p| p.contains(&self.config.admin_path_marker))
                    .unwrap_or(false);
                let privileged = event
                    .user_role
                    .as_deref()
                    .map(|r| PRIVILEGED_ROLES.contains(&r.to_uppercase().as_str()))
                    .unwrap_or(false);

                if in_admin_area && !privileged {
                    let mut builder = SecurityEvent::builder(
                        SecurityEventType::SuspiciousActivity,
                        EventStatus::Failed,
                    )
                    .risk_level(RiskLevel::Medium)
                    .details(format!(
                        "Unprivileged access attempt on admin area: {}",
                        event.path.as_deref().unwrap_or_default()
                    ));
                    if let Some(user_id) = event.user_id.as_deref() {
                        builder = builder.user_id(user_id);
                    }
                    if let Some(role) = event.user_role.as_deref() {
                        builder = builder.user_role(role);
                    }
                    if let Some(path) = event.path.as_deref() {
                        builder = builder.path(path);
                    }
                    synthesized.push(builder.build());
                }
            }
            _ => {}
        }

        synthesized
    }

    fn expire_counter(&self, state: &mut StoreState, email: &str, now: DateTime<Utc>) {
        let expired = state
            .failed_logins
            .get(email)
            .map(|c| now - c.last_attempt > self.config.failed_login_window)
            .unwrap_or(false);
        if expired {
            state.failed_logins.remove(email);
        }
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(EventStoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn small_store(max_events: usize) -> EventStore {
        EventStore::new(EventStoreConfig {
            max_events,
            ..Default::default()
        })
    }

    #[test]
    fn buffer_never_exceeds_capacity() {
        let store = small_store(10);
        for i in 0..25 {
            store.log_event(
                SecurityEvent::builder(SecurityEventType::Logout, EventStatus::Success)
                    .details(format!("logout {i}"))
                    .build(),
            );
        }
        assert_eq!(store.len(), 10);

        let newest = store.get_events(10);
        assert_eq!(newest[0].details, "logout 24");
        assert_eq!(newest[9].details, "logout 15");
    }

    #[test]
    fn overflow_keeps_the_last_max_events_in_order() {
        let store = small_store(1000);
        for i in 0..1001 {
            store.log_event(
                SecurityEvent::builder(SecurityEventType::ProfileUpdate, EventStatus::Success)
                    .details(format!("update {i}"))
                    .build(),
            );
        }
        assert_eq!(store.len(), 1000);
        let events = store.get_events(1000);
        assert_eq!(events.len(), 1000);
        // Event #0 was evicted; #1..=#1000 remain, newest first.
        assert_eq!(events[0].details, "update 1000");
        assert_eq!(events[999].details, "update 1");
    }

    #[test]
    fn three_failures_raise_suspicious_activity_but_no_login_block() {
        // Scenario A.
        let store = EventStore::default();
        for _ in 0..3 {
            store.log_login_attempt("u@x.com", false, "bad password", Some("1.2.3.4"));
        }

        assert!(!store.is_login_blocked("u@x.com"));
        let suspicious = store.get_events_by_type(SecurityEventType::SuspiciousActivity);
        assert_eq!(suspicious.len(), 1);
        assert_eq!(suspicious[0].risk_level, RiskLevel::High);
        assert_eq!(suspicious[0].user_email.as_deref(), Some("u@x.com"));
    }

    #[test]
    fn suspicious_activity_refires_on_every_qualifying_failure() {
        let store = EventStore::default();
        for _ in 0..5 {
            store.log_login_attempt("u@x.com", false, "bad password", None);
        }
        // Failures 3, 4 and 5 each synthesize one.
        let suspicious = store.get_events_by_type(SecurityEventType::SuspiciousActivity);
        assert_eq!(suspicious.len(), 3);
    }

    #[test]
    fn five_failures_block_the_login() {
        // Scenario B.
        let store = EventStore::default();
        for _ in 0..5 {
            store.log_login_attempt("u@x.com", false, "bad password", None);
        }
        assert!(store.is_login_blocked("u@x.com"));
    }

    #[test]
    fn tenth_failure_blocks_the_ip_permanently() {
        // Scenario C.
        let store = EventStore::default();
        for _ in 0..9 {
            store.log_login_attempt("u@x.com", false, "bad password", Some("1.2.3.4"));
        }
        assert!(!store.is_ip_blocked("1.2.3.4"));

        store.log_login_attempt("u@x.com", false, "bad password", Some("1.2.3.4"));
        assert!(store.is_ip_blocked("1.2.3.4"));

        // A later success does not unblock the IP.
        store.log_login_attempt("u@x.com", true, "recovered", Some("1.2.3.4"));
        assert!(store.is_ip_blocked("1.2.3.4"));
    }

    #[test]
    fn login_risk_escalates_with_prior_failures() {
        let store = EventStore::default();

        let first = store.log_login_attempt("u@x.com", false, "bad password", None);
        assert_eq!(first[0].risk_level, RiskLevel::Low);

        for _ in 0..2 {
            store.log_login_attempt("u@x.com", false, "bad password", None);
        }
        // Prior failures = 3 here.
        let fourth = store.log_login_attempt("u@x.com", false, "bad password", None);
        assert_eq!(fourth[0].risk_level, RiskLevel::Medium);

        store.log_login_attempt("u@x.com", false, "bad password", None);
        // Prior failures = 5.
        let sixth = store.log_login_attempt("u@x.com", false, "bad password", None);
        assert_eq!(sixth[0].risk_level, RiskLevel::High);
    }

    #[test]
    fn counter_resets_after_inactivity_gap() {
        let store = EventStore::default();
        for _ in 0..5 {
            store.log_login_attempt("u@x.com", false, "bad password", None);
        }
        assert!(store.is_login_blocked("u@x.com"));

        // Backdate the last failure beyond the window.
        {
            let mut state = store.state.write();
            let counter = state.failed_logins.get_mut("u@x.com").unwrap();
            counter.last_attempt = Utc::now() - Duration::minutes(16);
        }
        assert!(!store.is_login_blocked("u@x.com"));
    }

    #[test]
    fn denied_admin_access_by_student_synthesizes_suspicious_event() {
        let store = EventStore::default();
        let logged = store.log_access_attempt(
            "user-7",
            "STUDENT",
            "/admin/users",
            "GET",
            false,
            "missing permission",
        );

        assert_eq!(logged.len(), 2);
        assert_eq!(logged[0].event_type, SecurityEventType::AccessDenied);
        assert_eq!(logged[1].event_type, SecurityEventType::SuspiciousActivity);
        assert_eq!(logged[1].risk_level, RiskLevel::Medium);
    }

    #[test]
    fn denied_admin_access_by_teacher_is_not_suspicious() {
        let store = EventStore::default();
        let logged =
            store.log_access_attempt("user-2", "TEACHER", "/admin/users", "GET", false, "denied");
        assert_eq!(logged.len(), 1);
    }

    #[test]
    fn explicit_suspicious_activity_has_a_medium_floor() {
        let store = EventStore::default();
        let logged =
            store.log_suspicious_activity("user-1", "u@x.com", "STUDENT", "odd", RiskLevel::Low);
        assert_eq!(logged[0].risk_level, RiskLevel::Medium);
        assert_eq!(logged[0].status, EventStatus::Blocked);
    }

    #[test]
    fn cleanup_removes_only_expired_events() {
        let store = EventStore::default();
        store.log_event(
            SecurityEvent::builder(SecurityEventType::Logout, EventStatus::Success).build(),
        );
        store.log_event(
            SecurityEvent::builder(SecurityEventType::Logout, EventStatus::Success).build(),
        );
        {
            let mut state = store.state.write();
            state.events[0].timestamp = Utc::now() - Duration::days(8);
        }

        let removed = store.cleanup();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn metrics_track_the_24_hour_window() {
        let store = EventStore::default();
        store.log_login_attempt("a@x.com", true, "ok", None);
        store.log_login_attempt("b@x.com", false, "bad password", None);
        store.log_access_attempt("user-1", "STUDENT", "/courses", "GET", false, "denied");

        {
            let mut state = store.state.write();
            state.events[0].timestamp = Utc::now() - Duration::hours(30);
        }

        let metrics = store.metrics();
        assert_eq!(metrics.total_events, 3);
        assert_eq!(metrics.failed_logins, 1);
        assert_eq!(metrics.access_denied, 1);
        assert_eq!(metrics.last_24h.logins, 0);
        assert_eq!(metrics.last_24h.failed_logins, 1);
        assert_eq!(metrics.last_24h.access_denied, 1);
    }

    #[test]
    fn events_filtered_by_user() {
        let store = EventStore::default();
        store.log_access_attempt("user-1", "STUDENT", "/courses", "GET", true, "ok");
        store.log_access_attempt("user-2", "STUDENT", "/courses", "GET", true, "ok");
        store.log_access_attempt("user-1", "STUDENT", "/grades", "GET", true, "ok");

        let events = store.get_events_by_user("user-1");
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.user_id.as_deref() == Some("user-1")));
    }
}
