//! End-to-end pipeline tests: store → rules → dispatcher.

use async_trait::async_trait;
use campuswatch_pipeline::{
    AlertSender, DispatcherConfig, EffectDispatcher, SecurityMonitor,
};
use campuswatch_rules::RuleEngine;
use campuswatch_store::EventStore;
use campuswatch_types::{
    NotificationType, RiskLevel, SecurityEventType, SecurityNotification,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Sender that records every delivered alert.
#[derive(Default)]
struct RecordingSender {
    delivered: Mutex<Vec<String>>,
    notify: tokio::sync::Notify,
}

#[async_trait]
impl AlertSender for RecordingSender {
    async fn send_alert(&self, notification: &SecurityNotification) -> bool {
        self.delivered.lock().await.push(notification.title.clone());
        self.notify.notify_one();
        true
    }
}

fn wire() -> (SecurityMonitor, Arc<RecordingSender>, Arc<EffectDispatcher>) {
    let store = Arc::new(EventStore::default());
    let sender = Arc::new(RecordingSender::default());
    let dispatcher = Arc::new(EffectDispatcher::spawn(
        DispatcherConfig {
            initial_backoff: Duration::from_millis(1),
            ..Default::default()
        },
        sender.clone(),
        store.clone(),
    ));
    let engine = Arc::new(RuleEngine::new(dispatcher.clone()));
    (SecurityMonitor::new(store, engine), sender, dispatcher)
}

#[tokio::test]
async fn three_failures_produce_an_alert_notification() {
    // Scenario A.
    let (monitor, _sender, dispatcher) = wire();

    monitor.report_login_attempt("u@x.com", false, "bad password", Some("1.2.3.4"));
    monitor.report_login_attempt("u@x.com", false, "bad password", Some("1.2.3.4"));
    let notifications =
        monitor.report_login_attempt("u@x.com", false, "bad password", Some("1.2.3.4"));

    assert!(!monitor.store().is_login_blocked("u@x.com"));

    // The third failure synthesizes a high-risk suspicious-activity event,
    // which the high-risk-suspicious rule turns into an alert.
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].notification_type, NotificationType::Alert);
    assert_eq!(
        notifications[0].metadata.event_type,
        Some(SecurityEventType::SuspiciousActivity)
    );

    let suspicious = monitor
        .store()
        .get_events_by_type(SecurityEventType::SuspiciousActivity);
    assert_eq!(suspicious.len(), 1);
    assert_eq!(suspicious[0].risk_level, RiskLevel::High);
    dispatcher.shutdown();
}

#[tokio::test]
async fn six_failures_fire_the_brute_force_rule_on_the_primary_event() {
    let (monitor, _sender, dispatcher) = wire();

    for _ in 0..5 {
        monitor.report_login_attempt("u@x.com", false, "bad password", None);
    }
    assert!(monitor.store().is_login_blocked("u@x.com"));

    // Prior failures = 5, so the sixth primary event carries High risk and
    // matches the brute-force rule; its synthesized suspicious event matches
    // the high-risk-suspicious rule as well.
    let notifications = monitor.report_login_attempt("u@x.com", false, "bad password", None);
    let rule_ids: Vec<_> = notifications
        .iter()
        .filter_map(|n| n.metadata.rule_id.as_deref())
        .collect();
    assert!(rule_ids.contains(&"multiple-failed-logins"));
    assert!(rule_ids.contains(&"high-risk-suspicious-activity"));
    dispatcher.shutdown();
}

#[tokio::test]
async fn telegram_alerts_flow_through_the_dispatcher() {
    let (monitor, sender, dispatcher) = wire();

    for _ in 0..3 {
        monitor.report_login_attempt("u@x.com", false, "bad password", Some("1.2.3.4"));
    }

    tokio::time::timeout(Duration::from_secs(1), sender.notify.notified())
        .await
        .expect("alert should be delivered");
    let delivered = sender.delivered.lock().await;
    assert!(delivered
        .iter()
        .any(|title| title == "Suspicious activity detected"));
    dispatcher.shutdown();
}

#[tokio::test]
async fn rule_requested_ip_block_is_applied_by_the_worker() {
    let (monitor, _sender, dispatcher) = wire();

    for _ in 0..3 {
        monitor.report_login_attempt("u@x.com", false, "bad password", Some("9.9.9.9"));
    }

    // The high-risk-suspicious rule requests a block of the source IP.
    tokio::time::timeout(Duration::from_secs(1), async {
        while !monitor.store().is_ip_blocked("9.9.9.9") {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("worker should apply the IP block");
    dispatcher.shutdown();
}

#[tokio::test]
async fn subscribers_observe_pipeline_notifications() {
    let (monitor, _sender, dispatcher) = wire();

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let _token = monitor.engine().subscribe({
        let seen = seen.clone();
        move |n: &SecurityNotification| seen.lock().unwrap().push(n.id)
    });

    let notifications = monitor.report_suspicious_activity(
        "user-1",
        "u@x.com",
        "STUDENT",
        "scripted grade scraping",
        RiskLevel::High,
    );
    assert_eq!(notifications.len(), 1);
    assert_eq!(*seen.lock().unwrap(), vec![notifications[0].id]);
    dispatcher.shutdown();
}

#[tokio::test]
async fn denied_admin_access_creates_warning_and_suspicious_followup() {
    let (monitor, _sender, dispatcher) = wire();

    let notifications = monitor.report_access_attempt(
        "user-7",
        "STUDENT",
        "/admin/users",
        "GET",
        false,
        "missing permission",
    );

    // The denial matches the admin-area rule; the synthesized Medium-risk
    // suspicious event matches nothing in the default set.
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].notification_type, NotificationType::Warning);
    assert_eq!(
        notifications[0].metadata.rule_id.as_deref(),
        Some("admin-area-denied")
    );
    assert_eq!(monitor.store().len(), 2);
    dispatcher.shutdown();
}
