//! Bounded side-effect dispatch.
//!
//! Rule side effects are queued on a bounded channel and executed by a small
//! worker pool, which caps concurrent outbound calls. Failed alert sends are
//! retried with exponential backoff; a full queue drops the effect with a
//! warning rather than blocking event ingestion.

use async_trait::async_trait;
use campuswatch_notify::TelegramNotifier;
use campuswatch_rules::{EffectSink, SideEffect};
use campuswatch_store::EventStore;
use campuswatch_types::SecurityNotification;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Outbound alert delivery, abstracted for testing.
#[async_trait]
pub trait AlertSender: Send + Sync {
    /// Deliver the notification. True on confirmed delivery.
    async fn send_alert(&self, notification: &SecurityNotification) -> bool;
}

#[async_trait]
impl AlertSender for TelegramNotifier {
    async fn send_alert(&self, notification: &SecurityNotification) -> bool {
        self.send_notification(
            &notification.title,
            &notification.message,
            notification.risk_level,
            Some(&notification.metadata),
        )
        .await
    }
}

/// Dispatcher tunables.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Queued effects beyond this are dropped.
    pub queue_capacity: usize,
    /// Worker tasks, which is also the cap on concurrent outbound calls.
    pub workers: usize,
    /// Delivery attempts per alert before giving up.
    pub max_attempts: u32,
    /// Backoff before the first retry; doubles per attempt.
    pub initial_backoff: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            workers: 4,
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

/// Bounded queue feeding the side-effect workers.
pub struct EffectDispatcher {
    sender: mpsc::Sender<SideEffect>,
    handles: Vec<JoinHandle<()>>,
}

impl EffectDispatcher {
    /// Spawn the worker pool. `alert_sender` handles telegram alerts; the
    /// store receives IP blocks.
    pub fn spawn(
        config: DispatcherConfig,
        alert_sender: Arc<dyn AlertSender>,
        store: Arc<EventStore>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let http = reqwest::Client::new();

        let mut handles = Vec::with_capacity(config.workers);
        for _ in 0..config.workers {
            let worker = Worker {
                receiver: receiver.clone(),
                alert_sender: alert_sender.clone(),
                store: store.clone(),
                http: http.clone(),
                max_attempts: config.max_attempts,
                initial_backoff: config.initial_backoff,
            };
            handles.push(tokio::spawn(worker.run()));
        }

        Self { sender, handles }
    }

    /// Stop the workers. Queued effects are abandoned.
    pub fn shutdown(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

impl EffectSink for EffectDispatcher {
    fn dispatch(&self, effect: SideEffect) {
        match self.sender.try_send(effect) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(effect)) => {
                warn!(?effect, "effect queue full, dropping side effect");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("effect queue closed");
            }
        }
    }
}

struct Worker {
    receiver: Arc<Mutex<mpsc::Receiver<SideEffect>>>,
    alert_sender: Arc<dyn AlertSender>,
    store: Arc<EventStore>,
    http: reqwest::Client,
    max_attempts: u32,
    initial_backoff: Duration,
}

impl Worker {
    async fn run(self) {
        loop {
            let effect = {
                let mut receiver = self.receiver.lock().await;
                receiver.recv().await
            };
            match effect {
                Some(effect) => self.execute(effect).await,
                None => break,
            }
        }
    }

    async fn execute(&self, effect: SideEffect) {
        match effect {
            SideEffect::TelegramAlert { notification } => {
                self.send_with_retry(&notification).await;
            }
            SideEffect::EmailAlert { notification } => {
                // No SMTP backend in this subsystem; the platform's mailer
                // picks these up from the log stream.
                info!(id = %notification.id, title = %notification.title, "email alert requested");
            }
            SideEffect::BlockUser { user_id, user_email } => {
                // Account blocking is enforced by the platform's user
                // service; record the request here.
                warn!(?user_id, ?user_email, "user block requested");
            }
            SideEffect::BlockIp { ip } => {
                self.store.block_ip(&ip);
            }
            SideEffect::Webhook { url, notification } => {
                let result = self.http.post(&url).json(&notification).send().await;
                match result {
                    Ok(response) if response.status().is_success() => {}
                    Ok(response) => {
                        warn!(%url, status = %response.status(), "webhook delivery rejected");
                    }
                    Err(e) => {
                        warn!(%url, error = %e, "webhook delivery failed");
                    }
                }
            }
        }
    }

    async fn send_with_retry(&self, notification: &SecurityNotification) {
        let mut backoff = self.initial_backoff;
        for attempt in 1..=self.max_attempts {
            if self.alert_sender.send_alert(notification).await {
                return;
            }
            if attempt < self.max_attempts {
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }
        warn!(
            id = %notification.id,
            attempts = self.max_attempts,
            "alert dropped after exhausting retries"
        );
    }
}
