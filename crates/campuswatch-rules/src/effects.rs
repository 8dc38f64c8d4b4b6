//! Side effects requested by matching rules.

use campuswatch_types::SecurityNotification;
use tracing::info;

/// A side effect produced by a fired rule.
///
/// The engine does not execute effects itself; it hands them to an
/// [`EffectSink`] and moves on. Whatever the sink does (queueing, outbound
/// calls, blocking) is invisible to event processing.
#[derive(Debug, Clone)]
pub enum SideEffect {
    /// Send the notification through the outbound bot channel.
    TelegramAlert { notification: SecurityNotification },
    /// Send the notification by email.
    EmailAlert { notification: SecurityNotification },
    /// Block the affected account.
    BlockUser {
        user_id: Option<String>,
        user_email: Option<String>,
    },
    /// Block the source IP.
    BlockIp { ip: String },
    /// POST the notification to a webhook.
    Webhook {
        url: String,
        notification: SecurityNotification,
    },
}

/// Receiver for rule side effects.
///
/// `dispatch` must not block: implementations enqueue or drop.
pub trait EffectSink: Send + Sync {
    /// Accept an effect for eventual execution.
    fn dispatch(&self, effect: SideEffect);
}

/// Sink that only logs effects. Used when no outbound wiring is configured.
#[derive(Debug, Default)]
pub struct LoggingSink;

impl EffectSink for LoggingSink {
    fn dispatch(&self, effect: SideEffect) {
        match effect {
            SideEffect::TelegramAlert { notification } => {
                info!(id = %notification.id, "telegram alert requested (no sink configured)");
            }
            SideEffect::EmailAlert { notification } => {
                info!(id = %notification.id, "email alert requested (no sink configured)");
            }
            SideEffect::BlockUser { user_id, user_email } => {
                info!(?user_id, ?user_email, "user block requested (no sink configured)");
            }
            SideEffect::BlockIp { ip } => {
                info!(%ip, "IP block requested (no sink configured)");
            }
            SideEffect::Webhook { url, .. } => {
                info!(%url, "webhook delivery requested (no sink configured)");
            }
        }
    }
}
