//! Security event types for Campuswatch.

mod event;
mod event_type;
mod id;
mod notification;
mod risk;
mod rule;

pub use event::{EventStatus, SecurityEvent, SecurityEventBuilder};
pub use event_type::SecurityEventType;
pub use id::{NotificationId, SecurityEventId};
pub use notification::{NotificationMetadata, NotificationType, SecurityNotification};
pub use risk::RiskLevel;
pub use rule::{NotificationRule, RuleActions, RuleConditions};
