//! Alerting rule engine.
//!
//! Evaluates the rule set against each incoming security event, synthesizes
//! notifications, broadcasts them to subscribers, and hands requested side
//! effects to an [`EffectSink`].

mod defaults;
mod effects;
mod engine;
mod subscribers;
mod template;

pub use defaults::default_rules;
pub use effects::{EffectSink, LoggingSink, SideEffect};
pub use engine::RuleEngine;
pub use subscribers::{SubscriberRegistry, Subscription};

// Re-export the types the engine operates on.
pub use campuswatch_types::{
    NotificationRule, NotificationType, RiskLevel, RuleActions, RuleConditions,
    SecurityEvent, SecurityNotification,
};
