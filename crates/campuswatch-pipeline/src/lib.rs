//! Event pipeline wiring.
//!
//! Connects the event store, the rule engine and the outbound notifier into
//! one explicitly constructed pipeline: ingestion runs synchronously through
//! store and rules, while rule side effects flow through a bounded queue and
//! a small worker pool.

mod dispatcher;
mod maintenance;
mod monitor;

pub use dispatcher::{AlertSender, DispatcherConfig, EffectDispatcher};
pub use maintenance::{spawn_maintenance, MaintenanceConfig};
pub use monitor::SecurityMonitor;

pub use campuswatch_notify::TelegramNotifier;
pub use campuswatch_rules::{RuleEngine, SideEffect};
pub use campuswatch_store::EventStore;
