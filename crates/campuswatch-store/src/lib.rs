//! Bounded in-memory security event store.
//!
//! Holds the most recent security events in a fixed-capacity ring buffer,
//! tracks failed-login counters per account, and maintains the blocked-IP
//! set. All state is volatile; nothing survives a process restart.

mod config;
mod metrics;
mod store;

pub use config::EventStoreConfig;
pub use metrics::{SecurityMetrics, WindowedMetrics};
pub use store::EventStore;
