//! Outbound alerting through an external bot-messaging API.
//!
//! Formats security notifications and delivers them to a Telegram chat.
//! Delivery is strictly best-effort: every transport or API failure is
//! logged and reported as `false`, never raised to the caller.

mod config;
mod format;
mod telegram;

pub use config::{
    ConfigError, ConfigProvider, JsonFileConfigProvider, MemoryConfigProvider, NotificationToggles,
    NotifierConfig,
};
pub use format::format_alert;
pub use telegram::{ConnectionTest, PermissionCheck, TelegramNotifier};
