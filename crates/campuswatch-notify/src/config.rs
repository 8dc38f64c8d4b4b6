//! Notifier configuration and its provider seam.

use campuswatch_types::RiskLevel;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Per-risk-level delivery toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationToggles {
    /// Deliver critical-risk alerts.
    pub critical: bool,
    /// Deliver high-risk alerts.
    pub high: bool,
    /// Deliver medium-risk alerts.
    pub medium: bool,
    /// Deliver low-risk alerts.
    pub low: bool,
}

impl NotificationToggles {
    /// Whether alerts at this risk level should be delivered.
    pub fn allows(&self, risk: RiskLevel) -> bool {
        match risk {
            RiskLevel::Critical => self.critical,
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }
}

impl Default for NotificationToggles {
    fn default() -> Self {
        Self {
            critical: true,
            high: true,
            medium: true,
            low: true,
        }
    }
}

/// Outbound notifier configuration.
///
/// Serialized in the camelCase shape the platform's settings store uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifierConfig {
    /// Bot API credential.
    pub bot_token: String,
    /// Destination chat identifier.
    pub chat_id: String,
    /// Master enable switch.
    pub is_enabled: bool,
    /// Per-risk-level toggles.
    pub notification_types: NotificationToggles,
    /// Dry-run mode: log the formatted alert instead of sending it.
    pub test_mode: bool,
}

impl NotifierConfig {
    /// Whether both credentials are present.
    pub fn has_credentials(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

/// Errors from configuration providers.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure reading or writing the backing store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Source of notifier configuration, injected for testability.
///
/// `load` is called on every delivery attempt so configuration updates take
/// effect without restarting anything.
pub trait ConfigProvider: Send + Sync {
    /// Read the current configuration.
    fn load(&self) -> Result<NotifierConfig, ConfigError>;

    /// Persist an updated configuration.
    fn store(&self, config: &NotifierConfig) -> Result<(), ConfigError>;
}

/// In-memory provider for tests and embedded wiring.
#[derive(Default)]
pub struct MemoryConfigProvider {
    config: RwLock<NotifierConfig>,
}

impl MemoryConfigProvider {
    /// Create a provider holding the given configuration.
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn load(&self) -> Result<NotifierConfig, ConfigError> {
        Ok(self.config.read().clone())
    }

    fn store(&self, config: &NotifierConfig) -> Result<(), ConfigError> {
        *self.config.write() = config.clone();
        Ok(())
    }
}

/// Provider backed by a JSON file.
pub struct JsonFileConfigProvider {
    path: PathBuf,
}

impl JsonFileConfigProvider {
    /// Create a provider reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigProvider for JsonFileConfigProvider {
    fn load(&self) -> Result<NotifierConfig, ConfigError> {
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn store(&self, config: &NotifierConfig) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_gate_by_risk() {
        let toggles = NotificationToggles {
            medium: false,
            ..Default::default()
        };
        assert!(toggles.allows(RiskLevel::Critical));
        assert!(toggles.allows(RiskLevel::High));
        assert!(!toggles.allows(RiskLevel::Medium));
        assert!(toggles.allows(RiskLevel::Low));
    }

    #[test]
    fn config_serializes_camel_case() {
        let config = NotifierConfig {
            bot_token: "123:abc".to_string(),
            chat_id: "-10042".to_string(),
            is_enabled: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["botToken"], "123:abc");
        assert_eq!(json["chatId"], "-10042");
        assert_eq!(json["isEnabled"], true);
        assert_eq!(json["notificationTypes"]["critical"], true);
        assert_eq!(json["testMode"], false);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: NotifierConfig = serde_json::from_str(r#"{"botToken":"t"}"#).unwrap();
        assert_eq!(config.bot_token, "t");
        assert!(!config.is_enabled);
        assert!(config.notification_types.allows(RiskLevel::Low));
    }

    #[test]
    fn json_file_provider_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifier.json");
        let provider = JsonFileConfigProvider::new(&path);

        let config = NotifierConfig {
            bot_token: "123:abc".to_string(),
            chat_id: "7".to_string(),
            is_enabled: true,
            test_mode: true,
            ..Default::default()
        };
        provider.store(&config).unwrap();
        assert_eq!(provider.load().unwrap(), config);
    }

    #[test]
    fn memory_provider_reflects_updates() {
        let provider = MemoryConfigProvider::default();
        assert!(!provider.load().unwrap().is_enabled);

        let mut updated = provider.load().unwrap();
        updated.is_enabled = true;
        provider.store(&updated).unwrap();
        assert!(provider.load().unwrap().is_enabled);
    }
}
