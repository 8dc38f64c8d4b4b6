//! Security event type enumeration.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Categories of security events observed by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SecurityEventType {
    // Authentication
    LoginAttempt,
    LoginSuccess,
    LoginFailed,
    Logout,
    SessionExpired,
    PasswordChange,

    // Authorization
    AccessAttempt,
    AccessDenied,
    RoleEscalationAttempt,

    // Abuse
    SuspiciousActivity,
    ApiAbuse,

    // Account
    ProfileUpdate,
}

impl SecurityEventType {
    /// Check if this is an authentication outcome.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::LoginAttempt
                | Self::LoginSuccess
                | Self::LoginFailed
                | Self::Logout
                | Self::SessionExpired
                | Self::PasswordChange
        )
    }

    /// Check if this event type signals abuse.
    pub fn is_abuse(&self) -> bool {
        matches!(self, Self::SuspiciousActivity | Self::ApiAbuse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&SecurityEventType::LoginFailed).unwrap();
        assert_eq!(json, "\"login_failed\"");
    }

    #[test]
    fn parses_from_string() {
        let parsed = SecurityEventType::from_str("suspicious_activity").unwrap();
        assert_eq!(parsed, SecurityEventType::SuspiciousActivity);
    }
}
