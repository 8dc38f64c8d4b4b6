//! Per-event-type notification templates.

use campuswatch_types::{SecurityEvent, SecurityEventType};

/// Headline for a notification about this event.
pub fn title(event: &SecurityEvent) -> String {
    match event.event_type {
        SecurityEventType::LoginAttempt => "Login attempt observed".to_string(),
        SecurityEventType::LoginSuccess => "Successful login".to_string(),
        SecurityEventType::LoginFailed => "Failed login attempt".to_string(),
        SecurityEventType::Logout => "User logged out".to_string(),
        SecurityEventType::SessionExpired => "Session expired".to_string(),
        SecurityEventType::PasswordChange => "Password changed".to_string(),
        SecurityEventType::AccessAttempt => "Access attempt".to_string(),
        SecurityEventType::AccessDenied => "Access denied".to_string(),
        SecurityEventType::RoleEscalationAttempt => "Role escalation attempt".to_string(),
        SecurityEventType::SuspiciousActivity => "Suspicious activity detected".to_string(),
        SecurityEventType::ApiAbuse => "API abuse detected".to_string(),
        SecurityEventType::ProfileUpdate => "Profile updated".to_string(),
    }
}

/// Message body: the event details plus timestamp and source, when known.
pub fn message(event: &SecurityEvent) -> String {
    let mut body = if event.details.is_empty() {
        title(event)
    } else {
        event.details.clone()
    };

    body.push_str(&format!(
        "\nAt: {}",
        event.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if let Some(email) = event.user_email.as_deref() {
        body.push_str(&format!("\nAccount: {email}"));
    }
    if let Some(ip) = event.ip_address.as_deref() {
        body.push_str(&format!("\nSource IP: {ip}"));
    }
    if let Some(path) = event.path.as_deref() {
        body.push_str(&format!("\nPath: {path}"));
    }

    body
}
