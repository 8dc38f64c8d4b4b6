//! Alert message formatting.

use campuswatch_types::{NotificationMetadata, RiskLevel};
use chrono::Utc;

fn risk_emoji(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Critical => "🚨",
        RiskLevel::High => "❗",
        RiskLevel::Medium => "⚠️",
        RiskLevel::Low => "ℹ️",
    }
}

/// Escape the characters Telegram's HTML parse mode treats specially.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render the outbound alert text (HTML parse mode).
pub fn format_alert(
    title: &str,
    message: &str,
    risk: RiskLevel,
    metadata: Option<&NotificationMetadata>,
) -> String {
    let mut text = format!(
        "{} <b>{}</b>\n\n{}\n\nRisk: {}\nTime: {}",
        risk_emoji(risk),
        escape_html(title),
        escape_html(message),
        risk.label(),
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
    );

    if let Some(metadata) = metadata {
        if let Some(event_type) = metadata.event_type {
            text.push_str(&format!("\nEvent: {event_type}"));
        }
        if let Some(ip) = metadata.ip_address.as_deref() {
            text.push_str(&format!("\nIP: {}", escape_html(ip)));
        }
        if let Some(agent) = metadata.user_agent.as_deref() {
            text.push_str(&format!("\nAgent: {}", escape_html(agent)));
        }
        if let Some(rule) = metadata.rule_name.as_deref() {
            text.push_str(&format!("\nRule: {}", escape_html(rule)));
        }
    }

    text
}
