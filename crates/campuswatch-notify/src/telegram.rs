//! Telegram bot API client.

use crate::{format_alert, ConfigProvider, NotifierConfig};
use campuswatch_types::{NotificationMetadata, RiskLevel};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Result of a connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTest {
    /// Whether the credentials worked end to end.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}

/// Result of a bot permission probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
    /// Whether the probe itself completed.
    pub success: bool,
    /// Whether the bot may send messages in the chat, when determinable.
    pub can_send_messages: Option<bool>,
    /// The bot's membership status in the chat.
    pub status: Option<String>,
    /// Human-readable outcome.
    pub message: String,
}

impl PermissionCheck {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            can_send_messages: None,
            status: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BotInfo {
    id: i64,
    #[allow(dead_code)]
    is_bot: bool,
    first_name: String,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatInfo {
    #[allow(dead_code)]
    id: i64,
    #[serde(rename = "type")]
    #[allow(dead_code)]
    chat_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatMember {
    status: String,
    can_send_messages: Option<bool>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Serialize)]
struct GetChatRequest<'a> {
    chat_id: &'a str,
}

#[derive(Debug, Serialize)]
struct GetChatMemberRequest<'a> {
    chat_id: &'a str,
    user_id: i64,
}

/// Outbound notifier speaking the Telegram bot API.
///
/// Configuration is re-read from the injected provider on every call, so
/// updates take effect immediately. No method here ever returns an error to
/// the caller; failed deliveries degrade to `false` and a log line.
pub struct TelegramNotifier {
    provider: Arc<dyn ConfigProvider>,
    client: Client,
    api_base: String,
}

impl TelegramNotifier {
    /// Create a notifier reading configuration from `provider`.
    pub fn new(provider: Arc<dyn ConfigProvider>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            provider,
            client,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (for tests against a local server).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Send an alert. Returns true only on a confirmed-ok API response (or
    /// in test mode, where the formatted text is only logged).
    pub async fn send_notification(
        &self,
        title: &str,
        message: &str,
        risk: RiskLevel,
        metadata: Option<&NotificationMetadata>,
    ) -> bool {
        let config = match self.load_config() {
            Some(config) => config,
            None => return false,
        };

        if !config.is_enabled {
            debug!("outbound notifier disabled, dropping alert");
            return false;
        }
        if !config.has_credentials() {
            debug!("outbound notifier has no credentials, dropping alert");
            return false;
        }
        if !config.notification_types.allows(risk) {
            debug!(risk = risk.label(), "risk level toggled off, dropping alert");
            return false;
        }

        let text = format_alert(title, message, risk, metadata);

        if config.test_mode {
            info!(%text, "test mode: alert formatted but not sent");
            return true;
        }

        let request = SendMessageRequest {
            chat_id: &config.chat_id,
            text: &text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };
        match self
            .call::<serde_json::Value, _>(&config.bot_token, "sendMessage", &request)
            .await
        {
            Ok(_) => true,
            Err(reason) => {
                warn!(%reason, "failed to deliver outbound alert");
                false
            }
        }
    }

    /// Validate credentials and send one low-risk test alert.
    pub async fn test_connection(&self) -> ConnectionTest {
        let config = match self.load_config() {
            Some(config) => config,
            None => {
                return ConnectionTest {
                    success: false,
                    message: "configuration unavailable".to_string(),
                }
            }
        };
        if !config.has_credentials() {
            return ConnectionTest {
                success: false,
                message: "bot token or chat id not configured".to_string(),
            };
        }

        let bot = match self.get_me(&config.bot_token).await {
            Ok(bot) => bot,
            Err(reason) => {
                return ConnectionTest {
                    success: false,
                    message: format!("credential check failed: {reason}"),
                }
            }
        };

        let delivered = self
            .send_notification(
                "Campuswatch connection test",
                "Outbound alerting is configured correctly.",
                RiskLevel::Low,
                None,
            )
            .await;

        if delivered {
            ConnectionTest {
                success: true,
                message: format!(
                    "connected as {}",
                    bot.username.unwrap_or(bot.first_name)
                ),
            }
        } else {
            ConnectionTest {
                success: false,
                message: "credentials valid but test alert was not delivered".to_string(),
            }
        }
    }

    /// Whether this token is accepted by the bot API.
    pub async fn validate_bot_token(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        self.get_me(token).await.is_ok()
    }

    /// Whether the configured bot can see this chat.
    pub async fn validate_chat_id(&self, chat_id: &str) -> bool {
        let config = match self.load_config() {
            Some(config) => config,
            None => return false,
        };
        if config.bot_token.is_empty() || chat_id.is_empty() {
            return false;
        }
        self.call::<ChatInfo, _>(&config.bot_token, "getChat", &GetChatRequest { chat_id })
            .await
            .is_ok()
    }

    /// Probe the bot's membership and send permission in the configured chat.
    pub async fn check_bot_permissions(&self) -> PermissionCheck {
        let config = match self.load_config() {
            Some(config) => config,
            None => return PermissionCheck::failure("configuration unavailable"),
        };
        if !config.has_credentials() {
            return PermissionCheck::failure("bot token or chat id not configured");
        }

        let bot = match self.get_me(&config.bot_token).await {
            Ok(bot) => bot,
            Err(reason) => {
                return PermissionCheck::failure(format!("credential check failed: {reason}"))
            }
        };

        if let Err(reason) = self
            .call::<ChatInfo, _>(
                &config.bot_token,
                "getChat",
                &GetChatRequest {
                    chat_id: &config.chat_id,
                },
            )
            .await
        {
            return PermissionCheck::failure(format!("chat lookup failed: {reason}"));
        }

        let member = match self
            .call::<ChatMember, _>(
                &config.bot_token,
                "getChatMember",
                &GetChatMemberRequest {
                    chat_id: &config.chat_id,
                    user_id: bot.id,
                },
            )
            .await
        {
            Ok(member) => member,
            Err(reason) => {
                return PermissionCheck::failure(format!("membership lookup failed: {reason}"))
            }
        };

        // Unless the membership record says otherwise, admins and regular
        // members may send messages.
        let can_send = member
            .can_send_messages
            .unwrap_or(matches!(member.status.as_str(), "creator" | "administrator" | "member"));

        PermissionCheck {
            success: true,
            can_send_messages: Some(can_send),
            status: Some(member.status),
            message: if can_send {
                "bot can send messages in the configured chat".to_string()
            } else {
                "bot cannot send messages in the configured chat".to_string()
            },
        }
    }

    fn load_config(&self) -> Option<NotifierConfig> {
        match self.provider.load() {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(error = %e, "failed to load notifier configuration");
                None
            }
        }
    }

    async fn get_me(&self, token: &str) -> Result<BotInfo, String> {
        let url = format!("{}/bot{}/getMe", self.api_base, token);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Self::decode(response).await
    }

    async fn call<T, B>(&self, token: &str, method: &str, body: &B) -> Result<T, String>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let url = format!("{}/bot{}/{}", self.api_base, token, method);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, String> {
        let api: ApiResponse<T> = response.json().await.map_err(|e| e.to_string())?;
        if !api.ok {
            return Err(api
                .description
                .unwrap_or_else(|| "API returned ok=false".to_string()));
        }
        api.result.ok_or_else(|| "API response had no result".to_string())
    }
}
