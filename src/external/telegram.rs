use crate::config::TelegramConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SendMessageBody<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct BotApiResponse {
    pub ok: bool,
    pub description: Option<String>,
}

/// Incoming webhook payload from the Bot API. Only the fields the relay
/// cares about; everything else is ignored on deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub from: Option<ChatUser>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatUser {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Clone)]
pub struct TelegramService {
    client: Client,
    config: TelegramConfig,
}

impl TelegramService {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Best-effort delivery of a text message to a chat. Callers decide
    /// whether a failure rolls anything back; this method only reports it.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> AppResult<()> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base_url, self.config.bot_token
        );

        let response = self
            .client
            .post(&url)
            .json(&SendMessageBody { chat_id, text })
            .send()
            .await?;

        if response.status().is_success() {
            // The Bot API reports some failures inside a 200 body.
            let body: BotApiResponse = response.json().await?;
            if !body.ok {
                let description = body.description.unwrap_or_else(|| "Unknown error".to_string());
                log::error!("Message delivery to chat {chat_id} rejected: {description}");
                return Err(AppError::ExternalApiError(format!(
                    "Message delivery rejected: {description}"
                )));
            }
            log::info!("Message delivered to chat {chat_id}");
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Message delivery to chat {chat_id} failed: {error_text}");
            Err(AppError::ExternalApiError(format!(
                "Message delivery failed: {error_text}"
            )))
        }
    }

    pub async fn send_pairing_code(&self, chat_id: i64, code: &str) -> AppResult<()> {
        let text = format!(
            "Your pairing code is: {code}\nEnter it in the companion app within 5 minutes."
        );
        self.send_message(chat_id, &text).await
    }
}
