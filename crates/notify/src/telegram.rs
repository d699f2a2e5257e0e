use serde::{Deserialize, Serialize};
use thiserror::Error;

use khata_core::TelegramConfig;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("telegram rejected the message: {0}")]
    Rejected(String),
}

/// Thin Bot API client. One bot, one chat, text messages only.
pub struct TelegramNotifier {
    client: reqwest::Client,
    token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Bot API envelope; errors come back as `ok: false` with a description,
/// regardless of HTTP status.
#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        TelegramNotifier {
            client: reqwest::Client::new(),
            token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }

    pub async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!("{API_BASE}/bot{}/sendMessage", self.token);
        let response = self
            .client
            .post(&url)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await?;

        let body: ApiResponse = response.json().await?;
        if !body.ok {
            return Err(NotifyError::Rejected(
                body.description
                    .unwrap_or_else(|| "no description".to_string()),
            ));
        }
        tracing::info!(chat_id = %self.chat_id, "sent telegram notification");
        Ok(())
    }
}
