//! Telegram Bot API client

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{MessageTransport, SendError};

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    http_client: reqwest::Client,
    api_base_url: String,
    bot_token: String,
    default_retry_after: Duration,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// Envelope returned by every Bot API method
#[derive(Debug, Default, Deserialize)]
struct TelegramApiResponse {
    #[serde(default)]
    ok: bool,
    error_code: Option<u16>,
    description: Option<String>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

impl TelegramClient {
    pub fn new(api_base_url: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            default_retry_after: Duration::from_secs(40),
        }
    }

    /// Wait used when a 429 carries no `retry_after`
    pub fn with_default_retry_after(mut self, wait: Duration) -> Self {
        self.default_retry_after = wait;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, self.bot_token, method)
    }

    /// Map an unsuccessful Bot API answer onto a send error
    fn classify(&self, status: u16, response: &TelegramApiResponse) -> SendError {
        let code = response.error_code.unwrap_or(status);
        let description = response
            .description
            .clone()
            .unwrap_or_else(|| format!("HTTP {}", status));

        match code {
            429 => SendError::RateLimited {
                retry_after: response
                    .parameters
                    .as_ref()
                    .and_then(|p| p.retry_after)
                    .map(Duration::from_secs)
                    .unwrap_or(self.default_retry_after),
            },
            403 => SendError::Blocked(description),
            c if c >= 500 => SendError::Transient(description),
            _ => SendError::Rejected(description),
        }
    }
}

#[async_trait]
impl MessageTransport for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            disable_web_page_preview: true,
        };

        let response = self
            .http_client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await
            .map_err(|e| SendError::Transient(format!("Failed to reach Telegram: {}", e)))?;

        let status = response.status().as_u16();
        let body: TelegramApiResponse = response.json().await.unwrap_or_default();

        if (200..300).contains(&status) && body.ok {
            return Ok(());
        }
        Err(self.classify(status, &body))
    }
}
