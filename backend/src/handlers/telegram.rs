//! HTTP handler for the Telegram bot webhook

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::chatbot::IncomingMessage;
use crate::AppState;

const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

// ============================================================================
// Update Types
// ============================================================================

/// Telegram update
/// See: https://core.telegram.org/bots/api#update
#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: TelegramChat,
    pub from: Option<TelegramUser>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

impl TelegramUpdate {
    /// The text message carried by this update, if any
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let message = self.message?;
        let text = message.text?;
        let from = message.from?;
        Some(IncomingMessage {
            user_id: from.id,
            chat_id: message.chat.id,
            username: from.username,
            language_code: from.language_code,
            text,
        })
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
}

fn reject(status: StatusCode, message: &str) -> (StatusCode, Json<WebhookResponse>) {
    (
        status,
        Json(WebhookResponse {
            success: false,
            message: message.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Handle Telegram webhook updates
/// POST /webhook/telegram
///
/// Once the body is accepted the answer is always 200, otherwise Telegram
/// keeps redelivering the same update.
pub async fn handle_telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, (StatusCode, Json<WebhookResponse>)> {
    if !secret_matches(state.config.telegram.webhook_secret.as_deref(), &headers) {
        tracing::warn!("Telegram webhook secret token mismatch");
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid secret token"));
    }

    let update: TelegramUpdate = match serde_json::from_slice(&body) {
        Ok(u) => u,
        Err(e) => {
            tracing::error!("Failed to parse Telegram update: {}", e);
            return Err(reject(StatusCode::BAD_REQUEST, "Invalid request body"));
        }
    };

    let update_id = update.update_id;
    let Some(incoming) = update.into_incoming() else {
        tracing::debug!(update_id, "Ignoring update without text message");
        return Ok(Json(WebhookResponse {
            success: true,
            message: "Ignored".to_string(),
        }));
    };

    let reply = state.chatbot.handle_message(&incoming).await;

    if let Err(e) = state.transport.send_text(incoming.chat_id, &reply).await {
        tracing::error!(update_id, chat_id = incoming.chat_id, "Failed to send reply: {}", e);
        // Still 200 so the update is not redelivered
        return Ok(Json(WebhookResponse {
            success: false,
            message: format!("Reply failed: {}", e),
        }));
    }

    Ok(Json(WebhookResponse {
        success: true,
        message: "Update processed".to_string(),
    }))
}

/// Compare the secret header when a secret is configured
fn secret_matches(expected: Option<&str>, headers: &HeaderMap) -> bool {
    let Some(expected) = expected.filter(|s| !s.is_empty()) else {
        return true;
    };
    headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|given| given == expected)
}
