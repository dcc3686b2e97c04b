//! Telegram chat bot
//!
//! Supports:
//! - `/start` registration with display name collection
//! - `/lang [hu|en|ru]`, `/pause [24|48|72|96]`, `/resume`
//! - `/stop`, which deletes the user after a second confirmation
//! - free text forecast queries: "Szeged holnap", "Pécs today", "Győr"

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{
    normalize_pause_hours, parse_forecast_query, pause_end, validate_display_name, Language,
    Recipient, RecipientUpdate, TargetDay,
};

use crate::error::AppResult;
use crate::external::AiWriterClient;
use crate::services::forecast::ForecastService;
use crate::services::i18n::{self, message, MessageKey};
use crate::services::notifier::OperatorNotifier;
use crate::services::places::PlaceDirectory;
use crate::services::recipients::RecipientDirectory;
use crate::services::writer::{build_ai_prompt, render_city_message};

/// A text message received from a chat user
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub user_id: i64,
    pub chat_id: i64,
    pub username: Option<String>,
    /// Language reported by the chat client, e.g. `"en-GB"`
    pub language_code: Option<String>,
    pub text: String,
}

impl IncomingMessage {
    fn update(&self, display_name: Option<String>) -> RecipientUpdate {
        RecipientUpdate {
            chat_id: self.chat_id,
            username: self.username.clone(),
            display_name,
            interface_language: self.language_code.clone(),
        }
    }
}

/// Parsed user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Lang(Option<String>),
    Pause(Option<i64>),
    Resume,
    Stop,
    Forecast { place: String, day: TargetDay },
    /// Anything else, including unknown commands
    Unknown,
}

/// Conversation step a user is in between two messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingStep {
    AwaitingName,
    StopRequested,
}

/// Parse a text message into a command
pub fn parse_command(text: &str) -> BotCommand {
    let text = text.trim();
    if !text.starts_with('/') {
        return match parse_forecast_query(text) {
            Some((place, day)) => BotCommand::Forecast { place, day },
            None => BotCommand::Unknown,
        };
    }

    let mut parts = text.split_whitespace();
    // "/pause@ForeAIcastBot 48" addresses the bot explicitly in groups
    let command = parts
        .next()
        .and_then(|c| c.split('@').next())
        .unwrap_or_default()
        .to_lowercase();
    let arg = parts.next().map(str::to_string);

    match command.as_str() {
        "/start" => BotCommand::Start,
        "/lang" => BotCommand::Lang(arg),
        "/pause" => BotCommand::Pause(arg.and_then(|a| a.parse().ok())),
        "/resume" => BotCommand::Resume,
        "/stop" => BotCommand::Stop,
        _ => BotCommand::Unknown,
    }
}

fn format_until(until: DateTime<Utc>) -> String {
    until.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Chat bot service
#[derive(Clone)]
pub struct ChatbotService {
    recipients: Arc<dyn RecipientDirectory>,
    places: Arc<dyn PlaceDirectory>,
    forecasts: ForecastService,
    ai_writer: Option<AiWriterClient>,
    notifier: OperatorNotifier,
    default_country: String,
    pending: Arc<Mutex<HashMap<i64, PendingStep>>>,
}

impl ChatbotService {
    pub fn new(
        recipients: Arc<dyn RecipientDirectory>,
        places: Arc<dyn PlaceDirectory>,
        forecasts: ForecastService,
        ai_writer: Option<AiWriterClient>,
        notifier: OperatorNotifier,
        default_country: impl Into<String>,
    ) -> Self {
        Self {
            recipients,
            places,
            forecasts,
            ai_writer,
            notifier,
            default_country: default_country.into(),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Handle one message and return the reply text.
    ///
    /// Failures never reach the user in detail: they get a generic reply
    /// while the error goes to the operator channel.
    pub async fn handle_message(&self, incoming: &IncomingMessage) -> String {
        match self.try_handle(incoming).await {
            Ok(reply) => reply,
            Err(e) => {
                self.notifier
                    .notify_error(&format!("Bot üzenet: {:?}", incoming.text), &e)
                    .await;
                let lang = Language::normalize(incoming.language_code.as_deref());
                message(lang, MessageKey::ErrorGeneric).to_string()
            }
        }
    }

    async fn try_handle(&self, incoming: &IncomingMessage) -> AppResult<String> {
        let command = parse_command(&incoming.text);
        let pending = self.take_pending(incoming.user_id);
        let recipient = self.recipients.get(incoming.user_id).await?;
        let lang = recipient
            .as_ref()
            .and_then(|r| r.preferred_language)
            .unwrap_or_else(|| Language::normalize(incoming.language_code.as_deref()));

        if pending == Some(PendingStep::AwaitingName) && !incoming.text.trim_start().starts_with('/') {
            return self.save_name(incoming).await;
        }

        match command {
            BotCommand::Start => self.start(incoming, recipient.as_ref(), lang).await,
            BotCommand::Lang(arg) => self.change_language(incoming, recipient.as_ref(), arg, lang).await,
            BotCommand::Pause(hours) => Ok(self.pause(incoming, hours, lang).await),
            BotCommand::Resume => Ok(self.resume(incoming, lang).await),
            BotCommand::Stop => self.stop(incoming, pending, lang).await,
            BotCommand::Forecast { place, day } => {
                self.forecast(incoming, recipient.as_ref(), &place, day).await
            }
            BotCommand::Unknown => Ok(message(lang, MessageKey::Usage).to_string()),
        }
    }

    fn take_pending(&self, user_id: i64) -> Option<PendingStep> {
        self.pending
            .lock()
            .map(|mut pending| pending.remove(&user_id))
            .unwrap_or_default()
    }

    fn set_pending(&self, user_id: i64, step: PendingStep) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.insert(user_id, step);
        }
    }

    async fn start(
        &self,
        incoming: &IncomingMessage,
        recipient: Option<&Recipient>,
        lang: Language,
    ) -> AppResult<String> {
        if let Some(name) = recipient.and_then(|r| r.display_name.as_deref()) {
            return Ok(i18n::welcome_back(lang, name));
        }

        self.recipients
            .upsert(incoming.user_id, incoming.update(None))
            .await?;
        self.set_pending(incoming.user_id, PendingStep::AwaitingName);
        tracing::info!(user_id = incoming.user_id, "New user registered, awaiting name");
        Ok(i18n::WELCOME.to_string())
    }

    async fn save_name(&self, incoming: &IncomingMessage) -> AppResult<String> {
        match validate_display_name(&incoming.text) {
            Ok(name) => {
                self.recipients
                    .upsert(incoming.user_id, incoming.update(Some(name.clone())))
                    .await?;
                Ok(i18n::name_saved(&name))
            }
            Err(_) => {
                self.set_pending(incoming.user_id, PendingStep::AwaitingName);
                Ok(i18n::ASK_NAME_AGAIN.to_string())
            }
        }
    }

    async fn change_language(
        &self,
        incoming: &IncomingMessage,
        recipient: Option<&Recipient>,
        arg: Option<String>,
        lang: Language,
    ) -> AppResult<String> {
        let Some(arg) = arg else {
            let current = recipient
                .and_then(|r| r.preferred_language)
                .unwrap_or(lang);
            return Ok(i18n::current_language(lang, current));
        };

        let Some(chosen) = Language::from_code(&arg) else {
            return Ok(message(lang, MessageKey::LangInvalid).to_string());
        };

        self.recipients
            .upsert(incoming.user_id, incoming.update(None))
            .await?;
        self.recipients
            .set_preferred_language(incoming.user_id, chosen)
            .await?;
        Ok(i18n::lang_set(chosen))
    }

    async fn pause(&self, incoming: &IncomingMessage, requested: Option<i64>, lang: Language) -> String {
        let hours = normalize_pause_hours(requested);
        let until = pause_end(Utc::now(), hours);

        match self.store_pause(incoming, until).await {
            Ok(()) => i18n::pause_set(lang, hours, &format_until(until)),
            Err(e) => {
                tracing::error!(user_id = incoming.user_id, "Failed to set pause: {}", e);
                message(lang, MessageKey::PauseFail).to_string()
            }
        }
    }

    async fn store_pause(&self, incoming: &IncomingMessage, until: DateTime<Utc>) -> AppResult<()> {
        self.recipients
            .upsert(incoming.user_id, incoming.update(None))
            .await?;
        self.recipients.set_pause(incoming.user_id, until).await
    }

    async fn resume(&self, incoming: &IncomingMessage, lang: Language) -> String {
        match self.recipients.clear_pause(incoming.user_id).await {
            Ok(()) => message(lang, MessageKey::ResumeOk).to_string(),
            Err(e) => {
                tracing::error!(user_id = incoming.user_id, "Failed to clear pause: {}", e);
                message(lang, MessageKey::ResumeFail).to_string()
            }
        }
    }

    async fn stop(
        &self,
        incoming: &IncomingMessage,
        pending: Option<PendingStep>,
        lang: Language,
    ) -> AppResult<String> {
        if pending == Some(PendingStep::StopRequested) {
            self.recipients.delete(incoming.user_id).await?;
            tracing::info!(user_id = incoming.user_id, "User deleted on request");
            return Ok(message(lang, MessageKey::StopDone).to_string());
        }

        self.set_pending(incoming.user_id, PendingStep::StopRequested);
        Ok(message(lang, MessageKey::StopConfirm).to_string())
    }

    async fn forecast(
        &self,
        incoming: &IncomingMessage,
        recipient: Option<&Recipient>,
        query: &str,
        day: TargetDay,
    ) -> AppResult<String> {
        self.recipients
            .upsert(incoming.user_id, incoming.update(None))
            .await?;

        let preferred = recipient.and_then(|r| r.preferred_language);
        let Some(place) = self.places.resolve(query, &self.default_country).await? else {
            let lang = i18n::decide_language(preferred, None, incoming.language_code.as_deref());
            return Ok(message(lang, MessageKey::NotFound).to_string());
        };

        let country_lang = self.places.country_default_language(&place.country_code).await?;
        let lang = i18n::decide_language(preferred, country_lang, incoming.language_code.as_deref());

        let consensus = self.forecasts.consensus_for(place.coordinates, day).await?;
        let now = Utc::now();
        let date = day.date_from(now.date_naive());

        let mut reply = match &self.ai_writer {
            Some(ai) => match ai
                .complete(&build_ai_prompt(lang, &place, &consensus, day, date))
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("AI text unavailable, using template: {}", e);
                    render_city_message(lang, &place, &consensus, day, date)
                }
            },
            None => render_city_message(lang, &place, &consensus, day, date),
        };

        if let Some(until) = recipient
            .filter(|r| r.is_paused_at(now))
            .and_then(|r| r.paused_until)
        {
            reply.push_str(&i18n::paused_note(lang, &format_until(until)));
        }

        Ok(reply)
    }
}
