//! Chat bot conversation tests
//!
//! Tests for:
//! - Registration with display name collection
//! - Pause / resume / language commands
//! - Double confirmation of /stop
//! - Forecast replies, not-found and generic error paths

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{place, raw, FakeSource, InMemoryPlaces, InMemoryRecipients};
use foreaicast_backend::external::SourceError;
use foreaicast_backend::services::chatbot::IncomingMessage;
use foreaicast_backend::services::i18n::{self, message, MessageKey};
use foreaicast_backend::services::{ChatbotService, ForecastService, OperatorNotifier};
use shared::Language;

const USER: i64 = 42;

struct Harness {
    bot: ChatbotService,
    recipients: Arc<InMemoryRecipients>,
}

fn harness_with(primary: FakeSource) -> Harness {
    let recipients = Arc::new(InMemoryRecipients::default());
    let places = Arc::new(InMemoryPlaces::new(vec![place("Pécs", "Baranya", 46, true)]));
    let notifier = OperatorNotifier::disabled();
    let forecasts = ForecastService::new(
        Arc::new(primary),
        Arc::new(FakeSource::always("openweather", Ok(raw("22.0", "11.0", "3.0")))),
        notifier.clone(),
    );

    Harness {
        bot: ChatbotService::new(recipients.clone(), places, forecasts, None, notifier, "HU"),
        recipients,
    }
}

fn harness() -> Harness {
    harness_with(FakeSource::always("open-meteo", Ok(raw("20.0", "10.0", "1.0"))))
}

fn msg(text: &str) -> IncomingMessage {
    IncomingMessage {
        user_id: USER,
        chat_id: 4200,
        username: Some("anna_k".to_string()),
        language_code: Some("hu".to_string()),
        text: text.to_string(),
    }
}

impl Harness {
    async fn say(&self, text: &str) -> String {
        self.bot.handle_message(&msg(text)).await
    }
}

fn assert_send<T: Send>(_: &T) {}

#[cfg(test)]
mod service_tests {
    use super::*;

    /// The webhook handler runs this future on the axum executor
    #[test]
    fn test_handle_message_future_is_send() {
        let h = harness();
        let incoming = msg("Pécs holnap");
        assert_send(&h.bot.handle_message(&incoming));
    }
}

#[cfg(test)]
mod registration_tests {
    use super::*;

    #[tokio::test]
    async fn test_start_asks_for_name_then_saves_it() {
        let h = harness();

        assert_eq!(h.say("/start").await, i18n::WELCOME);
        assert!(h.recipients.snapshot(USER).is_some());

        let reply = h.say("Anna").await;
        assert_eq!(reply, i18n::name_saved("Anna"));
        assert_eq!(
            h.recipients.snapshot(USER).unwrap().display_name.as_deref(),
            Some("Anna")
        );
    }

    #[tokio::test]
    async fn test_invalid_name_is_asked_again() {
        let h = harness();
        h.say("/start").await;

        assert_eq!(h.say("A").await, i18n::ASK_NAME_AGAIN);
        assert_eq!(h.say("  Anna  ").await, i18n::name_saved("Anna"));
    }

    #[tokio::test]
    async fn test_returning_user_is_welcomed_back() {
        let h = harness();
        h.say("/start").await;
        h.say("Anna").await;

        let reply = h.say("/start").await;
        assert_eq!(reply, i18n::welcome_back(Language::Hungarian, "Anna"));
    }
}

#[cfg(test)]
mod command_tests {
    use super::*;

    #[tokio::test]
    async fn test_stop_requires_confirmation() {
        let h = harness();
        h.say("/start").await;
        h.say("Anna").await;

        assert_eq!(
            h.say("/stop").await,
            message(Language::Hungarian, MessageKey::StopConfirm)
        );
        assert!(h.recipients.snapshot(USER).is_some());

        assert_eq!(
            h.say("/stop").await,
            message(Language::Hungarian, MessageKey::StopDone)
        );
        assert!(h.recipients.snapshot(USER).is_none());
    }

    #[tokio::test]
    async fn test_other_message_cancels_stop() {
        let h = harness();
        h.say("/start").await;
        h.say("Anna").await;

        h.say("/stop").await;
        h.say("/resume").await;
        assert_eq!(
            h.say("/stop").await,
            message(Language::Hungarian, MessageKey::StopConfirm)
        );
        assert!(h.recipients.snapshot(USER).is_some());
    }

    #[tokio::test]
    async fn test_pause_uses_allowed_hours() {
        let h = harness();

        let reply = h.say("/pause 72").await;
        assert!(reply.contains("72 órára"));
        let until = h.recipients.snapshot(USER).unwrap().paused_until.unwrap();
        assert!(until > Utc::now() + Duration::hours(71));

        let reply = h.say("/pause 5").await;
        assert!(reply.contains("48 órára"));
    }

    #[tokio::test]
    async fn test_resume_clears_pause() {
        let h = harness();
        h.say("/pause").await;
        assert!(h.recipients.snapshot(USER).unwrap().paused_until.is_some());

        assert_eq!(
            h.say("/resume").await,
            message(Language::Hungarian, MessageKey::ResumeOk)
        );
        assert!(h.recipients.snapshot(USER).unwrap().paused_until.is_none());
    }

    #[tokio::test]
    async fn test_lang_command() {
        let h = harness();

        assert_eq!(
            h.say("/lang").await,
            i18n::current_language(Language::Hungarian, Language::Hungarian)
        );
        assert_eq!(h.say("/lang en").await, i18n::lang_set(Language::English));
        assert_eq!(
            h.recipients.snapshot(USER).unwrap().preferred_language,
            Some(Language::English)
        );

        // Replies now follow the chosen language
        assert_eq!(
            h.say("/lang xx").await,
            message(Language::English, MessageKey::LangInvalid)
        );
    }

    #[tokio::test]
    async fn test_unknown_command_shows_usage() {
        let h = harness();
        assert_eq!(
            h.say("/weather").await,
            message(Language::Hungarian, MessageKey::Usage)
        );
    }
}

#[cfg(test)]
mod forecast_tests {
    use super::*;

    #[tokio::test]
    async fn test_forecast_reply_uses_consensus() {
        let h = harness();
        let reply = h.say("Pécs holnap").await;

        assert!(reply.contains("Pécs (Baranya, Hungary)"));
        assert!(reply.contains("holnap"));
        assert!(reply.contains("Csúcs: 21.0 °C | Min: 10.5 °C"));
        assert!(reply.contains("3.0 mm"));
        // The sender is registered on the way
        assert!(h.recipients.snapshot(USER).is_some());
    }

    #[tokio::test]
    async fn test_unknown_place_is_not_found() {
        let h = harness();
        assert_eq!(
            h.say("Atlantisz ma").await,
            message(Language::Hungarian, MessageKey::NotFound)
        );
    }

    #[tokio::test]
    async fn test_preferred_language_wins_over_country() {
        let h = harness();
        h.say("/lang en").await;

        let reply = h.say("Pécs today").await;
        assert!(reply.contains("High: 21.0 °C | Low: 10.5 °C"));
        assert!(reply.contains("today"));
    }

    #[tokio::test]
    async fn test_paused_user_gets_note() {
        let h = harness();
        h.say("/pause 24").await;

        let reply = h.say("Pécs").await;
        assert!(reply.contains("⏸️ Megjegyzés"));
    }

    #[tokio::test]
    async fn test_source_failure_gives_generic_error() {
        let h = harness_with(FakeSource::always(
            "open-meteo",
            Err(SourceError::unavailable("open-meteo", "HTTP 503")),
        ));

        assert_eq!(
            h.say("Pécs").await,
            message(Language::Hungarian, MessageKey::ErrorGeneric)
        );
    }
}
