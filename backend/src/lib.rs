//! ForeAIcast backend
//!
//! Two-source weather consensus served over HTTP and a Telegram bot, plus the
//! daily article generation and push delivery runs.

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;

use external::{AiWriterClient, MessageTransport, OpenMeteoClient, OpenWeatherClient, TelegramClient};
use services::{
    ArticleBuilder, ChatbotService, DeliveryPolicy, Dispatcher, ForecastService, OperatorNotifier,
    PgPlaceDirectory, PgRecipientDirectory, PlaceDirectory, RecipientDirectory,
};

/// Application state shared across handlers and batch commands
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub forecasts: ForecastService,
    pub places: Arc<dyn PlaceDirectory>,
    pub recipients: Arc<dyn RecipientDirectory>,
    pub chatbot: ChatbotService,
    pub transport: Arc<dyn MessageTransport>,
    pub notifier: OperatorNotifier,
}

impl AppState {
    /// Wire the production clients and directories from configuration
    pub fn new(db: sqlx::PgPool, config: Config) -> Self {
        let timeout = Duration::from_secs(config.providers.request_timeout_secs);

        let transport: Arc<dyn MessageTransport> = Arc::new(
            TelegramClient::new(&config.telegram.api_base_url, &config.telegram.bot_token)
                .with_default_retry_after(Duration::from_secs(
                    config.delivery.default_rate_limit_wait_secs,
                )),
        );
        let notifier = OperatorNotifier::new(transport.clone(), config.telegram.alert_chat_id);

        let forecasts = ForecastService::new(
            Arc::new(OpenMeteoClient::new(&config.providers.open_meteo_base_url, timeout)),
            Arc::new(OpenWeatherClient::new(
                &config.providers.openweather_base_url,
                config.providers.openweather_api_key.clone(),
                &config.providers.units,
                timeout,
            )),
            notifier.clone(),
        );

        let places: Arc<dyn PlaceDirectory> = Arc::new(PgPlaceDirectory::new(db.clone()));
        let recipients: Arc<dyn RecipientDirectory> = Arc::new(PgRecipientDirectory::new(db.clone()));

        let ai_writer =
            AiWriterClient::from_config(config.ai.api_key.as_deref(), &config.ai.base_url, &config.ai.model);
        if ai_writer.is_none() {
            tracing::info!("No AI key configured, chat replies use templates");
        }

        let chatbot = ChatbotService::new(
            recipients.clone(),
            places.clone(),
            forecasts.clone(),
            ai_writer,
            notifier.clone(),
            config.articles.country_code.clone(),
        );

        Self {
            db,
            config: Arc::new(config),
            forecasts,
            places,
            recipients,
            chatbot,
            transport,
            notifier,
        }
    }

    pub fn article_builder(&self) -> ArticleBuilder {
        ArticleBuilder::new(
            self.places.clone(),
            self.forecasts.clone(),
            self.notifier.clone(),
            self.config.articles.clone(),
        )
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.transport.clone(),
            DeliveryPolicy::from(&self.config.delivery),
            self.notifier.clone(),
        )
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "ForeAIcast API v1"
}
