//! Configuration management for ForeAIcast
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FOREAICAST__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::Language;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Weather provider configuration
    pub providers: ProvidersConfig,

    /// Telegram Bot API configuration
    pub telegram: TelegramConfig,

    /// Optional AI text generation
    pub ai: AiConfig,

    /// Batch article generation
    pub articles: ArticlesConfig,

    /// Fan-out delivery tuning
    pub delivery: DeliveryConfig,

    /// Language used when nothing better is known about a user
    #[serde(default)]
    pub default_language: Language,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    /// Open-Meteo base URL (primary source)
    pub open_meteo_base_url: String,

    /// OpenWeather base URL (secondary source)
    pub openweather_base_url: String,

    /// OpenWeather One Call 3.0 key; the secondary source is unavailable without it
    pub openweather_api_key: Option<String>,

    pub units: String,

    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,

    /// Chat that receives operator alerts
    pub alert_chat_id: Option<i64>,

    /// Expected `X-Telegram-Bot-Api-Secret-Token` header on webhook calls
    pub webhook_secret: Option<String>,

    pub api_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    /// OpenAI-compatible API key; templated text is used without it
    pub api_key: Option<String>,

    pub model: String,

    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArticlesConfig {
    /// Directory the rendered `.md` / `.txt` files are written to
    pub output_dir: String,

    pub country_code: String,

    /// Cities below this population are left out of the articles
    pub min_population: i64,

    /// Cities taken per county when building a region
    pub region_city_cap: usize,

    /// Cities listed per region in the national article
    pub region_preview_cities: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeliveryConfig {
    pub max_message_chars: usize,

    pub send_delay_ms: u64,

    pub transient_retry_delay_ms: u64,

    /// Wait used when a rate limit response carries no retry hint
    pub default_rate_limit_wait_secs: u64,

    /// Ceiling for provider supplied waits
    pub max_rate_limit_wait_secs: u64,

    /// Attempts per (recipient, document) before giving up
    pub max_attempts: u32,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("FOREAICAST_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("providers.open_meteo_base_url", "https://api.open-meteo.com")?
            .set_default("providers.openweather_base_url", "https://api.openweathermap.org")?
            .set_default("providers.units", "metric")?
            .set_default("providers.request_timeout_secs", 20)?
            .set_default("telegram.api_base_url", "https://api.telegram.org")?
            .set_default("ai.model", "gpt-5-mini")?
            .set_default("ai.base_url", "https://api.openai.com/v1")?
            .set_default("articles.output_dir", "out")?
            .set_default("articles.country_code", "HU")?
            .set_default("articles.min_population", 10_000)?
            .set_default("articles.region_city_cap", 3)?
            .set_default("articles.region_preview_cities", 8)?
            .set_default("delivery.max_message_chars", 4090)?
            .set_default("delivery.send_delay_ms", 800)?
            .set_default("delivery.transient_retry_delay_ms", 5000)?
            .set_default("delivery.default_rate_limit_wait_secs", 40)?
            .set_default("delivery.max_rate_limit_wait_secs", 300)?
            .set_default("delivery.max_attempts", 5)?
            .set_default("default_language", "hungarian")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FOREAICAST__ prefix)
            .add_source(
                Environment::with_prefix("FOREAICAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/foreaicast".to_string(),
            max_connections: 10,
            min_connections: 2,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            open_meteo_base_url: "https://api.open-meteo.com".to_string(),
            openweather_base_url: "https://api.openweathermap.org".to_string(),
            openweather_api_key: None,
            units: "metric".to_string(),
            request_timeout_secs: 20,
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            alert_chat_id: None,
            webhook_secret: None,
            api_base_url: "https://api.telegram.org".to_string(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-5-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

impl Default for ArticlesConfig {
    fn default() -> Self {
        Self {
            output_dir: "out".to_string(),
            country_code: "HU".to_string(),
            min_population: 10_000,
            region_city_cap: shared::DEFAULT_REGION_CITY_CAP,
            region_preview_cities: 8,
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 4090,
            send_delay_ms: 800,
            transient_retry_delay_ms: 5000,
            default_rate_limit_wait_secs: 40,
            max_rate_limit_wait_secs: 300,
            max_attempts: 5,
        }
    }
}
