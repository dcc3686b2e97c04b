//! External API integrations
//!
//! Weather providers implement [`ForecastSource`], chat delivery implements
//! [`MessageTransport`]. Both return tagged errors so callers can pick a
//! fallback by matching instead of inspecting messages.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{Coordinates, RawForecast, TargetDay};
use thiserror::Error;

pub mod ai_writer;
pub mod open_meteo;
pub mod openweather;
pub mod telegram;

pub use ai_writer::AiWriterClient;
pub use open_meteo::OpenMeteoClient;
pub use openweather::OpenWeatherClient;
pub use telegram::TelegramClient;

// ============================================================================
// Forecast sources
// ============================================================================

/// Failure of a single provider call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Auth, quota, network or upstream outage. Recoverable by degrading.
    #[error("{source_name} unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    /// The provider answered with data we cannot use
    #[error("{source_name} returned unusable data: {reason}")]
    Fatal { source_name: String, reason: String },
}

impl SourceError {
    pub fn unavailable(source_name: &str, reason: impl Into<String>) -> Self {
        SourceError::Unavailable {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn fatal(source_name: &str, reason: impl Into<String>) -> Self {
        SourceError::Fatal {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn source_name(&self) -> &str {
        match self {
            SourceError::Unavailable { source_name, .. } | SourceError::Fatal { source_name, .. } => {
                source_name
            }
        }
    }

    /// Map a reqwest failure: timeouts, connection errors and upstream
    /// statuses are outages, body decoding problems are fatal.
    pub fn from_reqwest(source_name: &str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::fatal(source_name, err.to_string())
        } else {
            Self::unavailable(source_name, err.to_string())
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(source_name: &str, status: reqwest::StatusCode, body: &str) -> Self {
        let reason = format!("HTTP {} - {}", status.as_u16(), body);
        match status.as_u16() {
            401 | 403 | 429 => Self::unavailable(source_name, reason),
            code if code >= 500 => Self::unavailable(source_name, reason),
            _ => Self::fatal(source_name, reason),
        }
    }
}

/// A daily forecast provider
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Short provider name used in logs and alerts
    fn name(&self) -> &str;

    async fn fetch_daily(
        &self,
        coords: Coordinates,
        day: TargetDay,
    ) -> Result<RawForecast, SourceError>;
}

/// Convert a provider float to a decimal via its shortest textual form.
///
/// Returns `None` for NaN and infinities.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}

/// Pick `series[index]` and convert it, failing with a fatal source error
pub(crate) fn daily_value(
    source_name: &str,
    field: &str,
    series: &[Option<f64>],
    index: usize,
) -> Result<Decimal, SourceError> {
    let raw = series
        .get(index)
        .copied()
        .flatten()
        .ok_or_else(|| SourceError::fatal(source_name, format!("missing {}[{}]", field, index)))?;
    decimal_from_f64(raw)
        .ok_or_else(|| SourceError::fatal(source_name, format!("non-finite {}", field)))
}

// ============================================================================
// Message transport
// ============================================================================

/// Failure of a single chat send
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SendError {
    /// Flood control; retry after the given wait
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// Timeout, connection problem or upstream 5xx
    #[error("transient failure: {0}")]
    Transient(String),

    /// The recipient blocked the bot
    #[error("recipient blocked the bot: {0}")]
    Blocked(String),

    /// Any other refusal (bad chat id, malformed request)
    #[error("message rejected: {0}")]
    Rejected(String),
}

/// Sends plain text to a chat
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SendError>;
}
