//! Error handling for ForeAIcast
//!
//! Provides consistent error responses in English and Hungarian

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::external::SourceError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_hu: String,
    },

    // Pipeline errors
    #[error("Nothing to aggregate for {0}")]
    EmptyAggregation(String),

    #[error("Forecast source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    // External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unavailable {
                source_name,
                reason,
            } => AppError::SourceUnavailable {
                source_name,
                reason,
            },
            SourceError::Fatal {
                source_name,
                reason,
            } => AppError::ExternalService(format!("{}: {}", source_name, reason)),
        }
    }
}

impl From<shared::ValidationError> for AppError {
    fn from(err: shared::ValidationError) -> Self {
        AppError::Validation {
            field: err.field.to_string(),
            message: err.message.to_string(),
            message_hu: format!("Érvénytelen érték: {}", err.field),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::Validation {
            message: errors.to_string(),
            message_hu: format!("Érvénytelen paraméter: {}", field),
            field,
        }
    }
}

impl From<shared::EmptyAggregationError> for AppError {
    fn from(err: shared::EmptyAggregationError) -> Self {
        AppError::EmptyAggregation(err.scope_name)
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_hu: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_hu: format!("Nem található: {}", resource),
                    field: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_hu,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_hu: message_hu.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::EmptyAggregation(scope) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "EMPTY_AGGREGATION".to_string(),
                    message_en: format!("No forecast data available for {}", scope),
                    message_hu: format!("Nincs elérhető előrejelzés: {}", scope),
                    field: None,
                },
            ),
            AppError::SourceUnavailable { source_name, .. } => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "SOURCE_UNAVAILABLE".to_string(),
                    message_en: format!("Weather source {} is temporarily unavailable", source_name),
                    message_hu: format!("A(z) {} időjárás-forrás átmenetileg nem elérhető", source_name),
                    field: None,
                },
            ),
            AppError::ExternalService(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "EXTERNAL_SERVICE_ERROR".to_string(),
                    message_en: format!("External service error: {}", msg),
                    message_hu: format!("Külső szolgáltatás hiba: {}", msg),
                    field: None,
                },
            ),
            AppError::Telegram(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "TELEGRAM_API_ERROR".to_string(),
                    message_en: format!("Telegram API error: {}", msg),
                    message_hu: format!("Telegram API hiba: {}", msg),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message_en: format!("Configuration error: {}", msg),
                    message_hu: format!("Konfigurációs hiba: {}", msg),
                    field: None,
                },
            ),
            AppError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "IO_ERROR".to_string(),
                    message_en: "A file system error occurred".to_string(),
                    message_hu: "Fájlrendszer hiba történt".to_string(),
                    field: None,
                },
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_hu: "Adatbázis hiba történt".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_hu: "Belső szerverhiba".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_hu: "Belső szerverhiba".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
