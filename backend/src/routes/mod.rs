//! Route definitions for ForeAIcast

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Telegram bot webhook (public, secret header checked in the handler)
        .route("/webhook/telegram", post(handlers::handle_telegram_webhook))
        .nest("/forecast", forecast_routes())
}

/// Forecast lookup routes (public)
fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route("/by-coords", get(handlers::forecast_by_coords))
        .route("/by-place/:name", get(handlers::forecast_by_place))
}
