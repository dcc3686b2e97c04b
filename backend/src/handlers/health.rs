//! Service status endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` while the place and recipient store is unreachable
    pub status: String,
    pub version: String,
    pub database: String,
    pub forecast_sources: Vec<String>,
    pub operator_alerts: bool,
    pub webhook_secret: bool,
    pub article_dir: String,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_up = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();
    if !database_up {
        tracing::warn!("Health check: database unreachable");
    }

    let telegram = &state.config.telegram;
    Json(HealthResponse {
        status: if database_up { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database_up { "connected" } else { "disconnected" }.to_string(),
        forecast_sources: state
            .forecasts
            .source_names()
            .iter()
            .map(|name| name.to_string())
            .collect(),
        operator_alerts: telegram.alert_chat_id.is_some(),
        webhook_secret: telegram.webhook_secret.is_some(),
        article_dir: state.config.articles.output_dir.clone(),
    })
}
