//! HTTP handlers for forecast lookups

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{validate_coordinates, Coordinates, Place, TargetDay};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::external::decimal_from_f64;
use crate::services::forecast::ForecastComparison;
use crate::AppState;

/// Query parameters for a forecast at coordinates
#[derive(Debug, Deserialize, Validate)]
pub struct CoordsQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    #[serde(default)]
    pub day: TargetDay,
}

/// Query parameters for a forecast by place name
#[derive(Debug, Deserialize, Validate)]
pub struct PlaceQuery {
    /// ISO 3166-1 alpha-2 code preferred when several places match
    #[validate(length(equal = 2))]
    pub country: Option<String>,
    #[serde(default)]
    pub day: TargetDay,
}

#[derive(Debug, Serialize)]
pub struct PlaceForecastResponse {
    pub place: Place,
    pub day: TargetDay,
    #[serde(flatten)]
    pub forecast: ForecastComparison,
}

/// Both sources and their consensus for a coordinate pair
/// GET /forecast/by-coords?lat=&lon=&day=
pub async fn forecast_by_coords(
    State(state): State<AppState>,
    Query(query): Query<CoordsQuery>,
) -> AppResult<Json<ForecastComparison>> {
    query.validate()?;

    let invalid = || AppError::Validation {
        field: "lat".to_string(),
        message: "Coordinates must be finite numbers".to_string(),
        message_hu: "A koordinátáknak véges számoknak kell lenniük".to_string(),
    };
    let coords = Coordinates::new(
        decimal_from_f64(query.lat).ok_or_else(invalid)?,
        decimal_from_f64(query.lon).ok_or_else(invalid)?,
    );
    validate_coordinates(&coords)?;

    let comparison = state.forecasts.compare(coords, query.day).await?;
    Ok(Json(comparison))
}

/// Resolve a place name and return its forecast
/// GET /forecast/by-place/:name?country=&day=
pub async fn forecast_by_place(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PlaceQuery>,
) -> AppResult<Json<PlaceForecastResponse>> {
    query.validate()?;

    let country = query
        .country
        .unwrap_or_else(|| state.config.articles.country_code.clone());
    let place = state
        .places
        .resolve(&name, &country)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Place '{}'", name)))?;

    let forecast = state.forecasts.compare(place.coordinates, query.day).await?;
    Ok(Json(PlaceForecastResponse {
        place,
        day: query.day,
        forecast,
    }))
}
