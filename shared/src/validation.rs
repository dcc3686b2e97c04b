//! Validation utilities for ForeAIcast
//!
//! Provider payloads and user input are checked here, at the boundary, so
//! the reconciler and aggregator only ever see well-formed records.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::RawForecast;
use crate::types::{Coordinates, TargetDay};

/// A boundary value that failed validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

// ============================================================================
// Forecast Validations
// ============================================================================

const MIN_PLAUSIBLE_TEMP_C: i64 = -90;
const MAX_PLAUSIBLE_TEMP_C: i64 = 60;
const MAX_PLAUSIBLE_DAILY_PRECIP_MM: i64 = 2000;
const MAX_PLAUSIBLE_WIND_KMH: i64 = 500;

fn validate_temperature(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::from(MIN_PLAUSIBLE_TEMP_C) || value > Decimal::from(MAX_PLAUSIBLE_TEMP_C) {
        return Err(ValidationError::new(field, "Temperature out of plausible range"));
    }
    Ok(())
}

/// Validate one provider's daily forecast
pub fn validate_raw_forecast(forecast: &RawForecast) -> Result<(), ValidationError> {
    validate_temperature("day_max_temp_c", forecast.day_max_temp_c)?;
    validate_temperature("day_min_temp_c", forecast.day_min_temp_c)?;

    if forecast.day_min_temp_c > forecast.day_max_temp_c {
        return Err(ValidationError::new(
            "day_min_temp_c",
            "Daily minimum exceeds daily maximum",
        ));
    }

    if forecast.precipitation_mm < Decimal::ZERO
        || forecast.precipitation_mm > Decimal::from(MAX_PLAUSIBLE_DAILY_PRECIP_MM)
    {
        return Err(ValidationError::new(
            "precipitation_mm",
            "Precipitation out of plausible range",
        ));
    }

    if let Some(wind) = forecast.max_wind_kmh {
        if wind < Decimal::ZERO || wind > Decimal::from(MAX_PLAUSIBLE_WIND_KMH) {
            return Err(ValidationError::new("max_wind_kmh", "Wind speed out of plausible range"));
        }
    }

    Ok(())
}

/// Validate latitude/longitude ranges
pub fn validate_coordinates(coords: &Coordinates) -> Result<(), ValidationError> {
    if coords.latitude < Decimal::from(-90) || coords.latitude > Decimal::from(90) {
        return Err(ValidationError::new("lat", "Latitude must be between -90 and 90"));
    }
    if coords.longitude < Decimal::from(-180) || coords.longitude > Decimal::from(180) {
        return Err(ValidationError::new("lon", "Longitude must be between -180 and 180"));
    }
    Ok(())
}

// ============================================================================
// Chat Input Validations
// ============================================================================

pub const DISPLAY_NAME_MIN_CHARS: usize = 2;
pub const DISPLAY_NAME_MAX_CHARS: usize = 50;

/// Validate a display name typed by a chat user, returning it trimmed
pub fn validate_display_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if !(DISPLAY_NAME_MIN_CHARS..=DISPLAY_NAME_MAX_CHARS).contains(&len) {
        return Err(ValidationError::new(
            "display_name",
            "Name must be between 2 and 50 characters",
        ));
    }
    Ok(trimmed.to_string())
}

/// Split a free-text query into place name and target day.
///
/// `"Szeged holnap"`, `"Pécs today"` and `"Győr"` (defaults to tomorrow) are
/// accepted. Commands and blank input yield `None`.
pub fn parse_forecast_query(text: &str) -> Option<(String, TargetDay)> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('/') {
        return None;
    }

    let (place, day) = match trimmed.rsplit_once(char::is_whitespace) {
        Some((head, last)) => match TargetDay::from_keyword(last) {
            Some(day) => (head.trim(), day),
            None => (trimmed, TargetDay::default()),
        },
        None => (trimmed, TargetDay::default()),
    };

    if place.is_empty() {
        return None;
    }
    Some((place.to_string(), day))
}
