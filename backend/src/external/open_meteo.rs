//! Open-Meteo daily forecast client (primary source)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{validate_raw_forecast, Coordinates, RawForecast, TargetDay};

use super::{daily_value, decimal_from_f64, ForecastSource, SourceError};

const SOURCE_NAME: &str = "Open-Meteo";
const DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_sum,windspeed_10m_max";

/// Open-Meteo API client
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    timezone: String,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    daily: OpenMeteoDaily,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoDaily {
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    windspeed_10m_max: Vec<Option<f64>>,
}

impl OpenMeteoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timezone: "Europe/Budapest".to_string(),
        }
    }

    fn convert_daily(daily: &OpenMeteoDaily, index: usize) -> Result<RawForecast, SourceError> {
        let mut forecast = RawForecast::new(
            daily_value(SOURCE_NAME, "temperature_2m_max", &daily.temperature_2m_max, index)?,
            daily_value(SOURCE_NAME, "temperature_2m_min", &daily.temperature_2m_min, index)?,
            daily_value(SOURCE_NAME, "precipitation_sum", &daily.precipitation_sum, index)?,
        );
        // Wind is optional: a missing value does not invalidate the day
        forecast.max_wind_kmh = daily
            .windspeed_10m_max
            .get(index)
            .copied()
            .flatten()
            .and_then(decimal_from_f64);

        validate_raw_forecast(&forecast)
            .map_err(|e| SourceError::fatal(SOURCE_NAME, e.to_string()))?;
        Ok(forecast)
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_daily(
        &self,
        coords: Coordinates,
        day: TargetDay,
    ) -> Result<RawForecast, SourceError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let latitude = coords.latitude.to_string();
        let longitude = coords.longitude.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("daily", DAILY_FIELDS),
                ("timezone", self.timezone.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(SOURCE_NAME, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::from_status(SOURCE_NAME, status, &body));
        }

        let data: OpenMeteoResponse = response
            .json()
            .await
            .map_err(|e| SourceError::fatal(SOURCE_NAME, format!("failed to parse response: {}", e)))?;

        tracing::debug!(lat = %coords.latitude, lon = %coords.longitude, "Open-Meteo forecast received");
        Self::convert_daily(&data.daily, day.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn sample() -> OpenMeteoDaily {
        serde_json::from_value(serde_json::json!({
            "time": ["2025-11-02", "2025-11-03"],
            "temperature_2m_max": [14.2, 16.8],
            "temperature_2m_min": [3.1, 5.4],
            "precipitation_sum": [0.0, 2.3],
            "windspeed_10m_max": [12.0, 38.5]
        }))
        .unwrap()
    }

    #[test]
    fn test_convert_picks_target_day() {
        let forecast = OpenMeteoClient::convert_daily(&sample(), TargetDay::Tomorrow.offset()).unwrap();
        assert_eq!(forecast.day_max_temp_c, Decimal::from_str("16.8").unwrap());
        assert_eq!(forecast.day_min_temp_c, Decimal::from_str("5.4").unwrap());
        assert_eq!(forecast.precipitation_mm, Decimal::from_str("2.3").unwrap());
        assert_eq!(forecast.max_wind_kmh, Some(Decimal::from_str("38.5").unwrap()));
        assert!(forecast.alerts.is_empty());
    }

    #[test]
    fn test_missing_day_is_fatal() {
        let mut daily = sample();
        daily.temperature_2m_max = vec![Some(14.2)];
        assert!(matches!(
            OpenMeteoClient::convert_daily(&daily, 1),
            Err(SourceError::Fatal { .. })
        ));
    }
}
