//! OpenWeather One Call 3.0 client (secondary source)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{validate_raw_forecast, Coordinates, RawForecast, TargetDay, WeatherAlert};

use super::{decimal_from_f64, ForecastSource, SourceError};

const SOURCE_NAME: &str = "OpenWeather";
const DEFAULT_ALERT_EVENT: &str = "Riasztás";

/// Metres per second to kilometres per hour
const MPS_TO_KMH: Decimal = Decimal::from_parts(36, 0, 0, false, 1);

/// OpenWeather API client
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    units: String,
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    #[serde(default)]
    daily: Vec<OneCallDaily>,
    #[serde(default)]
    alerts: Option<Vec<OneCallAlert>>,
}

#[derive(Debug, Deserialize)]
struct OneCallDaily {
    temp: OneCallTemp,
    rain: Option<f64>,
    snow: Option<f64>,
    wind_speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OneCallTemp {
    max: f64,
    min: f64,
}

#[derive(Debug, Deserialize)]
struct OneCallAlert {
    event: Option<String>,
    sender_name: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        units: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            units: units.into(),
        }
    }

    fn convert(data: OneCallResponse, index: usize) -> Result<RawForecast, SourceError> {
        let day = data
            .daily
            .get(index)
            .ok_or_else(|| SourceError::fatal(SOURCE_NAME, format!("missing daily[{}]", index)))?;

        let to_decimal = |field: &str, value: f64| {
            decimal_from_f64(value)
                .ok_or_else(|| SourceError::fatal(SOURCE_NAME, format!("non-finite {}", field)))
        };

        let rain = to_decimal("rain", day.rain.unwrap_or(0.0))?;
        let snow = to_decimal("snow", day.snow.unwrap_or(0.0))?;

        let mut forecast = RawForecast::new(
            to_decimal("temp.max", day.temp.max)?,
            to_decimal("temp.min", day.temp.min)?,
            rain + snow,
        );
        forecast.max_wind_kmh = day
            .wind_speed
            .and_then(decimal_from_f64)
            .map(|mps| mps * MPS_TO_KMH);
        forecast.alerts = data
            .alerts
            .unwrap_or_default()
            .into_iter()
            .map(|a| WeatherAlert {
                event: a
                    .event
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_ALERT_EVENT.to_string()),
                source: a.sender_name.unwrap_or_default(),
            })
            .collect();

        validate_raw_forecast(&forecast)
            .map_err(|e| SourceError::fatal(SOURCE_NAME, e.to_string()))?;
        Ok(forecast)
    }
}

#[async_trait]
impl ForecastSource for OpenWeatherClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_daily(
        &self,
        coords: Coordinates,
        day: TargetDay,
    ) -> Result<RawForecast, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SourceError::unavailable(SOURCE_NAME, "API key not configured"));
        };

        let url = format!("{}/data/3.0/onecall", self.base_url);
        let latitude = coords.latitude.to_string();
        let longitude = coords.longitude.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.as_str()),
                ("lon", longitude.as_str()),
                ("exclude", "minutely,hourly,current"),
                ("units", self.units.as_str()),
                ("lang", "hu"),
                ("appid", api_key),
            ])
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(SOURCE_NAME, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::from_status(SOURCE_NAME, status, &body));
        }

        let data: OneCallResponse = response
            .json()
            .await
            .map_err(|e| SourceError::fatal(SOURCE_NAME, format!("failed to parse response: {}", e)))?;

        tracing::debug!(lat = %coords.latitude, lon = %coords.longitude, "OpenWeather forecast received");
        Self::convert(data, day.offset())
    }
}
