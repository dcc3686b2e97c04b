//! County, region and nation level forecast aggregates

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::forecast::{ConsensusForecast, WeatherAlert};

/// Raised when a scope has no members to aggregate
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no member cities to aggregate for scope '{scope_name}'")]
pub struct EmptyAggregationError {
    pub scope_name: String,
}

/// A single city's line inside an aggregate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberCity {
    pub name: String,
    pub max_temp_c: Decimal,
    pub min_temp_c: Decimal,
    pub precip_mm: Decimal,
}

/// Summary over a set of cities. Built once per run, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateRecord {
    pub scope_name: String,
    /// Unweighted mean of member maxima, unrounded
    pub avg_max_temp_c: Decimal,
    /// Unweighted mean of member minima, unrounded
    pub avg_min_temp_c: Decimal,
    /// Maximum over members, never the mean
    pub max_precip_mm: Decimal,
    /// Input order preserved
    pub member_cities: Vec<MemberCity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_wind_kmh: Option<Decimal>,
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
}

impl AggregateRecord {
    /// First `limit` member cities, for display truncation
    pub fn preview(&self, limit: usize) -> &[MemberCity] {
        let end = limit.min(self.member_cities.len());
        &self.member_cities[..end]
    }

    pub fn has_alerts(&self) -> bool {
        self.alerts.iter().any(|a| !a.event.trim().is_empty())
    }
}

/// Aggregate an ordered list of `(location label, consensus)` members.
///
/// Fails with [`EmptyAggregationError`] on an empty list rather than
/// producing a zero-filled record.
pub fn aggregate(
    scope_name: &str,
    members: &[(String, ConsensusForecast)],
) -> Result<AggregateRecord, EmptyAggregationError> {
    let Some((_, first)) = members.first() else {
        return Err(EmptyAggregationError {
            scope_name: scope_name.to_string(),
        });
    };

    let count = Decimal::from(members.len() as u64);
    let mut sum_max = Decimal::ZERO;
    let mut sum_min = Decimal::ZERO;
    let mut max_precip = first.precipitation_mm;
    let mut max_wind: Option<Decimal> = None;
    let mut alerts: Vec<WeatherAlert> = Vec::new();
    let mut member_cities = Vec::with_capacity(members.len());

    for (label, forecast) in members {
        sum_max += forecast.day_max_temp_c;
        sum_min += forecast.day_min_temp_c;
        max_precip = max_precip.max(forecast.precipitation_mm);

        if let Some(wind) = forecast.max_wind_kmh {
            max_wind = Some(max_wind.map_or(wind, |current| current.max(wind)));
        }

        for alert in &forecast.alerts {
            if !alerts.contains(alert) {
                alerts.push(alert.clone());
            }
        }

        member_cities.push(MemberCity {
            name: label.clone(),
            max_temp_c: forecast.day_max_temp_c,
            min_temp_c: forecast.day_min_temp_c,
            precip_mm: forecast.precipitation_mm,
        });
    }

    Ok(AggregateRecord {
        scope_name: scope_name.to_string(),
        avg_max_temp_c: sum_max / count,
        avg_min_temp_c: sum_min / count,
        max_precip_mm: max_precip,
        member_cities,
        max_wind_kmh: max_wind,
        alerts,
    })
}
