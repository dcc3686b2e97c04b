//! Daily forecast models and two-source reconciliation
//!
//! Source A is the primary provider, source B the secondary one. Deltas are
//! always `A - B`, so a positive temperature delta means source A ran hot
//! and a positive precipitation delta means source A ran wet.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A weather alert issued by a provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WeatherAlert {
    pub event: String,
    pub source: String,
}

/// One provider's daily forecast for a single (location, target day) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawForecast {
    pub day_max_temp_c: Decimal,
    pub day_min_temp_c: Decimal,
    pub precipitation_mm: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_wind_kmh: Option<Decimal>,
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
}

impl RawForecast {
    pub fn new(day_max_temp_c: Decimal, day_min_temp_c: Decimal, precipitation_mm: Decimal) -> Self {
        Self {
            day_max_temp_c,
            day_min_temp_c,
            precipitation_mm,
            max_wind_kmh: None,
            alerts: Vec::new(),
        }
    }
}

/// Signed source-A-minus-source-B differences
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForecastDeltas {
    pub max_temp_delta: Decimal,
    pub min_temp_delta: Decimal,
    pub precip_delta: Decimal,
}

/// Reconciled daily forecast for one location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsensusForecast {
    pub day_max_temp_c: Decimal,
    pub day_min_temp_c: Decimal,
    pub precipitation_mm: Decimal,
    /// `None` in degraded (single-source) mode
    pub deltas: Option<ForecastDeltas>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_wind_kmh: Option<Decimal>,
    #[serde(default)]
    pub alerts: Vec<WeatherAlert>,
}

impl ConsensusForecast {
    /// Zero-valued record standing in for a city whose fetch failed
    pub fn placeholder() -> Self {
        Self {
            day_max_temp_c: Decimal::ZERO,
            day_min_temp_c: Decimal::ZERO,
            precipitation_mm: Decimal::ZERO,
            deltas: None,
            max_wind_kmh: None,
            alerts: Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.deltas.is_none()
    }
}

/// Round to one decimal place, ties to even.
///
/// This is the single rounding rule used for every one-decimal value in the
/// system: `20.25 -> 20.2`, `20.35 -> 20.4`, `-0.25 -> -0.2`.
pub fn round_one_decimal(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven)
}

/// Merge two single-source forecasts for the same place and day.
///
/// Temperatures are averaged, precipitation takes the maximum (under-reporting
/// rain is worse than over-reporting it). Callers guarantee both inputs
/// describe the same location and target day.
pub fn reconcile(source_a: &RawForecast, source_b: &RawForecast) -> ConsensusForecast {
    let two = Decimal::from(2);

    let deltas = ForecastDeltas {
        max_temp_delta: round_one_decimal(source_a.day_max_temp_c - source_b.day_max_temp_c),
        min_temp_delta: round_one_decimal(source_a.day_min_temp_c - source_b.day_min_temp_c),
        precip_delta: round_one_decimal(source_a.precipitation_mm - source_b.precipitation_mm),
    };

    ConsensusForecast {
        day_max_temp_c: round_one_decimal((source_a.day_max_temp_c + source_b.day_max_temp_c) / two),
        day_min_temp_c: round_one_decimal((source_a.day_min_temp_c + source_b.day_min_temp_c) / two),
        precipitation_mm: round_one_decimal(source_a.precipitation_mm.max(source_b.precipitation_mm)),
        deltas: Some(deltas),
        max_wind_kmh: max_option(source_a.max_wind_kmh, source_b.max_wind_kmh).map(round_one_decimal),
        alerts: merge_alerts(&source_a.alerts, &source_b.alerts),
    }
}

/// Degraded mode: single-source passthrough without deltas
pub fn reconcile_single(source: &RawForecast) -> ConsensusForecast {
    ConsensusForecast {
        day_max_temp_c: round_one_decimal(source.day_max_temp_c),
        day_min_temp_c: round_one_decimal(source.day_min_temp_c),
        precipitation_mm: round_one_decimal(source.precipitation_mm),
        deltas: None,
        max_wind_kmh: source.max_wind_kmh.map(round_one_decimal),
        alerts: merge_alerts(&source.alerts, &[]),
    }
}

fn max_option(a: Option<Decimal>, b: Option<Decimal>) -> Option<Decimal> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Union of both alert lists, first occurrence wins
fn merge_alerts(a: &[WeatherAlert], b: &[WeatherAlert]) -> Vec<WeatherAlert> {
    let mut merged: Vec<WeatherAlert> = Vec::with_capacity(a.len() + b.len());
    for alert in a.iter().chain(b.iter()) {
        if !merged.contains(alert) {
            merged.push(alert.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn raw(tmax: &str, tmin: &str, precip: &str) -> RawForecast {
        RawForecast::new(dec(tmax), dec(tmin), dec(precip))
    }

    #[test]
    fn test_reconcile_reference_example() {
        let con = reconcile(&raw("20.0", "10.0", "2.0"), &raw("22.0", "11.0", "5.0"));

        assert_eq!(con.day_max_temp_c, dec("21.0"));
        assert_eq!(con.day_min_temp_c, dec("10.5"));
        assert_eq!(con.precipitation_mm, dec("5.0"));

        let deltas = con.deltas.unwrap();
        assert_eq!(deltas.max_temp_delta, dec("-2.0"));
        assert_eq!(deltas.min_temp_delta, dec("-1.0"));
        assert_eq!(deltas.precip_delta, dec("-3.0"));
    }

    #[test]
    fn test_rounding_ties_to_even() {
        assert_eq!(round_one_decimal(dec("20.25")), dec("20.2"));
        assert_eq!(round_one_decimal(dec("20.35")), dec("20.4"));
        assert_eq!(round_one_decimal(dec("-0.25")), dec("-0.2"));
        assert_eq!(round_one_decimal(dec("20.26")), dec("20.3"));
    }

    #[test]
    fn test_reconcile_mean_at_tie_boundary() {
        // (20.0 + 20.5) / 2 = 20.25 and (20.1 + 20.6) / 2 = 20.35
        let con = reconcile(&raw("20.0", "20.1", "0"), &raw("20.5", "20.6", "0"));
        assert_eq!(con.day_max_temp_c, dec("20.2"));
        assert_eq!(con.day_min_temp_c, dec("20.4"));
    }

    #[test]
    fn test_reconcile_single_has_no_deltas() {
        let mut source = raw("18.44", "7.05", "0.35");
        source.max_wind_kmh = Some(dec("41.04"));

        let con = reconcile_single(&source);
        assert!(con.is_degraded());
        assert_eq!(con.day_max_temp_c, dec("18.4"));
        assert_eq!(con.day_min_temp_c, dec("7.0"));
        assert_eq!(con.precipitation_mm, dec("0.4"));
        assert_eq!(con.max_wind_kmh, Some(dec("41.0")));
    }

    #[test]
    fn test_wind_takes_max_of_available_sources() {
        let mut a = raw("10", "0", "0");
        let mut b = raw("10", "0", "0");
        a.max_wind_kmh = Some(dec("30"));
        b.max_wind_kmh = Some(dec("45.5"));
        assert_eq!(reconcile(&a, &b).max_wind_kmh, Some(dec("45.5")));

        b.max_wind_kmh = None;
        assert_eq!(reconcile(&a, &b).max_wind_kmh, Some(dec("30")));
    }

    #[test]
    fn test_alerts_are_merged_without_duplicates() {
        let storm = WeatherAlert {
            event: "Zivatar".to_string(),
            source: "HungaroMet".to_string(),
        };
        let wind = WeatherAlert {
            event: "Széllökés".to_string(),
            source: "HungaroMet".to_string(),
        };
        let mut a = raw("10", "0", "0");
        let mut b = raw("10", "0", "0");
        a.alerts = vec![storm.clone()];
        b.alerts = vec![wind.clone(), storm.clone()];

        assert_eq!(reconcile(&a, &b).alerts, vec![storm, wind]);
    }

    #[test]
    fn test_placeholder_is_zeroed() {
        let p = ConsensusForecast::placeholder();
        assert_eq!(p.day_max_temp_c, Decimal::ZERO);
        assert_eq!(p.precipitation_mm, Decimal::ZERO);
        assert!(p.is_degraded());
    }
}
