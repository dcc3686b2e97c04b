//! Consensus and aggregation tests
//!
//! Tests for:
//! - Two-source reconciliation (averages, max precipitation, signed deltas)
//! - Single-member and empty aggregation
//! - Nation aggregate over cities vs. mean of county means
//! - Deterministic region membership

mod common;

use common::{dec, place, raw};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    aggregate, default_regions, reconcile, round_one_decimal, select_region_members,
    ConsensusForecast, CountyGroup, RawForecast,
};

fn members(values: &[(&str, &str, &str, &str)]) -> Vec<(String, ConsensusForecast)> {
    values
        .iter()
        .map(|(name, tmax, tmin, precip)| {
            (
                name.to_string(),
                shared::reconcile_single(&raw(tmax, tmin, precip)),
            )
        })
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_reconcile_worked_example() {
        let result = reconcile(&raw("20.0", "10.0", "2.0"), &raw("22.0", "11.0", "5.0"));

        assert_eq!(result.day_max_temp_c, dec("21.0"));
        assert_eq!(result.day_min_temp_c, dec("10.5"));
        assert_eq!(result.precipitation_mm, dec("5.0"));

        let deltas = result.deltas.unwrap();
        assert_eq!(deltas.max_temp_delta, dec("-2.0"));
        assert_eq!(deltas.min_temp_delta, dec("-1.0"));
        assert_eq!(deltas.precip_delta, dec("-3.0"));
    }

    /// Averages landing exactly on .x5 round half to even
    #[test]
    fn test_midpoint_rounding_is_half_even() {
        let result = reconcile(&raw("20.05", "0", "0"), &raw("20.1", "0", "0"));
        // (20.05 + 20.1) / 2 = 20.075 -> 20.1
        assert_eq!(result.day_max_temp_c, dec("20.1"));

        assert_eq!(round_one_decimal(dec("20.05")), dec("20.0"));
        assert_eq!(round_one_decimal(dec("20.15")), dec("20.2"));
        assert_eq!(round_one_decimal(dec("-0.25")), dec("-0.2"));
    }

    #[test]
    fn test_aggregate_empty_fails() {
        let err = aggregate("Zala", &[]).unwrap_err();
        assert_eq!(err.scope_name, "Zala");
    }

    #[test]
    fn test_nation_uses_direct_member_average() {
        // County A has 1 city, county B has 3
        let county_a = members(&[("A1", "10.0", "0", "0")]);
        let county_b = members(&[
            ("B1", "20.0", "0", "0"),
            ("B2", "20.0", "0", "0"),
            ("B3", "20.0", "0", "0"),
        ]);

        let all: Vec<_> = county_a.iter().chain(county_b.iter()).cloned().collect();
        let nation = aggregate("Országos", &all).unwrap();
        assert_eq!(nation.avg_max_temp_c, dec("17.5"));

        let a = aggregate("A", &county_a).unwrap();
        let b = aggregate("B", &county_b).unwrap();
        let mean_of_means = (a.avg_max_temp_c + b.avg_max_temp_c) / Decimal::from(2);
        assert_eq!(mean_of_means, dec("15"));
        assert_ne!(nation.avg_max_temp_c, mean_of_means);
    }

    #[test]
    fn test_aggregate_takes_max_precipitation() {
        let record = aggregate(
            "Dél-Alföld",
            &members(&[("Szeged", "20", "8", "1.2"), ("Kecskemét", "21", "9", "7.4")]),
        )
        .unwrap();
        assert_eq!(record.max_precip_mm, dec("7.4"));
        assert_eq!(record.member_cities[0].name, "Szeged");
        assert_eq!(record.member_cities[1].name, "Kecskemét");
    }

    #[test]
    fn test_region_selection_prefers_seats_and_caps() {
        let counties = vec![
            CountyGroup {
                name: "Baranya".to_string(),
                cities: vec![
                    place("Mohács", "Baranya", 46, false),
                    place("Komló", "Baranya", 47, false),
                    place("Pécs", "Baranya", 48, true),
                    place("Siklós", "Baranya", 49, false),
                ],
            },
        ];
        let mecsek = default_regions()
            .into_iter()
            .find(|r| r.name == "Mecsek")
            .unwrap();

        let selected = select_region_members(&mecsek, &counties, 3);
        let names: Vec<_> = selected.iter().map(|p| p.display_name.as_str()).collect();
        assert_eq!(names, vec!["Pécs", "Mohács", "Komló"]);

        // Same input, same output
        assert_eq!(select_region_members(&mecsek, &counties, 3), selected);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Temperatures with two decimals between -30.00 and 45.00
    fn temperature_strategy() -> impl Strategy<Value = Decimal> {
        (-3000i64..=4500i64).prop_map(|n| Decimal::new(n, 2))
    }

    /// Precipitation between 0.00 and 80.00 mm
    fn precip_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=8000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn forecast_strategy() -> impl Strategy<Value = RawForecast> {
        (temperature_strategy(), temperature_strategy(), precip_strategy())
            .prop_map(|(a, b, p)| RawForecast::new(a.max(b), a.min(b), p))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Temperatures are rounded averages, precipitation the rounded maximum
        #[test]
        fn prop_reconcile_average_and_max(a in forecast_strategy(), b in forecast_strategy()) {
            let result = reconcile(&a, &b);
            let two = Decimal::from(2);

            prop_assert_eq!(
                result.day_max_temp_c,
                round_one_decimal((a.day_max_temp_c + b.day_max_temp_c) / two)
            );
            prop_assert_eq!(
                result.day_min_temp_c,
                round_one_decimal((a.day_min_temp_c + b.day_min_temp_c) / two)
            );
            prop_assert_eq!(
                result.precipitation_mm,
                round_one_decimal(a.precipitation_mm.max(b.precipitation_mm))
            );
        }

        /// Deltas are signed A - B
        #[test]
        fn prop_reconcile_deltas_signed(a in forecast_strategy(), b in forecast_strategy()) {
            let deltas = reconcile(&a, &b).deltas.unwrap();
            prop_assert_eq!(
                deltas.max_temp_delta,
                round_one_decimal(a.day_max_temp_c - b.day_max_temp_c)
            );
        }

        /// Swapping sources negates the deltas and keeps the consensus
        #[test]
        fn prop_reconcile_swap_antisymmetric(a in forecast_strategy(), b in forecast_strategy()) {
            let ab = reconcile(&a, &b);
            let ba = reconcile(&b, &a);
            let (dab, dba) = (ab.deltas.clone().unwrap(), ba.deltas.clone().unwrap());

            prop_assert_eq!(dab.max_temp_delta, -dba.max_temp_delta);
            prop_assert_eq!(dab.min_temp_delta, -dba.min_temp_delta);
            prop_assert_eq!(dab.precip_delta, -dba.precip_delta);
            prop_assert_eq!(ab.day_max_temp_c, ba.day_max_temp_c);
        }

        /// A single member aggregates to itself
        #[test]
        fn prop_single_member_aggregate_is_identity(a in forecast_strategy()) {
            let consensus = shared::reconcile_single(&a);
            let record = aggregate("Vas", &[("Szombathely".to_string(), consensus.clone())]).unwrap();

            prop_assert_eq!(record.avg_max_temp_c, consensus.day_max_temp_c);
            prop_assert_eq!(record.avg_min_temp_c, consensus.day_min_temp_c);
            prop_assert_eq!(record.max_precip_mm, consensus.precipitation_mm);
        }
    }
}
