//! Places, county groups and region membership selection

use serde::{Deserialize, Serialize};

use crate::types::Coordinates;

/// A resolved place record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    pub display_name: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    pub coordinates: Coordinates,
    pub country_code: String,
    /// Administrative seat of its county
    pub is_primary_seat: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<i64>,
}

/// The cities of one county in directory order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountyGroup {
    pub name: String,
    pub cities: Vec<Place>,
}

/// A named region and its counties, in display order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionDefinition {
    pub name: String,
    pub counties: Vec<String>,
}

pub type RegionMap = Vec<RegionDefinition>;

/// Default number of cities taken from each county of a region
pub const DEFAULT_REGION_CITY_CAP: usize = 3;

/// The fixed Hungarian region layout used by the national article
pub fn default_regions() -> RegionMap {
    let region = |name: &str, counties: &[&str]| RegionDefinition {
        name: name.to_string(),
        counties: counties.iter().map(|c| c.to_string()).collect(),
    };

    vec![
        region("Budapest és agglomeráció", &["Budapest", "Pest"]),
        region("Balaton", &["Veszprém", "Somogy", "Zala"]),
        region(
            "Alföld",
            &[
                "Bács-Kiskun",
                "Békés",
                "Csongrád-Csanád",
                "Hajdú-Bihar",
                "Jász-Nagykun-Szolnok",
                "Szabolcs-Szatmár-Bereg",
            ],
        ),
        region("Északi-középhegység", &["Borsod-Abaúj-Zemplén", "Heves", "Nógrád"]),
        region("Mecsek", &["Baranya"]),
    ]
}

/// Select the member cities of one region.
///
/// Per county (in the region's order): primary seats first, then the rest,
/// each partition keeping its relative order, truncated to `per_county_cap`.
/// The per-county selections are concatenated and deduplicated by display
/// name, first occurrence wins. Counties missing from `counties` contribute
/// nothing.
pub fn select_region_members(
    region: &RegionDefinition,
    counties: &[CountyGroup],
    per_county_cap: usize,
) -> Vec<Place> {
    let mut selected: Vec<Place> = Vec::new();

    for county_name in &region.counties {
        let Some(group) = counties.iter().find(|g| &g.name == county_name) else {
            continue;
        };

        let seats = group.cities.iter().filter(|p| p.is_primary_seat);
        let others = group.cities.iter().filter(|p| !p.is_primary_seat);

        for place in seats.chain(others).take(per_county_cap) {
            if !selected.iter().any(|s| s.display_name == place.display_name) {
                selected.push(place.clone());
            }
        }
    }

    selected
}

/// Order resolver candidates best-first: exact country match, primary seat,
/// population descending, then name ascending.
pub fn rank_place_candidates(candidates: &mut [Place], default_country: &str) {
    candidates.sort_by(|a, b| {
        let a_home = a.country_code.eq_ignore_ascii_case(default_country);
        let b_home = b.country_code.eq_ignore_ascii_case(default_country);
        b_home
            .cmp(&a_home)
            .then_with(|| b.is_primary_seat.cmp(&a.is_primary_seat))
            .then_with(|| b.population.unwrap_or(0).cmp(&a.population.unwrap_or(0)))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
}

/// Best match among resolver candidates
pub fn best_place_match(mut candidates: Vec<Place>, default_country: &str) -> Option<Place> {
    rank_place_candidates(&mut candidates, default_country);
    candidates.into_iter().next()
}
