//! Place directory backed by the geographic tables

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{slugify, Coordinates, CountyGroup, Language, Place};
use sqlx::{FromRow, PgPool};

use crate::error::AppResult;

/// Read-only access to countries, counties and cities
#[async_trait]
pub trait PlaceDirectory: Send + Sync {
    /// Best match for a free-text name, or `None`
    async fn resolve(&self, query: &str, default_country: &str) -> AppResult<Option<Place>>;

    /// Cities grouped by county, seats first within each county
    async fn cities_by_county(
        &self,
        country_code: &str,
        min_population: i64,
    ) -> AppResult<Vec<CountyGroup>>;

    async fn country_default_language(&self, iso2: &str) -> AppResult<Option<Language>>;
}

/// PostgreSQL implementation
#[derive(Clone)]
pub struct PgPlaceDirectory {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct PlaceRow {
    city: String,
    country: String,
    county: Option<String>,
    lat: Decimal,
    lon: Decimal,
    iso2: String,
    is_county_seat: bool,
    population: Option<i64>,
}

impl From<PlaceRow> for Place {
    fn from(row: PlaceRow) -> Self {
        Place {
            display_name: row.city,
            country: row.country,
            region_name: row.county,
            coordinates: Coordinates::new(row.lat, row.lon),
            country_code: row.iso2,
            is_primary_seat: row.is_county_seat,
            population: row.population,
        }
    }
}

impl PgPlaceDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlaceDirectory for PgPlaceDirectory {
    async fn resolve(&self, query: &str, default_country: &str) -> AppResult<Option<Place>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, PlaceRow>(
            r#"
            SELECT ci.name_hu AS city,
                   co.name_en AS country,
                   cn.name_hu AS county,
                   ci.lat::numeric AS lat,
                   ci.lon::numeric AS lon,
                   co.iso2 AS iso2,
                   COALESCE(ci.is_county_seat, FALSE) AS is_county_seat,
                   ci.population::bigint AS population
            FROM cities ci
            JOIN countries co ON co.id = ci.country_id
            LEFT JOIN counties cn ON cn.id = ci.county_id
            WHERE ci.name_hu ILIKE $1 OR ci.slug ILIKE $2
            ORDER BY (co.iso2 = $3) DESC,
                     ci.is_county_seat DESC NULLS LAST,
                     COALESCE(ci.population, 0) DESC,
                     ci.name_hu
            LIMIT 1
            "#,
        )
        .bind(format!("{}%", query))
        .bind(format!("{}%", slugify(query)))
        .bind(default_country.to_uppercase())
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Place::from))
    }

    async fn cities_by_county(
        &self,
        country_code: &str,
        min_population: i64,
    ) -> AppResult<Vec<CountyGroup>> {
        let rows = sqlx::query_as::<_, PlaceRow>(
            r#"
            SELECT ci.name_hu AS city,
                   co.name_en AS country,
                   cn.name_hu AS county,
                   ci.lat::numeric AS lat,
                   ci.lon::numeric AS lon,
                   co.iso2 AS iso2,
                   COALESCE(ci.is_county_seat, FALSE) AS is_county_seat,
                   NULLIF(ci.population, 0)::bigint AS population
            FROM cities ci
            JOIN countries co ON co.id = ci.country_id
            JOIN counties cn ON cn.id = ci.county_id
            WHERE co.iso2 = $1
              AND COALESCE(ci.population, 0) >= $2
            ORDER BY cn.name_hu, (NOT COALESCE(ci.is_county_seat, FALSE)), ci.name_hu
            "#,
        )
        .bind(country_code.to_uppercase())
        .bind(min_population)
        .fetch_all(&self.db)
        .await?;

        Ok(group_by_county(rows.into_iter().map(Place::from)))
    }

    async fn country_default_language(&self, iso2: &str) -> AppResult<Option<Language>> {
        let lang: Option<Option<String>> =
            sqlx::query_scalar("SELECT default_lang FROM countries WHERE iso2 = $1")
                .bind(iso2.to_uppercase())
                .fetch_optional(&self.db)
                .await?;

        Ok(lang.flatten().as_deref().and_then(Language::from_code))
    }
}

/// Group consecutive places by their county name, keeping row order
pub fn group_by_county(places: impl IntoIterator<Item = Place>) -> Vec<CountyGroup> {
    let mut groups: Vec<CountyGroup> = Vec::new();
    for place in places {
        let county = place.region_name.clone().unwrap_or_default();
        match groups.last_mut() {
            Some(group) if group.name == county => group.cities.push(place),
            _ => groups.push(CountyGroup {
                name: county,
                cities: vec![place],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, county: &str) -> Place {
        Place {
            display_name: name.to_string(),
            country: "Hungary".to_string(),
            region_name: Some(county.to_string()),
            coordinates: Coordinates::new(Decimal::from(46), Decimal::from(18)),
            country_code: "HU".to_string(),
            is_primary_seat: false,
            population: None,
        }
    }

    #[test]
    fn test_group_by_county_keeps_order() {
        let groups = group_by_county(vec![
            place("Pécs", "Baranya"),
            place("Komló", "Baranya"),
            place("Kaposvár", "Somogy"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Baranya");
        assert_eq!(groups[0].cities.len(), 2);
        assert_eq!(groups[1].cities[0].display_name, "Kaposvár");
    }
}
