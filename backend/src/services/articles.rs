//! Daily article generation run
//!
//! Builds the national, regional and county aggregates for one day and
//! writes the rendered articles to the output directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use shared::{
    aggregate, default_regions, select_region_members, AggregateRecord, ConsensusForecast,
    CountyGroup, DocumentScope, Place, TargetDay,
};
use uuid::Uuid;

use crate::config::ArticlesConfig;
use crate::error::{AppError, AppResult};
use crate::services::document_store;
use crate::services::forecast::ForecastService;
use crate::services::notifier::OperatorNotifier;
use crate::services::places::PlaceDirectory;
use crate::services::writer::{render_county_article, render_national_article};

/// Result of one generation run
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub run_id: Uuid,
    pub target_date: NaiveDate,
    pub documents: Vec<PathBuf>,
    pub skipped_counties: Vec<String>,
}

/// A city's consensus for this run; `fetched` is false for the zero placeholder
#[derive(Debug, Clone)]
struct CachedForecast {
    consensus: ConsensusForecast,
    fetched: bool,
}

/// Consensus per city, fetched at most once per run
type ForecastCache = HashMap<String, CachedForecast>;

pub struct ArticleBuilder {
    places: Arc<dyn PlaceDirectory>,
    forecasts: ForecastService,
    notifier: OperatorNotifier,
    config: ArticlesConfig,
}

impl ArticleBuilder {
    pub fn new(
        places: Arc<dyn PlaceDirectory>,
        forecasts: ForecastService,
        notifier: OperatorNotifier,
        config: ArticlesConfig,
    ) -> Self {
        Self {
            places,
            forecasts,
            notifier,
            config,
        }
    }

    /// Build the articles for `target_date`, which must be today or tomorrow
    pub async fn build(&self, target_date: NaiveDate) -> AppResult<GenerationSummary> {
        let today = Utc::now().date_naive();
        let Some(day) = [TargetDay::Today, TargetDay::Tomorrow]
            .into_iter()
            .find(|d| d.date_from(today) == target_date)
        else {
            return Err(AppError::Validation {
                field: "date".to_string(),
                message: "Only today or tomorrow can be generated".to_string(),
                message_hu: "Csak mai vagy holnapi cikk készíthető".to_string(),
            });
        };

        self.build_for(day, target_date).await
    }

    /// Build the articles for `day`, dated `target_date`
    pub async fn build_for(&self, day: TargetDay, target_date: NaiveDate) -> AppResult<GenerationSummary> {
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, %target_date, "Starting article generation");

        let counties = self
            .places
            .cities_by_county(&self.config.country_code, self.config.min_population)
            .await?;
        if counties.iter().all(|c| c.cities.is_empty()) {
            return Err(AppError::EmptyAggregation(
                DocumentScope::National.label().to_string(),
            ));
        }

        let cache = self.fetch_all(&counties, day).await;

        // Nation: every city directly, not the mean of county means
        let nation_members = members_of(counties.iter().flat_map(|c| c.cities.iter()), &cache);
        let nation = aggregate(DocumentScope::National.label(), &nation_members)?;

        let mut regions: Vec<AggregateRecord> = Vec::new();
        for region in default_regions() {
            let places = select_region_members(&region, &counties, self.config.region_city_cap);
            match aggregate(&region.name, &members_of(places.iter(), &cache)) {
                Ok(record) => regions.push(record),
                Err(e) => tracing::info!(region = %region.name, "Region skipped: {}", e),
            }
        }

        let output_dir = Path::new(&self.config.output_dir);
        let mut documents = Vec::new();
        let mut skipped_counties = Vec::new();

        let national = render_national_article(
            target_date,
            &nation,
            &regions,
            self.config.region_preview_cities,
        );
        documents.extend(document_store::write_article(
            output_dir,
            &DocumentScope::National,
            target_date,
            &national,
        )?);

        for county in &counties {
            let record = match aggregate(&county.name, &members_of(county.cities.iter(), &cache)) {
                Ok(record) => record,
                Err(e) => {
                    self.notifier
                        .notify_error(&format!("Megye kihagyva: {}", county.name), &e)
                        .await;
                    skipped_counties.push(county.name.clone());
                    continue;
                }
            };

            let article = render_county_article(&county.name, target_date, &record);
            documents.extend(document_store::write_article(
                output_dir,
                &DocumentScope::County(county.name.clone()),
                target_date,
                &article,
            )?);
        }

        tracing::info!(
            %run_id,
            documents = documents.len(),
            regions = regions.len(),
            skipped = skipped_counties.len(),
            "Article generation finished"
        );

        Ok(GenerationSummary {
            run_id,
            target_date,
            documents,
            skipped_counties,
        })
    }

    /// Fetch the consensus of every distinct city once
    async fn fetch_all(&self, counties: &[CountyGroup], day: TargetDay) -> ForecastCache {
        let mut cache = ForecastCache::new();

        for place in counties.iter().flat_map(|c| c.cities.iter()) {
            if cache.contains_key(&place.display_name) {
                continue;
            }
            let cached = match self.forecasts.consensus_for(place.coordinates, day).await {
                Ok(consensus) => CachedForecast {
                    consensus,
                    fetched: true,
                },
                Err(e) => {
                    self.notifier
                        .notify_error(&format!("Előrejelzés nem elérhető: {}", place.display_name), &e)
                        .await;
                    CachedForecast {
                        consensus: ConsensusForecast::placeholder(),
                        fetched: false,
                    }
                }
            };
            cache.insert(place.display_name.clone(), cached);
        }

        cache
    }
}

/// Ordered aggregation members, deduplicated by display name
///
/// Placeholders only stand in next to at least one fetched city. A scope
/// where every fetch failed yields no members and fails aggregation.
fn members_of<'a>(
    places: impl Iterator<Item = &'a Place>,
    cache: &ForecastCache,
) -> Vec<(String, ConsensusForecast)> {
    let mut members: Vec<(String, ConsensusForecast)> = Vec::new();
    let mut any_fetched = false;
    for place in places {
        if members.iter().any(|(name, _)| name == &place.display_name) {
            continue;
        }
        if let Some(cached) = cache.get(&place.display_name) {
            any_fetched |= cached.fetched;
            members.push((place.display_name.clone(), cached.consensus.clone()));
        }
    }

    if any_fetched {
        members
    } else {
        Vec::new()
    }
}
