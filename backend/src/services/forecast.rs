//! Two-source forecast service
//!
//! Applies the caller-side fallback policy around the pure reconciler:
//! - primary source fails: the error is returned, callers decide what to do
//! - secondary source fails: single-source consensus without deltas
//! - both succeed: full consensus with deltas

use std::sync::Arc;

use serde::Serialize;
use shared::{reconcile, reconcile_single, ConsensusForecast, Coordinates, RawForecast, TargetDay};

use crate::external::{ForecastSource, SourceError};
use crate::services::notifier::OperatorNotifier;

/// Both source readings next to the consensus, as served by the API
#[derive(Debug, Clone, Serialize)]
pub struct ForecastComparison {
    pub primary_source: String,
    pub primary: RawForecast,
    pub secondary_source: String,
    pub secondary: Option<RawForecast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_error: Option<String>,
    pub consensus: ConsensusForecast,
}

/// Forecast service combining a primary and a secondary provider
#[derive(Clone)]
pub struct ForecastService {
    primary: Arc<dyn ForecastSource>,
    secondary: Arc<dyn ForecastSource>,
    notifier: OperatorNotifier,
}

impl ForecastService {
    pub fn new(
        primary: Arc<dyn ForecastSource>,
        secondary: Arc<dyn ForecastSource>,
        notifier: OperatorNotifier,
    ) -> Self {
        Self {
            primary,
            secondary,
            notifier,
        }
    }

    /// Provider names, primary first
    pub fn source_names(&self) -> [&str; 2] {
        [self.primary.name(), self.secondary.name()]
    }

    /// Consensus forecast for one location and day
    pub async fn consensus_for(
        &self,
        coords: Coordinates,
        day: TargetDay,
    ) -> Result<ConsensusForecast, SourceError> {
        self.compare(coords, day).await.map(|c| c.consensus)
    }

    /// Fetch both sources and reconcile them
    pub async fn compare(
        &self,
        coords: Coordinates,
        day: TargetDay,
    ) -> Result<ForecastComparison, SourceError> {
        let (primary, secondary) = tokio::join!(
            self.primary.fetch_daily(coords, day),
            self.secondary.fetch_daily(coords, day)
        );

        let primary = primary?;

        let (consensus, secondary, secondary_error) = match secondary {
            Ok(secondary) => (reconcile(&primary, &secondary), Some(secondary), None),
            Err(err) => {
                let context = format!(
                    "{} degraded at lat={} lon={}",
                    self.secondary.name(),
                    coords.latitude,
                    coords.longitude
                );
                match &err {
                    SourceError::Unavailable { .. } => {
                        self.notifier.notify_warning(&context, &err).await
                    }
                    SourceError::Fatal { .. } => self.notifier.notify_error(&context, &err).await,
                }
                (reconcile_single(&primary), None, Some(err.to_string()))
            }
        };

        Ok(ForecastComparison {
            primary_source: self.primary.name().to_string(),
            primary,
            secondary_source: self.secondary.name().to_string(),
            secondary,
            secondary_error,
            consensus,
        })
    }
}
