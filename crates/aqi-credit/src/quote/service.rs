use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::pricing::{
    AqiCategory, AqiIndex, Concentrations, CreditCostEngine, CreditCostError, PollutantReading,
    PricingPolicy,
};
use crate::providers::{
    AirQualityError, AirQualityProvider, AirQualitySnapshot, CoordinateError, Coordinates,
    LocationResolver, ResolveError,
};

fn default_area_size() -> f64 {
    1.0
}

/// Body of a credit cost request: a place name or an explicit position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default = "default_area_size")]
    pub area_size: f64,
}

impl QuoteRequest {
    pub fn for_location(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            latitude: None,
            longitude: None,
            area_size: default_area_size(),
        }
    }

    pub fn for_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            location: None,
            latitude: Some(latitude),
            longitude: Some(longitude),
            area_size: default_area_size(),
        }
    }

    pub fn with_area_size(mut self, area_size: f64) -> Self {
        self.area_size = area_size;
        self
    }
}

/// Where to look up air quality.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Named(String),
    Position(Coordinates),
}

impl LocationQuery {
    /// A non-blank name wins over coordinates; otherwise both latitude and
    /// longitude are required.
    pub fn from_parts(
        location: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Self, QuoteError> {
        if let Some(name) = location.map(|name| name.trim().to_string()) {
            if !name.is_empty() {
                return Ok(Self::Named(name));
            }
        }

        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => {
                Ok(Self::Position(Coordinates::new(latitude, longitude)?))
            }
            _ => Err(QuoteError::MissingLocation),
        }
    }
}

/// Pollutant readings for a position, as exposed by `/get_aqi`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualityReport {
    pub coordinates: Coordinates,
    pub aqi: AqiIndex,
    pub category: AqiCategory,
    pub components: Concentrations,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

/// Priced credit cost for an area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditQuote {
    /// Base area cost before the pollution adjustment.
    pub original_credit_cost: f64,
    pub credit_cost: f64,
    pub adjusted_area_cost: f64,
    pub area_size: f64,
    pub category: AqiCategory,
    pub coordinates: Coordinates,
    pub pollutants: PollutantReading,
}

/// Error raised while producing a quote or air quality report.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("please provide either a location name or latitude and longitude")]
    MissingLocation,
    #[error(transparent)]
    InvalidCoordinates(#[from] CoordinateError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    AirQuality(#[from] AirQualityError),
    #[error(transparent)]
    Pricing(#[from] CreditCostError),
}

impl QuoteError {
    pub fn kind(&self) -> &'static str {
        match self {
            QuoteError::MissingLocation => "missing_location",
            QuoteError::InvalidCoordinates(_) => "invalid_coordinates",
            QuoteError::Resolve(ResolveError::NotFound(_)) => "location_not_found",
            QuoteError::Resolve(_) => "geocoding_failed",
            QuoteError::AirQuality(AirQualityError::DataUnavailable { .. }) => "data_unavailable",
            QuoteError::AirQuality(_) => "air_quality_failed",
            QuoteError::Pricing(err) => err.kind(),
        }
    }
}

/// Runs resolver -> provider -> engine for a request.
pub struct CreditQuoteService<L, P> {
    resolver: Arc<L>,
    provider: Arc<P>,
    engine: CreditCostEngine,
    policy: PricingPolicy,
}

impl<L, P> CreditQuoteService<L, P>
where
    L: LocationResolver + 'static,
    P: AirQualityProvider + 'static,
{
    pub fn new(resolver: Arc<L>, provider: Arc<P>, policy: PricingPolicy) -> Self {
        Self {
            resolver,
            provider,
            engine: CreditCostEngine::default(),
            policy,
        }
    }

    pub fn with_engine(mut self, engine: CreditCostEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Resolve a query to coordinates, calling the geocoder for names only.
    pub async fn locate(&self, query: &LocationQuery) -> Result<Coordinates, QuoteError> {
        match query {
            LocationQuery::Position(coordinates) => Ok(*coordinates),
            LocationQuery::Named(name) => {
                let resolved = self.resolver.resolve(name).await.map_err(|err| {
                    warn!(location = %name, error = %err, "geocoding failed");
                    err
                })?;
                info!(
                    location = %name,
                    latitude = resolved.coordinates.latitude,
                    longitude = resolved.coordinates.longitude,
                    "resolved location"
                );
                Ok(resolved.coordinates)
            }
        }
    }

    pub async fn air_quality(&self, query: &LocationQuery) -> Result<AirQualityReport, QuoteError> {
        let coordinates = self.locate(query).await?;
        let snapshot = self.fetch(coordinates).await?;
        let reading = snapshot.reading;

        Ok(AirQualityReport {
            coordinates,
            aqi: reading.aqi,
            category: reading.aqi.category(),
            components: reading.concentrations,
            observed_at: snapshot.observed_at,
        })
    }

    pub async fn quote(&self, request: QuoteRequest) -> Result<CreditQuote, QuoteError> {
        let QuoteRequest {
            location,
            latitude,
            longitude,
            area_size,
        } = request;

        // Reject a bad area before spending upstream calls on it.
        let area_cost = self.policy.area_cost(area_size)?;
        let query = LocationQuery::from_parts(location, latitude, longitude)?;
        let coordinates = self.locate(&query).await?;
        let reading = self.fetch(coordinates).await?.reading;

        let result = self
            .engine
            .compute(
                &reading,
                &self.policy.market,
                &self.policy.cost_per_unit,
                area_cost,
            )
            .map_err(|err| {
                warn!(kind = err.kind(), error = %err, "credit cost computation failed");
                err
            })?;

        info!(
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            aqi = reading.aqi.get(),
            credit_cost = result.credit_cost,
            adjusted_area_cost = result.adjusted_area_cost,
            "credit cost quoted"
        );

        Ok(CreditQuote {
            original_credit_cost: area_cost.value(),
            credit_cost: result.credit_cost,
            adjusted_area_cost: result.adjusted_area_cost,
            area_size,
            category: reading.aqi.category(),
            coordinates,
            pollutants: reading,
        })
    }

    async fn fetch(&self, coordinates: Coordinates) -> Result<AirQualitySnapshot, QuoteError> {
        self.provider.current(coordinates).await.map_err(|err| {
            warn!(
                latitude = coordinates.latitude,
                longitude = coordinates.longitude,
                error = %err,
                "air quality lookup failed"
            );
            QuoteError::from(err)
        })
    }
}
