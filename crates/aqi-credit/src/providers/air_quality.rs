use std::future::Future;

use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ClientSetupError, Coordinates};
use crate::pricing::{AqiIndex, Concentrations, CreditCostError, PollutantReading};

/// The nearest reading the upstream feed reported for a position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualitySnapshot {
    /// Position of the reading as echoed by the upstream feed.
    pub coordinates: Coordinates,
    pub reading: PollutantReading,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum AirQualityError {
    #[error("air quality data unavailable for ({latitude}, {longitude})")]
    DataUnavailable { latitude: f64, longitude: f64 },
    /// Never carries the request URL, which holds the API key.
    #[error("air quality request failed: {0}")]
    Http(reqwest::Error),
    #[error("invalid air quality URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("air quality feed returned an unusable reading: {0}")]
    Malformed(#[from] CreditCostError),
}

/// Supplies current pollutant readings for a position.
pub trait AirQualityProvider: Send + Sync {
    fn current(
        &self,
        coordinates: Coordinates,
    ) -> impl Future<Output = Result<AirQualitySnapshot, AirQualityError>> + Send;
}

/// Client for the OpenWeather `air_pollution` endpoint.
#[derive(Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct AirPollutionResponse {
    #[serde(default)]
    coord: Option<CoordDto>,
    #[serde(default)]
    list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct CoordDto {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct AirPollutionEntry {
    main: MainDto,
    components: Concentrations,
    #[serde(default)]
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct MainDto {
    aqi: u8,
}

impl OpenWeatherClient {
    pub fn with_client(
        http: Client,
        base_url: &str,
        api_key: String,
    ) -> Result<Self, ClientSetupError> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            api_key,
        })
    }

    fn pollution_url(&self, coordinates: Coordinates) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join("air_pollution")?;
        url.query_pairs_mut()
            .append_pair("lat", &coordinates.latitude.to_string())
            .append_pair("lon", &coordinates.longitude.to_string())
            .append_pair("appid", &self.api_key);
        Ok(url)
    }
}

impl AirQualityProvider for OpenWeatherClient {
    async fn current(&self, coordinates: Coordinates) -> Result<AirQualitySnapshot, AirQualityError> {
        let url = self.pollution_url(coordinates)?;
        // The URL carries the API key, log the position only.
        debug!(
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            "requesting air quality"
        );

        let response: AirPollutionResponse = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(redact)?
            .json()
            .await
            .map_err(redact)?;

        snapshot_from_response(response, coordinates)
    }
}

fn redact(err: reqwest::Error) -> AirQualityError {
    AirQualityError::Http(err.without_url())
}

fn snapshot_from_response(
    response: AirPollutionResponse,
    requested: Coordinates,
) -> Result<AirQualitySnapshot, AirQualityError> {
    let entry = response
        .list
        .into_iter()
        .next()
        .ok_or(AirQualityError::DataUnavailable {
            latitude: requested.latitude,
            longitude: requested.longitude,
        })?;

    let reading = PollutantReading::new(AqiIndex::new(entry.main.aqi)?, entry.components);
    reading.validate()?;

    let coordinates = response
        .coord
        .and_then(|coord| Coordinates::new(coord.lat, coord.lon).ok())
        .unwrap_or(requested);

    Ok(AirQualitySnapshot {
        coordinates,
        reading,
        observed_at: entry
            .dt
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0)),
    })
}
