use std::future::Future;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ClientSetupError, Coordinates};

/// A geocoder hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("location not found: {0}")]
    NotFound(String),
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid geocoding URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("geocoder returned malformed coordinates: {0}")]
    Malformed(String),
}

/// Resolves free-text place names to coordinates.
pub trait LocationResolver: Send + Sync {
    fn resolve(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<ResolvedLocation, ResolveError>> + Send;
}

/// Client for the Nominatim `search` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct PlaceDto {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimClient {
    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ClientSetupError> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
        })
    }

    fn search_url(&self, query: &str) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join("search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("limit", "1");
        Ok(url)
    }
}

impl LocationResolver for NominatimClient {
    async fn resolve(&self, query: &str) -> Result<ResolvedLocation, ResolveError> {
        let url = self.search_url(query)?;
        debug!(%url, "geocoding location");

        let places: Vec<PlaceDto> = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        first_place(places, query)
    }
}

fn first_place(places: Vec<PlaceDto>, query: &str) -> Result<ResolvedLocation, ResolveError> {
    let place = places
        .into_iter()
        .next()
        .ok_or_else(|| ResolveError::NotFound(query.to_string()))?;

    let parse = |raw: &str| {
        raw.trim()
            .parse::<f64>()
            .map_err(|_| ResolveError::Malformed(raw.to_string()))
    };
    let latitude = parse(&place.lat)?;
    let longitude = parse(&place.lon)?;
    let coordinates = Coordinates::new(latitude, longitude)
        .map_err(|err| ResolveError::Malformed(err.to_string()))?;

    Ok(ResolvedLocation {
        coordinates,
        display_name: place.display_name,
    })
}
