//! Upstream collaborators feeding the pricing engine: a geocoder turning place
//! names into coordinates and an air quality feed returning readings.

pub mod air_quality;
pub mod geocoding;

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::UpstreamConfig;

pub use air_quality::{AirQualityError, AirQualityProvider, AirQualitySnapshot, OpenWeatherClient};
pub use geocoding::{LocationResolver, NominatimClient, ResolveError, ResolvedLocation};

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(CoordinateError {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("coordinates ({latitude}, {longitude}) are outside the valid latitude/longitude range")]
pub struct CoordinateError {
    pub latitude: f64,
    pub longitude: f64,
}

/// Raised while building an upstream HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientSetupError {
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unable to build http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("APP_OPENWEATHER_API_KEY must be set to query air quality")]
    MissingApiKey,
}

fn http_client(user_agent: &str, timeout: Duration) -> Result<Client, ClientSetupError> {
    Ok(Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?)
}

/// Builds both production clients from configuration.
pub fn clients_from_config(
    config: &UpstreamConfig,
) -> Result<(NominatimClient, OpenWeatherClient), ClientSetupError> {
    let api_key = config
        .openweather_api_key
        .clone()
        .ok_or(ClientSetupError::MissingApiKey)?;
    let http = http_client(&config.user_agent, config.timeout)?;

    let geocoder = NominatimClient::with_client(http.clone(), &config.geocoder_url)?;
    let air_quality = OpenWeatherClient::with_client(http, &config.air_quality_url, api_key)?;
    Ok((geocoder, air_quality))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_accept_valid_range() {
        let coordinates = Coordinates::new(51.5072, -0.1276).expect("london is valid");
        assert_eq!(coordinates.latitude, 51.5072);
    }

    #[test]
    fn coordinates_reject_out_of_range_values() {
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn clients_require_api_key() {
        let config = UpstreamConfig::default();
        assert!(matches!(
            clients_from_config(&config),
            Err(ClientSetupError::MissingApiKey)
        ));
    }
}
