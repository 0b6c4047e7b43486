use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::pricing::{AqiIndex, Concentrations, PollutantReading, PricingPolicy};
use crate::providers::{
    AirQualityError, AirQualityProvider, AirQualitySnapshot, Coordinates, LocationResolver,
    ResolveError, ResolvedLocation,
};
use crate::quote::service::CreditQuoteService;

pub(super) fn sample_reading() -> PollutantReading {
    PollutantReading::new(
        AqiIndex::new(2).expect("valid aqi"),
        Concentrations {
            co: 300.0,
            no: 2.0,
            no2: 5.0,
            o3: 40.0,
            so2: 3.0,
            pm2_5: 12.0,
            pm10: 18.0,
            nh3: 2.0,
        },
    )
}

pub(super) fn zero_reading() -> PollutantReading {
    PollutantReading::new(AqiIndex::new(0).expect("valid aqi"), Concentrations::default())
}

pub(super) fn delhi() -> Coordinates {
    Coordinates::new(28.6139, 77.209).expect("valid coordinates")
}

#[derive(Default)]
pub(super) struct MemoryResolver {
    places: HashMap<String, Coordinates>,
    queries: Mutex<Vec<String>>,
}

impl MemoryResolver {
    pub(super) fn with_place(mut self, name: &str, coordinates: Coordinates) -> Self {
        self.places.insert(name.to_ascii_lowercase(), coordinates);
        self
    }

    pub(super) fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("resolver mutex poisoned").clone()
    }
}

impl LocationResolver for MemoryResolver {
    async fn resolve(&self, query: &str) -> Result<ResolvedLocation, ResolveError> {
        self.queries
            .lock()
            .expect("resolver mutex poisoned")
            .push(query.to_string());

        self.places
            .get(&query.to_ascii_lowercase())
            .map(|coordinates| ResolvedLocation {
                coordinates: *coordinates,
                display_name: Some(query.to_string()),
            })
            .ok_or_else(|| ResolveError::NotFound(query.to_string()))
    }
}

/// Returns the same reading for every position, or nothing at all.
pub(super) struct StaticProvider {
    reading: Option<PollutantReading>,
    requests: Mutex<Vec<Coordinates>>,
}

impl StaticProvider {
    pub(super) fn returning(reading: PollutantReading) -> Self {
        Self {
            reading: Some(reading),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn empty() -> Self {
        Self {
            reading: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn requests(&self) -> Vec<Coordinates> {
        self.requests.lock().expect("provider mutex poisoned").clone()
    }
}

impl AirQualityProvider for StaticProvider {
    async fn current(&self, coordinates: Coordinates) -> Result<AirQualitySnapshot, AirQualityError> {
        self.requests
            .lock()
            .expect("provider mutex poisoned")
            .push(coordinates);

        match self.reading {
            Some(reading) => Ok(AirQualitySnapshot {
                coordinates,
                reading,
                observed_at: None,
            }),
            None => Err(AirQualityError::DataUnavailable {
                latitude: coordinates.latitude,
                longitude: coordinates.longitude,
            }),
        }
    }
}

pub(super) fn build_service(
    provider: StaticProvider,
) -> (
    Arc<CreditQuoteService<MemoryResolver, StaticProvider>>,
    Arc<MemoryResolver>,
    Arc<StaticProvider>,
) {
    let resolver = Arc::new(MemoryResolver::default().with_place("New Delhi", delhi()));
    let provider = Arc::new(provider);
    let service = Arc::new(CreditQuoteService::new(
        resolver.clone(),
        provider.clone(),
        PricingPolicy::standard(),
    ));
    (service, resolver, provider)
}

pub(super) async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("valid json body")
}
