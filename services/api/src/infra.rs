use aqi_credit::config::AppConfig;
use aqi_credit::error::AppError;
use aqi_credit::providers::{clients_from_config, NominatimClient, OpenWeatherClient};
use aqi_credit::quote::CreditQuoteService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type LiveQuoteService = CreditQuoteService<NominatimClient, OpenWeatherClient>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wire the production geocoder and air quality clients into a quote service.
pub(crate) fn build_service(config: &AppConfig) -> Result<Arc<LiveQuoteService>, AppError> {
    let (geocoder, air_quality) = clients_from_config(&config.upstream)?;
    Ok(Arc::new(CreditQuoteService::new(
        Arc::new(geocoder),
        Arc::new(air_quality),
        config.pricing.clone(),
    )))
}
