use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::service::{CreditQuoteService, LocationQuery, QuoteError, QuoteRequest};
use crate::providers::{AirQualityError, AirQualityProvider, LocationResolver, ResolveError};

/// Query string of `GET /get_aqi`.
#[derive(Debug, Default, Deserialize)]
pub struct AirQualityParams {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Router exposing the air quality lookup and credit cost endpoints.
pub fn quote_router<L, P>(service: Arc<CreditQuoteService<L, P>>) -> Router
where
    L: LocationResolver + 'static,
    P: AirQualityProvider + 'static,
{
    Router::new()
        .route("/calculate_cost", post(calculate_cost_handler::<L, P>))
        .route("/get_aqi", get(air_quality_handler::<L, P>))
        .with_state(service)
}

pub(crate) async fn calculate_cost_handler<L, P>(
    State(service): State<Arc<CreditQuoteService<L, P>>>,
    payload: Result<axum::Json<QuoteRequest>, JsonRejection>,
) -> Response
where
    L: LocationResolver + 'static,
    P: AirQualityProvider + 'static,
{
    let request = match payload {
        Ok(axum::Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.quote(request).await {
        Ok(quote) => (StatusCode::OK, axum::Json(quote)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn air_quality_handler<L, P>(
    State(service): State<Arc<CreditQuoteService<L, P>>>,
    Query(params): Query<AirQualityParams>,
) -> Response
where
    L: LocationResolver + 'static,
    P: AirQualityProvider + 'static,
{
    let query = match LocationQuery::from_parts(params.location, params.lat, params.lon) {
        Ok(query) => query,
        Err(error) => return error_response(error),
    };

    match service.air_quality(&query).await {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn status_for(error: &QuoteError) -> StatusCode {
    match error {
        QuoteError::MissingLocation | QuoteError::InvalidCoordinates(_) => StatusCode::BAD_REQUEST,
        QuoteError::Resolve(ResolveError::NotFound(_)) => StatusCode::NOT_FOUND,
        QuoteError::AirQuality(AirQualityError::DataUnavailable { .. }) => StatusCode::NOT_FOUND,
        QuoteError::Resolve(_) | QuoteError::AirQuality(_) => StatusCode::BAD_GATEWAY,
        QuoteError::Pricing(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn rejection_response(rejection: JsonRejection) -> Response {
    let kind = match &rejection {
        JsonRejection::MissingJsonContentType(_) => "unsupported_media_type",
        _ => "invalid_request_body",
    };
    let payload = json!({
        "error": rejection.body_text(),
        "kind": kind,
    });
    (rejection.status(), axum::Json(payload)).into_response()
}

fn error_response(error: QuoteError) -> Response {
    let payload = json!({
        "error": error.to_string(),
        "kind": error.kind(),
    });
    (status_for(&error), axum::Json(payload)).into_response()
}
