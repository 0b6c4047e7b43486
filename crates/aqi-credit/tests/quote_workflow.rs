//! End-to-end scenarios through the public service facade and HTTP router,
//! with in-memory stand-ins for the geocoder and the air quality feed.

use std::sync::Arc;

use aqi_credit::pricing::{AqiIndex, Concentrations, PollutantReading, PricingPolicy};
use aqi_credit::providers::{
    AirQualityError, AirQualityProvider, AirQualitySnapshot, Coordinates, LocationResolver,
    ResolveError, ResolvedLocation,
};
use aqi_credit::quote::{quote_router, CreditQuoteService, QuoteError, QuoteRequest};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

struct SingleCity;

impl LocationResolver for SingleCity {
    async fn resolve(&self, query: &str) -> Result<ResolvedLocation, ResolveError> {
        if query.eq_ignore_ascii_case("lucknow") {
            Ok(ResolvedLocation {
                coordinates: Coordinates::new(26.8467, 80.9462).expect("valid"),
                display_name: Some("Lucknow, Uttar Pradesh, India".to_string()),
            })
        } else {
            Err(ResolveError::NotFound(query.to_string()))
        }
    }
}

struct SmoggyFeed;

impl AirQualityProvider for SmoggyFeed {
    async fn current(&self, coordinates: Coordinates) -> Result<AirQualitySnapshot, AirQualityError> {
        Ok(AirQualitySnapshot {
            coordinates,
            reading: PollutantReading::new(
                AqiIndex::new(5).expect("valid aqi"),
                Concentrations {
                    co: 1628.96,
                    no: 12.07,
                    no2: 49.35,
                    o3: 1.21,
                    so2: 25.03,
                    pm2_5: 216.54,
                    pm10: 271.86,
                    nh3: 21.28,
                },
            ),
            observed_at: None,
        })
    }
}

fn service() -> Arc<CreditQuoteService<SingleCity, SmoggyFeed>> {
    Arc::new(CreditQuoteService::new(
        Arc::new(SingleCity),
        Arc::new(SmoggyFeed),
        PricingPolicy::standard(),
    ))
}

#[tokio::test]
async fn quotes_scale_with_area_size() {
    let service = service();

    let one = service
        .quote(QuoteRequest::for_location("Lucknow"))
        .await
        .expect("quote succeeds");
    let four = service
        .quote(QuoteRequest::for_location("Lucknow").with_area_size(4.0))
        .await
        .expect("quote succeeds");

    assert_eq!(one.credit_cost, four.credit_cost);
    assert_eq!(four.original_credit_cost, 4.0 * one.original_credit_cost);
    let one_delta = one.adjusted_area_cost - one.original_credit_cost;
    let four_delta = four.adjusted_area_cost - four.original_credit_cost;
    assert!((four_delta - 4.0 * one_delta).abs() < 1e-6);
}

#[tokio::test]
async fn readings_above_reference_maxima_are_not_clamped() {
    let quote = service()
        .quote(QuoteRequest::for_location("lucknow"))
        .await
        .expect("quote succeeds");

    assert_eq!(quote.category.label(), "hazardous");
    assert!(quote.credit_cost.is_finite());
    assert!(quote.credit_cost > 0.0);
}

#[tokio::test]
async fn unknown_city_is_a_distinct_error() {
    match service().quote(QuoteRequest::for_location("Gotham")).await {
        Err(QuoteError::Resolve(ResolveError::NotFound(_))) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn http_quote_round_trip() {
    let response = quote_router(service())
        .oneshot(
            Request::post("/calculate_cost")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "location": "Lucknow", "area_size": 2.5 }).to_string(),
                ))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let body: Value = serde_json::from_slice(&body).expect("json body");

    assert_eq!(body["original_credit_cost"], json!(250.0));
    assert_eq!(body["area_size"], json!(2.5));
    assert_eq!(body["coordinates"]["latitude"], json!(26.8467));
    for key in ["aqi", "co", "no", "no2", "o3", "so2", "pm2_5", "pm10", "nh3"] {
        assert!(body["pollutants"].get(key).is_some(), "missing {key}");
    }
}
