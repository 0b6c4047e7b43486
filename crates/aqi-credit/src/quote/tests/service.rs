use super::common::*;
use crate::pricing::{AqiCategory, CreditCostError, PricingPolicy};
use crate::providers::{AirQualityError, ResolveError};
use crate::quote::service::{CreditQuoteService, LocationQuery, QuoteError, QuoteRequest};
use std::sync::Arc;

#[tokio::test]
async fn quote_by_name_resolves_then_prices() {
    let (service, resolver, provider) = build_service(StaticProvider::returning(sample_reading()));

    let quote = service
        .quote(QuoteRequest::for_location("New Delhi"))
        .await
        .expect("quote succeeds");

    assert_eq!(resolver.queries(), vec!["New Delhi".to_string()]);
    assert_eq!(provider.requests(), vec![delhi()]);
    assert_eq!(quote.coordinates, delhi());
    assert_eq!(quote.original_credit_cost, 100.0);
    assert_eq!(quote.category, AqiCategory::UnhealthySensitive);
    assert!((quote.credit_cost - 7_099_066.182_880_003).abs() < 1e-6);
    assert!((quote.adjusted_area_cost - 107.099_066_182_880_01).abs() < 1e-9);
}

#[tokio::test]
async fn quote_by_coordinates_skips_geocoder() {
    let (service, resolver, provider) = build_service(StaticProvider::returning(sample_reading()));

    let quote = service
        .quote(QuoteRequest::for_coordinates(10.0, 20.0).with_area_size(2.0))
        .await
        .expect("quote succeeds");

    assert!(resolver.queries().is_empty());
    assert_eq!(provider.requests().len(), 1);
    assert_eq!(quote.original_credit_cost, 200.0);
    assert_eq!(quote.area_size, 2.0);
}

#[tokio::test]
async fn blank_location_falls_back_to_coordinates() {
    let query = LocationQuery::from_parts(Some("   ".to_string()), Some(1.0), Some(2.0))
        .expect("coordinates used");
    assert!(matches!(query, LocationQuery::Position(_)));

    match LocationQuery::from_parts(Some(String::new()), Some(1.0), None) {
        Err(QuoteError::MissingLocation) => {}
        other => panic!("expected missing location, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_location_propagates_not_found() {
    let (service, _, provider) = build_service(StaticProvider::returning(sample_reading()));

    match service.quote(QuoteRequest::for_location("Atlantis")).await {
        Err(QuoteError::Resolve(ResolveError::NotFound(name))) => assert_eq!(name, "Atlantis"),
        other => panic!("expected location not found, got {other:?}"),
    }
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn empty_feed_propagates_data_unavailable() {
    let (service, _, _) = build_service(StaticProvider::empty());

    match service.quote(QuoteRequest::for_coordinates(1.0, 1.0)).await {
        Err(QuoteError::AirQuality(AirQualityError::DataUnavailable { .. })) => {}
        other => panic!("expected data unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn zero_readings_surface_weight_profile_error() {
    let (service, _, _) = build_service(StaticProvider::returning(zero_reading()));

    match service.quote(QuoteRequest::for_coordinates(1.0, 1.0)).await {
        Err(QuoteError::Pricing(CreditCostError::InvalidWeightProfile)) => {}
        other => panic!("expected invalid weight profile, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_area_is_rejected_before_upstream_calls() {
    let (service, resolver, provider) = build_service(StaticProvider::returning(sample_reading()));

    match service
        .quote(QuoteRequest::for_location("New Delhi").with_area_size(0.0))
        .await
    {
        Err(QuoteError::Pricing(CreditCostError::InvalidAreaCost { .. })) => {}
        other => panic!("expected invalid area cost, got {other:?}"),
    }
    assert!(resolver.queries().is_empty());
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn misconfigured_policy_surfaces_market_error() {
    let mut policy = PricingPolicy::standard();
    policy.market.supply = 0.0;
    let service = CreditQuoteService::new(
        Arc::new(MemoryResolver::default()),
        Arc::new(StaticProvider::returning(sample_reading())),
        policy,
    );

    let error = service
        .quote(QuoteRequest::for_coordinates(1.0, 1.0))
        .await
        .expect_err("zero supply fails");
    assert_eq!(error.kind(), "invalid_market_parameters");
}

#[tokio::test]
async fn air_quality_report_carries_category_and_components() {
    let (service, _, _) = build_service(StaticProvider::returning(sample_reading()));

    let report = service
        .air_quality(&LocationQuery::Named("new delhi".to_string()))
        .await
        .expect("report builds");

    assert_eq!(report.coordinates, delhi());
    assert_eq!(report.aqi.get(), 2);
    assert_eq!(report.category.label(), "unhealthy_sensitive");
    assert_eq!(report.components.co, 300.0);
}
