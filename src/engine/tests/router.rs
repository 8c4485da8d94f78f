use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use tower::ServiceExt;

use super::common::*;
use crate::engine::{engine_router, ScoringEngine};
use crate::gateway::InMemoryGateway;

fn router(gateway: InMemoryGateway) -> axum::Router {
    engine_router(Arc::new(ScoringEngine::new(Arc::new(gateway))))
}

async fn get(router: axum::Router, uri: &str) -> Response {
    router
        .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
        .await
        .expect("router responds")
}

async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[tokio::test]
async fn lead_score_endpoint_returns_the_breakdown() {
    let gateway = InMemoryGateway::new();
    gateway.insert_lead(&tenant(), lead("lead-1"));

    let response = get(
        router(gateway),
        "/api/v1/tenants/acme-estates/leads/lead-1/score",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    assert_eq!(body["total"], 20);
    assert_eq!(body["factors"]["budget"], 10);
    assert_eq!(body["recommendation"], "low - monitor");
}

#[tokio::test]
async fn unknown_lead_maps_to_404() {
    let response = get(
        router(InMemoryGateway::new()),
        "/api/v1/tenants/acme-estates/leads/ghost/score",
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert!(body["error"].as_str().expect("error string").contains("ghost"));
}

#[tokio::test]
async fn zero_limit_maps_to_422() {
    let gateway = InMemoryGateway::new();
    gateway.insert_lead(&tenant(), lead("lead-1"));

    let response = get(
        router(gateway),
        "/api/v1/tenants/acme-estates/leads/lead-1/recommendations?limit=0",
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn insights_endpoint_serves_an_empty_tenant() {
    let response = get(
        router(InMemoryGateway::new()),
        "/api/v1/tenants/acme-estates/insights",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["total_leads"], 0);
    assert_eq!(body["conversion_rate_pct"], 0.0);
}

#[tokio::test]
async fn forecast_endpoint_defaults_to_three_months() {
    let gateway = InMemoryGateway::new();
    gateway.insert_deal(
        &tenant(),
        closed_won("deal-1", 100_000.0, chrono::Utc::now().date_naive()),
    );

    let response = get(
        router(gateway),
        "/api/v1/tenants/acme-estates/forecast",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["projected"].as_array().expect("array").len(), 3);
    assert_eq!(body["monthly_actuals"].as_array().expect("array").len(), 12);
}
