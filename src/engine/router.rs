use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::domain::{DealId, LeadId, TenantId};
use crate::gateway::{EntityGateway, GatewayError};

use super::{EngineError, ScoringEngine};

/// Router builder exposing the read-only scoring endpoints. JSON shaping
/// lives here; the engine itself returns plain result records.
pub fn engine_router<G>(engine: Arc<ScoringEngine<G>>) -> Router
where
    G: EntityGateway + 'static,
{
    Router::new()
        .route(
            "/api/v1/tenants/:tenant_id/leads/:lead_id/score",
            get(lead_score_handler::<G>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/leads/:lead_id/recommendations",
            get(recommendations_handler::<G>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/deals/:deal_id/prediction",
            get(deal_prediction_handler::<G>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/forecast",
            get(forecast_handler::<G>),
        )
        .route(
            "/api/v1/tenants/:tenant_id/insights",
            get(insights_handler::<G>),
        )
        .with_state(engine)
}

#[derive(Debug, Deserialize)]
struct RecommendationParams {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ForecastParams {
    months: Option<usize>,
}

const DEFAULT_FORECAST_MONTHS: usize = 3;

async fn lead_score_handler<G>(
    State(engine): State<Arc<ScoringEngine<G>>>,
    Path((tenant_id, lead_id)): Path<(String, String)>,
) -> Response
where
    G: EntityGateway + 'static,
{
    let result = engine.score_lead(&LeadId(lead_id), &TenantId(tenant_id), Utc::now());
    json_response(result)
}

async fn recommendations_handler<G>(
    State(engine): State<Arc<ScoringEngine<G>>>,
    Path((tenant_id, lead_id)): Path<(String, String)>,
    Query(params): Query<RecommendationParams>,
) -> Response
where
    G: EntityGateway + 'static,
{
    let result =
        engine.recommend_properties(&LeadId(lead_id), &TenantId(tenant_id), params.limit);
    json_response(result)
}

async fn deal_prediction_handler<G>(
    State(engine): State<Arc<ScoringEngine<G>>>,
    Path((tenant_id, deal_id)): Path<(String, String)>,
) -> Response
where
    G: EntityGateway + 'static,
{
    let result = engine.predict_deal(&DealId(deal_id), &TenantId(tenant_id), Utc::now());
    json_response(result)
}

async fn forecast_handler<G>(
    State(engine): State<Arc<ScoringEngine<G>>>,
    Path(tenant_id): Path<String>,
    Query(params): Query<ForecastParams>,
) -> Response
where
    G: EntityGateway + 'static,
{
    let months = params.months.unwrap_or(DEFAULT_FORECAST_MONTHS);
    let result = engine.forecast_revenue(
        &TenantId(tenant_id),
        Utc::now().date_naive(),
        months,
    );
    json_response(result)
}

async fn insights_handler<G>(
    State(engine): State<Arc<ScoringEngine<G>>>,
    Path(tenant_id): Path<String>,
) -> Response
where
    G: EntityGateway + 'static,
{
    let result = engine.insights(&TenantId(tenant_id));
    json_response(result)
}

fn json_response<T: serde::Serialize>(result: Result<T, EngineError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, axum::Json(value)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: EngineError) -> Response {
    let status = match &err {
        EngineError::Gateway(GatewayError::NotFound { .. }) => StatusCode::NOT_FOUND,
        EngineError::Gateway(GatewayError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
