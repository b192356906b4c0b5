use crate::infra::{AppState, InMemoryTripRepository};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use nemt_dispatch::workflows::dispatch::{dispatch_router, DispatchService};
use nemt_dispatch::workflows::fulfillment::{
    calculate_mileage, Address, CompatibilityAssessment, FulfillmentOption, MobilityType,
    OptionBoard, OptionRanker, RankingConfig, TripConstraints,
};
use nemt_dispatch::workflows::pricing::{mock_pricing_result, PricingResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct RankRequest {
    pub(crate) constraints: TripConstraints,
    pub(crate) options: Vec<FulfillmentOption>,
    #[serde(default)]
    pub(crate) weights: Option<RankingConfig>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankResponse {
    pub(crate) weights: RankingConfig,
    pub(crate) board: OptionBoard,
    pub(crate) assessments: Vec<CompatibilityAssessment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PricingRequest {
    pub(crate) level_of_service: MobilityType,
    #[serde(default)]
    pub(crate) miles: Option<f64>,
    #[serde(default)]
    pub(crate) pickup: Option<Address>,
    #[serde(default)]
    pub(crate) dropoff: Option<Address>,
}

pub(crate) fn with_dispatch_routes(
    service: Arc<DispatchService<InMemoryTripRepository>>,
) -> axum::Router {
    dispatch_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/options/rank", axum::routing::post(rank_endpoint))
        .route(
            "/api/v1/pricing/suggest",
            axum::routing::post(pricing_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Ranks an ad-hoc option list without posting a trip. Request weights override the
/// configured defaults.
pub(crate) async fn rank_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RankRequest>,
) -> Response {
    let RankRequest {
        constraints,
        options,
        weights,
    } = payload;

    let weights = weights.unwrap_or(state.ranking);
    if !weights.is_valid() {
        return bad_request("ranking weights must be finite, non-negative, and not both zero");
    }

    (StatusCode::OK, Json(rank_options(&constraints, &options, weights))).into_response()
}

pub(crate) async fn pricing_endpoint(Json(payload): Json<PricingRequest>) -> Response {
    let miles = match (&payload.miles, &payload.pickup, &payload.dropoff) {
        (Some(miles), _, _) => *miles,
        (None, Some(pickup), Some(dropoff)) => {
            if !pickup.location.is_valid() || !dropoff.location.is_valid() {
                return bad_request("pickup and dropoff must have valid coordinates");
            }
            calculate_mileage(pickup, dropoff)
        }
        _ => return bad_request("provide miles or both pickup and dropoff"),
    };

    let result: PricingResult = mock_pricing_result(miles, payload.level_of_service);
    (StatusCode::OK, Json(result)).into_response()
}

pub(crate) fn rank_options(
    constraints: &TripConstraints,
    options: &[FulfillmentOption],
    weights: RankingConfig,
) -> RankResponse {
    let ranker = OptionRanker::new(weights);
    let board = ranker.board(options, constraints);
    let assessments = options
        .iter()
        .map(|option| ranker.assess(option, constraints))
        .collect();

    RankResponse {
        weights,
        board,
        assessments,
    }
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}
