use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{TripId, TripRequest};
use super::repository::{RepositoryError, TripRepository};
use super::service::{DispatchError, DispatchService};
use crate::workflows::fulfillment::{FulfillmentOption, OptionId};

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentRequest {
    pub(crate) option_id: OptionId,
}

/// Router builder exposing trip posting, option boards, and assignment.
pub fn dispatch_router<R>(service: Arc<DispatchService<R>>) -> Router
where
    R: TripRepository + 'static,
{
    Router::new()
        .route("/api/v1/trips", post(post_trip_handler::<R>))
        .route("/api/v1/trips/:trip_id", get(trip_handler::<R>))
        .route(
            "/api/v1/trips/:trip_id/options",
            get(board_handler::<R>).put(record_options_handler::<R>),
        )
        .route(
            "/api/v1/trips/:trip_id/assignment",
            post(assign_handler::<R>),
        )
        .route("/api/v1/trips/:trip_id/cancel", post(cancel_handler::<R>))
        .with_state(service)
}

pub(crate) async fn post_trip_handler<R>(
    State(service): State<Arc<DispatchService<R>>>,
    axum::Json(request): axum::Json<TripRequest>,
) -> Response
where
    R: TripRepository + 'static,
{
    match service.post_trip(request) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn trip_handler<R>(
    State(service): State<Arc<DispatchService<R>>>,
    Path(trip_id): Path<String>,
) -> Response
where
    R: TripRepository + 'static,
{
    match service.get(&TripId(trip_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_options_handler<R>(
    State(service): State<Arc<DispatchService<R>>>,
    Path(trip_id): Path<String>,
    axum::Json(options): axum::Json<Vec<FulfillmentOption>>,
) -> Response
where
    R: TripRepository + 'static,
{
    match service.record_options(&TripId(trip_id), options) {
        Ok(board) => (StatusCode::OK, axum::Json(board)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn board_handler<R>(
    State(service): State<Arc<DispatchService<R>>>,
    Path(trip_id): Path<String>,
) -> Response
where
    R: TripRepository + 'static,
{
    match service.board(&TripId(trip_id)) {
        Ok(board) => (StatusCode::OK, axum::Json(board)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assign_handler<R>(
    State(service): State<Arc<DispatchService<R>>>,
    Path(trip_id): Path<String>,
    axum::Json(request): axum::Json<AssignmentRequest>,
) -> Response
where
    R: TripRepository + 'static,
{
    match service.assign(&TripId(trip_id), &request.option_id) {
        Ok(assignment) => (StatusCode::OK, axum::Json(assignment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_handler<R>(
    State(service): State<Arc<DispatchService<R>>>,
    Path(trip_id): Path<String>,
) -> Response
where
    R: TripRepository + 'static,
{
    match service.cancel(&TripId(trip_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: DispatchError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (status_for(&error), axum::Json(payload)).into_response()
}

pub(crate) fn status_for(error: &DispatchError) -> StatusCode {
    match error {
        DispatchError::TripNotFound(_) | DispatchError::Repository(RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        DispatchError::InvalidTransition { .. }
        | DispatchError::Repository(RepositoryError::Conflict)
        | DispatchError::Repository(RepositoryError::StaleRevision { .. }) => StatusCode::CONFLICT,
        DispatchError::InvalidLocation { .. }
        | DispatchError::InvalidCost { .. }
        | DispatchError::DuplicateOption(_)
        | DispatchError::UnknownOption { .. }
        | DispatchError::IncompatibleOption { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DispatchError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
