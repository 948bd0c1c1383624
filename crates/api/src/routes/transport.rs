//! Transport route endpoints: creation, manifest changes, dispatch and completion.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{
    Aggregate, AssignShipments, AssignmentSummary, CreateRoute, ErrorKind, Route, RouteShipment,
};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use super::{AppState, EventEnvelopeResponse, journal_for};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateRouteRequest {
    pub route_id: String,
    pub origin: String,
    pub destination: String,
}

/// Body of `POST /routes/:id/shipments`: one code or a batch.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum AssignRequest {
    Single { tracking_code: String },
    Batch { tracking_codes: Vec<String> },
}

// -- Response types --

#[derive(Serialize)]
pub struct RouteResponse {
    pub route_id: String,
    pub origin: String,
    pub destination: String,
    pub status: &'static str,
    pub manifest: Vec<String>,
    pub version: i64,
}

impl From<&Route> for RouteResponse {
    fn from(route: &Route) -> Self {
        Self {
            route_id: route.route_id().to_string(),
            origin: route.origin().to_string(),
            destination: route.destination().to_string(),
            status: route.status_label(),
            manifest: route
                .list_manifest()
                .iter()
                .map(ToString::to_string)
                .collect(),
            version: route.version().as_i64(),
        }
    }
}

#[derive(Serialize)]
pub struct AssignmentFailureResponse {
    pub tracking_code: String,
    pub error: String,
    pub kind: ErrorKind,
}

#[derive(Serialize)]
pub struct AssignmentResponse {
    pub route: RouteResponse,
    pub assigned: Vec<String>,
    pub failed: Vec<AssignmentFailureResponse>,
}

impl AssignmentResponse {
    fn new(route: &Route, summary: AssignmentSummary) -> Self {
        Self {
            route: RouteResponse::from(route),
            assigned: summary.assigned,
            failed: summary
                .failed
                .into_iter()
                .map(|f| AssignmentFailureResponse {
                    kind: f.error.kind(),
                    error: f.error.to_string(),
                    tracking_code: f.tracking_code,
                })
                .collect(),
        }
    }
}

// -- Handlers --

/// POST /routes: declare a route between two centers.
#[tracing::instrument(skip(state, req), fields(route_id = %req.route_id))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateRouteRequest>,
) -> Result<(StatusCode, Json<RouteResponse>), ApiError> {
    let _writer = state.write_lock().await;

    let route = state.route_service.create_route(CreateRoute::new(
        req.route_id,
        req.origin,
        req.destination,
    ))?;

    Ok((StatusCode::CREATED, Json(RouteResponse::from(&route))))
}

/// GET /routes: list routes sorted by id, with their status label.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<RouteResponse>> {
    let routes = state.route_service.list_routes();
    Json(routes.iter().map(RouteResponse::from).collect())
}

/// GET /routes/:id
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<RouteResponse>, ApiError> {
    let route = state.route_service.get_route(&id)?;
    Ok(Json(RouteResponse::from(&route)))
}

/// POST /routes/:id/shipments: assign one shipment or a batch.
///
/// A single code fails the request on error. A batch always answers with
/// the per-code outcome, unless the route itself cannot be resolved.
#[tracing::instrument(skip(state, req))]
pub async fn assign<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let _writer = state.write_lock().await;

    let summary = match req {
        AssignRequest::Single { tracking_code } => {
            state
                .route_service
                .assign_shipment_to_route(RouteShipment::new(id.as_str(), tracking_code.as_str()))?;
            let shipment = state.shipment_service.get_shipment(&tracking_code)?;
            AssignmentSummary {
                assigned: vec![shipment.tracking_code().to_string()],
                failed: Vec::new(),
            }
        }
        AssignRequest::Batch { tracking_codes } if tracking_codes.is_empty() => {
            return Err(ApiError::BadRequest("tracking_codes is empty".to_string()));
        }
        AssignRequest::Batch { tracking_codes } => state
            .route_service
            .assign_shipments_to_route(AssignShipments::new(id.as_str(), tracking_codes))?,
    };

    let route = state.route_service.get_route(&id)?;
    Ok(Json(AssignmentResponse::new(&route, summary)))
}

/// DELETE /routes/:id/shipments/:code: take a waiting shipment off the route.
#[tracing::instrument(skip(state))]
pub async fn remove_shipment<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, code)): Path<(String, String)>,
) -> Result<Json<RouteResponse>, ApiError> {
    let _writer = state.write_lock().await;

    let route = state
        .route_service
        .remove_shipment_from_route(RouteShipment::new(id, code))?;

    Ok(Json(RouteResponse::from(&route)))
}

/// POST /routes/:id/dispatch
#[tracing::instrument(skip(state))]
pub async fn dispatch<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<RouteResponse>, ApiError> {
    let _writer = state.write_lock().await;
    let route = state.route_service.dispatch_route(&id)?;
    Ok(Json(RouteResponse::from(&route)))
}

/// POST /routes/:id/complete
#[tracing::instrument(skip(state))]
pub async fn complete<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<RouteResponse>, ApiError> {
    let _writer = state.write_lock().await;
    let route = state.route_service.complete_route(&id)?;
    Ok(Json(RouteResponse::from(&route)))
}

/// GET /routes/:id/events
#[tracing::instrument(skip(state))]
pub async fn events<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EventEnvelopeResponse>>, ApiError> {
    let route = state.route_service.get_route(&id)?;
    let events = journal_for(
        &state.event_store,
        Route::aggregate_type(),
        route.route_id().as_str(),
    )?;
    Ok(Json(events))
}
