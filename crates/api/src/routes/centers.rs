//! Distribution center endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{Aggregate, Center, MoveShipment, RegisterCenter};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use super::shipments::ShipmentResponse;
use super::{AppState, EventEnvelopeResponse, journal_for};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct RegisterCenterRequest {
    pub center_id: String,
    pub name: String,
    pub location: String,
}

#[derive(Deserialize)]
pub struct MoveShipmentRequest {
    pub tracking_code: String,
}

#[derive(Serialize)]
pub struct CenterResponse {
    pub center_id: String,
    pub name: String,
    pub location: String,
    pub inventory: Vec<String>,
    pub version: i64,
}

impl From<&Center> for CenterResponse {
    fn from(center: &Center) -> Self {
        Self {
            center_id: center.center_id().to_string(),
            name: center.name().to_string(),
            location: center.location().to_string(),
            inventory: center
                .list_inventory()
                .iter()
                .map(ToString::to_string)
                .collect(),
            version: center.version().as_i64(),
        }
    }
}

/// POST /centers: register a distribution center.
#[tracing::instrument(skip(state, req), fields(center_id = %req.center_id))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<RegisterCenterRequest>,
) -> Result<(StatusCode, Json<CenterResponse>), ApiError> {
    let _writer = state.write_lock().await;

    let center = state.center_service.register_center(RegisterCenter::new(
        req.center_id,
        req.name,
        req.location,
    ))?;

    Ok((StatusCode::CREATED, Json(CenterResponse::from(&center))))
}

/// GET /centers: list centers sorted by id.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<CenterResponse>> {
    let centers = state.center_service.list_centers();
    Json(centers.iter().map(CenterResponse::from).collect())
}

/// GET /centers/:id
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CenterResponse>, ApiError> {
    let center = state.center_service.get_center(&id)?;
    Ok(Json(CenterResponse::from(&center)))
}

/// GET /centers/:id/shipments: shipments currently held, in arrival order.
#[tracing::instrument(skip(state))]
pub async fn shipments<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ShipmentResponse>>, ApiError> {
    let shipments = state.center_service.list_shipments_in_center(&id)?;
    Ok(Json(shipments.iter().map(ShipmentResponse::from).collect()))
}

/// POST /centers/:id/receive: take a shipment into the center.
#[tracing::instrument(skip(state, req), fields(tracking_code = %req.tracking_code))]
pub async fn receive<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<MoveShipmentRequest>,
) -> Result<Json<CenterResponse>, ApiError> {
    let _writer = state.write_lock().await;

    let center = state
        .center_service
        .receive_shipment(MoveShipment::new(id, req.tracking_code))?;

    Ok(Json(CenterResponse::from(&center)))
}

/// POST /centers/:id/dispatch: send a held shipment on its way.
#[tracing::instrument(skip(state, req), fields(tracking_code = %req.tracking_code))]
pub async fn dispatch<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<MoveShipmentRequest>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let _writer = state.write_lock().await;

    let shipment = state
        .center_service
        .dispatch_shipment(MoveShipment::new(id, req.tracking_code))?;

    Ok(Json(ShipmentResponse::from(&shipment)))
}

/// GET /centers/:id/events
#[tracing::instrument(skip(state))]
pub async fn events<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EventEnvelopeResponse>>, ApiError> {
    let center = state.center_service.get_center(&id)?;
    let events = journal_for(
        &state.event_store,
        Center::aggregate_type(),
        center.center_id().as_str(),
    )?;
    Ok(Json(events))
}
