//! Shipment registration, status and priority endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{Aggregate, RegisterShipment, Shipment, UpdateShipmentStatus};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use super::{AppState, EventEnvelopeResponse, journal_for};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterShipmentRequest {
    pub tracking_code: String,
    pub sender: String,
    pub recipient: String,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default = "default_kind")]
    pub kind: String,
}

fn default_priority() -> i64 {
    1
}

fn default_kind() -> String {
    "STANDARD".to_string()
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct ShipmentResponse {
    pub tracking_code: String,
    pub sender: String,
    pub recipient: String,
    pub kind: String,
    pub priority: u8,
    pub status: String,
    pub status_history: Vec<String>,
    pub assigned_route: Option<String>,
    pub version: i64,
}

impl From<&Shipment> for ShipmentResponse {
    fn from(shipment: &Shipment) -> Self {
        Self {
            tracking_code: shipment.tracking_code().to_string(),
            sender: shipment.sender().to_string(),
            recipient: shipment.recipient().to_string(),
            kind: shipment.kind().to_string(),
            priority: shipment.priority(),
            status: shipment.status().to_string(),
            status_history: shipment
                .status_history()
                .iter()
                .map(ToString::to_string)
                .collect(),
            assigned_route: shipment.assigned_route().map(ToString::to_string),
            version: shipment.version().as_i64(),
        }
    }
}

// -- Handlers --

/// POST /shipments: register a new shipment.
#[tracing::instrument(skip(state, req), fields(tracking_code = %req.tracking_code))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<RegisterShipmentRequest>,
) -> Result<(StatusCode, Json<ShipmentResponse>), ApiError> {
    let _writer = state.write_lock().await;

    let shipment = state.shipment_service.register_shipment(RegisterShipment::new(
        req.tracking_code,
        req.sender,
        req.recipient,
        req.priority,
        req.kind,
    ))?;

    Ok((StatusCode::CREATED, Json(ShipmentResponse::from(&shipment))))
}

/// GET /shipments: list every shipment.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<ShipmentResponse>> {
    let shipments = state.shipment_service.list_shipments();
    Json(shipments.iter().map(ShipmentResponse::from).collect())
}

/// GET /shipments/:code: get a single shipment.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(code): Path<String>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let shipment = state.shipment_service.get_shipment(&code)?;
    Ok(Json(ShipmentResponse::from(&shipment)))
}

/// POST /shipments/:code/status: move a shipment to a new status.
#[tracing::instrument(skip(state, req), fields(status = %req.status))]
pub async fn update_status<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(code): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let _writer = state.write_lock().await;

    let shipment = state
        .shipment_service
        .update_shipment_status(UpdateShipmentStatus::new(code, req.status))?;

    Ok(Json(ShipmentResponse::from(&shipment)))
}

/// POST /shipments/:code/priority/increase
#[tracing::instrument(skip(state))]
pub async fn increase_priority<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(code): Path<String>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let _writer = state.write_lock().await;
    let shipment = state.shipment_service.increase_priority(&code)?;
    Ok(Json(ShipmentResponse::from(&shipment)))
}

/// POST /shipments/:code/priority/decrease
#[tracing::instrument(skip(state))]
pub async fn decrease_priority<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(code): Path<String>,
) -> Result<Json<ShipmentResponse>, ApiError> {
    let _writer = state.write_lock().await;
    let shipment = state.shipment_service.decrease_priority(&code)?;
    Ok(Json(ShipmentResponse::from(&shipment)))
}

/// GET /shipments/:code/events: journal entries for a shipment.
#[tracing::instrument(skip(state))]
pub async fn events<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(code): Path<String>,
) -> Result<Json<Vec<EventEnvelopeResponse>>, ApiError> {
    let shipment = state.shipment_service.get_shipment(&code)?;
    let events = journal_for(
        &state.event_store,
        Shipment::aggregate_type(),
        shipment.tracking_code().as_str(),
    )?;
    Ok(Json(events))
}
