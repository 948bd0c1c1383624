//! HTTP handlers and the state they share.

pub mod centers;
pub mod health;
pub mod metrics;
pub mod shipments;
pub mod transport;

use domain::{
    Center, CenterService, InMemoryRepository, Route, RouteService, Shipment, ShipmentService,
};
use event_store::{EventEnvelope, EventStore};
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

pub type ShipmentRepo = InMemoryRepository<Shipment>;
pub type CenterRepo = InMemoryRepository<Center>;
pub type RouteRepo = InMemoryRepository<Route>;

/// Shared application state accessible from all handlers.
///
/// The three services share the same repositories and journal. Mutating
/// handlers take `writer` for the whole operation so that only one command
/// runs at a time.
pub struct AppState<S: EventStore> {
    pub shipment_service: ShipmentService<ShipmentRepo, CenterRepo, S>,
    pub center_service: CenterService<CenterRepo, ShipmentRepo, S>,
    pub route_service: RouteService<RouteRepo, CenterRepo, ShipmentRepo, S>,
    pub event_store: S,
    writer: Mutex<()>,
}

impl<S: EventStore + Clone> AppState<S> {
    /// Wires empty repositories and the given journal into the services.
    pub fn new(event_store: S) -> Self {
        let shipments = ShipmentRepo::new();
        let centers = CenterRepo::new();
        let routes = RouteRepo::new();

        Self {
            shipment_service: ShipmentService::new(
                shipments.clone(),
                centers.clone(),
                event_store.clone(),
            ),
            center_service: CenterService::new(
                centers.clone(),
                shipments.clone(),
                event_store.clone(),
            ),
            route_service: RouteService::new(routes, centers, shipments, event_store.clone()),
            event_store,
            writer: Mutex::new(()),
        }
    }

    /// Waits for exclusive write access.
    pub async fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }
}

/// Response type for event envelope data.
#[derive(Serialize)]
pub struct EventEnvelopeResponse {
    pub event_id: String,
    pub event_type: String,
    pub aggregate_id: String,
    pub version: i64,
    pub timestamp: String,
    pub payload: serde_json::Value,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl From<EventEnvelope> for EventEnvelopeResponse {
    fn from(e: EventEnvelope) -> Self {
        Self {
            event_id: e.event_id.to_string(),
            event_type: e.event_type,
            aggregate_id: e.aggregate_id,
            version: e.version.as_i64(),
            timestamp: e.timestamp.to_rfc3339(),
            payload: e.payload,
            metadata: e.metadata.into_iter().collect(),
        }
    }
}

pub(crate) fn journal_for<S: EventStore>(
    event_store: &S,
    aggregate_type: &str,
    aggregate_id: &str,
) -> Result<Vec<EventEnvelopeResponse>, crate::error::ApiError> {
    let envelopes = event_store.get_events_for_aggregate(aggregate_type, aggregate_id)?;
    Ok(envelopes.into_iter().map(EventEnvelopeResponse::from).collect())
}
