//! Route domain events.

use chrono::{DateTime, Utc};
use common::{CenterId, RouteId, TrackingCode};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events that can occur on a route aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RouteEvent {
    /// Route was declared between two centers.
    RouteCreated(RouteCreatedData),

    /// Shipment was added to the manifest.
    ShipmentAdded(ManifestChangeData),

    /// Shipment was taken off the manifest.
    ShipmentRemoved(ManifestChangeData),

    /// Waiting shipments left the origin.
    RouteDispatched(RouteDispatchedData),

    /// Route reached its destination (terminal).
    RouteCompleted(RouteCompletedData),
}

impl DomainEvent for RouteEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RouteEvent::RouteCreated(_) => "RouteCreated",
            RouteEvent::ShipmentAdded(_) => "ShipmentAdded",
            RouteEvent::ShipmentRemoved(_) => "ShipmentRemoved",
            RouteEvent::RouteDispatched(_) => "RouteDispatched",
            RouteEvent::RouteCompleted(_) => "RouteCompleted",
        }
    }
}

/// Data for RouteCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteCreatedData {
    pub route_id: RouteId,
    pub origin: CenterId,
    pub destination: CenterId,
    pub created_at: DateTime<Utc>,
}

/// Data for ShipmentAdded and ShipmentRemoved events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestChangeData {
    pub tracking_code: TrackingCode,
}

/// Data for RouteDispatched event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDispatchedData {
    /// Shipments that left the origin with this dispatch.
    pub shipments: Vec<TrackingCode>,
    pub dispatched_at: DateTime<Utc>,
}

/// Data for RouteCompleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteCompletedData {
    /// Shipments delivered to the destination.
    pub delivered: Vec<TrackingCode>,
    pub completed_at: DateTime<Utc>,
}

// Helper constructors
impl RouteEvent {
    pub(crate) fn created(route_id: RouteId, origin: CenterId, destination: CenterId) -> Self {
        RouteEvent::RouteCreated(RouteCreatedData {
            route_id,
            origin,
            destination,
            created_at: Utc::now(),
        })
    }

    pub(crate) fn shipment_added(tracking_code: TrackingCode) -> Self {
        RouteEvent::ShipmentAdded(ManifestChangeData { tracking_code })
    }

    pub(crate) fn shipment_removed(tracking_code: TrackingCode) -> Self {
        RouteEvent::ShipmentRemoved(ManifestChangeData { tracking_code })
    }

    pub(crate) fn dispatched(shipments: Vec<TrackingCode>) -> Self {
        RouteEvent::RouteDispatched(RouteDispatchedData {
            shipments,
            dispatched_at: Utc::now(),
        })
    }

    pub(crate) fn completed(delivered: Vec<TrackingCode>) -> Self {
        RouteEvent::RouteCompleted(RouteCompletedData {
            delivered,
            completed_at: Utc::now(),
        })
    }
}
