//! Shipment domain events.

use chrono::{DateTime, Utc};
use common::{RouteId, TrackingCode};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{ShipmentKind, ShipmentStatus};

/// Events that can occur on a shipment aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ShipmentEvent {
    /// Shipment was registered.
    ShipmentRegistered(ShipmentRegisteredData),

    /// Shipment status advanced.
    StatusChanged(StatusChangedData),

    /// Shipment priority was raised or lowered.
    PriorityChanged(PriorityChangedData),

    /// Shipment was placed on a route.
    RouteAssigned(RouteAssignedData),

    /// Shipment was taken off its route.
    RouteRemoved(RouteRemovedData),
}

impl DomainEvent for ShipmentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ShipmentEvent::ShipmentRegistered(_) => "ShipmentRegistered",
            ShipmentEvent::StatusChanged(_) => "StatusChanged",
            ShipmentEvent::PriorityChanged(_) => "PriorityChanged",
            ShipmentEvent::RouteAssigned(_) => "RouteAssigned",
            ShipmentEvent::RouteRemoved(_) => "RouteRemoved",
        }
    }
}

/// Data for ShipmentRegistered event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRegisteredData {
    pub tracking_code: TrackingCode,
    pub sender: String,
    pub recipient: String,
    pub kind: ShipmentKind,
    pub priority: u8,
    pub registered_at: DateTime<Utc>,
}

/// Data for StatusChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangedData {
    pub from: ShipmentStatus,
    pub to: ShipmentStatus,
    pub changed_at: DateTime<Utc>,
}

/// Data for PriorityChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityChangedData {
    pub from: u8,
    pub to: u8,
}

/// Data for RouteAssigned event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteAssignedData {
    pub route_id: RouteId,
}

/// Data for RouteRemoved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRemovedData {
    pub route_id: RouteId,
}

// Helper constructors
impl ShipmentEvent {
    pub(crate) fn registered(
        tracking_code: TrackingCode,
        sender: String,
        recipient: String,
        kind: ShipmentKind,
        priority: u8,
    ) -> Self {
        ShipmentEvent::ShipmentRegistered(ShipmentRegisteredData {
            tracking_code,
            sender,
            recipient,
            kind,
            priority,
            registered_at: Utc::now(),
        })
    }

    pub(crate) fn status_changed(from: ShipmentStatus, to: ShipmentStatus) -> Self {
        ShipmentEvent::StatusChanged(StatusChangedData {
            from,
            to,
            changed_at: Utc::now(),
        })
    }

    pub(crate) fn priority_changed(from: u8, to: u8) -> Self {
        ShipmentEvent::PriorityChanged(PriorityChangedData { from, to })
    }

    pub(crate) fn route_assigned(route_id: RouteId) -> Self {
        ShipmentEvent::RouteAssigned(RouteAssignedData { route_id })
    }

    pub(crate) fn route_removed(route_id: RouteId) -> Self {
        ShipmentEvent::RouteRemoved(RouteRemovedData { route_id })
    }
}
