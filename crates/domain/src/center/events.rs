//! Center domain events.

use chrono::{DateTime, Utc};
use common::{CenterId, TrackingCode};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events that can occur on a center aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CenterEvent {
    /// Center was registered.
    CenterRegistered(CenterRegisteredData),

    /// A shipment arrived and was added to the inventory.
    ShipmentReceived(InventoryChangeData),

    /// A shipment left in transit.
    ShipmentDispatched(InventoryChangeData),

    /// A waiting shipment was taken off its route and left the inventory
    /// without travelling.
    ShipmentReleased(InventoryChangeData),
}

impl DomainEvent for CenterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CenterEvent::CenterRegistered(_) => "CenterRegistered",
            CenterEvent::ShipmentReceived(_) => "ShipmentReceived",
            CenterEvent::ShipmentDispatched(_) => "ShipmentDispatched",
            CenterEvent::ShipmentReleased(_) => "ShipmentReleased",
        }
    }
}

/// Data for CenterRegistered event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CenterRegisteredData {
    pub center_id: CenterId,
    pub name: String,
    pub location: String,
    pub registered_at: DateTime<Utc>,
}

/// Data for the inventory events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryChangeData {
    pub tracking_code: TrackingCode,
    pub at: DateTime<Utc>,
}

impl InventoryChangeData {
    fn now(tracking_code: TrackingCode) -> Self {
        Self {
            tracking_code,
            at: Utc::now(),
        }
    }
}

// Helper constructors
impl CenterEvent {
    pub(crate) fn registered(center_id: CenterId, name: String, location: String) -> Self {
        CenterEvent::CenterRegistered(CenterRegisteredData {
            center_id,
            name,
            location,
            registered_at: Utc::now(),
        })
    }

    pub(crate) fn received(tracking_code: TrackingCode) -> Self {
        CenterEvent::ShipmentReceived(InventoryChangeData::now(tracking_code))
    }

    pub(crate) fn dispatched(tracking_code: TrackingCode) -> Self {
        CenterEvent::ShipmentDispatched(InventoryChangeData::now(tracking_code))
    }

    pub(crate) fn released(tracking_code: TrackingCode) -> Self {
        CenterEvent::ShipmentReleased(InventoryChangeData::now(tracking_code))
    }
}
