//! Center aggregate implementation.

use common::{CenterId, TrackingCode, normalize_key};
use event_store::Version;
use serde::Serialize;

use crate::aggregate::{Aggregate, Changes};
use crate::shipment::{Shipment, ShipmentStatus};

use super::{CenterError, CenterEvent};

/// Logistics center aggregate root.
///
/// Holds the inventory of shipments physically present, in arrival order.
/// A tracking code appears at most once.
#[derive(Debug, Clone, Serialize)]
pub struct Center {
    center_id: CenterId,
    name: String,
    location: String,
    inventory: Vec<TrackingCode>,
    #[serde(rename = "version")]
    changes: Changes<CenterEvent>,
}

impl Aggregate for Center {
    type Event = CenterEvent;

    fn aggregate_type() -> &'static str {
        "Center"
    }

    fn id(&self) -> &str {
        self.center_id.as_str()
    }

    fn version(&self) -> Version {
        self.changes.version()
    }

    fn take_events(&mut self) -> Vec<CenterEvent> {
        self.changes.take()
    }

    fn has_pending_events(&self) -> bool {
        !self.changes.is_empty()
    }
}

impl Center {
    /// Registers a new center with an empty inventory.
    pub fn create(center_id: &str, name: &str, location: &str) -> Result<Self, CenterError> {
        let center_id = CenterId::parse(center_id)?;
        let name = required(name, "name")?;
        let location = required(location, "location")?;

        let created = CenterEvent::registered(center_id.clone(), name.clone(), location.clone());

        Ok(Self {
            center_id,
            name,
            location,
            inventory: Vec::new(),
            changes: Changes::created(created),
        })
    }

    pub fn center_id(&self) -> &CenterId {
        &self.center_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns a snapshot of the inventory.
    pub fn list_inventory(&self) -> Vec<TrackingCode> {
        self.inventory.clone()
    }

    /// Returns the number of shipments held.
    pub fn inventory_len(&self) -> usize {
        self.inventory.len()
    }

    /// Returns true if the shipment with this tracking code is held here.
    pub fn has(&self, tracking_code: &str) -> bool {
        match normalize_key(tracking_code) {
            Some(key) => self.inventory.iter().any(|c| c.as_str() == key),
            None => false,
        }
    }

    /// Checks that `shipment` could be received without changing anything.
    pub fn check_can_receive(&self, shipment: &Shipment) -> Result<(), CenterError> {
        if self.holds(shipment.tracking_code()) {
            return Err(CenterError::AlreadyPresent {
                center_id: self.center_id.to_string(),
                tracking_code: shipment.tracking_code().to_string(),
            });
        }
        Ok(())
    }

    /// Checks that `shipment` could be dispatched without changing anything.
    pub fn check_can_dispatch(&self, shipment: &Shipment) -> Result<(), CenterError> {
        self.require_present(shipment.tracking_code())?;
        shipment.check_transition(ShipmentStatus::InTransit)?;
        Ok(())
    }

    /// Adds a shipment to the inventory. Its status is left untouched.
    pub fn receive(&mut self, shipment: &Shipment) -> Result<(), CenterError> {
        self.check_can_receive(shipment)?;

        let code = shipment.tracking_code().clone();
        self.inventory.push(code.clone());
        self.record(CenterEvent::received(code));
        Ok(())
    }

    /// Sends a shipment on its way: moves it to `InTransit` and removes it
    /// from the inventory.
    pub fn dispatch(&mut self, shipment: &mut Shipment) -> Result<(), CenterError> {
        self.check_can_dispatch(shipment)?;

        shipment.update_status(ShipmentStatus::InTransit)?;
        let code = shipment.tracking_code().clone();
        self.inventory.retain(|c| c != &code);
        self.record(CenterEvent::dispatched(code));
        Ok(())
    }

    /// Drops a shipment from the inventory without moving it. Used when a
    /// waiting shipment is taken off its route.
    pub(crate) fn release(&mut self, tracking_code: &TrackingCode) -> Result<(), CenterError> {
        self.require_present(tracking_code)?;

        self.inventory.retain(|c| c != tracking_code);
        self.record(CenterEvent::released(tracking_code.clone()));
        Ok(())
    }

    fn holds(&self, tracking_code: &TrackingCode) -> bool {
        self.inventory.contains(tracking_code)
    }

    fn require_present(&self, tracking_code: &TrackingCode) -> Result<(), CenterError> {
        if self.holds(tracking_code) {
            Ok(())
        } else {
            Err(CenterError::NotPresent {
                center_id: self.center_id.to_string(),
                tracking_code: tracking_code.to_string(),
            })
        }
    }

    fn record(&mut self, event: CenterEvent) {
        self.changes.record(event);
    }
}

fn required(value: &str, field: &'static str) -> Result<String, CenterError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CenterError::EmptyField { field })
    } else {
        Ok(trimmed.to_string())
    }
}
