//! Shipment aggregate implementation.

use common::{RouteId, TrackingCode};
use event_store::Version;
use serde::Serialize;

use crate::aggregate::{Aggregate, Changes};

use super::{ShipmentError, ShipmentEvent, ShipmentKind, ShipmentStatus};

/// Shipment aggregate root.
///
/// A trackable package moving through the network. Its status only ever
/// advances one step at a time, and its priority follows the policy of its
/// variant.
#[derive(Debug, Clone, Serialize)]
pub struct Shipment {
    tracking_code: TrackingCode,
    sender: String,
    recipient: String,
    kind: ShipmentKind,
    priority: u8,
    status: ShipmentStatus,

    /// Every status the shipment has been in, oldest first.
    status_history: Vec<ShipmentStatus>,

    /// The route currently carrying this shipment.
    assigned_route: Option<RouteId>,

    #[serde(rename = "version")]
    changes: Changes<ShipmentEvent>,
}

impl Aggregate for Shipment {
    type Event = ShipmentEvent;

    fn aggregate_type() -> &'static str {
        "Shipment"
    }

    fn id(&self) -> &str {
        self.tracking_code.as_str()
    }

    fn version(&self) -> Version {
        self.changes.version()
    }

    fn take_events(&mut self) -> Vec<ShipmentEvent> {
        self.changes.take()
    }

    fn has_pending_events(&self) -> bool {
        !self.changes.is_empty()
    }
}

// Query methods
impl Shipment {
    /// Returns the tracking code.
    pub fn tracking_code(&self) -> &TrackingCode {
        &self.tracking_code
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Returns the variant.
    pub fn kind(&self) -> ShipmentKind {
        self.kind
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Returns the current status.
    pub fn status(&self) -> ShipmentStatus {
        self.status
    }

    /// Returns every status held so far, starting with `Registered`.
    pub fn status_history(&self) -> &[ShipmentStatus] {
        &self.status_history
    }

    /// Returns the route this shipment is assigned to, if any.
    pub fn assigned_route(&self) -> Option<&RouteId> {
        self.assigned_route.as_ref()
    }

    /// Returns true if the shipment is on a route.
    pub fn is_assigned(&self) -> bool {
        self.assigned_route.is_some()
    }
}

// Command methods
impl Shipment {
    /// Registers a new shipment.
    ///
    /// The status starts at `Registered`. Fails if a text field is blank or
    /// the priority breaks the variant's policy.
    pub fn create(
        tracking_code: &str,
        sender: &str,
        recipient: &str,
        priority: i64,
        kind: ShipmentKind,
    ) -> Result<Self, ShipmentError> {
        let tracking_code = TrackingCode::parse(tracking_code).map_err(|_| {
            ShipmentError::EmptyField {
                field: "tracking code",
            }
        })?;
        let sender = required(sender, "sender")?;
        let recipient = required(recipient, "recipient")?;
        let priority = kind.initial_priority(priority)?;

        let created = ShipmentEvent::registered(
            tracking_code.clone(),
            sender.clone(),
            recipient.clone(),
            kind,
            priority,
        );

        Ok(Self {
            tracking_code,
            sender,
            recipient,
            kind,
            priority,
            status: ShipmentStatus::Registered,
            status_history: vec![ShipmentStatus::Registered],
            assigned_route: None,
            changes: Changes::created(created),
        })
    }

    /// Registers a standard shipment.
    pub fn standard(
        tracking_code: &str,
        sender: &str,
        recipient: &str,
        priority: i64,
    ) -> Result<Self, ShipmentError> {
        Self::create(tracking_code, sender, recipient, priority, ShipmentKind::Standard)
    }

    /// Registers a fragile shipment.
    pub fn fragile(
        tracking_code: &str,
        sender: &str,
        recipient: &str,
        priority: i64,
    ) -> Result<Self, ShipmentError> {
        Self::create(tracking_code, sender, recipient, priority, ShipmentKind::Fragile)
    }

    /// Registers an express shipment. Its priority is always 3.
    pub fn express(tracking_code: &str, sender: &str, recipient: &str) -> Result<Self, ShipmentError> {
        Self::create(
            tracking_code,
            sender,
            recipient,
            i64::from(super::kind::MAX_PRIORITY),
            ShipmentKind::Express,
        )
    }

    /// Checks that the shipment may move to `to` without changing anything.
    pub fn check_transition(&self, to: ShipmentStatus) -> Result<(), ShipmentError> {
        if self.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(ShipmentError::InvalidTransition {
                from: self.status,
                to,
            })
        }
    }

    /// Fails while the shipment is on a route; its route moves it from there.
    pub fn ensure_unrouted(&self) -> Result<(), ShipmentError> {
        match &self.assigned_route {
            Some(route_id) => Err(ShipmentError::MovedByRoute {
                tracking_code: self.tracking_code.to_string(),
                route_id: route_id.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Advances the status and appends it to the history.
    pub fn update_status(&mut self, to: ShipmentStatus) -> Result<(), ShipmentError> {
        self.check_transition(to)?;

        let from = self.status;
        self.status = to;
        self.status_history.push(to);
        self.record(ShipmentEvent::status_changed(from, to));
        Ok(())
    }

    /// Raises the priority by one step.
    pub fn increase_priority(&mut self) -> Result<u8, ShipmentError> {
        let next = self.kind.increased(self.priority)?;
        self.set_priority(next);
        Ok(next)
    }

    /// Lowers the priority by one step.
    pub fn decrease_priority(&mut self) -> Result<u8, ShipmentError> {
        let next = self.kind.decreased(self.priority)?;
        self.set_priority(next);
        Ok(next)
    }

    /// Sets the route back-reference. Only a route may call this, while
    /// adding the shipment to its manifest.
    pub(crate) fn assign_route(&mut self, route_id: &RouteId) -> Result<(), ShipmentError> {
        if let Some(current) = &self.assigned_route {
            return Err(ShipmentError::AlreadyAssigned {
                tracking_code: self.tracking_code.to_string(),
                route_id: current.to_string(),
            });
        }

        self.assigned_route = Some(route_id.clone());
        self.record(ShipmentEvent::route_assigned(route_id.clone()));
        Ok(())
    }

    /// Clears the route back-reference.
    pub(crate) fn remove_route(&mut self) -> Result<RouteId, ShipmentError> {
        let route_id = self
            .assigned_route
            .take()
            .ok_or_else(|| ShipmentError::NotAssigned {
                tracking_code: self.tracking_code.to_string(),
            })?;

        self.record(ShipmentEvent::route_removed(route_id.clone()));
        Ok(route_id)
    }

    fn set_priority(&mut self, next: u8) {
        let from = self.priority;
        self.priority = next;
        self.record(ShipmentEvent::priority_changed(from, next));
    }

    fn record(&mut self, event: ShipmentEvent) {
        self.changes.record(event);
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ShipmentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ShipmentError::EmptyField { field })
    } else {
        Ok(trimmed.to_string())
    }
}
