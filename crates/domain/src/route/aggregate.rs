//! Route aggregate implementation.

use common::{CenterId, RouteId, TrackingCode, normalize_key};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, Changes};
use crate::center::{Center, CenterError};
use crate::shipment::{Shipment, ShipmentStatus};

use super::{RouteError, RouteEvent};

/// Lifecycle of a route.
///
/// ```text
/// Active ──complete──► Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RouteStatus {
    /// Accepting, dispatching and removing shipments.
    #[default]
    Active,

    /// Terminal. No further changes.
    Completed,
}

impl RouteStatus {
    /// Returns the status label.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Active => "Active",
            RouteStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route aggregate root.
///
/// A declared path between two distinct centers. The route is the only
/// writer of the shipment-to-route relation: every change to the manifest
/// updates the shipment's back-reference and the origin's inventory in the
/// same call, so a shipment is in the manifest exactly when its
/// `assigned_route` names this route.
///
/// Every command checks all of its preconditions before touching anything,
/// so a failed call leaves the route, its centers and its shipments as they
/// were.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    route_id: RouteId,
    origin: CenterId,
    destination: CenterId,

    /// Shipments currently on the route, in the order they were added.
    manifest: Vec<TrackingCode>,

    status: RouteStatus,
    #[serde(rename = "version")]
    changes: Changes<RouteEvent>,
}

impl Aggregate for Route {
    type Event = RouteEvent;

    fn aggregate_type() -> &'static str {
        "Route"
    }

    fn id(&self) -> &str {
        self.route_id.as_str()
    }

    fn version(&self) -> Version {
        self.changes.version()
    }

    fn take_events(&mut self) -> Vec<RouteEvent> {
        self.changes.take()
    }

    fn has_pending_events(&self) -> bool {
        !self.changes.is_empty()
    }
}

// Query methods
impl Route {
    pub fn route_id(&self) -> &RouteId {
        &self.route_id
    }

    /// Returns the id of the center shipments leave from.
    pub fn origin(&self) -> &CenterId {
        &self.origin
    }

    /// Returns the id of the center shipments are delivered to.
    pub fn destination(&self) -> &CenterId {
        &self.destination
    }

    /// Returns a snapshot of the manifest.
    pub fn list_manifest(&self) -> Vec<TrackingCode> {
        self.manifest.clone()
    }

    /// Returns true if the shipment with this tracking code is on the route.
    pub fn contains(&self, tracking_code: &str) -> bool {
        match normalize_key(tracking_code) {
            Some(key) => self.manifest.iter().any(|c| c.as_str() == key),
            None => false,
        }
    }

    pub fn status(&self) -> RouteStatus {
        self.status
    }

    /// Returns true until the route is completed.
    pub fn is_active(&self) -> bool {
        self.status == RouteStatus::Active
    }

    /// Returns "Active" or "Completed".
    pub fn status_label(&self) -> &'static str {
        self.status.as_str()
    }
}

// Command methods
impl Route {
    /// Declares a new active route with an empty manifest.
    pub fn create(route_id: &str, origin: &Center, destination: &Center) -> Result<Self, RouteError> {
        let route_id = RouteId::parse(route_id)?;
        if origin.center_id() == destination.center_id() {
            return Err(RouteError::SameOriginAndDestination {
                center_id: origin.center_id().to_string(),
            });
        }

        let origin = origin.center_id().clone();
        let destination = destination.center_id().clone();
        let created = RouteEvent::created(route_id.clone(), origin.clone(), destination.clone());

        Ok(Self {
            route_id,
            origin,
            destination,
            manifest: Vec::new(),
            status: RouteStatus::Active,
            changes: Changes::created(created),
        })
    }

    /// Puts a registered shipment on the route.
    ///
    /// Appends it to the manifest, points its back-reference at this route
    /// and places it in the origin's inventory.
    pub fn add_shipment(
        &mut self,
        shipment: &mut Shipment,
        origin: &mut Center,
    ) -> Result<(), RouteError> {
        self.ensure_active()?;
        self.ensure_center("origin", &self.origin, origin)?;

        let code = shipment.tracking_code();
        if self.manifest.contains(code) {
            return Err(RouteError::AlreadyInManifest {
                route_id: self.route_id.to_string(),
                tracking_code: code.to_string(),
            });
        }
        if shipment.status() != ShipmentStatus::Registered {
            return Err(RouteError::NotRegistered {
                tracking_code: code.to_string(),
                status: shipment.status(),
            });
        }
        origin.check_can_receive(shipment)?;

        shipment.assign_route(&self.route_id)?;
        origin.receive(shipment)?;

        let code = shipment.tracking_code().clone();
        self.manifest.push(code.clone());
        self.record(RouteEvent::shipment_added(code));
        Ok(())
    }

    /// Takes a waiting shipment off the route.
    ///
    /// Removes it from the manifest, clears its back-reference and takes it
    /// out of the origin's inventory. A shipment that has already left the
    /// origin cannot be removed.
    pub fn remove_shipment(
        &mut self,
        shipment: &mut Shipment,
        origin: &mut Center,
    ) -> Result<(), RouteError> {
        self.ensure_active()?;
        self.ensure_center("origin", &self.origin, origin)?;

        let code = shipment.tracking_code();
        if !self.manifest.contains(code) || shipment.assigned_route() != Some(&self.route_id) {
            return Err(RouteError::NotInManifest {
                route_id: self.route_id.to_string(),
                tracking_code: code.to_string(),
            });
        }
        if shipment.status() != ShipmentStatus::Registered || !origin.has(code.as_str()) {
            return Err(RouteError::NotAtOrigin {
                tracking_code: code.to_string(),
                center_id: self.origin.to_string(),
            });
        }

        let code = code.clone();
        shipment.remove_route()?;
        origin.release(&code)?;

        self.manifest.retain(|c| c != &code);
        self.record(RouteEvent::shipment_removed(code));
        Ok(())
    }

    /// Dispatches every shipment still waiting at the origin.
    ///
    /// `shipments` must be exactly the manifest. Returns the codes that left.
    pub fn dispatch(
        &mut self,
        origin: &mut Center,
        shipments: &mut [Shipment],
    ) -> Result<Vec<TrackingCode>, RouteError> {
        self.ensure_active()?;
        self.ensure_center("origin", &self.origin, origin)?;
        if self.manifest.is_empty() {
            return Err(RouteError::EmptyManifest {
                route_id: self.route_id.to_string(),
            });
        }
        self.ensure_manifest(shipments)?;

        let pending: Vec<usize> = shipments
            .iter()
            .enumerate()
            .filter(|(_, s)| origin.has(s.tracking_code().as_str()))
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            return Err(RouteError::AlreadyDispatched {
                route_id: self.route_id.to_string(),
            });
        }
        for &i in &pending {
            origin.check_can_dispatch(&shipments[i])?;
        }

        let mut dispatched = Vec::with_capacity(pending.len());
        for i in pending {
            origin.dispatch(&mut shipments[i])?;
            dispatched.push(shipments[i].tracking_code().clone());
        }

        self.record(RouteEvent::dispatched(dispatched.clone()));
        Ok(dispatched)
    }

    /// Completes the route.
    ///
    /// Every shipment on the manifest is received at the destination and
    /// marked delivered, and its back-reference is cleared. The manifest is
    /// emptied and the route becomes inactive for good. Returns the codes
    /// delivered. A shipment the origin still holds has not left and blocks
    /// completion.
    pub fn complete(
        &mut self,
        origin: &Center,
        destination: &mut Center,
        shipments: &mut [Shipment],
    ) -> Result<Vec<TrackingCode>, RouteError> {
        self.ensure_active()?;
        self.ensure_center("origin", &self.origin, origin)?;
        self.ensure_center("destination", &self.destination, destination)?;
        self.ensure_manifest(shipments)?;

        for shipment in shipments.iter() {
            shipment.check_transition(ShipmentStatus::Delivered)?;
            let code = shipment.tracking_code();
            if origin.has(code.as_str()) {
                return Err(CenterError::AlreadyPresent {
                    center_id: self.origin.to_string(),
                    tracking_code: code.to_string(),
                }
                .into());
            }
            destination.check_can_receive(shipment)?;
        }

        for shipment in shipments.iter_mut() {
            destination.receive(shipment)?;
            shipment.update_status(ShipmentStatus::Delivered)?;
            shipment.remove_route()?;
        }

        let delivered = std::mem::take(&mut self.manifest);
        self.status = RouteStatus::Completed;
        self.record(RouteEvent::completed(delivered.clone()));
        Ok(delivered)
    }

    fn ensure_active(&self) -> Result<(), RouteError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(RouteError::Inactive {
                route_id: self.route_id.to_string(),
            })
        }
    }

    fn ensure_center(
        &self,
        role: &'static str,
        expected: &CenterId,
        actual: &Center,
    ) -> Result<(), RouteError> {
        if actual.center_id() == expected {
            Ok(())
        } else {
            Err(RouteError::CenterMismatch {
                route_id: self.route_id.to_string(),
                role,
                expected: expected.to_string(),
                actual: actual.center_id().to_string(),
            })
        }
    }

    fn ensure_manifest(&self, shipments: &[Shipment]) -> Result<(), RouteError> {
        let matches = shipments.len() == self.manifest.len()
            && shipments
                .iter()
                .all(|s| self.manifest.contains(s.tracking_code()));
        if matches {
            Ok(())
        } else {
            Err(RouteError::ManifestMismatch {
                route_id: self.route_id.to_string(),
            })
        }
    }

    fn record(&mut self, event: RouteEvent) {
        self.changes.record(event);
    }
}
