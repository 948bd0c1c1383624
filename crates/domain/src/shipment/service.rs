//! Shipment service providing the application-level shipment operations.

use common::TrackingCode;
use event_store::EventStore;

use crate::aggregate::Aggregate;
use crate::center::Center;
use crate::error::DomainError;
use crate::repository::{Repository, RepositoryExt};
use crate::unit_of_work::UnitOfWork;

use super::{
    RegisterShipment, Shipment, ShipmentError, ShipmentKind, ShipmentStatus, UpdateShipmentStatus,
};

/// Service for managing shipments.
///
/// Resolves shipments by tracking code, enforces uniqueness, delegates to the
/// aggregate and commits the result together with its journal entries. Centers
/// are read to keep manual status changes away from held shipments.
pub struct ShipmentService<S, C, E> {
    shipments: S,
    centers: C,
    journal: E,
}

impl<S, C, E> ShipmentService<S, C, E>
where
    S: Repository<Shipment>,
    C: Repository<Center>,
    E: EventStore,
{
    /// Creates a new shipment service.
    pub fn new(shipments: S, centers: C, journal: E) -> Self {
        Self {
            shipments,
            centers,
            journal,
        }
    }

    /// Returns the underlying journal.
    pub fn journal(&self) -> &E {
        &self.journal
    }

    /// Registers a new shipment.
    ///
    /// Fails with `Conflict` if the tracking code is taken and with a
    /// validation error if the variant name is not recognised.
    #[tracing::instrument(skip(self))]
    pub fn register_shipment(&self, cmd: RegisterShipment) -> Result<Shipment, DomainError> {
        let tracking_code = TrackingCode::parse(&cmd.tracking_code)?;
        if self.shipments.contains(tracking_code.as_str()) {
            return Err(DomainError::conflict(
                Shipment::aggregate_type(),
                tracking_code.as_str(),
            ));
        }

        let kind: ShipmentKind = cmd.kind.parse()?;
        let mut shipment = Shipment::create(
            tracking_code.as_str(),
            &cmd.sender,
            &cmd.recipient,
            cmd.priority,
            kind,
        )?;

        let mut uow = UnitOfWork::new(&self.journal, "register_shipment");
        uow.stage(&self.shipments, &mut shipment)?;
        uow.commit()?;

        metrics::counter!("shipments_registered_total", "kind" => kind.as_str()).increment(1);
        tracing::info!(
            tracking_code = %shipment.tracking_code(),
            kind = %kind,
            priority = shipment.priority(),
            "shipment registered"
        );

        Ok(shipment)
    }

    /// Moves a shipment to the named status.
    ///
    /// A shipment on a route only changes status through the route, and one
    /// held by a center only goes in transit through that center's dispatch.
    #[tracing::instrument(skip(self))]
    pub fn update_shipment_status(
        &self,
        cmd: UpdateShipmentStatus,
    ) -> Result<Shipment, DomainError> {
        let tracking_code = TrackingCode::parse(&cmd.tracking_code)?;
        let status: ShipmentStatus = cmd.status.parse()?;
        let mut shipment = self.shipments.require(tracking_code.as_str())?;

        let from = shipment.status();
        shipment.check_transition(status)?;
        shipment.ensure_unrouted()?;
        if status == ShipmentStatus::InTransit
            && let Some(holder) = self.holder_of(&tracking_code)
        {
            tracing::debug!(%tracking_code, holder = %holder.center_id(), "shipment still held");
            return Err(ShipmentError::HeldAtCenter {
                tracking_code: tracking_code.to_string(),
                center_id: holder.center_id().to_string(),
            }
            .into());
        }

        shipment.update_status(status)?;
        self.save(&mut shipment, "update_shipment_status")?;

        metrics::counter!("shipment_status_changes_total", "to" => status.as_str()).increment(1);
        tracing::info!(%tracking_code, %from, to = %status, "shipment status changed");

        Ok(shipment)
    }

    /// Raises a shipment's priority by one step.
    #[tracing::instrument(skip(self))]
    pub fn increase_priority(&self, tracking_code: &str) -> Result<Shipment, DomainError> {
        self.change_priority(tracking_code, "increase_priority", Shipment::increase_priority)
    }

    /// Lowers a shipment's priority by one step.
    #[tracing::instrument(skip(self))]
    pub fn decrease_priority(&self, tracking_code: &str) -> Result<Shipment, DomainError> {
        self.change_priority(tracking_code, "decrease_priority", Shipment::decrease_priority)
    }

    /// Loads a shipment by tracking code.
    #[tracing::instrument(skip(self))]
    pub fn get_shipment(&self, tracking_code: &str) -> Result<Shipment, DomainError> {
        let tracking_code = TrackingCode::parse(tracking_code)?;
        self.shipments.require(tracking_code.as_str())
    }

    /// Returns every shipment, sorted by tracking code.
    pub fn list_shipments(&self) -> Vec<Shipment> {
        let mut shipments = self.shipments.list_all();
        shipments.sort_by(|a, b| a.tracking_code().cmp(b.tracking_code()));
        shipments
    }

    fn change_priority(
        &self,
        tracking_code: &str,
        operation: &'static str,
        change: fn(&mut Shipment) -> Result<u8, ShipmentError>,
    ) -> Result<Shipment, DomainError> {
        let tracking_code = TrackingCode::parse(tracking_code)?;
        let mut shipment = self.shipments.require(tracking_code.as_str())?;

        let from = shipment.priority();
        let to = change(&mut shipment).inspect_err(|e| {
            tracing::debug!(%tracking_code, error = %e, "priority change rejected");
        })?;
        self.save(&mut shipment, operation)?;

        metrics::counter!("shipment_priority_changes_total", "operation" => operation).increment(1);
        tracing::info!(%tracking_code, from, to, "shipment priority changed");
        Ok(shipment)
    }

    fn holder_of(&self, tracking_code: &TrackingCode) -> Option<Center> {
        self.centers
            .list_all()
            .into_iter()
            .find(|center| center.has(tracking_code.as_str()))
    }

    fn save(&self, shipment: &mut Shipment, operation: &'static str) -> Result<(), DomainError> {
        let mut uow = UnitOfWork::new(&self.journal, operation);
        uow.stage(&self.shipments, shipment)?;
        uow.commit()?;
        Ok(())
    }
}
