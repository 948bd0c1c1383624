//! Center service providing the application-level center operations.

use common::{CenterId, TrackingCode};
use event_store::EventStore;

use crate::aggregate::Aggregate;
use crate::error::DomainError;
use crate::repository::{Repository, RepositoryExt};
use crate::shipment::Shipment;
use crate::unit_of_work::UnitOfWork;

use super::{Center, CenterError, MoveShipment, RegisterCenter};

/// Service for managing logistics centers and their inventories.
pub struct CenterService<C, S, E> {
    centers: C,
    shipments: S,
    journal: E,
}

impl<C, S, E> CenterService<C, S, E>
where
    C: Repository<Center>,
    S: Repository<Shipment>,
    E: EventStore,
{
    /// Creates a new center service.
    pub fn new(centers: C, shipments: S, journal: E) -> Self {
        Self {
            centers,
            shipments,
            journal,
        }
    }

    /// Registers a new center.
    #[tracing::instrument(skip(self))]
    pub fn register_center(&self, cmd: RegisterCenter) -> Result<Center, DomainError> {
        let center_id = CenterId::parse(&cmd.center_id)?;
        if self.centers.contains(center_id.as_str()) {
            return Err(DomainError::conflict(
                Center::aggregate_type(),
                center_id.as_str(),
            ));
        }

        let mut center = Center::create(center_id.as_str(), &cmd.name, &cmd.location)?;

        let mut uow = UnitOfWork::new(&self.journal, "register_center");
        uow.stage(&self.centers, &mut center)?;
        uow.commit()?;

        metrics::counter!("centers_registered_total").increment(1);
        tracing::info!(%center_id, name = center.name(), "center registered");

        Ok(center)
    }

    /// Loads a center by id.
    #[tracing::instrument(skip(self))]
    pub fn get_center(&self, center_id: &str) -> Result<Center, DomainError> {
        let center_id = CenterId::parse(center_id)?;
        self.centers.require(center_id.as_str())
    }

    /// Returns every center, sorted by id.
    pub fn list_centers(&self) -> Vec<Center> {
        let mut centers = self.centers.list_all();
        centers.sort_by(|a, b| a.center_id().cmp(b.center_id()));
        centers
    }

    /// Places a shipment in a center's inventory.
    ///
    /// A shipment held by another center is refused, since it cannot be in
    /// two places at once. So is one on a route: only completing the route
    /// puts it down at the destination.
    #[tracing::instrument(skip(self))]
    pub fn receive_shipment(&self, cmd: MoveShipment) -> Result<Center, DomainError> {
        let (mut center, shipment) = self.resolve(&cmd)?;
        shipment.ensure_unrouted()?;

        if let Some(holder) = self.holder_of(shipment.tracking_code())
            && holder.center_id() != center.center_id()
        {
            tracing::debug!(
                tracking_code = %shipment.tracking_code(),
                holder = %holder.center_id(),
                "shipment already held elsewhere"
            );
            return Err(CenterError::AlreadyPresent {
                center_id: holder.center_id().to_string(),
                tracking_code: shipment.tracking_code().to_string(),
            }
            .into());
        }

        center.receive(&shipment)?;

        let mut uow = UnitOfWork::new(&self.journal, "receive_shipment");
        uow.stage(&self.centers, &mut center)?;
        uow.commit()?;

        metrics::counter!("center_shipments_received_total").increment(1);
        tracing::info!(
            center_id = %center.center_id(),
            tracking_code = %shipment.tracking_code(),
            "shipment received"
        );

        Ok(center)
    }

    /// Dispatches a shipment from a center, moving it in transit.
    ///
    /// Shipments on a route leave with the route's dispatch instead.
    #[tracing::instrument(skip(self))]
    pub fn dispatch_shipment(&self, cmd: MoveShipment) -> Result<Shipment, DomainError> {
        let (mut center, mut shipment) = self.resolve(&cmd)?;
        shipment.ensure_unrouted()?;

        center.dispatch(&mut shipment)?;

        let mut uow = UnitOfWork::new(&self.journal, "dispatch_shipment");
        uow.stage(&self.centers, &mut center)?;
        uow.stage(&self.shipments, &mut shipment)?;
        uow.commit()?;

        metrics::counter!("center_shipments_dispatched_total").increment(1);
        tracing::info!(
            center_id = %center.center_id(),
            tracking_code = %shipment.tracking_code(),
            "shipment dispatched"
        );

        Ok(shipment)
    }

    /// Returns the shipments currently held by a center, in arrival order.
    #[tracing::instrument(skip(self))]
    pub fn list_shipments_in_center(&self, center_id: &str) -> Result<Vec<Shipment>, DomainError> {
        let center = self.get_center(center_id)?;

        Ok(center
            .list_inventory()
            .iter()
            .filter_map(|code| {
                let shipment = self.shipments.get_by_id(code.as_str());
                if shipment.is_none() {
                    tracing::warn!(%code, "inventory references an unknown shipment");
                }
                shipment
            })
            .collect())
    }

    fn resolve(&self, cmd: &MoveShipment) -> Result<(Center, Shipment), DomainError> {
        let center_id = CenterId::parse(&cmd.center_id)?;
        let tracking_code = TrackingCode::parse(&cmd.tracking_code)?;

        let center = self.centers.require(center_id.as_str())?;
        let shipment = self.shipments.require(tracking_code.as_str())?;
        Ok((center, shipment))
    }

    fn holder_of(&self, tracking_code: &TrackingCode) -> Option<Center> {
        self.centers
            .list_all()
            .into_iter()
            .find(|c| c.has(tracking_code.as_str()))
    }
}
