//! Route service providing the application-level route operations.

use common::{CenterId, RouteId, TrackingCode};
use event_store::EventStore;

use crate::aggregate::Aggregate;
use crate::center::{Center, CenterError};
use crate::error::DomainError;
use crate::repository::{Repository, RepositoryExt};
use crate::shipment::Shipment;
use crate::unit_of_work::UnitOfWork;

use super::{AssignShipments, CreateRoute, Route, RouteError, RouteShipment};

/// Outcome of a batch assignment.
#[derive(Debug, Default)]
pub struct AssignmentSummary {
    /// Tracking codes now on the route.
    pub assigned: Vec<String>,

    /// Tracking codes that could not be assigned, with the reason.
    pub failed: Vec<AssignmentFailure>,
}

/// A shipment that could not be assigned.
#[derive(Debug)]
pub struct AssignmentFailure {
    pub tracking_code: String,
    pub error: DomainError,
}

/// Service for managing routes.
///
/// Every operation loads the route together with the centers and shipments
/// it touches, lets the route change all of them, and commits them in one
/// unit of work.
pub struct RouteService<R, C, S, E> {
    routes: R,
    centers: C,
    shipments: S,
    journal: E,
}

impl<R, C, S, E> RouteService<R, C, S, E>
where
    R: Repository<Route>,
    C: Repository<Center>,
    S: Repository<Shipment>,
    E: EventStore,
{
    /// Creates a new route service.
    pub fn new(routes: R, centers: C, shipments: S, journal: E) -> Self {
        Self {
            routes,
            centers,
            shipments,
            journal,
        }
    }

    /// Declares a new route between two registered centers.
    #[tracing::instrument(skip(self))]
    pub fn create_route(&self, cmd: CreateRoute) -> Result<Route, DomainError> {
        let route_id = RouteId::parse(&cmd.route_id).map_err(RouteError::from)?;
        if self.routes.contains(route_id.as_str()) {
            return Err(DomainError::conflict(
                Route::aggregate_type(),
                route_id.as_str(),
            ));
        }

        let origin = self.center(&cmd.origin)?;
        let destination = self.center(&cmd.destination)?;
        let mut route = Route::create(route_id.as_str(), &origin, &destination)?;

        let mut uow = UnitOfWork::new(&self.journal, "create_route");
        uow.stage(&self.routes, &mut route)?;
        uow.commit()?;

        metrics::counter!("routes_created_total").increment(1);
        tracing::info!(
            %route_id,
            origin = %route.origin(),
            destination = %route.destination(),
            "route created"
        );

        Ok(route)
    }

    /// Loads a route by id.
    #[tracing::instrument(skip(self))]
    pub fn get_route(&self, route_id: &str) -> Result<Route, DomainError> {
        let route_id = RouteId::parse(route_id).map_err(RouteError::from)?;
        self.routes.require(route_id.as_str())
    }

    /// Returns every route, sorted by id.
    pub fn list_routes(&self) -> Vec<Route> {
        let mut routes = self.routes.list_all();
        routes.sort_by(|a, b| a.route_id().cmp(b.route_id()));
        routes
    }

    /// Puts a shipment on a route and into the route's origin center.
    ///
    /// Refused if the shipment is already on a route, is no longer
    /// registered, or is physically held by any center.
    #[tracing::instrument(skip(self))]
    pub fn assign_shipment_to_route(&self, cmd: RouteShipment) -> Result<Route, DomainError> {
        self.assign(cmd).map(|(route, _)| route)
    }

    /// Puts several shipments on a route, each independently.
    ///
    /// Fails as a whole only if the route itself cannot be resolved.
    #[tracing::instrument(skip(self))]
    pub fn assign_shipments_to_route(
        &self,
        cmd: AssignShipments,
    ) -> Result<AssignmentSummary, DomainError> {
        let route = self.get_route(&cmd.route_id)?;

        let mut summary = AssignmentSummary::default();
        for tracking_code in cmd.tracking_codes {
            let single = RouteShipment::new(route.route_id().as_str(), tracking_code.clone());
            match self.assign(single) {
                Ok((_, shipment)) => summary.assigned.push(shipment.tracking_code().to_string()),
                Err(error) => {
                    tracing::debug!(%tracking_code, %error, "batch assignment skipped shipment");
                    summary.failed.push(AssignmentFailure {
                        tracking_code,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            route_id = %route.route_id(),
            assigned = summary.assigned.len(),
            failed = summary.failed.len(),
            "batch assignment finished"
        );

        Ok(summary)
    }

    fn assign(&self, cmd: RouteShipment) -> Result<(Route, Shipment), DomainError> {
        let mut route = self.get_route(&cmd.route_id)?;
        let mut shipment = self.shipment(&cmd.tracking_code)?;
        let mut origin = self.centers.require(route.origin().as_str())?;

        route.add_shipment(&mut shipment, &mut origin)?;

        // The origin checked itself; no other center may hold the shipment either
        if let Some(holder) = self.holder_of(shipment.tracking_code(), &[origin.center_id()]) {
            return Err(CenterError::AlreadyPresent {
                center_id: holder.center_id().to_string(),
                tracking_code: shipment.tracking_code().to_string(),
            }
            .into());
        }

        let mut uow = UnitOfWork::new(&self.journal, "assign_shipment_to_route");
        uow.stage(&self.routes, &mut route)?;
        uow.stage(&self.shipments, &mut shipment)?;
        uow.stage(&self.centers, &mut origin)?;
        uow.commit()?;

        metrics::counter!("route_assignments_total").increment(1);
        tracing::info!(
            route_id = %route.route_id(),
            tracking_code = %shipment.tracking_code(),
            "shipment assigned to route"
        );

        Ok((route, shipment))
    }

    /// Takes a shipment that is still waiting at the origin off its route.
    #[tracing::instrument(skip(self))]
    pub fn remove_shipment_from_route(&self, cmd: RouteShipment) -> Result<Route, DomainError> {
        let mut route = self.get_route(&cmd.route_id)?;
        let mut shipment = self.shipment(&cmd.tracking_code)?;

        if shipment.assigned_route() != Some(route.route_id()) {
            return Err(RouteError::NotInManifest {
                route_id: route.route_id().to_string(),
                tracking_code: shipment.tracking_code().to_string(),
            }
            .into());
        }

        let mut origin = self.centers.require(route.origin().as_str())?;
        route.remove_shipment(&mut shipment, &mut origin)?;

        let mut uow = UnitOfWork::new(&self.journal, "remove_shipment_from_route");
        uow.stage(&self.routes, &mut route)?;
        uow.stage(&self.shipments, &mut shipment)?;
        uow.stage(&self.centers, &mut origin)?;
        uow.commit()?;

        tracing::info!(
            route_id = %route.route_id(),
            tracking_code = %shipment.tracking_code(),
            "shipment removed from route"
        );

        Ok(route)
    }

    /// Dispatches every shipment on the route still waiting at the origin.
    #[tracing::instrument(skip(self))]
    pub fn dispatch_route(&self, route_id: &str) -> Result<Route, DomainError> {
        let mut route = self.get_route(route_id)?;
        let mut origin = self.centers.require(route.origin().as_str())?;
        let mut shipments = self.manifest_shipments(&route)?;

        let dispatched = route.dispatch(&mut origin, &mut shipments)?;

        let mut uow = UnitOfWork::new(&self.journal, "dispatch_route");
        uow.stage(&self.routes, &mut route)?;
        uow.stage(&self.centers, &mut origin)?;
        uow.stage_all(&self.shipments, &mut shipments)?;
        uow.commit()?;

        metrics::counter!("routes_dispatched_total").increment(1);
        metrics::counter!("shipments_dispatched_total").increment(dispatched.len() as u64);
        tracing::info!(
            route_id = %route.route_id(),
            shipments = dispatched.len(),
            "route dispatched"
        );

        Ok(route)
    }

    /// Completes a route, delivering its shipments to the destination.
    ///
    /// Refused while any center other than the destination still holds a
    /// shipment on the manifest.
    #[tracing::instrument(skip(self))]
    pub fn complete_route(&self, route_id: &str) -> Result<Route, DomainError> {
        let mut route = self.get_route(route_id)?;
        let origin = self.centers.require(route.origin().as_str())?;
        let mut destination = self.centers.require(route.destination().as_str())?;
        let mut shipments = self.manifest_shipments(&route)?;

        // The route checks both of its ends; any third holder is checked here
        let ends = [origin.center_id(), destination.center_id()];
        for shipment in &shipments {
            if let Some(holder) = self.holder_of(shipment.tracking_code(), &ends) {
                tracing::debug!(
                    tracking_code = %shipment.tracking_code(),
                    holder = %holder.center_id(),
                    "manifest shipment held off route"
                );
                return Err(CenterError::AlreadyPresent {
                    center_id: holder.center_id().to_string(),
                    tracking_code: shipment.tracking_code().to_string(),
                }
                .into());
            }
        }

        let delivered = route.complete(&origin, &mut destination, &mut shipments)?;

        let mut uow = UnitOfWork::new(&self.journal, "complete_route");
        uow.stage(&self.routes, &mut route)?;
        uow.stage(&self.centers, &mut destination)?;
        uow.stage_all(&self.shipments, &mut shipments)?;
        uow.commit()?;

        metrics::counter!("routes_completed_total").increment(1);
        metrics::counter!("shipments_delivered_total").increment(delivered.len() as u64);
        tracing::info!(
            route_id = %route.route_id(),
            delivered = delivered.len(),
            "route completed"
        );

        Ok(route)
    }

    fn center(&self, raw: &str) -> Result<Center, DomainError> {
        let center_id = CenterId::parse(raw)?;
        self.centers.require(center_id.as_str())
    }

    fn shipment(&self, raw: &str) -> Result<Shipment, DomainError> {
        let tracking_code = TrackingCode::parse(raw)?;
        self.shipments.require(tracking_code.as_str())
    }

    fn manifest_shipments(&self, route: &Route) -> Result<Vec<Shipment>, DomainError> {
        route
            .list_manifest()
            .iter()
            .map(|code| self.shipments.require(code.as_str()))
            .collect()
    }

    fn holder_of(&self, tracking_code: &TrackingCode, except: &[&CenterId]) -> Option<Center> {
        self.centers
            .list_all()
            .into_iter()
            .find(|c| !except.contains(&c.center_id()) && c.has(tracking_code.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::repository::InMemoryRepository;
    use crate::shipment::{RegisterShipment, ShipmentService, ShipmentStatus};
    use event_store::{EventStore as _, InMemoryEventStore};

    const ROUTE: &str = "MAD16-BCN03-STD-001";

    struct Harness {
        routes: RouteService<
            InMemoryRepository<Route>,
            InMemoryRepository<Center>,
            InMemoryRepository<Shipment>,
            InMemoryEventStore,
        >,
        centers: InMemoryRepository<Center>,
        shipments: InMemoryRepository<Shipment>,
        journal: InMemoryEventStore,
    }

    fn harness() -> Harness {
        let centers = InMemoryRepository::new();
        let shipments = InMemoryRepository::new();
        let journal = InMemoryEventStore::new();

        let mut uow = UnitOfWork::new(&journal, "seed");
        for (id, name) in [("MAD16", "Madrid"), ("BCN03", "Barcelona"), ("SEV01", "Sevilla")] {
            uow.stage(&centers, &mut Center::create(id, name, name).unwrap())
                .unwrap();
        }
        uow.commit().unwrap();

        let shipment_service =
            ShipmentService::new(shipments.clone(), centers.clone(), journal.clone());
        for code in ["ABC123", "DEF456", "GHI789"] {
            shipment_service
                .register_shipment(RegisterShipment::new(code, "Ana", "Luis", 1, "STANDARD"))
                .unwrap();
        }

        let routes = RouteService::new(
            InMemoryRepository::new(),
            centers.clone(),
            shipments.clone(),
            journal.clone(),
        );
        routes
            .create_route(CreateRoute::new(ROUTE, "MAD16", "BCN03"))
            .unwrap();

        Harness {
            routes,
            centers,
            shipments,
            journal,
        }
    }

    #[test]
    fn create_route_checks_id_then_uniqueness_then_centers() {
        let h = harness();

        let err = h
            .routes
            .create_route(CreateRoute::new("bad-id", "MAD16", "BCN03"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = h
            .routes
            .create_route(CreateRoute::new(ROUTE.to_lowercase(), "MAD16", "BCN03"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = h
            .routes
            .create_route(CreateRoute::new("MAD16-XYZ99-STD-001", "MAD16", "XYZ99"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = h
            .routes
            .create_route(CreateRoute::new("MAD16-MAD16-STD-001", "MAD16", "mad16"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn assign_persists_route_shipment_and_origin() {
        let h = harness();
        let route = h
            .routes
            .assign_shipment_to_route(RouteShipment::new(ROUTE, "abc123"))
            .unwrap();
        assert!(route.contains("ABC123"));

        let stored = h.routes.get_route(ROUTE).unwrap();
        assert_eq!(stored.list_manifest().len(), 1);
        let shipment = h.shipments.require("ABC123").unwrap();
        assert_eq!(shipment.assigned_route().map(|r| r.as_str()), Some(ROUTE));
        assert!(h.centers.require("MAD16").unwrap().has("ABC123"));
    }

    #[test]
    fn assign_refuses_shipment_held_by_another_center() {
        let h = harness();
        let mut sevilla = h.centers.require("SEV01").unwrap();
        sevilla
            .receive(&h.shipments.require("ABC123").unwrap())
            .unwrap();
        let mut uow = UnitOfWork::new(&h.journal, "test");
        uow.stage(&h.centers, &mut sevilla).unwrap();
        uow.commit().unwrap();

        let err = h
            .routes
            .assign_shipment_to_route(RouteShipment::new(ROUTE, "ABC123"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(!h.shipments.require("ABC123").unwrap().is_assigned());
        assert!(!h.centers.require("MAD16").unwrap().has("ABC123"));
        assert!(h.routes.get_route(ROUTE).unwrap().list_manifest().is_empty());
    }

    #[test]
    fn batch_assignment_reports_each_code() {
        let h = harness();
        let summary = h
            .routes
            .assign_shipments_to_route(AssignShipments::new(
                ROUTE,
                ["abc123", "NOPE01", "DEF456", "ABC123"],
            ))
            .unwrap();

        assert_eq!(summary.assigned, ["ABC123", "DEF456"]);
        assert_eq!(summary.failed.len(), 2);
        assert_eq!(summary.failed[0].tracking_code, "NOPE01");
        assert_eq!(summary.failed[0].error.kind(), ErrorKind::NotFound);
        assert_eq!(summary.failed[1].error.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn batch_assignment_needs_an_existing_route() {
        let h = harness();
        let err = h
            .routes
            .assign_shipments_to_route(AssignShipments::new("MAD16-BCN03-STD-999", ["ABC123"]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn remove_requires_assignment_to_this_route() {
        let h = harness();
        let err = h
            .routes
            .remove_shipment_from_route(RouteShipment::new(ROUTE, "ABC123"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);

        h.routes
            .assign_shipment_to_route(RouteShipment::new(ROUTE, "ABC123"))
            .unwrap();
        let route = h
            .routes
            .remove_shipment_from_route(RouteShipment::new(ROUTE, "ABC123"))
            .unwrap();

        assert!(route.list_manifest().is_empty());
        assert!(!h.shipments.require("ABC123").unwrap().is_assigned());
        assert!(!h.centers.require("MAD16").unwrap().has("ABC123"));
    }

    #[test]
    fn dispatch_then_complete() {
        let h = harness();
        for code in ["ABC123", "DEF456"] {
            h.routes
                .assign_shipment_to_route(RouteShipment::new(ROUTE, code))
                .unwrap();
        }

        h.routes.dispatch_route(ROUTE).unwrap();
        assert_eq!(
            h.shipments.require("DEF456").unwrap().status(),
            ShipmentStatus::InTransit
        );
        assert_eq!(h.centers.require("MAD16").unwrap().inventory_len(), 0);

        let err = h.routes.dispatch_route(ROUTE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);

        let route = h.routes.complete_route(ROUTE).unwrap();
        assert!(!route.is_active());
        assert_eq!(
            h.shipments.require("ABC123").unwrap().status(),
            ShipmentStatus::Delivered
        );
        assert_eq!(h.centers.require("BCN03").unwrap().inventory_len(), 2);

        assert_eq!(
            h.routes.complete_route(ROUTE).unwrap_err().kind(),
            ErrorKind::InactiveRoute
        );
        assert_eq!(
            h.routes.dispatch_route(ROUTE).unwrap_err().kind(),
            ErrorKind::InactiveRoute
        );
    }

    #[test]
    fn dispatch_of_empty_route_is_refused() {
        let h = harness();
        let err = h.routes.dispatch_route(ROUTE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn failed_complete_changes_nothing() {
        let h = harness();
        h.routes
            .assign_shipment_to_route(RouteShipment::new(ROUTE, "ABC123"))
            .unwrap();
        let events_before = h.journal.get_events_by_type("RouteCompleted").unwrap().len();

        let err = h.routes.complete_route(ROUTE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);

        assert!(h.routes.get_route(ROUTE).unwrap().is_active());
        assert!(h.centers.require("MAD16").unwrap().has("ABC123"));
        assert!(!h.centers.require("BCN03").unwrap().has("ABC123"));
        assert_eq!(
            h.journal.get_events_by_type("RouteCompleted").unwrap().len(),
            events_before
        );
    }

    #[test]
    fn complete_refuses_shipment_held_off_route() {
        let h = harness();
        h.routes
            .assign_shipment_to_route(RouteShipment::new(ROUTE, "ABC123"))
            .unwrap();
        h.routes.dispatch_route(ROUTE).unwrap();

        // Plant the in-transit shipment at a third center directly
        let mut sevilla = h.centers.require("SEV01").unwrap();
        sevilla
            .receive(&h.shipments.require("ABC123").unwrap())
            .unwrap();
        let mut uow = UnitOfWork::new(&h.journal, "test");
        uow.stage(&h.centers, &mut sevilla).unwrap();
        uow.commit().unwrap();

        let err = h.routes.complete_route(ROUTE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(err.to_string().contains("SEV01"));
        assert!(h.routes.get_route(ROUTE).unwrap().is_active());
        assert!(!h.centers.require("BCN03").unwrap().has("ABC123"));
        assert_eq!(
            h.shipments.require("ABC123").unwrap().status(),
            ShipmentStatus::InTransit
        );
    }

    #[test]
    fn batch_assignment_reports_canonical_codes() {
        let h = harness();
        let summary = h
            .routes
            .assign_shipments_to_route(AssignShipments::new(ROUTE, [" ghi789 ", "Def456"]))
            .unwrap();
        assert_eq!(summary.assigned, ["GHI789", "DEF456"]);
        assert!(summary.failed.is_empty());

        let manifest: Vec<_> = h
            .routes
            .get_route(ROUTE)
            .unwrap()
            .list_manifest()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(summary.assigned, manifest);
    }

    #[test]
    fn list_routes_is_sorted() {
        let h = harness();
        h.routes
            .create_route(CreateRoute::new("BCN03-MAD16-EXP-001", "BCN03", "MAD16"))
            .unwrap();

        let ids: Vec<_> = h
            .routes
            .list_routes()
            .iter()
            .map(|r| r.route_id().to_string())
            .collect();
        assert_eq!(ids, ["BCN03-MAD16-EXP-001", ROUTE]);
    }
}
