//! Domain layer for the logistics network.
//!
//! This crate provides:
//! - Aggregate and DomainEvent traits shared by every aggregate
//! - The Shipment, Center and Route aggregates with their invariants
//! - Repository trait with an in-memory implementation
//! - UnitOfWork for committing multi-aggregate changes together
//! - Application services orchestrating lookups, checks and persistence

pub mod aggregate;
pub mod center;
pub mod error;
pub mod repository;
pub mod route;
pub mod shipment;
pub mod unit_of_work;

pub use aggregate::{Aggregate, DomainEvent};
pub use center::{Center, CenterError, CenterEvent, CenterService, MoveShipment, RegisterCenter};
pub use error::{DomainError, ErrorKind};
pub use repository::{InMemoryRepository, Repository, RepositoryExt};
pub use route::{
    AssignShipments, AssignmentFailure, AssignmentSummary, CreateRoute, Route, RouteError,
    RouteEvent, RouteService, RouteShipment, RouteStatus,
};
pub use shipment::{
    PriorityPolicy, RegisterShipment, Shipment, ShipmentError, ShipmentEvent, ShipmentKind,
    ShipmentService, ShipmentStatus, UpdateShipmentStatus,
};
pub use unit_of_work::UnitOfWork;
