//! Route aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;

pub use aggregate::{Route, RouteStatus};
pub use commands::*;
pub use events::{
    ManifestChangeData, RouteCompletedData, RouteCreatedData, RouteDispatchedData, RouteEvent,
};
pub use service::{AssignmentFailure, AssignmentSummary, RouteService};

use common::IdError;
use thiserror::Error;

use crate::center::CenterError;
use crate::error::ErrorKind;
use crate::shipment::{ShipmentError, ShipmentStatus};

/// Errors that can occur during route operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The route id is empty or does not follow the format.
    #[error(transparent)]
    InvalidId(#[from] IdError),

    /// A route must connect two different centers.
    #[error("Origin and destination must be different centers (both are {center_id})")]
    SameOriginAndDestination { center_id: String },

    /// The route has been completed.
    #[error("Route {route_id} is not active")]
    Inactive { route_id: String },

    /// The center passed in is not the route's origin or destination.
    #[error("Center {actual} is not the {role} of route {route_id} (expected {expected})")]
    CenterMismatch {
        route_id: String,
        role: &'static str,
        expected: String,
        actual: String,
    },

    /// The shipment is already in the manifest.
    #[error("Shipment {tracking_code} is already on route {route_id}")]
    AlreadyInManifest {
        route_id: String,
        tracking_code: String,
    },

    /// The shipment is not in the manifest.
    #[error("Shipment {tracking_code} is not on route {route_id}")]
    NotInManifest {
        route_id: String,
        tracking_code: String,
    },

    /// Only registered shipments can be loaded onto a route.
    #[error("Shipment {tracking_code} cannot be added to a route while {status}")]
    NotRegistered {
        tracking_code: String,
        status: ShipmentStatus,
    },

    /// The shipment has already left the origin.
    #[error("Shipment {tracking_code} has already left {center_id}")]
    NotAtOrigin {
        tracking_code: String,
        center_id: String,
    },

    /// Nothing has been assigned to the route.
    #[error("Route {route_id} has no shipments")]
    EmptyManifest { route_id: String },

    /// Every shipment on the route is already on its way.
    #[error("Route {route_id} has already been dispatched")]
    AlreadyDispatched { route_id: String },

    /// The shipments supplied do not match the manifest.
    #[error("Shipments supplied for route {route_id} do not match its manifest")]
    ManifestMismatch { route_id: String },

    /// A shipment refused the change.
    #[error(transparent)]
    Shipment(#[from] ShipmentError),

    /// A center refused the change.
    #[error(transparent)]
    Center(#[from] CenterError),
}

impl RouteError {
    /// Returns the failure class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RouteError::InvalidId(_) | RouteError::SameOriginAndDestination { .. } => {
                ErrorKind::Validation
            }
            RouteError::Inactive { .. } => ErrorKind::InactiveRoute,
            RouteError::CenterMismatch { .. }
            | RouteError::AlreadyInManifest { .. }
            | RouteError::NotInManifest { .. }
            | RouteError::NotRegistered { .. }
            | RouteError::NotAtOrigin { .. }
            | RouteError::EmptyManifest { .. }
            | RouteError::AlreadyDispatched { .. } => ErrorKind::Precondition,
            RouteError::ManifestMismatch { .. } => ErrorKind::Internal,
            RouteError::Shipment(e) => e.kind(),
            RouteError::Center(e) => e.kind(),
        }
    }
}
