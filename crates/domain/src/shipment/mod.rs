//! Shipment aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod kind;
mod service;
mod state;

pub use aggregate::Shipment;
pub use commands::*;
pub use events::{
    PriorityChangedData, RouteAssignedData, RouteRemovedData, ShipmentEvent,
    ShipmentRegisteredData, StatusChangedData,
};
pub use kind::{PriorityPolicy, ShipmentKind};
pub use service::ShipmentService;
pub use state::ShipmentStatus;

use thiserror::Error;

use crate::error::ErrorKind;

/// Errors that can occur during shipment operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShipmentError {
    /// A required text field was empty.
    #[error("Shipment {field} cannot be empty")]
    EmptyField { field: &'static str },

    /// Priority outside the 1-3 scale.
    #[error("Invalid priority: {priority} (must be between 1 and 3)")]
    PriorityOutOfRange { priority: i64 },

    /// Priority below the variant's floor.
    #[error("{kind} shipments require a priority of at least {floor}, got {priority}")]
    PriorityBelowFloor {
        kind: ShipmentKind,
        floor: u8,
        priority: i64,
    },

    /// Priority cannot go any higher.
    #[error("Priority is already at the maximum ({priority})")]
    PriorityAtMaximum { priority: u8 },

    /// Priority cannot go any lower.
    #[error("Priority is already at the minimum allowed for {kind} shipments ({priority})")]
    PriorityAtMinimum { kind: ShipmentKind, priority: u8 },

    /// The variant's priority is immutable.
    #[error("{kind} shipments have a fixed priority of {priority}")]
    PriorityFixed { kind: ShipmentKind, priority: u8 },

    /// Status name not recognised.
    #[error("Unknown shipment status '{0}'")]
    UnknownStatus(String),

    /// Shipment type not recognised.
    #[error("Unknown shipment type '{0}' (expected STANDARD, FRAGILE or EXPRESS)")]
    UnknownKind(String),

    /// Status change is not one of the permitted forward edges.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: ShipmentStatus,
        to: ShipmentStatus,
    },

    /// The shipment is not assigned to any route.
    #[error("Shipment {tracking_code} is not assigned to a route")]
    NotAssigned { tracking_code: String },

    /// The shipment already belongs to a route.
    #[error("Shipment {tracking_code} is already assigned to route {route_id}")]
    AlreadyAssigned {
        tracking_code: String,
        route_id: String,
    },

    /// A center holds the shipment; only its dispatch may send it on.
    #[error("Shipment {tracking_code} is held at center {center_id} and must be dispatched from there")]
    HeldAtCenter {
        tracking_code: String,
        center_id: String,
    },

    /// The shipment's movements belong to its route.
    #[error("Shipment {tracking_code} travels on route {route_id} and can only be moved by it")]
    MovedByRoute {
        tracking_code: String,
        route_id: String,
    },
}

impl ShipmentError {
    /// Returns the failure class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShipmentError::EmptyField { .. }
            | ShipmentError::PriorityOutOfRange { .. }
            | ShipmentError::PriorityBelowFloor { .. }
            | ShipmentError::PriorityAtMaximum { .. }
            | ShipmentError::PriorityAtMinimum { .. }
            | ShipmentError::PriorityFixed { .. }
            | ShipmentError::UnknownStatus(_)
            | ShipmentError::UnknownKind(_) => ErrorKind::Validation,
            ShipmentError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            ShipmentError::NotAssigned { .. }
            | ShipmentError::AlreadyAssigned { .. }
            | ShipmentError::HeldAtCenter { .. }
            | ShipmentError::MovedByRoute { .. } => ErrorKind::Precondition,
        }
    }
}
