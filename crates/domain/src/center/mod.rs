//! Logistics center aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;

pub use aggregate::Center;
pub use commands::*;
pub use events::{CenterEvent, CenterRegisteredData, InventoryChangeData};
pub use service::CenterService;

use common::IdError;
use thiserror::Error;

use crate::error::ErrorKind;
use crate::shipment::ShipmentError;

/// Errors that can occur during center operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CenterError {
    /// The center id could not be parsed.
    #[error(transparent)]
    InvalidId(#[from] IdError),

    /// A required text field was empty.
    #[error("Center {field} cannot be empty")]
    EmptyField { field: &'static str },

    /// The shipment is already in this center's inventory.
    #[error("Shipment {tracking_code} is already in center {center_id}")]
    AlreadyPresent {
        center_id: String,
        tracking_code: String,
    },

    /// The shipment is not in this center's inventory.
    #[error("Shipment {tracking_code} is not in center {center_id}")]
    NotPresent {
        center_id: String,
        tracking_code: String,
    },

    /// The shipment refused the status change.
    #[error(transparent)]
    Shipment(#[from] ShipmentError),
}

impl CenterError {
    /// Returns the failure class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CenterError::InvalidId(_) | CenterError::EmptyField { .. } => ErrorKind::Validation,
            CenterError::AlreadyPresent { .. } | CenterError::NotPresent { .. } => {
                ErrorKind::Precondition
            }
            CenterError::Shipment(e) => e.kind(),
        }
    }
}
