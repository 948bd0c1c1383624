//! Shipment status state machine.

use serde::{Deserialize, Serialize};

use super::ShipmentError;

/// The status of a shipment in its lifecycle.
///
/// State transitions:
/// ```text
/// Registered ──► InTransit ──► Delivered
/// ```
///
/// Both edges are triggered from outside the shipment: a center dispatch
/// moves it in transit, completing its route delivers it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    /// Registered and waiting to leave.
    #[default]
    Registered,

    /// Dispatched from a center and on its way.
    InTransit,

    /// Received at its destination (terminal state).
    Delivered,
}

impl ShipmentStatus {
    /// Returns the only status this one may advance to.
    pub fn next(&self) -> Option<ShipmentStatus> {
        match self {
            ShipmentStatus::Registered => Some(ShipmentStatus::InTransit),
            ShipmentStatus::InTransit => Some(ShipmentStatus::Delivered),
            ShipmentStatus::Delivered => None,
        }
    }

    /// Returns true if `to` is the permitted next status.
    pub fn can_transition_to(&self, to: ShipmentStatus) -> bool {
        self.next() == Some(to)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShipmentStatus::Delivered)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Registered => "REGISTERED",
            ShipmentStatus::InTransit => "IN_TRANSIT",
            ShipmentStatus::Delivered => "DELIVERED",
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ShipmentStatus {
    type Err = ShipmentError;

    /// Parses a status name, ignoring case and treating spaces or dashes as
    /// underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "REGISTERED" => Ok(ShipmentStatus::Registered),
            "IN_TRANSIT" => Ok(ShipmentStatus::InTransit),
            "DELIVERED" => Ok(ShipmentStatus::Delivered),
            _ => Err(ShipmentError::UnknownStatus(s.trim().to_string())),
        }
    }
}
