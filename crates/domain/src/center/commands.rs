//! Center commands.

/// Command to register a new center.
#[derive(Debug, Clone)]
pub struct RegisterCenter {
    pub center_id: String,
    pub name: String,
    pub location: String,
}

impl RegisterCenter {
    /// Creates a new RegisterCenter command.
    pub fn new(
        center_id: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            center_id: center_id.into(),
            name: name.into(),
            location: location.into(),
        }
    }
}

/// Command to move a shipment into or out of a center's inventory.
///
/// Used for both receiving and dispatching.
#[derive(Debug, Clone)]
pub struct MoveShipment {
    pub center_id: String,
    pub tracking_code: String,
}

impl MoveShipment {
    /// Creates a new MoveShipment command.
    pub fn new(center_id: impl Into<String>, tracking_code: impl Into<String>) -> Self {
        Self {
            center_id: center_id.into(),
            tracking_code: tracking_code.into(),
        }
    }
}
