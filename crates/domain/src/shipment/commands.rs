//! Shipment commands.

/// Command to register a new shipment.
#[derive(Debug, Clone)]
pub struct RegisterShipment {
    /// The tracking code to register.
    pub tracking_code: String,

    pub sender: String,

    pub recipient: String,

    /// Requested priority. Ignored for express shipments.
    pub priority: i64,

    /// Variant name: STANDARD, FRAGILE or EXPRESS (any case).
    pub kind: String,
}

impl RegisterShipment {
    /// Creates a new RegisterShipment command.
    pub fn new(
        tracking_code: impl Into<String>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        priority: i64,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            tracking_code: tracking_code.into(),
            sender: sender.into(),
            recipient: recipient.into(),
            priority,
            kind: kind.into(),
        }
    }
}

/// Command to move a shipment to a new status.
#[derive(Debug, Clone)]
pub struct UpdateShipmentStatus {
    pub tracking_code: String,

    /// Target status name, parsed case-insensitively.
    pub status: String,
}

impl UpdateShipmentStatus {
    /// Creates a new UpdateShipmentStatus command.
    pub fn new(tracking_code: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            tracking_code: tracking_code.into(),
            status: status.into(),
        }
    }
}
