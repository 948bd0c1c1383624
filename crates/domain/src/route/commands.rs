//! Route commands.

/// Command to declare a new route between two centers.
#[derive(Debug, Clone)]
pub struct CreateRoute {
    /// Identifier in the `ORIGIN-DESTINATION-TYPE-NNN` format.
    pub route_id: String,

    /// Id of the center shipments leave from.
    pub origin: String,

    /// Id of the center shipments are delivered to.
    pub destination: String,
}

impl CreateRoute {
    /// Creates a new CreateRoute command.
    pub fn new(
        route_id: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            route_id: route_id.into(),
            origin: origin.into(),
            destination: destination.into(),
        }
    }
}

/// Command to put a shipment on a route, or take it off again.
#[derive(Debug, Clone)]
pub struct RouteShipment {
    pub route_id: String,
    pub tracking_code: String,
}

impl RouteShipment {
    /// Creates a new RouteShipment command.
    pub fn new(route_id: impl Into<String>, tracking_code: impl Into<String>) -> Self {
        Self {
            route_id: route_id.into(),
            tracking_code: tracking_code.into(),
        }
    }
}

/// Command to put several shipments on a route at once.
///
/// Each shipment is attempted on its own; one failure does not stop the
/// others.
#[derive(Debug, Clone)]
pub struct AssignShipments {
    pub route_id: String,
    pub tracking_codes: Vec<String>,
}

impl AssignShipments {
    /// Creates a new AssignShipments command.
    pub fn new<I, T>(route_id: impl Into<String>, tracking_codes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            route_id: route_id.into(),
            tracking_codes: tracking_codes.into_iter().map(Into::into).collect(),
        }
    }
}
