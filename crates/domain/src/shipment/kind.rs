//! Shipment variants and their priority policies.

use serde::{Deserialize, Serialize};

use super::ShipmentError;

/// Lowest priority on the scale.
pub const MIN_PRIORITY: u8 = 1;

/// Highest priority on the scale.
pub const MAX_PRIORITY: u8 = 3;

/// Priority rules of one shipment variant.
///
/// Evaluated by shared logic rather than per-variant overrides: `min` and
/// `max` bound increases and decreases, `fixed` pins the priority for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityPolicy {
    pub min: u8,
    pub max: u8,
    pub fixed: Option<u8>,
}

/// The kind of shipment, which decides its priority policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShipmentKind {
    /// Priority 1-3, freely adjustable.
    #[default]
    Standard,

    /// Priority floor of 2.
    Fragile,

    /// Priority fixed at 3.
    Express,
}

impl ShipmentKind {
    /// Returns the priority policy of this variant.
    pub fn policy(&self) -> PriorityPolicy {
        match self {
            ShipmentKind::Standard => PriorityPolicy {
                min: MIN_PRIORITY,
                max: MAX_PRIORITY,
                fixed: None,
            },
            ShipmentKind::Fragile => PriorityPolicy {
                min: 2,
                max: MAX_PRIORITY,
                fixed: None,
            },
            ShipmentKind::Express => PriorityPolicy {
                min: MAX_PRIORITY,
                max: MAX_PRIORITY,
                fixed: Some(MAX_PRIORITY),
            },
        }
    }

    /// Returns the variant name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentKind::Standard => "STANDARD",
            ShipmentKind::Fragile => "FRAGILE",
            ShipmentKind::Express => "EXPRESS",
        }
    }

    /// Computes the priority a new shipment of this variant starts with.
    ///
    /// A fixed-priority variant ignores `requested` entirely.
    pub fn initial_priority(&self, requested: i64) -> Result<u8, ShipmentError> {
        let policy = self.policy();
        if let Some(fixed) = policy.fixed {
            return Ok(fixed);
        }

        let priority = u8::try_from(requested)
            .ok()
            .filter(|p| (MIN_PRIORITY..=MAX_PRIORITY).contains(p))
            .ok_or(ShipmentError::PriorityOutOfRange {
                priority: requested,
            })?;

        if priority < policy.min {
            return Err(ShipmentError::PriorityBelowFloor {
                kind: *self,
                floor: policy.min,
                priority: requested,
            });
        }

        Ok(priority)
    }

    /// Returns the priority one step above `current`.
    pub fn increased(&self, current: u8) -> Result<u8, ShipmentError> {
        let policy = self.policy();
        if let Some(fixed) = policy.fixed {
            return Err(ShipmentError::PriorityFixed {
                kind: *self,
                priority: fixed,
            });
        }
        if current >= policy.max {
            return Err(ShipmentError::PriorityAtMaximum { priority: current });
        }
        Ok(current + 1)
    }

    /// Returns the priority one step below `current`.
    pub fn decreased(&self, current: u8) -> Result<u8, ShipmentError> {
        let policy = self.policy();
        if let Some(fixed) = policy.fixed {
            return Err(ShipmentError::PriorityFixed {
                kind: *self,
                priority: fixed,
            });
        }
        if current <= policy.min {
            return Err(ShipmentError::PriorityAtMinimum {
                kind: *self,
                priority: current,
            });
        }
        Ok(current - 1)
    }
}

impl std::fmt::Display for ShipmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShipmentKind {
    type Err = ShipmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STANDARD" => Ok(ShipmentKind::Standard),
            "FRAGILE" => Ok(ShipmentKind::Fragile),
            "EXPRESS" => Ok(ShipmentKind::Express),
            _ => Err(ShipmentError::UnknownKind(s.trim().to_string())),
        }
    }
}
