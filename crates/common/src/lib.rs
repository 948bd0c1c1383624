//! Shared identifier types for the logistics network.
//!
//! Every aggregate is keyed by a natural identifier chosen by the operator.
//! The types here trim and canonicalise those identifiers once, at the edge,
//! so that lookups everywhere else can compare them directly.

mod types;

pub use types::{CenterId, IdError, RouteId, RouteType, TrackingCode, normalize_key};
