//! Domain error types.

use common::IdError;
use event_store::EventStoreError;
use serde::Serialize;
use thiserror::Error;

use crate::center::CenterError;
use crate::route::RouteError;
use crate::shipment::ShipmentError;

/// Class of a failure, independent of which aggregate raised it.
///
/// Callers branch on the kind; the message carries the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or empty input, out-of-range priority, bad id format.
    Validation,
    /// Lookup by id failed.
    NotFound,
    /// Duplicate id on create, or the aggregate changed underneath us.
    Conflict,
    /// Illegal shipment status change.
    InvalidTransition,
    /// Mutation attempted on a completed route.
    InactiveRoute,
    /// The operation is not possible in the current state.
    Precondition,
    /// Infrastructure failure.
    Internal,
}

impl ErrorKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::InactiveRoute => "inactive_route",
            ErrorKind::Precondition => "precondition",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An identifier could not be parsed.
    #[error(transparent)]
    Id(#[from] IdError),

    /// An error occurred in the shipment aggregate.
    #[error(transparent)]
    Shipment(#[from] ShipmentError),

    /// An error occurred in the center aggregate.
    #[error(transparent)]
    Center(#[from] CenterError),

    /// An error occurred in the route aggregate.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// Aggregate not found.
    #[error("{aggregate_type} '{aggregate_id}' not found")]
    NotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// An aggregate with the same id already exists.
    #[error("{aggregate_type} '{aggregate_id}' already exists")]
    Conflict {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),
}

impl DomainError {
    pub(crate) fn not_found(aggregate_type: &'static str, aggregate_id: impl Into<String>) -> Self {
        DomainError::NotFound {
            aggregate_type,
            aggregate_id: aggregate_id.into(),
        }
    }

    pub(crate) fn conflict(aggregate_type: &'static str, aggregate_id: impl Into<String>) -> Self {
        DomainError::Conflict {
            aggregate_type,
            aggregate_id: aggregate_id.into(),
        }
    }

    /// Returns the failure class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Id(_) => ErrorKind::Validation,
            DomainError::Shipment(e) => e.kind(),
            DomainError::Center(e) => e.kind(),
            DomainError::Route(e) => e.kind(),
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::Conflict { .. } => ErrorKind::Conflict,
            DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. }) => {
                ErrorKind::Conflict
            }
            DomainError::EventStore(_) => ErrorKind::Internal,
        }
    }
}
