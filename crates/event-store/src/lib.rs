//! Append-only activity journal.
//!
//! Every change to a shipment, center or route is recorded as an
//! [`EventEnvelope`] keyed by the aggregate's type and natural id. A commit
//! may span several aggregates; it is appended atomically and checked for
//! version continuity per aggregate.

pub mod error;
pub mod event;
pub mod memory;
pub mod query;
pub mod store;

pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, Version};
pub use memory::InMemoryEventStore;
pub use query::EventQuery;
pub use store::{EventStore, EventStoreExt};
