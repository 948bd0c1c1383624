//! Core aggregate and domain event traits.

use event_store::Version;
use serde::{Serialize, Serializer};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + Send + Sync + Clone + std::fmt::Debug {
    /// Returns the event type name.
    ///
    /// This is used as the journal's event type and for filtering.
    fn event_type(&self) -> &'static str;
}

/// Trait for the aggregates of the logistics network.
///
/// An aggregate is a cluster of domain objects that can be treated as a
/// single unit. The aggregate root ensures consistency of changes being made
/// within the aggregate.
///
/// Aggregates here are state-stored: their current state lives in a
/// repository. Every successful mutation also records a domain event and
/// bumps the version, so that a unit of work can journal exactly what
/// changed and detect stale copies.
pub trait Aggregate: Clone + Send + Sync {
    /// The type of events this aggregate records.
    type Event: DomainEvent;

    /// Returns the aggregate type name.
    ///
    /// Used for journal organization and error messages.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's natural key.
    fn id(&self) -> &str;

    /// Returns the current version of the aggregate.
    ///
    /// Version is 1 right after creation and increments with each event.
    fn version(&self) -> Version;

    /// Removes and returns the events recorded since the last call.
    fn take_events(&mut self) -> Vec<Self::Event>;

    /// Returns true if events are waiting to be journaled.
    fn has_pending_events(&self) -> bool;
}

/// Uncommitted events of one aggregate, plus its version counter.
#[derive(Debug, Clone)]
pub(crate) struct Changes<E> {
    version: Version,
    pending: Vec<E>,
}

impl<E> Changes<E> {
    /// Starts a fresh aggregate whose first event is `created`.
    pub(crate) fn created(created: E) -> Self {
        Self {
            version: Version::first(),
            pending: vec![created],
        }
    }

    pub(crate) fn record(&mut self, event: E) {
        self.version = self.version.next();
        self.pending.push(event);
    }

    pub(crate) fn version(&self) -> Version {
        self.version
    }

    pub(crate) fn take(&mut self) -> Vec<E> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Serializes as the aggregate's version; pending events are never exposed.
impl<E> Serialize for Changes<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.version.serialize(serializer)
    }
}
