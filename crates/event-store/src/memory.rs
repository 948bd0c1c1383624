use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    EventEnvelope, EventQuery, EventStoreError, Result, Version,
    store::{EventStore, validate_events_for_append},
};

/// In-memory event store.
///
/// Events are kept in journal (append) order. Clones share the same
/// underlying journal.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<EventEnvelope>>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored.
    pub fn event_count(&self) -> usize {
        self.read().len()
    }

    /// Clears all events.
    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<EventEnvelope>> {
        self.events.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<EventEnvelope>> {
        self.events.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn stored_version(events: &[EventEnvelope], aggregate_type: &str, aggregate_id: &str) -> Version {
    events
        .iter()
        .filter(|e| e.belongs_to(aggregate_type, aggregate_id))
        .map(|e| e.version)
        .max()
        .unwrap_or(Version::initial())
}

impl EventStore for InMemoryEventStore {
    fn append(&self, events: Vec<EventEnvelope>) -> Result<usize> {
        let first_versions = validate_events_for_append(&events)?;

        let mut store = self.write();

        // Check every stream before storing anything
        for ((aggregate_type, aggregate_id), first) in &first_versions {
            let current = stored_version(&store, aggregate_type, aggregate_id);
            let expected = first.previous();
            if current != expected {
                return Err(EventStoreError::ConcurrencyConflict {
                    aggregate_type: aggregate_type.clone(),
                    aggregate_id: aggregate_id.clone(),
                    expected,
                    actual: current,
                });
            }
        }

        let count = events.len();
        store.extend(events);

        metrics::counter!("journal_events_appended_total").increment(count as u64);
        tracing::debug!(count, streams = first_versions.len(), "appended events");

        Ok(count)
    }

    fn get_events_for_aggregate(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Vec<EventEnvelope>> {
        let store = self.read();
        let mut events: Vec<_> = store
            .iter()
            .filter(|e| e.belongs_to(aggregate_type, aggregate_id))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.version);
        Ok(events)
    }

    fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>> {
        let store = self.read();
        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);

        Ok(store
            .iter()
            .filter(|e| query.matches(e))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventEnvelope>> {
        let store = self.read();
        Ok(store
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect())
    }

    fn get_aggregate_version(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Option<Version>> {
        let store = self.read();
        let version = store
            .iter()
            .filter(|e| e.belongs_to(aggregate_type, aggregate_id))
            .map(|e| e.version)
            .max();
        Ok(version)
    }
}
