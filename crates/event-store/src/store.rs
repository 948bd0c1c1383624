use std::collections::HashMap;

use crate::{EventEnvelope, EventQuery, EventStoreError, Result, Version};

/// Core trait for event store implementations.
///
/// An event store persists and retrieves events. Streams are identified by
/// the pair (aggregate type, aggregate id). Calls are synchronous and run to
/// completion; implementations must be thread-safe (Send + Sync).
pub trait EventStore: Send + Sync {
    /// Appends a batch of events to the store.
    ///
    /// The batch may cover several aggregates and is appended atomically:
    /// either all events are stored or none are. For every aggregate in the
    /// batch, the first version must directly follow the stored version,
    /// otherwise the append fails with `ConcurrencyConflict`.
    ///
    /// Returns the number of events appended.
    fn append(&self, events: Vec<EventEnvelope>) -> Result<usize>;

    /// Retrieves all events for a specific aggregate in version order.
    fn get_events_for_aggregate(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Vec<EventEnvelope>>;

    /// Retrieves events matching a query, in journal order.
    fn query_events(&self, query: EventQuery) -> Result<Vec<EventEnvelope>>;

    /// Retrieves events by type, in journal order.
    fn get_events_by_type(&self, event_type: &str) -> Result<Vec<EventEnvelope>>;

    /// Gets the current version of an aggregate.
    ///
    /// Returns None if the aggregate has no events.
    fn get_aggregate_version(
        &self,
        aggregate_type: &str,
        aggregate_id: &str,
    ) -> Result<Option<Version>>;
}

/// Extension trait providing convenience methods for event stores.
pub trait EventStoreExt: EventStore {
    /// Appends a single event to the store.
    fn append_event(&self, event: EventEnvelope) -> Result<usize> {
        self.append(vec![event])
    }

    /// Checks if an aggregate has any events.
    fn aggregate_exists(&self, aggregate_type: &str, aggregate_id: &str) -> Result<bool> {
        Ok(self
            .get_aggregate_version(aggregate_type, aggregate_id)?
            .is_some())
    }
}

// Blanket implementation for all EventStore implementations
impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Validates a batch before appending.
///
/// Returns the first version of each aggregate stream in the batch, keyed by
/// (aggregate type, aggregate id). Versions within one stream must be
/// sequential.
pub fn validate_events_for_append(
    events: &[EventEnvelope],
) -> Result<HashMap<(String, String), Version>> {
    if events.is_empty() {
        return Err(EventStoreError::InvalidAppend(
            "Cannot append empty event list".to_string(),
        ));
    }

    let mut first_versions = HashMap::new();
    let mut last_versions: HashMap<(String, String), Version> = HashMap::new();

    for event in events {
        let key = (event.aggregate_type.clone(), event.aggregate_id.clone());
        match last_versions.get(&key) {
            Some(last) if event.version != last.next() => {
                return Err(EventStoreError::InvalidAppend(format!(
                    "Event versions for {} {} must be sequential. Expected {}, got {}",
                    key.0,
                    key.1,
                    last.next(),
                    event.version
                )));
            }
            Some(_) => {}
            None => {
                first_versions.insert(key.clone(), event.version);
            }
        }
        last_versions.insert(key, event.version);
    }

    Ok(first_versions)
}
