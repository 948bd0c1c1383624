//! Explicit unit of work for multi-aggregate changes.

use event_store::{EventEnvelope, EventStore, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;
use crate::repository::Repository;

type Write<'a> = Box<dyn FnOnce() + 'a>;

/// Batches the changes of one application operation.
///
/// The unit of work is responsible for:
/// 1. Turning each staged aggregate's pending events into journal envelopes
/// 2. Appending all envelopes to the journal in a single atomic append
/// 3. Writing every staged aggregate back to its repository
///
/// Nothing is written if the append fails, so an operation either persists
/// all the aggregates it touched or none of them.
pub struct UnitOfWork<'a, E: EventStore> {
    journal: &'a E,
    operation: &'static str,
    envelopes: Vec<EventEnvelope>,
    writes: Vec<Write<'a>>,
}

impl<'a, E: EventStore> UnitOfWork<'a, E> {
    /// Starts a unit of work for the named operation.
    pub fn new(journal: &'a E, operation: &'static str) -> Self {
        Self {
            journal,
            operation,
            envelopes: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Stages an aggregate: journals its pending events and queues a write of
    /// its current state.
    ///
    /// The pending events are drained from `aggregate`, so the caller keeps a
    /// clean copy that matches what will be stored.
    pub fn stage<A, R>(&mut self, repository: &'a R, aggregate: &mut A) -> Result<(), DomainError>
    where
        A: Aggregate + 'a,
        R: Repository<A> + ?Sized,
    {
        let events = aggregate.take_events();
        let mut version = Version::new(aggregate.version().as_i64() - events.len() as i64);

        for event in &events {
            version = version.next();
            let envelope = EventEnvelope::builder()
                .aggregate_id(aggregate.id())
                .aggregate_type(A::aggregate_type())
                .event_type(event.event_type())
                .version(version)
                .payload(event)?
                .metadata("operation", serde_json::json!(self.operation))
                .build()?;
            self.envelopes.push(envelope);
        }

        let stored = aggregate.clone();
        self.writes.push(Box::new(move || repository.add(stored)));
        Ok(())
    }

    /// Stages every aggregate of a collection.
    pub fn stage_all<A, R>(
        &mut self,
        repository: &'a R,
        aggregates: &mut [A],
    ) -> Result<(), DomainError>
    where
        A: Aggregate + 'a,
        R: Repository<A> + ?Sized,
    {
        for aggregate in aggregates {
            self.stage(repository, aggregate)?;
        }
        Ok(())
    }

    /// Returns the number of journal entries staged so far.
    pub fn pending_events(&self) -> usize {
        self.envelopes.len()
    }

    /// Appends the staged events and performs the staged writes.
    ///
    /// Returns the number of events journaled.
    pub fn commit(self) -> Result<usize, DomainError> {
        let count = self.envelopes.len();
        if count > 0 {
            self.journal.append(self.envelopes)?;
        }

        for write in self.writes {
            write();
        }

        tracing::debug!(operation = self.operation, events = count, "committed unit of work");
        Ok(count)
    }
}
