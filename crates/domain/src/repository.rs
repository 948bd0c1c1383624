//! Keyed storage for aggregates.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common::normalize_key;

use crate::aggregate::Aggregate;
use crate::error::DomainError;

/// Minimal keyed-lookup store backing one aggregate type.
///
/// Keys are the aggregates' natural ids, matched case-insensitively after
/// trimming. Any storage technology that honours this contract can back the
/// application services.
pub trait Repository<A: Aggregate>: Send + Sync {
    /// Inserts or replaces the aggregate under its natural id.
    fn add(&self, aggregate: A);

    /// Removes the aggregate. Returns true if something was removed.
    fn remove(&self, id: &str) -> bool;

    /// Looks an aggregate up by id. Returns None for an empty or unknown id.
    fn get_by_id(&self, id: &str) -> Option<A>;

    /// Returns every stored aggregate, in no particular order.
    fn list_all(&self) -> Vec<A>;
}

/// Extension trait providing convenience methods for repositories.
pub trait RepositoryExt<A: Aggregate>: Repository<A> {
    /// Looks an aggregate up, failing with `NotFound` if it is absent.
    fn require(&self, id: &str) -> Result<A, DomainError> {
        self.get_by_id(id)
            .ok_or_else(|| DomainError::not_found(A::aggregate_type(), id.trim()))
    }

    /// Returns true if an aggregate is stored under this id.
    fn contains(&self, id: &str) -> bool {
        self.get_by_id(id).is_some()
    }
}

impl<A: Aggregate, R: Repository<A> + ?Sized> RepositoryExt<A> for R {}

/// In-memory repository keyed by the canonical form of the natural id.
///
/// Clones share the same underlying map.
pub struct InMemoryRepository<A> {
    items: Arc<RwLock<HashMap<String, A>>>,
}

impl<A> InMemoryRepository<A> {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of stored aggregates.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, A>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, A>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A> Default for InMemoryRepository<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for InMemoryRepository<A> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<A: Aggregate> Repository<A> for InMemoryRepository<A> {
    fn add(&self, aggregate: A) {
        let Some(key) = normalize_key(aggregate.id()) else {
            tracing::warn!(
                aggregate_type = A::aggregate_type(),
                "refusing to store aggregate with empty id"
            );
            return;
        };
        self.write().insert(key, aggregate);
    }

    fn remove(&self, id: &str) -> bool {
        match normalize_key(id) {
            Some(key) => self.write().remove(&key).is_some(),
            None => false,
        }
    }

    fn get_by_id(&self, id: &str) -> Option<A> {
        let key = normalize_key(id)?;
        self.read().get(&key).cloned()
    }

    fn list_all(&self) -> Vec<A> {
        self.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::center::Center;

    fn center(id: &str) -> Center {
        Center::create(id, "Centro", "Madrid").unwrap()
    }

    #[test]
    fn add_and_get_is_case_insensitive() {
        let repo = InMemoryRepository::new();
        repo.add(center("MAD16"));

        assert!(repo.get_by_id("mad16").is_some());
        assert!(repo.get_by_id("  MAD16 ").is_some());
        assert!(repo.get_by_id("BCN03").is_none());
    }

    #[test]
    fn empty_ids_resolve_to_none() {
        let repo: InMemoryRepository<Center> = InMemoryRepository::new();
        repo.add(center("MAD16"));

        assert!(repo.get_by_id("").is_none());
        assert!(repo.get_by_id("   ").is_none());
        assert!(!repo.remove(""));
    }

    #[test]
    fn add_replaces_existing_entry() {
        let repo = InMemoryRepository::new();
        repo.add(center("MAD16"));
        repo.add(Center::create("mad16", "Otro", "Getafe").unwrap());

        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get_by_id("MAD16").unwrap().name(), "Otro");
    }

    #[test]
    fn remove_reports_whether_something_was_removed() {
        let repo = InMemoryRepository::new();
        repo.add(center("MAD16"));

        assert!(repo.remove("Mad16"));
        assert!(!repo.remove("MAD16"));
        assert!(repo.is_empty());
    }

    #[test]
    fn list_all_returns_every_entry() {
        let repo = InMemoryRepository::new();
        repo.add(center("MAD16"));
        repo.add(center("BCN03"));

        let mut ids: Vec<_> = repo
            .list_all()
            .into_iter()
            .map(|c| c.center_id().to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["BCN03", "MAD16"]);
    }

    #[test]
    fn require_reports_not_found() {
        let repo: InMemoryRepository<Center> = InMemoryRepository::new();
        let err = repo.require(" BCN03 ").unwrap_err();
        assert_eq!(err.to_string(), "Center 'BCN03' not found");
        assert!(!repo.contains("BCN03"));
    }

    #[test]
    fn clones_share_storage() {
        let repo = InMemoryRepository::new();
        let clone = repo.clone();
        clone.add(center("MAD16"));
        assert!(repo.contains("MAD16"));
    }
}
