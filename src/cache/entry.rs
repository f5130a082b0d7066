//! Cache Entry Module
//!
//! Defines the record stored for each key, including its position in the age list.

use std::time::{Duration, Instant};

// == Entry ==
/// A stored value together with its key, creation instant and age-list links.
///
/// `prev` and `next` are slot indices into the owning arena, pointing at the
/// chronologically older and younger neighbours.
#[derive(Debug, Clone)]
pub struct Entry<K, T> {
    /// The stored value
    pub value: T,
    /// The key, kept so eviction from the list can unlink the index
    pub key: K,
    /// Instant the entry was written
    pub created: Instant,
    /// Slot of the next older entry
    pub(crate) prev: Option<usize>,
    /// Slot of the next younger entry
    pub(crate) next: Option<usize>,
}

impl<K, T> Entry<K, T> {
    // == Constructor ==
    /// Creates an unlinked entry stamped with `created`.
    pub fn new(key: K, value: T, created: Instant) -> Self {
        Self {
            value,
            key,
            created,
            prev: None,
            next: None,
        }
    }

    // == Age ==
    /// Time elapsed between creation and `now`, saturating at zero.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created)
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl` at `now`.
    ///
    /// An entry is expired once its age reaches the TTL. A zero TTL disables
    /// expiration entirely.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        !ttl.is_zero() && self.age(now) >= ttl
    }
}
