//! Cache Configuration Module
//!
//! Construction parameters for a [`Cache`](crate::cache::Cache).

use std::time::Duration;

/// Parameters fixed at construction time and preserved across flushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Initial allocation hint for the index; not an entry limit
    pub capacity: usize,
    /// Accepted for compatibility; entries are never evicted for size
    pub strict_capacity: bool,
    /// Maximum entry age; zero disables expiration
    pub ttl: Duration,
    /// Reclaimer tick period; zero disables the reclaimer
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// Creates a config with explicit values for every parameter.
    pub fn new(
        capacity: usize,
        strict_capacity: bool,
        ttl: Duration,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            capacity,
            strict_capacity,
            ttl,
            sweep_interval,
        }
    }

    /// Entries expire after `ttl`, with lazy expiration only.
    pub fn ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    /// Sets the index allocation hint.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the reclaimer tick period.
    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }
}

impl Default for CacheConfig {
    /// No expiration, no reclaimer, no preallocation.
    fn default() -> Self {
        Self {
            capacity: 0,
            strict_capacity: false,
            ttl: Duration::ZERO,
            sweep_interval: Duration::ZERO,
        }
    }
}
