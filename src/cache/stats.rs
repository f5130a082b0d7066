//! Cache Statistics Module
//!
//! Tracks cache activity with lock-free counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads that found a live entry
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Entries written through set, set_many or get_or_set
    pub inserts: u64,
    /// Entries removed by sweeps because they outlived the TTL
    pub expirations: u64,
    /// Completed sweep passes
    pub sweeps: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Collector ==
/// Atomic counters shared between callers and the reclaimer.
#[derive(Debug, Default)]
pub(crate) struct StatsCollector {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    expirations: AtomicU64,
    sweeps: AtomicU64,
}

impl StatsCollector {
    pub fn record_lookup(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_inserts(&self, count: u64) {
        self.inserts.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_sweep(&self, expired: u64) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.expirations.fetch_add(expired, Ordering::Relaxed);
    }

    pub fn snapshot(&self, total_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            total_entries,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = StatsCollector::default().snapshot(0);
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let collector = StatsCollector::default();
        collector.record_lookup(true);
        collector.record_lookup(true);
        collector.record_lookup(true);
        collector.record_lookup(false);

        let stats = collector.snapshot(3);
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.75);
        assert_eq!(stats.total_entries, 3);
    }

    #[test]
    fn test_record_sweep() {
        let collector = StatsCollector::default();
        collector.record_sweep(4);
        collector.record_sweep(0);

        let stats = collector.snapshot(0);
        assert_eq!(stats.sweeps, 2);
        assert_eq!(stats.expirations, 4);
    }

    #[test]
    fn test_stats_serialize() {
        let collector = StatsCollector::default();
        collector.record_inserts(2);

        let json = serde_json::to_value(collector.snapshot(2)).unwrap();
        assert_eq!(json["inserts"], 2);
        assert_eq!(json["total_entries"], 2);
    }
}
