//! Cache Store Module
//!
//! Main cache engine: the age index behind a single reader/writer lock, a
//! lock-free length counter, and the reclaimer handle.
//!
//! Every structural change happens under the write lock, so readers never
//! observe the index and the age list out of step.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{AgeIndex, CacheConfig, CacheStats, Clock, SystemClock};
use crate::cache::stats::StatsCollector;
use crate::error::{CacheError, Result};
use crate::tasks::ReclaimerHandle;

// == Shared State ==
/// State reachable from both callers and the reclaimer task.
#[derive(Debug)]
pub(crate) struct Shared<K, T, C> {
    list: RwLock<AgeIndex<K, T>>,
    /// Mirrors `list.len()`; only written while the write lock is held
    length: AtomicUsize,
    stats: StatsCollector,
    pub(crate) config: CacheConfig,
    clock: C,
}

impl<K, T, C> Shared<K, T, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    fn read(&self) -> RwLockReadGuard<'_, AgeIndex<K, T>> {
        self.list.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AgeIndex<K, T>> {
        self.list.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn sync_length(&self, list: &AgeIndex<K, T>) {
        self.length.store(list.len(), Ordering::Release);
    }

    // == Sweep ==
    /// Evicts expired entries from the old end of the list.
    ///
    /// The list is ordered by write time, so the walk stops at the first
    /// entry still within its TTL. Returns the number of entries removed.
    pub(crate) fn sweep(&self) -> usize {
        let ttl = self.config.ttl;
        let mut removed = 0;
        {
            let mut list = self.write();
            let now = self.clock.now();
            while let Some(oldest) = list.oldest() {
                if !oldest.is_expired(now, ttl) {
                    break;
                }
                list.remove_oldest();
                removed += 1;
            }
            self.sync_length(&list);
        }
        self.stats.record_sweep(removed as u64);
        removed
    }
}

// == Cache ==
/// Thread-safe key/value cache with age-based expiration.
///
/// Eviction order is write order: rewriting a key resets its age and moves it
/// to the back of the queue, reads never do. Expired entries are hidden from
/// reads immediately and physically removed by [`sweep`](Cache::sweep) or the
/// background reclaimer.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ttl_cache::{Cache, CacheConfig};
///
/// let cache: Cache<&str, u32> = Cache::new(CacheConfig::ttl(Duration::from_secs(60)));
/// cache.set("answer", 42);
/// assert_eq!(cache.get("answer"), Some(42));
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug)]
pub struct Cache<K, T, C = SystemClock> {
    shared: Arc<Shared<K, T, C>>,
    reclaimer: Mutex<ReclaimerHandle>,
}

impl<K, T> Cache<K, T, SystemClock>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a cache on the system clock with the reclaimer stopped.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, T> Cache<K, T, SystemClock>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    /// Creates a cache and starts its reclaimer when a sweep interval is set.
    ///
    /// Must be called from within a Tokio runtime unless the sweep interval
    /// is zero.
    pub fn with_reclaimer(config: CacheConfig) -> Result<Self> {
        let cache = Self::new(config);
        cache.start_reclaimer()?;
        Ok(cache)
    }
}

impl<K, T, C> Cache<K, T, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Creates a cache that reads time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        if config.strict_capacity {
            debug!(
                capacity = config.capacity,
                "strict capacity requested; capacity is only used as an allocation hint"
            );
        }
        Self {
            shared: Arc::new(Shared {
                list: RwLock::new(AgeIndex::with_capacity(config.capacity)),
                length: AtomicUsize::new(0),
                stats: StatsCollector::default(),
                config,
                clock,
            }),
            reclaimer: Mutex::new(ReclaimerHandle::new()),
        }
    }

    // == Get ==
    /// Returns a clone of the value for `key` if present and younger than the TTL.
    ///
    /// Expired entries read as absent even before a sweep removes them.
    pub fn get<Q>(&self, key: &Q) -> Option<T>
    where
        T: Clone,
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = {
            let list = self.shared.read();
            let now = self.shared.clock.now();
            list.get(key)
                .filter(|entry| !entry.is_expired(now, self.shared.config.ttl))
                .map(|entry| entry.value.clone())
        };
        self.shared.stats.record_lookup(value.is_some());
        value
    }

    // == Contains ==
    /// Checks if a live, unexpired entry exists for `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let list = self.shared.read();
        let now = self.shared.clock.now();
        list.get(key)
            .is_some_and(|entry| !entry.is_expired(now, self.shared.config.ttl))
    }

    // == Set ==
    /// Stores `value` under `key`, resetting its age if it already existed.
    pub fn set(&self, key: K, value: T) {
        let mut list = self.shared.write();
        list.insert(key, value, self.shared.clock.now());
        self.shared.sync_length(&list);
        drop(list);
        self.shared.stats.record_inserts(1);
    }

    // == Set Many ==
    /// Stores every pair in one critical section. An empty batch does not
    /// touch the lock.
    pub fn set_many<I>(&self, items: I)
    where
        I: IntoIterator<Item = (K, T)>,
    {
        let mut items = items.into_iter().peekable();
        if items.peek().is_none() {
            return;
        }

        let mut inserted = 0;
        {
            let mut list = self.shared.write();
            let now = self.shared.clock.now();
            for (key, value) in items {
                list.insert(key, value, now);
                inserted += 1;
            }
            self.shared.sync_length(&list);
        }
        self.shared.stats.record_inserts(inserted);
    }

    // == Delete ==
    /// Removes the entry for `key`. Deleting an absent key is a no-op.
    pub fn del<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut list = self.shared.write();
        if list.remove(key).is_some() {
            self.shared.sync_length(&list);
        }
    }

    // == Flush ==
    /// Discards every entry. Capacity, TTL and statistics are kept.
    pub fn flush(&self) {
        let mut list = self.shared.write();
        let dropped = list.len();
        list.clear(self.shared.config.capacity);
        self.shared.sync_length(&list);
        drop(list);
        debug!("Cache flushed: dropped {} entries", dropped);
    }

    // == Get Or Set ==
    /// Returns the live value for `key`, or populates it from `producer`.
    ///
    /// On a hit the stored value comes back with `true`. On a miss the
    /// producer's value is stored and returned together with the producer's
    /// own success flag, whatever that flag is. Without a producer a miss
    /// returns `None` and stores nothing.
    ///
    /// The write lock is held for the whole call, producer included: while a
    /// producer runs, every other operation on this cache waits. Concurrent
    /// callers for a missing key therefore invoke the producer once; the rest
    /// see the stored result.
    ///
    /// The producer must not call back into this cache, or it deadlocks.
    pub fn get_or_set<F>(&self, key: K, producer: Option<F>) -> Option<(T, bool)>
    where
        T: Clone,
        F: FnOnce() -> (T, bool),
    {
        let mut list = self.shared.write();
        let ttl = self.shared.config.ttl;

        let now = self.shared.clock.now();
        if let Some(entry) = list.get(&key).filter(|e| !e.is_expired(now, ttl)) {
            let value = entry.value.clone();
            self.shared.stats.record_lookup(true);
            return Some((value, true));
        }
        self.shared.stats.record_lookup(false);

        let (value, ok) = producer?();
        list.insert(key, value.clone(), self.shared.clock.now());
        self.shared.sync_length(&list);
        self.shared.stats.record_inserts(1);
        Some((value, ok))
    }

    // == Sweep ==
    /// Runs one reclamation pass synchronously.
    ///
    /// Returns the number of expired entries removed. With a zero TTL nothing
    /// ever expires and this is a no-op.
    pub fn sweep(&self) -> usize {
        self.shared.sweep()
    }

    // == Length ==
    /// Returns the number of stored entries, expired-but-unswept included.
    ///
    /// Reads an atomic counter and never waits on the cache lock.
    pub fn len(&self) -> usize {
        self.shared.length.load(Ordering::Acquire)
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Returns a snapshot of the activity counters.
    pub fn stats(&self) -> CacheStats {
        self.shared.stats.snapshot(self.len())
    }

    /// Maximum entry age; zero means entries never expire.
    pub fn ttl(&self) -> Duration {
        self.shared.config.ttl
    }

    /// Allocation hint given at construction.
    pub fn capacity(&self) -> usize {
        self.shared.config.capacity
    }

    /// Flag given at construction. Not enforced.
    pub fn strict_capacity(&self) -> bool {
        self.shared.config.strict_capacity
    }

    // == Reclaimer Lifecycle ==
    fn lock_reclaimer(&self) -> MutexGuard<'_, ReclaimerHandle> {
        self.reclaimer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Checks if the background reclaimer loop is alive.
    pub fn is_reclaimer_running(&self) -> bool {
        self.lock_reclaimer().is_running()
    }

    /// Signals the reclaimer to stop without waiting for it.
    ///
    /// A sweep already in progress finishes first. Stopping a stopped
    /// reclaimer is a no-op.
    pub fn stop_reclaimer(&self) {
        // Dropping the join handle detaches the task; it exits on its own.
        let _ = self.lock_reclaimer().stop();
    }

    /// Signals the reclaimer to stop and waits up to `timeout` for it to exit.
    pub async fn stop_reclaimer_and_wait(&self, timeout: Duration) -> Result<()> {
        let task = {
            let mut reclaimer = self.lock_reclaimer();
            reclaimer.stop()
        };
        let Some(task) = task else {
            return Ok(());
        };

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) if e.is_cancelled() => Ok(()),
            Ok(Err(e)) => {
                warn!("Reclaimer task panicked: {}", e);
                Err(CacheError::ReclaimerPanicked(e.to_string()))
            }
            Err(_) => {
                warn!("Reclaimer did not stop within {:?}", timeout);
                Err(CacheError::ReclaimerTimeout(timeout))
            }
        }
    }

    /// Stops the reclaimer and clears every entry.
    ///
    /// The cache must not be used afterwards.
    pub fn close(&self) {
        self.stop_reclaimer();
        self.flush();
        debug!("Cache closed");
    }

    /// Graceful [`close`](Cache::close): waits up to `timeout` for the
    /// reclaimer to exit before clearing. Entries are cleared even if the
    /// wait fails.
    pub async fn shutdown(&self, timeout: Duration) -> Result<()> {
        let stopped = self.stop_reclaimer_and_wait(timeout).await;
        self.flush();
        debug!("Cache closed");
        stopped
    }
}

impl<K, T, C> Cache<K, T, C>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
    C: Clock,
{
    /// Starts the background reclaimer.
    ///
    /// No-op when the sweep interval is zero or the reclaimer is already
    /// running. Fails with [`CacheError::RuntimeUnavailable`] outside a
    /// Tokio runtime.
    pub fn start_reclaimer(&self) -> Result<()> {
        self.lock_reclaimer().start(&self.shared)
    }
}

#[cfg(test)]
impl<K, T, C> Cache<K, T, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Panics unless the index, the age list and the length counter agree.
    pub(crate) fn assert_consistent(&self) {
        let list = self.shared.read();
        list.assert_consistent();
        assert_eq!(self.len(), list.len(), "length counter out of sync");
    }

    /// Keys from oldest to youngest.
    pub(crate) fn keys_by_age(&self) -> Vec<K> {
        self.shared.read().iter().map(|e| e.key.clone()).collect()
    }
}
