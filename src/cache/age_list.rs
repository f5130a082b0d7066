//! Age List Module
//!
//! Hash index plus an arena-backed doubly linked list ordered by write time.
//!
//! Entries live in a `Vec` of slots and link to their neighbours by slot
//! index. Freed slots go on a free list and are reused by later inserts, so
//! splicing never moves an entry and never invalidates another entry's links.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

use crate::cache::Entry;

// == Age Index ==
/// Key index and insertion-ordered entry list, kept in agreement.
///
/// - `first` = oldest entry (next eviction candidate)
/// - `last` = most recently written entry
#[derive(Debug)]
pub struct AgeIndex<K, T> {
    /// Key -> slot holding the live entry
    index: HashMap<K, usize>,
    /// Entry arena
    slots: Vec<Option<Entry<K, T>>>,
    /// Vacant slots ready for reuse
    free: Vec<usize>,
    first: Option<usize>,
    last: Option<usize>,
}

impl<K, T> AgeIndex<K, T>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty structure with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            first: None,
            last: None,
        }
    }

    // == Insert ==
    /// Appends a fresh entry for `key` at the young end of the list.
    ///
    /// An existing entry for the same key is spliced out first, so a rewrite
    /// resets the key's age and moves it behind every other entry.
    ///
    /// Returns the replaced value, if any.
    pub fn insert(&mut self, key: K, value: T, now: Instant) -> Option<T> {
        let replaced = self.remove(&key).map(|entry| entry.value);

        let mut entry = Entry::new(key.clone(), value, now);
        entry.prev = self.last;
        let idx = self.alloc_slot(entry);

        match self.last {
            Some(last) => self.slot_mut(last).next = Some(idx),
            None => self.first = Some(idx),
        }
        self.last = Some(idx);
        self.index.insert(key, idx);

        replaced
    }

    // == Get ==
    /// Returns the live entry for `key`, expired or not.
    pub fn get<Q>(&self, key: &Q) -> Option<&Entry<K, T>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&idx| self.slot(idx))
    }

    // == Remove ==
    /// Unlinks and returns the entry for `key`. A miss is a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<Entry<K, T>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        Some(self.release(idx))
    }

    // == Oldest ==
    /// Returns the oldest surviving entry without removing it.
    pub fn oldest(&self) -> Option<&Entry<K, T>> {
        self.first.map(|idx| self.slot(idx))
    }

    // == Remove Oldest ==
    /// Unlinks and returns the oldest entry, or `None` when empty.
    pub fn remove_oldest(&mut self) -> Option<Entry<K, T>> {
        let idx = self.first?;
        let key = self.slot(idx).key.clone();
        self.index.remove(&key);
        Some(self.release(idx))
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Clear ==
    /// Drops every entry and reallocates for `capacity` entries.
    pub fn clear(&mut self, capacity: usize) {
        *self = Self::with_capacity(capacity);
    }

    // == Iter ==
    /// Walks the entries from oldest to youngest.
    #[cfg(test)]
    pub fn iter(&self) -> Iter<'_, K, T> {
        Iter {
            list: self,
            cursor: self.first,
        }
    }

    // == Internal Helpers ==
    fn alloc_slot(&mut self, entry: Entry<K, T>) -> usize {
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(entry);
            idx
        } else {
            self.slots.push(Some(entry));
            self.slots.len() - 1
        }
    }

    /// Splices the entry at `idx` out of the list and frees its slot.
    /// The caller must already have dropped it from the index.
    fn release(&mut self, idx: usize) -> Entry<K, T> {
        let (prev, next) = {
            let entry = self.slot(idx);
            (entry.prev, entry.next)
        };

        match prev {
            Some(p) => self.slot_mut(p).next = next,
            None => self.first = next,
        }
        match next {
            Some(n) => self.slot_mut(n).prev = prev,
            None => self.last = prev,
        }

        self.free.push(idx);
        let mut entry = self.slots[idx]
            .take()
            .unwrap_or_else(|| unreachable!("linked slot {idx} is vacant"));
        entry.prev = None;
        entry.next = None;
        entry
    }

    fn slot(&self, idx: usize) -> &Entry<K, T> {
        self.slots[idx]
            .as_ref()
            .unwrap_or_else(|| unreachable!("linked slot {idx} is vacant"))
    }

    fn slot_mut(&mut self, idx: usize) -> &mut Entry<K, T> {
        self.slots[idx]
            .as_mut()
            .unwrap_or_else(|| unreachable!("linked slot {idx} is vacant"))
    }

    /// Panics if the index and the list disagree in any way.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut seen = std::collections::HashSet::new();
        let mut prev: Option<usize> = None;
        let mut cursor = self.first;
        let mut last_created: Option<Instant> = None;

        while let Some(idx) = cursor {
            let entry = self.slot(idx);
            assert_eq!(entry.prev, prev, "broken back link at slot {idx}");
            assert_eq!(
                self.index.get(&entry.key),
                Some(&idx),
                "list entry not reachable from the index"
            );
            assert!(seen.insert(idx), "slot {idx} visited twice");
            if let Some(t) = last_created {
                assert!(entry.created >= t, "list out of age order");
            }
            last_created = Some(entry.created);
            prev = cursor;
            cursor = entry.next;
        }

        assert_eq!(self.last, prev, "last does not point at the tail");
        assert_eq!(seen.len(), self.index.len(), "index holds orphaned keys");
        assert_eq!(
            seen.len() + self.free.len(),
            self.slots.len(),
            "slot accounting is off"
        );
    }
}

// == Iterator ==
/// Oldest-first iterator over an [`AgeIndex`].
#[cfg(test)]
pub(crate) struct Iter<'a, K, T> {
    list: &'a AgeIndex<K, T>,
    cursor: Option<usize>,
}

#[cfg(test)]
impl<'a, K, T> Iterator for Iter<'a, K, T>
where
    K: Eq + Hash + Clone,
{
    type Item = &'a Entry<K, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.list.slot(self.cursor?);
        self.cursor = entry.next;
        Some(entry)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn keys<T>(list: &AgeIndex<&'static str, T>) -> Vec<&'static str> {
        list.iter().map(|e| e.key).collect()
    }

    #[test]
    fn test_insert_appends_in_order() {
        let now = Instant::now();
        let mut list = AgeIndex::with_capacity(4);

        list.insert("a", 1, now);
        list.insert("b", 2, now);
        list.insert("c", 3, now);

        assert_eq!(list.len(), 3);
        assert_eq!(keys(&list), vec!["a", "b", "c"]);
        assert_eq!(list.oldest().map(|e| e.key), Some("a"));
        list.assert_consistent();
    }

    #[test]
    fn test_overwrite_moves_key_to_young_end() {
        let now = Instant::now();
        let mut list = AgeIndex::with_capacity(4);

        list.insert("a", 1, now);
        list.insert("b", 2, now);
        list.insert("c", 3, now);
        let replaced = list.insert("a", 10, now + Duration::from_secs(1));

        assert_eq!(replaced, Some(1));
        assert_eq!(list.len(), 3);
        assert_eq!(keys(&list), vec!["b", "c", "a"]);
        assert_eq!(list.get("a").map(|e| e.value), Some(10));
        list.assert_consistent();
    }

    #[test]
    fn test_overwrite_sole_entry() {
        let now = Instant::now();
        let mut list = AgeIndex::with_capacity(1);

        list.insert("a", 1, now);
        list.insert("a", 2, now);

        assert_eq!(list.len(), 1);
        assert_eq!(keys(&list), vec!["a"]);
        list.assert_consistent();
    }

    #[test]
    fn test_remove_middle_head_and_tail() {
        let now = Instant::now();
        let mut list = AgeIndex::with_capacity(4);
        for (i, k) in ["a", "b", "c", "d"].into_iter().enumerate() {
            list.insert(k, i, now);
        }

        assert_eq!(list.remove("b").map(|e| e.value), Some(1));
        assert_eq!(keys(&list), vec!["a", "c", "d"]);
        list.assert_consistent();

        assert!(list.remove("a").is_some());
        assert_eq!(keys(&list), vec!["c", "d"]);
        list.assert_consistent();

        assert!(list.remove("d").is_some());
        assert_eq!(keys(&list), vec!["c"]);
        list.assert_consistent();

        assert!(list.remove("c").is_some());
        assert!(list.is_empty());
        assert!(list.oldest().is_none());
        list.assert_consistent();
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let now = Instant::now();
        let mut list = AgeIndex::with_capacity(2);
        list.insert("a", 1, now);

        assert!(list.remove("zzz").is_none());
        assert_eq!(list.len(), 1);
        list.assert_consistent();
    }

    #[test]
    fn test_remove_oldest_drains_in_order() {
        let now = Instant::now();
        let mut list = AgeIndex::with_capacity(3);
        list.insert("a", 1, now);
        list.insert("b", 2, now);
        list.insert("c", 3, now);

        assert_eq!(list.remove_oldest().map(|e| e.key), Some("a"));
        assert_eq!(list.remove_oldest().map(|e| e.key), Some("b"));
        list.assert_consistent();
        assert_eq!(list.remove_oldest().map(|e| e.key), Some("c"));
        assert!(list.remove_oldest().is_none());
        assert!(list.get("a").is_none());
        list.assert_consistent();
    }

    #[test]
    fn test_slots_are_reused() {
        let now = Instant::now();
        let mut list = AgeIndex::with_capacity(2);
        list.insert("a", 1, now);
        list.insert("b", 2, now);
        list.remove("a");
        list.insert("c", 3, now);

        assert_eq!(list.slots.len(), 2);
        assert_eq!(keys(&list), vec!["b", "c"]);
        list.assert_consistent();
    }

    #[test]
    fn test_clear_resets_everything() {
        let now = Instant::now();
        let mut list = AgeIndex::with_capacity(2);
        list.insert("a", 1, now);
        list.insert("b", 2, now);

        list.clear(2);

        assert!(list.is_empty());
        assert!(list.oldest().is_none());
        assert_eq!(list.iter().count(), 0);
        list.insert("c", 3, now);
        assert_eq!(keys(&list), vec!["c"]);
        list.assert_consistent();
    }

    #[test]
    fn test_borrowed_lookup() {
        let now = Instant::now();
        let mut list: AgeIndex<String, u8> = AgeIndex::with_capacity(1);
        list.insert("owned".to_string(), 1, now);

        assert_eq!(list.get("owned").map(|e| e.value), Some(1));
        assert!(list.remove("owned").is_some());
    }
}
