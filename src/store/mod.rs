pub mod sharded;

use std::hash::Hash;
use std::sync::Arc;
use ahash::AHashMap;
use tracing::{error, trace};

use crate::error::{CacheError, Result};
use crate::policy::Policy;

/// Capacity value that disables eviction.
pub const UNBOUNDED: usize = usize::MAX;

/// Maps the user-facing capacity to the internal bound (`0` = unbounded).
#[inline]
pub(crate) fn effective_capacity(capacity: usize) -> usize {
    if capacity == 0 {
        UNBOUNDED
    } else {
        capacity
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Backing map plus its replacement policy, without any synchronization.
///
/// Every mutation of `map` is paired with exactly one policy notification,
/// so the policy always tracks the same key set as the map. Callers provide
/// the exclusive access (`&mut self`), typically through a lock.
pub struct Store<K, V, P>
where
    K: Hash + Eq,
    P: Policy<K>,
{
    map: AHashMap<K, Arc<V>>,
    policy: P,
    /// Already normalized: never zero.
    capacity: usize,
}

impl<K, V, P> Store<K, V, P>
where
    K: Hash + Eq + Clone,
    P: Policy<K>,
{
    /// Creates an empty store. A `capacity` of `0` means unbounded.
    pub fn new(capacity: usize, policy: P) -> Self {
        Store {
            map: AHashMap::new(),
            policy,
            capacity: effective_capacity(capacity),
        }
    }

    /// Inserts or overwrites `key`.
    ///
    /// Overwriting counts as an access and never evicts. Inserting a new key
    /// into a full store first evicts the policy's candidate.
    ///
    /// # Panics
    ///
    /// Panics if the store is full and the policy names no candidate, or a
    /// candidate that is not stored. Nothing is mutated in that case.
    pub fn put(&mut self, key: K, value: V) {
        if let Some(slot) = self.map.get_mut(&key) {
            self.policy.touch(&key);
            *slot = Arc::new(value);
            return;
        }

        if self.map.len() >= self.capacity {
            self.evict_one();
        }

        self.policy.insert(key.clone());
        self.map.insert(key, Arc::new(value));
    }

    /// Returns the value for `key` and reports the access to the policy.
    pub fn get(&mut self, key: &K) -> Result<Arc<V>> {
        let value = self.map.get(key).cloned().ok_or(CacheError::NotFound)?;
        self.policy.touch(key);
        Ok(value)
    }

    /// Membership test; not an access.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Normalized capacity ([`UNBOUNDED`] when constructed with `0`).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes `key`. Returns `false` without side effects when absent.
    pub fn remove(&mut self, key: &K) -> bool {
        if !self.map.contains_key(key) {
            return false;
        }
        self.policy.erase(key);
        self.map.remove(key);
        true
    }

    /// Reports every held key to the policy, then empties the map.
    ///
    /// Returns the number of entries dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.map.len();
        for key in self.map.keys() {
            self.policy.erase(key);
        }
        self.map.clear();
        trace!(count, "cleared cache store");
        count
    }

    #[cfg(test)]
    pub(crate) fn policy(&self) -> &P {
        &self.policy
    }

    fn evict_one(&mut self) {
        let victim = match self.policy.replacement_candidate() {
            Some(key) if self.map.contains_key(&key) => key,
            Some(_) => {
                error!(
                    len = self.map.len(),
                    "replacement policy named a key that is not cached"
                );
                panic!("replacement policy named a key that is not cached");
            }
            None => {
                error!(
                    len = self.map.len(),
                    "replacement policy returned no candidate for a full cache"
                );
                panic!("replacement policy returned no candidate for a full cache");
            }
        };

        self.policy.erase(&victim);
        self.map.remove(&victim);
        trace!(capacity = self.capacity, "evicted replacement candidate");
    }
}

impl<K, V, P> Drop for Store<K, V, P>
where
    K: Hash + Eq,
    P: Policy<K>,
{
    fn drop(&mut self) {
        // Same as `clear`, but without the `K: Clone` bound of the main impl.
        for key in self.map.keys() {
            self.policy.erase(key);
        }
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Insert(u32),
        Touch(u32),
        Erase(u32),
    }

    /// FIFO policy that also records every notification it receives.
    #[derive(Default)]
    struct Recording {
        order: VecDeque<u32>,
        events: Arc<Mutex<Vec<Event>>>,
    }

    impl Policy<u32> for Recording {
        fn insert(&mut self, key: u32) {
            self.events.lock().unwrap().push(Event::Insert(key));
            self.order.push_back(key);
        }

        fn touch(&mut self, key: &u32) {
            self.events.lock().unwrap().push(Event::Touch(*key));
        }

        fn erase(&mut self, key: &u32) {
            self.events.lock().unwrap().push(Event::Erase(*key));
            self.order.retain(|k| k != key);
        }

        fn replacement_candidate(&self) -> Option<u32> {
            self.order.front().copied()
        }
    }

    fn recording_store(cap: usize) -> (Store<u32, u32, Recording>, Arc<Mutex<Vec<Event>>>) {
        let policy = Recording::default();
        let events = Arc::clone(&policy.events);
        (Store::new(cap, policy), events)
    }

    #[test]
    fn zero_capacity_means_unbounded() {
        let (store, _) = recording_store(0);
        assert_eq!(store.capacity(), UNBOUNDED);
    }

    #[test]
    fn overflow_evicts_exactly_one_candidate() {
        let (mut store, events) = recording_store(2);
        store.put(1, 10);
        store.put(2, 20);
        store.put(3, 30);
        assert_eq!(store.len(), 2);
        assert!(!store.contains(&1));
        assert!(store.contains(&2));
        assert!(store.contains(&3));
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Event::Insert(1),
                Event::Insert(2),
                Event::Erase(1),
                Event::Insert(3)
            ]
        );
    }

    #[test]
    fn update_touches_and_never_evicts() {
        let (mut store, events) = recording_store(1);
        store.put(1, 10);
        store.put(1, 11);
        assert_eq!(store.len(), 1);
        assert_eq!(*store.get(&1).unwrap(), 11);
        assert_eq!(
            *events.lock().unwrap(),
            vec![Event::Insert(1), Event::Touch(1), Event::Touch(1)]
        );
    }

    #[test]
    fn miss_leaves_policy_untouched() {
        let (mut store, events) = recording_store(4);
        store.put(1, 10);
        assert_eq!(store.get(&2), Err(CacheError::NotFound));
        assert!(!store.contains(&2));
        assert_eq!(*events.lock().unwrap(), vec![Event::Insert(1)]);
    }

    #[test]
    fn membership_check_is_not_an_access() {
        let (mut store, events) = recording_store(4);
        store.put(1, 10);
        assert!(store.contains(&1));
        assert!(store.contains(&1));
        assert_eq!(*events.lock().unwrap(), vec![Event::Insert(1)]);
    }

    #[test]
    fn remove_absent_key_has_no_side_effects() {
        let (mut store, events) = recording_store(4);
        store.put(1, 10);
        assert!(!store.remove(&9));
        assert_eq!(store.len(), 1);
        assert!(store.remove(&1));
        assert!(store.is_empty());
        assert_eq!(
            *events.lock().unwrap(),
            vec![Event::Insert(1), Event::Erase(1)]
        );
    }

    #[test]
    fn clear_erases_every_key_once() {
        let (mut store, events) = recording_store(8);
        for k in 0..5 {
            store.put(k, k);
        }
        assert_eq!(store.clear(), 5);
        assert!(store.is_empty());
        assert!(store.policy().order.is_empty());

        let mut erased: Vec<u32> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Event::Erase(k) => Some(*k),
                _ => None,
            })
            .collect();
        erased.sort_unstable();
        assert_eq!(erased, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn drop_reports_remaining_keys() {
        let (mut store, events) = recording_store(8);
        store.put(1, 1);
        store.put(2, 2);
        drop(store);
        let erases = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, Event::Erase(_)))
            .count();
        assert_eq!(erases, 2);
    }

    struct Liar;

    impl Policy<u32> for Liar {
        fn insert(&mut self, _key: u32) {}
        fn touch(&mut self, _key: &u32) {}
        fn erase(&mut self, _key: &u32) {}
        fn replacement_candidate(&self) -> Option<u32> {
            Some(999)
        }
    }

    #[test]
    #[should_panic(expected = "not cached")]
    fn bogus_candidate_fails_fast() {
        let mut store: Store<u32, u32, Liar> = Store::new(1, Liar);
        store.put(1, 1);
        store.put(2, 2);
    }
}
