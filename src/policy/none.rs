use std::hash::Hash;
use ahash::AHashSet;
use super::Policy;

/// Baseline policy with no ordering bookkeeping.
///
/// It only remembers which keys are present so that it can always name a
/// valid victim. Which key is picked is unspecified (whatever the underlying
/// hash set yields first).
pub struct NoTrackingPolicy<K> {
    keys: AHashSet<K>,
}

impl<K> NoTrackingPolicy<K> {
    pub fn new() -> Self {
        NoTrackingPolicy {
            keys: AHashSet::new(),
        }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K> Default for NoTrackingPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone + Send> Policy<K> for NoTrackingPolicy<K> {
    fn insert(&mut self, key: K) {
        self.keys.insert(key);
    }

    #[inline]
    fn touch(&mut self, _key: &K) {}

    fn erase(&mut self, key: &K) {
        self.keys.remove(key);
    }

    fn replacement_candidate(&self) -> Option<K> {
        self.keys.iter().next().cloned()
    }
}
