use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::policy::{NoTrackingPolicy, Policy};
use crate::store::sharded::ShardedStore;

/// Default number of shards for [`ShardedCache`].
pub const DEFAULT_SHARDS: usize = 16;

/// A [`Cache`](crate::Cache) split into independently locked shards.
///
/// Each shard owns its own store, policy and lock. Operations on a single
/// key are atomic exactly like on `Cache`; eviction decisions, however, are
/// made per shard, so an entry may be evicted while other shards still have
/// room. The total size never exceeds the configured capacity.
///
/// [`clear`](Self::clear) and [`size`](Self::size) visit the shards one at a
/// time and are not atomic across the whole cache.
///
/// # Example
/// ```
/// use policache::CacheBuilder;
///
/// let cache: policache::ShardedCache<u64, u64> = CacheBuilder::new(1_000)
///     .num_shards(8)
///     .build_sharded();
/// cache.put(1, 10);
/// assert!(cache.cached(&1));
/// ```
pub struct ShardedCache<K, V, P = NoTrackingPolicy<K>>
where
    K: Hash + Eq,
    P: Policy<K>,
{
    inner: Arc<ShardedStore<K, V, P>>,
}

impl<K, V, P> Clone for ShardedCache<K, V, P>
where
    K: Hash + Eq,
    P: Policy<K>,
{
    fn clone(&self) -> Self {
        ShardedCache {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V, P> ShardedCache<K, V, P>
where
    K: Hash + Eq + Clone,
    P: Policy<K>,
{
    /// Creates a sharded cache, building one policy per shard with
    /// `make_policy`.
    ///
    /// `num_shards` must be a power of two. It is lowered when `capacity` is
    /// too small to give every shard at least one slot.
    pub fn with_policy_factory<F>(capacity: usize, num_shards: usize, make_policy: F) -> Self
    where
        F: FnMut() -> P,
    {
        let store = ShardedStore::new(capacity, num_shards, make_policy);
        debug!(
            capacity = store.capacity(),
            shards = store.num_shards(),
            "created sharded cache"
        );
        ShardedCache {
            inner: Arc::new(store),
        }
    }

    /// See [`Cache::put`](crate::Cache::put).
    pub fn put(&self, key: K, value: V) {
        self.inner.put(key, value);
    }

    /// See [`Cache::get`](crate::Cache::get).
    pub fn get(&self, key: &K) -> Result<Arc<V>> {
        self.inner.get(key)
    }

    pub fn cached(&self, key: &K) -> bool {
        self.inner.contains(key)
    }

    /// Sum of the shard sizes.
    pub fn size(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn num_shards(&self) -> usize {
        self.inner.num_shards()
    }

    pub fn remove(&self, key: &K) -> bool {
        self.inner.remove(key)
    }

    /// Clears the shards one after another.
    pub fn clear(&self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;

    #[test]
    fn basic_operations() {
        let cache: ShardedCache<u32, String> =
            ShardedCache::with_policy_factory(64, 4, NoTrackingPolicy::new);
        cache.put(1, "one".to_string());
        assert_eq!(*cache.get(&1).unwrap(), "one");
        assert_eq!(cache.get(&2), Err(CacheError::NotFound));
        assert!(cache.remove(&1));
        assert!(!cache.remove(&1));
        assert!(cache.is_empty());
    }

    #[test]
    #[should_panic(expected = "num_shards must be a power of two")]
    fn direct_construction_checks_shard_count() {
        let _: ShardedCache<u32, u32> =
            ShardedCache::with_policy_factory(10, 3, NoTrackingPolicy::new);
    }

    #[test]
    fn small_capacity_reduces_shards() {
        let cache: ShardedCache<u32, u32> =
            ShardedCache::with_policy_factory(2, DEFAULT_SHARDS, NoTrackingPolicy::new);
        assert_eq!(cache.num_shards(), 2);
        for i in 0..50 {
            cache.put(i, i);
        }
        assert!(cache.size() <= 2);
    }
}
